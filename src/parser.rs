/// Zero-copy message parser
///
/// Validates raw buffers from the network layer and returns typed views
/// (`Message`) that borrow the original bytes. No allocation or copying
/// happens during parse.
///
/// Validation order: header size, type discriminant, exact wire length,
/// then sequence continuity. Every rejection increments the invalid
/// counter; sequence gaps are accepted and counted separately.

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};
use thiserror::Error;

use crate::config::ParserConfig;
use crate::gap_detector::{GapDetector, SequenceCheck};
use crate::protocol::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("invalid message type: {0}")]
    InvalidMessageType(u8),

    #[error("length mismatch for {msg_type:?}: expected {expected} bytes, have {actual}")]
    LengthMismatch {
        msg_type: MessageType,
        expected: usize,
        actual: usize,
    },

    #[error("declared length {declared} disagrees with {msg_type:?} wire length {expected}")]
    DeclaredLengthMismatch {
        msg_type: MessageType,
        declared: u16,
        expected: usize,
    },

    #[error("stale sequence {sequence}: last accepted {last}")]
    StaleSequence { sequence: u32, last: u32 },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Validating parser for one feed.
///
/// Holds all sequence and rejection state itself, so independent feeds each
/// get their own parser. Not meant to be shared between threads without
/// external serialization.
#[derive(Debug, Clone)]
pub struct MessageParser {
    config: ParserConfig,
    sequence: GapDetector,
    accepted: u64,
    invalid: u64,
}

impl MessageParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        MessageParser {
            config,
            sequence: GapDetector::new(config.start_sequence, config.max_gap_ranges),
            accepted: 0,
            invalid: 0,
        }
    }

    /// Validate `raw` and return a typed view over the same bytes
    pub fn parse<'a>(&mut self, raw: &'a [u8]) -> ParseResult<Message<'a>> {
        match self.validate(raw) {
            Ok(msg) => {
                self.accepted += 1;
                Ok(msg)
            }
            Err(e) => {
                self.invalid += 1;
                if self.config.log_anomalies {
                    warn!("rejected message #{}: {}", self.invalid, e);
                }
                Err(e)
            }
        }
    }

    fn validate<'a>(&mut self, raw: &'a [u8]) -> ParseResult<Message<'a>> {
        let header = MessageHeader::new(raw).ok_or(ParseError::BufferTooSmall {
            need: HEADER_SIZE,
            have: raw.len(),
        })?;

        let msg_type = MessageType::from_u8(header.msg_type())
            .ok_or(ParseError::InvalidMessageType(header.msg_type()))?;

        let expected = expected_len(header.msg_type());
        if raw.len() != expected {
            return Err(ParseError::LengthMismatch {
                msg_type,
                expected,
                actual: raw.len(),
            });
        }
        if header.length() as usize != expected {
            return Err(ParseError::DeclaredLengthMismatch {
                msg_type,
                declared: header.length(),
                expected,
            });
        }

        let seq = header.sequence();
        match self.sequence.process(seq) {
            SequenceCheck::InOrder => {}
            SequenceCheck::Gap {
                first_missing,
                missing,
            } => {
                if self.config.log_anomalies {
                    debug!(
                        "sequence gap: {} missing ({}..={}), resuming at {}",
                        missing,
                        first_missing,
                        seq - 1,
                        seq
                    );
                }
            }
            SequenceCheck::Stale { last } => {
                return Err(ParseError::StaleSequence { sequence: seq, last });
            }
        }

        Ok(Message::from_validated(msg_type, raw))
    }

    /// Total missing sequence numbers across all gaps
    pub fn sequence_gaps(&self) -> u64 {
        self.sequence.total_missing()
    }

    /// Number of discontinuities, regardless of their size
    pub fn gap_events(&self) -> u64 {
        self.sequence.gap_events()
    }

    /// Count of rejected messages
    pub fn invalid_messages(&self) -> u64 {
        self.invalid
    }

    /// Count of messages that passed validation
    pub fn accepted_messages(&self) -> u64 {
        self.accepted
    }

    pub fn last_sequence(&self) -> u32 {
        self.sequence.last_sequence()
    }

    /// Most recent gap ranges (first_missing, last_missing), oldest first
    pub fn gaps(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.sequence.gaps()
    }

    pub fn is_in_gap(&self, seq: u32) -> bool {
        self.sequence.is_in_gap(seq)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a buffer of back-to-back messages using each header's declared length
pub fn frames(buffer: &[u8]) -> Frames<'_> {
    Frames { buffer, offset: 0 }
}

/// Iterator over framed messages; stops at the first frame that cannot be cut
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Frames<'a> {
    /// Bytes not yet yielded (a truncated or malformed tail)
    pub fn remainder(&self) -> &'a [u8] {
        &self.buffer[self.offset..]
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let buffer = self.buffer;
        let rest = &buffer[self.offset..];
        if rest.len() < HEADER_SIZE {
            return None;
        }
        let length = LittleEndian::read_u16(&rest[1..3]) as usize;
        if length < HEADER_SIZE || length > rest.len() {
            return None;
        }
        self.offset += length;
        Some(&rest[..length])
    }
}
