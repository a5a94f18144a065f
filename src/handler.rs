/// Feed pipeline: parse, apply, measure
///
/// One `FeedHandler` is one shard: a parser, the book it feeds and the
/// statistics for both. It is driven by a single caller in arrival order.

use std::time::Instant;

use log::info;
use thiserror::Error;

use crate::book_builder::{BookError, OrderBook};
use crate::config::FeedConfig;
use crate::parser::{frames, MessageParser, ParseError};
use crate::protocol::MessageType;
use crate::stats::FeedStats;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedError {
    #[error("parse: {0}")]
    Parse(#[from] ParseError),

    #[error("book: {0}")]
    Book(#[from] BookError),
}

/// Outcome of `FeedHandler::process_buffer`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Frames parsed and applied to the book
    pub applied: usize,
    /// Frames the parser rejected
    pub rejected: usize,
    /// Frames parsed but refused by the book
    pub book_anomalies: usize,
    /// Trailing bytes that did not form a complete frame
    pub trailing_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct FeedHandler {
    parser: MessageParser,
    book: OrderBook,
    stats: FeedStats,
}

impl FeedHandler {
    pub fn new() -> Self {
        Self::with_config(FeedConfig::default())
    }

    pub fn with_config(config: FeedConfig) -> Self {
        FeedHandler {
            parser: MessageParser::with_config(config.parser),
            book: OrderBook::with_config(config.book),
            stats: FeedStats::with_window(config.latency_window),
        }
    }

    /// Parse one raw message and apply it to the book
    pub fn on_message(&mut self, raw: &[u8]) -> Result<MessageType, FeedError> {
        self.stats.record_message(raw.len());

        let started = Instant::now();
        let parsed = self.parser.parse(raw);
        self.stats
            .record_parse_latency(started.elapsed().as_nanos() as u64);

        let msg = match parsed {
            Ok(msg) => msg,
            Err(e) => {
                self.stats.record_rejected();
                return Err(e.into());
            }
        };
        let msg_type = msg.message_type();
        self.stats.record_type(msg_type);

        let started = Instant::now();
        let applied = self.book.apply(&msg);
        self.stats
            .record_book_update_latency(started.elapsed().as_nanos() as u64);

        applied?;
        Ok(msg_type)
    }

    /// Feed every complete frame of a buffer of back-to-back messages
    pub fn process_buffer(&mut self, buffer: &[u8]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut it = frames(buffer);

        for frame in it.by_ref() {
            match self.on_message(frame) {
                Ok(_) => summary.applied += 1,
                Err(FeedError::Parse(_)) => summary.rejected += 1,
                Err(FeedError::Book(_)) => summary.book_anomalies += 1,
            }
        }
        summary.trailing_bytes = it.remainder().len();

        if summary.trailing_bytes > 0 {
            info!(
                "buffer ended with {} bytes that do not form a frame",
                summary.trailing_bytes
            );
        }
        summary
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }
}

impl Default for FeedHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_builder::Order;
    use crate::encoder;
    use crate::protocol::Side;

    fn handler() -> FeedHandler {
        FeedHandler::with_config(FeedConfig::default().with_log_anomalies(false))
    }

    #[test]
    fn test_on_message_applies_to_book() {
        let mut feed = handler();
        let msg = encoder::order_add(
            1,
            &Order {
                order_id: 1,
                symbol_id: 1,
                price: 100,
                size: 10,
                side: Side::Buy,
            },
        );
        assert_eq!(feed.on_message(&msg), Ok(MessageType::OrderAdd));
        assert_eq!(feed.book().best_bid(), Some(100));
        assert_eq!(feed.stats().count_for(MessageType::OrderAdd), 1);
        assert!(feed.stats().parse_latency_stats().is_some());
    }

    #[test]
    fn test_book_error_surfaces() {
        let mut feed = handler();
        let msg = encoder::order_cancel(1, 77, 1);
        assert_eq!(
            feed.on_message(&msg),
            Err(FeedError::Book(BookError::UnknownOrder(77)))
        );
        // the parser still accepted it
        assert_eq!(feed.parser().last_sequence(), 1);
        assert_eq!(feed.parser().invalid_messages(), 0);
    }

    #[test]
    fn test_parse_error_counts_rejection() {
        let mut feed = handler();
        assert!(matches!(
            feed.on_message(&[1, 2, 3]),
            Err(FeedError::Parse(ParseError::BufferTooSmall { .. }))
        ));
        assert_eq!(feed.stats().rejected_messages(), 1);
        assert_eq!(feed.stats().total_messages(), 1);
    }
}
