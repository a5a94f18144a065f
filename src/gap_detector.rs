/// Sequence number continuity tracking
///
/// Holds the parser's sequence state: the last accepted sequence number,
/// the cumulative count of missing sequence numbers and the most recent
/// gap ranges. Gaps are tolerated: the message that reveals one is still
/// accepted and becomes the new baseline.

use std::collections::VecDeque;

/// Outcome of checking one incoming sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// Exactly `last + 1`
    InOrder,
    /// Ahead of `last + 1`; `missing` sequence numbers were skipped
    Gap { first_missing: u32, missing: u32 },
    /// At or behind `last`: duplicate or out-of-order
    Stale { last: u32 },
}

#[derive(Debug, Clone)]
pub struct GapDetector {
    last_sequence: u32,
    gaps: VecDeque<(u32, u32)>, // (first_missing, last_missing), inclusive
    max_ranges: usize,
    total_missing: u64,
    gap_events: u64,
}

impl GapDetector {
    pub fn new(start_sequence: u32, max_ranges: usize) -> Self {
        GapDetector {
            last_sequence: start_sequence,
            gaps: VecDeque::new(),
            max_ranges,
            total_missing: 0,
            gap_events: 0,
        }
    }

    /// Classify `seq` without changing state
    pub fn check(&self, seq: u32) -> SequenceCheck {
        let expected_next = self.last_sequence as u64 + 1;
        let seq = seq as u64;
        if seq == expected_next {
            SequenceCheck::InOrder
        } else if seq > expected_next {
            SequenceCheck::Gap {
                first_missing: expected_next as u32,
                missing: (seq - expected_next) as u32,
            }
        } else {
            SequenceCheck::Stale {
                last: self.last_sequence,
            }
        }
    }

    /// Check `seq` and, unless it is stale, make it the new baseline
    pub fn process(&mut self, seq: u32) -> SequenceCheck {
        let outcome = self.check(seq);
        match outcome {
            SequenceCheck::InOrder => {
                self.last_sequence = seq;
            }
            SequenceCheck::Gap {
                first_missing,
                missing,
            } => {
                self.total_missing += missing as u64;
                self.gap_events += 1;
                if self.max_ranges > 0 {
                    if self.gaps.len() == self.max_ranges {
                        self.gaps.pop_front();
                    }
                    self.gaps.push_back((first_missing, seq - 1));
                }
                self.last_sequence = seq;
            }
            SequenceCheck::Stale { .. } => {}
        }
        outcome
    }

    pub fn last_sequence(&self) -> u32 {
        self.last_sequence
    }

    /// Recorded gaps as (first_missing, last_missing) tuples, oldest first
    pub fn gaps(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.gaps.iter().copied()
    }

    /// Total number of missing sequence numbers
    pub fn total_missing(&self) -> u64 {
        self.total_missing
    }

    /// Number of discontinuities seen
    pub fn gap_events(&self) -> u64 {
        self.gap_events
    }

    /// Check if a sequence number falls in a retained gap range
    pub fn is_in_gap(&self, seq: u32) -> bool {
        self.gaps
            .iter()
            .any(|&(start, end)| seq >= start && seq <= end)
    }
}

impl Default for GapDetector {
    fn default() -> Self {
        Self::new(0, 1024)
    }
}
