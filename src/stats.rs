/// Feed statistics tracking
///
/// Tracks messages/sec, parse latency, book update latency and per-type
/// message counts over a bounded window of samples.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::protocol::{MessageType, MESSAGE_TYPE_COUNT};

pub const DEFAULT_WINDOW: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: f64,
    pub p50_ns: u64,
    pub p99_ns: u64,
}

impl LatencyStats {
    fn from_window(window: &VecDeque<u64>) -> Option<Self> {
        if window.is_empty() {
            return None;
        }

        let mut sorted: Vec<u64> = window.iter().copied().collect();
        sorted.sort_unstable();

        let mean = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
        Some(LatencyStats {
            min_ns: sorted[0],
            max_ns: sorted[sorted.len() - 1],
            mean_ns: mean,
            p50_ns: sorted[sorted.len() / 2],
            p99_ns: sorted[(sorted.len() * 99) / 100],
        })
    }
}

#[derive(Debug, Clone)]
pub struct FeedStats {
    start_time: Option<Instant>,
    total_messages: u64,
    total_bytes: u64,
    rejected_messages: u64,
    per_type: [u64; MESSAGE_TYPE_COUNT],

    window: usize,
    parse_latencies: VecDeque<u64>,
    book_update_latencies: VecDeque<u64>,
}

impl FeedStats {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        FeedStats {
            start_time: None,
            total_messages: 0,
            total_bytes: 0,
            rejected_messages: 0,
            per_type: [0; MESSAGE_TYPE_COUNT],
            window,
            parse_latencies: VecDeque::with_capacity(window),
            book_update_latencies: VecDeque::with_capacity(window),
        }
    }

    /// Record a buffer received from the network layer
    pub fn record_message(&mut self, size: usize) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        self.total_messages += 1;
        self.total_bytes += size as u64;
    }

    /// Record a successfully parsed message of the given type
    pub fn record_type(&mut self, msg_type: MessageType) {
        self.per_type[msg_type as usize - 1] += 1;
    }

    pub fn record_rejected(&mut self) {
        self.rejected_messages += 1;
    }

    pub fn record_parse_latency(&mut self, nanos: u64) {
        Self::push_sample(&mut self.parse_latencies, self.window, nanos);
    }

    pub fn record_book_update_latency(&mut self, nanos: u64) {
        Self::push_sample(&mut self.book_update_latencies, self.window, nanos);
    }

    fn push_sample(samples: &mut VecDeque<u64>, window: usize, nanos: u64) {
        if samples.len() >= window {
            samples.pop_front();
        }
        samples.push_back(nanos);
    }

    pub fn messages_per_sec(&self) -> f64 {
        self.rate(self.total_messages)
    }

    pub fn bytes_per_sec(&self) -> f64 {
        self.rate(self.total_bytes)
    }

    fn rate(&self, count: u64) -> f64 {
        match self.start_time {
            None => 0.0,
            Some(start) => {
                let elapsed = start.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    count as f64 / elapsed
                } else {
                    0.0
                }
            }
        }
    }

    pub fn parse_latency_stats(&self) -> Option<LatencyStats> {
        LatencyStats::from_window(&self.parse_latencies)
    }

    pub fn book_update_latency_stats(&self) -> Option<LatencyStats> {
        LatencyStats::from_window(&self.book_update_latencies)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|st| st.elapsed())
    }

    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn rejected_messages(&self) -> u64 {
        self.rejected_messages
    }

    pub fn count_for(&self, msg_type: MessageType) -> u64 {
        self.per_type[msg_type as usize - 1]
    }

    pub fn reset(&mut self) {
        *self = Self::with_window(self.window);
    }

    /// Write a human-readable summary
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "=== Feed Statistics ===")?;
        writeln!(out, "Total Messages: {}", self.total_messages)?;
        writeln!(out, "Rejected: {}", self.rejected_messages)?;
        writeln!(out, "Total Bytes: {}", self.total_bytes)?;
        writeln!(out, "Elapsed: {:?}", self.elapsed())?;
        writeln!(out, "Messages/sec: {:.2}", self.messages_per_sec())?;
        writeln!(out, "Bytes/sec: {:.2}", self.bytes_per_sec())?;

        for msg_type in MessageType::ALL {
            writeln!(out, "  {}: {}", msg_type.name(), self.count_for(msg_type))?;
        }

        if let Some(stats) = self.parse_latency_stats() {
            writeln!(out, "\nParse Latency (ns):")?;
            writeln!(out, "  Min: {}, Max: {}, Mean: {:.2}", stats.min_ns, stats.max_ns, stats.mean_ns)?;
            writeln!(out, "  P50: {}, P99: {}", stats.p50_ns, stats.p99_ns)?;
        }

        if let Some(stats) = self.book_update_latency_stats() {
            writeln!(out, "\nBook Update Latency (ns):")?;
            writeln!(out, "  Min: {}, Max: {}, Mean: {:.2}", stats.min_ns, stats.max_ns, stats.mean_ns)?;
            writeln!(out, "  P50: {}, P99: {}", stats.p50_ns, stats.p99_ns)?;
        }

        Ok(())
    }
}

impl Default for FeedStats {
    fn default() -> Self {
        Self::new()
    }
}
