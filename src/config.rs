/// Configuration for the parser, the book and the feed pipeline.
///
/// All settings are in-process; the crate reads no files or environment.

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Sequence number treated as already seen before the first message.
    /// With the default of 0 the first expected sequence is 1.
    pub start_sequence: u32,

    /// Maximum number of gap ranges kept for inspection (oldest dropped first)
    pub max_gap_ranges: usize,

    /// Whether to log rejected messages and sequence gaps
    pub log_anomalies: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            start_sequence: 0,
            max_gap_ranges: 1024,
            log_anomalies: true,
        }
    }
}

impl ParserConfig {
    /// Set the sequence baseline.
    pub fn with_start_sequence(mut self, start_sequence: u32) -> Self {
        self.start_sequence = start_sequence;
        self
    }

    /// Set how many gap ranges are retained.
    pub fn with_max_gap_ranges(mut self, max_gap_ranges: usize) -> Self {
        self.max_gap_ranges = max_gap_ranges;
        self
    }

    /// Enable/disable anomaly logging.
    pub fn with_log_anomalies(mut self, enabled: bool) -> Self {
        self.log_anomalies = enabled;
        self
    }
}

/// Order book settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookConfig {
    /// Whether to log duplicate adds, unknown cancels and invalid sides
    pub log_anomalies: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self { log_anomalies: true }
    }
}

impl BookConfig {
    pub fn with_log_anomalies(mut self, enabled: bool) -> Self {
        self.log_anomalies = enabled;
        self
    }
}

/// Settings for one feed shard (parser + book + stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    pub parser: ParserConfig,
    pub book: BookConfig,

    /// Number of latency samples kept per window
    pub latency_window: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            book: BookConfig::default(),
            latency_window: 10_000,
        }
    }
}

impl FeedConfig {
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_book(mut self, book: BookConfig) -> Self {
        self.book = book;
        self
    }

    pub fn with_latency_window(mut self, latency_window: usize) -> Self {
        self.latency_window = latency_window;
        self
    }

    /// Turn anomaly logging on or off for both parser and book.
    pub fn with_log_anomalies(mut self, enabled: bool) -> Self {
        self.parser.log_anomalies = enabled;
        self.book.log_anomalies = enabled;
        self
    }
}
