/// Market Data Handler - Feed Processor and Order Book
///
/// Zero-copy market data feed handler for a single instrument stream.
/// Features include:
/// - Fixed-layout binary protocol validation
/// - Zero-copy typed message views with checked downcasts
/// - Gap-tolerant sequence tracking
/// - Price-level order book with order-id lookup
/// - Parse and book update latency statistics

pub mod protocol;
pub mod config;
pub mod parser;
pub mod encoder;
pub mod book_builder;
pub mod gap_detector;
pub mod handler;
pub mod stats;

pub use protocol::{
    Message, MessageHeader, MessageType, OrderAdd, OrderCancel, Quote, Side, Trade,
    TypeMismatch, TypedMessage,
};
pub use config::{BookConfig, FeedConfig, ParserConfig};
pub use parser::{frames, MessageParser, ParseError};
pub use encoder::{QuoteUpdate, TradePrint};
pub use book_builder::{BookDepth, BookError, BookStats, LastTrade, Order, OrderBook};
pub use gap_detector::{GapDetector, SequenceCheck};
pub use handler::{BatchSummary, FeedError, FeedHandler};
pub use stats::{FeedStats, LatencyStats};
