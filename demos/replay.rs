/// Replays a feed file through the handler and prints the resulting book
///
/// Usage: replay [input] [levels]
/// Set RUST_LOG=debug to see gaps and rejections as they happen.

use std::env;
use std::fs;
use std::io;

use market_data_handler::{FeedConfig, FeedHandler};

fn main() -> io::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let input_path = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "/tmp/feed_generator.bin".to_string());
    let levels: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(5);

    let buffer = fs::read(&input_path)?;
    let mut feed = FeedHandler::with_config(FeedConfig::default());
    let summary = feed.process_buffer(&buffer);

    println!(
        "Replayed {}: {} applied, {} rejected, {} book anomalies, {} trailing bytes",
        input_path, summary.applied, summary.rejected, summary.book_anomalies, summary.trailing_bytes
    );
    println!(
        "Sequence gaps: {} missing in {} events, last sequence {}",
        feed.parser().sequence_gaps(),
        feed.parser().gap_events(),
        feed.parser().last_sequence()
    );
    println!("Book anomalies: {:?}\n", feed.book().stats());

    feed.book().print_top_levels(levels);
    println!();

    let stdout = io::stdout();
    feed.stats().write_summary(&mut stdout.lock())?;

    Ok(())
}
