/// Synthetic market data feed generator
///
/// Creates random order flow in the feed's wire format and writes it to a
/// file or stdout. A small fraction of sequence numbers is skipped so the
/// replay exercises gap detection.
///
/// Usage: feed_generator [output|stdout] [message_count]

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use market_data_handler::encoder;
use market_data_handler::{Order, QuoteUpdate, Side, TradePrint};
use rand::Rng;

const MID: i64 = 100_00000000;
const TICK: i64 = 1_000000;
const SYMBOL: u32 = 1;

fn random_side(rng: &mut impl Rng) -> Side {
    if rng.gen_bool(0.5) {
        Side::Buy
    } else {
        Side::Sell
    }
}

fn random_price(rng: &mut impl Rng, side: Side) -> i64 {
    let ticks = rng.gen_range(1i64..50);
    match side {
        Side::Buy => MID - ticks * TICK,
        Side::Sell => MID + ticks * TICK,
    }
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let output_path = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "/tmp/feed_generator.bin".to_string());
    let message_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10000);

    let mut output: Box<dyn Write> = if output_path == "stdout" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(&output_path)?))
    };

    let mut rng = rand::thread_rng();
    let mut live: Vec<u64> = Vec::new();
    let mut next_order_id = 1000u64;
    let mut sequence = 0u32;
    let mut bytes_written = 0usize;

    eprintln!("Generating {} messages to {}", message_count, output_path);

    for i in 0..message_count {
        sequence += 1;
        if rng.gen_ratio(1, 500) {
            sequence += rng.gen_range(1..4);
        }

        let roll = rng.gen_range(0u8..100);
        let msg: Vec<u8> = if roll < 55 || live.is_empty() {
            let side = random_side(&mut rng);
            let order = Order {
                order_id: next_order_id,
                symbol_id: SYMBOL,
                price: random_price(&mut rng, side),
                size: rng.gen_range(1u32..1000),
                side,
            };
            live.push(next_order_id);
            next_order_id += 1;
            encoder::order_add(sequence, &order).to_vec()
        } else if roll < 90 {
            let idx = rng.gen_range(0..live.len());
            let order_id = live.swap_remove(idx);
            encoder::order_cancel(sequence, order_id, SYMBOL).to_vec()
        } else if roll < 95 {
            let update = QuoteUpdate {
                symbol_id: SYMBOL,
                bid: Some((MID - 60 * TICK, rng.gen_range(1u32..500))),
                ask: Some((MID + 60 * TICK, rng.gen_range(1u32..500))),
            };
            encoder::quote(sequence, &update).to_vec()
        } else {
            let side = random_side(&mut rng);
            let print = TradePrint {
                symbol_id: SYMBOL,
                price: random_price(&mut rng, side),
                size: rng.gen_range(1u32..200),
                aggressor: side,
            };
            encoder::trade(sequence, &print).to_vec()
        };

        output.write_all(&msg)?;
        bytes_written += msg.len();

        if i % 1000 == 0 && i > 0 {
            eprintln!("Generated {} messages", i);
        }
    }
    output.flush()?;

    eprintln!("Feed generation complete: {} messages", message_count);
    eprintln!("File size: {} bytes", bytes_written);

    Ok(())
}
