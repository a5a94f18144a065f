/// Parse throughput and latency benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use market_data_handler::encoder;
use market_data_handler::{
    frames, MessageParser, Order, ParserConfig, QuoteUpdate, Side, TradePrint,
};

fn quiet_parser() -> MessageParser {
    MessageParser::with_config(ParserConfig::default().with_log_anomalies(false))
}

fn create_message_buffer(msg_count: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(msg_count * 36);

    for i in 0..msg_count {
        let order = Order {
            order_id: i as u64,
            symbol_id: 1,
            price: 100_00000000,
            size: 100,
            side: Side::Buy,
        };
        buffer.extend_from_slice(&encoder::order_add(i as u32 + 1, &order));
    }

    buffer
}

fn bench_parse_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_throughput");

    for msg_count in [1000, 10000, 100000].iter() {
        let buffer = black_box(create_message_buffer(*msg_count));

        group.bench_with_input(
            BenchmarkId::from_parameter(msg_count),
            msg_count,
            |b, _| {
                b.iter(|| {
                    let mut parser = quiet_parser();
                    let mut count = 0;
                    for frame in frames(&buffer) {
                        if parser.parse(frame).is_ok() {
                            count += 1;
                        }
                    }
                    count
                });
            },
        );
    }
    group.finish();
}

fn bench_parse_message_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_types");

    let add = encoder::order_add(
        1,
        &Order {
            order_id: 1,
            symbol_id: 1,
            price: 100_00000000,
            size: 100,
            side: Side::Sell,
        },
    );
    let cancel = encoder::order_cancel(1, 1, 1);
    let quote = encoder::quote(
        1,
        &QuoteUpdate {
            symbol_id: 1,
            bid: Some((99_00000000, 10)),
            ask: Some((101_00000000, 10)),
        },
    );
    let trade = encoder::trade(
        1,
        &TradePrint {
            symbol_id: 1,
            price: 100_00000000,
            size: 10,
            aggressor: Side::Buy,
        },
    );

    // fresh parser per batch so sequence 1 is always the next expected
    let cases: [(&str, &[u8]); 4] = [
        ("order_add", &add),
        ("order_cancel", &cancel),
        ("quote", &quote),
        ("trade", &trade),
    ];
    for (name, bytes) in cases {
        group.bench_function(name, |b| {
            b.iter_batched(
                quiet_parser,
                |mut parser| parser.parse(black_box(bytes)).is_ok(),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_reject_short(c: &mut Criterion) {
    let mut parser = quiet_parser();
    let short = [1u8; 4];
    c.bench_function("reject_short_buffer", |b| {
        b.iter(|| parser.parse(black_box(&short)).is_err())
    });
}

criterion_group!(
    benches,
    bench_parse_throughput,
    bench_parse_message_types,
    bench_reject_short
);
criterion_main!(benches);
