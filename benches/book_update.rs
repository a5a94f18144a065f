/// Order book update latency benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use market_data_handler::{BookConfig, Order, OrderBook, Side};

fn quiet_book() -> OrderBook {
    OrderBook::with_config(BookConfig::default().with_log_anomalies(false))
}

fn populated_book(levels: i64) -> OrderBook {
    let mut book = quiet_book();
    for i in 0..levels {
        let _ = book.add_order(Order {
            order_id: i as u64,
            symbol_id: 1,
            price: 100_00000000 - i * 1_000000,
            size: 100,
            side: Side::Buy,
        });
        let _ = book.add_order(Order {
            order_id: (levels + i) as u64,
            symbol_id: 1,
            price: 100_01000000 + i * 1_000000,
            size: 100,
            side: Side::Sell,
        });
    }
    book
}

fn bench_add_cancel(c: &mut Criterion) {
    c.bench_function("book_add_then_cancel", |b| {
        let mut book = populated_book(100);
        let mut order_id = 1_000_000u64;

        b.iter(|| {
            let _ = book.add_order(Order {
                order_id,
                symbol_id: 1,
                price: 99_50000000 + (order_id % 64) as i64,
                size: 10,
                side: Side::Buy,
            });
            let _ = book.cancel_order(order_id);
            order_id += 1;
        });
    });
}

fn bench_best_bid(c: &mut Criterion) {
    let book = populated_book(100);
    c.bench_function("book_best_bid", |b| b.iter(|| black_box(book.best_bid())));
}

fn bench_best_ask(c: &mut Criterion) {
    let book = populated_book(100);
    c.bench_function("book_best_ask", |b| b.iter(|| black_box(book.best_ask())));
}

fn bench_spread(c: &mut Criterion) {
    let book = populated_book(100);
    c.bench_function("book_spread", |b| b.iter(|| black_box(book.spread())));
}

fn bench_depth(c: &mut Criterion) {
    let book = populated_book(100);
    c.bench_function("book_depth_10", |b| b.iter(|| black_box(book.depth(10))));
}

criterion_group!(
    benches,
    bench_add_cancel,
    bench_best_bid,
    bench_best_ask,
    bench_spread,
    bench_depth
);
criterion_main!(benches);
