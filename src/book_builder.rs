/// Order book builder from incremental updates
///
/// Maintains per-side price level aggregates in `BTreeMap`s plus an order-id
/// lookup table. Bids are keyed by `Reverse(price)` so the first entry of
/// either side is always the best price.
///
/// Anomalies (duplicate add, unknown cancel, bad side byte) leave the book
/// untouched, are counted in `BookStats` and returned as `BookError`.
///
/// Quotes write the aggregate at the quoted price directly. They do not go
/// through the lookup table, so no cancel can ever remove a quoted level.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

use log::warn;
use thiserror::Error;

use crate::config::BookConfig;
use crate::protocol::{price_from_fixed, Message, OrderAdd, OrderCancel, Quote, Side, Trade};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    #[error("duplicate order id: {0}")]
    DuplicateOrder(u64),

    #[error("order not found: {0}")]
    UnknownOrder(u64),

    #[error("invalid side byte {side:#04x} on order {order_id}")]
    InvalidSide { order_id: u64, side: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub order_id: u64,
    pub symbol_id: u32,
    pub price: i64, // fixed-point
    pub size: u32,
    pub side: Side,
}

/// Anomaly and activity counters; all cumulative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookStats {
    pub orders_added: u64,
    pub orders_cancelled: u64,
    pub duplicate_adds: u64,
    pub unknown_cancels: u64,
    pub invalid_sides: u64,
    pub quotes_applied: u64,
    pub trades: u64,
}

impl BookStats {
    /// Sum of every rejected book event
    pub fn anomalies(&self) -> u64 {
        self.duplicate_adds + self.unknown_cancels + self.invalid_sides
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastTrade {
    pub price: i64,
    pub size: u32,
    pub aggressor: Option<Side>,
}

/// Order book - maintains all orders organized by price level
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    config: BookConfig,

    // price -> total size at that level, best price first on both sides
    // totals are u64 so many u32-sized orders at one price cannot saturate
    bids: BTreeMap<Reverse<i64>, u64>,
    asks: BTreeMap<i64, u64>,

    // order_id -> full order details
    orders: HashMap<u64, Order>,

    last_trade: Option<LastTrade>,
    traded_volume: u64,
    stats: BookStats,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    pub fn with_config(config: BookConfig) -> Self {
        OrderBook {
            config,
            ..Default::default()
        }
    }

    /// Apply any validated message
    pub fn apply(&mut self, msg: &Message) -> Result<(), BookError> {
        match msg {
            Message::OrderAdd(m) => self.on_order_add(m),
            Message::OrderCancel(m) => self.on_order_cancel(m),
            Message::Quote(m) => {
                self.on_quote(m);
                Ok(())
            }
            Message::Trade(m) => {
                self.on_trade(m);
                Ok(())
            }
        }
    }

    pub fn on_order_add(&mut self, msg: &OrderAdd) -> Result<(), BookError> {
        let order_id = msg.order_id();
        let side = match msg.side() {
            Some(side) => side,
            None => {
                self.stats.invalid_sides += 1;
                return Err(self.anomaly(BookError::InvalidSide {
                    order_id,
                    side: msg.raw_side(),
                }));
            }
        };

        self.add_order(Order {
            order_id,
            symbol_id: msg.symbol_id(),
            price: msg.price(),
            size: msg.size(),
            side,
        })
    }

    /// Insert an order that did not arrive off the wire
    pub fn add_order(&mut self, order: Order) -> Result<(), BookError> {
        if self.orders.contains_key(&order.order_id) {
            self.stats.duplicate_adds += 1;
            return Err(self.anomaly(BookError::DuplicateOrder(order.order_id)));
        }

        match order.side {
            Side::Buy => {
                let level = self.bids.entry(Reverse(order.price)).or_insert(0);
                *level += order.size as u64;
            }
            Side::Sell => {
                let level = self.asks.entry(order.price).or_insert(0);
                *level += order.size as u64;
            }
        }
        // a zero-size add must not leave an empty level behind
        if order.size == 0 {
            self.remove_if_empty(order.side, order.price);
        }

        self.orders.insert(order.order_id, order);
        self.stats.orders_added += 1;
        Ok(())
    }

    pub fn on_order_cancel(&mut self, msg: &OrderCancel) -> Result<(), BookError> {
        self.cancel_order(msg.order_id()).map(|_| ())
    }

    /// Remove an order by id, returning it
    pub fn cancel_order(&mut self, order_id: u64) -> Result<Order, BookError> {
        let order = match self.orders.remove(&order_id) {
            Some(order) => order,
            None => {
                self.stats.unknown_cancels += 1;
                return Err(self.anomaly(BookError::UnknownOrder(order_id)));
            }
        };

        match order.side {
            Side::Buy => {
                if let Some(level) = self.bids.get_mut(&Reverse(order.price)) {
                    *level = level.saturating_sub(order.size as u64);
                }
            }
            Side::Sell => {
                if let Some(level) = self.asks.get_mut(&order.price) {
                    *level = level.saturating_sub(order.size as u64);
                }
            }
        }
        self.remove_if_empty(order.side, order.price);

        self.stats.orders_cancelled += 1;
        Ok(order)
    }

    /// Overwrite the aggregate at each quoted price; size 0 removes the level
    pub fn on_quote(&mut self, msg: &Quote) {
        if let Some((price, size)) = msg.bid() {
            self.set_level(Side::Buy, price, size);
        }
        if let Some((price, size)) = msg.ask() {
            self.set_level(Side::Sell, price, size);
        }
        self.stats.quotes_applied += 1;
    }

    /// Record the print; resting orders and levels are left alone
    pub fn on_trade(&mut self, msg: &Trade) {
        self.last_trade = Some(LastTrade {
            price: msg.price(),
            size: msg.size(),
            aggressor: msg.aggressor(),
        });
        self.traded_volume += msg.size() as u64;
        self.stats.trades += 1;
    }

    fn set_level(&mut self, side: Side, price: i64, size: u32) {
        match (side, size) {
            (Side::Buy, 0) => {
                self.bids.remove(&Reverse(price));
            }
            (Side::Buy, _) => {
                self.bids.insert(Reverse(price), size as u64);
            }
            (Side::Sell, 0) => {
                self.asks.remove(&price);
            }
            (Side::Sell, _) => {
                self.asks.insert(price, size as u64);
            }
        }
    }

    fn remove_if_empty(&mut self, side: Side, price: i64) {
        match side {
            Side::Buy => {
                if self.bids.get(&Reverse(price)) == Some(&0) {
                    self.bids.remove(&Reverse(price));
                }
            }
            Side::Sell => {
                if self.asks.get(&price) == Some(&0) {
                    self.asks.remove(&price);
                }
            }
        }
    }

    fn anomaly(&self, err: BookError) -> BookError {
        if self.config.log_anomalies {
            warn!("book anomaly: {}", err);
        }
        err
    }

    /// Best (highest) bid price
    pub fn best_bid(&self) -> Option<i64> {
        self.bids.keys().next().map(|&Reverse(price)| price)
    }

    /// Best (lowest) ask price
    pub fn best_ask(&self) -> Option<i64> {
        self.asks.keys().next().copied()
    }

    /// Best bid price and aggregate size
    pub fn best_bid_level(&self) -> Option<(i64, u64)> {
        self.bids
            .iter()
            .next()
            .map(|(&Reverse(price), &size)| (price, size))
    }

    /// Best ask price and aggregate size
    pub fn best_ask_level(&self) -> Option<(i64, u64)> {
        self.asks.iter().next().map(|(&price, &size)| (price, size))
    }

    /// True when both sides have at least one level
    pub fn market_available(&self) -> bool {
        !self.bids.is_empty() && !self.asks.is_empty()
    }

    /// Best ask minus best bid in fixed-point units.
    ///
    /// Returns 0 when either side is empty; check `market_available` to tell
    /// that apart from a locked market. Negative when the book is crossed.
    /// Saturates at the `i64` bounds for prices at opposite extremes.
    pub fn spread(&self) -> i64 {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.saturating_sub(bid),
            _ => 0,
        }
    }

    pub fn is_crossed(&self) -> bool {
        matches!((self.best_bid(), self.best_ask()), (Some(bid), Some(ask)) if bid >= ask)
    }

    /// Midpoint of best bid and ask, odd spreads round toward the bid
    pub fn mid_price(&self) -> Option<i64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => {
                let (bid, ask) = (bid as i128, ask as i128);
                // lies between bid and ask, so it always fits back in i64
                Some((bid + (ask - bid) / 2) as i64)
            }
            _ => None,
        }
    }

    /// Top n levels on each side, best first
    pub fn depth(&self, n: usize) -> BookDepth {
        let bids = self
            .bids
            .iter()
            .take(n)
            .map(|(&Reverse(p), &q)| (p, q))
            .collect();

        let asks = self
            .asks
            .iter()
            .take(n)
            .map(|(&p, &q)| (p, q))
            .collect();

        BookDepth { bids, asks }
    }

    /// Aggregate size resting at `price` on `side`, 0 when there is no level
    pub fn level_size(&self, side: Side, price: i64) -> u64 {
        match side {
            Side::Buy => self.bids.get(&Reverse(price)).copied().unwrap_or(0),
            Side::Sell => self.asks.get(&price).copied().unwrap_or(0),
        }
    }

    /// All levels on one side, best first
    pub fn levels(&self, side: Side) -> Vec<(i64, u64)> {
        match side {
            Side::Buy => self.bids.iter().map(|(&Reverse(p), &q)| (p, q)).collect(),
            Side::Sell => self.asks.iter().map(|(&p, &q)| (p, q)).collect(),
        }
    }

    pub fn order(&self, order_id: u64) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    pub fn last_trade(&self) -> Option<LastTrade> {
        self.last_trade
    }

    pub fn traded_volume(&self) -> u64 {
        self.traded_volume
    }

    pub fn stats(&self) -> BookStats {
        self.stats
    }

    /// Drop every level and order; counters are kept
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
        self.last_trade = None;
    }

    /// Render the top n levels of each side as text
    pub fn write_top_levels<W: Write>(&self, out: &mut W, n: usize) -> io::Result<()> {
        let depth = self.depth(n);
        writeln!(out, "{:>14} {:>10} | {:<14} {:<10}", "BID", "SIZE", "ASK", "SIZE")?;
        for i in 0..depth.bids.len().max(depth.asks.len()) {
            let bid = depth.bids.get(i);
            let ask = depth.asks.get(i);
            let (bid_px, bid_sz) = match bid {
                Some(&(p, q)) => (format!("{:.4}", price_from_fixed(p)), q.to_string()),
                None => ("-".to_string(), "-".to_string()),
            };
            let (ask_px, ask_sz) = match ask {
                Some(&(p, q)) => (format!("{:.4}", price_from_fixed(p)), q.to_string()),
                None => ("-".to_string(), "-".to_string()),
            };
            writeln!(out, "{:>14} {:>10} | {:<14} {:<10}", bid_px, bid_sz, ask_px, ask_sz)?;
        }
        if self.market_available() {
            writeln!(out, "spread: {:.4}", price_from_fixed(self.spread()))?;
        } else {
            writeln!(out, "spread: n/a")?;
        }
        Ok(())
    }

    /// Print the top n levels to stdout
    pub fn print_top_levels(&self, n: usize) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = self.write_top_levels(&mut out, n) {
            warn!("failed to print book: {}", e);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDepth {
    pub bids: Vec<(i64, u64)>,
    pub asks: Vec<(i64, u64)>,
}
