/// Wire encoder
///
/// Writes fixed-size messages in the feed's binary layout. The feed handler
/// only reads; this side exists for synthetic feeds, tests and benchmarks.

use byteorder::{ByteOrder, LittleEndian};

use crate::book_builder::Order;
use crate::protocol::*;

/// Quote contents; a `None` side is left out of the message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteUpdate {
    pub symbol_id: u32,
    pub bid: Option<(i64, u32)>,
    pub ask: Option<(i64, u32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradePrint {
    pub symbol_id: u32,
    pub price: i64,
    pub size: u32,
    pub aggressor: Side,
}

fn write_header(buf: &mut [u8], msg_type: MessageType, sequence: u32) {
    buf[0] = msg_type as u8;
    LittleEndian::write_u16(&mut buf[1..3], msg_type.wire_len() as u16);
    LittleEndian::write_u32(&mut buf[3..7], sequence);
}

pub fn order_add(sequence: u32, order: &Order) -> [u8; ORDER_ADD_LEN] {
    let mut buf = [0u8; ORDER_ADD_LEN];
    write_header(&mut buf, MessageType::OrderAdd, sequence);
    LittleEndian::write_u64(&mut buf[8..16], order.order_id);
    LittleEndian::write_u32(&mut buf[16..20], order.symbol_id);
    LittleEndian::write_i64(&mut buf[20..28], order.price);
    LittleEndian::write_u32(&mut buf[28..32], order.size);
    buf[32] = order.side.as_u8();
    buf
}

pub fn order_cancel(sequence: u32, order_id: u64, symbol_id: u32) -> [u8; ORDER_CANCEL_LEN] {
    let mut buf = [0u8; ORDER_CANCEL_LEN];
    write_header(&mut buf, MessageType::OrderCancel, sequence);
    LittleEndian::write_u64(&mut buf[8..16], order_id);
    LittleEndian::write_u32(&mut buf[16..20], symbol_id);
    buf
}

pub fn quote(sequence: u32, update: &QuoteUpdate) -> [u8; QUOTE_LEN] {
    let mut buf = [0u8; QUOTE_LEN];
    write_header(&mut buf, MessageType::Quote, sequence);
    LittleEndian::write_u32(&mut buf[8..12], update.symbol_id);

    let mut flags = 0u8;
    if let Some((price, size)) = update.bid {
        flags |= QUOTE_HAS_BID;
        LittleEndian::write_i64(&mut buf[16..24], price);
        LittleEndian::write_u32(&mut buf[24..28], size);
    }
    if let Some((price, size)) = update.ask {
        flags |= QUOTE_HAS_ASK;
        LittleEndian::write_u32(&mut buf[28..32], size);
        LittleEndian::write_i64(&mut buf[32..40], price);
    }
    buf[12] = flags;
    buf
}

pub fn trade(sequence: u32, print: &TradePrint) -> [u8; TRADE_LEN] {
    let mut buf = [0u8; TRADE_LEN];
    write_header(&mut buf, MessageType::Trade, sequence);
    LittleEndian::write_u32(&mut buf[8..12], print.symbol_id);
    LittleEndian::write_u32(&mut buf[12..16], print.size);
    LittleEndian::write_i64(&mut buf[16..24], print.price);
    buf[24] = print.aggressor.as_u8();
    buf
}
