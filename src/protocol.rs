/// Binary wire format for the market data feed
///
/// Fixed header: 8 bytes
///   - msg_type: u8 (1 byte)
///   - length: u16 (2 bytes) - total message length including header
///   - sequence: u32 (4 bytes) - monotonically increasing sequence number
///   - padding: u8 (1 byte)
///
/// Every message type has exactly one wire length; there are no variable
/// length fields. All integers are little-endian.
///
/// The views below borrow the validated bytes and read fields on demand,
/// so nothing is copied out of the receive buffer.

use byteorder::{ByteOrder, LittleEndian};

pub const HEADER_SIZE: usize = 8;

pub const ORDER_ADD_LEN: usize = 36;
pub const ORDER_CANCEL_LEN: usize = 24;
pub const QUOTE_LEN: usize = 40;
pub const TRADE_LEN: usize = 32;

/// Fixed-point scale: prices carry 8 implied decimals
pub const PRICE_SCALE: i64 = 100_000_000;

pub const SIDE_BUY: u8 = b'B';
pub const SIDE_SELL: u8 = b'S';

pub const QUOTE_HAS_BID: u8 = 0x01;
pub const QUOTE_HAS_ASK: u8 = 0x02;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    OrderAdd = 1,
    OrderCancel = 2,
    Quote = 3,
    Trade = 4,
}

/// Number of message types on the wire
pub const MESSAGE_TYPE_COUNT: usize = 4;

impl MessageType {
    pub const ALL: [MessageType; MESSAGE_TYPE_COUNT] = [
        MessageType::OrderAdd,
        MessageType::OrderCancel,
        MessageType::Quote,
        MessageType::Trade,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(MessageType::OrderAdd),
            2 => Some(MessageType::OrderCancel),
            3 => Some(MessageType::Quote),
            4 => Some(MessageType::Trade),
            _ => None,
        }
    }

    /// Total wire length for this message type, header included
    pub const fn wire_len(self) -> usize {
        match self {
            MessageType::OrderAdd => ORDER_ADD_LEN,
            MessageType::OrderCancel => ORDER_CANCEL_LEN,
            MessageType::Quote => QUOTE_LEN,
            MessageType::Trade => TRADE_LEN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageType::OrderAdd => "order_add",
            MessageType::OrderCancel => "order_cancel",
            MessageType::Quote => "quote",
            MessageType::Trade => "trade",
        }
    }
}

/// Expected total length for a raw discriminant, zero for unknown types
pub fn expected_len(msg_type: u8) -> usize {
    MessageType::from_u8(msg_type).map_or(0, MessageType::wire_len)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            SIDE_BUY => Some(Side::Buy),
            SIDE_SELL => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Side::Buy => SIDE_BUY,
            Side::Sell => SIDE_SELL,
        }
    }
}

/// Common header view, valid for any buffer of at least `HEADER_SIZE` bytes
#[derive(Debug, Clone, Copy)]
pub struct MessageHeader<'a> {
    buf: &'a [u8],
}

impl<'a> MessageHeader<'a> {
    /// Returns `None` when the buffer cannot hold a header
    pub fn new(buf: &'a [u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(MessageHeader { buf })
    }

    pub fn msg_type(&self) -> u8 {
        self.buf[0]
    }

    pub fn length(&self) -> u16 {
        LittleEndian::read_u16(&self.buf[1..3])
    }

    pub fn sequence(&self) -> u32 {
        LittleEndian::read_u32(&self.buf[3..7])
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.buf
    }
}

/// Add a new order to the book
/// Total: 8 (header) + 28 = 36 bytes
#[derive(Debug, Clone, Copy)]
pub struct OrderAdd<'a> {
    buf: &'a [u8],
}

impl<'a> OrderAdd<'a> {
    pub fn header(&self) -> MessageHeader<'a> {
        MessageHeader { buf: self.buf }
    }

    pub fn order_id(&self) -> u64 {
        LittleEndian::read_u64(&self.buf[8..16])
    }

    pub fn symbol_id(&self) -> u32 {
        LittleEndian::read_u32(&self.buf[16..20])
    }

    pub fn price(&self) -> i64 {
        LittleEndian::read_i64(&self.buf[20..28])
    }

    pub fn size(&self) -> u32 {
        LittleEndian::read_u32(&self.buf[28..32])
    }

    pub fn raw_side(&self) -> u8 {
        self.buf[32]
    }

    /// `None` when the side byte is neither buy nor sell
    pub fn side(&self) -> Option<Side> {
        Side::from_u8(self.raw_side())
    }
}

/// Cancel a resting order
/// Total: 8 (header) + 16 = 24 bytes
#[derive(Debug, Clone, Copy)]
pub struct OrderCancel<'a> {
    buf: &'a [u8],
}

impl<'a> OrderCancel<'a> {
    pub fn header(&self) -> MessageHeader<'a> {
        MessageHeader { buf: self.buf }
    }

    pub fn order_id(&self) -> u64 {
        LittleEndian::read_u64(&self.buf[8..16])
    }

    pub fn symbol_id(&self) -> u32 {
        LittleEndian::read_u32(&self.buf[16..20])
    }
}

/// Top-of-book quote for one or both sides, not tied to any order
/// Total: 8 (header) + 32 = 40 bytes
#[derive(Debug, Clone, Copy)]
pub struct Quote<'a> {
    buf: &'a [u8],
}

impl<'a> Quote<'a> {
    pub fn header(&self) -> MessageHeader<'a> {
        MessageHeader { buf: self.buf }
    }

    pub fn symbol_id(&self) -> u32 {
        LittleEndian::read_u32(&self.buf[8..12])
    }

    pub fn flags(&self) -> u8 {
        self.buf[12]
    }

    /// (price, size) when the bid side is present
    pub fn bid(&self) -> Option<(i64, u32)> {
        if self.flags() & QUOTE_HAS_BID == 0 {
            return None;
        }
        Some((
            LittleEndian::read_i64(&self.buf[16..24]),
            LittleEndian::read_u32(&self.buf[24..28]),
        ))
    }

    /// (price, size) when the ask side is present
    pub fn ask(&self) -> Option<(i64, u32)> {
        if self.flags() & QUOTE_HAS_ASK == 0 {
            return None;
        }
        Some((
            LittleEndian::read_i64(&self.buf[32..40]),
            LittleEndian::read_u32(&self.buf[28..32]),
        ))
    }
}

/// Trade print
/// Total: 8 (header) + 24 = 32 bytes
#[derive(Debug, Clone, Copy)]
pub struct Trade<'a> {
    buf: &'a [u8],
}

impl<'a> Trade<'a> {
    pub fn header(&self) -> MessageHeader<'a> {
        MessageHeader { buf: self.buf }
    }

    pub fn symbol_id(&self) -> u32 {
        LittleEndian::read_u32(&self.buf[8..12])
    }

    pub fn size(&self) -> u32 {
        LittleEndian::read_u32(&self.buf[12..16])
    }

    pub fn price(&self) -> i64 {
        LittleEndian::read_i64(&self.buf[16..24])
    }

    pub fn aggressor(&self) -> Option<Side> {
        Side::from_u8(self.buf[24])
    }
}

/// A typed view over one validated message.
///
/// Only the parser builds these; the buffer length always matches the
/// variant's wire length.
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    OrderAdd(OrderAdd<'a>),
    OrderCancel(OrderCancel<'a>),
    Quote(Quote<'a>),
    Trade(Trade<'a>),
}

impl<'a> Message<'a> {
    /// Wrap a buffer whose length has already been checked against `msg_type`
    pub(crate) fn from_validated(msg_type: MessageType, buf: &'a [u8]) -> Self {
        debug_assert_eq!(buf.len(), msg_type.wire_len());
        match msg_type {
            MessageType::OrderAdd => Message::OrderAdd(OrderAdd { buf }),
            MessageType::OrderCancel => Message::OrderCancel(OrderCancel { buf }),
            MessageType::Quote => Message::Quote(Quote { buf }),
            MessageType::Trade => Message::Trade(Trade { buf }),
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Message::OrderAdd(_) => MessageType::OrderAdd,
            Message::OrderCancel(_) => MessageType::OrderCancel,
            Message::Quote(_) => MessageType::Quote,
            Message::Trade(_) => MessageType::Trade,
        }
    }

    pub fn header(&self) -> MessageHeader<'a> {
        match self {
            Message::OrderAdd(m) => m.header(),
            Message::OrderCancel(m) => m.header(),
            Message::Quote(m) => m.header(),
            Message::Trade(m) => m.header(),
        }
    }

    pub fn sequence(&self) -> u32 {
        self.header().sequence()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.header().as_bytes()
    }

    pub fn as_order_add(&self) -> Option<OrderAdd<'a>> {
        match self {
            Message::OrderAdd(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_order_cancel(&self) -> Option<OrderCancel<'a>> {
        match self {
            Message::OrderCancel(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_quote(&self) -> Option<Quote<'a>> {
        match self {
            Message::Quote(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_trade(&self) -> Option<Trade<'a>> {
        match self {
            Message::Trade(m) => Some(*m),
            _ => None,
        }
    }

    /// Checked downcast to a concrete view
    pub fn cast<T: TypedMessage<'a>>(&self) -> Result<T, TypeMismatch> {
        T::from_message(self).ok_or(TypeMismatch {
            expected: T::TYPE,
            actual: self.message_type(),
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("type mismatch: expected {expected:?}, message is {actual:?}")]
pub struct TypeMismatch {
    pub expected: MessageType,
    pub actual: MessageType,
}

/// Implemented by every concrete view so `Message::cast` can check the tag
pub trait TypedMessage<'a>: Sized {
    const TYPE: MessageType;

    fn from_message(msg: &Message<'a>) -> Option<Self>;
}

impl<'a> TypedMessage<'a> for OrderAdd<'a> {
    const TYPE: MessageType = MessageType::OrderAdd;

    fn from_message(msg: &Message<'a>) -> Option<Self> {
        msg.as_order_add()
    }
}

impl<'a> TypedMessage<'a> for OrderCancel<'a> {
    const TYPE: MessageType = MessageType::OrderCancel;

    fn from_message(msg: &Message<'a>) -> Option<Self> {
        msg.as_order_cancel()
    }
}

impl<'a> TypedMessage<'a> for Quote<'a> {
    const TYPE: MessageType = MessageType::Quote;

    fn from_message(msg: &Message<'a>) -> Option<Self> {
        msg.as_quote()
    }
}

impl<'a> TypedMessage<'a> for Trade<'a> {
    const TYPE: MessageType = MessageType::Trade;

    fn from_message(msg: &Message<'a>) -> Option<Self> {
        msg.as_trade()
    }
}

/// Convert price from fixed-point to float
pub fn price_from_fixed(fixed: i64) -> f64 {
    fixed as f64 / PRICE_SCALE as f64
}

/// Convert price to fixed-point
pub fn price_to_fixed(price: f64) -> i64 {
    (price * PRICE_SCALE as f64).round() as i64
}
