/// Protocol conformance and parser tests

use byteorder::{ByteOrder, LittleEndian};
use market_data_handler::encoder;
use market_data_handler::{
    Message, MessageParser, MessageType, OrderAdd, OrderCancel, ParseError, ParserConfig, Quote,
    QuoteUpdate, Side, Trade, TradePrint,
};

fn parser() -> MessageParser {
    MessageParser::with_config(ParserConfig::default().with_log_anomalies(false))
}

fn cancel(seq: u32) -> [u8; 24] {
    encoder::order_cancel(seq, 500, 1)
}

#[test]
fn test_parse_order_add_fields() {
    let mut parser = parser();
    let bytes = encoder::order_add(
        1,
        &market_data_handler::Order {
            order_id: 42,
            symbol_id: 7,
            price: 101_25000000,
            size: 300,
            side: Side::Sell,
        },
    );

    let msg = parser.parse(&bytes).unwrap();
    assert_eq!(msg.message_type(), MessageType::OrderAdd);
    assert_eq!(msg.sequence(), 1);

    let add = msg.cast::<OrderAdd>().unwrap();
    assert_eq!(add.order_id(), 42);
    assert_eq!(add.symbol_id(), 7);
    assert_eq!(add.price(), 101_25000000);
    assert_eq!(add.size(), 300);
    assert_eq!(add.side(), Some(Side::Sell));
}

#[test]
fn test_parse_quote_and_trade() {
    let mut parser = parser();
    let quote = encoder::quote(
        1,
        &QuoteUpdate {
            symbol_id: 3,
            bid: Some((99, 10)),
            ask: Some((101, 20)),
        },
    );
    let trade = encoder::trade(
        2,
        &TradePrint {
            symbol_id: 3,
            price: 100,
            size: 5,
            aggressor: Side::Buy,
        },
    );

    let q = parser.parse(&quote).unwrap().cast::<Quote>().unwrap();
    assert_eq!(q.symbol_id(), 3);
    assert_eq!(q.bid(), Some((99, 10)));
    assert_eq!(q.ask(), Some((101, 20)));

    let t = parser.parse(&trade).unwrap().cast::<Trade>().unwrap();
    assert_eq!(t.price(), 100);
    assert_eq!(t.size(), 5);
    assert_eq!(t.aggressor(), Some(Side::Buy));
}

#[test]
fn test_short_buffer_counts_exactly_one_invalid() {
    let mut parser = parser();
    for len in 0..8 {
        let before = parser.invalid_messages();
        let buf = vec![1u8; len];
        let result = parser.parse(&buf);
        assert!(matches!(result, Err(ParseError::BufferTooSmall { .. })));
        assert_eq!(parser.invalid_messages(), before + 1);
    }
}

#[test]
fn test_unknown_type_is_invalid() {
    let mut parser = parser();
    let mut msg = cancel(1);
    msg[0] = 0;
    assert!(matches!(
        parser.parse(&msg),
        Err(ParseError::InvalidMessageType(0))
    ));
    assert_eq!(parser.invalid_messages(), 1);
}

#[test]
fn test_length_mismatch_is_invalid() {
    let mut parser = parser();

    // an OrderAdd discriminant on a cancel-sized buffer
    let mut msg = cancel(1);
    msg[0] = MessageType::OrderAdd as u8;
    assert!(matches!(
        parser.parse(&msg),
        Err(ParseError::LengthMismatch {
            msg_type: MessageType::OrderAdd,
            expected: 36,
            actual: 24
        })
    ));

    // trailing byte after a valid cancel
    let mut long = cancel(1).to_vec();
    long.push(0);
    assert!(matches!(
        parser.parse(&long),
        Err(ParseError::LengthMismatch { .. })
    ));

    assert_eq!(parser.invalid_messages(), 2);
    assert_eq!(parser.accepted_messages(), 0);
}

#[test]
fn test_in_order_sequence_has_no_gaps() {
    let mut parser = parser();
    for seq in 1..=3 {
        assert!(parser.parse(&cancel(seq)).is_ok());
    }
    assert_eq!(parser.sequence_gaps(), 0);
    assert_eq!(parser.last_sequence(), 3);
}

#[test]
fn test_gap_is_counted_and_accepted() {
    let mut parser = parser();
    assert!(parser.parse(&cancel(1)).is_ok());
    assert!(parser.parse(&cancel(3)).is_ok());
    assert_eq!(parser.sequence_gaps(), 1);
    assert!(parser.parse(&cancel(4)).is_ok());

    assert_eq!(parser.sequence_gaps(), 1);
    assert_eq!(parser.gap_events(), 1);
    assert_eq!(parser.accepted_messages(), 3);
    assert_eq!(parser.invalid_messages(), 0);
    assert!(parser.is_in_gap(2));
    assert_eq!(parser.gaps().collect::<Vec<_>>(), vec![(2, 2)]);
}

#[test]
fn test_gap_counts_every_missing_number() {
    let mut parser = parser();
    parser.parse(&cancel(1)).unwrap();
    parser.parse(&cancel(10)).unwrap();
    assert_eq!(parser.sequence_gaps(), 8);
    assert_eq!(parser.gap_events(), 1);
}

#[test]
fn test_duplicate_sequence_rejected() {
    let mut parser = parser();
    parser.parse(&cancel(1)).unwrap();
    assert_eq!(
        parser.parse(&cancel(1)).unwrap_err(),
        ParseError::StaleSequence {
            sequence: 1,
            last: 1
        }
    );
    assert_eq!(parser.last_sequence(), 1);
    assert_eq!(parser.invalid_messages(), 1);
}

#[test]
fn test_out_of_order_does_not_rewind() {
    let mut parser = parser();
    parser.parse(&cancel(1)).unwrap();
    parser.parse(&cancel(5)).unwrap();
    assert!(parser.parse(&cancel(3)).is_err());
    assert_eq!(parser.last_sequence(), 5);
    // 6 is still the next expected number
    assert!(parser.parse(&cancel(6)).is_ok());
    assert_eq!(parser.sequence_gaps(), 3);
}

#[test]
fn test_sequence_zero_is_stale_by_default() {
    let mut parser = parser();
    assert!(matches!(
        parser.parse(&cancel(0)),
        Err(ParseError::StaleSequence { sequence: 0, last: 0 })
    ));
}

#[test]
fn test_start_sequence_baseline() {
    let mut parser = MessageParser::with_config(
        ParserConfig::default()
            .with_start_sequence(100)
            .with_log_anomalies(false),
    );
    assert!(parser.parse(&cancel(100)).is_err());
    assert!(parser.parse(&cancel(101)).is_ok());
    assert_eq!(parser.sequence_gaps(), 0);
}

#[test]
fn test_counters_are_cumulative() {
    let mut parser = parser();
    parser.parse(&cancel(1)).unwrap();
    let _ = parser.parse(&[0u8; 2]);
    parser.parse(&cancel(4)).unwrap();
    let _ = parser.parse(&cancel(4));
    parser.parse(&cancel(7)).unwrap();

    assert_eq!(parser.invalid_messages(), 2);
    assert_eq!(parser.sequence_gaps(), 4);
    assert_eq!(parser.accepted_messages(), 3);
}

#[test]
fn test_cast_mismatch_is_an_error() {
    let mut parser = parser();
    let bytes = cancel(1);
    let msg: Message = parser.parse(&bytes).unwrap();
    assert!(msg.cast::<OrderCancel>().is_ok());
    assert!(msg.cast::<Quote>().is_err());
    assert!(msg.as_order_add().is_none());
}

#[test]
fn test_rejected_type_does_not_touch_sequence() {
    let mut parser = parser();
    let mut bad = cancel(1);
    bad[0] = 42;
    let _ = parser.parse(&bad);
    assert_eq!(parser.last_sequence(), 0);
    assert!(parser.parse(&cancel(1)).is_ok());
    assert_eq!(parser.sequence_gaps(), 0);
}

#[test]
fn test_every_type_has_one_length() {
    for msg_type in MessageType::ALL {
        let len = msg_type.wire_len();
        let mut msg = vec![0u8; len];
        msg[0] = msg_type as u8;
        LittleEndian::write_u16(&mut msg[1..3], len as u16);
        LittleEndian::write_u32(&mut msg[3..7], 1);

        let mut p = parser();
        let parsed = p.parse(&msg).unwrap();
        assert_eq!(parsed.message_type(), msg_type);

        for wrong in [len - 1, len + 1] {
            let mut other = vec![0u8; wrong];
            other[0] = msg_type as u8;
            LittleEndian::write_u32(&mut other[3..7], 2);
            assert!(parser().parse(&other).is_err(), "{:?} at {}", msg_type, wrong);
        }
    }
}
