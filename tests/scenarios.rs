//! End-to-end lifecycle scenarios through the public `process` operation.

use marking_monitor::core::{OrderId, Symbol};
use marking_monitor::{Error, EventRecord, MarkingPositionMonitor};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn new_order(id: u64, symbol: &str, side: &str, qty: Decimal) -> EventRecord {
    EventRecord::new("NEW", id).with_order(symbol, side, qty)
}

fn abc() -> Symbol {
    Symbol::new("ABC")
}

#[test]
fn sell_reserved_at_new_and_filled() {
    let mut monitor = MarkingPositionMonitor::new();

    assert_eq!(monitor.process(new_order(1, "ABC", "SELL", dec!(100))).unwrap(), dec!(-100));
    assert_eq!(monitor.process(EventRecord::new("ORDER_ACK", 1)).unwrap(), dec!(-100));
    let fill = EventRecord::new("FILL", 1).with_fill(dec!(100), dec!(0));
    assert_eq!(monitor.process(fill).unwrap(), dec!(-100));
}

#[test]
fn rejected_buy_never_moves_position() {
    let mut monitor = MarkingPositionMonitor::new();

    assert_eq!(monitor.process(new_order(2, "XYZ", "BUY", dec!(50))).unwrap(), dec!(0));
    assert_eq!(monitor.process(EventRecord::new("ORDER_REJECT", 2)).unwrap(), dec!(0));
}

#[test]
fn rejected_sell_restores_position() {
    let mut monitor = MarkingPositionMonitor::new();
    monitor.process(new_order(10, "ABC", "SELL", dec!(7))).unwrap();

    assert_eq!(monitor.process(new_order(11, "ABC", "SELL", dec!(40))).unwrap(), dec!(-47));
    assert_eq!(monitor.process(EventRecord::new("ORDER_REJECT", 11)).unwrap(), dec!(-7));
}

#[test]
fn acked_buy_cancel_round_trip() {
    let mut monitor = MarkingPositionMonitor::new();
    monitor.process(new_order(1, "ABC", "SELL", dec!(100))).unwrap();

    assert_eq!(monitor.process(new_order(3, "ABC", "BUY", dec!(20))).unwrap(), dec!(-100));
    assert_eq!(monitor.process(EventRecord::new("ORDER_ACK", 3)).unwrap(), dec!(-80));
    assert_eq!(monitor.process(EventRecord::new("CANCEL", 3)).unwrap(), dec!(-80));
    assert!(monitor.is_cancel_pending(&OrderId::from(3)));
    assert_eq!(monitor.process(EventRecord::new("CANCEL_ACK", 3)).unwrap(), dec!(-100));
    assert!(!monitor.is_cancel_pending(&OrderId::from(3)));
}

#[test]
fn sell_cancel_ack_releases_reservation() {
    let mut monitor = MarkingPositionMonitor::new();
    monitor.process(new_order(4, "ABC", "SELL", dec!(15))).unwrap();
    monitor.process(EventRecord::new("ORDER_ACK", 4)).unwrap();
    monitor.process(EventRecord::new("CANCEL", 4)).unwrap();

    assert_eq!(monitor.process(EventRecord::new("CANCEL_ACK", 4)).unwrap(), dec!(0));
}

#[test]
fn cancel_resolution_without_request_is_noop() {
    let mut monitor = MarkingPositionMonitor::new();
    monitor.process(new_order(5, "ABC", "BUY", dec!(10))).unwrap();
    monitor.process(EventRecord::new("ORDER_ACK", 5)).unwrap();

    assert_eq!(monitor.process(EventRecord::new("CANCEL_ACK", 5)).unwrap(), dec!(10));
    assert_eq!(monitor.process(EventRecord::new("CANCEL_REJECT", 5)).unwrap(), dec!(10));
    let order = monitor.order(&OrderId::from(5)).unwrap();
    assert_eq!(order.resolution, None);
    assert!(order.acknowledged);
}

#[test]
fn duplicate_cancel_ack_does_not_double_reverse() {
    let mut monitor = MarkingPositionMonitor::new();
    monitor.process(new_order(6, "ABC", "BUY", dec!(10))).unwrap();
    monitor.process(EventRecord::new("ORDER_ACK", 6)).unwrap();
    monitor.process(EventRecord::new("CANCEL", 6)).unwrap();
    monitor.process(EventRecord::new("CANCEL", 6)).unwrap();

    assert_eq!(monitor.process(EventRecord::new("CANCEL_ACK", 6)).unwrap(), dec!(0));
    assert_eq!(monitor.process(EventRecord::new("CANCEL_ACK", 6)).unwrap(), dec!(0));
}

#[test]
fn unknown_order_leaves_ledger_untouched() {
    let mut monitor = MarkingPositionMonitor::new();
    monitor.process(new_order(1, "ABC", "SELL", dec!(100))).unwrap();
    let before = monitor.positions();

    for kind in ["ORDER_ACK", "ORDER_REJECT", "CANCEL", "CANCEL_ACK", "CANCEL_REJECT"] {
        let err = monitor.process(EventRecord::new(kind, 999)).unwrap_err();
        assert!(matches!(err, Error::UnknownOrder(ref id) if id.as_str() == "999"));
    }
    let fill = EventRecord::new("FILL", 999).with_fill(dec!(1), dec!(0));
    assert!(matches!(monitor.process(fill), Err(Error::UnknownOrder(_))));

    assert_eq!(monitor.positions(), before);
    assert!(!monitor.is_cancel_pending(&OrderId::from(999)));
}

#[test]
fn unknown_kind_leaves_ledger_untouched() {
    let mut monitor = MarkingPositionMonitor::new();
    monitor.process(new_order(1, "ABC", "SELL", dec!(100))).unwrap();
    monitor.process(new_order(2, "XYZ", "BUY", dec!(5))).unwrap();
    let before = monitor.positions();

    let err = monitor.process(EventRecord::new("UNKNOWN", 1)).unwrap_err();
    assert!(matches!(err, Error::UnknownEventKind(ref k) if k == "UNKNOWN"));
    assert_eq!(monitor.positions(), before);
}

#[test]
fn duplicate_new_rejected() {
    let mut monitor = MarkingPositionMonitor::new();
    monitor.process(new_order(1, "ABC", "SELL", dec!(100))).unwrap();

    let err = monitor.process(new_order(1, "XYZ", "BUY", dec!(1))).unwrap_err();
    assert!(matches!(err, Error::DuplicateOrder(_)));
    assert_eq!(monitor.position(&abc()), dec!(-100));
    assert!(!monitor.positions().contains_key(&Symbol::new("XYZ")));
    assert_eq!(monitor.order_count(), 1);
}

#[test]
fn malformed_new_touches_nothing() {
    let mut monitor = MarkingPositionMonitor::new();
    let mut record = new_order(1, "ABC", "SELL", dec!(100));
    record.quantity = None;

    assert!(matches!(
        monitor.process(record),
        Err(Error::MalformedEvent { .. })
    ));
    assert_eq!(monitor.order_count(), 0);
    assert!(monitor.positions().is_empty());
}

#[test]
fn monitor_usable_after_errors() {
    let mut monitor = MarkingPositionMonitor::new();
    assert!(monitor.process(EventRecord::new("ORDER_ACK", 1)).is_err());
    assert!(monitor.on_message("{").is_err());

    assert_eq!(monitor.process(new_order(1, "ABC", "BUY", dec!(3))).unwrap(), dec!(0));
    assert_eq!(monitor.process(EventRecord::new("ORDER_ACK", 1)).unwrap(), dec!(3));
}

#[test]
fn instruments_are_independent() {
    let mut monitor = MarkingPositionMonitor::new();
    monitor.process(new_order(1, "ABC", "SELL", dec!(100))).unwrap();
    monitor.process(new_order(2, "XYZ", "BUY", dec!(50))).unwrap();

    assert_eq!(monitor.process(EventRecord::new("ORDER_ACK", 2)).unwrap(), dec!(50));
    assert_eq!(monitor.position(&abc()), dec!(-100));
}

#[test]
fn json_messages_with_string_ids() {
    let mut monitor = MarkingPositionMonitor::new();
    let lines = [
        r#"{"type":"NEW","order_id":"A7","symbol":"abc","side":"BUY","quantity":2.5}"#,
        r#"{"type":"ORDER_ACK","order_id":"A7"}"#,
        r#"{"type":"FILL","order_id":"A7","filled_quantity":1,"remaining_quantity":1.5}"#,
    ];
    let positions: Vec<Decimal> = lines
        .iter()
        .map(|l| monitor.on_message(l).unwrap())
        .collect();

    assert_eq!(positions, vec![dec!(0), dec!(2.5), dec!(2.5)]);
    assert_eq!(monitor.positions(), monitor.recomputed_positions());
}

#[test]
fn overflowing_events_are_refused_whole() {
    let mut monitor = MarkingPositionMonitor::new();
    let max = Decimal::MAX.to_string();
    monitor
        .on_message(&format!(
            r#"{{"type":"NEW","order_id":1,"symbol":"ABC","side":"SELL","quantity":"{}"}}"#,
            max
        ))
        .unwrap();

    let fill = format!(
        r#"{{"type":"FILL","order_id":1,"filled_quantity":"{0}","remaining_quantity":"{0}"}}"#,
        max
    );
    assert!(matches!(monitor.on_message(&fill), Err(Error::InvalidFill { .. })));

    let second = new_order(2, "ABC", "SELL", Decimal::MAX);
    assert!(matches!(monitor.process(second), Err(Error::MalformedEvent { .. })));
    assert!(monitor.order(&OrderId::from(2)).is_none());
    assert_eq!(monitor.position(&abc()), Decimal::MIN);

    // still usable afterwards
    assert_eq!(monitor.process(EventRecord::new("ORDER_REJECT", 1)).unwrap(), dec!(0));
    assert_eq!(monitor.positions(), monitor.recomputed_positions());
}

#[test]
fn message_without_type_is_malformed() {
    let mut monitor = MarkingPositionMonitor::new();
    let err = monitor.on_message(r#"{"order_id":1}"#).unwrap_err();
    assert!(matches!(err, Error::MalformedEvent { ref reason, .. } if reason == "missing type"));
    let err = monitor
        .on_message(r#"{"type":"NEW","order_id":1,"symbol":"ABC","side":5,"quantity":1}"#)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedEvent { .. }));
    assert_eq!(monitor.order_count(), 0);
}
