//! Order-lifecycle events.
//!
//! `EventRecord` is the loose shape a venue delivers (every payload field
//! optional, kind as text). `Event` is the closed, validated form the engine
//! consumes; converting one into the other is where unknown kinds and
//! missing fields are caught.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::{Error, OrderId, Result, Side, Symbol};

/// The seven lifecycle kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    New,
    OrderAck,
    OrderReject,
    Cancel,
    CancelAck,
    CancelReject,
    Fill,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::New => "NEW",
            EventKind::OrderAck => "ORDER_ACK",
            EventKind::OrderReject => "ORDER_REJECT",
            EventKind::Cancel => "CANCEL",
            EventKind::CancelAck => "CANCEL_ACK",
            EventKind::CancelReject => "CANCEL_REJECT",
            EventKind::Fill => "FILL",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NEW" => Ok(EventKind::New),
            "ORDER_ACK" => Ok(EventKind::OrderAck),
            "ORDER_REJECT" => Ok(EventKind::OrderReject),
            "CANCEL" => Ok(EventKind::Cancel),
            "CANCEL_ACK" => Ok(EventKind::CancelAck),
            "CANCEL_REJECT" => Ok(EventKind::CancelReject),
            "FILL" => Ok(EventKind::Fill),
            other => Err(Error::UnknownEventKind(other.to_string())),
        }
    }
}

/// Event record as delivered, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled_quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_quantity: Option<Decimal>,
}

impl EventRecord {
    pub fn new(kind: impl Into<String>, order_id: impl Into<OrderId>) -> Self {
        Self {
            kind: Some(kind.into()),
            order_id: Some(order_id.into()),
            ..Default::default()
        }
    }

    pub fn with_order(mut self, symbol: &str, side: &str, quantity: Decimal) -> Self {
        self.symbol = Some(symbol.to_string());
        self.side = Some(side.to_string());
        self.quantity = Some(quantity);
        self
    }

    pub fn with_fill(mut self, filled: Decimal, remaining: Decimal) -> Self {
        self.filled_quantity = Some(filled);
        self.remaining_quantity = Some(remaining);
        self
    }
}

/// Validated lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    New {
        order_id: OrderId,
        symbol: Symbol,
        side: Side,
        quantity: Decimal,
    },
    OrderAck { order_id: OrderId },
    OrderReject { order_id: OrderId },
    Cancel { order_id: OrderId },
    CancelAck { order_id: OrderId },
    CancelReject { order_id: OrderId },
    Fill {
        order_id: OrderId,
        filled_quantity: Decimal,
        remaining_quantity: Decimal,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::New { .. } => EventKind::New,
            Event::OrderAck { .. } => EventKind::OrderAck,
            Event::OrderReject { .. } => EventKind::OrderReject,
            Event::Cancel { .. } => EventKind::Cancel,
            Event::CancelAck { .. } => EventKind::CancelAck,
            Event::CancelReject { .. } => EventKind::CancelReject,
            Event::Fill { .. } => EventKind::Fill,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        match self {
            Event::New { order_id, .. }
            | Event::OrderAck { order_id }
            | Event::OrderReject { order_id }
            | Event::Cancel { order_id }
            | Event::CancelAck { order_id }
            | Event::CancelReject { order_id }
            | Event::Fill { order_id, .. } => order_id,
        }
    }
}

impl TryFrom<EventRecord> for Event {
    type Error = Error;

    fn try_from(record: EventRecord) -> Result<Self> {
        let kind: EventKind = record
            .kind
            .ok_or_else(|| Error::malformed("?", "missing type"))?
            .parse()?;
        let order_id = record
            .order_id
            .ok_or_else(|| Error::malformed(kind.as_str(), "missing order_id"))?;

        let event = match kind {
            EventKind::New => {
                let symbol = record
                    .symbol
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| Error::malformed(kind.as_str(), "missing symbol"))?;
                let side: Side = record
                    .side
                    .ok_or_else(|| Error::malformed(kind.as_str(), "missing side"))?
                    .parse()
                    .map_err(|e: String| Error::malformed(kind.as_str(), e))?;
                let quantity = record
                    .quantity
                    .ok_or_else(|| Error::malformed(kind.as_str(), "missing quantity"))?;
                if quantity <= Decimal::ZERO {
                    return Err(Error::malformed(
                        kind.as_str(),
                        format!("quantity must be positive, got {}", quantity),
                    ));
                }
                Event::New {
                    order_id,
                    symbol: Symbol::new(symbol.trim()),
                    side,
                    quantity,
                }
            }
            EventKind::OrderAck => Event::OrderAck { order_id },
            EventKind::OrderReject => Event::OrderReject { order_id },
            EventKind::Cancel => Event::Cancel { order_id },
            EventKind::CancelAck => Event::CancelAck { order_id },
            EventKind::CancelReject => Event::CancelReject { order_id },
            EventKind::Fill => {
                let filled_quantity = record
                    .filled_quantity
                    .ok_or_else(|| Error::malformed(kind.as_str(), "missing filled_quantity"))?;
                let remaining_quantity = record.remaining_quantity.ok_or_else(|| {
                    Error::malformed(kind.as_str(), "missing remaining_quantity")
                })?;
                if filled_quantity < Decimal::ZERO || remaining_quantity < Decimal::ZERO {
                    return Err(Error::malformed(
                        kind.as_str(),
                        "fill quantities must be non-negative",
                    ));
                }
                Event::Fill {
                    order_id,
                    filled_quantity,
                    remaining_quantity,
                }
            }
        };

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_record_validates() {
        let record = EventRecord::new("NEW", 1).with_order("abc", "SELL", dec!(100));
        let event = Event::try_from(record).unwrap();
        assert_eq!(
            event,
            Event::New {
                order_id: OrderId::from(1),
                symbol: Symbol::new("ABC"),
                side: Side::Sell,
                quantity: dec!(100),
            }
        );
    }

    #[test]
    fn test_unknown_kind_wins_over_missing_fields() {
        let record = EventRecord {
            kind: Some("UNKNOWN".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Event::try_from(record),
            Err(Error::UnknownEventKind(k)) if k == "UNKNOWN"
        ));
    }

    #[test]
    fn test_new_missing_side() {
        let mut record = EventRecord::new("NEW", 1).with_order("ABC", "BUY", dec!(5));
        record.side = None;
        let err = Event::try_from(record).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent { ref reason, .. } if reason == "missing side"));
    }

    #[test]
    fn test_new_rejects_non_positive_quantity() {
        let record = EventRecord::new("NEW", 1).with_order("ABC", "BUY", dec!(0));
        assert!(matches!(
            Event::try_from(record),
            Err(Error::MalformedEvent { .. })
        ));
    }

    #[test]
    fn test_fill_requires_both_quantities() {
        let mut record = EventRecord::new("FILL", 7).with_fill(dec!(10), dec!(0));
        record.remaining_quantity = None;
        assert!(matches!(
            Event::try_from(record),
            Err(Error::MalformedEvent { .. })
        ));
    }

    #[test]
    fn test_missing_type() {
        let record = EventRecord {
            order_id: Some(OrderId::from(1)),
            ..Default::default()
        };
        assert!(matches!(
            Event::try_from(record),
            Err(Error::MalformedEvent { ref reason, .. }) if reason == "missing type"
        ));
    }

    #[test]
    fn test_missing_order_id() {
        let record = EventRecord {
            kind: Some("ORDER_ACK".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Event::try_from(record),
            Err(Error::MalformedEvent { ref kind, .. }) if kind == "ORDER_ACK"
        ));
    }

    #[test]
    fn test_kind_round_trips_through_text() {
        for kind in [
            EventKind::New,
            EventKind::OrderAck,
            EventKind::OrderReject,
            EventKind::Cancel,
            EventKind::CancelAck,
            EventKind::CancelReject,
            EventKind::Fill,
        ] {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }
}
