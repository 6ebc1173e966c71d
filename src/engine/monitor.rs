//! Event Dispatcher - routes each event to its lifecycle handler and reports
//! the affected instrument's marking position.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::handlers::{self, Books};
use super::registry::Order;
use crate::codec;
use crate::core::{MonitorConfig, OrderId, Result, Side, Symbol};
use crate::event::{Event, EventKind, EventRecord};

/// Outcome of one applied event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionUpdate {
    pub kind: EventKind,
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub position: Decimal,
}

/// Per-instrument marking position state machine.
///
/// Single-threaded: `process` runs to completion and callers serialise access
/// per instance (see [`super::SharedMonitor`] and [`crate::ipc`]).
#[derive(Debug, Default)]
pub struct MarkingPositionMonitor {
    books: Books,
}

impl MarkingPositionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        Self {
            books: Books::new(config.unmatched_cancel),
        }
    }

    /// Apply one event record and return the updated position of the
    /// instrument it affected.
    pub fn process(&mut self, record: EventRecord) -> Result<Decimal> {
        Ok(self.process_update(record)?.position)
    }

    /// Like [`Self::process`] but also reports which order and instrument
    /// the event touched.
    pub fn process_update(&mut self, record: EventRecord) -> Result<PositionUpdate> {
        let event = Event::try_from(record)?;
        self.apply_update(event)
    }

    /// Decode one JSON event and process it.
    pub fn on_message(&mut self, message: &str) -> Result<Decimal> {
        let record = codec::decode_record(message)?;
        self.process(record)
    }

    /// Apply an already-validated event.
    pub fn apply(&mut self, event: Event) -> Result<Decimal> {
        Ok(self.apply_update(event)?.position)
    }

    pub fn apply_update(&mut self, event: Event) -> Result<PositionUpdate> {
        let kind = event.kind();
        let order_id = event.order_id().clone();
        let books = &mut self.books;
        let symbol = match event {
            Event::New {
                order_id,
                symbol,
                side,
                quantity,
            } => handlers::on_new(books, order_id, symbol, side, quantity)?,
            Event::OrderAck { order_id } => handlers::on_order_ack(books, &order_id)?,
            Event::OrderReject { order_id } => handlers::on_order_reject(books, &order_id)?,
            Event::Cancel { order_id } => handlers::on_cancel(books, &order_id)?,
            Event::CancelAck { order_id } => handlers::on_cancel_ack(books, &order_id)?,
            Event::CancelReject { order_id } => handlers::on_cancel_reject(books, &order_id)?,
            Event::Fill {
                order_id,
                filled_quantity,
                remaining_quantity,
            } => handlers::on_fill(books, &order_id, filled_quantity, remaining_quantity)?,
        };

        let position = self.books.ledger.get(&symbol);
        Ok(PositionUpdate {
            kind,
            order_id,
            symbol,
            position,
        })
    }

    /// Current marking position (zero for unseen instruments).
    pub fn position(&self, symbol: &Symbol) -> Decimal {
        self.books.ledger.get(symbol)
    }

    /// Sorted copy of every instrument's marking position.
    pub fn positions(&self) -> BTreeMap<Symbol, Decimal> {
        self.books.ledger.snapshot()
    }

    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.books.registry.get(order_id).ok()
    }

    pub fn is_cancel_pending(&self, order_id: &OrderId) -> bool {
        self.books.cancels.is_pending(order_id)
    }

    pub fn order_count(&self) -> usize {
        self.books.registry.len()
    }

    pub fn pending_cancels(&self) -> usize {
        self.books.cancels.len()
    }

    /// Recompute every position from the order records. Sums saturate; the
    /// handlers refuse any event whose position would not fit.
    pub fn recomputed_positions(&self) -> BTreeMap<Symbol, Decimal> {
        let mut totals: BTreeMap<Symbol, Decimal> = BTreeMap::new();
        for order in self.books.registry.iter() {
            let total = totals.entry(order.instrument.clone()).or_insert(Decimal::ZERO);
            let contribution = order.contribution().unwrap_or(match order.side {
                Side::Buy => Decimal::MAX,
                Side::Sell => Decimal::MIN,
            });
            *total = total.saturating_add(contribution);
        }
        totals
    }
}
