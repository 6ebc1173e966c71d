//! Order Registry - per-order records keyed by order id

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::core::{Error, OrderId, Result, Side, Symbol};

/// Why an order's open exposure was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Rejected,
    Cancelled,
}

/// One order as seen by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_id: OrderId,
    pub instrument: Symbol,
    pub side: Side,
    /// Quantity committed at NEW; never changes.
    pub reserved_quantity: Decimal,
    pub acknowledged: bool,
    /// Reserved quantity not yet filled or released.
    pub open_quantity: Decimal,
    /// Cumulative executed quantity.
    pub filled_quantity: Decimal,
    pub resolution: Option<Resolution>,
}

impl Order {
    pub fn new(order_id: OrderId, instrument: Symbol, side: Side, quantity: Decimal) -> Self {
        Self {
            order_id,
            instrument,
            side,
            reserved_quantity: quantity,
            acknowledged: false,
            open_quantity: quantity,
            filled_quantity: Decimal::ZERO,
            resolution: None,
        }
    }

    /// Whether the open quantity currently counts toward the marking position.
    ///
    /// Sells count from NEW, buys only once acknowledged; a rejected or
    /// cancelled order's open quantity never counts.
    pub fn open_recognised(&self) -> bool {
        self.resolution.is_none() && (self.acknowledged || self.side == Side::Sell)
    }

    /// Signed quantity this order adds to its instrument's marking position,
    /// or `None` if it does not fit in a `Decimal`.
    pub fn contribution(&self) -> Option<Decimal> {
        let open = if self.open_recognised() {
            self.open_quantity
        } else {
            Decimal::ZERO
        };
        let exposure = self.filled_quantity.checked_add(open)?;
        Some(match self.side {
            Side::Buy => exposure,
            Side::Sell => -exposure,
        })
    }
}

/// Registry of every order seen. Orders are never removed.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: HashMap<OrderId, Order>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new order, refusing to overwrite an existing id.
    pub fn insert(&mut self, order: Order) -> Result<()> {
        if self.orders.contains_key(&order.order_id) {
            return Err(Error::DuplicateOrder(order.order_id));
        }
        self.orders.insert(order.order_id.clone(), order);
        Ok(())
    }

    /// Lookup-or-fail.
    pub fn get(&self, order_id: &OrderId) -> Result<&Order> {
        self.orders
            .get(order_id)
            .ok_or_else(|| Error::UnknownOrder(order_id.clone()))
    }

    /// Replace the stored record for an existing order.
    pub fn update(&mut self, order: Order) -> Result<()> {
        match self.orders.get_mut(&order.order_id) {
            Some(slot) => {
                *slot = order;
                Ok(())
            }
            None => Err(Error::UnknownOrder(order.order_id)),
        }
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.orders.contains_key(order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }
}
