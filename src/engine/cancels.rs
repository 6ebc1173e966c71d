//! Cancel Tracker - orders with an unresolved cancel request

use std::collections::HashSet;

use crate::core::OrderId;

#[derive(Debug, Default)]
pub struct CancelTracker {
    pending: HashSet<OrderId>,
}

impl CancelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cancel request. Returns false if one was already pending.
    pub fn request(&mut self, order_id: OrderId) -> bool {
        self.pending.insert(order_id)
    }

    /// Resolve a pending cancel. Returns false if none was pending.
    pub fn resolve(&mut self, order_id: &OrderId) -> bool {
        self.pending.remove(order_id)
    }

    pub fn is_pending(&self, order_id: &OrderId) -> bool {
        self.pending.contains(order_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
