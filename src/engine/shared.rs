//! Thread-safe handle around a single monitor.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::MarkingPositionMonitor;
use crate::core::{Result, Symbol};
use crate::event::EventRecord;

/// Cloneable handle; each call holds the lock for the whole read-modify-write
/// across registry and ledger.
#[derive(Debug, Clone, Default)]
pub struct SharedMonitor {
    inner: Arc<Mutex<MarkingPositionMonitor>>,
}

impl SharedMonitor {
    pub fn new(monitor: MarkingPositionMonitor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(monitor)),
        }
    }

    pub fn process(&self, record: EventRecord) -> Result<Decimal> {
        self.inner.lock().process(record)
    }

    pub fn position(&self, symbol: &Symbol) -> Decimal {
        self.inner.lock().position(symbol)
    }
}
