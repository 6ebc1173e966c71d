//! Error handling - Hierarchical, zero-cost errors

use thiserror::Error;

use super::types::OrderId;

pub type Result<T> = std::result::Result<T, Error>;

/// Monitor error hierarchy.
///
/// Every variant raised by the engine is detected before any state is
/// touched, so a failed call leaves the monitor exactly as it was.
#[derive(Debug, Error)]
pub enum Error {
    /// `type` is not one of the seven lifecycle kinds
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    /// Event references an order the registry has never seen
    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),

    /// NEW reuses an existing order id
    #[error("Duplicate order: {0}")]
    DuplicateOrder(OrderId),

    /// Required field missing or invalid for the event kind
    #[error("Malformed {kind} event: {reason}")]
    MalformedEvent { kind: String, reason: String },

    /// Fill quantities inconsistent with the order's open quantity
    #[error("Invalid fill for order {order_id}: {reason}")]
    InvalidFill { order_id: OrderId, reason: String },

    /// Cancel resolution without a pending cancel (strict policy only)
    #[error("No outstanding cancel for order {0}")]
    NoOutstandingCancel(OrderId),

    /// Codec errors
    #[error("Decode: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config: {0}")]
    Config(String),

    /// IO errors (drivers only)
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedEvent {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}
