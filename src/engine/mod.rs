//! Marking position engine
//! Order registry, cancel tracker and position ledger driven by lifecycle events

pub mod cancels;
pub mod handlers;
pub mod ledger;
pub mod monitor;
pub mod registry;
pub mod shared;

pub use monitor::{MarkingPositionMonitor, PositionUpdate};
pub use registry::{Order, Resolution};
pub use shared::SharedMonitor;
