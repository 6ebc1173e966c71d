//! Marking Position Monitor - Core Library
//! Per-instrument marking positions driven by order-lifecycle events

// Public modules
pub mod codec;
pub mod core;
pub mod engine;
pub mod event;
pub mod ipc;

// Re-exports
pub use crate::core::{AppConfig, Error, Result};
pub use engine::{MarkingPositionMonitor, PositionUpdate, SharedMonitor};
pub use event::{Event, EventKind, EventRecord};
