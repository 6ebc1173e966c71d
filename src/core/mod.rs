//! Core module - Common types, configuration and error handling

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, CancelPolicy, MonitorConfig};
pub use error::{Error, Result};
pub use types::*;
