//! Core module - shared infrastructure for crashprobe
//!
//! Configuration, error handling and the small value types passed between
//! the driver, telemetry and scenario modules.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{CrashProbeError, Result};
pub use types::*;
