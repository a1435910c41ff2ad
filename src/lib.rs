//! crashprobe - native crash delivery check for React Native apps
//!
//! Drives an Android emulator through a React Native test app over Appium,
//! triggers a native crash, relaunches the app so the SDK flushes the crash
//! report, and waits for delivery. Failures while driving the device are
//! reported to a Sentry-compatible backend instead of failing the run.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Driver**: Device session trait and the Appium HTTP client
//! - **Telemetry**: Error reporting to the ingest backend
//! - **Scenario**: Step runner and the built-in native crash scenario
//! - **CLI**: Command handlers
//!
//! # Usage
//!
//! ```rust,no_run
//! use crashprobe::driver::AppiumSession;
//! use crashprobe::scenario::{self, Scenario};
//! use crashprobe::telemetry::NoopReporter;
//! use crashprobe::Config;
//!
//! #[tokio::main]
//! async fn main() -> crashprobe::Result<()> {
//!     let config = Config::load()?;
//!     let session = AppiumSession::start(&config).await?;
//!
//!     let scenario = Scenario::native_crash(config.flush_wait());
//!     let outcome = scenario::run(&session, &NoopReporter, &scenario).await;
//!     println!("{}", outcome);
//!
//!     session.end().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod driver;
pub mod scenario;
pub mod telemetry;

// Re-export commonly used items
pub use core::{Config, CrashProbeError, Result};
pub use scenario::{Scenario, ScenarioOutcome};
