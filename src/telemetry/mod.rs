//! Telemetry module
//!
//! Errors hit while driving the device are reported to a Sentry-compatible
//! backend instead of failing the run. A process-wide reporter is installed
//! once with [`init`]; the scenario runner also accepts any [`Reporter`]
//! directly.

pub mod dsn;
pub mod event;
mod sentry;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{info, warn};

use crate::core::config::TelemetryConfig;
use crate::core::{CrashProbeError, EventId, Result};

pub use dsn::Dsn;
pub use event::{Event, EventContext};
pub use sentry::SentryReporter;

/// Destination for captured errors
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Record an error. Returns the event id when an event was queued.
    fn capture_error(&self, err: &(dyn StdError + 'static)) -> Option<EventId>;

    /// Wait for queued events to be delivered. Returns false on timeout.
    async fn flush(&self, timeout: Duration) -> bool;
}

/// Reporter used when no DSN is configured
#[derive(Debug, Default)]
pub struct NoopReporter;

#[async_trait]
impl Reporter for NoopReporter {
    fn capture_error(&self, err: &(dyn StdError + 'static)) -> Option<EventId> {
        warn!("Telemetry disabled, error not reported: {}", err);
        None
    }

    async fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

/// Build the reporter described by the config
pub fn reporter_from_config(config: &TelemetryConfig) -> Result<Arc<dyn Reporter>> {
    match config.dsn {
        Some(_) => Ok(Arc::new(SentryReporter::from_config(config)?)),
        None => Ok(Arc::new(NoopReporter)),
    }
}

static REPORTER: OnceLock<Arc<dyn Reporter>> = OnceLock::new();

/// Flushes the process-wide reporter on shutdown
pub struct TelemetryGuard {
    reporter: Arc<dyn Reporter>,
    timeout: Duration,
}

impl TelemetryGuard {
    pub fn reporter(&self) -> Arc<dyn Reporter> {
        Arc::clone(&self.reporter)
    }

    /// Flush pending events. Returns false if some did not finish in time.
    pub async fn shutdown(self) -> bool {
        let flushed = self.reporter.flush(self.timeout).await;
        if !flushed {
            warn!("Telemetry flush timed out after {:?}", self.timeout);
        }
        flushed
    }
}

/// Install the process-wide reporter. Only the first call installs one.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard> {
    let reporter = reporter_from_config(config)?;
    if REPORTER.set(Arc::clone(&reporter)).is_err() {
        return Err(CrashProbeError::telemetry("Telemetry already initialized"));
    }

    match &config.dsn {
        Some(_) => info!("Telemetry enabled"),
        None => info!("Telemetry disabled, no DSN configured"),
    }

    Ok(TelemetryGuard {
        reporter,
        timeout: Duration::from_secs(config.shutdown_timeout_secs),
    })
}

/// Report an error through the process-wide reporter
pub fn capture_error(err: &(dyn StdError + 'static)) -> Option<EventId> {
    match REPORTER.get() {
        Some(reporter) => reporter.capture_error(err),
        None => {
            warn!("Telemetry not initialized, error not reported: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_reporter() {
        let reporter = NoopReporter;
        let err = CrashProbeError::Other("boom".into());
        assert!(reporter.capture_error(&err).is_none());
        assert!(tokio_test::block_on(reporter.flush(Duration::from_millis(1))));
    }

    #[test]
    fn test_reporter_from_config_rejects_bad_dsn() {
        let config = TelemetryConfig {
            dsn: Some("nope".into()),
            ..TelemetryConfig::default()
        };
        assert!(reporter_from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_init_once() {
        let config = TelemetryConfig {
            dsn: None,
            ..TelemetryConfig::default()
        };
        let guard = init(&config).unwrap();
        assert!(REPORTER.get().is_some());
        assert!(init(&config).is_err());

        let err = CrashProbeError::Other("boom".into());
        assert!(capture_error(&err).is_none());
        assert!(guard.shutdown().await);
    }
}
