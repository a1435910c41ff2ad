//! CLI commands
//!
//! Handlers behind the `crashprobe` subcommands.

use std::sync::Arc;
use tracing::info;

use crate::core::{Config, Result};
use crate::driver::AppiumSession;
use crate::scenario::{self, Scenario, ScenarioOutcome};
use crate::telemetry::{self, Reporter};

/// Start a session, run the native crash scenario and flush telemetry.
///
/// Only session setup errors are returned; scenario failures end up in the
/// outcome.
pub async fn run_native_crash(config: &Config) -> Result<ScenarioOutcome> {
    config.validate()?;

    let guard = telemetry::init(&config.telemetry)?;
    let reporter: Arc<dyn Reporter> = guard.reporter();

    let session = AppiumSession::start(config).await?;
    info!(session = %session.id(), "Session started");

    let scenario = Scenario::native_crash(config.flush_wait());
    let outcome = scenario::run(&session, reporter.as_ref(), &scenario).await;

    session.end().await;
    guard.shutdown().await;

    Ok(outcome)
}

/// Render the effective configuration
pub fn show_config(config: &Config) -> Result<String> {
    config.to_toml()
}

/// Write the given configuration to the default config file
pub fn init_config(config: &Config) -> Result<String> {
    let path = config.save()?;
    Ok(format!("Config written to {}", path.display()))
}

/// One-line summary printed after a run
pub fn summary(outcome: &ScenarioOutcome) -> String {
    match outcome {
        ScenarioOutcome::Completed { .. } => format!("nativecrash: {}", outcome),
        ScenarioOutcome::Captured { .. } => format!("nativecrash: {} (run still passes)", outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventId;

    #[test]
    fn test_summary() {
        let done = ScenarioOutcome::Completed { steps: 4 };
        assert_eq!(summary(&done), "nativecrash: completed 4 steps");

        let captured = ScenarioOutcome::Captured {
            step: 0,
            label: "open list screen".into(),
            error: "no element".into(),
            event_id: Some(EventId::from_u128(2)),
        };
        assert_eq!(
            summary(&captured),
            "nativecrash: step 1 (open list screen) failed: no element \
             [reported as 00000000000000000000000000000002] (run still passes)"
        );
    }

    #[test]
    fn test_show_config_is_toml() {
        let text = show_config(&Config::default()).unwrap();
        assert!(text.contains("[appium]"));
        assert!(text.contains("flush_wait_secs"));
    }
}
