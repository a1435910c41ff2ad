//! Scenario module
//!
//! A scenario is an ordered list of device steps. The runner stops at the
//! first failing step, hands the error to the reporter and returns an
//! outcome. It never fails itself: crash report arrival is checked on the
//! telemetry backend, not by the exit status.

mod native_crash;

use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::{CrashProbeError, EventId, Locator, Result};
use crate::driver::DeviceSession;
use crate::telemetry::Reporter;

pub use native_crash::{CRASH_TRIGGER_TEXT, LIST_SCREEN_TEXT};

/// What a step does
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Find an element and click it
    Tap(Locator),
    /// Bring the app back to the foreground
    RelaunchApp,
    /// Sleep for a fixed duration
    Wait(Duration),
}

/// A labelled action
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub label: String,
    pub action: Action,
}

impl Step {
    pub fn tap(label: impl Into<String>, locator: Locator) -> Self {
        Self {
            label: label.into(),
            action: Action::Tap(locator),
        }
    }

    pub fn relaunch(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: Action::RelaunchApp,
        }
    }

    pub fn wait(label: impl Into<String>, duration: Duration) -> Self {
        Self {
            label: label.into(),
            action: Action::Wait(duration),
        }
    }

    async fn execute(&self, session: &dyn DeviceSession) -> Result<()> {
        match &self.action {
            Action::Tap(locator) => {
                let element = session.find_element(locator).await?;
                session.click(&element).await
            }
            Action::RelaunchApp => session.launch_app().await,
            Action::Wait(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(())
            }
        }
    }
}

/// Named sequence of steps
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

/// Result of running a scenario
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioOutcome {
    /// Every step ran
    Completed { steps: usize },
    /// A step failed and its error was handed to the reporter
    Captured {
        step: usize,
        label: String,
        error: String,
        event_id: Option<EventId>,
    },
}

impl ScenarioOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed { steps } => write!(f, "completed {} steps", steps),
            Self::Captured {
                step,
                label,
                error,
                event_id,
            } => {
                write!(f, "step {} ({}) failed: {}", step + 1, label, error)?;
                match event_id {
                    Some(id) => write!(f, " [reported as {}]", id),
                    None => write!(f, " [not reported]"),
                }
            }
        }
    }
}

/// Run the scenario. Step failures are reported, never returned.
pub async fn run(
    session: &dyn DeviceSession,
    reporter: &dyn Reporter,
    scenario: &Scenario,
) -> ScenarioOutcome {
    info!(scenario = %scenario.name, steps = scenario.steps.len(), "Running scenario");

    for (index, step) in scenario.steps.iter().enumerate() {
        info!(step = index + 1, label = %step.label, "Step");

        if let Err(e) = step.execute(session).await {
            let err = CrashProbeError::step(&step.label, e);
            warn!(step = index + 1, "{}", err);

            let event_id = reporter.capture_error(&err);
            let error = match std::error::Error::source(&err) {
                Some(source) => source.to_string(),
                None => err.to_string(),
            };

            return ScenarioOutcome::Captured {
                step: index,
                label: step.label.clone(),
                error,
                event_id,
            };
        }
    }

    ScenarioOutcome::Completed {
        steps: scenario.steps.len(),
    }
}
