//! Custom error types for crashprobe
//!
//! One error enum shared by the driver, telemetry and scenario modules.

use thiserror::Error;

use crate::core::types::Locator;

/// Main error type for crashprobe operations
#[derive(Error, Debug)]
pub enum CrashProbeError {
    /// Error body returned by the automation endpoint
    #[error("WebDriver error ({status}) {error}: {message}")]
    WebDriver {
        status: u16,
        error: String,
        message: String,
    },

    /// Element lookup found nothing
    #[error("No element found for {0}")]
    ElementNotFound(Locator),

    /// Session could not be created or is unusable
    #[error("Session error: {0}")]
    Session(String),

    /// Telemetry setup or delivery errors
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A scenario step failed
    #[error("Step '{label}' failed")]
    Step {
        label: String,
        #[source]
        source: Box<CrashProbeError>,
    },

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for crashprobe operations
pub type Result<T> = std::result::Result<T, CrashProbeError>;

impl CrashProbeError {
    /// Create a session error
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Create a telemetry error
    pub fn telemetry(msg: impl Into<String>) -> Self {
        Self::Telemetry(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error as the failure of a named step
    pub fn step(label: impl Into<String>, source: CrashProbeError) -> Self {
        Self::Step {
            label: label.into(),
            source: Box::new(source),
        }
    }

    /// Variant name, used as the exception type in telemetry events
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WebDriver { .. } => "WebDriverError",
            Self::ElementNotFound(_) => "ElementNotFound",
            Self::Session(_) => "SessionError",
            Self::Telemetry(_) => "TelemetryError",
            Self::Config(_) => "ConfigError",
            Self::Step { .. } => "StepFailed",
            Self::Json(_) => "JsonError",
            Self::Http(_) => "HttpError",
            Self::Io(_) => "IoError",
            Self::Other(_) => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_step_keeps_source() {
        let err = CrashProbeError::step(
            "trigger crash",
            CrashProbeError::ElementNotFound(Locator::xpath("//a")),
        );
        assert_eq!(err.to_string(), "Step 'trigger crash' failed");
        assert_eq!(err.kind(), "StepFailed");

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "No element found for xpath=//a");
    }

    #[test]
    fn test_webdriver_display() {
        let err = CrashProbeError::WebDriver {
            status: 500,
            error: "unknown error".into(),
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "WebDriver error (500) unknown error: boom");
    }
}
