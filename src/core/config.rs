//! Configuration management for crashprobe
//!
//! Supports environment variables, config files, and CLI overrides.
//!
//! Config file location: ~/.config/crashprobe/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{CrashProbeError, Result};

/// Main configuration for crashprobe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Verbose logging
    #[serde(default)]
    pub debug: bool,
    /// Appium server configuration
    pub appium: AppiumConfig,
    /// Device and app capabilities
    pub device: DeviceConfig,
    /// Telemetry backend configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Scenario timing
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

/// Appium server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppiumConfig {
    /// Base URL of the Appium server (default: http://127.0.0.1:4723)
    pub url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Capabilities for the device session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub platform_name: String,
    pub automation_name: String,
    pub device_name: String,
    /// Path or URL of the APK to install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    /// Android package, also used to relaunch the app on Appium 2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_activity: Option<String>,
    pub new_command_timeout_secs: u64,
    /// Keep app data between sessions
    pub no_reset: bool,
    /// Additional capabilities passed through unchanged
    #[serde(default)]
    pub extra_capabilities: serde_json::Map<String, serde_json::Value>,
}

/// Telemetry backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// DSN of the ingest project. Reporting is disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// Upper bound for flushing pending events at shutdown
    pub shutdown_timeout_secs: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Scenario timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Wait after relaunching the app so the crash report can be delivered.
    /// Delivery rarely succeeds below 2 seconds.
    pub flush_wait_secs: u64,
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: env_flag("CRASHPROBE_DEBUG"),
            appium: AppiumConfig::default(),
            device: DeviceConfig::default(),
            telemetry: TelemetryConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

impl Default for AppiumConfig {
    fn default() -> Self {
        let host = env::var("APPIUM_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("APPIUM_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4723);
        Self {
            url: format!("http://{}:{}", host, port),
            timeout_secs: 60,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            platform_name: "Android".to_string(),
            automation_name: "UiAutomator2".to_string(),
            device_name: env::var("CRASHPROBE_DEVICE_NAME")
                .unwrap_or_else(|_| "emulator-5554".to_string()),
            app: env::var("CRASHPROBE_APP").ok(),
            app_package: env::var("CRASHPROBE_APP_PACKAGE").ok(),
            app_activity: env::var("CRASHPROBE_APP_ACTIVITY").ok(),
            new_command_timeout_secs: 120,
            no_reset: true,
            extra_capabilities: serde_json::Map::new(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            dsn: env::var("SENTRY_DSN").ok().filter(|d| !d.is_empty()),
            release: env::var("SENTRY_RELEASE").ok(),
            environment: env::var("SENTRY_ENVIRONMENT")
                .unwrap_or_else(|_| "production".to_string()),
            server_name: None,
            shutdown_timeout_secs: 2,
            timeout_secs: 10,
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            flush_wait_secs: env::var("CRASHPROBE_FLUSH_WAIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crashprobe")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    ///
    /// A malformed config file is an error, a missing one is not.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_or_default(&Self::config_file())
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CrashProbeError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CrashProbeError::config(format!("Failed to parse config: {}", e)))
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CrashProbeError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to the default file and return its path
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| CrashProbeError::config(format!("Failed to create config dir: {}", e)))?;
        }

        fs::write(&config_path, self.to_toml()?)
            .map_err(|e| CrashProbeError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Reject settings the scenario cannot run with
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.appium.url)
            .map_err(|e| CrashProbeError::config(format!("Invalid Appium URL '{}': {}", self.appium.url, e)))?;
        if !url.scheme().starts_with("http") {
            return Err(CrashProbeError::config(format!(
                "Appium URL must be http(s), got '{}'",
                self.appium.url
            )));
        }
        if self.device.platform_name.trim().is_empty() {
            return Err(CrashProbeError::config("platform_name must not be empty"));
        }
        if self.scenario.flush_wait_secs == 0 {
            return Err(CrashProbeError::config("flush_wait_secs must be at least 1"));
        }
        Ok(())
    }

    /// Appium base URL without a trailing slash
    pub fn appium_url(&self) -> &str {
        self.appium.url.trim_end_matches('/')
    }

    pub fn flush_wait(&self) -> Duration {
        Duration::from_secs(self.scenario.flush_wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.device.platform_name, "Android");
        assert_eq!(config.device.automation_name, "UiAutomator2");
        assert_eq!(config.telemetry.shutdown_timeout_secs, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip_keeps_capabilities() {
        let mut config = Config::default();
        config.device.app_package = Some("com.example.rn".into());
        config
            .device
            .extra_capabilities
            .insert("appium:autoGrantPermissions".into(), true.into());

        let text = config.to_toml().unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.device.app_package.as_deref(), Some("com.example.rn"));
        assert_eq!(
            parsed.device.extra_capabilities["appium:autoGrantPermissions"],
            serde_json::Value::Bool(true)
        );
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let config = Config::from_toml(
            r#"
            [appium]
            url = "http://10.0.2.2:4723/wd/hub/"
            timeout_secs = 30

            [device]
            platform_name = "Android"
            automation_name = "UiAutomator2"
            device_name = "Pixel_7"
            new_command_timeout_secs = 60
            no_reset = false
            "#,
        )
        .unwrap();

        assert_eq!(config.appium_url(), "http://10.0.2.2:4723/wd/hub");
        assert_eq!(config.device.device_name, "Pixel_7");
        assert!(config.telemetry.shutdown_timeout_secs > 0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.scenario.flush_wait_secs = 0;
        assert!(matches!(config.validate(), Err(CrashProbeError::Config(_))));

        let mut config = Config::default();
        config.appium.url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.appium.url = "ftp://host".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.device.platform_name, "Android");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[appium\nurl = ").unwrap();

        match Config::load_or_default(&path) {
            Err(CrashProbeError::Config(msg)) => assert!(msg.contains("Failed to parse config")),
            other => panic!("unexpected result: {:?}", other.map(|c| c.appium.url)),
        }
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("crashprobe"));
    }
}
