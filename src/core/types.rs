//! Shared types used across crashprobe modules
//!
//! Element locators, element handles and telemetry event ids.

use serde::Serialize;
use std::fmt;

/// Element lookup strategy understood by Appium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    XPath,
    Id,
    AccessibilityId,
    ClassName,
    AndroidUiAutomator,
}

impl LocatorStrategy {
    /// Strategy string sent in the `using` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::XPath => "xpath",
            Self::Id => "id",
            Self::AccessibilityId => "accessibility id",
            Self::ClassName => "class name",
            Self::AndroidUiAutomator => "-android uiautomator",
        }
    }
}

/// How to find one element on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl Locator {
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::XPath, value)
    }

    /// XPath matching an Android TextView by its exact text
    pub fn text_view(text: &str) -> Self {
        Self::xpath(format!("//android.widget.TextView[@text=\"{}\"]", text))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.value)
    }
}

/// Opaque element handle issued by the automation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Telemetry event id: 32 lowercase hex characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(u128);

impl EventId {
    /// Generate a random event id
    pub fn new() -> Self {
        Self(rand::random::<u128>())
    }

    pub fn from_u128(value: u128) -> Self {
        Self(value)
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl Serialize for EventId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_view_locator() {
        let locator = Locator::text_view("Native Crash");
        assert_eq!(locator.strategy, LocatorStrategy::XPath);
        assert_eq!(
            locator.value,
            r#"//android.widget.TextView[@text="Native Crash"]"#
        );
        assert_eq!(
            locator.to_string(),
            r#"xpath=//android.widget.TextView[@text="Native Crash"]"#
        );
    }

    #[test]
    fn test_strategy_strings() {
        assert_eq!(LocatorStrategy::AccessibilityId.as_str(), "accessibility id");
        assert_eq!(
            LocatorStrategy::AndroidUiAutomator.as_str(),
            "-android uiautomator"
        );
    }

    #[test]
    fn test_event_id_format() {
        let id = EventId::from_u128(0xab);
        assert_eq!(id.to_string(), "000000000000000000000000000000ab");
        assert_eq!(EventId::new().to_string().len(), 32);
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{}\"", id));
    }
}
