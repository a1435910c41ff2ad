//! W3C WebDriver wire types as spoken by Appium

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::config::DeviceConfig;
use crate::core::{CrashProbeError, ElementRef};

/// Key holding the element id in W3C responses
pub const ELEMENT_KEY: &str = "element-6066-11e4-a021-4f77e31d3b9a";
/// Key used by JSONWP-era servers
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Body of `POST /session`
#[derive(Debug, Serialize)]
pub struct NewSessionRequest {
    pub capabilities: CapabilitySet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySet {
    pub always_match: Map<String, Value>,
    pub first_match: Vec<Map<String, Value>>,
}

impl NewSessionRequest {
    pub fn from_device(device: &DeviceConfig) -> Self {
        Self {
            capabilities: CapabilitySet {
                always_match: capabilities(device),
                first_match: vec![Map::new()],
            },
        }
    }
}

/// Build the `alwaysMatch` capabilities for a device. Non-standard keys carry
/// the `appium:` vendor prefix.
pub fn capabilities(device: &DeviceConfig) -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert("platformName".into(), device.platform_name.clone().into());
    caps.insert(
        "appium:automationName".into(),
        device.automation_name.clone().into(),
    );
    caps.insert("appium:deviceName".into(), device.device_name.clone().into());
    if let Some(app) = &device.app {
        caps.insert("appium:app".into(), app.clone().into());
    }
    if let Some(package) = &device.app_package {
        caps.insert("appium:appPackage".into(), package.clone().into());
    }
    if let Some(activity) = &device.app_activity {
        caps.insert("appium:appActivity".into(), activity.clone().into());
    }
    caps.insert(
        "appium:newCommandTimeout".into(),
        device.new_command_timeout_secs.into(),
    );
    caps.insert("appium:noReset".into(), device.no_reset.into());

    for (key, value) in &device.extra_capabilities {
        caps.insert(key.clone(), value.clone());
    }
    caps
}

/// Every response wraps its payload in `value`
#[derive(Debug, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    pub value: Value,
    /// Top-level session id, legacy servers only
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

impl WireResponse {
    /// Session id from a new-session response
    pub fn new_session_id(&self) -> Option<String> {
        self.value
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.session_id.clone())
            .filter(|id| !id.is_empty())
    }
}

/// Error payload inside `value`
#[derive(Debug, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Extract an element id from a find-element payload
pub fn element_ref(value: &Value) -> Option<ElementRef> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(|id| ElementRef(id.to_string()))
}

/// Map a non-success response to an error
pub fn error_from_response(status: u16, body: &str) -> CrashProbeError {
    #[derive(Deserialize)]
    struct Envelope {
        value: WireError,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(Envelope { value }) => CrashProbeError::WebDriver {
            status,
            error: value.error,
            message: value.message,
        },
        Err(_) => CrashProbeError::WebDriver {
            status,
            error: if status == 404 {
                "unknown command".to_string()
            } else {
                "unknown error".to_string()
            },
            message: body.chars().take(200).collect(),
        },
    }
}

/// Whether the server rejected the route itself rather than the command
pub fn is_unknown_command(err: &CrashProbeError) -> bool {
    match err {
        CrashProbeError::WebDriver { status, error, .. } => {
            (*status == 404 && error != "no such element")
                || error == "unknown command"
                || error == "unknown method"
        }
        _ => false,
    }
}
