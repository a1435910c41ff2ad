//! Error events and envelope framing
//!
//! An envelope is newline delimited: envelope header, item header, item
//! payload. Only `event` items are produced.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error as StdError;

use crate::core::config::TelemetryConfig;
use crate::core::{CrashProbeError, EventId, Result};
use crate::telemetry::dsn::Dsn;

/// Content type of an envelope request body
pub const ENVELOPE_MIME: &str = "application/x-sentry-envelope";

/// Attributes attached to every event
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    pub release: Option<String>,
    pub environment: Option<String>,
    pub server_name: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl EventContext {
    pub fn from_config(config: &TelemetryConfig) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("os.name".to_string(), std::env::consts::OS.to_string());

        Self {
            release: config.release.clone(),
            environment: Some(config.environment.clone()),
            server_name: config.server_name.clone(),
            tags,
        }
    }
}

/// One entry of `exception.values`
#[derive(Debug, Clone, Serialize)]
pub struct Exception {
    #[serde(rename = "type")]
    pub ty: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExceptionList {
    pub values: Vec<Exception>,
}

/// Error event payload
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub event_id: EventId,
    pub timestamp: DateTime<Utc>,
    pub platform: &'static str,
    pub level: &'static str,
    pub logger: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    pub exception: ExceptionList,
}

impl Event {
    /// Build an event from an error and its `source()` chain.
    /// The outermost error is the last value.
    pub fn from_error(err: &(dyn StdError + 'static), context: &EventContext) -> Self {
        let mut values = Vec::new();
        let mut current = Some(err);
        while let Some(e) = current {
            values.push(Exception {
                ty: exception_type(e).to_string(),
                value: e.to_string(),
            });
            current = e.source();
        }
        values.reverse();

        Self {
            event_id: EventId::new(),
            timestamp: Utc::now(),
            platform: "native",
            level: "error",
            logger: "crashprobe",
            release: context.release.clone(),
            environment: context.environment.clone(),
            server_name: context.server_name.clone(),
            tags: context.tags.clone(),
            exception: ExceptionList { values },
        }
    }
}

fn exception_type(err: &(dyn StdError + 'static)) -> &'static str {
    // Step failures expose their cause as the boxed error itself
    if let Some(e) = err.downcast_ref::<CrashProbeError>() {
        e.kind()
    } else if let Some(e) = err.downcast_ref::<Box<CrashProbeError>>() {
        e.kind()
    } else if err.is::<std::io::Error>() {
        "IoError"
    } else if err.is::<reqwest::Error>() {
        "HttpError"
    } else {
        "Error"
    }
}

/// Serialize an event into an envelope body
pub fn encode_envelope(event: &Event, dsn: &Dsn) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(event)?;

    let header = json!({
        "event_id": event.event_id,
        "dsn": dsn.to_string(),
        "sent_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });
    let item_header = json!({
        "type": "event",
        "length": payload.len(),
        "content_type": "application/json",
    });

    let mut body = serde_json::to_vec(&header)?;
    body.push(b'\n');
    body.extend(serde_json::to_vec(&item_header)?);
    body.push(b'\n');
    body.extend(payload);
    body.push(b'\n');
    Ok(body)
}
