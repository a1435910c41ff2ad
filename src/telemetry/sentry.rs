//! HTTP delivery of error events to a Sentry-compatible ingest endpoint

use async_trait::async_trait;
use reqwest::Client;
use std::error::Error as StdError;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::config::TelemetryConfig;
use crate::core::{CrashProbeError, EventId, Result};
use crate::telemetry::dsn::{Dsn, USER_AGENT};
use crate::telemetry::event::{encode_envelope, Event, EventContext, ENVELOPE_MIME};
use crate::telemetry::Reporter;

/// Reporter that posts envelopes in the background
pub struct SentryReporter {
    client: Client,
    dsn: Dsn,
    context: EventContext,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl SentryReporter {
    pub fn new(dsn: Dsn, context: EventContext, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            dsn,
            context,
            pending: Mutex::new(Vec::new()),
        })
    }

    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        let dsn = config
            .dsn
            .as_deref()
            .ok_or_else(|| CrashProbeError::telemetry("No DSN configured"))?;

        Self::new(
            Dsn::parse(dsn)?,
            EventContext::from_config(config),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn track(&self, handle: JoinHandle<()>) {
        match self.pending.lock() {
            Ok(mut pending) => {
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
            Err(_) => warn!("Pending delivery list poisoned, event will not be awaited"),
        }
    }
}

async fn deliver(client: Client, url: String, auth: String, body: Vec<u8>, event_id: EventId) {
    let result = client
        .post(&url)
        .header("content-type", ENVELOPE_MIME)
        .header("x-sentry-auth", auth)
        .body(body)
        .send()
        .await
        .and_then(|resp| resp.error_for_status());

    match result {
        Ok(_) => debug!(%event_id, "Event delivered"),
        Err(e) => warn!(%event_id, "Failed to deliver event: {}", e),
    }
}

#[async_trait]
impl Reporter for SentryReporter {
    fn capture_error(&self, err: &(dyn StdError + 'static)) -> Option<EventId> {
        let event = Event::from_error(err, &self.context);
        let event_id = event.event_id;

        let body = match encode_envelope(&event, &self.dsn) {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to encode event: {}", e);
                return None;
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(%event_id, "No async runtime, event dropped");
                return None;
            }
        };

        let handle = runtime.spawn(deliver(
            self.client.clone(),
            self.dsn.envelope_url(),
            self.dsn.auth_header(),
            body,
            event_id,
        ));
        self.track(handle);

        debug!(%event_id, "Captured error: {}", err);
        Some(event_id)
    }

    async fn flush(&self, timeout: Duration) -> bool {
        let handles = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return false,
        };
        if handles.is_empty() {
            return true;
        }

        tokio::time::timeout(timeout, futures::future::join_all(handles))
            .await
            .is_ok()
    }
}
