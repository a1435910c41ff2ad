//! Appium session over HTTP
//!
//! Creates a W3C session on the Appium server and issues element and app
//! commands against it.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::{Config, CrashProbeError, ElementRef, Locator, Result};
use crate::driver::protocol::{self, NewSessionRequest, WireResponse};
use crate::driver::DeviceSession;

/// A live Appium session
pub struct AppiumSession {
    client: Client,
    base_url: String,
    session_id: String,
    app_package: Option<String>,
}

impl AppiumSession {
    /// Create a new session using the device capabilities from `config`
    pub async fn start(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.appium.timeout_secs))
            .build()?;
        let base_url = config.appium_url().to_string();

        let request = NewSessionRequest::from_device(&config.device);
        debug!(url = %base_url, "Creating Appium session");

        let response = client
            .post(format!("{}/session", base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = protocol::error_from_response(status.as_u16(), &body);
            return Err(CrashProbeError::session(format!(
                "Failed to create session: {}",
                err
            )));
        }

        let wire: WireResponse = serde_json::from_str(&body)?;
        let session_id = wire
            .new_session_id()
            .ok_or_else(|| CrashProbeError::session("Response did not contain a session id"))?;

        debug!(session = %session_id, "Appium session created");

        Ok(Self {
            client,
            base_url,
            session_id,
            app_package: config.device.app_package.clone(),
        })
    }

    /// Session id assigned by the server
    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Delete the session. Failures are logged only.
    pub async fn end(&self) {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        match self.client.delete(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(session = %self.session_id, "Appium session deleted");
            }
            Ok(resp) => warn!(
                session = %self.session_id,
                status = resp.status().as_u16(),
                "Failed to delete Appium session"
            ),
            Err(e) => warn!(session = %self.session_id, "Failed to delete Appium session: {}", e),
        }
    }

    /// Send a session command and return the `value` payload
    async fn command(&self, method: Method, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        debug!(%method, %url, "Appium command");

        let response = self
            .client
            .request(method, &url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(protocol::error_from_response(status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let wire: WireResponse = serde_json::from_str(&text)?;
        Ok(wire.value)
    }

    async fn activate_app(&self) -> Result<()> {
        let package = self.app_package.as_deref().ok_or_else(|| {
            CrashProbeError::config("app_package is required to relaunch the app on this server")
        })?;

        self.command(
            Method::POST,
            "/execute/sync",
            json!({
                "script": "mobile: activateApp",
                "args": [{ "appId": package }],
            }),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DeviceSession for AppiumSession {
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef> {
        let value = self
            .command(
                Method::POST,
                "/element",
                json!({
                    "using": locator.strategy.as_str(),
                    "value": locator.value,
                }),
            )
            .await
            .map_err(|e| match e {
                CrashProbeError::WebDriver { ref error, .. } if error == "no such element" => {
                    CrashProbeError::ElementNotFound(locator.clone())
                }
                other => other,
            })?;

        protocol::element_ref(&value).ok_or_else(|| CrashProbeError::ElementNotFound(locator.clone()))
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/click", element),
            json!({}),
        )
        .await?;
        Ok(())
    }

    async fn launch_app(&self) -> Result<()> {
        match self
            .command(Method::POST, "/appium/app/launch", json!({}))
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if protocol::is_unknown_command(&e) => {
                debug!("Legacy launch route unavailable, using mobile: activateApp");
                self.activate_app().await
            }
            Err(e) => Err(e),
        }
    }
}
