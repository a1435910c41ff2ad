//! Device automation module
//!
//! A device session locates elements, clicks them and relaunches the app
//! under test. `AppiumSession` talks to an Appium server over the W3C
//! WebDriver wire protocol.

mod appium;
pub mod protocol;

use async_trait::async_trait;

use crate::core::{ElementRef, Locator, Result};

pub use appium::AppiumSession;

/// Handle to a running emulator/app instance
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Find a single element on the current screen
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef>;

    /// Click a previously located element
    async fn click(&self, element: &ElementRef) -> Result<()>;

    /// Bring the app under test back to the foreground, starting it if needed
    async fn launch_app(&self) -> Result<()>;
}
