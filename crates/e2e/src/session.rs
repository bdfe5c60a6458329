//! Browser session handle and scoped acquisition

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::config::Settings;
use crate::driver::{Driver, SessionFactory};
use crate::error::{HarnessError, HarnessResult};
use crate::locators::Locator;

/// One browser owned by one scenario, plus the collaborators it may need
pub struct Session {
    driver: Box<dyn Driver>,
    settings: Arc<Settings>,
    api: ApiClient,
}

impl Session {
    pub fn new(driver: Box<dyn Driver>, settings: Arc<Settings>, api: ApiClient) -> Self {
        Self { driver, settings, api }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// API client for arranging data the UI flow under test depends on
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub(crate) fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Default wait budget
    pub fn timeout(&self) -> Duration {
        self.settings.wait_timeout
    }

    /// Absolute UI URL for `path`
    pub fn url(&self, path: &str) -> String {
        self.settings.ui_url(path)
    }

    /// Navigate to a UI route such as `/login`
    pub async fn goto(&self, path: &str) -> HarnessResult<()> {
        let url = self.url(path);
        debug!("goto {}", url);
        self.driver.goto(&url).await
    }

    pub async fn current_url(&self) -> HarnessResult<String> {
        self.driver.current_url().await
    }

    pub async fn refresh(&self) -> HarnessResult<()> {
        self.driver.refresh().await
    }

    /// Document title of the current page
    pub async fn title(&self) -> HarnessResult<String> {
        self.driver.title().await
    }

    /// Wait for `locator` to be visible, then click it
    pub async fn click(&self, locator: &Locator) -> HarnessResult<()> {
        debug!("click {}", locator);
        self.wait_for(locator, self.timeout()).await?.click().await
    }

    /// Wait for `locator` to be visible, clear it and type `value`
    pub async fn fill(&self, locator: &Locator, value: &str) -> HarnessResult<()> {
        debug!("fill {}", locator);
        let element = self.wait_for(locator, self.timeout()).await?;
        element.clear().await?;
        element.send_keys(value).await
    }

    /// Text of the first visible element matching `locator`
    pub async fn text_of(&self, locator: &Locator) -> HarnessResult<String> {
        self.wait_for(locator, self.timeout()).await?.text().await
    }

    /// Wait for `locator` to be visible and report whether it accepts input
    pub async fn is_enabled(&self, locator: &Locator) -> HarnessResult<bool> {
        self.wait_for(locator, self.timeout()).await?.is_enabled().await
    }

    /// Current value of the visible input matching `locator`
    pub async fn value_of(&self, locator: &Locator) -> HarnessResult<String> {
        let element = self.wait_for(locator, self.timeout()).await?;
        Ok(element.prop("value").await?.unwrap_or_default())
    }

    /// Whether a visible element matches right now, without waiting
    pub async fn is_visible(&self, locator: &Locator) -> HarnessResult<bool> {
        for element in self.driver.find_all(locator).await? {
            if element.is_displayed().await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn close(self) -> HarnessResult<()> {
        self.driver.quit().await
    }
}

/// Run `body` with a fresh browser session.
///
/// The session is released exactly once whatever the body does: returns,
/// fails, or panics. A panic is reported as [`HarnessError::Panicked`]. A
/// failure to release only surfaces when the body itself succeeded.
pub async fn with_session<T, F>(
    factory: &dyn SessionFactory,
    settings: Arc<Settings>,
    api: ApiClient,
    body: F,
) -> HarnessResult<T>
where
    F: for<'a> FnOnce(&'a Session) -> BoxFuture<'a, HarnessResult<T>>,
{
    let driver = factory.open().await?;
    let session = Session::new(driver, settings, api);

    let outcome = AssertUnwindSafe(body(&session)).catch_unwind().await;
    let released = session.close().await;

    let result = match outcome {
        Ok(result) => result,
        Err(panic) => Err(HarnessError::Panicked(panic_message(panic.as_ref()))),
    };

    match (result, released) {
        (Ok(_), Err(e)) => Err(e),
        (result, Err(e)) => {
            warn!("Browser session did not close cleanly: {}", e);
            result
        }
        (result, Ok(())) => result,
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
