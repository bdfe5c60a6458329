//! Synchronization primitives
//!
//! Every wait is a bounded poll: check the browser, sleep for the poll
//! interval, check again, until the condition holds or the deadline passes.
//! All variants share [`poll_until`] so they time out the same way.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::driver::ElementHandle;
use crate::error::{HarnessError, HarnessResult};
use crate::locators::{common, Locator};
use crate::session::Session;

/// Run `check` until it yields a value or `timeout` elapses.
///
/// The check returns `Ok(Some(_))` once satisfied and `Ok(None)` while not.
/// An error from the check aborts the wait. The last check happens at the
/// deadline, so the call never fails before `timeout` has elapsed.
pub async fn poll_until<T, F, Fut>(
    condition: impl Display,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> HarnessResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HarnessResult<Option<T>>>,
{
    let start = Instant::now();
    let deadline = start + timeout;
    let interval = interval.max(Duration::from_millis(1));

    loop {
        if let Some(value) = check().await? {
            trace!("satisfied after {:?}: {}", start.elapsed(), condition);
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(HarnessError::Timeout {
                condition: condition.to_string(),
                waited: now - start,
            });
        }
        sleep(interval.min(deadline - now)).await;
    }
}

/// Lookup errors while the page is changing (stale or detached elements)
/// just mean "not yet".
fn transient<T>(result: HarnessResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("transient lookup failure while polling: {}", e);
            None
        }
    }
}

impl Session {
    /// Matches with their visibility; `None` when the lookup itself failed
    async fn visible_matches(
        &self,
        locator: &Locator,
    ) -> Option<Vec<(Box<dyn ElementHandle>, bool)>> {
        let found = transient(self.driver().find_all(locator).await)?;
        let mut matches = Vec::with_capacity(found.len());
        for element in found {
            // A stale element is gone from the page
            let displayed = transient(element.is_displayed().await).unwrap_or(false);
            matches.push((element, displayed));
        }
        Some(matches)
    }

    /// First visible element matching `locator`
    pub async fn wait_for(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> HarnessResult<Box<dyn ElementHandle>> {
        poll_until(
            format!("visibility of {}", locator),
            timeout,
            self.settings().poll_interval,
            || async move {
                Ok(self
                    .visible_matches(locator)
                    .await
                    .unwrap_or_default()
                    .into_iter()
                    .find(|(_, displayed)| *displayed)
                    .map(|(element, _)| element))
            },
        )
        .await
    }

    /// Every element matching `locator`, once there is at least one and all
    /// of them are visible
    pub async fn wait_for_all(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> HarnessResult<Vec<Box<dyn ElementHandle>>> {
        poll_until(
            format!("visibility of all {}", locator),
            timeout,
            self.settings().poll_interval,
            || async move {
                let matches = self.visible_matches(locator).await.unwrap_or_default();
                if matches.is_empty() || matches.iter().any(|(_, displayed)| !displayed) {
                    return Ok(None);
                }
                Ok(Some(matches.into_iter().map(|(element, _)| element).collect()))
            },
        )
        .await
    }

    /// Current location equals `url` exactly
    pub async fn wait_for_url_to_be(&self, url: &str, timeout: Duration) -> HarnessResult<()> {
        poll_until(
            format!("url to be {}", url),
            timeout,
            self.settings().poll_interval,
            || async move {
                let current = transient(self.driver().current_url().await);
                Ok((current.as_deref() == Some(url)).then_some(()))
            },
        )
        .await
    }

    /// An element matching `locator` contains `text`
    pub async fn wait_for_text(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Duration,
    ) -> HarnessResult<Box<dyn ElementHandle>> {
        poll_until(
            format!("text {:?} in {}", text, locator),
            timeout,
            self.settings().poll_interval,
            || async move {
                let Some(found) = transient(self.driver().find_all(locator).await) else {
                    return Ok(None);
                };
                for element in found {
                    if let Some(content) = transient(element.text().await) {
                        if content.contains(text) {
                            return Ok(Some(element));
                        }
                    }
                }
                Ok(None)
            },
        )
        .await
    }

    /// No visible element matches `locator`, either absent or hidden.
    ///
    /// A failed lookup proves nothing and counts as "not yet". If lookups
    /// still fail at the deadline, their error is returned instead of the
    /// timeout.
    pub async fn wait_for_invisibility(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> HarnessResult<()> {
        let waited = poll_until(
            format!("invisibility of {}", locator),
            timeout,
            self.settings().poll_interval,
            || async move {
                let Some(matches) = self.visible_matches(locator).await else {
                    return Ok(None);
                };
                Ok((!matches.iter().any(|(_, displayed)| *displayed)).then_some(()))
            },
        )
        .await;

        match waited {
            Err(e) if e.is_timeout() => {
                self.driver().find_all(locator).await?;
                Err(e)
            }
            other => other,
        }
    }

    /// Attribute `name` of an element matching `locator` contains `value`
    pub async fn wait_for_attribute_contains(
        &self,
        locator: &Locator,
        name: &str,
        value: &str,
        timeout: Duration,
    ) -> HarnessResult<()> {
        poll_until(
            format!("attribute {}~={:?} on {}", name, value, locator),
            timeout,
            self.settings().poll_interval,
            || async move {
                let Some(found) = transient(self.driver().find_all(locator).await) else {
                    return Ok(None);
                };
                for element in found {
                    if let Some(Some(attr)) = transient(element.attr(name).await) {
                        if attr.contains(value) {
                            return Ok(Some(()));
                        }
                    }
                }
                Ok(None)
            },
        )
        .await
    }

    /// Let success and error toasts leave the screen before the next click.
    ///
    /// Each toast kind gets its own best-effort wait; a timeout there is
    /// logged and ignored, any other error (a browser that stopped
    /// answering) is returned. The settle delay afterwards covers the exit
    /// animation, which still intercepts clicks once the toast is hidden.
    pub async fn wait_for_toast_to_disappear(&self, timeout: Duration) -> HarnessResult<()> {
        for toast in [&common::SUCCESS_TOAST, &common::ERROR_TOAST] {
            match self.wait_for_invisibility(toast, timeout).await {
                Ok(()) => {}
                Err(e) if e.is_timeout() => debug!("ignoring lingering toast: {}", e),
                Err(e) => return Err(e),
            }
        }
        sleep(self.settings().toast_settle).await;
        Ok(())
    }
}
