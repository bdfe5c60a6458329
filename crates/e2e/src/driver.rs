//! Browser automation seam
//!
//! Scenarios talk to the browser only through [`Driver`] and
//! [`ElementHandle`]. The production implementation forwards to a W3C
//! WebDriver endpoint through `fantoccini`.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{HarnessError, HarnessResult};
use crate::locators::Locator;

/// One element found in the current page
#[async_trait]
pub trait ElementHandle: Send + Sync {
    async fn is_displayed(&self) -> HarnessResult<bool>;
    async fn is_enabled(&self) -> HarnessResult<bool>;
    async fn text(&self) -> HarnessResult<String>;
    async fn attr(&self, name: &str) -> HarnessResult<Option<String>>;
    /// Live DOM property, e.g. the current `value` of an input
    async fn prop(&self, name: &str) -> HarnessResult<Option<String>>;
    async fn click(&self) -> HarnessResult<()>;
    async fn clear(&self) -> HarnessResult<()>;
    async fn send_keys(&self, text: &str) -> HarnessResult<()>;
}

/// One live browser instance
#[async_trait]
pub trait Driver: Send + Sync {
    async fn goto(&self, url: &str) -> HarnessResult<()>;
    async fn current_url(&self) -> HarnessResult<String>;
    async fn title(&self) -> HarnessResult<String>;
    async fn refresh(&self) -> HarnessResult<()>;

    /// All elements currently matching `locator`, possibly none
    async fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<Box<dyn ElementHandle>>>;

    /// End the browser session
    async fn quit(&self) -> HarnessResult<()>;
}

/// Opens a fresh browser per scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> HarnessResult<Box<dyn Driver>>;
}

/// [`SessionFactory`] backed by a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    webdriver_url: String,
    headless: bool,
    window_width: u32,
    window_height: u32,
}

impl WebDriverFactory {
    pub fn new(settings: &Settings) -> Self {
        Self {
            webdriver_url: settings.webdriver_url.clone(),
            headless: settings.headless,
            window_width: 1280,
            window_height: 1024,
        }
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut chrome_args = vec![
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            format!("--window-size={},{}", self.window_width, self.window_height),
        ];
        let mut firefox_args = Vec::new();
        if self.headless {
            chrome_args.push("--headless=new".to_string());
            firefox_args.push("-headless".to_string());
        }

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
        caps.insert("moz:firefoxOptions".to_string(), json!({ "args": firefox_args }));
        caps
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    async fn open(&self) -> HarnessResult<Box<dyn Driver>> {
        debug!("Opening browser session via {}", self.webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| HarnessError::SessionStartup {
                url: self.webdriver_url.clone(),
                reason: e.to_string(),
            })?;

        if !self.headless {
            client
                .set_window_size(self.window_width, self.window_height)
                .await?;
        }

        info!("Browser session opened");
        Ok(Box::new(WebDriver { client }))
    }
}

/// A live `fantoccini` session
pub struct WebDriver {
    client: Client,
}

#[async_trait]
impl Driver for WebDriver {
    async fn goto(&self, url: &str) -> HarnessResult<()> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> HarnessResult<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn title(&self) -> HarnessResult<String> {
        Ok(self.client.title().await?)
    }

    async fn refresh(&self) -> HarnessResult<()> {
        self.client.refresh().await?;
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<Box<dyn ElementHandle>>> {
        let found = self.client.find_all(locator.as_webdriver()).await?;
        Ok(found
            .into_iter()
            .map(|element| Box::new(WebElement { element }) as Box<dyn ElementHandle>)
            .collect())
    }

    async fn quit(&self) -> HarnessResult<()> {
        self.client.clone().close().await?;
        Ok(())
    }
}

struct WebElement {
    element: Element,
}

#[async_trait]
impl ElementHandle for WebElement {
    async fn is_displayed(&self) -> HarnessResult<bool> {
        Ok(self.element.is_displayed().await?)
    }

    async fn is_enabled(&self) -> HarnessResult<bool> {
        Ok(self.element.is_enabled().await?)
    }

    async fn text(&self) -> HarnessResult<String> {
        Ok(self.element.text().await?)
    }

    async fn attr(&self, name: &str) -> HarnessResult<Option<String>> {
        Ok(self.element.attr(name).await?)
    }

    async fn prop(&self, name: &str) -> HarnessResult<Option<String>> {
        Ok(self.element.prop(name).await?)
    }

    async fn click(&self) -> HarnessResult<()> {
        self.element.click().await?;
        Ok(())
    }

    async fn clear(&self) -> HarnessResult<()> {
        self.element.clear().await?;
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> HarnessResult<()> {
        self.element.send_keys(text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_capabilities() {
        let factory = WebDriverFactory::new(&Settings::default());
        let caps = factory.capabilities();
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--window-size=1280,1024"));
        let ff = caps["moz:firefoxOptions"]["args"].as_array().unwrap();
        assert_eq!(ff.len(), 1);
    }

    #[test]
    fn test_headed_capabilities() {
        let settings = Settings { headless: false, ..Settings::default() };
        let caps = WebDriverFactory::new(&settings).capabilities();
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a.as_str().unwrap().starts_with("--headless")));
        assert!(caps["moz:firefoxOptions"]["args"].as_array().unwrap().is_empty());
    }
}
