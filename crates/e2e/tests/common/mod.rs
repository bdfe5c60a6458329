//! In-memory browser used by the integration tests
//!
//! Elements are keyed by selector. Each one becomes displayed at a given
//! instant and may be hidden again later, which is enough to exercise the
//! polling waits. Clicks can trigger scripted reactions (navigation,
//! elements appearing or disappearing) to walk the UI flows.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use fullstack_e2e::{
    ApiClient, Driver, ElementHandle, HarnessError, HarnessResult, Locator, SessionFactory,
    Settings,
};

pub const UI_BASE: &str = "http://ui.test";

/// Settings with short waits so timing tests stay fast
pub fn fast_settings() -> Settings {
    Settings {
        ui_base_url: UI_BASE.to_string(),
        wait_timeout: Duration::from_millis(400),
        poll_interval: Duration::from_millis(10),
        toast_settle: Duration::from_millis(20),
        ..Settings::default()
    }
}

pub fn api_client(settings: &Arc<Settings>) -> ApiClient {
    ApiClient::new(settings.clone()).unwrap()
}

#[derive(Debug, Clone)]
struct Node {
    shown_at: Instant,
    hidden_at: Option<Instant>,
    disabled: bool,
    text: String,
    attrs: HashMap<String, String>,
}

impl Node {
    fn displayed(&self, now: Instant) -> bool {
        now >= self.shown_at && self.hidden_at.map_or(true, |t| now < t)
    }
}

/// Scripted consequence of clicking an element
#[derive(Debug, Clone)]
pub enum Reaction {
    Navigate(String),
    Show {
        selector: String,
        text: String,
        after: Duration,
    },
    Hide {
        selector: String,
        after: Duration,
    },
    SetAttr {
        selector: String,
        name: String,
        value: String,
    },
}

#[derive(Debug, Default)]
struct Page {
    url: String,
    title: String,
    nodes: HashMap<String, Node>,
    reactions: HashMap<String, Vec<Reaction>>,
    clicks: Vec<String>,
    typed: Vec<(String, String)>,
}

impl Page {
    fn apply(&mut self, reaction: Reaction) {
        let now = Instant::now();
        match reaction {
            Reaction::Navigate(url) => self.url = url,
            Reaction::Show { selector, text, after } => {
                self.nodes.insert(
                    selector,
                    Node {
                        shown_at: now + after,
                        hidden_at: None,
                        disabled: false,
                        text,
                        attrs: HashMap::new(),
                    },
                );
            }
            Reaction::Hide { selector, after } => {
                if let Some(node) = self.nodes.get_mut(&selector) {
                    node.hidden_at = Some(now + after);
                }
            }
            Reaction::SetAttr { selector, name, value } => {
                if let Some(node) = self.nodes.get_mut(&selector) {
                    node.attrs.insert(name, value);
                }
            }
        }
    }
}

/// Shared page state; clone freely to script and inspect a browser
#[derive(Debug, Clone, Default)]
pub struct FakePage(Arc<Mutex<Page>>);

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Element matching `locator`, displayed `after` from now
    pub fn show(&self, locator: &Locator, text: &str, after: Duration) -> &Self {
        self.0.lock().apply(Reaction::Show {
            selector: locator.selector().to_string(),
            text: text.to_string(),
            after,
        });
        self
    }

    /// Hide an existing element `after` from now; it stays in the DOM
    pub fn hide(&self, locator: &Locator, after: Duration) -> &Self {
        self.0.lock().apply(Reaction::Hide {
            selector: locator.selector().to_string(),
            after,
        });
        self
    }

    pub fn set_attr(&self, locator: &Locator, name: &str, value: &str) -> &Self {
        self.0.lock().apply(Reaction::SetAttr {
            selector: locator.selector().to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Keep an existing element on screen but refuse input, like a disabled button
    pub fn disable(&self, locator: &Locator) -> &Self {
        if let Some(node) = self.0.lock().nodes.get_mut(locator.selector()) {
            node.disabled = true;
        }
        self
    }

    pub fn set_title(&self, title: &str) -> &Self {
        self.0.lock().title = title.to_string();
        self
    }

    pub fn remove(&self, locator: &Locator) -> &Self {
        self.0.lock().nodes.remove(locator.selector());
        self
    }

    pub fn set_url(&self, url: &str) -> &Self {
        self.0.lock().url = url.to_string();
        self
    }

    /// Script what a click on `locator` does
    pub fn on_click(&self, locator: &Locator, reactions: Vec<Reaction>) -> &Self {
        self.0
            .lock()
            .reactions
            .entry(locator.selector().to_string())
            .or_default()
            .extend(reactions);
        self
    }

    pub fn url(&self) -> String {
        self.0.lock().url.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.0.lock().clicks.clone()
    }

    pub fn typed(&self) -> Vec<(String, String)> {
        self.0.lock().typed.clone()
    }
}

pub fn show(locator: &Locator, text: &str, after: Duration) -> Reaction {
    Reaction::Show {
        selector: locator.selector().to_string(),
        text: text.to_string(),
        after,
    }
}

pub fn navigate(url: &str) -> Reaction {
    Reaction::Navigate(url.to_string())
}

struct FakeElement {
    selector: String,
    page: FakePage,
}

impl FakeElement {
    fn node(&self) -> HarnessResult<Node> {
        self.page
            .0
            .lock()
            .nodes
            .get(&self.selector)
            .cloned()
            .ok_or_else(|| {
                HarnessError::AssertionFailed(format!("stale element {}", self.selector))
            })
    }
}

#[async_trait]
impl ElementHandle for FakeElement {
    async fn is_displayed(&self) -> HarnessResult<bool> {
        Ok(self.node()?.displayed(Instant::now()))
    }

    async fn is_enabled(&self) -> HarnessResult<bool> {
        Ok(!self.node()?.disabled)
    }

    async fn text(&self) -> HarnessResult<String> {
        Ok(self.node()?.text)
    }

    async fn attr(&self, name: &str) -> HarnessResult<Option<String>> {
        Ok(self.node()?.attrs.get(name).cloned())
    }

    async fn prop(&self, name: &str) -> HarnessResult<Option<String>> {
        Ok(self.node()?.attrs.get(name).cloned())
    }

    async fn click(&self) -> HarnessResult<()> {
        let mut page = self.page.0.lock();
        page.clicks.push(self.selector.clone());
        let reactions = page.reactions.get(&self.selector).cloned().unwrap_or_default();
        for reaction in reactions {
            page.apply(reaction);
        }
        Ok(())
    }

    async fn clear(&self) -> HarnessResult<()> {
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> HarnessResult<()> {
        self.page
            .0
            .lock()
            .typed
            .push((self.selector.clone(), text.to_string()));
        Ok(())
    }
}

pub struct FakeDriver {
    page: FakePage,
    quits: Arc<AtomicUsize>,
    fail_quit: bool,
    fail_lookups: bool,
}

#[async_trait]
impl Driver for FakeDriver {
    async fn goto(&self, url: &str) -> HarnessResult<()> {
        self.page.set_url(url);
        Ok(())
    }

    async fn current_url(&self) -> HarnessResult<String> {
        Ok(self.page.url())
    }

    async fn title(&self) -> HarnessResult<String> {
        Ok(self.page.0.lock().title.clone())
    }

    async fn refresh(&self) -> HarnessResult<()> {
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<Box<dyn ElementHandle>>> {
        if self.fail_lookups {
            return Err(HarnessError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "browser session is gone",
            )));
        }
        let present = self.page.0.lock().nodes.contains_key(locator.selector());
        if !present {
            return Ok(Vec::new());
        }
        Ok(vec![Box::new(FakeElement {
            selector: locator.selector().to_string(),
            page: self.page.clone(),
        })])
    }

    async fn quit(&self) -> HarnessResult<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        if self.fail_quit {
            return Err(HarnessError::AssertionFailed("browser refused to quit".to_string()));
        }
        Ok(())
    }
}

/// Hands out drivers over one shared [`FakePage`] and counts their lifecycle
#[derive(Clone, Default)]
pub struct FakeFactory {
    pub page: FakePage,
    opens: Arc<AtomicUsize>,
    quits: Arc<AtomicUsize>,
    fail_open: bool,
    fail_quit: bool,
    fail_lookups: bool,
}

impl FakeFactory {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Every `open` fails like an unreachable WebDriver server
    pub fn unreachable() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    pub fn failing_quit(page: FakePage) -> Self {
        Self {
            page,
            fail_quit: true,
            ..Self::default()
        }
    }

    /// Sessions open fine, but every element lookup errors like a dead browser
    pub fn failing_lookups(page: FakePage) -> Self {
        Self {
            page,
            fail_lookups: true,
            ..Self::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn open(&self) -> HarnessResult<Box<dyn Driver>> {
        if self.fail_open {
            return Err(HarnessError::SessionStartup {
                url: "http://localhost:4444".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDriver {
            page: self.page.clone(),
            quits: self.quits.clone(),
            fail_quit: self.fail_quit,
            fail_lookups: self.fail_lookups,
        }))
    }
}
