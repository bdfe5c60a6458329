//! Full-Stack E2E Test Harness
//!
//! Black-box tests for the full-stack admin/items application, driven from
//! Rust against a running frontend and backend:
//! - UI scenarios control a real browser over WebDriver
//! - API scenarios talk to the backend's `/api/v1` endpoints directly
//! - every wait is a bounded poll with an explicit timeout
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    fullstack-e2e (binary)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── ensure_backend_ready() -> health-check preflight     │
//! │    ├── run(&[Scenario]) -> TestSuiteResult                  │
//! │    │     ├── Ui  -> with_session(factory, body)             │
//! │    │     └── Api -> body(&ApiClient)                        │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Session (one browser per UI scenario)                      │
//! │    ├── goto / click / fill / text_of                        │
//! │    ├── wait_for / wait_for_text / wait_for_url_to_be / ...  │
//! │    └── flows::{login, logout, signup, ...}                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ApiClient                                                  │
//! │    ├── get_auth_headers / create_user_and_get_headers       │
//! │    └── request + send -> ApiResponse                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod assert;
pub mod config;
pub mod driver;
pub mod error;
pub mod flows;
pub mod locators;
pub mod random;
pub mod runner;
pub mod scenario;
pub mod scenarios;
pub mod session;
pub mod wait;

pub use api::{ApiClient, ApiResponse, AuthHeaders};
pub use config::Settings;
pub use driver::{Driver, ElementHandle, SessionFactory, WebDriverFactory};
pub use error::{HarnessError, HarnessResult};
pub use locators::Locator;
pub use runner::{ScenarioResult, TestRunner, TestSuiteResult};
pub use scenario::{Category, Scenario, ScenarioBody, ScenarioFilter, ScenarioKind};
pub use session::{with_session, Session};
pub use wait::poll_until;
