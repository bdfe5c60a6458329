//! Error types for the harness

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Timed out after {waited:?} waiting for {condition}")]
    Timeout { condition: String, waited: Duration },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Unexpected status for {method} {url}: expected {expected}, got {actual} ({body})")]
    UnexpectedStatus {
        method: String,
        url: String,
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("Backend at {base_url} is unreachable ({reason}); is the system under test running?")]
    Infrastructure { base_url: String, reason: String },

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Could not open a browser session via {url}: {reason}")]
    SessionStartup { url: String, reason: String },

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("Scenario panicked: {0}")]
    Panicked(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Environment problems that make the rest of the run meaningless.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            HarnessError::Infrastructure { .. } | HarnessError::SessionStartup { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::Timeout { .. })
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
