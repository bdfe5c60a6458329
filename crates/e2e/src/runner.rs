//! Suite runner: backend preflight, sequential execution and results report

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::config::Settings;
use crate::driver::SessionFactory;
use crate::error::{HarnessError, HarnessResult};
use crate::scenario::{Category, Scenario, ScenarioBody, ScenarioKind};
use crate::session::{panic_message, with_session};
use crate::wait::poll_until;

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub categories: Vec<Category>,
    pub kind: ScenarioKind,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running a selection of scenarios.
///
/// `total` counts the selected scenarios. When an infrastructure error cut
/// the run short, `aborted` holds it and `passed + failed` falls short of
/// `total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0 && self.aborted.is_none()
    }
}

/// Runs scenarios one after another against the system under test
pub struct TestRunner {
    settings: Arc<Settings>,
    api: ApiClient,
    sessions: Arc<dyn SessionFactory>,
    output_dir: PathBuf,
}

impl TestRunner {
    pub fn new(
        settings: Arc<Settings>,
        sessions: Arc<dyn SessionFactory>,
        output_dir: impl Into<PathBuf>,
    ) -> HarnessResult<Self> {
        let api = ApiClient::new(settings.clone())?;
        Ok(Self {
            settings,
            api,
            sessions,
            output_dir: output_dir.into(),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Wait for the backend health check to pass.
    ///
    /// A backend that never answers is an environment problem, reported as
    /// [`HarnessError::Infrastructure`] naming the API base URL.
    pub async fn ensure_backend_ready(&self, timeout: Duration) -> HarnessResult<()> {
        info!("Waiting for backend at {}", self.api.base_url());
        let mut attempts = 0usize;
        let ready = poll_until(
            format!("health check of {}", self.api.base_url()),
            timeout,
            Duration::from_millis(500),
            || {
                attempts += 1;
                let api = &self.api;
                async move {
                    match api.health_check().await {
                        Ok(true) => Ok(Some(())),
                        Ok(false) => Ok(None),
                        Err(e) if e.is_infrastructure() => {
                            debug!("backend not reachable yet: {}", e);
                            Ok(None)
                        }
                        Err(e) => {
                            warn!("Health check error: {}", e);
                            Ok(None)
                        }
                    }
                }
            },
        )
        .await;

        match ready {
            Ok(()) => {
                info!("Backend is healthy");
                Ok(())
            }
            Err(e) if e.is_timeout() => Err(HarnessError::Infrastructure {
                base_url: self.api.base_url().to_string(),
                reason: format!("health check did not pass after {} attempts", attempts),
            }),
            Err(e) => Err(e),
        }
    }

    /// Run `scenarios` in order.
    ///
    /// Scenario failures are recorded and the run continues. An
    /// infrastructure error stops the run; the results gathered so far come
    /// back with [`TestSuiteResult::aborted`] set.
    pub async fn run(&self, scenarios: &[Scenario]) -> TestSuiteResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());
        let mut passed = 0;
        let mut failed = 0;
        let mut aborted = None;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = match self.run_scenario(scenario).await {
                Ok(result) => result,
                Err(e) => {
                    aborted = Some(format!("{}: {}", scenario.name, e));
                    break;
                }
            };
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Scenario results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        TestSuiteResult {
            started_at,
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            results,
            aborted,
        }
    }

    /// Run one scenario; `Err` only for infrastructure errors
    pub async fn run_scenario(&self, scenario: &Scenario) -> HarnessResult<ScenarioResult> {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let outcome = match scenario.body {
            ScenarioBody::Ui(body) => {
                with_session(
                    self.sessions.as_ref(),
                    self.settings.clone(),
                    self.api.clone(),
                    body,
                )
                .await
            }
            ScenarioBody::Api(body) => {
                match AssertUnwindSafe(body(&self.api)).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(panic) => Err(HarnessError::Panicked(panic_message(panic.as_ref()))),
                }
            }
        };

        let outcome = match outcome {
            Err(e) if e.is_infrastructure() => {
                error!("Aborting run in '{}': {}", scenario.name, e);
                return Err(e);
            }
            other => other,
        };

        Ok(ScenarioResult {
            name: scenario.name.to_string(),
            categories: scenario.categories.to_vec(),
            kind: scenario.kind(),
            success: outcome.is_ok(),
            duration_ms: start.elapsed().as_millis() as u64,
            error: outcome.err().map(|e| e.to_string()),
        })
    }

    /// Write results to `test-results.json` in the output directory
    pub fn write_results(&self, results: &TestSuiteResult) -> HarnessResult<PathBuf> {
        write_results(&self.output_dir, results)
    }
}

pub fn write_results(output_dir: &Path, results: &TestSuiteResult) -> HarnessResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("test-results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}
