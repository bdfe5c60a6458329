//! Runner bookkeeping: outcomes, session release, aborts and the results report

mod common;

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use common::{fast_settings, FakeFactory, FakePage};
use fullstack_e2e::scenario::ScenarioFilter;
use fullstack_e2e::{
    scenarios, ApiClient, Category, HarnessError, HarnessResult, Scenario, ScenarioBody,
    ScenarioKind, Session, TestRunner, TestSuiteResult,
};

fn ui_passes(session: &Session) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        session.goto("/").await?;
        Ok(())
    }
    .boxed()
}

fn ui_fails(_: &Session) -> BoxFuture<'_, HarnessResult<()>> {
    async { Err(HarnessError::AssertionFailed("item missing".to_string())) }.boxed()
}

fn ui_panics(_: &Session) -> BoxFuture<'_, HarnessResult<()>> {
    async { panic!("unexpected dialog") }.boxed()
}

fn api_errors(_: &ApiClient) -> BoxFuture<'_, HarnessResult<()>> {
    async {
        Err(HarnessError::UnexpectedStatus {
            method: "GET".to_string(),
            url: "http://localhost:8000/api/v1/users/".to_string(),
            expected: 200,
            actual: 403,
            body: "{\"detail\":\"Not enough privileges\"}".to_string(),
        })
    }
    .boxed()
}

fn api_loses_backend(_: &ApiClient) -> BoxFuture<'_, HarnessResult<()>> {
    async {
        Err(HarnessError::Infrastructure {
            base_url: "http://localhost:8000/api/v1".to_string(),
            reason: "connection refused".to_string(),
        })
    }
    .boxed()
}

fn scenario(name: &'static str, body: ScenarioBody) -> Scenario {
    Scenario {
        name,
        categories: &[Category::Items],
        body,
    }
}

fn mixed_suite() -> Vec<Scenario> {
    vec![
        scenario("ui_passes", ScenarioBody::Ui(ui_passes)),
        scenario("ui_fails", ScenarioBody::Ui(ui_fails)),
        scenario("ui_panics", ScenarioBody::Ui(ui_panics)),
        scenario("api_errors", ScenarioBody::Api(api_errors)),
    ]
}

fn runner(factory: &FakeFactory, output: &std::path::Path) -> TestRunner {
    TestRunner::new(
        Arc::new(fast_settings()),
        Arc::new(factory.clone()),
        output,
    )
    .unwrap()
}

#[tokio::test]
async fn test_failures_are_recorded_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::new(FakePage::new());
    let runner = runner(&factory, dir.path());

    let results = runner.run(&mixed_suite()).await;

    assert_eq!(results.total, 4);
    assert_eq!(results.passed, 1);
    assert_eq!(results.failed, 3);
    assert!(!results.success());

    let outcome: Vec<(&str, bool)> = results
        .results
        .iter()
        .map(|r| (r.name.as_str(), r.success))
        .collect();
    assert_eq!(
        outcome,
        vec![
            ("ui_passes", true),
            ("ui_fails", false),
            ("ui_panics", false),
            ("api_errors", false),
        ]
    );

    let panicked = &results.results[2];
    assert!(panicked.error.as_deref().unwrap().contains("unexpected dialog"));
    let api = &results.results[3];
    assert_eq!(api.kind, ScenarioKind::Api);
    assert!(api.error.as_deref().unwrap().contains("403"));

    // Three UI scenarios, three sessions, all released
    assert_eq!(factory.opens(), 3);
    assert_eq!(factory.quits(), 3);
}

#[tokio::test]
async fn test_unreachable_browser_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::unreachable();
    let runner = runner(&factory, dir.path());

    let results = runner.run(&mixed_suite()).await;

    assert!(!results.success());
    assert!(results.results.is_empty());
    assert_eq!(results.total, 4);
    let reason = results.aborted.as_deref().unwrap();
    assert!(reason.starts_with("ui_passes"), "reason: {}", reason);
    assert!(reason.contains("localhost:4444"), "reason: {}", reason);
    assert_eq!(factory.opens(), 0);
}

#[tokio::test]
async fn test_lost_backend_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::new(FakePage::new());
    let runner = runner(&factory, dir.path());
    let suite = vec![
        scenario("api_loses_backend", ScenarioBody::Api(api_loses_backend)),
        scenario("ui_passes", ScenarioBody::Ui(ui_passes)),
    ];

    let results = runner.run(&suite).await;

    let reason = results.aborted.as_deref().unwrap();
    assert!(reason.contains("http://localhost:8000/api/v1"), "reason: {}", reason);
    // Nothing after the abort ran
    assert!(results.results.is_empty());
    assert_eq!(factory.opens(), 0);
}

#[tokio::test]
async fn test_aborted_run_still_writes_partial_report() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::new(FakePage::new());
    let runner = runner(&factory, dir.path());
    let suite = vec![
        scenario("ui_passes", ScenarioBody::Ui(ui_passes)),
        scenario("ui_fails", ScenarioBody::Ui(ui_fails)),
        scenario("api_loses_backend", ScenarioBody::Api(api_loses_backend)),
        scenario("api_errors", ScenarioBody::Api(api_errors)),
    ];

    let results = runner.run(&suite).await;
    let path = runner.write_results(&results).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let written: TestSuiteResult = serde_json::from_str(&raw).unwrap();
    assert_eq!(written.total, 4);
    assert_eq!(written.passed, 1);
    assert_eq!(written.failed, 1);
    let names: Vec<&str> = written.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["ui_passes", "ui_fails"]);
    assert!(written
        .aborted
        .as_deref()
        .unwrap()
        .starts_with("api_loses_backend"));
    assert!(!written.success());
    assert_eq!(factory.quits(), 2);
}

#[tokio::test]
async fn test_write_results_round_trips_report() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nested").join("reports");
    let factory = FakeFactory::new(FakePage::new());
    let runner = runner(&factory, &output);

    let results = runner.run(&mixed_suite()[..2]).await;
    let path = runner.write_results(&results).unwrap();

    assert_eq!(path, output.join("test-results.json"));
    let written: TestSuiteResult =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.total, 2);
    assert_eq!(written.passed, 1);
    assert_eq!(written.results[1].name, "ui_fails");
    assert_eq!(written.results[1].categories, vec![Category::Items]);
    assert!(written.aborted.is_none());
    assert!(!raw_contains_aborted(&path));
}

fn raw_contains_aborted(path: &std::path::Path) -> bool {
    std::fs::read_to_string(path).unwrap().contains("\"aborted\"")
}

#[test]
fn test_integration_marker_selects_only_api_scenarios() {
    let filter = ScenarioFilter {
        markers: vec![Category::Integration],
        name: None,
    };
    let selected = filter.select(&scenarios::all());

    assert!(!selected.is_empty());
    assert!(selected.iter().all(|s| s.kind() == ScenarioKind::Api));
}

#[test]
fn test_name_filter_narrows_registry() {
    let filter = ScenarioFilter {
        markers: vec![Category::Auth],
        name: Some("logout".to_string()),
    };
    let selected = filter.select(&scenarios::all());

    assert!(!selected.is_empty());
    assert!(selected
        .iter()
        .all(|s| s.name.contains("logout") && s.has_category(Category::Auth)));
}
