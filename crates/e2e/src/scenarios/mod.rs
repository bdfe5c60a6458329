//! The scenario catalogue
//!
//! Each submodule exposes `all()`; [`all`] concatenates them in a stable
//! order, API scenarios first so a broken backend shows up before any
//! browser is started.

use crate::scenario::Scenario;

/// Register an async `fn(&Session) -> HarnessResult<()>` as a UI scenario
macro_rules! ui_scenario {
    ($func:ident, [$($cat:ident),+ $(,)?]) => {
        $crate::scenario::Scenario {
            name: stringify!($func),
            categories: &[$($crate::scenario::Category::$cat),+],
            body: $crate::scenario::ScenarioBody::Ui({
                fn run(
                    session: &$crate::session::Session,
                ) -> ::futures::future::BoxFuture<'_, $crate::error::HarnessResult<()>> {
                    Box::pin($func(session))
                }
                run
            }),
        }
    };
}

/// Register an async `fn(&ApiClient) -> HarnessResult<()>` as an API scenario
macro_rules! api_scenario {
    ($func:ident, [$($cat:ident),+ $(,)?]) => {
        $crate::scenario::Scenario {
            name: stringify!($func),
            categories: &[$($crate::scenario::Category::$cat),+],
            body: $crate::scenario::ScenarioBody::Api({
                fn run(
                    api: &$crate::api::ApiClient,
                ) -> ::futures::future::BoxFuture<'_, $crate::error::HarnessResult<()>> {
                    Box::pin($func(api))
                }
                run
            }),
        }
    };
}

pub mod api;
pub mod ui;

/// Every registered scenario
pub fn all() -> Vec<Scenario> {
    let mut scenarios = api::all();
    scenarios.extend(ui::all());
    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Category, ScenarioKind};
    use std::collections::HashSet;

    #[test]
    fn test_scenario_names_are_unique() {
        let mut seen = HashSet::new();
        for scenario in all() {
            assert!(seen.insert(scenario.name), "duplicate scenario: {}", scenario.name);
        }
    }

    #[test]
    fn test_every_scenario_has_a_marker() {
        for scenario in all() {
            assert!(!scenario.categories.is_empty(), "{} has no marker", scenario.name);
        }
    }

    #[test]
    fn test_api_scenarios_are_integration() {
        for scenario in all().iter().filter(|s| s.kind() == ScenarioKind::Api) {
            assert!(
                scenario.has_category(Category::Integration),
                "{} lacks the integration marker",
                scenario.name
            );
        }
    }

    #[test]
    fn test_every_marker_selects_something() {
        let scenarios = all();
        for category in Category::ALL {
            assert!(
                scenarios.iter().any(|s| s.has_category(category)),
                "no scenario for marker {}",
                category
            );
        }
    }

    #[test]
    fn test_api_scenarios_come_first() {
        let kinds: Vec<ScenarioKind> = all().iter().map(|s| s.kind()).collect();
        let first_ui = kinds.iter().position(|k| *k == ScenarioKind::Ui).unwrap();
        assert!(kinds[first_ui..].iter().all(|k| *k == ScenarioKind::Ui));
    }
}
