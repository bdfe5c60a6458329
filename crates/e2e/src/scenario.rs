//! Scenario registry types and selection

use std::fmt;
use std::str::FromStr;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::HarnessResult;
use crate::session::Session;

/// Marker used to select subsets of the suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Auth,
    Admin,
    Dashboard,
    Items,
    Settings,
    Integration,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Auth,
        Category::Admin,
        Category::Dashboard,
        Category::Items,
        Category::Settings,
        Category::Integration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Auth => "auth",
            Category::Admin => "admin",
            Category::Dashboard => "dashboard",
            Category::Items => "items",
            Category::Settings => "settings",
            Category::Integration => "integration",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown marker '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

pub type UiScenarioFn = for<'a> fn(&'a Session) -> BoxFuture<'a, HarnessResult<()>>;
pub type ApiScenarioFn = for<'a> fn(&'a ApiClient) -> BoxFuture<'a, HarnessResult<()>>;

/// What a scenario needs to run
#[derive(Clone, Copy)]
pub enum ScenarioBody {
    /// Gets its own browser session
    Ui(UiScenarioFn),
    /// Talks to the backend only
    Api(ApiScenarioFn),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Ui,
    Api,
}

/// One independent, linear test case
#[derive(Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub categories: &'static [Category],
    pub body: ScenarioBody,
}

impl Scenario {
    pub fn kind(&self) -> ScenarioKind {
        match self.body {
            ScenarioBody::Ui(_) => ScenarioKind::Ui,
            ScenarioBody::Api(_) => ScenarioKind::Api,
        }
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("categories", &self.categories)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Which scenarios a run should include
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    /// Keep scenarios carrying any of these markers; empty keeps all
    pub markers: Vec<Category>,
    /// Keep scenarios whose name contains this substring
    pub name: Option<String>,
}

impl ScenarioFilter {
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let marker_ok =
            self.markers.is_empty() || self.markers.iter().any(|m| scenario.has_category(*m));
        let name_ok = self
            .name
            .as_deref()
            .map_or(true, |needle| scenario.name.contains(needle));
        marker_ok && name_ok
    }

    pub fn select(&self, scenarios: &[Scenario]) -> Vec<Scenario> {
        scenarios.iter().filter(|s| self.matches(s)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use test_case::test_case;

    fn noop_api(_: &ApiClient) -> BoxFuture<'_, HarnessResult<()>> {
        async { Ok(()) }.boxed()
    }

    fn noop_ui(_: &Session) -> BoxFuture<'_, HarnessResult<()>> {
        async { Ok(()) }.boxed()
    }

    fn sample() -> Vec<Scenario> {
        vec![
            Scenario {
                name: "login_with_valid_credentials",
                categories: &[Category::Auth],
                body: ScenarioBody::Ui(noop_ui),
            },
            Scenario {
                name: "api_list_users_forbidden",
                categories: &[Category::Integration, Category::Admin],
                body: ScenarioBody::Api(noop_api),
            },
            Scenario {
                name: "add_item",
                categories: &[Category::Items],
                body: ScenarioBody::Ui(noop_ui),
            },
        ]
    }

    #[test_case("auth", Category::Auth)]
    #[test_case("ADMIN", Category::Admin)]
    #[test_case(" integration ", Category::Integration)]
    fn test_parse_marker(raw: &str, expected: Category) {
        assert_eq!(raw.parse::<Category>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_marker_lists_known_ones() {
        let err = "smoke".parse::<Category>().unwrap_err();
        assert!(err.contains("smoke"));
        assert!(err.contains("dashboard"));
    }

    #[test]
    fn test_empty_filter_selects_everything() {
        assert_eq!(ScenarioFilter::default().select(&sample()).len(), 3);
    }

    #[test]
    fn test_markers_are_any_of() {
        let filter = ScenarioFilter {
            markers: vec![Category::Admin, Category::Items],
            name: None,
        };
        let names: Vec<_> = filter.select(&sample()).iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["api_list_users_forbidden", "add_item"]);
    }

    #[test]
    fn test_name_and_marker_combine() {
        let filter = ScenarioFilter {
            markers: vec![Category::Integration],
            name: Some("forbidden".to_string()),
        };
        let selected = filter.select(&sample());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].kind(), ScenarioKind::Api);
    }
}
