//! Harness settings resolved from the environment
//!
//! Every value has a default so the suite runs against a local stack with no
//! setup at all. A `.env` file is honoured, but real environment variables
//! take precedence over it.

use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

pub const DEFAULT_UI_BASE_URL: &str = "http://localhost:5173";
pub const DEFAULT_BACKEND_HOST: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_SUPERUSER_EMAIL: &str = "admin@example.com";
pub const DEFAULT_SUPERUSER_PASSWORD: &str = "changethis";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Read-only settings shared by every scenario in a run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the web UI, without trailing slash
    pub ui_base_url: String,

    /// Root of the HTTP API including the version prefix, without trailing slash
    pub api_base_url: String,

    pub superuser_email: String,
    pub superuser_password: String,

    /// WebDriver endpoint (chromedriver, geckodriver, selenium)
    pub webdriver_url: String,

    /// Run the browser without a window
    pub headless: bool,

    /// Default budget for every wait primitive
    pub wait_timeout: Duration,

    /// Interval between two checks of a wait condition
    pub poll_interval: Duration,

    /// Extra pause after toasts have gone
    pub toast_settle: Duration,

    /// Per-request timeout of the API client
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ui_base_url: DEFAULT_UI_BASE_URL.to_string(),
            api_base_url: format!("{}{}", DEFAULT_BACKEND_HOST, DEFAULT_API_PREFIX),
            superuser_email: DEFAULT_SUPERUSER_EMAIL.to_string(),
            superuser_password: DEFAULT_SUPERUSER_PASSWORD.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            toast_settle: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    /// Load `.env` (if any) and resolve settings from the process environment
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let backend_host = text("BACKEND_HOST", DEFAULT_BACKEND_HOST);
        let api_prefix = text("API_V1_STR", DEFAULT_API_PREFIX);

        Self {
            ui_base_url: trim_slash(&text("FRONTEND_HOST", DEFAULT_UI_BASE_URL)),
            api_base_url: join_url(&backend_host, &api_prefix),
            superuser_email: text("FIRST_SUPERUSER", DEFAULT_SUPERUSER_EMAIL),
            superuser_password: text("FIRST_SUPERUSER_PASSWORD", DEFAULT_SUPERUSER_PASSWORD),
            webdriver_url: text("E2E_WEBDRIVER_URL", DEFAULT_WEBDRIVER_URL),
            headless: parse_or(&lookup, "E2E_HEADLESS", defaults.headless),
            wait_timeout: Duration::from_secs(parse_or(
                &lookup,
                "E2E_WAIT_TIMEOUT_SECS",
                defaults.wait_timeout.as_secs(),
            )),
            poll_interval: Duration::from_millis(parse_or(
                &lookup,
                "E2E_POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )),
            toast_settle: Duration::from_millis(parse_or(
                &lookup,
                "E2E_TOAST_SETTLE_MS",
                defaults.toast_settle.as_millis() as u64,
            )),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "E2E_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
        }
    }

    /// Absolute UI URL for a route such as `/login`
    pub fn ui_url(&self, path: &str) -> String {
        join_url(&self.ui_base_url, path)
    }

    /// Absolute API URL for a resource path such as `users/me`
    pub fn api_url(&self, path: &str) -> String {
        join_url(&self.api_base_url, path)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{}={:?} is not valid, using default {:?}", key, raw, default);
            default
        }),
        _ => default,
    }
}

fn trim_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base, path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.ui_base_url, "http://localhost:5173");
        assert_eq!(settings.api_base_url, "http://localhost:8000/api/v1");
        assert_eq!(settings.superuser_email, "admin@example.com");
        assert_eq!(settings.superuser_password, "changethis");
        assert_eq!(settings.wait_timeout, Duration::from_secs(10));
        assert_eq!(settings.toast_settle, Duration::from_millis(500));
        assert!(settings.headless);
    }

    #[test]
    fn test_overrides_are_applied() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("FRONTEND_HOST", "https://dashboard.example.com/"),
            ("BACKEND_HOST", "https://api.example.com"),
            ("API_V1_STR", "/api/v2"),
            ("FIRST_SUPERUSER", "root@example.com"),
            ("E2E_HEADLESS", "false"),
            ("E2E_WAIT_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(settings.ui_base_url, "https://dashboard.example.com");
        assert_eq!(settings.api_base_url, "https://api.example.com/api/v2");
        assert_eq!(settings.superuser_email, "root@example.com");
        assert!(!settings.headless);
        assert_eq!(settings.wait_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("E2E_WAIT_TIMEOUT_SECS", "ten"),
            ("E2E_HEADLESS", "maybe"),
        ]));
        assert_eq!(settings.wait_timeout, Duration::from_secs(10));
        assert!(settings.headless);
    }

    #[test]
    fn test_url_joining() {
        let settings = Settings::default();
        assert_eq!(settings.ui_url("/login"), "http://localhost:5173/login");
        assert_eq!(settings.ui_url("/"), "http://localhost:5173/");
        assert_eq!(
            settings.api_url("login/access-token"),
            "http://localhost:8000/api/v1/login/access-token"
        );
        assert_eq!(settings.api_url("/users/"), "http://localhost:8000/api/v1/users/");
    }
}
