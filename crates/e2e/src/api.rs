//! HTTP API helpers
//!
//! [`ApiClient`] issues requests against the backend under test and turns
//! responses into [`ApiResponse`] values that scenarios assert on. A refused
//! connection is never an assertable outcome: it becomes
//! [`HarnessError::Infrastructure`] naming the base URL.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{HarnessError, HarnessResult};

/// `POST login/access-token` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPublic {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Paginated listing, `{ data, count }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub count: u64,
}

fn default_true() -> bool {
    true
}

/// Bearer authorization for one caller
#[derive(Debug, Clone)]
pub struct AuthHeaders(HeaderMap);

impl AuthHeaders {
    pub fn bearer(token: &str) -> HarnessResult<Self> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            HarnessError::AssertionFailed(format!(
                "access token is not a valid header value: {}",
                e
            ))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(Self(headers))
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.0
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.headers(self.0.clone())
    }
}

/// A decoded response, kept whole so failures can show the body
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// Fail unless the response carries `expected`
    pub fn expect_status(&self, expected: u16) -> HarnessResult<&Self> {
        if self.status.as_u16() == expected {
            return Ok(self);
        }
        Err(HarnessError::UnexpectedStatus {
            method: self.method.to_string(),
            url: self.url.clone(),
            expected,
            actual: self.status.as_u16(),
            body: self.body.to_string(),
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> HarnessResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// The backend's `detail` message on error responses
    pub fn detail(&self) -> Option<&str> {
        self.body.get("detail").and_then(Value::as_str)
    }
}

/// Client for the backend under test
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    settings: Arc<Settings>,
}

impl ApiClient {
    pub fn new(settings: Arc<Settings>) -> HarnessResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn base_url(&self) -> &str {
        &self.settings.api_base_url
    }

    /// Start a request to `path` below the API base, optionally authorized
    pub fn request(
        &self,
        method: Method,
        path: &str,
        auth: Option<&AuthHeaders>,
    ) -> RequestBuilder {
        let request = self.http.request(method, self.settings.api_url(path));
        match auth {
            Some(headers) => headers.apply(request),
            None => request,
        }
    }

    /// Send a prepared request and decode whatever body comes back
    pub async fn send(&self, request: RequestBuilder) -> HarnessResult<ApiResponse> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().to_string();

        let response = self.http.execute(request).await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        debug!("{} {} -> {}", method, url, status);
        Ok(ApiResponse { method, url, status, body })
    }

    fn classify(&self, error: reqwest::Error) -> HarnessError {
        if error.is_connect() {
            HarnessError::Infrastructure {
                base_url: self.base_url().to_string(),
                reason: error.to_string(),
            }
        } else {
            HarnessError::Http(error)
        }
    }

    pub async fn get(&self, path: &str, auth: Option<&AuthHeaders>) -> HarnessResult<ApiResponse> {
        self.send(self.request(Method::GET, path, auth)).await
    }

    pub async fn delete(
        &self,
        path: &str,
        auth: Option<&AuthHeaders>,
    ) -> HarnessResult<ApiResponse> {
        self.send(self.request(Method::DELETE, path, auth)).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        auth: Option<&AuthHeaders>,
        body: &Value,
    ) -> HarnessResult<ApiResponse> {
        self.send(self.request(Method::POST, path, auth).json(body)).await
    }

    pub async fn put_json(
        &self,
        path: &str,
        auth: Option<&AuthHeaders>,
        body: &Value,
    ) -> HarnessResult<ApiResponse> {
        self.send(self.request(Method::PUT, path, auth).json(body)).await
    }

    pub async fn patch_json(
        &self,
        path: &str,
        auth: Option<&AuthHeaders>,
        body: &Value,
    ) -> HarnessResult<ApiResponse> {
        self.send(self.request(Method::PATCH, path, auth).json(body)).await
    }

    /// Raw token exchange, for scenarios asserting on failed logins
    pub async fn login(&self, email: &str, password: &str) -> HarnessResult<ApiResponse> {
        let form = [("username", email), ("password", password)];
        self.send(self.request(Method::POST, "login/access-token", None).form(&form))
            .await
    }

    /// Exchange credentials for bearer headers
    pub async fn get_auth_headers(
        &self,
        email: &str,
        password: &str,
    ) -> HarnessResult<AuthHeaders> {
        let response = self.login(email, password).await?;
        response.expect_status(200)?;
        let token: Token = response.json()?;
        AuthHeaders::bearer(&token.access_token)
    }

    pub async fn superuser_headers(&self) -> HarnessResult<AuthHeaders> {
        self.get_auth_headers(&self.settings.superuser_email, &self.settings.superuser_password)
            .await
    }

    /// Self-register through `users/signup`
    pub async fn signup(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> HarnessResult<ApiResponse> {
        let body = json!({ "full_name": full_name, "email": email, "password": password });
        self.post_json("users/signup", None, &body).await
    }

    /// Sign a new user up and log them in
    pub async fn create_user_and_get_headers(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> HarnessResult<AuthHeaders> {
        let response = self.signup(full_name, email, password).await?;
        if response.status != StatusCode::OK {
            return Err(HarnessError::AssertionFailed(format!(
                "signup of {} returned {}: {}",
                email, response.status, response.body
            )));
        }
        self.get_auth_headers(email, password).await
    }

    /// Create a user through the privileged `users/` endpoint
    pub async fn create_user(
        &self,
        auth: &AuthHeaders,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        is_superuser: bool,
    ) -> HarnessResult<UserPublic> {
        let body = json!({
            "email": email,
            "password": password,
            "full_name": full_name,
            "is_superuser": is_superuser,
        });
        let response = self.post_json("users/", Some(auth), &body).await?;
        response.expect_status(200)?;
        response.json()
    }

    pub async fn me(&self, auth: &AuthHeaders) -> HarnessResult<UserPublic> {
        let response = self.get("users/me", Some(auth)).await?;
        response.expect_status(200)?;
        response.json()
    }

    pub async fn create_item(
        &self,
        auth: &AuthHeaders,
        title: &str,
        description: Option<&str>,
    ) -> HarnessResult<ItemPublic> {
        let body = json!({ "title": title, "description": description });
        let response = self.post_json("items/", Some(auth), &body).await?;
        response.expect_status(200)?;
        response.json()
    }

    /// `GET utils/health-check/`; unreachable backends are an error, a
    /// reachable but unhealthy one is `Ok(false)`
    pub async fn health_check(&self) -> HarnessResult<bool> {
        let response = self.get("utils/health-check/", None).await?;
        if !response.status.is_success() {
            warn!("Health check returned {}", response.status);
            return Ok(false);
        }
        Ok(response.body == Value::Bool(true))
    }
}
