//! API scenarios

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::api::{ApiClient, AuthHeaders, Page, UserPublic};
use crate::error::HarnessResult;
use crate::random::{random_email, random_password};
use crate::scenario::Scenario;

mod items;
mod login;
mod users;
mod utils;

pub fn all() -> Vec<Scenario> {
    let mut scenarios = login::all();
    scenarios.extend(users::all());
    scenarios.extend(items::all());
    scenarios.extend(utils::all());
    scenarios
}

/// A freshly signed-up, non-privileged user
struct TestUser {
    user: UserPublic,
    password: String,
    headers: AuthHeaders,
}

async fn new_user(api: &ApiClient) -> HarnessResult<TestUser> {
    let email = random_email();
    let password = random_password();
    let headers = api
        .create_user_and_get_headers("Test User", &email, &password)
        .await?;
    let user = api.me(&headers).await?;
    Ok(TestUser { user, password, headers })
}

/// `GET path?skip=..&limit=..`, expecting 200
async fn list_page<T: DeserializeOwned>(
    api: &ApiClient,
    path: &str,
    auth: &AuthHeaders,
    skip: u32,
    limit: u32,
) -> HarnessResult<Page<T>> {
    let request = api
        .request(Method::GET, path, Some(auth))
        .query(&[("skip", skip), ("limit", limit)]);
    let response = api.send(request).await?;
    response.expect_status(200)?;
    response.json()
}
