//! Browser scenarios

use crate::api::AuthHeaders;
use crate::error::HarnessResult;
use crate::flows;
use crate::random::{random_email_at, random_password, random_suffix, UI_EMAIL_DOMAIN};
use crate::scenario::Scenario;
use crate::session::Session;

mod admin;
mod auth;
mod dashboard;
mod items;
mod settings;

pub fn all() -> Vec<Scenario> {
    let mut scenarios = auth::all();
    scenarios.extend(dashboard::all());
    scenarios.extend(items::all());
    scenarios.extend(settings::all());
    scenarios.extend(admin::all());
    scenarios
}

/// Account created through the API for one scenario
struct UiUser {
    full_name: String,
    email: String,
    password: String,
    headers: AuthHeaders,
}

/// Register a fresh non-privileged user through the API
async fn new_user(session: &Session) -> HarnessResult<UiUser> {
    let full_name = format!("UI Tester {}", random_suffix());
    let email = random_email_at(UI_EMAIL_DOMAIN);
    let password = random_password();
    let headers = session
        .api()
        .create_user_and_get_headers(&full_name, &email, &password)
        .await?;
    Ok(UiUser {
        full_name,
        email,
        password,
        headers,
    })
}

/// Register a fresh user and log the browser in as them
async fn login_as_new_user(session: &Session) -> HarnessResult<UiUser> {
    let user = new_user(session).await?;
    flows::login(session, &user.email, &user.password, true).await?;
    Ok(user)
}
