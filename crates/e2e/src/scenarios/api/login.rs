//! Token exchange, password recovery and reset

use reqwest::Method;
use serde_json::json;

use crate::api::{ApiClient, AuthHeaders, Token, UserPublic};
use crate::error::HarnessResult;
use crate::random::random_email;
use crate::scenario::Scenario;
use crate::{ensure, ensure_eq};

pub fn all() -> Vec<Scenario> {
    vec![
        api_scenario!(api_get_access_token, [Integration, Auth]),
        api_scenario!(api_get_access_token_incorrect_password, [Integration, Auth]),
        api_scenario!(api_use_access_token, [Integration, Auth]),
        api_scenario!(api_repeated_invalid_login_is_rejected, [Integration, Auth]),
        api_scenario!(api_missing_token_is_rejected, [Integration, Auth]),
        api_scenario!(api_invalid_token_is_rejected, [Integration, Auth]),
        api_scenario!(api_recover_password_unknown_email, [Integration, Auth]),
        api_scenario!(api_reset_password_invalid_token, [Integration, Auth]),
    ]
}

async fn api_get_access_token(api: &ApiClient) -> HarnessResult<()> {
    let settings = api.settings();
    let response = api
        .login(&settings.superuser_email, &settings.superuser_password)
        .await?;
    response.expect_status(200)?;
    let token: Token = response.json()?;
    ensure!(!token.access_token.is_empty(), "empty access token");
    ensure_eq!(token.token_type, "bearer");
    Ok(())
}

async fn api_get_access_token_incorrect_password(api: &ApiClient) -> HarnessResult<()> {
    let response = api
        .login(&api.settings().superuser_email, "incorrect")
        .await?;
    response.expect_status(400)?;
    ensure_eq!(response.detail(), Some("Incorrect email or password"));
    Ok(())
}

async fn api_use_access_token(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let response = api
        .send(api.request(Method::POST, "login/test-token", Some(&headers)))
        .await?;
    response.expect_status(200)?;
    let user: UserPublic = response.json()?;
    ensure_eq!(user.email, api.settings().superuser_email);
    Ok(())
}

async fn api_repeated_invalid_login_is_rejected(api: &ApiClient) -> HarnessResult<()> {
    let email = random_email();
    for attempt in 1..=3 {
        let response = api.login(&email, "wrong-password").await?;
        response.expect_status(400)?;
        ensure_eq!(
            response.detail(),
            Some("Incorrect email or password"),
            "attempt {}",
            attempt
        );
    }
    Ok(())
}

async fn api_missing_token_is_rejected(api: &ApiClient) -> HarnessResult<()> {
    let response = api.get("users/me", None).await?;
    response.expect_status(401)?;
    Ok(())
}

async fn api_invalid_token_is_rejected(api: &ApiClient) -> HarnessResult<()> {
    let headers = AuthHeaders::bearer("not-a-jwt")?;
    let response = api.get("users/me", Some(&headers)).await?;
    response.expect_status(403)?;
    ensure_eq!(response.detail(), Some("Could not validate credentials"));
    Ok(())
}

async fn api_recover_password_unknown_email(api: &ApiClient) -> HarnessResult<()> {
    let email = random_email();
    let response = api
        .send(api.request(Method::POST, &format!("password-recovery/{}", email), None))
        .await?;
    response.expect_status(404)?;
    ensure!(
        response.detail().is_some_and(|d| d.contains("does not exist")),
        "unexpected detail: {:?}",
        response.detail()
    );
    Ok(())
}

async fn api_reset_password_invalid_token(api: &ApiClient) -> HarnessResult<()> {
    let body = json!({ "token": "invalid", "new_password": "changethis" });
    let response = api.post_json("reset-password/", None, &body).await?;
    response.expect_status(400)?;
    ensure_eq!(response.detail(), Some("Invalid token"));
    Ok(())
}
