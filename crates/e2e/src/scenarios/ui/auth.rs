//! Login, logout, signup and password recovery pages

use super::new_user;
use crate::error::HarnessResult;
use crate::flows;
use crate::locators::auth;
use crate::random::{random_email_at, random_password, UI_EMAIL_DOMAIN};
use crate::scenario::Scenario;
use crate::session::Session;
use crate::{ensure, ensure_eq};

pub fn all() -> Vec<Scenario> {
    vec![
        ui_scenario!(login_page_renders, [Auth]),
        ui_scenario!(login_with_valid_credentials, [Auth]),
        ui_scenario!(login_with_invalid_email_format, [Auth]),
        ui_scenario!(login_with_incorrect_password, [Auth]),
        ui_scenario!(login_with_non_existent_user, [Auth]),
        ui_scenario!(login_with_empty_credentials, [Auth]),
        ui_scenario!(repeated_invalid_login_stays_on_login_page, [Auth]),
        ui_scenario!(logged_in_user_is_sent_home_from_login, [Auth]),
        ui_scenario!(logout_redirects_to_login, [Auth]),
        ui_scenario!(protected_route_redirects_after_logout, [Auth]),
        ui_scenario!(signup_page_loads, [Auth]),
        ui_scenario!(signup_new_user, [Auth]),
        ui_scenario!(signup_with_existing_email, [Auth]),
        ui_scenario!(signup_with_mismatched_passwords, [Auth]),
        ui_scenario!(signup_with_weak_password, [Auth]),
        ui_scenario!(signup_link_opens_signup_page, [Auth]),
        ui_scenario!(forgot_password_link_opens_recovery, [Auth]),
        ui_scenario!(password_recovery_sends_email, [Auth]),
        ui_scenario!(reset_password_with_mismatched_passwords, [Auth]),
        ui_scenario!(reset_password_with_invalid_token, [Auth]),
    ]
}

/// Document title of every public page
const APP_TITLE: &str = "Full Stack FastAPI Project";

async fn expect_app_title(session: &Session) -> HarnessResult<()> {
    let title = session.title().await?;
    ensure!(title.contains(APP_TITLE), "unexpected page title {:?}", title);
    Ok(())
}

async fn login_page_renders(session: &Session) -> HarnessResult<()> {
    session.goto("/login").await?;
    expect_app_title(session).await?;
    for locator in [
        &auth::EMAIL_INPUT,
        &auth::PASSWORD_INPUT,
        &auth::LOGIN_BUTTON,
        &auth::FORGOT_PASSWORD_LINK,
        &auth::SIGNUP_LINK,
    ] {
        session.wait_for(locator, session.timeout()).await?;
    }
    Ok(())
}

async fn login_with_valid_credentials(session: &Session) -> HarnessResult<()> {
    flows::login_as_privileged_user(session).await?;
    ensure_eq!(session.current_url().await?, session.url("/"));
    Ok(())
}

async fn login_with_invalid_email_format(session: &Session) -> HarnessResult<()> {
    flows::login(session, "invalid-email", "password", false).await?;
    flows::expect_page_text(session, "Invalid email address").await?;
    ensure_eq!(session.current_url().await?, session.url("/login"));
    Ok(())
}

async fn login_with_incorrect_password(session: &Session) -> HarnessResult<()> {
    let email = session.settings().superuser_email.clone();
    flows::login(session, &email, "wrongpassword", false).await?;
    flows::expect_error_toast(session, "Incorrect email or password").await?;
    ensure_eq!(session.current_url().await?, session.url("/login"));
    Ok(())
}

async fn login_with_non_existent_user(session: &Session) -> HarnessResult<()> {
    let email = random_email_at(UI_EMAIL_DOMAIN);
    flows::login(session, &email, "password", false).await?;
    flows::expect_error_toast(session, "Incorrect email or password").await?;
    Ok(())
}

async fn login_with_empty_credentials(session: &Session) -> HarnessResult<()> {
    session.goto("/login").await?;
    session.click(&auth::LOGIN_BUTTON).await?;
    flows::expect_page_text(session, "Username is required").await?;
    ensure_eq!(session.current_url().await?, session.url("/login"));
    Ok(())
}

async fn repeated_invalid_login_stays_on_login_page(session: &Session) -> HarnessResult<()> {
    let email = random_email_at(UI_EMAIL_DOMAIN);
    for _ in 0..3 {
        flows::login(session, &email, "not-the-password", false).await?;
        flows::expect_error_toast(session, "Incorrect email or password").await?;
        ensure_eq!(session.current_url().await?, session.url("/login"));
    }
    Ok(())
}

async fn logged_in_user_is_sent_home_from_login(session: &Session) -> HarnessResult<()> {
    flows::login_as_privileged_user(session).await?;
    session.goto("/login").await?;
    session
        .wait_for_url_to_be(&session.url("/"), session.timeout())
        .await
}

async fn logout_redirects_to_login(session: &Session) -> HarnessResult<()> {
    flows::login_as_privileged_user(session).await?;
    flows::logout(session).await?;
    ensure_eq!(session.current_url().await?, session.url("/login"));
    session.wait_for(&auth::LOGIN_BUTTON, session.timeout()).await?;
    Ok(())
}

async fn protected_route_redirects_after_logout(session: &Session) -> HarnessResult<()> {
    flows::login_as_privileged_user(session).await?;
    flows::logout(session).await?;
    session.goto("/settings").await?;
    session
        .wait_for_url_to_be(&session.url("/login"), session.timeout())
        .await
}

async fn signup_page_loads(session: &Session) -> HarnessResult<()> {
    session.goto("/signup").await?;
    expect_app_title(session).await?;
    for locator in [
        &auth::FULL_NAME_INPUT,
        &auth::EMAIL_INPUT,
        &auth::PASSWORD_INPUT,
        &auth::CONFIRM_PASSWORD_INPUT,
        &auth::SIGNUP_BUTTON,
    ] {
        session.wait_for(locator, session.timeout()).await?;
    }
    Ok(())
}

async fn signup_new_user(session: &Session) -> HarnessResult<()> {
    let email = random_email_at(UI_EMAIL_DOMAIN);
    let password = random_password();
    flows::signup(session, "Test User", &email, &password, &password).await?;
    session
        .wait_for_url_to_be(&session.url("/login"), session.timeout())
        .await?;

    // The new account is usable straight away
    flows::login(session, &email, &password, true).await
}

async fn signup_with_existing_email(session: &Session) -> HarnessResult<()> {
    let existing = new_user(session).await?;
    let password = random_password();
    flows::signup(session, "Test User", &existing.email, &password, &password).await?;
    flows::expect_error_toast(session, "already exists").await?;
    ensure_eq!(session.current_url().await?, session.url("/signup"));
    Ok(())
}

async fn signup_with_mismatched_passwords(session: &Session) -> HarnessResult<()> {
    let email = random_email_at(UI_EMAIL_DOMAIN);
    flows::signup(session, "Test User", &email, "password123", "password456").await?;
    flows::expect_page_text(session, "The passwords do not match").await?;
    ensure_eq!(session.current_url().await?, session.url("/signup"));

    // Nothing was registered
    let response = session.api().login(&email, "password123").await?;
    ensure!(
        response.status.as_u16() == 400,
        "mismatched signup created an account ({})",
        response.status
    );
    Ok(())
}

async fn signup_with_weak_password(session: &Session) -> HarnessResult<()> {
    session.goto("/signup").await?;
    session.fill(&auth::PASSWORD_INPUT, "123").await?;
    // Leaving the field runs its validation
    session.click(&auth::EMAIL_INPUT).await?;
    flows::expect_page_text(session, "at least 8 characters").await
}

async fn signup_link_opens_signup_page(session: &Session) -> HarnessResult<()> {
    session.goto("/login").await?;
    session.click(&auth::SIGNUP_LINK).await?;
    session
        .wait_for_url_to_be(&session.url("/signup"), session.timeout())
        .await?;
    session.wait_for(&auth::FULL_NAME_INPUT, session.timeout()).await?;
    Ok(())
}

async fn forgot_password_link_opens_recovery(session: &Session) -> HarnessResult<()> {
    session.goto("/login").await?;
    session.click(&auth::FORGOT_PASSWORD_LINK).await?;
    session
        .wait_for_url_to_be(&session.url("/recover-password"), session.timeout())
        .await?;
    session
        .wait_for(&auth::RECOVER_CONTINUE_BUTTON, session.timeout())
        .await?;
    Ok(())
}

async fn password_recovery_sends_email(session: &Session) -> HarnessResult<()> {
    let email = session.settings().superuser_email.clone();
    session.goto("/recover-password").await?;
    session.fill(&auth::EMAIL_INPUT, &email).await?;
    session.click(&auth::RECOVER_CONTINUE_BUTTON).await?;
    flows::expect_success_toast(session).await
}

async fn reset_password_with_mismatched_passwords(session: &Session) -> HarnessResult<()> {
    session.goto("/reset-password?token=somefaketoken").await?;
    session
        .fill(&auth::NEW_PASSWORD_INPUT, "newValidPassword1")
        .await?;
    session
        .fill(&auth::CONFIRM_PASSWORD_INPUT, "newValidPassword2")
        .await?;
    session.click(&auth::RESET_PASSWORD_BUTTON).await?;
    flows::expect_page_text(session, "The passwords do not match").await
}

async fn reset_password_with_invalid_token(session: &Session) -> HarnessResult<()> {
    session.goto("/reset-password?token=invalid").await?;
    let password = random_password();
    session.fill(&auth::NEW_PASSWORD_INPUT, &password).await?;
    session.fill(&auth::CONFIRM_PASSWORD_INPUT, &password).await?;
    session.click(&auth::RESET_PASSWORD_BUTTON).await?;
    flows::expect_error_toast(session, "Invalid token").await
}
