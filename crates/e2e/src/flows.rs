//! Reusable UI flows
//!
//! Login walks `/login` → credentials entered → submitted and then, when
//! success is expected, waits for the home page. Negative paths are left to
//! the caller, since each one shows a different message.

use tracing::{error, info};

use crate::error::{HarnessError, HarnessResult};
use crate::locators::{auth, common, dashboard, nav, settings};
use crate::session::Session;

/// Log in through the form.
///
/// With `expect_success` the call returns only once the browser sits on the
/// home page and the welcome text has rendered.
pub async fn login(
    session: &Session,
    email: &str,
    password: &str,
    expect_success: bool,
) -> HarnessResult<()> {
    session.goto("/login").await?;
    session.fill(&auth::EMAIL_INPUT, email).await?;
    session.fill(&auth::PASSWORD_INPUT, password).await?;
    session.click(&auth::LOGIN_BUTTON).await?;

    if expect_success {
        session
            .wait_for_url_to_be(&session.url("/"), session.timeout())
            .await?;
        session
            .wait_for(&dashboard::WELCOME_MESSAGE, session.timeout())
            .await?;
        info!("Logged in as {}", email);
    }
    Ok(())
}

/// Log in as the configured superuser and wait for the welcome banner
pub async fn login_as_privileged_user(session: &Session) -> HarnessResult<()> {
    let settings = session.settings();
    login(
        session,
        &settings.superuser_email,
        &settings.superuser_password,
        true,
    )
    .await
}

/// Log out through the user menu and land on `/login`
pub async fn logout(session: &Session) -> HarnessResult<()> {
    guarded("open user menu", session.click(&nav::USER_MENU_BUTTON)).await?;
    guarded("click log out", session.click(&nav::LOGOUT_BUTTON)).await?;
    guarded(
        "reach login page",
        session.wait_for_url_to_be(&session.url("/login"), session.timeout()),
    )
    .await?;
    Ok(())
}

async fn guarded<T>(
    step: &str,
    action: impl std::future::Future<Output = HarnessResult<T>>,
) -> HarnessResult<T> {
    action.await.map_err(|e| {
        error!("Logout step '{}' failed: {}", step, e);
        HarnessError::StepFailed {
            step: step.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Fill and submit the signup form; the caller asserts the outcome
pub async fn signup(
    session: &Session,
    full_name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> HarnessResult<()> {
    session.goto("/signup").await?;
    session.fill(&auth::FULL_NAME_INPUT, full_name).await?;
    session.fill(&auth::EMAIL_INPUT, email).await?;
    session.fill(&auth::PASSWORD_INPUT, password).await?;
    session
        .fill(&auth::CONFIRM_PASSWORD_INPUT, confirm_password)
        .await?;
    session.click(&auth::SIGNUP_BUTTON).await
}

/// Open `/settings` on the given tab
pub async fn open_settings_tab(session: &Session, tab: settings::Tab) -> HarnessResult<()> {
    session.goto("/settings").await?;
    session.click(&settings::tab(tab)).await
}

/// Wait for the success toast, then for toasts to clear
pub async fn expect_success_toast(session: &Session) -> HarnessResult<()> {
    session
        .wait_for(&common::SUCCESS_TOAST, session.timeout())
        .await?;
    session.wait_for_toast_to_disappear(session.timeout()).await
}

/// Wait for the error toast and its description to carry `message`, then
/// for toasts to clear
pub async fn expect_error_toast(session: &Session, message: &str) -> HarnessResult<()> {
    session.wait_for(&common::ERROR_TOAST, session.timeout()).await?;
    session
        .wait_for_text(&common::TOAST_DESCRIPTION, message, session.timeout())
        .await?;
    session.wait_for_toast_to_disappear(session.timeout()).await
}

/// Confirm a destructive alert dialog and wait for it to close
pub async fn confirm_delete_dialog(session: &Session) -> HarnessResult<()> {
    session.click(&common::CONFIRM_DELETE_BUTTON).await?;
    session
        .wait_for_invisibility(&common::CONFIRM_DIALOG, session.timeout())
        .await
}

/// Message rendered anywhere on the page, such as a form validation error
pub async fn expect_page_text(session: &Session, text: &str) -> HarnessResult<()> {
    session
        .wait_for_text(&common::BODY, text, session.timeout())
        .await?;
    Ok(())
}
