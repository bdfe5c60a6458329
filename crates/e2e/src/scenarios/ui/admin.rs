//! Admin user management

use std::time::Duration;

use super::{login_as_new_user, new_user};
use crate::error::{HarnessError, HarnessResult};
use crate::flows;
use crate::locators::{admin, auth, common, nav};
use crate::random::{random_email_at, random_password, random_suffix, UI_EMAIL_DOMAIN};
use crate::scenario::Scenario;
use crate::session::Session;
use crate::{ensure, ensure_eq};

pub fn all() -> Vec<Scenario> {
    vec![
        ui_scenario!(admin_users_table_visible, [Admin]),
        ui_scenario!(admin_add_user_dialog_cancel, [Admin]),
        ui_scenario!(admin_add_user, [Admin]),
        ui_scenario!(admin_add_superuser, [Admin]),
        ui_scenario!(admin_add_user_existing_email, [Admin]),
        ui_scenario!(admin_edit_user, [Admin]),
        ui_scenario!(admin_delete_user, [Admin]),
        ui_scenario!(admin_normal_user_cannot_reach_admin, [Admin]),
        ui_scenario!(admin_users_pagination, [Admin]),
    ]
}

/// Rows per page in the users table
const PAGE_SIZE: usize = 5;

/// How long to look for a row on each page before moving on
const ROW_LOOKUP: Duration = Duration::from_secs(2);

async fn open_admin(session: &Session) -> HarnessResult<()> {
    flows::login_as_privileged_user(session).await?;
    session.click(&nav::SIDEBAR_ADMIN).await?;
    session
        .wait_for_url_to_be(&session.url("/admin"), session.timeout())
        .await?;
    session
        .wait_for_text(&nav::PAGE_HEADING, "Users Management", session.timeout())
        .await?;
    session.wait_for(&common::TABLE_BODY, session.timeout()).await?;
    Ok(())
}

/// Page through the users table until the row for `email` is on screen.
///
/// New accounts land wherever the backend orders them, so every page is
/// searched until the next page button turns disabled.
async fn reveal_user_row(session: &Session, email: &str) -> HarnessResult<()> {
    let row = admin::user_row(email);
    let mut pages = 1;
    loop {
        match session.wait_for(&row, ROW_LOOKUP).await {
            Ok(_) => return Ok(()),
            Err(e) if e.is_timeout() => {}
            Err(e) => return Err(e),
        }
        if !session.is_enabled(&common::NEXT_PAGE_BUTTON).await? {
            break;
        }
        session.click(&common::NEXT_PAGE_BUTTON).await?;
        pages += 1;
    }
    Err(HarnessError::AssertionFailed(format!(
        "{} not found in {} page(s) of users",
        email, pages
    )))
}

/// Fill and submit the add-user dialog
async fn submit_new_user(
    session: &Session,
    email: &str,
    full_name: &str,
    password: &str,
    superuser: bool,
) -> HarnessResult<()> {
    session.click(&admin::ADD_USER_BUTTON).await?;
    session.wait_for(&common::DIALOG_TITLE, session.timeout()).await?;
    session.fill(&auth::EMAIL_INPUT, email).await?;
    session.fill(&auth::FULL_NAME_INPUT, full_name).await?;
    session.fill(&auth::PASSWORD_INPUT, password).await?;
    session.fill(&auth::CONFIRM_PASSWORD_INPUT, password).await?;
    if superuser {
        session.click(&admin::IS_SUPERUSER_CHECKBOX).await?;
    }
    session.click(&common::DIALOG_SAVE_BUTTON).await
}

async fn admin_users_table_visible(session: &Session) -> HarnessResult<()> {
    open_admin(session).await?;
    session.wait_for(&admin::ADD_USER_BUTTON, session.timeout()).await?;
    let rows = session
        .wait_for_all(&common::TABLE_ROWS, session.timeout())
        .await?;
    ensure!(rows.len() <= PAGE_SIZE, "{} rows on one page", rows.len());
    let email = session.settings().superuser_email.clone();
    reveal_user_row(session, &email).await
}

async fn admin_add_user_dialog_cancel(session: &Session) -> HarnessResult<()> {
    open_admin(session).await?;
    session.click(&admin::ADD_USER_BUTTON).await?;
    session
        .wait_for_text(&common::DIALOG_TITLE, "Add User", session.timeout())
        .await?;
    session.click(&common::DIALOG_CANCEL_BUTTON).await?;
    session
        .wait_for_invisibility(&common::DIALOG_TITLE, session.timeout())
        .await
}

async fn admin_add_user(session: &Session) -> HarnessResult<()> {
    open_admin(session).await?;
    let email = random_email_at(UI_EMAIL_DOMAIN);
    let password = random_password();
    submit_new_user(session, &email, "Added By Admin", &password, false).await?;
    flows::expect_success_toast(session).await?;

    reveal_user_row(session, &email).await?;
    let headers = session.api().get_auth_headers(&email, &password).await?;
    let me = session.api().me(&headers).await?;
    ensure_eq!(me.full_name.as_deref(), Some("Added By Admin"));
    ensure!(!me.is_superuser, "plain user was created as superuser");
    Ok(())
}

async fn admin_add_superuser(session: &Session) -> HarnessResult<()> {
    open_admin(session).await?;
    let email = random_email_at(UI_EMAIL_DOMAIN);
    let password = random_password();
    submit_new_user(session, &email, "Added Superuser", &password, true).await?;
    flows::expect_success_toast(session).await?;

    let headers = session.api().get_auth_headers(&email, &password).await?;
    let me = session.api().me(&headers).await?;
    ensure!(me.is_superuser, "superuser flag was not saved");
    Ok(())
}

async fn admin_add_user_existing_email(session: &Session) -> HarnessResult<()> {
    open_admin(session).await?;
    let email = session.settings().superuser_email.clone();
    submit_new_user(session, &email, "Duplicate", &random_password(), false).await?;
    flows::expect_error_toast(session, "already exists").await
}

async fn admin_edit_user(session: &Session) -> HarnessResult<()> {
    let target = new_user(session).await?;
    let new_name = format!("Edited {}", random_suffix());

    open_admin(session).await?;
    reveal_user_row(session, &target.email).await?;
    session.click(&admin::user_actions(&target.email)).await?;
    session.click(&admin::EDIT_USER_MENU_ITEM).await?;
    session.wait_for(&common::DIALOG_TITLE, session.timeout()).await?;
    session.fill(&auth::FULL_NAME_INPUT, &new_name).await?;
    session.click(&common::DIALOG_SAVE_BUTTON).await?;
    flows::expect_success_toast(session).await?;

    session
        .wait_for_text(&admin::user_row(&target.email), &new_name, session.timeout())
        .await?;
    let me = session.api().me(&target.headers).await?;
    ensure_eq!(me.full_name.as_deref(), Some(new_name.as_str()));
    Ok(())
}

async fn admin_delete_user(session: &Session) -> HarnessResult<()> {
    let target = new_user(session).await?;

    open_admin(session).await?;
    reveal_user_row(session, &target.email).await?;
    session.click(&admin::user_actions(&target.email)).await?;
    session.click(&admin::DELETE_USER_MENU_ITEM).await?;
    flows::confirm_delete_dialog(session).await?;
    flows::expect_success_toast(session).await?;

    session
        .wait_for_invisibility(&admin::user_row(&target.email), session.timeout())
        .await?;
    let response = session
        .api()
        .login(&target.email, &target.password)
        .await?;
    response.expect_status(400)?;
    Ok(())
}

async fn admin_normal_user_cannot_reach_admin(session: &Session) -> HarnessResult<()> {
    login_as_new_user(session).await?;
    session.goto("/admin").await?;
    session
        .wait_for_url_to_be(&session.url("/"), session.timeout())
        .await?;
    ensure_eq!(session.is_visible(&admin::ADD_USER_BUTTON).await?, false);
    ensure_eq!(session.is_visible(&nav::SIDEBAR_ADMIN).await?, false);
    Ok(())
}

async fn admin_users_pagination(session: &Session) -> HarnessResult<()> {
    let api = session.api();
    let headers = api.superuser_headers().await?;
    for _ in 0..=PAGE_SIZE {
        api.create_user(
            &headers,
            &random_email_at(UI_EMAIL_DOMAIN),
            &random_password(),
            None,
            false,
        )
        .await?;
    }

    open_admin(session).await?;
    session.click(&common::page_button(2)).await?;
    session
        .wait_for_url_to_be(&session.url("/admin?page=2"), session.timeout())
        .await?;
    ensure!(
        session.is_enabled(&common::PREVIOUS_PAGE_BUTTON).await?,
        "previous page is disabled on page 2"
    );
    Ok(())
}
