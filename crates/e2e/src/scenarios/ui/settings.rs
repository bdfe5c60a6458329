//! User settings: profile, password, appearance and account deletion

use super::login_as_new_user;
use crate::error::HarnessResult;
use crate::flows;
use crate::locators::settings::{self, Tab};
use crate::locators::{auth, common};
use crate::random::{random_email_at, random_password, random_suffix, UI_EMAIL_DOMAIN};
use crate::scenario::Scenario;
use crate::session::Session;
use crate::{ensure, ensure_eq};

pub fn all() -> Vec<Scenario> {
    vec![
        ui_scenario!(profile_shows_email, [Settings]),
        ui_scenario!(enter_edit_mode_and_cancel, [Settings]),
        ui_scenario!(update_full_name, [Settings]),
        ui_scenario!(update_email, [Settings]),
        ui_scenario!(update_email_with_invalid_format, [Settings]),
        ui_scenario!(update_email_to_existing_one, [Settings]),
        ui_scenario!(change_password_then_login, [Settings, Auth]),
        ui_scenario!(change_password_wrong_current_password, [Settings]),
        ui_scenario!(change_password_mismatched_confirmation, [Settings]),
        ui_scenario!(change_password_with_weak_new_password, [Settings]),
        ui_scenario!(switch_to_dark_mode, [Settings]),
        ui_scenario!(delete_own_account, [Settings]),
        ui_scenario!(superuser_has_no_danger_zone, [Settings, Admin]),
    ]
}

/// Put the profile form in edit mode
async fn edit_profile(session: &Session) -> HarnessResult<()> {
    flows::open_settings_tab(session, Tab::MyProfile).await?;
    session.click(&settings::EDIT_BUTTON).await
}

async fn profile_shows_email(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    flows::open_settings_tab(session, Tab::MyProfile).await?;
    flows::expect_page_text(session, &user.email).await?;
    flows::expect_page_text(session, &user.full_name).await
}

async fn enter_edit_mode_and_cancel(session: &Session) -> HarnessResult<()> {
    login_as_new_user(session).await?;
    edit_profile(session).await?;
    session.wait_for(&auth::FULL_NAME_INPUT, session.timeout()).await?;

    session.click(&settings::CANCEL_BUTTON).await?;
    session
        .wait_for_invisibility(&auth::FULL_NAME_INPUT, session.timeout())
        .await
}

async fn update_full_name(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let new_name = format!("Renamed {}", random_suffix());

    edit_profile(session).await?;
    session.fill(&auth::FULL_NAME_INPUT, &new_name).await?;
    session.click(&settings::SAVE_BUTTON).await?;
    flows::expect_success_toast(session).await?;

    flows::expect_page_text(session, &new_name).await?;
    let me = session.api().me(&user.headers).await?;
    ensure_eq!(me.full_name.as_deref(), Some(new_name.as_str()));
    Ok(())
}

async fn update_email(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let new_email = random_email_at(UI_EMAIL_DOMAIN);

    edit_profile(session).await?;
    session.fill(&auth::EMAIL_FIELD, &new_email).await?;
    session.click(&settings::SAVE_BUTTON).await?;
    flows::expect_success_toast(session).await?;

    flows::expect_page_text(session, &new_email).await?;
    // Credentials follow the new address
    session
        .api()
        .get_auth_headers(&new_email, &user.password)
        .await?;
    Ok(())
}

async fn update_email_with_invalid_format(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;

    edit_profile(session).await?;
    session.fill(&auth::EMAIL_FIELD, "invalid-email").await?;
    session.click(&settings::SAVE_BUTTON).await?;
    flows::expect_page_text(session, "Something went wrong").await?;
    flows::expect_page_text(session, "value is not a valid email address").await?;

    let me = session.api().me(&user.headers).await?;
    ensure_eq!(me.email, user.email);
    Ok(())
}

async fn update_email_to_existing_one(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let taken = session.settings().superuser_email.clone();

    edit_profile(session).await?;
    session.fill(&auth::EMAIL_FIELD, &taken).await?;
    session.click(&settings::SAVE_BUTTON).await?;
    flows::expect_error_toast(session, "already exists").await?;

    let me = session.api().me(&user.headers).await?;
    ensure_eq!(me.email, user.email);
    Ok(())
}

async fn change_password_then_login(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let new_password = random_password();

    flows::open_settings_tab(session, Tab::Password).await?;
    session
        .fill(&auth::CURRENT_PASSWORD_INPUT, &user.password)
        .await?;
    session.fill(&auth::NEW_PASSWORD_INPUT, &new_password).await?;
    session
        .fill(&auth::CONFIRM_PASSWORD_INPUT, &new_password)
        .await?;
    session.click(&settings::SAVE_BUTTON).await?;
    flows::expect_success_toast(session).await?;

    flows::logout(session).await?;
    flows::login(session, &user.email, &new_password, true).await?;

    let stale = session.api().login(&user.email, &user.password).await?;
    stale.expect_status(400)?;
    Ok(())
}

async fn change_password_wrong_current_password(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let new_password = random_password();

    flows::open_settings_tab(session, Tab::Password).await?;
    session
        .fill(&auth::CURRENT_PASSWORD_INPUT, "not-my-password")
        .await?;
    session.fill(&auth::NEW_PASSWORD_INPUT, &new_password).await?;
    session
        .fill(&auth::CONFIRM_PASSWORD_INPUT, &new_password)
        .await?;
    session.click(&settings::SAVE_BUTTON).await?;
    flows::expect_error_toast(session, "Incorrect password").await?;

    session
        .api()
        .login(&user.email, &user.password)
        .await?
        .expect_status(200)?;
    Ok(())
}

async fn change_password_mismatched_confirmation(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;

    flows::open_settings_tab(session, Tab::Password).await?;
    session
        .fill(&auth::CURRENT_PASSWORD_INPUT, &user.password)
        .await?;
    session.fill(&auth::NEW_PASSWORD_INPUT, "newpassword1").await?;
    session
        .fill(&auth::CONFIRM_PASSWORD_INPUT, "newpassword2")
        .await?;
    // Leaving the confirmation field runs its validation
    session.click(&auth::CURRENT_PASSWORD_INPUT).await?;

    ensure!(
        !session.is_enabled(&settings::SAVE_BUTTON).await?,
        "save is enabled with mismatched passwords"
    );
    session
        .wait_for_text(&common::FIELD_ERROR, "do not match", session.timeout())
        .await?;
    session
        .api()
        .login(&user.email, &user.password)
        .await?
        .expect_status(200)?;
    Ok(())
}

async fn change_password_with_weak_new_password(session: &Session) -> HarnessResult<()> {
    login_as_new_user(session).await?;

    flows::open_settings_tab(session, Tab::Password).await?;
    session.fill(&auth::NEW_PASSWORD_INPUT, "123").await?;
    session.click(&auth::CURRENT_PASSWORD_INPUT).await?;

    ensure!(
        !session.is_enabled(&settings::SAVE_BUTTON).await?,
        "save is enabled with a weak password"
    );
    flows::expect_page_text(session, "at least 8 characters").await
}

async fn switch_to_dark_mode(session: &Session) -> HarnessResult<()> {
    login_as_new_user(session).await?;
    flows::open_settings_tab(session, Tab::Appearance).await?;

    session.click(&settings::DARK_MODE_OPTION).await?;
    session
        .wait_for_attribute_contains(
            &settings::DOCUMENT_ROOT,
            "class",
            "dark",
            session.timeout(),
        )
        .await?;

    session.click(&settings::LIGHT_MODE_OPTION).await?;
    session
        .wait_for_attribute_contains(
            &settings::DOCUMENT_ROOT,
            "class",
            "light",
            session.timeout(),
        )
        .await?;
    Ok(())
}

async fn delete_own_account(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    flows::open_settings_tab(session, Tab::DangerZone).await?;
    session.click(&settings::DELETE_ACCOUNT_BUTTON).await?;
    flows::confirm_delete_dialog(session).await?;

    session
        .wait_for_url_to_be(&session.url("/login"), session.timeout())
        .await?;
    let response = session.api().login(&user.email, &user.password).await?;
    response.expect_status(400)?;
    Ok(())
}

async fn superuser_has_no_danger_zone(session: &Session) -> HarnessResult<()> {
    flows::login_as_privileged_user(session).await?;
    session.goto("/settings").await?;
    session
        .wait_for(&settings::tab(Tab::MyProfile), session.timeout())
        .await?;
    ensure_eq!(session.is_visible(&settings::tab(Tab::DangerZone)).await?, false);
    Ok(())
}
