use super::login_as_new_user;
use crate::error::HarnessResult;
use crate::flows;
use crate::locators::{common, dashboard, items, nav};
use crate::scenario::Scenario;
use crate::session::Session;
use crate::{ensure, ensure_eq};

pub fn all() -> Vec<Scenario> {
    vec![
        ui_scenario!(dashboard_shows_welcome_greeting, [Dashboard]),
        ui_scenario!(sidebar_navigation, [Dashboard]),
        ui_scenario!(user_menu_opens, [Dashboard]),
        ui_scenario!(normal_user_has_no_admin_link, [Dashboard, Admin]),
        ui_scenario!(unknown_route_shows_not_found, [Dashboard]),
    ]
}

async fn dashboard_shows_welcome_greeting(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let greeting = session.text_of(&dashboard::GREETING).await?;
    ensure!(greeting.contains("Hi,"), "unexpected greeting: {:?}", greeting);
    ensure!(
        greeting.contains(&user.full_name),
        "greeting {:?} does not name {}",
        greeting,
        user.full_name
    );
    session
        .wait_for(&dashboard::WELCOME_MESSAGE, session.timeout())
        .await?;
    Ok(())
}

async fn sidebar_navigation(session: &Session) -> HarnessResult<()> {
    flows::login_as_privileged_user(session).await?;

    session.click(&nav::SIDEBAR_ITEMS).await?;
    session
        .wait_for_url_to_be(&session.url("/items"), session.timeout())
        .await?;
    session
        .wait_for_text(&nav::PAGE_HEADING, "Items Management", session.timeout())
        .await?;
    session.wait_for(&items::ADD_ITEM_BUTTON, session.timeout()).await?;

    session.click(&nav::SIDEBAR_SETTINGS).await?;
    session
        .wait_for_url_to_be(&session.url("/settings"), session.timeout())
        .await?;
    session
        .wait_for_text(&nav::PAGE_HEADING, "User Settings", session.timeout())
        .await?;

    session.click(&nav::SIDEBAR_DASHBOARD).await?;
    session
        .wait_for_url_to_be(&session.url("/"), session.timeout())
        .await?;
    session
        .wait_for(&dashboard::WELCOME_MESSAGE, session.timeout())
        .await?;
    Ok(())
}

async fn user_menu_opens(session: &Session) -> HarnessResult<()> {
    flows::login_as_privileged_user(session).await?;
    session.click(&nav::USER_MENU_BUTTON).await?;
    session
        .wait_for(&nav::MY_PROFILE_MENU_ITEM, session.timeout())
        .await?;
    session.wait_for(&nav::LOGOUT_BUTTON, session.timeout()).await?;
    Ok(())
}

async fn normal_user_has_no_admin_link(session: &Session) -> HarnessResult<()> {
    login_as_new_user(session).await?;
    // Sidebar is rendered once its regular entries are
    session.wait_for(&nav::SIDEBAR_ITEMS, session.timeout()).await?;
    ensure_eq!(session.is_visible(&nav::SIDEBAR_ADMIN).await?, false);
    Ok(())
}

async fn unknown_route_shows_not_found(session: &Session) -> HarnessResult<()> {
    flows::login_as_privileged_user(session).await?;
    session.goto("/invalid-route").await?;
    session
        .wait_for(&common::text("404"), session.timeout())
        .await?;
    Ok(())
}
