//! Items page: dialogs, table rows and pagination

use super::login_as_new_user;
use crate::api::{ItemPublic, Page};
use crate::error::HarnessResult;
use crate::flows;
use crate::locators::{common, items, Locator};
use crate::random::random_suffix;
use crate::scenario::Scenario;
use crate::session::Session;
use crate::{ensure, ensure_eq};

pub fn all() -> Vec<Scenario> {
    vec![
        ui_scenario!(add_item, [Items]),
        ui_scenario!(add_item_requires_title, [Items]),
        ui_scenario!(add_item_dialog_cancel, [Items]),
        ui_scenario!(items_empty_state_is_shown, [Items]),
        ui_scenario!(edit_item_dialog_opens_with_data, [Items]),
        ui_scenario!(edit_item, [Items]),
        ui_scenario!(delete_item_confirmation, [Items]),
        ui_scenario!(delete_item, [Items]),
        ui_scenario!(items_pagination, [Items]),
    ]
}

/// Rows per page in the items table
const PAGE_SIZE: usize = 5;

async fn open_add_item_dialog(session: &Session) -> HarnessResult<()> {
    session.goto("/items").await?;
    session.click(&items::ADD_ITEM_BUTTON).await?;
    session
        .wait_for_text(&common::DIALOG_TITLE, "Add Item", session.timeout())
        .await?;
    Ok(())
}

/// Open the row menu of `title` and pick `entry`
async fn open_row_menu(
    session: &Session,
    title: &str,
    entry: &Locator,
) -> HarnessResult<()> {
    session.goto("/items").await?;
    session.click(&items::item_actions(title)).await?;
    session.click(entry).await
}

async fn add_item(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let title = format!("Item {}", random_suffix());

    open_add_item_dialog(session).await?;
    session.fill(&items::TITLE_INPUT, &title).await?;
    session.fill(&items::DESCRIPTION_INPUT, "Added from the browser").await?;
    session.click(&common::DIALOG_SAVE_BUTTON).await?;
    flows::expect_success_toast(session).await?;

    session
        .wait_for(&items::item_row(&title), session.timeout())
        .await?;

    let response = session.api().get("items/", Some(&user.headers)).await?;
    response.expect_status(200)?;
    let listed: Page<ItemPublic> = response.json()?;
    ensure!(
        listed.data.iter().any(|item| item.title == title),
        "{} missing from the API listing",
        title
    );
    Ok(())
}

async fn add_item_requires_title(session: &Session) -> HarnessResult<()> {
    login_as_new_user(session).await?;
    open_add_item_dialog(session).await?;
    session.fill(&items::DESCRIPTION_INPUT, "No title").await?;

    ensure!(
        !session.is_enabled(&common::DIALOG_SAVE_BUTTON).await?,
        "save is enabled without a title"
    );
    ensure!(
        session.is_visible(&common::DIALOG).await?,
        "dialog closed without a title"
    );
    Ok(())
}

async fn add_item_dialog_cancel(session: &Session) -> HarnessResult<()> {
    login_as_new_user(session).await?;
    open_add_item_dialog(session).await?;
    session.click(&common::DIALOG_CANCEL_BUTTON).await?;
    session
        .wait_for_invisibility(&common::DIALOG_TITLE, session.timeout())
        .await
}

async fn items_empty_state_is_shown(session: &Session) -> HarnessResult<()> {
    login_as_new_user(session).await?;
    session.goto("/items").await?;
    session.wait_for(&items::EMPTY_STATE, session.timeout()).await?;
    Ok(())
}

async fn edit_item_dialog_opens_with_data(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let title = format!("Edit Test Item {}", random_suffix());
    session
        .api()
        .create_item(&user.headers, &title, None)
        .await?;

    open_row_menu(session, &title, &items::EDIT_ITEM_MENU_ITEM).await?;
    session.wait_for(&common::DIALOG_TITLE, session.timeout()).await?;
    ensure_eq!(session.value_of(&items::TITLE_INPUT).await?, title);
    Ok(())
}

async fn edit_item(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let title = format!("Before {}", random_suffix());
    let updated = format!("After {}", random_suffix());
    session
        .api()
        .create_item(&user.headers, &title, Some("original"))
        .await?;

    open_row_menu(session, &title, &items::EDIT_ITEM_MENU_ITEM).await?;
    session.fill(&items::TITLE_INPUT, &updated).await?;
    session.click(&common::DIALOG_SAVE_BUTTON).await?;
    flows::expect_success_toast(session).await?;

    session
        .wait_for_text(&common::TABLE_BODY, &updated, session.timeout())
        .await?;
    session
        .wait_for_invisibility(&items::item_row(&title), session.timeout())
        .await
}

async fn delete_item_confirmation(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let title = format!("Confirm Delete Item {}", random_suffix());
    session
        .api()
        .create_item(&user.headers, &title, None)
        .await?;

    open_row_menu(session, &title, &items::DELETE_ITEM_MENU_ITEM).await?;
    let heading = session.text_of(&common::DIALOG_TITLE).await?;
    ensure!(
        heading.contains("Delete Item"),
        "unexpected confirmation title {:?}",
        heading
    );
    session.wait_for(&common::CONFIRM_DELETE_BUTTON, session.timeout()).await?;
    Ok(())
}

async fn delete_item(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    let title = format!("Doomed {}", random_suffix());
    let item = session
        .api()
        .create_item(&user.headers, &title, None)
        .await?;

    open_row_menu(session, &title, &items::DELETE_ITEM_MENU_ITEM).await?;
    flows::confirm_delete_dialog(session).await?;
    flows::expect_success_toast(session).await?;

    session
        .wait_for_invisibility(&items::item_row(&title), session.timeout())
        .await?;
    session
        .api()
        .get(&format!("items/{}", item.id), Some(&user.headers))
        .await?
        .expect_status(404)?;
    Ok(())
}

async fn items_pagination(session: &Session) -> HarnessResult<()> {
    let user = login_as_new_user(session).await?;
    for n in 0..=PAGE_SIZE {
        let title = format!("Page Item {} {}", n, random_suffix());
        session
            .api()
            .create_item(&user.headers, &title, None)
            .await?;
    }

    session.goto("/items").await?;
    session.wait_for(&common::TABLE_BODY, session.timeout()).await?;
    session.click(&common::page_button(2)).await?;
    session
        .wait_for_url_to_be(&session.url("/items?page=2"), session.timeout())
        .await?;

    ensure!(
        session.is_enabled(&common::PREVIOUS_PAGE_BUTTON).await?,
        "previous page is disabled on page 2"
    );
    session.click(&common::PREVIOUS_PAGE_BUTTON).await?;
    session
        .wait_for_url_to_be(&session.url("/items?page=1"), session.timeout())
        .await?;
    Ok(())
}
