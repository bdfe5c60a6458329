//! Item CRUD, ownership and pagination through the API

use std::collections::HashSet;

use serde_json::json;
use uuid::Uuid;

use super::{list_page, new_user};
use crate::api::{ApiClient, ItemPublic, Message, Page};
use crate::error::HarnessResult;
use crate::random::random_suffix;
use crate::scenario::Scenario;
use crate::{ensure, ensure_eq};

pub fn all() -> Vec<Scenario> {
    vec![
        api_scenario!(api_create_item, [Integration, Items]),
        api_scenario!(api_create_item_empty_title, [Integration, Items]),
        api_scenario!(api_create_item_missing_title, [Integration, Items]),
        api_scenario!(api_read_item, [Integration, Items]),
        api_scenario!(api_read_item_not_found, [Integration, Items]),
        api_scenario!(api_read_item_not_enough_permissions, [Integration, Items]),
        api_scenario!(api_superuser_reads_any_item, [Integration, Items, Admin]),
        api_scenario!(api_read_items, [Integration, Items]),
        api_scenario!(api_read_items_only_own, [Integration, Items]),
        api_scenario!(api_read_items_pagination, [Integration, Items]),
        api_scenario!(api_update_item, [Integration, Items]),
        api_scenario!(api_update_item_not_found, [Integration, Items]),
        api_scenario!(api_update_item_not_enough_permissions, [Integration, Items]),
        api_scenario!(api_delete_item, [Integration, Items]),
        api_scenario!(api_delete_item_not_found, [Integration, Items]),
        api_scenario!(api_delete_item_not_enough_permissions, [Integration, Items]),
        api_scenario!(api_superuser_deletes_any_item, [Integration, Items, Admin]),
    ]
}

const ITEM_NOT_FOUND: &str = "Item not found";
const NOT_ENOUGH_PERMISSIONS: &str = "Not enough permissions";

async fn api_create_item(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let item = api
        .create_item(&user.headers, "Foo", Some("Fighters"))
        .await?;
    ensure_eq!(item.title, "Foo");
    ensure_eq!(item.description.as_deref(), Some("Fighters"));
    ensure_eq!(item.owner_id, user.user.id);
    Ok(())
}

async fn api_create_item_empty_title(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let body = json!({ "title": "", "description": "Blank" });
    let response = api.post_json("items/", Some(&user.headers), &body).await?;
    response.expect_status(422)?;
    Ok(())
}

async fn api_create_item_missing_title(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let body = json!({ "description": "Missing title" });
    let response = api.post_json("items/", Some(&user.headers), &body).await?;
    response.expect_status(422)?;
    Ok(())
}

async fn api_read_item(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let created = api
        .create_item(&user.headers, &format!("Read {}", random_suffix()), None)
        .await?;

    let response = api
        .get(&format!("items/{}", created.id), Some(&user.headers))
        .await?;
    response.expect_status(200)?;
    let fetched: ItemPublic = response.json()?;
    ensure_eq!(fetched.id, created.id);
    ensure_eq!(fetched.title, created.title);
    ensure_eq!(fetched.owner_id, user.user.id);
    Ok(())
}

async fn api_read_item_not_found(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let response = api
        .get(&format!("items/{}", Uuid::new_v4()), Some(&headers))
        .await?;
    response.expect_status(404)?;
    ensure_eq!(response.detail(), Some(ITEM_NOT_FOUND));
    Ok(())
}

async fn api_read_item_not_enough_permissions(api: &ApiClient) -> HarnessResult<()> {
    let owner = new_user(api).await?;
    let other = new_user(api).await?;
    let item = api.create_item(&owner.headers, "Private", None).await?;

    let response = api
        .get(&format!("items/{}", item.id), Some(&other.headers))
        .await?;
    response.expect_status(400)?;
    ensure_eq!(response.detail(), Some(NOT_ENOUGH_PERMISSIONS));
    Ok(())
}

async fn api_superuser_reads_any_item(api: &ApiClient) -> HarnessResult<()> {
    let owner = new_user(api).await?;
    let item = api
        .create_item(&owner.headers, "Universal Read", Some("Superuser should read this"))
        .await?;

    let headers = api.superuser_headers().await?;
    let response = api
        .get(&format!("items/{}", item.id), Some(&headers))
        .await?;
    response.expect_status(200)?;
    let fetched: ItemPublic = response.json()?;
    ensure_eq!(fetched.id, item.id);
    ensure_eq!(fetched.title, "Universal Read");
    Ok(())
}

async fn api_read_items(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    for n in 0..2 {
        api.create_item(&headers, &format!("Listed {} {}", n, random_suffix()), None)
            .await?;
    }

    let response = api.get("items/", Some(&headers)).await?;
    response.expect_status(200)?;
    let page: Page<ItemPublic> = response.json()?;
    ensure!(page.count >= 2, "expected at least 2 items, got {}", page.count);
    Ok(())
}

async fn api_read_items_only_own(api: &ApiClient) -> HarnessResult<()> {
    let owner = new_user(api).await?;
    let other = new_user(api).await?;
    api.create_item(&other.headers, "Not yours", None).await?;
    let mine = api.create_item(&owner.headers, "Yours", None).await?;

    let page: Page<ItemPublic> = list_page(api, "items/", &owner.headers, 0, 100).await?;
    ensure_eq!(page.count, 1);
    ensure_eq!(page.data.len(), 1);
    ensure_eq!(page.data[0].id, mine.id);
    Ok(())
}

async fn api_read_items_pagination(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let mut created = HashSet::new();
    for n in 0..10 {
        let item = api
            .create_item(&user.headers, &format!("Paginate Item {}", n), None)
            .await?;
        created.insert(item.id);
    }

    let first: Page<ItemPublic> = list_page(api, "items/", &user.headers, 0, 5).await?;
    let second: Page<ItemPublic> = list_page(api, "items/", &user.headers, 5, 5).await?;
    ensure_eq!(first.data.len(), 5);
    ensure_eq!(second.data.len(), 5);
    ensure_eq!(first.count, 10);

    let first_ids: HashSet<Uuid> = first.data.iter().map(|i| i.id).collect();
    let second_ids: HashSet<Uuid> = second.data.iter().map(|i| i.id).collect();
    ensure!(first_ids.is_disjoint(&second_ids), "pages overlap");

    let seen: HashSet<Uuid> = first_ids.union(&second_ids).copied().collect();
    ensure_eq!(seen, created);
    Ok(())
}

async fn api_update_item(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let item = api.create_item(&user.headers, "Before", Some("Old")).await?;

    let body = json!({ "title": "Updated title", "description": "Updated description" });
    let response = api
        .put_json(&format!("items/{}", item.id), Some(&user.headers), &body)
        .await?;
    response.expect_status(200)?;
    let updated: ItemPublic = response.json()?;
    ensure_eq!(updated.id, item.id);
    ensure_eq!(updated.title, "Updated title");
    ensure_eq!(updated.description.as_deref(), Some("Updated description"));
    ensure_eq!(updated.owner_id, user.user.id);
    Ok(())
}

async fn api_update_item_not_found(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let body = json!({ "title": "Nothing" });
    let response = api
        .put_json(&format!("items/{}", Uuid::new_v4()), Some(&headers), &body)
        .await?;
    response.expect_status(404)?;
    ensure_eq!(response.detail(), Some(ITEM_NOT_FOUND));
    Ok(())
}

async fn api_update_item_not_enough_permissions(api: &ApiClient) -> HarnessResult<()> {
    let owner = new_user(api).await?;
    let other = new_user(api).await?;
    let item = api.create_item(&owner.headers, "User A's Item", None).await?;

    let body = json!({ "title": "Malicious Update" });
    let response = api
        .put_json(&format!("items/{}", item.id), Some(&other.headers), &body)
        .await?;
    response.expect_status(400)?;
    ensure_eq!(response.detail(), Some(NOT_ENOUGH_PERMISSIONS));
    Ok(())
}

async fn api_delete_item(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let item = api.create_item(&user.headers, "Delete Me", None).await?;

    let path = format!("items/{}", item.id);
    let response = api.delete(&path, Some(&user.headers)).await?;
    response.expect_status(200)?;
    let message: Message = response.json()?;
    ensure_eq!(message.message, "Item deleted successfully");

    api.get(&path, Some(&user.headers)).await?.expect_status(404)?;
    Ok(())
}

async fn api_delete_item_not_found(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let response = api
        .delete(&format!("items/{}", Uuid::new_v4()), Some(&headers))
        .await?;
    response.expect_status(404)?;
    ensure_eq!(response.detail(), Some(ITEM_NOT_FOUND));
    Ok(())
}

async fn api_delete_item_not_enough_permissions(api: &ApiClient) -> HarnessResult<()> {
    let owner = new_user(api).await?;
    let other = new_user(api).await?;
    let item = api.create_item(&owner.headers, "Keep Me", None).await?;

    let path = format!("items/{}", item.id);
    let response = api.delete(&path, Some(&other.headers)).await?;
    response.expect_status(400)?;
    ensure_eq!(response.detail(), Some(NOT_ENOUGH_PERMISSIONS));

    api.get(&path, Some(&owner.headers)).await?.expect_status(200)?;
    Ok(())
}

async fn api_superuser_deletes_any_item(api: &ApiClient) -> HarnessResult<()> {
    let owner = new_user(api).await?;
    let item = api.create_item(&owner.headers, "Delete Target", None).await?;

    let headers = api.superuser_headers().await?;
    let response = api
        .delete(&format!("items/{}", item.id), Some(&headers))
        .await?;
    response.expect_status(200)?;
    let message: Message = response.json()?;
    ensure_eq!(message.message, "Item deleted successfully");
    Ok(())
}
