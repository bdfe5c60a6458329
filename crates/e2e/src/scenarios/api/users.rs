//! User management through the API

use std::collections::HashSet;

use serde_json::json;
use uuid::Uuid;

use super::{list_page, new_user};
use crate::api::{ApiClient, ItemPublic, Message, Page, Token, UserPublic};
use crate::error::HarnessResult;
use crate::random::{random_email, random_lower_string, random_password};
use crate::scenario::Scenario;
use crate::{ensure, ensure_eq};

pub fn all() -> Vec<Scenario> {
    vec![
        api_scenario!(api_read_user_me_as_superuser, [Integration, Admin]),
        api_scenario!(api_read_user_me_as_normal_user, [Integration, Settings]),
        api_scenario!(api_create_user_as_superuser, [Integration, Admin]),
        api_scenario!(api_create_user_existing_email, [Integration, Admin]),
        api_scenario!(api_create_user_as_normal_user_forbidden, [Integration, Admin]),
        api_scenario!(api_create_user_invalid_email, [Integration, Admin]),
        api_scenario!(api_get_user_by_id_as_superuser, [Integration, Admin]),
        api_scenario!(api_get_own_user_by_id, [Integration, Settings]),
        api_scenario!(api_get_other_user_without_privileges, [Integration, Admin]),
        api_scenario!(api_list_users_as_superuser, [Integration, Admin]),
        api_scenario!(api_list_users_as_normal_user_forbidden, [Integration, Admin]),
        api_scenario!(api_list_users_pagination, [Integration, Admin]),
        api_scenario!(api_update_user_me, [Integration, Settings]),
        api_scenario!(api_update_user_me_email_exists, [Integration, Settings]),
        api_scenario!(api_update_password_me, [Integration, Settings]),
        api_scenario!(api_update_password_me_incorrect_password, [Integration, Settings]),
        api_scenario!(api_update_password_me_same_password, [Integration, Settings]),
        api_scenario!(api_register_user, [Integration, Auth]),
        api_scenario!(api_register_user_existing_email, [Integration, Auth]),
        api_scenario!(api_update_user_as_superuser, [Integration, Admin]),
        api_scenario!(api_update_user_not_found, [Integration, Admin]),
        api_scenario!(api_update_user_email_exists, [Integration, Admin]),
        api_scenario!(api_update_other_user_without_privileges, [Integration, Admin]),
        api_scenario!(api_delete_user_me, [Integration, Settings]),
        api_scenario!(api_delete_user_me_as_superuser, [Integration, Admin]),
        api_scenario!(api_delete_user_as_superuser, [Integration, Admin]),
        api_scenario!(api_delete_user_not_found, [Integration, Admin]),
        api_scenario!(api_delete_user_without_privileges, [Integration, Admin]),
        api_scenario!(api_delete_user_removes_their_items, [Integration, Admin, Items]),
    ]
}

const USER_NOT_FOUND: &str = "User not found";
const NOT_ENOUGH_PRIVILEGES: &str = "The user doesn't have enough privileges";
const EMAIL_TAKEN: &str = "User with this email already exists";
const SELF_DELETE: &str = "Super users are not allowed to delete themselves";
const ALREADY_REGISTERED: &str = "already exists in the system";

async fn api_read_user_me_as_superuser(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let me = api.me(&headers).await?;
    ensure_eq!(me.email, api.settings().superuser_email);
    ensure!(me.is_active, "superuser is inactive");
    ensure!(me.is_superuser, "superuser lacks the superuser flag");
    Ok(())
}

async fn api_read_user_me_as_normal_user(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let me = api.me(&user.headers).await?;
    ensure_eq!(me.id, user.user.id);
    ensure!(me.is_active, "new user is inactive");
    ensure!(!me.is_superuser, "signed-up user is a superuser");
    Ok(())
}

async fn api_create_user_as_superuser(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let email = random_email();
    let password = random_password();
    let created = api
        .create_user(&headers, &email, &password, None, false)
        .await?;
    ensure_eq!(created.email, email);

    // The new account can log in right away
    let own = api.get_auth_headers(&email, &password).await?;
    ensure_eq!(api.me(&own).await?.id, created.id);
    Ok(())
}

async fn api_create_user_existing_email(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let email = random_email();
    api.create_user(&headers, &email, &random_password(), None, false)
        .await?;

    let body = json!({ "email": email, "password": random_password() });
    let response = api.post_json("users/", Some(&headers), &body).await?;
    response.expect_status(400)?;
    ensure!(
        response.detail().is_some_and(|d| d.contains(ALREADY_REGISTERED)),
        "unexpected detail: {:?}",
        response.detail()
    );
    Ok(())
}

async fn api_create_user_as_normal_user_forbidden(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let body = json!({ "email": random_email(), "password": random_password() });
    let response = api.post_json("users/", Some(&user.headers), &body).await?;
    response.expect_status(403)?;
    ensure_eq!(response.detail(), Some(NOT_ENOUGH_PRIVILEGES));
    Ok(())
}

async fn api_create_user_invalid_email(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let body = json!({
        "email": "invalid-email-format",
        "password": random_password(),
        "full_name": "Invalid Email",
    });
    let response = api.post_json("users/", Some(&headers), &body).await?;
    response.expect_status(422)?;
    Ok(())
}

async fn api_get_user_by_id_as_superuser(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let created = api
        .create_user(&headers, &random_email(), &random_password(), Some("Lookup"), false)
        .await?;

    let response = api
        .get(&format!("users/{}", created.id), Some(&headers))
        .await?;
    response.expect_status(200)?;
    let fetched: UserPublic = response.json()?;
    ensure_eq!(fetched.email, created.email);
    ensure_eq!(fetched.full_name.as_deref(), Some("Lookup"));
    Ok(())
}

async fn api_get_own_user_by_id(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let response = api
        .get(&format!("users/{}", user.user.id), Some(&user.headers))
        .await?;
    response.expect_status(200)?;
    let fetched: UserPublic = response.json()?;
    ensure_eq!(fetched.email, user.user.email);
    Ok(())
}

async fn api_get_other_user_without_privileges(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let other = new_user(api).await?;
    let response = api
        .get(&format!("users/{}", other.user.id), Some(&user.headers))
        .await?;
    response.expect_status(403)?;
    ensure_eq!(response.detail(), Some(NOT_ENOUGH_PRIVILEGES));
    Ok(())
}

async fn api_list_users_as_superuser(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    for _ in 0..2 {
        api.create_user(&headers, &random_email(), &random_password(), None, false)
            .await?;
    }

    let response = api.get("users/", Some(&headers)).await?;
    response.expect_status(200)?;
    let page: Page<UserPublic> = response.json()?;
    ensure!(page.count >= 2, "expected at least 2 users, got {}", page.count);
    ensure!(
        page.data.iter().all(|u| !u.email.is_empty()),
        "listed user without an email"
    );
    Ok(())
}

async fn api_list_users_as_normal_user_forbidden(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let response = api.get("users/", Some(&user.headers)).await?;
    response.expect_status(403)?;
    ensure_eq!(response.detail(), Some(NOT_ENOUGH_PRIVILEGES));
    Ok(())
}

async fn api_list_users_pagination(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    for _ in 0..10 {
        api.create_user(&headers, &random_email(), &random_password(), None, false)
            .await?;
    }

    let first: Page<UserPublic> = list_page(api, "users/", &headers, 0, 5).await?;
    let second: Page<UserPublic> = list_page(api, "users/", &headers, 5, 5).await?;
    ensure_eq!(first.data.len(), 5);
    ensure_eq!(second.data.len(), 5);
    ensure!(first.count >= 10, "count {} below created users", first.count);

    let first_ids: HashSet<Uuid> = first.data.iter().map(|u| u.id).collect();
    ensure!(
        second.data.iter().all(|u| !first_ids.contains(&u.id)),
        "pages overlap"
    );
    Ok(())
}

async fn api_update_user_me(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let email = random_email();
    let body = json!({ "full_name": "Updated Name", "email": email });
    let response = api
        .patch_json("users/me", Some(&user.headers), &body)
        .await?;
    response.expect_status(200)?;
    let updated: UserPublic = response.json()?;
    ensure_eq!(updated.email, email);
    ensure_eq!(updated.full_name.as_deref(), Some("Updated Name"));

    let me = api.me(&user.headers).await?;
    ensure_eq!(me.email, email);
    Ok(())
}

async fn api_update_user_me_email_exists(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let body = json!({ "email": api.settings().superuser_email });
    let response = api
        .patch_json("users/me", Some(&user.headers), &body)
        .await?;
    response.expect_status(409)?;
    ensure_eq!(response.detail(), Some(EMAIL_TAKEN));
    Ok(())
}

async fn api_update_password_me(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let new_password = random_password();
    let body = json!({ "current_password": user.password, "new_password": new_password });
    let response = api
        .patch_json("users/me/password", Some(&user.headers), &body)
        .await?;
    response.expect_status(200)?;
    let message: Message = response.json()?;
    ensure_eq!(message.message, "Password updated successfully");

    api.login(&user.user.email, &new_password)
        .await?
        .expect_status(200)?;
    api.login(&user.user.email, &user.password)
        .await?
        .expect_status(400)?;

    // Restore so the account stays usable with its original credentials
    let new_headers = api.get_auth_headers(&user.user.email, &new_password).await?;
    let body = json!({ "current_password": new_password, "new_password": user.password });
    api.patch_json("users/me/password", Some(&new_headers), &body)
        .await?
        .expect_status(200)?;
    api.login(&user.user.email, &user.password)
        .await?
        .expect_status(200)?;
    Ok(())
}

async fn api_update_password_me_incorrect_password(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let body = json!({ "current_password": "not-the-password", "new_password": random_password() });
    let response = api
        .patch_json("users/me/password", Some(&user.headers), &body)
        .await?;
    response.expect_status(400)?;
    ensure_eq!(response.detail(), Some("Incorrect password"));
    Ok(())
}

async fn api_update_password_me_same_password(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let body = json!({ "current_password": user.password, "new_password": user.password });
    let response = api
        .patch_json("users/me/password", Some(&user.headers), &body)
        .await?;
    response.expect_status(400)?;
    ensure_eq!(
        response.detail(),
        Some("New password cannot be the same as the current one")
    );
    Ok(())
}

async fn api_register_user(api: &ApiClient) -> HarnessResult<()> {
    let email = random_email();
    let password = random_lower_string(12);
    let response = api.signup("New Signee", &email, &password).await?;
    response.expect_status(200)?;
    let created: UserPublic = response.json()?;
    ensure_eq!(created.email, email);
    ensure_eq!(created.full_name.as_deref(), Some("New Signee"));
    ensure!(!created.is_superuser, "self-registered user is a superuser");

    let login = api.login(&email, &password).await?;
    login.expect_status(200)?;
    let token: Token = login.json()?;
    ensure!(!token.access_token.is_empty(), "empty access token");

    let headers = api.get_auth_headers(&email, &password).await?;
    let me = api.me(&headers).await?;
    ensure_eq!(me.id, created.id);
    ensure_eq!(me.email, email);
    Ok(())
}

async fn api_register_user_existing_email(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let response = api
        .signup("Second Signee", &user.user.email, &random_password())
        .await?;
    response.expect_status(400)?;
    ensure!(
        response.detail().is_some_and(|d| d.contains(ALREADY_REGISTERED)),
        "unexpected detail: {:?}",
        response.detail()
    );
    Ok(())
}

async fn api_update_user_as_superuser(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let created = api
        .create_user(&headers, &random_email(), &random_password(), None, false)
        .await?;

    let body = json!({ "full_name": "Updated_full_name" });
    let response = api
        .patch_json(&format!("users/{}", created.id), Some(&headers), &body)
        .await?;
    response.expect_status(200)?;
    let updated: UserPublic = response.json()?;
    ensure_eq!(updated.id, created.id);
    ensure_eq!(updated.full_name.as_deref(), Some("Updated_full_name"));
    Ok(())
}

async fn api_update_user_not_found(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let body = json!({ "full_name": "Nobody" });
    let response = api
        .patch_json(&format!("users/{}", Uuid::new_v4()), Some(&headers), &body)
        .await?;
    response.expect_status(404)?;
    ensure_eq!(
        response.detail(),
        Some("The user with this id does not exist in the system")
    );
    Ok(())
}

async fn api_update_user_email_exists(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let first = api
        .create_user(&headers, &random_email(), &random_password(), None, false)
        .await?;
    let second = api
        .create_user(&headers, &random_email(), &random_password(), None, false)
        .await?;

    let body = json!({ "email": second.email });
    let response = api
        .patch_json(&format!("users/{}", first.id), Some(&headers), &body)
        .await?;
    response.expect_status(409)?;
    ensure_eq!(response.detail(), Some(EMAIL_TAKEN));
    Ok(())
}

async fn api_update_other_user_without_privileges(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let other = new_user(api).await?;
    let body = json!({ "full_name": "Hacked Name" });
    let response = api
        .patch_json(&format!("users/{}", other.user.id), Some(&user.headers), &body)
        .await?;
    response.expect_status(403)?;

    let unchanged = api.me(&other.headers).await?;
    ensure_eq!(unchanged.full_name.as_deref(), Some("Test User"));
    Ok(())
}

async fn api_delete_user_me(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let response = api.delete("users/me", Some(&user.headers)).await?;
    response.expect_status(200)?;
    let message: Message = response.json()?;
    ensure_eq!(message.message, "User deleted successfully");

    let response = api.get("users/me", Some(&user.headers)).await?;
    response.expect_status(404)?;
    ensure_eq!(response.detail(), Some(USER_NOT_FOUND));
    Ok(())
}

async fn api_delete_user_me_as_superuser(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let response = api.delete("users/me", Some(&headers)).await?;
    response.expect_status(403)?;
    ensure_eq!(response.detail(), Some(SELF_DELETE));
    Ok(())
}

async fn api_delete_user_as_superuser(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let created = api
        .create_user(&headers, &random_email(), &random_password(), None, false)
        .await?;

    let path = format!("users/{}", created.id);
    let response = api.delete(&path, Some(&headers)).await?;
    response.expect_status(200)?;
    let message: Message = response.json()?;
    ensure_eq!(message.message, "User deleted successfully");

    api.get(&path, Some(&headers)).await?.expect_status(404)?;
    Ok(())
}

async fn api_delete_user_not_found(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let response = api
        .delete(&format!("users/{}", Uuid::new_v4()), Some(&headers))
        .await?;
    response.expect_status(404)?;
    ensure_eq!(response.detail(), Some(USER_NOT_FOUND));
    Ok(())
}

async fn api_delete_user_without_privileges(api: &ApiClient) -> HarnessResult<()> {
    let user = new_user(api).await?;
    let other = new_user(api).await?;
    let response = api
        .delete(&format!("users/{}", other.user.id), Some(&user.headers))
        .await?;
    response.expect_status(403)?;
    ensure_eq!(response.detail(), Some(NOT_ENOUGH_PRIVILEGES));

    // Still there
    api.me(&other.headers).await?;
    Ok(())
}

async fn api_delete_user_removes_their_items(api: &ApiClient) -> HarnessResult<()> {
    let headers = api.superuser_headers().await?;
    let owner = new_user(api).await?;

    let mut items: Vec<ItemPublic> = Vec::new();
    for n in 0..3 {
        let item = api
            .create_item(&owner.headers, &format!("Owned {}", n), None)
            .await?;
        ensure_eq!(item.owner_id, owner.user.id);
        items.push(item);
    }

    api.delete(&format!("users/{}", owner.user.id), Some(&headers))
        .await?
        .expect_status(200)?;

    for item in &items {
        let response = api
            .get(&format!("items/{}", item.id), Some(&headers))
            .await?;
        response.expect_status(404)?;
    }
    Ok(())
}
