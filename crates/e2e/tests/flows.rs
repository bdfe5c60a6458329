//! Login and logout flows against a scripted fake browser

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use common::{api_client, fast_settings, navigate, show, FakeFactory, FakePage, UI_BASE};
use fullstack_e2e::locators::{auth, common as ui, dashboard, nav};
use fullstack_e2e::{flows, with_session, HarnessError};

/// Login page whose submit button lands on the dashboard
fn login_page() -> FakePage {
    let page = FakePage::new();
    page.show(&auth::EMAIL_INPUT, "", Duration::ZERO)
        .show(&auth::PASSWORD_INPUT, "", Duration::ZERO)
        .show(&auth::LOGIN_BUTTON, "Log In", Duration::ZERO)
        .on_click(
            &auth::LOGIN_BUTTON,
            vec![
                navigate(&format!("{}/", UI_BASE)),
                show(
                    &dashboard::WELCOME_MESSAGE,
                    "Welcome back, nice to see you again!",
                    Duration::from_millis(40),
                ),
            ],
        );
    page
}

/// Page with a user menu whose log out entry returns to `/login`
fn logged_in_page() -> FakePage {
    let page = FakePage::new();
    page.set_url(&format!("{}/", UI_BASE))
        .show(&nav::USER_MENU_BUTTON, "", Duration::ZERO)
        .on_click(
            &nav::USER_MENU_BUTTON,
            vec![show(&nav::LOGOUT_BUTTON, "Log Out", Duration::from_millis(20))],
        )
        .on_click(
            &nav::LOGOUT_BUTTON,
            vec![navigate(&format!("{}/login", UI_BASE))],
        );
    page
}

#[tokio::test]
async fn test_login_waits_for_home_and_welcome() {
    let page = login_page();
    let factory = FakeFactory::new(page.clone());
    let settings = Arc::new(fast_settings());

    with_session(&factory, settings.clone(), api_client(&settings), |s| {
        flows::login(s, "admin@example.com", "changethis", true).boxed()
    })
    .await
    .unwrap();

    assert_eq!(page.url(), "http://ui.test/");
    assert_eq!(
        page.typed(),
        vec![
            (auth::EMAIL_INPUT.selector().to_string(), "admin@example.com".to_string()),
            (auth::PASSWORD_INPUT.selector().to_string(), "changethis".to_string()),
        ]
    );
    assert_eq!(page.clicks(), vec![auth::LOGIN_BUTTON.selector().to_string()]);
}

#[tokio::test]
async fn test_privileged_login_uses_configured_superuser() {
    let page = login_page();
    let factory = FakeFactory::new(page.clone());
    let mut settings = fast_settings();
    settings.superuser_email = "root@corp.test".to_string();
    settings.superuser_password = "hunter22".to_string();
    let settings = Arc::new(settings);

    with_session(&factory, settings.clone(), api_client(&settings), |s| {
        flows::login_as_privileged_user(s).boxed()
    })
    .await
    .unwrap();

    let typed: Vec<String> = page.typed().into_iter().map(|(_, text)| text).collect();
    assert_eq!(typed, vec!["root@corp.test", "hunter22"]);
}

#[tokio::test]
async fn test_login_without_expected_success_returns_after_submit() {
    let page = FakePage::new();
    page.show(&auth::EMAIL_INPUT, "", Duration::ZERO)
        .show(&auth::PASSWORD_INPUT, "", Duration::ZERO)
        .show(&auth::LOGIN_BUTTON, "Log In", Duration::ZERO)
        .on_click(
            &auth::LOGIN_BUTTON,
            vec![
                show(&ui::ERROR_TOAST, "Something went wrong!", Duration::from_millis(20)),
                show(
                    &ui::TOAST_DESCRIPTION,
                    "Incorrect email or password",
                    Duration::from_millis(20),
                ),
            ],
        );
    let factory = FakeFactory::new(page.clone());
    let settings = Arc::new(fast_settings());

    with_session(&factory, settings.clone(), api_client(&settings), |s| {
        async move {
            flows::login(s, "nobody@example.com", "wrong", false).await?;
            flows::expect_error_toast(s, "Incorrect email or password").await
        }
        .boxed()
    })
    .await
    .unwrap();

    assert_eq!(page.url(), "http://ui.test/login");
}

#[tokio::test]
async fn test_failed_login_times_out_on_home_url() {
    let page = FakePage::new();
    page.show(&auth::EMAIL_INPUT, "", Duration::ZERO)
        .show(&auth::PASSWORD_INPUT, "", Duration::ZERO)
        .show(&auth::LOGIN_BUTTON, "Log In", Duration::ZERO);
    let factory = FakeFactory::new(page);
    let settings = Arc::new(fast_settings());

    let err = with_session(&factory, settings.clone(), api_client(&settings), |s| {
        flows::login(s, "admin@example.com", "wrong", true).boxed()
    })
    .await
    .unwrap_err();

    match err {
        HarnessError::Timeout { condition, .. } => {
            assert!(condition.contains("http://ui.test/"), "condition: {}", condition)
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_logout_reaches_login_page() {
    let page = logged_in_page();
    let factory = FakeFactory::new(page.clone());
    let settings = Arc::new(fast_settings());

    with_session(&factory, settings.clone(), api_client(&settings), |s| {
        flows::logout(s).boxed()
    })
    .await
    .unwrap();

    assert_eq!(page.url(), "http://ui.test/login");
    assert_eq!(
        page.clicks(),
        vec![
            nav::USER_MENU_BUTTON.selector().to_string(),
            nav::LOGOUT_BUTTON.selector().to_string(),
        ]
    );
}

#[tokio::test]
async fn test_logout_names_the_failed_step() {
    // Menu opens but never offers a log out entry
    let page = FakePage::new();
    page.set_url(&format!("{}/", UI_BASE))
        .show(&nav::USER_MENU_BUTTON, "", Duration::ZERO);
    let factory = FakeFactory::new(page);
    let settings = Arc::new(fast_settings());

    let err = with_session(&factory, settings.clone(), api_client(&settings), |s| {
        flows::logout(s).boxed()
    })
    .await
    .unwrap_err();

    match err {
        HarnessError::StepFailed { step, reason } => {
            assert_eq!(step, "click log out");
            assert!(reason.contains("log out menu item"), "reason: {}", reason);
        }
        other => panic!("expected a step failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_logout_without_user_menu_fails_first_step() {
    let factory = FakeFactory::new(FakePage::new());
    let settings = Arc::new(fast_settings());

    let err = with_session(&factory, settings.clone(), api_client(&settings), |s| {
        flows::logout(s).boxed()
    })
    .await
    .unwrap_err();

    assert!(
        matches!(err, HarnessError::StepFailed { ref step, .. } if step == "open user menu"),
        "unexpected error: {:?}",
        err
    );
}
