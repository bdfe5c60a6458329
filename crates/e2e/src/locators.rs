//! Locator registry
//!
//! Every selector the scenarios use lives here, grouped by UI area. Static
//! entries are constants; entries that depend on test data (a row for a given
//! email, an element showing a given text) are built by the functions in the
//! same group. Scenarios must not spell selectors themselves.

use std::borrow::Cow;
use std::fmt;

/// How a selector is interpreted by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Css,
    LinkText,
    XPath,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Css => "css",
            Strategy::LinkText => "link text",
            Strategy::XPath => "xpath",
        }
    }
}

/// A named rule identifying one or more elements of the rendered UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    name: &'static str,
    strategy: Strategy,
    selector: Cow<'static, str>,
}

impl Locator {
    pub const fn css(name: &'static str, selector: &'static str) -> Self {
        Self { name, strategy: Strategy::Css, selector: Cow::Borrowed(selector) }
    }

    pub const fn link_text(name: &'static str, text: &'static str) -> Self {
        Self { name, strategy: Strategy::LinkText, selector: Cow::Borrowed(text) }
    }

    pub const fn xpath(name: &'static str, selector: &'static str) -> Self {
        Self { name, strategy: Strategy::XPath, selector: Cow::Borrowed(selector) }
    }

    fn xpath_owned(name: &'static str, selector: String) -> Self {
        Self { name, strategy: Strategy::XPath, selector: Cow::Owned(selector) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Borrowed form understood by the WebDriver client
    pub fn as_webdriver(&self) -> fantoccini::Locator<'_> {
        match self.strategy {
            Strategy::Css => fantoccini::Locator::Css(&self.selector),
            Strategy::LinkText => fantoccini::Locator::LinkText(&self.selector),
            Strategy::XPath => fantoccini::Locator::XPath(&self.selector),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}: {}]", self.name, self.strategy.as_str(), self.selector)
    }
}

/// Quote arbitrary text as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so text holding both quote kinds is split
/// and glued back with `concat()`.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}


pub mod auth {
    use super::Locator;

    pub const EMAIL_INPUT: Locator = Locator::css("email input", r#"input[placeholder="Email"]"#);
    /// The profile form names its email field instead of giving it a placeholder
    pub const EMAIL_FIELD: Locator = Locator::css("email field", "[name='email']");
    pub const PASSWORD_INPUT: Locator =
        Locator::css("password input", r#"input[placeholder="Password"]"#);
    pub const CONFIRM_PASSWORD_INPUT: Locator =
        Locator::css("confirm password input", "[name='confirm_password']");
    pub const FULL_NAME_INPUT: Locator = Locator::css("full name input", "[name='full_name']");
    pub const NEW_PASSWORD_INPUT: Locator =
        Locator::css("new password input", r#"input[placeholder="New Password"]"#);
    pub const CURRENT_PASSWORD_INPUT: Locator =
        Locator::css("current password input", r#"input[placeholder="Current Password"]"#);
    pub const LOGIN_BUTTON: Locator =
        Locator::xpath("log in button", "//button[normalize-space()='Log In']");
    pub const SIGNUP_BUTTON: Locator =
        Locator::xpath("sign up button", "//button[normalize-space()='Sign Up']");
    pub const FORGOT_PASSWORD_LINK: Locator =
        Locator::link_text("forgot password link", "Forgot Password?");
    pub const SIGNUP_LINK: Locator = Locator::link_text("sign up link", "Sign Up");
    pub const LOGIN_LINK: Locator = Locator::link_text("log in link", "Log In");
    pub const RECOVER_CONTINUE_BUTTON: Locator =
        Locator::xpath("recover password submit", "//button[contains(text(), 'Continue')]");
    pub const RESET_PASSWORD_BUTTON: Locator =
        Locator::xpath("reset password submit", "//button[contains(text(), 'Reset')]");
}

pub mod nav {
    use super::Locator;

    pub const USER_MENU_BUTTON: Locator = Locator::css("user menu", r#"[data-testid="user-menu"]"#);
    pub const LOGOUT_BUTTON: Locator =
        Locator::xpath("log out menu item", "//div[contains(text(), 'Log Out')]");
    pub const MY_PROFILE_MENU_ITEM: Locator =
        Locator::xpath("my profile menu item", "//*[contains(text(), 'My Profile')]");
    pub const SIDEBAR_DASHBOARD: Locator = Locator::xpath("dashboard link", "//a[@href='/']");
    pub const SIDEBAR_ITEMS: Locator = Locator::xpath("items link", "//a[@href='/items']");
    pub const SIDEBAR_SETTINGS: Locator =
        Locator::xpath("user settings link", "//a[@href='/settings']");
    pub const SIDEBAR_ADMIN: Locator = Locator::xpath("admin link", "//a[@href='/admin']");
    /// Section heading of the current page, e.g. "Items Management"
    pub const PAGE_HEADING: Locator = Locator::css("page heading", "h2");
}

pub mod dashboard {
    use super::Locator;

    /// Sub-heading shown only to an authenticated user on `/`
    pub const WELCOME_MESSAGE: Locator =
        Locator::xpath("welcome message", "//*[contains(text(), 'Welcome back')]");
    pub const GREETING: Locator =
        Locator::xpath("greeting heading", "//*[contains(text(), 'Hi,')]");
}

pub mod settings {
    use super::{xpath_literal, Locator};

    pub const EDIT_BUTTON: Locator = Locator::xpath("edit button", "//button[text()='Edit']");
    pub const SAVE_BUTTON: Locator = Locator::xpath("save button", "//button[text()='Save']");
    pub const CANCEL_BUTTON: Locator = Locator::xpath("cancel button", "//button[text()='Cancel']");
    pub const LIGHT_MODE_OPTION: Locator =
        Locator::xpath("light mode option", "//span[text()='Light Mode']");
    pub const DARK_MODE_OPTION: Locator =
        Locator::xpath("dark mode option", "//span[text()='Dark Mode']");
    pub const DOCUMENT_ROOT: Locator = Locator::css("document root", "html");
    pub const DELETE_ACCOUNT_BUTTON: Locator =
        Locator::xpath("delete account button", "//button[text()='Delete']");

    /// Tabs of the `/settings` page
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Tab {
        MyProfile,
        Password,
        Appearance,
        DangerZone,
    }

    impl Tab {
        pub fn label(&self) -> &'static str {
            match self {
                Tab::MyProfile => "My profile",
                Tab::Password => "Password",
                Tab::Appearance => "Appearance",
                Tab::DangerZone => "Danger zone",
            }
        }
    }

    pub fn tab(tab: Tab) -> Locator {
        Locator::xpath_owned(
            "settings tab",
            format!("//button[text()={}]", xpath_literal(tab.label())),
        )
    }
}

pub mod items {
    use super::{xpath_literal, Locator};

    pub const ADD_ITEM_BUTTON: Locator =
        Locator::xpath("add item button", "//button[contains(text(), 'Add Item')]");
    pub const TITLE_INPUT: Locator = Locator::css("item title input", "input#title");
    pub const DESCRIPTION_INPUT: Locator =
        Locator::css("item description input", "input#description");
    pub const EMPTY_STATE: Locator = Locator::xpath(
        "items empty state",
        r#"//*[contains(text(), "don't have any items yet")]"#,
    );
    pub const EDIT_ITEM_MENU_ITEM: Locator =
        Locator::xpath("edit item menu item", "//button[contains(text(), 'Edit Item')]");
    pub const DELETE_ITEM_MENU_ITEM: Locator =
        Locator::xpath("delete item menu item", "//button[contains(text(), 'Delete Item')]");

    /// Table row with a cell containing `title`
    pub fn item_row(title: &str) -> Locator {
        Locator::xpath_owned(
            "item row",
            format!("//tr[td[contains(text(), {})]]", xpath_literal(title)),
        )
    }

    /// "Open menu" trigger in the row of `title`
    pub fn item_actions(title: &str) -> Locator {
        Locator::xpath_owned(
            "item actions menu",
            format!(
                "//tr[td[contains(text(), {})]]//button[@aria-label='Open menu']",
                xpath_literal(title)
            ),
        )
    }
}

pub mod admin {
    use super::{xpath_literal, Locator};

    pub const ADD_USER_BUTTON: Locator =
        Locator::xpath("add user button", "//button[contains(text(), 'Add User')]");
    pub const IS_SUPERUSER_CHECKBOX: Locator =
        Locator::xpath("is superuser checkbox", "//span[text()='Is superuser?']");
    pub const IS_ACTIVE_CHECKBOX: Locator =
        Locator::xpath("is active checkbox", "//span[text()='Is active?']");
    pub const EDIT_USER_MENU_ITEM: Locator =
        Locator::xpath("edit user menu item", "//button[contains(text(), 'Edit User')]");
    pub const DELETE_USER_MENU_ITEM: Locator =
        Locator::xpath("delete user menu item", "//button[contains(text(), 'Delete User')]");

    /// Table row whose second cell, the email column, equals `email`
    pub fn user_row(email: &str) -> Locator {
        Locator::xpath_owned(
            "user row",
            format!("//tbody/tr[td[2][normalize-space()={}]]", xpath_literal(email)),
        )
    }

    /// "Open menu" trigger in the row of `email`
    pub fn user_actions(email: &str) -> Locator {
        Locator::xpath_owned(
            "user actions menu",
            format!(
                "//tbody/tr[td[2][normalize-space()={}]]//button[@aria-label='Open menu']",
                xpath_literal(email)
            ),
        )
    }
}

pub mod common {
    use super::{xpath_literal, Locator};

    pub const SUCCESS_TOAST: Locator =
        Locator::xpath("success toast", "//*[contains(text(), 'Success!')]");
    pub const ERROR_TOAST: Locator =
        Locator::xpath("error toast", "//*[contains(text(), 'Something went wrong!')]");
    /// Message line under a toast title
    pub const TOAST_DESCRIPTION: Locator =
        Locator::css("toast description", "[data-part='description']");
    pub const DIALOG: Locator = Locator::xpath("dialog", "//div[@role='dialog']");
    pub const DIALOG_TITLE: Locator = Locator::css("dialog title", "[data-part='title']");
    pub const DIALOG_SAVE_BUTTON: Locator = Locator::xpath(
        "dialog save button",
        "//div[@role='dialog']//button[normalize-space()='Save']",
    );
    pub const DIALOG_CANCEL_BUTTON: Locator = Locator::xpath(
        "dialog cancel button",
        "//div[@role='dialog']//button[normalize-space()='Cancel']",
    );
    pub const CONFIRM_DIALOG: Locator =
        Locator::xpath("confirm dialog", "//div[@role='alertdialog']");
    pub const CONFIRM_DELETE_BUTTON: Locator = Locator::xpath(
        "confirm delete button",
        "//div[@role='alertdialog']//button[normalize-space()='Delete']",
    );
    pub const FIELD_ERROR: Locator = Locator::css(
        "field error",
        r#"[data-part="error-message"], [data-part="error-text"]"#,
    );
    /// Whole page, for messages that have no element of their own
    pub const BODY: Locator = Locator::css("page body", "body");
    pub const TABLE_BODY: Locator = Locator::css("table body", "tbody");
    pub const TABLE_ROWS: Locator = Locator::css("table rows", "tbody > tr");
    pub const ACTIONS_MENU_BUTTON: Locator =
        Locator::css("row actions menu button", "button[aria-label='Open menu']");
    pub const NEXT_PAGE_BUTTON: Locator =
        Locator::xpath("next page button", "//button[@aria-label='next page']");
    pub const PREVIOUS_PAGE_BUTTON: Locator = Locator::xpath(
        "previous page button",
        "//button[contains(translate(@aria-label, 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', \
         'abcdefghijklmnopqrstuvwxyz'), 'prev')]",
    );

    /// Pagination button jumping to page `n`
    pub fn page_button(n: u32) -> Locator {
        Locator::xpath_owned("page button", format!("//button[@aria-label='page {}']", n))
    }

    /// Any element whose own text contains `text`
    pub fn text(text: &str) -> Locator {
        Locator::xpath_owned(
            "text",
            format!("//*[contains(text(), {})]", xpath_literal(text)),
        )
    }
}

/// Every static entry, for review and consistency checks
pub const ALL: &[Locator] = &[
    auth::EMAIL_INPUT,
    auth::EMAIL_FIELD,
    auth::PASSWORD_INPUT,
    auth::CONFIRM_PASSWORD_INPUT,
    auth::FULL_NAME_INPUT,
    auth::NEW_PASSWORD_INPUT,
    auth::CURRENT_PASSWORD_INPUT,
    auth::LOGIN_BUTTON,
    auth::SIGNUP_BUTTON,
    auth::FORGOT_PASSWORD_LINK,
    auth::SIGNUP_LINK,
    auth::LOGIN_LINK,
    auth::RECOVER_CONTINUE_BUTTON,
    auth::RESET_PASSWORD_BUTTON,
    nav::USER_MENU_BUTTON,
    nav::LOGOUT_BUTTON,
    nav::MY_PROFILE_MENU_ITEM,
    nav::SIDEBAR_DASHBOARD,
    nav::SIDEBAR_ITEMS,
    nav::SIDEBAR_SETTINGS,
    nav::SIDEBAR_ADMIN,
    nav::PAGE_HEADING,
    dashboard::WELCOME_MESSAGE,
    dashboard::GREETING,
    settings::EDIT_BUTTON,
    settings::SAVE_BUTTON,
    settings::CANCEL_BUTTON,
    settings::LIGHT_MODE_OPTION,
    settings::DARK_MODE_OPTION,
    settings::DOCUMENT_ROOT,
    settings::DELETE_ACCOUNT_BUTTON,
    items::ADD_ITEM_BUTTON,
    items::TITLE_INPUT,
    items::DESCRIPTION_INPUT,
    items::EMPTY_STATE,
    items::EDIT_ITEM_MENU_ITEM,
    items::DELETE_ITEM_MENU_ITEM,
    admin::ADD_USER_BUTTON,
    admin::IS_SUPERUSER_CHECKBOX,
    admin::IS_ACTIVE_CHECKBOX,
    admin::EDIT_USER_MENU_ITEM,
    admin::DELETE_USER_MENU_ITEM,
    common::SUCCESS_TOAST,
    common::ERROR_TOAST,
    common::TOAST_DESCRIPTION,
    common::DIALOG,
    common::DIALOG_TITLE,
    common::DIALOG_SAVE_BUTTON,
    common::DIALOG_CANCEL_BUTTON,
    common::CONFIRM_DIALOG,
    common::CONFIRM_DELETE_BUTTON,
    common::FIELD_ERROR,
    common::BODY,
    common::TABLE_BODY,
    common::TABLE_ROWS,
    common::ACTIONS_MENU_BUTTON,
    common::NEXT_PAGE_BUTTON,
    common::PREVIOUS_PAGE_BUTTON,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_names_are_unique() {
        let mut seen = HashSet::new();
        for locator in ALL {
            assert!(seen.insert(locator.name()), "duplicate locator name: {}", locator.name());
        }
    }

    #[test]
    fn test_registry_selectors_are_not_blank() {
        for locator in ALL {
            assert!(!locator.selector().trim().is_empty(), "{} has no selector", locator);
        }
    }

    #[test]
    fn test_xpath_entries_are_absolute() {
        for locator in ALL.iter().filter(|l| l.strategy() == Strategy::XPath) {
            assert!(locator.selector().starts_with("//"), "{}", locator);
        }
    }

    #[test]
    fn test_selectors_match_rendered_markup() {
        let pinned = [
            (&nav::LOGOUT_BUTTON, Strategy::XPath, "//div[contains(text(), 'Log Out')]"),
            (&nav::USER_MENU_BUTTON, Strategy::Css, r#"[data-testid="user-menu"]"#),
            (&auth::EMAIL_INPUT, Strategy::Css, r#"input[placeholder="Email"]"#),
            (&auth::PASSWORD_INPUT, Strategy::Css, r#"input[placeholder="Password"]"#),
            (&auth::FULL_NAME_INPUT, Strategy::Css, "[name='full_name']"),
            (&auth::CONFIRM_PASSWORD_INPUT, Strategy::Css, "[name='confirm_password']"),
            (&auth::LOGIN_BUTTON, Strategy::XPath, "//button[normalize-space()='Log In']"),
            (&auth::SIGNUP_BUTTON, Strategy::XPath, "//button[normalize-space()='Sign Up']"),
            (&auth::FORGOT_PASSWORD_LINK, Strategy::LinkText, "Forgot Password?"),
            (
                &dashboard::WELCOME_MESSAGE,
                Strategy::XPath,
                "//*[contains(text(), 'Welcome back')]",
            ),
            (&common::SUCCESS_TOAST, Strategy::XPath, "//*[contains(text(), 'Success!')]"),
            (
                &common::ERROR_TOAST,
                Strategy::XPath,
                "//*[contains(text(), 'Something went wrong!')]",
            ),
            (&common::TOAST_DESCRIPTION, Strategy::Css, "[data-part='description']"),
            (&common::DIALOG_TITLE, Strategy::Css, "[data-part='title']"),
            (
                &common::CONFIRM_DELETE_BUTTON,
                Strategy::XPath,
                "//div[@role='alertdialog']//button[normalize-space()='Delete']",
            ),
            (&items::TITLE_INPUT, Strategy::Css, "input#title"),
            (&common::TABLE_ROWS, Strategy::Css, "tbody > tr"),
            (
                &common::ACTIONS_MENU_BUTTON,
                Strategy::Css,
                "button[aria-label='Open menu']",
            ),
            (&settings::DARK_MODE_OPTION, Strategy::XPath, "//span[text()='Dark Mode']"),
            (&admin::IS_SUPERUSER_CHECKBOX, Strategy::XPath, "//span[text()='Is superuser?']"),
        ];
        for (locator, strategy, selector) in pinned {
            assert_eq!(locator.strategy(), strategy, "{}", locator);
            assert_eq!(locator.selector(), selector, "{}", locator);
        }
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal(r#"say "it's""#),
            r#"concat('say "it', "'", 's"')"#
        );
    }

    #[test]
    fn test_parameterized_rows_embed_value() {
        let row = admin::user_row("someone@example.com");
        assert_eq!(row.strategy(), Strategy::XPath);
        assert_eq!(
            row.selector(),
            "//tbody/tr[td[2][normalize-space()='someone@example.com']]"
        );
        assert_eq!(row.name(), "user row");

        let item = items::item_row("Groceries");
        assert_eq!(item.selector(), "//tr[td[contains(text(), 'Groceries')]]");
        assert_eq!(
            items::item_actions("Groceries").selector(),
            "//tr[td[contains(text(), 'Groceries')]]//button[@aria-label='Open menu']"
        );
        assert_eq!(
            admin::user_actions("a@b.co").selector(),
            "//tbody/tr[td[2][normalize-space()='a@b.co']]//button[@aria-label='Open menu']"
        );

        assert_eq!(
            common::page_button(2).selector(),
            "//button[@aria-label='page 2']"
        );
        let text = common::text("Item created successfully.");
        assert!(text.selector().contains("Item created successfully."));
    }

    #[test]
    fn test_display_includes_strategy_and_selector() {
        let shown = auth::SIGNUP_LINK.to_string();
        assert_eq!(shown, "sign up link [link text: Sign Up]");
    }

    #[test]
    fn test_settings_tabs() {
        let tab = settings::tab(settings::Tab::DangerZone);
        assert_eq!(tab.selector(), "//button[text()='Danger zone']");
    }

    #[test]
    fn test_previous_page_matches_any_case() {
        let button = common::PREVIOUS_PAGE_BUTTON;
        let selector = button.selector();
        assert!(selector.contains("'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'"));
        assert!(selector.ends_with("'prev')]"));
    }
}
