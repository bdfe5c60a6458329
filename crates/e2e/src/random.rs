//! Random test data
//!
//! The backend keeps every record across scenarios, so anything unique
//! (emails, titles) must be fresh per scenario.

use rand::distributions::Alphanumeric;
use rand::Rng;

pub const API_EMAIL_DOMAIN: &str = "test-api.com";
pub const UI_EMAIL_DOMAIN: &str = "example.com";

/// `len` random lowercase ASCII letters
pub fn random_lower_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

/// Unique address under the API test domain
pub fn random_email() -> String {
    random_email_at(API_EMAIL_DOMAIN)
}

pub fn random_email_at(domain: &str) -> String {
    format!("{}@{}", random_lower_string(16), domain)
}

/// Twelve lowercase letters, valid for the backend's minimum length
pub fn random_password() -> String {
    random_lower_string(12)
}

/// Short alphanumeric suffix for item titles and names
pub fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}
