//! Signup form validation.
//!
//! A pure function from the submitted fields to one message per field, where
//! an empty message means the field is fine. Message wording is part of the
//! contract with the signup page and is kept exactly as shown to users.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NAME_EMPTY: &str = "Name should not be empty";
pub const EMAIL_EMPTY: &str = "Email should not be empty";
pub const EMAIL_MISMATCH: &str = "Email didn't match";
pub const PASSWORD_EMPTY: &str = "Password should not be empty";
pub const PASSWORD_WEAK: &str = "Password must be at least 3 characters.";
/// Used both when the confirmation is itself too weak and when it differs
/// from the password.
pub const PASSWORD_MISMATCH: &str = "Password doesn't match";

const PASSWORD_MIN_LEN: usize = 8;

/// The fields of the signup form. Absent fields count as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// One message per form field; empty when the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupErrors {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupErrors {
    /// True iff every field passed.
    pub fn is_valid(&self) -> bool {
        self.name.is_empty()
            && self.email.is_empty()
            && self.password.is_empty()
            && self.confirm_password.is_empty()
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Something, an `@`, something, a dot, something; no whitespace or extra `@`.
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// At least eight ASCII letters and digits, with a digit, a lowercase and an
/// uppercase letter among them. Symbols are not allowed.
fn is_strong_password(value: &str) -> bool {
    value.len() >= PASSWORD_MIN_LEN
        && value.chars().all(|c| c.is_ascii_alphanumeric())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
}

fn message(error: Option<&str>) -> String {
    error.unwrap_or_default().to_string()
}

pub fn validate(form: &SignupForm) -> SignupErrors {
    let name = form.name.is_empty().then_some(NAME_EMPTY);

    let email = if form.email.is_empty() {
        Some(EMAIL_EMPTY)
    } else if !is_email(&form.email) {
        Some(EMAIL_MISMATCH)
    } else {
        None
    };

    let password = if form.password.is_empty() {
        Some(PASSWORD_EMPTY)
    } else if !is_strong_password(&form.password) {
        Some(PASSWORD_WEAK)
    } else {
        None
    };

    let confirm_password = if form.confirm_password.is_empty() {
        Some(PASSWORD_EMPTY)
    } else if !is_strong_password(&form.confirm_password) || form.password != form.confirm_password
    {
        Some(PASSWORD_MISMATCH)
    } else {
        None
    };

    SignupErrors {
        name: message(name),
        email: message(email),
        password: message(password),
        confirm_password: message(confirm_password),
    }
}
