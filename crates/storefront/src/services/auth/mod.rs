//! Authentication service.
//!
//! The storefront has no real identity provider. [`AuthService`] is the port
//! the routes call; [`MockAuthService`] answers after an artificial delay and
//! accepts any well-formed credentials. Form validation runs before the port
//! is called, so implementations receive already-parsed input.

mod error;
mod mock;
mod store;

pub use error::AuthError;
pub use mock::MockAuthService;
pub use store::AuthStore;

use std::sync::LazyLock;

use async_trait::async_trait;
use bizoe_core::{AuthToken, Email, ProfileUpdate, User, ValidationErrors};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Optional leading `+`, then at least ten digits, spaces, dashes or parentheses.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]{10,}$").expect("Invalid regex"));

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
}

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
    #[serde(default = "empty_secret")]
    pub confirm_password: SecretString,
    #[serde(default)]
    pub agree_to_terms: bool,
}

/// Password change form.
#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    #[serde(default = "empty_secret")]
    pub current_password: SecretString,
    #[serde(default = "empty_secret")]
    pub new_password: SecretString,
    #[serde(default = "empty_secret")]
    pub confirm_password: SecretString,
}

/// Missing password fields read as empty.
fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

/// A validated registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Result of a successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: AuthToken,
}

/// Identity provider port.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Sign in with an email address.
    async fn login(&self, email: &Email) -> Result<AuthSession, AuthError>;

    /// Create an account and sign it in.
    async fn register(&self, account: NewAccount) -> Result<AuthSession, AuthError>;

    /// Apply a profile edit and return the stored profile.
    async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<User, AuthError>;

    /// Change the account password.
    async fn change_password(&self, user: &User) -> Result<(), AuthError>;
}

// =============================================================================
// Form Validation
// =============================================================================

/// Validate the login form.
///
/// # Errors
///
/// Returns field errors for a missing or malformed email or a short password.
pub fn validate_login(form: &LoginRequest) -> Result<Email, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let email = parse_email(&mut errors, "email", &form.email);
    check_password_length(&mut errors, "password", &form.password);
    errors.into_result()?;
    email.ok_or_else(ValidationErrors::new)
}

/// Validate the registration form.
///
/// # Errors
///
/// Returns field errors for every rule that fails.
pub fn validate_registration(form: &RegisterRequest) -> Result<NewAccount, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("first_name", &form.first_name);
    errors.require("last_name", &form.last_name);
    let email = parse_email(&mut errors, "email", &form.email);

    errors.require("phone", &form.phone);
    if !form.phone.trim().is_empty() && !PHONE_RE.is_match(form.phone.trim()) {
        errors.add("phone", "phone number format is invalid");
    }

    check_password_strength(&mut errors, "password", &form.password);
    if form.password.expose_secret() != form.confirm_password.expose_secret() {
        errors.add("confirm_password", "passwords do not match");
    }
    if !form.agree_to_terms {
        errors.add("agree_to_terms", "you must agree to the terms of service");
    }

    errors.into_result()?;
    let email = email.ok_or_else(ValidationErrors::new)?;
    Ok(NewAccount {
        email,
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        phone: form.phone.trim().to_string(),
    })
}

/// Validate a profile edit.
///
/// # Errors
///
/// Returns field errors when a supplied name is blank or a supplied phone
/// number is malformed.
pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(first_name) = &update.first_name {
        errors.require("first_name", first_name);
    }
    if let Some(last_name) = &update.last_name {
        errors.require("last_name", last_name);
    }
    if let Some(phone) = update.phone.as_deref().map(str::trim) {
        if !phone.is_empty() && !PHONE_RE.is_match(phone) {
            errors.add("phone", "phone number format is invalid");
        }
    }
    errors.into_result()
}

/// Validate a password change.
///
/// # Errors
///
/// Returns field errors for a missing current password, a short new
/// password, or a mismatched confirmation.
pub fn validate_password_change(form: &PasswordChange) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("current_password", form.current_password.expose_secret());
    check_password_length(&mut errors, "new_password", &form.new_password);
    if form.new_password.expose_secret() != form.confirm_password.expose_secret() {
        errors.add("confirm_password", "passwords do not match");
    }
    errors.into_result()
}

fn parse_email(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<Email> {
    if value.trim().is_empty() {
        errors.require(field, value);
        return None;
    }
    Email::parse(value)
        .inspect_err(|e| errors.add(field, e.to_string()))
        .ok()
}

fn check_password_length(errors: &mut ValidationErrors, field: &str, password: &SecretString) {
    let password = password.expose_secret();
    errors.require(field, password);
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            field,
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }
}

fn check_password_strength(errors: &mut ValidationErrors, field: &str, password: &SecretString) {
    check_password_length(errors, field, password);
    let password = password.expose_secret();
    let has_lower = password.chars().any(char::is_lowercase);
    let has_upper = password.chars().any(char::is_uppercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        errors.add(
            field,
            "password must contain lowercase and uppercase letters and a number",
        );
    }
}
