//! Input validation for login and registration payloads.
//!
//! Login checks are the session manager's preconditions; registration checks
//! back the account-creation endpoint. All checks are pure and local - no
//! collaborator is consulted.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AuthError;

/// Minimum username length accepted at login.
const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length accepted at login.
const MIN_PASSWORD_LEN: usize = 6;

/// RFC 5322, simplified.
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Letters, spaces, hyphens, and apostrophes only.
static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z '-]+$").expect("valid regex"));

/// RFC 5321 upper bound on address length.
const MAX_EMAIL_LEN: usize = 254;

const MIN_REGISTRATION_PASSWORD_LEN: usize = 8;
const MAX_REGISTRATION_PASSWORD_LEN: usize = 128;

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 50;

/// Special characters a registration password must draw from.
const PASSWORD_SPECIAL_CHARS: &str = "@$!%*?&#";

/// Login preconditions, checked in a fixed order: missing fields, then
/// username length, then password length.
pub fn validate_login(username: &str, password: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "Username and password are required".into(),
        ));
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AuthError::Validation(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Field-keyed validation failures for a registration payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.insert(field.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Default)]
pub struct RegistrationData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Validate a full registration payload. Every field is checked so the
/// caller gets one error per offending field, not just the first.
pub fn validate_registration(data: &RegistrationData) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_name(&mut errors, "first_name", "First name", &data.first_name);
    check_name(&mut errors, "last_name", "Last name", &data.last_name);
    check_email(&mut errors, &data.email);
    check_password(&mut errors, &data.password);
    check_password_match(&mut errors, &data.password, &data.confirm_password);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_required(errors: &mut ValidationErrors, field: &str, label: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
        return false;
    }
    true
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if !check_required(errors, "email", "Email", email) {
        return;
    }
    if !EMAIL_REGEX.is_match(email) {
        errors.add("email", "Please enter a valid email address");
        return;
    }
    if email.len() > MAX_EMAIL_LEN {
        errors.add("email", "Email address is too long");
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str) {
    if !check_required(errors, "password", "Password", password) {
        return;
    }
    if password.chars().count() < MIN_REGISTRATION_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {MIN_REGISTRATION_PASSWORD_LEN} characters long"),
        );
        return;
    }
    if password.chars().count() > MAX_REGISTRATION_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password is too long (max {MAX_REGISTRATION_PASSWORD_LEN} characters)"),
        );
        return;
    }
    // The regex crate has no lookaheads, so character classes are checked
    // with explicit scans. The alphabet is closed: ASCII letters, digits,
    // and the listed specials only.
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));
    let all_allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIAL_CHARS.contains(c));
    if !(has_lower && has_upper && has_digit && has_special && all_allowed) {
        errors.add(
            "password",
            format!(
                "Password must contain at least one uppercase letter, one lowercase \
                 letter, one digit, and one special character ({PASSWORD_SPECIAL_CHARS})"
            ),
        );
    }
}

fn check_password_match(errors: &mut ValidationErrors, password: &str, confirm: &str) {
    if !check_required(errors, "confirm_password", "Confirm password", confirm) {
        return;
    }
    if password != confirm {
        errors.add("confirm_password", "Passwords do not match");
    }
}

fn check_name(errors: &mut ValidationErrors, field: &str, label: &str, value: &str) {
    if !check_required(errors, field, label, value) {
        return;
    }
    if value.trim().chars().count() < MIN_NAME_LEN {
        errors.add(field, format!("{label} must be at least {MIN_NAME_LEN} characters"));
        return;
    }
    if value.chars().count() > MAX_NAME_LEN {
        errors.add(field, format!("{label} is too long (max {MAX_NAME_LEN} characters)"));
        return;
    }
    if !NAME_REGEX.is_match(value) {
        errors.add(
            field,
            format!("{label} can only contain letters, spaces, hyphens, and apostrophes"),
        );
    }
}

/// Strip control characters and collapse runs of whitespace.
pub fn sanitize_input(value: &str) -> String {
    let without_control: String = value
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    without_control.split_whitespace().collect::<Vec<_>>().join(" ")
}
