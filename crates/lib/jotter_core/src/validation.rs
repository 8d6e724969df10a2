//! Form-level validation for profile, password, and journal input.
//!
//! These errors stay local to the form that produced them; they never touch
//! the session.

use thiserror::Error;

/// Minimum length of a new password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// One or more failed field checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationError(pub Vec<FieldError>);

impl ValidationError {
    /// Message for `field`, if it failed.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn finish(errors: Vec<FieldError>) -> Result<(), ValidationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError(errors))
    }
}

/// Check a profile update before `PUT /user`.
pub fn validate_profile(username: &str) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if username.trim().is_empty() {
        errors.push(FieldError::new("username", "Username is required."));
    }
    finish(errors)
}

/// Check a password change before `PUT /user/password`.
///
/// Stops at the first failure, like the form it backs.
pub fn validate_password_change(current: &str, new: &str) -> Result<(), ValidationError> {
    let error = if current.trim().is_empty() {
        Some(FieldError::new("currentPassword", "Current password is required."))
    } else if new.trim().is_empty() {
        Some(FieldError::new("password", "New password is required."))
    } else if new.chars().count() < MIN_PASSWORD_LEN {
        Some(FieldError::new(
            "password",
            "New password must be at least 6 characters long.",
        ))
    } else {
        None
    };
    finish(error.into_iter().collect())
}

/// Check a journal entry before it is created or updated.
pub fn validate_journal_entry(title: &str, content: &str) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required."));
    }
    if content.trim().is_empty() {
        errors.push(FieldError::new("content", "Content is required."));
    }
    finish(errors)
}

/// Check signup / login credentials before they are sent.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if username.trim().is_empty() {
        errors.push(FieldError::new("username", "Username is required."));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required."));
    }
    finish(errors)
}
