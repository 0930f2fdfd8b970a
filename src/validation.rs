//! Form-level input checks applied before calling into the store.
//!
//! The store accepts any strings; these rules are what the signup, login and
//! activity forms enforce.

use thiserror::Error;

/// A rejected form submission, with the message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("All fields are required")]
    MissingSignupField,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Please enter both username and password")]
    MissingLoginField,
    #[error("Activity must not be empty")]
    EmptyActivity,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Signup form: every field non-blank, password equal to its confirmation.
/// The confirmation is compared untrimmed.
pub fn check_signup(username: &str, password: &str, confirm: &str) -> Result<(), FormError> {
    if blank(username) || blank(password) || blank(confirm) {
        return Err(FormError::MissingSignupField);
    }
    if password != confirm {
        return Err(FormError::PasswordMismatch);
    }
    Ok(())
}

pub fn check_login(username: &str, password: &str) -> Result<(), FormError> {
    if blank(username) || blank(password) {
        return Err(FormError::MissingLoginField);
    }
    Ok(())
}

pub fn check_activity(text: &str) -> Result<(), FormError> {
    if blank(text) {
        return Err(FormError::EmptyActivity);
    }
    Ok(())
}
