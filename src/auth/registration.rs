//! Registration input validation for Cubby.

use thiserror::Error;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Username does not meet the requirements.
    #[error("username must be {MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters (letters, digits, underscore)")]
    InvalidUsername,

    /// Email address is malformed.
    #[error("invalid email address")]
    InvalidEmail,
}

/// Validate a username.
///
/// Usernames are 3-32 characters of ASCII letters, digits, and underscores.
/// Callers are expected to lowercase the name before storing it.
pub fn validate_username(username: &str) -> Result<(), RegistrationError> {
    let username = username.trim();
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(RegistrationError::InvalidUsername);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(RegistrationError::InvalidUsername);
    }
    Ok(())
}

/// Validate the shape of an email address.
///
/// A single `@` with a non-empty local part and a dotted domain. Full RFC
/// validation is deliberately out of scope; the address is only used as a
/// unique account identifier.
pub fn validate_email(email: &str) -> Result<(), RegistrationError> {
    let email = email.trim();
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() {
        return Err(RegistrationError::InvalidEmail);
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(RegistrationError::InvalidEmail);
    }
    if email.contains(char::is_whitespace) {
        return Err(RegistrationError::InvalidEmail);
    }
    Ok(())
}
