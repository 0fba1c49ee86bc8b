//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LEN: usize = 32;

/// Validates that a username is non-blank, at most [`MAX_USERNAME_LEN`]
/// characters, and carries no surrounding whitespace or control characters.
///
/// # Examples
///
/// ```ignore
/// validate_username("alice")   // Ok
/// validate_username(" alice")  // Err - leading whitespace
/// validate_username("")        // Err - empty
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let length = username.chars().count();
    if length == 0 || length > MAX_USERNAME_LEN {
        let mut err = ValidationError::new("username_length");
        err.message = Some(
            format!("Username must be 1 to {MAX_USERNAME_LEN} characters (got {length})").into(),
        );
        return Err(err);
    }

    if username.trim() != username || username.chars().any(char::is_control) {
        let mut err = ValidationError::new("username_format");
        err.message =
            Some("Username must not contain control characters or surrounding spaces".into());
        return Err(err);
    }

    Ok(())
}
