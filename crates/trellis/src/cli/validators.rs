//! CLI input validation functions.
//!
//! Used by clap's `value_parser` attribute so bad input is rejected at
//! parse time.

/// Maximum length of a feature or item name
pub const MAX_NAME_LENGTH: usize = 200;

/// Validate an ID prefix, returning it trimmed.
///
/// Delegates to [`crate::config::validate_prefix`].
pub fn validate_prefix(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    crate::config::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate a feature or item ID: non-empty, no whitespace.
pub fn validate_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("ID cannot be empty".to_string());
    }

    if s.chars().any(char::is_whitespace) {
        return Err(format!("Invalid ID '{s}': IDs cannot contain whitespace"));
    }

    Ok(s.to_string())
}

/// Validate a display name: non-empty, single line, bounded length.
pub fn validate_name(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if s.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters, got {}",
            s.chars().count()
        ));
    }

    if let Some(pos) = s.chars().position(char::is_control) {
        return Err(format!("Name contains a control character at position {pos}"));
    }

    Ok(s.to_string())
}
