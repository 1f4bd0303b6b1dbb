//! Book catalog validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum length for a book title or author name.
pub const MAX_TITLE_LENGTH: usize = 500;

/// `YYYY-MM` with a real month.
static READING_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("valid regex"));

/// Validate a month identifier such as `2024-11`, used for a book's
/// reading month and a poll's target month.
pub fn validate_reading_month(month: &str) -> Result<(), CoreError> {
    if READING_MONTH_RE.is_match(month) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid month '{month}'. Expected YYYY-MM"
        )))
    }
}

/// Validate a required short text field (title, author).
pub fn validate_required_text(value: &str, field: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional page count.
pub fn validate_page_count(pages: Option<i32>) -> Result<(), CoreError> {
    match pages {
        Some(p) if p <= 0 => Err(CoreError::Validation(format!(
            "page_count must be positive, got {p}"
        ))),
        _ => Ok(()),
    }
}
