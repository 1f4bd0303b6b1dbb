//! Review validation.

use crate::error::CoreError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Maximum length for a review body.
pub const MAX_REVIEW_LENGTH: usize = 10_000;

pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

/// Validate and trim review content.
pub fn validate_review_content(content: &str) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Review must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_REVIEW_LENGTH {
        return Err(CoreError::Validation(format!(
            "Review exceeds maximum length of {MAX_REVIEW_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}
