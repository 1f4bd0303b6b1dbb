//! Discussion questions and comment validation.

use crate::error::CoreError;

/// The caller's progress has not reached the discussion's breakpoint.
pub const DISCUSSION_LOCKED: &str = "DISCUSSION_LOCKED";

/// Maximum length for a comment.
pub const MAX_COMMENT_LENGTH: usize = 5_000;

/// Maximum length for a discussion question.
pub const MAX_QUESTION_LENGTH: usize = 2_000;

/// Validate and trim comment content.
pub fn validate_comment_content(content: &str) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Comment must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate the text of a discussion question.
pub fn validate_question(question: &str) -> Result<(), CoreError> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Question must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_QUESTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Question exceeds maximum length of {MAX_QUESTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Error returned when a reader at `progress` tries to open a discussion
/// gated at `breakpoint`.
pub fn locked_error(progress: i32, breakpoint: i32) -> CoreError {
    CoreError::precondition(
        DISCUSSION_LOCKED,
        format!("Discussion unlocks at {breakpoint}% progress; current progress is {progress}%"),
    )
}
