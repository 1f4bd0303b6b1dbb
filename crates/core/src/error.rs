use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Not found where there is no id of its own to name, such as the
    /// caller's vote in a poll.
    #[error("Not found: {0}")]
    Missing(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A domain precondition does not hold (poll closed, book not a
    /// candidate, discussion still locked). `code` is stable and surfaced
    /// to clients so they can react to the specific condition.
    #[error("Precondition failed ({code}): {message}")]
    Precondition { code: &'static str, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl CoreError {
    /// Shorthand for building a [`CoreError::Precondition`].
    pub fn precondition(code: &'static str, message: impl Into<String>) -> Self {
        CoreError::Precondition {
            code,
            message: message.into(),
        }
    }
}
