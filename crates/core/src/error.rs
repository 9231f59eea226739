use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Not-found for lookups that are not keyed by a numeric id
    /// (UUID sessions, refresh tokens, empty question sets).
    #[error("{0}")]
    NotFoundMessage(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Well-formed request naming something outside an allowed set (422).
    #[error("Unprocessable: {0}")]
    UnprocessableEntity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
