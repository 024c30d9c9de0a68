use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Malformed or out-of-range input (non-positive page count, negative
    /// quantity, bad dimensions, malformed pricing parameters).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A production setting declares a pricing type outside the closed set.
    #[error("Unsupported pricing type: {0}")]
    UnsupportedPricingType(String),

    /// No configured price for the requested tier/specification/quantity.
    #[error("Missing price: {0}")]
    MissingPrice(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
