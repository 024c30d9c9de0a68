use printshop_core::error::CoreError;

/// Error for repository operations that run domain checks inside a
/// transaction (pairing, normalization, validated writes).
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
