/// Crate-wide error type
///
/// `Clone` is required because cache load results are broadcast to every
/// caller coalesced onto the same in-flight load.
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// User-facing conflict, e.g. a duplicate channel or tag name.
    #[error("{0}")]
    Conflict(String),

    /// Database failure with a sanitized message.
    #[error("database error: {0}")]
    Database(String),

    /// Anything unexpected that should not leak internals to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AppError::Conflict("name already exists".to_string())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
