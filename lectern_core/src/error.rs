use sea_orm::{DbErr, SqlErr};
use validator::ValidationErrors;

/// Coarse outcome class of a service failure, used by transports to pick a
/// status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Forbidden,
    NotFound,
    Invalid,
    Conflict,
    Internal,
}

/// Implemented by every service error enum.
pub trait Classify: std::error::Error {
    fn kind(&self) -> ErrorKind;

    /// Field-level messages for `ErrorKind::Invalid` failures caused by
    /// request validation.
    fn field_errors(&self) -> Option<&ValidationErrors> {
        None
    }
}

/// True when the store rejected a write because of a unique or primary key.
pub(crate) fn is_unique_violation(error: &DbErr) -> bool {
    matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
