//! Convenience result type alias for AcctGuard.

use crate::error::AppError;

/// A specialized `Result` type for AcctGuard operations.
pub type AppResult<T> = Result<T, AppError>;
