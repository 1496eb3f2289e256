//! Error types

use thiserror::Error;

/// Core error types
///
/// Only malformed input surfaces here. Financial edge cases such as an empty
/// reserve or an unprofitable cycle are ordinary values, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid pool {pool_id:?}: {reason}")]
    InvalidPool { pool_id: String, reason: String },

    #[error("Pool {pool_id} has non-positive reserves ({reserve_a}, {reserve_b})")]
    NonPositiveReserve {
        pool_id: String,
        reserve_a: String,
        reserve_b: String,
    },

    #[error("Pool {pool_id} fee {fee} outside [0, 1)")]
    FeeOutOfRange { pool_id: String, fee: String },

    #[error("Invalid cycle: {0}")]
    InvalidCycle(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid decimal {value:?}: {reason}")]
    InvalidDecimal { value: String, reason: String },
}

impl CoreError {
    /// Identifier of the offending pool, when the error concerns one
    pub fn pool_id(&self) -> Option<&str> {
        match self {
            CoreError::InvalidPool { pool_id, .. }
            | CoreError::NonPositiveReserve { pool_id, .. }
            | CoreError::FeeOutOfRange { pool_id, .. } => Some(pool_id),
            _ => None,
        }
    }
}

/// Result type alias
pub type CoreResult<T> = Result<T, CoreError>;
