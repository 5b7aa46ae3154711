//! Core domain errors.

use thiserror::Error;

/// Core domain errors for the handbook generator.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Generation policy is not usable.
    #[error("Invalid generation policy: {0}")]
    InvalidPolicy(String),
}
