//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
}
