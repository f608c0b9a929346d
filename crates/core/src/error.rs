//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing records, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input or a business rule violation (negative quantity,
    /// restock level misuse, unknown filter, ...).
    #[error("{0}")]
    Validation(String),

    /// An identifier was invalid (e.g. path segment parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The addressed record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The request clashes with current state (duplicate key, redundant
    /// activate/deactivate).
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_record() {
        let err = DomainError::not_found("Inventory (7, USED)");
        assert_eq!(err.to_string(), "Inventory (7, USED) not found");
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = DomainError::validation("quantity must be >= 0");
        assert_eq!(err.to_string(), "quantity must be >= 0");
    }
}
