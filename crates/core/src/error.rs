//! Domain error model.

use thiserror::Error;

/// Domain-level error.
///
/// Only identifier parsing fails at this layer. Numerical and IO failures
/// belong to the crates that perform them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (e.g. parse failure, zero id).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_detail() {
        assert_eq!(
            DomainError::invalid_id("ProductId: 0").to_string(),
            "invalid identifier: ProductId: 0"
        );
    }
}
