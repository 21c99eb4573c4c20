//! Error type returned by fallible `KeyValueStore` operations

use thiserror::Error;

/// Errors reported by `KeyValueStore`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Construction input was not nothing, a single pair or a sequence of pairs
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The requested key is not present in the store
    #[error("key not found")]
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(StoreError::NotFound.to_string(), "key not found");
        assert_eq!(
            StoreError::InvalidArgument("expected a pair").to_string(),
            "invalid argument: expected a pair"
        );
    }
}
