//! Error types for the Convoke recommendation engine.
//!
//! The engine degrades gracefully rather than failing: missing optional
//! fields shrink blend denominators, and empty pools yield empty results.
//! Errors are reserved for contract violations in the options bag.

use std::borrow::Cow;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the recommendation engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid option '{option}': {message}")]
    InvalidOption {
        option: &'static str,
        message: Cow<'static, str>,
    },

    #[error("Options '{first}' and '{second}' are mutually exclusive")]
    ConflictingFilters {
        first: &'static str,
        second: &'static str,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid-option error.
    pub fn invalid_option(option: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidOption {
            option,
            message: message.into(),
        }
    }

    /// Returns true if this error is a caller mistake rather than an engine
    /// fault. Callers map these to 4xx-class responses.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidOption { .. } | Error::ConflictingFilters { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_error_classification() {
        assert!(
            Error::invalid_option("max_recommendations", "must be at least 1").is_caller_error()
        );
        assert!(Error::ConflictingFilters {
            first: "a",
            second: "b"
        }
        .is_caller_error());
        assert!(!Error::Other(anyhow::anyhow!("boom")).is_caller_error());
    }

    #[test]
    fn test_error_display() {
        let err = Error::invalid_option("diversity_weight", "must be non-negative");
        assert!(err.to_string().contains("diversity_weight"));
    }
}
