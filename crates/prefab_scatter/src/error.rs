//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Evaluation itself never fails; errors surface through
//! [`crate::scatter::config::ScatterConfig::validate`] and
//! [`crate::reconcile::ReconcileOutcome::issues`].
use thiserror::Error;

use crate::scatter::VariantId;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("child count mismatch: expected {expected} live instances, found {actual}")]
    ChildCountMismatch { expected: usize, actual: usize },

    #[error("unknown prefab variant '{id}'")]
    UnknownVariant { id: VariantId },

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_messages_become_other() {
        let owned: Error = String::from("terrain offline").into();
        let borrowed: Error = "terrain offline".into();
        assert_eq!(owned, borrowed);
        assert!(matches!(borrowed, Error::Other(ref msg) if msg == "terrain offline"));
    }

    #[test]
    fn unknown_variant_names_the_id() {
        let err = Error::UnknownVariant { id: "oak".into() };
        assert_eq!(err.to_string(), "unknown prefab variant 'oak'");
    }

    #[test]
    fn child_count_mismatch_formats_both_counts() {
        let err = Error::ChildCountMismatch {
            expected: 3,
            actual: 5,
        };
        assert_eq!(
            err.to_string(),
            "child count mismatch: expected 3 live instances, found 5"
        );
    }
}
