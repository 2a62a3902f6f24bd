//! Error types for asset localization
//!
//! Contract violations and fetch failures are deliberately distinct: the
//! former indicate a caller bug, the latter a remote resource that could not
//! be retrieved within the retry budget.

use std::path::PathBuf;

/// Result type alias for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Error types for asset operations
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The caller handed the sink something it can never localize
    #[error("Invalid {what}: {reason}")]
    InvalidArgument { what: &'static str, reason: String },

    /// Remote fetch failed on every attempt
    #[error("Failed to fetch {url} after {attempts} attempt(s): {message}")]
    Fetch {
        url: String,
        attempts: u32,
        message: String,
    },

    /// Writing an asset to disk failed
    #[error("Failed to write asset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            what,
            reason: reason.into(),
        }
    }

    /// Check if the error signals a caller bug rather than a data or network problem
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
