//! Error types for article conversion

use crate::asset_sink::AssetError;

/// Result type alias for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Error types for conversion operations
///
/// Malformed markup never lands here: handlers degrade locally and log.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Localizing an image or SVG failed
    #[error("Asset localization failed: {0}")]
    Asset(#[from] AssetError),

    /// The input could not be turned into a document with a body
    #[error("Failed to parse article HTML: {0}")]
    Parse(String),
}
