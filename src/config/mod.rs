//! Configuration module for article conversion
//!
//! This module provides the `ConversionContext` struct and its builder
//! for configuring a conversion with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod types;

// Re-exports for public API
pub use builder::ConversionContextBuilder;
pub use types::ConversionContext;
