//! Fluent builder for `ConversionContext`

use anyhow::{Result, anyhow};
use std::path::{Component, Path};

use super::types::ConversionContext;

/// Builder for [`ConversionContext`].
///
/// Every setting has a default, so `build()` only validates the asset
/// directory, which must stay inside the output folder.
#[derive(Debug, Clone, Default)]
pub struct ConversionContextBuilder {
    context: ConversionContext,
}

impl ConversionContext {
    /// Create a builder for configuring a `ConversionContext` with a fluent interface
    #[must_use]
    pub fn builder() -> ConversionContextBuilder {
        ConversionContextBuilder::default()
    }
}

/// Start from an existing context, e.g. one deserialized from settings JSON.
impl From<ConversionContext> for ConversionContextBuilder {
    fn from(context: ConversionContext) -> Self {
        Self { context }
    }
}

impl ConversionContextBuilder {
    #[must_use]
    pub fn asset_dir_name(mut self, dir: impl Into<String>) -> Self {
        self.context.asset_dir_name = dir.into();
        self
    }

    #[must_use]
    pub fn asset_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.context.asset_file_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn enable_toc(mut self, enabled: bool) -> Self {
        self.context.enable_toc = enabled;
        self
    }

    #[must_use]
    pub fn save_images_locally(mut self, enabled: bool) -> Self {
        self.context.save_images_locally = enabled;
        self
    }

    #[must_use]
    pub fn force_image_centering(mut self, enabled: bool) -> Self {
        self.context.force_image_centering = enabled;
        self
    }

    #[must_use]
    pub fn preserve_image_dimensions(mut self, enabled: bool) -> Self {
        self.context.preserve_image_dimensions = enabled;
        self
    }

    #[must_use]
    pub fn preserve_colored_text(mut self, enabled: bool) -> Self {
        self.context.preserve_colored_text = enabled;
        self
    }

    #[must_use]
    pub fn strip_search_engine_links(mut self, enabled: bool) -> Self {
        self.context.strip_search_engine_links = enabled;
        self
    }

    /// Validate and produce the context.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset directory is empty, absolute, or climbs
    /// out of the output folder with `..`.
    pub fn build(self) -> Result<ConversionContext> {
        validate_asset_dir(&self.context.asset_dir_name)?;
        Ok(self.context)
    }
}

fn validate_asset_dir(dir: &str) -> Result<()> {
    if dir.trim().is_empty() {
        return Err(anyhow!("Asset directory name cannot be empty"));
    }
    let path = Path::new(dir);
    if path.is_absolute() || path.starts_with("/") {
        return Err(anyhow!("Asset directory '{dir}' must be relative"));
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(anyhow!("Asset directory '{dir}' must not leave the output folder"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let ctx = ConversionContext::builder()
            .asset_dir_name("img")
            .asset_file_prefix("a_")
            .save_images_locally(true)
            .force_image_centering(true)
            .preserve_image_dimensions(false)
            .preserve_colored_text(true)
            .strip_search_engine_links(false)
            .enable_toc(false)
            .build()
            .unwrap();
        assert_eq!(ctx.asset_dir_name(), "img");
        assert_eq!(ctx.asset_file_prefix(), "a_");
        assert!(ctx.save_images_locally());
        assert!(ctx.force_image_centering());
        assert!(!ctx.preserve_image_dimensions());
        assert!(ctx.preserve_colored_text());
        assert!(!ctx.strip_search_engine_links());
        assert!(!ctx.enable_toc());
        assert_eq!(ctx.list_nesting_depth(), 0);
    }

    #[test]
    fn test_builder_rejects_escaping_asset_dir() {
        assert!(ConversionContext::builder().asset_dir_name("").build().is_err());
        assert!(ConversionContext::builder().asset_dir_name("/tmp/x").build().is_err());
        assert!(ConversionContext::builder().asset_dir_name("../x").build().is_err());
        assert!(ConversionContext::builder().asset_dir_name("media/img").build().is_ok());
    }

    #[test]
    fn test_deserialized_context_is_validated() {
        let ctx: ConversionContext = serde_json::from_str(r#"{"assetDirName": "../up"}"#).unwrap();
        assert!(ConversionContextBuilder::from(ctx).build().is_err());
    }
}
