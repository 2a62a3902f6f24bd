//! Core configuration type for article conversion
//!
//! `ConversionContext` is the per-document bundle of switches threaded through
//! every recursive conversion step.

use serde::{Deserialize, Serialize};

use crate::utils::DEFAULT_ASSET_DIR;

/// Per-document conversion settings.
///
/// Constructed once per conversion. The only field that changes during the
/// descent is the list nesting depth, and it changes by deriving a new value
/// with [`ConversionContext::descend_list`], never by mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionContext {
    /// Directory (relative to the Markdown file) receiving localized assets.
    pub(crate) asset_dir_name: String,
    /// Prefix prepended to every asset file name.
    pub(crate) asset_file_prefix: String,
    /// Emit `[TOC]` for the table-of-contents placeholder paragraph.
    #[serde(rename = "enableTOC")]
    pub(crate) enable_toc: bool,
    /// Download images and SVGs into the asset directory.
    pub(crate) save_images_locally: bool,
    /// Treat every image as centered (block placement).
    pub(crate) force_image_centering: bool,
    /// Keep `width`/`height` by emitting a raw `<img>` tag.
    pub(crate) preserve_image_dimensions: bool,
    /// Keep color-styled spans as raw HTML.
    pub(crate) preserve_colored_text: bool,
    /// Replace links into the platform's search engine with their text.
    pub(crate) strip_search_engine_links: bool,
    #[serde(skip)]
    pub(crate) list_nesting_depth: usize,
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self {
            asset_dir_name: DEFAULT_ASSET_DIR.to_string(),
            asset_file_prefix: String::new(),
            enable_toc: true,
            save_images_locally: false,
            force_image_centering: false,
            preserve_image_dimensions: true,
            preserve_colored_text: false,
            strip_search_engine_links: true,
            list_nesting_depth: 0,
        }
    }
}

impl ConversionContext {
    /// Derived context for the items of a nested list.
    #[must_use]
    pub fn descend_list(&self) -> Self {
        Self {
            list_nesting_depth: self.list_nesting_depth + 1,
            ..self.clone()
        }
    }

    /// Copy of this context writing assets under a different file prefix.
    #[must_use]
    pub fn with_asset_file_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            asset_file_prefix: prefix.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn asset_dir_name(&self) -> &str {
        &self.asset_dir_name
    }

    #[must_use]
    pub fn asset_file_prefix(&self) -> &str {
        &self.asset_file_prefix
    }

    #[must_use]
    pub fn enable_toc(&self) -> bool {
        self.enable_toc
    }

    #[must_use]
    pub fn save_images_locally(&self) -> bool {
        self.save_images_locally
    }

    #[must_use]
    pub fn force_image_centering(&self) -> bool {
        self.force_image_centering
    }

    #[must_use]
    pub fn preserve_image_dimensions(&self) -> bool {
        self.preserve_image_dimensions
    }

    #[must_use]
    pub fn preserve_colored_text(&self) -> bool {
        self.preserve_colored_text
    }

    #[must_use]
    pub fn strip_search_engine_links(&self) -> bool {
        self.strip_search_engine_links
    }

    /// Number of enclosing lists at the current point of the descent.
    #[must_use]
    pub fn list_nesting_depth(&self) -> usize {
        self.list_nesting_depth
    }
}
