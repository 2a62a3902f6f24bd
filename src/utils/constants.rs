//! Shared constants for article conversion
//!
//! Class markers, ids and defaults recognised by the tag handlers. The source
//! platform renders articles with a fixed vocabulary of class names; keeping
//! them here avoids scattering string literals across handlers.

/// Default directory (relative to the Markdown file) that receives localized assets.
pub const DEFAULT_ASSET_DIR: &str = "assets";

/// Paragraph class that asks for all descendant images to be centered.
pub const IMG_CENTER_CLASS: &str = "img-center";

/// Attribute set on images that must be emitted as standalone blocks.
///
/// Written only on the engine's working copy of the DOM.
pub const CENTER_MARKER_ATTR: &str = "data-md-center";

/// Id of the paragraph standing in for the table of contents.
pub const TOC_PLACEHOLDER_ID: &str = "main-toc";

/// Label emitted above the `[TOC]` marker.
pub const TOC_LABEL: &str = "**目录**";

/// Anchor class of footnote back-references (dropped).
pub const FOOTNOTE_BACKREF_CLASS: &str = "footnote-backref";

/// Superscript class of footnote references.
pub const FOOTNOTE_REF_CLASS: &str = "footnote-ref";

/// Container class of the footnote section.
pub const FOOTNOTES_CLASS: &str = "footnotes";

/// Glyph appended to footnote bodies by the renderer.
pub const FOOTNOTE_RETURN_GLYPH: &str = "↩︎";

/// Anchor class of "card" links whose label lives in the `title` attribute.
pub const CARD_LINK_CLASS: &str = "has-card";

/// Image class of formulas rendered to a bitmap with the TeX source in `alt`.
pub const MATH_IMAGE_CLASS: &str = "mathcode";

/// Span classes wrapping KaTeX output.
pub const KATEX_INLINE_CLASS: &str = "katex--inline";
pub const KATEX_DISPLAY_CLASS: &str = "katex--display";
pub const KATEX_MATHML_CLASS: &str = "katex-mathml";
pub const KATEX_HTML_CLASS: &str = "katex-html";

/// Renderer decorations that corrupt the MathML text when left in.
pub const MATH_DECORATION_CLASSES: &[&str] = &["katex-error", "MathJax_Preview", "mjx-assistive-mml"];

/// Minimum run of whitespace separating candidate formulas in the fallback split.
pub const MATH_FALLBACK_SPLIT_RUN: usize = 10;

/// Hosts of the platform's search engine; links to them are self-promotion.
pub const SEARCH_ENGINE_HOSTS: &[&str] = &["so.csdn.net", "www.so.csdn.net"];

/// Indentation of continuation lines inside ordered list items.
pub const ORDERED_LIST_INDENT: usize = 3;

/// Indentation of continuation lines inside unordered list items.
pub const UNORDERED_LIST_INDENT: usize = 2;

/// Chrome user agent sent when fetching remote images
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Default number of attempts per remote image before the localization fails.
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;

/// Largest image body accepted from the network.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Id of the element holding the article body on full article pages.
pub const ARTICLE_CONTENT_ID: &str = "content_views";
