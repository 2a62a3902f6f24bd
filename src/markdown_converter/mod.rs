//! Article HTML to Markdown conversion
//!
//! A [`ConversionSession`] walks the article's DOM once, depth first. Each
//! element is routed to its tag handler, handlers produce [`Fragment`]s with
//! structural separators, and the assembler resolves those into the final
//! text. Images and SVGs can be localized through a shared [`AssetSink`] on
//! the way; every localization is awaited in place, so sibling order never
//! depends on fetch latency.
//!
//! # Usage
//!
//! ```rust
//! # use kodegen_tools_article2md::{ConversionContext, convert_article};
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let html = r#"<h2><a name="t0"></a>Title</h2><p>Hello <strong>world</strong></p>"#;
//! let article = convert_article(html, ConversionContext::default()).await?;
//! assert_eq!(article.markdown, "## Title\n\nHello **world**\n\n");
//! assert!(article.assets.is_empty());
//! # Ok::<(), kodegen_tools_article2md::ConversionError>(())
//! # }).unwrap();
//! ```

pub mod assembler;
pub mod dom;
pub mod element_handler;
pub mod errors;
pub mod fragment;

use std::sync::Arc;

use futures::future::try_join_all;
use markup5ever_rcdom::Handle;
use serde::{Deserialize, Serialize};

pub use assembler::finalize;
pub use errors::{ConversionError, ConversionResult};
pub use fragment::{Fragment, FragmentToken};

use crate::asset_sink::{AssetEntry, AssetSink};
use crate::config::ConversionContext;
use crate::utils::ARTICLE_CONTENT_ID;
use dom::{find_descendant, get_attr, is_element, parse_html};
use element_handler::ElementHandlers;

/// Converts article DOMs under one configuration, sharing one asset sink.
pub struct ConversionSession {
    context: ConversionContext,
    sink: Arc<AssetSink>,
    handlers: ElementHandlers,
}

impl std::fmt::Debug for ConversionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionSession")
            .field("context", &self.context)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl ConversionSession {
    /// Session with a private sink that records images as pending.
    #[must_use]
    pub fn new(context: ConversionContext) -> Self {
        Self::with_sink(context, Arc::new(AssetSink::new()))
    }

    #[must_use]
    pub fn with_sink(context: ConversionContext, sink: Arc<AssetSink>) -> Self {
        Self {
            handlers: ElementHandlers::new(Arc::clone(&sink)),
            context,
            sink,
        }
    }

    #[must_use]
    pub fn context(&self) -> &ConversionContext {
        &self.context
    }

    #[must_use]
    pub fn sink(&self) -> &Arc<AssetSink> {
        &self.sink
    }

    /// Parse `html` and convert its article content.
    ///
    /// Full pages are narrowed to the article container when present, else
    /// to `<body>`.
    ///
    /// # Errors
    ///
    /// `Parse` when no body can be found; `Asset` when localization fails.
    pub async fn convert_html(&self, html: &str) -> ConversionResult<String> {
        let dom = parse_html(html).map_err(|e| ConversionError::Parse(e.to_string()))?;
        let root = article_root(&dom.document)
            .ok_or_else(|| ConversionError::Parse("document has no <body>".to_string()))?;
        self.convert_node(&root).await
    }

    /// Convert the children of `root`.
    ///
    /// The result ends with one blank line unless it is empty, so converted
    /// articles can be concatenated directly.
    ///
    /// # Errors
    ///
    /// `Asset` when an image or SVG cannot be localized.
    pub async fn convert_node(&self, root: &Handle) -> ConversionResult<String> {
        let fragment = self.handlers.walk_children(root, &self.context).await?;
        let markdown = finalize(fragment);
        log::debug!(
            "Converted article: {} bytes of Markdown, {} assets in sink",
            markdown.len(),
            self.sink.len()
        );
        if markdown.is_empty() {
            Ok(markdown)
        } else {
            Ok(markdown + "\n\n")
        }
    }
}

fn article_root(document: &Handle) -> Option<Handle> {
    let body = find_descendant(document, &|n| is_element(n, "body"))?;
    Some(
        find_descendant(&body, &|n| {
            get_attr(n, "id").is_some_and(|id| id == ARTICLE_CONTENT_ID)
        })
        .unwrap_or(body),
    )
}

/// A converted article and the assets it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedArticle {
    pub markdown: String,
    pub assets: Vec<AssetEntry>,
}

/// Convert one article with its own sink and drain the sink into the result.
///
/// # Errors
///
/// See [`ConversionSession::convert_html`].
pub async fn convert_article(
    html: &str,
    context: ConversionContext,
) -> ConversionResult<ConvertedArticle> {
    let session = ConversionSession::new(context);
    let markdown = session.convert_html(html).await?;
    Ok(ConvertedArticle {
        markdown,
        assets: session.sink().drain(),
    })
}

/// One article of a merged document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub title: String,
    pub html: String,
}

/// Convert several articles into one document sharing `sink`.
///
/// Articles are converted concurrently on the current task. Each gets the
/// file prefix `<prefix><n>_` (1-based), so their assets never collide, and
/// is emitted as `# title` followed by its body, in input order.
///
/// # Errors
///
/// The first conversion error aborts the merge.
pub async fn merge_articles(
    articles: &[ArticleSource],
    context: &ConversionContext,
    sink: Arc<AssetSink>,
) -> ConversionResult<String> {
    let conversions = articles.iter().enumerate().map(|(index, article)| {
        let ctx = context.with_asset_file_prefix(format!(
            "{}{}_",
            context.asset_file_prefix(),
            index + 1
        ));
        let session = ConversionSession::with_sink(ctx, Arc::clone(&sink));
        async move {
            let body = session.convert_html(&article.html).await?;
            Ok::<_, ConversionError>(format!("# {}\n\n{body}", article.title.trim()))
        }
    });

    let parts = try_join_all(conversions).await?;
    log::info!("Merged {} articles", parts.len());
    Ok(parts.concat())
}
