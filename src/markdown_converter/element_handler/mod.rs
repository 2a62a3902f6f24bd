//! Node dispatch and the per-tag conversion rules.
//!
//! Every element is routed through a tag-to-handler map built once per
//! session. Unknown tags use [`TagHandler::Default`], which keeps their
//! content as an opaque block.

mod anchor;
mod blockquote;
mod center;
mod code;
mod emphasis;
mod footnotes;
mod headings;
mod img;
mod input;
mod list;
mod math;
mod p;
mod raw;
mod span;
mod svg;
mod sup_sub;
mod table;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use futures::future::LocalBoxFuture;
use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use super::dom::{deep_clone, find_descendants, is_element, set_attr};
use super::errors::ConversionResult;
use super::fragment::Fragment;
use crate::asset_sink::AssetSink;
use crate::config::ConversionContext;
use crate::utils::CENTER_MARKER_ATTR;

use anchor::anchor_handler;
use blockquote::blockquote_handler;
use center::center_handler;
use code::{inline_code_handler, pre_handler};
use emphasis::{EmphasisKind, emphasis_handler};
use footnotes::container_handler;
use headings::headings_handler;
use img::img_handler;
use input::input_handler;
use list::list_handler;
use p::p_handler;
use raw::{RawPlacement, hr_handler, raw_html_handler};
use span::{font_handler, span_handler};
use svg::svg_handler;
use sup_sub::{sub_handler, sup_handler};
use table::table_handler;

/// Runs of HTML whitespace inside a text node.
static HTML_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n\x0C]+").expect("HTML_WHITESPACE: hardcoded regex is valid"));

/// Conversion rule selected for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagHandler {
    Heading(usize),
    Paragraph,
    Emphasis(EmphasisKind),
    Anchor,
    Image,
    List { ordered: bool },
    Blockquote,
    CodeBlock,
    InlineCode,
    Table,
    Span,
    Font,
    Superscript,
    Subscript,
    Checkbox,
    Svg,
    Center,
    /// `section`/`div`: footnote definitions when classed so, else a plain block.
    Container,
    HorizontalRule,
    RawHtml(RawPlacement),
    Discard,
    Default,
}

impl TagHandler {
    async fn convert(
        self,
        handlers: &ElementHandlers,
        node: &Handle,
        ctx: &ConversionContext,
    ) -> ConversionResult<Fragment> {
        match self {
            TagHandler::Heading(level) => headings_handler(handlers, node, ctx, level).await,
            TagHandler::Paragraph => p_handler(handlers, node, ctx).await,
            TagHandler::Emphasis(kind) => emphasis_handler(handlers, node, ctx, kind).await,
            TagHandler::Anchor => anchor_handler(handlers, node, ctx).await,
            TagHandler::Image => img_handler(handlers, node, ctx).await,
            TagHandler::List { ordered } => list_handler(handlers, node, ctx, ordered).await,
            TagHandler::Blockquote => blockquote_handler(handlers, node, ctx).await,
            TagHandler::CodeBlock => Ok(pre_handler(node)),
            TagHandler::InlineCode => Ok(inline_code_handler(node)),
            TagHandler::Table => table_handler(handlers, node, ctx).await,
            TagHandler::Span => span_handler(handlers, node, ctx).await,
            TagHandler::Font => font_handler(handlers, node, ctx).await,
            TagHandler::Superscript => sup_handler(handlers, node, ctx).await,
            TagHandler::Subscript => sub_handler(handlers, node, ctx).await,
            TagHandler::Checkbox => Ok(input_handler(node)),
            TagHandler::Svg => svg_handler(handlers, node, ctx).await,
            TagHandler::Center => center_handler(handlers, node, ctx).await,
            TagHandler::Container => container_handler(handlers, node, ctx).await,
            TagHandler::HorizontalRule => Ok(hr_handler()),
            TagHandler::RawHtml(placement) => Ok(raw_html_handler(node, placement)),
            TagHandler::Discard => Ok(Fragment::new()),
            TagHandler::Default => default_handler(handlers, node, ctx).await,
        }
    }
}

/// Builtin element handlers
pub(crate) struct ElementHandlers {
    tag_to_handler: HashMap<&'static str, TagHandler>,
    sink: Arc<AssetSink>,
}

impl ElementHandlers {
    pub(crate) fn new(sink: Arc<AssetSink>) -> Self {
        let mut handlers = Self {
            tag_to_handler: HashMap::new(),
            sink,
        };

        // headings
        for (level, tag) in ["h1", "h2", "h3", "h4", "h5", "h6"].into_iter().enumerate() {
            handlers.add_handler(vec![tag], TagHandler::Heading(level + 1));
        }

        // p
        handlers.add_handler(vec!["p"], TagHandler::Paragraph);

        // emphasis
        handlers.add_handler(vec!["strong", "b"], TagHandler::Emphasis(EmphasisKind::Bold));
        handlers.add_handler(vec!["em", "i"], TagHandler::Emphasis(EmphasisKind::Italic));
        handlers.add_handler(vec!["u", "ins"], TagHandler::Emphasis(EmphasisKind::Underline));
        handlers.add_handler(vec!["s", "del", "strike"], TagHandler::Emphasis(EmphasisKind::Strike));

        // a
        handlers.add_handler(vec!["a"], TagHandler::Anchor);

        // img
        handlers.add_handler(vec!["img"], TagHandler::Image);

        // list
        handlers.add_handler(vec!["ol"], TagHandler::List { ordered: true });
        handlers.add_handler(vec!["ul"], TagHandler::List { ordered: false });

        // quote
        handlers.add_handler(vec!["blockquote"], TagHandler::Blockquote);

        // code
        handlers.add_handler(vec!["pre"], TagHandler::CodeBlock);
        handlers.add_handler(vec!["code"], TagHandler::InlineCode);

        // table
        handlers.add_handler(vec!["table"], TagHandler::Table);

        // span, font
        handlers.add_handler(vec!["span"], TagHandler::Span);
        handlers.add_handler(vec!["font"], TagHandler::Font);

        // sup, sub
        handlers.add_handler(vec!["sup"], TagHandler::Superscript);
        handlers.add_handler(vec!["sub"], TagHandler::Subscript);

        // input
        handlers.add_handler(vec!["input"], TagHandler::Checkbox);

        // svg
        handlers.add_handler(vec!["svg"], TagHandler::Svg);

        // center
        handlers.add_handler(vec!["center"], TagHandler::Center);

        // containers, footnote lists among them
        handlers.add_handler(vec!["section", "div"], TagHandler::Container);

        // hr
        handlers.add_handler(vec!["hr"], TagHandler::HorizontalRule);

        // embeds
        handlers.add_handler(
            vec!["iframe", "video", "audio"],
            TagHandler::RawHtml(RawPlacement::Block),
        );
        handlers.add_handler(vec!["kbd", "mark"], TagHandler::RawHtml(RawPlacement::Inline));

        // script, style
        handlers.add_handler(
            vec!["script", "style", "button", "noscript"],
            TagHandler::Discard,
        );

        handlers
    }

    pub(crate) fn add_handler(&mut self, tags: Vec<&'static str>, handler: TagHandler) {
        for tag in tags {
            self.tag_to_handler.insert(tag, handler);
        }
    }

    pub(crate) fn handler_for(&self, tag: &str) -> TagHandler {
        self.tag_to_handler
            .get(tag)
            .copied()
            .unwrap_or(TagHandler::Default)
    }

    pub(crate) fn sink(&self) -> &AssetSink {
        &self.sink
    }

    /// Convert one node.
    pub(crate) fn dispatch<'a>(
        &'a self,
        node: &'a Handle,
        ctx: &'a ConversionContext,
    ) -> LocalBoxFuture<'a, ConversionResult<Fragment>> {
        Box::pin(async move {
            match &node.data {
                NodeData::Text { contents } => Ok(text_fragment(&contents.borrow())),
                NodeData::Element { name, .. } => {
                    let handler = self.handler_for(&name.local);
                    tracing::trace!(
                        tag = %name.local,
                        ?handler,
                        depth = ctx.list_nesting_depth(),
                        "dispatching element"
                    );
                    handler.convert(self, node, ctx).await
                }
                NodeData::Document => self.walk_children(node, ctx).await,
                _ => Ok(Fragment::new()),
            }
        })
    }

    /// Convert every child of `node` in order and concatenate the results.
    pub(crate) async fn walk_children(
        &self,
        node: &Handle,
        ctx: &ConversionContext,
    ) -> ConversionResult<Fragment> {
        let children: Vec<Handle> = node.children.borrow().clone();
        self.walk_nodes(&children, ctx).await
    }

    pub(crate) async fn walk_nodes(
        &self,
        nodes: &[Handle],
        ctx: &ConversionContext,
    ) -> ConversionResult<Fragment> {
        let mut fragment = Fragment::new();
        for node in nodes {
            fragment.append(self.dispatch(node, ctx).await?);
        }
        Ok(fragment)
    }
}

/// Trimmed text, with inline separators standing in for the trimmed whitespace.
fn text_fragment(text: &str) -> Fragment {
    let mut fragment = Fragment::new();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        if !text.is_empty() {
            fragment.push_inline_break();
        }
        return fragment;
    }
    if text.starts_with(char::is_whitespace) {
        fragment.push_inline_break();
    }
    fragment.push_text(HTML_WHITESPACE.replace_all(trimmed, " ").into_owned());
    if text.ends_with(char::is_whitespace) {
        fragment.push_inline_break();
    }
    fragment
}

/// Link or image text with its brackets escaped.
pub(super) fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

/// Link or image destination, angle-bracketed when a bare one would end early.
pub(super) fn link_destination(url: &str) -> String {
    if url.contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>')) {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_string()
    }
}

/// Unknown elements: content kept, closed as a block.
async fn default_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    let mut fragment = handlers.walk_children(node, ctx).await?;
    fragment.push_block_break();
    Ok(fragment)
}

/// Working copy of `node` with every descendant image flagged for block placement.
pub(super) fn with_centered_images(node: &Handle) -> Handle {
    let working = deep_clone(node);
    for img in find_descendants(&working, &|n| is_element(n, "img")) {
        set_attr(&img, CENTER_MARKER_ATTR, "true");
    }
    working
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_destination() {
        assert_eq!(link_destination("https://x.com/a.png"), "https://x.com/a.png");
        assert_eq!(link_destination("a b.png"), "<a b.png>");
        assert_eq!(link_destination("https://x.com/a_(b)"), "<https://x.com/a_(b)>");
        assert_eq!(link_destination("x<y>.png"), "<x%3Cy%3E.png>");
    }

    #[test]
    fn test_escape_link_text() {
        assert_eq!(escape_link_text("x]y[z"), "x\\]y\\[z");
        assert_eq!(escape_link_text("plain"), "plain");
    }

    #[test]
    fn test_section_and_div_dispatch_as_containers() {
        let handlers = ElementHandlers::new(Arc::new(AssetSink::new()));
        assert_eq!(handlers.handler_for("div"), TagHandler::Container);
        assert_eq!(handlers.handler_for("section"), TagHandler::Container);
        assert_eq!(handlers.handler_for("p"), TagHandler::Paragraph);
    }
}
