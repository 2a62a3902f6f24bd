use markup5ever_rcdom::Handle;

use super::super::errors::ConversionResult;
use super::super::fragment::{Fragment, FragmentToken};
use super::ElementHandlers;
use crate::config::ConversionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmphasisKind {
    Bold,
    Italic,
    Underline,
    Strike,
}

impl EmphasisKind {
    fn markers(self) -> (&'static str, &'static str) {
        match self {
            EmphasisKind::Bold => ("**", "**"),
            EmphasisKind::Italic => ("*", "*"),
            EmphasisKind::Underline => ("<u>", "</u>"),
            EmphasisKind::Strike => ("~~", "~~"),
        }
    }
}

/// Wrap the trimmed content in the kind's markers; nothing at all when the
/// content is empty, since `****` would render literally.
pub(super) async fn emphasis_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
    kind: EmphasisKind,
) -> ConversionResult<Fragment> {
    let content = handlers.walk_children(node, ctx).await?.trim_inline();
    Ok(wrap_emphasis(content, kind))
}

/// Emphasis cannot span a blank line. Block separators at the edges move
/// outside the markers; interior ones become inline separators.
fn split_block_edges(content: Fragment) -> (bool, Fragment, bool) {
    let mut tokens = content.into_tokens();
    let mut leading = false;
    while let Some(token) = tokens.first() {
        match token {
            FragmentToken::BlockBreak => leading = true,
            FragmentToken::InlineBreak => {}
            FragmentToken::Text(text) if text.trim().is_empty() => {}
            FragmentToken::Text(_) => break,
        }
        tokens.remove(0);
    }
    let mut trailing = false;
    while let Some(token) = tokens.last() {
        match token {
            FragmentToken::BlockBreak => trailing = true,
            FragmentToken::InlineBreak => {}
            FragmentToken::Text(text) if text.trim().is_empty() => {}
            FragmentToken::Text(_) => break,
        }
        tokens.pop();
    }

    let mut inner = Fragment::new();
    for token in tokens {
        match token {
            FragmentToken::Text(text) => inner.push_text(text),
            FragmentToken::BlockBreak | FragmentToken::InlineBreak => inner.push_inline_break(),
        }
    }
    (leading, inner.trim_inline(), trailing)
}

fn wrap_emphasis(content: Fragment, kind: EmphasisKind) -> Fragment {
    let (leading_block, content, trailing_block) = split_block_edges(content);
    if content.is_blank() {
        return Fragment::new();
    }
    let (open, close) = kind.markers();
    let mut fragment = Fragment::new();
    if leading_block {
        fragment.push_block_break();
    } else {
        fragment.push_inline_break();
    }
    fragment.push_text(open);
    fragment.append(content);
    fragment.push_text(close);
    if trailing_block {
        fragment.push_block_break();
    } else {
        fragment.push_inline_break();
    }
    fragment
}
