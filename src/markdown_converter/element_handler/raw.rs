//! Elements passed through as raw HTML, and the horizontal rule.

use markup5ever_rcdom::Handle;

use super::super::dom::serialize_outer;
use super::super::fragment::Fragment;
use crate::utils::collapse_html_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawPlacement {
    Block,
    Inline,
}

pub(super) fn raw_html_handler(node: &Handle, placement: RawPlacement) -> Fragment {
    let html = collapse_html_whitespace(&serialize_outer(node));
    if html.is_empty() {
        return Fragment::new();
    }
    match placement {
        RawPlacement::Block => Fragment::block(html),
        RawPlacement::Inline => Fragment::inline(html),
    }
}

pub(super) fn hr_handler() -> Fragment {
    Fragment::block("---")
}
