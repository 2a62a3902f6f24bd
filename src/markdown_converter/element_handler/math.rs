//! KaTeX spans.
//!
//! A rendered formula carries two text halves: the MathML part (rendered
//! symbols followed by the TeX annotation) and the HTML part (rendered symbols
//! only). With invisible characters removed, the TeX source is whatever the
//! MathML text has beyond the HTML text.
//!
//! When sub/superscripts reorder the rendered symbols the prefix check fails;
//! the annotation is then usually the longest segment between the long
//! whitespace runs KaTeX leaves in the MathML text. That fallback is a
//! heuristic and can pick the wrong segment on unusual output.

use std::sync::LazyLock;

use markup5ever_rcdom::Handle;
use regex::Regex;

use super::super::dom::{find_descendant, has_class, text_content_skipping};
use super::super::fragment::Fragment;
use crate::utils::{
    KATEX_HTML_CLASS, KATEX_MATHML_CLASS, MATH_DECORATION_CLASSES, MATH_FALLBACK_SPLIT_RUN,
    strip_invisible,
};

static LONG_WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\s{{{MATH_FALLBACK_SPLIT_RUN},}}"))
        .expect("LONG_WHITESPACE_RUN: generated regex is valid")
});

/// Longest segment between long whitespace runs, trimmed.
fn longest_segment(text: &str) -> String {
    LONG_WHITESPACE_RUN
        .split(text)
        .map(str::trim)
        .max_by_key(|segment| segment.chars().count())
        .unwrap_or_default()
        .to_string()
}

/// TeX source from the two halves' text.
pub(super) fn formula_source(mathml_text: &str, html_text: &str) -> String {
    let mathml = strip_invisible(mathml_text);
    let html = strip_invisible(html_text);
    if let Some(rest) = mathml.strip_prefix(&html) {
        let rest = rest.trim();
        if !rest.is_empty() {
            return rest.to_string();
        }
    }
    log::debug!("KaTeX halves disagree, using whitespace-run fallback");
    longest_segment(&mathml)
}

/// Convert a `katex--inline` / `katex--display` span. `None` when the span
/// has no MathML half to read from.
pub(super) fn math_span(node: &Handle, display: bool) -> Option<Fragment> {
    let Some(mathml) = find_descendant(node, &|n| has_class(n, KATEX_MATHML_CLASS)) else {
        log::warn!("KaTeX span without MathML half, converting as plain content");
        return None;
    };
    let html_text = find_descendant(node, &|n| has_class(n, KATEX_HTML_CLASS))
        .map(|html| text_content_skipping(&html, MATH_DECORATION_CLASSES))
        .unwrap_or_default();
    let mathml_text = text_content_skipping(&mathml, MATH_DECORATION_CLASSES);

    let source = formula_source(&mathml_text, &html_text);
    if source.is_empty() {
        log::warn!("Empty formula source, dropping KaTeX span");
        return Some(Fragment::new());
    }

    Some(if display {
        Fragment::block(format!("$$\n{source}\n$$"))
    } else {
        Fragment::inline(format!("${source}$"))
    })
}
