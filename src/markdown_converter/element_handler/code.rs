//! Code blocks and inline code.
//!
//! The platform has two code block dialects:
//!
//! - new: `<pre><code class="language-rust"><ol><li>line</li>...</ol></code></pre>`,
//!   one `<li>` per source line
//! - old: `<pre><code class="hljs rust">text</code></pre>`
//!
//! Code text is taken from text content, never re-dispatched.

use markup5ever_rcdom::Handle;

use super::super::dom::{class_list, element_children, find_descendant, is_element, text_content};
use super::super::fragment::Fragment;

/// Language from `language-xxx`, or the token after a leading `hljs`.
fn detect_language(code: &Handle) -> Option<String> {
    let classes = class_list(code);
    if let Some(lang) = classes
        .iter()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
    {
        return Some(lang.to_string());
    }
    match classes.as_slice() {
        [first, second, ..] if first == "hljs" => Some(second.clone()),
        _ => None,
    }
}

/// Source text of a `<code>` element in either dialect.
fn code_text(code: &Handle) -> String {
    let numbered = element_children(code)
        .into_iter()
        .find(|child| is_element(child, "ol"));
    match numbered {
        Some(ol) => element_children(&ol)
            .iter()
            .filter(|child| is_element(child, "li"))
            .map(text_content)
            .collect::<Vec<_>>()
            .join("\n"),
        None => {
            let text = text_content(code);
            match text.strip_suffix('\n') {
                Some(stripped) => stripped.to_string(),
                None => text,
            }
        }
    }
}

/// Longest backtick run in `text`.
fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

fn fence(text: &str, language: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(text).max(2) + 1);
    format!("{fence}{language}\n{text}\n{fence}")
}

pub(super) fn pre_handler(node: &Handle) -> Fragment {
    let Some(code) = find_descendant(node, &|n| is_element(n, "code")) else {
        log::warn!("<pre> without <code> child, fencing its raw text");
        let text = text_content(node);
        let text = text.strip_suffix('\n').unwrap_or(&text);
        return Fragment::block(fence(text, ""));
    };

    let language = detect_language(&code).unwrap_or_default();
    Fragment::block(fence(&code_text(&code), &language))
}

pub(super) fn inline_code_handler(node: &Handle) -> Fragment {
    let text = text_content(node).replace(['\r', '\n'], " ");
    if text.trim().is_empty() {
        return Fragment::new();
    }
    let run = longest_backtick_run(&text);
    if run == 0 {
        return Fragment::inline(format!("`{text}`"));
    }
    let fence = "`".repeat(run + 1);
    Fragment::inline(format!("{fence} {text} {fence}"))
}
