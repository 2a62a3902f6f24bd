use markup5ever_rcdom::Handle;

use super::super::dom::{find_descendants, has_class, is_element, text_content};
use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::{ElementHandlers, default_handler};
use crate::config::ConversionContext;
use crate::utils::{FOOTNOTES_CLASS, FOOTNOTE_RETURN_GLYPH};

fn footnote_text(item: &Handle) -> String {
    text_content(item)
        .replace(FOOTNOTE_RETURN_GLYPH, "")
        .replace(['\r', '\n'], "")
        .trim()
        .to_string()
}

/// `[^N]: text` per footnote entry; other sections and divs are plain containers.
pub(super) async fn container_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    if !has_class(node, FOOTNOTES_CLASS) {
        return default_handler(handlers, node, ctx).await;
    }

    let definitions: Vec<String> = find_descendants(node, &|n| is_element(n, "li"))
        .iter()
        .enumerate()
        .map(|(index, item)| format!("[^{}]: {}", index + 1, footnote_text(item)))
        .collect();
    if definitions.is_empty() {
        log::warn!("Footnote section without entries");
        return Ok(Fragment::new());
    }

    Ok(Fragment::block(definitions.join("\n")))
}
