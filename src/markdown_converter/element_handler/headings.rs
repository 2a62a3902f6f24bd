//! Handler for heading elements (h1-h6)
//!
//! The platform wraps heading text after an empty `<a name="...">` anchor;
//! those anchors are skipped before conversion. Children are converted
//! normally (not via text content) so inline markup inside titles survives.

use markup5ever_rcdom::Handle;

use super::super::dom::{find_descendant, is_element, text_content};
use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::ElementHandlers;
use crate::config::ConversionContext;

/// Anchor carrying no visible text nor an image.
fn is_empty_anchor(node: &Handle) -> bool {
    is_element(node, "a")
        && crate::utils::strip_invisible(&text_content(node)).trim().is_empty()
        && find_descendant(node, &|n| is_element(n, "img")).is_none()
}

fn is_image_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("![") || line.starts_with("<img")
}

pub(super) async fn headings_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
    level: usize,
) -> ConversionResult<Fragment> {
    let children: Vec<Handle> = node
        .children
        .borrow()
        .iter()
        .filter(|child| !is_empty_anchor(child))
        .cloned()
        .collect();

    let content = handlers
        .walk_nodes(&children, ctx)
        .await?
        .resolve_block_breaks();
    if content.is_blank() {
        return Ok(Fragment::new());
    }

    let marker = format!("{} ", "#".repeat(level));
    let content = content.prefix_lines(|_, line| {
        if line.trim().is_empty() || is_image_line(line) {
            String::new()
        } else {
            marker.clone()
        }
    });

    let mut fragment = Fragment::new();
    fragment.push_block_break();
    fragment.append(content);
    fragment.push_block_break();
    Ok(fragment)
}
