//! Paragraphs, special-cased by class, id and inline style.

use markup5ever_rcdom::Handle;

use super::super::dom::{find_descendant, get_attr, has_class, is_element, serialize_inner, style_property};
use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::{ElementHandlers, with_centered_images};
use crate::config::ConversionContext;
use crate::utils::{IMG_CENTER_CLASS, TOC_LABEL, TOC_PLACEHOLDER_ID, collapse_html_whitespace};

pub(super) async fn p_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    if has_class(node, IMG_CENTER_CLASS) {
        return centered_images(handlers, node, ctx).await;
    }

    if get_attr(node, "id").is_some_and(|id| id == TOC_PLACEHOLDER_ID) {
        if !ctx.enable_toc() {
            return Ok(Fragment::new());
        }
        let mut fragment = Fragment::block(TOC_LABEL);
        fragment.push_text("[TOC]");
        fragment.push_block_break();
        return Ok(fragment);
    }

    let style = get_attr(node, "style").unwrap_or_default();
    if style_property(&style, "padding-left").is_some() {
        log::debug!("Dropping indented paragraph");
        return Ok(Fragment::new());
    }

    if let Some(align) = style_property(&style, "text-align")
        .map(|a| a.to_ascii_lowercase())
        .filter(|a| a == "center" || a == "right")
    {
        // Images must still go through the image rules
        if find_descendant(node, &|n| is_element(n, "img")).is_some() {
            return centered_images(handlers, node, ctx).await;
        }
        let inner = collapse_html_whitespace(&serialize_inner(node));
        if inner.is_empty() {
            return Ok(Fragment::new());
        }
        return Ok(Fragment::block(format!(
            r#"<div style="text-align:{align};">{inner}</div>"#
        )));
    }

    let mut fragment = Fragment::new();
    fragment.push_block_break();
    fragment.append(handlers.walk_children(node, ctx).await?);
    fragment.push_block_break();
    Ok(fragment)
}

async fn centered_images(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    let working = with_centered_images(node);
    let mut fragment = Fragment::new();
    fragment.push_block_break();
    fragment.append(handlers.walk_children(&working, ctx).await?);
    fragment.push_block_break();
    Ok(fragment)
}
