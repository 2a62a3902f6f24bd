use markup5ever_rcdom::{Handle, NodeData};

use super::super::dom::{get_attr, has_class, style_property};
use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::ElementHandlers;
use super::math::math_span;
use crate::config::ConversionContext;
use crate::utils::{KATEX_DISPLAY_CLASS, KATEX_INLINE_CLASS};

/// Text of the only child, when that child is a text node.
fn single_text_child(node: &Handle) -> Option<String> {
    let children = node.children.borrow();
    match children.as_slice() {
        [only] => match &only.data {
            NodeData::Text { contents } => {
                let text = contents.borrow().trim().to_string();
                (!text.is_empty()).then_some(text)
            }
            _ => None,
        },
        _ => None,
    }
}

fn is_colored(style: &str) -> bool {
    ["color", "background-color", "background"]
        .iter()
        .any(|property| style_property(style, property).is_some())
}

pub(super) async fn span_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    let display = has_class(node, KATEX_DISPLAY_CLASS);
    if (display || has_class(node, KATEX_INLINE_CLASS))
        && let Some(fragment) = math_span(node, display)
    {
        return Ok(fragment);
    }

    if ctx.preserve_colored_text()
        && let Some(style) = get_attr(node, "style").filter(|s| is_colored(s))
        && let Some(text) = single_text_child(node)
    {
        return Ok(Fragment::from(format!(
            r#"<span style="{}">{}</span>"#,
            html_escape::encode_double_quoted_attribute(style.trim()),
            html_escape::encode_text(&text),
        )));
    }

    handlers.walk_children(node, ctx).await
}

pub(super) async fn font_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    if ctx.preserve_colored_text()
        && let Some(color) = get_attr(node, "color").filter(|c| !c.trim().is_empty())
        && let Some(text) = single_text_child(node)
    {
        return Ok(Fragment::from(format!(
            r#"<font color="{}">{}</font>"#,
            html_escape::encode_double_quoted_attribute(color.trim()),
            html_escape::encode_text(&text),
        )));
    }

    handlers.walk_children(node, ctx).await
}
