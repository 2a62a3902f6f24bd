use markup5ever_rcdom::Handle;

use super::super::dom::{has_class, text_content};
use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::ElementHandlers;
use crate::config::ConversionContext;
use crate::utils::FOOTNOTE_REF_CLASS;

async fn wrap_tag(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
    tag: &str,
) -> ConversionResult<Fragment> {
    let content = handlers.walk_children(node, ctx).await?.trim_inline();
    if content.is_blank() {
        return Ok(Fragment::new());
    }
    let mut fragment = Fragment::from(format!("<{tag}>"));
    fragment.append(content);
    fragment.push_text(format!("</{tag}>"));
    Ok(fragment)
}

pub(super) async fn sup_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    if has_class(node, FOOTNOTE_REF_CLASS) {
        let number: String = text_content(node)
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if !number.is_empty() {
            return Ok(Fragment::from(format!("[^{number}]")));
        }
        log::warn!("Footnote reference without a number, keeping it as superscript");
    }
    wrap_tag(handlers, node, ctx, "sup").await
}

pub(super) async fn sub_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    wrap_tag(handlers, node, ctx, "sub").await
}
