use markup5ever_rcdom::{Handle, NodeData};

use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::{ElementHandlers, with_centered_images};
use crate::config::ConversionContext;

/// `<center>`: a lone text child stays a `<center>` element, anything else
/// is converted with its images placed as blocks.
pub(super) async fn center_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    let lone_text = {
        let children = node.children.borrow();
        match children.as_slice() {
            [only] => match &only.data {
                NodeData::Text { contents } => Some(contents.borrow().trim().to_string()),
                _ => None,
            },
            _ => None,
        }
    };

    if let Some(text) = lone_text {
        if text.is_empty() {
            return Ok(Fragment::new());
        }
        return Ok(Fragment::block(format!(
            "<center>{}</center>",
            html_escape::encode_text(&text)
        )));
    }

    let working = with_centered_images(node);
    let mut fragment = Fragment::new();
    fragment.push_block_break();
    fragment.append(handlers.walk_children(&working, ctx).await?);
    fragment.push_block_break();
    Ok(fragment)
}
