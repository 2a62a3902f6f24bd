use markup5ever_rcdom::Handle;

use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::ElementHandlers;
use crate::config::ConversionContext;

pub(super) async fn blockquote_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    let content = handlers
        .walk_children(node, ctx)
        .await?
        .resolve_block_breaks();
    if content.is_blank() {
        return Ok(Fragment::new());
    }

    let mut fragment = Fragment::new();
    fragment.push_block_break();
    fragment.append(content.prefix_lines(|_, _| "> ".to_string()));
    fragment.push_block_break();
    Ok(fragment)
}
