//! Inline SVG.
//!
//! Namespace attributes are added on a working copy: the HTML serializer
//! drops them, and standalone SVG files or data URIs do not render without.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use markup5ever_rcdom::Handle;

use super::super::dom::{
    deep_clone, element_children, find_descendant, find_descendants, get_attr, get_node_tag_name,
    is_element, serialize_outer, set_attr, style_property,
};
use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::ElementHandlers;
use crate::config::ConversionContext;
use crate::utils::collapse_html_whitespace;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

fn is_hidden(node: &Handle) -> bool {
    get_attr(node, "style")
        .and_then(|style| style_property(&style, "display"))
        .is_some_and(|display| display.eq_ignore_ascii_case("none"))
}

/// Standalone markup of `node`, namespaces filled in.
pub(super) fn standalone_svg(node: &Handle) -> String {
    let working = deep_clone(node);
    if get_attr(&working, "xmlns").is_none() {
        set_attr(&working, "xmlns", SVG_NAMESPACE);
    }
    let foreign_objects = find_descendants(&working, &|n| {
        get_node_tag_name(n).is_some_and(|tag| tag.eq_ignore_ascii_case("foreignObject"))
    });
    for foreign in foreign_objects {
        for div in element_children(&foreign)
            .iter()
            .filter(|child| is_element(child, "div"))
        {
            set_attr(div, "xmlns", XHTML_NAMESPACE);
        }
    }
    serialize_outer(&working)
}

pub(super) async fn svg_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    if is_hidden(node) {
        log::debug!("Dropping hidden svg");
        return Ok(Fragment::new());
    }

    let markup = standalone_svg(node);
    if markup.is_empty() {
        return Ok(Fragment::new());
    }

    if ctx.save_images_locally() {
        let path = handlers
            .sink()
            .localize_svg(&markup, ctx.asset_dir_name(), ctx.asset_file_prefix())
            .await?;
        return Ok(Fragment::block(format!("![]({path})")));
    }

    if find_descendant(node, &|n| is_element(n, "style")).is_some() {
        let encoded = STANDARD.encode(markup.as_bytes());
        return Ok(Fragment::block(format!("![](data:image/svg+xml;base64,{encoded})")));
    }

    Ok(Fragment::block(format!(
        r#"<div align="center">{}</div>"#,
        collapse_html_whitespace(&markup)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown_converter::dom::parse_html;

    #[test]
    fn test_namespaces_added_on_copy_only() {
        let dom = parse_html(
            r#"<svg width="10"><foreignObject><div>t</div></foreignObject></svg>"#,
        )
        .unwrap();
        let svg = find_descendant(&dom.document, &|n| is_element(n, "svg")).unwrap();
        let markup = standalone_svg(&svg);
        assert!(markup.starts_with("<svg"));
        assert!(markup.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(markup.contains(r#"<div xmlns="http://www.w3.org/1999/xhtml">t</div>"#));
        assert_eq!(get_attr(&svg, "xmlns"), None);
    }

    #[test]
    fn test_hidden_detection() {
        let dom = parse_html(r#"<svg style="position:absolute; display: none"></svg>"#).unwrap();
        let svg = find_descendant(&dom.document, &|n| is_element(n, "svg")).unwrap();
        assert!(is_hidden(&svg));
    }
}
