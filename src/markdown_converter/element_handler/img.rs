//! Images: formula bitmaps, placement, localization and size preservation.

use std::sync::LazyLock;

use markup5ever_rcdom::Handle;
use regex::Regex;

use super::super::dom::{get_attr, has_class};
use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::{ElementHandlers, escape_link_text, link_destination};
use crate::config::ConversionContext;
use crate::utils::{CENTER_MARKER_ATTR, MATH_IMAGE_CLASS};

/// `200`, `200px`, `12.5em`, `50%`
static DIMENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*([a-zA-Z%]*)\s*$").expect("DIMENSION: hardcoded regex is valid")
});

/// CSS length from an HTML dimension attribute, defaulting the unit to px.
fn css_length(raw: &str) -> Option<String> {
    let caps = DIMENSION.captures(raw)?;
    let value = caps.get(1)?.as_str();
    let unit = caps.get(2).map_or("", |m| m.as_str());
    let unit = if unit.is_empty() { "px" } else { unit };
    Some(format!("{value}{}", unit.to_ascii_lowercase()))
}

/// Raw `<img>` carrying the source size as max-width/max-height.
fn sized_img_tag(src: &str, alt: &str, width: Option<String>, height: Option<String>) -> String {
    let mut style = String::new();
    if let Some(width) = width {
        style.push_str(&format!("max-width:{width};"));
    }
    if let Some(height) = height {
        style.push_str(&format!("max-height:{height};"));
    }
    format!(
        r#"<img src="{}" alt="{}" style="{style}">"#,
        html_escape::encode_double_quoted_attribute(src),
        html_escape::encode_double_quoted_attribute(alt),
    )
}

pub(super) async fn img_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    let alt = get_attr(node, "alt").unwrap_or_default().trim().to_string();

    if has_class(node, MATH_IMAGE_CLASS) {
        if alt.is_empty() {
            log::warn!("Formula image without alt text, dropping");
            return Ok(Fragment::new());
        }
        return Ok(Fragment::block(format!("$$\n{alt}\n$$")));
    }

    let mut src = get_attr(node, "src").unwrap_or_default().trim().to_string();
    if src.is_empty() {
        log::debug!("Image without src, dropping");
        return Ok(Fragment::new());
    }

    let centered = get_attr(node, CENTER_MARKER_ATTR).is_some() || ctx.force_image_centering();

    if ctx.save_images_locally() && !src.to_ascii_lowercase().starts_with("data:") {
        src = handlers
            .sink()
            .localize_image(&src, ctx.asset_dir_name(), ctx.asset_file_prefix())
            .await?;
    }

    let (width, height) = if ctx.preserve_image_dimensions() {
        (
            get_attr(node, "width").as_deref().and_then(css_length),
            get_attr(node, "height").as_deref().and_then(css_length),
        )
    } else {
        (None, None)
    };

    let image = if width.is_some() || height.is_some() {
        sized_img_tag(&src, &alt, width, height)
    } else {
        format!("![{}]({})", escape_link_text(&alt), link_destination(&src))
    };

    let mut fragment = Fragment::new();
    if centered {
        fragment.push_block_break();
    } else {
        fragment.push_inline_break();
    }
    fragment.push_text(image);
    fragment.push_block_break();
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_length_units() {
        assert_eq!(css_length("200").as_deref(), Some("200px"));
        assert_eq!(css_length(" 12.5EM ").as_deref(), Some("12.5em"));
        assert_eq!(css_length("50%").as_deref(), Some("50%"));
        assert_eq!(css_length("auto"), None);
        assert_eq!(css_length(""), None);
    }

    #[test]
    fn test_sized_img_tag_escapes_attributes() {
        let tag = sized_img_tag("a.png?x=1&y=2", r#"say "hi""#, None, Some("200px".into()));
        assert_eq!(
            tag,
            r#"<img src="a.png?x=1&amp;y=2" alt="say &quot;hi&quot;" style="max-height:200px;">"#
        );
    }
}
