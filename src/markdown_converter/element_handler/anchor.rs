use markup5ever_rcdom::Handle;
use url::Url;

use super::super::dom::{get_attr, has_class};
use super::super::errors::ConversionResult;
use super::super::fragment::{Fragment, FragmentToken};
use super::{ElementHandlers, escape_link_text, link_destination};
use crate::config::ConversionContext;
use crate::utils::{CARD_LINK_CLASS, FOOTNOTE_BACKREF_CLASS, SEARCH_ENGINE_HOSTS};

fn is_search_engine_link(href: &str) -> bool {
    Url::parse(href)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| SEARCH_ENGINE_HOSTS.contains(&host.as_str()))
}

/// Link label: block separators flattened so the label stays on one line.
fn flatten_label(content: Fragment) -> Fragment {
    let mut label = Fragment::new();
    for token in content.into_tokens() {
        match token {
            FragmentToken::Text(text) => label.push_text(text),
            FragmentToken::BlockBreak | FragmentToken::InlineBreak => label.push_inline_break(),
        }
    }
    label.trim_inline()
}

pub(super) async fn anchor_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    if has_class(node, FOOTNOTE_BACKREF_CLASS) {
        return Ok(Fragment::new());
    }

    let href = get_attr(node, "href").unwrap_or_default().trim().to_string();

    if has_class(node, CARD_LINK_CLASS) {
        let title = get_attr(node, "title").unwrap_or_default().trim().to_string();
        if !title.is_empty() && !href.is_empty() {
            return Ok(Fragment::inline(format!(
                "[{}]({})",
                escape_link_text(&title),
                link_destination(&href)
            )));
        }
    }

    let label = flatten_label(handlers.walk_children(node, ctx).await?);

    if ctx.strip_search_engine_links() && is_search_engine_link(&href) {
        log::debug!("Stripping search engine link {href}");
        let mut fragment = Fragment::new();
        fragment.push_inline_break();
        fragment.append(label);
        fragment.push_inline_break();
        return Ok(fragment);
    }

    match (label.is_blank(), href.is_empty()) {
        (true, true) => Ok(Fragment::new()),
        (true, false) => Ok(Fragment::inline(format!(
            "[{}]({})",
            escape_link_text(&href),
            link_destination(&href)
        ))),
        (false, true) => {
            let mut fragment = Fragment::new();
            fragment.push_inline_break();
            fragment.append(label);
            fragment.push_inline_break();
            Ok(fragment)
        }
        (false, false) => {
            let mut fragment = Fragment::new();
            fragment.push_inline_break();
            fragment.push_text("[");
            fragment.append(label);
            fragment.push_text(format!("]({})", link_destination(&href)));
            fragment.push_inline_break();
            Ok(fragment)
        }
    }
}
