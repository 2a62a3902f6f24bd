//! Ordered and unordered lists.
//!
//! Each direct `<li>` is converted with a deeper context, its block
//! separators resolved to real blank lines, and only then indented: the
//! first line gets the item marker, every further non-blank line the
//! continuation indent. Nested lists pick up the outer indent on top of
//! their own, so depth accumulates naturally.

use markup5ever_rcdom::Handle;

use super::super::dom::{element_children, get_attr, get_node_tag_name};
use super::super::errors::ConversionResult;
use super::super::fragment::Fragment;
use super::ElementHandlers;
use crate::config::ConversionContext;
use crate::utils::{ORDERED_LIST_INDENT, UNORDERED_LIST_INDENT};

fn indent_item(content: Fragment, marker: &str, indent: usize) -> Fragment {
    let pad = " ".repeat(indent);
    content.prefix_lines(|index, line| {
        if index == 0 {
            marker.to_string()
        } else if line.trim().is_empty() {
            String::new()
        } else {
            pad.clone()
        }
    })
}

pub(super) async fn list_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
    ordered: bool,
) -> ConversionResult<Fragment> {
    let item_ctx = ctx.descend_list();
    let indent = if ordered {
        ORDERED_LIST_INDENT
    } else {
        UNORDERED_LIST_INDENT
    };
    let mut number = if ordered {
        get_attr(node, "start")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
    } else {
        1
    };

    let mut fragment = Fragment::new();
    fragment.push_block_break();

    for child in element_children(node) {
        match get_node_tag_name(&child) {
            Some("li") => {
                let content = handlers
                    .walk_children(&child, &item_ctx)
                    .await?
                    .resolve_block_breaks();
                let marker = if ordered {
                    format!("{number}. ")
                } else {
                    "- ".to_string()
                };
                number += 1;
                fragment.append(indent_item(content, &marker, indent));
                fragment.push_block_break();
            }
            // Invalid but common: a list nested directly in a list continues
            // the previous item
            Some("ol" | "ul") => {
                let nested = handlers
                    .dispatch(&child, &item_ctx)
                    .await?
                    .resolve_block_breaks();
                let pad = " ".repeat(indent);
                fragment.append(nested.prefix_lines(|_, line| {
                    if line.trim().is_empty() {
                        String::new()
                    } else {
                        pad.clone()
                    }
                }));
                fragment.push_block_break();
            }
            _ => {
                log::debug!(
                    "Skipping <{}> directly inside a list",
                    get_node_tag_name(&child).unwrap_or_default()
                );
            }
        }
    }

    tracing::trace!(depth = item_ctx.list_nesting_depth(), ordered, "list converted");
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown_converter::assembler::finalize;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_continuation_lines_get_exact_indent(
            lines in prop::collection::vec("[a-z]{1,6}", 1..6),
            ordered in any::<bool>(),
        ) {
            let indent = if ordered { ORDERED_LIST_INDENT } else { UNORDERED_LIST_INDENT };
            let marker = if ordered { "1. " } else { "- " };
            let content = Fragment::from(lines.join("\n"));
            let out = finalize(indent_item(content, marker, indent));
            let out_lines: Vec<&str> = out.lines().collect();
            prop_assert_eq!(out_lines[0], format!("{marker}{}", lines[0]));
            for (got, want) in out_lines.iter().zip(&lines).skip(1) {
                prop_assert_eq!(got.to_string(), format!("{}{}", " ".repeat(indent), want));
            }
        }
    }

    #[test]
    fn test_blank_lines_stay_unindented() {
        let out = finalize(indent_item(Fragment::from("a\n\nb"), "- ", 2));
        assert_eq!(out, "- a\n\n  b");
    }
}
