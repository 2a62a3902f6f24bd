//! Tables become pipe tables; row 0 is the header.

use markup5ever_rcdom::Handle;

use super::super::dom::{element_children, get_attr, get_node_tag_name};
use super::super::errors::ConversionResult;
use super::super::fragment::{Fragment, FragmentToken};
use super::ElementHandlers;
use crate::config::ConversionContext;

/// `tr` elements, directly under the table or inside its row groups.
fn table_rows(table: &Handle) -> Vec<Handle> {
    let mut rows = Vec::new();
    for child in element_children(table) {
        match get_node_tag_name(&child) {
            Some("tr") => rows.push(child),
            Some("thead" | "tbody" | "tfoot") => rows.extend(
                element_children(&child)
                    .into_iter()
                    .filter(|row| get_node_tag_name(row) == Some("tr")),
            ),
            _ => {}
        }
    }
    rows
}

fn row_cells(row: &Handle) -> Vec<Handle> {
    element_children(row)
        .into_iter()
        .filter(|cell| matches!(get_node_tag_name(cell), Some("td" | "th")))
        .collect()
}

fn delimiter_for(cell: Option<&Handle>) -> &'static str {
    let align = cell
        .and_then(|c| get_attr(c, "align"))
        .map(|a| a.trim().to_ascii_lowercase());
    match align.as_deref() {
        Some("right") => "---:",
        Some("left") => ":---",
        _ => ":---:",
    }
}

/// Single-line cell text: block separators become `<br />`, newlines spaces.
fn cell_text(content: Fragment) -> String {
    let mut out = String::new();
    let mut pending_block = false;
    let mut pending_inline = false;

    for token in content.trim_inline().into_tokens() {
        match token {
            FragmentToken::BlockBreak => pending_block = true,
            FragmentToken::InlineBreak => pending_inline = true,
            FragmentToken::Text(text) => {
                let text = text.replace(['\r', '\n'], " ");
                if text.trim().is_empty() && (pending_block || out.is_empty()) {
                    continue;
                }
                if pending_block && !out.is_empty() {
                    out.truncate(out.trim_end().len());
                    out.push_str("<br />");
                    out.push_str(text.trim_start());
                } else {
                    if pending_inline
                        && !out.is_empty()
                        && !out.ends_with(' ')
                        && !text.starts_with(' ')
                    {
                        out.push(' ');
                    }
                    out.push_str(&text);
                }
                pending_block = false;
                pending_inline = false;
            }
        }
    }

    out.trim().replace('|', "\\|")
}

fn render_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

pub(super) async fn table_handler(
    handlers: &ElementHandlers,
    node: &Handle,
    ctx: &ConversionContext,
) -> ConversionResult<Fragment> {
    let rows = table_rows(node);
    if rows.is_empty() {
        log::warn!("<table> without rows, keeping its content as a block");
        let mut fragment = handlers.walk_children(node, ctx).await?;
        fragment.push_block_break();
        return Ok(fragment);
    }

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut cells = Vec::new();
        for cell in row_cells(row) {
            cells.push(cell_text(handlers.walk_children(&cell, ctx).await?));
        }
        grid.push(cells);
    }

    let columns = grid.iter().map(Vec::len).max().unwrap_or(0).max(1);
    for cells in &mut grid {
        cells.resize(columns, String::new());
    }

    let header_cells = row_cells(&rows[0]);
    let delimiter: Vec<&str> = (0..columns)
        .map(|i| delimiter_for(header_cells.get(i)))
        .collect();

    let mut lines = Vec::with_capacity(grid.len() + 1);
    lines.push(render_row(&grid[0]));
    lines.push(format!("|{}|", delimiter.join("|")));
    lines.extend(grid[1..].iter().map(|cells| render_row(cells)));

    Ok(Fragment::block(lines.join("\n")))
}
