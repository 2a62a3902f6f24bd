use markup5ever_rcdom::Handle;

use super::super::dom::get_attr;
use super::super::fragment::Fragment;

/// Task-list checkbox; every other input type has no Markdown form.
pub(super) fn input_handler(node: &Handle) -> Fragment {
    let is_checkbox = get_attr(node, "type").is_some_and(|t| t.trim().eq_ignore_ascii_case("checkbox"));
    if !is_checkbox {
        return Fragment::new();
    }
    if get_attr(node, "checked").is_some() {
        Fragment::from("[x] ")
    } else {
        Fragment::from("[ ] ")
    }
}
