use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

pub(crate) fn parse_html(html: &str) -> io::Result<RcDom> {
    let parse_options = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(RcDom::default(), parse_options)
        .from_utf8()
        .read_from(&mut html.as_bytes())
}

pub(crate) fn get_node_tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&name.local),
        _ => None,
    }
}

pub(crate) fn is_element(node: &Handle, tag: &str) -> bool {
    get_node_tag_name(node).is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

pub(crate) fn get_attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| (*attr.name.local).eq_ignore_ascii_case(name))
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Set or replace an attribute. Only ever called on working copies.
pub(crate) fn set_attr(node: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        if let Some(existing) = attrs.iter_mut().find(|attr| &*attr.name.local == name) {
            existing.value = StrTendril::from_slice(value);
        } else {
            attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: StrTendril::from_slice(value),
            });
        }
    }
}

pub(crate) fn has_class(node: &Handle, class: &str) -> bool {
    get_attr(node, "class").is_some_and(|value| value.split_whitespace().any(|c| c == class))
}

pub(crate) fn class_list(node: &Handle) -> Vec<String> {
    get_attr(node, "class")
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Value of one declaration in an inline `style` attribute, lowercased name match.
pub(crate) fn style_property(style: &str, property: &str) -> Option<String> {
    style.split(';').find_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(property)
            .then(|| value.trim().to_string())
    })
}

pub(crate) fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// First descendant (document order, excluding `node`) matching `predicate`.
pub(crate) fn find_descendant(node: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if predicate(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_descendant(child, predicate) {
            return Some(found);
        }
    }
    None
}

pub(crate) fn find_descendants(node: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_descendants(node, predicate, &mut found);
    found
}

fn collect_descendants(node: &Handle, predicate: &dyn Fn(&Handle) -> bool, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if predicate(child) {
            found.push(child.clone());
        }
        collect_descendants(child, predicate, found);
    }
}

/// Concatenated text of all descendant text nodes.
pub(crate) fn text_content(node: &Handle) -> String {
    text_content_skipping(node, &[])
}

/// Like [`text_content`], but subtrees carrying one of `skip_classes` are left out.
pub(crate) fn text_content_skipping(node: &Handle, skip_classes: &[&str]) -> String {
    let mut out = String::new();
    collect_text(node, skip_classes, &mut out);
    out
}

fn collect_text(node: &Handle, skip_classes: &[&str], out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { .. } if skip_classes.iter().any(|class| has_class(node, class)) => {}
        NodeData::Element { .. } | NodeData::Document => {
            for child in node.children.borrow().iter() {
                collect_text(child, skip_classes, out);
            }
        }
        _ => {}
    }
}

/// Detached copy of a subtree, so handlers can annotate it freely.
pub(crate) fn deep_clone(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point,
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(template_contents.borrow().as_ref().map(deep_clone)),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction { target, contents } => NodeData::ProcessingInstruction {
            target: target.clone(),
            contents: contents.clone(),
        },
    };

    let copy = Node::new(data);
    for child in node.children.borrow().iter() {
        let child_copy = deep_clone(child);
        child_copy.parent.set(Some(Rc::downgrade(&copy)));
        copy.children.borrow_mut().push(child_copy);
    }
    copy
}

fn serialize_with(node: &Handle, traversal_scope: TraversalScope) -> io::Result<String> {
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    let mut bytes = vec![];
    let handle: SerializableHandle = SerializableHandle::from(node.clone());
    serialize(&mut bytes, &handle, opts)?;
    String::from_utf8(bytes).map_err(io::Error::other)
}

/// HTML of the element itself and its subtree.
pub(crate) fn serialize_outer(node: &Handle) -> String {
    serialize_with(node, TraversalScope::IncludeNode).unwrap_or_else(|e| {
        log::warn!("Failed to serialize element: {e}");
        String::new()
    })
}

/// HTML of the element's children only.
pub(crate) fn serialize_inner(node: &Handle) -> String {
    serialize_with(node, TraversalScope::ChildrenOnly(None)).unwrap_or_else(|e| {
        log::warn!("Failed to serialize element children: {e}");
        String::new()
    })
}
