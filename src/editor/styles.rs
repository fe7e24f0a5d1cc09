use std::cmp::Ordering;

use tracing::{debug, trace};

use super::sanitize::sanitize;
use crate::dom::{Document, How, NodeId, Range};

/// Class carried by every wrapper element the editor inserts.
pub const WRAPPER_CLASS: &str = "rte_span";

/// An inline style the toolbar can toggle: one CSS property with its two
/// states, plus the tags that imply the "on" state by themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InlineStyle {
    pub property: &'static str,
    pub on: &'static str,
    pub off: &'static str,
    pub decorative_tags: &'static [&'static str],
}

impl InlineStyle {
    pub const BOLD: Self = Self {
        property: "font-weight",
        on: "bold",
        off: "normal",
        decorative_tags: &["b", "strong"],
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeClass {
    /// Inserted by the editor earlier, recognised by [`WRAPPER_CLASS`].
    StyledWrapper,
    /// A tag like `<b>` that carries the style without an inline value.
    Decorative,
    /// Already in the "on" state.
    StyledPlain,
    Unstyled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlap {
    Contained,
    Disjoint,
    Partial,
}

/// How the selected `range` covers `node`.
pub fn overlap(doc: &Document, node: NodeId, range: &Range) -> Overlap {
    let Some(node_range) = doc.node_range(node) else {
        return Overlap::Disjoint;
    };
    let starts_before = doc.compare_boundary_points(How::StartToStart, range, &node_range)
        != Ordering::Greater;
    let ends_after =
        doc.compare_boundary_points(How::EndToEnd, range, &node_range) != Ordering::Less;
    if starts_before && ends_after {
        return Overlap::Contained;
    }

    let ends_before_node =
        doc.compare_boundary_points(How::StartToEnd, range, &node_range) != Ordering::Greater;
    let starts_after_node =
        doc.compare_boundary_points(How::EndToStart, range, &node_range) != Ordering::Less;
    if ends_before_node || starts_after_node {
        Overlap::Disjoint
    } else {
        Overlap::Partial
    }
}

pub fn classify(doc: &Document, node: NodeId, style: &InlineStyle) -> NodeClass {
    if doc.has_class(node, WRAPPER_CLASS) {
        return NodeClass::StyledWrapper;
    }
    if let Some(tag) = doc.tag_name(node)
        && style.decorative_tags.contains(&tag)
        && doc.style(node, style.property).is_none()
    {
        return NodeClass::Decorative;
    }
    if doc.computed_style(node, style.property) == Some(style.on) {
        NodeClass::StyledPlain
    } else {
        NodeClass::Unstyled
    }
}

/// Toggles `style` on a node fully covered by the selection.
pub fn apply(doc: &mut Document, node: NodeId, class: NodeClass, style: &InlineStyle) {
    match class {
        NodeClass::StyledWrapper => {
            let value = if doc.style(node, style.property) == Some(style.on) {
                style.off
            } else {
                style.on
            };
            doc.set_style(node, style.property, value);
        }
        NodeClass::Decorative => {
            let wrapper = new_wrapper(doc, style, style.off);
            doc.move_children(node, wrapper);
            doc.replace_child(wrapper, node);
        }
        NodeClass::StyledPlain => set_state(doc, node, style, style.off),
        NodeClass::Unstyled => set_state(doc, node, style, style.on),
    }
}

fn set_state(doc: &mut Document, node: NodeId, style: &InlineStyle, value: &str) {
    if !doc.is_text(node) {
        doc.set_style(node, style.property, value);
        return;
    }
    let Some(parent) = doc.parent(node) else {
        return;
    };
    let wrapper = new_wrapper(doc, style, value);
    doc.insert_before(parent, wrapper, Some(node));
    doc.append_child(wrapper, node);
}

fn new_wrapper(doc: &mut Document, style: &InlineStyle, value: &str) -> NodeId {
    let wrapper = doc.create_element("span");
    doc.add_class(wrapper, WRAPPER_CLASS);
    doc.set_style(wrapper, style.property, value);
    wrapper
}

fn toggle_node(doc: &mut Document, node: NodeId, range: &Range, style: &InlineStyle) -> bool {
    match overlap(doc, node, range) {
        Overlap::Contained => {
            let class = classify(doc, node, style);
            trace!(?node, ?class, "toggling node");
            apply(doc, node, class, style);
            true
        }
        Overlap::Disjoint => false,
        Overlap::Partial => {
            let mut changed = false;
            for child in doc.children(node).to_vec() {
                changed |= toggle_node(doc, child, range, style);
            }
            changed
        }
    }
}

/// Toggles `style` over everything the current selection covers. Returns
/// whether any node changed.
pub fn toggle_style(doc: &mut Document, style: &InlineStyle) -> bool {
    let Some(range) = doc.range() else {
        return false;
    };
    if range.is_collapsed() {
        return false;
    }
    let range = sanitize(doc, range);
    doc.select(range);

    let Some(ancestor) = doc.common_ancestor(&range) else {
        return false;
    };
    let mut changed = false;
    for child in doc.children(ancestor).to_vec() {
        changed |= toggle_node(doc, child, &range, style);
    }
    debug!(property = style.property, changed, "toggled inline style");
    changed
}
