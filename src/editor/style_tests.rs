use super::*;
use crate::dom::Range;

const BOLD: InlineStyle = InlineStyle::BOLD;

fn container(doc: &mut Document) -> NodeId {
    let div = doc.create_element("div");
    doc.append_child(doc.body(), div);
    div
}

fn text_in(doc: &mut Document, parent: NodeId, data: &str) -> NodeId {
    let node = doc.create_text(data);
    doc.append_child(parent, node);
    node
}

fn select(doc: &mut Document, start: (NodeId, usize), end: (NodeId, usize)) {
    doc.set_base_and_extent(
        BoundaryPoint::new(start.0, start.1),
        BoundaryPoint::new(end.0, end.1),
    );
}

/// Text node whose data is exactly `data`, searched below `root`.
fn find_text(doc: &Document, root: NodeId, data: &str) -> NodeId {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if doc.text(node) == Some(data) {
            return node;
        }
        stack.extend(doc.children(node).iter().copied());
    }
    panic!("no text node {data:?}");
}

#[test]
fn toggle_wraps_plain_text_in_bold_wrapper() {
    let mut doc = Document::new();
    let div = container(&mut doc);
    let text = text_in(&mut doc, div, "hello world");
    select(&mut doc, (text, 0), (text, 5));

    assert!(toggle_style(&mut doc, &BOLD));
    let hello = find_text(&doc, div, "hello");
    let wrapper = doc.parent(hello).expect("wrapper");
    assert!(doc.has_tag(wrapper, "span"));
    assert!(doc.has_class(wrapper, WRAPPER_CLASS));
    assert_eq!(doc.style(wrapper, "font-weight"), Some("bold"));
    assert_eq!(doc.parent(wrapper), Some(div));

    let rest = find_text(&doc, div, " world");
    assert_eq!(doc.parent(rest), Some(div));
    assert_eq!(doc.text_content(div), "hello world");
}

#[test]
fn toggling_twice_restores_computed_style() {
    let mut doc = Document::new();
    let div = container(&mut doc);
    let text = text_in(&mut doc, div, "hello");
    select(&mut doc, (text, 0), (text, 5));

    assert!(toggle_style(&mut doc, &BOLD));
    let hello = find_text(&doc, div, "hello");
    assert_eq!(doc.computed_style(hello, "font-weight"), Some("bold"));

    // The selection was left on the sanitized range, so the same call
    // toggles the same nodes.
    assert!(toggle_style(&mut doc, &BOLD));
    assert_ne!(doc.computed_style(hello, "font-weight"), Some("bold"));
}

#[test]
fn decorative_tag_becomes_off_wrapper_and_back() {
    let mut doc = Document::new();
    let div = container(&mut doc);
    let bold = doc.create_element("b");
    doc.append_child(div, bold);
    let text = text_in(&mut doc, bold, "strong words");
    select(&mut doc, (div, 0), (div, 1));

    assert!(toggle_style(&mut doc, &BOLD));
    let wrapper = doc.first_child(div).expect("wrapper");
    assert!(!doc.is_connected(bold));
    assert!(doc.has_class(wrapper, WRAPPER_CLASS));
    assert_eq!(doc.style(wrapper, "font-weight"), Some("normal"));
    assert_eq!(doc.parent(text), Some(wrapper));

    assert!(toggle_style(&mut doc, &BOLD));
    assert_eq!(doc.computed_style(text, "font-weight"), Some("bold"));
}

#[test]
fn element_inside_bold_ancestor_toggles_off_and_back() {
    let mut doc = Document::new();
    let div = container(&mut doc);
    let bold = doc.create_element("b");
    doc.append_child(div, bold);
    let span = doc.create_element("span");
    doc.append_child(bold, span);
    let text = text_in(&mut doc, span, "x");
    select(&mut doc, (bold, 0), (bold, 1));
    assert_eq!(classify(&doc, span, &BOLD), NodeClass::StyledPlain);

    assert!(toggle_style(&mut doc, &BOLD));
    assert_eq!(doc.style(span, "font-weight"), Some("normal"));
    assert_eq!(doc.computed_style(text, "font-weight"), Some("normal"));

    assert!(toggle_style(&mut doc, &BOLD));
    assert_eq!(doc.computed_style(text, "font-weight"), Some("bold"));
    assert_eq!(doc.parent(text), Some(span));
    assert_eq!(doc.parent(span), Some(bold));
}

#[test]
fn styled_element_is_switched_off_in_place() {
    let mut doc = Document::new();
    let div = container(&mut doc);
    let span = doc.create_element("span");
    doc.set_css_text(span, "font-weight: bold;");
    doc.append_child(div, span);
    text_in(&mut doc, span, "x");
    select(&mut doc, (div, 0), (div, 1));

    assert!(toggle_style(&mut doc, &BOLD));
    assert_eq!(doc.first_child(div), Some(span));
    assert_eq!(doc.style(span, "font-weight"), Some("normal"));
}

#[test]
fn text_inside_bold_ancestor_gets_off_wrapper() {
    let mut doc = Document::new();
    let div = container(&mut doc);
    let bold = doc.create_element("b");
    doc.append_child(div, bold);
    let text = text_in(&mut doc, bold, "hello world");
    select(&mut doc, (text, 0), (text, 5));

    assert!(toggle_style(&mut doc, &BOLD));
    let hello = find_text(&doc, div, "hello");
    let world = find_text(&doc, div, " world");
    assert_eq!(doc.computed_style(hello, "font-weight"), Some("normal"));
    assert_eq!(doc.computed_style(world, "font-weight"), Some("bold"));
    assert_eq!(doc.parent(world), Some(bold));
}

#[test]
fn toggle_spans_blocks_and_leaves_outside_text_alone() {
    let mut doc = Document::new();
    let editor = container(&mut doc);
    let first = doc.create_element("div");
    let second = doc.create_element("div");
    doc.append_child(editor, first);
    doc.append_child(editor, second);
    let abc = text_in(&mut doc, first, "abc");
    let def = text_in(&mut doc, second, "def");
    select(&mut doc, (abc, 1), (def, 2));

    assert!(toggle_style(&mut doc, &BOLD));
    for data in ["bc", "de"] {
        let node = find_text(&doc, editor, data);
        assert_eq!(doc.computed_style(node, "font-weight"), Some("bold"));
    }
    for data in ["a", "f"] {
        let node = find_text(&doc, editor, data);
        assert_eq!(doc.computed_style(node, "font-weight"), None);
        assert!(doc.has_tag(doc.parent(node).expect("parent"), "div"));
    }
}

#[test]
fn collapsed_selection_changes_nothing() {
    let mut doc = Document::new();
    let div = container(&mut doc);
    let text = text_in(&mut doc, div, "hello");
    select(&mut doc, (text, 2), (text, 2));

    assert!(!toggle_style(&mut doc, &BOLD));
    assert_eq!(doc.children(div), &[text]);
}

#[test]
fn classify_recognises_each_category() {
    let mut doc = Document::new();
    let div = container(&mut doc);

    let wrapper = doc.create_element("span");
    doc.add_class(wrapper, WRAPPER_CLASS);
    let bold = doc.create_element("strong");
    let styled_b = doc.create_element("b");
    doc.set_style(styled_b, "font-weight", "normal");
    let styled = doc.create_element("span");
    doc.set_style(styled, "font-weight", "bold");
    let plain = doc.create_element("span");
    for node in [wrapper, bold, styled_b, styled, plain] {
        doc.append_child(div, node);
    }
    let inherited = text_in(&mut doc, bold, "x");

    assert_eq!(classify(&doc, wrapper, &BOLD), NodeClass::StyledWrapper);
    assert_eq!(classify(&doc, bold, &BOLD), NodeClass::Decorative);
    assert_eq!(classify(&doc, styled_b, &BOLD), NodeClass::Unstyled);
    assert_eq!(classify(&doc, styled, &BOLD), NodeClass::StyledPlain);
    assert_eq!(classify(&doc, plain, &BOLD), NodeClass::Unstyled);
    assert_eq!(classify(&doc, inherited, &BOLD), NodeClass::StyledPlain);
}

#[test]
fn overlap_treats_touching_nodes_as_disjoint() {
    let mut doc = Document::new();
    let div = container(&mut doc);
    let first = text_in(&mut doc, div, "a");
    let second = text_in(&mut doc, div, "b");
    let third = text_in(&mut doc, div, "c");

    let range = Range::new(BoundaryPoint::new(div, 1), BoundaryPoint::new(div, 2));
    assert_eq!(overlap(&doc, first, &range), Overlap::Disjoint);
    assert_eq!(overlap(&doc, second, &range), Overlap::Contained);
    assert_eq!(overlap(&doc, third, &range), Overlap::Disjoint);

    // A start inside the text node itself lies after the node's own start.
    let partial = Range::new(BoundaryPoint::new(first, 1), BoundaryPoint::new(div, 2));
    assert_eq!(overlap(&doc, first, &partial), Overlap::Partial);
}

#[test]
fn apply_flips_wrapper_state() {
    let mut doc = Document::new();
    let div = container(&mut doc);
    let wrapper = doc.create_element("span");
    doc.add_class(wrapper, WRAPPER_CLASS);
    doc.append_child(div, wrapper);

    apply(&mut doc, wrapper, NodeClass::StyledWrapper, &BOLD);
    assert_eq!(doc.style(wrapper, "font-weight"), Some("bold"));
    apply(&mut doc, wrapper, NodeClass::StyledWrapper, &BOLD);
    assert_eq!(doc.style(wrapper, "font-weight"), Some("normal"));
}
