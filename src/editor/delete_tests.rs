use super::*;

fn editable() -> (Document, NodeId) {
    let mut doc = Document::new();
    let editor = doc.create_element("div");
    doc.set_attribute(editor, "contenteditable", "true");
    doc.append_child(doc.body(), editor);
    (doc, editor)
}

fn element_in(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
    let node = doc.create_element(tag);
    doc.append_child(parent, node);
    node
}

fn text_in(doc: &mut Document, parent: NodeId, data: &str) -> NodeId {
    let node = doc.create_text(data);
    doc.append_child(parent, node);
    node
}

#[test]
fn selection_of_several_nodes_is_left_to_the_host() {
    let (mut doc, editor) = editable();
    let div = element_in(&mut doc, editor, "div");
    let text = text_in(&mut doc, div, "abc");
    doc.set_base_and_extent(BoundaryPoint::new(text, 0), BoundaryPoint::new(text, 2));

    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::NativeProceed);
    assert_eq!(doc.text(text), Some("abc"));
}

#[test]
fn missing_focus_is_blocked() {
    let (mut doc, editor) = editable();
    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::Blocked);
}

#[test]
fn caret_inside_text_is_left_to_the_host() {
    let (mut doc, editor) = editable();
    let div = element_in(&mut doc, editor, "div");
    let text = text_in(&mut doc, div, "abc");
    doc.collapse(BoundaryPoint::new(text, 1));
    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::NativeProceed);
}

#[test]
fn document_start_is_blocked_without_mutation() {
    let (mut doc, editor) = editable();
    let div = element_in(&mut doc, editor, "div");
    let text = text_in(&mut doc, div, "ab");
    doc.collapse(BoundaryPoint::new(text, 0));

    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::Blocked);
    assert_eq!(doc.children(editor), &[div]);
    assert_eq!(doc.children(div), &[text]);
    assert_eq!(doc.text(text), Some("ab"));
}

#[test]
fn empty_editor_is_blocked() {
    let (mut doc, editor) = editable();
    let body = doc.body();
    let before = element_in(&mut doc, body, "div");
    doc.insert_before(doc.body(), before, Some(editor));
    text_in(&mut doc, before, "toolbar");
    doc.collapse(BoundaryPoint::new(editor, 0));

    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::Blocked);
    assert_eq!(doc.text_content(before), "toolbar");
}

#[test]
fn previous_block_with_text_is_left_to_the_host() {
    let (mut doc, editor) = editable();
    let first = element_in(&mut doc, editor, "div");
    text_in(&mut doc, first, "abc");
    let second = element_in(&mut doc, editor, "div");
    let empty = text_in(&mut doc, second, "");
    doc.collapse(BoundaryPoint::new(empty, 0));

    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::NativeProceed);
    assert_eq!(doc.children(editor), &[first, second]);
}

#[test]
fn empty_previous_node_is_removed_here() {
    let (mut doc, editor) = editable();
    let first = element_in(&mut doc, editor, "div");
    let span = element_in(&mut doc, first, "span");
    text_in(&mut doc, span, "");
    let second = element_in(&mut doc, editor, "div");
    let x = text_in(&mut doc, second, "x");
    doc.collapse(BoundaryPoint::new(x, 0));

    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::Handled);
    assert!(!doc.is_connected(span));
    assert!(!doc.is_connected(first), "emptied div is pruned");
    assert_eq!(doc.children(editor), &[second]);
    assert_eq!(doc.selection().focus(), Some(BoundaryPoint::new(x, 0)));
}

#[test]
fn empty_line_under_caret_is_pruned() {
    let (mut doc, editor) = editable();
    let first = element_in(&mut doc, editor, "div");
    text_in(&mut doc, first, "abc");
    let empty = element_in(&mut doc, editor, "div");
    doc.collapse(BoundaryPoint::new(empty, 0));

    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::Handled);
    assert_eq!(doc.children(editor), &[first]);
    assert_eq!(doc.text_content(first), "abc");
}

#[test]
fn rule_before_caret_is_removed() {
    let (mut doc, editor) = editable();
    let first = element_in(&mut doc, editor, "div");
    text_in(&mut doc, first, "ab");
    let rule = insert_horizontal_rule(&mut doc, editor);
    doc.collapse(BoundaryPoint::new(editor, 2));

    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::Handled);
    assert!(!doc.is_connected(rule));
    assert_eq!(doc.children(editor), &[first]);
}

#[test]
fn walker_drops_empty_text_on_the_way_down() {
    let (mut doc, editor) = editable();
    let first = element_in(&mut doc, editor, "div");
    let bold = element_in(&mut doc, first, "b");
    let cd = text_in(&mut doc, bold, "cd");
    let empty = text_in(&mut doc, bold, "");
    let second = element_in(&mut doc, editor, "div");
    let x = text_in(&mut doc, second, "x");
    doc.collapse(BoundaryPoint::new(x, 0));

    assert_eq!(delete_previous_node(&mut doc, editor), DeleteOutcome::NativeProceed);
    assert!(!doc.is_connected(empty));
    assert_eq!(doc.children(bold), &[cd]);
}

#[test]
fn outcome_reports_default_suppression() {
    assert!(!DeleteOutcome::NativeProceed.suppresses_default());
    assert!(DeleteOutcome::Handled.suppresses_default());
    assert!(DeleteOutcome::Blocked.suppresses_default());
}
