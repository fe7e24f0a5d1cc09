use tracing::{debug, trace};

use crate::dom::{Document, FilterResult, NodeId, TreeWalker, WhatToShow};

/// What the backspace handler decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Let the host's own backspace run.
    NativeProceed,
    /// The tree was changed here; suppress the host's backspace.
    Handled,
    /// Nothing to delete; suppress the host's backspace.
    Blocked,
}

impl DeleteOutcome {
    pub fn suppresses_default(self) -> bool {
        !matches!(self, Self::NativeProceed)
    }
}

/// Decides what backspace does at the current caret inside `editor`.
///
/// Inside text, and for any non-collapsed selection, the host deletes
/// natively. At the start of a node the previous node is looked up across
/// element boundaries: when it still holds text the host deletes from it,
/// otherwise the empty node is removed here.
pub fn delete_previous_node(doc: &mut Document, editor: NodeId) -> DeleteOutcome {
    let selection = doc.selection();
    if !selection.is_collapsed() {
        return DeleteOutcome::NativeProceed;
    }
    let Some(focus) = selection.focus() else {
        return DeleteOutcome::Blocked;
    };
    let mut node = focus.node;
    let mut offset = focus.offset;
    if doc.is_text(node) && offset > 0 {
        return DeleteOutcome::NativeProceed;
    }

    let pruned = clean_editor(doc, editor);
    let nothing_to_delete = if pruned {
        DeleteOutcome::Handled
    } else {
        DeleteOutcome::Blocked
    };

    if offset > 0 {
        offset -= 1;
    } else if node == editor {
        return nothing_to_delete;
    } else if let Some(previous) = doc.previous_sibling(node) {
        node = previous;
        offset = doc.node_len(node);
    } else {
        match previous_node(doc, node, editor) {
            Some(previous) if previous != editor => {
                node = previous;
                if let Some(last) = doc.node_len(node).checked_sub(1)
                    && !doc.is_text(node)
                {
                    offset = last;
                }
            }
            _ => {
                debug!(?node, "nothing before the caret");
                return nothing_to_delete;
            }
        }
    }

    let mut target = doc.child(node, offset).unwrap_or(node);
    if target == editor {
        return nothing_to_delete;
    }

    let mut walker = TreeWalker::new(target, WhatToShow::ELEMENT | WhatToShow::TEXT);
    while let Some(current) = walker.last_child(doc, drop_empty_nodes) {
        target = current;
    }
    trace!(?target, "resolved delete target");

    let has_text = match doc.text(target) {
        Some(text) => !text.is_empty(),
        None => !doc.text_content(target).is_empty(),
    };
    if has_text {
        return DeleteOutcome::NativeProceed;
    }

    let parent = doc.parent(target);
    doc.remove(target);
    if let Some(parent) = parent {
        prune_empty_divs(doc, parent, editor);
    }
    debug!(?target, "removed empty node before the caret");
    DeleteOutcome::Handled
}

/// Tree walker filter: detaches empty `div`s and empty text nodes.
fn drop_empty_nodes(doc: &mut Document, node: NodeId) -> FilterResult {
    let empty_div = doc.has_tag(node, "div") && doc.children(node).is_empty();
    let empty_text = doc.text(node).is_some_and(str::is_empty);
    if empty_div || empty_text {
        doc.remove(node);
        return FilterResult::Reject;
    }
    FilterResult::Accept
}

/// Removes empty `div`s directly below the editor. Returns whether anything
/// was removed.
fn clean_editor(doc: &mut Document, editor: NodeId) -> bool {
    let mut removed = false;
    for child in doc.children(editor).to_vec() {
        if doc.has_tag(child, "div") && doc.children(child).is_empty() {
            removed |= doc.remove(child);
        }
    }
    removed
}

/// Previous sibling of `node`, or of its nearest ancestor that has one.
/// Reaching `editor` on the way up yields `editor`.
fn previous_node(doc: &Document, node: NodeId, editor: NodeId) -> Option<NodeId> {
    let mut previous = doc.previous_sibling(node);
    let mut parent = doc.parent(node);
    while previous.is_none() {
        let up = parent?;
        if up == editor {
            return Some(editor);
        }
        previous = doc.previous_sibling(up);
        parent = doc.parent(up);
    }
    previous
}

fn prune_empty_divs(doc: &mut Document, node: NodeId, editor: NodeId) {
    let mut current = node;
    while current != editor && doc.has_tag(current, "div") && doc.children(current).is_empty() {
        let Some(parent) = doc.parent(current) else {
            break;
        };
        doc.remove(current);
        current = parent;
    }
}
