use std::cmp::Ordering;

use crate::dom::{BoundaryPoint, Document, FilterResult, How, NodeId, Range, TreeWalker, WhatToShow};

/// Selects `start..end` inside `node`, replacing any current selection.
pub fn move_caret(doc: &mut Document, node: NodeId, start: usize, end: usize) {
    doc.remove_all_ranges();
    let range = Range::new(BoundaryPoint::new(node, start), BoundaryPoint::new(node, end));
    doc.select(range);
}

/// Number of characters between the start of `node` and the caret.
///
/// Element offsets on their own say nothing about text position, so the
/// text of every node ending before the caret is counted and the caret's
/// own offset added when it sits in text.
pub fn character_offset(doc: &mut Document, range: &Range, node: NodeId) -> usize {
    let mut walker = TreeWalker::new(node, WhatToShow::TEXT);
    let mut count = 0;
    while let Some(text) = walker.next_node(doc, |doc, candidate| {
        let ends_before = doc.node_range(candidate).is_some_and(|node_range| {
            doc.compare_boundary_points(How::EndToEnd, &node_range, range) != Ordering::Greater
        });
        if ends_before {
            FilterResult::Accept
        } else {
            FilterResult::Reject
        }
    }) {
        count += doc.node_len(text);
    }
    if doc.is_text(range.start.node) {
        count += range.start.offset;
    }
    count
}
