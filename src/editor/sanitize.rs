use std::cmp::Ordering;

use tracing::debug;

use crate::dom::{BoundaryPoint, Document, NodeId, Range};

/// Moves both ends of `range` onto node boundaries.
///
/// A text container is split at the boundary offset and the boundary moves
/// to sit just before the new trailing text node. Element boundaries are
/// left alone, so the result is a fixed point.
pub fn sanitize(doc: &mut Document, range: Range) -> Range {
    let mut range = range;

    if doc.is_text(range.start.node) {
        let node = range.start.node;
        let offset = range.start.offset.min(doc.node_len(node));
        if let Some((tail, before)) = split_before(doc, node, offset) {
            range.end = follow_split(doc, range.end, node, offset, tail);
            range.start = before;
            debug!(start = ?range.start, "split range start");
        }
    }

    if doc.is_text(range.end.node) {
        let node = range.end.node;
        let offset = range.end.offset.min(doc.node_len(node));
        if let Some((tail, before)) = split_before(doc, node, offset) {
            range.start = follow_split(doc, range.start, node, offset, tail);
            range.end = before;
            debug!(end = ?range.end, "split range end");
        }
    }

    // An end placed before the start collapses the range, as `setEnd` does.
    if doc.compare_points(range.start, range.end) == Ordering::Greater {
        range.start = range.end;
    }
    range
}

fn split_before(doc: &mut Document, node: NodeId, offset: usize) -> Option<(NodeId, BoundaryPoint)> {
    let tail = doc.split_text(node, offset)?;
    let before = doc.point_before(tail)?;
    Some((tail, before))
}

/// Where `point` ends up after `node` was split at `offset` into `node` and
/// `tail`. Mirrors what a live range does.
fn follow_split(
    doc: &Document,
    point: BoundaryPoint,
    node: NodeId,
    offset: usize,
    tail: NodeId,
) -> BoundaryPoint {
    if point.node == node && point.offset > offset {
        return BoundaryPoint::new(tail, point.offset - offset);
    }
    if let (Some(parent), Some(index)) = (doc.parent(node), doc.index(node))
        && point.node == parent
        && point.offset > index
    {
        return BoundaryPoint::new(parent, point.offset + 1);
    }
    point
}
