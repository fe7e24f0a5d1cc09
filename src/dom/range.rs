use std::cmp::Ordering;

use super::{Document, NodeId};

/// A position in the tree: a node plus an offset into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl Range {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    pub fn collapsed_at(point: BoundaryPoint) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Which boundary of `this` is compared against which boundary of `source`
/// in [`Document::compare_boundary_points`]. Named after the DOM constants,
/// where `StartToEnd` compares this range's end with the source's start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum How {
    StartToStart,
    StartToEnd,
    EndToEnd,
    EndToStart,
}

impl Document {
    /// Root and child-index path of `node`.
    fn tree_path(&self, node: NodeId) -> (NodeId, Vec<usize>) {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            path.push(self.index(current).unwrap_or(0));
            current = parent;
        }
        path.reverse();
        (current, path)
    }

    /// Tree order of two nodes; ancestors precede their descendants.
    /// Nodes in different trees are ordered by their roots.
    pub fn tree_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let (root_a, path_a) = self.tree_path(a);
        let (root_b, path_b) = self.tree_path(b);
        if root_a != root_b {
            return root_a.cmp(&root_b);
        }
        path_a.cmp(&path_b)
    }

    /// Position of boundary point `a` relative to `b`.
    pub fn compare_points(&self, a: BoundaryPoint, b: BoundaryPoint) -> Ordering {
        if a.node == b.node {
            return a.offset.cmp(&b.offset);
        }
        let (root_a, path_a) = self.tree_path(a.node);
        let (root_b, path_b) = self.tree_path(b.node);
        if root_a != root_b {
            return root_a.cmp(&root_b);
        }
        if path_b.starts_with(&path_a) {
            let child_index = path_b[path_a.len()];
            return if child_index < a.offset {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        if path_a.starts_with(&path_b) {
            let child_index = path_a[path_b.len()];
            return if child_index < b.offset {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        path_a.cmp(&path_b)
    }

    /// `this.compareBoundaryPoints(how, source)`.
    pub fn compare_boundary_points(&self, how: How, this: &Range, source: &Range) -> Ordering {
        match how {
            How::StartToStart => self.compare_points(this.start, source.start),
            How::StartToEnd => self.compare_points(this.end, source.start),
            How::EndToEnd => self.compare_points(this.end, source.end),
            How::EndToStart => self.compare_points(this.start, source.end),
        }
    }

    pub fn point_before(&self, node: NodeId) -> Option<BoundaryPoint> {
        Some(BoundaryPoint::new(self.parent(node)?, self.index(node)?))
    }

    pub fn point_after(&self, node: NodeId) -> Option<BoundaryPoint> {
        Some(BoundaryPoint::new(self.parent(node)?, self.index(node)? + 1))
    }

    /// Range selecting `node` within its parent (`range.selectNode`).
    pub fn node_range(&self, node: NodeId) -> Option<Range> {
        Some(Range::new(self.point_before(node)?, self.point_after(node)?))
    }

    pub fn common_ancestor(&self, range: &Range) -> Option<NodeId> {
        self.ancestors(range.start.node)
            .into_iter()
            .find(|ancestor| self.contains(*ancestor, range.end.node))
    }

    /// True when `node` lies entirely inside `range`.
    pub fn range_contains_node(&self, range: &Range, node: NodeId) -> bool {
        let Some(node_range) = self.node_range(node) else {
            return false;
        };
        self.compare_points(range.start, node_range.start) != Ordering::Greater
            && self.compare_points(range.end, node_range.end) != Ordering::Less
    }

    /// True when `range` and `node` share at least one position besides
    /// their edges.
    pub fn range_intersects_node(&self, range: &Range, node: NodeId) -> bool {
        let Some(node_range) = self.node_range(node) else {
            return false;
        };
        self.compare_points(range.end, node_range.start) == Ordering::Greater
            && self.compare_points(range.start, node_range.end) == Ordering::Less
    }

    /// Orders two points into a range.
    pub fn range_between(&self, a: BoundaryPoint, b: BoundaryPoint) -> Range {
        if self.compare_points(a, b) == Ordering::Greater {
            Range::new(b, a)
        } else {
            Range::new(a, b)
        }
    }
}
