use super::{BoundaryPoint, Document, NodeId, Range};

/// The document's selection: an anchor where it started and a focus where
/// it currently ends. Both are absent until something is selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    anchor: Option<BoundaryPoint>,
    focus: Option<BoundaryPoint>,
}

impl Selection {
    pub fn anchor(&self) -> Option<BoundaryPoint> {
        self.anchor
    }

    pub fn focus(&self) -> Option<BoundaryPoint> {
        self.focus
    }

    pub fn focus_node(&self) -> Option<NodeId> {
        self.focus.map(|point| point.node)
    }

    /// An empty selection counts as collapsed.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

impl Document {
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The selection as an ordered range (`getRangeAt(0)`).
    pub fn range(&self) -> Option<Range> {
        let anchor = self.selection.anchor?;
        let focus = self.selection.focus?;
        Some(self.range_between(anchor, focus))
    }

    pub fn collapse(&mut self, point: BoundaryPoint) {
        self.selection.anchor = Some(point);
        self.selection.focus = Some(point);
    }

    /// Moves the focus and keeps the anchor. Collapses when nothing is
    /// selected yet.
    pub fn extend(&mut self, focus: BoundaryPoint) {
        if self.selection.anchor.is_none() {
            self.selection.anchor = Some(focus);
        }
        self.selection.focus = Some(focus);
    }

    pub fn set_base_and_extent(&mut self, anchor: BoundaryPoint, focus: BoundaryPoint) {
        self.selection.anchor = Some(anchor);
        self.selection.focus = Some(focus);
    }

    /// Replaces the selection with `range`, keeping its direction when the
    /// current selection is backward.
    pub fn select(&mut self, range: Range) {
        let backward = match (self.selection.anchor, self.selection.focus) {
            (Some(anchor), Some(focus)) => {
                self.compare_points(anchor, focus) == std::cmp::Ordering::Greater
            }
            _ => false,
        };
        if backward {
            self.set_base_and_extent(range.end, range.start);
        } else {
            self.set_base_and_extent(range.start, range.end);
        }
    }

    pub fn remove_all_ranges(&mut self) {
        self.selection = Selection::default();
    }

    /// Rewrites both selection points; used by every tree mutation to keep
    /// the selection live.
    pub(super) fn update_selection_points<F>(&mut self, mut update: F)
    where
        F: FnMut(&Document, BoundaryPoint) -> BoundaryPoint,
    {
        let anchor = self.selection.anchor.map(|point| update(self, point));
        let focus = self.selection.focus.map(|point| update(self, point));
        self.selection.anchor = anchor;
        self.selection.focus = focus;
    }
}
