//! Default actions of the host: what a browser does natively inside a
//! `contenteditable` region when nobody suppresses the key.

use std::cmp::Ordering;

use super::{BoundaryPoint, Document, NodeId, Range};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretMotion {
    Left,
    Right,
    LineStart,
    LineEnd,
}

impl Document {
    /// Nearest inclusive ancestor that is a block or the editing host.
    pub fn block_of(&self, node: NodeId) -> Option<NodeId> {
        let host = self.editing_host(node);
        self.ancestors(node)
            .into_iter()
            .find(|ancestor| self.is_block(*ancestor) || Some(*ancestor) == host)
    }

    /// Positions the caret can occupy inside `host`, in document order.
    ///
    /// Every offset of every editable text node is a stop, except that the
    /// start of a text node is merged into the end of the text before it
    /// when both sit in the same block. Blocks without text get one stop.
    pub fn caret_stops(&self, host: NodeId) -> Vec<BoundaryPoint> {
        let mut stops = Vec::new();
        self.collect_stops(host, &mut stops);
        if stops.is_empty() {
            stops.push(BoundaryPoint::new(host, 0));
        }
        stops
    }

    fn collect_stops(&self, node: NodeId, stops: &mut Vec<BoundaryPoint>) {
        for &child in self.children(node) {
            if self.attribute(child, "contenteditable") == Some("false") {
                continue;
            }
            if let Some(text) = self.text(child) {
                let len = text.chars().count();
                let merged = stops.last().is_some_and(|previous| {
                    self.is_text(previous.node)
                        && previous.offset == self.node_len(previous.node)
                        && self.block_of(previous.node) == self.block_of(child)
                });
                let first = usize::from(merged);
                stops.extend((first..=len).map(|offset| BoundaryPoint::new(child, offset)));
                continue;
            }
            let before = stops.len();
            self.collect_stops(child, stops);
            if stops.len() == before && self.is_block(child) && !self.has_tag(child, "hr") {
                stops.push(BoundaryPoint::new(child, 0));
            }
        }
    }

    fn stop_index(&self, stops: &[BoundaryPoint], point: BoundaryPoint) -> usize {
        if let Some(index) = stops.iter().position(|stop| *stop == point) {
            return index;
        }
        let before = stops
            .iter()
            .rposition(|stop| self.compare_points(*stop, point) != Ordering::Greater);
        let after = stops
            .iter()
            .position(|stop| self.compare_points(*stop, point) != Ordering::Less);

        let prefer_before = before.is_some_and(|index| {
            self.is_text(point.node) || self.contains(point.node, stops[index].node)
        });
        match (before, after) {
            (Some(index), _) if prefer_before => index,
            (_, Some(index)) => index,
            (Some(index), None) => index,
            (None, None) => 0,
        }
    }

    /// The caret stop a point is displayed at.
    pub fn caret_stop(&self, point: BoundaryPoint) -> Option<BoundaryPoint> {
        let host = self.editing_host(point.node)?;
        let stops = self.caret_stops(host);
        stops.get(self.stop_index(&stops, point)).copied()
    }

    /// Snaps a collapsed selection onto its caret stop.
    pub fn normalize_caret(&mut self) {
        let selection = self.selection();
        if !selection.is_collapsed() {
            return;
        }
        if let Some(stop) = selection.focus().and_then(|focus| self.caret_stop(focus)) {
            self.collapse(stop);
        }
    }

    pub fn move_caret(&mut self, motion: CaretMotion, extend: bool) -> bool {
        let selection = self.selection();
        let Some(focus) = selection.focus() else {
            return false;
        };
        let Some(host) = self.editing_host(focus.node) else {
            return false;
        };

        if !extend && !selection.is_collapsed() {
            if let Some(range) = self.range() {
                let point = match motion {
                    CaretMotion::Left | CaretMotion::LineStart => range.start,
                    CaretMotion::Right | CaretMotion::LineEnd => range.end,
                };
                self.collapse(point);
                if matches!(motion, CaretMotion::Left | CaretMotion::Right) {
                    return true;
                }
            }
        }

        let stops = self.caret_stops(host);
        let focus = self.selection().focus().unwrap_or(focus);
        let index = self.stop_index(&stops, focus);
        let block = stops.get(index).and_then(|stop| self.block_of(stop.node));
        let same_block = |stop: &BoundaryPoint| self.block_of(stop.node) == block;

        let target = match motion {
            CaretMotion::Left => index.saturating_sub(1),
            CaretMotion::Right => (index + 1).min(stops.len() - 1),
            CaretMotion::LineStart => {
                let mut target = index;
                while target > 0 && same_block(&stops[target - 1]) {
                    target -= 1;
                }
                target
            }
            CaretMotion::LineEnd => {
                let mut target = index;
                while target + 1 < stops.len() && same_block(&stops[target + 1]) {
                    target += 1;
                }
                target
            }
        };
        let Some(point) = stops.get(target).copied() else {
            return false;
        };
        if extend {
            self.extend(point);
        } else {
            self.collapse(point);
        }
        true
    }

    /// Types `data` at the caret, replacing a non-collapsed selection.
    pub fn insert_text(&mut self, data: &str) -> bool {
        if data.is_empty() {
            return false;
        }
        if let Some(range) = self.range()
            && !range.is_collapsed()
        {
            self.delete_contents(range);
        }
        let Some(caret) = self.selection().focus() else {
            return false;
        };
        if !self.is_editable(caret.node) {
            return false;
        }
        let count = data.chars().count();

        if self.is_text(caret.node) {
            let offset = caret.offset.min(self.node_len(caret.node));
            self.replace_data(caret.node, offset, 0, data);
            self.collapse(BoundaryPoint::new(caret.node, offset + count));
            return true;
        }

        let before = caret
            .offset
            .checked_sub(1)
            .and_then(|index| self.child(caret.node, index))
            .filter(|node| self.is_text(*node));
        if let Some(previous) = before {
            let end = self.node_len(previous);
            self.replace_data(previous, end, 0, data);
            self.collapse(BoundaryPoint::new(previous, end + count));
            return true;
        }

        let after = self
            .child(caret.node, caret.offset)
            .filter(|node| self.is_text(*node));
        if let Some(next) = after {
            self.replace_data(next, 0, 0, data);
            self.collapse(BoundaryPoint::new(next, count));
            return true;
        }

        let text = self.create_text(data);
        let reference = self.child(caret.node, caret.offset);
        self.insert_before(caret.node, text, reference);
        self.collapse(BoundaryPoint::new(text, count));
        true
    }

    /// Enter: splits the current block at the caret into a new block.
    pub fn insert_paragraph(&mut self) -> bool {
        if let Some(range) = self.range()
            && !range.is_collapsed()
        {
            self.delete_contents(range);
        }
        let Some(caret) = self.selection().focus() else {
            return false;
        };
        let Some(host) = self.editing_host(caret.node) else {
            return false;
        };
        let Some(block) = self.block_of(caret.node) else {
            return false;
        };
        let split = self.split_up_to(caret, block);

        let new_block = if block == host {
            let new_block = self.create_element("div");
            let tail: Vec<NodeId> = self
                .children(host)
                .get(split.offset..)
                .unwrap_or(&[])
                .iter()
                .copied()
                .take_while(|child| !self.is_block(*child))
                .collect();
            let reference = self.child(host, split.offset);
            self.insert_before(host, new_block, reference);
            for child in tail {
                self.append_child(new_block, child);
            }
            new_block
        } else {
            let Some(parent) = self.parent(block) else {
                return false;
            };
            let Some(new_block) = self.clone_shallow(block) else {
                return false;
            };
            let tail = self
                .children(block)
                .get(split.offset..)
                .unwrap_or(&[])
                .to_vec();
            let following = self.next_sibling(block);
            self.insert_before(parent, new_block, following);
            for child in tail {
                self.append_child(new_block, child);
            }
            new_block
        };

        let point = self.first_position_in(new_block);
        self.collapse(point);
        true
    }

    fn first_position_in(&self, node: NodeId) -> BoundaryPoint {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if self.is_text(current) {
                return BoundaryPoint::new(current, 0);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        BoundaryPoint::new(node, 0)
    }

    /// Splits the ancestors of `point` up to `limit`, returning the matching
    /// position inside `limit`. Edges never produce empty fragments.
    fn split_up_to(&mut self, point: BoundaryPoint, limit: NodeId) -> BoundaryPoint {
        let mut point = point;
        if self.is_text(point.node) && point.node != limit {
            let node = point.node;
            let len = self.node_len(node);
            let moved = if point.offset == 0 {
                self.point_before(node)
            } else if point.offset >= len {
                self.point_after(node)
            } else {
                self.split_text(node, point.offset)
                    .and_then(|tail| self.point_before(tail))
            };
            match moved {
                Some(moved) => point = moved,
                None => return point,
            }
        }

        while point.node != limit {
            let node = point.node;
            let (Some(parent), Some(index)) = (self.parent(node), self.index(node)) else {
                break;
            };
            if point.offset == 0 {
                point = BoundaryPoint::new(parent, index);
                continue;
            }
            if point.offset >= self.node_len(node) {
                point = BoundaryPoint::new(parent, index + 1);
                continue;
            }
            let Some(clone) = self.clone_shallow(node) else {
                break;
            };
            let tail = self
                .children(node)
                .get(point.offset..)
                .unwrap_or(&[])
                .to_vec();
            let following = self.next_sibling(node);
            self.insert_before(parent, clone, following);
            for child in tail {
                self.append_child(clone, child);
            }
            point = BoundaryPoint::new(parent, index + 1);
        }
        point
    }

    /// Removes everything inside `range`, merging the blocks at its two ends.
    pub fn delete_contents(&mut self, range: Range) -> bool {
        if range.is_collapsed() {
            return false;
        }
        let host = self.editing_host(range.start.node);
        let start_block = self.block_of(range.start.node);
        let end_block = self.block_of(range.end.node);

        // Splits go through the live selection so each keeps the other valid.
        self.set_base_and_extent(range.start, range.end);
        if self.is_text(range.end.node)
            && let Some(tail) = self.split_text(range.end.node, range.end.offset)
            && let Some(point) = self.point_before(tail)
        {
            let anchor = self.selection().anchor().unwrap_or(range.start);
            self.set_base_and_extent(anchor, point);
        }
        if self.is_text(range.start.node)
            && let Some(tail) = self.split_text(range.start.node, range.start.offset)
            && let Some(point) = self.point_before(tail)
        {
            let focus = self.selection().focus().unwrap_or(range.end);
            self.set_base_and_extent(point, focus);
        }
        let Some(range) = self.range() else {
            return false;
        };

        let mut doomed = Vec::new();
        if let Some(ancestor) = self.common_ancestor(&range) {
            self.collect_contained(&range, ancestor, &mut doomed);
        }
        for node in doomed {
            self.remove(node);
        }

        if let (Some(start_block), Some(end_block)) = (start_block, end_block)
            && start_block != end_block
            && self.is_connected(end_block)
        {
            self.merge_blocks(start_block, end_block);
        }

        if let Some(host) = host {
            self.prune_empty_text(host);
            for block in [start_block, end_block].into_iter().flatten() {
                if block != host && self.children(block).is_empty() {
                    self.prune_empty(block);
                }
            }
        }
        let start = self.range().map(|range| range.start).unwrap_or(range.start);
        self.collapse(start);
        self.normalize_caret();
        true
    }

    fn collect_contained(&self, range: &Range, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(node) {
            if self.range_contains_node(range, child) {
                out.push(child);
            } else if self.range_intersects_node(range, child) {
                self.collect_contained(range, child, out);
            }
        }
    }

    /// Joins `second` onto the end of `first`. When one block holds the
    /// other, the inner one is unwrapped instead.
    fn merge_blocks(&mut self, first: NodeId, second: NodeId) {
        if self.contains(second, first) {
            return;
        }
        if self.contains(first, second) {
            if let Some(parent) = self.parent(second) {
                for child in self.children(second).to_vec() {
                    self.insert_before(parent, child, Some(second));
                }
            }
        } else {
            self.move_children(second, first);
        }
        let parent = self.parent(second);
        self.remove(second);
        if let Some(parent) = parent {
            self.prune_empty(parent);
        }
    }

    /// Native backspace.
    pub fn delete_backward(&mut self) -> bool {
        let selection = self.selection();
        let Some(focus) = selection.focus() else {
            return false;
        };
        if !self.is_editable(focus.node) {
            return false;
        }
        if !selection.is_collapsed() {
            return match self.range() {
                Some(range) => self.delete_contents(range),
                None => false,
            };
        }
        let Some(host) = self.editing_host(focus.node) else {
            return false;
        };

        let stops = self.caret_stops(host);
        let index = self.stop_index(&stops, focus);
        let Some(current) = stops.get(index).copied() else {
            return false;
        };
        if self.is_text(current.node) && current.offset > 0 {
            return self.delete_char_before(current);
        }
        let Some(previous) = index.checked_sub(1).and_then(|i| stops.get(i)).copied() else {
            return false;
        };

        let current_block = self.block_of(current.node);
        let previous_block = self.block_of(previous.node);
        if !self.is_text(previous.node) {
            // An empty block just before the caret simply goes away.
            self.remove(previous.node);
            self.collapse(current);
            return true;
        }
        if previous_block == current_block {
            return self.delete_char_before(previous);
        }
        let (Some(previous_block), Some(current_block)) = (previous_block, current_block) else {
            return false;
        };
        if current_block == host {
            self.pull_line_into(current.node, host, previous_block);
        } else {
            self.merge_blocks(previous_block, current_block);
        }
        self.prune_empty_text(host);
        self.collapse(previous);
        self.normalize_caret();
        true
    }

    /// Moves the run of inline nodes around `node`, directly inside `host`,
    /// to the end of `block`.
    fn pull_line_into(&mut self, node: NodeId, host: NodeId, block: NodeId) {
        let Some(top) = self
            .ancestors(node)
            .into_iter()
            .find(|ancestor| self.parent(*ancestor) == Some(host))
        else {
            return;
        };
        let mut run = vec![top];
        let mut next = self.next_sibling(top);
        while let Some(sibling) = next {
            if self.is_block(sibling) {
                break;
            }
            run.push(sibling);
            next = self.next_sibling(sibling);
        }
        for child in run {
            self.append_child(block, child);
        }
    }

    fn delete_char_before(&mut self, point: BoundaryPoint) -> bool {
        if point.offset == 0 || !self.replace_data(point.node, point.offset - 1, 1, "") {
            return false;
        }
        self.collapse(BoundaryPoint::new(point.node, point.offset - 1));
        if self.node_len(point.node) == 0 {
            self.prune_empty(point.node);
            self.normalize_caret();
        }
        true
    }

    /// Removes `node` if it is an empty text node or a childless block, then
    /// repeats for its parent. Stops at the editing host.
    pub fn prune_empty(&mut self, node: NodeId) {
        let host = self.editing_host(node);
        let mut current = Some(node);
        while let Some(node) = current {
            if Some(node) == host || self.parent(node).is_none() {
                break;
            }
            let empty = match self.text(node) {
                Some(text) => text.is_empty(),
                None => self.is_block(node) && self.children(node).is_empty(),
            };
            if !empty {
                break;
            }
            current = self.parent(node);
            self.remove(node);
        }
    }

    /// Removes every empty text node below `root`.
    pub fn prune_empty_text(&mut self, root: NodeId) {
        let mut stack = vec![root];
        let mut empty = Vec::new();
        while let Some(node) = stack.pop() {
            if self.text(node).is_some_and(str::is_empty) {
                empty.push(node);
            }
            stack.extend(self.children(node).iter().copied());
        }
        for node in empty {
            self.remove(node);
        }
    }
}
