use std::ops::BitOr;

use super::{Document, NodeId};

/// Node kinds a [`TreeWalker`] presents to its filter. Hidden kinds are
/// skipped: not returned, but their children are still visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WhatToShow(u32);

impl WhatToShow {
    pub const ELEMENT: Self = Self(0x1);
    pub const TEXT: Self = Self(0x4);

    fn shows(self, document: &Document, node: NodeId) -> bool {
        let bit = if document.is_text(node) {
            Self::TEXT.0
        } else {
            Self::ELEMENT.0
        };
        self.0 & bit != 0
    }
}

impl BitOr for WhatToShow {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterResult {
    Accept,
    /// Not returned, children are still visited.
    Skip,
    /// Neither the node nor its subtree is returned.
    Reject,
}

/// DOM-style tree walker rooted at `root`.
///
/// The filter gets mutable access to the document and may detach the node
/// it is asked about. Sibling and parent links are read before the filter
/// runs, so traversal continues past nodes the filter removed.
#[derive(Clone, Debug)]
pub struct TreeWalker {
    root: NodeId,
    what_to_show: WhatToShow,
    current: NodeId,
}

impl TreeWalker {
    pub fn new(root: NodeId, what_to_show: WhatToShow) -> Self {
        Self {
            root,
            what_to_show,
            current: root,
        }
    }

    fn filter<F>(&self, document: &mut Document, node: NodeId, filter: &mut F) -> FilterResult
    where
        F: FnMut(&mut Document, NodeId) -> FilterResult,
    {
        if !self.what_to_show.shows(document, node) {
            return FilterResult::Skip;
        }
        filter(document, node)
    }

    /// Moves to the last visible child of the current node.
    pub fn last_child<F>(&mut self, document: &mut Document, mut filter: F) -> Option<NodeId>
    where
        F: FnMut(&mut Document, NodeId) -> FilterResult,
    {
        let mut node = document.last_child(self.current)?;
        loop {
            let previous = document.previous_sibling(node);
            let parent = document.parent(node);

            match self.filter(document, node, &mut filter) {
                FilterResult::Accept => {
                    self.current = node;
                    return Some(node);
                }
                FilterResult::Skip => {
                    if let Some(child) = document.last_child(node) {
                        node = child;
                        continue;
                    }
                }
                FilterResult::Reject => {}
            }

            let mut sibling = previous;
            let mut parent = parent;
            loop {
                if let Some(found) = sibling {
                    node = found;
                    break;
                }
                match parent {
                    Some(up) if up != self.root && up != self.current => {
                        sibling = document.previous_sibling(up);
                        parent = document.parent(up);
                    }
                    _ => return None,
                }
            }
        }
    }

    /// Moves to the next visible node in document order below the root.
    pub fn next_node<F>(&mut self, document: &mut Document, mut filter: F) -> Option<NodeId>
    where
        F: FnMut(&mut Document, NodeId) -> FilterResult,
    {
        let mut node = self.current;
        let mut result = FilterResult::Accept;
        loop {
            while result != FilterResult::Reject {
                let Some(child) = document.first_child(node) else {
                    break;
                };
                node = child;
                result = self.filter(document, node, &mut filter);
                if result == FilterResult::Accept {
                    self.current = node;
                    return Some(node);
                }
            }

            let mut following = None;
            let mut temp = Some(node);
            while let Some(candidate) = temp {
                if candidate == self.root {
                    return None;
                }
                if let Some(sibling) = document.next_sibling(candidate) {
                    following = Some(sibling);
                    break;
                }
                temp = document.parent(candidate);
            }
            node = following?;
            result = self.filter(document, node, &mut filter);
            if result == FilterResult::Accept {
                self.current = node;
                return Some(node);
            }
        }
    }
}
