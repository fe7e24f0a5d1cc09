//! In-memory document host.
//!
//! An arena of element and text nodes with a live selection, following the
//! browser DOM closely enough that editing logic written against it behaves
//! the way it would inside a `contenteditable` region. Nodes are never freed:
//! removing a node detaches it, and detached nodes can be inserted again.
//!
//! Text offsets count `char`s, element offsets count children.

mod editing;
mod range;
mod selection;
mod style;
mod walker;

pub use editing::CaretMotion;
pub use range::{BoundaryPoint, How, Range};
pub use selection::Selection;
pub use style::StyleDeclaration;
pub use walker::{FilterResult, TreeWalker, WhatToShow};

/// Handle of a node inside one [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Clone, Debug, Default)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    style: StyleDeclaration,
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Tags that start a new line and can be left empty by editing.
const BLOCK_TAGS: &[&str] = &[
    "body",
    "div",
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "ul",
    "ol",
    "li",
    "hr",
];

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    selection: Selection,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            body: NodeId(0),
            selection: Selection::default(),
        };
        document.body = document.create_element("body");
        document
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        }))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.push_node(NodeData::Text(data.to_string()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Creates a detached copy of `node` without its children.
    pub fn clone_shallow(&mut self, node: NodeId) -> Option<NodeId> {
        let data = self.node(node)?.data.clone();
        Some(self.push_node(data))
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.node(node).map(|n| &n.data), Some(NodeData::Text(_)))
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    /// Lowercase tag name of an element.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag.as_str())
    }

    pub fn has_tag(&self, node: NodeId, tag: &str) -> bool {
        self.tag_name(node) == Some(tag)
    }

    pub fn is_block(&self, node: NodeId) -> bool {
        self.tag_name(node)
            .is_some_and(|tag| BLOCK_TAGS.contains(&tag))
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.data {
            NodeData::Text(data) => Some(data.as_str()),
            NodeData::Element(_) => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children(node).get(index).copied()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).last().copied()
    }

    /// Position of `node` among its parent's children.
    pub fn index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|child| *child == node)
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let index = self.index(node)?;
        index
            .checked_sub(1)
            .and_then(|prev| self.child(parent, prev))
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let index = self.index(node)?;
        self.child(parent, index + 1)
    }

    /// Character count for text nodes, child count for elements.
    pub fn node_len(&self, node: NodeId) -> usize {
        match self.node(node).map(|n| &n.data) {
            Some(NodeData::Text(data)) => data.chars().count(),
            Some(NodeData::Element(_)) => self.children(node).len(),
            None => 0,
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.node(node).map(|n| &n.data) {
            Some(NodeData::Text(data)) => out.push_str(data),
            Some(NodeData::Element(_)) => {
                for child in self.children(node) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// True when `ancestor` is `node` or one of its ancestors.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    /// Inclusive ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = Some(node);
        while let Some(candidate) = current {
            out.push(candidate);
            current = self.parent(candidate);
        }
        out
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// Generic attribute lookup. `class` and `style` are served by
    /// [`Document::has_class`] and [`Document::style`] instead.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(element) = self.element_mut(node) else {
            return false;
        };
        match name {
            "class" => {
                element.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "style" => element.style = StyleDeclaration::parse(value),
            _ => {
                if let Some(entry) = element.attributes.iter_mut().find(|(key, _)| key == name) {
                    entry.1 = value.to_string();
                } else {
                    element.attributes.push((name.to_string(), value.to_string()));
                }
            }
        }
        true
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|element| element.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        let Some(element) = self.element_mut(node) else {
            return false;
        };
        if !element.classes.iter().any(|c| c == class) {
            element.classes.push(class.to_string());
        }
        true
    }

    /// Inline style property of an element (`node.style[property]`).
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)?.style.get(property)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> bool {
        let Some(element) = self.element_mut(node) else {
            return false;
        };
        element.style.set(property, value);
        true
    }

    pub fn css_text(&self, node: NodeId) -> String {
        self.element(node)
            .map(|element| element.style.css_text())
            .unwrap_or_default()
    }

    pub fn set_css_text(&mut self, node: NodeId, css: &str) -> bool {
        self.set_attribute(node, "style", css)
    }

    /// `contenteditable` resolved through ancestors.
    pub fn is_editable(&self, node: NodeId) -> bool {
        for ancestor in self.ancestors(node) {
            match self.attribute(ancestor, "contenteditable") {
                Some("false") => return false,
                Some(_) => return true,
                None => {}
            }
        }
        false
    }

    /// Nearest inclusive ancestor carrying `contenteditable="true"` whose own
    /// ancestors are not editable.
    pub fn editing_host(&self, node: NodeId) -> Option<NodeId> {
        if !self.is_editable(node) {
            return None;
        }
        let mut host = None;
        for ancestor in self.ancestors(node) {
            match self.attribute(ancestor, "contenteditable") {
                Some("false") => break,
                Some(_) => host = Some(ancestor),
                None => {}
            }
        }
        host
    }

    /// Connected element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.body];
        while let Some(node) = stack.pop() {
            if self.attribute(node, "id") == Some(id) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        None
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. A child that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> bool {
        if !self.is_element(parent) || self.node(child).is_none() || self.contains(child, parent) {
            return false;
        }
        if let Some(reference) = reference
            && self.parent(reference) != Some(parent)
        {
            return false;
        }
        if reference == Some(child) {
            return true;
        }
        self.remove(child);

        let index = match reference {
            Some(reference) => self.index(reference).unwrap_or(0),
            None => self.children(parent).len(),
        };
        self.update_selection_points(|_, point| {
            if point.node == parent && point.offset > index {
                BoundaryPoint::new(parent, point.offset + 1)
            } else {
                point
            }
        });
        if let Some(node) = self.node_mut(parent) {
            node.children.insert(index, child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        true
    }

    /// Detaches `node` from its parent. Returns false when it had none.
    pub fn remove(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.parent(node) else {
            return false;
        };
        let Some(index) = self.index(node) else {
            return false;
        };
        self.update_selection_points(|document, point| {
            if document.contains(node, point.node) {
                BoundaryPoint::new(parent, index)
            } else if point.node == parent && point.offset > index {
                BoundaryPoint::new(parent, point.offset - 1)
            } else {
                point
            }
        });
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.remove(index);
        }
        if let Some(child) = self.node_mut(node) {
            child.parent = None;
        }
        true
    }

    pub fn replace_child(&mut self, new_child: NodeId, old_child: NodeId) -> bool {
        let Some(parent) = self.parent(old_child) else {
            return false;
        };
        if new_child == old_child {
            return true;
        }
        if !self.insert_before(parent, new_child, Some(old_child)) {
            return false;
        }
        self.remove(old_child)
    }

    /// Moves every child of `from` to the end of `to`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.children(from).to_vec() {
            self.append_child(to, child);
        }
    }

    /// Splits a text node at `offset`, leaving the head in `node` and
    /// returning the new trailing sibling. Offsets past the end are clamped,
    /// so either half may be empty.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> Option<NodeId> {
        let data = self.text(node)?;
        let offset = offset.min(data.chars().count());
        let byte = char_to_byte_idx(data, offset);
        let tail = data[byte..].to_string();

        let new_node = self.create_text(&tail);
        if let Some(NodeData::Text(data)) = self.node_mut(node).map(|n| &mut n.data) {
            data.truncate(byte);
        }
        self.update_selection_points(|_, point| {
            if point.node == node && point.offset > offset {
                BoundaryPoint::new(new_node, point.offset - offset)
            } else {
                point
            }
        });

        if let Some(parent) = self.parent(node) {
            let index = self.index(node).unwrap_or(0);
            let following = self.next_sibling(node);
            self.insert_before(parent, new_node, following);
            self.update_selection_points(|_, point| {
                if point.node == parent && point.offset == index + 1 {
                    BoundaryPoint::new(parent, index + 2)
                } else {
                    point
                }
            });
        }
        Some(new_node)
    }

    /// Replaces `count` characters at `offset` with `data`, keeping the
    /// selection anchored the way DOM live ranges are.
    pub fn replace_data(&mut self, node: NodeId, offset: usize, count: usize, data: &str) -> bool {
        let Some(NodeData::Text(text)) = self.node_mut(node).map(|n| &mut n.data) else {
            return false;
        };
        let len = text.chars().count();
        let offset = offset.min(len);
        let count = count.min(len - offset);
        let start = char_to_byte_idx(text, offset);
        let end = char_to_byte_idx(text, offset + count);
        text.replace_range(start..end, data);

        let inserted = data.chars().count();
        self.update_selection_points(|_, point| {
            if point.node != node || point.offset <= offset {
                point
            } else if point.offset <= offset + count {
                BoundaryPoint::new(node, offset)
            } else {
                BoundaryPoint::new(node, point.offset + inserted - count)
            }
        });
        true
    }
}

fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}
