//! Arena-based XML document tree.
//!
//! All nodes of a document live in one `Vec` owned by [`Document`] and are
//! addressed by [`NodeId`]. Navigation links (parent, first/last child,
//! siblings) are indices into that arena, so nodes can be detached and
//! re-appended without invalidating any handle held elsewhere.
//!
//! - `parse`: builds a `Document` from text.
//! - `serial`: writes a `Document` back out with configurable formatting.

pub mod parse;
pub mod serial;

use std::num::NonZeroU32;

/// Typed index into a document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    fn from_index(index: usize) -> Self {
        // Slot 0 of the arena is a placeholder, so every real index is >= 1.
        let raw = u32::try_from(index).unwrap_or(u32::MAX);
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MIN))
    }

    fn as_index(self) -> usize {
        self.0.get() as usize
    }
}

/// A single attribute, name as written (prefix included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    /// `name` is the qualified name as written, e.g. `xsi:schemaLocation`.
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: Option<String>,
    },
    DocType(String),
    /// Placeholder for one or more blank lines between sibling nodes.
    BlankLine,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// Values of the `<?xml ...?>` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// An XML document: the node arena plus its declaration.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    pub declaration: Option<Declaration>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document holding only the document node.
    pub fn new() -> Self {
        let nodes = vec![
            NodeData::new(NodeKind::Document),
            NodeData::new(NodeKind::Document),
        ];
        Self {
            nodes,
            root: NodeId::from_index(1),
            declaration: None,
        }
    }

    /// Parses `input` into a document; see [`parse::parse_str`].
    pub fn parse_str(input: &str) -> Result<Self, crate::error::ParseError> {
        parse::parse_str(input)
    }

    /// The document node (not the root element).
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The first element child of the document node.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root).find(|&c| self.is_element(c))
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    /// Qualified element name, `None` for other node kinds.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Element name with any namespace prefix removed.
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.name(id)
            .map(|n| n.rsplit_once(':').map_or(n, |(_, local)| local))
    }

    /// Concatenated text of the node and all of its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(s) | NodeKind::CData(s) => out.push_str(s),
            NodeKind::Element { .. } | NodeKind::Document => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            _ => {}
        }
    }

    /// Attributes of an element; empty for other node kinds.
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.kind(id) {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Removes and returns all attributes of an element.
    pub fn take_attributes(&mut self, id: NodeId) -> Vec<Attribute> {
        match &mut self.data_mut(id).kind {
            NodeKind::Element { attributes, .. } => std::mem::take(attributes),
            _ => Vec::new(),
        }
    }

    /// Replaces the attribute set of an element. No-op for other kinds.
    pub fn set_attributes(&mut self, id: NodeId, attrs: Vec<Attribute>) {
        if let NodeKind::Element { attributes, .. } = &mut self.data_mut(id).kind {
            *attributes = attrs;
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).first_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).next_sibling
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(move |&c| self.is_element(c))
    }

    /// First element child with the given local name.
    pub fn child_element(&self, id: NodeId, local_name: &str) -> Option<NodeId> {
        self.element_children(id)
            .find(|&c| self.local_name(c) == Some(local_name))
    }

    /// Allocates a detached node.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it first if
    /// it is still linked somewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.data_mut(child).parent = Some(parent);
        match self.data(parent).last_child {
            Some(last) => {
                self.data_mut(last).next_sibling = Some(child);
                self.data_mut(child).prev_sibling = Some(last);
            }
            None => self.data_mut(parent).first_child = Some(child),
        }
        self.data_mut(parent).last_child = Some(child);
    }

    /// Unlinks a node from its parent. The node and its subtree stay in the
    /// arena and can be appended again.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.data(id).parent else {
            return;
        };
        let prev = self.data(id).prev_sibling;
        let next = self.data(id).next_sibling;
        match prev {
            Some(p) => self.data_mut(p).next_sibling = next,
            None => self.data_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.data_mut(n).prev_sibling = prev,
            None => self.data_mut(parent).last_child = prev,
        }
        let node = self.data_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Convenience constructor used by tests and the parser.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_node(NodeKind::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(doc: &Document, parent: NodeId) -> Vec<String> {
        doc.element_children(parent)
            .filter_map(|c| doc.name(c).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_append_and_detach_keep_links_consistent() {
        let mut doc = Document::new();
        let root = doc.create_element("root");
        doc.append_child(doc.root(), root);
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let c = doc.create_element("c");
        for n in [a, b, c] {
            doc.append_child(root, n);
        }
        doc.detach(b);
        assert_eq!(names(&doc, root), vec!["a", "c"]);
        assert_eq!(doc.parent(b), None);
        doc.append_child(root, b);
        assert_eq!(names(&doc, root), vec!["a", "c", "b"]);
        doc.detach(a);
        doc.detach(b);
        assert_eq!(names(&doc, root), vec!["c"]);
        assert_eq!(doc.first_child(root), Some(c));
    }

    #[test]
    fn test_append_moves_an_attached_node() {
        let mut doc = Document::new();
        let root = doc.create_element("root");
        let x = doc.create_element("x");
        let y = doc.create_element("y");
        doc.append_child(root, x);
        doc.append_child(root, y);
        doc.append_child(root, x);
        assert_eq!(names(&doc, root), vec!["y", "x"]);
    }

    #[test]
    fn test_local_name_strips_prefix_and_text_content_is_deep() {
        let doc = Document::parse_str("<p:a xmlns:p='u'><b>1</b> <c>2<![CDATA[3]]></c></p:a>")
            .unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.name(root), Some("p:a"));
        assert_eq!(doc.local_name(root), Some("a"));
        assert_eq!(doc.text_content(root), "1 23");
        let attrs = doc.attributes(root);
        assert_eq!((attrs[0].name.as_str(), attrs[0].value.as_str()), ("xmlns:p", "u"));
    }

    #[test]
    fn test_take_and_set_attributes() {
        let mut doc = Document::parse_str(r#"<a z="1" b="2"/>"#).unwrap();
        let root = doc.root_element().unwrap();
        let mut attrs = doc.take_attributes(root);
        assert!(doc.attributes(root).is_empty());
        attrs.reverse();
        doc.set_attributes(root, attrs);
        assert_eq!(doc.attributes(root)[0], Attribute::new("b", "2"));
    }
}
