//! The detach → sort → reattach pipeline over a wrapper tree.
//!
//! Each stage consumes the previous one, so the stages can only run in the
//! order Wrap → Detach → SortAttributes → SortElements → Reattach, and none
//! of them can fail once wrapping is done.

use crate::dom::{Document, NodeId};
use crate::wrapper::factory::WrapperFactory;
use crate::wrapper::{Policy, Wrapper};

/// Runs whole sort passes with one factory.
pub struct HierarchyCoordinator<'f> {
    factory: &'f WrapperFactory,
}

impl<'f> HierarchyCoordinator<'f> {
    pub fn new(factory: &'f WrapperFactory) -> Self {
        Self { factory }
    }

    /// Sorted copy of `original`. The input is left untouched.
    pub fn sort(&self, original: &Document) -> Document {
        let mut doc = original.clone();
        let Some(root) = doc.root_element() else {
            return doc;
        };
        HierarchyRoot::wrap(&mut doc, root, self.factory)
            .detach(&mut doc)
            .sort_attributes(&mut doc)
            .sort_elements()
            .reattach(&mut doc);
        doc
    }
}

/// Wrapper tree for the root element, straight after wrapping.
pub struct HierarchyRoot {
    root: Wrapper,
}

pub struct Detached {
    root: Wrapper,
}

pub struct AttributesSorted {
    root: Wrapper,
}

pub struct ElementsSorted {
    root: Wrapper,
}

impl HierarchyRoot {
    pub fn wrap(doc: &mut Document, root: NodeId, factory: &WrapperFactory) -> Self {
        let weight = factory.index().weight_for(doc, root).unwrap_or_default();
        let mut wrapper = Wrapper::new(root, 0, Policy::WeightSorted { weight });
        wrap_children(doc, &mut wrapper, factory);
        log::debug!("wrapped {} nodes", count(&wrapper));
        log::trace!("wrapper tree:\n{}", wrapper.describe(doc));
        Self { root: wrapper }
    }

    pub fn root(&self) -> &Wrapper {
        &self.root
    }

    /// Unlinks every child of every wrapped element, formatting text
    /// included. The arena keeps the nodes so they can be reattached.
    pub fn detach(self, doc: &mut Document) -> Detached {
        detach_children(doc, &self.root);
        Detached { root: self.root }
    }
}

impl Detached {
    pub fn sort_attributes(self, doc: &mut Document) -> AttributesSorted {
        sort_attributes(doc, &self.root);
        AttributesSorted { root: self.root }
    }
}

impl AttributesSorted {
    pub fn sort_elements(mut self) -> ElementsSorted {
        self.root.sort_recursive();
        ElementsSorted { root: self.root }
    }
}

impl ElementsSorted {
    pub fn root(&self) -> &Wrapper {
        &self.root
    }

    pub fn reattach(self, doc: &mut Document) {
        reattach(doc, &self.root);
        log::debug!("reattached {} nodes", count(&self.root));
    }
}

fn wrap_children(doc: &mut Document, parent: &mut Wrapper, factory: &WrapperFactory) {
    if !doc.is_element(parent.node) {
        return;
    }
    let kids: Vec<NodeId> = doc.children(parent.node).collect();
    for (position, kid) in kids.into_iter().enumerate() {
        if let Some(mut child) = factory.create(doc, kid, position) {
            wrap_children(doc, &mut child, factory);
            parent.children.push(child);
        }
    }
}

fn detach_children(doc: &mut Document, wrapper: &Wrapper) {
    if !doc.is_element(wrapper.node) {
        return;
    }
    let kids: Vec<NodeId> = doc.children(wrapper.node).collect();
    for kid in kids {
        doc.detach(kid);
    }
    for child in &wrapper.children {
        detach_children(doc, child);
    }
}

fn sort_attributes(doc: &mut Document, wrapper: &Wrapper) {
    if doc.is_element(wrapper.node) {
        let mut attrs = doc.take_attributes(wrapper.node);
        attrs.sort_by(|a, b| a.name.cmp(&b.name));
        doc.set_attributes(wrapper.node, attrs);
    }
    for child in &wrapper.children {
        sort_attributes(doc, child);
    }
}

fn reattach(doc: &mut Document, wrapper: &Wrapper) {
    for child in &wrapper.children {
        doc.append_child(wrapper.node, child.node);
        reattach(doc, child);
    }
}

fn count(wrapper: &Wrapper) -> usize {
    1 + wrapper.children.iter().map(count).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeKind;
    use crate::models::policy::SortPolicy;
    use crate::sort_order::SortOrderIndex;

    fn factory(template: &str) -> WrapperFactory {
        let index = SortOrderIndex::build(&Document::parse_str(template).unwrap());
        WrapperFactory::new(index, SortPolicy::default())
    }

    fn child_names(doc: &Document, node: NodeId) -> Vec<String> {
        doc.children(node)
            .map(|c| match doc.kind(c) {
                NodeKind::Element { name, .. } => name.clone(),
                NodeKind::Comment(_) => "#comment".into(),
                NodeKind::BlankLine => "#blank".into(),
                NodeKind::Text(t) => format!("#text:{}", t.trim()),
                _ => "#other".into(),
            })
            .collect()
    }

    #[test]
    fn test_pipeline_reorders_children_and_attributes() {
        let f = factory("<r><a/><b/><c/></r>");
        let doc = Document::parse_str(r#"<r z="1" a="2"><c/><!--x--><b/><a/></r>"#).unwrap();
        let sorted = HierarchyCoordinator::new(&f).sort(&doc);
        let root = sorted.root_element().unwrap();
        assert_eq!(child_names(&sorted, root), vec!["a", "#comment", "b", "c"]);
        let attrs: Vec<&str> = sorted.attributes(root).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["a", "z"]);
        // input untouched
        let orig = doc.root_element().unwrap();
        assert_eq!(child_names(&doc, orig), vec!["c", "#comment", "b", "a"]);
    }

    #[test]
    fn test_formatting_text_is_dropped_and_blank_lines_become_markers() {
        let f = factory("<r><a/><b/></r>");
        let doc = Document::parse_str("<r>\n  <b/>\n\n  <a/>\n</r>").unwrap();
        let sorted = HierarchyCoordinator::new(&f).sort(&doc);
        let root = sorted.root_element().unwrap();
        assert_eq!(child_names(&sorted, root), vec!["a", "#blank", "b"]);
    }

    #[test]
    fn test_stages_can_be_driven_one_by_one() {
        let f = factory("<r><a/><b/></r>");
        let mut doc = Document::parse_str("<r><b><y/><x/></b><a/></r>").unwrap();
        let root = doc.root_element().unwrap();
        let wrapped = HierarchyRoot::wrap(&mut doc, root, &f);
        assert_eq!(wrapped.root().children.len(), 2);
        let detached = wrapped.detach(&mut doc);
        assert_eq!(doc.children(root).count(), 0);
        let sorted = detached.sort_attributes(&mut doc).sort_elements();
        assert_eq!(sorted.root().children[0].position, 1);
        sorted.reattach(&mut doc);
        assert_eq!(child_names(&doc, root), vec!["a", "b"]);
        let b = doc.child_element(root, "b").unwrap();
        // unknown elements keep their order
        assert_eq!(child_names(&doc, b), vec!["y", "x"]);
    }

    #[test]
    fn test_mixed_text_stays_in_place() {
        let f = factory("<r><a/><b/></r>");
        let doc = Document::parse_str("<r><b/>note<a/></r>").unwrap();
        let sorted = HierarchyCoordinator::new(&f).sort(&doc);
        let root = sorted.root_element().unwrap();
        assert_eq!(child_names(&sorted, root), vec!["a", "#text:note", "b"]);
    }
}
