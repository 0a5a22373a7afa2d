//! Sort-order index built from a template document.
//!
//! The template's structure defines the canonical order: every element gets
//! a weight derived from its position among its siblings, nested elements
//! numbering from their parent's weight. Weights are looked up by full
//! element path first and by `(local name, parent local name)` second.

use crate::dom::{Document, NodeId};
use crate::error::{ConfigError, ParseError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Names of the templates compiled into the binary.
pub const BUILTIN_TEMPLATES: &[&str] = &["default_1_0_0", "recommended_2008_06"];

/// Returns the XML text of a built-in template.
pub fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "default_1_0_0" | "default" => Some(include_str!("../templates/default_1_0_0.xml")),
        "recommended_2008_06" | "recommended" => {
            Some(include_str!("../templates/recommended_2008_06.xml"))
        }
        _ => None,
    }
}

/// Resolve a template reference: a built-in name or a path relative to `root`.
pub fn load_template(reference: &str, root: &Path) -> Result<Document, ConfigError> {
    let text = match builtin_template(reference) {
        Some(t) => t.to_string(),
        None => {
            let path = root.join(reference);
            fs::read_to_string(&path).map_err(|source| ConfigError::TemplateIo { path, source })?
        }
    };
    Document::parse_str(&text).map_err(|source: ParseError| ConfigError::TemplateParse {
        name: reference.to_string(),
        source,
    })
}

/// Weight constants, passed explicitly rather than held as globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrderConfig {
    pub base: u32,
    pub increment: u32,
}

impl Default for SortOrderConfig {
    fn default() -> Self {
        Self {
            base: 1000,
            increment: 100,
        }
    }
}

/// Immutable weight table.
#[derive(Debug, Clone, Default)]
pub struct SortOrderIndex {
    by_path: HashMap<String, u32>,
    by_pair: HashMap<(String, Option<String>), u32>,
}

impl SortOrderIndex {
    pub fn build(template: &Document) -> Self {
        Self::build_with(template, SortOrderConfig::default())
    }

    pub fn build_with(template: &Document, config: SortOrderConfig) -> Self {
        let mut index = SortOrderIndex::default();
        if let Some(root) = template.root_element() {
            index.add(template, root, None, "", config.base, config);
        }
        log::debug!("sort order index holds {} element paths", index.len());
        index
    }

    fn add(
        &mut self,
        doc: &Document,
        element: NodeId,
        parent: Option<&str>,
        parent_path: &str,
        weight: u32,
        config: SortOrderConfig,
    ) {
        let name = doc.local_name(element).unwrap_or_default().to_string();
        let path = format!("{parent_path}/{name}");
        self.by_path.entry(path.clone()).or_insert(weight);
        self.by_pair
            .entry((name.clone(), parent.map(str::to_string)))
            .or_insert(weight);
        let mut child_weight = weight;
        for child in doc.element_children(element) {
            child_weight = child_weight.saturating_add(config.increment);
            self.add(doc, child, Some(&name), &path, child_weight, config);
        }
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Weight for an element name under a parent name; `None` when the
    /// template does not mention the pair.
    pub fn lookup(&self, local_name: &str, parent_local_name: Option<&str>) -> Option<u32> {
        self.by_pair
            .get(&(local_name.to_string(), parent_local_name.map(str::to_string)))
            .copied()
    }

    /// Weight for a slash-separated path such as `/project/build/plugins`.
    pub fn lookup_path(&self, path: &str) -> Option<u32> {
        self.by_path.get(path).copied()
    }

    /// Weight of a node of `doc`, path first, then name pair.
    pub fn weight_for(&self, doc: &Document, node: NodeId) -> Option<u32> {
        let name = doc.local_name(node)?;
        let parent = doc.parent(node).and_then(|p| doc.local_name(p));
        self.lookup_path(&element_path(doc, node))
            .or_else(|| self.lookup(name, parent))
    }
}

/// Slash-separated chain of local names from the root element down to `node`.
pub fn element_path(doc: &Document, node: NodeId) -> String {
    let mut names = Vec::new();
    let mut current = Some(node);
    while let Some(id) = current {
        match doc.local_name(id) {
            Some(n) => names.push(n),
            None => break,
        }
        current = doc.parent(id);
    }
    names.reverse();
    let mut path = String::new();
    for n in names {
        path.push('/');
        path.push_str(n);
    }
    path
}
