//! Builds the wrapper for a node by classifying it against the sort-order
//! index and the sort policy.

use super::phase::PhaseOrder;
use super::text::{TextClass, TextClassifier};
use super::{Policy, Wrapper, UNSPECIFIED_WEIGHT};
use crate::dom::{Document, NodeId, NodeKind};
use crate::models::policy::SortPolicy;
use crate::sort_order::SortOrderIndex;

#[derive(Debug, Clone)]
pub struct WrapperFactory {
    index: SortOrderIndex,
    policy: SortPolicy,
    phases: PhaseOrder,
    text: TextClassifier,
}

impl WrapperFactory {
    pub fn new(index: SortOrderIndex, policy: SortPolicy) -> Self {
        let phases = match &policy.phases {
            Some(names) => PhaseOrder::new(names.clone()),
            None => PhaseOrder::default(),
        };
        let text = TextClassifier::new(policy.keep_blank_lines);
        Self {
            index,
            policy,
            phases,
            text,
        }
    }

    pub fn index(&self) -> &SortOrderIndex {
        &self.index
    }

    /// Wrapper for `node`, or `None` for formatting whitespace that the
    /// serializer regenerates. Blank-line runs are replaced by a fresh
    /// [`NodeKind::BlankLine`] marker allocated in `doc`.
    pub fn create(&self, doc: &mut Document, node: NodeId, position: usize) -> Option<Wrapper> {
        let policy = match doc.kind(node) {
            NodeKind::Document => return None,
            NodeKind::Element { .. } => self.element_policy(doc, node),
            NodeKind::Text(s) => match self.text.classify(s) {
                TextClass::Formatting => return None,
                TextClass::BlankLines => {
                    let marker = doc.create_node(NodeKind::BlankLine);
                    return Some(Wrapper::new(marker, position, Policy::BlankLine));
                }
                TextClass::Content => Policy::Unsorted,
            },
            NodeKind::BlankLine => Policy::BlankLine,
            NodeKind::CData(_)
            | NodeKind::Comment(_)
            | NodeKind::ProcessingInstruction { .. }
            | NodeKind::DocType(_) => Policy::Unsorted,
        };
        Some(Wrapper::new(node, position, policy))
    }

    fn element_policy(&self, doc: &Document, node: NodeId) -> Policy {
        let Some(name) = doc.local_name(node) else {
            return Policy::Unsorted;
        };
        let parent = doc.parent(node).and_then(|p| doc.local_name(p));
        let weight = self.index.weight_for(doc, node);
        let content_weight = weight.unwrap_or(UNSPECIFIED_WEIGHT);

        if let Some(rule) = self.policy.phase.iter().find(|r| r.element.matches(name, parent)) {
            let phase = child_text(doc, node, &rule.phase_child)
                .filter(|p| !p.is_empty())
                .map(|p| self.phases.resolve(&p));
            if let Some(p) = &phase {
                log::trace!("{name}: phase {}", self.phases.name(p));
            }
            let id = child_text(doc, node, &rule.id_child).unwrap_or_default();
            return Policy::Phase {
                weight: content_weight,
                phase,
                id,
            };
        }
        if let Some(rule) = self
            .policy
            .content_keys
            .iter()
            .find(|r| r.element.matches(name, parent))
        {
            let key = rule
                .fields
                .iter()
                .map(|f| child_text(doc, node, f).unwrap_or_default())
                .collect();
            return Policy::ContentKey {
                weight: content_weight,
                key,
            };
        }
        if self.policy.alphabetical.iter().any(|m| m.matches(name, parent)) {
            return Policy::Alphabetical {
                weight: content_weight,
                key: doc.text_content(node).trim().to_string(),
            };
        }
        if parent.is_some_and(|p| self.policy.by_name.iter().any(|b| b == p)) {
            return Policy::Alphabetical {
                weight: content_weight,
                key: doc.name(node).unwrap_or_default().to_string(),
            };
        }
        match weight {
            Some(weight) => Policy::WeightSorted { weight },
            None => Policy::Unsorted,
        }
    }
}

/// Trimmed text of the first child element named `local_name`.
fn child_text(doc: &Document, node: NodeId, local_name: &str) -> Option<String> {
    doc.child_element(node, local_name)
        .map(|c| doc.text_content(c).trim().to_string())
}
