//! Sort wrappers: a lightweight tree mirroring the document, where every
//! kept node carries the policy that decides its position among siblings.
//!
//! - `factory`: classifies nodes and builds wrappers.
//! - `phase`: the lifecycle phase ordering.
//! - `text`: whitespace classification of text nodes.

pub mod factory;
pub mod phase;
pub mod text;

use crate::dom::{Document, NodeId};
use phase::Phase;
use std::fmt::Write as _;

/// Weight given to content-ordered elements the template does not name.
/// They sort after every element the template does name.
pub const UNSPECIFIED_WEIGHT: u32 = u32::MAX;

/// How a node takes part in sibling ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Stays at its original slot.
    Unsorted,
    /// Marker for preserved blank lines; also keeps its slot.
    BlankLine,
    WeightSorted {
        weight: u32,
    },
    /// Equal weights order by `key`.
    Alphabetical {
        weight: u32,
        key: String,
    },
    /// Equal weights order by the key fields, left to right.
    ContentKey {
        weight: u32,
        key: Vec<String>,
    },
    /// Equal weights order by phase, then by id.
    Phase {
        weight: u32,
        phase: Option<Phase>,
        id: String,
    },
}

impl Policy {
    pub fn weight(&self) -> Option<u32> {
        match self {
            Policy::Unsorted | Policy::BlankLine => None,
            Policy::WeightSorted { weight }
            | Policy::Alphabetical { weight, .. }
            | Policy::ContentKey { weight, .. }
            | Policy::Phase { weight, .. } => Some(*weight),
        }
    }

    pub fn is_sortable(&self) -> bool {
        self.weight().is_some()
    }

    fn label(&self) -> String {
        let weight = |w: &u32| {
            if *w == UNSPECIFIED_WEIGHT {
                "-".to_string()
            } else {
                w.to_string()
            }
        };
        match self {
            Policy::Unsorted => "Unsorted".into(),
            Policy::BlankLine => "BlankLine".into(),
            Policy::WeightSorted { weight: w } => format!("WeightSorted({})", weight(w)),
            Policy::Alphabetical { weight: w, key } => {
                format!("Alphabetical({}, {key:?})", weight(w))
            }
            Policy::ContentKey { weight: w, key } => {
                format!("ContentKey({}, {})", weight(w), key.join(":"))
            }
            Policy::Phase { weight: w, phase, id } => {
                format!("Phase({}, {phase:?}, {id:?})", weight(w))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Wrapper {
    pub node: NodeId,
    /// Index among the parent's original children; the stable tie-breaker.
    pub position: usize,
    pub policy: Policy,
    pub children: Vec<Wrapper>,
}

impl Wrapper {
    pub fn new(node: NodeId, position: usize, policy: Policy) -> Self {
        Self {
            node,
            position,
            policy,
            children: Vec::new(),
        }
    }

    /// Whether `self` belongs strictly before `other` among siblings.
    /// Irreflexive, so a node is never before itself.
    pub fn is_before(&self, other: &Wrapper) -> bool {
        let (Some(a), Some(b)) = (self.policy.weight(), other.policy.weight()) else {
            return self.position < other.position;
        };
        if a != b {
            return a < b;
        }
        match (&self.policy, &other.policy) {
            (Policy::Alphabetical { key: x, .. }, Policy::Alphabetical { key: y, .. }) => {
                x.trim() < y.trim()
            }
            (Policy::ContentKey { key: x, .. }, Policy::ContentKey { key: y, .. }) => x < y,
            (
                Policy::Phase {
                    phase: xp, id: xi, ..
                },
                Policy::Phase {
                    phase: yp, id: yi, ..
                },
            ) => (xp, xi) < (yp, yi),
            _ => self.position < other.position,
        }
    }

    /// Reorders the children of every wrapper in this subtree.
    ///
    /// Non-sortable children keep their slots; sortable children are sorted
    /// stably among themselves and fill the remaining slots in order.
    pub fn sort_recursive(&mut self) {
        self.sort_children();
        for child in &mut self.children {
            child.sort_recursive();
        }
    }

    fn sort_children(&mut self) {
        if self.children.len() < 2 {
            return;
        }
        let mut layout = Vec::with_capacity(self.children.len());
        let mut pinned = Vec::new();
        let mut movable = Vec::new();
        for child in std::mem::take(&mut self.children) {
            let sortable = child.policy.is_sortable();
            layout.push(sortable);
            if sortable {
                movable.push(child);
            } else {
                pinned.push(child);
            }
        }
        let mut sorted = insertion_sort(movable).into_iter();
        let mut pinned = pinned.into_iter();
        self.children = layout
            .into_iter()
            .filter_map(|sortable| if sortable { sorted.next() } else { pinned.next() })
            .collect();
    }

    /// Indented dump of the subtree, one wrapper per line.
    pub fn describe(&self, doc: &Document) -> String {
        let mut out = String::new();
        self.describe_into(doc, 0, &mut out);
        out
    }

    fn describe_into(&self, doc: &Document, depth: usize, out: &mut String) {
        let name = doc.name(self.node).unwrap_or("#node");
        let _ = writeln!(out, "{}{} {}", "  ".repeat(depth), name, self.policy.label());
        for child in &self.children {
            child.describe_into(doc, depth + 1, out);
        }
    }
}

/// Stable insertion sort over `is_before`. Tolerates inconsistent orderings
/// without panicking.
fn insertion_sort(items: Vec<Wrapper>) -> Vec<Wrapper> {
    let mut out: Vec<Wrapper> = Vec::with_capacity(items.len());
    for item in items {
        let mut at = out.len();
        while at > 0 && item.is_before(&out[at - 1]) {
            at -= 1;
        }
        out.insert(at, item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(i: usize) -> NodeId {
        let mut doc = Document::new();
        let mut id = doc.root();
        for _ in 0..i {
            id = doc.create_element("n");
        }
        id
    }

    fn w(position: usize, policy: Policy) -> Wrapper {
        Wrapper::new(node(position + 1), position, policy)
    }

    fn positions(parent: &Wrapper) -> Vec<usize> {
        parent.children.iter().map(|c| c.position).collect()
    }

    #[test]
    fn test_weight_decides_first_and_is_irreflexive() {
        let a = w(0, Policy::WeightSorted { weight: 1200 });
        let b = w(1, Policy::WeightSorted { weight: 1100 });
        assert!(b.is_before(&a));
        assert!(!a.is_before(&b));
        assert!(!a.is_before(&a));
        let c = w(2, Policy::Alphabetical { weight: 1100, key: "a".into() });
        assert!(!c.is_before(&c));
    }

    #[test]
    fn test_equal_weight_policies() {
        let x = w(0, Policy::Alphabetical { weight: 5, key: "web".into() });
        let y = w(1, Policy::Alphabetical { weight: 5, key: " api ".into() });
        assert!(y.is_before(&x));

        let d1 = w(0, Policy::ContentKey { weight: 5, key: vec!["org".into(), "b".into()] });
        let d2 = w(1, Policy::ContentKey { weight: 5, key: vec!["org".into(), "a".into()] });
        assert!(d2.is_before(&d1));

        let order = phase::PhaseOrder::default();
        let e1 = w(0, Policy::Phase {
            weight: 5,
            phase: Some(order.resolve("test")),
            id: "a".into(),
        });
        let e2 = w(1, Policy::Phase { weight: 5, phase: None, id: "z".into() });
        assert!(e2.is_before(&e1));
    }

    #[test]
    fn test_mixed_variants_at_equal_weight_keep_document_order() {
        let a = w(0, Policy::Alphabetical { weight: 5, key: "z".into() });
        let b = w(1, Policy::WeightSorted { weight: 5 });
        assert!(a.is_before(&b));
        assert!(!b.is_before(&a));
    }

    #[test]
    fn test_sort_children_keeps_unsorted_slots() {
        let mut parent = w(0, Policy::WeightSorted { weight: 1000 });
        parent.children = vec![
            w(0, Policy::WeightSorted { weight: 1300 }),
            w(1, Policy::BlankLine),
            w(2, Policy::Unsorted),
            w(3, Policy::WeightSorted { weight: 1100 }),
            w(4, Policy::WeightSorted { weight: 1200 }),
        ];
        parent.sort_recursive();
        assert_eq!(positions(&parent), vec![3, 1, 2, 4, 0]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut parent = w(0, Policy::Unsorted);
        parent.children = (0..4)
            .map(|i| w(i, Policy::Alphabetical { weight: 1, key: if i % 2 == 0 { "b" } else { "a" }.into() }))
            .collect();
        parent.sort_recursive();
        assert_eq!(positions(&parent), vec![1, 3, 0, 2]);
    }
}
