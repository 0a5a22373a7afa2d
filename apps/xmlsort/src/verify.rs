//! Structural comparison of an original document against its sorted form.
//!
//! Only elements take part: the walk pairs up element children position by
//! position and reports the first point where the two trees diverge.

use crate::dom::{Document, NodeId};
use serde::Serialize;

/// Longest text excerpt shown in messages.
const SNIPPET_LEN: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceKind {
    NameDiffers,
    TextDiffers,
    ChildCountDiffers,
}

impl DivergenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DivergenceKind::NameDiffers => "name_differs",
            DivergenceKind::TextDiffers => "text_differs",
            DivergenceKind::ChildCountDiffers => "child_count_differs",
        }
    }
}

/// First difference between two documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Divergence {
    NameDiffers {
        original: String,
        sorted: String,
    },
    /// Texts have all whitespace removed.
    TextDiffers {
        element: String,
        original: String,
        sorted: String,
    },
    ChildCountDiffers {
        element: String,
        original: usize,
        sorted: usize,
    },
}

impl Divergence {
    pub fn kind(&self) -> DivergenceKind {
        match self {
            Divergence::NameDiffers { .. } => DivergenceKind::NameDiffers,
            Divergence::TextDiffers { .. } => DivergenceKind::TextDiffers,
            Divergence::ChildCountDiffers { .. } => DivergenceKind::ChildCountDiffers,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Divergence::NameDiffers { original, sorted } => {
                format!("The xml element <{sorted}> should be placed before <{original}>")
            }
            Divergence::TextDiffers {
                element,
                original,
                sorted,
            } => format!(
                "The xml element <{element}> should contain '{}' instead of '{}'",
                snippet(sorted),
                snippet(original)
            ),
            Divergence::ChildCountDiffers {
                element,
                original,
                sorted,
            } => format!(
                "The xml element <{element}> has {original} child elements, sorted it has {sorted}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderedResult {
    Ordered,
    NotOrdered(Divergence),
}

impl OrderedResult {
    pub fn is_ordered(&self) -> bool {
        matches!(self, OrderedResult::Ordered)
    }

    pub fn divergence(&self) -> Option<&Divergence> {
        match self {
            OrderedResult::Ordered => None,
            OrderedResult::NotOrdered(d) => Some(d),
        }
    }

    pub fn message(&self) -> String {
        match self {
            OrderedResult::Ordered => "The xml elements are sorted".to_string(),
            OrderedResult::NotOrdered(d) => d.message(),
        }
    }
}

/// Compares the root elements of both documents.
pub fn is_ordered(original: &Document, sorted: &Document) -> OrderedResult {
    StructuralComparator::new(original, sorted).compare_roots()
}

pub struct StructuralComparator<'a> {
    original: &'a Document,
    sorted: &'a Document,
}

impl<'a> StructuralComparator<'a> {
    pub fn new(original: &'a Document, sorted: &'a Document) -> Self {
        Self { original, sorted }
    }

    pub fn compare_roots(&self) -> OrderedResult {
        match (self.original.root_element(), self.sorted.root_element()) {
            (None, None) => OrderedResult::Ordered,
            (Some(a), Some(b)) => self.compare(a, b),
            (a, b) => OrderedResult::NotOrdered(Divergence::NameDiffers {
                original: a.and_then(|n| self.original.name(n)).unwrap_or_default().to_string(),
                sorted: b.and_then(|n| self.sorted.name(n)).unwrap_or_default().to_string(),
            }),
        }
    }

    /// Name first, then corresponding element children, then their counts,
    /// and the stripped text last.
    pub fn compare(&self, a: NodeId, b: NodeId) -> OrderedResult {
        let name_a = self.original.name(a).unwrap_or_default();
        let name_b = self.sorted.name(b).unwrap_or_default();
        if name_a != name_b {
            return OrderedResult::NotOrdered(Divergence::NameDiffers {
                original: name_a.to_string(),
                sorted: name_b.to_string(),
            });
        }

        let kids_a: Vec<NodeId> = self.original.element_children(a).collect();
        let kids_b: Vec<NodeId> = self.sorted.element_children(b).collect();
        for (&x, &y) in kids_a.iter().zip(&kids_b) {
            let result = self.compare(x, y);
            if !result.is_ordered() {
                return result;
            }
        }
        if kids_a.len() != kids_b.len() {
            return OrderedResult::NotOrdered(Divergence::ChildCountDiffers {
                element: name_a.to_string(),
                original: kids_a.len(),
                sorted: kids_b.len(),
            });
        }

        let text_a = stripped_text(self.original, a);
        let text_b = stripped_text(self.sorted, b);
        if text_a != text_b {
            return OrderedResult::NotOrdered(Divergence::TextDiffers {
                element: name_a.to_string(),
                original: text_a,
                sorted: text_b,
            });
        }
        OrderedResult::Ordered
    }
}

fn stripped_text(doc: &Document, node: NodeId) -> String {
    doc.text_content(node)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_LEN {
        return text.to_string();
    }
    let mut s: String = text.chars().take(SNIPPET_LEN).collect();
    s.push_str("...");
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(a: &str, b: &str) -> OrderedResult {
        is_ordered(&Document::parse_str(a).unwrap(), &Document::parse_str(b).unwrap())
    }

    #[test]
    fn test_swapped_children_report_first_name_mismatch() {
        let r = check("<a><b>1</b><c>2</c></a>", "<a><c>2</c><b>1</b></a>");
        assert_eq!(
            r,
            OrderedResult::NotOrdered(Divergence::NameDiffers {
                original: "b".into(),
                sorted: "c".into()
            })
        );
        assert_eq!(r.message(), "The xml element <c> should be placed before <b>");
    }

    #[test]
    fn test_name_mismatch_at_same_position() {
        let r = check("<a><x/></a>", "<a><y/></a>");
        assert_eq!(r.divergence().map(Divergence::kind), Some(DivergenceKind::NameDiffers));
    }

    #[test]
    fn test_whitespace_and_comments_are_ignored() {
        let r = check(
            "<a>\n  <b> 1 2 </b><!-- c -->\n\n<c/></a>",
            "<a><b>12</b><c/></a>",
        );
        assert!(r.is_ordered());
    }

    #[test]
    fn test_text_and_child_count_differences() {
        let r = check("<a><b>one</b></a>", "<a><b>two</b></a>");
        assert!(matches!(
            r.divergence(),
            Some(Divergence::TextDiffers { element, .. }) if element == "b"
        ));
        let r = check("<a><b/><c/></a>", "<a><b/></a>");
        assert_eq!(
            r.divergence(),
            Some(&Divergence::ChildCountDiffers {
                element: "a".into(),
                original: 2,
                sorted: 1
            })
        );
    }

    #[test]
    fn test_divergence_serializes_with_kind_tag() {
        let d = Divergence::NameDiffers {
            original: "b".into(),
            sorted: "c".into(),
        };
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["kind"], "name_differs");
        assert_eq!(d.kind().as_str(), "name_differs");
        assert_eq!(snippet(&"x".repeat(50)).len(), SNIPPET_LEN + 3);
    }
}
