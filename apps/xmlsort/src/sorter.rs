//! One configured sorter: weight index, classification policy and output
//! formatting bundled together. Cheap to share across threads.

use crate::dom::serial::{serialize, SerializeOptions};
use crate::dom::Document;
use crate::error::ParseError;
use crate::hierarchy::HierarchyCoordinator;
use crate::models::policy::SortPolicy;
use crate::sort_order::SortOrderIndex;
use crate::verify::{is_ordered, OrderedResult};
use crate::wrapper::factory::WrapperFactory;

#[derive(Debug, Clone)]
pub struct XmlSorter {
    factory: WrapperFactory,
    serialize: SerializeOptions,
}

/// Result of sorting a source text.
#[derive(Debug, Clone)]
pub struct SortedXml {
    pub document: Document,
    pub xml: String,
    /// Comparison of the input against `document`.
    pub ordered: OrderedResult,
}

impl XmlSorter {
    pub fn new(index: SortOrderIndex, policy: SortPolicy, serialize: SerializeOptions) -> Self {
        Self {
            factory: WrapperFactory::new(index, policy),
            serialize,
        }
    }

    pub fn sort_document(&self, doc: &Document) -> Document {
        HierarchyCoordinator::new(&self.factory).sort(doc)
    }

    pub fn serialize(&self, doc: &Document) -> String {
        serialize(doc, &self.serialize)
    }

    pub fn sort_str(&self, input: &str) -> Result<SortedXml, ParseError> {
        let original = Document::parse_str(input)?;
        let document = self.sort_document(&original);
        let ordered = is_ordered(&original, &document);
        let xml = self.serialize(&document);
        Ok(SortedXml {
            document,
            xml,
            ordered,
        })
    }
}
