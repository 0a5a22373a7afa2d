//! XML serializer with the formatting knobs the sorter exposes.
//!
//! Output is fully regenerated: whitespace-only text between elements is
//! treated as formatting and replaced by line separators and indentation,
//! while [`NodeKind::BlankLine`] markers become a single empty line.

use super::{Document, NodeId, NodeKind};
use quick_xml::escape::{escape, partial_escape};

/// Indentation unit for one nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
    Tab,
}

impl Indent {
    /// `-1` means a tab, any other value that many spaces.
    pub fn from_config(value: i64) -> Self {
        if value < 0 {
            Indent::Tab
        } else {
            Indent::Spaces(value as usize)
        }
    }

    fn unit(&self) -> String {
        match self {
            Indent::Spaces(n) => " ".repeat(*n),
            Indent::Tab => "\t".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SerializeOptions {
    pub encoding: String,
    pub line_separator: String,
    pub indent: Indent,
    pub indent_blank_lines: bool,
    pub expand_empty_elements: bool,
    pub space_before_close_empty_element: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            line_separator: "\n".to_string(),
            indent: Indent::Spaces(2),
            indent_blank_lines: false,
            expand_empty_elements: true,
            space_before_close_empty_element: false,
        }
    }
}

/// Serialize a document, declaration included, ending with a line separator.
pub fn serialize(doc: &Document, options: &SerializeOptions) -> String {
    let mut w = Writer {
        doc,
        options,
        unit: options.indent.unit(),
        out: String::new(),
    };
    let version = doc
        .declaration
        .as_ref()
        .map(|d| d.version.as_str())
        .unwrap_or("1.0");
    w.out.push_str("<?xml version=\"");
    w.out.push_str(version);
    w.out.push_str("\" encoding=\"");
    w.out.push_str(&options.encoding);
    w.out.push('"');
    if let Some(standalone) = doc.declaration.as_ref().and_then(|d| d.standalone.as_ref()) {
        w.out.push_str(" standalone=\"");
        w.out.push_str(standalone);
        w.out.push('"');
    }
    w.out.push_str("?>");
    for child in doc.children(doc.root()) {
        if matches!(doc.kind(child), NodeKind::Text(_) | NodeKind::BlankLine) {
            continue;
        }
        w.newline();
        w.node(child, 0);
    }
    w.newline();
    w.out
}

struct Writer<'a> {
    doc: &'a Document,
    options: &'a SerializeOptions,
    unit: String,
    out: String,
}

impl Writer<'_> {
    fn newline(&mut self) {
        self.out.push_str(&self.options.line_separator);
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str(&self.unit);
        }
    }

    fn node(&mut self, id: NodeId, level: usize) {
        match self.doc.kind(id) {
            NodeKind::Element { .. } => self.element(id, level),
            NodeKind::Text(s) => self.out.push_str(&partial_escape(s.trim())),
            NodeKind::CData(s) => {
                self.out.push_str("<![CDATA[");
                self.out.push_str(s);
                self.out.push_str("]]>");
            }
            NodeKind::Comment(s) => {
                self.out.push_str("<!--");
                self.out.push_str(s);
                self.out.push_str("-->");
            }
            NodeKind::ProcessingInstruction { target, data } => {
                self.out.push_str("<?");
                self.out.push_str(target);
                if let Some(d) = data {
                    self.out.push(' ');
                    self.out.push_str(d);
                }
                self.out.push_str("?>");
            }
            NodeKind::DocType(s) => {
                self.out.push_str("<!DOCTYPE ");
                self.out.push_str(s);
                self.out.push('>');
            }
            NodeKind::BlankLine | NodeKind::Document => {}
        }
    }

    fn element(&mut self, id: NodeId, level: usize) {
        let doc = self.doc;
        let name = doc.name(id).unwrap_or_default();
        self.out.push('<');
        self.out.push_str(name);
        for attr in doc.attributes(id) {
            self.out.push(' ');
            self.out.push_str(&attr.name);
            self.out.push_str("=\"");
            self.out.push_str(&escape(attr.value.as_str()));
            self.out.push('"');
        }

        let content: Vec<NodeId> = doc
            .children(id)
            .filter(|&c| !is_formatting(doc, c))
            .collect();
        if content.is_empty() {
            if self.options.expand_empty_elements {
                self.out.push_str("></");
                self.out.push_str(name);
                self.out.push('>');
            } else if self.options.space_before_close_empty_element {
                self.out.push_str(" />");
            } else {
                self.out.push_str("/>");
            }
            return;
        }

        self.out.push('>');
        let text_only = content
            .iter()
            .all(|&c| matches!(doc.kind(c), NodeKind::Text(_) | NodeKind::CData(_)));
        if text_only {
            for c in doc.children(id) {
                match doc.kind(c) {
                    NodeKind::Text(s) => self.out.push_str(&partial_escape(s.as_str())),
                    _ => self.node(c, level),
                }
            }
        } else {
            for &c in &content {
                self.newline();
                if matches!(doc.kind(c), NodeKind::BlankLine) {
                    if self.options.indent_blank_lines {
                        self.indent(level + 1);
                    }
                    continue;
                }
                self.indent(level + 1);
                self.node(c, level + 1);
            }
            self.newline();
            self.indent(level);
        }
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }
}

fn is_formatting(doc: &Document, id: NodeId) -> bool {
    matches!(doc.kind(id), NodeKind::Text(s) if s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_regenerates_indentation() {
        let doc = Document::parse_str("<a  b='x&quot;'><c>1 &amp; 2</c>   <d/><!--n--></a>").unwrap();
        let out = serialize(&doc, &SerializeOptions::default());
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a b=\"x&quot;\">\n  <c>1 &amp; 2</c>\n  <d></d>\n  <!--n-->\n</a>\n"
        );
    }

    #[test]
    fn test_serialize_empty_element_styles_and_tab_indent() {
        let doc = Document::parse_str("<a><b/></a>").unwrap();
        let mut opts = SerializeOptions {
            expand_empty_elements: false,
            indent: Indent::Tab,
            line_separator: "\r\n".into(),
            ..SerializeOptions::default()
        };
        assert_eq!(
            serialize(&doc, &opts),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n<a>\r\n\t<b/>\r\n</a>\r\n"
        );
        opts.space_before_close_empty_element = true;
        assert!(serialize(&doc, &opts).contains("\t<b />"));
    }

    #[test]
    fn test_serialize_blank_line_marker() {
        let mut doc = Document::parse_str("<a><b/><c/></a>").unwrap();
        let root = doc.root_element().unwrap();
        let c = doc.element_children(root).nth(1).unwrap();
        let blank = doc.create_node(NodeKind::BlankLine);
        doc.detach(c);
        doc.append_child(root, blank);
        doc.append_child(root, c);
        let mut opts = SerializeOptions::default();
        assert!(serialize(&doc, &opts).contains("<b></b>\n\n  <c></c>"));
        opts.indent_blank_lines = true;
        assert!(serialize(&doc, &opts).contains("<b></b>\n  \n  <c></c>"));
    }

    #[test]
    fn test_from_config_negative_means_tab() {
        assert_eq!(Indent::from_config(-1), Indent::Tab);
        assert_eq!(Indent::from_config(4), Indent::Spaces(4));
    }
}
