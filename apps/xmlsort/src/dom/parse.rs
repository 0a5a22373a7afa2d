//! Builds a [`Document`] from XML text using quick-xml's pull reader.
//!
//! Entity and character references are expanded in text and attribute
//! values. Whitespace between top-level nodes is dropped; everything inside
//! the root element is kept verbatim so blank lines can be classified later.

use super::{Attribute, Declaration, Document, NodeId, NodeKind};
use crate::error::ParseError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

/// Parse a complete document.
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let mut reader = Reader::from_str(input);
    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.root()];
    let mut seen_root = false;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| ParseError::Malformed {
            position,
            message: e.to_string(),
        })?;
        let top = *stack.last().unwrap_or(&doc.root());
        let at_top_level = stack.len() == 1;
        match event {
            Event::Start(e) => {
                if at_top_level && seen_root {
                    return Err(ParseError::TrailingContent {
                        what: "element",
                        position,
                    });
                }
                let id = element(&mut doc, &e, position)?;
                doc.append_child(top, id);
                stack.push(id);
                seen_root = true;
            }
            Event::Empty(e) => {
                if at_top_level && seen_root {
                    return Err(ParseError::TrailingContent {
                        what: "element",
                        position,
                    });
                }
                let id = element(&mut doc, &e, position)?;
                doc.append_child(top, id);
                seen_root = true;
            }
            Event::End(_) => {
                if stack.len() <= 1 {
                    return Err(ParseError::Malformed {
                        position,
                        message: "closing tag without matching start tag".into(),
                    });
                }
                stack.pop();
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|err| ParseError::Malformed {
                    position,
                    message: err.to_string(),
                })?;
                if at_top_level {
                    if !text.trim().is_empty() {
                        return Err(ParseError::TrailingContent {
                            what: "text",
                            position,
                        });
                    }
                    continue;
                }
                let id = doc.create_node(NodeKind::Text(text.into_owned()));
                doc.append_child(top, id);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                let id = doc.create_node(NodeKind::CData(text));
                doc.append_child(top, id);
            }
            Event::Comment(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                let id = doc.create_node(NodeKind::Comment(text));
                doc.append_child(top, id);
            }
            Event::PI(e) => {
                let target = String::from_utf8_lossy(e.target()).into_owned();
                let data = String::from_utf8_lossy(e.content()).trim().to_string();
                let id = doc.create_node(NodeKind::ProcessingInstruction {
                    target,
                    data: if data.is_empty() { None } else { Some(data) },
                });
                doc.append_child(top, id);
            }
            Event::Decl(e) => {
                let version = e.version().map(lossy).unwrap_or_else(|_| "1.0".to_string());
                let encoding = e.encoding().and_then(|r| r.ok()).map(lossy);
                let standalone = e.standalone().and_then(|r| r.ok()).map(lossy);
                doc.declaration = Some(Declaration {
                    version,
                    encoding,
                    standalone,
                });
            }
            Event::DocType(e) => {
                let text = String::from_utf8_lossy(&e).trim().to_string();
                let id = doc.create_node(NodeKind::DocType(text));
                doc.append_child(top, id);
            }
            Event::Eof => break,
        }
    }

    if stack.len() > 1 {
        let open = stack
            .last()
            .and_then(|&id| doc.name(id))
            .unwrap_or_default()
            .to_string();
        return Err(ParseError::Unclosed(open));
    }
    if doc.root_element().is_none() {
        return Err(ParseError::MissingRoot);
    }
    Ok(doc)
}

fn lossy(bytes: Cow<'_, [u8]>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

fn element(doc: &mut Document, e: &BytesStart<'_>, position: u64) -> Result<NodeId, ParseError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError::Malformed {
            position,
            message: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ParseError::Malformed {
                position,
                message: err.to_string(),
            })?
            .into_owned();
        attributes.push(Attribute::new(key, value));
    }
    Ok(doc.create_node(NodeKind::Element { name, attributes }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_declaration_comments_and_whitespace_inside_root() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- top -->\n<a x=\"1&amp;2\">\n\n  <b>t&lt;</b>\n</a>\n";
        let doc = parse_str(xml).unwrap();
        let decl = doc.declaration.clone().unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));
        let top: Vec<_> = doc.children(doc.root()).collect();
        assert_eq!(top.len(), 2);
        assert_eq!(doc.kind(top[0]), &NodeKind::Comment(" top ".into()));
        let root = doc.root_element().unwrap();
        assert_eq!(doc.attributes(root)[0].value, "1&2");
        let kids: Vec<_> = doc.children(root).collect();
        assert_eq!(kids.len(), 3);
        assert_eq!(doc.kind(kids[0]), &NodeKind::Text("\n\n  ".into()));
        assert_eq!(doc.text_content(kids[1]), "t<");
    }

    #[test]
    fn test_parse_processing_instruction_and_doctype() {
        let doc = parse_str("<!DOCTYPE a><?pi some data?><a/>").unwrap();
        let top: Vec<_> = doc.children(doc.root()).collect();
        assert_eq!(doc.kind(top[0]), &NodeKind::DocType("a".into()));
        assert_eq!(
            doc.kind(top[1]),
            &NodeKind::ProcessingInstruction {
                target: "pi".into(),
                data: Some("some data".into())
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_str(""), Err(ParseError::MissingRoot)));
        assert!(matches!(parse_str("<a><b></a>"), Err(ParseError::Malformed { .. })));
        assert!(matches!(
            parse_str("<a>"),
            Err(ParseError::Unclosed(_)) | Err(ParseError::Malformed { .. })
        ));
        assert!(matches!(
            parse_str("<a/><b/>"),
            Err(ParseError::TrailingContent { what: "element", .. })
        ));
        assert!(matches!(
            parse_str("<a/>junk"),
            Err(ParseError::TrailingContent { what: "text", .. })
        ));
    }
}
