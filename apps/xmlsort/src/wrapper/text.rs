//! Classification of text nodes found between elements.

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextClass {
    /// Indentation or a single line break; regenerated by the serializer.
    Formatting,
    /// Whitespace spanning at least one empty line.
    BlankLines,
    /// Anything with non-whitespace characters.
    Content,
}

#[derive(Debug, Clone)]
pub struct TextClassifier {
    single_newline: Regex,
    blank_lines: Regex,
    keep_blank_lines: bool,
}

impl TextClassifier {
    pub fn new(keep_blank_lines: bool) -> Self {
        Self {
            single_newline: Regex::new(r"^[\t ]*\r?\n?[\t ]*$")
                .expect("single newline regex must compile"),
            blank_lines: Regex::new(r"^\s*?[\r\n]\s*$").expect("blank line regex must compile"),
            keep_blank_lines,
        }
    }

    pub fn classify(&self, text: &str) -> TextClass {
        if self.single_newline.is_match(text) {
            TextClass::Formatting
        } else if self.keep_blank_lines && self.blank_lines.is_match(text) {
            TextClass::BlankLines
        } else if text.trim().is_empty() {
            TextClass::Formatting
        } else {
            TextClass::Content
        }
    }
}
