//! Classification policy: which elements are ordered by content instead of
//! by template weight.
//!
//! Element references are written `parent/name` or just `name` and match
//! local names, so namespace prefixes do not matter.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
/// Matches an element by local name and optionally its parent's local name.
pub struct ElementMatcher {
    pub parent: Option<String>,
    pub name: String,
}

impl ElementMatcher {
    pub fn matches(&self, name: &str, parent: Option<&str>) -> bool {
        self.name == name
            && match &self.parent {
                Some(p) => parent == Some(p.as_str()),
                None => true,
            }
    }
}

impl FromStr for ElementMatcher {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (parent, name) = match s.rsplit_once('/') {
            Some((p, n)) => (Some(p.trim().to_string()), n.trim().to_string()),
            None => (None, s.to_string()),
        };
        if name.is_empty() || parent.as_deref().is_some_and(str::is_empty) {
            return Err(format!("invalid element reference '{s}'"));
        }
        Ok(ElementMatcher { parent, name })
    }
}

impl TryFrom<String> for ElementMatcher {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ElementMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(p) => write!(f, "{}/{}", p, self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Orders matching elements by the text of the listed child elements.
pub struct ContentKeyRule {
    pub element: ElementMatcher,
    pub fields: Vec<String>,
}

/// `parent/name=field1,field2`
impl FromStr for ContentKeyRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (element, fields) = s
            .split_once('=')
            .ok_or_else(|| format!("expected element=field,... in '{s}'"))?;
        let fields: Vec<String> = fields
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            return Err(format!("no fields given in '{s}'"));
        }
        Ok(ContentKeyRule {
            element: element.parse()?,
            fields,
        })
    }
}

fn default_phase_child() -> String {
    "phase".to_string()
}

fn default_id_child() -> String {
    "id".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Orders matching elements by lifecycle phase, then identifier.
pub struct PhaseRule {
    pub element: ElementMatcher,
    #[serde(default = "default_phase_child")]
    pub phase_child: String,
    #[serde(default = "default_id_child")]
    pub id_child: String,
}

/// `parent/name` or `parent/name=phaseChild,idChild`
impl FromStr for PhaseRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (element, children) = match s.split_once('=') {
            Some((e, c)) => (e, Some(c)),
            None => (s, None),
        };
        let (phase_child, id_child) = match children {
            Some(c) => {
                let (p, i) = c
                    .split_once(',')
                    .ok_or_else(|| format!("expected phaseChild,idChild in '{s}'"))?;
                (p.trim().to_string(), i.trim().to_string())
            }
            None => (default_phase_child(), default_id_child()),
        };
        Ok(PhaseRule {
            element: element.parse()?,
            phase_child,
            id_child,
        })
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// The `[sort]` section of the config file.
pub struct SortPolicy {
    #[serde(default)]
    pub alphabetical: Vec<ElementMatcher>,
    /// Parents whose element children are ordered by element name.
    #[serde(default)]
    pub by_name: Vec<String>,
    #[serde(default)]
    pub content_keys: Vec<ContentKeyRule>,
    #[serde(default)]
    pub phase: Vec<PhaseRule>,
    #[serde(default = "default_true")]
    pub keep_blank_lines: bool,
    /// Canonical phase sequence; the Maven lifecycle when absent.
    #[serde(default)]
    pub phases: Option<Vec<String>>,
}

impl Default for SortPolicy {
    fn default() -> Self {
        Self {
            alphabetical: Vec::new(),
            by_name: Vec::new(),
            content_keys: Vec::new(),
            phase: Vec::new(),
            keep_blank_lines: true,
            phases: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_parse_and_match() {
        let m: ElementMatcher = "modules/module".parse().unwrap();
        assert!(m.matches("module", Some("modules")));
        assert!(!m.matches("module", Some("profile")));
        let any: ElementMatcher = "module".parse().unwrap();
        assert!(any.matches("module", None));
        assert_eq!(m.to_string(), "modules/module");
        assert!("a/".parse::<ElementMatcher>().is_err());
        assert!("/a".parse::<ElementMatcher>().is_err());
    }

    #[test]
    fn test_rule_parsing_from_cli_syntax() {
        let r: ContentKeyRule = "dependencies/dependency=groupId, artifactId".parse().unwrap();
        assert_eq!(r.fields, vec!["groupId", "artifactId"]);
        assert!("dependency".parse::<ContentKeyRule>().is_err());
        let p: PhaseRule = "executions/execution".parse().unwrap();
        assert_eq!((p.phase_child.as_str(), p.id_child.as_str()), ("phase", "id"));
        let p: PhaseRule = "steps/step=stage,name".parse().unwrap();
        assert_eq!((p.phase_child.as_str(), p.id_child.as_str()), ("stage", "name"));
    }

    #[test]
    fn test_policy_from_toml() {
        let src = r#"
alphabetical = ["modules/module"]
by_name = ["properties"]
keep_blank_lines = false

[[content_keys]]
element = "dependencies/dependency"
fields = ["groupId", "artifactId"]

[[phase]]
element = "executions/execution"
"#;
        let p: SortPolicy = toml::from_str(src).unwrap();
        assert_eq!(p.alphabetical[0].name, "module");
        assert_eq!(p.content_keys[0].element.parent.as_deref(), Some("dependencies"));
        assert_eq!(p.phase[0].id_child, "id");
        assert!(!p.keep_blank_lines);
        let empty: SortPolicy = toml::from_str("").unwrap();
        assert!(empty.keep_blank_lines);
    }
}
