//! Lifecycle phases used to order execution-like elements.

/// Maven's clean, default and site lifecycles in execution order.
pub const MAVEN_LIFECYCLE: &[&str] = &[
    "pre-clean",
    "clean",
    "post-clean",
    "validate",
    "initialize",
    "generate-sources",
    "process-sources",
    "generate-resources",
    "process-resources",
    "compile",
    "process-classes",
    "generate-test-sources",
    "process-test-sources",
    "generate-test-resources",
    "process-test-resources",
    "test-compile",
    "process-test-classes",
    "test",
    "prepare-package",
    "package",
    "pre-integration-test",
    "integration-test",
    "post-integration-test",
    "verify",
    "install",
    "deploy",
    "pre-site",
    "site",
    "post-site",
    "site-deploy",
];

/// A resolved phase. Known phases order by their lifecycle position and
/// come before every unknown phase; unknown phases order by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Standard(usize),
    Other(String),
}

#[derive(Debug, Clone)]
pub struct PhaseOrder {
    names: Vec<String>,
}

impl Default for PhaseOrder {
    fn default() -> Self {
        Self::new(MAVEN_LIFECYCLE.iter().map(|s| s.to_string()).collect())
    }
}

impl PhaseOrder {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn resolve(&self, name: &str) -> Phase {
        match self.names.iter().position(|n| n == name) {
            Some(i) => Phase::Standard(i),
            None => Phase::Other(name.to_string()),
        }
    }

    pub fn name<'a>(&'a self, phase: &'a Phase) -> &'a str {
        match phase {
            Phase::Standard(i) => self.names.get(*i).map(String::as_str).unwrap_or_default(),
            Phase::Other(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_phases_follow_lifecycle_and_precede_custom_ones() {
        let order = PhaseOrder::default();
        let mut phases: Vec<Phase> = ["test", "zzz-custom", "compile", "validate", "aaa-custom"]
            .iter()
            .map(|p| order.resolve(p))
            .collect();
        phases.sort();
        let names: Vec<&str> = phases.iter().map(|p| order.name(p)).collect();
        assert_eq!(names, vec!["validate", "compile", "test", "aaa-custom", "zzz-custom"]);
    }

    #[test]
    fn test_custom_sequence() {
        let order = PhaseOrder::new(vec!["build".into(), "ship".into()]);
        assert!(order.resolve("build") < order.resolve("ship"));
        assert_eq!(order.resolve("compile"), Phase::Other("compile".into()));
    }
}
