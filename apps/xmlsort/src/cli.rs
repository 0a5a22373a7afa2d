//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "xmlsort",
    version,
    about = "Sort XML documents into a canonical element order",
    long_about = "xmlsort reorders the elements and attributes of XML files (Maven POMs by default) into the order given by a template, keeping comments and blank lines.\n\nConfiguration precedence: CLI > xmlsort.toml > defaults.",
    after_help = "Examples:\n  xmlsort sort --write --backup\n  xmlsort sort --diff modules/*/pom.xml\n  xmlsort verify --verify-fail warn\n  xmlsort sort --sort-order default_1_0_0 --content-key dependencies/dependency=groupId,artifactId",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(long, short, global = true, action = clap::ArgAction::SetTrue, help = "Log debug output (RUST_LOG overrides)")]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Debug, Default, Clone)]
/// Options shared by `sort` and `verify`.
pub struct CommonArgs {
    #[arg(help = "Files or glob patterns relative to the repo root (default: pom.xml)")]
    pub files: Vec<String>,
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Built-in template (default_1_0_0, recommended_2008_06) or path to an XML template")]
    pub sort_order: Option<String>,
    #[arg(long, help = "Output encoding (only UTF-8)")]
    pub encoding: Option<String>,
    #[arg(long, help = "Line separator: \\n, \\r\\n or \\r")]
    pub line_separator: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Spaces per indent level, -1 for a tab")]
    pub indent: Option<i64>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Drop blank lines between elements")]
    pub no_blank_lines: bool,
    #[arg(long = "alphabetical", value_name = "PARENT/NAME", help = "Sort matching elements by their text (repeatable)")]
    pub alphabetical: Vec<String>,
    #[arg(long = "by-name", value_name = "PARENT", help = "Sort children of PARENT by element name (repeatable)")]
    pub by_name: Vec<String>,
    #[arg(long = "content-key", value_name = "PARENT/NAME=FIELD,...", help = "Sort matching elements by child values (repeatable)")]
    pub content_keys: Vec<String>,
    #[arg(long = "phase", value_name = "PARENT/NAME", help = "Sort matching elements by lifecycle phase, then id (repeatable)")]
    pub phase: Vec<String>,
    #[arg(long, num_args = 0..=1, default_missing_value = ".bak", value_name = "EXT", help = "Save the original next to each rewritten file (default extension: .bak)")]
    pub backup: Option<String>,
}

impl CommonArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            repo_root: self.repo_root.clone(),
            sort_order: self.sort_order.clone(),
            files: self.files.clone(),
            output: self.output.clone(),
            backup: self.backup.clone(),
            encoding: self.encoding.clone(),
            line_separator: self.line_separator.clone(),
            indent: self.indent,
            keep_blank_lines: if self.no_blank_lines { Some(false) } else { None },
            alphabetical: self.alphabetical.clone(),
            by_name: self.by_name.clone(),
            content_keys: self.content_keys.clone(),
            phase: self.phase.clone(),
            ..Overrides::default()
        }
    }
}

#[derive(Subcommand)]
/// Supported subcommands for sorting and verifying.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current xmlsort version.")]
    Version,
    /// Sort files
    #[command(
        about = "Sort XML files",
        long_about = "Reorder elements by template weight and attributes by name. When --diff or --check is set, write is disabled.",
        after_help = "Examples:\n  xmlsort sort --diff\n  xmlsort sort --write --backup=.orig"
    )]
    Sort {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Write changes to files")]
        write: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show diffs for changed files (implies write=false)")]
        diff: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if changes would occur (implies write=false)")]
        check: bool,
    },
    /// Verify files are sorted
    #[command(
        about = "Verify XML files are sorted",
        long_about = "Compare each file with its sorted form. The first divergence is reported; --verify-fail decides whether to stop, warn, or sort the file.",
        after_help = "Examples:\n  xmlsort verify\n  xmlsort verify --verify-fail sort --backup\n  xmlsort verify --verify-fail-on strict"
    )]
    Verify {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, help = "On unsorted files: stop|warn|sort (default: stop)")]
        verify_fail: Option<String>,
        #[arg(long, help = "What counts as unsorted: elements|strict (default: elements)")]
        verify_fail_on: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_flags_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "xmlsort",
            "sort",
            "--write",
            "--backup",
            "--indent",
            "-1",
            "--content-key",
            "dependencies/dependency=groupId,artifactId",
            "a/pom.xml",
        ])
        .unwrap();
        let Commands::Sort { common, write, .. } = cli.cmd else {
            panic!("expected sort");
        };
        assert!(write);
        let o = common.overrides();
        assert_eq!(o.backup.as_deref(), Some(".bak"));
        assert_eq!(o.indent, Some(-1));
        assert_eq!(o.files, vec!["a/pom.xml"]);
        assert_eq!(o.content_keys.len(), 1);
        assert_eq!(o.keep_blank_lines, None);
    }

    #[test]
    fn test_verify_flags() {
        let cli = Cli::try_parse_from([
            "xmlsort",
            "-v",
            "verify",
            "--verify-fail",
            "warn",
            "--no-blank-lines",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Verify {
            common,
            verify_fail,
            ..
        } = cli.cmd
        else {
            panic!("expected verify");
        };
        assert_eq!(verify_fail.as_deref(), Some("warn"));
        assert_eq!(common.overrides().keep_blank_lines, Some(false));
    }
}
