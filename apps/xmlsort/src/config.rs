//! Configuration discovery and effective settings resolution.
//!
//! xmlsort reads `xmlsort.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `sort_order`: `recommended_2008_06`
//! - `files`: `["pom.xml"]`
//! - `output`: `human`
//! - `format.write|diff|check`: false, no backup
//! - `format.encoding`: `UTF-8`, `format.line_separator`: `\n`, `format.indent`: 2
//!   (`-1` for a tab, at most `255` spaces)
//! - `format.expand_empty_elements`: true
//! - `verify.fail`: `stop`, `verify.fail_on`: `elements`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::dom::serial::{Indent, SerializeOptions};
use crate::error::ConfigError;
use crate::models::policy::SortPolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file names, in lookup order.
pub const CONFIG_FILES: &[&str] = &["xmlsort.toml", "xmlsort.yaml", "xmlsort.yml"];

pub const DEFAULT_SORT_ORDER: &str = "recommended_2008_06";
pub const DEFAULT_BACKUP_EXTENSION: &str = ".bak";

/// Accepted `indent` values; `-1` selects a tab.
pub const INDENT_RANGE: std::ops::RangeInclusive<i64> = -1..=255;

#[derive(Debug, Default, Deserialize, Clone)]
/// Output-related configuration section under `[format]`.
pub struct FormatCfg {
    pub write: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
    /// Backup file extension; no backup when absent.
    pub backup: Option<String>,
    pub encoding: Option<String>,
    pub line_separator: Option<String>,
    /// Spaces per level, `-1` for a tab.
    pub indent: Option<i64>,
    pub indent_blank_lines: Option<bool>,
    pub expand_empty_elements: Option<bool>,
    pub space_before_close_empty_element: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Verification section under `[verify]`.
pub struct VerifyCfg {
    pub fail: Option<String>,
    pub fail_on: Option<String>,
    pub ignore_line_separators: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `xmlsort.toml|yaml`.
pub struct XmlSortConfig {
    pub sort_order: Option<String>,
    pub files: Option<Vec<String>>,
    pub output: Option<String>,
    pub format: Option<FormatCfg>,
    pub sort: Option<SortPolicy>,
    pub verify: Option<VerifyCfg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What `verify` does with an unsorted file.
pub enum VerifyFail {
    Sort,
    Warn,
    Stop,
}

impl FromStr for VerifyFail {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sort" => Ok(VerifyFail::Sort),
            "warn" => Ok(VerifyFail::Warn),
            "stop" => Ok(VerifyFail::Stop),
            _ => Err(ConfigError::InvalidValue {
                key: "verify_fail",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What counts as unsorted during `verify`.
pub enum VerifyFailOn {
    /// Element order and text only.
    Elements,
    /// Also the exact serialized bytes.
    Strict,
}

impl FromStr for VerifyFailOn {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "elements" | "xmlelements" => Ok(VerifyFailOn::Elements),
            "strict" => Ok(VerifyFailOn::Strict),
            _ => Err(ConfigError::InvalidValue {
                key: "verify_fail_on",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None`/empty means not given.
pub struct Overrides {
    pub repo_root: Option<String>,
    pub sort_order: Option<String>,
    pub files: Vec<String>,
    pub output: Option<String>,
    pub write: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
    pub backup: Option<String>,
    pub encoding: Option<String>,
    pub line_separator: Option<String>,
    pub indent: Option<i64>,
    pub keep_blank_lines: Option<bool>,
    pub alphabetical: Vec<String>,
    pub by_name: Vec<String>,
    pub content_keys: Vec<String>,
    pub phase: Vec<String>,
    pub verify_fail: Option<String>,
    pub verify_fail_on: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub sort_order: String,
    pub files: Vec<String>,
    pub output: String,
    pub write: bool,
    pub diff: bool,
    pub check: bool,
    pub backup: Option<String>,
    pub serialize: SerializeOptions,
    pub policy: SortPolicy,
    pub verify_fail: VerifyFail,
    pub verify_fail_on: VerifyFailOn,
    pub ignore_line_separators: bool,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when an `xmlsort.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `XmlSortConfig` from `xmlsort.toml` or `xmlsort.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<XmlSortConfig>, ConfigError> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|e| ConfigError::File {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let cfg = if name.ends_with(".toml") {
            toml::from_str::<XmlSortConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<XmlSortConfig>(&s).map_err(|e| e.to_string())
        };
        let cfg = cfg.map_err(|message| ConfigError::File { path, message })?;
        log::debug!("loaded config from {}", root.join(name).display());
        return Ok(Some(cfg));
    }
    Ok(None)
}

/// Only UTF-8 output is supported.
pub fn parse_encoding(value: &str) -> Result<String, ConfigError> {
    if value.eq_ignore_ascii_case("UTF-8") || value.eq_ignore_ascii_case("UTF8") {
        Ok("UTF-8".to_string())
    } else {
        Err(ConfigError::UnsupportedEncoding(value.to_string()))
    }
}

/// Accepts the separators themselves or their escaped spellings (`\r\n`).
pub fn parse_line_separator(value: &str) -> Result<String, ConfigError> {
    let unescaped = value.replace("\\r", "\r").replace("\\n", "\n");
    match unescaped.as_str() {
        "\n" | "\r\n" | "\r" => Ok(unescaped),
        _ => Err(ConfigError::LineSeparator(value.to_string())),
    }
}

fn parse_rules<T>(key: &'static str, values: &[String]) -> Result<Vec<T>, ConfigError>
where
    T: FromStr<Err = String>,
{
    values
        .iter()
        .map(|v| {
            v.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                key,
                value: v.clone(),
            })
        })
        .collect()
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();
    let fmt = cfg.format.unwrap_or_default();
    let ver = cfg.verify.unwrap_or_default();

    let sort_order = cli
        .sort_order
        .clone()
        .or(cfg.sort_order)
        .unwrap_or_else(|| DEFAULT_SORT_ORDER.to_string());
    let files = if !cli.files.is_empty() {
        cli.files.clone()
    } else {
        cfg.files.unwrap_or_else(|| vec!["pom.xml".to_string()])
    };
    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(ConfigError::InvalidValue {
            key: "output",
            value: output,
        });
    }

    let write = cli.write.or(fmt.write).unwrap_or(false);
    let diff = cli.diff.or(fmt.diff).unwrap_or(false);
    let check = cli.check.or(fmt.check).unwrap_or(false);
    let backup = cli.backup.clone().or(fmt.backup).filter(|b| !b.is_empty());

    let defaults = SerializeOptions::default();
    let encoding = match cli.encoding.as_deref().or(fmt.encoding.as_deref()) {
        Some(e) => parse_encoding(e)?,
        None => defaults.encoding,
    };
    let line_separator = match cli.line_separator.as_deref().or(fmt.line_separator.as_deref()) {
        Some(s) => parse_line_separator(s)?,
        None => defaults.line_separator,
    };
    let indent = match cli.indent.or(fmt.indent) {
        Some(n) if !INDENT_RANGE.contains(&n) => {
            return Err(ConfigError::InvalidValue {
                key: "indent",
                value: n.to_string(),
            })
        }
        Some(n) => Indent::from_config(n),
        None => defaults.indent,
    };
    let serialize = SerializeOptions {
        encoding,
        line_separator,
        indent,
        indent_blank_lines: fmt.indent_blank_lines.unwrap_or(defaults.indent_blank_lines),
        expand_empty_elements: fmt
            .expand_empty_elements
            .unwrap_or(defaults.expand_empty_elements),
        space_before_close_empty_element: fmt
            .space_before_close_empty_element
            .unwrap_or(defaults.space_before_close_empty_element),
    };

    let mut policy = cfg.sort.unwrap_or_default();
    policy
        .alphabetical
        .extend(parse_rules("alphabetical", &cli.alphabetical)?);
    policy.by_name.extend(cli.by_name.iter().cloned());
    policy
        .content_keys
        .extend(parse_rules("content_keys", &cli.content_keys)?);
    policy.phase.extend(parse_rules("phase", &cli.phase)?);
    if let Some(keep) = cli.keep_blank_lines {
        policy.keep_blank_lines = keep;
    }

    let verify_fail = match cli.verify_fail.as_deref().or(ver.fail.as_deref()) {
        Some(v) => v.parse()?,
        None => VerifyFail::Stop,
    };
    let verify_fail_on = match cli.verify_fail_on.as_deref().or(ver.fail_on.as_deref()) {
        Some(v) => v.parse()?,
        None => VerifyFailOn::Elements,
    };

    Ok(Effective {
        repo_root,
        config_found,
        sort_order,
        files,
        output,
        write,
        diff,
        check,
        backup,
        serialize,
        policy,
        verify_fail,
        verify_fail_on,
        ignore_line_separators: ver.ignore_line_separators.unwrap_or(true),
    })
}
