//! File-level sort runner.
//!
//! Targets are resolved from glob patterns relative to the repository root
//! and processed in parallel. Each file is parsed, sorted and serialized;
//! the result is written back only when `write` is set and the bytes differ,
//! after the untouched original has been copied to the backup file when a
//! backup extension is configured.

use crate::config::Effective;
use crate::error::{Error, Result};
use crate::sorter::XmlSorter;
use crate::utils::display_path;
use rayon::prelude::*;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FormatResult {
    pub file: String,
    pub changed: bool,
    pub wrote: bool,
    pub backup: Option<String>,
    pub preview: Option<String>,
    pub original: Option<String>,
}

/// Expand `patterns` below `root` into a sorted, de-duplicated file list.
/// Patterns that are invalid or match nothing are reported as errors.
pub fn collect_targets(root: &Path, patterns: &[String]) -> (Vec<PathBuf>, Vec<String>) {
    let mut targets: Vec<PathBuf> = Vec::new();
    let mut errors = Vec::new();
    for pat in patterns {
        let abs_glob = root.join(pat);
        let pattern = abs_glob.to_string_lossy().to_string();
        let entries = match glob::glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                errors.push(
                    Error::Pattern {
                        pattern: pat.clone(),
                        message: e.to_string(),
                    }
                    .to_string(),
                );
                continue;
            }
        };
        let before = targets.len();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => targets.push(path),
                Ok(_) => {}
                Err(e) => errors.push(Error::io(e.path().to_path_buf(), e.into_error()).to_string()),
            }
        }
        if targets.len() == before {
            errors.push(format!("no files match '{pat}'"));
        }
    }
    targets.sort();
    targets.dedup();
    (targets, errors)
}

/// Sort every target file of `eff`.
///
/// When `--diff` or `--check` is set, nothing is written and the original
/// text is captured next to the preview.
pub fn run_format(eff: &Effective, sorter: &XmlSorter) -> (Vec<FormatResult>, Vec<String>) {
    let (targets, mut errors) = collect_targets(&eff.repo_root, &eff.files);
    let capture_old = eff.diff || eff.check;
    let write = eff.write && !capture_old;
    log::debug!("sorting {} files (write={write})", targets.len());

    let outcomes: Vec<std::result::Result<FormatResult, String>> = targets
        .par_iter()
        .map(|path| {
            sort_file(
                &eff.repo_root,
                path,
                sorter,
                write,
                capture_old,
                eff.backup.as_deref(),
            )
            .map_err(|e| e.to_string())
        })
        .collect();

    let mut results = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(r) => results.push(r),
            Err(e) => errors.push(e),
        }
    }
    results.sort_by(|a, b| a.file.cmp(&b.file));
    (results, errors)
}

fn sort_file(
    root: &Path,
    path: &Path,
    sorter: &XmlSorter,
    write: bool,
    capture_old: bool,
    backup: Option<&str>,
) -> Result<FormatResult> {
    let file = display_path(root, path);
    let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let sorted = sorter.sort_str(&data).map_err(|source| Error::Document {
        path: path.to_path_buf(),
        source,
    })?;
    let changed = sorted.xml != data;
    let mut result = FormatResult {
        file,
        changed,
        wrote: false,
        backup: None,
        preview: None,
        original: if capture_old { Some(data.clone()) } else { None },
    };
    if !changed {
        log::debug!("{} is already sorted", result.file);
        return Ok(result);
    }
    if write {
        let backup_path = write_sorted(path, &data, &sorted.xml, backup)?;
        result.wrote = true;
        result.backup = backup_path.map(|p| display_path(root, &p));
        log::info!("sorted {}", result.file);
    } else {
        result.preview = Some(sorted.xml);
    }
    Ok(result)
}

/// `pom.xml` + `.bak` → `pom.xml.bak`
pub fn backup_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(extension);
    PathBuf::from(name)
}

/// Write `sorted` to `path`, saving `original` to the backup file first.
/// Returns the backup path when one was written.
pub fn write_sorted(
    path: &Path,
    original: &str,
    sorted: &str,
    backup: Option<&str>,
) -> Result<Option<PathBuf>> {
    let saved = match backup {
        Some(ext) => {
            let bak = backup_path(path, ext);
            fs::write(&bak, original).map_err(|e| Error::io(&bak, e))?;
            log::debug!("saved backup {}", bak.display());
            Some(bak)
        }
        None => None,
    };
    fs::write(path, sorted).map_err(|e| Error::io(path, e))?;
    Ok(saved)
}
