//! File-level verify runner.
//!
//! A file is unsorted when sorting it would change its element structure,
//! or, under `VerifyFailOn::Strict`, when sorting would change its bytes.
//! The configured `VerifyFail` then decides between failing the run,
//! warning, or sorting the file in place.

use crate::config::{Effective, VerifyFail, VerifyFailOn};
use crate::error::{Error, Result};
use crate::format::{collect_targets, write_sorted};
use crate::models::{VerifyAction, VerifyReport, VerifyResult};
use crate::sorter::XmlSorter;
use crate::utils::{display_path, normalize_newlines};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Kind reported when only the formatting differs.
pub const FORMATTING_KIND: &str = "formatting";

/// Verify every target file of `eff`.
pub fn run_verify(eff: &Effective, sorter: &XmlSorter) -> (VerifyResult, Vec<String>) {
    let (targets, mut errors) = collect_targets(&eff.repo_root, &eff.files);
    let outcomes: Vec<std::result::Result<VerifyReport, String>> = targets
        .par_iter()
        .map(|path| verify_file(eff, sorter, path).map_err(|e| e.to_string()))
        .collect();

    let mut reports = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(r) => reports.push(r),
            Err(e) => errors.push(e),
        }
    }
    (VerifyResult::from_reports(reports), errors)
}

fn verify_file(eff: &Effective, sorter: &XmlSorter, path: &Path) -> Result<VerifyReport> {
    let file = display_path(&eff.repo_root, path);
    let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let sorted = sorter.sort_str(&data).map_err(|source| Error::Document {
        path: path.to_path_buf(),
        source,
    })?;

    let (kind, message) = match sorted.ordered.divergence() {
        Some(d) => (Some(d.kind().as_str().to_string()), Some(d.message())),
        None if eff.verify_fail_on == VerifyFailOn::Strict
            && !same_bytes(&data, &sorted.xml, eff.ignore_line_separators) =>
        {
            (
                Some(FORMATTING_KIND.to_string()),
                Some("The file is not formatted as expected".to_string()),
            )
        }
        None => (None, None),
    };

    let Some(text) = message else {
        log::debug!("{file} is sorted");
        return Ok(VerifyReport {
            file,
            ordered: true,
            kind: None,
            message: None,
            action: VerifyAction::None,
            backup: None,
        });
    };

    let mut backup = None;
    let action = match eff.verify_fail {
        VerifyFail::Stop => VerifyAction::Failed,
        VerifyFail::Warn => {
            log::warn!("{file}: {text}");
            VerifyAction::Warned
        }
        VerifyFail::Sort => {
            let saved = write_sorted(path, &data, &sorted.xml, eff.backup.as_deref())?;
            backup = saved.map(|p| display_path(&eff.repo_root, &p));
            log::info!("sorted {file}");
            VerifyAction::Sorted
        }
    };
    Ok(VerifyReport {
        file,
        ordered: false,
        kind,
        message: Some(text),
        action,
        backup,
    })
}

fn same_bytes(original: &str, sorted: &str, ignore_line_separators: bool) -> bool {
    if ignore_line_separators {
        normalize_newlines(original) == normalize_newlines(sorted)
    } else {
        original == sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_effective, Overrides};
    use crate::sort_order::{load_template, SortOrderIndex};
    use tempfile::tempdir;

    const UNSORTED: &str = "<project><artifactId>a</artifactId><groupId>g</groupId></project>";
    const SORTED_LOOSE: &str = "<project><groupId>g</groupId><artifactId>a</artifactId></project>";

    fn run(root: &Path, cli: Overrides) -> (VerifyResult, Vec<String>) {
        let eff = resolve_effective(&Overrides {
            repo_root: root.to_str().map(str::to_string),
            ..cli
        })
        .unwrap();
        let template = load_template(&eff.sort_order, root).unwrap();
        let sorter = XmlSorter::new(
            SortOrderIndex::build(&template),
            eff.policy.clone(),
            eff.serialize.clone(),
        );
        run_verify(&eff, &sorter)
    }

    #[test]
    fn test_stop_reports_failure_with_divergence() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pom.xml"), UNSORTED).unwrap();
        let (res, errors) = run(dir.path(), Overrides::default());
        assert!(errors.is_empty());
        let r = &res.reports[0];
        assert!(!r.ordered);
        assert_eq!(r.action, VerifyAction::Failed);
        assert_eq!(r.kind.as_deref(), Some("name_differs"));
        assert_eq!(
            r.message.as_deref(),
            Some("The xml element <groupId> should be placed before <artifactId>")
        );
        assert_eq!(res.summary.failed, 1);
    }

    #[test]
    fn test_warn_passes_and_sort_rewrites() {
        let dir = tempdir().unwrap();
        let pom = dir.path().join("pom.xml");
        fs::write(&pom, UNSORTED).unwrap();
        let warn = Overrides {
            verify_fail: Some("warn".into()),
            ..Overrides::default()
        };
        let (res, _) = run(dir.path(), warn);
        assert_eq!(res.reports[0].action, VerifyAction::Warned);
        assert_eq!(fs::read_to_string(&pom).unwrap(), UNSORTED);

        let sort = Overrides {
            verify_fail: Some("sort".into()),
            backup: Some(".bak".into()),
            ..Overrides::default()
        };
        let (res, _) = run(dir.path(), sort.clone());
        assert_eq!(res.reports[0].action, VerifyAction::Sorted);
        assert_eq!(res.summary.sorted, 1);
        assert_eq!(fs::read_to_string(dir.path().join("pom.xml.bak")).unwrap(), UNSORTED);
        let (res, _) = run(dir.path(), sort);
        assert!(res.reports[0].ordered);
    }

    #[test]
    fn test_strict_mode_flags_formatting_only_differences() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pom.xml"), SORTED_LOOSE).unwrap();
        let (res, _) = run(dir.path(), Overrides::default());
        assert!(res.reports[0].ordered);

        let strict = Overrides {
            verify_fail_on: Some("strict".into()),
            ..Overrides::default()
        };
        let (res, _) = run(dir.path(), strict);
        assert!(!res.reports[0].ordered);
        assert_eq!(res.reports[0].kind.as_deref(), Some(FORMATTING_KIND));
    }

    #[test]
    fn test_line_separators_ignored_unless_asked() {
        assert!(same_bytes("a\r\nb\r\n", "a\nb\n", true));
        assert!(!same_bytes("a\r\nb\r\n", "a\nb\n", false));
    }
}
