//! Output rendering for sort and verify commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-item fields, a top-level summary and the collected errors.

use crate::format::FormatResult;
use crate::models::{VerifyAction, VerifyResult};
use crate::utils::{error_prefix, warn_prefix};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("{} {}", error_prefix(), e),
    }
}

fn print_errors(errors: &[String]) {
    for e in errors {
        eprintln!("{} {}", error_prefix(), e);
    }
}

/// Print verify results in the requested format.
pub fn print_verify(res: &VerifyResult, output: &str, errors: &[String]) {
    match output {
        "json" => print_json(&compose_verify_json(res, errors)),
        _ => {
            let color = use_colors(output);
            for r in &res.reports {
                let file = if color {
                    r.file.clone().bold().to_string()
                } else {
                    r.file.clone()
                };
                if r.ordered {
                    if color {
                        println!("{} {} {}", "✔".green(), "sorted:".bright_black(), file);
                    } else {
                        println!("✔ sorted: {}", file);
                    }
                    continue;
                }
                let message = r.message.as_deref().unwrap_or_default();
                let (icon, tag) = match r.action {
                    VerifyAction::Failed => ("✖", "⟦unsorted⟧"),
                    VerifyAction::Warned => ("▲", "⟦warn⟧"),
                    VerifyAction::Sorted => ("✏️ ", "⟦sorted⟧"),
                    VerifyAction::None => ("◆", "⟦info⟧"),
                };
                let tag = if color {
                    match r.action {
                        VerifyAction::Failed => tag.red().bold().to_string(),
                        VerifyAction::Warned => tag.yellow().bold().to_string(),
                        _ => tag.green().bold().to_string(),
                    }
                } else {
                    tag.to_string()
                };
                println!("{} {} {} ❲{}❳", icon, tag, file, message);
                if let Some(b) = &r.backup {
                    println!("   backup: {}", b);
                }
            }
            print_errors(errors);
            if let Some(notice) = warned_notice(res) {
                eprintln!("{} {}", warn_prefix(), notice);
            }
            let summary = format!(
                "— Summary — files={} unsorted={} sorted={} failed={} errors={}",
                res.summary.files,
                res.summary.unsorted,
                res.summary.sorted,
                res.summary.failed,
                errors.len()
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Reminder that unsorted files were let through by `verify_fail = warn`.
fn warned_notice(res: &VerifyResult) -> Option<String> {
    let warned = res
        .reports
        .iter()
        .filter(|r| r.action == VerifyAction::Warned)
        .count();
    (warned > 0).then(|| format!("{warned} unsorted file(s) left as is (verify_fail = warn)"))
}

/// Print sort results. When `write` is false, previews and diffs
/// can be emitted; otherwise only file statuses are shown.
pub fn print_format(
    results: &[FormatResult],
    output: &str,
    write: bool,
    diff: bool,
    errors: &[String],
) {
    match output {
        "json" => print_json(&compose_format_json(results, write, diff, errors)),
        _ => {
            let color = use_colors(output);
            for r in results {
                if !r.changed {
                    if color {
                        println!("{} {}", "no changes:".bright_black(), r.file);
                    } else {
                        println!("no changes: {}", r.file);
                    }
                } else if r.wrote {
                    if color {
                        println!("{} {}", "✏️  sorted:".green().bold(), r.file.bold());
                    } else {
                        println!("✏️  sorted: {}", r.file);
                    }
                    if let Some(b) = &r.backup {
                        println!("   backup: {}", b);
                    }
                } else {
                    let body = if diff {
                        build_line_diff(r.original.as_deref(), r.preview.as_deref())
                            .or_else(|| r.preview.clone())
                    } else {
                        r.preview.clone()
                    };
                    let body = body.unwrap_or_default();
                    if color {
                        println!("{} {}\n{}", "---".cyan().bold(), r.file.bold(), body);
                    } else {
                        println!("--- {}\n{}", r.file, body);
                    }
                }
            }
            print_errors(errors);
        }
    }
}

/// Line-by-line diff: common prefix and suffix are skipped, the differing
/// middle is shown as removed then added lines.
fn build_line_diff(old: Option<&str>, new: Option<&str>) -> Option<String> {
    let old: Vec<&str> = old?.lines().collect();
    let new: Vec<&str> = new?.lines().collect();
    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let mut out = String::new();
    out.push_str(&format!("@@ line {} @@\n", prefix + 1));
    for line in &old[prefix..old.len() - suffix] {
        out.push('-');
        out.push_str(line);
        out.push('\n');
    }
    for line in &new[prefix..new.len() - suffix] {
        out.push('+');
        out.push_str(line);
        out.push('\n');
    }
    Some(out)
}

/// Compose verify JSON object (pure) for testing/snapshot purposes.
pub fn compose_verify_json(res: &VerifyResult, errors: &[String]) -> JsonVal {
    let mut out = serde_json::to_value(res).unwrap_or_else(|_| json!({}));
    out["errors"] = json!(errors);
    out
}

/// Compose format JSON object (pure) for testing/snapshot purposes.
pub fn compose_format_json(
    results: &[FormatResult],
    write: bool,
    diff: bool,
    errors: &[String],
) -> JsonVal {
    let items: Vec<_> = results
        .iter()
        .map(|r| {
            json!({
                "file": r.file,
                "changed": r.changed,
                "wrote": r.wrote,
                "backup": r.backup,
                "preview": if !write { r.preview.as_ref() } else { None },
                "diff": if diff && !write { build_line_diff(r.original.as_deref(), r.preview.as_deref()) } else { None }
            })
        })
        .collect();
    let summary = json!({
        "changed": results.iter().filter(|r| r.changed).count(),
        "total": results.len(),
        "wrote": results.iter().filter(|r| r.wrote).count(),
    });
    json!({"results": items, "summary": summary, "errors": errors})
}
