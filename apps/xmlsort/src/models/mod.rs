//! Shared data models for sort/verify outputs and the sort policy.

pub mod policy;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// What the verify run did about a file.
pub enum VerifyAction {
    /// Already ordered.
    None,
    /// Reported, run still succeeds.
    Warned,
    /// Reported and rewritten in sorted order.
    Sorted,
    /// Reported, run fails.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
/// Verification outcome for one file.
pub struct VerifyReport {
    pub file: String,
    pub ordered: bool,
    pub kind: Option<String>,
    pub message: Option<String>,
    pub action: VerifyAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Aggregated verify summary used by printers.
pub struct Summary {
    pub files: usize,
    pub unsorted: usize,
    pub sorted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
/// Verify results container.
pub struct VerifyResult {
    pub reports: Vec<VerifyReport>,
    pub summary: Summary,
}

impl VerifyResult {
    pub fn from_reports(mut reports: Vec<VerifyReport>) -> Self {
        reports.sort_by(|a, b| a.file.cmp(&b.file));
        let summary = Summary {
            files: reports.len(),
            unsorted: reports.iter().filter(|r| !r.ordered).count(),
            sorted: reports
                .iter()
                .filter(|r| r.action == VerifyAction::Sorted)
                .count(),
            failed: reports
                .iter()
                .filter(|r| r.action == VerifyAction::Failed)
                .count(),
        };
        Self { reports, summary }
    }
}
