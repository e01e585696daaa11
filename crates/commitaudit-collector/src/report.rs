//! Audit report types.

use commitaudit_reconcile::{Reconciliation, UnmatchedCommitments};
use serde::Serialize;

/// Idle commitments found in one (project, region).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionReport {
    pub project: String,
    pub region: String,
    pub unmatched: UnmatchedCommitments,
    pub idle_compute_units: u64,
    pub idle_memory_mb: u64,
    pub active_commitments: usize,
    pub running_instances: usize,
    /// Running instances not covered by any commitment.
    pub uncovered_usage: usize,
}

impl RegionReport {
    pub fn new(
        project: &str,
        region: &str,
        reconciliation: Reconciliation,
        active_commitments: usize,
        running_instances: usize,
    ) -> Self {
        let unmatched = reconciliation.unmatched;
        Self {
            project: project.to_string(),
            region: region.to_string(),
            idle_compute_units: unmatched.total_compute_units(),
            idle_memory_mb: unmatched.total_memory_mb(),
            unmatched,
            active_commitments,
            running_instances,
            uncovered_usage: reconciliation.uncovered_usage,
        }
    }
}

/// A commitment, instance, region or project that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditIssue {
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Commitment or instance name, when the issue concerns one item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub error: String,
}

impl AuditIssue {
    pub fn new(
        project: &str,
        region: Option<&str>,
        subject: Option<&str>,
        error: &commitaudit_core::Error,
    ) -> Self {
        Self {
            project: project.to_string(),
            region: region.map(String::from),
            subject: subject.map(String::from),
            error: error.to_string(),
        }
    }
}

impl std::fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.project)?;
        if let Some(region) = &self.region {
            write!(f, "/{}", region)?;
        }
        if let Some(subject) = &self.subject {
            write!(f, " [{}]", subject)?;
        }
        write!(f, ": {}", self.error)
    }
}

/// Result of one audit run. Only regions with idle commitments appear.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub run_id: String,
    pub generated_at: String,
    pub regions_scanned: usize,
    pub regions: Vec<RegionReport>,
    pub issues: Vec<AuditIssue>,
}

impl AuditReport {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            regions_scanned: 0,
            regions: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn total_idle_commitments(&self) -> usize {
        self.regions.iter().map(|r| r.unmatched.count()).sum()
    }
}

impl Default for AuditReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commitaudit_reconcile::{reconcile_detailed, ResourceProfile};

    #[test]
    fn test_region_report_totals() {
        let rec = reconcile_detailed(
            &[
                ResourceProfile::new(2, 4096),
                ResourceProfile::new(4, 16384),
                ResourceProfile::new(8, 32768),
            ],
            &[ResourceProfile::new(4, 16384), ResourceProfile::new(1, 1)],
        );
        let report = RegionReport::new("prod", "europe-west1", rec, 3, 2);

        assert_eq!(report.unmatched.count(), 2);
        assert_eq!(report.idle_compute_units, 10);
        assert_eq!(report.idle_memory_mb, 36864);
        assert_eq!(report.uncovered_usage, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unmatched"]["count"], 2);
        assert_eq!(json["idleComputeUnits"], 10);
    }

    #[test]
    fn test_region_report_large_amounts() {
        let rec = reconcile_detailed(
            &[
                ResourceProfile::new(u64::MAX, 1),
                ResourceProfile::new(u64::MAX, 1),
            ],
            &[],
        );
        let report = RegionReport::new("prod", "europe-west1", rec, 2, 0);
        assert_eq!(report.unmatched.count(), 2);
        assert_eq!(report.idle_compute_units, u64::MAX);
        assert_eq!(report.idle_memory_mb, 2);
    }

    #[test]
    fn test_issue_display() {
        let err = commitaudit_core::Error::MalformedShapeIdentifier("custom-bad".into());
        let issue = AuditIssue::new("prod", Some("europe-west1"), Some("web-1"), &err);
        assert_eq!(
            issue.to_string(),
            "prod/europe-west1 [web-1]: Malformed shape identifier: custom-bad"
        );

        let json = serde_json::to_value(AuditIssue::new("prod", None, None, &err)).unwrap();
        assert!(json.get("region").is_none());
    }

    #[test]
    fn test_new_report_is_empty() {
        let report = AuditReport::new();
        assert!(!report.run_id.is_empty());
        assert_eq!(report.total_idle_commitments(), 0);
    }
}
