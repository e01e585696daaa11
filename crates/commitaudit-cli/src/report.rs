//! Report emitter — text through `tracing`, or JSON on stdout.

use commitaudit_collector::AuditReport;
use commitaudit_core::OutputFormat;
use tracing::{info, warn};

/// Render the report in the configured format.
pub fn emit(report: &AuditReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for line in text_lines(report) {
                info!("{}", line);
            }
            for issue in &report.issues {
                warn!("Skipped {}", issue);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

/// One header line per idle region followed by its unmatched commitments,
/// then a summary line.
pub fn text_lines(report: &AuditReport) -> Vec<String> {
    let mut lines = Vec::new();

    for region in &report.regions {
        lines.push(format!(
            "{} {}: {} idle commitments ({} vCPU, {} MB)",
            region.project,
            region.region,
            region.unmatched.count(),
            region.idle_compute_units,
            region.idle_memory_mb
        ));
        for profile in region.unmatched.profiles() {
            lines.push(format!("  {}", profile));
        }
    }

    lines.push(format!(
        "Scanned {} regions: {} idle commitments in {} regions, {} issues",
        report.regions_scanned,
        report.total_idle_commitments(),
        report.regions.len(),
        report.issues.len()
    ));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use commitaudit_collector::RegionReport;
    use commitaudit_reconcile::{reconcile_detailed, ResourceProfile};

    #[test]
    fn test_text_lines() {
        let mut report = AuditReport::new();
        report.regions_scanned = 3;
        report.regions.push(RegionReport::new(
            "prod",
            "europe-west1",
            reconcile_detailed(
                &[ResourceProfile::new(2, 4096), ResourceProfile::new(4, 16384)],
                &[ResourceProfile::new(4, 16384)],
            ),
            2,
            1,
        ));

        assert_eq!(
            text_lines(&report),
            vec![
                "prod europe-west1: 1 idle commitments (2 vCPU, 4096 MB)".to_string(),
                "  2 vCPU / 4096 MB".to_string(),
                "Scanned 3 regions: 1 idle commitments in 1 regions, 0 issues".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_report_has_only_summary() {
        let lines = text_lines(&AuditReport::new());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Scanned 0 regions"));
    }
}
