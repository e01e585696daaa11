//! Per-project / per-region audit collection.

use commitaudit_core::{AuditConfig, ErrorPolicy, Result};
use commitaudit_reconcile::{
    is_active_status, reconcile_detailed, Commitment, InstanceUsage, ResourceProfile,
    ShapeCatalog, RUNNING_STATUS,
};
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::api::*;
use crate::report::{AuditIssue, AuditReport, RegionReport};

/// Walks projects through a [`ComputeApi`] and reconciles every region.
pub struct Collector<A> {
    api: A,
    policy: ErrorPolicy,
    max_concurrent_projects: usize,
}

/// Everything one project contributed to the report.
#[derive(Default)]
struct ProjectAudit {
    regions_scanned: usize,
    regions: Vec<RegionReport>,
    issues: Vec<AuditIssue>,
}

impl<A: ComputeApi> Collector<A> {
    pub fn new(api: A, config: &AuditConfig) -> Self {
        Self {
            api,
            policy: config.error_policy,
            max_concurrent_projects: config.max_concurrent_projects.max(1),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Audit all projects. Projects run concurrently; report order follows
    /// `projects`.
    pub async fn run(&self, projects: &[String]) -> Result<AuditReport> {
        let start = std::time::Instant::now();
        info!(
            "Auditing {} projects (policy: {:?})",
            projects.len(),
            self.policy
        );

        let audits: Vec<ProjectAudit> = futures::stream::iter(projects)
            .map(|project| self.audit_project(project))
            .buffered(self.max_concurrent_projects)
            .try_collect()
            .await?;

        let mut report = AuditReport::new();
        for audit in audits {
            report.regions_scanned += audit.regions_scanned;
            report.regions.extend(audit.regions);
            report.issues.extend(audit.issues);
        }

        info!(
            "Audit complete: regions={}, idle_regions={}, idle_commitments={}, issues={}, duration={}ms",
            report.regions_scanned,
            report.regions.len(),
            report.total_idle_commitments(),
            report.issues.len(),
            start.elapsed().as_millis()
        );

        Ok(report)
    }

    async fn audit_project(&self, project: &str) -> Result<ProjectAudit> {
        let mut audit = ProjectAudit::default();

        let regions = match self.api.list_regions(project).await {
            Ok(regions) => regions,
            Err(e) => {
                self.tolerate(e, &mut audit.issues, project, None, None)?;
                return Ok(audit);
            }
        };
        debug!("{}: {} regions", project, regions.len());

        for region in &regions {
            audit.regions_scanned += 1;
            let outcome = self.audit_region(project, region, &mut audit.issues).await;
            match outcome {
                Ok(Some(report)) => audit.regions.push(report),
                Ok(None) => {}
                Err(e) => self.tolerate(e, &mut audit.issues, project, Some(&region.name), None)?,
            }
        }

        Ok(audit)
    }

    /// Reconcile one region. `None` means every active commitment is in use.
    async fn audit_region(
        &self,
        project: &str,
        region: &Region,
        issues: &mut Vec<AuditIssue>,
    ) -> Result<Option<RegionReport>> {
        let commitments = self
            .active_commitments(project, &region.name, issues)
            .await?;

        let mut usage = Vec::new();
        for zone_url in &region.zones {
            let zone = zone_name(zone_url);
            usage.extend(self.zone_usage(project, &region.name, zone, issues).await?);
        }

        let running = usage.len();
        let active = commitments.len();
        let reconciliation = reconcile_detailed(&commitments, &usage);

        debug!(
            "{}/{}: commitments={}, running={}, matched={}, idle={}",
            project,
            region.name,
            active,
            running,
            reconciliation.matched,
            reconciliation.unmatched.count()
        );

        if reconciliation.unmatched.is_empty() {
            return Ok(None);
        }

        Ok(Some(RegionReport::new(
            project,
            &region.name,
            reconciliation,
            active,
            running,
        )))
    }

    /// Profiles of the region's ACTIVE commitments.
    async fn active_commitments(
        &self,
        project: &str,
        region: &str,
        issues: &mut Vec<AuditIssue>,
    ) -> Result<Vec<ResourceProfile>> {
        let records = self.api.list_commitments(project, region).await?;

        let mut profiles = Vec::new();
        for record in records.iter().filter(|r| is_active_status(&r.status)) {
            match Commitment::from_line_items(&record.name, &record.status, &record.line_items()) {
                Ok(commitment) => profiles.push(commitment.profile),
                Err(e) => self.tolerate(e, issues, project, Some(region), Some(&record.name))?,
            }
        }
        Ok(profiles)
    }

    /// Profiles of the zone's RUNNING instances. The catalog is only
    /// fetched when at least one instance is running.
    async fn zone_usage(
        &self,
        project: &str,
        region: &str,
        zone: &str,
        issues: &mut Vec<AuditIssue>,
    ) -> Result<Vec<ResourceProfile>> {
        let instances = self.api.list_instances(project, zone).await?;
        let running: Vec<&InstanceRecord> = instances
            .iter()
            .filter(|i| i.status == RUNNING_STATUS)
            .collect();
        if running.is_empty() {
            return Ok(Vec::new());
        }

        let catalog: ShapeCatalog = self
            .api
            .list_machine_types(project, zone)
            .await?
            .into_iter()
            .map(|mt| {
                let profile = mt.profile();
                (mt.name, profile)
            })
            .collect();
        debug!("{}/{}: {} machine types in catalog", project, zone, catalog.len());

        let mut profiles = Vec::with_capacity(running.len());
        for instance in running {
            let shape = machine_type_name(&instance.machine_type);
            match InstanceUsage::resolve(&instance.name, shape, &catalog) {
                Ok(usage) => profiles.push(usage.profile),
                Err(e) => self.tolerate(e, issues, project, Some(region), Some(&instance.name))?,
            }
        }
        Ok(profiles)
    }

    /// Apply the error policy: propagate under `Abort`, record under `Skip`.
    fn tolerate(
        &self,
        error: commitaudit_core::Error,
        issues: &mut Vec<AuditIssue>,
        project: &str,
        region: Option<&str>,
        subject: Option<&str>,
    ) -> Result<()> {
        match self.policy {
            ErrorPolicy::Abort => Err(error),
            ErrorPolicy::Skip => {
                let issue = AuditIssue::new(project, region, subject, &error);
                warn!("Skipping {}", issue);
                issues.push(issue);
                Ok(())
            }
        }
    }
}
