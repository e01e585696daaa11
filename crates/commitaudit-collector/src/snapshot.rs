//! Offline compute API backed by a JSON snapshot.
//!
//! Snapshot layout:
//!
//! ```json
//! {
//!   "projects": {
//!     "prod": {
//!       "regions": [
//!         {"name": "europe-west1", "zones": ["europe-west1-b"],
//!          "commitments": [{"name": "cud-1", "status": "ACTIVE",
//!                           "resources": [{"type": "VCPU", "amount": "4"}]}]}
//!       ],
//!       "zones": {
//!         "europe-west1-b": {
//!           "instances": [{"name": "web-1", "status": "RUNNING", "machineType": "n1-4-16384"}],
//!           "machineTypes": [{"name": "e2-medium", "guestCpus": 2, "memoryMb": 4096}]
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use commitaudit_core::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(default)]
    pub regions: Vec<RegionSnapshot>,
    #[serde(default)]
    pub zones: BTreeMap<String, ZoneSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub name: String,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub commitments: Vec<CommitmentRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSnapshot {
    #[serde(default)]
    pub instances: Vec<InstanceRecord>,
    #[serde(default)]
    pub machine_types: Vec<MachineTypeRecord>,
}

/// [`ComputeApi`] over an in-memory [`Snapshot`].
pub struct SnapshotApi {
    snapshot: Snapshot,
    catalog_requests: Mutex<Vec<String>>,
}

impl SnapshotApi {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            catalog_requests: Mutex::new(Vec::new()),
        }
    }

    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&data)?;
        info!(
            "Loaded snapshot {} ({} projects)",
            path.display(),
            snapshot.projects.len()
        );
        Ok(Self::new(snapshot))
    }

    /// Project names in the snapshot, sorted.
    pub fn projects(&self) -> Vec<String> {
        self.snapshot.projects.keys().cloned().collect()
    }

    /// Zones whose machine type catalog was requested, in request order.
    pub fn catalog_requests(&self) -> Vec<String> {
        self.catalog_requests.lock().clone()
    }

    fn project(&self, project: &str) -> Result<&ProjectSnapshot> {
        self.snapshot
            .projects
            .get(project)
            .ok_or_else(|| Error::Snapshot(format!("unknown project: {}", project)))
    }

    fn zone(&self, project: &str, zone: &str) -> Result<Option<&ZoneSnapshot>> {
        Ok(self.project(project)?.zones.get(zone))
    }
}

impl ComputeApi for SnapshotApi {
    async fn list_regions(&self, project: &str) -> Result<Vec<Region>> {
        Ok(self
            .project(project)?
            .regions
            .iter()
            .map(|r| Region {
                name: r.name.clone(),
                zones: r.zones.clone(),
            })
            .collect())
    }

    async fn list_commitments(
        &self,
        project: &str,
        region: &str,
    ) -> Result<Vec<CommitmentRecord>> {
        self.project(project)?
            .regions
            .iter()
            .find(|r| r.name == region)
            .map(|r| r.commitments.clone())
            .ok_or_else(|| Error::Snapshot(format!("unknown region: {}/{}", project, region)))
    }

    async fn list_instances(&self, project: &str, zone: &str) -> Result<Vec<InstanceRecord>> {
        Ok(self
            .zone(project, zone)?
            .map(|z| z.instances.clone())
            .unwrap_or_default())
    }

    async fn list_machine_types(
        &self,
        project: &str,
        zone: &str,
    ) -> Result<Vec<MachineTypeRecord>> {
        self.catalog_requests.lock().push(zone.to_string());
        Ok(self
            .zone(project, zone)?
            .map(|z| z.machine_types.clone())
            .unwrap_or_default())
    }
}
