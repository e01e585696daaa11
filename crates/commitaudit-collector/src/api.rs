//! Compute API boundary and its wire records.

use commitaudit_core::Result;
use commitaudit_reconcile::{CommitmentLineItem, ResourceProfile};
use serde::{Deserialize, Deserializer, Serialize};

/// Read-only view of the compute API the audit needs.
#[allow(async_fn_in_trait)]
pub trait ComputeApi {
    /// All regions of a project.
    async fn list_regions(&self, project: &str) -> Result<Vec<Region>>;

    /// All commitments in a region, whatever their status.
    async fn list_commitments(&self, project: &str, region: &str)
        -> Result<Vec<CommitmentRecord>>;

    /// All instances in a zone, whatever their status.
    async fn list_instances(&self, project: &str, zone: &str) -> Result<Vec<InstanceRecord>>;

    /// The zone's machine type catalog.
    async fn list_machine_types(&self, project: &str, zone: &str)
        -> Result<Vec<MachineTypeRecord>>;
}

/// One page of a list call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    /// Zone URLs (or bare zone names).
    #[serde(default)]
    pub zones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub resources: Vec<ResourceCommitment>,
}

impl CommitmentRecord {
    pub fn line_items(&self) -> Vec<CommitmentLineItem> {
        self.resources
            .iter()
            .map(|r| CommitmentLineItem::new(r.kind.clone(), r.amount))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCommitment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    /// Machine type URL (or bare machine type name).
    #[serde(default)]
    pub machine_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineTypeRecord {
    pub name: String,
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub guest_cpus: u64,
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub memory_mb: u64,
}

impl MachineTypeRecord {
    pub fn profile(&self) -> ResourceProfile {
        ResourceProfile::new(self.guest_cpus, self.memory_mb)
    }
}

/// int64 fields arrive as JSON strings; int32 fields as numbers.
fn u64_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// `.../zones/us-central1-a` → `us-central1-a`.
pub fn zone_name(zone_url: &str) -> &str {
    last_segment_after(zone_url, "/zones/")
}

/// `.../machineTypes/n1-standard-4` → `n1-standard-4`.
pub fn machine_type_name(machine_type_url: &str) -> &str {
    last_segment_after(machine_type_url, "/machineTypes/")
}

fn last_segment_after<'a>(url: &'a str, marker: &str) -> &'a str {
    url.rsplit_once(marker).map_or(url, |(_, name)| name)
}
