//! Reconciliation value types.

use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::resolver::{resolve, ShapeCatalog};

/// Commitment status that makes a commitment eligible for reconciliation.
pub const ACTIVE_STATUS: &str = "ACTIVE";

/// Whether a commitment status makes it eligible for reconciliation.
pub fn is_active_status(status: &str) -> bool {
    status == ACTIVE_STATUS
}

/// Instance status that makes an instance count as usage.
pub const RUNNING_STATUS: &str = "RUNNING";

/// A sized bundle of capacity: compute units (vCPUs) and memory in MB.
///
/// Equality is exact on both fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceProfile {
    #[serde(rename = "computeUnits")]
    pub compute_units: u64,
    #[serde(rename = "memoryMb")]
    pub memory_mb: u64,
}

impl ResourceProfile {
    pub const fn new(compute_units: u64, memory_mb: u64) -> Self {
        Self {
            compute_units,
            memory_mb,
        }
    }
}

impl std::fmt::Display for ResourceProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vCPU / {} MB", self.compute_units, self.memory_mb)
    }
}

/// One resource line of a commitment, as reported by the API.
///
/// `kind` stays a raw string so unknown kinds surface as errors during
/// aggregation instead of failing deserialization of the whole feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentLineItem {
    pub kind: String,
    pub amount: u64,
}

impl CommitmentLineItem {
    pub fn new(kind: impl Into<String>, amount: u64) -> Self {
        Self {
            kind: kind.into(),
            amount,
        }
    }
}

/// A named reservation with its folded resource profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commitment {
    pub name: String,
    pub status: String,
    pub profile: ResourceProfile,
}

impl Commitment {
    /// Build a commitment by aggregating its line items.
    pub fn from_line_items(
        name: impl Into<String>,
        status: impl Into<String>,
        line_items: &[CommitmentLineItem],
    ) -> commitaudit_core::Result<Self> {
        Ok(Self {
            name: name.into(),
            status: status.into(),
            profile: aggregate(line_items)?,
        })
    }

    /// Only active commitments take part in reconciliation.
    pub fn is_active(&self) -> bool {
        is_active_status(&self.status)
    }
}

/// A running instance's resolved resource profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceUsage {
    pub name: String,
    pub shape: String,
    pub profile: ResourceProfile,
}

impl InstanceUsage {
    /// Resolve an instance's profile from its shape identifier.
    pub fn resolve(
        name: impl Into<String>,
        shape: impl Into<String>,
        catalog: &ShapeCatalog,
    ) -> commitaudit_core::Result<Self> {
        let shape = shape.into();
        let profile = resolve(&shape, catalog)?;
        Ok(Self {
            name: name.into(),
            shape,
            profile,
        })
    }
}

/// Commitments left unclaimed after reconciliation, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnmatchedCommitments {
    profiles: Vec<ResourceProfile>,
    count: usize,
}

impl UnmatchedCommitments {
    pub fn profiles(&self) -> &[ResourceProfile] {
        &self.profiles
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sum of idle compute units, saturating at `u64::MAX`.
    pub fn total_compute_units(&self) -> u64 {
        self.profiles
            .iter()
            .map(|p| p.compute_units)
            .fold(0u64, u64::saturating_add)
    }

    /// Sum of idle memory, saturating at `u64::MAX`.
    pub fn total_memory_mb(&self) -> u64 {
        self.profiles
            .iter()
            .map(|p| p.memory_mb)
            .fold(0u64, u64::saturating_add)
    }
}

impl From<Vec<ResourceProfile>> for UnmatchedCommitments {
    fn from(profiles: Vec<ResourceProfile>) -> Self {
        let count = profiles.len();
        Self { profiles, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_equality_is_exact() {
        assert_eq!(ResourceProfile::new(4, 16384), ResourceProfile::new(4, 16384));
        assert_ne!(ResourceProfile::new(4, 16384), ResourceProfile::new(4, 16383));
        assert_ne!(ResourceProfile::new(4, 16384), ResourceProfile::new(5, 16384));
    }

    #[test]
    fn test_profile_json_shape() {
        let json = serde_json::to_value(ResourceProfile::new(2, 4096)).unwrap();
        assert_eq!(json, serde_json::json!({"computeUnits": 2, "memoryMb": 4096}));
    }

    #[test]
    fn test_commitment_from_line_items() {
        let c = Commitment::from_line_items(
            "cud-1",
            "ACTIVE",
            &[
                CommitmentLineItem::new("VCPU", 8),
                CommitmentLineItem::new("MEMORY", 32768),
            ],
        )
        .unwrap();
        assert!(c.is_active());
        assert_eq!(c.profile, ResourceProfile::new(8, 32768));

        let expired = Commitment { status: "EXPIRED".into(), ..c };
        assert!(!expired.is_active());
    }

    #[test]
    fn test_instance_usage_resolve() {
        let usage = InstanceUsage::resolve("web-1", "custom-2-4096", &ShapeCatalog::default()).unwrap();
        assert_eq!(usage.profile, ResourceProfile::new(2, 4096));
        assert_eq!(usage.shape, "custom-2-4096");
    }

    #[test]
    fn test_unmatched_count_tracks_len() {
        let unmatched = UnmatchedCommitments::from(vec![
            ResourceProfile::new(2, 4096),
            ResourceProfile::new(4, 8192),
        ]);
        assert_eq!(unmatched.count(), unmatched.profiles().len());
        assert_eq!(unmatched.total_compute_units(), 6);
        assert_eq!(unmatched.total_memory_mb(), 12288);
        assert!(UnmatchedCommitments::default().is_empty());
    }

    #[test]
    fn test_totals_saturate_on_large_amounts() {
        let unmatched = UnmatchedCommitments::from(vec![
            ResourceProfile::new(u64::MAX, 1),
            ResourceProfile::new(u64::MAX, u64::MAX),
        ]);
        assert_eq!(unmatched.total_compute_units(), u64::MAX);
        assert_eq!(unmatched.total_memory_mb(), u64::MAX);
    }

    #[test]
    fn test_active_status() {
        assert!(is_active_status("ACTIVE"));
        assert!(!is_active_status("EXPIRED"));
        assert!(!is_active_status("active"));
    }
}
