//! Commitment aggregation — folds line items into one resource profile.

use commitaudit_core::{Error, Result};

use crate::types::{CommitmentLineItem, ResourceProfile};

/// Resource kinds a commitment line item may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Compute,
    Memory,
}

impl std::str::FromStr for ResourceKind {
    type Err = Error;

    /// `VCPU` is how the compute API spells compute commitments.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "COMPUTE" | "VCPU" => Ok(Self::Compute),
            "MEMORY" => Ok(Self::Memory),
            other => Err(Error::UnknownResourceKind(other.to_string())),
        }
    }
}

/// Fold a commitment's line items into a single profile.
///
/// Later items of the same kind overwrite earlier ones; a missing kind
/// leaves its field at zero. Any unknown kind fails the whole commitment.
pub fn aggregate(line_items: &[CommitmentLineItem]) -> Result<ResourceProfile> {
    let mut profile = ResourceProfile::default();
    for item in line_items {
        match item.kind.parse::<ResourceKind>()? {
            ResourceKind::Compute => profile.compute_units = item.amount,
            ResourceKind::Memory => profile.memory_mb = item.amount,
        }
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: &str, amount: u64) -> CommitmentLineItem {
        CommitmentLineItem::new(kind, amount)
    }

    #[test]
    fn test_compute_and_memory() {
        let profile = aggregate(&[item("COMPUTE", 8), item("MEMORY", 16384)]).unwrap();
        assert_eq!(profile, ResourceProfile::new(8, 16384));
    }

    #[test]
    fn test_vcpu_alias() {
        let profile = aggregate(&[item("MEMORY", 4096), item("VCPU", 2)]).unwrap();
        assert_eq!(profile, ResourceProfile::new(2, 4096));
    }

    #[test]
    fn test_unknown_kind_fails() {
        let err = aggregate(&[item("COMPUTE", 8), item("STORAGE", 100)]).unwrap_err();
        assert!(matches!(err, Error::UnknownResourceKind(ref k) if k == "STORAGE"));
    }

    #[test]
    fn test_kind_is_case_sensitive() {
        assert!(aggregate(&[item("memory", 1024)]).is_err());
    }

    #[test]
    fn test_missing_kind_defaults_to_zero() {
        assert_eq!(
            aggregate(&[item("MEMORY", 2048)]).unwrap(),
            ResourceProfile::new(0, 2048)
        );
        assert_eq!(aggregate(&[]).unwrap(), ResourceProfile::default());
    }

    #[test]
    fn test_later_item_overwrites() {
        let profile = aggregate(&[item("VCPU", 4), item("MEMORY", 1), item("VCPU", 16)]).unwrap();
        assert_eq!(profile, ResourceProfile::new(16, 1));
    }
}
