//! Reconciliation engine.
//!
//! Each usage profile claims at most one commitment with exactly the same
//! profile. Claimed commitments are removed first-come in input order; what
//! remains is idle capacity. Usage is tallied into a count map keyed by
//! profile value, then commitments are walked once, so the cost is linear
//! and the survivors keep their relative input order.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{ResourceProfile, UnmatchedCommitments};

/// Full outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Commitments no usage claimed.
    pub unmatched: UnmatchedCommitments,
    /// Number of commitment/usage pairs that matched.
    pub matched: usize,
    /// Usage profiles with no commitment left to claim.
    #[serde(rename = "uncoveredUsage")]
    pub uncovered_usage: usize,
}

/// Return the commitments left unmatched by `usage`.
pub fn reconcile(
    commitments: &[ResourceProfile],
    usage: &[ResourceProfile],
) -> Vec<ResourceProfile> {
    let mut demand = tally(usage);
    commitments
        .iter()
        .copied()
        .filter(|commitment| !claim(&mut demand, commitment))
        .collect()
}

/// Like [`reconcile`], also reporting match and uncovered-usage counts.
pub fn reconcile_detailed(
    commitments: &[ResourceProfile],
    usage: &[ResourceProfile],
) -> Reconciliation {
    let mut demand = tally(usage);
    let mut matched = 0;
    let mut unmatched = Vec::new();

    for commitment in commitments {
        if claim(&mut demand, commitment) {
            matched += 1;
        } else {
            unmatched.push(*commitment);
        }
    }

    Reconciliation {
        unmatched: unmatched.into(),
        matched,
        uncovered_usage: demand.values().sum(),
    }
}

fn tally(profiles: &[ResourceProfile]) -> HashMap<ResourceProfile, usize> {
    let mut counts = HashMap::with_capacity(profiles.len());
    for profile in profiles {
        *counts.entry(*profile).or_insert(0) += 1;
    }
    counts
}

/// Consume one unit of demand for `profile`, if any is left.
fn claim(demand: &mut HashMap<ResourceProfile, usize>, profile: &ResourceProfile) -> bool {
    match demand.get_mut(profile) {
        Some(remaining) if *remaining > 0 => {
            *remaining -= 1;
            true
        }
        _ => false,
    }
}
