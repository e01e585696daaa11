//! Collection: walks projects, regions and zones through a [`ComputeApi`],
//! feeds the reconciliation core and assembles the audit report.
//!
//! Two API sources ship here: the live GCP compute REST API and JSON
//! snapshot files for offline audits.

pub mod api;
pub mod collector;
pub mod gcp;
pub mod report;
pub mod snapshot;

pub use api::*;
pub use collector::Collector;
pub use gcp::GcpComputeClient;
pub use report::{AuditIssue, AuditReport, RegionReport};
pub use snapshot::{Snapshot, SnapshotApi};
