//! Reconciliation core — resource profiles, shape resolution, commitment
//! aggregation and the commitment/usage matching engine.
//!
//! Everything here is pure and synchronous. Fetching catalogs, commitments
//! and instances is the collector's job.

pub mod aggregate;
pub mod engine;
pub mod resolver;
pub mod types;

pub use aggregate::{aggregate, ResourceKind};
pub use engine::{reconcile, reconcile_detailed, Reconciliation};
pub use resolver::{resolve, ShapeCatalog};
pub use types::*;
