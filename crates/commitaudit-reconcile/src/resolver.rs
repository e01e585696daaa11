//! Shape resolution: catalog lookup with a `family-cpus-memory` fallback.

use std::collections::HashMap;

use commitaudit_core::{Error, Result};
use tracing::debug;

use crate::types::ResourceProfile;

/// Authoritative shape identifier → profile table for one zone.
///
/// Filled by the caller; resolution only reads it.
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    shapes: HashMap<String, ResourceProfile>,
}

impl ShapeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, shape: impl Into<String>, profile: ResourceProfile) {
        self.shapes.insert(shape.into(), profile);
    }

    pub fn get(&self, shape: &str) -> Option<ResourceProfile> {
        self.shapes.get(shape).copied()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl FromIterator<(String, ResourceProfile)> for ShapeCatalog {
    fn from_iter<I: IntoIterator<Item = (String, ResourceProfile)>>(iter: I) -> Self {
        Self {
            shapes: iter.into_iter().collect(),
        }
    }
}

/// Resolve a shape identifier to its resource profile.
///
/// Catalog entries win. Shapes missing from the catalog must be exactly
/// three dash-separated segments, `family-cpus-memoryMb`.
pub fn resolve(shape: &str, catalog: &ShapeCatalog) -> Result<ResourceProfile> {
    if let Some(profile) = catalog.get(shape) {
        return Ok(profile);
    }

    debug!("Shape {} not in catalog, parsing identifier", shape);
    parse_shape(shape)
}

fn parse_shape(shape: &str) -> Result<ResourceProfile> {
    let parts: Vec<&str> = shape.split('-').collect();
    let [_family, cpus, memory] = parts.as_slice() else {
        return Err(Error::MalformedShapeIdentifier(shape.to_string()));
    };

    let compute_units = cpus
        .parse::<u64>()
        .map_err(|_| Error::MalformedShapeIdentifier(shape.to_string()))?;
    let memory_mb = memory
        .parse::<u64>()
        .map_err(|_| Error::MalformedShapeIdentifier(shape.to_string()))?;

    Ok(ResourceProfile::new(compute_units, memory_mb))
}
