//! commitaudit core — error type and audit configuration.

pub mod config;
pub mod error;

pub use config::{AuditConfig, ErrorPolicy, OutputFormat};
pub use error::{Error, Result};
