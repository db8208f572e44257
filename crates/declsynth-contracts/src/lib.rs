//! Shared, version-pinned protocol identifiers.
//!
//! These constants are the single source of truth for schema/version strings that
//! appear in machine-readable I/O (diagnostic reports and batch manifests).
pub const DIAG_REPORT_SCHEMA_VERSION: &str = "declsynth.diag@0.1.0";
pub const MANIFEST_SCHEMA_VERSION: &str = "declsynth.manifest@0.1.0";
