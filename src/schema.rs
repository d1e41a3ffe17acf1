//! JSON result report types.
//!
//! `array-sweep` writes one [`BenchmarkReport`] per run and `bench-compare`
//! reads two of them back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bumped whenever a field changes meaning.
pub const SCHEMA_VERSION: u32 = 1;

/// Top-level report written to a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Metadata about this run (hardware, git, timestamp).
    pub metadata: RunMetadata,
    /// One entry per emitted CSV row.
    pub results: Vec<BenchmarkResult>,
}

/// Captured when the recorder is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// RFC 3339 UTC timestamp of the run start.
    pub timestamp: String,
    /// Short git commit hash, absent outside a git checkout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    /// Git branch name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Whether the working tree had uncommitted changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_dirty: Option<bool>,
    /// Which store was measured ("mongodb" or "memory").
    pub storage: String,
    /// Crate version of the harness that wrote the report.
    pub harness_version: String,
    /// Hardware information.
    pub hardware: HardwareInfo,
}

/// Hardware information for reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareInfo {
    /// CPU model string.
    pub cpu: String,
    /// Number of logical cores.
    pub cores: usize,
    /// Total RAM in GB.
    pub ram_gb: u64,
    /// Operating system.
    pub os: String,
    /// CPU architecture.
    pub arch: String,
}

/// A single measurement: one document, or one sweep value in aggregate mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// e.g. "embedded-array/aggregate/n=89".
    pub benchmark: String,
    /// The reporting mode, "per-document" or "aggregate".
    pub category: String,
    /// Run settings plus the row's object count and collection.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    /// Measured metrics.
    pub metrics: BenchmarkMetrics,
}

/// Metrics collected for one row.
///
/// All fields are optional. Fields that don't apply to a mode are left out
/// of the JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// BSON size of the document, or of all documents in aggregate mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Mean BSON size per document (aggregate mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_size_bytes: Option<f64>,
    /// Read-back time; the mean bulk read in aggregate mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_ms: Option<f64>,
    /// Time spent measuring the BSON encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialize_ns: Option<u64>,
    /// Insert latency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_ns: Option<u64>,
    /// Fastest bulk read sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_retrieval_ns: Option<u64>,
    /// Slowest bulk read sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retrieval_ns: Option<u64>,
    /// Documents behind the row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<u64>,
    /// Bulk reads timed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<u64>,
}
