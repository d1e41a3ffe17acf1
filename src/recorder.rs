//! Result recorder for saving sweep results to JSON files.
//!
//! Creates JSON files in the `results/` directory following the schema
//! defined in [`crate::schema`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use crate::runner::{duration_ms, RunnerConfig, SweepReport, SweepRow};
use crate::schema::*;

/// Accumulates sweep rows and writes them to a JSON file.
pub struct ResultRecorder {
    category: String,
    repeated: bool,
    parameters: HashMap<String, serde_json::Value>,
    metadata: RunMetadata,
    results: Vec<BenchmarkResult>,
    /// How often each base benchmark name has been recorded.
    names: HashMap<String, usize>,
}

impl ResultRecorder {
    /// Create a recorder for a run with `config` against `storage`.
    ///
    /// Captures metadata (hardware, git, timestamp) at construction time.
    pub fn new(config: &RunnerConfig, storage: &str) -> Self {
        let mut parameters = HashMap::new();
        parameters.insert("database".into(), serde_json::json!(config.database));
        parameters.insert("seed".into(), serde_json::json!(config.seed.to_string()));
        parameters.insert("ceiling".into(), serde_json::json!(config.ceiling));
        parameters.insert(
            "repetitions_per_size".into(),
            serde_json::json!(config.repetitions_per_size),
        );
        parameters.insert("read_back".into(), serde_json::json!(config.read_back));
        parameters.insert(
            "delete_after_read".into(),
            serde_json::json!(config.delete_after_read),
        );

        Self {
            category: config.mode.label().to_string(),
            repeated: config.repetitions_per_size > 1,
            parameters,
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                git_commit: git_short_commit(),
                git_branch: git_branch(),
                git_dirty: git_is_dirty(),
                storage: storage.to_string(),
                harness_version: env!("CARGO_PKG_VERSION").to_string(),
                hardware: capture_hardware(),
            },
            results: Vec::new(),
            names: HashMap::new(),
        }
    }

    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    pub fn record_report(&mut self, report: &SweepReport) {
        for row in &report.rows {
            self.record_row(row);
        }
    }

    /// Convert one sweep row into a result.
    ///
    /// A sweep that repeats a size (seed `0,1`) records the later passes as
    /// `.../pass=2`, `.../pass=3`, so every benchmark name stays unique.
    pub fn record_row(&mut self, row: &SweepRow) {
        let mut parameters = self.parameters.clone();
        parameters.insert("object_count".into(), serde_json::json!(row.object_count()));

        let (benchmark, metrics) = match row {
            SweepRow::Document(r) => {
                parameters.insert("collection".into(), serde_json::json!(r.collection));
                parameters.insert("insertion_time".into(), serde_json::json!(r.insertion_time));
                let mut name = format!("embedded-array/{}/n={}", self.category, r.object_count);
                if self.repeated {
                    name.push_str(&format!("/doc={}", r.repetition));
                }
                let metrics = BenchmarkMetrics {
                    size_bytes: Some(r.size_in_bytes as u64),
                    retrieval_ms: r.retrieval.map(duration_ms),
                    serialize_ns: Some(r.serialize.as_nanos() as u64),
                    insert_ns: Some(r.insert.as_nanos() as u64),
                    documents: Some(1),
                    ..Default::default()
                };
                (name, metrics)
            }
            SweepRow::Aggregate(r) => {
                parameters.insert("collection".into(), serde_json::json!(r.collection));
                let metrics = BenchmarkMetrics {
                    size_bytes: Some(r.total_size_bytes),
                    avg_size_bytes: Some(r.avg_size_in_bytes),
                    retrieval_ms: Some(duration_ms(r.retrieval)),
                    serialize_ns: Some(r.avg_serialize.as_nanos() as u64),
                    insert_ns: Some(r.avg_insert.as_nanos() as u64),
                    min_retrieval_ns: Some(r.min_retrieval.as_nanos() as u64),
                    max_retrieval_ns: Some(r.max_retrieval.as_nanos() as u64),
                    documents: Some(r.documents as u64),
                    samples: Some(r.samples as u64),
                };
                (
                    format!("embedded-array/{}/n={}", self.category, r.object_count),
                    metrics,
                )
            }
        };

        let passes = self.names.entry(benchmark.clone()).or_insert(0);
        *passes += 1;
        let benchmark = if *passes == 1 {
            benchmark
        } else {
            format!("{}/pass={}", benchmark, passes)
        };

        self.results.push(BenchmarkResult {
            benchmark,
            category: self.category.clone(),
            parameters,
            metrics,
        });
    }

    /// Write all accumulated results to a JSON file in `results/`.
    pub fn save(self) -> io::Result<PathBuf> {
        self.save_to("results")
    }

    /// Write all accumulated results to a JSON file in `dir`.
    ///
    /// File naming: `<category>-<timestamp>-<commit>.json`
    pub fn save_to(self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let commit = self
            .metadata
            .git_commit
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        // Colons are not allowed in Windows file names
        let ts = self.metadata.timestamp.replace(':', "-");
        let filename = format!("{}-{}-{}.json", self.category, ts, commit);

        let report = BenchmarkReport {
            schema_version: SCHEMA_VERSION,
            metadata: self.metadata,
            results: self.results,
        };

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(filename);

        let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
        std::fs::write(&path, json)?;

        log::info!("results saved to {}", path.display());
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Metadata capture helpers
// ---------------------------------------------------------------------------

fn git_output(args: &[&str]) -> Option<Vec<u8>> {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| o.stdout)
}

fn git_short_commit() -> Option<String> {
    git_output(&["rev-parse", "--short", "HEAD"])
        .map(|out| String::from_utf8_lossy(&out).trim().to_string())
}

fn git_branch() -> Option<String> {
    git_output(&["rev-parse", "--abbrev-ref", "HEAD"])
        .map(|out| String::from_utf8_lossy(&out).trim().to_string())
}

fn git_is_dirty() -> Option<bool> {
    git_output(&["status", "--porcelain"]).map(|out| !out.is_empty())
}

fn read_cpu_model() -> String {
    std::fs::read_to_string("/proc/cpuinfo")
        .ok()
        .and_then(|info| {
            info.lines()
                .find(|l| l.starts_with("model name"))
                .and_then(|l| l.split_once(':'))
                .map(|(_, model)| model.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn read_total_ram_gb() -> u64 {
    std::fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|info| {
            info.lines()
                .find(|l| l.starts_with("MemTotal:"))
                .and_then(|l| l.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<u64>().ok())
        })
        .map_or(0, |kb| kb / (1024 * 1024))
}

fn capture_hardware() -> HardwareInfo {
    HardwareInfo {
        cpu: read_cpu_model(),
        cores: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0),
        ram_gb: read_total_ram_gb(),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    }
}
