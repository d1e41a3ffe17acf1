//! Command line and environment configuration for `array-sweep`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::{HarnessError, Result};
use crate::naming::DEFAULT_PREFIX;
use crate::runner::{ReportingMode, RunnerConfig, DEFAULT_CEILING, DEFAULT_DATABASE};
use crate::sweep::SeedPair;

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// A MongoDB deployment reached through `--uri`.
    Mongo,
    /// In-process store; nothing leaves the machine.
    Memory,
}

/// Measure how embedded array size affects BSON size and write/read latency.
#[derive(Debug, Clone, Parser)]
#[command(name = "array-sweep", version)]
pub struct Cli {
    /// MongoDB connection string.
    #[arg(long, env = "MONGODB_URI", default_value = DEFAULT_URI)]
    pub uri: String,

    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub database: String,

    #[arg(long, value_enum, default_value = "mongo")]
    pub store: StoreKind,

    #[arg(long, value_enum, default_value = "per-document")]
    pub mode: ReportingMode,

    /// Largest array size in the sweep.
    #[arg(long, default_value_t = DEFAULT_CEILING)]
    pub ceiling: usize,

    /// First two values of the Fibonacci sweep, e.g. `1,2` or `0,1`.
    #[arg(long, default_value = "1,2")]
    pub seed: SeedPair,

    /// Documents per array size [default: 1, or 35 in aggregate mode].
    #[arg(long)]
    pub repetitions: Option<usize>,

    /// Bulk reads timed per array size in aggregate mode.
    #[arg(long, default_value_t = 1)]
    pub read_samples: usize,

    #[arg(long)]
    pub no_read_back: bool,

    /// Don't write the retrieval time back onto each document.
    #[arg(long)]
    pub no_update: bool,

    #[arg(long)]
    pub delete_after_read: bool,

    /// One collection per array size. Always on in aggregate mode.
    #[arg(long)]
    pub collection_per_size: bool,

    /// Collection name prefix.
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Seed the random source for reproducible documents.
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Skip writing the JSON report.
    #[arg(long)]
    pub no_save: bool,

    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,
}

impl Cli {
    /// Validated runner settings for these arguments.
    pub fn runner_config(&self) -> Result<RunnerConfig> {
        let preset = match self.mode {
            ReportingMode::PerDocument => RunnerConfig::default(),
            ReportingMode::Aggregate => RunnerConfig::aggregate(),
        };
        let config = RunnerConfig {
            database: self.database.clone(),
            seed: self.seed,
            ceiling: self.ceiling,
            repetitions_per_size: self.repetitions.unwrap_or(preset.repetitions_per_size),
            mode: self.mode,
            read_back: !self.no_read_back,
            persist_retrieval_time: preset.persist_retrieval_time && !self.no_update,
            delete_after_read: self.delete_after_read,
            collection_per_size: preset.collection_per_size || self.collection_per_size,
            read_samples: self.read_samples,
        };
        config.validate()?;
        if self.prefix.is_empty() {
            return Err(HarnessError::Config("collection prefix is empty".into()));
        }
        Ok(config)
    }
}
