//! Embedded array size sweep.
//!
//! Prints one CSV line per measurement on stdout and saves a JSON report.
//!
//! Run:       `cargo run --release --bin array-sweep`
//! Aggregate: `cargo run --release --bin array-sweep -- --mode aggregate --ceiling 100`
//! Dry run:   `cargo run --bin array-sweep -- --store memory --rng-seed 42`

use clap::Parser;
use embedded_array_benchmarks::config::{Cli, StoreKind};
use embedded_array_benchmarks::naming::TimestampNamer;
use embedded_array_benchmarks::recorder::ResultRecorder;
use embedded_array_benchmarks::runner::Runner;
use embedded_array_benchmarks::store::{DocumentStore, MemoryStore, MongoStore};
use embedded_array_benchmarks::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let outcome = match cli.store {
        StoreKind::Mongo => MongoStore::connect(&cli.uri).and_then(|store| sweep(&store, &cli)),
        StoreKind::Memory => sweep(&MemoryStore::new(), &cli),
    };

    if let Err(e) = outcome {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn sweep<S: DocumentStore>(store: &S, cli: &Cli) -> Result<()> {
    let config = cli.runner_config()?;
    let rng = match cli.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut recorder = ResultRecorder::new(&config, store.label());
    let mut runner = Runner::new(store, config, rng, TimestampNamer::new(&cli.prefix))?;

    let stdout = std::io::stdout();
    let report = runner.run(&mut stdout.lock())?;

    if !cli.no_save {
        recorder.record_report(&report);
        recorder.save_to(&cli.results_dir)?;
    }
    Ok(())
}
