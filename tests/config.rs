//! Command line parsing into runner settings.

use clap::Parser;
use embedded_array_benchmarks::config::{Cli, StoreKind};
use embedded_array_benchmarks::runner::{ReportingMode, AGGREGATE_DOCUMENTS_PER_SIZE};
use embedded_array_benchmarks::sweep::SeedPair;
use embedded_array_benchmarks::HarnessError;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("array-sweep").chain(args.iter().copied())).unwrap()
}

#[test]
fn defaults_match_the_per_document_run() {
    let cli = parse(&[]);
    assert_eq!(cli.store, StoreKind::Mongo);
    assert_eq!(cli.database, "testdb");

    let config = cli.runner_config().unwrap();
    assert_eq!(config.mode, ReportingMode::PerDocument);
    assert_eq!(config.ceiling, 10_000);
    assert_eq!(config.seed, SeedPair::ONE_TWO);
    assert_eq!(config.repetitions_per_size, 1);
    assert!(config.read_back);
    assert!(config.persist_retrieval_time);
    assert!(!config.delete_after_read);
    assert!(!config.collection_per_size);
}

#[test]
fn aggregate_mode_defaults() {
    let config = parse(&["--mode", "aggregate", "--ceiling", "100"])
        .runner_config()
        .unwrap();
    assert_eq!(config.mode, ReportingMode::Aggregate);
    assert_eq!(config.ceiling, 100);
    assert_eq!(config.repetitions_per_size, AGGREGATE_DOCUMENTS_PER_SIZE);
    assert!(config.collection_per_size);
    assert!(!config.persist_retrieval_time);
}

#[test]
fn flags_override_presets() {
    let config = parse(&[
        "--seed",
        "0,1",
        "--repetitions",
        "4",
        "--no-read-back",
        "--no-update",
        "--delete-after-read",
        "--collection-per-size",
        "--database",
        "bench",
    ])
    .runner_config()
    .unwrap();
    assert_eq!(config.seed, SeedPair::ZERO_ONE);
    assert_eq!(config.repetitions_per_size, 4);
    assert!(!config.read_back);
    assert!(!config.persist_retrieval_time);
    assert!(config.delete_after_read);
    assert!(config.collection_per_size);
    assert_eq!(config.database, "bench");
}

#[test]
fn memory_store_and_rng_seed() {
    let cli = parse(&["--store", "memory", "--rng-seed", "42", "--no-save"]);
    assert_eq!(cli.store, StoreKind::Memory);
    assert_eq!(cli.rng_seed, Some(42));
    assert!(cli.no_save);
}

#[test]
fn uri_flag_wins() {
    let cli = parse(&["--uri", "mongodb://db.internal:27018"]);
    assert_eq!(cli.uri, "mongodb://db.internal:27018");
}

#[test]
fn bad_values_are_rejected_by_the_parser() {
    let args = |extra: &[&'static str]| {
        Cli::try_parse_from(std::iter::once("array-sweep").chain(extra.iter().copied()))
    };
    assert!(args(&["--seed", "0,0"]).is_err());
    assert!(args(&["--seed", "one,two"]).is_err());
    assert!(args(&["--mode", "bulk"]).is_err());
    assert!(args(&["--store", "postgres"]).is_err());
    assert!(args(&["--ceiling", "-5"]).is_err());
}

#[test]
fn zero_repetitions_is_a_config_error() {
    let result = parse(&["--repetitions", "0"]).runner_config();
    assert!(matches!(result, Err(HarnessError::Config(_))));

    let result = parse(&["--mode", "aggregate", "--read-samples", "0"]).runner_config();
    assert!(matches!(result, Err(HarnessError::Config(_))));
}

#[test]
fn empty_prefix_is_a_config_error() {
    let result = parse(&["--prefix", ""]).runner_config();
    assert!(matches!(result, Err(HarnessError::Config(_))));
}
