//! Benchmark comparison tool.
//!
//! Compares two JSON result files and prints a table of retrieval time and
//! document size deltas for every benchmark present in both.
//!
//! Usage: `cargo run --bin bench-compare -- <baseline.json> <candidate.json>`

use embedded_array_benchmarks::schema::{BenchmarkMetrics, BenchmarkReport, BenchmarkResult};
use std::collections::HashMap;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <baseline.json> <candidate.json>", args[0]);
        std::process::exit(1);
    }

    let baseline = load_report(&args[1]);
    let candidate = load_report(&args[2]);

    let base_map: HashMap<&str, &BenchmarkResult> = baseline
        .results
        .iter()
        .map(|r| (r.benchmark.as_str(), r))
        .collect();

    eprintln!(
        "Baseline: {} ({}, {})",
        args[1], baseline.metadata.timestamp, baseline.metadata.storage
    );
    eprintln!(
        "Candidate: {} ({}, {})",
        args[2], candidate.metadata.timestamp, candidate.metadata.storage
    );
    eprintln!();

    println!(
        "{:<40} | {:>11} | {:>11} | {:>16} | {:>10}",
        "Benchmark", "Base ms", "New ms", "Delta", "Size delta"
    );
    println!("{}", "-".repeat(100));

    let mut matched = 0u32;
    let mut only_cand = 0u32;

    for cand in &candidate.results {
        match base_map.get(cand.benchmark.as_str()) {
            Some(base) => {
                matched += 1;
                println!(
                    "{}",
                    comparison_line(&cand.benchmark, &base.metrics, &cand.metrics)
                );
            }
            None => only_cand += 1,
        }
    }

    let cand_names: Vec<&str> = candidate
        .results
        .iter()
        .map(|r| r.benchmark.as_str())
        .collect();
    let only_base = baseline
        .results
        .iter()
        .filter(|r| !cand_names.contains(&r.benchmark.as_str()))
        .count();

    println!("{}", "-".repeat(100));
    println!(
        "Compared: {} | Baseline only: {} | Candidate only: {}",
        matched, only_base, only_cand
    );
}

fn load_report(path: &str) -> BenchmarkReport {
    let contents = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    });
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        eprintln!("Error parsing {}: {}", path, e);
        std::process::exit(1);
    })
}

/// One table row. Runs without read-back have no retrieval time, so only
/// the size delta is shown for them.
fn comparison_line(name: &str, base: &BenchmarkMetrics, cand: &BenchmarkMetrics) -> String {
    let size_delta = match (size_of(base), size_of(cand)) {
        (Some(b), Some(c)) => format!("{:+.1}%", percent_delta(b, c)),
        _ => "-".to_string(),
    };

    let (Some(base_ms), Some(cand_ms)) = (base.retrieval_ms, cand.retrieval_ms) else {
        return format!(
            "{:<40} | {:>11} | {:>11} | {:>16} | {:>10}",
            name, "-", "-", "-", size_delta,
        );
    };
    let delta_pct = percent_delta(base_ms, cand_ms);
    // Lower retrieval time is better
    let hint = if delta_pct < -1.0 {
        "faster"
    } else if delta_pct > 1.0 {
        "slower"
    } else {
        "~same"
    };

    format!(
        "{:<40} | {:>11.3} | {:>11.3} | {:>+7.1}% ({:>6}) | {:>10}",
        name, base_ms, cand_ms, delta_pct, hint, size_delta,
    )
}

fn size_of(m: &BenchmarkMetrics) -> Option<f64> {
    m.avg_size_bytes.or(m.size_bytes.map(|s| s as f64))
}

fn percent_delta(base: f64, cand: f64) -> f64 {
    if base > 0.0 {
        ((cand - base) / base) * 100.0
    } else {
        0.0
    }
}
