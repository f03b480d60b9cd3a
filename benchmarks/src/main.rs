//! SceneBridge Benchmark Runner

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Instant;

mod benchmarks;

/// Timing of one benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub name: String,
    pub category: String,
    pub iterations: u32,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub std_dev_ms: f64,
    pub throughput: Option<Throughput>,
}

/// Work done per second at the mean time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Throughput {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub timestamp: String,
    pub version: String,
    pub system_info: SystemInfo,
    pub results: Vec<BenchmarkResult>,
    pub summary: BenchmarkSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub total_benchmarks: usize,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub benchmark_count: usize,
    pub total_time_ms: f64,
}

/// Time `f` once to warm up, then `iterations` times
fn sample<F: FnMut()>(iterations: u32, mut f: F) -> Vec<f64> {
    f();
    (0..iterations.max(1))
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed().as_secs_f64() * 1000.0
        })
        .collect()
}

pub fn run_benchmark<F>(name: &str, category: &str, iterations: u32, f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut samples = sample(iterations, f);
    samples.sort_by(f64::total_cmp);

    let count = samples.len() as f64;
    let mean_ms = samples.iter().sum::<f64>() / count;
    let variance = samples.iter().map(|t| (t - mean_ms).powi(2)).sum::<f64>() / count;
    let middle = samples.len() / 2;
    let median_ms = if samples.len() % 2 == 0 {
        (samples[middle - 1] + samples[middle]) / 2.0
    } else {
        samples[middle]
    };

    BenchmarkResult {
        name: name.to_string(),
        category: category.to_string(),
        iterations: samples.len() as u32,
        mean_ms,
        median_ms,
        min_ms: samples[0],
        max_ms: samples[samples.len() - 1],
        std_dev_ms: variance.sqrt(),
        throughput: None,
    }
}

pub fn run_benchmark_with_throughput<F>(name: &str, category: &str, iterations: u32, bytes: u64, f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut result = run_benchmark(name, category, iterations, f);
    let per_second = bytes as f64 * 1000.0 / result.mean_ms;
    result.throughput = Some(Throughput { value: per_second / (1024.0 * 1024.0), unit: "MB/s".to_string() });
    result
}

/// Like [`run_benchmark`], reporting `elements` of `unit` handled per second
pub fn run_benchmark_with_rate<F>(name: &str, category: &str, iterations: u32, elements: u64, unit: &str, f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut result = run_benchmark(name, category, iterations, f);
    result.throughput = Some(Throughput { value: elements as f64 * 1000.0 / result.mean_ms, unit: format!("{}/s", unit) });
    result
}

/// Suites in run order: (name, runner)
const SUITES: &[(&str, fn() -> Vec<BenchmarkResult>)] = &[
    ("parsing", benchmarks::parsing::run_all),
    ("serialization", benchmarks::serialization::run_all),
    ("export", benchmarks::export::run_all),
];

fn print_report(report: &BenchmarkReport) {
    println!("\n======== SceneBridge Benchmark Report ========");
    println!("Version: {} | {} ({})", report.version, report.system_info.os, report.system_info.arch);
    println!();
    let mut current_cat = String::new();
    for r in &report.results {
        if r.category != current_cat {
            current_cat = r.category.clone();
            println!("--- {} ---", current_cat);
        }
        print!("  {:<48} {:>9.3}ms (median {:.3}, ±{:.3})", r.name, r.mean_ms, r.median_ms, r.std_dev_ms);
        if let Some(ref tp) = r.throughput {
            print!(" [{:.2} {}]", tp.value, tp.unit);
        }
        println!();
    }
    println!();
    for category in &report.summary.categories {
        println!("{:<16} {} benchmarks, {:.3}ms total", category.name, category.benchmark_count, category.total_time_ms);
    }
    println!("\nTotal: {} benchmarks", report.summary.total_benchmarks);
}

fn summarize(results: &[BenchmarkResult]) -> BenchmarkSummary {
    // Categories keep the order they were run in
    let mut categories: Vec<CategorySummary> = Vec::new();
    for r in results {
        match categories.iter_mut().find(|c| c.name == r.category) {
            Some(summary) => {
                summary.benchmark_count += 1;
                summary.total_time_ms += r.mean_ms;
            }
            None => categories.push(CategorySummary { name: r.category.clone(), benchmark_count: 1, total_time_ms: r.mean_ms }),
        }
    }
    BenchmarkSummary { total_benchmarks: results.len(), categories }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let json_only = args.iter().any(|a| a == "--json-only");
    let only = args.iter().position(|a| a == "--only").and_then(|i| args.get(i + 1));

    if let Some(name) = only {
        if !SUITES.iter().any(|(suite, _)| *suite == name.as_str()) {
            let names: Vec<&str> = SUITES.iter().map(|(suite, _)| *suite).collect();
            bail!("Unknown suite '{}' (expected one of {})", name, names.join(", "));
        }
    }

    println!("Running SceneBridge benchmarks...\n");
    let mut results = Vec::new();
    for (name, run) in SUITES {
        if only.is_some_and(|only| only.as_str() != *name) {
            continue;
        }
        println!("{} benchmarks...", name);
        results.extend(run());
    }

    let report = BenchmarkReport {
        timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        system_info: SystemInfo { os: std::env::consts::OS.to_string(), arch: std::env::consts::ARCH.to_string() },
        summary: summarize(&results),
        results,
    };

    if json_only {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        fs::create_dir_all("benchmarks/results")?;
        let ts = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();
        fs::write(format!("benchmarks/results/benchmark-{}.json", ts), serde_json::to_string_pretty(&report)?)?;
        println!("\nResults saved to benchmarks/results/");
    }
    Ok(())
}
