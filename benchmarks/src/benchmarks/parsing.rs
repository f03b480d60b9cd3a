//! Scene parsing benchmarks

use super::fixtures::scene_text;
use crate::{run_benchmark_with_throughput, BenchmarkResult};
use scenebridge_core::parse_scene;

const CATEGORY: &str = "Parsing";
const ITERATIONS: u32 = 100;

pub fn run_all() -> Vec<BenchmarkResult> {
    vec![bench_parse(100), bench_parse(1000), bench_parse(10_000)]
}

fn bench_parse(nodes: usize) -> BenchmarkResult {
    let text = scene_text(nodes);
    let bytes = text.len() as u64;
    let iterations = if nodes > 1000 { ITERATIONS / 10 } else { ITERATIONS };

    run_benchmark_with_throughput(&format!("Parse scene ({} nodes)", nodes), CATEGORY, iterations, bytes, || {
        let document = parse_scene(&text, 2).unwrap();
        std::hint::black_box(document);
    })
}
