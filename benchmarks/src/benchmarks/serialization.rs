//! Serialization benchmarks

use super::fixtures::scene_text;
use crate::{run_benchmark, run_benchmark_with_rate, run_benchmark_with_throughput, BenchmarkResult};
use scenebridge_core::serializer::ordered_nodes;
use scenebridge_core::{parse_scene, serialize};

const CATEGORY: &str = "Serialization";
const ITERATIONS: u32 = 100;

pub fn run_all() -> Vec<BenchmarkResult> {
    vec![
        bench_node_order(1000),
        bench_serialize(1000),
        bench_serialize(10_000),
        bench_round_trip(1000),
    ]
}

fn bench_node_order(nodes: usize) -> BenchmarkResult {
    let document = parse_scene(&scene_text(nodes), 2).unwrap();

    let name = format!("Depth-first node order ({} nodes)", nodes);
    run_benchmark_with_rate(&name, CATEGORY, ITERATIONS, document.node_count() as u64, "nodes", || {
        let order = ordered_nodes(&document);
        std::hint::black_box(order);
    })
}

fn bench_serialize(nodes: usize) -> BenchmarkResult {
    let document = parse_scene(&scene_text(nodes), 2).unwrap();
    let bytes = serialize(&document).text.len() as u64;
    let iterations = if nodes > 1000 { ITERATIONS / 10 } else { ITERATIONS };

    run_benchmark_with_throughput(&format!("Serialize scene ({} nodes)", nodes), CATEGORY, iterations, bytes, || {
        let scene = serialize(&document);
        std::hint::black_box(scene);
    })
}

fn bench_round_trip(nodes: usize) -> BenchmarkResult {
    let text = scene_text(nodes);

    run_benchmark(&format!("Parse + serialize ({} nodes)", nodes), CATEGORY, ITERATIONS, || {
        let document = parse_scene(&text, 2).unwrap();
        std::hint::black_box(serialize(&document));
    })
}
