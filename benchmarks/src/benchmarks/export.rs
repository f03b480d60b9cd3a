//! Export benchmarks
//!
//! Builds rigged scenes in memory and writes them to a temporary directory.

use super::fixtures::{rigged_scene, scene_text};
use crate::{run_benchmark, run_benchmark_with_rate, BenchmarkResult};
use scenebridge_core::{build_document, export_scene, ExportConfig, FsTextureStore, NoProgress};
use std::fs;
use tempfile::TempDir;

const CATEGORY: &str = "Export";
const ITERATIONS: u32 = 20;

pub fn run_all() -> Vec<BenchmarkResult> {
    vec![
        bench_build_document(10, 10, 4),
        bench_build_document(10, 40, 16),
        bench_export_fresh(),
        bench_export_merge(),
    ]
}

fn bench_build_document(characters: usize, grid: usize, bones: usize) -> BenchmarkResult {
    let scene = rigged_scene(characters, grid, bones);
    let config = ExportConfig::default();
    let temp_dir = TempDir::new().unwrap();
    let mut textures = FsTextureStore::new(temp_dir.path());

    let vertices = (characters * grid * grid) as u64;
    let name = format!("Build document ({} x {}x{} grid, {} bones)", characters, grid, grid, bones);
    run_benchmark_with_rate(&name, CATEGORY, ITERATIONS, vertices, "vertices", || {
        let built = build_document(None, &scene, &config, &mut textures, &mut NoProgress).unwrap();
        std::hint::black_box(built);
    })
}

fn bench_export_fresh() -> BenchmarkResult {
    let scene = rigged_scene(10, 20, 8);
    let config = ExportConfig::default();
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("level.tscn");
    let mut textures = FsTextureStore::beside(&target);

    run_benchmark("Export to new file (10 characters)", CATEGORY, ITERATIONS, || {
        let summary = export_scene(&target, None, &scene, &config, &mut textures, &mut NoProgress).unwrap();
        std::hint::black_box(summary);
    })
}

fn bench_export_merge() -> BenchmarkResult {
    let scene = rigged_scene(10, 20, 8);
    let config = ExportConfig::default();
    let temp_dir = TempDir::new().unwrap();
    let existing = temp_dir.path().join("existing.tscn");
    let target = temp_dir.path().join("level.tscn");
    fs::write(&existing, scene_text(1000)).unwrap();
    let mut textures = FsTextureStore::beside(&target);

    run_benchmark("Merge into 1000-node scene (10 characters)", CATEGORY, ITERATIONS, || {
        let summary = export_scene(&target, Some(&existing), &scene, &config, &mut textures, &mut NoProgress).unwrap();
        std::hint::black_box(summary);
    })
}
