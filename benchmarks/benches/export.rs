//! Parse, serialize and export benchmarks using Criterion

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use scenebridge_core::types::{MeshData, ObjectData, SceneObject, Transform, Vertex};
use scenebridge_core::{build_document, parse_scene, serialize, ExportConfig, FsTextureStore, NoProgress, SceneGraph};

fn build_scene_text(nodes: usize) -> String {
    let mut text = String::from("[gd_scene format=2]\n\n[node name=\"Level\" type=\"Node2D\"]\n\n");
    for i in 0..nodes {
        let parent = if i % 4 == 0 { ".".to_string() } else { format!("Layer_{}", i - i % 4) };
        text.push_str(&format!(
            "[node name=\"Layer_{}\" type=\"Node2D\" parent=\"{}\"]\nposition = Vector2( {}.0, 0.0 )\n\n",
            i, parent, i
        ));
    }
    text
}

fn build_mesh_scene(objects: usize, size: usize) -> SceneGraph {
    let mut vertices = Vec::new();
    for row in 0..size {
        for column in 0..size {
            vertices.push(Vertex { co: [column as f64, row as f64, 0.0], groups: Vec::new() });
        }
    }
    let mut polygons = Vec::new();
    for row in 0..size - 1 {
        for column in 0..size - 1 {
            let corner = row * size + column;
            polygons.push(vec![corner, corner + 1, corner + size + 1, corner + size]);
        }
    }
    let mesh = MeshData { vertices, polygons, ..Default::default() };

    SceneGraph {
        objects: (0..objects)
            .map(|i| SceneObject {
                name: format!("Sheet_{}", i),
                parent: None,
                object_2d: true,
                visible: true,
                selected: false,
                local: Transform::default(),
                world: Transform::default(),
                collections: Vec::new(),
                data: ObjectData::Mesh(mesh.clone()),
            })
            .collect(),
        ..Default::default()
    }
}

fn scene_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");

    let text = build_scene_text(2000);
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("parse_2000_nodes", |b| b.iter(|| black_box(parse_scene(&text, 2).unwrap())));

    let document = parse_scene(&text, 2).unwrap();
    group.throughput(Throughput::Elements(document.node_count() as u64));
    group.bench_function("serialize_2000_nodes", |b| b.iter(|| black_box(serialize(&document))));

    group.finish();
}

fn export_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let config = ExportConfig::default();
    let temp_dir = tempfile::TempDir::new().unwrap();
    let mut textures = FsTextureStore::new(temp_dir.path());

    for size in [8, 32] {
        let scene = build_mesh_scene(20, size);
        group.throughput(Throughput::Elements((20 * size * size) as u64));
        group.bench_function(format!("build_document_{}x{}", size, size), |b| {
            b.iter(|| black_box(build_document(None, &scene, &config, &mut textures, &mut NoProgress).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, scene_benchmarks, export_benchmarks);
criterion_main!(benches);
