//! Export pass
//!
//! One call builds a complete scene document in memory and writes it once at
//! the end. The order of work is:
//! 1. load the scene to merge into (or seed a default root)
//! 2. reject a format mismatch before anything is saved or written
//! 3. emit group, mesh and armature nodes object by object
//! 4. serialize and write the target file

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::SceneDocument;
use crate::emit::{bone_nodes, group_nodes, polygon_node, skeleton_node, EmitContext, EmittedNode};
use crate::error::{ExportError, ExportResult};
use crate::grammar::FormatGrammar;
use crate::hierarchy::{Entity, HierarchyResolver};
use crate::parser::load_existing;
use crate::path_utils::resource_locator;
use crate::progress::ProgressSink;
use crate::serializer::serialize_with_progress;
use crate::textures::{TextureError, TextureStore};
use crate::types::{ExportConfig, SceneGraph};

/// What an export produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// File that was written
    pub target: PathBuf,
    /// Nodes in the written scene
    pub nodes: usize,
    /// External resources in the written scene
    pub resources: usize,
    /// Objects turned into nodes by this export
    pub exported_objects: usize,
    pub textures_saved: usize,
    /// Non-fatal problems, in the order they were found
    pub warnings: Vec<String>,
}

/// A document built from a scene, ready to serialize
#[derive(Debug, Clone)]
pub struct BuiltScene {
    pub document: SceneDocument,
    pub exported_objects: usize,
    pub warnings: Vec<String>,
}

/// Node paths written by this export, and whether each one is a group
#[derive(Default)]
struct WrittenPaths(HashMap<String, bool>);

impl WrittenPaths {
    /// Insert `node`, warning when it replaces a node this export already wrote
    ///
    /// Group containers are shared by every object in the group, so a group
    /// written again over a group is expected.
    fn place(&mut self, document: &mut SceneDocument, warnings: &mut Vec<String>, node: EmittedNode, group: bool) {
        let path = document.insert_node(Some(&node.parent), &node.name, node.text);
        tracing::debug!("Inserted node {}", path);
        if let Some(previous) = self.0.insert(path.clone(), group) {
            if !(previous && group) {
                let warning = format!(
                    "Node '{}' is written twice by this export; the later node replaces the earlier one",
                    path
                );
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }
}

/// Build the merged document without writing anything
///
/// `existing` is the scene to merge into; it is ignored unless it names an
/// existing `.tscn` file.
pub fn build_document(
    existing: Option<&Path>,
    scene: &SceneGraph,
    config: &ExportConfig,
    textures: &mut dyn TextureStore,
    progress: &mut dyn ProgressSink,
) -> ExportResult<BuiltScene> {
    config.validate()?;
    scene.validate()?;

    let grammar = FormatGrammar::for_version(config.godot_version);
    let mut document = match load_existing(existing, grammar.format)? {
        Some(document) => document,
        None => SceneDocument::with_default_root(grammar.format),
    };
    if document.format() != grammar.format {
        return Err(ExportError::FormatMismatch {
            existing: document.format(),
            requested: grammar.format,
        });
    }

    let exported = scene.exportable_objects(config);
    let resolver = HierarchyResolver::new(scene, &exported, config.use_collections);
    let ctx = EmitContext {
        grammar: &grammar,
        pixels_per_unit: config.pixels(),
        resolver: &resolver,
    };
    let mut warnings = Vec::new();
    let mut written = WrittenPaths::default();

    for object in exported.iter().copied() {
        let Some(entity) = Entity::from_object(object) else {
            continue;
        };
        let candidate = resolver.candidate(entity);

        tracing::debug!("Exporting \"{}\"", object.name);
        for node in group_nodes(&candidate) {
            written.place(&mut document, &mut warnings, node, true);
        }

        match entity {
            Entity::Mesh { object, mesh } => {
                let texture_key = match &mesh.texture {
                    Some(texture) => match textures.save(texture, &config.texture_folder) {
                        Ok(relative) => {
                            let locator = resource_locator(&relative);
                            Some(document.add_texture_resource(&locator, &grammar))
                        }
                        Err(TextureError::Missing(image)) => {
                            let warning = format!(
                                "Texture '{}' of '{}' could not be found; exported without a texture",
                                image, object.name
                            );
                            tracing::warn!("{}", warning);
                            warnings.push(warning);
                            None
                        }
                        Err(e) => return Err(ExportError::Texture(e)),
                    },
                    None => None,
                };
                let node = polygon_node(&ctx, &candidate, object, mesh, texture_key.as_deref(), progress)?;
                written.place(&mut document, &mut warnings, node, false);
            }
            Entity::Armature { object, armature } => {
                written.place(&mut document, &mut warnings, skeleton_node(&ctx, &candidate, object), false);
                for node in bone_nodes(&ctx, &candidate, armature, progress) {
                    written.place(&mut document, &mut warnings, node, false);
                }
            }
            Entity::Group(_) => {}
        }
    }

    Ok(BuiltScene {
        document,
        exported_objects: exported.len(),
        warnings,
    })
}

/// Export `scene` to `target`, merging into `existing` when it is a scene file
///
/// Nothing is written when an error is returned.
pub fn export_scene(
    target: &Path,
    existing: Option<&Path>,
    scene: &SceneGraph,
    config: &ExportConfig,
    textures: &mut dyn TextureStore,
    progress: &mut dyn ProgressSink,
) -> ExportResult<ExportSummary> {
    tracing::info!("Exporting scene for engine {} to {:?}", config.godot_version, target);

    let built = build_document(existing, scene, config, textures, progress)?;
    let serialized = serialize_with_progress(&built.document, progress);

    fs::write(target, &serialized.text).map_err(|e| ExportError::io(target, e))?;

    let mut warnings = built.warnings;
    warnings.extend(serialized.warnings);
    let summary = ExportSummary {
        target: target.to_path_buf(),
        nodes: built.document.node_count(),
        resources: built.document.resource_count(),
        exported_objects: built.exported_objects,
        textures_saved: textures.saved_count(),
        warnings,
    };
    tracing::info!(
        "Export complete: {} objects, {} nodes, {} resources, {} warnings",
        summary.exported_objects,
        summary.nodes,
        summary.resources,
        summary.warnings.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::types::{Collection, MeshData, ObjectData, SceneObject, TextureRef, Transform, Vertex};
    use tempfile::TempDir;

    /// Hands out fixed locators without touching the disk
    #[derive(Default)]
    struct FakeStore {
        saved: usize,
        fail: bool,
    }

    impl TextureStore for FakeStore {
        fn save(&mut self, texture: &TextureRef, folder: &str) -> Result<String, TextureError> {
            if self.fail {
                return Err(TextureError::Io {
                    path: PathBuf::from(folder),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            match &texture.source {
                Some(source) => {
                    self.saved += 1;
                    Ok(format!("{}/{}", folder, source.display()))
                }
                None => Err(TextureError::Missing(texture.image.clone())),
            }
        }

        fn saved_count(&self) -> usize {
            self.saved
        }
    }

    fn triangle(name: &str, texture: Option<&str>) -> SceneObject {
        SceneObject {
            name: name.to_string(),
            parent: None,
            object_2d: true,
            visible: true,
            selected: false,
            local: Transform::default(),
            world: Transform::default(),
            collections: Vec::new(),
            data: ObjectData::Mesh(MeshData {
                vertices: vec![
                    Vertex { co: [0.0, 0.0, 0.0], groups: Vec::new() },
                    Vertex { co: [1.0, 0.0, 0.0], groups: Vec::new() },
                    Vertex { co: [0.0, 1.0, 0.0], groups: Vec::new() },
                ],
                polygons: vec![vec![0, 1, 2]],
                texture: texture.map(|file| TextureRef {
                    image: file.to_string(),
                    source: Some(PathBuf::from(file)),
                    width: 16,
                    height: 16,
                }),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_shared_texture_gets_one_resource() {
        let scene = SceneGraph {
            objects: vec![triangle("A", Some("hero.png")), triangle("B", Some("hero.png"))],
            ..Default::default()
        };
        let mut store = FakeStore::default();
        let built = build_document(None, &scene, &ExportConfig::default(), &mut store, &mut NoProgress).unwrap();

        assert_eq!(built.document.resource_count(), 1);
        assert_eq!(built.document.resource(1).unwrap().locator, "res://textures/hero.png");
        assert!(built.document.node("A").unwrap().text.contains("texture = ExtResource( 1 )"));
        assert!(built.document.node("B").unwrap().text.contains("texture = ExtResource( 1 )"));
    }

    #[test]
    fn test_missing_texture_is_a_warning() {
        let mut object = triangle("A", Some("hero.png"));
        if let ObjectData::Mesh(mesh) = &mut object.data {
            mesh.texture.as_mut().unwrap().source = None;
        }
        let scene = SceneGraph { objects: vec![object], ..Default::default() };

        let built =
            build_document(None, &scene, &ExportConfig::default(), &mut FakeStore::default(), &mut NoProgress).unwrap();
        assert_eq!(built.warnings.len(), 1);
        assert_eq!(built.document.resource_count(), 0);
        assert!(!built.document.node("A").unwrap().text.contains("texture"));
    }

    #[test]
    fn test_texture_io_error_aborts() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("level.tscn");
        let scene = SceneGraph {
            objects: vec![triangle("A", Some("hero.png"))],
            ..Default::default()
        };
        let mut store = FakeStore { fail: true, ..Default::default() };

        let result = export_scene(&target, None, &scene, &ExportConfig::default(), &mut store, &mut NoProgress);
        assert!(matches!(result, Err(ExportError::Texture(TextureError::Io { .. }))));
        assert!(!target.exists());
    }

    #[test]
    fn test_export_writes_file() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("level.tscn");
        let scene = SceneGraph {
            objects: vec![triangle("Tri", None)],
            ..Default::default()
        };

        let summary = export_scene(
            &target,
            None,
            &scene,
            &ExportConfig::default(),
            &mut FakeStore::default(),
            &mut NoProgress,
        )
        .unwrap();
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.resources, 0);
        assert_eq!(summary.exported_objects, 1);
        assert!(summary.warnings.is_empty());

        let text = fs::read_to_string(&target).unwrap();
        assert!(text.starts_with("[gd_scene format=2]\n\n[node name=\"Node2D\" type=\"Node2D\"]\n\n"));
        assert!(text.contains("[node name=\"Tri\" type=\"Polygon2D\" parent=\".\"]\n"));
    }

    /// Tracks how deeply jobs are nested
    #[derive(Default)]
    struct DepthRecorder {
        depth: usize,
        max_depth: usize,
        jobs: usize,
    }

    impl ProgressSink for DepthRecorder {
        fn start_job(&mut self, _name: &str, _total: usize) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            self.jobs += 1;
        }

        fn end_job(&mut self) {
            self.depth -= 1;
        }
    }

    #[test]
    fn test_progress_jobs_do_not_nest() {
        let scene = SceneGraph {
            objects: vec![triangle("A", None), triangle("B", None)],
            ..Default::default()
        };
        let mut progress = DepthRecorder::default();
        build_document(None, &scene, &ExportConfig::default(), &mut FakeStore::default(), &mut progress).unwrap();

        assert!(progress.jobs > 0);
        assert_eq!(progress.max_depth, 1);
        assert_eq!(progress.depth, 0);
    }

    #[test]
    fn test_sanitized_name_collision_warns() {
        let scene = SceneGraph {
            objects: vec![triangle("Cube.001", None), triangle("Cube_001", None)],
            ..Default::default()
        };
        let built =
            build_document(None, &scene, &ExportConfig::default(), &mut FakeStore::default(), &mut NoProgress).unwrap();

        assert_eq!(built.warnings.len(), 1);
        assert!(built.warnings[0].contains("'Cube_001' is written twice"));
        assert_eq!(built.document.node_count(), 2);
    }

    #[test]
    fn test_shared_group_does_not_warn() {
        let mut first = triangle("A", None);
        let mut second = triangle("B", None);
        first.collections = vec!["Props".into()];
        second.collections = vec!["Props".into()];
        let scene = SceneGraph {
            objects: vec![first, second],
            collections: vec![Collection { name: "Props".into(), children: Vec::new() }],
            root_collections: vec!["Props".into()],
        };
        let config = ExportConfig {
            use_collections: true,
            ..Default::default()
        };
        let built = build_document(None, &scene, &config, &mut FakeStore::default(), &mut NoProgress).unwrap();

        assert!(built.warnings.is_empty());
        assert!(built.document.node("Props/A").is_some());
        assert!(built.document.node("Props/B").is_some());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ExportConfig {
            pixels_per_unit: 0,
            ..Default::default()
        };
        let result = build_document(None, &SceneGraph::default(), &config, &mut FakeStore::default(), &mut NoProgress);
        assert!(matches!(result, Err(ExportError::Config(_))));
    }
}
