//! SceneBridge Core Library
//!
//! This crate provides the core functionality for SceneBridge:
//! - Godot `.tscn` scene parsing into a mergeable document
//! - Node emitters for groups, meshes (Polygon2D), skeletons and bones
//! - External resource id allocation
//! - Depth-first scene serialization
//! - Export configuration and the engine version table

pub mod document;
pub mod emit;
pub mod error;
pub mod export;
pub mod geometry;
pub mod grammar;
pub mod hierarchy;
pub mod parser;
pub mod path_utils;
pub mod progress;
pub mod resources;
pub mod serializer;
pub mod textures;
pub mod types;

// Re-export commonly used types
pub use document::{ExternalResource, NodeRecord, OpaqueBlock, SceneDocument, DEFAULT_ROOT_BLOCK, ROOT_PATH};
pub use error::{ExportError, ExportResult, ParseError};
pub use export::{build_document, export_scene, BuiltScene, ExportSummary};
pub use grammar::FormatGrammar;
pub use hierarchy::{Ancestor, AncestorKind, Entity, ExportCandidate, HierarchyResolver};
pub use parser::{load_existing, parse_scene};
pub use progress::{LogProgress, NoProgress, ProgressSink};
pub use resources::Allocation;
pub use serializer::{serialize, SerializedScene};
pub use textures::{FsTextureStore, TextureError, TextureStore};
pub use types::{
    ArmatureData, Collection, ConfigError, ExportConfig, GodotVersion, MeshData, ObjectData, SceneGraph,
    SceneGraphError, SceneObject,
};
pub use path_utils::{normalize_path, path_to_string, resource_locator, sanitize_node_name};
