//! Source scene graph
//!
//! The authoring tool hands the exporter a snapshot of its scene: objects with
//! their parenting and transforms, mesh and armature payloads, and the group
//! (collection) tree used to organize them. Hosts build a [`SceneGraph`] directly
//! or deserialize one from a JSON/YAML description.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use super::config::ExportConfig;

/// Snapshot of the authoring tool's scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneGraph {
    /// Objects in scene order
    pub objects: Vec<SceneObject>,

    /// Every group in the file, in data order
    #[serde(default)]
    pub collections: Vec<Collection>,

    /// Top-level groups of the scene, in display order
    #[serde(default)]
    pub root_collections: Vec<String>,
}

/// An organizational group of objects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub name: String,

    /// Child group names, in display order
    #[serde(default)]
    pub children: Vec<String>,
}

/// Location, euler rotation (radians) and scale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default)]
    pub location: [f64; 3],

    #[serde(default)]
    pub rotation: [f64; 3],

    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn default_true() -> bool {
    true
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: unit_scale(),
        }
    }
}

/// An object of the source scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    pub name: String,

    /// Name of the transform parent
    #[serde(default)]
    pub parent: Option<String>,

    /// Whether the object is flagged for 2D export
    #[serde(default = "default_true")]
    pub object_2d: bool,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default)]
    pub selected: bool,

    /// Transform relative to the parent
    #[serde(default)]
    pub local: Transform,

    /// Decomposed world matrix
    #[serde(default)]
    pub world: Transform,

    /// Groups this object is linked into
    #[serde(default)]
    pub collections: Vec<String>,

    pub data: ObjectData,
}

/// Kind-specific payload of an object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectData {
    Mesh(MeshData),
    Armature(ArmatureData),
    /// Anything the exporter has no node type for
    #[serde(other)]
    Other,
}

/// Mesh payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshData {
    pub vertices: Vec<Vertex>,

    /// Vertex indices of each face, in winding order
    #[serde(default)]
    pub polygons: Vec<Vec<usize>>,

    #[serde(default)]
    pub uv_layers: Vec<UvLayer>,

    /// Vertex group names, indexed by `GroupWeight::group`
    #[serde(default)]
    pub vertex_groups: Vec<String>,

    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    #[serde(default)]
    pub texture: Option<TextureRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    pub co: [f64; 3],

    #[serde(default)]
    pub groups: Vec<GroupWeight>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroupWeight {
    pub group: usize,
    pub weight: f64,
}

/// A UV layer; one coordinate per face corner (loop)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UvLayer {
    pub name: String,

    #[serde(default)]
    pub active_render: bool,

    pub uvs: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Modifier {
    Armature {
        #[serde(default)]
        object: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// Image applied to a mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureRef {
    /// Image name inside the authoring tool
    pub image: String,

    /// Image file backing the texture
    #[serde(default)]
    pub source: Option<PathBuf>,

    pub width: u32,
    pub height: u32,
}

/// Which armature state the viewport displays
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PosePosition {
    #[default]
    Pose,
    Rest,
}

/// Armature payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmatureData {
    #[serde(default)]
    pub pose_position: PosePosition,

    /// Pose bones in armature order
    pub bones: Vec<PoseBone>,
}

/// A bone with its rest (armature space) and posed head/tail points
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseBone {
    pub name: String,

    #[serde(default)]
    pub parent: Option<String>,

    pub head_local: [f64; 3],
    pub tail_local: [f64; 3],
    pub head: [f64; 3],
    pub tail: [f64; 3],

    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],

    pub length: f64,
}

impl MeshData {
    /// Check indices reference existing vertices and UV layers cover every loop
    pub fn validate(&self) -> Result<(), String> {
        let vertex_count = self.vertices.len();
        for (index, polygon) in self.polygons.iter().enumerate() {
            if polygon.len() < 3 {
                return Err(format!("polygon {} has fewer than 3 vertices", index));
            }
            if let Some(bad) = polygon.iter().find(|v| **v >= vertex_count) {
                return Err(format!(
                    "polygon {} references vertex {} but the mesh has {} vertices",
                    index, bad, vertex_count
                ));
            }
        }
        let loop_count = self.loop_count();
        for layer in &self.uv_layers {
            if layer.uvs.len() != loop_count {
                return Err(format!(
                    "uv layer '{}' has {} coordinates, expected {}",
                    layer.name,
                    layer.uvs.len(),
                    loop_count
                ));
            }
        }
        Ok(())
    }

    /// Number of face corners across all polygons
    pub fn loop_count(&self) -> usize {
        self.polygons.iter().map(Vec::len).sum()
    }

    /// The first render-active UV layer, if any
    pub fn active_uv_layer(&self) -> Option<&UvLayer> {
        self.uv_layers.iter().find(|layer| layer.active_render)
    }
}

impl ArmatureData {
    pub fn bone(&self, name: &str) -> Option<&PoseBone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Ancestor bone names of `bone`, root first
    pub fn ancestor_names<'a>(&'a self, bone: &'a PoseBone) -> Vec<&'a str> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([bone.name.as_str()]);
        let mut current = bone.parent.as_deref();
        while let Some(name) = current {
            if !seen.insert(name) {
                break;
            }
            chain.push(name);
            current = self.bone(name).and_then(|b| b.parent.as_deref());
        }
        chain.reverse();
        chain
    }

    /// Slash-joined path of a bone below its skeleton
    pub fn bone_path(&self, bone: &PoseBone) -> String {
        let mut parts = self.ancestor_names(bone);
        parts.push(bone.name.as_str());
        parts.join("/")
    }
}

/// Inconsistencies in a scene description
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneGraphError {
    #[error("Object name '{0}' is used more than once")]
    DuplicateObject(String),

    #[error("Object '{object}' has unknown parent '{parent}'")]
    UnknownParent { object: String, parent: String },

    #[error("Object '{object}' is linked into unknown group '{collection}'")]
    UnknownCollection { object: String, collection: String },

    #[error("Group '{0}' is listed but never defined")]
    UndefinedCollection(String),
}

impl SceneGraph {
    /// Load a scene description from JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Check that every name the graph refers to exists
    pub fn validate(&self) -> Result<(), SceneGraphError> {
        let mut names = HashSet::new();
        for object in &self.objects {
            if !names.insert(object.name.as_str()) {
                return Err(SceneGraphError::DuplicateObject(object.name.clone()));
            }
        }
        for object in &self.objects {
            if let Some(parent) = &object.parent {
                if !names.contains(parent.as_str()) {
                    return Err(SceneGraphError::UnknownParent {
                        object: object.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
            if let Some(collection) = object.collections.iter().find(|c| self.collection(c).is_none()) {
                return Err(SceneGraphError::UnknownCollection {
                    object: object.name.clone(),
                    collection: collection.clone(),
                });
            }
        }
        let listed = self
            .root_collections
            .iter()
            .chain(self.collections.iter().flat_map(|c| c.children.iter()));
        for name in listed {
            if self.collection(name).is_none() {
                return Err(SceneGraphError::UndefinedCollection(name.clone()));
            }
        }
        Ok(())
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// All groups below the scene root in display order (depth-first, pre-order)
    pub fn ordered_collections(&self) -> Vec<&str> {
        let mut ordered = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<&str> = self.root_collections.iter().rev().map(String::as_str).collect();
        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            ordered.push(name);
            if let Some(collection) = self.collection(name) {
                stack.extend(collection.children.iter().rev().map(String::as_str));
            }
        }
        ordered
    }

    /// First group, in data order, that lists `name` as a child
    pub fn parent_collection(&self, name: &str) -> Option<&Collection> {
        self.collections
            .iter()
            .find(|c| c.children.iter().any(|child| child == name))
    }

    /// Objects the exporter turns into nodes, in scene order
    pub fn exportable_objects(&self, config: &ExportConfig) -> Vec<&SceneObject> {
        self.objects
            .iter()
            .filter(|obj| !config.selected_only || obj.selected)
            .filter(|obj| obj.object_2d && obj.visible)
            .filter(|obj| match obj.data {
                ObjectData::Mesh(_) => true,
                ObjectData::Armature(_) => config.godot_version.supports_skeletons(),
                ObjectData::Other => false,
            })
            .collect()
    }
}
