//! Node path and hierarchy resolution
//!
//! An exported object is placed under its nearest exported ancestors only.
//! Objects that are not exported are skipped transparently, so an exported
//! grandchild of a skipped parent attaches to the next exported ancestor. When
//! group export is enabled, the groups containing the top of that chain become
//! `Node2D` containers above it.

use std::collections::HashSet;

use crate::geometry::{fmt_real, round6, to_target_position};
use crate::grammar::FormatGrammar;
use crate::path_utils::sanitize_node_name;
use crate::types::{ArmatureData, Collection, MeshData, ObjectData, SceneGraph, SceneObject};
use crate::document::ROOT_PATH;

/// Whether an ancestor is an object or a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorKind {
    Object,
    Group,
}

/// One exported ancestor of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    pub kind: AncestorKind,
    pub name: String,
}

impl Ancestor {
    fn object(name: &str) -> Self {
        Self {
            kind: AncestorKind::Object,
            name: name.to_string(),
        }
    }

    fn group(name: &str) -> Self {
        Self {
            kind: AncestorKind::Group,
            name: name.to_string(),
        }
    }
}

/// A source entity with its kind-specific payload
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Group(&'a Collection),
    Mesh {
        object: &'a SceneObject,
        mesh: &'a MeshData,
    },
    Armature {
        object: &'a SceneObject,
        armature: &'a ArmatureData,
    },
}

impl<'a> Entity<'a> {
    /// Wrap an object; `None` for objects without a node type
    pub fn from_object(object: &'a SceneObject) -> Option<Self> {
        match &object.data {
            ObjectData::Mesh(mesh) => Some(Entity::Mesh { object, mesh }),
            ObjectData::Armature(armature) => Some(Entity::Armature { object, armature }),
            ObjectData::Other => None,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Entity::Group(group) => &group.name,
            Entity::Mesh { object, .. } | Entity::Armature { object, .. } => &object.name,
        }
    }
}

/// An entity resolved against the exported hierarchy
#[derive(Debug, Clone)]
pub struct ExportCandidate<'a> {
    pub entity: Entity<'a>,
    /// Exported ancestors, root first
    pub ancestors: Vec<Ancestor>,
    /// Value of the node's `parent` attribute
    pub parent_path: String,
}

impl ExportCandidate<'_> {
    /// Groups above this entity, root first
    pub fn groups(&self) -> impl Iterator<Item = &Ancestor> {
        self.ancestors.iter().filter(|a| a.kind == AncestorKind::Group)
    }

    /// Sanitized node name
    pub fn node_name(&self) -> String {
        sanitize_node_name(self.entity.name())
    }

    /// Path of this node itself
    pub fn node_path(&self) -> String {
        crate::document::node_path(Some(&self.parent_path), &self.node_name())
    }
}

/// Join ancestor names into a `parent` attribute value
pub fn parent_path(ancestors: &[Ancestor]) -> String {
    if ancestors.is_empty() {
        return ROOT_PATH.to_string();
    }
    ancestors
        .iter()
        .map(|a| sanitize_node_name(&a.name))
        .collect::<Vec<_>>()
        .join("/")
}

/// A transform expressed in target units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub position: [f64; 2],
    /// Radians, or degrees for format 1
    pub rotation: f64,
    pub scale: [f64; 2],
}

impl NodeTransform {
    /// Position, rotation and scale property lines
    pub fn lines(&self, grammar: &FormatGrammar) -> String {
        format!(
            "{} = Vector2( {}, {} )\n{} = {}\n{} = Vector2( {}, {} )\n",
            grammar.position_key,
            fmt_real(self.position[0]),
            fmt_real(self.position[1]),
            grammar.rotation_key,
            fmt_real(self.rotation),
            grammar.scale_key,
            fmt_real(self.scale[0]),
            fmt_real(self.scale[1]),
        )
    }
}

/// Resolves exported ancestors for the objects of one export pass
pub struct HierarchyResolver<'a> {
    scene: &'a SceneGraph,
    exported: HashSet<&'a str>,
    use_collections: bool,
}

impl<'a> HierarchyResolver<'a> {
    pub fn new(scene: &'a SceneGraph, exported: &[&'a SceneObject], use_collections: bool) -> Self {
        Self {
            scene,
            exported: exported.iter().map(|o| o.name.as_str()).collect(),
            use_collections,
        }
    }

    pub fn scene(&self) -> &'a SceneGraph {
        self.scene
    }

    pub fn is_exported(&self, name: &str) -> bool {
        self.exported.contains(name)
    }

    /// Resolve an entity into an export candidate
    pub fn candidate(&self, entity: Entity<'a>) -> ExportCandidate<'a> {
        let ancestors = match entity {
            Entity::Group(group) => self.group_ancestors(&group.name),
            Entity::Mesh { object, .. } | Entity::Armature { object, .. } => self.object_ancestors(object),
        };
        let parent_path = parent_path(&ancestors);
        ExportCandidate {
            entity,
            ancestors,
            parent_path,
        }
    }

    /// Exported ancestors of an object, root first
    pub fn object_ancestors(&self, object: &SceneObject) -> Vec<Ancestor> {
        let objects = self.exported_parents(object);
        let top = objects
            .last()
            .and_then(|name| self.scene.object(name))
            .unwrap_or(object);

        let mut chain: Vec<Ancestor> = objects.iter().map(|name| Ancestor::object(name)).collect();
        if self.use_collections {
            if let Some(first) = self.first_linked_collection(top) {
                chain.push(Ancestor::group(first));
                chain.extend(self.collection_parents(first).into_iter().map(Ancestor::group));
            }
        }
        chain.reverse();
        chain
    }

    /// Parent groups of a group, root first
    pub fn group_ancestors(&self, group: &str) -> Vec<Ancestor> {
        let mut chain: Vec<Ancestor> = self
            .collection_parents(group)
            .into_iter()
            .map(Ancestor::group)
            .collect();
        chain.reverse();
        chain
    }

    /// Exported transform parents, nearest first
    fn exported_parents(&self, object: &SceneObject) -> Vec<&'a str> {
        let mut parents = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([object.name.as_str()]);
        let mut current = object.parent.as_deref().and_then(|name| self.scene.object(name));

        while let Some(parent) = current {
            if !seen.insert(parent.name.as_str()) {
                tracing::warn!(object = %object.name, "Parent cycle detected");
                break;
            }
            if self.is_exported(&parent.name) {
                parents.push(parent.name.as_str());
            }
            current = parent.parent.as_deref().and_then(|name| self.scene.object(name));
        }
        parents
    }

    /// The first group in display order that the object is linked into
    ///
    /// An object linked into several groups is placed under the first one only,
    /// because a node can have a single parent.
    fn first_linked_collection(&self, object: &SceneObject) -> Option<&'a str> {
        self.scene
            .ordered_collections()
            .into_iter()
            .find(|name| object.collections.iter().any(|c| c == name))
    }

    /// Groups containing `group`, nearest first
    fn collection_parents(&self, group: &str) -> Vec<&'a str> {
        let mut parents = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = self.scene.parent_collection(group);

        while let Some(parent) = current {
            if parent.name == group || !seen.insert(parent.name.as_str()) {
                break;
            }
            parents.push(parent.name.as_str());
            current = self.scene.parent_collection(&parent.name);
        }
        parents
    }

    /// Transform of `object` relative to its exported ancestors
    ///
    /// Exported ancestor objects contribute their local offsets (locations and
    /// rotations summed, scales multiplied), which are taken away from the
    /// object's world transform. Values are rounded to 6 decimals first.
    pub fn relative_transform(
        &self,
        object: &SceneObject,
        ancestors: &[Ancestor],
        grammar: &FormatGrammar,
        pixels_per_unit: f64,
    ) -> NodeTransform {
        let mut loc_offset = [0.0; 3];
        let mut rot_offset = [0.0; 3];
        let mut scale_offset = [1.0; 3];

        let parents = ancestors
            .iter()
            .filter(|a| a.kind == AncestorKind::Object)
            .filter_map(|a| self.scene.object(&a.name));
        for parent in parents {
            for axis in 0..3 {
                loc_offset[axis] += parent.local.location[axis];
                rot_offset[axis] += parent.local.rotation[axis];
                scale_offset[axis] *= parent.local.scale[axis];
            }
        }

        let world = &object.world;
        let mut location = [0.0; 3];
        let mut rotation = [0.0; 3];
        let mut scale = [0.0; 3];
        for axis in 0..3 {
            location[axis] = round6(world.location[axis]) - round6(loc_offset[axis]);
            rotation[axis] = round6(world.rotation[axis]) - round6(rot_offset[axis]);
            let divisor = round6(scale_offset[axis]);
            scale[axis] = if divisor == 0.0 {
                round6(world.scale[axis])
            } else {
                round6(world.scale[axis]) / divisor
            };
        }

        let rotation = if grammar.rotation_in_degrees() {
            (-rotation[2]).to_degrees()
        } else {
            -rotation[2]
        };

        NodeTransform {
            position: to_target_position(location[0], location[1], pixels_per_unit),
            rotation,
            scale: [scale[0], scale[1]],
        }
    }
}
