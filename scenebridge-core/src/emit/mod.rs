//! Node emitters
//!
//! Each emitter turns one resolved [`ExportCandidate`] into the text of a node
//! block. Emitters never touch the document; the export pass inserts what they
//! return.
//!
//! [`ExportCandidate`]: crate::hierarchy::ExportCandidate

mod group;
mod mesh;
mod skeleton;

pub use group::group_nodes;
pub use mesh::{linked_armature, polygon_node, skeleton_path, vertex_map, VertexMap};
pub use skeleton::{bone_nodes, skeleton_node};

use crate::grammar::FormatGrammar;
use crate::hierarchy::HierarchyResolver;

/// Shared inputs of every emitter in one export pass
pub struct EmitContext<'a> {
    pub grammar: &'a FormatGrammar,
    pub pixels_per_unit: f64,
    pub resolver: &'a HierarchyResolver<'a>,
}

/// A node block and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedNode {
    /// `parent` attribute value
    pub parent: String,
    /// Sanitized node name
    pub name: String,
    pub text: String,
}

impl EmittedNode {
    /// Path the node will have in the document
    pub fn path(&self) -> String {
        crate::document::node_path(Some(&self.parent), &self.name)
    }
}

fn node_header(name: &str, kind: &str, parent: &str) -> String {
    format!("[node name=\"{}\" type=\"{}\" parent=\"{}\"]\n", name, kind, parent)
}
