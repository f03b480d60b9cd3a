//! In-memory scene document
//!
//! A [`SceneDocument`] holds everything that ends up in the written scene file:
//! node blocks keyed by their node path, external resources keyed by id, and
//! every other block kind carried through verbatim.
//!
//! Node paths follow the engine's `parent` attribute convention: the root node
//! is `"."`, a direct child of the root is just its name, and deeper nodes are
//! `parent/name`. Two nodes with the same parent and name are the same node, so
//! the path doubles as the node's identity.

use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Path of the root node
pub const ROOT_PATH: &str = ".";

/// Header of the node seeded when there is no existing scene to merge into
pub const DEFAULT_ROOT_BLOCK: &str = "[node name=\"Node2D\" type=\"Node2D\"]\n";

/// A node block and the paths of its children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRecord {
    /// Full block text; empty while the node is only a placeholder
    pub text: String,

    /// Child node paths in the order they were added
    pub children: Vec<String>,

    /// Set while the node has been referenced as a parent but never defined
    pub pending: bool,
}

/// An `ext_resource` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalResource {
    /// Numeric part of the id, used to find free ids
    pub id: u32,

    /// Id as written in the file, without quotes (`3`, `1_r4l0k`)
    pub key: String,

    /// Resource path (e.g. `res://textures/hero.png`)
    pub locator: String,

    pub text: String,
}

/// A block the document does not interpret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueBlock {
    /// Block kind from the header (`sub_resource`, `connection`, ...)
    pub kind: String,
    pub text: String,
}

/// Mutable representation of one scene file
#[derive(Debug, Clone)]
pub struct SceneDocument {
    format: u32,
    uid: Option<String>,
    nodes: IndexMap<String, NodeRecord>,
    pub(crate) resources: BTreeMap<(u32, String), ExternalResource>,
    /// Ids handed out by the allocator whose block is not inserted yet
    pub(crate) reserved: BTreeMap<String, u32>,
    other_blocks: Vec<OpaqueBlock>,
}

/// Compute the node path for a node with the given `parent` attribute
pub fn node_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        None => ROOT_PATH.to_string(),
        Some(ROOT_PATH) => name.to_string(),
        Some(parent) => format!("{}/{}", parent, name),
    }
}

/// Normalize a block so it ends in exactly one newline
pub(crate) fn normalize_block(text: &str) -> String {
    let mut text = text.trim_end().to_string();
    text.push('\n');
    text
}

impl SceneDocument {
    /// Create an empty document for the given structural format
    pub fn new(format: u32) -> Self {
        Self {
            format,
            uid: None,
            nodes: IndexMap::new(),
            resources: BTreeMap::new(),
            reserved: BTreeMap::new(),
            other_blocks: Vec::new(),
        }
    }

    /// Create a document holding only a plain `Node2D` root
    pub fn with_default_root(format: u32) -> Self {
        let mut document = Self::new(format);
        document.insert_node(None, "Node2D", DEFAULT_ROOT_BLOCK.to_string());
        document
    }

    pub fn format(&self) -> u32 {
        self.format
    }

    pub fn set_format(&mut self, format: u32) {
        self.format = format;
    }

    /// `uid` attribute of the scene descriptor, if the file had one
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn set_uid(&mut self, uid: Option<String>) {
        self.uid = uid;
    }

    /// Insert or redefine a node and link it under its parent
    ///
    /// Redefining a path replaces its text but keeps the children already
    /// recorded for it. A parent that has not been defined yet gets a pending
    /// placeholder. Returns the node's path.
    pub fn insert_node(&mut self, parent: Option<&str>, name: &str, text: String) -> String {
        let path = node_path(parent, name);

        let record = self.nodes.entry(path.clone()).or_default();
        record.text = normalize_block(&text);
        record.pending = false;

        if let Some(parent) = parent {
            let parent_record = self
                .nodes
                .entry(parent.to_string())
                .or_insert_with(|| NodeRecord {
                    pending: true,
                    ..Default::default()
                });
            if !parent_record.children.contains(&path) {
                parent_record.children.push(path.clone());
            }
        }

        path
    }

    pub fn node(&self, path: &str) -> Option<&NodeRecord> {
        self.nodes.get(path)
    }

    /// All node records in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeRecord)> {
        self.nodes.iter().map(|(path, record)| (path.as_str(), record))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert an external resource; a later block with the same id wins
    pub fn insert_resource(&mut self, resource: ExternalResource) {
        self.reserved.retain(|_, id| *id != resource.id);
        let resource = ExternalResource {
            text: normalize_block(&resource.text),
            ..resource
        };
        self.resources.insert((resource.id, resource.key.clone()), resource);
    }

    /// First resource whose numeric id is `id`
    pub fn resource(&self, id: u32) -> Option<&ExternalResource> {
        self.resources.values().find(|r| r.id == id)
    }

    /// Resource declared with exactly this id token
    pub fn resource_by_key(&self, key: &str) -> Option<&ExternalResource> {
        self.resources.values().find(|r| r.key == key)
    }

    /// External resources in ascending id order
    pub fn resources(&self) -> impl Iterator<Item = &ExternalResource> {
        self.resources.values()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn find_resource_by_locator(&self, locator: &str) -> Option<&ExternalResource> {
        self.resources.values().find(|r| r.locator == locator)
    }

    /// Append a block that is carried through without interpretation
    pub fn push_other_block(&mut self, kind: &str, text: &str) {
        self.other_blocks.push(OpaqueBlock {
            kind: kind.to_string(),
            text: normalize_block(text),
        });
    }

    /// Pass-through blocks in their original order
    pub fn other_blocks(&self) -> &[OpaqueBlock] {
        &self.other_blocks
    }

    /// Pass-through blocks of one kind, in their original order
    pub fn other_blocks_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a OpaqueBlock> {
        self.other_blocks.iter().filter(move |b| b.kind == kind)
    }
}
