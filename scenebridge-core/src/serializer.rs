//! Scene serializer
//!
//! Writes a [`SceneDocument`] back to text. Resources are written by ascending
//! id. Nodes are written depth-first from the root so every node follows its
//! parent and a node's whole subtree is written before its next sibling.
//!
//! File layout:
//! - `gd_scene` descriptor
//! - `ext_resource` blocks
//! - `sub_resource` blocks
//! - `node` blocks
//! - `connection` blocks
//! - any other blocks, in the order they were read
//!
//! Blocks are separated by one blank line.

use std::collections::HashSet;

use crate::document::{SceneDocument, ROOT_PATH};
use crate::progress::{JobTicker, NoProgress, ProgressSink};

/// Serialized text and anything odd found on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializedScene {
    pub text: String,
    pub warnings: Vec<String>,
}

/// Node paths in output order
///
/// Returns the order and one warning per node that is referenced as a parent
/// but never defined, or that cannot be reached from the root. Placeholders are
/// skipped. Unreachable nodes are appended in insertion order so no node the
/// document holds is lost.
pub fn ordered_nodes(document: &SceneDocument) -> (Vec<&str>, Vec<String>) {
    let mut order = Vec::with_capacity(document.node_count());
    let mut warnings = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    let mut stack: Vec<&str> = Vec::new();
    if document.node(ROOT_PATH).is_some() {
        stack.push(ROOT_PATH);
    } else {
        warnings.push("Scene has no root node".to_string());
    }

    while let Some(path) = stack.pop() {
        if !visited.insert(path) {
            continue;
        }
        let Some(record) = document.node(path) else {
            continue;
        };
        if record.pending {
            warnings.push(format!("Node '{}' is referenced as a parent but never defined", path));
        } else {
            order.push(path);
        }
        stack.extend(record.children.iter().rev().map(String::as_str));
    }

    for (path, record) in document.nodes() {
        if visited.contains(path) {
            continue;
        }
        if record.pending {
            warnings.push(format!("Node '{}' is referenced as a parent but never defined", path));
        } else {
            warnings.push(format!("Node '{}' is not reachable from the scene root", path));
            order.push(path);
        }
    }

    (order, warnings)
}

/// `load_steps` value: one per resource plus the scene itself, or `None` without resources
pub fn load_steps(document: &SceneDocument) -> Option<usize> {
    let count = document.resource_count() + document.other_blocks_of("sub_resource").count();
    (count > 0).then_some(count + 1)
}

/// The `gd_scene` descriptor line
pub fn descriptor(document: &SceneDocument) -> String {
    let mut line = String::from("[gd_scene ");
    if let Some(steps) = load_steps(document) {
        line.push_str(&format!("load_steps={} ", steps));
    }
    line.push_str(&format!("format={}", document.format()));
    if let Some(uid) = document.uid() {
        line.push_str(&format!(" uid=\"{}\"", uid));
    }
    line.push_str("]\n");
    line
}

/// Serialize a document to scene text
pub fn serialize(document: &SceneDocument) -> SerializedScene {
    serialize_with_progress(document, &mut NoProgress)
}

/// Serialize a document, reporting each written block
pub fn serialize_with_progress(document: &SceneDocument, progress: &mut dyn ProgressSink) -> SerializedScene {
    let (nodes, warnings) = ordered_nodes(document);
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let mut blocks: Vec<&str> = Vec::new();
    blocks.extend(document.resources().map(|r| r.text.as_str()));
    blocks.extend(document.other_blocks_of("sub_resource").map(|b| b.text.as_str()));
    blocks.extend(nodes.iter().filter_map(|path| document.node(path)).map(|n| n.text.as_str()));
    blocks.extend(document.other_blocks_of("connection").map(|b| b.text.as_str()));
    blocks.extend(
        document
            .other_blocks()
            .iter()
            .filter(|b| b.kind != "sub_resource" && b.kind != "connection")
            .map(|b| b.text.as_str()),
    );

    let header = descriptor(document);
    let mut text = String::with_capacity(header.len() + blocks.iter().map(|b| b.len() + 1).sum::<usize>());
    text.push_str(&header);

    let mut ticker = JobTicker::start(progress, "Writing scene blocks", blocks.len());
    for block in blocks {
        ticker.tick();
        text.push('\n');
        text.push_str(block);
    }

    SerializedScene { text, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ExternalResource;
    use crate::parser::parse_scene;

    fn node(name: &str, parent: &str) -> String {
        format!("[node name=\"{}\" type=\"Node2D\" parent=\"{}\"]\n", name, parent)
    }

    #[test]
    fn test_depth_first_order() {
        let mut document = SceneDocument::with_default_root(2);
        document.insert_node(Some("A/B"), "C", node("C", "A/B"));
        document.insert_node(Some("."), "D", node("D", "."));
        document.insert_node(Some("A"), "B", node("B", "A"));
        document.insert_node(Some("."), "A", node("A", "."));

        let (order, warnings) = ordered_nodes(&document);
        assert_eq!(order, vec![".", "D", "A", "A/B", "A/B/C"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_children_in_insertion_order() {
        let mut document = SceneDocument::with_default_root(2);
        for name in ["Z", "A", "M"] {
            document.insert_node(Some("."), name, node(name, "."));
        }
        let (order, _) = ordered_nodes(&document);
        assert_eq!(order, vec![".", "Z", "A", "M"]);
    }

    #[test]
    fn test_placeholder_is_skipped_with_warning() {
        let mut document = SceneDocument::with_default_root(2);
        document.insert_node(Some("Ghost"), "Child", node("Child", "Ghost"));

        let (order, warnings) = ordered_nodes(&document);
        assert_eq!(order, vec![".", "Ghost/Child"]);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("'Ghost/Child' is not reachable"));
        assert!(warnings[1].contains("'Ghost' is referenced"));
    }

    #[test]
    fn test_descriptor() {
        let mut document = SceneDocument::with_default_root(2);
        assert_eq!(descriptor(&document), "[gd_scene format=2]\n");

        document.insert_resource(ExternalResource {
            id: 1,
            key: "1".into(),
            locator: "res://a.png".into(),
            text: "[ext_resource path=\"res://a.png\" type=\"Texture\" id=1]".into(),
        });
        document.push_other_block("sub_resource", "[sub_resource type=\"CircleShape2D\" id=1]");
        assert_eq!(load_steps(&document), Some(3));

        document.set_format(3);
        document.set_uid(Some("uid://abc".into()));
        assert_eq!(descriptor(&document), "[gd_scene load_steps=3 format=3 uid=\"uid://abc\"]\n");
    }

    #[test]
    fn test_block_order() {
        let text = "[gd_scene load_steps=2 format=2]\n\n\
                    [editable path=\"Level\"]\n\n\
                    [connection signal=\"ready\" from=\".\" to=\".\" method=\"go\"]\n\n\
                    [node name=\"Root\" type=\"Node2D\"]\n\n\
                    [ext_resource path=\"res://a.png\" type=\"Texture\" id=1]\n";
        let document = parse_scene(text, 2).unwrap();
        let output = serialize(&document).text;
        assert_eq!(
            output,
            "[gd_scene load_steps=2 format=2]\n\n\
             [ext_resource path=\"res://a.png\" type=\"Texture\" id=1]\n\n\
             [node name=\"Root\" type=\"Node2D\"]\n\n\
             [connection signal=\"ready\" from=\".\" to=\".\" method=\"go\"]\n\n\
             [editable path=\"Level\"]\n"
        );
    }

    #[test]
    fn test_round_trip_is_stable() {
        let text = "[gd_scene load_steps=3 format=2]\n\n\
                    [ext_resource path=\"res://b.png\" type=\"Texture\" id=2]\n\n\
                    [ext_resource path=\"res://a.png\" type=\"Texture\" id=1]\n\n\
                    [node name=\"Root\" type=\"Node2D\"]\n\n\
                    [node name=\"Leaf\" type=\"Sprite\" parent=\"Branch\"]\n\
                    texture = ExtResource( 2 )\n\n\
                    [node name=\"Branch\" type=\"Node2D\" parent=\".\"]\n";
        let first = serialize(&parse_scene(text, 2).unwrap()).text;
        let second = serialize(&parse_scene(&first, 2).unwrap()).text;
        assert_eq!(first, second);

        let id1 = first.find("id=1").unwrap();
        let id2 = first.find("id=2").unwrap();
        assert!(id1 < id2);
        assert!(first.find("\"Branch\"").unwrap() < first.find("\"Leaf\"").unwrap());
    }
}
