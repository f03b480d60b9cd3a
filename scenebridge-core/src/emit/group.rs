//! Group container nodes

use super::{node_header, EmittedNode};
use crate::hierarchy::{parent_path, AncestorKind, ExportCandidate};
use crate::path_utils::sanitize_node_name;

/// `Node2D` containers for the groups above a candidate, outermost first
pub fn group_nodes(candidate: &ExportCandidate) -> Vec<EmittedNode> {
    candidate
        .ancestors
        .iter()
        .enumerate()
        .filter(|(_, ancestor)| ancestor.kind == AncestorKind::Group)
        .map(|(index, ancestor)| {
            let parent = parent_path(&candidate.ancestors[..index]);
            let name = sanitize_node_name(&ancestor.name);
            EmittedNode {
                text: node_header(&name, "Node2D", &parent),
                parent,
                name,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{Ancestor, Entity};
    use crate::types::Collection;

    #[test]
    fn test_group_nodes() {
        let outer = Collection { name: "Outer".into(), children: vec![] };
        let ancestors = vec![
            Ancestor { kind: AncestorKind::Group, name: "Outer".into() },
            Ancestor { kind: AncestorKind::Group, name: "Props.001".into() },
            Ancestor { kind: AncestorKind::Object, name: "Body".into() },
        ];
        let candidate = ExportCandidate {
            entity: Entity::Group(&outer),
            parent_path: parent_path(&ancestors),
            ancestors,
        };

        let nodes = group_nodes(&candidate);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text, "[node name=\"Outer\" type=\"Node2D\" parent=\".\"]\n");
        assert_eq!(nodes[1].text, "[node name=\"Props_001\" type=\"Node2D\" parent=\"Outer\"]\n");
        assert_eq!(nodes[1].path(), "Outer/Props_001");
    }
}
