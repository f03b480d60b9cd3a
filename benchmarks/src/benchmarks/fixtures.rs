//! Generated scenes shared by the suites

use scenebridge_core::types::{
    ArmatureData, GroupWeight, MeshData, Modifier, ObjectData, PoseBone, PosePosition, SceneGraph, SceneObject,
    Transform, Vertex,
};

fn object(name: &str, parent: Option<&str>, data: ObjectData) -> SceneObject {
    SceneObject {
        name: name.to_string(),
        parent: parent.map(str::to_string),
        object_2d: true,
        visible: true,
        selected: false,
        local: Transform::default(),
        world: Transform::default(),
        collections: Vec::new(),
        data,
    }
}

/// A `size` x `size` vertex grid of quads, jittered and weighted to two bones
pub fn grid_mesh(size: usize, armature: Option<&str>) -> MeshData {
    let mut vertices = Vec::with_capacity(size * size);
    for row in 0..size {
        for column in 0..size {
            let jitter = rand::random::<f64>() * 0.01;
            let weight = column as f64 / (size - 1).max(1) as f64;
            vertices.push(Vertex {
                co: [column as f64 + jitter, row as f64 - jitter, 0.0],
                groups: vec![
                    GroupWeight { group: 0, weight: 1.0 - weight },
                    GroupWeight { group: 1, weight },
                ],
            });
        }
    }

    let mut polygons = Vec::new();
    for row in 0..size.saturating_sub(1) {
        for column in 0..size - 1 {
            let corner = row * size + column;
            polygons.push(vec![corner, corner + 1, corner + size + 1, corner + size]);
        }
    }

    MeshData {
        vertices,
        polygons,
        vertex_groups: vec!["Root".to_string(), "Tip".to_string()],
        modifiers: armature
            .map(|name| Modifier::Armature { object: Some(name.to_string()) })
            .into_iter()
            .collect(),
        ..Default::default()
    }
}

/// A straight chain of `count` bones along +X
pub fn bone_chain(count: usize) -> ArmatureData {
    let bones = (0..count)
        .map(|i| {
            let name = match i {
                0 => "Root".to_string(),
                i if i == count - 1 => "Tip".to_string(),
                i => format!("Bone_{}", i),
            };
            let parent = match i {
                0 => None,
                1 => Some("Root".to_string()),
                i => Some(format!("Bone_{}", i - 1)),
            };
            let head = [i as f64, 0.0, 0.0];
            let tail = [i as f64 + 1.0, 0.0, 0.0];
            PoseBone {
                name,
                parent,
                head_local: head,
                tail_local: tail,
                head,
                tail,
                scale: [1.0; 3],
                length: 1.0,
            }
        })
        .collect();
    ArmatureData {
        pose_position: PosePosition::Rest,
        bones,
    }
}

/// `characters` rigged grids, each with its own armature
pub fn rigged_scene(characters: usize, grid: usize, bones: usize) -> SceneGraph {
    let mut objects = Vec::with_capacity(characters * 2);
    for i in 0..characters {
        let rig = format!("Rig_{}", i);
        objects.push(object(&rig, None, ObjectData::Armature(bone_chain(bones))));
        objects.push(object(
            &format!("Body_{}", i),
            Some(&rig),
            ObjectData::Mesh(grid_mesh(grid, Some(&rig))),
        ));
    }
    SceneGraph {
        objects,
        ..Default::default()
    }
}

/// Scene text with `count` nodes spread over a few levels, written out of order
pub fn scene_text(count: usize) -> String {
    let mut text = String::from("[gd_scene load_steps=3 format=2]\n\n");
    text.push_str("[ext_resource path=\"res://textures/b.png\" type=\"Texture\" id=2]\n\n");
    text.push_str("[ext_resource path=\"res://textures/a.png\" type=\"Texture\" id=1]\n\n");
    text.push_str("[node name=\"Level\" type=\"Node2D\"]\n\n");
    for i in 0..count {
        let parent = match i % 3 {
            0 => ".".to_string(),
            1 => format!("Group_{}", i - 1),
            _ => format!("Group_{}/Group_{}", i - 2, i - 1),
        };
        text.push_str(&format!(
            "[node name=\"Group_{}\" type=\"Polygon2D\" parent=\"{}\"]\n\
             texture = ExtResource( {} )\n\
             polygon = PoolVector2Array( 0.0, 0.0, 10.0, 0.0, 10.0, 10.0 )\n\n",
            i,
            parent,
            i % 2 + 1
        ));
    }
    text.push_str("[connection signal=\"ready\" from=\".\" to=\".\" method=\"_on_ready\"]\n");
    text
}
