//! Polygon2D nodes from meshes
//!
//! A Polygon2D stores its outline first: the vertices of the outer boundary
//! loop in order around the loop, then every other vertex as an internal
//! vertex. Source meshes are reindexed into that layout before anything is
//! written, and polygons, UVs and bone weights follow the new indices.

use indexmap::IndexMap;

use super::{node_header, EmitContext, EmittedNode};
use crate::error::{ExportError, ExportResult};
use crate::geometry::join_reals;
use crate::hierarchy::{Ancestor, ExportCandidate, HierarchyResolver};
use crate::path_utils::sanitize_node_name;
use crate::progress::{JobTicker, ProgressSink};
use crate::types::{ArmatureData, MeshData, Modifier, ObjectData, PoseBone, SceneObject};

/// Reindexing of mesh vertices into boundary-first order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexMap {
    /// Source vertex index for each new index
    pub order: Vec<usize>,
    /// New index for each source vertex index
    pub new_index: Vec<usize>,
    /// Vertices after the boundary loop
    pub internal_count: usize,
}

/// Build the boundary-first vertex order of a mesh
///
/// The walk starts at the lowest-indexed boundary vertex and follows boundary
/// edges (edges used by exactly one face) in the order they were first seen.
/// Vertices the walk does not reach are appended in ascending index order and
/// counted as internal. Polygon indices must be in range.
pub fn vertex_map(mesh: &MeshData, progress: &mut dyn ProgressSink) -> VertexMap {
    let count = mesh.vertices.len();

    let mut edges: IndexMap<(usize, usize), usize> = IndexMap::new();
    for polygon in &mesh.polygons {
        for (corner, &a) in polygon.iter().enumerate() {
            let b = polygon[(corner + 1) % polygon.len()];
            if a != b {
                *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
    }

    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (&(a, b), _) in edges.iter().filter(|(_, faces)| **faces == 1) {
        neighbours[a].push(b);
        neighbours[b].push(a);
    }

    let mut ticker = JobTicker::start(progress, "Building vertex index map", count);
    let mut placed = vec![false; count];
    let mut order = Vec::with_capacity(count);

    if let Some(first) = (0..count).find(|v| !neighbours[*v].is_empty()) {
        placed[first] = true;
        order.push(first);
        ticker.tick();

        let mut cursor = 0;
        while cursor < order.len() {
            let vertex = order[cursor];
            if let Some(&next) = neighbours[vertex].iter().find(|n| !placed[**n]) {
                placed[next] = true;
                order.push(next);
                ticker.tick();
            }
            cursor += 1;
        }
    }

    let boundary = order.len();
    for vertex in 0..count {
        if !placed[vertex] {
            order.push(vertex);
            ticker.tick();
        }
    }

    let mut new_index = vec![0; count];
    for (new, &old) in order.iter().enumerate() {
        new_index[old] = new;
    }

    VertexMap {
        order,
        new_index,
        internal_count: count - boundary,
    }
}

/// The armature deforming a mesh: its first armature modifier whose object is exported
pub fn linked_armature<'a>(
    resolver: &HierarchyResolver<'a>,
    mesh: &MeshData,
) -> Option<(&'a SceneObject, &'a ArmatureData)> {
    let scene = resolver.scene();
    mesh.modifiers
        .iter()
        .filter_map(|modifier| match modifier {
            Modifier::Armature { object: Some(name) } => Some(name.as_str()),
            _ => None,
        })
        .filter(|name| resolver.is_exported(name))
        .find_map(|name| {
            let object = scene.object(name)?;
            match &object.data {
                ObjectData::Armature(armature) => Some((object, armature)),
                _ => None,
            }
        })
}

/// Relative NodePath from a mesh node to its armature node
///
/// Both chains include the node itself. The path climbs out of the mesh chain
/// to the longest common prefix, then descends the rest of the armature chain.
pub fn skeleton_path(
    mesh_ancestors: &[Ancestor],
    mesh_name: &str,
    armature_ancestors: &[Ancestor],
    armature_name: &str,
) -> String {
    let mesh_chain: Vec<String> = mesh_ancestors
        .iter()
        .map(|a| a.name.as_str())
        .chain(std::iter::once(mesh_name))
        .map(sanitize_node_name)
        .collect();
    let armature_chain: Vec<String> = armature_ancestors
        .iter()
        .map(|a| a.name.as_str())
        .chain(std::iter::once(armature_name))
        .map(sanitize_node_name)
        .collect();

    let common = mesh_chain
        .iter()
        .zip(&armature_chain)
        .take_while(|(a, b)| a == b)
        .count();

    std::iter::repeat("..")
        .take(mesh_chain.len() - common)
        .chain(armature_chain[common..].iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("/")
}

/// Bone weight key: the bone's path below its skeleton
fn bone_key(armature: &ArmatureData, bone: &PoseBone) -> String {
    armature
        .ancestor_names(bone)
        .into_iter()
        .chain(std::iter::once(bone.name.as_str()))
        .map(sanitize_node_name)
        .collect::<Vec<_>>()
        .join("/")
}

struct VertexData {
    positions: Vec<f64>,
    uvs: Vec<f64>,
    /// (bone key, weight per new vertex index)
    weights: Vec<(String, Vec<f64>)>,
}

fn vertex_data(
    ctx: &EmitContext,
    mesh: &MeshData,
    map: &VertexMap,
    armature: Option<&ArmatureData>,
    progress: &mut dyn ProgressSink,
) -> VertexData {
    let count = mesh.vertices.len();
    let ppu = ctx.pixels_per_unit;
    let (width, height) = mesh
        .texture
        .as_ref()
        .map_or((1.0, 1.0), |t| (f64::from(t.width), f64::from(t.height)));

    // first face corner of each vertex
    let layer = mesh.active_uv_layer();
    let mut first_loop: Vec<Option<usize>> = vec![None; count];
    if layer.is_some() {
        let mut ticker = JobTicker::start(progress, "Building loop index map", mesh.loop_count());
        let corners = mesh.polygons.iter().flatten().enumerate();
        for (loop_index, &vertex) in corners {
            ticker.tick();
            first_loop[vertex].get_or_insert(loop_index);
        }
    }

    let mut weights: Vec<(String, Vec<f64>)> = armature
        .map(|armature| {
            armature
                .bones
                .iter()
                .map(|bone| (bone_key(armature, bone), vec![0.0; count]))
                .collect()
        })
        .unwrap_or_default();

    let mut positions = vec![0.0; count * 2];
    let mut uvs = if layer.is_some() { vec![0.0; count * 2] } else { Vec::new() };

    let mut ticker = JobTicker::start(progress, "Gathering vertex data", count);
    for (source, vertex) in mesh.vertices.iter().enumerate() {
        ticker.tick();
        let index = map.new_index[source];

        if let Some(armature) = armature {
            for group in &vertex.groups {
                let Some(name) = mesh.vertex_groups.get(group.group) else {
                    continue;
                };
                if let Some(slot) = armature.bones.iter().position(|b| &b.name == name) {
                    weights[slot].1[index] = group.weight;
                }
            }
        }

        if let Some(layer) = layer {
            let uv = first_loop[source]
                .and_then(|l| layer.uvs.get(l))
                .copied()
                .unwrap_or([0.0, 0.0]);
            uvs[index * 2] = uv[0] * width;
            uvs[index * 2 + 1] = height - uv[1] * height;
        }

        positions[index * 2] = vertex.co[0] * ppu;
        positions[index * 2 + 1] = -vertex.co[1] * ppu;
    }

    VertexData { positions, uvs, weights }
}

fn polygons_value(ctx: &EmitContext, mesh: &MeshData, map: &VertexMap, progress: &mut dyn ProgressSink) -> String {
    let mut ticker = JobTicker::start(progress, "Building polygons", mesh.polygons.len());
    let polygons: Vec<String> = mesh
        .polygons
        .iter()
        .map(|polygon| {
            ticker.tick();
            let indices: Vec<String> = polygon.iter().map(|v| map.new_index[*v].to_string()).collect();
            format!("{}( {} )", ctx.grammar.int_array, indices.join(", "))
        })
        .collect();
    polygons.join(", ")
}

/// Build the Polygon2D node for a mesh candidate
///
/// `texture` is the id token of the external resource holding the mesh's
/// texture, if it has one.
pub fn polygon_node(
    ctx: &EmitContext,
    candidate: &ExportCandidate,
    object: &SceneObject,
    mesh: &MeshData,
    texture: Option<&str>,
    progress: &mut dyn ProgressSink,
) -> ExportResult<EmittedNode> {
    mesh.validate().map_err(|reason| ExportError::InvalidMesh {
        object: object.name.clone(),
        reason,
    })?;

    let grammar = ctx.grammar;
    let map = vertex_map(mesh, progress);
    let linked = linked_armature(ctx.resolver, mesh);
    let mut data = vertex_data(ctx, mesh, &map, linked.map(|(_, armature)| armature), progress);
    let transform = ctx
        .resolver
        .relative_transform(object, &candidate.ancestors, grammar, ctx.pixels_per_unit);

    let internal_lines = if grammar.version.supports_internal_vertices() {
        Some((
            format!("polygons = [ {} ]\n", polygons_value(ctx, mesh, &map, progress)),
            format!("internal_vertex_count = {}\n", map.internal_count),
        ))
    } else {
        let outline = mesh.vertices.len() - map.internal_count;
        data.positions.truncate(outline * 2);
        data.uvs.truncate(outline * 2);
        None
    };

    let name = candidate.node_name();
    let mut text = node_header(&name, "Polygon2D", &candidate.parent_path);
    if let Some(key) = texture {
        text.push_str(&format!("{} = {}\n", grammar.texture_key, grammar.ext_resource_ref(key)));
    }
    text.push_str(&transform.lines(grammar));

    if let Some((armature_object, _)) = linked {
        let armature_ancestors = ctx.resolver.object_ancestors(armature_object);
        let path = skeleton_path(&candidate.ancestors, &object.name, &armature_ancestors, &armature_object.name);
        text.push_str(&format!("skeleton = NodePath(\"{}\")\n", path));
    }

    text.push_str(&format!("polygon = {}( {} )\n", grammar.vector_array, join_reals(&data.positions)));
    text.push_str(&format!("uv = {}( {} )\n", grammar.vector_array, join_reals(&data.uvs)));

    if let Some((polygons, _)) = &internal_lines {
        text.push_str(polygons);
    }

    if linked.is_some() {
        let bones: Vec<String> = data
            .weights
            .iter()
            .map(|(key, weights)| {
                format!("\"{}\", {}( {} )", key, grammar.float_array, join_reals(weights))
            })
            .collect();
        text.push_str(&format!("bones = [ {} ]\n", bones.join(", ")));
    }

    if let Some((_, internal)) = &internal_lines {
        text.push_str(internal);
    }

    tracing::debug!(
        "Built Polygon2D {} ({} vertices, {} internal)",
        name,
        mesh.vertices.len(),
        map.internal_count
    );

    Ok(EmittedNode {
        parent: candidate.parent_path.clone(),
        name,
        text,
    })
}
