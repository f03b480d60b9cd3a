//! Skeleton2D and Bone2D nodes from armatures
//!
//! Bone transforms are relative to the parent bone: the head offset from the
//! parent's head is rotated into the parent's frame, and the bone angle has
//! the parent's angle taken away.

use super::{node_header, EmitContext, EmittedNode};
use crate::geometry::{bone_angle, fmt_real, normalize_angle, rotate_around_point, to_target_position};
use crate::hierarchy::ExportCandidate;
use crate::path_utils::sanitize_node_name;
use crate::progress::{JobTicker, ProgressSink};
use crate::types::{ArmatureData, PoseBone, PosePosition, SceneObject};

/// Build the Skeleton2D node for an armature candidate
pub fn skeleton_node(ctx: &EmitContext, candidate: &ExportCandidate, object: &SceneObject) -> EmittedNode {
    let name = candidate.node_name();
    let transform = ctx
        .resolver
        .relative_transform(object, &candidate.ancestors, ctx.grammar, ctx.pixels_per_unit);

    let mut text = node_header(&name, "Skeleton2D", &candidate.parent_path);
    text.push_str(&transform.lines(ctx.grammar));

    EmittedNode {
        parent: candidate.parent_path.clone(),
        name,
        text,
    }
}

/// Head and tail of a bone in the xy plane
#[derive(Clone, Copy)]
struct Segment {
    head: [f64; 2],
    tail: [f64; 2],
}

impl Segment {
    fn rest(bone: &PoseBone) -> Self {
        Self {
            head: [bone.head_local[0], bone.head_local[1]],
            tail: [bone.tail_local[0], bone.tail_local[1]],
        }
    }

    fn pose(bone: &PoseBone) -> Self {
        Self {
            head: [bone.head[0], bone.head[1]],
            tail: [bone.tail[0], bone.tail[1]],
        }
    }

    fn angle(&self) -> f64 {
        bone_angle(self.head, self.tail)
    }
}

/// Position (target pixels) and angle of a bone relative to its parent
fn local_placement(segment: Segment, parent: Option<Segment>, pixels_per_unit: f64) -> ([f64; 2], f64) {
    let (parent_head, parent_angle) = parent.map_or(([0.0, 0.0], 0.0), |p| (p.head, p.angle()));
    let offset = [segment.head[0] - parent_head[0], segment.head[1] - parent_head[1]];
    let rotated = rotate_around_point(offset, parent_angle, [0.0, 0.0]);
    let position = to_target_position(rotated[0], rotated[1], pixels_per_unit);
    (position, normalize_angle(segment.angle() - parent_angle))
}

fn bone_node(ctx: &EmitContext, armature: &ArmatureData, bone: &PoseBone, skeleton_path: &str) -> EmittedNode {
    let grammar = ctx.grammar;
    let ppu = ctx.pixels_per_unit;
    let parent_bone = bone.parent.as_deref().and_then(|name| armature.bone(name));

    let (rest_position, rest_angle) = local_placement(Segment::rest(bone), parent_bone.map(Segment::rest), ppu);
    let (position, angle) = match armature.pose_position {
        PosePosition::Pose => local_placement(Segment::pose(bone), parent_bone.map(Segment::pose), ppu),
        PosePosition::Rest => (rest_position, rest_angle),
    };

    let parent = std::iter::once(skeleton_path.to_string())
        .chain(armature.ancestor_names(bone).into_iter().map(sanitize_node_name))
        .collect::<Vec<_>>()
        .join("/");
    let name = sanitize_node_name(&bone.name);

    let (sin, cos) = rest_angle.sin_cos();
    let mut text = node_header(&name, "Bone2D", &parent);
    text.push_str(&format!(
        "{} = Vector2( {}, {} )\n{} = {}\n{} = Vector2( {}, {} )\n",
        grammar.position_key,
        fmt_real(position[0]),
        fmt_real(position[1]),
        grammar.rotation_key,
        fmt_real(angle),
        grammar.scale_key,
        fmt_real(bone.scale[0]),
        fmt_real(bone.scale[1]),
    ));
    text.push_str(&format!(
        "rest = Transform2D( {}, {}, {}, {}, {}, {} )\n",
        fmt_real(cos),
        fmt_real(sin),
        fmt_real(-sin),
        fmt_real(cos),
        fmt_real(rest_position[0]),
        fmt_real(rest_position[1]),
    ));
    if grammar.has_bone_angle() {
        text.push_str("auto_calculate_length_and_angle = false\n");
    }
    text.push_str(&format!("{} = {}\n", grammar.bone_length_key, fmt_real(bone.length * ppu)));
    if grammar.has_bone_angle() {
        text.push_str("bone_angle = 0\n");
    }

    EmittedNode { parent, name, text }
}

/// Build one Bone2D node per pose bone, in armature order
pub fn bone_nodes(
    ctx: &EmitContext,
    candidate: &ExportCandidate,
    armature: &ArmatureData,
    progress: &mut dyn ProgressSink,
) -> Vec<EmittedNode> {
    let skeleton_path = candidate.node_path();
    let mut ticker = JobTicker::start(progress, "Building Bone2D nodes", armature.bones.len());
    armature
        .bones
        .iter()
        .map(|bone| {
            ticker.tick();
            bone_node(ctx, armature, bone, &skeleton_path)
        })
        .collect()
}
