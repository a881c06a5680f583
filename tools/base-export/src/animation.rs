//! Animation sampling (host pose per frame -> `frames` block)
//!
//! Every bone is sampled relative to its parent and decomposed into Euler
//! angles. Each frame's decomposition is steered toward the previous frame's
//! rotation so interpolating between frames never spins the long way round.

use glam::{Mat3, Mat4, Vec3};

use crate::error::{ExportError, Result};
use crate::math::{emitted_degrees, mat3_to_compatible_euler, EulerOrder};
use crate::scene::{Armature, FrameRange, SceneAdapter};
use crate::skeleton::Skeleton;

/// Per-export rest data of a bone, in serialization order
#[derive(Clone, Debug)]
pub struct DecoratedBone {
    pub name: String,
    /// Linear index of the parent
    pub parent: Option<usize>,
    pub rest_arm: Mat4,
    pub rest_arm_inv: Mat4,
    pub head_local: Vec3,
    /// Head relative to the parent
    pub head: Vec3,
    /// Host rotation order
    pub rotation_order: EulerOrder,
    /// Order used to decompose sampled matrices (reverse of rotation order)
    pub decompose_order: EulerOrder,
    /// Connected to its parent, so it never translates on its own
    pub skip_position: bool,
}

/// Sampled transform of one bone for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BonePose {
    /// Parent-relative translation, `None` for connected bones
    pub translation: Option<Vec3>,
    /// Euler rotation in radians, indexed by axis
    pub rotation: Vec3,
}

/// All bones of one frame, in serialization order
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    pub frame: i32,
    pub poses: Vec<BonePose>,
}

impl AnimationFrame {
    /// Rotations as written: negated degrees with noise snapped to zero
    pub fn emitted_rotations(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.poses.iter().map(|pose| emitted_degrees(pose.rotation))
    }
}

/// Attach rest matrices and rotation orders to linearized bones
pub fn decorate(skeleton: &Skeleton, armature: &Armature) -> Vec<DecoratedBone> {
    skeleton
        .bones
        .iter()
        .map(|bone| {
            let rest = &armature.bones[bone.source];
            let rotation_order = EulerOrder::from_rotation_mode(&rest.rotation_mode);
            DecoratedBone {
                name: bone.name.clone(),
                parent: bone.parent,
                rest_arm: rest.matrix_local,
                rest_arm_inv: rest.matrix_local.inverse(),
                head_local: rest.head_local,
                head: rest.head,
                rotation_order,
                decompose_order: rotation_order.reversed(),
                skip_position: rest.use_connect && bone.parent.is_some(),
            }
        })
        .collect()
}

/// Sample one bone.
///
/// `parent` carries the parent's rest data and current pose. `previous` is
/// the rotation emitted for this bone on the previous frame.
pub fn sample_bone(
    bone: &DecoratedBone,
    pose: Mat4,
    parent: Option<(&DecoratedBone, Mat4)>,
    previous: Vec3,
) -> BonePose {
    let to_head = Mat4::from_translation(bone.head_local);
    let from_head = Mat4::from_translation(-bone.head_local);

    let (local, offset) = match parent {
        Some((parent, parent_pose)) => (
            parent.rest_arm * parent_pose.inverse() * pose * bone.rest_arm_inv,
            bone.head_local - parent.head_local,
        ),
        None => (pose * bone.rest_arm_inv, bone.head),
    };
    let local = from_head * local * to_head;

    let translation = (!bone.skip_position).then(|| local.w_axis.truncate() + offset);
    let rotation = mat3_to_compatible_euler(&Mat3::from_mat4(local), bone.decompose_order, previous);

    BonePose {
        translation,
        rotation,
    }
}

/// Sample every bone of one frame from its pose matrices.
///
/// `previous` holds last frame's rotations in the same order and is the
/// accumulator for continuity; pass zeros for the first frame.
pub fn sample_frame(bones: &[DecoratedBone], poses: &[Mat4], previous: &[Vec3]) -> Vec<BonePose> {
    bones
        .iter()
        .zip(poses)
        .zip(previous)
        .map(|((bone, &pose), &prev)| {
            let parent = bone.parent.map(|p| (&bones[p], poses[p]));
            sample_bone(bone, pose, parent, prev)
        })
        .collect()
}

/// Query the current pose of every bone in serialization order
fn query_poses<S: SceneAdapter + ?Sized>(
    scene: &S,
    armature: &str,
    bones: &[DecoratedBone],
) -> Result<Vec<Mat4>> {
    bones
        .iter()
        .map(|bone| {
            scene
                .pose_matrix(armature, &bone.name)
                .ok_or_else(|| ExportError::MissingPose {
                    armature: armature.to_string(),
                    bone: bone.name.clone(),
                })
        })
        .collect()
}

fn sample_range<S: SceneAdapter + ?Sized>(
    scene: &mut S,
    armature: &str,
    bones: &[DecoratedBone],
    range: FrameRange,
) -> Result<Vec<AnimationFrame>> {
    let mut frames = Vec::with_capacity(range.frame_count());
    let mut previous = vec![Vec3::ZERO; bones.len()];

    for frame in range.start..=range.end {
        scene.set_frame(frame);
        let poses = query_poses(scene, armature, bones)?;
        let sampled = sample_frame(bones, &poses, &previous);
        previous = sampled.iter().map(|pose| pose.rotation).collect();
        frames.push(AnimationFrame {
            frame,
            poses: sampled,
        });
    }
    Ok(frames)
}

/// Sample the host's playback range for a linearized armature.
///
/// Returns `None` when the host has no finite range. The host's active
/// frame is restored afterwards, also when sampling fails.
pub fn sample_animation<S: SceneAdapter + ?Sized>(
    scene: &mut S,
    skeleton: &Skeleton,
    armature: &Armature,
) -> Result<Option<Vec<AnimationFrame>>> {
    let range = scene.frame_range();
    if !range.is_finite() {
        tracing::debug!("No finite frame range, skipping animation frames");
        return Ok(None);
    }

    let bones = decorate(skeleton, armature);
    let result = sample_range(scene, &armature.name, &bones, range);
    scene.set_frame(range.current);

    let frames = result?;
    tracing::info!(
        "Sampled {} frames ({}..={}) for {} bones",
        frames.len(),
        range.start,
        range.end,
        bones.len()
    );
    Ok(Some(frames))
}
