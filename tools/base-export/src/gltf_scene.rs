//! glTF-backed scene (glTF/GLB -> [`SceneAdapter`])
//!
//! Loads the whole file up front: node hierarchy, triangulated world-space
//! meshes, one skin as the active armature and one animation clip that is
//! re-sampled whenever the active frame changes.

use anyhow::{bail, Context, Result};
use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation;
use gltf::mesh::Mode;
use hashbrown::{HashMap, HashSet};
use std::path::Path;

use crate::math::{mat3_to_euler, EulerOrder};
use crate::scene::{
    Armature, FrameRange, GroupWeight, MeshData, MeshEdge, MeshFace, MeshVertex, ObjectKind,
    RestBone, SceneAdapter, SceneObject,
};

/// Default sample rate for animations (frames per second)
pub const DEFAULT_FRAME_RATE: f32 = 24.0;

/// Length of bones without a child joint to point at
const LEAF_BONE_LENGTH: f32 = 0.1;

/// glTF is Y-up, the host is Z-up: (x, y, z) -> (x, -z, y)
const Y_UP_TO_Z_UP: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 1.0, 0.0),
    Vec4::new(0.0, -1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.0, 1.0),
);

/// Express a glTF space transform in host space
fn to_host(m: Mat4) -> Mat4 {
    Y_UP_TO_Z_UP * m * Y_UP_TO_Z_UP.transpose()
}

/// Which parts of the file to expose
#[derive(Clone, Debug, Default)]
pub struct GltfSceneOptions {
    /// Node names reported as selected (all nodes when empty)
    pub selected: Vec<String>,
    /// Skin used as the active armature (default: first)
    pub skin: Option<usize>,
    /// Animation sampled for frames (default: first)
    pub animation: Option<usize>,
    /// Sample rate (default: [`DEFAULT_FRAME_RATE`])
    pub frame_rate: Option<f32>,
}

#[derive(Clone, Copy, Debug)]
struct NodeTrs {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl NodeTrs {
    fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Clone, Debug)]
enum Keyframes {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

#[derive(Clone, Debug)]
struct Channel {
    node: usize,
    times: Vec<f32>,
    interpolation: Interpolation,
    keyframes: Keyframes,
}

impl Channel {
    fn apply(&self, trs: &mut NodeTrs, t: f32) {
        let Some((a, b, factor)) = keyframe_span(&self.times, t, self.interpolation) else {
            return;
        };
        match &self.keyframes {
            Keyframes::Translation(values) => trs.translation = values[a].lerp(values[b], factor),
            Keyframes::Rotation(values) => trs.rotation = values[a].slerp(values[b], factor),
            Keyframes::Scale(values) => trs.scale = values[a].lerp(values[b], factor),
        }
    }
}

/// Keyframe pair around `t` and the blend factor between them
fn keyframe_span(times: &[f32], t: f32, interpolation: Interpolation) -> Option<(usize, usize, f32)> {
    let last = times.len().checked_sub(1)?;

    let mut i = 0;
    while i < last && times[i + 1] <= t {
        i += 1;
    }
    if i == last {
        return Some((last, last, 0.0));
    }

    let (t0, t1) = (times[i], times[i + 1]);
    let factor = match interpolation {
        Interpolation::Step => 0.0,
        _ if t1 > t0 => ((t - t0) / (t1 - t0)).clamp(0.0, 1.0),
        _ => 0.0,
    };
    Some((i, i + 1, factor))
}

/// Cubic-spline outputs store (in-tangent, value, out-tangent) per key
fn keyframe_values<T: Copy>(values: Vec<T>, interpolation: Interpolation) -> Vec<T> {
    match interpolation {
        Interpolation::CubicSpline => values.chunks_exact(3).map(|key| key[1]).collect(),
        _ => values,
    }
}

/// Triangles of a primitive, strips and fans unrolled
fn primitive_triangles(mode: Mode, indices: &[u32]) -> Vec<[u32; 3]> {
    match mode {
        Mode::Triangles => indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect(),
        Mode::TriangleStrip => indices
            .windows(3)
            .enumerate()
            .map(|(i, t)| {
                if i % 2 == 0 {
                    [t[0], t[1], t[2]]
                } else {
                    [t[1], t[0], t[2]]
                }
            })
            .collect(),
        Mode::TriangleFan => match indices.split_first() {
            Some((&center, rest)) => rest
                .windows(2)
                .map(|pair| [center, pair[0], pair[1]])
                .collect(),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Line segments of a primitive, strips and loops unrolled
fn primitive_segments(mode: Mode, indices: &[u32]) -> Vec<[u32; 2]> {
    match mode {
        Mode::Lines => indices.chunks_exact(2).map(|s| [s[0], s[1]]).collect(),
        Mode::LineStrip => indices.windows(2).map(|s| [s[0], s[1]]).collect(),
        Mode::LineLoop => {
            let mut segments: Vec<[u32; 2]> =
                indices.windows(2).map(|s| [s[0], s[1]]).collect();
            if let (Some(&first), Some(&last)) = (indices.first(), indices.last()) {
                if indices.len() > 2 {
                    segments.push([last, first]);
                }
            }
            segments
        }
        _ => Vec::new(),
    }
}

/// Node names made unique in node order
fn unique_node_names(document: &gltf::Document) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    document
        .nodes()
        .map(|node| {
            let base = node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Node.{}", node.index()));
            let uses = seen.entry(base.clone()).or_insert(0);
            *uses += 1;
            if *uses == 1 {
                base
            } else {
                format!("{}.{:03}", base, *uses - 1)
            }
        })
        .collect()
}

fn read_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    world: Mat4,
    joint_names: Option<&[String]>,
) -> Result<MeshData> {
    let transform = Y_UP_TO_Z_UP * world;
    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();

    let mut data = MeshData::default();
    let mut corner_uvs: Vec<[f32; 2]> = Vec::new();
    let mut any_uvs = false;
    let mut missing_normals: Vec<bool> = Vec::new();

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .with_context(|| {
                format!(
                    "Primitive {} of mesh '{}' has no positions",
                    primitive.index(),
                    mesh.name().unwrap_or("unnamed")
                )
            })?
            .collect();
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|iter| iter.collect());
        let uvs: Option<Vec<[f32; 2]>> = reader
            .read_tex_coords(0)
            .map(|iter| iter.into_f32().collect());
        let joints: Option<Vec<[u16; 4]>> = reader.read_joints(0).map(|iter| iter.into_u16().collect());
        let weights: Option<Vec<[f32; 4]>> =
            reader.read_weights(0).map(|iter| iter.into_f32().collect());
        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let base = data.vertices.len() as u32;
        for (i, position) in positions.iter().enumerate() {
            let normal = normals.as_ref().and_then(|n| n.get(i));
            let mut vertex = MeshVertex::new(transform.transform_point3(Vec3::from_array(*position)));
            if let Some(normal) = normal {
                vertex.normal = (normal_matrix * Vec3::from_array(*normal)).normalize_or_zero();
            }
            missing_normals.push(normal.is_none());

            if let (Some(joints), Some(weights), Some(names)) = (&joints, &weights, joint_names) {
                if let (Some(joint_set), Some(weight_set)) = (joints.get(i), weights.get(i)) {
                    for (&joint, &weight) in joint_set.iter().zip(weight_set) {
                        if weight <= 0.0 {
                            continue;
                        }
                        if let Some(name) = names.get(joint as usize) {
                            vertex.groups.push(GroupWeight {
                                group: name.clone(),
                                weight,
                            });
                        }
                    }
                }
            }
            data.vertices.push(vertex);
        }

        let in_range = |index: &u32| (*index as usize) < positions.len();
        if let Some(&bad) = indices.iter().find(|i| !in_range(i)) {
            bail!(
                "Primitive {} of mesh '{}' indexes vertex {} of {}",
                primitive.index(),
                mesh.name().unwrap_or("unnamed"),
                bad,
                positions.len()
            );
        }

        let triangles = primitive_triangles(primitive.mode(), &indices);
        if !triangles.is_empty() && uvs.is_some() {
            any_uvs = true;
        }
        for triangle in triangles {
            let corners = triangle.map(|i| base + i);
            let [a, b, c] = corners.map(|i| data.vertices[i as usize].position);
            let normal = (b - a).cross(c - a).normalize_or_zero();
            for &corner in &corners {
                if missing_normals[corner as usize] {
                    data.vertices[corner as usize].normal += normal;
                }
            }
            for &local in &triangle {
                // glTF's texture origin is top-left, the host's bottom-left
                let uv = uvs
                    .as_ref()
                    .and_then(|uvs| uvs.get(local as usize))
                    .map_or([0.0, 0.0], |uv| [uv[0], 1.0 - uv[1]]);
                corner_uvs.push(uv);
            }
            data.faces.push(MeshFace {
                vertices: corners,
                normal,
            });
        }

        for segment in primitive_segments(primitive.mode(), &indices) {
            data.edges.push(MeshEdge {
                vertices: segment.map(|i| base + i),
                loose: true,
            });
        }
    }

    for (vertex, missing) in data.vertices.iter_mut().zip(&missing_normals) {
        if *missing {
            vertex.normal = vertex.normal.normalize_or_zero();
        }
    }
    if any_uvs {
        data.corner_uvs = Some(corner_uvs);
    }
    Ok(data)
}

/// A [`SceneAdapter`] over a loaded glTF file
#[derive(Clone, Debug)]
pub struct GltfScene {
    objects: Vec<SceneObject>,
    meshes: HashMap<String, MeshData>,
    armature: Option<Armature>,
    /// Parent of every node
    parents: Vec<Option<usize>>,
    /// Nodes in parent-before-child order
    node_order: Vec<usize>,
    rest: Vec<NodeTrs>,
    channels: Vec<Channel>,
    /// (bone name, node index) of the active skin
    joints: Vec<(String, usize)>,
    frame_rate: f32,
    range: FrameRange,
    poses: HashMap<String, Mat4>,
}

impl GltfScene {
    /// Load a .gltf or .glb file
    pub fn load(path: &Path, options: &GltfSceneOptions) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import(path).with_context(|| format!("Failed to load glTF: {:?}", path))?;
        Self::from_document(&document, &buffers, options)
    }

    /// Load from an in-memory .gltf (embedded buffers) or .glb
    pub fn from_slice(bytes: &[u8], options: &GltfSceneOptions) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import_slice(bytes).context("Failed to parse glTF data")?;
        Self::from_document(&document, &buffers, options)
    }

    pub fn from_document(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        options: &GltfSceneOptions,
    ) -> Result<Self> {
        let frame_rate = options.frame_rate.unwrap_or(DEFAULT_FRAME_RATE);
        if !(frame_rate > 0.0) {
            bail!("Frame rate must be positive, got {}", frame_rate);
        }

        let nodes: Vec<gltf::Node> = document.nodes().collect();
        let names = unique_node_names(document);
        let node_count = names.len();

        let mut parents = vec![None; node_count];
        let mut children = vec![Vec::new(); node_count];
        let mut rest = Vec::with_capacity(node_count);
        for node in &nodes {
            for child in node.children() {
                parents[child.index()] = Some(node.index());
                children[node.index()].push(child.index());
            }
            let (t, r, s) = node.transform().decomposed();
            rest.push(NodeTrs {
                translation: Vec3::from_array(t),
                rotation: Quat::from_array(r),
                scale: Vec3::from_array(s),
            });
        }

        // Depth-first, children in declaration order
        let mut node_order = Vec::with_capacity(node_count);
        let mut visited = vec![false; node_count];
        let mut stack: Vec<usize> = (0..node_count).filter(|&n| parents[n].is_none()).rev().collect();
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut visited[node], true) {
                continue;
            }
            node_order.push(node);
            stack.extend(children[node].iter().rev());
        }

        let rest_world = world_matrices(&parents, &node_order, rest.iter().map(NodeTrs::matrix).collect());

        let skin = match options.skin {
            Some(index) => Some(
                document
                    .skins()
                    .nth(index)
                    .with_context(|| format!("Skin index {} not found in glTF", index))?,
            ),
            None => document.skins().next(),
        };
        let all_joints: HashSet<usize> = document
            .skins()
            .flat_map(|s| s.joints().map(|j| j.index()).collect::<Vec<_>>())
            .collect();

        let selected: HashSet<&str> = options.selected.iter().map(String::as_str).collect();
        let is_selected = |name: &str| selected.is_empty() || selected.contains(name);

        // Scene objects in depth-first order from the scene's root nodes
        let scene_roots: Vec<usize> = match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => (0..node_count).filter(|&n| parents[n].is_none()).collect(),
        };
        let mut objects = Vec::new();
        let mut meshes = HashMap::new();
        let mut stack: Vec<usize> = scene_roots.into_iter().rev().collect();
        let mut seen = vec![false; node_count];
        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut seen[index], true) {
                continue;
            }
            stack.extend(children[index].iter().rev());
            if all_joints.contains(&index) {
                continue;
            }

            let node = &nodes[index];
            let name = names[index].clone();
            let local = rest[index];
            let kind = if node.mesh().is_some() {
                ObjectKind::Mesh
            } else {
                ObjectKind::Empty
            };

            if let Some(mesh) = node.mesh() {
                let joint_names: Option<Vec<String>> = node
                    .skin()
                    .map(|s| s.joints().map(|j| names[j.index()].clone()).collect());
                let data = read_mesh(&mesh, buffers, rest_world[index], joint_names.as_deref())
                    .with_context(|| format!("Failed to read mesh of node '{}'", name))?;
                meshes.insert(name.clone(), data);
            }

            let rotation = Mat3::from_mat4(to_host(Mat4::from_quat(local.rotation)));
            objects.push(SceneObject {
                selected: is_selected(&name),
                world: to_host(rest_world[index]),
                scale: Vec3::new(local.scale.x, local.scale.z, local.scale.y),
                rotation_euler: mat3_to_euler(&rotation, EulerOrder::Xyz),
                name,
                kind,
            });
        }

        let (armature, joints) = match &skin {
            Some(skin) => {
                let (armature, joints) = read_armature(skin, buffers, &names, &parents, &rest_world)?;
                let mut object = SceneObject::new(armature.name.clone(), ObjectKind::Armature);
                object.selected = is_selected(&armature.name);
                objects.push(object);
                (Some(armature), joints)
            }
            None => (None, Vec::new()),
        };

        let animation = match options.animation {
            Some(index) => Some(
                document
                    .animations()
                    .nth(index)
                    .with_context(|| format!("Animation index {} not found in glTF", index))?,
            ),
            None => document.animations().next(),
        };
        let (channels, range) = match &animation {
            Some(animation) => {
                let channels = read_channels(animation, buffers)?;
                let duration = channels
                    .iter()
                    .filter_map(|c| c.times.last().copied())
                    .fold(0.0f32, f32::max);
                let end = (duration * frame_rate).ceil() as i32 + 1;
                tracing::info!(
                    "Animation '{}': {} channels, {:.2}s, frames 1..={}",
                    animation.name().unwrap_or("unnamed"),
                    channels.len(),
                    duration,
                    end
                );
                (
                    channels,
                    FrameRange {
                        current: 1,
                        start: 1,
                        end,
                    },
                )
            }
            None => (
                Vec::new(),
                FrameRange {
                    current: 1,
                    start: 1,
                    end: 0,
                },
            ),
        };

        let mut scene = Self {
            objects,
            meshes,
            armature,
            parents,
            node_order,
            rest,
            channels,
            joints,
            frame_rate,
            range,
            poses: HashMap::new(),
        };
        scene.update_poses();
        Ok(scene)
    }

    /// Seconds since the first frame
    fn frame_time(&self) -> f32 {
        (self.range.current - self.range.start) as f32 / self.frame_rate
    }

    fn update_poses(&mut self) {
        let t = self.frame_time();
        let mut locals = self.rest.clone();
        for channel in &self.channels {
            if let Some(trs) = locals.get_mut(channel.node) {
                channel.apply(trs, t);
            }
        }
        let world = world_matrices(
            &self.parents,
            &self.node_order,
            locals.iter().map(NodeTrs::matrix).collect(),
        );
        self.poses = self
            .joints
            .iter()
            .map(|(name, node)| (name.clone(), to_host(world[*node])))
            .collect();
    }
}

/// Compose local transforms down the hierarchy
fn world_matrices(parents: &[Option<usize>], order: &[usize], locals: Vec<Mat4>) -> Vec<Mat4> {
    let mut world = locals;
    for &node in order {
        if let Some(parent) = parents[node] {
            world[node] = world[parent] * world[node];
        }
    }
    world
}

fn read_armature(
    skin: &gltf::Skin,
    buffers: &[gltf::buffer::Data],
    names: &[String],
    parents: &[Option<usize>],
    rest_world: &[Mat4],
) -> Result<(Armature, Vec<(String, usize)>)> {
    let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();
    let joint_of: HashMap<usize, usize> = joints.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let bind: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
        Some(iter) => {
            let ibms: Vec<Mat4> = iter.map(|m| Mat4::from_cols_array_2d(&m)).collect();
            if ibms.len() != joints.len() {
                bail!(
                    "Skin has {} inverse bind matrices for {} joints",
                    ibms.len(),
                    joints.len()
                );
            }
            ibms.iter().map(Mat4::inverse).collect()
        }
        None => joints.iter().map(|&n| rest_world[n]).collect(),
    };

    // Closest ancestor that is a joint of this skin
    let parent_joint: Vec<Option<usize>> = joints
        .iter()
        .map(|&node| {
            let mut current = parents[node];
            while let Some(ancestor) = current {
                if let Some(&joint) = joint_of.get(&ancestor) {
                    return Some(joint);
                }
                current = parents[ancestor];
            }
            None
        })
        .collect();

    let matrices: Vec<Mat4> = bind.iter().map(|&m| to_host(m)).collect();
    let heads: Vec<Vec3> = matrices.iter().map(|m| m.w_axis.truncate()).collect();

    let tails: Vec<Vec3> = (0..joints.len())
        .map(|joint| {
            let child_head = (0..joints.len())
                .find(|&c| parent_joint[c] == Some(joint))
                .map(|c| heads[c])
                .filter(|&h| h.distance(heads[joint]) > 1e-6);
            child_head.unwrap_or_else(|| {
                let axis = Y_UP_TO_Z_UP
                    .transform_vector3(bind[joint].y_axis.truncate())
                    .normalize_or_zero();
                let axis = if axis == Vec3::ZERO { Vec3::Z } else { axis };
                heads[joint] + axis * LEAF_BONE_LENGTH
            })
        })
        .collect();

    let bones = (0..joints.len())
        .map(|joint| {
            let parent = parent_joint[joint];
            let head = match parent {
                // Relative to the parent's tail, in the parent's rest space
                Some(p) => matrices[p]
                    .inverse()
                    .transform_vector3(heads[joint] - tails[p]),
                None => heads[joint],
            };
            RestBone {
                name: names[joints[joint]].clone(),
                parent: parent.map(|p| names[joints[p]].clone()),
                head,
                head_local: heads[joint],
                tail_local: tails[joint],
                matrix_local: matrices[joint],
                use_connect: false,
                rotation_mode: "QUATERNION".to_string(),
            }
        })
        .collect();

    let armature = Armature {
        name: skin.name().unwrap_or("Armature").to_string(),
        bones,
    };
    tracing::debug!(
        "Skin '{}': {} joints",
        armature.name,
        armature.bones.len()
    );

    let joints = joints.iter().map(|&n| (names[n].clone(), n)).collect();
    Ok((armature, joints))
}

fn read_channels(animation: &gltf::Animation, buffers: &[gltf::buffer::Data]) -> Result<Vec<Channel>> {
    let mut channels = Vec::new();
    for channel in animation.channels() {
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let interpolation = channel.sampler().interpolation();
        let times: Vec<f32> = reader
            .read_inputs()
            .context("Animation channel has no input times")?
            .collect();
        let keyframes = match reader
            .read_outputs()
            .context("Animation channel has no output values")?
        {
            ReadOutputs::Translations(iter) => Keyframes::Translation(keyframe_values(
                iter.map(Vec3::from_array).collect(),
                interpolation,
            )),
            ReadOutputs::Rotations(rotations) => Keyframes::Rotation(keyframe_values(
                rotations
                    .into_f32()
                    .map(|r| Quat::from_array(r).normalize())
                    .collect(),
                interpolation,
            )),
            ReadOutputs::Scales(iter) => Keyframes::Scale(keyframe_values(
                iter.map(Vec3::from_array).collect(),
                interpolation,
            )),
            // Ignore morph target weights
            ReadOutputs::MorphTargetWeights(_) => continue,
        };

        let values = match &keyframes {
            Keyframes::Translation(v) | Keyframes::Scale(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
        };
        if values < times.len() {
            bail!(
                "Animation channel has {} keyframes but {} values",
                times.len(),
                values
            );
        }

        channels.push(Channel {
            node: channel.target().node().index(),
            times,
            interpolation,
            keyframes,
        });
    }
    Ok(channels)
}

impl SceneAdapter for GltfScene {
    fn objects(&self) -> Vec<SceneObject> {
        self.objects.clone()
    }

    fn evaluated_mesh(&self, object: &SceneObject) -> Option<MeshData> {
        if object.kind != ObjectKind::Mesh {
            return None;
        }
        self.meshes.get(&object.name).cloned()
    }

    fn active_armature(&self) -> Option<Armature> {
        self.armature.clone()
    }

    fn frame_range(&self) -> FrameRange {
        self.range
    }

    fn set_frame(&mut self, frame: i32) {
        self.range.current = frame;
        self.update_poses();
    }

    fn pose_matrix(&self, armature: &str, bone: &str) -> Option<Mat4> {
        match &self.armature {
            Some(active) if active.name == armature => self.poses.get(bone).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_conversion() {
        let p = Y_UP_TO_Z_UP.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p, Vec3::new(1.0, -3.0, 2.0));

        // A glTF translation up (+Y) becomes a host translation up (+Z).
        let up = to_host(Mat4::from_translation(Vec3::Y));
        assert_eq!(up.w_axis.truncate(), Vec3::Z);
    }

    #[test]
    fn test_keyframe_span_linear() {
        let times = [0.0, 1.0, 3.0];
        assert_eq!(keyframe_span(&times, -1.0, Interpolation::Linear), Some((0, 1, 0.0)));
        assert_eq!(keyframe_span(&times, 0.5, Interpolation::Linear), Some((0, 1, 0.5)));
        assert_eq!(keyframe_span(&times, 2.0, Interpolation::Linear), Some((1, 2, 0.5)));
        assert_eq!(keyframe_span(&times, 9.0, Interpolation::Linear), Some((2, 2, 0.0)));
        assert_eq!(keyframe_span(&[], 0.0, Interpolation::Linear), None);
    }

    #[test]
    fn test_keyframe_span_step_holds_value() {
        let times = [0.0, 1.0];
        assert_eq!(keyframe_span(&times, 0.9, Interpolation::Step), Some((0, 1, 0.0)));
        assert_eq!(keyframe_span(&times, 1.0, Interpolation::Step), Some((1, 1, 0.0)));
    }

    #[test]
    fn test_cubic_spline_uses_key_values() {
        let values = vec![0, 1, 2, 10, 11, 12];
        assert_eq!(keyframe_values(values, Interpolation::CubicSpline), vec![1, 11]);
    }

    #[test]
    fn test_channel_interpolates_translation_and_rotation() {
        let mut trs = NodeTrs {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        };
        let move_up = Channel {
            node: 0,
            times: vec![0.0, 1.0],
            interpolation: Interpolation::Linear,
            keyframes: Keyframes::Translation(vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)]),
        };
        let turn = Channel {
            node: 0,
            times: vec![0.0, 1.0],
            interpolation: Interpolation::Linear,
            keyframes: Keyframes::Rotation(vec![
                Quat::IDENTITY,
                Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ]),
        };
        move_up.apply(&mut trs, 0.5);
        turn.apply(&mut trs, 0.5);

        assert_eq!(trs.translation, Vec3::new(0.0, 1.0, 0.0));
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(trs.rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_strips_and_fans_are_unrolled() {
        assert_eq!(
            primitive_triangles(Mode::TriangleStrip, &[0, 1, 2, 3]),
            vec![[0, 1, 2], [2, 1, 3]]
        );
        assert_eq!(
            primitive_triangles(Mode::TriangleFan, &[0, 1, 2, 3]),
            vec![[0, 1, 2], [0, 2, 3]]
        );
        assert!(primitive_triangles(Mode::Lines, &[0, 1]).is_empty());
    }

    #[test]
    fn test_line_modes() {
        assert_eq!(primitive_segments(Mode::Lines, &[0, 1, 2, 3]), vec![[0, 1], [2, 3]]);
        assert_eq!(primitive_segments(Mode::LineStrip, &[0, 1, 2]), vec![[0, 1], [1, 2]]);
        assert_eq!(
            primitive_segments(Mode::LineLoop, &[0, 1, 2]),
            vec![[0, 1], [1, 2], [2, 0]]
        );
        assert!(primitive_segments(Mode::Points, &[0, 1]).is_empty());
    }

    #[test]
    fn test_world_matrices_follow_parents() {
        let parents = [None, Some(0), Some(1)];
        let locals = vec![Mat4::from_translation(Vec3::X); 3];
        let world = world_matrices(&parents, &[0, 1, 2], locals);
        assert_eq!(world[2].w_axis.truncate(), Vec3::new(3.0, 0.0, 0.0));
    }
}
