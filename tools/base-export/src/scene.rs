//! Host scene access
//!
//! The exporter never owns the scene. Everything it needs is queried
//! through [`SceneAdapter`], which a host (or [`crate::GltfScene`]) implements.
//!
//! Conventions for adapters:
//! - host space is Z-up;
//! - mesh data is already triangulated and transformed to world space;
//! - pose matrices are in armature space for the currently active frame.

use glam::{Mat4, Vec3};

/// What kind of scene object this is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Mesh,
    /// Point marker without geometry (exported as a sensor by the line format)
    Empty,
    Armature,
    Other,
}

/// One object of the host scene
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub selected: bool,
    /// Object to world transform
    pub world: Mat4,
    /// Local scale
    pub scale: Vec3,
    /// Local rotation as XYZ Euler angles (radians)
    pub rotation_euler: Vec3,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            selected: true,
            world: Mat4::IDENTITY,
            scale: Vec3::ONE,
            rotation_euler: Vec3::ZERO,
        }
    }

    /// World space location
    pub fn location(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}

/// Membership of a vertex in a named vertex group
#[derive(Clone, Debug, PartialEq)]
pub struct GroupWeight {
    pub group: String,
    pub weight: f32,
}

/// Host vertex
#[derive(Clone, Debug, Default)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    /// Group memberships in host order
    pub groups: Vec<GroupWeight>,
}

impl MeshVertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
            groups: Vec::new(),
        }
    }
}

/// Triangle face
#[derive(Clone, Copy, Debug)]
pub struct MeshFace {
    pub vertices: [u32; 3],
    pub normal: Vec3,
}

/// Mesh edge
#[derive(Clone, Copy, Debug)]
pub struct MeshEdge {
    pub vertices: [u32; 2],
    /// Edge used by no face
    pub loose: bool,
}

/// Evaluated, triangulated, world space mesh
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub faces: Vec<MeshFace>,
    pub edges: Vec<MeshEdge>,
    /// Active UV layer, one entry per face corner (3 per face)
    pub corner_uvs: Option<Vec<[f32; 2]>>,
}

impl MeshData {
    /// Number of face corners
    pub fn corner_count(&self) -> usize {
        self.faces.len() * 3
    }
}

/// Rest data of one bone
#[derive(Clone, Debug)]
pub struct RestBone {
    pub name: String,
    pub parent: Option<String>,
    /// Head relative to the parent (armature space for roots)
    pub head: Vec3,
    /// Head in armature space
    pub head_local: Vec3,
    /// Tail in armature space
    pub tail_local: Vec3,
    /// Rest transform in armature space
    pub matrix_local: Mat4,
    /// Head is glued to the parent's tail
    pub use_connect: bool,
    /// Host rotation mode (`"XYZ"`, `"QUATERNION"`, ...)
    pub rotation_mode: String,
}

/// Bone hierarchy of an armature, bones in host enumeration order
#[derive(Clone, Debug)]
pub struct Armature {
    pub name: String,
    pub bones: Vec<RestBone>,
}

/// Playback range reported by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRange {
    pub current: i32,
    pub start: i32,
    pub end: i32,
}

impl FrameRange {
    /// An end frame of 0 means the host has no finite range
    pub fn is_finite(&self) -> bool {
        self.end != 0
    }

    pub fn frame_count(&self) -> usize {
        (self.end - self.start + 1).max(0) as usize
    }
}

/// Read-only view of a host scene, plus the active frame setter
pub trait SceneAdapter {
    /// All objects in host enumeration order
    fn objects(&self) -> Vec<SceneObject>;

    /// Evaluated geometry for an object, `None` when the host cannot
    /// produce a mesh for it
    fn evaluated_mesh(&self, object: &SceneObject) -> Option<MeshData>;

    /// Armature used for skeleton and animation export
    fn active_armature(&self) -> Option<Armature>;

    fn frame_range(&self) -> FrameRange;

    /// Make `frame` the active frame
    fn set_frame(&mut self, frame: i32);

    /// Pose matrix of a bone at the active frame (armature space)
    fn pose_matrix(&self, armature: &str, bone: &str) -> Option<Mat4>;
}
