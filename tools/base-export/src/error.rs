//! Error types for the export pipeline

use thiserror::Error;

/// Failure that aborts an export.
///
/// Objects the host cannot turn into geometry are not errors: the pipeline
/// skips them and keeps going. Everything here stops the whole export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Texture coordinates were requested but the mesh has no active UV layer
    #[error("object '{object}' has no active UV layer but texture coordinates were requested")]
    MissingUvLayer { object: String },

    /// Bounds were requested for a vertex buffer with no vertices
    #[error("cannot compute bounds of an empty vertex buffer")]
    EmptyVertexBuffer,

    /// A faced vertex has no skin group, so it has no block to live in
    #[error("vertex {vertex} of object '{object}' belongs to no skin group")]
    UngroupedVertex { object: String, vertex: usize },

    /// Mesh buffers handed over by the host are inconsistent
    #[error("malformed mesh for object '{object}': {reason}")]
    MalformedMesh { object: String, reason: String },

    /// Skeleton export was requested but there is no armature to export
    #[error("skeleton export requested but the scene has no active armature")]
    MissingArmature,

    /// The host returned no pose matrix for a bone
    #[error("armature '{armature}' has no pose for bone '{bone}'")]
    MissingPose { armature: String, bone: String },

    /// Bone parent links do not form a tree
    #[error("armature '{armature}' has a broken bone hierarchy: {reason}")]
    BrokenHierarchy { armature: String, reason: String },

    /// Writing to the output stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the library
pub type Result<T, E = ExportError> = std::result::Result<T, E>;
