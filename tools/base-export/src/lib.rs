//! base-export library
//!
//! Converts a 3D scene into the engine's two text formats:
//! `.bel` (polylines, point clouds, sensors) and `.beo` (meshes, skin
//! groups, skeleton and per-frame bone rotations).
//!
//! The scene is reached through [`SceneAdapter`]; [`GltfScene`] implements it
//! for glTF/GLB files.

pub mod animation;
pub mod error;
pub mod export;
pub mod formats;
pub mod gltf_scene;
pub mod manifest;
pub mod math;
pub mod mesh;
pub mod options;
pub mod scene;
pub mod skeleton;

pub use error::{ExportError, Result};
pub use export::{
    export_lines, export_lines_to_file, export_meshes, export_meshes_to_file, ExportSummary,
};
pub use gltf_scene::{GltfScene, GltfSceneOptions};
pub use mesh::{convert_mesh, ConvertedMesh};
pub use options::{Banner, LineExportOptions, MeshExportOptions};
pub use scene::{
    Armature, FrameRange, GroupWeight, MeshData, MeshEdge, MeshFace, MeshVertex, ObjectKind,
    RestBone, SceneAdapter, SceneObject,
};
pub use skeleton::{linearize, Skeleton};
