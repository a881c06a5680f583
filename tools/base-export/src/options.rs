//! Export options and the format banner

use serde::Deserialize;

/// Product name written in the banner of both formats
pub const DEFAULT_PRODUCT: &str = "Blender";

/// Format version written in the banner of both formats
pub const DEFAULT_VERSION: &str = "0.256";

/// Two-line banner that opens every exported file
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub product: String,
    pub version: String,
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            product: DEFAULT_PRODUCT.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

/// Options of the line/point format (`.bel`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LineExportOptions {
    /// Export only selected objects
    pub selected_only: bool,
    /// Export every vertex as a point instead of walking loose edges
    pub points_only: bool,
    /// Write three coordinates per vertex instead of two
    pub is_3d: bool,
}

impl LineExportOptions {
    /// Coordinates per vertex
    pub fn dimensions(&self) -> usize {
        if self.is_3d {
            3
        } else {
            2
        }
    }
}

/// Options of the mesh/skeleton/animation format (`.beo`)
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MeshExportOptions {
    /// Partition vertices into skin groups and append skeleton + frames
    pub export_animation: bool,
    /// Write only the skeleton + frames block
    pub skeleton_only: bool,
    /// Export only selected objects
    pub selected_only: bool,
    /// Write two coordinates per vertex
    pub is_2d_object: bool,
    pub export_texture_coords: bool,
    pub export_normals: bool,
    /// Write every triangle corner as its own vertex, without a face list
    pub export_raw_triangles: bool,
}

impl Default for MeshExportOptions {
    fn default() -> Self {
        Self {
            export_animation: false,
            skeleton_only: false,
            selected_only: false,
            is_2d_object: false,
            export_texture_coords: true,
            export_normals: false,
            export_raw_triangles: false,
        }
    }
}

impl MeshExportOptions {
    /// Coordinates per vertex
    pub fn coords_per_vertex(&self) -> usize {
        if self.is_2d_object {
            2
        } else {
            3
        }
    }

    /// Whether the trailing skeleton block is written
    pub fn writes_skeleton(&self) -> bool {
        self.export_animation || self.skeleton_only
    }
}
