//! Host mesh to export buffers

use hashbrown::HashMap;

use super::types::{SkinGroup, SkinGroupTable, Vertex};
use crate::error::{ExportError, Result};
use crate::math::{engine_vec3, round6};
use crate::scene::MeshData;

/// Indexed buffers before splitting
#[derive(Clone, Debug)]
pub struct IndexedBuffers {
    pub vertices: Vec<Vertex>,
    pub groups: Vec<SkinGroup>,
    /// Vertex index per face corner
    pub corner_vertices: Vec<usize>,
    /// UV slot per face corner
    pub corner_uvs: Vec<usize>,
    /// Deduplicated texture coordinates (V flipped)
    pub uv_table: Vec<[f64; 2]>,
}

/// One vertex per face corner, nothing shared
#[derive(Clone, Debug)]
pub struct RawBuffers {
    pub vertices: Vec<Vertex>,
    pub groups: Vec<SkinGroup>,
    pub tex_coords: Vec<Option<[f64; 2]>>,
}

fn malformed(object: &str, reason: String) -> ExportError {
    ExportError::MalformedMesh {
        object: object.to_string(),
        reason,
    }
}

/// Flip V and round, the engine's texture origin is top-left
fn engine_uv(uv: [f32; 2]) -> [f64; 2] {
    [round6(uv[0] as f64), round6(1.0 - uv[1] as f64)]
}

/// Hashable key of a UV rounded to 6 decimals
fn uv_key(uv: [f32; 2]) -> (u64, u64) {
    // `+ 0.0` folds -0.0 into 0.0 so both share a slot.
    (
        (round6(uv[0] as f64) + 0.0).to_bits(),
        (round6(uv[1] as f64) + 0.0).to_bits(),
    )
}

fn check_corners(object: &str, mesh: &MeshData) -> Result<()> {
    let vertex_count = mesh.vertices.len();
    for (face_index, face) in mesh.faces.iter().enumerate() {
        if let Some(&bad) = face.vertices.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(malformed(
                object,
                format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    face_index, bad, vertex_count
                ),
            ));
        }
    }
    if let Some(uvs) = &mesh.corner_uvs {
        if uvs.len() != mesh.corner_count() {
            return Err(malformed(
                object,
                format!(
                    "{} UV corners for {} face corners",
                    uvs.len(),
                    mesh.corner_count()
                ),
            ));
        }
    }
    Ok(())
}

/// Corner UVs of the active layer, or an error when they are required
fn active_uvs<'a>(
    object: &str,
    mesh: &'a MeshData,
    require_uvs: bool,
) -> Result<Option<&'a [[f32; 2]]>> {
    match &mesh.corner_uvs {
        Some(uvs) => Ok(Some(uvs.as_slice())),
        None if require_uvs => Err(ExportError::MissingUvLayer {
            object: object.to_string(),
        }),
        None => Ok(None),
    }
}

/// Build the shared vertex buffer, skin groups and per-corner index/UV slots
pub fn extract_indexed(object: &str, mesh: &MeshData, require_uvs: bool) -> Result<IndexedBuffers> {
    check_corners(object, mesh)?;
    let uvs = active_uvs(object, mesh, require_uvs)?;

    let mut table = SkinGroupTable::new();
    let mut vertices = Vec::with_capacity(mesh.vertices.len());
    for host in &mesh.vertices {
        let group = table.resolve(&host.groups);
        if let Some(group) = group {
            table.groups_mut()[group].count += 1;
        }
        vertices.push(Vertex::new(
            engine_vec3(host.position),
            engine_vec3(host.normal),
            group,
        ));
    }

    let corner_vertices: Vec<usize> = mesh
        .faces
        .iter()
        .flat_map(|face| face.vertices.iter().map(|&v| v as usize))
        .collect();

    let (corner_uvs, uv_table) = match uvs {
        Some(uvs) => {
            let mut slots: HashMap<(u64, u64), usize> = HashMap::new();
            let mut uv_table = Vec::new();
            let corner_uvs: Vec<usize> = uvs
                .iter()
                .map(|&uv| {
                    *slots.entry(uv_key(uv)).or_insert_with(|| {
                        uv_table.push(engine_uv(uv));
                        uv_table.len() - 1
                    })
                })
                .collect();
            (corner_uvs, uv_table)
        }
        // No layer: one shared slot, nothing to split on.
        None => (vec![0; corner_vertices.len()], vec![[0.0, 0.0]]),
    };

    Ok(IndexedBuffers {
        vertices,
        groups: table.into_groups(),
        corner_vertices,
        corner_uvs,
        uv_table,
    })
}

/// Build one vertex per face corner with the face normal
pub fn extract_raw(object: &str, mesh: &MeshData, require_uvs: bool) -> Result<RawBuffers> {
    check_corners(object, mesh)?;
    let uvs = active_uvs(object, mesh, require_uvs)?;

    let mut table = SkinGroupTable::new();
    let mut vertices = Vec::with_capacity(mesh.corner_count());
    let mut tex_coords = Vec::with_capacity(mesh.corner_count());

    for (face_index, face) in mesh.faces.iter().enumerate() {
        let normal = engine_vec3(face.normal);
        for (corner, &vertex_index) in face.vertices.iter().enumerate() {
            let host = &mesh.vertices[vertex_index as usize];
            let group = table.resolve(&host.groups);
            if let Some(group) = group {
                table.groups_mut()[group].count += 1;
            }
            vertices.push(Vertex::new(engine_vec3(host.position), normal, group));
            tex_coords.push(uvs.map(|uvs| engine_uv(uvs[face_index * 3 + corner])));
        }
    }

    Ok(RawBuffers {
        vertices,
        groups: table.into_groups(),
        tex_coords,
    })
}
