//! Mesh conversion (host mesh -> .beo mesh block)

mod bounds;
mod extract;
mod groups;
mod split;
mod types;

// Re-export public API
pub use bounds::bounds;
pub use extract::{extract_indexed, extract_raw, IndexedBuffers, RawBuffers};
pub use groups::{assign_start_offsets, partition_groups, Partition};
pub use split::{order_tex_coords, split_vertices};
pub use types::{ConvertedMesh, GroupBlock, SkinGroup, SkinGroupTable, Vertex, VertexLayout};

use crate::error::{ExportError, Result};
use crate::math::swap_yz;
use crate::options::MeshExportOptions;
use crate::scene::MeshData;

/// Extent of a vertex buffer, reported in host axis order
fn host_bounds(vertices: &[Vertex]) -> Result<[f64; 3]> {
    let positions: Vec<[f64; 3]> = vertices.iter().map(|v| v.position).collect();
    bounds(&positions).map(swap_yz)
}

/// Convert one evaluated host mesh into the structures the mesh format
/// writer consumes.
pub fn convert_mesh(
    name: &str,
    mesh: &MeshData,
    options: &MeshExportOptions,
) -> Result<ConvertedMesh> {
    if options.export_raw_triangles {
        convert_raw(name, mesh, options)
    } else {
        convert_indexed(name, mesh, options)
    }
}

fn convert_indexed(
    name: &str,
    mesh: &MeshData,
    options: &MeshExportOptions,
) -> Result<ConvertedMesh> {
    let IndexedBuffers {
        mut vertices,
        mut groups,
        mut corner_vertices,
        corner_uvs,
        uv_table,
    } = extract_indexed(name, mesh, options.export_texture_coords)?;

    split_vertices(&mut vertices, &mut groups, &mut corner_vertices, &corner_uvs);
    let tex_coords = order_tex_coords(vertices.len(), &corner_vertices, &corner_uvs, &uv_table);
    let extent = host_bounds(&vertices)?;

    let (layout, normals, tex_coords) = if options.export_animation {
        let partition = partition_groups(
            name,
            &mut vertices,
            &mut groups,
            &mut corner_vertices,
            &tex_coords,
        )?;
        (
            VertexLayout::Grouped(partition.blocks),
            partition.normals,
            partition.tex_coords,
        )
    } else {
        (
            VertexLayout::Flat(vertices.iter().map(|v| v.position).collect()),
            vertices.iter().map(|v| v.normal).collect(),
            tex_coords,
        )
    };

    Ok(ConvertedMesh {
        name: name.to_string(),
        bounds: extent,
        vertex_count: vertices.len(),
        layout,
        normals,
        tex_coords,
        indices: Some(corner_vertices),
    })
}

fn convert_raw(name: &str, mesh: &MeshData, options: &MeshExportOptions) -> Result<ConvertedMesh> {
    let RawBuffers {
        vertices,
        groups,
        tex_coords,
    } = extract_raw(name, mesh, options.export_texture_coords)?;

    let extent = host_bounds(&vertices)?;

    let layout = if options.export_animation {
        // Every corner is its own vertex, so blocks fill up in corner order
        // and always match their counts.
        let mut blocks: Vec<GroupBlock> = groups
            .iter()
            .map(|group| GroupBlock {
                name: group.name.clone(),
                positions: Vec::with_capacity(group.count),
            })
            .collect();
        for (index, vertex) in vertices.iter().enumerate() {
            let group = vertex.group.ok_or_else(|| ExportError::UngroupedVertex {
                object: name.to_string(),
                vertex: index,
            })?;
            blocks[group].positions.push(vertex.position);
        }
        VertexLayout::Grouped(blocks)
    } else {
        VertexLayout::Flat(vertices.iter().map(|v| v.position).collect())
    };

    Ok(ConvertedMesh {
        name: name.to_string(),
        bounds: extent,
        vertex_count: vertices.len(),
        layout,
        normals: vertices.iter().map(|v| v.normal).collect(),
        tex_coords,
        indices: None,
    })
}
