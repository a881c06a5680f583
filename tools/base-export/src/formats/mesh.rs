//! Mesh/skeleton/animation format (`.beo`)
//!
//! ```text
//! ob <name>
//! cpv <2|3>
//! bbox <x> <y> <z>
//! [a <groups> groups]
//! v <count> { ... }
//! [n <count> { ... }]
//! [t <count> { ... }]
//! [f <count> { ... }]
//! ...
//! [skelet <bones> { ... }]
//! [frames <count> { ... }]
//! ```

use std::io::Write;

use super::write_values;
use crate::animation::AnimationFrame;
use crate::error::Result;
use crate::math::Decimal;
use crate::mesh::{ConvertedMesh, VertexLayout};
use crate::options::MeshExportOptions;
use crate::skeleton::Skeleton;

/// Components written per position: all three in 3D, the last two in 2D
fn components(position: &[f64; 3], cpv: usize) -> impl Iterator<Item = f64> + '_ {
    position[3 - cpv..].iter().copied()
}

/// Write one mesh object block
pub fn write_mesh<W: Write>(
    w: &mut W,
    mesh: &ConvertedMesh,
    options: &MeshExportOptions,
) -> Result<()> {
    let cpv = options.coords_per_vertex();

    writeln!(w, "\nob {}", mesh.name)?;
    writeln!(w, "cpv {}", cpv)?;
    writeln!(
        w,
        "bbox {} {} {}",
        Decimal(mesh.bounds[0]),
        Decimal(mesh.bounds[1]),
        Decimal(mesh.bounds[2])
    )?;

    match &mesh.layout {
        VertexLayout::Flat(positions) => {
            write!(w, "v {} {{ ", mesh.vertex_count * cpv)?;
            write_values(w, positions.iter().flat_map(|p| components(p, cpv)))?;
        }
        VertexLayout::Grouped(blocks) => {
            writeln!(w, "a {} groups", blocks.len())?;
            writeln!(w, "v {} {{ ", mesh.vertex_count * cpv)?;
            for block in blocks {
                write!(w, "{} {} ", block.name, block.positions.len() * cpv)?;
                write_values(w, block.positions.iter().flat_map(|p| components(p, cpv)))?;
                writeln!(w)?;
            }
        }
    }
    writeln!(w, "}}")?;

    if options.export_normals {
        write!(w, "n {} {{ ", mesh.normals.len() * 3)?;
        write_values(w, mesh.normals.iter().flatten().copied())?;
        writeln!(w, "}}")?;
    }

    if options.export_texture_coords {
        write!(w, "t {} {{ ", mesh.tex_coords.len() * 2)?;
        for uv in &mesh.tex_coords {
            write_values(w, uv.unwrap_or([0.0, 0.0]))?;
        }
        writeln!(w, "}}")?;
    }

    if let Some(indices) = &mesh.indices {
        write!(w, "f {} {{ ", indices.len())?;
        for index in indices {
            write!(w, "{} ", index)?;
        }
        writeln!(w, "}}")?;
    }

    Ok(())
}

/// Write the rest skeleton block
pub fn write_skeleton<W: Write>(w: &mut W, skeleton: &Skeleton) -> Result<()> {
    writeln!(w, "skelet {} {{", skeleton.bone_count())?;
    for bone in &skeleton.bones {
        write!(w, "{} {} 1.0 {{ ", bone.name, bone.parent_index())?;
        write!(
            w,
            "{} {} {} ",
            Decimal(bone.head[0]),
            Decimal(bone.head[1]),
            Decimal(bone.head[2])
        )?;
        writeln!(
            w,
            "{} {} {} }}",
            Decimal(bone.tail[0]),
            Decimal(bone.tail[1]),
            Decimal(bone.tail[2])
        )?;
    }
    writeln!(w, "}}")?;
    Ok(())
}

/// Write the per-frame rotation block, one line per frame
pub fn write_frames<W: Write>(w: &mut W, frames: &[AnimationFrame]) -> Result<()> {
    writeln!(w, "frames {} {{", frames.len())?;
    for frame in frames {
        for rotation in frame.emitted_rotations() {
            // Engine axis order (x, z, y)
            write_values(w, [rotation[0], rotation[2], rotation[1]])?;
        }
        writeln!(w)?;
    }
    write!(w, "}}")?;
    Ok(())
}
