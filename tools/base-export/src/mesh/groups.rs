//! Skin group partitioning
//!
//! Skinned playback wants every group's vertices in one contiguous block.
//! Blocks are laid out in group declaration order and each block is padded
//! to the group's counted size, so block offsets are known before a single
//! vertex is placed.

use super::types::{GroupBlock, SkinGroup, Vertex};
use crate::error::{ExportError, Result};

/// Vertex buffer reordered into skin group blocks
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub blocks: Vec<GroupBlock>,
    /// Texture coordinate per final offset
    pub tex_coords: Vec<Option<[f64; 2]>>,
    /// Normal per final offset (zero for padding)
    pub normals: Vec<[f64; 3]>,
}

/// Set each group's start offset to the prefix sum of the counts before it
pub fn assign_start_offsets(groups: &mut [SkinGroup]) {
    let mut offset = 0;
    for group in groups.iter_mut() {
        group.start_offset = offset;
        offset += group.count;
    }
}

/// Place every faced vertex in its group's block and rewrite `indices` to
/// final offsets.
///
/// Every vertex must belong to a skin group, faced or not, so the block
/// lengths add up to the vertex count.
///
/// `tex_coords` is indexed by vertex. A vertex reached again through a later
/// corner keeps the offset it was first given.
pub fn partition_groups(
    object: &str,
    vertices: &mut [Vertex],
    groups: &mut [SkinGroup],
    indices: &mut [usize],
    tex_coords: &[Option<[f64; 2]>],
) -> Result<Partition> {
    if let Some(vertex) = vertices.iter().position(|v| v.group.is_none()) {
        return Err(ExportError::UngroupedVertex {
            object: object.to_string(),
            vertex,
        });
    }
    assign_start_offsets(groups);

    let total = vertices.len();
    let mut ordered_tex = vec![None; total];
    let mut ordered_normals = vec![[0.0; 3]; total];

    for index in indices.iter_mut() {
        let vertex_index = *index;
        let vertex = &mut vertices[vertex_index];
        let slot = match vertex.slot {
            Some(slot) => slot,
            None => {
                let group_index = vertex.group.ok_or_else(|| ExportError::UngroupedVertex {
                    object: object.to_string(),
                    vertex: vertex_index,
                })?;
                let group = &mut groups[group_index];
                let slot = group.start_offset + group.vertices.len();
                group.vertices.push(vertex.position);
                vertex.slot = Some(slot);

                if slot < total {
                    ordered_tex[slot] = tex_coords.get(vertex_index).copied().flatten();
                    ordered_normals[slot] = vertex.normal;
                }
                slot
            }
        };
        *index = slot;
    }

    // Counted but never faced vertices still occupy their block.
    for group in groups.iter_mut() {
        let placed = group.vertices.len();
        if placed < group.count {
            tracing::debug!(
                "Padding group '{}' with {} empty vertices",
                group.name,
                group.count - placed
            );
            group.vertices.resize(group.count, [0.0; 3]);
        }
    }

    let blocks = groups
        .iter()
        .map(|group| GroupBlock {
            name: group.name.clone(),
            positions: group.vertices.clone(),
        })
        .collect();

    Ok(Partition {
        blocks,
        tex_coords: ordered_tex,
        normals: ordered_normals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped(x: f64, group: usize) -> Vertex {
        Vertex::new([x, 0.0, 0.0], [0.0, 1.0, 0.0], Some(group))
    }

    fn groups_with_counts(counts: &[usize]) -> Vec<SkinGroup> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let mut group = SkinGroup::new(format!("g{}", i), 1.0);
                group.count = count;
                group
            })
            .collect()
    }

    #[test]
    fn test_start_offsets_are_prefix_sums() {
        let mut groups = groups_with_counts(&[3, 0, 2, 4]);
        assign_start_offsets(&mut groups);
        let offsets: Vec<usize> = groups.iter().map(|g| g.start_offset).collect();
        assert_eq!(offsets, vec![0, 3, 3, 5]);
    }

    #[test]
    fn test_partition_reorders_by_group() {
        // Vertices alternate between two groups.
        let mut vertices = vec![grouped(0.0, 1), grouped(1.0, 0), grouped(2.0, 1), grouped(3.0, 0)];
        let mut groups = groups_with_counts(&[2, 2]);
        let mut indices = vec![0, 1, 2, 3, 1, 0];
        let tex = vec![Some([0.0, 0.0]), Some([1.0, 0.0]), Some([2.0, 0.0]), Some([3.0, 0.0])];

        let partition = partition_groups("ob", &mut vertices, &mut groups, &mut indices, &tex).unwrap();

        assert_eq!(indices, vec![2, 0, 3, 1, 0, 2]);
        assert_eq!(partition.blocks[0].positions, vec![[1.0, 0.0, 0.0], [3.0, 0.0, 0.0]]);
        assert_eq!(partition.blocks[1].positions, vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        assert_eq!(partition.tex_coords[0], Some([1.0, 0.0]));
        assert_eq!(partition.tex_coords[2], Some([0.0, 0.0]));
    }

    #[test]
    fn test_unfaced_vertices_are_padded() {
        // Vertex 1 is counted in group 0 but no face uses it.
        let mut vertices = vec![grouped(5.0, 0), grouped(6.0, 0), grouped(7.0, 1)];
        let mut groups = groups_with_counts(&[2, 1]);
        let mut indices = vec![0, 2, 0];
        let tex = vec![None; 3];

        let partition = partition_groups("ob", &mut vertices, &mut groups, &mut indices, &tex).unwrap();

        assert_eq!(indices, vec![0, 2, 0]);
        assert_eq!(partition.blocks[0].positions, vec![[5.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        assert_eq!(partition.blocks[1].positions, vec![[7.0, 0.0, 0.0]]);
        assert_eq!(partition.normals[1], [0.0, 0.0, 0.0]);

        let total: usize = partition.blocks.iter().map(|b| b.positions.len()).sum();
        assert_eq!(total, vertices.len());
    }

    #[test]
    fn test_group_lengths_sum_to_vertex_total() {
        let counts = [4, 1, 0, 3];
        let mut vertices = Vec::new();
        for (group, &count) in counts.iter().enumerate() {
            for i in 0..count {
                vertices.push(grouped(i as f64, group));
            }
        }
        let mut groups = groups_with_counts(&counts);
        // Only every other vertex is faced.
        let mut indices: Vec<usize> = (0..vertices.len()).step_by(2).collect();
        let tex = vec![None; vertices.len()];

        let partition = partition_groups("ob", &mut vertices, &mut groups, &mut indices, &tex).unwrap();

        let lengths: Vec<usize> = partition.blocks.iter().map(|b| b.positions.len()).collect();
        assert_eq!(lengths, counts.to_vec());
        assert_eq!(lengths.iter().sum::<usize>(), vertices.len());
        let mut prefix = 0;
        for (group, &count) in groups.iter().zip(&counts) {
            assert_eq!(group.start_offset, prefix);
            prefix += count;
        }
    }

    #[test]
    fn test_ungrouped_faced_vertex_fails() {
        let mut vertices = vec![Vertex::new([0.0; 3], [0.0; 3], None)];
        let mut indices = vec![0];
        let err = partition_groups("ob", &mut vertices, &mut [], &mut indices, &[None]).unwrap_err();
        assert!(matches!(err, ExportError::UngroupedVertex { vertex: 0, .. }));
    }

    #[test]
    fn test_ungrouped_unfaced_vertex_fails() {
        // Three faced vertices in one group, a fourth with no group and no face.
        let mut vertices = vec![
            grouped(0.0, 0),
            grouped(1.0, 0),
            grouped(2.0, 0),
            Vertex::new([3.0, 0.0, 0.0], [0.0; 3], None),
        ];
        let mut groups = groups_with_counts(&[3]);
        let mut indices = vec![0, 1, 2];
        let tex = vec![None; 4];

        let err = partition_groups("ob", &mut vertices, &mut groups, &mut indices, &tex).unwrap_err();
        assert!(matches!(err, ExportError::UngroupedVertex { vertex: 3, .. }));
        // Nothing was rewritten
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
