//! Vertex splitting by UV seam
//!
//! A host vertex shared by faces with different UVs has to become one
//! vertex per distinct UV, since the engine indexes position and UV with
//! the same index.

use hashbrown::HashMap;

use super::types::{SkinGroup, Vertex};

/// One distinct UV seen on one host vertex
struct UvClass {
    uv: usize,
    first_corner: usize,
    /// Vertex that corners of this class end up referencing
    vertex: usize,
}

/// Duplicate vertices so every face corner references a vertex with a
/// single UV slot.
///
/// `corner_vertices` is rewritten in place; `corner_uvs` must have the same
/// length. The first distinct UV of a vertex keeps the original index. The
/// vertex for the k-th distinct UV is appended when the corner scan reaches
/// the first corner of the (k-1)-th one, so new vertices appear in a stable
/// order. Each new vertex counts once toward its skin group.
pub fn split_vertices(
    vertices: &mut Vec<Vertex>,
    groups: &mut [SkinGroup],
    corner_vertices: &mut [usize],
    corner_uvs: &[usize],
) -> usize {
    debug_assert_eq!(corner_vertices.len(), corner_uvs.len());

    let mut classes: HashMap<usize, Vec<UvClass>> = HashMap::new();
    let mut corner_class = Vec::with_capacity(corner_vertices.len());

    for (corner, (&vertex, &uv)) in corner_vertices.iter().zip(corner_uvs).enumerate() {
        let list = classes.entry(vertex).or_default();
        let class = match list.iter().position(|c| c.uv == uv) {
            Some(class) => class,
            None => {
                list.push(UvClass {
                    uv,
                    first_corner: corner,
                    vertex,
                });
                list.len() - 1
            }
        };
        corner_class.push(class);
    }

    // (trigger corner, original vertex, class)
    let mut events: Vec<(usize, usize, usize)> = classes
        .iter()
        .flat_map(|(&vertex, list)| {
            (1..list.len()).map(move |class| (list[class - 1].first_corner, vertex, class))
        })
        .collect();
    events.sort_unstable_by_key(|&(trigger, _, _)| trigger);

    let added = events.len();
    for (_, vertex, class) in events {
        let Some(list) = classes.get_mut(&vertex) else {
            continue;
        };
        let source = &vertices[list[class - 1].vertex];
        let duplicate = Vertex::new(source.position, source.normal, source.group);
        if let Some(group) = duplicate.group {
            groups[group].count += 1;
        }
        list[class].vertex = vertices.len();
        vertices.push(duplicate);
    }

    for (corner, target) in corner_vertices.iter_mut().enumerate() {
        if let Some(list) = classes.get(&*target) {
            *target = list[corner_class[corner]].vertex;
        }
    }

    if added > 0 {
        tracing::debug!("Split {} vertices along UV seams", added);
    }
    added
}

/// Texture coordinate of each vertex: the UV of the first corner that
/// references it, `None` for vertices no face uses.
pub fn order_tex_coords(
    vertex_count: usize,
    corner_vertices: &[usize],
    corner_uvs: &[usize],
    uv_table: &[[f64; 2]],
) -> Vec<Option<[f64; 2]>> {
    let mut ordered = vec![None; vertex_count];
    for (&vertex, &uv) in corner_vertices.iter().zip(corner_uvs) {
        if ordered[vertex].is_none() {
            ordered[vertex] = uv_table.get(uv).copied();
        }
    }
    ordered
}
