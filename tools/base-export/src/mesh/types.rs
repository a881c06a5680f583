//! Types shared by the mesh conversion stages

use hashbrown::HashMap;

use crate::scene::GroupWeight;

/// Vertex of the export buffer (engine axis order, rounded)
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f64; 3],
    pub normal: [f64; 3],
    /// Index into the object's skin group table
    pub group: Option<usize>,
    /// Final offset in the partitioned layout, `None` until assigned
    pub slot: Option<usize>,
}

impl Vertex {
    pub fn new(position: [f64; 3], normal: [f64; 3], group: Option<usize>) -> Self {
        Self {
            position,
            normal,
            group,
            slot: None,
        }
    }
}

/// Named skin group of one object
#[derive(Clone, Debug, PartialEq)]
pub struct SkinGroup {
    pub name: String,
    /// Weight observed when the group was first seen
    pub weight: f32,
    /// Vertices counted for this group, duplicates included
    pub count: usize,
    /// First offset of this group's block
    pub start_offset: usize,
    /// Positions placed in this group's block, in final order
    pub vertices: Vec<[f64; 3]>,
}

impl SkinGroup {
    pub fn new(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            weight,
            count: 0,
            start_offset: 0,
            vertices: Vec::new(),
        }
    }
}

/// Skin groups in declaration order with a name index
#[derive(Clone, Debug, Default)]
pub struct SkinGroupTable {
    groups: Vec<SkinGroup>,
    by_name: HashMap<String, usize>,
}

impl SkinGroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every membership of a vertex and return the group the vertex
    /// belongs to: the last one listed.
    pub fn resolve(&mut self, memberships: &[GroupWeight]) -> Option<usize> {
        let mut last = None;
        for membership in memberships {
            let index = match self.by_name.get(&membership.group) {
                Some(&index) => index,
                None => {
                    let index = self.groups.len();
                    self.groups
                        .push(SkinGroup::new(membership.group.clone(), membership.weight));
                    self.by_name.insert(membership.group.clone(), index);
                    index
                }
            };
            last = Some(index);
        }
        last
    }

    pub fn groups_mut(&mut self) -> &mut [SkinGroup] {
        &mut self.groups
    }

    pub fn into_groups(self) -> Vec<SkinGroup> {
        self.groups
    }
}

/// Where positions go in the `v` block
#[derive(Clone, Debug, PartialEq)]
pub enum VertexLayout {
    /// One flat list
    Flat(Vec<[f64; 3]>),
    /// One block per skin group, in group declaration order
    Grouped(Vec<GroupBlock>),
}

/// Positions of one skin group block
#[derive(Clone, Debug, PartialEq)]
pub struct GroupBlock {
    pub name: String,
    pub positions: Vec<[f64; 3]>,
}

/// Fully converted mesh, ready for the mesh format writer
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertedMesh {
    pub name: String,
    /// Axis-aligned extent in host axis order
    pub bounds: [f64; 3],
    /// Size of the vertex buffer
    pub vertex_count: usize,
    pub layout: VertexLayout,
    pub normals: Vec<[f64; 3]>,
    /// Texture coordinate per vertex slot, `None` when unresolved
    pub tex_coords: Vec<Option<[f64; 2]>>,
    /// Face corner indices, absent in raw triangle mode
    pub indices: Option<Vec<usize>>,
}

impl ConvertedMesh {
    pub fn group_count(&self) -> usize {
        match &self.layout {
            VertexLayout::Flat(_) => 0,
            VertexLayout::Grouped(blocks) => blocks.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(group: &str, weight: f32) -> GroupWeight {
        GroupWeight {
            group: group.to_string(),
            weight,
        }
    }

    #[test]
    fn test_resolve_uses_last_membership() {
        let mut table = SkinGroupTable::new();
        assert_eq!(table.resolve(&[weight("arm", 0.4), weight("hand", 0.6)]), Some(1));
        assert_eq!(table.resolve(&[weight("hand", 1.0)]), Some(1));
        assert_eq!(table.resolve(&[]), None);

        let groups = table.into_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "arm");
        // Weight recorded at creation, later observations do not replace it.
        assert_eq!(groups[1].weight, 0.6);
    }
}
