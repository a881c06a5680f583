//! Skeleton linearization (armature -> `skelet` block)
//!
//! Bones are written parent-before-child with integer parent references,
//! so the engine can build world transforms in a single forward pass.

use hashbrown::HashMap;

use crate::error::{ExportError, Result};
use crate::math::engine_vec3;
use crate::scene::Armature;

/// One bone in serialization order
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonBone {
    pub name: String,
    /// Linear index of the parent, always lower than this bone's index
    pub parent: Option<usize>,
    /// Rest head in engine axis order
    pub head: [f64; 3],
    /// Rest tail in engine axis order
    pub tail: [f64; 3],
    /// Index of the bone in [`Armature::bones`]
    pub source: usize,
}

impl SkeletonBone {
    /// Parent index as written to the file (`-1` for roots)
    pub fn parent_index(&self) -> i64 {
        self.parent.map_or(-1, |parent| parent as i64)
    }
}

/// Linearized armature
#[derive(Clone, Debug, PartialEq)]
pub struct Skeleton {
    pub armature: String,
    pub bones: Vec<SkeletonBone>,
}

impl Skeleton {
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }
}

fn broken(armature: &Armature, reason: String) -> ExportError {
    ExportError::BrokenHierarchy {
        armature: armature.name.clone(),
        reason,
    }
}

/// Flatten the bone tree depth-first, roots and siblings in host order
pub fn linearize(armature: &Armature) -> Result<Skeleton> {
    let by_name: HashMap<&str, usize> = armature
        .bones
        .iter()
        .enumerate()
        .map(|(index, bone)| (bone.name.as_str(), index))
        .collect();

    // Children per parent, `None` collects the roots.
    let mut children: HashMap<Option<usize>, Vec<usize>> = HashMap::new();
    for (index, bone) in armature.bones.iter().enumerate() {
        let parent = match &bone.parent {
            Some(parent) => Some(*by_name.get(parent.as_str()).ok_or_else(|| {
                broken(
                    armature,
                    format!("bone '{}' has unknown parent '{}'", bone.name, parent),
                )
            })?),
            None => None,
        };
        children.entry(parent).or_default().push(index);
    }

    let mut order = Vec::with_capacity(armature.bones.len());
    let mut visited = vec![false; armature.bones.len()];
    let mut stack: Vec<usize> = Vec::new();
    if let Some(roots) = children.get(&None) {
        stack.extend(roots.iter().rev());
    }
    while let Some(index) = stack.pop() {
        if std::mem::replace(&mut visited[index], true) {
            continue;
        }
        order.push(index);
        if let Some(kids) = children.get(&Some(index)) {
            stack.extend(kids.iter().rev());
        }
    }

    if order.len() != armature.bones.len() {
        return Err(broken(
            armature,
            format!(
                "{} of {} bones are not reachable from a root",
                armature.bones.len() - order.len(),
                armature.bones.len()
            ),
        ));
    }

    let mut linear_index: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    let mut bones = Vec::with_capacity(order.len());
    for &source in &order {
        let bone = &armature.bones[source];
        let parent = bone
            .parent
            .as_deref()
            .and_then(|parent| linear_index.get(parent).copied());
        linear_index.insert(bone.name.as_str(), bones.len());
        bones.push(SkeletonBone {
            name: bone.name.clone(),
            parent,
            head: engine_vec3(bone.head_local),
            tail: engine_vec3(bone.tail_local),
            source,
        });
    }

    tracing::debug!(
        "Linearized armature '{}': {} bones",
        armature.name,
        bones.len()
    );

    Ok(Skeleton {
        armature: armature.name.clone(),
        bones,
    })
}
