//! Axis-aligned extent of a vertex buffer

use crate::error::{ExportError, Result};
use crate::math::round6;

/// Per-axis `|max - min|`, rounded to 6 decimals.
///
/// An empty buffer is a caller bug and fails with
/// [`ExportError::EmptyVertexBuffer`].
pub fn bounds(positions: &[[f64; 3]]) -> Result<[f64; 3]> {
    let (first, rest) = positions
        .split_first()
        .ok_or(ExportError::EmptyVertexBuffer)?;

    let mut min = *first;
    let mut max = *first;
    for p in rest {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }

    Ok([
        round6((max[0] - min[0]).abs()),
        round6((max[1] - min[1]).abs()),
        round6((max[2] - min[2]).abs()),
    ])
}
