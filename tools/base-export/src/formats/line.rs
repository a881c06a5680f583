//! Line/point format (`.bel`)
//!
//! ```text
//! ob <name> <dim>
//! l <count> { <coord>* }
//! ...
//! s <sensors> {
//! <name> <x> <z> [<y>] <sx> <sz> [<sy>] <rotation>
//! }
//! ```

use std::io::Write;

use super::write_values;
use crate::error::Result;
use crate::math::{engine_vec3, round6, Decimal};
use crate::scene::{MeshEdge, SceneObject};

/// Point marker written in the trailing `s` block
#[derive(Clone, Debug, PartialEq)]
pub struct Sensor {
    pub name: String,
    /// World position, engine order
    pub position: [f64; 3],
    /// Local scale, engine order
    pub scale: [f64; 3],
    /// Rotation about the host Y axis in degrees, negated
    pub rotation: f64,
}

impl Sensor {
    pub fn from_object(object: &SceneObject) -> Self {
        let rotation = -round6(object.rotation_euler.y as f64).to_degrees();
        Self {
            name: object.name.clone(),
            position: engine_vec3(object.location()),
            scale: engine_vec3(object.scale),
            // `+ 0.0` turns -0.0 into 0.0
            rotation: rotation + 0.0,
        }
    }
}

/// Chain loose edges into polylines of vertex indices.
///
/// Each edge is normalized to ascending endpoints. A polyline continues as
/// long as an edge starts where the previous one ended.
pub fn chain_loose_edges(edges: &[MeshEdge]) -> Vec<Vec<usize>> {
    let mut polylines: Vec<Vec<usize>> = Vec::new();
    let mut previous: Option<usize> = None;

    for edge in edges.iter().filter(|e| e.loose) {
        let a = edge.vertices[0].min(edge.vertices[1]) as usize;
        let b = edge.vertices[0].max(edge.vertices[1]) as usize;

        match polylines.last_mut() {
            Some(line) if previous == Some(a) => line.push(b),
            _ => polylines.push(vec![a, b]),
        }
        previous = Some(b);
    }
    polylines
}

/// Write one `ob` block. `points` are in engine order; 2D keeps (x, z).
pub fn write_object<W: Write>(
    w: &mut W,
    name: &str,
    dimensions: usize,
    points: &[[f64; 3]],
) -> Result<()> {
    write!(w, "\n\nob {} {}\n", name, dimensions)?;
    write!(w, "l {} {{ ", points.len() * dimensions)?;
    write_values(
        w,
        points.iter().flat_map(|p| p[..dimensions].iter().copied()),
    )?;
    write!(w, "}}")?;
    Ok(())
}

/// Write the trailing sensor block, nothing when there are no sensors
pub fn write_sensors<W: Write>(w: &mut W, sensors: &[Sensor], dimensions: usize) -> Result<()> {
    if sensors.is_empty() {
        return Ok(());
    }

    write!(w, "\n\ns {} {{", sensors.len())?;
    for sensor in sensors {
        write!(w, "\n{} ", sensor.name)?;
        write_values(w, sensor.position[..dimensions].iter().copied())?;
        write_values(w, sensor.scale[..dimensions].iter().copied())?;
        write!(w, "{}", Decimal(sensor.rotation))?;
    }
    write!(w, "\n}}")?;
    Ok(())
}
