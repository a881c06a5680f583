//! Text formats read by the engine
//!
//! - [`line`]: polylines, point clouds and sensors (`.bel`)
//! - [`mesh`]: meshes, skin groups, skeleton and frames (`.beo`)
//!
//! Both open with the same two-line banner and render every number with
//! [`Decimal`].

pub mod line;
pub mod mesh;

use std::io::Write;

use crate::error::Result;
use crate::math::Decimal;
use crate::options::Banner;

/// Write the banner shared by both formats (no trailing newline)
pub fn write_banner<W: Write>(w: &mut W, banner: &Banner) -> Result<()> {
    write!(w, "\n{} export\nversion {}", banner.product, banner.version)?;
    Ok(())
}

/// Write each value followed by a space
fn write_values<W: Write>(w: &mut W, values: impl IntoIterator<Item = f64>) -> Result<()> {
    for value in values {
        write!(w, "{} ", Decimal(value))?;
    }
    Ok(())
}
