//! Export pipelines
//!
//! Walks the scene in host order, converts each object and streams the
//! result into one writer. Objects the host cannot turn into a mesh are
//! skipped; everything else that fails aborts the export. Output already
//! written stays written.

use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::animation::sample_animation;
use crate::error::{ExportError, Result};
use crate::formats::line::{chain_loose_edges, write_object, write_sensors, Sensor};
use crate::formats::mesh::{write_frames, write_mesh, write_skeleton};
use crate::formats::write_banner;
use crate::math::engine_vec3;
use crate::mesh::convert_mesh;
use crate::options::{Banner, LineExportOptions, MeshExportOptions};
use crate::scene::{ObjectKind, SceneAdapter, SceneObject};
use crate::skeleton::linearize;

/// What an export wrote
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Objects written as mesh or line blocks
    pub objects: Vec<String>,
    /// Objects without geometry that were skipped
    pub skipped: Vec<String>,
    /// Point markers written to the sensor block
    pub sensors: usize,
    pub bones: usize,
    pub frames: usize,
}

fn export_objects<S: SceneAdapter + ?Sized>(scene: &S, selected_only: bool) -> Vec<SceneObject> {
    scene
        .objects()
        .into_iter()
        .filter(|object| !selected_only || object.selected)
        .collect()
}

fn log_skipped(object: &SceneObject) {
    if object.kind == ObjectKind::Mesh {
        tracing::warn!("Could not evaluate mesh '{}', skipping", object.name);
    } else {
        tracing::debug!("Object '{}' has no geometry, skipping", object.name);
    }
}

/// Write the line/point format for every (selected) object
pub fn export_lines<S, W>(
    scene: &S,
    w: &mut W,
    options: &LineExportOptions,
    banner: &Banner,
) -> Result<ExportSummary>
where
    S: SceneAdapter + ?Sized,
    W: Write,
{
    let dimensions = options.dimensions();
    let mut summary = ExportSummary::default();
    let mut sensors = Vec::new();

    write_banner(w, banner)?;

    for object in export_objects(scene, options.selected_only) {
        let Some(mesh) = scene.evaluated_mesh(&object) else {
            if object.kind == ObjectKind::Empty {
                sensors.push(Sensor::from_object(&object));
            } else {
                log_skipped(&object);
                summary.skipped.push(object.name);
            }
            continue;
        };

        let points: Vec<[f64; 3]> = mesh
            .vertices
            .iter()
            .map(|v| engine_vec3(v.position))
            .collect();

        if options.points_only {
            write_object(w, &object.name, dimensions, &points)?;
        } else {
            for line in chain_loose_edges(&mesh.edges) {
                let line_points: Vec<[f64; 3]> = line
                    .iter()
                    .map(|&index| {
                        points.get(index).copied().ok_or_else(|| ExportError::MalformedMesh {
                            object: object.name.clone(),
                            reason: format!(
                                "edge references vertex {} but the mesh has {} vertices",
                                index,
                                points.len()
                            ),
                        })
                    })
                    .collect::<Result<_>>()?;
                write_object(w, &object.name, dimensions, &line_points)?;
            }
        }
        summary.objects.push(object.name);
    }

    write_sensors(w, &sensors, dimensions)?;
    summary.sensors = sensors.len();
    w.flush()?;

    tracing::info!(
        "Exported {} line objects, {} sensors",
        summary.objects.len(),
        summary.sensors
    );
    Ok(summary)
}

/// Write the mesh format for every (selected) object, followed by the
/// skeleton and frames of the active armature when requested
pub fn export_meshes<S, W>(
    scene: &mut S,
    w: &mut W,
    options: &MeshExportOptions,
    banner: &Banner,
) -> Result<ExportSummary>
where
    S: SceneAdapter + ?Sized,
    W: Write,
{
    let mut summary = ExportSummary::default();

    write_banner(w, banner)?;
    writeln!(w)?;

    if !options.skeleton_only {
        for object in export_objects(&*scene, options.selected_only) {
            let Some(mesh) = scene.evaluated_mesh(&object) else {
                log_skipped(&object);
                summary.skipped.push(object.name);
                continue;
            };

            let converted = convert_mesh(&object.name, &mesh, options)?;
            tracing::debug!(
                "Mesh '{}': {} vertices, {} groups",
                converted.name,
                converted.vertex_count,
                converted.group_count()
            );
            write_mesh(w, &converted, options)?;
            summary.objects.push(object.name);
        }
    }

    if options.writes_skeleton() {
        let armature = scene.active_armature().ok_or(ExportError::MissingArmature)?;
        let skeleton = linearize(&armature)?;
        write_skeleton(w, &skeleton)?;
        summary.bones = skeleton.bone_count();

        if let Some(frames) = sample_animation(scene, &skeleton, &armature)? {
            write_frames(w, &frames)?;
            summary.frames = frames.len();
        }
    }

    w.flush()?;

    tracing::info!(
        "Exported {} meshes, {} bones, {} frames",
        summary.objects.len(),
        summary.bones,
        summary.frames
    );
    Ok(summary)
}

fn create_output(output: &Path) -> anyhow::Result<BufWriter<File>> {
    let file =
        File::create(output).with_context(|| format!("Failed to create output: {:?}", output))?;
    Ok(BufWriter::new(file))
}

/// [`export_lines`] into a new file
pub fn export_lines_to_file<S: SceneAdapter + ?Sized>(
    scene: &S,
    output: &Path,
    options: &LineExportOptions,
    banner: &Banner,
) -> anyhow::Result<ExportSummary> {
    let mut writer = create_output(output)?;
    export_lines(scene, &mut writer, options, banner)
        .with_context(|| format!("Failed to export lines to {:?}", output))
}

/// [`export_meshes`] into a new file
pub fn export_meshes_to_file<S: SceneAdapter + ?Sized>(
    scene: &mut S,
    output: &Path,
    options: &MeshExportOptions,
    banner: &Banner,
) -> anyhow::Result<ExportSummary> {
    let mut writer = create_output(output)?;
    export_meshes(scene, &mut writer, options, banner)
        .with_context(|| format!("Failed to export meshes to {:?}", output))
}
