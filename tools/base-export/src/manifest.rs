//! Manifest parsing and batch export
//!
//! Parses export.toml and runs every job in it:
//!
//! ```toml
//! [banner]
//! product = "Blender"
//! version = "0.256"
//!
//! [[mesh]]
//! input = "hero.glb"
//! output = "out/hero.beo"
//! export_animation = true
//! frame_rate = 30.0
//!
//! [[lines]]
//! input = "track.gltf"
//! output = "out/track.bel"
//! points_only = true
//! ```

use anyhow::{bail, Context, Result};
use hashbrown::HashSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::export::{export_lines_to_file, export_meshes_to_file};
use crate::gltf_scene::{GltfScene, GltfSceneOptions};
use crate::options::{Banner, LineExportOptions, MeshExportOptions};

/// Root manifest structure
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub banner: Banner,
    #[serde(default)]
    pub mesh: Vec<MeshJob>,
    #[serde(default)]
    pub lines: Vec<LineJob>,
    /// Directory relative job paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// One `.beo` export
#[derive(Debug, Deserialize)]
pub struct MeshJob {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub options: MeshExportOptions,
    /// Node names to export (implies `selected_only`)
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default)]
    pub skin: Option<usize>,
    #[serde(default)]
    pub animation: Option<usize>,
    #[serde(default)]
    pub frame_rate: Option<f32>,
}

impl MeshJob {
    pub fn export_options(&self) -> MeshExportOptions {
        MeshExportOptions {
            selected_only: self.options.selected_only || !self.selected.is_empty(),
            ..self.options.clone()
        }
    }

    pub fn scene_options(&self) -> GltfSceneOptions {
        GltfSceneOptions {
            selected: self.selected.clone(),
            skin: self.skin,
            animation: self.animation,
            frame_rate: self.frame_rate,
        }
    }
}

/// One `.bel` export
#[derive(Debug, Deserialize)]
pub struct LineJob {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub options: LineExportOptions,
    /// Node names to export (implies `selected_only`)
    #[serde(default)]
    pub selected: Vec<String>,
}

impl LineJob {
    pub fn export_options(&self) -> LineExportOptions {
        LineExportOptions {
            selected_only: self.options.selected_only || !self.selected.is_empty(),
            ..self.options.clone()
        }
    }

    pub fn scene_options(&self) -> GltfSceneOptions {
        GltfSceneOptions {
            selected: self.selected.clone(),
            ..Default::default()
        }
    }
}

impl Manifest {
    /// Resolve a job path against the manifest's directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Parse manifest text
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let manifest: Manifest = toml::from_str(content).context("Failed to parse manifest")?;
    Ok(manifest)
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

fn check_input(kind: &str, index: usize, input: &Path) -> Result<()> {
    if input.as_os_str().is_empty() {
        bail!("{} job {} has an empty input path", kind, index);
    }
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    if !matches!(ext.as_str(), "gltf" | "glb") {
        bail!(
            "{} job {}: unsupported input format {:?} (use .gltf or .glb)",
            kind,
            index,
            input
        );
    }
    Ok(())
}

/// Validate a manifest without exporting
pub fn validate(manifest: &Manifest) -> Result<()> {
    let mut outputs = HashSet::new();

    let mesh_jobs = manifest.mesh.iter().map(|j| ("Mesh", &j.input, &j.output));
    let line_jobs = manifest.lines.iter().map(|j| ("Lines", &j.input, &j.output));
    for (index, (kind, input, output)) in mesh_jobs.chain(line_jobs).enumerate() {
        check_input(kind, index, input)?;
        if output.as_os_str().is_empty() {
            bail!("{} job {} has an empty output path", kind, index);
        }
        let output = manifest.resolve(output);
        if !outputs.insert(output.clone()) {
            bail!("Output {:?} is written by more than one job", output);
        }
        let input = manifest.resolve(input);
        if !input.exists() {
            bail!("{} job {} source not found: {:?}", kind, index, input);
        }
    }

    for (index, job) in manifest.mesh.iter().enumerate() {
        if let Some(rate) = job.frame_rate {
            if !(rate > 0.0) {
                bail!("Mesh job {} has a non-positive frame rate {}", index, rate);
            }
        }
    }

    Ok(())
}

fn prepare_output(output: &Path) -> Result<()> {
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }
    Ok(())
}

/// Run every job of a manifest
pub fn build_all(manifest: &Manifest) -> Result<()> {
    validate(manifest)?;

    for job in &manifest.mesh {
        let input = manifest.resolve(&job.input);
        let output = manifest.resolve(&job.output);
        tracing::info!("Exporting mesh: {:?} -> {:?}", input, output);

        prepare_output(&output)?;
        let mut scene = GltfScene::load(&input, &job.scene_options())?;
        export_meshes_to_file(&mut scene, &output, &job.export_options(), &manifest.banner)?;
    }

    for job in &manifest.lines {
        let input = manifest.resolve(&job.input);
        let output = manifest.resolve(&job.output);
        tracing::info!("Exporting lines: {:?} -> {:?}", input, output);

        prepare_output(&output)?;
        let scene = GltfScene::load(&input, &job.scene_options())?;
        export_lines_to_file(&scene, &output, &job.export_options(), &manifest.banner)?;
    }

    Ok(())
}
