//! base-export - scene exporter for the engine's text formats
//!
//! Converts glTF/GLB scenes to `.beo` (mesh, skeleton, animation) and
//! `.bel` (lines, points, sensors) files.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

// Use modules from library
use base_export::{
    export_lines_to_file, export_meshes_to_file, manifest, Banner, GltfScene, GltfSceneOptions,
    LineExportOptions, MeshExportOptions,
};

#[derive(Parser)]
#[command(name = "base-export")]
#[command(about = "Scene exporter for .beo and .bel files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export meshes, skeleton and animation to .beo
    Mesh {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .beo file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Partition skin groups and append skeleton + frames
        #[arg(long)]
        animation: bool,

        /// Write only the skeleton + frames block
        #[arg(long)]
        skeleton_only: bool,

        /// Export only this node (repeat for more)
        #[arg(long, action = ArgAction::Append)]
        selected: Vec<String>,

        /// Write two coordinates per vertex
        #[arg(long)]
        two_d: bool,

        /// Skip texture coordinates
        #[arg(long)]
        no_uvs: bool,

        /// Write vertex normals
        #[arg(long)]
        normals: bool,

        /// Write every triangle corner as its own vertex
        #[arg(long)]
        raw: bool,

        /// Skin index (default: first skin)
        #[arg(long)]
        skin: Option<usize>,

        /// Animation index (default: first animation)
        #[arg(long)]
        animation_index: Option<usize>,

        /// Frame rate for sampling (default: 24)
        #[arg(long)]
        frame_rate: Option<f32>,
    },

    /// Export polylines, points and sensors to .bel
    Lines {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .bel file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export only this node (repeat for more)
        #[arg(long, action = ArgAction::Append)]
        selected: Vec<String>,

        /// Export every vertex as a point
        #[arg(long)]
        points: bool,

        /// Write three coordinates per vertex
        #[arg(long)]
        three_d: bool,
    },

    /// Run every job of a manifest file
    Build {
        /// Path to export.toml manifest
        #[arg(default_value = "export.toml")]
        manifest: PathBuf,
    },

    /// Validate manifest without exporting
    Check {
        /// Path to export.toml manifest
        #[arg(default_value = "export.toml")]
        manifest: PathBuf,
    },
}

fn check_input(input: &Path) -> Result<()> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "gltf" | "glb" => Ok(()),
        _ => anyhow::bail!("Unsupported scene format: {:?} (use .gltf or .glb)", input),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mesh {
            input,
            output,
            animation,
            skeleton_only,
            selected,
            two_d,
            no_uvs,
            normals,
            raw,
            skin,
            animation_index,
            frame_rate,
        } => {
            check_input(&input)?;
            let output = output.unwrap_or_else(|| input.with_extension("beo"));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let options = MeshExportOptions {
                export_animation: animation,
                skeleton_only,
                selected_only: !selected.is_empty(),
                is_2d_object: two_d,
                export_texture_coords: !no_uvs,
                export_normals: normals,
                export_raw_triangles: raw,
            };
            let scene_options = GltfSceneOptions {
                selected,
                skin,
                animation: animation_index,
                frame_rate,
            };

            let mut scene = GltfScene::load(&input, &scene_options)?;
            export_meshes_to_file(&mut scene, &output, &options, &Banner::default())?;
            tracing::info!("Done!");
        }

        Commands::Lines {
            input,
            output,
            selected,
            points,
            three_d,
        } => {
            check_input(&input)?;
            let output = output.unwrap_or_else(|| input.with_extension("bel"));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let options = LineExportOptions {
                selected_only: !selected.is_empty(),
                points_only: points,
                is_3d: three_d,
            };
            let scene_options = GltfSceneOptions {
                selected,
                ..Default::default()
            };

            let scene = GltfScene::load(&input, &scene_options)?;
            export_lines_to_file(&scene, &output, &options, &Banner::default())?;
            tracing::info!("Done!");
        }

        Commands::Build { manifest } => {
            tracing::info!("Building exports from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config)?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }
    }

    Ok(())
}
