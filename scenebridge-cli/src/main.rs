//! SceneBridge CLI
//!
//! Command-line interface for exporting authoring-tool scene descriptions to
//! Godot 2D scenes.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scenebridge_core::serializer::ordered_nodes;
use scenebridge_core::{
    export_scene, parse_scene, ExportConfig, FsTextureStore, GodotVersion, LogProgress, SceneGraph,
};

/// Settings file picked up from the working directory
const CONFIG_FILE: &str = "scenebridge.toml";

#[derive(Parser)]
#[command(name = "scenebridge")]
#[command(about = "Export 2D scenes to Godot .tscn files")]
#[command(version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene description (JSON or YAML) to a .tscn file
    Export {
        /// Scene description file
        scene: PathBuf,

        /// Scene file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Existing scene to merge into (default: the output file)
        #[arg(long)]
        merge: Option<PathBuf>,

        /// Write a fresh scene even if the output file exists
        #[arg(long, conflicts_with = "merge")]
        no_merge: bool,

        /// Settings file (default: scenebridge.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Engine version to export for, e.g. 3.5 or 4.0
        #[arg(long)]
        godot_version: Option<GodotVersion>,

        /// Pixels per source unit
        #[arg(long)]
        pixels_per_unit: Option<u32>,

        /// Only export selected objects
        #[arg(long)]
        selected_only: bool,

        /// Export groups as Node2D containers
        #[arg(long)]
        use_collections: bool,

        /// Folder beside the output scene that textures are copied into
        #[arg(long)]
        texture_folder: Option<String>,
    },

    /// Show the structure of an existing .tscn file
    Inspect {
        /// Scene file to read
        file: PathBuf,
    },

    /// List supported engine versions
    Versions,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "scenebridge=debug" } else { "scenebridge=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    match cli.command {
        Commands::Export {
            scene,
            output,
            merge,
            no_merge,
            config,
            godot_version,
            pixels_per_unit,
            selected_only,
            use_collections,
            texture_folder,
        } => {
            let mut settings = load_config(config.as_deref())?;
            if let Some(version) = godot_version {
                settings.godot_version = version;
            }
            if let Some(ppu) = pixels_per_unit {
                settings.pixels_per_unit = ppu;
            }
            if let Some(folder) = texture_folder {
                settings.texture_folder = folder;
            }
            settings.selected_only |= selected_only;
            settings.use_collections |= use_collections;

            let existing = if no_merge { None } else { Some(merge.unwrap_or_else(|| output.clone())) };
            cmd_export(&scene, &output, existing.as_deref(), &settings)?;
        }
        Commands::Inspect { file } => {
            cmd_inspect(&file)?;
        }
        Commands::Versions => {
            cmd_versions();
        }
    }

    Ok(())
}

/// Load settings from `path`, or from the working directory's settings file
fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    match path {
        Some(path) => ExportConfig::from_file(path).with_context(|| format!("Failed to load {}", path.display())),
        None if Path::new(CONFIG_FILE).is_file() => {
            tracing::debug!("Using {}", CONFIG_FILE);
            ExportConfig::from_file(CONFIG_FILE).with_context(|| format!("Failed to load {}", CONFIG_FILE))
        }
        None => Ok(ExportConfig::default()),
    }
}

/// Read a scene description, picking the format from the extension
fn load_scene(path: &Path) -> Result<SceneGraph> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let scene = match extension {
        "yaml" | "yml" => serde_yaml::from_str(&content).context("Failed to parse YAML scene description")?,
        "json" => SceneGraph::from_json(&content).context("Failed to parse JSON scene description")?,
        other => bail!("Unsupported scene description '.{}' (expected .json, .yaml or .yml)", other),
    };
    Ok(scene)
}

/// Export a scene description
fn cmd_export(scene_path: &Path, output: &Path, existing: Option<&Path>, config: &ExportConfig) -> Result<()> {
    let scene = load_scene(scene_path)?;
    let mut textures = FsTextureStore::beside(output);
    let mut progress = LogProgress::default();

    let summary = export_scene(output, existing, &scene, config, &mut textures, &mut progress)
        .with_context(|| format!("Failed to export to {}", output.display()))?;

    println!("Exported {} objects to {}", summary.exported_objects, summary.target.display());
    println!("  Nodes:          {}", summary.nodes);
    println!("  Resources:      {}", summary.resources);
    println!("  Textures saved: {}", summary.textures_saved);
    if !summary.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &summary.warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}

/// Print the format, resources and node order of a scene file
fn cmd_inspect(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let document = parse_scene(&text, GodotVersion::default().scene_format())
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    println!("Scene: {}", file.display());
    println!("  Format: {}", document.format());
    if let Some(uid) = document.uid() {
        println!("  UID:    {}", uid);
    }

    println!("\nExternal resources ({}):", document.resource_count());
    for resource in document.resources() {
        println!("  {:>8}  {}", resource.key, resource.locator);
    }

    let (order, warnings) = ordered_nodes(&document);
    println!("\nNodes ({}):", order.len());
    for path in order {
        let depth = if path == "." { 0 } else { path.matches('/').count() + 1 };
        println!("  {}{}", "  ".repeat(depth), path);
    }

    let other = document.other_blocks();
    if !other.is_empty() {
        println!("\nOther blocks ({}):", other.len());
        for block in other {
            println!("  {}", block.kind);
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}

/// List supported engine versions
fn cmd_versions() {
    println!("{:<8} {:<7} {:<10} {}", "Version", "Format", "Skeletons", "Internal vertices");
    for version in GodotVersion::ALL {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };
        let marker = if version == GodotVersion::default() { " (default)" } else { "" };
        println!(
            "{:<8} {:<7} {:<10} {}{}",
            version.as_str(),
            version.scene_format(),
            yes_no(version.supports_skeletons()),
            yes_no(version.supports_internal_vertices()),
            marker
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_export() {
        let cli = Cli::parse_from([
            "scenebridge",
            "export",
            "scene.json",
            "-o",
            "level.tscn",
            "--godot-version",
            "4.0",
            "--use-collections",
        ]);
        match cli.command {
            Commands::Export { godot_version, use_collections, output, .. } => {
                assert_eq!(godot_version, Some(GodotVersion::V4));
                assert!(use_collections);
                assert_eq!(output, PathBuf::from("level.tscn"));
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_load_scene_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scene.yaml");
        std::fs::write(
            &path,
            "objects:\n  - name: Quad\n    data:\n      type: mesh\n      vertices:\n        - co: [0.0, 0.0, 0.0]\n",
        )
        .unwrap();

        let scene = load_scene(&path).unwrap();
        assert_eq!(scene.objects[0].name, "Quad");
    }

    #[test]
    fn test_load_scene_rejects_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scene.blend");
        std::fs::write(&path, "").unwrap();
        assert!(load_scene(&path).is_err());
    }
}
