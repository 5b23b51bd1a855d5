//! Blueprint Scene - command line entry point
//!
//! Mounts a content root, resolves blueprint classes and scenes against it
//! and prints the results as JSON.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use blueprint_scene::asset::{search_paths, ContentRoot};
use blueprint_scene::blueprints::{
    asset_dependencies, resolve_class, CargoAnchorResolver, ComponentGraphBuilder, ResolveContext,
};
use blueprint_scene::core::error::Result;
use blueprint_scene::core::{ResolveError, ResolverConfig};
use blueprint_scene::lighting::extract_lighting_preset;
use blueprint_scene::scene::{SceneAssembler, SceneSpec};
use blueprint_scene::variants::{extract_color_variants, overlay_parameters_for};

/// Resolve game blueprint classes into renderable scenes
#[derive(Parser, Debug)]
#[command(name = "blueprint-scene")]
#[command(about = "Resolve blueprint classes, anchors and variants into renderable scenes")]
struct Cli {
    /// Directory of JSON packages
    #[arg(long, global = true, default_value = ".")]
    content_root: PathBuf,

    /// Mount mapping file: { "<virtual prefix>": "<relative dir>" }
    #[arg(long, global = true)]
    mapping: Option<PathBuf>,

    /// Container decryption key
    #[arg(long, global = true)]
    aes_key: Option<String>,

    #[arg(long, global = true, default_value = "GAME_UE4_24")]
    game_version: String,

    /// Resolver tables (TOML); built-in defaults otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log candidate scoring and resolution decisions
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a scene description into ResolvedScene JSON
    Render {
        #[arg(long)]
        scene: PathBuf,
        /// Output file; falls back to the scene's render.output, then stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Inspect blueprint classes
    #[command(subcommand)]
    Blueprint(BlueprintCommand),
    /// Cargo anchor data
    #[command(subcommand)]
    Cargo(CargoCommand),
    /// Cosmetic variants of a class
    #[command(subcommand)]
    Variants(VariantsCommand),
    /// Lighting data of a world
    #[command(subcommand)]
    Lighting(LightingCommand),
    /// Case-insensitive search over mounted package paths
    Search {
        #[arg(long)]
        term: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
enum BlueprintCommand {
    /// Flattened components with world transforms
    Components(PathArg),
    /// Unique mesh dependencies of one or more classes
    Graph {
        #[arg(long = "path", required = true)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum CargoCommand {
    Anchor {
        #[arg(long)]
        path: String,
        #[arg(long)]
        base_component: Option<String>,
        #[arg(long)]
        transfer_component: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum VariantsCommand {
    Colors(PathArg),
    Overlays(PathArg),
}

#[derive(Subcommand, Debug)]
enum LightingCommand {
    /// Directional and sky lights of the world's persistent level
    Preset(PathArg),
}

#[derive(Args, Debug)]
struct PathArg {
    #[arg(long)]
    path: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DependencyListing {
    path: String,
    dependencies: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(target: "cli", error = ?err, "Command failed");
            eprintln!("[{}] {}", err.subsystem(), err);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("blueprint_scene={level},{level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ResolverConfig::from_toml_file(path)?,
        None => ResolverConfig::default(),
    };
    let root = ContentRoot::open(
        &cli.content_root,
        cli.mapping.as_deref(),
        &cli.game_version,
        cli.aes_key.as_deref(),
    )?;
    let ctx = ResolveContext::new(&root, &config);

    match cli.command {
        Command::Render { scene, output } => render(ctx, &scene, output),
        Command::Blueprint(BlueprintCommand::Components(PathArg { path })) => {
            let class = resolve_class(&ctx, &path)?
                .ok_or_else(|| ResolveError::NotFound(format!("blueprint class for {path}")))?;
            let components = ComponentGraphBuilder::new(ctx).build(&class)?;
            tracing::info!(target: "cli", class = %class.path, components = components.len(), "Flattened class");
            print_json(&components)
        }
        Command::Blueprint(BlueprintCommand::Graph { paths }) => {
            let listings = paths
                .par_iter()
                .map(|path| dependency_listing(&root, &config, path))
                .collect::<Result<Vec<_>>>()?;
            print_json(&listings)
        }
        Command::Cargo(CargoCommand::Anchor {
            path,
            base_component,
            transfer_component,
        }) => {
            let base = base_component.as_deref().unwrap_or(&config.default_anchor);
            let transfer = transfer_component
                .as_deref()
                .unwrap_or(&config.default_transfer_component);
            let anchor = CargoAnchorResolver::new(ctx)
                .compute(&path, base, transfer)?
                .ok_or_else(|| ResolveError::NotFound(format!("cargo anchor for {path}")))?;
            print_json(&anchor)
        }
        Command::Variants(VariantsCommand::Colors(PathArg { path })) => {
            let class = resolve_class(&ctx, &path)?
                .ok_or_else(|| ResolveError::NotFound(format!("blueprint class for {path}")))?;
            let variants = class
                .default_object
                .as_deref()
                .map(|cdo| extract_color_variants(cdo, &config))
                .unwrap_or_default();
            print_json(&variants)
        }
        Command::Variants(VariantsCommand::Overlays(PathArg { path })) => {
            let parameters = overlay_parameters_for(&ctx, &path)?
                .ok_or_else(|| ResolveError::NotFound(format!("default object for {path}")))?;
            print_json(&parameters)
        }
        Command::Lighting(LightingCommand::Preset(PathArg { path })) => {
            let preset = extract_lighting_preset(&ctx, &path)?
                .ok_or_else(|| ResolveError::NotFound(format!("lighting preset for {path}")))?;
            print_json(&preset)
        }
        Command::Search { term, limit } => print_json(&search_paths(&root, &term, limit)),
    }
}

fn render(ctx: ResolveContext<'_>, scene_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let scene = SceneSpec::from_file(scene_path)?;
    let resolved = SceneAssembler::new(ctx).assemble(&scene)?;
    let json = serde_json::to_string_pretty(&resolved)?;

    let output = output.or_else(|| {
        scene
            .render
            .as_ref()
            .and_then(|render| render.output.as_deref())
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
    });
    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            tracing::info!(target: "cli", output = %path.display(), "Wrote resolved scene");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// One class per rayon task, each with its own context
fn dependency_listing(root: &ContentRoot, config: &ResolverConfig, path: &str) -> Result<DependencyListing> {
    let ctx = ResolveContext::new(root, config);
    let class = resolve_class(&ctx, path)?
        .ok_or_else(|| ResolveError::NotFound(format!("blueprint class for {path}")))?;
    let components = ComponentGraphBuilder::new(ctx).build(&class)?;
    Ok(DependencyListing {
        path: class.path,
        dependencies: asset_dependencies(&components),
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
