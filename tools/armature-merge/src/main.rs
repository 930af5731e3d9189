//! armature-merge - merge rigged armatures in JSON scene documents
//!
//! Runs single merges and attaches, or whole merge.toml jobs, against scenes
//! saved by the core library.

use anyhow::{Context, Result};
use armature_merge::{
    MergeError, MergeReport, MergeRequest, Scene, WeightMixPolicy, attach_mesh_to_bone,
    merge_armatures,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use armature_merge_cli::{MergeJob, SceneSummary, job};

#[derive(Parser)]
#[command(name = "armature-merge")]
#[command(about = "Merge rigged armatures and their meshes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge one armature into another
    Merge {
        /// Scene document (JSON)
        scene: PathBuf,

        /// Armature that survives
        #[arg(long)]
        base: String,

        /// Armature folded into the base
        #[arg(long)]
        merge: String,

        /// Merge armature drives a single rigid mesh
        #[arg(long)]
        mesh_only: bool,

        /// Final bone name for --mesh-only
        #[arg(long, requires = "mesh_only")]
        mesh_name: Option<String>,

        /// Fold every merge bone into the base bone of the same name
        #[arg(long, conflicts_with = "mesh_only")]
        same_bones: bool,

        /// Anchor bone when no standard bone name is found
        #[arg(long)]
        attach_bone: Option<String>,

        /// How overlapping weights combine
        #[arg(long, value_enum, default_value = "clamp")]
        policy: Policy,

        /// Output scene (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the merge report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rig a loose mesh to a new bone and merge it into an armature
    Attach {
        /// Scene document (JSON)
        scene: PathBuf,

        /// Mesh to attach
        #[arg(long)]
        mesh: String,

        /// Armature receiving the mesh
        #[arg(long)]
        base: String,

        /// Base bone the mesh follows
        #[arg(long)]
        bone: String,

        /// Output scene (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the merge report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run every step of a job manifest
    Run {
        /// Path to merge.toml manifest
        #[arg(default_value = "merge.toml")]
        manifest: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a job manifest and its scene without merging
    Check {
        /// Path to merge.toml manifest
        #[arg(default_value = "merge.toml")]
        manifest: PathBuf,
    },

    /// Print armatures, bones and meshes of a scene
    Inspect {
        /// Scene document (JSON)
        scene: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// Sum and cap at 1.0
    Clamp,
    /// Plain sum
    Unclamped,
}

impl From<Policy> for WeightMixPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Clamp => WeightMixPolicy::Clamp,
            Policy::Unclamped => WeightMixPolicy::Unclamped,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            scene,
            base,
            merge,
            mesh_only,
            mesh_name,
            same_bones,
            attach_bone,
            policy,
            output,
            json,
        } => {
            let mut request = MergeRequest::new(base, merge)
                .merge_same_bones(same_bones)
                .weight_policy(policy.into());
            if mesh_only {
                request = request.mesh_only(mesh_name);
            }
            if let Some(bone) = attach_bone {
                request = request.attach_bone(bone);
            }

            let mut document = load_scene(&scene)?;
            let report = merge_armatures(&mut document, &request).map_err(merge_failed)?;
            save_scene(&document, output.as_deref().unwrap_or(&scene))?;
            print_report(&report, json)?;
        }

        Commands::Attach {
            scene,
            mesh,
            base,
            bone,
            output,
            json,
        } => {
            let mut document = load_scene(&scene)?;
            let report =
                attach_mesh_to_bone(&mut document, &mesh, &base, &bone).map_err(merge_failed)?;
            save_scene(&document, output.as_deref().unwrap_or(&scene))?;
            print_report(&report, json)?;
        }

        Commands::Run { manifest, verbose } => {
            if verbose {
                tracing::info!("Running job {:?}", manifest);
            }
            let config = MergeJob::load(&manifest)?;
            config.validate()?;
            let outcome = job::run(&config, manifest_dir(&manifest))?;
            for report in &outcome.reports {
                print_report(report, false)?;
            }
            tracing::info!("Wrote {:?}", outcome.output);
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = MergeJob::load(&manifest)?;
            config.validate()?;

            let input = config.input_path(manifest_dir(&manifest));
            let document = load_scene(&input)?;
            let missing = config.missing_objects(&document);
            if !missing.is_empty() {
                anyhow::bail!(
                    "Objects not available when their step runs: {}",
                    missing.join(", ")
                );
            }
            tracing::info!("Manifest is valid!");
        }

        Commands::Inspect { scene } => {
            let document = load_scene(&scene)?;
            print!("{}", SceneSummary(&document));
        }
    }

    Ok(())
}

fn manifest_dir(manifest: &Path) -> &Path {
    manifest.parent().unwrap_or_else(|| Path::new("."))
}

fn load_scene(path: &Path) -> Result<Scene> {
    Scene::load(path).with_context(|| format!("Failed to load scene: {}", path.display()))
}

fn save_scene(scene: &Scene, path: &Path) -> Result<()> {
    scene
        .save(path)
        .with_context(|| format!("Failed to write scene: {}", path.display()))?;
    tracing::info!("Wrote {:?}", path);
    Ok(())
}

fn merge_failed(err: MergeError) -> anyhow::Error {
    let context = format!("Merge failed (code {}): {}", err.code(), err.messages().join(" "));
    anyhow::Error::new(err).context(context)
}

fn print_report(report: &MergeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        tracing::info!(
            "Merged into {:?} ({:?}): {} mixed, {} settled, {} bones and {} groups removed",
            report.armature,
            report.strategy,
            report.mixed.len(),
            report.settled.len(),
            report.deleted_bones,
            report.removed_groups
        );
    }
    Ok(())
}
