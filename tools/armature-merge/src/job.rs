//! merge.toml job manifests
//!
//! A job names one input scene and the steps to run on it:
//!
//! ```toml
//! [scene]
//! input = "avatar.json"
//! output = "avatar.merged.json"
//!
//! [defaults]
//! weight_policy = "clamp"
//!
//! [[merge]]
//! base = "Body"
//! merge = "Outfit"
//!
//! [[attach]]
//! mesh = "Sword"
//! base = "Body"
//! bone = "Right wrist"
//! ```
//!
//! Merge steps run first in file order, then attach steps in file order.
//! Scene paths are relative to the manifest's directory.

use anyhow::{Context, Result};
use armature_merge::{
    MergeError, MergeReport, MergeRequest, Scene, WeightMixPolicy, attach_mesh_to_bone,
    merge_armatures,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// merge.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct MergeJob {
    pub scene: SceneSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub merge: Vec<MergeStep>,
    #[serde(default)]
    pub attach: Vec<AttachStep>,
}

/// Scene documents read and written by the job
#[derive(Debug, Deserialize)]
pub struct SceneSection {
    pub input: PathBuf,
    /// Default: `<input stem>.merged.json` next to the input
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Settings shared by every step
#[derive(Debug, Default, Deserialize)]
pub struct DefaultsSection {
    /// "clamp" (default) or "unclamped"
    #[serde(default)]
    pub weight_policy: WeightMixPolicy,
}

/// One armature merge
#[derive(Debug, Deserialize)]
pub struct MergeStep {
    pub base: String,
    pub merge: String,
    #[serde(default)]
    pub mesh_only: bool,
    /// Final bone name for mesh-only merges
    #[serde(default)]
    pub mesh_name: Option<String>,
    #[serde(default)]
    pub same_bones: bool,
    #[serde(default)]
    pub attach_bone: Option<String>,
    /// Overrides `[defaults] weight_policy`
    #[serde(default)]
    pub weight_policy: Option<WeightMixPolicy>,
}

impl MergeStep {
    pub fn request(&self, defaults: &DefaultsSection) -> MergeRequest {
        let mut request = MergeRequest::new(&self.base, &self.merge)
            .merge_same_bones(self.same_bones)
            .weight_policy(self.weight_policy.unwrap_or(defaults.weight_policy));
        if self.mesh_only {
            request = request.mesh_only(self.mesh_name.clone());
        }
        if let Some(bone) = &self.attach_bone {
            request = request.attach_bone(bone);
        }
        request
    }
}

/// Rig a loose mesh to a new bone under `bone`
#[derive(Debug, Deserialize)]
pub struct AttachStep {
    pub mesh: String,
    pub base: String,
    pub bone: String,
}

/// Result of a finished job
#[derive(Debug)]
pub struct JobOutcome {
    pub output: PathBuf,
    pub reports: Vec<MergeReport>,
}

impl MergeJob {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse merge.toml")
    }

    /// Validate manifest fields
    pub fn validate(&self) -> Result<()> {
        if self.merge.is_empty() && self.attach.is_empty() {
            anyhow::bail!("merge.toml has no [[merge]] or [[attach]] steps");
        }

        for (i, step) in self.merge.iter().enumerate() {
            let n = i + 1;
            if step.base.is_empty() || step.merge.is_empty() {
                anyhow::bail!("Merge step {n} needs both 'base' and 'merge'");
            }
            if step.base == step.merge {
                anyhow::bail!("Merge step {n} merges '{}' into itself", step.base);
            }
            if step.mesh_name.is_some() && !step.mesh_only {
                anyhow::bail!("Merge step {n} sets 'mesh_name' without 'mesh_only = true'");
            }
            if step.mesh_only && step.same_bones {
                anyhow::bail!("Merge step {n} cannot combine 'mesh_only' and 'same_bones'");
            }
        }

        for (i, step) in self.attach.iter().enumerate() {
            if step.mesh.is_empty() || step.base.is_empty() || step.bone.is_empty() {
                anyhow::bail!("Attach step {} needs 'mesh', 'base' and 'bone'", i + 1);
            }
        }
        Ok(())
    }

    pub fn input_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.scene.input)
    }

    pub fn output_path(&self, base_dir: &Path) -> PathBuf {
        match &self.scene.output {
            Some(output) => base_dir.join(output),
            None => self.input_path(base_dir).with_extension("merged.json"),
        }
    }

    /// Object names referenced by a step but absent from `scene`.
    ///
    /// Merge armatures and attached meshes are consumed by their step, so a
    /// later step naming them is reported as well.
    pub fn missing_objects(&self, scene: &Scene) -> Vec<String> {
        let mut consumed: Vec<&str> = Vec::new();
        let mut missing: Vec<String> = Vec::new();
        let mut require = |name: &str, consumed: &[&str]| {
            let absent = scene.find(name).is_none() || consumed.contains(&name);
            if absent && !missing.iter().any(|m| m == name) {
                missing.push(name.to_string());
            }
        };

        for step in &self.merge {
            require(&step.base, &consumed);
            require(&step.merge, &consumed);
            consumed.push(&step.merge);
        }
        for step in &self.attach {
            require(&step.base, &consumed);
            require(&step.mesh, &consumed);
            consumed.push(&step.mesh);
        }
        missing
    }
}

/// Run every step on `scene`, stopping at the first failure
pub fn execute(job: &MergeJob, scene: &mut Scene) -> Result<Vec<MergeReport>> {
    let mut reports = Vec::with_capacity(job.merge.len() + job.attach.len());

    for (i, step) in job.merge.iter().enumerate() {
        tracing::info!("Merge step {}: {} -> {}", i + 1, step.merge, step.base);
        let report = merge_armatures(scene, &step.request(&job.defaults))
            .map_err(|err| step_failed("Merge", i, err))?;
        reports.push(report);
    }

    for (i, step) in job.attach.iter().enumerate() {
        tracing::info!("Attach step {}: {} -> {}/{}", i + 1, step.mesh, step.base, step.bone);
        let report = attach_mesh_to_bone(scene, &step.mesh, &step.base, &step.bone)
            .map_err(|err| step_failed("Attach", i, err))?;
        reports.push(report);
    }

    Ok(reports)
}

/// Load the job's scene, run it and save the result
pub fn run(job: &MergeJob, base_dir: &Path) -> Result<JobOutcome> {
    let input = job.input_path(base_dir);
    let mut scene = Scene::load(&input)
        .with_context(|| format!("Failed to load scene: {}", input.display()))?;

    let reports = execute(job, &mut scene)?;

    let output = job.output_path(base_dir);
    scene
        .save(&output)
        .with_context(|| format!("Failed to write scene: {}", output.display()))?;
    Ok(JobOutcome { output, reports })
}

/// Wrap a merge failure with its step and structured code
pub fn step_failed(kind: &str, index: usize, err: MergeError) -> anyhow::Error {
    let context = format!(
        "{kind} step {} failed (code {}): {}",
        index + 1,
        err.code(),
        err.messages().join(" ")
    );
    anyhow::Error::new(err).context(context)
}
