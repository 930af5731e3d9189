//! Merge pipeline
//!
//! One merge runs five stages in a fixed order over a [`MergeSession`]:
//!
//! 1. [`normalize`] - bake transforms so the merge mesh placement ends up on
//!    the merge armature, or reject the merge
//! 2. [`namespace`] - pick the correspondence strategy and tag every merge
//!    bone as pending
//! 3. [`join`] - join armatures and meshes, hang merged bones off their
//!    counterparts
//! 4. [`weights`] - fold duplicate influences into the base bones and settle
//!    names
//! 5. [`cleanup`] - drop dead groups and bones, fix presentation
//!
//! A stage failing stops the pipeline; nothing is rolled back.

mod cleanup;
mod join;
mod namespace;
mod normalize;
mod session;
mod weights;

pub(crate) use session::MergeSession;

use serde::Serialize;
use tracing::info;

use crate::error::MergeError;
use crate::host::GeometryHost;

/// How merge bones are matched to base bones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Canonical bone names found in the merge armature
    Auto,
    /// Merge armature hung off a synthesized anchor bone
    Custom,
    /// Every merge bone folds into the base bone of the same name
    SameBones,
    /// Single bone attach of one rigid mesh
    MeshOnly,
}

/// What anchored the merge armature to the base
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// First canonical bone found in the merge armature
    Canonical(String),
    /// Stub bone created in the merge armature, and the bone it displaced
    Synthesized {
        bone: String,
        displaced: Option<String>,
    },
    /// Attach bone of a mesh-only merge without a canonical name
    AttachBone(String),
    None,
}

/// Summary of a finished merge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeReport {
    /// Name of the surviving armature
    pub armature: String,
    /// Surviving mesh
    pub mesh: String,
    pub strategy: Strategy,
    pub anchor: Anchor,
    /// Base groups that received merge weights
    pub mixed: Vec<String>,
    /// Merge bones renamed back to their stem
    pub settled: Vec<String>,
    /// Bones that took over a base bone's name and slot
    pub swapped: Vec<String>,
    /// Final name of the attached bone in mesh-only merges
    pub attached_bone: Option<String>,
    pub deleted_bones: usize,
    pub removed_groups: usize,
}

impl MergeReport {
    fn new(session: &MergeSession, anchor: Anchor) -> Self {
        Self {
            armature: session.base_name.clone(),
            mesh: String::new(),
            strategy: session.strategy(&anchor),
            anchor,
            mixed: Vec::new(),
            settled: Vec::new(),
            swapped: Vec::new(),
            attached_bone: None,
            deleted_bones: 0,
            removed_groups: 0,
        }
    }
}

/// Run every stage on a prepared session
pub(crate) fn run(
    host: &mut dyn GeometryHost,
    session: &mut MergeSession,
) -> Result<MergeReport, MergeError> {
    normalize::normalize(host, session)?;
    let anchor = namespace::resolve(host, session)?;
    let mut report = MergeReport::new(session, anchor);
    info!(strategy = ?report.strategy, "Resolved bone namespace");

    let mesh = join::join(host, session, &mut report)?;
    report.mesh = host.object_name(mesh).unwrap_or_default();

    weights::reconcile(host, session, mesh, &mut report)?;
    cleanup::finish(host, session, &mut report)?;

    info!(
        armature = %report.armature,
        mixed = report.mixed.len(),
        settled = report.settled.len(),
        deleted_bones = report.deleted_bones,
        "Merge complete"
    );
    Ok(report)
}
