//! Weight reconciliation
//!
//! Folds the influence of every pending `X.merge` bone into its base bone `X`
//! and collapses names afterwards. Mixing is additive under the session's
//! [`WeightMixPolicy`](crate::WeightMixPolicy), so a vertex never ends up with
//! less weight than either side gave it.

use tracing::{debug, info};

use super::{MergeReport, MergeSession};
use crate::error::MergeError;
use crate::host::{BoneId, GeometryHost, Mode, ObjectId};
use crate::naming::BoneName;

pub(super) fn reconcile(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
    mesh: ObjectId,
    report: &mut MergeReport,
) -> Result<(), MergeError> {
    if session.mesh_only {
        return name_attached_bone(host, session, report);
    }

    let swaps = if session.merge_same_bones {
        fold_same_bones(host, session, mesh, report)?;
        Vec::new()
    } else {
        fold_correspondence(host, session, mesh, report)?
    };
    settle_pending(host, session, report)?;
    swap_into_place(host, session, &swaps, report)
}

fn mix(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
    mesh: ObjectId,
    source: &str,
    dest: &str,
    report: &mut MergeReport,
) -> Result<(), MergeError> {
    host.mix_weights(mesh, source, dest, session.policy)?;
    debug!(source, dest, "Mixed weights");
    report.mixed.push(dest.to_string());
    Ok(())
}

/// Fold every pending bone into the same-named base bone, then delete it
fn fold_same_bones(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
    mesh: ObjectId,
    report: &mut MergeReport,
) -> Result<(), MergeError> {
    let base = session.base;
    info!("Merging same bones");

    let mut redundant: Vec<BoneId> = Vec::new();
    for bone in host.bones(base) {
        let Some(name) = host.bone_name(base, bone) else {
            continue;
        };
        if !name.is_pending_merge() {
            continue;
        }
        let source = name.to_string();
        let dest = name.settled().to_string();
        if host.find_bone(base, &dest).is_none() {
            continue;
        }

        match (host.has_vertex_group(mesh, &dest), host.has_vertex_group(mesh, &source)) {
            (true, true) => mix(host, session, mesh, &source, &dest, report)?,
            // The merge bone goes away, its weights must not
            (false, true) => host.rename_vertex_group(mesh, &source, &dest)?,
            _ => {}
        }
        redundant.push(bone);
    }

    host.unselect_all();
    host.set_active(base);
    host.enter_mode(base, Mode::Edit)?;
    for bone in &redundant {
        host.delete_bone(base, *bone)?;
    }
    host.enter_mode(base, Mode::Object)?;
    report.deleted_bones += redundant.len();
    Ok(())
}

/// Fold corresponding pairs; returns names whose merge bone should take over
fn fold_correspondence(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
    mesh: ObjectId,
    report: &mut MergeReport,
) -> Result<Vec<String>, MergeError> {
    let mut swaps = Vec::new();
    for name in &session.correspondence {
        let merged = BoneName::new(name).into_merged().to_string();
        match (host.has_vertex_group(mesh, name), host.has_vertex_group(mesh, &merged)) {
            (true, true) => mix(host, session, mesh, &merged, name, report)?,
            (false, true) => swaps.push(name.clone()),
            _ => {}
        }
    }
    Ok(swaps)
}

/// Strip the pending tag from every bone whose stem is free
fn settle_pending(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
    report: &mut MergeReport,
) -> Result<(), MergeError> {
    let base = session.base;
    for bone in host.bones(base) {
        let Some(name) = host.bone_name(base, bone) else {
            continue;
        };
        if !name.is_pending_merge() {
            continue;
        }
        let settled = name.settled();
        if host.find_bone(base, &settled.to_string()).is_none() {
            let settled = host.rename_bone(base, bone, settled)?;
            report.settled.push(settled.to_string());
        }
    }
    Ok(())
}

/// Let `X.merge` claim the name and parent slot of `X`; the old `X` becomes
/// `X_Old` and hangs off the new bone
fn swap_into_place(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
    swaps: &[String],
    report: &mut MergeReport,
) -> Result<(), MergeError> {
    if swaps.is_empty() {
        return Ok(());
    }
    let base = session.base;
    host.unselect_all();
    host.set_active(base);
    host.enter_mode(base, Mode::Edit)?;

    for name in swaps {
        let merged = BoneName::new(name).into_merged().to_string();
        let (Some(old), Some(new)) = (host.find_bone(base, name), host.find_bone(base, &merged)) else {
            continue;
        };
        let parent = host.bone_parent(base, old);
        let retired = host.rename_bone(base, old, BoneName::new(name).into_collision())?;
        let claimed = host.rename_bone(base, new, BoneName::new(name))?;
        host.set_bone_parent(base, new, parent)?;
        host.set_bone_parent(base, old, Some(new))?;
        debug!(bone = %claimed, old = %retired, "Swapped merge bone into place");
        report.swapped.push(claimed.to_string());
    }

    host.enter_mode(base, Mode::Object)?;
    Ok(())
}

/// Name the single bone of a mesh-only merge
fn name_attached_bone(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
    report: &mut MergeReport,
) -> Result<(), MergeError> {
    let base = session.base;
    let remembered = session
        .mesh_only_bone
        .clone()
        .ok_or_else(|| MergeError::InternalInconsistency(session.merge_name.clone()))?;
    let display = remembered.to_string();
    let bone = host
        .find_bone(base, &display)
        .ok_or(MergeError::InternalInconsistency(display))?;

    let name = match &session.mesh_name {
        Some(mesh_name) => host.rename_bone(base, bone, BoneName::new(mesh_name))?,
        None => {
            let settled = remembered.clone().settled();
            if host.find_bone(base, &settled.to_string()).is_none() {
                host.rename_bone(base, bone, settled)?
            } else {
                remembered
            }
        }
    };
    info!(bone = %name, "Attached mesh bone");
    report.attached_bone = Some(name.to_string());
    Ok(())
}
