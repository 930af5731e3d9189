//! Bone namespace resolution
//!
//! Decides how merge bones will find their base counterparts, then tags every
//! merge bone as pending so the join cannot collide with base names.

use glam::Vec3;
use tracing::{debug, info};

use super::{Anchor, MergeSession};
use crate::bones::{MAIN_BONES, is_anchor_candidate};
use crate::error::MergeError;
use crate::host::{GeometryHost, Mode};
use crate::naming::BoneName;
use crate::scene::ZERO_LENGTH_OFFSET;

pub(super) fn resolve(
    host: &mut dyn GeometryHost,
    session: &mut MergeSession,
) -> Result<Anchor, MergeError> {
    let merge = session.merge;
    host.unselect_all();
    host.set_active(merge);
    host.enter_mode(merge, Mode::Edit)?;

    let canonical = MAIN_BONES
        .iter()
        .find(|name| is_anchor_candidate(name) && host.find_bone(merge, name).is_some());

    let anchor = if let Some(name) = canonical {
        info!(anchor = *name, "Auto merge");
        session.correspondence = MAIN_BONES.iter().map(|n| n.to_string()).collect();
        Anchor::Canonical(name.to_string())
    } else if !session.merge_same_bones && !session.mesh_only {
        info!("Custom merge");
        session.correspondence = MAIN_BONES.iter().map(|n| n.to_string()).collect();
        synthesize_anchor(host, session)?
    } else if session.mesh_only {
        let bone = attach_name(host, session)?;
        session.correspond(&bone);
        Anchor::AttachBone(bone)
    } else {
        session.correspondence = MAIN_BONES.iter().map(|n| n.to_string()).collect();
        Anchor::None
    };

    for bone in host.bones(merge) {
        let Some(name) = host.bone_name(merge, bone) else {
            continue;
        };
        let tagged = host.rename_bone(merge, bone, name.into_merged())?;
        if session.mesh_only {
            session.mesh_only_bone = Some(tagged);
        }
    }

    host.enter_mode(merge, Mode::Object)?;
    Ok(anchor)
}

/// Create a stub bone named after the attach bone and hang every root under it
fn synthesize_anchor(
    host: &mut dyn GeometryHost,
    session: &mut MergeSession,
) -> Result<Anchor, MergeError> {
    let merge = session.merge;
    let root_name = attach_name(host, session)?;

    let displaced = match host.find_bone(merge, &root_name) {
        Some(existing) => {
            let renamed = host.rename_bone(merge, existing, BoneName::new(&root_name).into_collision())?;
            debug!(bone = %renamed, "Moved colliding bone out of the way");
            Some(renamed.to_string())
        }
        None => None,
    };

    let root = host.create_bone(
        merge,
        BoneName::new(&root_name),
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, ZERO_LENGTH_OFFSET),
    )?;
    host.set_bone_parent(merge, root, None)?;
    for bone in host.bones(merge) {
        if bone != root && host.bone_parent(merge, bone).is_none() {
            host.set_bone_parent(merge, bone, Some(root))?;
        }
    }

    session.correspond(&root_name);
    session.root_stem = Some(root_name.clone());
    Ok(Anchor::Synthesized {
        bone: root_name,
        displaced,
    })
}

/// Caller's attach bone, else the first bone of the base armature
fn attach_name(host: &dyn GeometryHost, session: &MergeSession) -> Result<String, MergeError> {
    if let Some(name) = &session.attach_bone {
        return Ok(name.clone());
    }
    let source = if session.mesh_only { session.merge } else { session.base };
    host.bones(source)
        .first()
        .and_then(|bone| host.bone_name(source, *bone))
        .map(|name| name.to_string())
        .ok_or_else(|| MergeError::InternalInconsistency(format!("{} root", session.base_name)))
}
