//! Skeleton and mesh join

use tracing::{debug, info};

use super::{MergeReport, MergeSession};
use crate::bones::MAIN_BONES;
use crate::error::MergeError;
use crate::host::{GeometryHost, Mode, ObjectId};
use crate::naming::BoneName;

/// Join the merge armature and all meshes into the base, returning the mesh
pub(super) fn join(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
    report: &mut MergeReport,
) -> Result<ObjectId, MergeError> {
    let base = session.base;

    host.unselect_all();
    host.set_active(base);
    host.select(session.merge);
    host.join_objects(base, &[session.merge])?;

    let mesh = host.join_meshes_under_armature(base)?;
    let keys = host.clean_shape_keys(mesh)?;
    info!(armature = %session.base_name, shape_keys_removed = keys, "Joined armatures");

    host.unselect_all();
    host.set_active(base);
    host.enter_mode(base, Mode::Edit)?;
    if session.merge_same_bones {
        parent_to_same_names(host, session)?;
    } else {
        parent_to_correspondence(host, session)?;
    }
    host.enter_mode(base, Mode::Object)?;

    host.delete_bone_constraints(base)?;
    report.removed_groups += host.remove_unused_vertex_groups(base, MAIN_BONES)?;
    report.deleted_bones += host.remove_zero_weight(base, &session.keep_filter())?;
    Ok(mesh)
}

/// Hang every pending bone off the base bone sharing its stem
fn parent_to_same_names(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
) -> Result<(), MergeError> {
    let base = session.base;
    for bone in host.bones(base) {
        let Some(name) = host.bone_name(base, bone) else {
            continue;
        };
        if !name.is_pending_merge() {
            continue;
        }
        if let Some(target) = host.find_bone(base, &name.clone().settled().to_string()) {
            host.set_bone_parent(base, bone, Some(target))?;
            debug!(bone = %name, "Parented to same-named bone");
        }
    }
    Ok(())
}

/// Hang each corresponding `X.merge` off `X`
fn parent_to_correspondence(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
) -> Result<(), MergeError> {
    let base = session.base;
    for name in &session.correspondence {
        let merged = BoneName::new(name).into_merged().to_string();
        let (Some(bone), Some(target)) = (host.find_bone(base, &merged), host.find_bone(base, name))
        else {
            continue;
        };
        host.set_bone_parent(base, bone, Some(target))?;
        debug!(bone = %merged, parent = %name, "Parented to corresponding bone");
    }
    Ok(())
}
