//! Transform normalization
//!
//! Bakes both sides to identity. The merge mesh is where the user placed the
//! new part, so its placement is composed into the merge armature first and
//! the bones follow the mesh. Rotations on a non-default merge armature
//! cannot be composed this way and are rejected before anything is joined.

use glam::Vec3;
use tracing::{debug, info};

use super::MergeSession;
use crate::error::MergeError;
use crate::host::{ApplyMask, GeometryHost, ObjectId};
use crate::transform::{Axis, Transform};

/// Bake base and merge transforms, returning the merge side's single mesh
pub(super) fn normalize(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
) -> Result<ObjectId, MergeError> {
    // Zero-length bones vanish in later bone edits
    for armature in [session.base, session.merge] {
        let axis = detect_up_axis(host, armature);
        host.fix_zero_length_bones(armature, axis)?;
    }

    let base_mesh = host.join_meshes_under_armature(session.base)?;
    let merge_mesh = host.join_meshes_under_armature(session.merge)?;

    bake(host, session.base)?;
    bake(host, base_mesh)?;

    let armature = host.transform(session.merge)?;
    let mesh = host.transform(merge_mesh)?;
    if let Some(axis) = rotation_conflict_axis(&armature, &mesh) {
        host.set_transform(session.merge, Transform::IDENTITY)?;
        host.unselect_all();
        host.set_active(merge_mesh);
        return Err(MergeError::RotationConflict {
            armature: session.merge_name.clone(),
            axis: axis.index(),
        });
    }

    host.set_transform(session.merge, compose_placement(&armature, &mesh))?;
    bake(host, merge_mesh)?;
    bake(host, session.merge)?;

    // Re-center the mesh under the now baked armature
    host.set_transform(
        merge_mesh,
        Transform::new(armature.location, Vec3::ZERO, armature.scale),
    )?;
    bake(host, merge_mesh)?;

    info!(armature = %session.merge_name, "Normalized merge transforms");
    Ok(merge_mesh)
}

fn bake(host: &mut dyn GeometryHost, object: ObjectId) -> Result<(), MergeError> {
    host.unselect_all();
    host.set_active(object);
    host.apply_transform(object, ApplyMask::ALL)?;
    Ok(())
}

/// Up axis of a rig: Y when the hip bone points mostly along Y, otherwise Z
pub(super) fn detect_up_axis(host: &dyn GeometryHost, armature: ObjectId) -> Axis {
    let hips = host.find_bone(armature, "Hips").or_else(|| {
        host.bones(armature)
            .into_iter()
            .find(|bone| host.bone_parent(armature, *bone).is_none())
    });
    let Some((head, tail)) = hips.and_then(|bone| host.bone_segment(armature, bone)) else {
        return Axis::Z;
    };
    let delta = (tail - head).abs();
    let axis = if delta.y > delta.z { Axis::Y } else { Axis::Z };
    debug!(?axis, "Detected up axis");
    axis
}

/// First axis on which a rotation meets a non-default merge armature
pub(super) fn rotation_conflict_axis(armature: &Transform, mesh: &Transform) -> Option<Axis> {
    Axis::ALL.into_iter().find(|axis| {
        let i = axis.index();
        let rotated = armature.is_rotated_on_axis(i) || mesh.is_rotated_on_axis(i);
        rotated && !armature.is_default_on_axis(i)
    })
}

/// Armature transform carrying the mesh placement on top of its own
pub(super) fn compose_placement(armature: &Transform, mesh: &Transform) -> Transform {
    Transform {
        location: mesh.location * armature.scale + armature.location,
        rotation: mesh.rotation,
        scale: mesh.scale * armature.scale,
    }
}
