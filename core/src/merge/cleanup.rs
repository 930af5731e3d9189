//! Final cleanup of the unified armature

use tracing::debug;

use super::{MergeReport, MergeSession};
use crate::error::MergeError;
use crate::host::{GeometryHost, Mode};

pub(super) fn finish(
    host: &mut dyn GeometryHost,
    session: &MergeSession,
    report: &mut MergeReport,
) -> Result<(), MergeError> {
    let base = session.base;

    report.removed_groups += host.remove_unused_vertex_groups(base, &[])?;
    report.deleted_bones += host.remove_zero_weight(base, &session.keep_filter())?;

    host.unselect_all();
    host.set_active(base);
    host.enter_mode(base, Mode::Edit)?;
    host.recompute_bone_connectivity(base)?;
    host.enter_mode(base, Mode::Object)?;

    if host.object_name(base).as_deref() != Some(session.base_name.as_str()) {
        host.rename_object(base, &session.base_name)?;
        debug!(armature = %session.base_name, "Restored armature name");
    }
    Ok(())
}
