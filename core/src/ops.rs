//! Entry operations
//!
//! [`merge_armatures`] and [`attach_mesh_to_bone`] validate their inputs,
//! run the merge pipeline and surface any failure through
//! [`GeometryHost::report_error`] before returning it.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::MergeError;
use crate::host::{GeometryHost, Mode, ObjectId, ObjectKind, WeightMixPolicy};
use crate::merge::{self, MergeReport, MergeSession};
use crate::naming::BoneName;

/// Name given to the throwaway armature of a mesh attach
const ATTACH_ARMATURE: &str = "Armature";

/// Parameters of one armature merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Armature that survives
    pub base_armature: String,
    /// Armature folded into the base
    pub merge_armature: String,
    /// Merge armature holds a single bone driving one rigid mesh
    #[serde(default)]
    pub mesh_only: bool,
    /// Final bone name in mesh-only merges
    #[serde(default)]
    pub mesh_name: Option<String>,
    /// Fold every merge bone into the base bone of the same name
    #[serde(default)]
    pub merge_same_bones: bool,
    /// Anchor bone when no canonical bone is found (default: first base bone)
    #[serde(default)]
    pub attach_bone: Option<String>,
    #[serde(default)]
    pub weight_policy: WeightMixPolicy,
}

impl MergeRequest {
    pub fn new(base_armature: impl Into<String>, merge_armature: impl Into<String>) -> Self {
        Self {
            base_armature: base_armature.into(),
            merge_armature: merge_armature.into(),
            mesh_only: false,
            mesh_name: None,
            merge_same_bones: false,
            attach_bone: None,
            weight_policy: WeightMixPolicy::default(),
        }
    }

    pub fn mesh_only(mut self, mesh_name: Option<String>) -> Self {
        self.mesh_only = true;
        self.mesh_name = mesh_name;
        self
    }

    pub fn merge_same_bones(mut self, enabled: bool) -> Self {
        self.merge_same_bones = enabled;
        self
    }

    pub fn attach_bone(mut self, bone: impl Into<String>) -> Self {
        self.attach_bone = Some(bone.into());
        self
    }

    pub fn weight_policy(mut self, policy: WeightMixPolicy) -> Self {
        self.weight_policy = policy;
        self
    }
}

/// Whether the scene holds two armatures to merge
pub fn can_merge_armatures(host: &dyn GeometryHost) -> bool {
    host.list_armatures().len() > 1
}

/// Whether the scene holds an armature and a mesh to attach
pub fn can_attach_mesh(host: &dyn GeometryHost) -> bool {
    !host.list_armatures().is_empty() && !host.list_meshes(None).is_empty()
}

/// Merge `request.merge_armature` and its meshes into `request.base_armature`
pub fn merge_armatures(
    host: &mut dyn GeometryHost,
    request: &MergeRequest,
) -> Result<MergeReport, MergeError> {
    let result = run_merge(host, request);
    surface(host, result)
}

/// Rig `mesh_name` to a new bone `bone_name` and merge it into `base_armature`.
///
/// Every vertex of the mesh is weighted fully to the new bone, which ends up
/// named after the mesh under the base bone it corresponds to.
pub fn attach_mesh_to_bone(
    host: &mut dyn GeometryHost,
    mesh_name: &str,
    base_armature: &str,
    bone_name: &str,
) -> Result<MergeReport, MergeError> {
    let result = attach(host, mesh_name, base_armature, bone_name, WeightMixPolicy::default());
    surface(host, result)
}

fn surface<T>(host: &mut dyn GeometryHost, result: Result<T, MergeError>) -> Result<T, MergeError> {
    if let Err(err) = &result {
        host.report_error(err.code(), &err.messages());
    }
    result
}

fn run_merge(
    host: &mut dyn GeometryHost,
    request: &MergeRequest,
) -> Result<MergeReport, MergeError> {
    info!(
        base = %request.base_armature,
        merge = %request.merge_armature,
        mesh_only = request.mesh_only,
        same_bones = request.merge_same_bones,
        "Merging armatures"
    );
    let mut session = prepare(host, request)?;
    merge::run(host, &mut session)
}

fn attach(
    host: &mut dyn GeometryHost,
    mesh_name: &str,
    base_armature: &str,
    bone_name: &str,
    policy: WeightMixPolicy,
) -> Result<MergeReport, MergeError> {
    let mesh = object_of_kind(host, mesh_name, ObjectKind::Mesh)?;
    let base = object_of_kind(host, base_armature, ObjectKind::Armature)?;
    if host.list_meshes(Some(base)).iter().all(|m| *m == mesh) {
        return Err(MergeError::EmptyArmature(base_armature.to_string()));
    }
    check_parents(host, &[(base, base_armature)], false)?;

    let armature = host.create_armature(ATTACH_ARMATURE, BoneName::new(bone_name))?;
    host.bind_mesh_to_armature(mesh, armature)?;

    host.unselect_all();
    host.set_active(mesh);
    host.enter_mode(mesh, Mode::Edit)?;
    host.remove_all_vertex_groups(mesh)?;
    host.create_vertex_group(mesh, bone_name)?;
    host.assign_all_vertices(mesh, bone_name, 1.0)?;
    host.enter_mode(mesh, Mode::Object)?;

    let armature_name = host
        .object_name(armature)
        .ok_or_else(|| MergeError::MissingObject(ATTACH_ARMATURE.to_string()))?;
    let request = MergeRequest::new(base_armature, armature_name)
        .mesh_only(Some(mesh_name.to_string()))
        .attach_bone(bone_name)
        .weight_policy(policy);
    run_merge(host, &request)
}

fn object_of_kind(
    host: &dyn GeometryHost,
    name: &str,
    kind: ObjectKind,
) -> Result<ObjectId, MergeError> {
    host.find_object(name)
        .filter(|id| host.object_kind(*id) == Some(kind))
        .ok_or_else(|| MergeError::MissingObject(name.to_string()))
}

/// Parents to delete once every other check has passed.
///
/// Parented armatures are only accepted in same-bone mode, and only under a
/// parent at identity.
fn check_parents(
    host: &dyn GeometryHost,
    sides: &[(ObjectId, &str)],
    same_bones: bool,
) -> Result<Vec<ObjectId>, MergeError> {
    let mut parents = Vec::new();
    for &(armature, name) in sides {
        let Some(parent) = host.object_parent(armature) else {
            continue;
        };
        if !same_bones {
            return Err(MergeError::UnfixedModel(name.to_string()));
        }
        if !host.transform(parent)?.is_identity() {
            return Err(MergeError::InvalidParentTransform(name.to_string()));
        }
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }
    Ok(parents)
}

/// Precondition checks; may delete identity parents in same-bone mode
fn prepare(
    host: &mut dyn GeometryHost,
    request: &MergeRequest,
) -> Result<MergeSession, MergeError> {
    let merge = object_of_kind(host, &request.merge_armature, ObjectKind::Armature)?;
    let base = object_of_kind(host, &request.base_armature, ObjectKind::Armature)?;
    if base == merge {
        return Err(MergeError::SameArmature(request.base_armature.clone()));
    }

    let sides = [
        (merge, request.merge_armature.as_str()),
        (base, request.base_armature.as_str()),
    ];
    let parents = check_parents(host, &sides, request.merge_same_bones)?;
    for (armature, name) in sides {
        if host.list_meshes(Some(armature)).is_empty() {
            return Err(MergeError::EmptyArmature(name.to_string()));
        }
    }

    for parent in parents {
        host.delete_object(parent)?;
    }

    Ok(MergeSession::new(base, merge, request))
}
