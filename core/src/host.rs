//! Host capability interface
//!
//! The merge never owns scene data. It drives the host's object graph through
//! [`GeometryHost`], passing explicit object and bone ids to every call.
//! Selection and mode changes are side effects the host may use to mirror its
//! own editing model; they are never read back as inputs.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::naming::{BoneFilter, BoneName};
use crate::transform::{Axis, Transform};

/// Scene object handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

/// Bone handle, unique within one armature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoneId(pub u32);

/// Object kind as seen through the host interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Armature,
    Mesh,
    Empty,
}

/// Interaction mode of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Object,
    Edit,
}

/// Transform components baked by [`GeometryHost::apply_transform`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyMask {
    pub location: bool,
    pub rotation: bool,
    pub scale: bool,
}

impl ApplyMask {
    pub const ALL: Self = Self {
        location: true,
        rotation: true,
        scale: true,
    };
}

/// How two weights of the same vertex combine when groups are mixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightMixPolicy {
    /// `min(a + b, 1.0)`
    #[default]
    Clamp,
    /// `a + b`
    Unclamped,
}

impl WeightMixPolicy {
    pub fn combine(self, existing: f32, incoming: f32) -> f32 {
        let sum = existing + incoming;
        match self {
            WeightMixPolicy::Clamp => sum.clamp(0.0, 1.0),
            WeightMixPolicy::Unclamped => sum,
        }
    }
}

/// Primitive operations the merge needs from a geometry host
///
/// Bone structure edits (`create_bone`, `delete_bone`, `set_bone_parent`)
/// happen between `enter_mode(armature, Mode::Edit)` and
/// `enter_mode(armature, Mode::Object)`. Vertex groups are addressed by the
/// display name of the bone they belong to.
pub trait GeometryHost {
    // Objects

    fn list_armatures(&self) -> Vec<ObjectId>;

    /// Meshes parented to `armature`, or every mesh in the scene for `None`
    fn list_meshes(&self, armature: Option<ObjectId>) -> Vec<ObjectId>;

    fn find_object(&self, name: &str) -> Option<ObjectId>;

    fn object_kind(&self, object: ObjectId) -> Option<ObjectKind>;

    fn object_name(&self, object: ObjectId) -> Option<String>;

    fn rename_object(&mut self, object: ObjectId, name: &str) -> Result<(), HostError>;

    fn object_parent(&self, object: ObjectId) -> Option<ObjectId>;

    /// Delete an object; its children keep their world placement
    fn delete_object(&mut self, object: ObjectId) -> Result<(), HostError>;

    fn transform(&self, object: ObjectId) -> Result<Transform, HostError>;

    fn set_transform(&mut self, object: ObjectId, transform: Transform) -> Result<(), HostError>;

    /// Bake transform components into the object's data, resetting them
    fn apply_transform(&mut self, object: ObjectId, mask: ApplyMask) -> Result<(), HostError>;

    // Selection and modes

    fn set_active(&mut self, object: ObjectId);

    fn select(&mut self, object: ObjectId);

    fn unselect_all(&mut self);

    fn enter_mode(&mut self, object: ObjectId, mode: Mode) -> Result<(), HostError>;

    // Joins

    /// Join `selected` into `active`; `active` survives and is returned
    fn join_objects(&mut self, active: ObjectId, selected: &[ObjectId])
    -> Result<ObjectId, HostError>;

    /// Join every mesh parented to `armature` into one and return it
    fn join_meshes_under_armature(&mut self, armature: ObjectId) -> Result<ObjectId, HostError>;

    /// Create an armature object at the origin holding a single bone
    fn create_armature(&mut self, name: &str, bone: BoneName) -> Result<ObjectId, HostError>;

    /// Parent `mesh` to `armature` and deform it with that armature
    fn bind_mesh_to_armature(&mut self, mesh: ObjectId, armature: ObjectId)
    -> Result<(), HostError>;

    // Bones

    fn bones(&self, armature: ObjectId) -> Vec<BoneId>;

    fn bone_name(&self, armature: ObjectId, bone: BoneId) -> Option<BoneName>;

    fn find_bone(&self, armature: ObjectId, name: &str) -> Option<BoneId>;

    /// Head and tail positions in armature space
    fn bone_segment(&self, armature: ObjectId, bone: BoneId) -> Option<(Vec3, Vec3)>;

    fn create_bone(
        &mut self,
        armature: ObjectId,
        name: BoneName,
        head: Vec3,
        tail: Vec3,
    ) -> Result<BoneId, HostError>;

    /// Rename a bone and the vertex groups named after it.
    ///
    /// Returns the name actually given, which differs from `name` when
    /// another bone already uses it.
    fn rename_bone(
        &mut self,
        armature: ObjectId,
        bone: BoneId,
        name: BoneName,
    ) -> Result<BoneName, HostError>;

    /// Delete a bone; its children move to its parent
    fn delete_bone(&mut self, armature: ObjectId, bone: BoneId) -> Result<(), HostError>;

    fn bone_parent(&self, armature: ObjectId, bone: BoneId) -> Option<BoneId>;

    fn set_bone_parent(
        &mut self,
        armature: ObjectId,
        bone: BoneId,
        parent: Option<BoneId>,
    ) -> Result<(), HostError>;

    /// Lengthen bones whose head and tail coincide along `axis`
    fn fix_zero_length_bones(&mut self, armature: ObjectId, axis: Axis)
    -> Result<usize, HostError>;

    /// Presentation-only tail/child connectivity fix
    fn recompute_bone_connectivity(&mut self, armature: ObjectId) -> Result<(), HostError>;

    fn delete_bone_constraints(&mut self, armature: ObjectId) -> Result<usize, HostError>;

    // Vertex groups

    fn vertex_group_names(&self, mesh: ObjectId) -> Vec<String>;

    fn has_vertex_group(&self, mesh: ObjectId, name: &str) -> bool {
        self.vertex_group_names(mesh).iter().any(|n| n == name)
    }

    fn create_vertex_group(&mut self, mesh: ObjectId, name: &str) -> Result<(), HostError>;

    fn rename_vertex_group(&mut self, mesh: ObjectId, from: &str, to: &str)
    -> Result<(), HostError>;

    fn remove_vertex_group(&mut self, mesh: ObjectId, name: &str) -> Result<(), HostError>;

    fn remove_all_vertex_groups(&mut self, mesh: ObjectId) -> Result<(), HostError>;

    /// Put every vertex of `mesh` into `group` at `weight`
    fn assign_all_vertices(&mut self, mesh: ObjectId, group: &str, weight: f32)
    -> Result<(), HostError>;

    /// Add `source` weights into `dest`, then remove `source`
    fn mix_weights(
        &mut self,
        mesh: ObjectId,
        source: &str,
        dest: &str,
        policy: WeightMixPolicy,
    ) -> Result<(), HostError>;

    /// Remove groups without any positive weight from the armature's meshes,
    /// sparing the names in `spare`
    fn remove_unused_vertex_groups(
        &mut self,
        armature: ObjectId,
        spare: &[&str],
    ) -> Result<usize, HostError>;

    /// Purge near-zero weights from the armature's meshes, then delete bones
    /// that influence no vertex unless `keep` spares them.
    ///
    /// Returns the number of deleted bones.
    fn remove_zero_weight(&mut self, armature: ObjectId, keep: &BoneFilter)
    -> Result<usize, HostError>;

    /// Drop shape keys identical to the basis
    fn clean_shape_keys(&mut self, mesh: ObjectId) -> Result<usize, HostError>;

    // Reporting

    /// Surface a structured error to the user; the host stays usable
    fn report_error(&mut self, code: f32, messages: &[String]) {
        tracing::warn!(code, "{}", messages.join("\n"));
    }
}
