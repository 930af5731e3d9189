//! Transient state of one merge

use super::{Anchor, Strategy};
use crate::bones::PROTECTED_BONES;
use crate::host::{ObjectId, WeightMixPolicy};
use crate::naming::{BoneFilter, BoneName};
use crate::ops::MergeRequest;

/// Created when a merge starts, dropped when it ends
#[derive(Debug, Clone)]
pub(crate) struct MergeSession {
    pub base: ObjectId,
    pub merge: ObjectId,
    pub base_name: String,
    pub merge_name: String,
    pub mesh_only: bool,
    pub mesh_name: Option<String>,
    pub merge_same_bones: bool,
    pub attach_bone: Option<String>,
    pub policy: WeightMixPolicy,
    /// Names whose `X` / `X.merge` pairs get matched, in order
    pub correspondence: Vec<String>,
    /// Stem of the synthesized anchor bone
    pub root_stem: Option<String>,
    /// The single tagged bone of a mesh-only merge
    pub mesh_only_bone: Option<BoneName>,
}

impl MergeSession {
    pub fn new(base: ObjectId, merge: ObjectId, request: &MergeRequest) -> Self {
        Self {
            base,
            merge,
            base_name: request.base_armature.clone(),
            merge_name: request.merge_armature.clone(),
            mesh_only: request.mesh_only,
            mesh_name: request.mesh_name.clone(),
            merge_same_bones: request.merge_same_bones,
            attach_bone: request.attach_bone.clone(),
            policy: request.weight_policy,
            correspondence: Vec::new(),
            root_stem: None,
            mesh_only_bone: None,
        }
    }

    /// Add a name to the correspondence set, keeping it duplicate free
    pub fn correspond(&mut self, name: &str) {
        if !self.correspondence.iter().any(|n| n == name) {
            self.correspondence.push(name.to_string());
        }
    }

    pub fn strategy(&self, anchor: &Anchor) -> Strategy {
        if self.mesh_only {
            Strategy::MeshOnly
        } else if self.merge_same_bones {
            Strategy::SameBones
        } else if matches!(anchor, Anchor::Synthesized { .. }) {
            Strategy::Custom
        } else {
            Strategy::Auto
        }
    }

    /// Bones that survive zero-weight removal
    pub fn keep_filter(&self) -> BoneFilter {
        BoneFilter::new(PROTECTED_BONES).with_stem(self.root_stem.clone())
    }
}
