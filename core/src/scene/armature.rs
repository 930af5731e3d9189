//! Armature data: a forest of named bones

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::host::BoneId;
use crate::naming::BoneName;
use crate::transform::Axis;

/// Offset added along the up axis to a bone whose head and tail coincide
pub const ZERO_LENGTH_OFFSET: f32 = 0.1;

/// Single bone, positions in armature space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub id: BoneId,
    pub name: BoneName,
    pub head: Vec3,
    pub tail: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<BoneId>,
    /// Head glued to the parent's tail (display only)
    #[serde(default)]
    pub connected: bool,
    /// Names of pose constraints on this bone
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
}

impl Bone {
    pub fn is_zero_length(&self) -> bool {
        round5(self.head) == round5(self.tail)
    }
}

fn round5(v: Vec3) -> Vec3 {
    (v * 100_000.0).round() / 100_000.0
}

/// Armature object data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Armature {
    #[serde(default)]
    pub bones: Vec<Bone>,
}

impl Armature {
    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.iter().find(|b| b.id == id)
    }

    pub fn bone_mut(&mut self, id: BoneId) -> Option<&mut Bone> {
        self.bones.iter_mut().find(|b| b.id == id)
    }

    /// Look up a bone by display name
    pub fn find(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name.to_string() == name)
    }

    pub fn children(&self, id: BoneId) -> Vec<BoneId> {
        self.bones
            .iter()
            .filter(|b| b.parent == Some(id))
            .map(|b| b.id)
            .collect()
    }

    /// Whether `ancestor` appears on the parent chain of `bone`
    pub fn is_ancestor(&self, ancestor: BoneId, bone: BoneId) -> bool {
        let mut current = self.bone(bone).and_then(|b| b.parent);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.bones.len() {
                return false;
            }
            current = self.bone(id).and_then(|b| b.parent);
        }
        false
    }

    fn is_name_taken(&self, display: &str, except: Option<BoneId>) -> bool {
        self.bones
            .iter()
            .any(|b| Some(b.id) != except && b.name.to_string() == display)
    }

    /// `name` if free, otherwise the first free `name.001`, `name.002`, ...
    pub fn unique_name(&self, name: BoneName, except: Option<BoneId>) -> BoneName {
        let display = name.to_string();
        if !self.is_name_taken(&display, except) {
            return name;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{display}.{n:03}");
            if !self.is_name_taken(&candidate, except) {
                return BoneName::new(candidate);
            }
            n += 1;
        }
    }

    fn next_id(&self) -> BoneId {
        BoneId(self.bones.iter().map(|b| b.id.0 + 1).max().unwrap_or(0))
    }

    /// Append a bone, renaming it if the name is in use
    pub fn add_bone(
        &mut self,
        name: BoneName,
        head: Vec3,
        tail: Vec3,
        parent: Option<BoneId>,
    ) -> BoneId {
        let id = self.next_id();
        let name = self.unique_name(name, None);
        self.bones.push(Bone {
            id,
            name,
            head,
            tail,
            parent,
            connected: false,
            constraints: Vec::new(),
        });
        id
    }

    /// Remove a bone; its children are re-attached to its parent
    pub fn remove_bone(&mut self, id: BoneId) -> Option<Bone> {
        let index = self.bones.iter().position(|b| b.id == id)?;
        let removed = self.bones.remove(index);
        for bone in &mut self.bones {
            if bone.parent == Some(id) {
                bone.parent = removed.parent;
                bone.connected = false;
            }
        }
        Some(removed)
    }

    pub fn transform_bones(&mut self, matrix: Mat4) {
        for bone in &mut self.bones {
            bone.head = matrix.transform_point3(bone.head);
            bone.tail = matrix.transform_point3(bone.tail);
        }
    }

    /// Lengthen zero-length bones along `axis`, returning how many changed
    pub fn fix_zero_length(&mut self, axis: Axis) -> usize {
        let mut fixed = 0;
        for bone in &mut self.bones {
            if bone.is_zero_length() {
                bone.tail[axis.index()] += ZERO_LENGTH_OFFSET;
                fixed += 1;
            }
        }
        fixed
    }

    /// Point each single-child bone at its child.
    ///
    /// Only applies when the child's head lies ahead of the parent's head,
    /// so a bone never flips direction.
    pub fn recompute_connectivity(&mut self) {
        let updates: Vec<(BoneId, BoneId, Vec3)> = self
            .bones
            .iter()
            .filter_map(|bone| {
                let children = self.children(bone.id);
                let [child] = children.as_slice() else {
                    return None;
                };
                let child_head = self.bone(*child)?.head;
                let along = child_head - bone.head;
                let direction = bone.tail - bone.head;
                if along.length() <= 1e-4 || along.dot(direction) <= 0.0 {
                    return None;
                }
                Some((bone.id, *child, child_head))
            })
            .collect();

        for (parent, child, head) in updates {
            if let Some(bone) = self.bone_mut(parent) {
                bone.tail = head;
            }
            if let Some(bone) = self.bone_mut(child) {
                bone.connected = true;
            }
        }
    }
}
