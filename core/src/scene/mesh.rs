//! Mesh data: vertices, vertex groups and shape keys

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::host::{ObjectId, WeightMixPolicy};

/// Weights at or below this are noise and get purged
pub const ZERO_WEIGHT_EPSILON: f32 = 1e-6;

/// Shape key offsets shorter than this count as unchanged
const SHAPE_KEY_EPSILON: f32 = 1e-5;

/// Named vertex -> weight mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexGroup {
    pub name: String,
    #[serde(default)]
    pub weights: BTreeMap<u32, f32>,
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    /// Whether any vertex carries a positive weight
    pub fn has_influence(&self) -> bool {
        self.weights.values().any(|w| *w > 0.0)
    }
}

/// Per-vertex offsets relative to the undeformed mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeKey {
    pub name: String,
    pub offsets: Vec<Vec3>,
}

/// Mesh object data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default)]
    pub vertices: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<VertexGroup>,
    /// First key is the basis
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shape_keys: Vec<ShapeKey>,
    /// Armature modifier target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armature: Option<ObjectId>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            vertices,
            ..Self::default()
        }
    }

    pub fn group(&self, name: &str) -> Option<&VertexGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut VertexGroup> {
        self.groups.iter_mut().find(|g| g.name == name)
    }

    pub fn ensure_group(&mut self, name: &str) -> &mut VertexGroup {
        let index = match self.groups.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(VertexGroup::new(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    pub fn weight(&self, group: &str, vertex: u32) -> Option<f32> {
        self.group(group)?.weights.get(&vertex).copied()
    }

    /// Add `source` into `dest` (created if missing) and drop `source`.
    ///
    /// Returns false when `source` does not exist.
    pub fn mix(&mut self, source: &str, dest: &str, policy: WeightMixPolicy) -> bool {
        if source == dest {
            return self.group(source).is_some();
        }
        let Some(index) = self.groups.iter().position(|g| g.name == source) else {
            return false;
        };
        let incoming = self.groups.remove(index);
        let target = self.ensure_group(dest);
        for (vertex, weight) in incoming.weights {
            let mixed = match target.weights.get(&vertex) {
                Some(existing) => policy.combine(*existing, weight),
                None => policy.combine(0.0, weight),
            };
            target.weights.insert(vertex, mixed);
        }
        true
    }

    /// Rename a group; when `to` already exists the two are mixed
    pub fn rename_group(&mut self, from: &str, to: &str, policy: WeightMixPolicy) -> bool {
        if self.group(to).is_some() {
            return self.mix(from, to, policy);
        }
        match self.group_mut(from) {
            Some(group) => {
                group.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Drop memberships at or below [`ZERO_WEIGHT_EPSILON`]
    pub fn purge_zero_weights(&mut self) -> usize {
        let mut purged = 0;
        for group in &mut self.groups {
            let before = group.weights.len();
            group.weights.retain(|_, w| *w > ZERO_WEIGHT_EPSILON);
            purged += before - group.weights.len();
        }
        purged
    }

    /// Remove groups without influence, sparing the names in `spare`
    pub fn remove_unused_groups(&mut self, spare: &[&str]) -> usize {
        let before = self.groups.len();
        self.groups
            .retain(|g| g.has_influence() || spare.contains(&g.name.as_str()));
        before - self.groups.len()
    }

    /// Remove shape keys identical to the basis, and the basis once alone
    pub fn clean_shape_keys(&mut self) -> usize {
        let before = self.shape_keys.len();
        let mut keys = std::mem::take(&mut self.shape_keys);
        if !keys.is_empty() {
            let basis = keys.remove(0);
            keys.retain(|k| k.offsets.iter().any(|o| o.length() > SHAPE_KEY_EPSILON));
            if !keys.is_empty() {
                keys.insert(0, basis);
            }
        }
        self.shape_keys = keys;
        before - self.shape_keys.len()
    }

    pub fn transform(&mut self, matrix: Mat4) {
        for vertex in &mut self.vertices {
            *vertex = matrix.transform_point3(*vertex);
        }
        for key in &mut self.shape_keys {
            for offset in &mut key.offsets {
                *offset = matrix.transform_vector3(*offset);
            }
        }
    }

    /// Append another mesh, mapped into this mesh's space by `matrix`
    pub fn append(&mut self, other: &Mesh, matrix: Mat4) {
        let offset = self.vertices.len();
        let total = offset + other.vertices.len();
        self.vertices
            .extend(other.vertices.iter().map(|v| matrix.transform_point3(*v)));

        for group in &other.groups {
            let target = self.ensure_group(&group.name);
            for (vertex, weight) in &group.weights {
                target.weights.insert(vertex + offset as u32, *weight);
            }
        }

        for key in &mut self.shape_keys {
            key.offsets.resize(total, Vec3::ZERO);
        }
        for key in &other.shape_keys {
            let mapped = key.offsets.iter().map(|o| matrix.transform_vector3(*o));
            match self.shape_keys.iter_mut().find(|k| k.name == key.name) {
                Some(existing) => {
                    for (slot, value) in existing.offsets[offset..].iter_mut().zip(mapped) {
                        *slot = value;
                    }
                }
                None => {
                    let mut offsets = vec![Vec3::ZERO; offset];
                    offsets.extend(mapped);
                    offsets.resize(total, Vec3::ZERO);
                    self.shape_keys.push(ShapeKey {
                        name: key.name.clone(),
                        offsets,
                    });
                }
            }
        }
    }
}
