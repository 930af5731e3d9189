//! In-memory scene graph
//!
//! [`Scene`] is a self-contained [`GeometryHost`](crate::GeometryHost): a flat
//! list of objects with parent links, armature and mesh payloads, plus the
//! transient selection and mode state a host would keep. Scenes load from and
//! save to JSON documents.
//!
//! ```text
//! Scene
//! ├─ Armature "Body"        bones: Hips, Spine, Head
//! │  └─ Mesh "Body"         groups: Hips, Spine, Head
//! └─ Armature "Outfit"
//!    └─ Mesh "Jacket"
//! ```

mod armature;
mod host;
mod mesh;
mod object;

pub use armature::{Armature, Bone, ZERO_LENGTH_OFFSET};
pub use mesh::{Mesh, ShapeKey, VertexGroup, ZERO_WEIGHT_EPSILON};
pub use object::{ErrorReport, ObjectData, SceneObject};

use glam::{Mat4, Vec3};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::HostError;
use crate::host::{BoneId, Mode, ObjectId};
use crate::naming::BoneName;
use crate::transform::Transform;

/// Failure loading or saving a scene document
#[derive(Debug, thiserror::Error)]
pub enum SceneFileError {
    #[error("Failed to read or write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scene document: {0}")]
    Json(#[from] serde_json::Error),

    /// Two objects share an id or a name
    #[error("Duplicate object '{0}' in scene document")]
    Duplicate(String),
}

/// In-memory host scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    objects: Vec<SceneObject>,
    #[serde(skip)]
    active: Option<ObjectId>,
    #[serde(skip)]
    selected: Vec<ObjectId>,
    #[serde(skip)]
    modes: HashMap<ObjectId, Mode>,
    #[serde(skip)]
    errors: Vec<ErrorReport>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // Building

    pub fn add_armature(&mut self, name: &str, transform: Transform) -> ObjectId {
        self.push_object(name, transform, None, ObjectData::Armature(Armature::default()))
    }

    /// Add a bone under the bone named `parent`
    pub fn add_bone(
        &mut self,
        armature: ObjectId,
        name: &str,
        head: Vec3,
        tail: Vec3,
        parent: Option<&str>,
    ) -> Result<BoneId, HostError> {
        let object_name = self.name_of(armature)?;
        let data = self.armature_mut(armature)?;
        let parent = match parent {
            Some(parent) => Some(
                data.find(parent)
                    .ok_or_else(|| HostError::UnknownBone {
                        armature: object_name,
                        bone: parent.to_string(),
                    })?
                    .id,
            ),
            None => None,
        };
        Ok(data.add_bone(BoneName::parse(name), head, tail, parent))
    }

    /// Add a mesh, optionally parented to and deformed by `armature`
    pub fn add_mesh(
        &mut self,
        name: &str,
        armature: Option<ObjectId>,
        vertices: Vec<Vec3>,
        transform: Transform,
    ) -> ObjectId {
        let mut mesh = Mesh::new(vertices);
        mesh.armature = armature;
        self.push_object(name, transform, armature, ObjectData::Mesh(mesh))
    }

    pub fn add_empty(&mut self, name: &str, transform: Transform) -> ObjectId {
        self.push_object(name, transform, None, ObjectData::Empty)
    }

    /// Parent `child` to `parent` without touching its local transform
    pub fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> Result<(), HostError> {
        if let Some(parent) = parent {
            self.object(parent).ok_or(HostError::UnknownObject(parent))?;
        }
        self.object_mut(child)?.parent = parent;
        Ok(())
    }

    /// Set weights of `group` on a mesh, creating the group when missing
    pub fn assign_weights(
        &mut self,
        mesh: ObjectId,
        group: &str,
        weights: &[(u32, f32)],
    ) -> Result<(), HostError> {
        let object_name = self.name_of(mesh)?;
        let data = self.mesh_mut(mesh)?;
        let count = data.vertices.len() as u32;
        if let Some((vertex, _)) = weights.iter().find(|(v, _)| *v >= count) {
            return Err(HostError::VertexOutOfRange {
                mesh: object_name,
                vertex: *vertex,
            });
        }
        data.ensure_group(group).weights.extend(weights.iter().copied());
        Ok(())
    }

    pub fn add_shape_key(
        &mut self,
        mesh: ObjectId,
        name: &str,
        mut offsets: Vec<Vec3>,
    ) -> Result<(), HostError> {
        let data = self.mesh_mut(mesh)?;
        offsets.resize(data.vertices.len(), Vec3::ZERO);
        data.shape_keys.push(ShapeKey {
            name: name.to_string(),
            offsets,
        });
        Ok(())
    }

    pub fn add_constraint(
        &mut self,
        armature: ObjectId,
        bone: &str,
        constraint: &str,
    ) -> Result<(), HostError> {
        let object_name = self.name_of(armature)?;
        let data = self.armature_mut(armature)?;
        let bone = data
            .bones
            .iter_mut()
            .find(|b| b.name.to_string() == bone)
            .ok_or_else(|| HostError::UnknownBone {
                armature: object_name,
                bone: bone.to_string(),
            })?;
        bone.constraints.push(constraint.to_string());
        Ok(())
    }

    fn push_object(
        &mut self,
        name: &str,
        transform: Transform,
        parent: Option<ObjectId>,
        data: ObjectData,
    ) -> ObjectId {
        let id = ObjectId(self.objects.iter().map(|o| o.id.0 + 1).max().unwrap_or(0));
        let name = self.unique_object_name(name);
        self.objects.push(SceneObject {
            id,
            name,
            transform,
            parent,
            data,
        });
        id
    }

    pub(crate) fn unique_object_name(&self, name: &str) -> String {
        if self.find(name).is_none() {
            return name.to_string();
        }
        (1..)
            .map(|n| format!("{name}.{n:03}"))
            .find(|candidate| self.find(candidate).is_none())
            .unwrap_or_else(|| name.to_string())
    }

    // Lookups

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Result<&mut SceneObject, HostError> {
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(HostError::UnknownObject(id))
    }

    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn armature(&self, id: ObjectId) -> Option<&Armature> {
        self.object(id)?.armature()
    }

    pub fn mesh(&self, id: ObjectId) -> Option<&Mesh> {
        self.object(id)?.mesh()
    }

    /// Armature data of the object named `name`
    pub fn armature_named(&self, name: &str) -> Option<&Armature> {
        self.find(name)?.armature()
    }

    pub fn mesh_named(&self, name: &str) -> Option<&Mesh> {
        self.find(name)?.mesh()
    }

    pub(crate) fn name_of(&self, id: ObjectId) -> Result<String, HostError> {
        self.object(id)
            .map(|o| o.name.clone())
            .ok_or(HostError::UnknownObject(id))
    }

    pub(crate) fn armature_mut(&mut self, id: ObjectId) -> Result<&mut Armature, HostError> {
        let object = self.object_mut(id)?;
        let name = object.name.clone();
        object.armature_mut().ok_or(HostError::NotAnArmature(name))
    }

    pub(crate) fn mesh_mut(&mut self, id: ObjectId) -> Result<&mut Mesh, HostError> {
        let object = self.object_mut(id)?;
        let name = object.name.clone();
        object.mesh_mut().ok_or(HostError::NotAMesh(name))
    }

    /// Meshes parented to or deformed by `armature`
    pub(crate) fn bound_meshes(&self, armature: ObjectId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| match o.mesh() {
                Some(mesh) => o.parent == Some(armature) || mesh.armature == Some(armature),
                None => false,
            })
            .map(|o| o.id)
            .collect()
    }

    /// Parent chain product of local matrices
    pub fn world_matrix(&self, id: ObjectId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.object(id);
        let mut depth = 0;
        while let Some(object) = current {
            matrix = object.transform.to_matrix() * matrix;
            depth += 1;
            if depth > self.objects.len() {
                break;
            }
            current = object.parent.and_then(|p| self.object(p));
        }
        matrix
    }

    /// Vertex positions of a mesh in world space
    pub fn world_vertices(&self, id: ObjectId) -> Vec<Vec3> {
        let matrix = self.world_matrix(id);
        self.mesh(id)
            .map(|mesh| mesh.vertices.iter().map(|v| matrix.transform_point3(*v)).collect())
            .unwrap_or_default()
    }

    // Host-side state

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    pub fn selected(&self) -> &[ObjectId] {
        &self.selected
    }

    pub fn mode(&self, id: ObjectId) -> Mode {
        self.modes.get(&id).copied().unwrap_or_default()
    }

    /// Errors reported through `report_error`, oldest first
    pub fn errors(&self) -> &[ErrorReport] {
        &self.errors
    }

    // Documents

    pub fn from_json(json: &str) -> Result<Self, SceneFileError> {
        let scene: Scene = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_json(&self) -> Result<String, SceneFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, SceneFileError> {
        let json = std::fs::read_to_string(path).map_err(|source| SceneFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), SceneFileError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| SceneFileError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self) -> Result<(), SceneFileError> {
        for (index, object) in self.objects.iter().enumerate() {
            let duplicate = self.objects[..index]
                .iter()
                .any(|o| o.id == object.id || o.name == object.name);
            if duplicate {
                return Err(SceneFileError::Duplicate(object.name.clone()));
            }
        }
        Ok(())
    }
}
