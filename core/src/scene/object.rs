//! Scene objects

use serde::{Deserialize, Serialize};

use super::{Armature, Mesh};
use crate::host::{ObjectId, ObjectKind};
use crate::transform::Transform;

/// Payload of a scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectData {
    Armature(Armature),
    Mesh(Mesh),
    Empty,
}

impl ObjectData {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectData::Armature(_) => ObjectKind::Armature,
            ObjectData::Mesh(_) => ObjectKind::Mesh,
            ObjectData::Empty => ObjectKind::Empty,
        }
    }
}

/// Named, placed object in the scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectId>,
    pub data: ObjectData,
}

impl SceneObject {
    pub fn kind(&self) -> ObjectKind {
        self.data.kind()
    }

    pub fn armature(&self) -> Option<&Armature> {
        match &self.data {
            ObjectData::Armature(armature) => Some(armature),
            _ => None,
        }
    }

    pub fn armature_mut(&mut self) -> Option<&mut Armature> {
        match &mut self.data {
            ObjectData::Armature(armature) => Some(armature),
            _ => None,
        }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// Error surfaced through `report_error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: f32,
    pub messages: Vec<String>,
}
