//! Error types
//!
//! [`HostError`] is raised by host primitives; [`MergeError`] is what the entry
//! operations return. Every merge error carries the numeric code and message
//! lines handed to [`GeometryHost::report_error`](crate::GeometryHost::report_error).

use crate::host::ObjectId;

/// Failure of a single host primitive
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    /// Object id not present in the scene
    #[error("object {0:?} does not exist")]
    UnknownObject(ObjectId),

    #[error("object '{0}' is not an armature")]
    NotAnArmature(String),

    #[error("object '{0}' is not a mesh")]
    NotAMesh(String),

    /// Bone missing from an armature
    #[error("bone '{bone}' does not exist in armature '{armature}'")]
    UnknownBone { armature: String, bone: String },

    #[error("vertex group '{group}' does not exist on mesh '{mesh}'")]
    UnknownVertexGroup { mesh: String, group: String },

    #[error("vertex {vertex} is out of range for mesh '{mesh}'")]
    VertexOutOfRange { mesh: String, vertex: u32 },

    /// Structural bone edit attempted outside edit mode
    #[error("armature '{0}' must be in edit mode for this operation")]
    NotInEditMode(String),

    #[error("parenting '{child}' under '{parent}' would create a cycle")]
    BoneCycle { child: String, parent: String },

    #[error("armature '{0}' has no meshes")]
    NoMeshes(String),

    /// Join across different object kinds, or with nothing to join
    #[error("cannot join into '{0}'")]
    InvalidJoin(String),

    #[error("object name '{0}' is already taken")]
    NameTaken(String),
}

/// Structured merge failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
    /// Named armature or mesh is missing or has the wrong kind
    #[error("object '{0}' could not be found")]
    MissingObject(String),

    #[error("armature '{0}' cannot be merged into itself")]
    SameArmature(String),

    #[error("armature '{0}' does not have any meshes")]
    EmptyArmature(String),

    /// Armature parent carries a non-identity transform
    #[error("the parent of armature '{0}' is not at identity")]
    InvalidParentTransform(String),

    /// Armature is parented and same-bone merging is off
    #[error("armature '{0}' has to be fixed before merging")]
    UnfixedModel(String),

    /// Merge side rotated in a way the normalizer cannot compensate
    #[error("merge armature '{armature}' is rotated on axis {axis}")]
    RotationConflict { armature: String, axis: usize },

    /// A bone expected by a later step disappeared
    #[error("bone '{0}' went missing during the merge")]
    InternalInconsistency(String),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl MergeError {
    /// Numeric code surfaced alongside the messages
    pub fn code(&self) -> f32 {
        match self {
            MergeError::MissingObject(_)
            | MergeError::SameArmature(_)
            | MergeError::EmptyArmature(_) => 5.2,
            MergeError::UnfixedModel(_) => 6.2,
            MergeError::InvalidParentTransform(_) => 6.5,
            MergeError::RotationConflict { .. } => 7.5,
            MergeError::InternalInconsistency(_) | MergeError::Host(_) => 5.8,
        }
    }

    /// Human-readable lines explaining what to do next
    pub fn messages(&self) -> Vec<String> {
        match self {
            MergeError::MissingObject(name) => {
                vec![format!("The object \"{name}\" could not be found.")]
            }
            MergeError::SameArmature(name) => vec![
                format!("The armature \"{name}\" was selected as both base and merge armature."),
                "Select two different armatures.".to_string(),
            ],
            MergeError::EmptyArmature(name) => {
                vec![format!("The armature \"{name}\" does not have any meshes.")]
            }
            MergeError::InvalidParentTransform(name) => vec![
                format!("The parent of the armature \"{name}\" needs these transforms:"),
                " - Location at 0".to_string(),
                " - Rotation at 0".to_string(),
                " - Scale at 1".to_string(),
            ],
            MergeError::UnfixedModel(name) => vec![
                format!("The armature \"{name}\" is parented to another object."),
                "Fix the model first so the armature sits at the top level.".to_string(),
                "After that only move the mesh (not the armature) to the desired position."
                    .to_string(),
            ],
            MergeError::RotationConflict { .. } => vec![
                "To rotate the new part, only modify its mesh, not its armature.".to_string(),
                String::new(),
                "The merge armature transforms were reset and its mesh got selected.".to_string(),
                "Place the selected mesh where it belongs and merge again.".to_string(),
                "Undo this operation to keep the previous state.".to_string(),
            ],
            MergeError::InternalInconsistency(bone) => vec![
                format!("Something went wrong: the bone \"{bone}\" disappeared."),
                "Undo, check the selections and try again.".to_string(),
            ],
            MergeError::Host(err) => vec![
                format!("The scene rejected an edit: {err}."),
                "Undo, check the selections and try again.".to_string(),
            ],
        }
    }
}
