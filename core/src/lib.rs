//! Armature merge core
//!
//! Merges a rigged "merge" armature (clothing, accessories, extra parts) and its
//! skinned meshes into a "base" armature, keeping the visual placement of the
//! merged mesh and folding duplicate bone influences into single bones.
//!
//! # Architecture
//!
//! - [`GeometryHost`] - Capability trait over the host's object graph
//! - [`Scene`] - In-memory host used by tests and the command line tool
//! - [`merge_armatures`] / [`attach_mesh_to_bone`] - Entry operations
//!
//! The merge itself runs as a fixed pipeline over a transient session:
//! transform normalization, bone namespace resolution, skeleton and mesh
//! join, weight reconciliation and a final cleanup pass.

pub mod bones;
pub mod error;
pub mod host;
mod merge;
pub mod naming;
pub mod ops;
pub mod scene;
pub mod transform;

pub use error::{HostError, MergeError};
pub use host::{ApplyMask, BoneId, GeometryHost, Mode, ObjectId, ObjectKind, WeightMixPolicy};
pub use merge::{Anchor, MergeReport, Strategy};
pub use naming::{BoneFilter, BoneName, Provenance};
pub use ops::{MergeRequest, attach_mesh_to_bone, can_attach_mesh, can_merge_armatures, merge_armatures};
pub use scene::{Scene, SceneFileError};
pub use transform::{Axis, ROTATION_TOLERANCE, Transform};
