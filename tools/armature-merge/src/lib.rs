//! armature-merge library
//!
//! Job manifests and scene summaries used by the `armature-merge` binary.

pub mod inspect;
pub mod job;

pub use inspect::SceneSummary;
pub use job::{JobOutcome, MergeJob};
