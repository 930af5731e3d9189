//! Standard humanoid bone names
//!
//! Names here match the bone naming produced by common model-fixing tools.
//! [`MAIN_BONES`] drives anchor detection and bone correspondence; every name
//! in [`PROTECTED_BONES`] survives zero-weight cleanup.

/// Substring marking eye bones, which never act as structural anchors
pub const EYE_MARKER: &str = "Eye";

/// Canonical main bones, in detection order
pub const MAIN_BONES: &[&str] = &[
    "Hips",
    "Spine",
    "Chest",
    "Upper Chest",
    "Neck",
    "Head",
    "Left shoulder",
    "Left arm",
    "Left elbow",
    "Left wrist",
    "Right shoulder",
    "Right arm",
    "Right elbow",
    "Right wrist",
    "Left leg",
    "Left knee",
    "Left ankle",
    "Left toe",
    "Right leg",
    "Right knee",
    "Right ankle",
    "Right toe",
    "Eye_L",
    "Eye_R",
];

/// Bones kept even when nothing is weighted to them
pub const PROTECTED_BONES: &[&str] = &[
    "Hips",
    "Spine",
    "Chest",
    "Upper Chest",
    "Neck",
    "Head",
    "Left shoulder",
    "Left arm",
    "Left elbow",
    "Left wrist",
    "Right shoulder",
    "Right arm",
    "Right elbow",
    "Right wrist",
    "Left leg",
    "Left knee",
    "Left ankle",
    "Left toe",
    "Right leg",
    "Right knee",
    "Right ankle",
    "Right toe",
    "Eye_L",
    "Eye_R",
    "LeftEye",
    "RightEye",
    "Root",
];

/// Whether a canonical name may anchor an automatic merge
pub fn is_anchor_candidate(name: &str) -> bool {
    !name.contains(EYE_MARKER)
}
