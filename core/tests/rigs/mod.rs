//! Scene fixtures for merge tests
//!
//! Every rig is a straight bone chain along +Z starting at height 1.0, with
//! one vertex per bone sitting halfway up it and fully weighted to it.

#![allow(dead_code)]

use armature_merge::{GeometryHost, ObjectId, Scene, Transform};
use glam::Vec3;

pub const BONE_LENGTH: f32 = 0.2;

pub struct Rig {
    pub armature: ObjectId,
    pub mesh: ObjectId,
}

pub fn head_of(index: usize) -> Vec3 {
    Vec3::new(0.0, 0.0, 1.0 + BONE_LENGTH * index as f32)
}

pub fn vertex_of(index: usize) -> Vec3 {
    head_of(index) + Vec3::new(0.0, 0.0, BONE_LENGTH * 0.5)
}

/// Armature `name` holding `bones` as a chain, skinned mesh `mesh`
pub fn chain(scene: &mut Scene, name: &str, mesh: &str, bones: &[&str], transform: Transform) -> Rig {
    let armature = scene.add_armature(name, transform);
    let mut parent: Option<&str> = None;
    for (i, bone) in bones.iter().enumerate() {
        scene
            .add_bone(armature, bone, head_of(i), head_of(i + 1), parent)
            .expect("Failed to add bone");
        parent = Some(*bone);
    }

    let vertices = (0..bones.len()).map(vertex_of).collect();
    let mesh = scene.add_mesh(mesh, Some(armature), vertices, Transform::IDENTITY);
    for (i, bone) in bones.iter().enumerate() {
        scene
            .assign_weights(mesh, bone, &[(i as u32, 1.0)])
            .expect("Failed to assign weights");
    }
    Rig { armature, mesh }
}

/// Base body used by most scenarios
pub fn body(scene: &mut Scene) -> Rig {
    chain(scene, "Body", "Skin", &["Hips", "Spine", "Head"], Transform::IDENTITY)
}

/// Display name of every bone in the armature, sorted
pub fn bone_names(scene: &Scene, armature: ObjectId) -> Vec<String> {
    let mut names: Vec<String> = scene
        .bones(armature)
        .into_iter()
        .filter_map(|bone| scene.bone_name(armature, bone))
        .map(|name| name.to_string())
        .collect();
    names.sort();
    names
}

/// Name of the parent of bone `name`
pub fn parent_of(scene: &Scene, armature: ObjectId, name: &str) -> Option<String> {
    let bone = scene.find_bone(armature, name)?;
    let parent = scene.bone_parent(armature, bone)?;
    scene.bone_name(armature, parent).map(|n| n.to_string())
}

pub fn assert_no_pending(scene: &Scene, armature: ObjectId) {
    for name in bone_names(scene, armature) {
        assert!(!name.ends_with(".merge"), "bone '{name}' still pending");
    }
}

pub fn assert_close(a: Vec3, b: Vec3) {
    assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
}
