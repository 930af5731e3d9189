//! End-to-end merge scenarios
//!
//! Each test builds a small scene, runs one entry operation and checks the
//! resulting skeleton, weights and reported errors.

mod rigs;

use armature_merge::{
    Anchor, GeometryHost, MergeError, MergeRequest, ROTATION_TOLERANCE, Scene, Strategy,
    Transform, WeightMixPolicy, attach_mesh_to_bone, can_attach_mesh, can_merge_armatures,
    merge_armatures,
};
use glam::Vec3;
use rigs::{assert_close, assert_no_pending, bone_names, parent_of};

fn sorted_groups(scene: &Scene, mesh: armature_merge::ObjectId) -> Vec<String> {
    let mut names = scene.vertex_group_names(mesh);
    names.sort();
    names
}

// ============================================================================
// Auto merge
// ============================================================================

#[test]
fn test_auto_merge_folds_canonical_bones() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    let outfit = rigs::chain(
        &mut scene,
        "Outfit",
        "Jacket",
        &["Hips", "Spine", "Chest"],
        Transform::IDENTITY,
    );

    let report = merge_armatures(&mut scene, &MergeRequest::new("Body", "Outfit"))
        .expect("Merge should succeed");

    assert_eq!(report.armature, "Body");
    assert_eq!(report.mesh, "Skin");
    assert_eq!(report.strategy, Strategy::Auto);
    assert_eq!(report.anchor, Anchor::Canonical("Hips".into()));
    assert_eq!(report.mixed, ["Hips", "Spine"]);
    assert_eq!(report.settled, ["Chest"]);
    assert_eq!(report.deleted_bones, 2);

    assert_eq!(bone_names(&scene, base.armature), ["Chest", "Head", "Hips", "Spine"]);
    assert_eq!(parent_of(&scene, base.armature, "Chest").as_deref(), Some("Spine"));
    assert_no_pending(&scene, base.armature);

    // Merge side is gone, its mesh joined into the base mesh
    assert!(scene.find("Outfit").is_none());
    assert!(scene.object(outfit.armature).is_none());
    assert!(scene.object(outfit.mesh).is_none());
    assert_eq!(scene.list_meshes(Some(base.armature)), vec![base.mesh]);

    let mesh = scene.mesh(base.mesh).unwrap();
    assert_eq!(mesh.vertices.len(), 6);
    assert_eq!(mesh.weight("Hips", 0), Some(1.0));
    assert_eq!(mesh.weight("Hips", 3), Some(1.0));
    assert_eq!(mesh.weight("Spine", 1), Some(1.0));
    assert_eq!(mesh.weight("Spine", 4), Some(1.0));
    assert_eq!(mesh.weight("Chest", 5), Some(1.0));
    assert_eq!(sorted_groups(&scene, base.mesh), ["Chest", "Head", "Hips", "Spine"]);

    assert!(scene.errors().is_empty());
}

#[test]
fn test_merge_bones_follow_mesh_placement() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    let outfit = rigs::chain(
        &mut scene,
        "Outfit",
        "Jacket",
        &["Hips", "Spine", "Chest"],
        Transform::IDENTITY,
    );
    let offset = Vec3::new(0.5, 0.0, 0.0);
    scene
        .set_transform(outfit.mesh, Transform::from_location(offset))
        .unwrap();
    let placed = scene.world_vertices(outfit.mesh);

    merge_armatures(&mut scene, &MergeRequest::new("Body", "Outfit")).expect("Merge should succeed");

    let chest = scene.armature(base.armature).unwrap().find("Chest").unwrap();
    assert_close(chest.head, rigs::head_of(2) + offset);

    let merged = scene.world_vertices(base.mesh);
    for (expected, actual) in placed.iter().zip(&merged[3..]) {
        assert_close(*expected, *actual);
    }
}

fn overlapping_spine_weight(policy: WeightMixPolicy) -> f32 {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    // Leftover group from an earlier merge overlapping Spine on vertex 1
    scene.assign_weights(base.mesh, "Spine", &[(1, 0.7)]).unwrap();
    scene.assign_weights(base.mesh, "Spine.merge", &[(1, 0.6)]).unwrap();
    rigs::chain(&mut scene, "Outfit", "Jacket", &["Hips", "Spine"], Transform::IDENTITY);

    let request = MergeRequest::new("Body", "Outfit").weight_policy(policy);
    merge_armatures(&mut scene, &request).expect("Merge should succeed");

    let mesh = scene.mesh(base.mesh).unwrap();
    assert_eq!(mesh.weight("Spine", 4), Some(1.0));
    assert!(mesh.group("Spine.merge").is_none());
    mesh.weight("Spine", 1).unwrap()
}

#[test]
fn test_weight_policy_clamps_by_default() {
    let weight = overlapping_spine_weight(WeightMixPolicy::default());
    assert_eq!(weight, 1.0);
}

#[test]
fn test_weight_policy_unclamped_sums() {
    let weight = overlapping_spine_weight(WeightMixPolicy::Unclamped);
    assert!((weight - 1.3).abs() < 1e-5, "got {weight}");
}

// ============================================================================
// Transform normalization
// ============================================================================

#[test]
fn test_rotation_within_tolerance_merges() {
    let mut scene = Scene::new();
    rigs::body(&mut scene);
    let outfit = rigs::chain(
        &mut scene,
        "Outfit",
        "Jacket",
        &["Hips", "Spine"],
        Transform::from_location(Vec3::new(1.0, 0.0, 0.0)),
    );
    scene
        .set_transform(
            outfit.mesh,
            Transform::new(Vec3::ZERO, Vec3::new(ROTATION_TOLERANCE, 0.0, 0.0), Vec3::ONE),
        )
        .unwrap();

    merge_armatures(&mut scene, &MergeRequest::new("Body", "Outfit")).expect("Merge should succeed");
    assert!(scene.errors().is_empty());
}

#[test]
fn test_rotated_mesh_on_moved_armature_is_rejected() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    let outfit = rigs::chain(
        &mut scene,
        "Outfit",
        "Jacket",
        &["Hips", "Spine"],
        Transform::from_location(Vec3::new(1.0, 0.0, 0.0)),
    );
    let tilt = 10f32.to_radians();
    scene
        .set_transform(
            outfit.mesh,
            Transform::new(Vec3::ZERO, Vec3::new(tilt, 0.0, 0.0), Vec3::ONE),
        )
        .unwrap();

    let err = merge_armatures(&mut scene, &MergeRequest::new("Body", "Outfit")).unwrap_err();
    assert_eq!(
        err,
        MergeError::RotationConflict {
            armature: "Outfit".into(),
            axis: 0
        }
    );

    // Armature reset, mesh selected for the user, nothing joined
    assert!(scene.transform(outfit.armature).unwrap().is_identity());
    assert_eq!(scene.active(), Some(outfit.mesh));
    assert_eq!(scene.transform(outfit.mesh).unwrap().rotation.x, tilt);
    assert!(scene.find("Outfit").is_some());
    assert_eq!(bone_names(&scene, base.armature), ["Head", "Hips", "Spine"]);

    assert_eq!(scene.errors().len(), 1);
    assert_eq!(scene.errors()[0].code, 7.5);
}

#[test]
fn test_slightly_rotated_moved_armature_is_rejected() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    let outfit = rigs::chain(
        &mut scene,
        "Outfit",
        "Jacket",
        &["Hips", "Spine"],
        Transform::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0001, 0.0, 0.0), Vec3::ONE),
    );

    let err = merge_armatures(&mut scene, &MergeRequest::new("Body", "Outfit")).unwrap_err();
    assert_eq!(
        err,
        MergeError::RotationConflict {
            armature: "Outfit".into(),
            axis: 0
        }
    );

    assert!(scene.transform(outfit.armature).unwrap().is_identity());
    assert_eq!(scene.active(), Some(outfit.mesh));
    assert!(scene.find("Outfit").is_some());
    assert_eq!(bone_names(&scene, outfit.armature), ["Hips", "Spine"]);
    assert_eq!(bone_names(&scene, base.armature), ["Head", "Hips", "Spine"]);
    assert_reported(&scene, 7.5);
}

#[test]
fn test_zero_length_bone_is_lengthened() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    let outfit = scene.add_armature("Outfit", Transform::IDENTITY);
    scene
        .add_bone(outfit, "Hips", rigs::head_of(0), rigs::head_of(1), None)
        .unwrap();
    scene
        .add_bone(outfit, "Spine", rigs::head_of(1), rigs::head_of(2), Some("Hips"))
        .unwrap();
    scene
        .add_bone(outfit, "Chest", rigs::head_of(2), rigs::head_of(2), Some("Spine"))
        .unwrap();
    let jacket = scene.add_mesh("Jacket", Some(outfit), vec![rigs::vertex_of(2)], Transform::IDENTITY);
    scene.assign_weights(jacket, "Chest", &[(0, 1.0)]).unwrap();

    merge_armatures(&mut scene, &MergeRequest::new("Body", "Outfit")).expect("Merge should succeed");

    let chest = scene.armature(base.armature).unwrap().find("Chest").unwrap();
    assert_close(chest.tail - chest.head, Vec3::new(0.0, 0.0, 0.1));
}

// ============================================================================
// Custom merge
// ============================================================================

#[test]
fn test_custom_merge_keeps_colliding_base_bone() {
    let mut scene = Scene::new();
    let base = rigs::chain(
        &mut scene,
        "Body",
        "Skin",
        &["Hips", "Spine", "Head", "Hat"],
        Transform::IDENTITY,
    );
    rigs::chain(&mut scene, "Cap", "CapMesh", &["Hat", "Brim"], Transform::IDENTITY);

    let request = MergeRequest::new("Body", "Cap").attach_bone("Hat");
    let report = merge_armatures(&mut scene, &request).expect("Merge should succeed");

    assert_eq!(report.strategy, Strategy::Custom);
    assert_eq!(
        report.anchor,
        Anchor::Synthesized {
            bone: "Hat".into(),
            displaced: Some("Hat_Old".into()),
        }
    );
    assert_eq!(
        bone_names(&scene, base.armature),
        ["Brim", "Hat", "Hat.merge", "Hat_Old", "Head", "Hips", "Spine"]
    );
    assert_eq!(parent_of(&scene, base.armature, "Hat.merge").as_deref(), Some("Hat"));
    assert_eq!(parent_of(&scene, base.armature, "Hat_Old").as_deref(), Some("Hat.merge"));
    assert_eq!(parent_of(&scene, base.armature, "Brim").as_deref(), Some("Hat_Old"));

    // The base Hat keeps exactly its own weights
    let mesh = scene.mesh(base.mesh).unwrap();
    assert_eq!(mesh.group("Hat").unwrap().weights.len(), 1);
    assert_eq!(mesh.weight("Hat", 3), Some(1.0));
    assert_eq!(mesh.weight("Hat_Old", 4), Some(1.0));
    assert_eq!(mesh.weight("Brim", 5), Some(1.0));
}

#[test]
fn test_custom_merge_anchors_at_first_base_bone() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    rigs::chain(&mut scene, "Cap", "CapMesh", &["Hat", "Brim"], Transform::IDENTITY);

    let report = merge_armatures(&mut scene, &MergeRequest::new("Body", "Cap"))
        .expect("Merge should succeed");

    assert_eq!(
        report.anchor,
        Anchor::Synthesized {
            bone: "Hips".into(),
            displaced: None,
        }
    );
    // The unweighted anchor survives cleanup
    assert_eq!(
        bone_names(&scene, base.armature),
        ["Brim", "Hat", "Head", "Hips", "Hips.merge", "Spine"]
    );
    assert_eq!(parent_of(&scene, base.armature, "Hips.merge").as_deref(), Some("Hips"));
    assert_eq!(parent_of(&scene, base.armature, "Hat").as_deref(), Some("Hips.merge"));
    assert_eq!(report.settled, ["Hat", "Brim"]);
}

// ============================================================================
// Mesh-only merge
// ============================================================================

#[test]
fn test_attach_mesh_to_bone() {
    let mut scene = Scene::new();
    let base = rigs::chain(
        &mut scene,
        "Body",
        "Skin",
        &["Hips", "Spine", "Chest"],
        Transform::IDENTITY,
    );
    let jacket = scene.add_mesh(
        "Jacket",
        None,
        vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
        Transform::from_location(Vec3::new(0.0, 0.5, 1.3)),
    );
    scene.assign_weights(jacket, "Stale", &[(0, 1.0)]).unwrap();
    let placed = scene.world_vertices(jacket);
    assert!(can_attach_mesh(&scene));

    let report = attach_mesh_to_bone(&mut scene, "Jacket", "Body", "Chest")
        .expect("Attach should succeed");

    assert_eq!(report.strategy, Strategy::MeshOnly);
    assert_eq!(report.attached_bone.as_deref(), Some("Jacket"));
    assert_eq!(parent_of(&scene, base.armature, "Jacket").as_deref(), Some("Chest"));
    assert_no_pending(&scene, base.armature);

    // Throwaway armature and the loose mesh are both gone
    assert!(scene.find("Armature").is_none());
    assert!(scene.find("Jacket").is_none());

    let mesh = scene.mesh(base.mesh).unwrap();
    assert!(mesh.group("Stale").is_none());
    assert!(mesh.group("Chest.merge").is_none());
    let weights: Vec<(u32, f32)> = mesh
        .group("Jacket")
        .unwrap()
        .weights
        .iter()
        .map(|(v, w)| (*v, *w))
        .collect();
    assert_eq!(weights, [(3, 1.0), (4, 1.0), (5, 1.0), (6, 1.0)]);

    let merged = scene.world_vertices(base.mesh);
    for (expected, actual) in placed.iter().zip(&merged[3..]) {
        assert_close(*expected, *actual);
    }
}

#[test]
fn test_mesh_only_without_name_settles_bone() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    rigs::chain(&mut scene, "Prop", "Sword", &["Chest"], Transform::IDENTITY);

    let request = MergeRequest::new("Body", "Prop").mesh_only(None);
    let report = merge_armatures(&mut scene, &request).expect("Merge should succeed");

    assert_eq!(report.attached_bone.as_deref(), Some("Chest"));
    assert_eq!(bone_names(&scene, base.armature), ["Chest", "Head", "Hips", "Spine"]);
    assert_eq!(scene.mesh(base.mesh).unwrap().weight("Chest", 3), Some(1.0));
}

#[test]
fn test_mesh_only_without_name_keeps_tag_when_stem_is_taken() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    rigs::chain(&mut scene, "Prop", "Sword", &["Head"], Transform::IDENTITY);

    let request = MergeRequest::new("Body", "Prop").mesh_only(None);
    let report = merge_armatures(&mut scene, &request).expect("Merge should succeed");

    assert_eq!(report.attached_bone.as_deref(), Some("Head.merge"));
    assert_eq!(
        bone_names(&scene, base.armature),
        ["Head", "Head.merge", "Hips", "Spine"]
    );
    assert_eq!(parent_of(&scene, base.armature, "Head.merge").as_deref(), Some("Head"));
    assert_eq!(scene.mesh(base.mesh).unwrap().weight("Head.merge", 3), Some(1.0));
}

#[test]
fn test_attach_into_armature_without_meshes() {
    let mut scene = Scene::new();
    let bare = scene.add_armature("Bare", Transform::IDENTITY);
    scene.add_bone(bare, "Hips", Vec3::ZERO, Vec3::Z, None).unwrap();
    scene.add_mesh("Jacket", None, vec![Vec3::ZERO], Transform::IDENTITY);

    let err = attach_mesh_to_bone(&mut scene, "Jacket", "Bare", "Hips").unwrap_err();
    assert_eq!(err, MergeError::EmptyArmature("Bare".into()));
    assert!(scene.find("Armature").is_none());
}

// ============================================================================
// Same-bone merge
// ============================================================================

#[test]
fn test_same_bones_merge_deletes_identity_parent() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    let extras = rigs::chain(
        &mut scene,
        "Extras",
        "TailMesh",
        &["Hips", "Spine", "Tail"],
        Transform::IDENTITY,
    );
    let root = scene.add_empty("Root", Transform::IDENTITY);
    scene.set_parent(extras.armature, Some(root)).unwrap();

    let request = MergeRequest::new("Body", "Extras").merge_same_bones(true);
    let report = merge_armatures(&mut scene, &request).expect("Merge should succeed");

    assert_eq!(report.strategy, Strategy::SameBones);
    assert_eq!(report.mixed, ["Hips", "Spine"]);
    assert_eq!(report.settled, ["Tail"]);
    assert_eq!(report.deleted_bones, 2);
    assert!(scene.find("Root").is_none());

    assert_eq!(bone_names(&scene, base.armature), ["Head", "Hips", "Spine", "Tail"]);
    assert_eq!(parent_of(&scene, base.armature, "Tail").as_deref(), Some("Spine"));
    assert_eq!(scene.mesh(base.mesh).unwrap().weight("Tail", 5), Some(1.0));
}

#[test]
fn test_same_bones_keeps_weights_of_unweighted_base_bone() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    scene.remove_vertex_group(base.mesh, "Spine").unwrap();
    rigs::chain(&mut scene, "Extras", "TailMesh", &["Hips", "Spine"], Transform::IDENTITY);

    let request = MergeRequest::new("Body", "Extras").merge_same_bones(true);
    let report = merge_armatures(&mut scene, &request).expect("Merge should succeed");

    assert_eq!(report.mixed, ["Hips"]);
    let mesh = scene.mesh(base.mesh).unwrap();
    assert_eq!(mesh.weight("Spine", 4), Some(1.0));
    assert!(mesh.group("Spine.merge").is_none());
    assert_eq!(bone_names(&scene, base.armature), ["Head", "Hips", "Spine"]);
}

// ============================================================================
// Weight reconciliation
// ============================================================================

#[test]
fn test_merge_bone_takes_over_unweighted_base_bone() {
    let mut scene = Scene::new();
    let base = rigs::chain(
        &mut scene,
        "Body",
        "Skin",
        &["Hips", "Spine", "Chest"],
        Transform::IDENTITY,
    );
    scene.remove_vertex_group(base.mesh, "Chest").unwrap();
    rigs::chain(
        &mut scene,
        "Outfit",
        "Jacket",
        &["Hips", "Spine", "Chest"],
        Transform::IDENTITY,
    );

    let report = merge_armatures(&mut scene, &MergeRequest::new("Body", "Outfit"))
        .expect("Merge should succeed");

    assert_eq!(report.swapped, ["Chest"]);
    assert_eq!(report.mixed, ["Hips", "Spine"]);
    assert_eq!(report.deleted_bones, 3);
    assert_eq!(bone_names(&scene, base.armature), ["Chest", "Hips", "Spine"]);
    assert_eq!(parent_of(&scene, base.armature, "Chest").as_deref(), Some("Spine"));
    assert_eq!(scene.mesh(base.mesh).unwrap().weight("Chest", 5), Some(1.0));
}

#[test]
fn test_merge_drops_constraints_and_dead_shape_keys() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    let outfit = rigs::chain(&mut scene, "Outfit", "Jacket", &["Hips", "Spine"], Transform::IDENTITY);
    scene.add_shape_key(outfit.mesh, "Basis", Vec::new()).unwrap();
    scene
        .add_shape_key(outfit.mesh, "Smile", vec![Vec3::new(0.01, 0.0, 0.0)])
        .unwrap();
    scene.add_shape_key(outfit.mesh, "Blink", Vec::new()).unwrap();
    scene.add_constraint(outfit.armature, "Hips", "Copy Rotation").unwrap();
    scene.add_constraint(base.armature, "Head", "Track To").unwrap();

    merge_armatures(&mut scene, &MergeRequest::new("Body", "Outfit")).expect("Merge should succeed");

    let keys: Vec<&str> = scene
        .mesh(base.mesh)
        .unwrap()
        .shape_keys
        .iter()
        .map(|k| k.name.as_str())
        .collect();
    assert_eq!(keys, ["Basis", "Smile"]);
    let armature = scene.armature(base.armature).unwrap();
    assert!(armature.bones.iter().all(|b| b.constraints.is_empty()));
}

// ============================================================================
// Preconditions
// ============================================================================

fn two_rigs() -> Scene {
    let mut scene = Scene::new();
    rigs::body(&mut scene);
    rigs::chain(&mut scene, "Outfit", "Jacket", &["Hips", "Spine"], Transform::IDENTITY);
    scene
}

fn assert_reported(scene: &Scene, code: f32) {
    assert_eq!(scene.errors().len(), 1, "expected exactly one report");
    assert_eq!(scene.errors()[0].code, code);
    assert!(!scene.errors()[0].messages.is_empty());
}

#[test]
fn test_parented_armature_needs_fixing() {
    let mut scene = two_rigs();
    let root = scene.add_empty("Root", Transform::IDENTITY);
    let outfit = scene.find_object("Outfit").unwrap();
    scene.set_parent(outfit, Some(root)).unwrap();

    let err = merge_armatures(&mut scene, &MergeRequest::new("Body", "Outfit")).unwrap_err();
    assert_eq!(err, MergeError::UnfixedModel("Outfit".into()));
    assert_reported(&scene, 6.2);
    assert!(scene.find("Root").is_some());
}

#[test]
fn test_moved_parent_is_rejected() {
    let mut scene = two_rigs();
    let root = scene.add_empty("Root", Transform::from_location(Vec3::Y));
    let outfit = scene.find_object("Outfit").unwrap();
    scene.set_parent(outfit, Some(root)).unwrap();

    let request = MergeRequest::new("Body", "Outfit").merge_same_bones(true);
    let err = merge_armatures(&mut scene, &request).unwrap_err();
    assert_eq!(err, MergeError::InvalidParentTransform("Outfit".into()));
    assert_reported(&scene, 6.5);
    assert!(scene.find("Root").is_some());
}

#[test]
fn test_moved_base_parent_keeps_merge_parent() {
    let mut scene = two_rigs();
    let root = scene.add_empty("Root", Transform::IDENTITY);
    let moved = scene.add_empty("Moved", Transform::from_location(Vec3::Y));
    let outfit = scene.find_object("Outfit").unwrap();
    let body = scene.find_object("Body").unwrap();
    scene.set_parent(outfit, Some(root)).unwrap();
    scene.set_parent(body, Some(moved)).unwrap();

    let request = MergeRequest::new("Body", "Outfit").merge_same_bones(true);
    let err = merge_armatures(&mut scene, &request).unwrap_err();
    assert_eq!(err, MergeError::InvalidParentTransform("Body".into()));
    assert_reported(&scene, 6.5);

    // Nothing deleted before the failing check
    assert!(scene.find("Root").is_some());
    assert_eq!(scene.object(outfit).unwrap().parent, Some(root));
}

#[test]
fn test_attach_to_parented_base_leaves_mesh_alone() {
    let mut scene = Scene::new();
    let base = rigs::body(&mut scene);
    let root = scene.add_empty("Root", Transform::IDENTITY);
    scene.set_parent(base.armature, Some(root)).unwrap();
    let jacket = scene.add_mesh("Jacket", None, vec![Vec3::ZERO, Vec3::X], Transform::IDENTITY);
    scene.assign_weights(jacket, "Keep", &[(0, 1.0)]).unwrap();

    let err = attach_mesh_to_bone(&mut scene, "Jacket", "Body", "Chest").unwrap_err();
    assert_eq!(err, MergeError::UnfixedModel("Body".into()));
    assert_reported(&scene, 6.2);

    assert!(scene.find("Armature").is_none());
    let mesh = scene.mesh(jacket).unwrap();
    assert!(mesh.group("Keep").is_some());
    assert!(mesh.group("Chest").is_none());
    assert_eq!(scene.object(jacket).unwrap().parent, None);
}

#[test]
fn test_missing_armature() {
    let mut scene = two_rigs();
    let err = merge_armatures(&mut scene, &MergeRequest::new("Body", "Nope")).unwrap_err();
    assert_eq!(err, MergeError::MissingObject("Nope".into()));
    assert_reported(&scene, 5.2);

    // A mesh name is not an armature
    let err = merge_armatures(&mut scene, &MergeRequest::new("Body", "Jacket")).unwrap_err();
    assert_eq!(err, MergeError::MissingObject("Jacket".into()));
}

#[test]
fn test_same_armature_twice() {
    let mut scene = two_rigs();
    let err = merge_armatures(&mut scene, &MergeRequest::new("Body", "Body")).unwrap_err();
    assert_eq!(err, MergeError::SameArmature("Body".into()));
    assert_reported(&scene, 5.2);
}

#[test]
fn test_armature_without_meshes() {
    let mut scene = two_rigs();
    let bare = scene.add_armature("Bare", Transform::IDENTITY);
    scene.add_bone(bare, "Hips", Vec3::ZERO, Vec3::Z, None).unwrap();

    let err = merge_armatures(&mut scene, &MergeRequest::new("Body", "Bare")).unwrap_err();
    assert_eq!(err, MergeError::EmptyArmature("Bare".into()));
    assert_reported(&scene, 5.2);
}

#[test]
fn test_attach_missing_mesh() {
    let mut scene = two_rigs();
    let err = attach_mesh_to_bone(&mut scene, "Nope", "Body", "Chest").unwrap_err();
    assert_eq!(err, MergeError::MissingObject("Nope".into()));
    assert_reported(&scene, 5.2);
}

#[test]
fn test_availability_checks() {
    let mut scene = Scene::new();
    assert!(!can_merge_armatures(&scene));
    assert!(!can_attach_mesh(&scene));

    rigs::body(&mut scene);
    assert!(!can_merge_armatures(&scene));
    assert!(can_attach_mesh(&scene));

    rigs::chain(&mut scene, "Outfit", "Jacket", &["Hips"], Transform::IDENTITY);
    assert!(can_merge_armatures(&scene));
}
