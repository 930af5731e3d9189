//! Human-readable scene summaries

use armature_merge::scene::{Armature, ObjectData};
use armature_merge::{BoneId, Scene};
use std::fmt;

/// Displays armatures as bone trees and meshes with their vertex groups
pub struct SceneSummary<'a>(pub &'a Scene);

impl fmt::Display for SceneSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scene = self.0;
        for object in scene.objects() {
            let parent = object
                .parent
                .and_then(|id| scene.object(id))
                .map(|p| format!(" (parent: {})", p.name))
                .unwrap_or_default();

            match &object.data {
                ObjectData::Armature(armature) => {
                    writeln!(
                        f,
                        "Armature \"{}\"{parent}: {} bones",
                        object.name,
                        armature.bones.len()
                    )?;
                    for root in armature.bones.iter().filter(|b| b.parent.is_none()) {
                        write_bone(f, armature, root.id, 1)?;
                    }
                }
                ObjectData::Mesh(mesh) => {
                    writeln!(
                        f,
                        "Mesh \"{}\"{parent}: {} vertices, {} shape keys",
                        object.name,
                        mesh.vertices.len(),
                        mesh.shape_keys.len()
                    )?;
                    if !mesh.groups.is_empty() {
                        let groups: Vec<&str> = mesh.groups.iter().map(|g| g.name.as_str()).collect();
                        writeln!(f, "  groups: {}", groups.join(", "))?;
                    }
                }
                ObjectData::Empty => writeln!(f, "Empty \"{}\"{parent}", object.name)?,
            }
        }
        Ok(())
    }
}

fn write_bone(
    f: &mut fmt::Formatter<'_>,
    armature: &Armature,
    bone: BoneId,
    depth: usize,
) -> fmt::Result {
    let Some(data) = armature.bone(bone) else {
        return Ok(());
    };
    writeln!(f, "{}{}", "  ".repeat(depth), data.name)?;
    for child in armature.children(bone) {
        write_bone(f, armature, child, depth + 1)?;
    }
    Ok(())
}
