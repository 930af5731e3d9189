//! [`GeometryHost`] implementation for the in-memory [`Scene`]

use glam::{Mat4, Vec3};
use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

use super::{Armature, Bone, ErrorReport, ObjectData, Scene};
use crate::error::HostError;
use crate::host::{
    ApplyMask, BoneId, GeometryHost, Mode, ObjectId, ObjectKind, WeightMixPolicy,
};
use crate::naming::{BoneFilter, BoneName};
use crate::transform::{Axis, Transform};

impl Scene {
    fn require_edit_mode(&self, armature: ObjectId) -> Result<(), HostError> {
        if self.mode(armature) == Mode::Edit {
            Ok(())
        } else {
            Err(HostError::NotInEditMode(self.name_of(armature)?))
        }
    }

    fn armature_ref(&self, id: ObjectId) -> Result<&Armature, HostError> {
        let object = self.object(id).ok_or(HostError::UnknownObject(id))?;
        object
            .armature()
            .ok_or_else(|| HostError::NotAnArmature(object.name.clone()))
    }

    fn unknown_bone(&self, armature: ObjectId, bone: BoneId) -> HostError {
        HostError::UnknownBone {
            armature: self.name_of(armature).unwrap_or_default(),
            bone: format!("#{}", bone.0),
        }
    }

    /// Re-express the children of `from` under `to` without moving them
    fn adopt_children(&mut self, from: ObjectId, to: Option<ObjectId>, correction: Mat4) {
        for object in &mut self.objects {
            if object.parent == Some(from) {
                object.parent = to;
                object.transform = Transform::from_matrix(correction * object.transform.to_matrix());
            }
        }
    }

    /// Point armature modifiers targeting `from` at `to`
    fn retarget_modifiers(&mut self, from: ObjectId, to: Option<ObjectId>) {
        for object in &mut self.objects {
            if let ObjectData::Mesh(mesh) = &mut object.data {
                if mesh.armature == Some(from) {
                    mesh.armature = to;
                }
            }
        }
    }

    fn join_armature(&mut self, active: ObjectId, other: ObjectId, matrix: Mat4) -> Result<(), HostError> {
        let incoming = self.armature_ref(other)?.clone();
        let target = self.armature_mut(active)?;

        let mut ids: HashMap<BoneId, BoneId> = HashMap::new();
        for bone in &incoming.bones {
            let id = target.add_bone(
                bone.name.clone(),
                matrix.transform_point3(bone.head),
                matrix.transform_point3(bone.tail),
                None,
            );
            ids.insert(bone.id, id);
        }
        for bone in &incoming.bones {
            let Some(id) = ids.get(&bone.id) else {
                continue;
            };
            let parent = bone.parent.and_then(|p| ids.get(&p).copied());
            if let Some(joined) = target.bone_mut(*id) {
                joined.parent = parent;
                joined.connected = bone.connected && parent.is_some();
                joined.constraints = bone.constraints.clone();
            }
        }
        Ok(())
    }

    fn join_mesh(&mut self, active: ObjectId, other: ObjectId, matrix: Mat4) -> Result<(), HostError> {
        let incoming = self
            .mesh(other)
            .cloned()
            .ok_or_else(|| HostError::NotAMesh(self.name_of(other).unwrap_or_default()))?;
        self.mesh_mut(active)?.append(&incoming, matrix);
        Ok(())
    }
}

impl GeometryHost for Scene {
    fn list_armatures(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.kind() == ObjectKind::Armature)
            .map(|o| o.id)
            .collect()
    }

    fn list_meshes(&self, armature: Option<ObjectId>) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.kind() == ObjectKind::Mesh)
            .filter(|o| armature.is_none() || o.parent == armature)
            .map(|o| o.id)
            .collect()
    }

    fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.find(name).map(|o| o.id)
    }

    fn object_kind(&self, object: ObjectId) -> Option<ObjectKind> {
        self.object(object).map(|o| o.kind())
    }

    fn object_name(&self, object: ObjectId) -> Option<String> {
        self.object(object).map(|o| o.name.clone())
    }

    fn rename_object(&mut self, object: ObjectId, name: &str) -> Result<(), HostError> {
        if self.find(name).is_some_and(|o| o.id != object) {
            return Err(HostError::NameTaken(name.to_string()));
        }
        self.object_mut(object)?.name = name.to_string();
        Ok(())
    }

    fn object_parent(&self, object: ObjectId) -> Option<ObjectId> {
        self.object(object)?.parent
    }

    fn delete_object(&mut self, object: ObjectId) -> Result<(), HostError> {
        let removed = self.object(object).cloned().ok_or(HostError::UnknownObject(object))?;
        self.adopt_children(object, removed.parent, removed.transform.to_matrix());
        self.retarget_modifiers(object, None);
        self.objects.retain(|o| o.id != object);
        self.selected.retain(|id| *id != object);
        if self.active == Some(object) {
            self.active = None;
        }
        self.modes.remove(&object);
        debug!(object = %removed.name, "Deleted object");
        Ok(())
    }

    fn transform(&self, object: ObjectId) -> Result<Transform, HostError> {
        self.object(object)
            .map(|o| o.transform)
            .ok_or(HostError::UnknownObject(object))
    }

    fn set_transform(&mut self, object: ObjectId, transform: Transform) -> Result<(), HostError> {
        self.object_mut(object)?.transform = transform;
        Ok(())
    }

    fn apply_transform(&mut self, object: ObjectId, mask: ApplyMask) -> Result<(), HostError> {
        let current = self.transform(object)?;
        let kept = Transform {
            location: if mask.location { Vec3::ZERO } else { current.location },
            rotation: if mask.rotation { Vec3::ZERO } else { current.rotation },
            scale: if mask.scale { Vec3::ONE } else { current.scale },
        };
        let baked = kept.to_matrix().inverse() * current.to_matrix();

        let target = self.object_mut(object)?;
        target.transform = kept;
        match &mut target.data {
            ObjectData::Armature(armature) => armature.transform_bones(baked),
            ObjectData::Mesh(mesh) => mesh.transform(baked),
            ObjectData::Empty => {}
        }

        self.adopt_children(object, Some(object), baked);
        Ok(())
    }

    fn set_active(&mut self, object: ObjectId) {
        self.active = Some(object);
        if !self.selected.contains(&object) {
            self.selected.push(object);
        }
    }

    fn select(&mut self, object: ObjectId) {
        if !self.selected.contains(&object) {
            self.selected.push(object);
        }
    }

    fn unselect_all(&mut self) {
        self.selected.clear();
    }

    fn enter_mode(&mut self, object: ObjectId, mode: Mode) -> Result<(), HostError> {
        let target = self.object(object).ok_or(HostError::UnknownObject(object))?;
        if mode == Mode::Edit && target.kind() == ObjectKind::Empty {
            return Err(HostError::NotAnArmature(target.name.clone()));
        }
        self.modes.insert(object, mode);
        Ok(())
    }

    fn join_objects(
        &mut self,
        active: ObjectId,
        selected: &[ObjectId],
    ) -> Result<ObjectId, HostError> {
        let active_name = self.name_of(active)?;
        let kind = self.object_kind(active).ok_or(HostError::UnknownObject(active))?;
        if kind == ObjectKind::Empty {
            return Err(HostError::InvalidJoin(active_name));
        }
        let others: Vec<ObjectId> = selected.iter().copied().filter(|id| *id != active).collect();
        if others.is_empty() {
            return Err(HostError::InvalidJoin(active_name));
        }
        for other in &others {
            if self.object_kind(*other).ok_or(HostError::UnknownObject(*other))? != kind {
                return Err(HostError::InvalidJoin(active_name));
            }
        }

        let inverse = self.world_matrix(active).inverse();
        for other in others {
            let matrix = inverse * self.world_matrix(other);
            match kind {
                ObjectKind::Armature => self.join_armature(active, other, matrix)?,
                _ => self.join_mesh(active, other, matrix)?,
            }
            // Children of a joined armature follow the survivor
            self.adopt_children(other, Some(active), matrix);
            self.retarget_modifiers(other, Some(active));
            self.objects.retain(|o| o.id != other);
            self.selected.retain(|id| *id != other);
            self.modes.remove(&other);
        }
        self.active = Some(active);
        debug!(object = %active_name, "Joined objects");
        Ok(active)
    }

    fn join_meshes_under_armature(&mut self, armature: ObjectId) -> Result<ObjectId, HostError> {
        let meshes = self.list_meshes(Some(armature));
        let Some((first, rest)) = meshes.split_first() else {
            return Err(HostError::NoMeshes(self.name_of(armature)?));
        };
        if rest.is_empty() {
            return Ok(*first);
        }
        self.join_objects(*first, rest)
    }

    fn create_armature(&mut self, name: &str, bone: BoneName) -> Result<ObjectId, HostError> {
        let armature = self.add_armature(name, Transform::IDENTITY);
        self.armature_mut(armature)?
            .add_bone(bone, Vec3::ZERO, Vec3::Z, None);
        Ok(armature)
    }

    fn bind_mesh_to_armature(&mut self, mesh: ObjectId, armature: ObjectId) -> Result<(), HostError> {
        self.armature_ref(armature)?;
        let world = self.world_matrix(mesh);
        let local = self.world_matrix(armature).inverse() * world;
        let object = self.object_mut(mesh)?;
        let name = object.name.clone();
        let data = object.mesh_mut().ok_or(HostError::NotAMesh(name))?;
        data.armature = Some(armature);
        object.parent = Some(armature);
        object.transform = Transform::from_matrix(local);
        Ok(())
    }

    fn bones(&self, armature: ObjectId) -> Vec<BoneId> {
        self.armature(armature)
            .map(|a| a.bones.iter().map(|b| b.id).collect())
            .unwrap_or_default()
    }

    fn bone_name(&self, armature: ObjectId, bone: BoneId) -> Option<BoneName> {
        Some(self.armature(armature)?.bone(bone)?.name.clone())
    }

    fn find_bone(&self, armature: ObjectId, name: &str) -> Option<BoneId> {
        Some(self.armature(armature)?.find(name)?.id)
    }

    fn bone_segment(&self, armature: ObjectId, bone: BoneId) -> Option<(Vec3, Vec3)> {
        let bone = self.armature(armature)?.bone(bone)?;
        Some((bone.head, bone.tail))
    }

    fn create_bone(
        &mut self,
        armature: ObjectId,
        name: BoneName,
        head: Vec3,
        tail: Vec3,
    ) -> Result<BoneId, HostError> {
        self.require_edit_mode(armature)?;
        Ok(self.armature_mut(armature)?.add_bone(name, head, tail, None))
    }

    fn rename_bone(
        &mut self,
        armature: ObjectId,
        bone: BoneId,
        name: BoneName,
    ) -> Result<BoneName, HostError> {
        let data = self.armature_ref(armature)?;
        let previous = data
            .bone(bone)
            .map(|b| b.name.to_string())
            .ok_or_else(|| self.unknown_bone(armature, bone))?;
        let name = data.unique_name(name, Some(bone));
        let new_name = name.to_string();
        if let Some(target) = self.armature_mut(armature)?.bone_mut(bone) {
            target.name = name.clone();
        }

        for mesh in self.bound_meshes(armature) {
            let data = self.mesh_mut(mesh)?;
            if data.group(&previous).is_some() {
                data.rename_group(&previous, &new_name, WeightMixPolicy::default());
            }
        }
        debug!(from = %previous, to = %new_name, "Renamed bone");
        Ok(name)
    }

    fn delete_bone(&mut self, armature: ObjectId, bone: BoneId) -> Result<(), HostError> {
        self.require_edit_mode(armature)?;
        let error = self.unknown_bone(armature, bone);
        let removed = self.armature_mut(armature)?.remove_bone(bone).ok_or(error)?;
        debug!(bone = %removed.name, "Deleted bone");
        Ok(())
    }

    fn bone_parent(&self, armature: ObjectId, bone: BoneId) -> Option<BoneId> {
        self.armature(armature)?.bone(bone)?.parent
    }

    fn set_bone_parent(
        &mut self,
        armature: ObjectId,
        bone: BoneId,
        parent: Option<BoneId>,
    ) -> Result<(), HostError> {
        self.require_edit_mode(armature)?;
        let data = self.armature_ref(armature)?;
        let child = data.bone(bone).ok_or_else(|| self.unknown_bone(armature, bone))?;
        if let Some(parent) = parent {
            let target = data.bone(parent).ok_or_else(|| self.unknown_bone(armature, parent))?;
            if parent == bone || data.is_ancestor(bone, parent) {
                return Err(HostError::BoneCycle {
                    child: child.name.to_string(),
                    parent: target.name.to_string(),
                });
            }
        }
        if let Some(child) = self.armature_mut(armature)?.bone_mut(bone) {
            child.parent = parent;
            child.connected = false;
        }
        Ok(())
    }

    fn fix_zero_length_bones(&mut self, armature: ObjectId, axis: Axis) -> Result<usize, HostError> {
        let fixed = self.armature_mut(armature)?.fix_zero_length(axis);
        if fixed > 0 {
            debug!(fixed, ?axis, "Lengthened zero-length bones");
        }
        Ok(fixed)
    }

    fn recompute_bone_connectivity(&mut self, armature: ObjectId) -> Result<(), HostError> {
        self.armature_mut(armature)?.recompute_connectivity();
        Ok(())
    }

    fn delete_bone_constraints(&mut self, armature: ObjectId) -> Result<usize, HostError> {
        let data = self.armature_mut(armature)?;
        let mut removed = 0;
        for bone in &mut data.bones {
            removed += bone.constraints.len();
            bone.constraints.clear();
        }
        Ok(removed)
    }

    fn vertex_group_names(&self, mesh: ObjectId) -> Vec<String> {
        self.mesh(mesh)
            .map(|m| m.groups.iter().map(|g| g.name.clone()).collect())
            .unwrap_or_default()
    }

    fn create_vertex_group(&mut self, mesh: ObjectId, name: &str) -> Result<(), HostError> {
        self.mesh_mut(mesh)?.ensure_group(name);
        Ok(())
    }

    fn rename_vertex_group(&mut self, mesh: ObjectId, from: &str, to: &str) -> Result<(), HostError> {
        let mesh_name = self.name_of(mesh)?;
        let data = self.mesh_mut(mesh)?;
        if data.group(to).is_some() {
            return Err(HostError::NameTaken(to.to_string()));
        }
        let group = data.group_mut(from).ok_or(HostError::UnknownVertexGroup {
            mesh: mesh_name,
            group: from.to_string(),
        })?;
        group.name = to.to_string();
        Ok(())
    }

    fn remove_vertex_group(&mut self, mesh: ObjectId, name: &str) -> Result<(), HostError> {
        let mesh_name = self.name_of(mesh)?;
        let data = self.mesh_mut(mesh)?;
        let before = data.groups.len();
        data.groups.retain(|g| g.name != name);
        if data.groups.len() == before {
            return Err(HostError::UnknownVertexGroup {
                mesh: mesh_name,
                group: name.to_string(),
            });
        }
        Ok(())
    }

    fn remove_all_vertex_groups(&mut self, mesh: ObjectId) -> Result<(), HostError> {
        self.mesh_mut(mesh)?.groups.clear();
        Ok(())
    }

    fn assign_all_vertices(&mut self, mesh: ObjectId, group: &str, weight: f32) -> Result<(), HostError> {
        let data = self.mesh_mut(mesh)?;
        let count = data.vertices.len() as u32;
        data.ensure_group(group)
            .weights
            .extend((0..count).map(|vertex| (vertex, weight)));
        Ok(())
    }

    fn mix_weights(
        &mut self,
        mesh: ObjectId,
        source: &str,
        dest: &str,
        policy: WeightMixPolicy,
    ) -> Result<(), HostError> {
        let mesh_name = self.name_of(mesh)?;
        if self.mesh_mut(mesh)?.mix(source, dest, policy) {
            Ok(())
        } else {
            Err(HostError::UnknownVertexGroup {
                mesh: mesh_name,
                group: source.to_string(),
            })
        }
    }

    fn remove_unused_vertex_groups(&mut self, armature: ObjectId, spare: &[&str]) -> Result<usize, HostError> {
        self.armature_ref(armature)?;
        let mut removed = 0;
        for mesh in self.bound_meshes(armature) {
            removed += self.mesh_mut(mesh)?.remove_unused_groups(spare);
        }
        Ok(removed)
    }

    fn remove_zero_weight(&mut self, armature: ObjectId, keep: &BoneFilter) -> Result<usize, HostError> {
        let meshes = self.bound_meshes(armature);
        let mut used: HashSet<String> = HashSet::new();
        for mesh in &meshes {
            let data = self.mesh_mut(*mesh)?;
            data.purge_zero_weights();
            used.extend(
                data.groups
                    .iter()
                    .filter(|g| g.has_influence())
                    .map(|g| g.name.clone()),
            );
        }

        let unused: Vec<Bone> = self
            .armature_ref(armature)?
            .bones
            .iter()
            .filter(|b| !used.contains(&b.name.to_string()) && !keep.keeps(&b.name))
            .cloned()
            .collect();

        let data = self.armature_mut(armature)?;
        for bone in &unused {
            data.remove_bone(bone.id);
        }
        for mesh in &meshes {
            let data = self.mesh_mut(*mesh)?;
            data.groups
                .retain(|g| !unused.iter().any(|b| b.name.to_string() == g.name));
        }
        if !unused.is_empty() {
            debug!(count = unused.len(), "Deleted bones without influence");
        }
        Ok(unused.len())
    }

    fn clean_shape_keys(&mut self, mesh: ObjectId) -> Result<usize, HostError> {
        Ok(self.mesh_mut(mesh)?.clean_shape_keys())
    }

    fn report_error(&mut self, code: f32, messages: &[String]) {
        warn!(code, "{}", messages.join(" "));
        self.errors.push(ErrorReport {
            code,
            messages: messages.to_vec(),
        });
    }
}
