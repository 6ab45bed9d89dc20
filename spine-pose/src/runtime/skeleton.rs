use crate::runtime::bone::{Bone, LocalTransform, SkeletonTransform, WorldTransform};
use crate::runtime::ik::IkConstraint;
use crate::runtime::path_constraint::PathConstraint;
use crate::runtime::transform_constraint::TransformConstraint;
use crate::{
    AttachmentData, BlendMode, MeshVertices, PointAttachmentData, RegionAttachmentData,
    SkeletonData, SkinData, SlotData, DEFAULT_SKIN_NAME,
};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Slot {
    data_index: usize,
    pub bone: usize,
    /// Attachment name as keyed in the skin it was resolved from.
    pub attachment: Option<String>,
    pub(crate) attachment_skin: Option<String>,
    pub(crate) attachment_state: i32,
    attachment_time: f32,
    /// Animated vertex buffer for the current attachment; empty when not deformed.
    pub deform: Vec<f32>,
    pub color: [f32; 4],
    pub dark_color: Option<[f32; 3]>,
    pub blend: BlendMode,
}

impl Slot {
    fn new(data_index: usize, data: &SlotData) -> Self {
        Self {
            data_index,
            bone: data.bone,
            attachment: None,
            attachment_skin: None,
            attachment_state: 0,
            attachment_time: 0.0,
            deform: Vec::new(),
            color: data.color,
            dark_color: data.dark_color,
            blend: data.blend,
        }
    }

    pub fn data_index(&self) -> usize {
        self.data_index
    }

    /// Name of the skin the current attachment was resolved from.
    pub fn attachment_skin(&self) -> Option<&str> {
        self.attachment_skin.as_deref()
    }
}

impl PointAttachmentData {
    pub fn compute_world_position(&self, bone: &Bone) -> [f32; 2] {
        bone.local_to_world(self.x, self.y)
    }

    pub fn compute_world_rotation(&self, bone: &Bone) -> f32 {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let x = cos * bone.a + sin * bone.b;
        let y = cos * bone.c + sin * bone.d;
        y.atan2(x).to_degrees()
    }
}

impl RegionAttachmentData {
    /// Writes the four corners (bottom-left, top-left, top-right, bottom-right) in world space.
    pub fn compute_world_vertices(
        &self,
        bone: &Bone,
        world_vertices: &mut [f32],
        offset: usize,
        stride: usize,
    ) {
        let offsets = self.offsets();
        for (corner, local) in offsets.chunks_exact(2).enumerate() {
            let w = offset + corner * stride;
            let [x, y] = bone.local_to_world(local[0], local[1]);
            world_vertices[w] = x;
            world_vertices[w + 1] = y;
        }
    }
}

/// Axis-aligned bounds of the skeleton's visible attachments.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UpdateCacheItem {
    Bone(usize),
    Ik(usize),
    Transform(usize),
    Path(usize),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ConstraintKind {
    Ik,
    Transform,
    Path,
}

#[derive(Clone, Debug)]
pub struct Skeleton {
    pub data: Arc<SkeletonData>,
    pub bones: Vec<Bone>,
    bone_children: Vec<Vec<usize>>,
    pub slots: Vec<Slot>,
    /// Draw order index to slot index.
    pub draw_order: Vec<usize>,
    skin: Option<String>,
    pub color: [f32; 4],
    pub ik_constraints: Vec<IkConstraint>,
    pub transform_constraints: Vec<TransformConstraint>,
    pub path_constraints: Vec<PathConstraint>,
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    time: f32,
    update_cache: Vec<UpdateCacheItem>,
    update_cache_reset: Vec<usize>,
}

impl Skeleton {
    pub fn new(data: Arc<SkeletonData>) -> Self {
        let bones = data
            .bones
            .iter()
            .enumerate()
            .map(|(data_index, bone)| Bone::new(data_index, bone))
            .collect::<Vec<_>>();
        let bone_children = build_bone_children_indices(&bones);

        let slots = data
            .slots
            .iter()
            .enumerate()
            .map(|(data_index, slot)| Slot::new(data_index, slot))
            .collect::<Vec<_>>();
        let draw_order = (0..slots.len()).collect();

        let ik_constraints = data
            .ik_constraints
            .iter()
            .enumerate()
            .map(|(data_index, c)| IkConstraint::new(data_index, c))
            .collect();
        let transform_constraints = data
            .transform_constraints
            .iter()
            .enumerate()
            .map(|(data_index, c)| TransformConstraint::new(data_index, c))
            .collect();
        let path_constraints = data
            .path_constraints
            .iter()
            .enumerate()
            .map(|(data_index, c)| PathConstraint::new(data_index, c))
            .collect();

        let mut skeleton = Self {
            data,
            bones,
            bone_children,
            slots,
            draw_order,
            skin: None,
            color: [1.0, 1.0, 1.0, 1.0],
            ik_constraints,
            transform_constraints,
            path_constraints,
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            time: 0.0,
            update_cache: Vec::new(),
            update_cache_reset: Vec::new(),
        };
        skeleton.set_to_setup_pose();
        skeleton.update_cache();
        skeleton
    }

    /// Skeleton clock, advanced by [`Skeleton::update`].
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn update(&mut self, delta: f32) {
        self.time += delta;
    }

    pub fn skin(&self) -> Option<&str> {
        self.skin.as_deref()
    }

    pub(crate) fn transform(&self) -> SkeletonTransform {
        SkeletonTransform {
            x: self.x,
            y: self.y,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }

    /// The ordered list of bones and constraints run by [`Skeleton::update_world_transform`].
    pub fn update_cache_items(&self) -> &[UpdateCacheItem] {
        &self.update_cache
    }

    pub fn update_cache(&mut self) {
        self.update_cache.clear();
        self.update_cache_reset.clear();

        for (bone, data) in self.bones.iter_mut().zip(&self.data.bones) {
            bone.sorted = data.skin_required;
            bone.active = !bone.sorted;
        }

        let data = Arc::clone(&self.data);
        let skin = self.skin.as_deref().and_then(|name| data.skin(name));
        if let Some(skin) = skin {
            for &bone_index in &skin.bones {
                let mut current = Some(bone_index);
                while let Some(i) = current {
                    self.bones[i].sorted = false;
                    self.bones[i].active = true;
                    current = self.bones[i].parent_index();
                }
            }
        }

        let mut ordered = Vec::with_capacity(
            data.ik_constraints.len()
                + data.transform_constraints.len()
                + data.path_constraints.len(),
        );
        ordered.extend(
            data.ik_constraints
                .iter()
                .enumerate()
                .map(|(i, c)| (c.order, ConstraintKind::Ik, i)),
        );
        ordered.extend(
            data.transform_constraints
                .iter()
                .enumerate()
                .map(|(i, c)| (c.order, ConstraintKind::Transform, i)),
        );
        ordered.extend(
            data.path_constraints
                .iter()
                .enumerate()
                .map(|(i, c)| (c.order, ConstraintKind::Path, i)),
        );
        ordered.sort_by_key(|&(order, _, _)| order);

        for (_, kind, index) in ordered {
            match kind {
                ConstraintKind::Ik => self.sort_ik_constraint(index, skin),
                ConstraintKind::Transform => self.sort_transform_constraint(index, skin),
                ConstraintKind::Path => self.sort_path_constraint(index, skin, &data),
            }
        }

        for i in 0..self.bones.len() {
            self.sort_bone(i);
        }

        log::debug!(
            "rebuilt update cache: {} items, {} bones reset",
            self.update_cache.len(),
            self.update_cache_reset.len()
        );
    }

    fn sort_ik_constraint(&mut self, index: usize, skin: Option<&SkinData>) {
        let data = &self.data.ik_constraints[index];
        let active = self.bones[data.target].active
            && (!data.skin_required || skin.is_some_and(|s| s.ik_constraints.contains(&index)));
        self.ik_constraints[index].active = active;
        if !active {
            return;
        }

        let target = self.ik_constraints[index].target;
        self.sort_bone(target);

        let constrained = self.ik_constraints[index].bones.clone();
        let Some(&parent) = constrained.first() else {
            return;
        };
        self.sort_bone(parent);

        let child = constrained[constrained.len() - 1];
        if constrained.len() > 1 && !self.update_cache.contains(&UpdateCacheItem::Bone(child)) {
            self.update_cache_reset.push(child);
        }

        self.update_cache.push(UpdateCacheItem::Ik(index));
        self.sort_reset_children(parent);
        self.bones[child].sorted = true;
    }

    fn sort_transform_constraint(&mut self, index: usize, skin: Option<&SkinData>) {
        let data = &self.data.transform_constraints[index];
        let local = data.local;
        let active = self.bones[data.target].active
            && (!data.skin_required
                || skin.is_some_and(|s| s.transform_constraints.contains(&index)));
        self.transform_constraints[index].active = active;
        if !active {
            return;
        }

        let target = self.transform_constraints[index].target;
        self.sort_bone(target);

        let constrained = self.transform_constraints[index].bones.clone();
        if local {
            for &child in &constrained {
                if let Some(parent) = self.bones[child].parent_index() {
                    self.sort_bone(parent);
                }
                if !self.update_cache.contains(&UpdateCacheItem::Bone(child)) {
                    self.update_cache_reset.push(child);
                }
            }
        } else {
            for &bone in &constrained {
                self.sort_bone(bone);
            }
        }

        self.update_cache.push(UpdateCacheItem::Transform(index));
        for &bone in &constrained {
            self.sort_reset_children(bone);
        }
        for &bone in &constrained {
            self.bones[bone].sorted = true;
        }
    }

    fn sort_path_constraint(&mut self, index: usize, skin: Option<&SkinData>, data: &SkeletonData) {
        let constraint_data = &data.path_constraints[index];
        let slot_index = constraint_data.target;
        let slot_bone = self.slots[slot_index].bone;
        let active = self.bones[slot_bone].active
            && (!constraint_data.skin_required
                || skin.is_some_and(|s| s.path_constraints.contains(&index)));
        self.path_constraints[index].active = active;
        if !active {
            return;
        }

        if let Some(skin) = skin {
            self.sort_path_constraint_skin(skin, slot_index, slot_bone);
        }
        if let Some(default_skin) = data.default_skin() {
            if skin.is_none_or(|s| s.name != default_skin.name) {
                self.sort_path_constraint_skin(default_skin, slot_index, slot_bone);
            }
        }
        if let Some(attachment) =
            resolve_slot_attachment(data, &self.slots[slot_index], slot_index)
        {
            self.sort_path_constraint_attachment(attachment, slot_bone);
        }

        let constrained = self.path_constraints[index].bones.clone();
        for &bone in &constrained {
            self.sort_bone(bone);
        }
        self.update_cache.push(UpdateCacheItem::Path(index));
        for &bone in &constrained {
            self.sort_reset_children(bone);
        }
        for &bone in &constrained {
            self.bones[bone].sorted = true;
        }
    }

    fn sort_path_constraint_skin(&mut self, skin: &SkinData, slot_index: usize, slot_bone: usize) {
        let Some(slot_map) = skin.attachments.get(slot_index) else {
            return;
        };
        for attachment in slot_map.values() {
            self.sort_path_constraint_attachment(attachment, slot_bone);
        }
    }

    fn sort_path_constraint_attachment(&mut self, attachment: &AttachmentData, slot_bone: usize) {
        let AttachmentData::Path(path) = attachment else {
            return;
        };
        match &path.vertices {
            MeshVertices::Unweighted(_) => self.sort_bone(slot_bone),
            MeshVertices::Weighted(vertices) => {
                for weight in vertices.iter().flatten() {
                    self.sort_bone(weight.bone);
                }
            }
        }
    }

    fn sort_bone(&mut self, bone_index: usize) {
        if self.bones[bone_index].sorted {
            return;
        }
        if let Some(parent) = self.bones[bone_index].parent_index() {
            self.sort_bone(parent);
        }
        self.bones[bone_index].sorted = true;
        self.update_cache.push(UpdateCacheItem::Bone(bone_index));
    }

    fn sort_reset_children(&mut self, bone_index: usize) {
        for k in 0..self.bone_children[bone_index].len() {
            let child = self.bone_children[bone_index][k];
            self.sort_reset(child);
        }
    }

    fn sort_reset(&mut self, bone_index: usize) {
        if !self.bones[bone_index].active {
            return;
        }
        if self.bones[bone_index].sorted {
            self.sort_reset_children(bone_index);
        }
        self.bones[bone_index].sorted = false;
    }

    /// Runs the update cache: bones compute world transforms from their local values and
    /// constraints adjust them in order.
    pub fn update_world_transform(&mut self) {
        for k in 0..self.update_cache_reset.len() {
            let bone = &mut self.bones[self.update_cache_reset[k]];
            let local = bone.local();
            bone.set_applied(local);
            bone.applied_valid = true;
        }

        for k in 0..self.update_cache.len() {
            match self.update_cache[k] {
                UpdateCacheItem::Bone(i) => self.update_bone_world_transform(i),
                UpdateCacheItem::Ik(i) => self.apply_ik_constraint(i),
                UpdateCacheItem::Transform(i) => self.apply_transform_constraint(i),
                UpdateCacheItem::Path(i) => self.apply_path_constraint(i),
            }
        }
    }

    pub(crate) fn parent_world(&self, bone_index: usize) -> Option<WorldTransform> {
        self.bones[bone_index]
            .parent_index()
            .map(|parent| self.bones[parent].world())
    }

    /// The parent's world transform, or the skeleton placement for a root bone.
    pub(crate) fn parent_world_or_root(&self, bone_index: usize) -> WorldTransform {
        self.parent_world(bone_index)
            .unwrap_or_else(|| self.transform().as_parent())
    }

    pub fn update_bone_world_transform(&mut self, bone_index: usize) {
        let local = self.bones[bone_index].local();
        self.update_bone_world_transform_with(bone_index, local);
    }

    pub fn update_bone_world_transform_with(&mut self, bone_index: usize, local: LocalTransform) {
        let parent = self.parent_world(bone_index);
        let skeleton = self.transform();
        self.bones[bone_index].update_world_transform_with(parent.as_ref(), &skeleton, local);
    }

    pub fn update_bone_applied_transform(&mut self, bone_index: usize) {
        let parent = self.parent_world(bone_index);
        let skeleton = self.transform();
        self.bones[bone_index].update_applied_transform(parent.as_ref(), &skeleton);
    }

    pub fn set_to_setup_pose(&mut self) {
        self.set_bones_to_setup_pose();
        self.set_slots_to_setup_pose();
    }

    /// Resets bones and constraint mixes to the setup pose.
    pub fn set_bones_to_setup_pose(&mut self) {
        let data = Arc::clone(&self.data);
        for (bone, bone_data) in self.bones.iter_mut().zip(&data.bones) {
            bone.set_to_setup_pose(bone_data);
        }
        for (c, c_data) in self.ik_constraints.iter_mut().zip(&data.ik_constraints) {
            c.set_to_setup_pose(c_data);
        }
        for (c, c_data) in self
            .transform_constraints
            .iter_mut()
            .zip(&data.transform_constraints)
        {
            c.set_to_setup_pose(c_data);
        }
        for (c, c_data) in self.path_constraints.iter_mut().zip(&data.path_constraints) {
            c.set_to_setup_pose(c_data);
        }
    }

    pub fn set_slots_to_setup_pose(&mut self) {
        self.draw_order.clear();
        self.draw_order.extend(0..self.slots.len());
        for slot_index in 0..self.slots.len() {
            self.set_slot_to_setup_pose(slot_index);
        }
    }

    pub(crate) fn set_slot_to_setup_pose(&mut self, slot_index: usize) {
        let data = Arc::clone(&self.data);
        let slot_data = &data.slots[slot_index];
        let slot = &mut self.slots[slot_index];
        slot.color = slot_data.color;
        if let (Some(dark), Some(setup)) = (slot.dark_color.as_mut(), slot_data.dark_color) {
            *dark = setup;
        }
        match slot_data.attachment.as_deref() {
            None => self.set_slot_attachment(slot_index, None),
            Some(name) => {
                // Forces a change so the attachment time and deform are reset.
                self.slots[slot_index].attachment = None;
                self.slots[slot_index].attachment_skin = None;
                self.set_slot_attachment(slot_index, Some(name));
            }
        }
    }

    /// Sets the slot's attachment by name, resolved against the current skin then the default
    /// skin. Unresolvable names clear the attachment.
    pub(crate) fn set_slot_attachment(&mut self, slot_index: usize, attachment_name: Option<&str>) {
        let source = attachment_name.and_then(|name| {
            let skin = self.attachment_source(slot_index, name);
            if skin.is_none() {
                log::trace!("slot {slot_index}: no attachment named {name:?}");
            }
            skin.map(|skin| (name.to_string(), skin.to_string()))
        });
        let (attachment, attachment_skin) = match source {
            Some((name, skin)) => (Some(name), Some(skin)),
            None => (None, None),
        };
        self.replace_slot_attachment(slot_index, attachment, attachment_skin);
    }

    fn replace_slot_attachment(
        &mut self,
        slot_index: usize,
        attachment: Option<String>,
        attachment_skin: Option<String>,
    ) {
        let time = self.time;
        let slot = &mut self.slots[slot_index];
        if slot.attachment == attachment && slot.attachment_skin == attachment_skin {
            return;
        }
        slot.attachment = attachment;
        slot.attachment_skin = attachment_skin;
        slot.attachment_time = time;
        slot.deform.clear();
    }

    /// Seconds since the slot's attachment last changed, on the skeleton clock.
    pub fn slot_attachment_time(&self, slot_index: usize) -> f32 {
        self.time - self.slots[slot_index].attachment_time
    }

    pub fn set_slot_attachment_time(&mut self, slot_index: usize, time: f32) {
        self.slots[slot_index].attachment_time = self.time - time;
    }

    /// Switches skins. Attachments that came from the old skin are replaced by same-named
    /// attachments of the new one; with no previous skin, setup attachments found in the new
    /// skin are attached.
    pub fn set_skin(&mut self, skin_name: Option<&str>) -> Result<(), crate::Error> {
        if self.skin.as_deref() == skin_name {
            return Ok(());
        }
        let data = Arc::clone(&self.data);
        let new_skin = match skin_name {
            None => None,
            Some(name) => Some(data.skin(name).ok_or_else(|| crate::Error::UnknownSkin {
                name: name.to_string(),
            })?),
        };

        if let Some(new_skin) = new_skin {
            match self.skin.clone() {
                Some(old_skin) => {
                    for slot_index in 0..self.slots.len() {
                        let slot = &self.slots[slot_index];
                        if slot.attachment_skin.as_deref() != Some(old_skin.as_str()) {
                            continue;
                        }
                        let Some(key) = slot.attachment.clone() else {
                            continue;
                        };
                        if new_skin.attachment(slot_index, &key).is_some() {
                            self.replace_slot_attachment(
                                slot_index,
                                Some(key),
                                Some(new_skin.name.clone()),
                            );
                        }
                    }
                }
                None => {
                    for (slot_index, slot_data) in data.slots.iter().enumerate() {
                        let Some(name) = slot_data.attachment.as_deref() else {
                            continue;
                        };
                        if new_skin.attachment(slot_index, name).is_some() {
                            self.replace_slot_attachment(
                                slot_index,
                                Some(name.to_string()),
                                Some(new_skin.name.clone()),
                            );
                        }
                    }
                }
            }
        }

        log::debug!("skin changed from {:?} to {:?}", self.skin, skin_name);
        self.skin = skin_name.map(str::to_string);
        self.update_cache();
        Ok(())
    }

    fn attachment_source(&self, slot_index: usize, attachment_name: &str) -> Option<&str> {
        if let Some(skin) = self.skin.as_deref().and_then(|name| self.data.skin(name)) {
            if skin.attachment(slot_index, attachment_name).is_some() {
                return Some(skin.name.as_str());
            }
        }
        let default_skin = self.data.default_skin()?;
        default_skin
            .attachment(slot_index, attachment_name)
            .map(|_| default_skin.name.as_str())
    }

    /// Looks an attachment up in the current skin, then in the default skin.
    pub fn attachment(&self, slot_index: usize, attachment_name: &str) -> Option<&AttachmentData> {
        let skin = self.attachment_source(slot_index, attachment_name)?;
        self.data.skin(skin)?.attachment(slot_index, attachment_name)
    }

    pub fn attachment_by_slot_name(
        &self,
        slot_name: &str,
        attachment_name: &str,
    ) -> Option<&AttachmentData> {
        let slot_index = self.find_slot(slot_name)?;
        self.attachment(slot_index, attachment_name)
    }

    /// Sets a slot's attachment by slot and attachment name; `None` clears it.
    pub fn set_attachment(
        &mut self,
        slot_name: &str,
        attachment_name: Option<&str>,
    ) -> Result<(), crate::Error> {
        let slot_index = self
            .find_slot(slot_name)
            .ok_or_else(|| crate::Error::UnknownSlot {
                name: slot_name.to_string(),
            })?;
        if let Some(name) = attachment_name {
            if self.attachment(slot_index, name).is_none() {
                return Err(crate::Error::UnknownAttachment {
                    slot: slot_name.to_string(),
                    name: name.to_string(),
                });
            }
        }
        self.set_slot_attachment(slot_index, attachment_name);
        Ok(())
    }

    /// The attachment currently shown by a slot.
    pub fn slot_attachment_data(&self, slot_index: usize) -> Option<&AttachmentData> {
        resolve_slot_attachment(&self.data, self.slots.get(slot_index)?, slot_index)
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.data.find_bone(name)
    }

    pub fn find_slot(&self, name: &str) -> Option<usize> {
        self.data.find_slot(name)
    }

    pub fn find_ik_constraint(&self, name: &str) -> Option<usize> {
        self.data.find_ik_constraint(name)
    }

    pub fn find_transform_constraint(&self, name: &str) -> Option<usize> {
        self.data.find_transform_constraint(name)
    }

    pub fn find_path_constraint(&self, name: &str) -> Option<usize> {
        self.data.find_path_constraint(name)
    }

    /// Transforms `count` floats of a vertex attachment's vertices, starting at float `start`,
    /// into world space using the slot's bone (or weighted bones) and deform.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_world_vertices(
        &self,
        slot_index: usize,
        vertices: &MeshVertices,
        start: usize,
        count: usize,
        world_vertices: &mut [f32],
        offset: usize,
        stride: usize,
    ) {
        compute_attachment_world_vertices(
            self,
            slot_index,
            vertices,
            start,
            count,
            world_vertices,
            offset,
            stride,
        );
    }

    /// World vertices of the slot's current vertex attachment.
    pub fn slot_world_vertices(&self, slot_index: usize) -> Option<Vec<f32>> {
        let vertices = self.slot_attachment_data(slot_index)?.vertices()?;
        let length = vertices.world_vertices_length();
        let mut out = vec![0.0; length];
        compute_attachment_world_vertices(self, slot_index, vertices, 0, length, &mut out, 0, 2);
        Some(out)
    }

    /// Bounds over region and mesh attachments of active slots, `None` when nothing is shown.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        let mut vertices = Vec::new();

        for &slot_index in &self.draw_order {
            let slot = &self.slots[slot_index];
            let bone = &self.bones[slot.bone];
            if !bone.active {
                continue;
            }
            match self.slot_attachment_data(slot_index) {
                Some(AttachmentData::Region(region)) => {
                    vertices.resize(8, 0.0);
                    region.compute_world_vertices(bone, &mut vertices, 0, 2);
                }
                Some(AttachmentData::Mesh(mesh)) => {
                    let length = mesh.vertices.world_vertices_length();
                    vertices.resize(length, 0.0);
                    compute_attachment_world_vertices(
                        self,
                        slot_index,
                        &mesh.vertices,
                        0,
                        length,
                        &mut vertices,
                        0,
                        2,
                    );
                }
                _ => continue,
            }
            for point in vertices.chunks_exact(2) {
                min_x = min_x.min(point[0]);
                min_y = min_y.min(point[1]);
                max_x = max_x.max(point[0]);
                max_y = max_y.max(point[1]);
            }
        }

        if min_x > max_x {
            return None;
        }
        Some(Bounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// Resolves the attachment a slot currently shows against the skin it was taken from.
pub(crate) fn resolve_slot_attachment<'a>(
    data: &'a SkeletonData,
    slot: &Slot,
    slot_index: usize,
) -> Option<&'a AttachmentData> {
    let key = slot.attachment.as_deref()?;
    let skin = slot.attachment_skin.as_deref().unwrap_or(DEFAULT_SKIN_NAME);
    data.skin(skin)?.attachment(slot_index, key)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn compute_attachment_world_vertices(
    skeleton: &Skeleton,
    slot_index: usize,
    vertices: &MeshVertices,
    start: usize,
    count: usize,
    world_vertices: &mut [f32],
    offset: usize,
    stride: usize,
) {
    let slot = &skeleton.slots[slot_index];
    let deform = slot.deform.as_slice();
    let start_vertex = start / 2;
    let vertex_count = count / 2;

    match vertices {
        MeshVertices::Unweighted(v) => {
            let bone = &skeleton.bones[slot.bone];
            let n = vertex_count.min(v.len().saturating_sub(start_vertex));
            for i in 0..n {
                let vi = start_vertex + i;
                let (vx, vy) = if deform.len() >= (vi + 1) * 2 {
                    (deform[vi * 2], deform[vi * 2 + 1])
                } else {
                    (v[vi][0], v[vi][1])
                };
                let [x, y] = bone.local_to_world(vx, vy);
                let w = offset + i * stride;
                world_vertices[w] = x;
                world_vertices[w + 1] = y;
            }
        }
        MeshVertices::Weighted(v) => {
            let n = vertex_count.min(v.len().saturating_sub(start_vertex));
            let mut f = v[..start_vertex.min(v.len())]
                .iter()
                .map(|weights| weights.len() * 2)
                .sum::<usize>();
            for i in 0..n {
                let mut wx = 0.0f32;
                let mut wy = 0.0f32;
                for weight in &v[start_vertex + i] {
                    let (dx, dy) = if deform.len() >= f + 2 {
                        (deform[f], deform[f + 1])
                    } else {
                        (0.0, 0.0)
                    };
                    f += 2;
                    let [x, y] = skeleton.bones[weight.bone].local_to_world(weight.x + dx, weight.y + dy);
                    wx += x * weight.weight;
                    wy += y * weight.weight;
                }
                let w = offset + i * stride;
                world_vertices[w] = wx;
                world_vertices[w + 1] = wy;
            }
        }
    }
}

fn build_bone_children_indices(bones: &[Bone]) -> Vec<Vec<usize>> {
    let mut children = vec![Vec::<usize>::new(); bones.len()];
    for (index, bone) in bones.iter().enumerate() {
        if let Some(parent) = bone.parent_index() {
            children[parent].push(index);
        }
    }
    children
}
