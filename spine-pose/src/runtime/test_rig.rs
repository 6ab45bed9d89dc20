use crate::{
    next_vertex_attachment_id, Animation, AttachmentData, BoneData, IkConstraintData,
    MeshAttachmentData, MeshVertices, PathAttachmentData, PathConstraintData, PositionMode,
    RegionAttachmentData, RotateMode, RotateTimeline, SkeletonData, SkinData, SlotData,
    SpacingMode, Timeline, TransformConstraintData, Vec2Timeline, DEFAULT_SKIN_NAME,
};
use std::sync::Arc;

pub(crate) fn assert_approx(actual: f32, expected: f32) {
    assert_approx_eps(actual, expected, 1.0e-4);
}

pub(crate) fn assert_approx_eps(actual: f32, expected: f32, eps: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= eps,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

/// Builds `SkeletonData` with a `root` bone at index 0.
pub(crate) struct Rig {
    data: SkeletonData,
}

impl Rig {
    pub(crate) fn new() -> Self {
        let mut data = SkeletonData {
            name: "rig".to_string(),
            ..SkeletonData::default()
        };
        data.bones.push(BoneData::new("root", None));
        Self { data }
    }

    pub(crate) fn bone(mut self, name: &str, parent: &str, f: impl FnOnce(&mut BoneData)) -> Self {
        let parent = self.data.find_bone(parent).expect("parent bone");
        let mut bone = BoneData::new(name, Some(parent));
        f(&mut bone);
        self.data.bones.push(bone);
        self
    }

    pub(crate) fn root(mut self, f: impl FnOnce(&mut BoneData)) -> Self {
        f(&mut self.data.bones[0]);
        self
    }

    pub(crate) fn slot(mut self, name: &str, bone: &str, attachment: Option<&str>) -> Self {
        let bone = self.data.find_bone(bone).expect("slot bone");
        let mut slot = SlotData::new(name, bone);
        slot.attachment = attachment.map(str::to_string);
        self.data.slots.push(slot);
        self
    }

    /// Adds an attachment to a skin, creating the skin on first use.
    pub(crate) fn attachment(mut self, skin: &str, slot: &str, attachment: AttachmentData) -> Self {
        let slot = self.data.find_slot(slot).expect("attachment slot");
        let skin = self
            .data
            .skins
            .entry(skin.to_string())
            .or_insert_with(|| SkinData::new(skin));
        skin.set_attachment(slot, attachment.name().to_string(), attachment);
        self
    }

    pub(crate) fn default_attachment(self, slot: &str, attachment: AttachmentData) -> Self {
        self.attachment(DEFAULT_SKIN_NAME, slot, attachment)
    }

    pub(crate) fn skin(mut self, skin: SkinData) -> Self {
        self.data.skins.insert(skin.name.clone(), skin);
        self
    }

    pub(crate) fn animation(mut self, animation: Animation) -> Self {
        self.data.add_animation(animation);
        self
    }

    pub(crate) fn ik(mut self, ik: IkConstraintData) -> Self {
        self.data.ik_constraints.push(ik);
        self
    }

    pub(crate) fn transform(mut self, constraint: TransformConstraintData) -> Self {
        self.data.transform_constraints.push(constraint);
        self
    }

    pub(crate) fn path(mut self, constraint: PathConstraintData) -> Self {
        self.data.path_constraints.push(constraint);
        self
    }

    pub(crate) fn bone_index(&self, name: &str) -> usize {
        self.data.find_bone(name).expect("bone")
    }

    pub(crate) fn build(self) -> Arc<SkeletonData> {
        Arc::new(self.data)
    }
}

pub(crate) fn rotate(bone_index: usize, keys: &[(f32, f32)]) -> Timeline {
    let mut timeline = RotateTimeline::new(keys.len(), bone_index);
    for (i, &(time, degrees)) in keys.iter().enumerate() {
        timeline.set_frame(i, time, degrees);
    }
    Timeline::Rotate(timeline)
}

fn vec2(bone_index: usize, keys: &[(f32, f32, f32)]) -> Vec2Timeline {
    let mut timeline = Vec2Timeline::new(keys.len(), bone_index);
    for (i, &(time, x, y)) in keys.iter().enumerate() {
        timeline.set_frame(i, time, x, y);
    }
    timeline
}

pub(crate) fn translate(bone_index: usize, keys: &[(f32, f32, f32)]) -> Timeline {
    Timeline::Translate(vec2(bone_index, keys))
}

pub(crate) fn scale(bone_index: usize, keys: &[(f32, f32, f32)]) -> Timeline {
    Timeline::Scale(vec2(bone_index, keys))
}

pub(crate) fn region(name: &str, width: f32, height: f32) -> AttachmentData {
    AttachmentData::Region(RegionAttachmentData {
        name: name.to_string(),
        path: name.to_string(),
        color: [1.0; 4],
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        width,
        height,
    })
}

pub(crate) fn mesh(name: &str, vertices: MeshVertices) -> AttachmentData {
    let vertex_id = next_vertex_attachment_id();
    let count = vertices.vertex_count();
    AttachmentData::Mesh(MeshAttachmentData {
        vertex_id,
        deform_attachment_id: vertex_id,
        name: name.to_string(),
        path: name.to_string(),
        color: [1.0; 4],
        vertices,
        uvs: vec![[0.0, 0.0]; count],
        triangles: Vec::new(),
        hull_length: count * 2,
    })
}

/// Open path through `points`, each given as `in-handle, point, out-handle` triples.
pub(crate) fn path_attachment(
    name: &str,
    points: Vec<[f32; 2]>,
    lengths: Vec<f32>,
    constant_speed: bool,
) -> AttachmentData {
    AttachmentData::Path(PathAttachmentData {
        vertex_id: next_vertex_attachment_id(),
        name: name.to_string(),
        vertices: MeshVertices::Unweighted(points),
        lengths,
        closed: false,
        constant_speed,
    })
}

pub(crate) fn ik_data(name: &str, bones: Vec<usize>, target: usize) -> IkConstraintData {
    IkConstraintData {
        name: name.to_string(),
        order: 0,
        skin_required: false,
        bones,
        target,
        mix: 1.0,
        softness: 0.0,
        bend_direction: 1,
        compress: false,
        stretch: false,
        uniform: false,
    }
}

pub(crate) fn transform_data(name: &str, bones: Vec<usize>, target: usize) -> TransformConstraintData {
    TransformConstraintData {
        name: name.to_string(),
        order: 0,
        skin_required: false,
        bones,
        target,
        rotate_mix: 1.0,
        translate_mix: 1.0,
        scale_mix: 1.0,
        shear_mix: 1.0,
        offset_rotation: 0.0,
        offset_x: 0.0,
        offset_y: 0.0,
        offset_scale_x: 0.0,
        offset_scale_y: 0.0,
        offset_shear_y: 0.0,
        relative: false,
        local: false,
    }
}

pub(crate) fn path_data(name: &str, bones: Vec<usize>, target_slot: usize) -> PathConstraintData {
    PathConstraintData {
        name: name.to_string(),
        order: 0,
        skin_required: false,
        bones,
        target: target_slot,
        position_mode: PositionMode::Fixed,
        spacing_mode: SpacingMode::Length,
        rotate_mode: RotateMode::Tangent,
        offset_rotation: 0.0,
        position: 0.0,
        spacing: 0.0,
        rotate_mix: 1.0,
        translate_mix: 1.0,
    }
}
