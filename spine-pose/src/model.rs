use crate::Animation;
use std::collections::HashMap;

/// Name of the skin used as the fallback for attachment lookup.
pub const DEFAULT_SKIN_NAME: &str = "default";

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneData {
    pub name: String,
    pub parent: Option<usize>,
    pub length: f32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub shear_x: f32,
    pub shear_y: f32,
    pub transform_mode: TransformMode,
    pub skin_required: bool,
}

impl BoneData {
    /// Setup-pose bone at the origin with unit scale.
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            length: 0.0,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            transform_mode: TransformMode::Normal,
            skin_required: false,
        }
    }
}

/// How a bone inherits its parent's world transform.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformMode {
    #[default]
    Normal,
    OnlyTranslation,
    NoRotationOrReflection,
    NoScale,
    NoScaleOrReflection,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotData {
    pub name: String,
    pub bone: usize,
    pub attachment: Option<String>,
    pub color: [f32; 4],
    /// Setup dark color for two-color tinting, `None` when the slot is tinted with one color.
    pub dark_color: Option<[f32; 3]>,
    pub blend: BlendMode,
}

impl SlotData {
    pub fn new(name: impl Into<String>, bone: usize) -> Self {
        Self {
            name: name.into(),
            bone,
            attachment: None,
            color: [1.0, 1.0, 1.0, 1.0],
            dark_color: None,
            blend: BlendMode::Normal,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IkConstraintData {
    pub name: String,
    pub order: i32,
    pub skin_required: bool,
    /// One or two constrained bones, parent first.
    pub bones: Vec<usize>,
    pub target: usize,
    pub mix: f32,
    pub softness: f32,
    pub bend_direction: i32,
    pub compress: bool,
    pub stretch: bool,
    pub uniform: bool,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformConstraintData {
    pub name: String,
    pub order: i32,
    pub skin_required: bool,
    pub bones: Vec<usize>,
    pub target: usize,
    pub rotate_mix: f32,
    pub translate_mix: f32,
    pub scale_mix: f32,
    pub shear_mix: f32,
    pub offset_rotation: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub offset_scale_x: f32,
    pub offset_scale_y: f32,
    pub offset_shear_y: f32,
    pub relative: bool,
    pub local: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionMode {
    Fixed,
    Percent,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpacingMode {
    Length,
    Fixed,
    Percent,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotateMode {
    Tangent,
    Chain,
    ChainScale,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathConstraintData {
    pub name: String,
    pub order: i32,
    pub skin_required: bool,
    pub bones: Vec<usize>,
    /// Slot holding the path attachment.
    pub target: usize,
    pub position_mode: PositionMode,
    pub spacing_mode: SpacingMode,
    pub rotate_mode: RotateMode,
    pub offset_rotation: f32,
    pub position: f32,
    pub spacing: f32,
    pub rotate_mix: f32,
    pub translate_mix: f32,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexWeight {
    pub bone: usize,
    pub x: f32,
    pub y: f32,
    pub weight: f32,
}

/// Authored vertex positions, either in slot-bone space or as per-bone weighted influences.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeshVertices {
    Unweighted(Vec<[f32; 2]>),
    Weighted(Vec<Vec<VertexWeight>>),
}

impl MeshVertices {
    pub fn vertex_count(&self) -> usize {
        match self {
            MeshVertices::Unweighted(v) => v.len(),
            MeshVertices::Weighted(v) => v.len(),
        }
    }

    /// Length of the flat `x, y` world vertex buffer.
    pub fn world_vertices_length(&self) -> usize {
        self.vertex_count() * 2
    }

    /// Length of a deform buffer for these vertices: one offset pair per vertex, or per
    /// bone influence when weighted.
    pub fn deform_length(&self) -> usize {
        match self {
            MeshVertices::Unweighted(v) => v.len() * 2,
            MeshVertices::Weighted(v) => v.iter().map(|w| w.len() * 2).sum(),
        }
    }

    pub fn is_weighted(&self) -> bool {
        matches!(self, MeshVertices::Weighted(_))
    }

    /// Flat setup positions of unweighted vertices, `None` when weighted.
    pub fn setup_positions(&self) -> Option<Vec<f32>> {
        match self {
            MeshVertices::Unweighted(v) => Some(v.iter().flat_map(|p| [p[0], p[1]]).collect()),
            MeshVertices::Weighted(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionAttachmentData {
    pub name: String,
    pub path: String,
    pub color: [f32; 4],
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub width: f32,
    pub height: f32,
}

impl RegionAttachmentData {
    /// Corner offsets in bone space: bottom-left, top-left, top-right, bottom-right.
    pub fn offsets(&self) -> [f32; 8] {
        let local_x = -self.width / 2.0 * self.scale_x;
        let local_y = -self.height / 2.0 * self.scale_y;
        let local_x2 = local_x + self.width * self.scale_x;
        let local_y2 = local_y + self.height * self.scale_y;
        let radians = self.rotation.to_radians();
        let (sin, cos) = radians.sin_cos();
        let local_x_cos = local_x * cos + self.x;
        let local_x_sin = local_x * sin;
        let local_y_cos = local_y * cos + self.y;
        let local_y_sin = local_y * sin;
        let local_x2_cos = local_x2 * cos + self.x;
        let local_x2_sin = local_x2 * sin;
        let local_y2_cos = local_y2 * cos + self.y;
        let local_y2_sin = local_y2 * sin;
        [
            local_x_cos - local_y_sin,
            local_y_cos + local_x_sin,
            local_x_cos - local_y2_sin,
            local_y2_cos + local_x_sin,
            local_x2_cos - local_y2_sin,
            local_y2_cos + local_x2_sin,
            local_x2_cos - local_y_sin,
            local_y_cos + local_x2_sin,
        ]
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshAttachmentData {
    pub vertex_id: u32,
    /// Id of the attachment whose deform keys drive this mesh. Equal to `vertex_id` unless this
    /// is a linked mesh inheriting deforms from its parent.
    pub deform_attachment_id: u32,
    pub name: String,
    pub path: String,
    pub color: [f32; 4],
    pub vertices: MeshVertices,
    pub uvs: Vec<[f32; 2]>,
    pub triangles: Vec<u32>,
    pub hull_length: usize,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointAttachmentData {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathAttachmentData {
    pub vertex_id: u32,
    pub name: String,
    /// Control points laid out as `in-handle, point, out-handle` per path point.
    pub vertices: MeshVertices,
    /// Cumulative length at the end of each curve.
    pub lengths: Vec<f32>,
    pub closed: bool,
    pub constant_speed: bool,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBoxAttachmentData {
    pub vertex_id: u32,
    pub name: String,
    pub vertices: MeshVertices,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClippingAttachmentData {
    pub vertex_id: u32,
    pub name: String,
    pub vertices: MeshVertices,
    pub end_slot: Option<usize>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttachmentData {
    Region(RegionAttachmentData),
    Mesh(MeshAttachmentData),
    BoundingBox(BoundingBoxAttachmentData),
    Path(PathAttachmentData),
    Point(PointAttachmentData),
    Clipping(ClippingAttachmentData),
}

impl AttachmentData {
    pub fn name(&self) -> &str {
        match self {
            AttachmentData::Region(a) => a.name.as_str(),
            AttachmentData::Mesh(a) => a.name.as_str(),
            AttachmentData::BoundingBox(a) => a.name.as_str(),
            AttachmentData::Path(a) => a.name.as_str(),
            AttachmentData::Point(a) => a.name.as_str(),
            AttachmentData::Clipping(a) => a.name.as_str(),
        }
    }

    /// Vertices of vertex attachments; `None` for regions and points.
    pub fn vertices(&self) -> Option<&MeshVertices> {
        match self {
            AttachmentData::Mesh(a) => Some(&a.vertices),
            AttachmentData::BoundingBox(a) => Some(&a.vertices),
            AttachmentData::Path(a) => Some(&a.vertices),
            AttachmentData::Clipping(a) => Some(&a.vertices),
            AttachmentData::Region(_) | AttachmentData::Point(_) => None,
        }
    }

    /// Id that deform timelines are keyed against.
    pub fn deform_attachment_id(&self) -> Option<u32> {
        match self {
            AttachmentData::Mesh(a) => Some(a.deform_attachment_id),
            AttachmentData::BoundingBox(a) => Some(a.vertex_id),
            AttachmentData::Path(a) => Some(a.vertex_id),
            AttachmentData::Clipping(a) => Some(a.vertex_id),
            AttachmentData::Region(_) | AttachmentData::Point(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkinData {
    pub name: String,
    /// Per slot index, attachment name to attachment.
    pub attachments: Vec<HashMap<String, AttachmentData>>,
    pub bones: Vec<usize>,
    pub ik_constraints: Vec<usize>,
    pub transform_constraints: Vec<usize>,
    pub path_constraints: Vec<usize>,
}

impl SkinData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attachment(&self, slot_index: usize, attachment_name: &str) -> Option<&AttachmentData> {
        self.attachments
            .get(slot_index)
            .and_then(|slot_map| slot_map.get(attachment_name))
    }

    pub fn set_attachment(
        &mut self,
        slot_index: usize,
        attachment_name: impl Into<String>,
        attachment: AttachmentData,
    ) {
        if self.attachments.len() <= slot_index {
            self.attachments.resize_with(slot_index + 1, HashMap::new);
        }
        self.attachments[slot_index].insert(attachment_name.into(), attachment);
    }

    pub fn remove_attachment(
        &mut self,
        slot_index: usize,
        attachment_name: &str,
    ) -> Option<AttachmentData> {
        self.attachments
            .get_mut(slot_index)
            .and_then(|slot_map| slot_map.remove(attachment_name))
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventData {
    pub name: String,
    pub int_value: i32,
    pub float_value: f32,
    pub string: String,
    pub audio_path: String,
    pub volume: f32,
    pub balance: f32,
}

/// An event fired by an event timeline.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub time: f32,
    pub name: String,
    pub int_value: i32,
    pub float_value: f32,
    pub string: String,
    pub audio_path: String,
    pub volume: f32,
    pub balance: f32,
}

impl Event {
    /// Event at `time` carrying the defaults of `data`.
    pub fn new(time: f32, data: &EventData) -> Self {
        Self {
            time,
            name: data.name.clone(),
            int_value: data.int_value,
            float_value: data.float_value,
            string: data.string.clone(),
            audio_path: data.audio_path.clone(),
            volume: data.volume,
            balance: data.balance,
        }
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkeletonData {
    pub name: String,
    pub bones: Vec<BoneData>,
    pub slots: Vec<SlotData>,
    pub skins: HashMap<String, SkinData>,
    pub events: HashMap<String, EventData>,
    pub animations: Vec<Animation>,
    pub animation_index: HashMap<String, usize>,
    pub ik_constraints: Vec<IkConstraintData>,
    pub transform_constraints: Vec<TransformConstraintData>,
    pub path_constraints: Vec<PathConstraintData>,
}

impl SkeletonData {
    pub fn animation(&self, name: &str) -> Option<(usize, &Animation)> {
        let index = *self.animation_index.get(name)?;
        Some((index, self.animations.get(index)?))
    }

    /// Appends an animation and indexes it by name.
    pub fn add_animation(&mut self, animation: Animation) -> usize {
        let index = self.animations.len();
        self.animation_index.insert(animation.name.clone(), index);
        self.animations.push(animation);
        index
    }

    pub fn skin(&self, name: &str) -> Option<&SkinData> {
        self.skins.get(name)
    }

    pub fn default_skin(&self) -> Option<&SkinData> {
        self.skins.get(DEFAULT_SKIN_NAME)
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn find_slot(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn find_ik_constraint(&self, name: &str) -> Option<usize> {
        self.ik_constraints.iter().position(|c| c.name == name)
    }

    pub fn find_transform_constraint(&self, name: &str) -> Option<usize> {
        self.transform_constraints.iter().position(|c| c.name == name)
    }

    pub fn find_path_constraint(&self, name: &str) -> Option<usize> {
        self.path_constraints.iter().position(|c| c.name == name)
    }
}
