//! Keyframe storage: interpolation curves, the closed set of timeline kinds and the
//! [`Animation`] that bundles them.
//!
//! Frames are packed flat, `time` first, `ENTRIES` floats per keyframe. Applying a timeline onto a
//! live skeleton lives in `runtime::animation`.

use crate::Event;
use std::collections::HashSet;

pub const CURVE_LINEAR: f32 = 0.0;
pub const CURVE_STEPPED: f32 = 1.0;
pub const CURVE_BEZIER: f32 = 2.0;
/// Floats per keyframe gap: the curve type followed by 9 sampled `(x, y)` points.
pub const BEZIER_SIZE: usize = 10 * 2 - 1;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CurveType {
    Linear,
    Stepped,
    Bezier,
}

/// Per-gap interpolation curves shared by every curved timeline.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Curves {
    frame_count: usize,
    curves: Vec<f32>,
}

impl Curves {
    /// Linear curves for `frame_count` keyframes.
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            curves: vec![CURVE_LINEAR; frame_count.saturating_sub(1) * BEZIER_SIZE],
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn set_linear(&mut self, frame_index: usize) {
        if let Some(slot) = self.curves.get_mut(frame_index * BEZIER_SIZE) {
            *slot = CURVE_LINEAR;
        }
    }

    pub fn set_stepped(&mut self, frame_index: usize) {
        if let Some(slot) = self.curves.get_mut(frame_index * BEZIER_SIZE) {
            *slot = CURVE_STEPPED;
        }
    }

    pub fn curve_type(&self, frame_index: usize) -> CurveType {
        let index = frame_index * BEZIER_SIZE;
        match self.curves.get(index).copied() {
            None => CurveType::Linear,
            Some(t) if t == CURVE_LINEAR => CurveType::Linear,
            Some(t) if t == CURVE_STEPPED => CurveType::Stepped,
            Some(_) => CurveType::Bezier,
        }
    }

    /// Sets a cubic Bezier between keyframe `frame_index` and the next. The control points are in
    /// the unit square; the curve is sampled with forward differencing.
    pub fn set_curve(&mut self, frame_index: usize, cx1: f32, cy1: f32, cx2: f32, cy2: f32) {
        let start = frame_index * BEZIER_SIZE;
        if start + BEZIER_SIZE > self.curves.len() {
            return;
        }

        let tmpx = (-cx1 * 2.0 + cx2) * 0.03;
        let tmpy = (-cy1 * 2.0 + cy2) * 0.03;
        let dddfx = ((cx1 - cx2) * 3.0 + 1.0) * 0.006;
        let dddfy = ((cy1 - cy2) * 3.0 + 1.0) * 0.006;
        let mut ddfx = tmpx * 2.0 + dddfx;
        let mut ddfy = tmpy * 2.0 + dddfy;
        let mut dfx = cx1 * 0.3 + tmpx + dddfx * 0.16666667;
        let mut dfy = cy1 * 0.3 + tmpy + dddfy * 0.16666667;

        let curves = &mut self.curves[start..start + BEZIER_SIZE];
        curves[0] = CURVE_BEZIER;
        let mut x = dfx;
        let mut y = dfy;
        for point in curves[1..].chunks_exact_mut(2) {
            point[0] = x;
            point[1] = y;
            dfx += ddfx;
            dfy += ddfy;
            ddfx += dddfx;
            ddfy += dddfy;
            x += dfx;
            y += dfy;
        }
    }

    /// Maps a linear time fraction between keyframe `frame_index` and the next to a mix percent.
    pub fn curve_percent(&self, frame_index: usize, percent: f32) -> f32 {
        let percent = percent.clamp(0.0, 1.0);
        let start = frame_index * BEZIER_SIZE;
        let Some(&kind) = self.curves.get(start) else {
            return percent;
        };
        if kind == CURVE_LINEAR {
            return percent;
        }
        if kind == CURVE_STEPPED {
            return 0.0;
        }

        let points = &self.curves[start + 1..start + BEZIER_SIZE];
        let mut prev_x = 0.0f32;
        let mut prev_y = 0.0f32;
        for point in points.chunks_exact(2) {
            let (x, y) = (point[0], point[1]);
            if x >= percent {
                let span = x - prev_x;
                if span <= 0.0 {
                    return y;
                }
                return prev_y + (y - prev_y) * (percent - prev_x) / span;
            }
            prev_x = x;
            prev_y = y;
        }
        let span = 1.0 - prev_x;
        if span <= 0.0 {
            return 1.0;
        }
        prev_y + (1.0 - prev_y) * (percent - prev_x) / span
    }
}

/// Offset of the first keyframe (stride `step`) whose time is greater than `target`, or
/// `values.len()` rounded down to a whole keyframe when none is.
pub fn binary_search(values: &[f32], target: f32, step: usize) -> usize {
    let count = values.len() / step;
    let mut low = 0usize;
    let mut high = count;
    while low < high {
        let mid = (low + high) / 2;
        if values[mid * step] <= target {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low * step
}

/// Linear-scan counterpart of [`binary_search`].
pub fn linear_search(values: &[f32], target: f32, step: usize) -> usize {
    let count = values.len() / step;
    (0..count)
        .map(|i| i * step)
        .find(|&i| values[i] > target)
        .unwrap_or(count * step)
}

/// Wraps an angle in degrees into (-180, 180].
pub fn wrap_degrees(degrees: f32) -> f32 {
    let r = f64::from(degrees);
    let wrapped = (r - f64::from(16384 - (16384.499999999996 - r / 360.0) as i32) * 360.0) as f32;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Discriminant used to build property ids.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum TimelineType {
    Rotate = 0,
    Translate,
    Scale,
    Shear,
    Attachment,
    Color,
    Deform,
    Event,
    DrawOrder,
    IkConstraint,
    TransformConstraint,
    PathConstraintPosition,
    PathConstraintSpacing,
    PathConstraintMix,
    TwoColor,
}

fn property_id(kind: TimelineType, index: u64) -> u64 {
    ((kind as u64) << 56) | index
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RotateTimeline {
    pub bone_index: usize,
    /// `time, degrees` per keyframe.
    pub frames: Vec<f32>,
    pub curves: Curves,
}

impl RotateTimeline {
    pub const ENTRIES: usize = 2;

    pub fn new(frame_count: usize, bone_index: usize) -> Self {
        Self {
            bone_index,
            frames: vec![0.0; frame_count * Self::ENTRIES],
            curves: Curves::new(frame_count),
        }
    }

    pub fn set_frame(&mut self, frame_index: usize, time: f32, degrees: f32) {
        let i = frame_index * Self::ENTRIES;
        self.frames[i] = time;
        self.frames[i + 1] = degrees;
    }
}

/// Two-value bone timeline used for translate, scale and shear.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2Timeline {
    pub bone_index: usize,
    /// `time, x, y` per keyframe.
    pub frames: Vec<f32>,
    pub curves: Curves,
}

impl Vec2Timeline {
    pub const ENTRIES: usize = 3;

    pub fn new(frame_count: usize, bone_index: usize) -> Self {
        Self {
            bone_index,
            frames: vec![0.0; frame_count * Self::ENTRIES],
            curves: Curves::new(frame_count),
        }
    }

    pub fn set_frame(&mut self, frame_index: usize, time: f32, x: f32, y: f32) {
        let i = frame_index * Self::ENTRIES;
        self.frames[i] = time;
        self.frames[i + 1] = x;
        self.frames[i + 2] = y;
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorTimeline {
    pub slot_index: usize,
    /// `time, r, g, b, a` per keyframe.
    pub frames: Vec<f32>,
    pub curves: Curves,
}

impl ColorTimeline {
    pub const ENTRIES: usize = 5;

    pub fn new(frame_count: usize, slot_index: usize) -> Self {
        Self {
            slot_index,
            frames: vec![0.0; frame_count * Self::ENTRIES],
            curves: Curves::new(frame_count),
        }
    }

    pub fn set_frame(&mut self, frame_index: usize, time: f32, color: [f32; 4]) {
        let i = frame_index * Self::ENTRIES;
        self.frames[i] = time;
        self.frames[i + 1..i + 5].copy_from_slice(&color);
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoColorTimeline {
    pub slot_index: usize,
    /// `time, r, g, b, a, r2, g2, b2` per keyframe.
    pub frames: Vec<f32>,
    pub curves: Curves,
}

impl TwoColorTimeline {
    pub const ENTRIES: usize = 8;

    pub fn new(frame_count: usize, slot_index: usize) -> Self {
        Self {
            slot_index,
            frames: vec![0.0; frame_count * Self::ENTRIES],
            curves: Curves::new(frame_count),
        }
    }

    pub fn set_frame(&mut self, frame_index: usize, time: f32, light: [f32; 4], dark: [f32; 3]) {
        let i = frame_index * Self::ENTRIES;
        self.frames[i] = time;
        self.frames[i + 1..i + 5].copy_from_slice(&light);
        self.frames[i + 5..i + 8].copy_from_slice(&dark);
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachmentTimeline {
    pub slot_index: usize,
    pub frames: Vec<f32>,
    pub attachment_names: Vec<Option<String>>,
}

impl AttachmentTimeline {
    pub fn new(frame_count: usize, slot_index: usize) -> Self {
        Self {
            slot_index,
            frames: vec![0.0; frame_count],
            attachment_names: vec![None; frame_count],
        }
    }

    pub fn set_frame(&mut self, frame_index: usize, time: f32, attachment_name: Option<&str>) {
        self.frames[frame_index] = time;
        self.attachment_names[frame_index] = attachment_name.map(str::to_string);
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeformTimeline {
    pub slot_index: usize,
    /// `vertex_id` of the attachment the keys were authored for.
    pub attachment_id: u32,
    pub frames: Vec<f32>,
    /// Per keyframe, a full deform buffer (absolute positions for unweighted vertices, offsets
    /// for weighted ones).
    pub frame_vertices: Vec<Vec<f32>>,
    pub curves: Curves,
}

impl DeformTimeline {
    pub fn new(frame_count: usize, slot_index: usize, attachment_id: u32) -> Self {
        Self {
            slot_index,
            attachment_id,
            frames: vec![0.0; frame_count],
            frame_vertices: vec![Vec::new(); frame_count],
            curves: Curves::new(frame_count),
        }
    }

    pub fn set_frame(&mut self, frame_index: usize, time: f32, vertices: Vec<f32>) {
        self.frames[frame_index] = time;
        self.frame_vertices[frame_index] = vertices;
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventTimeline {
    pub frames: Vec<f32>,
    pub events: Vec<Event>,
}

impl EventTimeline {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frames: Vec::with_capacity(frame_count),
            events: Vec::with_capacity(frame_count),
        }
    }

    /// Appends an event keyed at its own time. Events must be pushed in time order.
    pub fn push(&mut self, event: Event) {
        self.frames.push(event.time);
        self.events.push(event);
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawOrderTimeline {
    pub frames: Vec<f32>,
    /// Per keyframe, draw order index to slot index; `None` restores the setup order.
    pub draw_orders: Vec<Option<Vec<usize>>>,
}

impl DrawOrderTimeline {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frames: vec![0.0; frame_count],
            draw_orders: vec![None; frame_count],
        }
    }

    pub fn set_frame(&mut self, frame_index: usize, time: f32, draw_order: Option<Vec<usize>>) {
        self.frames[frame_index] = time;
        self.draw_orders[frame_index] = draw_order;
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IkConstraintTimeline {
    pub ik_constraint_index: usize,
    /// `time, mix, softness, bend_direction, compress, stretch` per keyframe.
    pub frames: Vec<f32>,
    pub curves: Curves,
}

impl IkConstraintTimeline {
    pub const ENTRIES: usize = 6;

    pub fn new(frame_count: usize, ik_constraint_index: usize) -> Self {
        Self {
            ik_constraint_index,
            frames: vec![0.0; frame_count * Self::ENTRIES],
            curves: Curves::new(frame_count),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_frame(
        &mut self,
        frame_index: usize,
        time: f32,
        mix: f32,
        softness: f32,
        bend_direction: i32,
        compress: bool,
        stretch: bool,
    ) {
        let i = frame_index * Self::ENTRIES;
        self.frames[i] = time;
        self.frames[i + 1] = mix;
        self.frames[i + 2] = softness;
        self.frames[i + 3] = bend_direction as f32;
        self.frames[i + 4] = if compress { 1.0 } else { 0.0 };
        self.frames[i + 5] = if stretch { 1.0 } else { 0.0 };
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformConstraintTimeline {
    pub transform_constraint_index: usize,
    /// `time, rotate, translate, scale, shear` mixes per keyframe.
    pub frames: Vec<f32>,
    pub curves: Curves,
}

impl TransformConstraintTimeline {
    pub const ENTRIES: usize = 5;

    pub fn new(frame_count: usize, transform_constraint_index: usize) -> Self {
        Self {
            transform_constraint_index,
            frames: vec![0.0; frame_count * Self::ENTRIES],
            curves: Curves::new(frame_count),
        }
    }

    pub fn set_frame(
        &mut self,
        frame_index: usize,
        time: f32,
        rotate_mix: f32,
        translate_mix: f32,
        scale_mix: f32,
        shear_mix: f32,
    ) {
        let i = frame_index * Self::ENTRIES;
        self.frames[i] = time;
        self.frames[i + 1] = rotate_mix;
        self.frames[i + 2] = translate_mix;
        self.frames[i + 3] = scale_mix;
        self.frames[i + 4] = shear_mix;
    }
}

/// Single-value path constraint timeline used for position and spacing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathConstraintValueTimeline {
    pub path_constraint_index: usize,
    pub frames: Vec<f32>,
    pub curves: Curves,
}

impl PathConstraintValueTimeline {
    pub const ENTRIES: usize = 2;

    pub fn new(frame_count: usize, path_constraint_index: usize) -> Self {
        Self {
            path_constraint_index,
            frames: vec![0.0; frame_count * Self::ENTRIES],
            curves: Curves::new(frame_count),
        }
    }

    pub fn set_frame(&mut self, frame_index: usize, time: f32, value: f32) {
        let i = frame_index * Self::ENTRIES;
        self.frames[i] = time;
        self.frames[i + 1] = value;
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathConstraintMixTimeline {
    pub path_constraint_index: usize,
    /// `time, rotate_mix, translate_mix` per keyframe.
    pub frames: Vec<f32>,
    pub curves: Curves,
}

impl PathConstraintMixTimeline {
    pub const ENTRIES: usize = 3;

    pub fn new(frame_count: usize, path_constraint_index: usize) -> Self {
        Self {
            path_constraint_index,
            frames: vec![0.0; frame_count * Self::ENTRIES],
            curves: Curves::new(frame_count),
        }
    }

    pub fn set_frame(&mut self, frame_index: usize, time: f32, rotate_mix: f32, translate_mix: f32) {
        let i = frame_index * Self::ENTRIES;
        self.frames[i] = time;
        self.frames[i + 1] = rotate_mix;
        self.frames[i + 2] = translate_mix;
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timeline {
    Rotate(RotateTimeline),
    Translate(Vec2Timeline),
    Scale(Vec2Timeline),
    Shear(Vec2Timeline),
    Color(ColorTimeline),
    TwoColor(TwoColorTimeline),
    Attachment(AttachmentTimeline),
    Deform(DeformTimeline),
    Event(EventTimeline),
    DrawOrder(DrawOrderTimeline),
    IkConstraint(IkConstraintTimeline),
    TransformConstraint(TransformConstraintTimeline),
    PathConstraintPosition(PathConstraintValueTimeline),
    PathConstraintSpacing(PathConstraintValueTimeline),
    PathConstraintMix(PathConstraintMixTimeline),
}

impl Timeline {
    pub fn timeline_type(&self) -> TimelineType {
        match self {
            Timeline::Rotate(_) => TimelineType::Rotate,
            Timeline::Translate(_) => TimelineType::Translate,
            Timeline::Scale(_) => TimelineType::Scale,
            Timeline::Shear(_) => TimelineType::Shear,
            Timeline::Color(_) => TimelineType::Color,
            Timeline::TwoColor(_) => TimelineType::TwoColor,
            Timeline::Attachment(_) => TimelineType::Attachment,
            Timeline::Deform(_) => TimelineType::Deform,
            Timeline::Event(_) => TimelineType::Event,
            Timeline::DrawOrder(_) => TimelineType::DrawOrder,
            Timeline::IkConstraint(_) => TimelineType::IkConstraint,
            Timeline::TransformConstraint(_) => TimelineType::TransformConstraint,
            Timeline::PathConstraintPosition(_) => TimelineType::PathConstraintPosition,
            Timeline::PathConstraintSpacing(_) => TimelineType::PathConstraintSpacing,
            Timeline::PathConstraintMix(_) => TimelineType::PathConstraintMix,
        }
    }

    /// Identity of the animated property; two timelines with the same id fight over one value.
    pub fn property_id(&self) -> u64 {
        let kind = self.timeline_type();
        let index = match self {
            Timeline::Rotate(t) => t.bone_index as u64,
            Timeline::Translate(t) | Timeline::Scale(t) | Timeline::Shear(t) => t.bone_index as u64,
            Timeline::Color(t) => t.slot_index as u64,
            Timeline::TwoColor(t) => t.slot_index as u64,
            Timeline::Attachment(t) => t.slot_index as u64,
            Timeline::Deform(t) => ((t.slot_index as u64) << 32) | u64::from(t.attachment_id),
            Timeline::Event(_) | Timeline::DrawOrder(_) => 0,
            Timeline::IkConstraint(t) => t.ik_constraint_index as u64,
            Timeline::TransformConstraint(t) => t.transform_constraint_index as u64,
            Timeline::PathConstraintPosition(t) | Timeline::PathConstraintSpacing(t) => {
                t.path_constraint_index as u64
            }
            Timeline::PathConstraintMix(t) => t.path_constraint_index as u64,
        };
        property_id(kind, index)
    }

    /// Flat keyframe buffer; the first float of each keyframe is its time.
    pub fn frames(&self) -> &[f32] {
        match self {
            Timeline::Rotate(t) => &t.frames,
            Timeline::Translate(t) | Timeline::Scale(t) | Timeline::Shear(t) => &t.frames,
            Timeline::Color(t) => &t.frames,
            Timeline::TwoColor(t) => &t.frames,
            Timeline::Attachment(t) => &t.frames,
            Timeline::Deform(t) => &t.frames,
            Timeline::Event(t) => &t.frames,
            Timeline::DrawOrder(t) => &t.frames,
            Timeline::IkConstraint(t) => &t.frames,
            Timeline::TransformConstraint(t) => &t.frames,
            Timeline::PathConstraintPosition(t) | Timeline::PathConstraintSpacing(t) => &t.frames,
            Timeline::PathConstraintMix(t) => &t.frames,
        }
    }

    pub fn frame_entries(&self) -> usize {
        match self {
            Timeline::Rotate(_) => RotateTimeline::ENTRIES,
            Timeline::Translate(_) | Timeline::Scale(_) | Timeline::Shear(_) => {
                Vec2Timeline::ENTRIES
            }
            Timeline::Color(_) => ColorTimeline::ENTRIES,
            Timeline::TwoColor(_) => TwoColorTimeline::ENTRIES,
            Timeline::IkConstraint(_) => IkConstraintTimeline::ENTRIES,
            Timeline::TransformConstraint(_) => TransformConstraintTimeline::ENTRIES,
            Timeline::PathConstraintPosition(_) | Timeline::PathConstraintSpacing(_) => {
                PathConstraintValueTimeline::ENTRIES
            }
            Timeline::PathConstraintMix(_) => PathConstraintMixTimeline::ENTRIES,
            Timeline::Attachment(_)
            | Timeline::Deform(_)
            | Timeline::Event(_)
            | Timeline::DrawOrder(_) => 1,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames().len() / self.frame_entries()
    }

    /// Time of the last keyframe, 0 for an empty timeline.
    pub fn last_frame_time(&self) -> f32 {
        let frames = self.frames();
        let entries = self.frame_entries();
        if frames.len() < entries {
            return 0.0;
        }
        frames[frames.len() - entries]
    }
}

/// A named, immutable bundle of timelines.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "AnimationParts", into = "AnimationParts")
)]
pub struct Animation {
    pub name: String,
    pub duration: f32,
    timelines: Vec<Timeline>,
    property_ids: HashSet<u64>,
}

impl Animation {
    pub fn new(name: impl Into<String>, timelines: Vec<Timeline>, duration: f32) -> Self {
        let property_ids = timelines.iter().map(Timeline::property_id).collect();
        Self {
            name: name.into(),
            duration,
            timelines,
            property_ids,
        }
    }

    /// Builds an animation whose duration is the last keyframe time across its timelines.
    pub fn from_timelines(name: impl Into<String>, timelines: Vec<Timeline>) -> Self {
        let duration = timelines
            .iter()
            .map(Timeline::last_frame_time)
            .fold(0.0f32, f32::max);
        Self::new(name, timelines, duration)
    }

    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    pub fn has_timeline(&self, property_id: u64) -> bool {
        self.property_ids.contains(&property_id)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct AnimationParts {
    name: String,
    duration: f32,
    timelines: Vec<Timeline>,
}

#[cfg(feature = "serde")]
impl From<AnimationParts> for Animation {
    fn from(parts: AnimationParts) -> Self {
        Animation::new(parts.name, parts.timelines, parts.duration)
    }
}

#[cfg(feature = "serde")]
impl From<Animation> for AnimationParts {
    fn from(animation: Animation) -> Self {
        AnimationParts {
            name: animation.name,
            duration: animation.duration,
            timelines: animation.timelines,
        }
    }
}
