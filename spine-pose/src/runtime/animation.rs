//! Applying keyframed timelines onto a live [`Skeleton`].

use crate::runtime::skeleton::resolve_slot_attachment;
use crate::{
    binary_search, wrap_degrees, Animation, AttachmentTimeline, ColorTimeline, Curves,
    DeformTimeline, DrawOrderTimeline, Event, EventTimeline, IkConstraintTimeline, MeshVertices,
    PathConstraintMixTimeline, PathConstraintValueTimeline, RotateTimeline, Skeleton, Timeline,
    TransformConstraintTimeline, TwoColorTimeline, Vec2Timeline,
};
use std::sync::Arc;

/// How a timeline's value combines with the current pose.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MixBlend {
    /// Start from the setup pose, then mix toward the timeline value by alpha.
    Setup,
    /// Like `Replace`, but before the first key the pose mixes toward setup.
    First,
    Replace,
    /// Add the timeline's offset from setup, scaled by alpha.
    Add,
}

/// Whether the animation is being mixed in or out. Discrete timelines and sign-aware scale use it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MixDirection {
    In,
    Out,
}

impl Animation {
    /// Applies every timeline at `time`. Events keyed in `(last_time, time]` are pushed onto
    /// `events` when given. Looping animations wrap both times into the duration first.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        skeleton: &mut Skeleton,
        mut last_time: f32,
        mut time: f32,
        looped: bool,
        mut events: Option<&mut Vec<Event>>,
        alpha: f32,
        blend: MixBlend,
        direction: MixDirection,
    ) {
        if looped && self.duration != 0.0 {
            time %= self.duration;
            if last_time > 0.0 {
                last_time %= self.duration;
            }
        }
        for timeline in self.timelines() {
            timeline.apply(
                skeleton,
                last_time,
                time,
                events.as_deref_mut(),
                alpha,
                blend,
                direction,
            );
        }
    }
}

impl Timeline {
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        skeleton: &mut Skeleton,
        last_time: f32,
        time: f32,
        events: Option<&mut Vec<Event>>,
        alpha: f32,
        blend: MixBlend,
        direction: MixDirection,
    ) {
        if self.frames().is_empty() {
            return;
        }
        match self {
            Timeline::Rotate(t) => apply_rotate(t, skeleton, time, alpha, blend),
            Timeline::Translate(t) => apply_translate(t, skeleton, time, alpha, blend),
            Timeline::Scale(t) => apply_scale(t, skeleton, time, alpha, blend, direction),
            Timeline::Shear(t) => apply_shear(t, skeleton, time, alpha, blend),
            Timeline::Color(t) => apply_color(t, skeleton, time, alpha, blend),
            Timeline::TwoColor(t) => apply_two_color(t, skeleton, time, alpha, blend),
            Timeline::Attachment(t) => apply_attachment(t, skeleton, time, blend, direction),
            Timeline::Deform(t) => apply_deform(t, skeleton, time, alpha, blend),
            Timeline::Event(t) => {
                if let Some(events) = events {
                    collect_events(t, last_time, time, events);
                }
            }
            Timeline::DrawOrder(t) => apply_draw_order(t, skeleton, time, blend, direction),
            Timeline::IkConstraint(t) => {
                apply_ik_constraint(t, skeleton, time, alpha, blend, direction)
            }
            Timeline::TransformConstraint(t) => {
                apply_transform_constraint(t, skeleton, time, alpha, blend)
            }
            Timeline::PathConstraintPosition(t) => {
                apply_path_position(t, skeleton, time, alpha, blend)
            }
            Timeline::PathConstraintSpacing(t) => apply_path_spacing(t, skeleton, time, alpha, blend),
            Timeline::PathConstraintMix(t) => apply_path_mix(t, skeleton, time, alpha, blend),
        }
    }
}

/// Locates the keyframe pair around `time`. Returns the offset of the later keyframe and the eased
/// percent from the earlier one, or `None` when `time` is at or past the last keyframe.
pub(crate) fn bracket(frames: &[f32], curves: &Curves, entries: usize, time: f32) -> Option<(usize, f32)> {
    if time >= frames[frames.len() - entries] {
        return None;
    }
    let frame = binary_search(frames, time, entries);
    let frame_time = frames[frame];
    let prev_time = frames[frame - entries];
    let percent = curves.curve_percent(
        frame / entries - 1,
        1.0 - (time - frame_time) / (prev_time - frame_time),
    );
    Some((frame, percent))
}

/// Samples `N` interpolated values following each keyframe's time.
fn sample<const N: usize>(frames: &[f32], curves: &Curves, entries: usize, time: f32) -> [f32; N] {
    let mut out = [0.0f32; N];
    match bracket(frames, curves, entries, time) {
        None => {
            let last = frames.len() - entries;
            out.copy_from_slice(&frames[last + 1..last + 1 + N]);
        }
        Some((frame, percent)) => {
            let prev = frame - entries;
            for (k, value) in out.iter_mut().enumerate() {
                let a = frames[prev + 1 + k];
                *value = a + (frames[frame + 1 + k] - a) * percent;
            }
        }
    }
    out
}

pub(crate) fn apply_rotate(
    timeline: &RotateTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
) {
    let setup = skeleton.data.bones[timeline.bone_index].rotation;
    let bone = &mut skeleton.bones[timeline.bone_index];
    if !bone.active {
        return;
    }
    let frames = &timeline.frames;

    if time < frames[0] {
        match blend {
            MixBlend::Setup => bone.rotation = setup,
            MixBlend::First => bone.rotation += (setup - bone.rotation) * alpha,
            MixBlend::Replace | MixBlend::Add => {}
        }
        return;
    }

    let Some((frame, percent)) = bracket(frames, &timeline.curves, RotateTimeline::ENTRIES, time)
    else {
        let mut r = frames[frames.len() - 1];
        match blend {
            MixBlend::Setup => bone.rotation = setup + r * alpha,
            MixBlend::First | MixBlend::Replace => {
                r = wrap_degrees(r + setup - bone.rotation);
                bone.rotation += r * alpha;
            }
            MixBlend::Add => bone.rotation += r * alpha,
        }
        return;
    };

    let prev = frames[frame - 1];
    let mut r = prev + wrap_degrees(frames[frame + 1] - prev) * percent;
    match blend {
        MixBlend::Setup => bone.rotation = setup + wrap_degrees(r) * alpha,
        MixBlend::First | MixBlend::Replace => {
            r += setup - bone.rotation;
            bone.rotation += wrap_degrees(r) * alpha;
        }
        MixBlend::Add => bone.rotation += wrap_degrees(r) * alpha,
    }
}

pub(crate) fn apply_translate(
    timeline: &Vec2Timeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
) {
    let data = &skeleton.data.bones[timeline.bone_index];
    let (setup_x, setup_y) = (data.x, data.y);
    let bone = &mut skeleton.bones[timeline.bone_index];
    if !bone.active {
        return;
    }

    if time < timeline.frames[0] {
        match blend {
            MixBlend::Setup => {
                bone.x = setup_x;
                bone.y = setup_y;
            }
            MixBlend::First => {
                bone.x += (setup_x - bone.x) * alpha;
                bone.y += (setup_y - bone.y) * alpha;
            }
            MixBlend::Replace | MixBlend::Add => {}
        }
        return;
    }

    let [x, y] = sample::<2>(&timeline.frames, &timeline.curves, Vec2Timeline::ENTRIES, time);
    match blend {
        MixBlend::Setup => {
            bone.x = setup_x + x * alpha;
            bone.y = setup_y + y * alpha;
        }
        MixBlend::First | MixBlend::Replace => {
            bone.x += (setup_x + x - bone.x) * alpha;
            bone.y += (setup_y + y - bone.y) * alpha;
        }
        MixBlend::Add => {
            bone.x += x * alpha;
            bone.y += y * alpha;
        }
    }
}

pub(crate) fn apply_shear(
    timeline: &Vec2Timeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
) {
    let data = &skeleton.data.bones[timeline.bone_index];
    let (setup_x, setup_y) = (data.shear_x, data.shear_y);
    let bone = &mut skeleton.bones[timeline.bone_index];
    if !bone.active {
        return;
    }

    if time < timeline.frames[0] {
        match blend {
            MixBlend::Setup => {
                bone.shear_x = setup_x;
                bone.shear_y = setup_y;
            }
            MixBlend::First => {
                bone.shear_x += (setup_x - bone.shear_x) * alpha;
                bone.shear_y += (setup_y - bone.shear_y) * alpha;
            }
            MixBlend::Replace | MixBlend::Add => {}
        }
        return;
    }

    let [x, y] = sample::<2>(&timeline.frames, &timeline.curves, Vec2Timeline::ENTRIES, time);
    match blend {
        MixBlend::Setup => {
            bone.shear_x = setup_x + x * alpha;
            bone.shear_y = setup_y + y * alpha;
        }
        MixBlend::First | MixBlend::Replace => {
            bone.shear_x += (setup_x + x - bone.shear_x) * alpha;
            bone.shear_y += (setup_y + y - bone.shear_y) * alpha;
        }
        MixBlend::Add => {
            bone.shear_x += x * alpha;
            bone.shear_y += y * alpha;
        }
    }
}

pub(crate) fn signum(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub(crate) fn apply_scale(
    timeline: &Vec2Timeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
    direction: MixDirection,
) {
    let data = &skeleton.data.bones[timeline.bone_index];
    let (setup_x, setup_y) = (data.scale_x, data.scale_y);
    let bone = &mut skeleton.bones[timeline.bone_index];
    if !bone.active {
        return;
    }

    if time < timeline.frames[0] {
        match blend {
            MixBlend::Setup => {
                bone.scale_x = setup_x;
                bone.scale_y = setup_y;
            }
            MixBlend::First => {
                bone.scale_x += (setup_x - bone.scale_x) * alpha;
                bone.scale_y += (setup_y - bone.scale_y) * alpha;
            }
            MixBlend::Replace | MixBlend::Add => {}
        }
        return;
    }

    let [mx, my] = sample::<2>(&timeline.frames, &timeline.curves, Vec2Timeline::ENTRIES, time);
    let x = mx * setup_x;
    let y = my * setup_y;

    if alpha == 1.0 {
        if blend == MixBlend::Add {
            bone.scale_x += x - setup_x;
            bone.scale_y += y - setup_y;
        } else {
            bone.scale_x = x;
            bone.scale_y = y;
        }
        return;
    }

    // Mixing keeps the sign of the pose being mixed from so reflection flips instead of collapsing.
    match (direction, blend) {
        (_, MixBlend::Add) => {
            bone.scale_x += (x - setup_x) * alpha;
            bone.scale_y += (y - setup_y) * alpha;
        }
        (MixDirection::Out, MixBlend::Setup) => {
            bone.scale_x = setup_x + (x.abs() * signum(setup_x) - setup_x) * alpha;
            bone.scale_y = setup_y + (y.abs() * signum(setup_y) - setup_y) * alpha;
        }
        (MixDirection::Out, MixBlend::First | MixBlend::Replace) => {
            let (bx, by) = (bone.scale_x, bone.scale_y);
            bone.scale_x = bx + (x.abs() * signum(bx) - bx) * alpha;
            bone.scale_y = by + (y.abs() * signum(by) - by) * alpha;
        }
        (MixDirection::In, MixBlend::Setup) => {
            let bx = setup_x.abs() * signum(x);
            let by = setup_y.abs() * signum(y);
            bone.scale_x = bx + (x - bx) * alpha;
            bone.scale_y = by + (y - by) * alpha;
        }
        (MixDirection::In, MixBlend::First | MixBlend::Replace) => {
            let bx = bone.scale_x.abs() * signum(x);
            let by = bone.scale_y.abs() * signum(y);
            bone.scale_x = bx + (x - bx) * alpha;
            bone.scale_y = by + (y - by) * alpha;
        }
    }
}

fn add_clamped<const N: usize>(color: &mut [f32; N], target: &[f32], alpha: f32) {
    for (c, t) in color.iter_mut().zip(target) {
        *c = (*c + (t - *c) * alpha).clamp(0.0, 1.0);
    }
}

pub(crate) fn apply_color(
    timeline: &ColorTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
) {
    let setup = skeleton.data.slots[timeline.slot_index].color;
    let slot = &mut skeleton.slots[timeline.slot_index];
    if !skeleton.bones[slot.bone].active {
        return;
    }

    if time < timeline.frames[0] {
        match blend {
            MixBlend::Setup => slot.color = setup,
            MixBlend::First => add_clamped(&mut slot.color, &setup, alpha),
            MixBlend::Replace | MixBlend::Add => {}
        }
        return;
    }

    let rgba = sample::<4>(&timeline.frames, &timeline.curves, ColorTimeline::ENTRIES, time);
    if alpha == 1.0 {
        slot.color = rgba;
        return;
    }
    if blend == MixBlend::Setup {
        slot.color = setup;
    }
    add_clamped(&mut slot.color, &rgba, alpha);
}

pub(crate) fn apply_two_color(
    timeline: &TwoColorTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
) {
    let slot_data = &skeleton.data.slots[timeline.slot_index];
    let setup_light = slot_data.color;
    let setup_dark = slot_data.dark_color.unwrap_or([0.0; 3]);
    let slot = &mut skeleton.slots[timeline.slot_index];
    if !skeleton.bones[slot.bone].active {
        return;
    }
    let light = &mut slot.color;
    let dark = slot.dark_color.get_or_insert(setup_dark);

    if time < timeline.frames[0] {
        match blend {
            MixBlend::Setup => {
                *light = setup_light;
                *dark = setup_dark;
            }
            MixBlend::First => {
                add_clamped(light, &setup_light, alpha);
                add_clamped(dark, &setup_dark, alpha);
            }
            MixBlend::Replace | MixBlend::Add => {}
        }
        return;
    }

    let v = sample::<7>(&timeline.frames, &timeline.curves, TwoColorTimeline::ENTRIES, time);
    if alpha == 1.0 {
        light.copy_from_slice(&v[..4]);
        dark.copy_from_slice(&v[4..]);
        return;
    }
    if blend == MixBlend::Setup {
        *light = setup_light;
        *dark = setup_dark;
    }
    add_clamped(light, &v[..4], alpha);
    add_clamped(dark, &v[4..], alpha);
}

/// Index of the discrete keyframe in effect at `time`, which must not precede the first key.
pub(crate) fn discrete_frame(frames: &[f32], time: f32) -> usize {
    if time >= frames[frames.len() - 1] {
        frames.len() - 1
    } else {
        binary_search(frames, time, 1) - 1
    }
}

pub(crate) fn apply_attachment(
    timeline: &AttachmentTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    blend: MixBlend,
    direction: MixDirection,
) {
    let slot_index = timeline.slot_index;
    if !skeleton.bones[skeleton.slots[slot_index].bone].active {
        return;
    }
    let data = Arc::clone(&skeleton.data);
    let setup = data.slots[slot_index].attachment.as_deref();

    if direction == MixDirection::Out {
        if blend == MixBlend::Setup {
            skeleton.set_slot_attachment(slot_index, setup);
        }
        return;
    }
    if time < timeline.frames[0] {
        if matches!(blend, MixBlend::Setup | MixBlend::First) {
            skeleton.set_slot_attachment(slot_index, setup);
        }
        return;
    }
    let frame = discrete_frame(&timeline.frames, time);
    skeleton.set_slot_attachment(slot_index, timeline.attachment_names[frame].as_deref());
}

pub(crate) fn apply_deform(
    timeline: &DeformTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    mut blend: MixBlend,
) {
    let slot_index = timeline.slot_index;
    if !skeleton.bones[skeleton.slots[slot_index].bone].active {
        return;
    }
    let data = Arc::clone(&skeleton.data);
    let Some(attachment) = resolve_slot_attachment(&data, &skeleton.slots[slot_index], slot_index)
    else {
        return;
    };
    if attachment.deform_attachment_id() != Some(timeline.attachment_id) {
        return;
    }
    let Some(vertices) = attachment.vertices() else {
        return;
    };
    // Unweighted vertices blend against the authored positions, weighted ones against zero offsets.
    let setup: Option<&[f32]> = match vertices {
        MeshVertices::Unweighted(v) => Some(v.as_flattened()),
        MeshVertices::Weighted(_) => None,
    };

    let deform = &mut skeleton.slots[slot_index].deform;
    if deform.is_empty() {
        blend = MixBlend::Setup;
    }
    let frames = &timeline.frames;
    let frame_vertices = &timeline.frame_vertices;
    let vertex_count = frame_vertices[0].len();

    if time < frames[0] {
        match blend {
            MixBlend::Setup => deform.clear(),
            MixBlend::First => {
                if alpha == 1.0 {
                    deform.clear();
                    return;
                }
                deform.resize(vertex_count, 0.0);
                match setup {
                    Some(setup) => {
                        for (d, s) in deform.iter_mut().zip(setup) {
                            *d += (s - *d) * alpha;
                        }
                    }
                    None => {
                        let keep = 1.0 - alpha;
                        for d in deform.iter_mut() {
                            *d *= keep;
                        }
                    }
                }
            }
            MixBlend::Replace | MixBlend::Add => {}
        }
        return;
    }

    deform.resize(vertex_count, 0.0);
    let setup_at = |i: usize| setup.and_then(|s| s.get(i).copied()).unwrap_or(0.0);

    let (prev, next, percent) = match bracket(frames, &timeline.curves, 1, time) {
        None => {
            let last = &frame_vertices[frames.len() - 1];
            (last, last, 0.0)
        }
        Some((frame, percent)) => (&frame_vertices[frame - 1], &frame_vertices[frame], percent),
    };
    let sampled = |i: usize| prev[i] + (next[i] - prev[i]) * percent;

    if alpha == 1.0 {
        if blend == MixBlend::Add {
            for (i, d) in deform.iter_mut().enumerate() {
                *d += sampled(i) - setup_at(i);
            }
        } else {
            for (i, d) in deform.iter_mut().enumerate() {
                *d = sampled(i);
            }
        }
        return;
    }

    match blend {
        MixBlend::Setup => {
            for (i, d) in deform.iter_mut().enumerate() {
                let s = setup_at(i);
                *d = s + (sampled(i) - s) * alpha;
            }
        }
        MixBlend::First | MixBlend::Replace => {
            for (i, d) in deform.iter_mut().enumerate() {
                *d += (sampled(i) - *d) * alpha;
            }
        }
        MixBlend::Add => {
            for (i, d) in deform.iter_mut().enumerate() {
                *d += (sampled(i) - setup_at(i)) * alpha;
            }
        }
    }
}

/// Pushes events keyed in `(last_time, time]`. When `last_time > time` the animation looped:
/// events after `last_time` fire first, then those from the start up to `time`.
pub(crate) fn collect_events(
    timeline: &EventTimeline,
    mut last_time: f32,
    time: f32,
    out: &mut Vec<Event>,
) {
    let frames = &timeline.frames;
    let frame_count = frames.len();

    if last_time > time {
        collect_events(timeline, last_time, f32::MAX, out);
        last_time = -1.0;
    } else if last_time >= frames[frame_count - 1] {
        return;
    }
    if time < frames[0] {
        return;
    }

    let mut frame = if last_time < frames[0] {
        0
    } else {
        let mut frame = binary_search(frames, last_time, 1);
        if frame < frame_count {
            let frame_time = frames[frame];
            while frame > 0 && frames[frame - 1] == frame_time {
                frame -= 1;
            }
        }
        frame
    };
    while frame < frame_count && time >= frames[frame] {
        out.push(timeline.events[frame].clone());
        frame += 1;
    }
}

pub(crate) fn apply_draw_order(
    timeline: &DrawOrderTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    blend: MixBlend,
    direction: MixDirection,
) {
    let setup = |skeleton: &mut Skeleton| {
        let count = skeleton.slots.len();
        skeleton.draw_order.clear();
        skeleton.draw_order.extend(0..count);
    };

    if direction == MixDirection::Out {
        if blend == MixBlend::Setup {
            setup(skeleton);
        }
        return;
    }
    if time < timeline.frames[0] {
        if matches!(blend, MixBlend::Setup | MixBlend::First) {
            setup(skeleton);
        }
        return;
    }

    match &timeline.draw_orders[discrete_frame(&timeline.frames, time)] {
        None => setup(skeleton),
        Some(order) => {
            skeleton.draw_order.clear();
            skeleton.draw_order.extend_from_slice(order);
        }
    }
}

pub(crate) fn apply_ik_constraint(
    timeline: &IkConstraintTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
    direction: MixDirection,
) {
    let data = &skeleton.data.ik_constraints[timeline.ik_constraint_index];
    let constraint = &mut skeleton.ik_constraints[timeline.ik_constraint_index];
    if !constraint.active {
        return;
    }
    let frames = &timeline.frames;

    if time < frames[0] {
        match blend {
            MixBlend::Setup => constraint.set_to_setup_pose(data),
            MixBlend::First => {
                constraint.mix += (data.mix - constraint.mix) * alpha;
                constraint.softness += (data.softness - constraint.softness) * alpha;
                constraint.bend_direction = data.bend_direction;
                constraint.compress = data.compress;
                constraint.stretch = data.stretch;
            }
            MixBlend::Replace | MixBlend::Add => {}
        }
        return;
    }

    let entries = IkConstraintTimeline::ENTRIES;
    let [mix, softness] = sample::<2>(frames, &timeline.curves, entries, time);
    // Discrete values come from the keyframe at or before `time`.
    let key = match bracket(frames, &timeline.curves, entries, time) {
        None => frames.len() - entries,
        Some((frame, _)) => frame - entries,
    };
    let bend_direction = frames[key + 3] as i32;
    let compress = frames[key + 4] != 0.0;
    let stretch = frames[key + 5] != 0.0;

    if blend == MixBlend::Setup {
        constraint.mix = data.mix + (mix - data.mix) * alpha;
        constraint.softness = data.softness + (softness - data.softness) * alpha;
        if direction == MixDirection::Out {
            constraint.bend_direction = data.bend_direction;
            constraint.compress = data.compress;
            constraint.stretch = data.stretch;
        } else {
            constraint.bend_direction = bend_direction;
            constraint.compress = compress;
            constraint.stretch = stretch;
        }
    } else {
        constraint.mix += (mix - constraint.mix) * alpha;
        constraint.softness += (softness - constraint.softness) * alpha;
        if direction == MixDirection::In {
            constraint.bend_direction = bend_direction;
            constraint.compress = compress;
            constraint.stretch = stretch;
        }
    }
}

pub(crate) fn apply_transform_constraint(
    timeline: &TransformConstraintTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
) {
    let data = &skeleton.data.transform_constraints[timeline.transform_constraint_index];
    let constraint = &mut skeleton.transform_constraints[timeline.transform_constraint_index];
    if !constraint.active {
        return;
    }

    if time < timeline.frames[0] {
        match blend {
            MixBlend::Setup => constraint.set_to_setup_pose(data),
            MixBlend::First => {
                constraint.rotate_mix += (data.rotate_mix - constraint.rotate_mix) * alpha;
                constraint.translate_mix += (data.translate_mix - constraint.translate_mix) * alpha;
                constraint.scale_mix += (data.scale_mix - constraint.scale_mix) * alpha;
                constraint.shear_mix += (data.shear_mix - constraint.shear_mix) * alpha;
            }
            MixBlend::Replace | MixBlend::Add => {}
        }
        return;
    }

    let [rotate, translate, scale, shear] = sample::<4>(
        &timeline.frames,
        &timeline.curves,
        TransformConstraintTimeline::ENTRIES,
        time,
    );
    if blend == MixBlend::Setup {
        constraint.rotate_mix = data.rotate_mix + (rotate - data.rotate_mix) * alpha;
        constraint.translate_mix = data.translate_mix + (translate - data.translate_mix) * alpha;
        constraint.scale_mix = data.scale_mix + (scale - data.scale_mix) * alpha;
        constraint.shear_mix = data.shear_mix + (shear - data.shear_mix) * alpha;
    } else {
        constraint.rotate_mix += (rotate - constraint.rotate_mix) * alpha;
        constraint.translate_mix += (translate - constraint.translate_mix) * alpha;
        constraint.scale_mix += (scale - constraint.scale_mix) * alpha;
        constraint.shear_mix += (shear - constraint.shear_mix) * alpha;
    }
}

/// Shared blend for the single-valued path constraint timelines.
fn blend_value(current: &mut f32, setup: f32, value: Option<f32>, alpha: f32, blend: MixBlend) {
    match value {
        None => match blend {
            MixBlend::Setup => *current = setup,
            MixBlend::First => *current += (setup - *current) * alpha,
            MixBlend::Replace | MixBlend::Add => {}
        },
        Some(value) if blend == MixBlend::Setup => *current = setup + (value - setup) * alpha,
        Some(value) => *current += (value - *current) * alpha,
    }
}

fn sample_value(timeline: &PathConstraintValueTimeline, time: f32) -> Option<f32> {
    if time < timeline.frames[0] {
        return None;
    }
    let [value] = sample::<1>(
        &timeline.frames,
        &timeline.curves,
        PathConstraintValueTimeline::ENTRIES,
        time,
    );
    Some(value)
}

pub(crate) fn apply_path_position(
    timeline: &PathConstraintValueTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
) {
    let setup = skeleton.data.path_constraints[timeline.path_constraint_index].position;
    let constraint = &mut skeleton.path_constraints[timeline.path_constraint_index];
    if constraint.active {
        let value = sample_value(timeline, time);
        blend_value(&mut constraint.position, setup, value, alpha, blend);
    }
}

pub(crate) fn apply_path_spacing(
    timeline: &PathConstraintValueTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
) {
    let setup = skeleton.data.path_constraints[timeline.path_constraint_index].spacing;
    let constraint = &mut skeleton.path_constraints[timeline.path_constraint_index];
    if constraint.active {
        let value = sample_value(timeline, time);
        blend_value(&mut constraint.spacing, setup, value, alpha, blend);
    }
}

pub(crate) fn apply_path_mix(
    timeline: &PathConstraintMixTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
) {
    let data = &skeleton.data.path_constraints[timeline.path_constraint_index];
    let constraint = &mut skeleton.path_constraints[timeline.path_constraint_index];
    if !constraint.active {
        return;
    }
    let values = (time >= timeline.frames[0]).then(|| {
        sample::<2>(
            &timeline.frames,
            &timeline.curves,
            PathConstraintMixTimeline::ENTRIES,
            time,
        )
    });
    blend_value(
        &mut constraint.rotate_mix,
        data.rotate_mix,
        values.map(|[rotate, _]| rotate),
        alpha,
        blend,
    );
    blend_value(
        &mut constraint.translate_mix,
        data.translate_mix,
        values.map(|[_, translate]| translate),
        alpha,
        blend,
    );
}
