use crate::runtime::skeleton::{compute_attachment_world_vertices, resolve_slot_attachment, Skeleton};
use crate::runtime::transform_constraint::rotate_matrix;
use crate::{
    AttachmentData, PathAttachmentData, PathConstraintData, PositionMode, RotateMode, SpacingMode,
};
use std::f32::consts::PI;
use std::sync::Arc;

const EPSILON: f32 = 1.0e-5;

#[derive(Clone, Debug, Default)]
struct PathConstraintScratch {
    spaces: Vec<f32>,
    lengths: Vec<f32>,
    positions: Vec<f32>,
    world: Vec<f32>,
    curves: Vec<f32>,
    segments: [f32; 10],
}

#[derive(Clone, Debug)]
pub struct PathConstraint {
    data_index: usize,
    pub bones: Vec<usize>,
    /// Slot whose path attachment the bones follow.
    pub target: usize,
    pub position: f32,
    pub spacing: f32,
    pub rotate_mix: f32,
    pub translate_mix: f32,
    pub active: bool,
    scratch: PathConstraintScratch,
}

impl PathConstraint {
    pub(crate) fn new(data_index: usize, data: &PathConstraintData) -> Self {
        Self {
            data_index,
            bones: data.bones.clone(),
            target: data.target,
            position: data.position,
            spacing: data.spacing,
            rotate_mix: data.rotate_mix,
            translate_mix: data.translate_mix,
            active: false,
            scratch: PathConstraintScratch::default(),
        }
    }

    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn set_to_setup_pose(&mut self, data: &PathConstraintData) {
        self.position = data.position;
        self.spacing = data.spacing;
        self.rotate_mix = data.rotate_mix;
        self.translate_mix = data.translate_mix;
    }
}

impl Skeleton {
    pub(crate) fn apply_path_constraint(&mut self, index: usize) {
        let skeleton_data = Arc::clone(&self.data);
        let constraint = &self.path_constraints[index];
        let slot_index = constraint.target;
        let Some(AttachmentData::Path(path)) =
            resolve_slot_attachment(&skeleton_data, &self.slots[slot_index], slot_index)
        else {
            return;
        };

        let rotate_mix = constraint.rotate_mix;
        let translate_mix = constraint.translate_mix;
        let translate = translate_mix > 0.0;
        let rotate = rotate_mix > 0.0;
        if !translate && !rotate {
            return;
        }
        let position = constraint.position;
        let spacing = constraint.spacing;
        let data = &skeleton_data.path_constraints[constraint.data_index()];

        let percent_spacing = data.spacing_mode == SpacingMode::Percent;
        let tangents = data.rotate_mode == RotateMode::Tangent;
        let scale = data.rotate_mode == RotateMode::ChainScale;
        let bones = std::mem::take(&mut self.path_constraints[index].bones);
        let mut scratch = std::mem::take(&mut self.path_constraints[index].scratch);
        let bone_count = bones.len();
        let spaces_count = if tangents { bone_count } else { bone_count + 1 };

        scratch.spaces.clear();
        scratch.spaces.resize(spaces_count, 0.0);
        scratch.lengths.clear();
        if scale {
            scratch.lengths.resize(bone_count, 0.0);
        }
        if scale || !percent_spacing {
            let length_spacing = data.spacing_mode == SpacingMode::Length;
            for i in 0..spaces_count.saturating_sub(1) {
                let bone = &self.bones[bones[i]];
                let setup_length = skeleton_data.bones[bones[i]].length;
                if setup_length < EPSILON {
                    scratch.spaces[i + 1] = 0.0;
                    continue;
                }
                let x = setup_length * bone.a;
                let y = setup_length * bone.c;
                let length = (x * x + y * y).sqrt();
                if scale {
                    scratch.lengths[i] = length;
                }
                scratch.spaces[i + 1] = if percent_spacing {
                    spacing
                } else if length_spacing {
                    (setup_length + spacing) * length / setup_length
                } else {
                    spacing * length / setup_length
                };
            }
        } else {
            for space in scratch.spaces.iter_mut().skip(1) {
                *space = spacing;
            }
        }

        let computed = compute_path_world_positions(
            self,
            &mut scratch,
            slot_index,
            path,
            spaces_count,
            tangents,
            data.position_mode == PositionMode::Percent,
            percent_spacing,
            position,
        );

        if computed {
            let positions = &scratch.positions;
            let mut bone_x = positions[0];
            let mut bone_y = positions[1];
            let mut offset_rotation = data.offset_rotation;
            let tip = if offset_rotation == 0.0 {
                data.rotate_mode == RotateMode::Chain
            } else {
                let p = &self.bones[self.slots[slot_index].bone];
                offset_rotation *= if p.a * p.d - p.b * p.c > 0.0 {
                    1.0f32.to_radians()
                } else {
                    -(1.0f32.to_radians())
                };
                false
            };

            for (i, &bone_index) in bones.iter().enumerate() {
                let p = (i + 1) * 3;
                let setup_length = skeleton_data.bones[bone_index].length;
                let bone = &mut self.bones[bone_index];
                bone.world_x += (bone_x - bone.world_x) * translate_mix;
                bone.world_y += (bone_y - bone.world_y) * translate_mix;
                let x = positions[p];
                let y = positions[p + 1];
                let dx = x - bone_x;
                let dy = y - bone_y;
                if scale {
                    let length = scratch.lengths[i];
                    if length != 0.0 {
                        let s = ((dx * dx + dy * dy).sqrt() / length - 1.0) * rotate_mix + 1.0;
                        bone.a *= s;
                        bone.c *= s;
                    }
                }
                bone_x = x;
                bone_y = y;

                if rotate {
                    let (a, c) = (bone.a, bone.c);
                    let mut r = if tangents {
                        positions[p - 1]
                    } else if scratch.spaces[i + 1] == 0.0 {
                        positions[p + 2]
                    } else {
                        dy.atan2(dx)
                    };
                    r -= c.atan2(a);
                    if tip {
                        let (sin, cos) = r.sin_cos();
                        bone_x += (setup_length * (cos * a - sin * c) - dx) * rotate_mix;
                        bone_y += (setup_length * (sin * a + cos * c) - dy) * rotate_mix;
                    } else {
                        r += offset_rotation;
                    }
                    if r > PI {
                        r -= 2.0 * PI;
                    } else if r < -PI {
                        r += 2.0 * PI;
                    }
                    rotate_matrix(bone, r * rotate_mix);
                }
                bone.applied_valid = false;
            }
        }

        let constraint = &mut self.path_constraints[index];
        constraint.bones = bones;
        constraint.scratch = scratch;
    }
}

/// Fills `scratch.positions` with `x, y, rotation` per space along the path. Returns false when
/// the path is too short to evaluate.
#[allow(clippy::too_many_arguments)]
fn compute_path_world_positions(
    skeleton: &Skeleton,
    scratch: &mut PathConstraintScratch,
    slot_index: usize,
    path: &PathAttachmentData,
    spaces_count: usize,
    tangents: bool,
    percent_position: bool,
    percent_spacing: bool,
    mut position: f32,
) -> bool {
    const NONE: i32 = -1;
    const BEFORE: i32 = -2;
    const AFTER: i32 = -3;

    let closed = path.closed;
    let mut vertices_length = path.vertices.world_vertices_length();
    let mut curve_count = vertices_length / 6;
    let mut prev_curve = NONE;
    if curve_count < 2 && !(closed && curve_count == 1) {
        return false;
    }

    let PathConstraintScratch {
        spaces,
        positions,
        world,
        curves,
        segments,
        ..
    } = scratch;
    positions.clear();
    positions.resize(spaces_count * 3 + 2, 0.0);
    let out = positions.as_mut_slice();

    if !path.constant_speed {
        curve_count -= if closed { 1 } else { 2 };
        let Some(lengths) = path.lengths.get(..=curve_count) else {
            return false;
        };
        let path_length = lengths[curve_count];
        if percent_position {
            position *= path_length;
        }
        if percent_spacing {
            for space in spaces.iter_mut().skip(1) {
                *space *= path_length;
            }
        }

        world.clear();
        world.resize(8, 0.0);
        let mut curve = 0usize;
        for i in 0..spaces_count {
            let o = i * 3;
            let space = spaces[i];
            position += space;
            let mut p = position;

            if closed {
                p = p.rem_euclid(path_length);
                curve = 0;
            } else if p < 0.0 {
                if prev_curve != BEFORE {
                    prev_curve = BEFORE;
                    compute_attachment_world_vertices(
                        skeleton,
                        slot_index,
                        &path.vertices,
                        2,
                        4,
                        world,
                        0,
                        2,
                    );
                }
                add_before_position(p, world, 0, out, o);
                continue;
            } else if p > path_length {
                if prev_curve != AFTER {
                    prev_curve = AFTER;
                    compute_attachment_world_vertices(
                        skeleton,
                        slot_index,
                        &path.vertices,
                        vertices_length - 6,
                        4,
                        world,
                        0,
                        2,
                    );
                }
                add_after_position(p - path_length, world, 0, out, o);
                continue;
            }

            p = locate_in_lengths(lengths, &mut curve, p);

            if curve as i32 != prev_curve {
                prev_curve = curve as i32;
                if closed && curve == curve_count {
                    compute_attachment_world_vertices(
                        skeleton,
                        slot_index,
                        &path.vertices,
                        vertices_length - 4,
                        4,
                        world,
                        0,
                        2,
                    );
                    compute_attachment_world_vertices(
                        skeleton,
                        slot_index,
                        &path.vertices,
                        0,
                        4,
                        world,
                        4,
                        2,
                    );
                } else {
                    compute_attachment_world_vertices(
                        skeleton,
                        slot_index,
                        &path.vertices,
                        curve * 6 + 2,
                        8,
                        world,
                        0,
                        2,
                    );
                }
            }
            add_curve_position(
                p,
                [world[0], world[1], world[2], world[3], world[4], world[5], world[6], world[7]],
                out,
                o,
                tangents || (i > 0 && space == 0.0),
            );
        }
        return true;
    }

    world.clear();
    if closed {
        vertices_length += 2;
        world.resize(vertices_length, 0.0);
        compute_attachment_world_vertices(
            skeleton,
            slot_index,
            &path.vertices,
            2,
            vertices_length - 4,
            world,
            0,
            2,
        );
        compute_attachment_world_vertices(
            skeleton,
            slot_index,
            &path.vertices,
            0,
            2,
            world,
            vertices_length - 4,
            2,
        );
        world[vertices_length - 2] = world[0];
        world[vertices_length - 1] = world[1];
    } else {
        curve_count -= 1;
        vertices_length -= 4;
        world.resize(vertices_length, 0.0);
        compute_attachment_world_vertices(
            skeleton,
            slot_index,
            &path.vertices,
            2,
            vertices_length,
            world,
            0,
            2,
        );
    }

    curves.clear();
    curves.resize(curve_count, 0.0);
    let mut path_length = 0.0f32;
    let mut x1 = world[0];
    let mut y1 = world[1];
    let mut w = 2usize;
    for curve in curves.iter_mut() {
        let (cx1, cy1, cx2, cy2, x2, y2) = (
            world[w],
            world[w + 1],
            world[w + 2],
            world[w + 3],
            world[w + 4],
            world[w + 5],
        );
        let tmpx = (x1 - cx1 * 2.0 + cx2) * 0.1875;
        let tmpy = (y1 - cy1 * 2.0 + cy2) * 0.1875;
        let dddfx = ((cx1 - cx2) * 3.0 - x1 + x2) * 0.09375;
        let dddfy = ((cy1 - cy2) * 3.0 - y1 + y2) * 0.09375;
        let mut ddfx = tmpx * 2.0 + dddfx;
        let mut ddfy = tmpy * 2.0 + dddfy;
        let mut dfx = (cx1 - x1) * 0.75 + tmpx + dddfx * 0.16666667;
        let mut dfy = (cy1 - y1) * 0.75 + tmpy + dddfy * 0.16666667;
        path_length += (dfx * dfx + dfy * dfy).sqrt();
        dfx += ddfx;
        dfy += ddfy;
        ddfx += dddfx;
        ddfy += dddfy;
        path_length += (dfx * dfx + dfy * dfy).sqrt();
        dfx += ddfx;
        dfy += ddfy;
        path_length += (dfx * dfx + dfy * dfy).sqrt();
        dfx += ddfx + dddfx;
        dfy += ddfy + dddfy;
        path_length += (dfx * dfx + dfy * dfy).sqrt();
        *curve = path_length;
        x1 = x2;
        y1 = y2;
        w += 6;
    }

    if percent_position {
        position *= path_length;
    } else if let Some(&authored) = path.lengths.get(curve_count.wrapping_sub(1)) {
        if authored > EPSILON {
            position *= path_length / authored;
        }
    }
    if percent_spacing {
        for space in spaces.iter_mut().skip(1) {
            *space *= path_length;
        }
    }

    let mut curve_length = 0.0f32;
    let mut curve = 0usize;
    let mut segment = 0usize;
    let mut points = [0.0f32; 8];
    for i in 0..spaces_count {
        let o = i * 3;
        let space = spaces[i];
        position += space;
        let mut p = position;

        if closed {
            p = p.rem_euclid(path_length);
            curve = 0;
        } else if p < 0.0 {
            add_before_position(p, world, 0, out, o);
            continue;
        } else if p > path_length {
            add_after_position(p - path_length, world, vertices_length - 4, out, o);
            continue;
        }

        p = locate_in_lengths(curves, &mut curve, p);

        if curve as i32 != prev_curve {
            prev_curve = curve as i32;
            let ii = curve * 6;
            points.copy_from_slice(&world[ii..ii + 8]);
            let [x1, y1, cx1, cy1, cx2, cy2, x2, y2] = points;
            let tmpx = (x1 - cx1 * 2.0 + cx2) * 0.03;
            let tmpy = (y1 - cy1 * 2.0 + cy2) * 0.03;
            let dddfx = ((cx1 - cx2) * 3.0 - x1 + x2) * 0.006;
            let dddfy = ((cy1 - cy2) * 3.0 - y1 + y2) * 0.006;
            let mut ddfx = tmpx * 2.0 + dddfx;
            let mut ddfy = tmpy * 2.0 + dddfy;
            let mut dfx = (cx1 - x1) * 0.3 + tmpx + dddfx * 0.16666667;
            let mut dfy = (cy1 - y1) * 0.3 + tmpy + dddfy * 0.16666667;
            curve_length = (dfx * dfx + dfy * dfy).sqrt();
            segments[0] = curve_length;
            for seg in segments.iter_mut().take(8).skip(1) {
                dfx += ddfx;
                dfy += ddfy;
                ddfx += dddfx;
                ddfy += dddfy;
                curve_length += (dfx * dfx + dfy * dfy).sqrt();
                *seg = curve_length;
            }
            dfx += ddfx;
            dfy += ddfy;
            curve_length += (dfx * dfx + dfy * dfy).sqrt();
            segments[8] = curve_length;
            dfx += ddfx + dddfx;
            dfy += ddfy + dddfy;
            curve_length += (dfx * dfx + dfy * dfy).sqrt();
            segments[9] = curve_length;
            segment = 0;
        }

        p *= curve_length;
        loop {
            let length = segments[segment];
            if p > length && segment < segments.len() - 1 {
                segment += 1;
                continue;
            }
            if segment == 0 {
                p /= length.max(EPSILON);
            } else {
                let prev = segments[segment - 1];
                p = segment as f32 + (p - prev) / (length - prev).max(EPSILON);
            }
            break;
        }
        add_curve_position(
            p * 0.1,
            points,
            out,
            o,
            tangents || (i > 0 && space == 0.0),
        );
    }
    true
}

/// Advances `curve` to the entry of cumulative `lengths` containing `p` and returns the
/// fraction of `p` within it.
fn locate_in_lengths(lengths: &[f32], curve: &mut usize, p: f32) -> f32 {
    while *curve + 1 < lengths.len() && p > lengths[*curve] {
        *curve += 1;
    }
    let length = lengths[*curve];
    if *curve == 0 {
        p / length.max(EPSILON)
    } else {
        let prev = lengths[*curve - 1];
        (p - prev) / (length - prev).max(EPSILON)
    }
}

fn add_before_position(p: f32, temp: &[f32], i: usize, out: &mut [f32], o: usize) {
    let x1 = temp[i];
    let y1 = temp[i + 1];
    let dx = temp[i + 2] - x1;
    let dy = temp[i + 3] - y1;
    let r = dy.atan2(dx);
    out[o] = x1 + p * r.cos();
    out[o + 1] = y1 + p * r.sin();
    out[o + 2] = r;
}

fn add_after_position(p: f32, temp: &[f32], i: usize, out: &mut [f32], o: usize) {
    let x1 = temp[i + 2];
    let y1 = temp[i + 3];
    let dx = x1 - temp[i];
    let dy = y1 - temp[i + 1];
    let r = dy.atan2(dx);
    out[o] = x1 + p * r.cos();
    out[o + 1] = y1 + p * r.sin();
    out[o + 2] = r;
}

/// Evaluates the cubic `x1, y1, cx1, cy1, cx2, cy2, x2, y2` at `p`.
fn add_curve_position(p: f32, points: [f32; 8], out: &mut [f32], o: usize, tangents: bool) {
    let [x1, y1, cx1, cy1, cx2, cy2, x2, y2] = points;
    if p < EPSILON || p.is_nan() {
        out[o] = x1;
        out[o + 1] = y1;
        out[o + 2] = (cy1 - y1).atan2(cx1 - x1);
        return;
    }
    let tt = p * p;
    let ttt = tt * p;
    let u = 1.0 - p;
    let uu = u * u;
    let uuu = uu * u;
    let ut = u * p;
    let ut3 = ut * 3.0;
    let uut3 = u * ut3;
    let utt3 = ut3 * p;
    let x = x1 * uuu + cx1 * uut3 + cx2 * utt3 + x2 * ttt;
    let y = y1 * uuu + cy1 * uut3 + cy2 * utt3 + y2 * ttt;
    out[o] = x;
    out[o + 1] = y;
    if tangents {
        out[o + 2] = if p < 0.001 {
            (cy1 - y1).atan2(cx1 - x1)
        } else {
            (y - (y1 * uu + cy1 * ut * 2.0 + cy2 * tt)).atan2(x - (x1 * uu + cx1 * ut * 2.0 + cx2 * tt))
        };
    }
}
