use crate::runtime::bone::{Bone, LocalTransform};
use crate::runtime::skeleton::Skeleton;
use crate::{wrap_degrees, TransformConstraintData};
use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct TransformConstraint {
    data_index: usize,
    pub bones: Vec<usize>,
    pub target: usize,
    pub rotate_mix: f32,
    pub translate_mix: f32,
    pub scale_mix: f32,
    pub shear_mix: f32,
    pub active: bool,
}

impl TransformConstraint {
    pub(crate) fn new(data_index: usize, data: &TransformConstraintData) -> Self {
        Self {
            data_index,
            bones: data.bones.clone(),
            target: data.target,
            rotate_mix: data.rotate_mix,
            translate_mix: data.translate_mix,
            scale_mix: data.scale_mix,
            shear_mix: data.shear_mix,
            active: false,
        }
    }

    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn set_to_setup_pose(&mut self, data: &TransformConstraintData) {
        self.rotate_mix = data.rotate_mix;
        self.translate_mix = data.translate_mix;
        self.scale_mix = data.scale_mix;
        self.shear_mix = data.shear_mix;
    }
}

#[derive(Copy, Clone, Debug)]
struct Mixes {
    rotate: f32,
    translate: f32,
    scale: f32,
    shear: f32,
}

fn wrap_pi(radians: f32) -> f32 {
    if radians > PI {
        radians - 2.0 * PI
    } else if radians < -PI {
        radians + 2.0 * PI
    } else {
        radians
    }
}

impl Skeleton {
    pub(crate) fn apply_transform_constraint(&mut self, index: usize) {
        let constraint = &self.transform_constraints[index];
        let mixes = Mixes {
            rotate: constraint.rotate_mix,
            translate: constraint.translate_mix,
            scale: constraint.scale_mix,
            shear: constraint.shear_mix,
        };
        if mixes.rotate == 0.0 && mixes.translate == 0.0 && mixes.scale == 0.0 && mixes.shear == 0.0
        {
            return;
        }

        let skeleton_data = Arc::clone(&self.data);
        let data = &skeleton_data.transform_constraints[constraint.data_index()];
        let target = constraint.target;
        let bones = std::mem::take(&mut self.transform_constraints[index].bones);
        match (data.local, data.relative) {
            (false, false) => self.transform_absolute_world(data, target, &bones, mixes),
            (false, true) => self.transform_relative_world(data, target, &bones, mixes),
            (true, false) => self.transform_absolute_local(data, target, &bones, mixes),
            (true, true) => self.transform_relative_local(data, target, &bones, mixes),
        }
        self.transform_constraints[index].bones = bones;
    }

    fn transform_absolute_world(
        &mut self,
        data: &TransformConstraintData,
        target: usize,
        bones: &[usize],
        mixes: Mixes,
    ) {
        let t = self.bones[target].clone();
        let deg_rad_reflect = if t.a * t.d - t.b * t.c > 0.0 {
            1.0f32.to_radians()
        } else {
            -(1.0f32.to_radians())
        };
        let offset_rotation = data.offset_rotation * deg_rad_reflect;
        let offset_shear_y = data.offset_shear_y * deg_rad_reflect;
        let [offset_x, offset_y] = t.local_to_world(data.offset_x, data.offset_y);

        for &bone_index in bones {
            let bone = &mut self.bones[bone_index];
            let mut modified = false;

            if mixes.rotate != 0.0 {
                let r = t.c.atan2(t.a) - bone.c.atan2(bone.a) + offset_rotation;
                rotate_matrix(bone, wrap_pi(r) * mixes.rotate);
                modified = true;
            }

            if mixes.translate != 0.0 {
                bone.world_x += (offset_x - bone.world_x) * mixes.translate;
                bone.world_y += (offset_y - bone.world_y) * mixes.translate;
                modified = true;
            }

            if mixes.scale > 0.0 {
                let mut s = (bone.a * bone.a + bone.c * bone.c).sqrt();
                if s != 0.0 {
                    s = (s + ((t.a * t.a + t.c * t.c).sqrt() - s + data.offset_scale_x) * mixes.scale)
                        / s;
                }
                bone.a *= s;
                bone.c *= s;
                let mut s = (bone.b * bone.b + bone.d * bone.d).sqrt();
                if s != 0.0 {
                    s = (s + ((t.b * t.b + t.d * t.d).sqrt() - s + data.offset_scale_y) * mixes.scale)
                        / s;
                }
                bone.b *= s;
                bone.d *= s;
                modified = true;
            }

            if mixes.shear > 0.0 {
                let (b, d) = (bone.b, bone.d);
                let by = d.atan2(b);
                let r = t.d.atan2(t.b) - t.c.atan2(t.a) - (by - bone.c.atan2(bone.a));
                let r = by + (wrap_pi(r) + offset_shear_y) * mixes.shear;
                let s = (b * b + d * d).sqrt();
                bone.b = r.cos() * s;
                bone.d = r.sin() * s;
                modified = true;
            }

            if modified {
                bone.applied_valid = false;
            }
        }
    }

    fn transform_relative_world(
        &mut self,
        data: &TransformConstraintData,
        target: usize,
        bones: &[usize],
        mixes: Mixes,
    ) {
        let t = self.bones[target].clone();
        let deg_rad_reflect = if t.a * t.d - t.b * t.c > 0.0 {
            1.0f32.to_radians()
        } else {
            -(1.0f32.to_radians())
        };
        let offset_rotation = data.offset_rotation * deg_rad_reflect;
        let offset_shear_y = data.offset_shear_y * deg_rad_reflect;
        let [offset_x, offset_y] = t.local_to_world(data.offset_x, data.offset_y);

        for &bone_index in bones {
            let bone = &mut self.bones[bone_index];
            let mut modified = false;

            if mixes.rotate != 0.0 {
                let r = t.c.atan2(t.a) + offset_rotation;
                rotate_matrix(bone, wrap_pi(r) * mixes.rotate);
                modified = true;
            }

            if mixes.translate != 0.0 {
                bone.world_x += offset_x * mixes.translate;
                bone.world_y += offset_y * mixes.translate;
                modified = true;
            }

            if mixes.scale > 0.0 {
                let s = ((t.a * t.a + t.c * t.c).sqrt() - 1.0 + data.offset_scale_x) * mixes.scale
                    + 1.0;
                bone.a *= s;
                bone.c *= s;
                let s = ((t.b * t.b + t.d * t.d).sqrt() - 1.0 + data.offset_scale_y) * mixes.scale
                    + 1.0;
                bone.b *= s;
                bone.d *= s;
                modified = true;
            }

            if mixes.shear > 0.0 {
                let r = wrap_pi(t.d.atan2(t.b) - t.c.atan2(t.a));
                let (b, d) = (bone.b, bone.d);
                let r = d.atan2(b) + (r - FRAC_PI_2 + offset_shear_y) * mixes.shear;
                let s = (b * b + d * d).sqrt();
                bone.b = r.cos() * s;
                bone.d = r.sin() * s;
                modified = true;
            }

            if modified {
                bone.applied_valid = false;
            }
        }
    }

    fn transform_absolute_local(
        &mut self,
        data: &TransformConstraintData,
        target: usize,
        bones: &[usize],
        mixes: Mixes,
    ) {
        if !self.bones[target].applied_valid {
            self.update_bone_applied_transform(target);
        }
        let t = self.bones[target].applied();

        for &bone_index in bones {
            if !self.bones[bone_index].applied_valid {
                self.update_bone_applied_transform(bone_index);
            }
            let mut local = self.bones[bone_index].applied();

            if mixes.rotate != 0.0 {
                let r = wrap_degrees(t.rotation - local.rotation + data.offset_rotation);
                local.rotation += r * mixes.rotate;
            }
            if mixes.translate != 0.0 {
                local.x += (t.x - local.x + data.offset_x) * mixes.translate;
                local.y += (t.y - local.y + data.offset_y) * mixes.translate;
            }
            if mixes.scale != 0.0 {
                // The blended scale is taken relative to the bone's own scale.
                let sx = local.scale_x;
                if sx != 0.0 {
                    local.scale_x =
                        (sx + (t.scale_x - sx + data.offset_scale_x) * mixes.scale) / sx;
                }
                let sy = local.scale_y;
                if sy != 0.0 {
                    local.scale_y =
                        (sy + (t.scale_y - sy + data.offset_scale_y) * mixes.scale) / sy;
                }
            }
            if mixes.shear != 0.0 {
                let r = wrap_degrees(t.shear_y - local.shear_y + data.offset_shear_y);
                local.shear_y += r * mixes.shear;
            }

            self.update_bone_world_transform_with(bone_index, local);
        }
    }

    fn transform_relative_local(
        &mut self,
        data: &TransformConstraintData,
        target: usize,
        bones: &[usize],
        mixes: Mixes,
    ) {
        if !self.bones[target].applied_valid {
            self.update_bone_applied_transform(target);
        }
        let t = self.bones[target].applied();

        for &bone_index in bones {
            if !self.bones[bone_index].applied_valid {
                self.update_bone_applied_transform(bone_index);
            }
            let mut local: LocalTransform = self.bones[bone_index].applied();

            if mixes.rotate != 0.0 {
                local.rotation += (t.rotation + data.offset_rotation) * mixes.rotate;
            }
            if mixes.translate != 0.0 {
                local.x += (t.x + data.offset_x) * mixes.translate;
                local.y += (t.y + data.offset_y) * mixes.translate;
            }
            if mixes.scale != 0.0 {
                local.scale_x *= (t.scale_x - 1.0 + data.offset_scale_x) * mixes.scale + 1.0;
                local.scale_y *= (t.scale_y - 1.0 + data.offset_scale_y) * mixes.scale + 1.0;
            }
            if mixes.shear != 0.0 {
                local.shear_y += (t.shear_y + data.offset_shear_y) * mixes.shear;
            }

            self.update_bone_world_transform_with(bone_index, local);
        }
    }
}

/// Rotates a bone's world matrix by `radians`.
pub(crate) fn rotate_matrix(bone: &mut Bone, radians: f32) {
    let (sin, cos) = radians.sin_cos();
    let (a, b, c, d) = (bone.a, bone.b, bone.c, bone.d);
    bone.a = cos * a - sin * c;
    bone.b = cos * b - sin * d;
    bone.c = sin * a + cos * c;
    bone.d = sin * b + cos * d;
}
