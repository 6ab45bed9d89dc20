use crate::runtime::bone::LocalTransform;
use crate::runtime::skeleton::Skeleton;
use crate::{IkConstraintData, TransformMode};

#[derive(Clone, Debug)]
pub struct IkConstraint {
    data_index: usize,
    pub bones: Vec<usize>,
    pub target: usize,
    pub mix: f32,
    pub softness: f32,
    pub bend_direction: i32,
    pub compress: bool,
    pub stretch: bool,
    pub active: bool,
}

impl IkConstraint {
    pub(crate) fn new(data_index: usize, data: &IkConstraintData) -> Self {
        Self {
            data_index,
            bones: data.bones.clone(),
            target: data.target,
            mix: data.mix,
            softness: data.softness,
            bend_direction: data.bend_direction,
            compress: data.compress,
            stretch: data.stretch,
            active: false,
        }
    }

    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn set_to_setup_pose(&mut self, data: &IkConstraintData) {
        self.mix = data.mix;
        self.softness = data.softness;
        self.bend_direction = data.bend_direction;
        self.compress = data.compress;
        self.stretch = data.stretch;
    }
}

impl Skeleton {
    pub(crate) fn apply_ik_constraint(&mut self, index: usize) {
        let constraint = &self.ik_constraints[index];
        let target = &self.bones[constraint.target];
        let (target_x, target_y) = (target.world_x, target.world_y);
        let uniform = self.data.ik_constraints[constraint.data_index()].uniform;
        let IkConstraint {
            mix,
            softness,
            bend_direction,
            compress,
            stretch,
            ..
        } = *constraint;
        let bones = match constraint.bones.as_slice() {
            &[bone] => (bone, None),
            &[parent, child] => (parent, Some(child)),
            _ => return,
        };

        match bones {
            (bone, None) => {
                self.apply_ik_one(bone, target_x, target_y, compress, stretch, uniform, mix);
            }
            (parent, Some(child)) => {
                self.apply_ik_two(
                    parent,
                    child,
                    target_x,
                    target_y,
                    bend_direction,
                    stretch,
                    softness,
                    mix,
                );
            }
        }
    }

    /// Rotates one bone toward the target, optionally scaling it along its length to reach
    /// (`stretch`) or not overshoot (`compress`) the target.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_ik_one(
        &mut self,
        bone_index: usize,
        target_x: f32,
        target_y: f32,
        compress: bool,
        stretch: bool,
        uniform: bool,
        alpha: f32,
    ) {
        if !self.bones[bone_index].applied_valid {
            self.update_bone_applied_transform(bone_index);
        }
        let parent = self.parent_world_or_root(bone_index);
        let bone = &self.bones[bone_index];
        let (mut pb, mut pd) = (parent.b, parent.d);
        let (pa, pc) = (parent.a, parent.c);

        let mut rotation_ik = -bone.ashear_x - bone.arotation;
        let (mut tx, mut ty);
        if bone.transform_mode == TransformMode::OnlyTranslation {
            tx = target_x - bone.world_x;
            ty = target_y - bone.world_y;
        } else {
            if bone.transform_mode == TransformMode::NoRotationOrReflection {
                let s = (pa * pd - pb * pc).abs() / (pa * pa + pc * pc).max(1.0e-4);
                let sa = pa / self.scale_x;
                let sc = pc / self.scale_y;
                pb = -sc * s * self.scale_x;
                pd = sa * s * self.scale_y;
                rotation_ik += sc.atan2(sa).to_degrees();
            }
            let x = target_x - parent.world_x;
            let y = target_y - parent.world_y;
            let d = pa * pd - pb * pc;
            // A collapsed parent leaves no direction to aim along.
            if d.abs() <= 1.0e-4 {
                tx = 0.0;
                ty = 0.0;
            } else {
                tx = (x * pd - y * pb) / d - bone.ax;
                ty = (y * pa - x * pc) / d - bone.ay;
            }
        }

        rotation_ik += ty.atan2(tx).to_degrees();
        if bone.ascale_x < 0.0 {
            rotation_ik += 180.0;
        }
        if rotation_ik > 180.0 {
            rotation_ik -= 360.0;
        } else if rotation_ik < -180.0 {
            rotation_ik += 360.0;
        }

        let mut sx = bone.ascale_x;
        let mut sy = bone.ascale_y;
        if compress || stretch {
            if matches!(
                bone.transform_mode,
                TransformMode::NoScale | TransformMode::NoScaleOrReflection
            ) {
                tx = target_x - bone.world_x;
                ty = target_y - bone.world_y;
            }
            let b = self.data.bones[bone_index].length * sx;
            let dd = (tx * tx + ty * ty).sqrt();
            if (compress && dd < b) || (stretch && dd > b && b > 1.0e-4) {
                let s = (dd / b - 1.0) * alpha + 1.0;
                sx *= s;
                if uniform {
                    sy *= s;
                }
            }
        }

        let local = LocalTransform {
            rotation: bone.arotation + rotation_ik * alpha,
            scale_x: sx,
            scale_y: sy,
            ..bone.applied()
        };
        self.update_bone_world_transform_with(bone_index, local);
    }

    /// Two-bone analytic solve. `bend_direction` picks the elbow side; `softness` eases the
    /// approach to full extension.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_ik_two(
        &mut self,
        parent_index: usize,
        child_index: usize,
        target_x: f32,
        target_y: f32,
        bend_direction: i32,
        stretch: bool,
        mut softness: f32,
        alpha: f32,
    ) {
        if alpha == 0.0 {
            self.update_bone_world_transform(child_index);
            return;
        }
        if !self.bones[parent_index].applied_valid {
            self.update_bone_applied_transform(parent_index);
        }
        if !self.bones[child_index].applied_valid {
            self.update_bone_applied_transform(child_index);
        }

        let parent = &self.bones[parent_index];
        let child = &self.bones[child_index];
        let bend_dir = bend_direction as f32;
        let px = parent.ax;
        let py = parent.ay;
        let mut psx = parent.ascale_x;
        let mut sx = psx;
        let mut psy = parent.ascale_y;
        let mut csx = child.ascale_x;
        let (os1, mut s2) = if psx < 0.0 {
            psx = -psx;
            (180.0, -1.0)
        } else {
            (0.0, 1.0)
        };
        if psy < 0.0 {
            psy = -psy;
            s2 = -s2;
        }
        let os2 = if csx < 0.0 {
            csx = -csx;
            180.0
        } else {
            0.0
        };

        let cx = child.ax;
        let (cy, cwx, cwy);
        let uniform_scale = (psx - psy).abs() <= 1.0e-4;
        if !uniform_scale {
            cy = 0.0;
            cwx = parent.a * cx + parent.world_x;
            cwy = parent.c * cx + parent.world_y;
        } else {
            cy = child.ay;
            cwx = parent.a * cx + parent.b * cy + parent.world_x;
            cwy = parent.c * cx + parent.d * cy + parent.world_y;
        }

        let pp = self.parent_world_or_root(parent_index);
        let (a, b, c, d) = (pp.a, pp.b, pp.c, pp.d);
        let det = a * d - b * c;
        let id = if det.abs() <= 1.0e-4 { 0.0 } else { 1.0 / det };
        let x = cwx - pp.world_x;
        let y = cwy - pp.world_y;
        let dx = (x * d - y * b) * id - px;
        let dy = (y * a - x * c) * id - py;
        let l1 = (dx * dx + dy * dy).sqrt();
        let mut l2 = self.data.bones[child_index].length * csx;

        if l1 < 1.0e-4 {
            let child_applied = child.applied();
            self.apply_ik_one(parent_index, target_x, target_y, false, stretch, false, alpha);
            self.update_bone_world_transform_with(
                child_index,
                LocalTransform {
                    x: cx,
                    y: cy,
                    rotation: 0.0,
                    ..child_applied
                },
            );
            return;
        }

        let x = target_x - pp.world_x;
        let y = target_y - pp.world_y;
        let mut tx = (x * d - y * b) * id - px;
        let mut ty = (y * a - x * c) * id - py;
        let mut dd = tx * tx + ty * ty;
        if softness != 0.0 {
            softness *= psx * (csx + 1.0) / 2.0;
            let td = dd.sqrt();
            let sd = td - l1 - l2 * psx + softness;
            if sd > 0.0 {
                let mut p = (sd / (softness * 2.0)).min(1.0) - 1.0;
                p = (sd - softness * (1.0 - p * p)) / td;
                tx -= p * tx;
                ty -= p * ty;
                dd = tx * tx + ty * ty;
            }
        }

        let (a1, a2) = 'solve: {
            if uniform_scale {
                l2 *= psx;
                let mut cos = (dd - l1 * l1 - l2 * l2) / (2.0 * l1 * l2);
                if cos < -1.0 {
                    cos = -1.0;
                } else if cos > 1.0 {
                    cos = 1.0;
                    if stretch {
                        sx *= (dd.sqrt() / (l1 + l2) - 1.0) * alpha + 1.0;
                    }
                }
                let a2 = cos.acos() * bend_dir;
                let a = l1 + l2 * cos;
                let b = l2 * a2.sin();
                let a1 = (ty * a - tx * b).atan2(tx * a + ty * b);
                (a1, a2)
            } else {
                let a = psx * l2;
                let b = psy * l2;
                let aa = a * a;
                let bb = b * b;
                let ta = ty.atan2(tx);
                let c = bb * l1 * l1 + aa * dd - aa * bb;
                let c1 = -2.0 * bb * l1;
                let c2 = bb - aa;
                let d = c1 * c1 - 4.0 * c2 * c;
                if d >= 0.0 {
                    let mut q = d.sqrt();
                    if c1 < 0.0 {
                        q = -q;
                    }
                    q = -(c1 + q) / 2.0;
                    let r0 = q / c2;
                    let r1 = c / q;
                    let r = if r0.abs() < r1.abs() { r0 } else { r1 };
                    if r * r <= dd {
                        let y = (dd - r * r).sqrt() * bend_dir;
                        break 'solve (ta - y.atan2(r), (y / psy).atan2((r - l1) / psx));
                    }
                }

                let mut min_angle = std::f32::consts::PI;
                let mut min_x = l1 - a;
                let mut min_dist = min_x * min_x;
                let mut min_y = 0.0f32;
                let mut max_angle = 0.0f32;
                let mut max_x = l1 + a;
                let mut max_dist = max_x * max_x;
                let mut max_y = 0.0f32;
                let c = -a * l1 / (aa - bb);
                if (-1.0..=1.0).contains(&c) {
                    let c = c.acos();
                    let x = a * c.cos() + l1;
                    let y = b * c.sin();
                    let d = x * x + y * y;
                    if d < min_dist {
                        min_angle = c;
                        min_dist = d;
                        min_x = x;
                        min_y = y;
                    }
                    if d > max_dist {
                        max_angle = c;
                        max_dist = d;
                        max_x = x;
                        max_y = y;
                    }
                }
                if dd <= (min_dist + max_dist) / 2.0 {
                    (ta - (min_y * bend_dir).atan2(min_x), min_angle * bend_dir)
                } else {
                    (ta - (max_y * bend_dir).atan2(max_x), max_angle * bend_dir)
                }
            }
        };

        let os = cy.atan2(cx) * s2;
        let parent_applied = self.bones[parent_index].applied();
        let mut a1 = (a1 - os).to_degrees() + os1 - parent_applied.rotation;
        if a1 > 180.0 {
            a1 -= 360.0;
        } else if a1 < -180.0 {
            a1 += 360.0;
        }
        self.update_bone_world_transform_with(
            parent_index,
            LocalTransform {
                x: px,
                y: py,
                rotation: parent_applied.rotation + a1 * alpha,
                scale_x: sx,
                scale_y: parent_applied.scale_y,
                shear_x: 0.0,
                shear_y: 0.0,
            },
        );

        let child_applied = self.bones[child_index].applied();
        let mut a2 =
            ((a2 + os).to_degrees() - child_applied.shear_x) * s2 + os2 - child_applied.rotation;
        if a2 > 180.0 {
            a2 -= 360.0;
        } else if a2 < -180.0 {
            a2 += 360.0;
        }
        self.update_bone_world_transform_with(
            child_index,
            LocalTransform {
                x: cx,
                y: cy,
                rotation: child_applied.rotation + a2 * alpha,
                ..child_applied
            },
        );
    }
}
