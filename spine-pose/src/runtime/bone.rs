use crate::{BoneData, TransformMode};

/// A bone's 2x2 world matrix plus world translation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub world_x: f32,
    pub world_y: f32,
}

impl WorldTransform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        world_x: 0.0,
        world_y: 0.0,
    };
}

/// Skeleton-level placement folded into root bones.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SkeletonTransform {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl SkeletonTransform {
    /// The transform a root bone is composed with, as if the skeleton itself were a parent bone.
    pub(crate) fn as_parent(&self) -> WorldTransform {
        WorldTransform {
            a: self.scale_x,
            b: 0.0,
            c: 0.0,
            d: self.scale_y,
            world_x: self.x,
            world_y: self.y,
        }
    }
}

/// Local transform values, in the parent bone's space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocalTransform {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub shear_x: f32,
    pub shear_y: f32,
}

#[derive(Clone, Debug)]
pub struct Bone {
    data_index: usize,
    parent: Option<usize>,

    pub transform_mode: TransformMode,
    pub active: bool,
    pub(crate) sorted: bool,

    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub shear_x: f32,
    pub shear_y: f32,

    pub ax: f32,
    pub ay: f32,
    pub arotation: f32,
    pub ascale_x: f32,
    pub ascale_y: f32,
    pub ashear_x: f32,
    pub ashear_y: f32,
    pub(crate) applied_valid: bool,

    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub world_x: f32,
    pub world_y: f32,
}

impl Bone {
    pub(crate) fn new(data_index: usize, data: &BoneData) -> Self {
        let mut bone = Self {
            data_index,
            parent: data.parent,
            transform_mode: data.transform_mode,
            active: !data.skin_required,
            sorted: false,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            ax: 0.0,
            ay: 0.0,
            arotation: 0.0,
            ascale_x: 1.0,
            ascale_y: 1.0,
            ashear_x: 0.0,
            ashear_y: 0.0,
            applied_valid: true,
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            world_x: 0.0,
            world_y: 0.0,
        };
        bone.set_to_setup_pose(data);
        bone
    }

    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    pub fn is_applied_valid(&self) -> bool {
        self.applied_valid
    }

    pub fn set_to_setup_pose(&mut self, data: &BoneData) {
        self.x = data.x;
        self.y = data.y;
        self.rotation = data.rotation;
        self.scale_x = data.scale_x;
        self.scale_y = data.scale_y;
        self.shear_x = data.shear_x;
        self.shear_y = data.shear_y;
    }

    pub fn local(&self) -> LocalTransform {
        LocalTransform {
            x: self.x,
            y: self.y,
            rotation: self.rotation,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            shear_x: self.shear_x,
            shear_y: self.shear_y,
        }
    }

    pub fn applied(&self) -> LocalTransform {
        LocalTransform {
            x: self.ax,
            y: self.ay,
            rotation: self.arotation,
            scale_x: self.ascale_x,
            scale_y: self.ascale_y,
            shear_x: self.ashear_x,
            shear_y: self.ashear_y,
        }
    }

    pub(crate) fn set_applied(&mut self, applied: LocalTransform) {
        self.ax = applied.x;
        self.ay = applied.y;
        self.arotation = applied.rotation;
        self.ascale_x = applied.scale_x;
        self.ascale_y = applied.scale_y;
        self.ashear_x = applied.shear_x;
        self.ashear_y = applied.shear_y;
    }

    pub fn world(&self) -> WorldTransform {
        WorldTransform {
            a: self.a,
            b: self.b,
            c: self.c,
            d: self.d,
            world_x: self.world_x,
            world_y: self.world_y,
        }
    }

    /// Computes the world transform from `local`, which also becomes the applied transform.
    ///
    /// `parent` is the parent's world transform, `None` for a root bone. Root bones always
    /// inherit fully from the skeleton placement.
    pub fn update_world_transform_with(
        &mut self,
        parent: Option<&WorldTransform>,
        skeleton: &SkeletonTransform,
        local: LocalTransform,
    ) {
        self.set_applied(local);
        self.applied_valid = true;

        let (parent, mode) = match parent {
            Some(parent) => (*parent, self.transform_mode),
            None => (skeleton.as_parent(), TransformMode::Normal),
        };
        let LocalTransform {
            x,
            y,
            rotation,
            scale_x,
            scale_y,
            shear_x,
            shear_y,
        } = local;

        let mut pa = parent.a;
        let mut pb = parent.b;
        let mut pc = parent.c;
        let mut pd = parent.d;
        self.world_x = pa * x + pb * y + parent.world_x;
        self.world_y = pc * x + pd * y + parent.world_y;

        match mode {
            TransformMode::Normal => {
                let rotation_y = (rotation + 90.0 + shear_y).to_radians();
                let rotation_x = (rotation + shear_x).to_radians();
                let la = rotation_x.cos() * scale_x;
                let lb = rotation_y.cos() * scale_y;
                let lc = rotation_x.sin() * scale_x;
                let ld = rotation_y.sin() * scale_y;
                self.a = pa * la + pb * lc;
                self.b = pa * lb + pb * ld;
                self.c = pc * la + pd * lc;
                self.d = pc * lb + pd * ld;
                return;
            }
            TransformMode::OnlyTranslation => {
                let rotation_y = (rotation + 90.0 + shear_y).to_radians();
                let rotation_x = (rotation + shear_x).to_radians();
                self.a = rotation_x.cos() * scale_x;
                self.b = rotation_y.cos() * scale_y;
                self.c = rotation_x.sin() * scale_x;
                self.d = rotation_y.sin() * scale_y;
            }
            TransformMode::NoRotationOrReflection => {
                let mut s = pa * pa + pc * pc;
                let prx;
                if s > 1.0e-4 {
                    s = (pa * pd - pb * pc).abs() / s;
                    pa /= skeleton.scale_x;
                    pc /= skeleton.scale_y;
                    pb = pc * s;
                    pd = pa * s;
                    prx = pc.atan2(pa).to_degrees();
                } else {
                    pa = 0.0;
                    pc = 0.0;
                    prx = 90.0 - pd.atan2(pb).to_degrees();
                }
                let rotation_x = (rotation + shear_x - prx).to_radians();
                let rotation_y = (rotation + shear_y - prx + 90.0).to_radians();
                let la = rotation_x.cos() * scale_x;
                let lb = rotation_y.cos() * scale_y;
                let lc = rotation_x.sin() * scale_x;
                let ld = rotation_y.sin() * scale_y;
                self.a = pa * la - pb * lc;
                self.b = pa * lb - pb * ld;
                self.c = pc * la + pd * lc;
                self.d = pc * lb + pd * ld;
            }
            TransformMode::NoScale | TransformMode::NoScaleOrReflection => {
                let (sin, cos) = rotation.to_radians().sin_cos();
                let mut za = (pa * cos + pb * sin) / skeleton.scale_x;
                let mut zc = (pc * cos + pd * sin) / skeleton.scale_y;
                let mut s = (za * za + zc * zc).sqrt();
                if s > 1.0e-5 {
                    s = 1.0 / s;
                }
                za *= s;
                zc *= s;
                s = (za * za + zc * zc).sqrt();
                if mode == TransformMode::NoScale
                    && (pa * pd - pb * pc < 0.0)
                        != ((skeleton.scale_x < 0.0) != (skeleton.scale_y < 0.0))
                {
                    s = -s;
                }
                let r = std::f32::consts::FRAC_PI_2 + zc.atan2(za);
                let zb = r.cos() * s;
                let zd = r.sin() * s;
                let shear_x = shear_x.to_radians();
                let shear_y = (90.0 + shear_y).to_radians();
                let la = shear_x.cos() * scale_x;
                let lb = shear_y.cos() * scale_y;
                let lc = shear_x.sin() * scale_x;
                let ld = shear_y.sin() * scale_y;
                self.a = za * la + zb * lc;
                self.b = za * lb + zb * ld;
                self.c = zc * la + zd * lc;
                self.d = zc * lb + zd * ld;
            }
        }

        self.a *= skeleton.scale_x;
        self.b *= skeleton.scale_x;
        self.c *= skeleton.scale_y;
        self.d *= skeleton.scale_y;
    }

    /// Recomputes the applied transform from the current world transform.
    ///
    /// The decomposition treats the parent as fully inherited; for bones whose transform mode
    /// strips parent rotation or scale the result is only an approximation of the local values.
    pub fn update_applied_transform(
        &mut self,
        parent: Option<&WorldTransform>,
        skeleton: &SkeletonTransform,
    ) {
        self.applied_valid = true;
        let parent = match parent {
            Some(parent) => *parent,
            None => skeleton.as_parent(),
        };

        let (pa, pb, pc, pd) = (parent.a, parent.b, parent.c, parent.d);
        let det = pa * pd - pb * pc;
        let pid = if det.abs() > f32::EPSILON { 1.0 / det } else { 0.0 };
        let dx = self.world_x - parent.world_x;
        let dy = self.world_y - parent.world_y;
        self.ax = dx * pd * pid - dy * pb * pid;
        self.ay = dy * pa * pid - dx * pc * pid;

        let ia = pid * pd;
        let id = pid * pa;
        let ib = pid * pb;
        let ic = pid * pc;
        let ra = ia * self.a - ib * self.c;
        let rb = ia * self.b - ib * self.d;
        let rc = id * self.c - ic * self.a;
        let rd = id * self.d - ic * self.b;

        self.ashear_x = 0.0;
        self.ascale_x = (ra * ra + rc * rc).sqrt();
        if self.ascale_x > 1.0e-4 {
            let det = ra * rd - rb * rc;
            self.ascale_y = det / self.ascale_x;
            self.ashear_y = -(ra * rb + rc * rd).atan2(det).to_degrees();
            self.arotation = rc.atan2(ra).to_degrees();
        } else {
            self.ascale_x = 0.0;
            self.ascale_y = (rb * rb + rd * rd).sqrt();
            self.ashear_y = 0.0;
            self.arotation = 90.0 - rd.atan2(rb).to_degrees();
        }
    }

    pub fn world_rotation_x(&self) -> f32 {
        self.c.atan2(self.a).to_degrees()
    }

    pub fn world_rotation_y(&self) -> f32 {
        self.d.atan2(self.b).to_degrees()
    }

    pub fn world_scale_x(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }

    pub fn world_scale_y(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }

    pub fn world_to_local(&self, world_x: f32, world_y: f32) -> [f32; 2] {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() <= f32::EPSILON {
            return [0.0, 0.0];
        }
        let inv_det = 1.0 / det;
        let x = world_x - self.world_x;
        let y = world_y - self.world_y;
        [
            x * self.d * inv_det - y * self.b * inv_det,
            y * self.a * inv_det - x * self.c * inv_det,
        ]
    }

    pub fn local_to_world(&self, local_x: f32, local_y: f32) -> [f32; 2] {
        [
            local_x * self.a + local_y * self.b + self.world_x,
            local_x * self.c + local_y * self.d + self.world_y,
        ]
    }

    pub fn world_to_local_rotation(&self, world_rotation: f32) -> f32 {
        let (sin, cos) = world_rotation.to_radians().sin_cos();
        (self.a * sin - self.c * cos)
            .atan2(self.d * cos - self.b * sin)
            .to_degrees()
            + self.rotation
            - self.shear_x
    }

    pub fn local_to_world_rotation(&self, local_rotation: f32) -> f32 {
        let local_rotation = local_rotation - (self.rotation - self.shear_x);
        let (sin, cos) = local_rotation.to_radians().sin_cos();
        (cos * self.c + sin * self.d)
            .atan2(cos * self.a + sin * self.b)
            .to_degrees()
    }

    /// Rotates the world matrix in place. The applied transform becomes stale.
    pub fn rotate_world(&mut self, degrees: f32) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        self.a = cos * a - sin * c;
        self.b = cos * b - sin * d;
        self.c = sin * a + cos * c;
        self.d = sin * b + cos * d;
        self.applied_valid = false;
    }

    #[cfg(feature = "glam")]
    pub fn world_affine(&self) -> glam::Affine2 {
        glam::Affine2::from_cols_array(&[
            self.a,
            self.c,
            self.b,
            self.d,
            self.world_x,
            self.world_y,
        ])
    }

    #[cfg(feature = "glam")]
    pub fn world_position(&self) -> glam::Vec2 {
        glam::Vec2::new(self.world_x, self.world_y)
    }
}
