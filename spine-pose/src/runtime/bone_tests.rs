use crate::runtime::test_rig::{assert_approx, Rig};
use crate::{Skeleton, TransformMode};

fn two_bone_skeleton(mode: TransformMode) -> Skeleton {
    let data = Rig::new()
        .root(|b| {
            b.x = 10.0;
            b.y = 5.0;
            b.rotation = 90.0;
            b.scale_x = 2.0;
        })
        .bone("child", "root", |b| {
            b.x = 10.0;
            b.transform_mode = mode;
        })
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    skeleton
}

#[test]
fn root_bone_places_itself_in_world() {
    let skeleton = two_bone_skeleton(TransformMode::Normal);
    let root = &skeleton.bones[0];
    assert_approx(root.world_x, 10.0);
    assert_approx(root.world_y, 5.0);
    assert_approx(root.world_rotation_x(), 90.0);
    assert_approx(root.world_scale_x(), 2.0);
    assert_approx(root.world_scale_y(), 1.0);
}

#[test]
fn child_inherits_parent_rotation_and_scale() {
    let skeleton = two_bone_skeleton(TransformMode::Normal);
    let child = &skeleton.bones[1];
    assert_approx(child.world_x, 10.0);
    assert_approx(child.world_y, 25.0);
    assert_approx(child.world_rotation_x(), 90.0);
    assert_approx(child.world_scale_x(), 2.0);
}

#[test]
fn only_translation_ignores_parent_rotation() {
    let skeleton = two_bone_skeleton(TransformMode::OnlyTranslation);
    let child = &skeleton.bones[1];
    assert_approx(child.world_x, 10.0);
    assert_approx(child.world_y, 25.0);
    assert_approx(child.world_rotation_x(), 0.0);
    assert_approx(child.world_scale_x(), 1.0);
}

#[test]
fn no_scale_keeps_parent_rotation_only() {
    let skeleton = two_bone_skeleton(TransformMode::NoScale);
    let child = &skeleton.bones[1];
    assert_approx(child.world_rotation_x(), 90.0);
    assert_approx(child.world_scale_x(), 1.0);
    assert_approx(child.world_scale_y(), 1.0);
}

#[test]
fn skeleton_flip_mirrors_world() {
    let data = Rig::new().bone("child", "root", |b| b.x = 10.0).build();
    let mut skeleton = Skeleton::new(data);
    skeleton.scale_x = -1.0;
    skeleton.x = 3.0;
    skeleton.update_world_transform();
    assert_approx(skeleton.bones[1].world_x, -7.0);
    assert_approx(skeleton.bones[1].world_y, 0.0);
}

#[test]
fn applied_transform_round_trips_local_values() {
    let data = Rig::new()
        .root(|b| b.rotation = 20.0)
        .bone("child", "root", |b| {
            b.x = 4.0;
            b.y = -3.0;
            b.rotation = 30.0;
            b.scale_x = 2.0;
            b.scale_y = 0.5;
        })
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    skeleton.update_bone_applied_transform(1);

    let applied = skeleton.bones[1].applied();
    assert_approx(applied.x, 4.0);
    assert_approx(applied.y, -3.0);
    assert_approx(applied.rotation, 30.0);
    assert_approx(applied.scale_x, 2.0);
    assert_approx(applied.scale_y, 0.5);
    assert_approx(applied.shear_x, 0.0);
    assert_approx(applied.shear_y, 0.0);

    let world = skeleton.bones[1].world();
    skeleton.update_bone_world_transform_with(1, applied);
    let again = skeleton.bones[1].world();
    assert_approx(again.a, world.a);
    assert_approx(again.b, world.b);
    assert_approx(again.c, world.c);
    assert_approx(again.d, world.d);
    assert_approx(again.world_x, world.world_x);
    assert_approx(again.world_y, world.world_y);
}

#[test]
fn applied_shear_keeps_its_sign() {
    let data = Rig::new()
        .bone("child", "root", |b| {
            b.rotation = 30.0;
            b.shear_y = 10.0;
        })
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    skeleton.update_bone_applied_transform(1);

    let applied = skeleton.bones[1].applied();
    assert_approx(applied.rotation, 30.0);
    assert_approx(applied.shear_y, 10.0);
    // The y axis is decomposed into its component perpendicular to x.
    assert_approx(applied.scale_y, 10.0f32.to_radians().cos());
}

#[test]
fn world_local_point_and_rotation_conversions_invert() {
    let skeleton = two_bone_skeleton(TransformMode::Normal);
    let child = &skeleton.bones[1];
    let [wx, wy] = child.local_to_world(3.0, -2.0);
    let [lx, ly] = child.world_to_local(wx, wy);
    assert_approx(lx, 3.0);
    assert_approx(ly, -2.0);

    let world = child.local_to_world_rotation(15.0);
    assert_approx(child.world_to_local_rotation(world), 15.0);
}

#[test]
fn rotate_world_invalidates_applied() {
    let mut skeleton = two_bone_skeleton(TransformMode::Normal);
    let bone = &mut skeleton.bones[1];
    assert!(bone.is_applied_valid());
    bone.rotate_world(45.0);
    assert!(!bone.is_applied_valid());
    assert_approx(bone.world_rotation_x(), 135.0);
}

#[cfg(feature = "glam")]
#[test]
fn glam_affine_matches_world_matrix() {
    let skeleton = two_bone_skeleton(TransformMode::Normal);
    let child = &skeleton.bones[1];
    let affine = child.world_affine();
    let p = affine.transform_point2(glam::Vec2::new(1.0, 0.0));
    let [wx, wy] = child.local_to_world(1.0, 0.0);
    assert_approx(p.x, wx);
    assert_approx(p.y, wy);
    assert_eq!(child.world_position(), glam::Vec2::new(child.world_x, child.world_y));
}
