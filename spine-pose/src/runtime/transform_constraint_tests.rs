use crate::runtime::test_rig::{assert_approx, transform_data, Rig};
use crate::{Skeleton, TransformConstraintData};

fn posed(f: impl FnOnce(&mut TransformConstraintData)) -> Skeleton {
    let mut constraint = transform_data("copy", vec![1], 2);
    f(&mut constraint);
    let data = Rig::new()
        .bone("follower", "root", |b| {
            b.x = 1.0;
            b.rotation = 10.0;
        })
        .bone("leader", "root", |b| {
            b.x = 5.0;
            b.y = 5.0;
            b.rotation = 30.0;
            b.scale_x = 2.0;
        })
        .transform(constraint)
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    skeleton
}

#[test]
fn absolute_world_copies_rotation_position_and_scale() {
    let skeleton = posed(|_| {});
    let follower = &skeleton.bones[1];
    assert_approx(follower.world_x, 5.0);
    assert_approx(follower.world_y, 5.0);
    assert_approx(follower.world_rotation_x(), 30.0);
    assert_approx(follower.world_scale_x(), 2.0);
    assert_approx(follower.world_scale_y(), 1.0);
}

#[test]
fn absolute_world_partial_rotate_mix_with_offset() {
    let skeleton = posed(|c| {
        c.translate_mix = 0.0;
        c.scale_mix = 0.0;
        c.shear_mix = 0.0;
        c.rotate_mix = 0.5;
        c.offset_rotation = 10.0;
    });
    let follower = &skeleton.bones[1];
    assert_approx(follower.world_x, 1.0);
    assert_approx(follower.world_y, 0.0);
    // Halfway from 10 to 30 + 10.
    assert_approx(follower.world_rotation_x(), 25.0);
    assert_approx(follower.world_scale_x(), 1.0);
}

#[test]
fn relative_world_adds_target_transform() {
    let skeleton = posed(|c| {
        c.relative = true;
        c.scale_mix = 0.0;
    });
    let follower = &skeleton.bones[1];
    assert_approx(follower.world_x, 6.0);
    assert_approx(follower.world_y, 5.0);
    assert_approx(follower.world_rotation_x(), 40.0);
}

#[test]
fn absolute_local_copies_local_values() {
    let skeleton = posed(|c| {
        c.local = true;
        c.translate_mix = 0.0;
    });
    let follower = &skeleton.bones[1];
    assert_approx(follower.world_x, 1.0);
    assert_approx(follower.world_rotation_x(), 30.0);
    assert_approx(follower.world_scale_x(), 2.0);
    assert!(follower.is_applied_valid());

    let mut constraint = transform_data("copy", vec![1], 2);
    constraint.local = true;
    constraint.translate_mix = 0.0;
    constraint.rotate_mix = 0.0;
    constraint.shear_mix = 0.0;
    let data = Rig::new()
        .bone("follower", "root", |b| b.scale_x = 4.0)
        .bone("leader", "root", |b| {
            b.scale_x = 2.0;
            b.scale_y = 3.0;
        })
        .transform(constraint)
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    // (4 + (2 - 4)) / 4 and (1 + (3 - 1)) / 1.
    assert_approx(skeleton.bones[1].world_scale_x(), 0.5);
    assert_approx(skeleton.bones[1].world_scale_y(), 3.0);
}

#[test]
fn relative_local_accumulates() {
    let skeleton = posed(|c| {
        c.local = true;
        c.relative = true;
        c.translate_mix = 0.5;
    });
    let follower = &skeleton.bones[1];
    assert_approx(follower.world_x, 3.5);
    assert_approx(follower.world_y, 2.5);
    assert_approx(follower.world_rotation_x(), 40.0);
    assert_approx(follower.world_scale_x(), 2.0);
}

#[test]
fn all_mixes_zero_is_a_no_op() {
    let skeleton = posed(|c| {
        c.rotate_mix = 0.0;
        c.translate_mix = 0.0;
        c.scale_mix = 0.0;
        c.shear_mix = 0.0;
    });
    let follower = &skeleton.bones[1];
    assert_approx(follower.world_x, 1.0);
    assert_approx(follower.world_rotation_x(), 10.0);
}
