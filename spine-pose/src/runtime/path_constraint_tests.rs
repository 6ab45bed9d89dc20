use crate::runtime::test_rig::{assert_approx, assert_approx_eps, path_attachment, path_data, Rig};
use crate::{PathConstraintData, PositionMode, Skeleton};

const DIAGONAL: f32 = std::f32::consts::SQRT_2;

/// Two bones riding a straight 45 degree rail from (0, 0) to (30, 30).
fn rail(f: impl FnOnce(&mut PathConstraintData)) -> Skeleton {
    let points = vec![
        [-5.0, -5.0],
        [0.0, 0.0],
        [5.0, 5.0],
        [10.0, 10.0],
        [15.0, 15.0],
        [20.0, 20.0],
        [25.0, 25.0],
        [30.0, 30.0],
        [35.0, 35.0],
    ];
    let segment = 15.0 * DIAGONAL;
    let mut constraint = path_data("ride", vec![1, 2], 0);
    f(&mut constraint);
    let data = Rig::new()
        .bone("front", "root", |b| {
            b.length = 10.0;
            b.x = 3.0;
        })
        .bone("back", "root", |b| {
            b.length = 10.0;
            b.y = -4.0;
        })
        .slot("rail", "root", Some("rail"))
        .default_attachment(
            "rail",
            path_attachment("rail", points, vec![segment, segment * 2.0], false),
        )
        .path(constraint)
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    skeleton
}

#[test]
fn tangent_bones_follow_the_rail() {
    let skeleton = rail(|_| {});
    let front = &skeleton.bones[1];
    assert_approx_eps(front.world_x, 0.0, 1.0e-3);
    assert_approx_eps(front.world_y, 0.0, 1.0e-3);
    assert_approx_eps(front.world_rotation_x(), 45.0, 1.0e-2);

    let back = &skeleton.bones[2];
    let along = 10.0 / DIAGONAL;
    assert_approx_eps(back.world_x, along, 1.0e-3);
    assert_approx_eps(back.world_y, along, 1.0e-3);
    assert_approx_eps(back.world_rotation_x(), 45.0, 1.0e-2);
}

#[test]
fn spacing_moves_bones_but_not_their_rotation() {
    let skeleton = rail(|c| c.spacing = 5.0);
    let back = &skeleton.bones[2];
    let along = 15.0 / DIAGONAL;
    assert_approx_eps(back.world_x, along, 1.0e-3);
    assert_approx_eps(back.world_y, along, 1.0e-3);
    assert_approx_eps(back.world_rotation_x(), 45.0, 1.0e-2);
}

#[test]
fn percent_position_places_first_bone_at_the_end() {
    let skeleton = rail(|c| {
        c.position_mode = PositionMode::Percent;
        c.position = 1.0;
    });
    let front = &skeleton.bones[1];
    assert_approx_eps(front.world_x, 30.0, 1.0e-3);
    assert_approx_eps(front.world_y, 30.0, 1.0e-3);
}

#[test]
fn zero_translate_mix_only_rotates() {
    let skeleton = rail(|c| c.translate_mix = 0.0);
    let front = &skeleton.bones[1];
    assert_approx(front.world_x, 3.0);
    assert_approx(front.world_y, 0.0);
    assert_approx_eps(front.world_rotation_x(), 45.0, 1.0e-2);
}

#[test]
fn missing_path_attachment_leaves_bones() {
    let mut skeleton = rail(|_| {});
    skeleton.set_attachment("rail", None).expect("clear rail");
    skeleton.update_world_transform();
    assert_approx(skeleton.bones[2].world_x, 0.0);
    assert_approx(skeleton.bones[2].world_y, -4.0);
    assert_approx(skeleton.bones[2].world_rotation_x(), 0.0);
}
