use crate::runtime::test_rig::{assert_approx, mesh, Rig};
use crate::{
    AttachmentData, DeformTimeline, MeshVertices, MixBlend, MixDirection, Skeleton, Timeline,
    VertexWeight,
};

fn deform_id(skeleton: &Skeleton, slot_index: usize) -> u32 {
    skeleton
        .slot_attachment_data(slot_index)
        .and_then(AttachmentData::deform_attachment_id)
        .expect("vertex attachment")
}

fn triangle_skeleton() -> Skeleton {
    let vertices = MeshVertices::Unweighted(vec![[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]]);
    let data = Rig::new()
        .bone("body", "root", |b| b.x = 10.0)
        .slot("skin", "body", Some("tri"))
        .default_attachment("skin", mesh("tri", vertices))
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    skeleton
}

#[test]
fn unweighted_deform_replaces_positions() {
    let mut skeleton = triangle_skeleton();
    let mut keys = DeformTimeline::new(2, 0, deform_id(&skeleton, 0));
    keys.set_frame(0, 0.0, vec![0.0, 0.0, 4.0, 0.0, 0.0, 4.0]);
    keys.set_frame(1, 1.0, vec![2.0, 0.0, 6.0, 0.0, 2.0, 4.0]);
    let timeline = Timeline::Deform(keys);

    timeline.apply(&mut skeleton, -1.0, 0.5, None, 1.0, MixBlend::Setup, MixDirection::In);
    let world = skeleton.slot_world_vertices(0).expect("world vertices");
    assert_approx(world[0], 11.0);
    assert_approx(world[2], 15.0);
    assert_approx(world[4], 11.0);
    assert_approx(world[5], 4.0);
}

#[test]
fn unweighted_deform_mixes_from_setup_positions() {
    let mut skeleton = triangle_skeleton();
    let mut keys = DeformTimeline::new(1, 0, deform_id(&skeleton, 0));
    keys.set_frame(0, 0.0, vec![4.0, 0.0, 8.0, 0.0, 4.0, 4.0]);
    let timeline = Timeline::Deform(keys);

    timeline.apply(&mut skeleton, -1.0, 0.0, None, 0.5, MixBlend::Setup, MixDirection::In);
    assert_eq!(skeleton.slots[0].deform, vec![2.0, 0.0, 6.0, 0.0, 2.0, 4.0]);

    timeline.apply(&mut skeleton, -1.0, 0.0, None, 0.5, MixBlend::Add, MixDirection::In);
    assert_eq!(skeleton.slots[0].deform, vec![4.0, 0.0, 8.0, 0.0, 4.0, 4.0]);
}

#[test]
fn setup_blend_before_first_key_clears_deform() {
    let mut skeleton = triangle_skeleton();
    let mut keys = DeformTimeline::new(1, 0, deform_id(&skeleton, 0));
    keys.set_frame(0, 1.0, vec![9.0; 6]);
    let timeline = Timeline::Deform(keys);

    skeleton.slots[0].deform = vec![1.0; 6];
    timeline.apply(&mut skeleton, -1.0, 0.5, None, 1.0, MixBlend::Setup, MixDirection::In);
    assert!(skeleton.slots[0].deform.is_empty());
}

#[test]
fn deform_for_another_attachment_is_ignored() {
    let mut skeleton = triangle_skeleton();
    let other = deform_id(&skeleton, 0).wrapping_add(1000);
    let mut keys = DeformTimeline::new(1, 0, other);
    keys.set_frame(0, 0.0, vec![9.0; 6]);
    let timeline = Timeline::Deform(keys);

    timeline.apply(&mut skeleton, -1.0, 0.0, None, 1.0, MixBlend::Setup, MixDirection::In);
    assert!(skeleton.slots[0].deform.is_empty());
}

#[test]
fn weighted_deform_offsets_each_influence() {
    let vertices = MeshVertices::Weighted(vec![
        vec![VertexWeight {
            bone: 1,
            x: 1.0,
            y: 0.0,
            weight: 1.0,
        }],
        vec![
            VertexWeight {
                bone: 1,
                x: 0.0,
                y: 2.0,
                weight: 0.5,
            },
            VertexWeight {
                bone: 2,
                x: 0.0,
                y: 2.0,
                weight: 0.5,
            },
        ],
    ]);
    let data = Rig::new()
        .bone("left", "root", |b| b.x = -5.0)
        .bone("right", "root", |b| b.x = 5.0)
        .slot("cloth", "root", Some("sheet"))
        .default_attachment("cloth", mesh("sheet", vertices))
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();

    let world = skeleton.slot_world_vertices(0).expect("world vertices");
    assert_approx(world[0], -4.0);
    assert_approx(world[2], 0.0);
    assert_approx(world[3], 2.0);

    let mut keys = DeformTimeline::new(1, 0, deform_id(&skeleton, 0));
    keys.set_frame(0, 0.0, vec![3.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
    let timeline = Timeline::Deform(keys);
    timeline.apply(&mut skeleton, -1.0, 0.0, None, 1.0, MixBlend::Replace, MixDirection::In);

    let world = skeleton.slot_world_vertices(0).expect("world vertices");
    assert_approx(world[0], -1.0);
    assert_approx(world[1], 0.0);
    assert_approx(world[2], 0.0);
    assert_approx(world[3], 3.0);
}

#[test]
fn changing_attachment_drops_deform() {
    let mut skeleton = triangle_skeleton();
    skeleton.slots[0].deform = vec![1.0; 6];
    skeleton.set_attachment("skin", None).expect("clear");
    assert!(skeleton.slots[0].deform.is_empty());
}
