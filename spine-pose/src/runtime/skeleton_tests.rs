use crate::runtime::test_rig::{assert_approx, ik_data, region, Rig};
use crate::{
    AttachmentData, Error, PointAttachmentData, Skeleton, SkinData, UpdateCacheItem,
};

fn position(items: &[UpdateCacheItem], item: UpdateCacheItem) -> usize {
    items
        .iter()
        .position(|&i| i == item)
        .unwrap_or_else(|| panic!("{item:?} missing from {items:?}"))
}

#[test]
fn update_cache_orders_parents_constraints_and_children() {
    let rig = Rig::new()
        .bone("upper", "root", |b| b.length = 10.0)
        .bone("lower", "upper", |b| {
            b.x = 10.0;
            b.length = 10.0;
        })
        .bone("hand", "lower", |b| b.x = 10.0)
        .bone("target", "root", |b| b.x = 12.0);
    let (upper, lower, hand, target) = (
        rig.bone_index("upper"),
        rig.bone_index("lower"),
        rig.bone_index("hand"),
        rig.bone_index("target"),
    );
    let data = rig.ik(ik_data("reach", vec![upper, lower], target)).build();
    let skeleton = Skeleton::new(data);
    let items = skeleton.update_cache_items();

    let ik = position(items, UpdateCacheItem::Ik(0));
    assert!(position(items, UpdateCacheItem::Bone(0)) < position(items, UpdateCacheItem::Bone(upper)));
    assert!(position(items, UpdateCacheItem::Bone(target)) < ik);
    assert!(position(items, UpdateCacheItem::Bone(upper)) < ik);
    // The solver computes the constrained child itself; its children follow.
    assert!(!items.contains(&UpdateCacheItem::Bone(lower)));
    assert!(position(items, UpdateCacheItem::Bone(hand)) > ik);
    assert!(skeleton.ik_constraints[0].active);
}

#[test]
fn constraint_order_decides_cache_order() {
    let rig = Rig::new()
        .bone("a", "root", |_| {})
        .bone("b", "root", |_| {})
        .bone("t", "root", |_| {});
    let (a, b, t) = (rig.bone_index("a"), rig.bone_index("b"), rig.bone_index("t"));
    let mut first = ik_data("first", vec![b], t);
    first.order = 2;
    let mut second = ik_data("second", vec![a], t);
    second.order = 1;
    let data = rig.ik(first).ik(second).build();
    let skeleton = Skeleton::new(data);
    let items = skeleton.update_cache_items();
    assert!(position(items, UpdateCacheItem::Ik(1)) < position(items, UpdateCacheItem::Ik(0)));
}

#[test]
fn skin_required_bones_follow_the_skin() {
    let rig = Rig::new().bone("cape", "root", |b| b.skin_required = true);
    let cape = rig.bone_index("cape");
    let mut skin = SkinData::new("hero");
    skin.bones.push(cape);
    let data = rig.skin(skin).build();

    let mut skeleton = Skeleton::new(data);
    assert!(!skeleton.bones[cape].active);
    assert!(!skeleton
        .update_cache_items()
        .contains(&UpdateCacheItem::Bone(cape)));

    skeleton.set_skin(Some("hero")).expect("skin");
    assert!(skeleton.bones[cape].active);
    assert!(skeleton
        .update_cache_items()
        .contains(&UpdateCacheItem::Bone(cape)));
}

#[test]
fn set_skin_swaps_attachments_by_name() {
    let data = Rig::new()
        .slot("body", "root", Some("torso"))
        .attachment("red", "body", region("torso", 10.0, 10.0))
        .attachment("blue", "body", region("torso", 20.0, 20.0))
        .build();
    let mut skeleton = Skeleton::new(data);
    assert_eq!(skeleton.slots[0].attachment, None);

    skeleton.set_skin(Some("red")).expect("red");
    assert_eq!(skeleton.slots[0].attachment.as_deref(), Some("torso"));
    assert_eq!(skeleton.slots[0].attachment_skin(), Some("red"));

    skeleton.set_skin(Some("blue")).expect("blue");
    assert_eq!(skeleton.slots[0].attachment_skin(), Some("blue"));
    let Some(AttachmentData::Region(region)) = skeleton.slot_attachment_data(0) else {
        panic!("expected a region");
    };
    assert_eq!(region.width, 20.0);

    assert!(matches!(
        skeleton.set_skin(Some("green")),
        Err(Error::UnknownSkin { name }) if name == "green"
    ));
}

#[test]
fn set_attachment_validates_names() {
    let data = Rig::new()
        .slot("body", "root", Some("torso"))
        .default_attachment("body", region("torso", 10.0, 10.0))
        .default_attachment("body", region("torso-hurt", 10.0, 10.0))
        .build();
    let mut skeleton = Skeleton::new(data);
    assert_eq!(skeleton.slots[0].attachment.as_deref(), Some("torso"));

    skeleton
        .set_attachment("body", Some("torso-hurt"))
        .expect("known attachment");
    assert_eq!(skeleton.slots[0].attachment.as_deref(), Some("torso-hurt"));

    assert!(matches!(
        skeleton.set_attachment("legs", None),
        Err(Error::UnknownSlot { .. })
    ));
    assert!(matches!(
        skeleton.set_attachment("body", Some("wings")),
        Err(Error::UnknownAttachment { slot, name }) if slot == "body" && name == "wings"
    ));

    skeleton.set_attachment("body", None).expect("clear");
    assert_eq!(skeleton.slots[0].attachment, None);
}

#[test]
fn attachment_time_follows_skeleton_clock() {
    let data = Rig::new()
        .slot("body", "root", None)
        .default_attachment("body", region("torso", 10.0, 10.0))
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update(2.0);
    skeleton.set_attachment("body", Some("torso")).expect("attach");
    assert_approx(skeleton.slot_attachment_time(0), 0.0);
    skeleton.update(0.5);
    assert_approx(skeleton.slot_attachment_time(0), 0.5);
    skeleton.set_slot_attachment_time(0, 3.0);
    assert_approx(skeleton.slot_attachment_time(0), 3.0);
}

#[test]
fn slots_setup_pose_restores_color_and_draw_order() {
    let data = Rig::new()
        .slot("back", "root", None)
        .slot("front", "root", None)
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.draw_order = vec![1, 0];
    skeleton.slots[0].color = [0.0, 0.5, 0.5, 0.25];
    skeleton.set_slots_to_setup_pose();
    assert_eq!(skeleton.draw_order, vec![0, 1]);
    assert_eq!(skeleton.slots[0].color, [1.0; 4]);
}

#[test]
fn bounds_cover_region_corners() {
    let data = Rig::new()
        .bone("body", "root", |b| {
            b.x = 5.0;
            b.y = 5.0;
        })
        .slot("torso", "body", Some("box"))
        .default_attachment("torso", region("box", 10.0, 20.0))
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    let bounds = skeleton.bounds().expect("bounds");
    assert_approx(bounds.x, 0.0);
    assert_approx(bounds.y, -5.0);
    assert_approx(bounds.width, 10.0);
    assert_approx(bounds.height, 20.0);
}

#[test]
fn bounds_empty_without_attachments() {
    let data = Rig::new().slot("empty", "root", None).build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    assert!(skeleton.bounds().is_none());
}

#[test]
fn point_attachment_follows_bone() {
    let data = Rig::new()
        .bone("gun", "root", |b| {
            b.x = 3.0;
            b.rotation = 90.0;
        })
        .build();
    let mut skeleton = Skeleton::new(data);
    skeleton.update_world_transform();
    let point = PointAttachmentData {
        name: "muzzle".to_string(),
        x: 2.0,
        y: 0.0,
        rotation: 10.0,
    };
    let bone = &skeleton.bones[1];
    let [x, y] = point.compute_world_position(bone);
    assert_approx(x, 3.0);
    assert_approx(y, 2.0);
    assert_approx(point.compute_world_rotation(bone), 100.0);
}

#[test]
fn find_by_name() {
    let data = Rig::new()
        .bone("arm", "root", |_| {})
        .slot("hand", "arm", None)
        .build();
    let skeleton = Skeleton::new(data);
    assert_eq!(skeleton.find_bone("arm"), Some(1));
    assert_eq!(skeleton.find_slot("hand"), Some(0));
    assert_eq!(skeleton.find_bone("leg"), None);
    assert_eq!(skeleton.find_ik_constraint("reach"), None);
}
