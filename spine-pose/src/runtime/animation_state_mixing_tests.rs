use crate::runtime::test_rig::{assert_approx, assert_approx_eps, region, rotate, translate, Rig};
use crate::{
    Animation, AnimationState, AnimationStateData, AnimationStateEvent, AnimationStateListener,
    AttachmentTimeline, Event, EventTimeline, MixBlend, Skeleton, SkeletonData, Timeline,
    TrackEntrySnapshot,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn rig() -> Arc<SkeletonData> {
    let mut ticks = EventTimeline::new(1);
    ticks.push(Event {
        time: 0.3,
        name: "tick".to_string(),
        int_value: 0,
        float_value: 0.0,
        string: String::new(),
        audio_path: String::new(),
        volume: 1.0,
        balance: 0.0,
    });
    let mut blink = AttachmentTimeline::new(1, 0);
    blink.set_frame(0, 0.0, Some("closed"));

    Rig::new()
        .bone("body", "root", |_| {})
        .slot("eyes", "body", Some("open"))
        .default_attachment("eyes", region("open", 4.0, 2.0))
        .default_attachment("eyes", region("closed", 4.0, 1.0))
        .animation(Animation::from_timelines("rest", Vec::new()))
        .animation(Animation::from_timelines(
            "slide",
            vec![translate(1, &[(0.0, 0.0, 0.0), (1.0, 100.0, 0.0)])],
        ))
        .animation(Animation::new("left", vec![translate(1, &[(0.0, 50.0, 0.0)])], 1.0))
        .animation(Animation::new("right", vec![translate(1, &[(0.0, 100.0, 0.0)])], 1.0))
        .animation(Animation::new("nudge", vec![translate(1, &[(0.0, 10.0, 0.0)])], 1.0))
        .animation(Animation::new("idle", vec![rotate(1, &[(0.0, 0.0)])], 1.0))
        .animation(Animation::new("tick", vec![Timeline::Event(ticks)], 1.0))
        .animation(Animation::new("blink", vec![Timeline::Attachment(blink)], 1.0))
        .build()
}

fn setup(default_mix: f32) -> (AnimationState, Skeleton) {
    let data = rig();
    let skeleton = Skeleton::new(Arc::clone(&data));
    let mut state_data = AnimationStateData::new(data);
    state_data.default_mix = default_mix;
    (AnimationState::new(state_data), skeleton)
}

fn step(state: &mut AnimationState, skeleton: &mut Skeleton, delta: f32) {
    state.update(delta);
    state.apply(skeleton);
}

#[test]
fn queued_mix_approaches_the_target_without_overshoot() {
    let (mut state, mut skeleton) = setup(0.0);
    state.data_mut().set_mix("rest", "slide", 0.2).expect("mix");
    state.set_animation(0, "rest", false).expect("rest");
    let slide = state.add_animation(0, "slide", false, 0.0).expect("slide");

    let mut previous = 0.0;
    for _ in 0..20 {
        step(&mut state, &mut skeleton, 0.05);
        let x = skeleton.bones[1].x;
        let target = if state.current(0) == Some(slide) {
            100.0 * state.track_entry(slide).expect("slide").animation_time()
        } else {
            0.0
        };
        assert!(x >= previous - 1.0e-4, "x went back from {previous} to {x}");
        assert!(x <= target + 1.0e-4, "x {x} overshot {target}");
        previous = x;
    }

    let entry = state.track_entry(slide).expect("slide");
    assert!(entry.mixing_from().is_none());
    assert_approx_eps(skeleton.bones[1].x, 100.0 * entry.animation_time(), 1.0e-3);
}

#[test]
fn crossfade_between_animations_keying_the_same_property() {
    let (mut state, mut skeleton) = setup(0.5);
    state.set_animation(0, "left", true).expect("left");
    step(&mut state, &mut skeleton, 0.1);
    assert_approx(skeleton.bones[1].x, 50.0);

    state.set_animation(0, "right", true).expect("right");
    step(&mut state, &mut skeleton, 0.25);
    assert_approx(skeleton.bones[1].x, 75.0);

    step(&mut state, &mut skeleton, 0.25);
    assert_approx(skeleton.bones[1].x, 100.0);
}

#[test]
fn crossfade_keeps_timeline_modes_between_frames() {
    let (mut state, mut skeleton) = setup(1.0);
    state.set_animation(0, "left", true).expect("left");
    step(&mut state, &mut skeleton, 0.1);

    state.set_animation(0, "right", true).expect("right");
    step(&mut state, &mut skeleton, 0.25);
    assert_approx(skeleton.bones[1].x, 62.5);
    // No entry changed, so this frame reuses the modes stored by the previous apply.
    step(&mut state, &mut skeleton, 0.25);
    assert_approx(skeleton.bones[1].x, 75.0);
}

#[test]
fn unkeyed_property_fades_back_to_setup() {
    let (mut state, mut skeleton) = setup(0.5);
    state.set_animation(0, "left", true).expect("left");
    step(&mut state, &mut skeleton, 0.1);

    state.set_animation(0, "idle", true).expect("idle");
    step(&mut state, &mut skeleton, 0.25);
    assert_approx(skeleton.bones[1].x, 25.0);
}

#[test]
fn hold_previous_keeps_the_outgoing_pose() {
    let (mut state, mut skeleton) = setup(0.5);
    state.set_animation(0, "left", true).expect("left");
    step(&mut state, &mut skeleton, 0.1);

    let idle = state.set_animation(0, "idle", true).expect("idle");
    idle.set_hold_previous(&mut state, true);
    step(&mut state, &mut skeleton, 0.25);
    assert_approx(skeleton.bones[1].x, 50.0);
}

#[test]
fn interrupted_mix_fades_held_timelines_with_the_newest_mix() {
    let (mut state, mut skeleton) = setup(0.5);
    state.set_animation(0, "left", true).expect("left");
    step(&mut state, &mut skeleton, 0.1);
    state.set_animation(0, "right", true).expect("right");
    step(&mut state, &mut skeleton, 0.1);
    assert_approx(skeleton.bones[1].x, 60.0);

    let idle = state.set_animation(0, "idle", true).expect("idle");
    assert_approx(state.track_entry(idle).expect("idle").interrupt_alpha, 0.2);
    step(&mut state, &mut skeleton, 0.1);
    // "left" is held but fades as "idle" mixes in: 50 * (1 - 0.1 / 0.5) = 40.
    // "right" then mixes from there with alpha 0.2 * (1 - 0.2).
    assert_approx_eps(skeleton.bones[1].x, 40.0 + 60.0 * 0.16, 1.0e-3);
}

#[test]
fn additive_track_adds_on_top_of_lower_tracks() {
    let (mut state, mut skeleton) = setup(0.0);
    state.set_animation(0, "left", true).expect("left");
    let nudge = state.set_animation(1, "nudge", true).expect("nudge");
    nudge.set_mix_blend(&mut state, MixBlend::Add);
    step(&mut state, &mut skeleton, 0.1);
    assert_approx(skeleton.bones[1].x, 60.0);
}

#[test]
fn higher_track_replaces_by_its_alpha() {
    let (mut state, mut skeleton) = setup(0.0);
    state.set_animation(0, "left", true).expect("left");
    let right = state.set_animation(1, "right", true).expect("right");
    right.set_alpha(&mut state, 0.5);
    step(&mut state, &mut skeleton, 0.1);
    assert_approx(skeleton.bones[1].x, 75.0);
}

#[test]
fn mixing_out_attachments_restore_setup_below_threshold() {
    let (mut state, mut skeleton) = setup(0.5);
    state.set_animation(0, "blink", true).expect("blink");
    step(&mut state, &mut skeleton, 0.1);
    assert_eq!(skeleton.slots[0].attachment.as_deref(), Some("closed"));

    state.set_animation(0, "idle", true).expect("idle");
    step(&mut state, &mut skeleton, 0.1);
    assert_eq!(skeleton.slots[0].attachment.as_deref(), Some("open"));
}

#[test]
fn attachment_threshold_keeps_keys_while_mixing_out() {
    let (mut state, mut skeleton) = setup(0.5);
    let blink = state.set_animation(0, "blink", true).expect("blink");
    blink.set_attachment_threshold(&mut state, 1.0);
    step(&mut state, &mut skeleton, 0.1);

    state.set_animation(0, "idle", true).expect("idle");
    step(&mut state, &mut skeleton, 0.1);
    assert_eq!(skeleton.slots[0].attachment.as_deref(), Some("closed"));
}

type Names = Rc<RefCell<Vec<String>>>;

struct EventNames(Names);

impl AnimationStateListener for EventNames {
    fn on_event(
        &mut self,
        _state: &mut AnimationState,
        _entry: &TrackEntrySnapshot,
        event: &AnimationStateEvent,
    ) {
        if let AnimationStateEvent::Event(event) = event {
            self.0.borrow_mut().push(event.name.clone());
        }
    }
}

fn events_while_mixing_out(threshold: Option<f32>) -> Vec<String> {
    let (mut state, mut skeleton) = setup(1.0);
    let names = Names::default();
    state.set_listener(EventNames(Rc::clone(&names)));
    let tick = state.set_animation(0, "tick", true).expect("tick");
    if let Some(threshold) = threshold {
        tick.set_event_threshold(&mut state, threshold);
    }
    step(&mut state, &mut skeleton, 0.1);
    state.set_animation(0, "idle", true).expect("idle");
    step(&mut state, &mut skeleton, 0.3);
    names.take()
}

#[test]
fn event_threshold_controls_events_from_mixing_out_entries() {
    assert!(events_while_mixing_out(None).is_empty());
    assert_eq!(events_while_mixing_out(Some(0.5)), ["tick"]);
}
