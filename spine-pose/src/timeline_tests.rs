use crate::{
    binary_search, linear_search, wrap_degrees, Animation, CurveType, Curves, RotateTimeline,
    Timeline, TimelineType, Vec2Timeline,
};

#[test]
fn binary_search_matches_linear_scan() {
    let frames = [0.0, 1.0, 0.25, 2.0, 0.5, 3.0, 0.5, 4.0, 1.0, 5.0];
    let times = [-1.0, 0.0, 0.1, 0.25, 0.3, 0.5, 0.75, 1.0, 1.5];
    for &time in &times {
        assert_eq!(
            binary_search(&frames, time, 2),
            linear_search(&frames, time, 2),
            "time {time}"
        );
    }
}

#[test]
fn binary_search_returns_first_later_keyframe() {
    let frames = [0.0, 0.5, 1.0];
    assert_eq!(binary_search(&frames, -0.1, 1), 0);
    assert_eq!(binary_search(&frames, 0.0, 1), 1);
    assert_eq!(binary_search(&frames, 0.5, 1), 2);
    assert_eq!(binary_search(&frames, 2.0, 1), 3);
}

#[test]
fn curve_percent_endpoints_and_monotonic() {
    let mut curves = Curves::new(3);
    curves.set_curve(0, 0.25, 0.1, 0.25, 1.0);
    curves.set_curve(1, 0.9, 0.0, 0.1, 1.0);
    for frame in 0..2 {
        assert_eq!(curves.curve_type(frame), CurveType::Bezier);
        assert!(curves.curve_percent(frame, 0.0).abs() <= 1.0e-6);
        assert!((curves.curve_percent(frame, 1.0) - 1.0).abs() <= 1.0e-6);
        let mut last = 0.0;
        for step in 0..=100 {
            let p = curves.curve_percent(frame, step as f32 / 100.0);
            assert!(p + 1.0e-6 >= last, "frame {frame} step {step}: {p} < {last}");
            last = p;
        }
    }
}

#[test]
fn linear_and_stepped_curves() {
    let mut curves = Curves::new(3);
    assert_eq!(curves.curve_type(0), CurveType::Linear);
    assert_eq!(curves.curve_percent(0, 0.3), 0.3);
    curves.set_stepped(1);
    assert_eq!(curves.curve_type(1), CurveType::Stepped);
    assert_eq!(curves.curve_percent(1, 0.9), 0.0);
    curves.set_linear(1);
    assert_eq!(curves.curve_percent(1, 0.9), 0.9);
}

#[test]
fn wrap_degrees_range() {
    assert_eq!(wrap_degrees(180.0), 180.0);
    assert_eq!(wrap_degrees(-180.0), 180.0);
    assert!((wrap_degrees(190.0) + 170.0).abs() < 1.0e-4);
    assert!((wrap_degrees(-190.0) - 170.0).abs() < 1.0e-4);
    assert!((wrap_degrees(720.0 + 45.0) - 45.0).abs() < 1.0e-3);
    assert_eq!(wrap_degrees(0.0), 0.0);
}

#[test]
fn property_ids_distinguish_kind_and_target() {
    let rotate0 = Timeline::Rotate(RotateTimeline::new(1, 0));
    let rotate1 = Timeline::Rotate(RotateTimeline::new(1, 1));
    let translate0 = Timeline::Translate(Vec2Timeline::new(1, 0));
    let scale0 = Timeline::Scale(Vec2Timeline::new(1, 0));
    assert_eq!(rotate0.timeline_type(), TimelineType::Rotate);
    assert_ne!(rotate0.property_id(), rotate1.property_id());
    assert_ne!(rotate0.property_id(), translate0.property_id());
    assert_ne!(translate0.property_id(), scale0.property_id());
}

#[test]
fn animation_duration_from_last_keyframe() {
    let mut rotate = RotateTimeline::new(2, 0);
    rotate.set_frame(0, 0.0, 0.0);
    rotate.set_frame(1, 0.75, 90.0);
    let mut translate = Vec2Timeline::new(2, 0);
    translate.set_frame(0, 0.0, 0.0, 0.0);
    translate.set_frame(1, 1.25, 5.0, 5.0);
    let rotate = Timeline::Rotate(rotate);
    let id = rotate.property_id();
    let animation =
        Animation::from_timelines("walk", vec![rotate, Timeline::Translate(translate)]);
    assert_eq!(animation.duration, 1.25);
    assert!(animation.has_timeline(id));
    assert!(!animation.has_timeline(Timeline::Shear(Vec2Timeline::new(1, 0)).property_id()));
}

#[test]
fn curves_report_their_frame_count() {
    assert_eq!(Curves::new(0).frame_count(), 0);
    assert_eq!(Curves::default().frame_count(), 0);
    assert_eq!(Curves::new(1).frame_count(), 1);
    assert_eq!(Curves::new(4).frame_count(), 4);
}
