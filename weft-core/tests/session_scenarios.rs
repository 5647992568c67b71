use weft_core::{
    ClearPose, Clock, FrameContext, GestureEvent, GestureSession, GestureSettings,
    HandObservation, Handedness, HoldState, Landmark, LandmarkFrame, ManualClock, Position,
};
use weft_shared::{landmarks, LANDMARK_COUNT};

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

#[derive(Clone, Copy)]
enum Thumb {
    Up,
    Down,
    Side,
}

/// Builds a hand with the wrist at (0.5, 0.8); `extended` is index, middle,
/// ring, pinky
fn hand(thumb: Thumb, extended: [bool; 4]) -> HandObservation {
    let wrist = Landmark::new(0.5, 0.8);
    let mut points = vec![wrist; LANDMARK_COUNT];

    points[landmarks::THUMB_MCP] = Landmark::new(0.4, 0.7);
    points[landmarks::THUMB_TIP] = match thumb {
        Thumb::Up => Landmark::new(0.38, 0.6),
        Thumb::Down => Landmark::new(0.38, 0.8),
        Thumb::Side => Landmark::new(0.3, 0.7),
    };

    let fingers = [
        (landmarks::INDEX_TIP, landmarks::INDEX_PIP),
        (landmarks::MIDDLE_TIP, landmarks::MIDDLE_PIP),
        (landmarks::RING_TIP, landmarks::RING_PIP),
        (landmarks::PINKY_TIP, landmarks::PINKY_PIP),
    ];
    for (i, (tip, pip)) in fingers.into_iter().enumerate() {
        let x = 0.45 + 0.05 * i as f32;
        points[pip] = Landmark::new(x, 0.6);
        points[tip] = Landmark::new(x, if extended[i] { 0.4 } else { 0.68 });
    }

    HandObservation::new(points)
}

fn shifted(mut hand: HandObservation, dx: f32, dy: f32) -> HandObservation {
    for lm in hand.landmarks.iter_mut().flatten() {
        lm.x += dx;
        lm.y += dy;
    }
    hand
}

/// Pointing hand whose index fingertip lands on pixel `(x, y)`
fn pointing_at(x: f32, y: f32) -> HandObservation {
    let h = hand(Thumb::Side, [true, false, false, false]);
    let tip = h.index_tip().unwrap();
    shifted(h, x / WIDTH - tip.x, y / HEIGHT - tip.y)
}

fn closed_fist() -> HandObservation {
    hand(Thumb::Side, [false; 4])
}

fn thumbs_up() -> HandObservation {
    hand(Thumb::Up, [false; 4])
}

fn thumbs_down() -> HandObservation {
    hand(Thumb::Down, [false; 4])
}

fn one(h: HandObservation) -> LandmarkFrame {
    LandmarkFrame::new(vec![h])
}

fn two(a: HandObservation, b: HandObservation) -> LandmarkFrame {
    LandmarkFrame::new(vec![a, b])
}

fn ctx() -> FrameContext {
    FrameContext::new(WIDTH, HEIGHT)
}

/// Feeds the same frame every `step` ms over `[from, to]`, collecting events
fn hold_frame(
    session: &mut GestureSession,
    frame: &LandmarkFrame,
    from: u64,
    to: u64,
    step: u64,
) -> Vec<(u64, GestureEvent)> {
    let mut events = Vec::new();
    let mut now = from;
    while now <= to {
        if let Some(event) = session.process_frame(frame, &ctx(), now) {
            events.push((now, event));
        }
        now += step;
    }
    events
}

#[test]
fn test_traced_loop_emits_circle_on_final_frame() {
    let mut session = GestureSession::default();
    let frame_ms = 33;

    // Frames 1-5: hand visible but not pointing
    for frame in 1..=5u64 {
        let event = session.process_frame(&one(closed_fist()), &ctx(), (frame - 1) * frame_ms);
        assert!(event.is_none());
    }

    // Frames 6-30: 25 fingertip samples around a 200x180 loop centred on (640, 360)
    let mut emitted = None;
    for (i, frame) in (6..=30u64).enumerate() {
        let angle = std::f32::consts::TAU * i as f32 / 25.0;
        let x = 640.0 + 100.0 * angle.cos();
        let y = 360.0 + 90.0 * angle.sin();

        let event = session.process_frame(&one(pointing_at(x, y)), &ctx(), (frame - 1) * frame_ms);
        if frame < 30 {
            assert!(event.is_none(), "unexpected event on frame {}: {:?}", frame, event);
        } else {
            emitted = event;
        }
    }

    match emitted {
        Some(GestureEvent::CircleDetected { circle }) => {
            assert!(
                circle.center.distance_to(&Position::new(640.0, 360.0)) < 5.0,
                "center {:?}",
                circle.center
            );
            assert!(
                (circle.radius - 100.0).abs() <= 10.0,
                "radius {}",
                circle.radius
            );
            assert_eq!(circle.points.len(), 25);
        }
        other => panic!("expected a circle on frame 30, got {:?}", other),
    }
}

#[test]
fn test_one_loop_reports_one_circle() {
    let mut session = GestureSession::default();
    assert_eq!(session.settings().cooldown_ms, 0);

    // One full loop, then keep moving around it for another ten frames
    let mut circle_frames = Vec::new();
    for i in 0..35u64 {
        let angle = std::f32::consts::TAU * i as f32 / 25.0;
        let x = 640.0 + 100.0 * angle.cos();
        let y = 360.0 + 90.0 * angle.sin();
        let event = session.process_frame(&one(pointing_at(x, y)), &ctx(), i * 33);
        if matches!(event, Some(GestureEvent::CircleDetected { .. })) {
            circle_frames.push(i);
        }
    }

    assert_eq!(circle_frames, vec![24]);
    assert_eq!(session.trail().len(), 35);
}

#[test]
fn test_photo_capture_fires_once_after_hold() {
    let mut session = GestureSession::default();
    let frame = two(thumbs_up(), thumbs_up());

    let events = hold_frame(&mut session, &frame, 0, 1900, 100);
    assert!(events.is_empty());

    let events = hold_frame(&mut session, &frame, 2000, 2500, 100);
    assert_eq!(events, vec![(2000, GestureEvent::PhotoCaptureRequested)]);
}

#[test]
fn test_photo_capture_interrupted_by_single_hand() {
    let mut session = GestureSession::default();
    let frame = two(thumbs_up(), thumbs_up());

    assert!(hold_frame(&mut session, &frame, 0, 1400, 100).is_empty());
    assert!(session
        .process_frame(&one(thumbs_up()), &ctx(), 1500)
        .is_none());
    assert_eq!(session.photo_hold().state(), HoldState::Idle);

    let events = hold_frame(&mut session, &frame, 1600, 3600, 100);
    assert_eq!(events, vec![(3600, GestureEvent::PhotoCaptureRequested)]);
}

#[test]
fn test_clear_canvas_after_thumbs_down() {
    let mut session = GestureSession::default();
    let frame = two(thumbs_down(), thumbs_down());

    let events = hold_frame(&mut session, &frame, 0, 1500, 100);
    assert_eq!(events, vec![(1000, GestureEvent::ClearCanvasRequested)]);
}

#[test]
fn test_photo_capture_beats_clear_canvas() {
    let mut settings = GestureSettings::default();
    settings.pose.clear_pose = ClearPose::CrossedWrists;
    let mut session = GestureSession::new(settings);

    // Thumbs up with crossed wrists satisfies both poses
    let left = shifted(thumbs_up(), 0.2, 0.0).with_handedness(Handedness::Left);
    let right = shifted(thumbs_up(), -0.2, 0.0).with_handedness(Handedness::Right);
    assert!(session.classifier().is_photo_capture_pose(&left, &right));
    assert!(session.classifier().is_clear_canvas_pose(&left, &right));
    let frame = two(left, right);

    let mut now = 0;
    while now < 2000 {
        assert!(session.process_frame(&frame, &ctx(), now).is_none());
        assert_eq!(session.clear_hold().state(), HoldState::Idle);
        assert!(session.photo_hold().is_holding());
        now += 100;
    }

    assert_eq!(
        session.process_frame(&frame, &ctx(), 2000),
        Some(GestureEvent::PhotoCaptureRequested)
    );
    assert_eq!(session.clear_hold().state(), HoldState::Idle);
}

#[test]
fn test_crossed_wrists_clear_gesture() {
    let mut settings = GestureSettings::default();
    settings.pose.clear_pose = ClearPose::CrossedWrists;
    let mut session = GestureSession::new(settings);

    let left = shifted(closed_fist(), 0.2, 0.0).with_handedness(Handedness::Left);
    let right = shifted(closed_fist(), -0.2, 0.0).with_handedness(Handedness::Right);
    let events = hold_frame(&mut session, &two(left, right), 0, 1200, 100);
    assert_eq!(events, vec![(1000, GestureEvent::ClearCanvasRequested)]);

    // Thumbs down is not a clear gesture under this configuration
    let mut session = GestureSession::new(session.settings().clone());
    let events = hold_frame(&mut session, &two(thumbs_down(), thumbs_down()), 0, 3000, 100);
    assert!(events.is_empty());
}

#[test]
fn test_busy_cancels_two_hand_holds() {
    let mut session = GestureSession::default();
    let frame = two(thumbs_up(), thumbs_up());

    assert!(hold_frame(&mut session, &frame, 0, 1500, 100).is_empty());
    assert!(session.photo_hold().is_holding());

    let busy = ctx().with_busy(true);
    assert!(session.process_frame(&frame, &busy, 2000).is_none());
    assert!(session.process_frame(&frame, &busy, 2500).is_none());
    assert_eq!(session.photo_hold().state(), HoldState::Idle);
    assert_eq!(session.clear_hold().state(), HoldState::Idle);

    // Not busy any more: the hold starts over
    assert!(session.process_frame(&frame, &ctx(), 2600).is_none());
    assert!(session.process_frame(&frame, &ctx(), 4500).is_none());
    assert_eq!(
        session.process_frame(&frame, &ctx(), 4600),
        Some(GestureEvent::PhotoCaptureRequested)
    );
}

#[test]
fn test_missing_index_tip_is_harmless() {
    let mut session = GestureSession::default();
    let mut h = pointing_at(400.0, 300.0);
    h.landmarks[landmarks::INDEX_TIP] = None;

    for now in (0..2000).step_by(100) {
        assert!(session.process_frame(&one(h.clone()), &ctx(), now).is_none());
    }
    assert!(session.trail().is_empty());

    let events = hold_frame(&mut session, &two(h.clone(), h), 2000, 5000, 100);
    assert!(events.is_empty());
}

#[test]
fn test_lost_tracking_keeps_trail() {
    let mut session = GestureSession::default();
    for i in 0..10u64 {
        let x = 300.0 + 30.0 * i as f32;
        session.process_frame(&one(pointing_at(x, 300.0)), &ctx(), i * 33);
    }
    assert_eq!(session.trail().len(), 10);

    assert!(session
        .process_frame(&LandmarkFrame::empty(), &ctx(), 400)
        .is_none());
    assert_eq!(session.trail().len(), 10);
    assert!(session.anchor().is_none());
    assert!(!session.point_hold().is_holding());
}

#[test]
fn test_trail_ages_out() {
    let mut session = GestureSession::default();
    for i in 0..10u64 {
        let x = 300.0 + 30.0 * i as f32;
        session.process_frame(&one(pointing_at(x, 300.0)), &ctx(), i * 33);
    }

    session.process_frame(&LandmarkFrame::empty(), &ctx(), 5000);
    assert!(session.trail().is_empty());
}

#[test]
fn test_detection_gate() {
    let mut session = GestureSession::default();
    let paused = ctx().with_detecting(false);

    for now in (0..3000).step_by(100) {
        let event = session.process_frame(&one(pointing_at(500.0, 400.0)), &paused, now);
        assert!(event.is_none());
    }
    assert!(session.trail().is_empty());
}

#[test]
fn test_point_and_hold_confirms_circle() {
    let mut session = GestureSession::default();
    let jitter = [(0.0, 0.0), (2.0, -1.0), (-3.0, 2.0), (1.0, 3.0), (-2.0, -2.0)];

    let mut events = Vec::new();
    for (i, now) in (0..=1200u64).step_by(100).enumerate() {
        let (jx, jy) = jitter[i % jitter.len()];
        let frame = one(pointing_at(400.0 + jx, 300.0 + jy));
        if let Some(event) = session.process_frame(&frame, &ctx(), now) {
            events.push((now, event));
        }
    }

    assert_eq!(events.len(), 1);
    let (at, event) = &events[0];
    assert_eq!(*at, 1000);
    match event {
        GestureEvent::CircleDetected { circle } => {
            assert!(circle.center.distance_to(&Position::new(400.0, 300.0)) < 0.5);
            assert_eq!(circle.radius, 120.0);
            assert!(circle.points.is_empty());
        }
        other => panic!("expected a circle, got {:?}", other),
    }
}

#[test]
fn test_point_and_hold_restarts_after_moving() {
    let mut session = GestureSession::default();

    let first = hold_frame(&mut session, &one(pointing_at(400.0, 300.0)), 0, 500, 100);
    assert!(first.is_empty());

    // 20px away: new anchor, new hold
    let moved = hold_frame(&mut session, &one(pointing_at(420.0, 300.0)), 600, 1700, 100);
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].0, 1600);
}

#[test]
fn test_stationary_fallback_can_be_disabled() {
    let mut settings = GestureSettings::default();
    settings.stationary.enabled = false;
    let mut session = GestureSession::new(settings);

    let events = hold_frame(&mut session, &one(pointing_at(400.0, 300.0)), 0, 3000, 100);
    assert!(events.is_empty());
}

#[test]
fn test_busy_blocks_point_and_hold() {
    let mut session = GestureSession::default();
    let busy = ctx().with_busy(true);

    let mut now = 0;
    while now <= 2000 {
        let event = session.process_frame(&one(pointing_at(400.0, 300.0)), &busy, now);
        assert!(event.is_none());
        assert!(!session.point_hold().is_holding());
        now += 100;
    }
}

#[test]
fn test_cooldown_spaces_out_events() {
    let mut session = GestureSession::new(GestureSettings::recommended());

    let events = hold_frame(&mut session, &one(pointing_at(400.0, 300.0)), 0, 3500, 100);
    let times: Vec<u64> = events.iter().map(|(at, _)| *at).collect();
    assert_eq!(times, vec![1000, 3000]);
}

#[test]
fn test_clear_canvas_and_reset() {
    let mut session = GestureSession::new(GestureSettings::recommended());
    for i in 0..10u64 {
        let x = 300.0 + 30.0 * i as f32;
        session.process_frame(&one(pointing_at(x, 300.0)), &ctx(), i * 33);
    }
    hold_frame(&mut session, &two(thumbs_up(), thumbs_up()), 400, 800, 100);
    assert!(session.photo_hold().is_holding());

    session.clear_canvas();
    assert!(session.trail().is_empty());
    assert!(!session.photo_hold().is_holding());

    // Fire an event, then reset lifts the cooldown
    let events = hold_frame(&mut session, &two(thumbs_down(), thumbs_down()), 1000, 2000, 100);
    assert_eq!(events.len(), 1);
    assert!(session.is_cooling_down(2100));
    session.reset();
    assert!(!session.is_cooling_down(2100));
}

#[test]
fn test_process_frame_with_clock() {
    let mut session = GestureSession::default();
    let clock = ManualClock::new(0);
    let frame = two(thumbs_down(), thumbs_down());

    assert!(session
        .process_frame_with_clock(&frame, &ctx(), &clock)
        .is_none());
    clock.advance(1000);
    assert_eq!(clock.now_ms(), 1000);
    assert_eq!(
        session.process_frame_with_clock(&frame, &ctx(), &clock),
        Some(GestureEvent::ClearCanvasRequested)
    );
}
