//! Per-frame gesture orchestration.
//!
//! A [`GestureSession`] owns one trail and one set of hold timers. Each call to
//! [`GestureSession::process_frame`] looks at how many hands the tracker saw,
//! runs the matching gesture logic and returns at most one event.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use weft_shared::{
    Circle, GestureEvent, GestureSettings, HandObservation, LandmarkFrame, Position, TrackedPoint,
};

use crate::clock::Clock;
use crate::hold::HoldTimer;
use crate::path::PathBuffer;
use crate::pose::PoseClassifier;

/// Caller-controlled inputs that accompany every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Pixel size used to scale normalized landmarks
    pub frame_width: f32,
    pub frame_height: f32,
    /// When false, the fingertip is not recorded even while pointing
    pub is_detecting: bool,
    /// When true, every hold is cancelled and cannot fire
    pub is_busy: bool,
}

impl FrameContext {
    pub fn new(frame_width: f32, frame_height: f32) -> Self {
        Self {
            frame_width,
            frame_height,
            is_detecting: true,
            is_busy: false,
        }
    }

    pub fn with_detecting(mut self, is_detecting: bool) -> Self {
        self.is_detecting = is_detecting;
        self
    }

    pub fn with_busy(mut self, is_busy: bool) -> Self {
        self.is_busy = is_busy;
        self
    }
}

#[derive(Debug)]
pub struct GestureSession {
    settings: GestureSettings,
    classifier: PoseClassifier,
    path: PathBuffer,
    photo_hold: HoldTimer,
    clear_hold: HoldTimer,
    point_hold: HoldTimer,
    /// Where the fingertip has been resting, for the point-and-hold fallback
    anchor: Option<Position>,
    last_event_ms: Option<u64>,
    last_frame_ms: Option<u64>,
}

impl GestureSession {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            classifier: PoseClassifier::new(settings.pose.clone()),
            path: PathBuffer::new(settings.circle.clone()),
            photo_hold: HoldTimer::new("photo capture", settings.hold.photo_capture_ms),
            clear_hold: HoldTimer::new("clear canvas", settings.hold.clear_canvas_ms),
            point_hold: HoldTimer::new("stationary point", settings.stationary.hold_ms),
            anchor: None,
            last_event_ms: None,
            last_frame_ms: None,
            settings,
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    /// Swap thresholds without losing the trail; running holds are cancelled
    pub fn set_settings(&mut self, settings: GestureSettings) {
        self.classifier = PoseClassifier::new(settings.pose.clone());
        self.path.set_settings(settings.circle.clone());
        self.photo_hold.set_duration_ms(settings.hold.photo_capture_ms);
        self.clear_hold.set_duration_ms(settings.hold.clear_canvas_ms);
        self.point_hold.set_duration_ms(settings.stationary.hold_ms);
        self.release_holds();
        self.settings = settings;
    }

    pub fn classifier(&self) -> &PoseClassifier {
        &self.classifier
    }

    pub fn path(&self) -> &PathBuffer {
        &self.path
    }

    pub fn photo_hold(&self) -> &HoldTimer {
        &self.photo_hold
    }

    pub fn clear_hold(&self) -> &HoldTimer {
        &self.clear_hold
    }

    pub fn point_hold(&self) -> &HoldTimer {
        &self.point_hold
    }

    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// Live trail as of the last processed frame, oldest first
    pub fn trail(&self) -> Vec<TrackedPoint> {
        match self.last_frame_ms {
            Some(now) => self.path.live_points(now).copied().collect(),
            None => self.path.snapshot(),
        }
    }

    /// Empty the trail and cancel every hold
    pub fn clear_canvas(&mut self) {
        self.path.clear();
        self.release_holds();
    }

    /// Back to a fresh session, also ending any gesture cooldown
    pub fn reset(&mut self) {
        self.clear_canvas();
        self.last_event_ms = None;
    }

    pub fn is_cooling_down(&self, now_ms: u64) -> bool {
        match self.last_event_ms {
            Some(last) => now_ms.saturating_sub(last) < self.settings.cooldown_ms,
            None => false,
        }
    }

    pub fn process_frame_with_clock<C: Clock + ?Sized>(
        &mut self,
        frame: &LandmarkFrame,
        ctx: &FrameContext,
        clock: &C,
    ) -> Option<GestureEvent> {
        self.process_frame(frame, ctx, clock.now_ms())
    }

    /// Run the gesture logic for one tracker frame
    pub fn process_frame(
        &mut self,
        frame: &LandmarkFrame,
        ctx: &FrameContext,
        now_ms: u64,
    ) -> Option<GestureEvent> {
        self.last_frame_ms = Some(now_ms);
        let cooling_down = self.is_cooling_down(now_ms);

        let event = match frame.hands.as_slice() {
            [] => {
                self.release_holds();
                None
            }
            [hand] => {
                self.photo_hold.cancel();
                self.clear_hold.cancel();
                self.process_single_hand(hand, ctx, now_ms, cooling_down)
            }
            [first, second] => {
                self.release_point_hold();
                self.process_two_hands(first, second, ctx, now_ms, cooling_down)
            }
            hands => {
                log::trace!("Ignoring frame with {} hands", hands.len());
                self.release_holds();
                None
            }
        };

        if let Some(ref event) = event {
            log::debug!("Gesture event at {}ms: {}", now_ms, event.as_str());
            self.last_event_ms = Some(now_ms);
        }

        event
    }

    fn process_two_hands(
        &mut self,
        first: &HandObservation,
        second: &HandObservation,
        ctx: &FrameContext,
        now_ms: u64,
        cooling_down: bool,
    ) -> Option<GestureEvent> {
        if ctx.is_busy || cooling_down {
            self.photo_hold.cancel();
            self.clear_hold.cancel();
            return None;
        }

        let photo = self.classifier.is_photo_capture_pose(first, second);
        // Photo capture wins whenever both poses read true
        let clear = !photo && self.classifier.is_clear_canvas_pose(first, second);
        log::trace!("Two hands: photo={} clear={}", photo, clear);

        if self.photo_hold.update(photo, now_ms) {
            self.clear_hold.cancel();
            return Some(GestureEvent::PhotoCaptureRequested);
        }

        if self.clear_hold.update(clear, now_ms) {
            return Some(GestureEvent::ClearCanvasRequested);
        }

        None
    }

    fn process_single_hand(
        &mut self,
        hand: &HandObservation,
        ctx: &FrameContext,
        now_ms: u64,
        cooling_down: bool,
    ) -> Option<GestureEvent> {
        if !ctx.is_detecting || !self.classifier.is_pointing(hand) {
            self.release_point_hold();
            return None;
        }

        let Some(tip) = hand.index_tip() else {
            self.release_point_hold();
            return None;
        };

        let position = tip.to_pixels(ctx.frame_width, ctx.frame_height);
        self.path.add_point(position, now_ms);

        if cooling_down {
            self.release_point_hold();
            self.path.evict_expired(now_ms);
            return None;
        }

        if let Some(circle) = self.path.detect_circle(now_ms) {
            // The trail stays on screen but cannot complete another circle
            self.path.mark_reported();
            self.release_point_hold();
            return Some(GestureEvent::CircleDetected { circle });
        }

        if !self.settings.stationary.enabled || ctx.is_busy {
            self.release_point_hold();
            return None;
        }

        self.track_stationary(position, now_ms)
    }

    /// Confirm a circle by resting the fingertip in one spot
    fn track_stationary(&mut self, position: Position, now_ms: u64) -> Option<GestureEvent> {
        let radius = self.settings.stationary.radius_px;
        let near_anchor = self
            .anchor
            .is_some_and(|anchor| anchor.distance_to(&position) <= radius);

        if !near_anchor {
            self.anchor = Some(position);
            self.point_hold.cancel();
        }

        if !self.point_hold.update(true, now_ms) {
            return None;
        }

        let center = self.anchor.take().unwrap_or(position);
        Some(GestureEvent::CircleDetected {
            circle: Circle {
                center,
                radius: self.settings.stationary.circle_radius_px,
                points: Vec::new(),
            },
        })
    }

    fn release_point_hold(&mut self) {
        self.point_hold.cancel();
        self.anchor = None;
    }

    fn release_holds(&mut self) {
        self.photo_hold.cancel();
        self.clear_hold.cancel();
        self.release_point_hold();
    }
}

impl Default for GestureSession {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}
