mod landmarks;

use js_sys::{Array, Float32Array};
use wasm_bindgen::prelude::*;
use weft_core::{
    ClearPose, Clock, FrameContext, GestureEvent, GestureSession, GestureSettings, TrackedPoint,
};

pub use landmarks::{parse_frame, parse_hand, parse_handedness, PerformanceClock};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

/// Interleave trail points as `[x0, y0, x1, y1, ...]`
fn flatten_trail(points: &[TrackedPoint]) -> Vec<f32> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

fn parse_clear_pose(name: &str) -> Option<ClearPose> {
    match name {
        "thumbs-down" | "thumbsDown" => Some(ClearPose::ThumbsDown),
        "crossed-wrists" | "crossedWrists" => Some(ClearPose::CrossedWrists),
        _ => None,
    }
}

fn event_to_js(event: &GestureEvent) -> Result<JsValue, JsValue> {
    let json = event
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

#[wasm_bindgen]
pub struct GestureTracker {
    session: GestureSession,
    clock: PerformanceClock,
    width: f32,
    height: f32,
}

#[wasm_bindgen]
impl GestureTracker {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> GestureTracker {
        console_log!("Initializing gesture tracker at {}x{}", width, height);
        GestureTracker {
            session: GestureSession::new(GestureSettings::recommended()),
            clock: PerformanceClock::new(),
            width,
            height,
        }
    }

    /// Process one tracker result; returns the event object or `null`
    pub fn process_frame(
        &mut self,
        hands: &Array,
        handedness: &Array,
        is_detecting: bool,
        is_busy: bool,
    ) -> Result<JsValue, JsValue> {
        let now_ms = self.clock.now_ms() as f64;
        self.process_frame_at(hands, handedness, is_detecting, is_busy, now_ms)
    }

    /// Same as `process_frame` with a caller-supplied timestamp
    pub fn process_frame_at(
        &mut self,
        hands: &Array,
        handedness: &Array,
        is_detecting: bool,
        is_busy: bool,
        now_ms: f64,
    ) -> Result<JsValue, JsValue> {
        let frame = parse_frame(hands, handedness)?;
        let ctx = FrameContext::new(self.width, self.height)
            .with_detecting(is_detecting)
            .with_busy(is_busy);

        match self.session.process_frame(&frame, &ctx, now_ms.max(0.0) as u64) {
            Some(event) => {
                console_log!("Gesture: {}", event.as_str());
                event_to_js(&event)
            }
            None => Ok(JsValue::NULL),
        }
    }

    pub fn clear_canvas(&mut self) {
        self.session.clear_canvas();
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Live trail as interleaved x, y pixel coordinates
    pub fn trail(&self) -> Float32Array {
        let flat = flatten_trail(&self.session.trail());
        Float32Array::from(flat.as_slice())
    }

    pub fn trail_len(&self) -> usize {
        self.session.trail().len()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        console_log!("Resized to {}x{}", width, height);
    }

    pub fn set_cooldown_ms(&mut self, cooldown_ms: u32) {
        self.update_settings(|s| s.cooldown_ms = cooldown_ms as u64);
    }

    pub fn set_photo_hold_ms(&mut self, hold_ms: u32) {
        self.update_settings(|s| s.hold.photo_capture_ms = hold_ms as u64);
    }

    pub fn set_clear_hold_ms(&mut self, hold_ms: u32) {
        self.update_settings(|s| s.hold.clear_canvas_ms = hold_ms as u64);
    }

    pub fn set_min_points(&mut self, min_points: usize) {
        self.update_settings(|s| s.circle.min_points = min_points);
    }

    pub fn set_confidence_threshold(&mut self, threshold: f32) {
        self.update_settings(|s| s.circle.confidence_threshold = threshold);
    }

    pub fn set_stationary_enabled(&mut self, enabled: bool) {
        self.update_settings(|s| s.stationary.enabled = enabled);
    }

    pub fn set_clear_pose(&mut self, name: &str) -> Result<(), JsValue> {
        let pose = parse_clear_pose(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown clear pose: {}", name)))?;
        self.update_settings(|s| s.pose.clear_pose = pose);
        Ok(())
    }
}

impl GestureTracker {
    fn update_settings(&mut self, apply: impl FnOnce(&mut GestureSettings)) {
        let mut settings = self.session.settings().clone();
        apply(&mut settings);
        self.session.set_settings(settings);
    }
}
