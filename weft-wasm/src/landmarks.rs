use js_sys::{Array, Reflect};
use wasm_bindgen::prelude::*;
use weft_core::Clock;
use weft_shared::{HandObservation, Handedness, Landmark, LandmarkFrame};

/// Read a numeric property, treating anything else as absent
fn number(obj: &JsValue, key: &str) -> Option<f32> {
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
        .map(|v| v as f32)
}

/// One `{x, y}` keypoint; entries without numeric coordinates are missing
fn parse_landmark(value: &JsValue) -> Option<Landmark> {
    if !value.is_object() {
        return None;
    }
    Some(Landmark::new(number(value, "x")?, number(value, "y")?))
}

/// Accepts `"Left"` / `"Right"` or a classification object with a `label`
pub fn parse_handedness(value: &JsValue) -> Option<Handedness> {
    let label = match value.as_string() {
        Some(label) => label,
        None if value.is_object() => Reflect::get(value, &JsValue::from_str("label"))
            .ok()?
            .as_string()?,
        None => return None,
    };

    match label.as_str() {
        "Left" | "left" => Some(Handedness::Left),
        "Right" | "right" => Some(Handedness::Right),
        _ => None,
    }
}

pub fn parse_hand(value: &JsValue) -> Result<HandObservation, JsValue> {
    if !Array::is_array(value) {
        return Err(JsValue::from_str("hand must be an array of landmarks"));
    }

    let points = Array::from(value);
    let landmarks = points.iter().map(|p| parse_landmark(&p)).collect();
    Ok(HandObservation {
        landmarks,
        handedness: None,
    })
}

/// Build a frame from tracker output; `handedness` may be shorter than `hands`
pub fn parse_frame(hands: &Array, handedness: &Array) -> Result<LandmarkFrame, JsValue> {
    let mut parsed = Vec::with_capacity(hands.length() as usize);
    for (i, hand) in hands.iter().enumerate() {
        let mut observation = parse_hand(&hand)?;
        observation.handedness = parse_handedness(&handedness.get(i as u32));
        parsed.push(observation);
    }
    Ok(LandmarkFrame::new(parsed))
}

/// Milliseconds from `performance.now()`, falling back to `Date.now()`
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
}

impl PerformanceClock {
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|w| w.performance()),
        }
    }
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> u64 {
        match &self.performance {
            Some(performance) => performance.now() as u64,
            None => js_sys::Date::now() as u64,
        }
    }
}
