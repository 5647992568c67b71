#![cfg_attr(not(feature = "std"), no_std)]

//! Data contract between the hand-landmark tracker, the gesture core and
//! whatever host renders the trail and acts on gesture events.
//!
//! Landmarks arrive normalized to the frame (`[0,1]` on both axes); everything
//! the core derives from them (tracked points, circles) is in pixels.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// Number of keypoints the tracker reports per hand
pub const LANDMARK_COUNT: usize = 21;

/// Hand landmark indices (standard 21-point hand topology)
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

/// Represents a 2D position in screen coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another position
    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        libm::sqrtf(dx * dx + dy * dy)
    }
}

/// A single keypoint, normalized to the frame width/height
///
/// Trackers usually send more than `x`/`y` (depth, visibility); those fields
/// are ignored on deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        libm::sqrtf(dx * dx + dy * dy)
    }

    /// Scale to pixel coordinates of a `width` x `height` frame
    pub fn to_pixels(&self, width: f32, height: f32) -> Position {
        Position::new(self.x * width, self.y * height)
    }
}

/// Left/right label the tracker attaches to a hand
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

/// One detected hand: 21 landmark slots plus an optional handedness label
///
/// A slot can be absent, either because the sequence is short or because the
/// tracker sent `null` for it. Absent and non-finite landmarks both read back
/// as `None` from [`HandObservation::landmark`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandObservation {
    pub landmarks: Vec<Option<Landmark>>,
    #[serde(default)]
    pub handedness: Option<Handedness>,
}

impl HandObservation {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks: landmarks.into_iter().map(Some).collect(),
            handedness: None,
        }
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = Some(handedness);
        self
    }

    pub fn landmark(&self, index: usize) -> Option<Landmark> {
        self.landmarks
            .get(index)
            .copied()
            .flatten()
            .filter(Landmark::is_finite)
    }

    pub fn wrist(&self) -> Option<Landmark> {
        self.landmark(landmarks::WRIST)
    }

    pub fn index_tip(&self) -> Option<Landmark> {
        self.landmark(landmarks::INDEX_TIP)
    }
}

/// Everything the tracker saw in one processed camera frame
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LandmarkFrame {
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

impl LandmarkFrame {
    pub fn new(hands: Vec<HandObservation>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }

    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Fingertip sample in pixel space, stamped with its capture time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrackedPoint {
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: u64,
}

impl TrackedPoint {
    pub fn new(position: Position, timestamp_ms: u64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            timestamp_ms,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// A confirmed circle gesture, in pixel coordinates
///
/// `points` is a copy of the trail at the moment of confirmation; it is empty
/// for circles confirmed by holding the fingertip still.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Circle {
    pub center: Position,
    pub radius: f32,
    pub points: Vec<TrackedPoint>,
}

/// High-level events emitted by the gesture session, at most one per frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    CircleDetected { circle: Circle },
    PhotoCaptureRequested,
    ClearCanvasRequested,
}

impl GestureEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CircleDetected { .. } => "circle_detected",
            Self::PhotoCaptureRequested => "photo_capture_requested",
            Self::ClearCanvasRequested => "clear_canvas_requested",
        }
    }

    #[cfg(feature = "std")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Which two-hand pose counts as "clear the canvas"
///
/// Only one definition is ever active; the two disagree on some frames.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClearPose {
    /// Both thumbs pointing down, other fingers curled
    #[default]
    ThumbsDown,
    /// Wrists crossed over each other at roughly the same height
    CrossedWrists,
}

/// Hand pose classification thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoseSettings {
    /// A finger is extended when tip-to-wrist exceeds this multiple of pip-to-wrist
    pub extension_margin: f32,
    /// Also require ring and pinky curled for the pointing pose
    pub strict_pointing: bool,
    pub clear_pose: ClearPose,
    /// Minimum horizontal wrist separation (normalized) for crossed wrists
    pub min_wrist_separation: f32,
    /// Maximum vertical wrist offset (normalized) for crossed wrists
    pub max_vertical_offset: f32,
}

impl Default for PoseSettings {
    fn default() -> Self {
        Self {
            extension_margin: 1.1,
            strict_pointing: true,
            clear_pose: ClearPose::ThumbsDown,
            min_wrist_separation: 0.15,
            max_vertical_offset: 0.3,
        }
    }
}

/// Circle detection thresholds, distances in pixels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CircleSettings {
    pub window_ms: u64,
    pub min_points: usize,
    pub min_diameter_px: f32,
    /// Octants (of 8) around the centre the path has to pass through
    pub min_octants: usize,
    pub confidence_threshold: f32,
    /// Start-to-end gap, relative to the mean box side, that counts as closed
    pub closure_ratio: f32,
    /// Threshold multiplier applied to closed paths
    pub closed_threshold_scale: f32,
    /// Reject paths that do not return near their start
    pub require_closed_path: bool,
}

impl Default for CircleSettings {
    fn default() -> Self {
        Self {
            window_ms: 3000,
            min_points: 25,
            min_diameter_px: 50.0,
            min_octants: 6,
            confidence_threshold: 0.5,
            closure_ratio: 0.4,
            closed_threshold_scale: 0.8,
            require_closed_path: false,
        }
    }
}

/// Hold-to-confirm durations for the two-hand gestures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HoldSettings {
    pub photo_capture_ms: u64,
    pub clear_canvas_ms: u64,
}

impl Default for HoldSettings {
    fn default() -> Self {
        Self {
            photo_capture_ms: 2000,
            clear_canvas_ms: 1000,
        }
    }
}

/// Point-and-hold fallback for confirming a circle without drawing it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StationarySettings {
    pub enabled: bool,
    pub radius_px: f32,
    pub hold_ms: u64,
    pub circle_radius_px: f32,
}

impl Default for StationarySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            radius_px: 15.0,
            hold_ms: 1000,
            circle_radius_px: 120.0,
        }
    }
}

/// Gesture recognition configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GestureSettings {
    pub pose: PoseSettings,
    pub circle: CircleSettings,
    pub hold: HoldSettings,
    pub stationary: StationarySettings,
    /// Quiet period after any emitted event; 0 disables it
    pub cooldown_ms: u64,
}

impl GestureSettings {
    /// Defaults plus the 1s cooldown between gestures
    pub fn recommended() -> Self {
        Self {
            cooldown_ms: 1000,
            ..Self::default()
        }
    }

    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
