#![cfg_attr(not(feature = "std"), no_std)]

//! Gesture recognition core for hands-free fabric inspection
//!
//! Consumes one [`LandmarkFrame`] per processed camera frame and emits at most
//! one [`GestureEvent`] per frame: a circle drawn with the index finger, a
//! two-hand thumbs-up held to request a photo, or the configured clear-canvas
//! pose held to wipe the trail. All timing is logical; callers supply a
//! monotonic millisecond reading with every frame.

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod clock;
pub mod hold;
pub mod path;
pub mod pose;
pub mod session;

pub use clock::{Clock, ManualClock};
#[cfg(feature = "std")]
pub use clock::MonotonicClock;
pub use hold::{HoldState, HoldTimer};
pub use path::{BoundingBox, PathBuffer};
pub use pose::PoseClassifier;
pub use session::{FrameContext, GestureSession};

pub use weft_shared::{
    Circle, ClearPose, GestureEvent, GestureSettings, HandObservation, Handedness, Landmark,
    LandmarkFrame, Position, TrackedPoint,
};
