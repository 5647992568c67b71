//! Stateless hand pose predicates over tracker landmarks.
//!
//! Every predicate answers `false` when a landmark it depends on is missing.
//! "Curled" is therefore not simply `!extended`: a finger whose tip or pip is
//! missing is neither extended nor curled.

use weft_shared::{landmarks, ClearPose, HandObservation, Handedness, PoseSettings};

const FINGERS: [(usize, usize); 4] = [
    (landmarks::INDEX_TIP, landmarks::INDEX_PIP),
    (landmarks::MIDDLE_TIP, landmarks::MIDDLE_PIP),
    (landmarks::RING_TIP, landmarks::RING_PIP),
    (landmarks::PINKY_TIP, landmarks::PINKY_PIP),
];

/// Direction the thumb tip points relative to its MCP joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThumbDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Default)]
pub struct PoseClassifier {
    settings: PoseSettings,
}

impl PoseClassifier {
    pub fn new(settings: PoseSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PoseSettings {
        &self.settings
    }

    /// `Some(true)` extended, `Some(false)` curled, `None` when the wrist, tip
    /// or pip landmark is missing
    fn finger_state(&self, hand: &HandObservation, tip: usize, pip: usize) -> Option<bool> {
        let wrist = hand.wrist()?;
        let tip = hand.landmark(tip)?;
        let pip = hand.landmark(pip)?;

        Some(tip.distance_to(&wrist) > pip.distance_to(&wrist) * self.settings.extension_margin)
    }

    /// Tip is farther from the wrist than the pip joint, by the extension margin
    pub fn is_finger_extended(&self, hand: &HandObservation, tip: usize, pip: usize) -> bool {
        self.finger_state(hand, tip, pip) == Some(true)
    }

    fn is_finger_curled(&self, hand: &HandObservation, tip: usize, pip: usize) -> bool {
        self.finger_state(hand, tip, pip) == Some(false)
    }

    fn four_fingers_curled(&self, hand: &HandObservation) -> bool {
        FINGERS
            .iter()
            .all(|&(tip, pip)| self.is_finger_curled(hand, tip, pip))
    }

    /// Index extended, middle curled; ring and pinky curled too when strict
    pub fn is_pointing(&self, hand: &HandObservation) -> bool {
        let index_extended =
            self.is_finger_extended(hand, landmarks::INDEX_TIP, landmarks::INDEX_PIP);
        let middle_curled =
            self.is_finger_curled(hand, landmarks::MIDDLE_TIP, landmarks::MIDDLE_PIP);

        if !(index_extended && middle_curled) {
            return false;
        }

        if self.settings.strict_pointing {
            self.is_finger_curled(hand, landmarks::RING_TIP, landmarks::RING_PIP)
                && self.is_finger_curled(hand, landmarks::PINKY_TIP, landmarks::PINKY_PIP)
        } else {
            true
        }
    }

    fn thumb_direction(&self, hand: &HandObservation) -> Option<ThumbDirection> {
        let tip = hand.landmark(landmarks::THUMB_TIP)?;
        let mcp = hand.landmark(landmarks::THUMB_MCP)?;

        // Image y grows downwards
        if tip.y < mcp.y {
            Some(ThumbDirection::Up)
        } else if tip.y > mcp.y {
            Some(ThumbDirection::Down)
        } else {
            None
        }
    }

    pub fn is_thumb_up(&self, hand: &HandObservation) -> bool {
        self.thumb_direction(hand) == Some(ThumbDirection::Up) && self.four_fingers_curled(hand)
    }

    pub fn is_thumb_down(&self, hand: &HandObservation) -> bool {
        self.thumb_direction(hand) == Some(ThumbDirection::Down) && self.four_fingers_curled(hand)
    }

    /// Both hands giving a thumbs up
    pub fn is_photo_capture_pose(&self, first: &HandObservation, second: &HandObservation) -> bool {
        self.is_thumb_up(first) && self.is_thumb_up(second)
    }

    pub fn is_both_thumbs_down(&self, first: &HandObservation, second: &HandObservation) -> bool {
        self.is_thumb_down(first) && self.is_thumb_down(second)
    }

    /// The hand labelled `Left` sits to the right of the one labelled `Right`,
    /// far enough apart horizontally and at about the same height
    pub fn is_crossed_hands(&self, first: &HandObservation, second: &HandObservation) -> bool {
        let (left, right) = match (first.handedness, second.handedness) {
            (Some(Handedness::Left), Some(Handedness::Right)) => (first, second),
            (Some(Handedness::Right), Some(Handedness::Left)) => (second, first),
            _ => return false,
        };

        let (Some(left_wrist), Some(right_wrist)) = (left.wrist(), right.wrist()) else {
            return false;
        };

        let crossed_by = left_wrist.x - right_wrist.x;
        let vertical_offset = libm::fabsf(left_wrist.y - right_wrist.y);

        crossed_by > self.settings.min_wrist_separation
            && vertical_offset <= self.settings.max_vertical_offset
    }

    /// The configured clear-canvas pose; exactly one definition is active
    pub fn is_clear_canvas_pose(&self, first: &HandObservation, second: &HandObservation) -> bool {
        match self.settings.clear_pose {
            ClearPose::ThumbsDown => self.is_both_thumbs_down(first, second),
            ClearPose::CrossedWrists => self.is_crossed_hands(first, second),
        }
    }
}
