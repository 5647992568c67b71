//! Fingertip trail and circle detection.
//!
//! The trail is age-bounded rather than count-bounded: every evaluation first
//! drops points older than the configured window, so whatever remains was drawn
//! within the last few seconds.

#[cfg(not(feature = "std"))]
use alloc::{collections::VecDeque, vec::Vec};
#[cfg(feature = "std")]
use std::collections::VecDeque;

use core::f32::consts::PI;
use weft_shared::{Circle, CircleSettings, Position, TrackedPoint};

/// Axis-aligned bounds of a set of points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a TrackedPoint>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };

        for p in points {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }

        Some(bbox)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Position {
        Position::new(
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    pub fn larger_side(&self) -> f32 {
        self.width().max(self.height())
    }

    pub fn mean_side(&self) -> f32 {
        (self.width() + self.height()) / 2.0
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// `min(w/h, h/w)`, or 1 when either side is zero
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    if width <= 0.0 || height <= 0.0 {
        return 1.0;
    }
    (width / height).min(height / width)
}

/// How close the points sit to a constant distance from the box centre,
/// scaled down for elongated boxes. 0 for empty or zero-radius input.
pub fn circularity<'a, I>(points: I, bbox: &BoundingBox) -> f32
where
    I: IntoIterator<Item = &'a TrackedPoint>,
{
    let radius = (bbox.width() / 2.0 + bbox.height() / 2.0) / 2.0;
    if radius <= 0.0 {
        return 0.0;
    }

    let center = bbox.center();
    let mut count = 0usize;
    let mut total_deviation = 0.0f32;

    for p in points {
        let distance = p.position().distance_to(&center);
        total_deviation += libm::fabsf(distance - radius);
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    let avg_deviation = total_deviation / count as f32;
    let confidence = (1.0 - avg_deviation / radius).max(0.0);

    confidence * aspect_ratio(bbox.width(), bbox.height())
}

/// Number of the eight 45° sectors around `center` that the points pass through
pub fn octants_visited<'a, I>(points: I, center: Position) -> usize
where
    I: IntoIterator<Item = &'a TrackedPoint>,
{
    let mut visited = 0u8;

    for p in points {
        let dx = p.x - center.x;
        let dy = p.y - center.y;
        if libm::fabsf(dx) < f32::EPSILON && libm::fabsf(dy) < f32::EPSILON {
            continue;
        }

        let angle = libm::atan2f(dy, dx) + PI;
        let octant = ((angle / (PI / 4.0)) as usize).min(7);
        visited |= 1 << octant;
    }

    visited.count_ones() as usize
}

/// Time-windowed fingertip trail that can tell when it forms a circle
#[derive(Debug, Clone, Default)]
pub struct PathBuffer {
    points: VecDeque<TrackedPoint>,
    /// Leading points already reported as part of a circle
    reported: usize,
    settings: CircleSettings,
}

impl PathBuffer {
    pub fn new(settings: CircleSettings) -> Self {
        Self {
            points: VecDeque::new(),
            reported: 0,
            settings,
        }
    }

    pub fn settings(&self) -> &CircleSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: CircleSettings) {
        self.settings = settings;
    }

    pub fn add_point(&mut self, position: Position, now_ms: u64) {
        self.points.push_back(TrackedPoint::new(position, now_ms));
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.reported = 0;
    }

    /// Stop considering the current points for detection; they stay in the trail
    pub fn mark_reported(&mut self) {
        self.reported = self.points.len();
    }

    /// Points drawn since the last reported circle
    pub fn pending_len(&self) -> usize {
        self.points.len() - self.reported
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn is_expired(&self, point: &TrackedPoint, now_ms: u64) -> bool {
        now_ms.saturating_sub(point.timestamp_ms) >= self.settings.window_ms
    }

    /// Drop points that fell out of the time window
    pub fn evict_expired(&mut self, now_ms: u64) {
        while let Some(front) = self.points.front() {
            if !self.is_expired(front, now_ms) {
                break;
            }
            self.points.pop_front();
            self.reported = self.reported.saturating_sub(1);
        }
    }

    /// All retained points, oldest first
    pub fn points(&self) -> impl Iterator<Item = &TrackedPoint> + '_ {
        self.points.iter()
    }

    /// Retained points that are still inside the window at `now_ms`
    pub fn live_points(&self, now_ms: u64) -> impl Iterator<Item = &TrackedPoint> + '_ {
        self.points
            .iter()
            .filter(move |p| !self.is_expired(p, now_ms))
    }

    pub fn snapshot(&self) -> Vec<TrackedPoint> {
        self.points.iter().copied().collect()
    }

    /// Circularity score of the retained points, for diagnostics
    pub fn confidence(&self) -> f32 {
        match BoundingBox::from_points(self.points.iter()) {
            Some(bbox) => circularity(self.points.iter(), &bbox),
            None => 0.0,
        }
    }

    /// Evict stale points, then decide whether the points drawn since the last
    /// reported circle form a new one
    ///
    /// Besides the size and circularity checks, the path must pass through at
    /// least `min_octants` of the eight sectors around its centre, which keeps
    /// straight and zig-zag strokes from scoring as circles.
    pub fn detect_circle(&mut self, now_ms: u64) -> Option<Circle> {
        self.evict_expired(now_ms);

        let settings = &self.settings;
        if self.pending_len() < settings.min_points {
            return None;
        }

        let pending = self.points.range(self.reported..);
        let bbox = BoundingBox::from_points(pending.clone())?;
        if bbox.larger_side() < settings.min_diameter_px || bbox.is_degenerate() {
            return None;
        }

        let center = bbox.center();
        if octants_visited(pending.clone(), center) < settings.min_octants {
            return None;
        }

        let confidence = circularity(pending.clone(), &bbox);

        let first = pending.clone().next()?.position();
        let last = self.points.back()?.position();
        let closed = first.distance_to(&last) < bbox.mean_side() * settings.closure_ratio;
        if settings.require_closed_path && !closed {
            return None;
        }

        let threshold = if closed {
            settings.confidence_threshold * settings.closed_threshold_scale
        } else {
            settings.confidence_threshold
        };

        if confidence <= threshold {
            log::trace!(
                "Path of {} points not circular enough: {:.2} <= {:.2}",
                self.pending_len(),
                confidence,
                threshold
            );
            return None;
        }

        let radius = bbox.larger_side() / 2.0;
        log::debug!(
            "Circle detected at ({:.1}, {:.1}) r={:.1}, confidence {:.2}, closed={}",
            center.x,
            center.y,
            radius,
            confidence,
            closed
        );

        Some(Circle {
            center,
            radius,
            points: pending.copied().collect(),
        })
    }
}
