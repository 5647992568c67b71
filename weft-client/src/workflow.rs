//! Capture workflow driven by gesture events.
//!
//! A drawn circle starts a short countdown, after which the current frame is
//! grabbed and stored with one defect marker. Detection pauses while this
//! happens and resumes shortly after the canvas is wiped.

use serde::{Deserialize, Serialize};
use weft_core::{Circle, FrameContext, GestureEvent, GestureSession, Position};

/// Factor applied to the radius when placing a defect label
const LABEL_OFFSET: f32 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Delay between a detected circle and the capture
    pub capture_countdown_ms: u64,
    /// Pause after a capture before circles are tracked again
    pub resume_delay_ms: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            capture_countdown_ms: 2000,
            resume_delay_ms: 500,
        }
    }
}

/// Reference to a grabbed camera frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrabbedFrame {
    pub width: u32,
    pub height: u32,
    /// Where the frame can be found, e.g. a file name or frame index
    pub source: String,
}

/// Something that can hand over the current camera frame
pub trait FrameGrabber {
    fn grab_frame(&mut self) -> Option<GrabbedFrame>;
}

/// Marker geometry for one defect, in the mirrored capture's coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DefectAnnotation {
    pub label: u32,
    pub center: Position,
    pub radius: f32,
    pub label_anchor: Position,
}

impl DefectAnnotation {
    /// Mirror `circle` horizontally across a frame `frame_width` pixels wide
    pub fn new(label: u32, circle: &Circle, frame_width: f32) -> Self {
        let center = Position::new(frame_width - circle.center.x, circle.center.y);
        let offset = circle.radius * LABEL_OFFSET;
        Self {
            label,
            center,
            radius: circle.radius,
            label_anchor: Position::new(center.x - offset, center.y - offset),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapturedImage {
    pub id: String,
    pub timestamp_ms: u64,
    pub frame: GrabbedFrame,
    pub defects: usize,
    pub annotations: Vec<DefectAnnotation>,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Detecting,
    Countdown { circle: Circle, capture_at_ms: u64 },
    Resuming { resume_at_ms: u64 },
}

pub struct InspectionWorkflow {
    settings: WorkflowSettings,
    phase: Phase,
    captures: Vec<CapturedImage>,
    status: String,
    captured_total: u64,
}

impl InspectionWorkflow {
    pub fn new(settings: WorkflowSettings) -> Self {
        Self {
            settings,
            phase: Phase::Detecting,
            captures: Vec::new(),
            status: String::from("Ready to inspect. Draw a circle around a defect."),
            captured_total: 0,
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Captured images, newest first
    pub fn captures(&self) -> &[CapturedImage] {
        &self.captures
    }

    pub fn is_detecting(&self) -> bool {
        self.phase == Phase::Detecting
    }

    pub fn is_busy(&self) -> bool {
        !self.is_detecting()
    }

    /// Whole seconds left before the pending capture, rounded up
    pub fn countdown_remaining_secs(&self, now_ms: u64) -> Option<u64> {
        match self.phase {
            Phase::Countdown { capture_at_ms, .. } => {
                Some(capture_at_ms.saturating_sub(now_ms).div_ceil(1000))
            }
            _ => None,
        }
    }

    /// Frame context carrying this workflow's detection gates
    pub fn frame_context(&self, frame_width: f32, frame_height: f32) -> FrameContext {
        FrameContext::new(frame_width, frame_height)
            .with_detecting(self.is_detecting())
            .with_busy(self.is_busy())
    }

    pub fn handle_event<G: FrameGrabber + ?Sized>(
        &mut self,
        event: &GestureEvent,
        now_ms: u64,
        grabber: &mut G,
        session: &mut GestureSession,
    ) {
        match event {
            GestureEvent::CircleDetected { circle } => {
                if !self.is_detecting() {
                    log::debug!("Ignoring circle while busy");
                    return;
                }
                log::info!(
                    "Circle at ({:.0}, {:.0}) r={:.0}, capturing in {}ms",
                    circle.center.x,
                    circle.center.y,
                    circle.radius,
                    self.settings.capture_countdown_ms
                );
                self.status = String::from("Circle detected! Capturing in...");
                self.phase = Phase::Countdown {
                    circle: circle.clone(),
                    capture_at_ms: now_ms.saturating_add(self.settings.capture_countdown_ms),
                };
            }
            GestureEvent::PhotoCaptureRequested => {
                if self.is_busy() {
                    log::debug!("Ignoring photo request while busy");
                    return;
                }
                if self.capture(now_ms, grabber, None) {
                    self.status = String::from("Photo captured.");
                }
            }
            GestureEvent::ClearCanvasRequested => {
                session.clear_canvas();
                self.status = String::from("Canvas cleared.");
            }
        }
    }

    /// Advance timers; call once per frame
    pub fn tick<G: FrameGrabber + ?Sized>(
        &mut self,
        now_ms: u64,
        grabber: &mut G,
        session: &mut GestureSession,
    ) {
        match &self.phase {
            Phase::Countdown {
                circle,
                capture_at_ms,
            } if now_ms >= *capture_at_ms => {
                let circle = circle.clone();
                if self.capture(now_ms, grabber, Some(&circle)) {
                    self.status =
                        String::from("Image captured and saved. Ready for next inspection.");
                }
                session.clear_canvas();
                self.phase = Phase::Resuming {
                    resume_at_ms: now_ms.saturating_add(self.settings.resume_delay_ms),
                };
            }
            Phase::Resuming { resume_at_ms } if now_ms >= *resume_at_ms => {
                log::debug!("Resuming circle detection");
                self.phase = Phase::Detecting;
            }
            _ => {}
        }
    }

    /// Drop all captures and go back to detecting
    pub fn reset(&mut self, session: &mut GestureSession) {
        self.captures.clear();
        session.clear_canvas();
        self.phase = Phase::Detecting;
        self.status = String::from("System reset. Ready to inspect.");
    }

    fn capture<G: FrameGrabber + ?Sized>(
        &mut self,
        now_ms: u64,
        grabber: &mut G,
        circle: Option<&Circle>,
    ) -> bool {
        let Some(frame) = grabber.grab_frame() else {
            log::warn!("Frame grab failed at {}ms", now_ms);
            self.status = String::from("Failed to capture image. Please try again.");
            return false;
        };

        let annotations: Vec<DefectAnnotation> = circle
            .into_iter()
            .enumerate()
            .map(|(i, c)| DefectAnnotation::new(i as u32 + 1, c, frame.width as f32))
            .collect();

        self.captured_total += 1;
        let image = CapturedImage {
            id: format!("img-{}-{}", now_ms, self.captured_total),
            timestamp_ms: now_ms,
            defects: annotations.len(),
            annotations,
            frame,
        };
        log::info!("Captured {} from {}", image.id, image.frame.source);
        self.captures.insert(0, image);
        true
    }
}

impl Default for InspectionWorkflow {
    fn default() -> Self {
        Self::new(WorkflowSettings::default())
    }
}
