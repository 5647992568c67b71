//! Replays recorded landmark frames through a gesture session.
//!
//! Input is JSON lines, one tracker frame per line:
//! `{"timestamp_ms": 1234, "hands": [{"landmarks": [{"x": 0.5, "y": 0.4}, ...]}]}`

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use weft_core::{Clock, GestureEvent, GestureSession, LandmarkFrame, ManualClock};

use crate::workflow::{CapturedImage, FrameGrabber, GrabbedFrame, InspectionWorkflow};
use crate::ClientConfig;

/// One line of replay input
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReplayLine {
    /// Tracker timestamp; synthesized from the frame rate when absent
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    #[serde(flatten)]
    pub frame: LandmarkFrame,
}

impl ReplayLine {
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayOptions {
    pub frame_width: u32,
    pub frame_height: u32,
    pub fps: u32,
}

impl ReplayOptions {
    pub fn validate(&self) -> Result<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            anyhow::bail!(
                "Frame size must be non-zero, got {}x{}",
                self.frame_width,
                self.frame_height
            );
        }
        if self.fps == 0 {
            anyhow::bail!("Frame rate must be at least 1 fps");
        }
        Ok(())
    }

    /// Timestamp given to the `index`th frame when the input has none
    pub fn synthetic_timestamp_ms(&self, index: u64) -> u64 {
        index * 1000 / self.fps as u64
    }
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            frame_width: 1280,
            frame_height: 720,
            fps: 30,
        }
    }
}

/// Stands in for a camera by naming the frame being replayed
#[derive(Debug, Clone)]
pub struct ReplayGrabber {
    width: u32,
    height: u32,
    frame_index: u64,
}

impl ReplayGrabber {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_index: 0,
        }
    }

    pub fn set_frame_index(&mut self, frame_index: u64) {
        self.frame_index = frame_index;
    }
}

impl FrameGrabber for ReplayGrabber {
    fn grab_frame(&mut self) -> Option<GrabbedFrame> {
        Some(GrabbedFrame {
            width: self.width,
            height: self.height,
            source: format!("frame-{}", self.frame_index),
        })
    }
}

/// Event as written to the output stream
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    frame: u64,
    timestamp_ms: u64,
    #[serde(flatten)]
    event: &'a GestureEvent,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReplaySummary {
    pub frames: u64,
    pub circles: u64,
    pub photo_requests: u64,
    pub clear_requests: u64,
    pub captures: Vec<CapturedImage>,
}

impl ReplaySummary {
    fn count(&mut self, event: &GestureEvent) {
        match event {
            GestureEvent::CircleDetected { .. } => self.circles += 1,
            GestureEvent::PhotoCaptureRequested => self.photo_requests += 1,
            GestureEvent::ClearCanvasRequested => self.clear_requests += 1,
        }
    }
}

pub struct Replayer {
    options: ReplayOptions,
    session: GestureSession,
    workflow: InspectionWorkflow,
    grabber: ReplayGrabber,
    clock: ManualClock,
}

impl Replayer {
    pub fn new(config: ClientConfig, options: ReplayOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            session: GestureSession::new(config.gesture),
            workflow: InspectionWorkflow::new(config.workflow),
            grabber: ReplayGrabber::new(options.frame_width, options.frame_height),
            clock: ManualClock::new(0),
            options,
        })
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    pub fn workflow(&self) -> &InspectionWorkflow {
        &self.workflow
    }

    /// Feed one frame through the workflow and session
    pub fn step(&mut self, index: u64, line: &ReplayLine) -> Option<GestureEvent> {
        let now_ms = line
            .timestamp_ms
            .unwrap_or_else(|| self.options.synthetic_timestamp_ms(index));
        self.clock.set(now_ms);
        self.grabber.set_frame_index(index);

        let now_ms = self.clock.now_ms();
        self.workflow.tick(now_ms, &mut self.grabber, &mut self.session);

        let ctx = self.workflow.frame_context(
            self.options.frame_width as f32,
            self.options.frame_height as f32,
        );
        let event = self
            .session
            .process_frame_with_clock(&line.frame, &ctx, &self.clock)?;

        self.workflow.handle_event(&event, now_ms, &mut self.grabber, &mut self.session);
        Some(event)
    }

    /// Replay every line of `input`, writing each event to `output` as JSON
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<ReplaySummary> {
        let mut summary = ReplaySummary::default();

        for (line_index, line) in input.lines().enumerate() {
            let line_no = line_index + 1;
            let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
            if line.trim().is_empty() {
                continue;
            }

            let parsed = ReplayLine::parse(&line)
                .with_context(|| format!("Malformed frame on line {}", line_no))?;

            let index = summary.frames;
            summary.frames += 1;

            let Some(event) = self.step(index, &parsed) else {
                continue;
            };
            summary.count(&event);

            let record = EventRecord {
                frame: index,
                timestamp_ms: self.clock.now_ms(),
                event: &event,
            };
            serde_json::to_writer(&mut output, &record).context("Failed to encode event")?;
            writeln!(output).context("Failed to write event")?;
        }

        summary.captures = self.workflow.captures().to_vec();
        log::info!(
            "Replayed {} frames: {} circles, {} photo requests, {} clears",
            summary.frames,
            summary.circles,
            summary.photo_requests,
            summary.clear_requests
        );
        Ok(summary)
    }
}
