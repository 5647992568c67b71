//! Host-side driver for the gesture core: capture workflow and landmark replay.

pub mod replay;
pub mod workflow;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use weft_core::GestureSettings;

pub use replay::{ReplayGrabber, ReplayLine, ReplayOptions, ReplaySummary, Replayer};
pub use workflow::{
    CapturedImage, DefectAnnotation, FrameGrabber, GrabbedFrame, InspectionWorkflow,
    WorkflowSettings,
};

/// Settings file contents: `{"gesture": {...}, "workflow": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub gesture: GestureSettings,
    pub workflow: WorkflowSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gesture: GestureSettings::recommended(),
            workflow: WorkflowSettings::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid settings JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to load {}", path.display()))
    }
}
