//! Scenario files: a scene setup plus a timeline of touches and frames
//!
//! ```toml
//! [[planes]]
//! name = "floor"
//! type = "horizontal_upward_facing"
//! center = [0.0, 0.0, 0.0]
//! extent = [4.0, 4.0]
//!
//! [model]
//! position = [0.0, 0.0, 0.0]
//!
//! [[steps]]
//! kind = "touch"
//! action = "down"
//! pointers = [{ id = 0, x = 540.0, y = 960.0 }]
//!
//! [[steps]]
//! kind = "frames"
//! count = 30
//! ```

use anyhow::{bail, Context, Result};
use sceneview_core::{MotionAction, PlaneType, TouchPointer, TrackingState};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::sim::CameraConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub planes: Vec<PlaneSpec>,
    #[serde(default)]
    pub model: ModelSpec,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaneSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub plane_type: PlaneType,
    pub center: [f32; 3],
    /// Full width and depth of the rectangle, meters
    #[serde(default = "default_extent")]
    pub extent: [f32; 2],
    /// Direction a vertical plane faces; ignored for horizontal planes
    #[serde(default = "default_facing")]
    pub facing: [f32; 3],
}

fn default_extent() -> [f32; 2] {
    [2.0, 2.0]
}

fn default_facing() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    /// Initial anchor position, world space
    pub position: [f32; 3],
    /// Touches within this screen distance of the model pick it
    pub pick_radius_px: f32,
    /// Select the model before the first step
    pub selected: bool,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            pick_radius_px: 80.0,
            selected: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// One motion event
    Touch {
        action: MotionAction,
        pointers: Vec<TouchPointer>,
        #[serde(default)]
        action_index: usize,
        /// Defaults to the scenario clock
        time_ms: Option<u64>,
    },
    /// Render `count` frames of `dt` seconds each
    Frames {
        count: usize,
        #[serde(default = "default_dt")]
        dt: f32,
    },
    PlaneTracking { plane: String, state: TrackingState },
    CameraTracking { state: TrackingState },
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content).context("Failed to parse scenario")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for plane in &self.planes {
            if !names.insert(plane.name.as_str()) {
                bail!("Duplicate plane name '{}'", plane.name);
            }
            if plane.extent.iter().any(|e| !(*e > 0.0)) {
                bail!("Plane '{}' needs a positive extent", plane.name);
            }
            if plane.plane_type == PlaneType::Vertical && plane.facing[0] == 0.0 && plane.facing[2] == 0.0 {
                bail!("Vertical plane '{}' needs a horizontal facing direction", plane.name);
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::Touch {
                    pointers,
                    action_index,
                    ..
                } => {
                    if pointers.is_empty() {
                        bail!("Step {}: touch needs at least one pointer", index);
                    }
                    if *action_index >= pointers.len() {
                        bail!("Step {}: action_index {} out of range", index, action_index);
                    }
                }
                Step::PlaneTracking { plane, .. } if !names.contains(plane.as_str()) => {
                    bail!("Step {}: unknown plane '{}'", index, plane);
                }
                Step::Frames { dt, .. } if !(*dt >= 0.0) => {
                    bail!("Step {}: dt must be >= 0", index);
                }
                _ => {}
            }
        }
        Ok(())
    }
}
