//! Manipulation configuration
//!
//! Loaded from TOML. Every table and every field is optional:
//!
//! ```toml
//! [gestures]
//! drag_slop_px = 24.0
//!
//! [translation]
//! allowed_plane_types = ["horizontal_upward_facing"]
//!
//! [scale]
//! min_scale = 0.5
//! max_scale = 3.0
//! ```

use std::fs;
use std::path::Path;

use sceneview_core::PlaneType;
use sceneview_gesture::GestureConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete configuration for a transformation system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManipulationConfig {
    pub gestures: GestureConfig,
    pub translation: TranslationConfig,
    pub rotation: RotationConfig,
    pub scale: ScaleConfig,
}

/// Drag-to-move settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Smoothing speed; the per-frame factor is `dt * lerp_speed`
    pub lerp_speed: f32,
    /// Distance at which a smoothed position snaps to its target
    pub position_threshold: f32,
    /// Quaternion |dot| at which a smoothed rotation snaps to its target
    pub rotation_dot_threshold: f32,
    /// Plane types a node may be dragged onto
    pub allowed_plane_types: Vec<PlaneType>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            lerp_speed: 12.0,
            position_threshold: 0.01,
            rotation_dot_threshold: 0.99,
            allowed_plane_types: PlaneType::ALL.to_vec(),
        }
    }
}

/// Twist-to-rotate settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Node degrees per degree of twist
    pub rate_degrees: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { rate_degrees: 0.5 }
    }
}

/// Pinch-to-scale settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Scale ratio change per inch of pinch span change
    pub sensitivity: f32,
    /// Strength of the rubber-band falloff past the limits
    pub elasticity: f32,
    /// How far past `[0, 1]` the ratio may be stretched
    pub elastic_ratio_limit: f32,
    /// Spring-back speed once the pinch is released
    pub lerp_speed: f32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.75,
            max_scale: 1.75,
            sensitivity: 0.75,
            elasticity: 0.15,
            elastic_ratio_limit: 0.8,
            lerp_speed: 8.0,
        }
    }
}

impl ManipulationConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ManipulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = self.gestures.problems();

        let t = &self.translation;
        if !(t.lerp_speed > 0.0) {
            problems.push("translation.lerp_speed must be > 0".to_string());
        }
        if !(t.position_threshold > 0.0) {
            problems.push("translation.position_threshold must be > 0".to_string());
        }
        if !(t.rotation_dot_threshold > 0.0 && t.rotation_dot_threshold <= 1.0) {
            problems.push("translation.rotation_dot_threshold must be within (0, 1]".to_string());
        }
        if t.allowed_plane_types.is_empty() {
            problems.push("translation.allowed_plane_types must not be empty".to_string());
        }

        if !self.rotation.rate_degrees.is_finite() {
            problems.push("rotation.rate_degrees must be finite".to_string());
        }

        let s = &self.scale;
        if !(s.min_scale > 0.0 && s.min_scale < s.max_scale) {
            problems.push("scale.min_scale must be > 0 and below scale.max_scale".to_string());
        }
        if !(s.sensitivity > 0.0) {
            problems.push("scale.sensitivity must be > 0".to_string());
        }
        if !(s.elasticity >= 0.0) || !(s.elastic_ratio_limit >= 0.0) {
            problems.push("scale elasticity settings must be >= 0".to_string());
        }
        if !(s.lerp_speed > 0.0) {
            problems.push("scale.lerp_speed must be > 0".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}
