//! Gesture detection thresholds

use serde::{Deserialize, Serialize};

/// Thresholds shared by all gesture detectors.
///
/// Every field has a default, so a partial `[gestures]` table is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Accumulated twist (degrees) before a rotate gesture starts
    pub rotation_threshold_degrees: f32,
    /// Minimum ratio of current to previous combined pointer pressure for a
    /// two-finger update to be accepted
    pub pressure_threshold: f32,
    /// Pointer travel (pixels) before a drag starts
    pub drag_slop_px: f32,
    /// Span change (pixels) before a pinch starts
    pub pinch_span_slop_px: f32,
    /// Largest per-event scale change a pinch reports (0.1 = ±10%)
    pub pinch_max_scale_step: f32,
    /// Display density used to convert pixel distances to inches
    pub pixels_per_inch: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            rotation_threshold_degrees: 2.0,
            pressure_threshold: 0.67,
            drag_slop_px: 16.0,
            pinch_span_slop_px: 16.0,
            pinch_max_scale_step: 0.10,
            pixels_per_inch: 160.0,
        }
    }
}

impl GestureConfig {
    /// Human-readable problems with the thresholds, empty when valid
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(self.rotation_threshold_degrees >= 0.0) {
            problems.push("gestures.rotation_threshold_degrees must be >= 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.pressure_threshold) {
            problems.push("gestures.pressure_threshold must be within [0, 1]".to_string());
        }
        if !(self.drag_slop_px >= 0.0) || !(self.pinch_span_slop_px >= 0.0) {
            problems.push("gesture slops must be >= 0".to_string());
        }
        if !(self.pinch_max_scale_step > 0.0 && self.pinch_max_scale_step < 1.0) {
            problems.push("gestures.pinch_max_scale_step must be within (0, 1)".to_string());
        }
        if !(self.pixels_per_inch > 0.0) {
            problems.push("gestures.pixels_per_inch must be > 0".to_string());
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_keeps_defaults() {
        let config: GestureConfig = toml::from_str("drag_slop_px = 24.0").unwrap();
        assert_eq!(config.drag_slop_px, 24.0);
        assert_eq!(config.rotation_threshold_degrees, 2.0);
        assert_eq!(config.pressure_threshold, 0.67);
    }

    #[test]
    fn test_default_has_no_problems() {
        assert!(GestureConfig::default().problems().is_empty());
    }

    #[test]
    fn test_problems_reported() {
        let config = GestureConfig {
            pressure_threshold: 1.5,
            pixels_per_inch: 0.0,
            ..Default::default()
        };
        assert_eq!(config.problems().len(), 2);
    }
}
