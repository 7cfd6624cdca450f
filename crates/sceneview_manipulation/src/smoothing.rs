//! Frame-rate independent convergence toward a desired local pose

use glam::{Quat, Vec3};
use sceneview_core::math::{rotation_alignment, smoothing_factor};
use sceneview_core::Pose;
use tracing::trace;

use crate::config::TranslationConfig;

/// Target pose a node is easing toward, per component.
///
/// A component is `None` once the node has arrived; it is cleared exactly
/// once, on the step that snaps it into place.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DesiredPose {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
}

impl DesiredPose {
    pub fn is_pending(&self) -> bool {
        self.position.is_some() || self.rotation.is_some()
    }

    pub fn clear(&mut self) {
        self.position = None;
        self.rotation = None;
    }

    /// Advance `live` one frame toward the desired pose.
    ///
    /// Position lerps and rotation slerps by `clamp(dt * lerp_speed, 0, 1)`.
    /// A component within its threshold snaps to the target and is cleared.
    pub fn step(&mut self, live: Pose, delta_seconds: f32, settings: &TranslationConfig) -> Pose {
        let t = smoothing_factor(delta_seconds, settings.lerp_speed);
        let mut next = live;

        if let Some(desired) = self.position {
            let position = live.position.lerp(desired, t);
            if position.distance(desired) <= settings.position_threshold {
                trace!(?desired, "position converged");
                next.position = desired;
                self.position = None;
            } else {
                next.position = position;
            }
        }

        if let Some(desired) = self.rotation {
            let rotation = live.rotation.slerp(desired, t).normalize();
            if rotation_alignment(rotation, desired) >= settings.rotation_dot_threshold {
                trace!(?desired, "rotation converged");
                next.rotation = desired;
                self.rotation = None;
            } else {
                next.rotation = rotation;
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_position_distance_strictly_decreases_then_clears_once() {
        let settings = TranslationConfig::default();
        let target = Vec3::new(1.0, 0.0, -2.0);
        let mut desired = DesiredPose {
            position: Some(target),
            rotation: None,
        };
        let mut live = Pose::IDENTITY;
        let mut distance = live.position.distance(target);
        let mut clears = 0;

        for _ in 0..200 {
            let was_pending = desired.position.is_some();
            live = desired.step(live, DT, &settings);
            if was_pending && desired.position.is_none() {
                clears += 1;
            }
            if desired.position.is_some() {
                let now = live.position.distance(target);
                assert!(now < distance);
                distance = now;
            }
        }
        assert_eq!(clears, 1);
        assert_eq!(live.position, target);
    }

    #[test]
    fn test_rotation_alignment_increases_then_clears_once() {
        let settings = TranslationConfig::default();
        let target = Quat::from_rotation_y(2.5);
        let mut desired = DesiredPose {
            position: None,
            rotation: Some(target),
        };
        let mut live = Pose::IDENTITY;
        let mut alignment = rotation_alignment(live.rotation, target);
        let mut clears = 0;

        for _ in 0..200 {
            let was_pending = desired.rotation.is_some();
            live = desired.step(live, DT, &settings);
            if was_pending && desired.rotation.is_none() {
                clears += 1;
            }
            if desired.rotation.is_some() {
                let now = rotation_alignment(live.rotation, target);
                assert!(now > alignment);
                alignment = now;
            }
        }
        assert_eq!(clears, 1);
        assert!(rotation_alignment(live.rotation, target) > 0.9999);
    }

    #[test]
    fn test_large_step_snaps_immediately() {
        let settings = TranslationConfig::default();
        let mut desired = DesiredPose {
            position: Some(Vec3::X),
            rotation: Some(Quat::from_rotation_y(1.0)),
        };
        // dt * 12 > 1 clamps to a full step
        let live = desired.step(Pose::IDENTITY, 0.5, &settings);
        assert!(!desired.is_pending());
        assert_eq!(live.position, Vec3::X);
    }

    #[test]
    fn test_nothing_pending_keeps_live_pose() {
        let settings = TranslationConfig::default();
        let mut desired = DesiredPose::default();
        let live = Pose::from_position(Vec3::Y);
        assert_eq!(desired.step(live, DT, &settings), live);
    }
}
