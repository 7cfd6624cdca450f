//! Two-finger rotate (twist) detection
//!
//! The rotation of a pointer pair is the `atan2` angle of the vector between
//! them. Before the gesture starts, per-move angle deltas are accumulated;
//! once their magnitude exceeds the configured threshold the gesture starts
//! and every further move reports its own delta.

use glam::Vec2;
use sceneview_core::events::MotionEvent;
use sceneview_core::math::wrap_angle;
use tracing::{debug, trace};

use crate::config::GestureConfig;
use crate::phase::GesturePhase;
use crate::pointers::PointerRetainer;
use crate::two_finger::{TwoFingerStep, TwoFingerTracker};

/// A rotate gesture update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateGesture {
    pub phase: GesturePhase,
    /// Rotation since the previous update, radians. Zero for `Started` and
    /// `Ended`.
    pub rotation_delta: f32,
    /// Rotation since the pointers went down, radians
    pub total_rotation: f32,
    /// Midpoint between the two pointers
    pub focus: Vec2,
    pub time_ms: u64,
    /// Set on `Ended` when the stream was cancelled rather than lifted
    pub cancelled: bool,
}

impl RotateGesture {
    pub fn rotation_delta_degrees(&self) -> f32 {
        self.rotation_delta.to_degrees()
    }
}

/// Detects two-finger rotation
pub struct RotateGestureDetector {
    tracker: TwoFingerTracker,
    threshold: f32,
    pressure_threshold: f32,
    /// Rotation accumulated while tracking, and then for the whole gesture
    total_rotation: f32,
}

impl RotateGestureDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            tracker: TwoFingerTracker::new("rotate"),
            threshold: config.rotation_threshold_degrees.to_radians(),
            pressure_threshold: config.pressure_threshold,
            total_rotation: 0.0,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.tracker.is_active()
    }

    pub fn on_touch_event(
        &mut self,
        event: &MotionEvent,
        retainer: &mut PointerRetainer,
    ) -> Option<RotateGesture> {
        match self.tracker.process(event, retainer) {
            TwoFingerStep::Ignored => None,
            TwoFingerStep::Tracking(_) => {
                self.total_rotation = 0.0;
                None
            }
            TwoFingerStep::Moved { previous, current } => {
                // A collapsing pressure sum means a finger is lifting
                if !current.pressure_accepted(&previous, self.pressure_threshold) {
                    trace!(
                        previous = previous.pressure,
                        current = current.pressure,
                        "rotate update dropped by pressure filter"
                    );
                    return None;
                }
                let delta = wrap_angle(current.angle() - previous.angle());
                self.total_rotation += delta;
                self.tracker.commit(current);

                if self.tracker.is_active() {
                    return Some(RotateGesture {
                        phase: GesturePhase::Moved,
                        rotation_delta: delta,
                        total_rotation: self.total_rotation,
                        focus: current.focus(),
                        time_ms: current.time_ms,
                        cancelled: false,
                    });
                }

                if self.total_rotation.abs() <= self.threshold {
                    return None;
                }
                if !self.tracker.try_activate(retainer) {
                    return None;
                }
                debug!(
                    degrees = self.total_rotation.to_degrees(),
                    "rotate gesture started"
                );
                Some(RotateGesture {
                    phase: GesturePhase::Started,
                    rotation_delta: 0.0,
                    total_rotation: self.total_rotation,
                    focus: current.focus(),
                    time_ms: current.time_ms,
                    cancelled: false,
                })
            }
            TwoFingerStep::Released {
                last,
                was_active,
                cancelled,
            } => {
                let total_rotation = std::mem::take(&mut self.total_rotation);
                if !was_active {
                    return None;
                }
                debug!(cancelled, "rotate gesture ended");
                Some(RotateGesture {
                    phase: GesturePhase::Ended,
                    rotation_delta: 0.0,
                    total_rotation,
                    focus: last.focus(),
                    time_ms: event.event_time_ms,
                    cancelled,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sceneview_core::events::{MotionAction, TouchPointer};

    /// Pointer pair at distance 100 around (200, 200), rotated by `degrees`
    fn pair_at(action: MotionAction, degrees: f32, pressure: f32, t: u64) -> MotionEvent {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let offset = Vec2::new(cos, sin) * 50.0;
        let center = Vec2::new(200.0, 200.0);
        let a = center - offset;
        let b = center + offset;
        MotionEvent::new(
            action,
            [
                TouchPointer::new(0, a.x, a.y).with_pressure(pressure),
                TouchPointer::new(1, b.x, b.y).with_pressure(pressure),
            ],
            1,
            t,
        )
    }

    fn run(detector: &mut RotateGestureDetector, events: &[MotionEvent]) -> Vec<RotateGesture> {
        let mut retainer = PointerRetainer::new();
        events
            .iter()
            .filter_map(|e| detector.on_touch_event(e, &mut retainer))
            .collect()
    }

    #[test]
    fn test_rotation_below_threshold_never_starts() {
        let mut detector = RotateGestureDetector::new(&GestureConfig::default());
        let gestures = run(
            &mut detector,
            &[
                pair_at(MotionAction::PointerDown, 0.0, 1.0, 0),
                pair_at(MotionAction::Move, 1.0, 1.0, 16),
                pair_at(MotionAction::PointerUp, 1.0, 1.0, 32),
            ],
        );
        assert!(gestures.is_empty());
    }

    #[test]
    fn test_started_moved_ended_order() {
        let mut detector = RotateGestureDetector::new(&GestureConfig::default());
        let gestures = run(
            &mut detector,
            &[
                pair_at(MotionAction::PointerDown, 0.0, 1.0, 0),
                pair_at(MotionAction::Move, 1.5, 1.0, 16),
                pair_at(MotionAction::Move, 3.0, 1.0, 32),
                pair_at(MotionAction::Move, 8.0, 1.0, 48),
                pair_at(MotionAction::Move, 10.0, 1.0, 64),
                pair_at(MotionAction::PointerUp, 10.0, 1.0, 80),
            ],
        );

        let phases: Vec<GesturePhase> = gestures.iter().map(|g| g.phase).collect();
        assert_eq!(
            phases,
            vec![
                GesturePhase::Started,
                GesturePhase::Moved,
                GesturePhase::Moved,
                GesturePhase::Ended
            ]
        );
        assert!((gestures[0].total_rotation.to_degrees() - 3.0).abs() < 1e-3);
        assert!((gestures[1].rotation_delta_degrees() - 5.0).abs() < 1e-3);
        assert!((gestures[2].rotation_delta_degrees() - 2.0).abs() < 1e-3);
        assert!((gestures[3].total_rotation.to_degrees() - 10.0).abs() < 1e-3);
        assert!(!detector.is_in_progress());
    }

    #[test]
    fn test_started_fires_once_per_gesture() {
        let mut detector = RotateGestureDetector::new(&GestureConfig::default());
        let mut events = vec![pair_at(MotionAction::PointerDown, 0.0, 1.0, 0)];
        for step in 1..40 {
            events.push(pair_at(MotionAction::Move, step as f32 * 3.0, 1.0, step * 16));
        }
        events.push(pair_at(MotionAction::PointerUp, 117.0, 1.0, 700));
        // Moves after the end belong to no gesture
        events.push(pair_at(MotionAction::Move, 130.0, 1.0, 716));

        let gestures = run(&mut detector, &events);
        let started = gestures
            .iter()
            .filter(|g| g.phase == GesturePhase::Started)
            .count();
        assert_eq!(started, 1);
        assert_eq!(gestures.last().map(|g| g.phase), Some(GesturePhase::Ended));
    }

    #[test]
    fn test_pressure_drop_suppresses_delta() {
        let mut detector = RotateGestureDetector::new(&GestureConfig::default());
        let mut retainer = PointerRetainer::new();
        let mut feed = |e: MotionEvent| detector.on_touch_event(&e, &mut retainer);

        feed(pair_at(MotionAction::PointerDown, 0.0, 1.0, 0));
        assert_eq!(
            feed(pair_at(MotionAction::Move, 5.0, 1.0, 16)).map(|g| g.phase),
            Some(GesturePhase::Started)
        );

        for (i, pressure) in [0.66_f32, 0.5, 0.1].into_iter().enumerate() {
            assert_eq!(
                feed(pair_at(MotionAction::Move, 10.0 + i as f32, pressure, 32 + i as u64)),
                None
            );
        }

        // Baseline was not advanced by the rejected updates
        let resumed = feed(pair_at(MotionAction::Move, 9.0, 1.0, 96)).unwrap();
        assert!((resumed.rotation_delta_degrees() - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_pressure_drop_before_start_is_ignored() {
        let mut detector = RotateGestureDetector::new(&GestureConfig::default());
        let mut retainer = PointerRetainer::new();
        let mut feed = |e: MotionEvent| detector.on_touch_event(&e, &mut retainer);

        feed(pair_at(MotionAction::PointerDown, 0.0, 1.0, 0));
        // Past the threshold, but a finger is lifting
        assert_eq!(feed(pair_at(MotionAction::Move, 6.0, 0.2, 16)), None);

        // The baseline stayed at 0°, so the firm move measures the full twist
        let started = feed(pair_at(MotionAction::Move, 6.0, 1.0, 32)).unwrap();
        assert_eq!(started.phase, GesturePhase::Started);
        assert!((started.total_rotation.to_degrees() - 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_cancel_ends_active_gesture() {
        let mut detector = RotateGestureDetector::new(&GestureConfig::default());
        let gestures = run(
            &mut detector,
            &[
                pair_at(MotionAction::PointerDown, 0.0, 1.0, 0),
                pair_at(MotionAction::Move, 5.0, 1.0, 16),
                pair_at(MotionAction::Cancel, 5.0, 1.0, 32),
            ],
        );
        let last = gestures.last().unwrap();
        assert_eq!(last.phase, GesturePhase::Ended);
        assert!(last.cancelled);
    }
}
