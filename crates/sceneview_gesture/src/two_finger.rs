//! Pointer bookkeeping shared by the two-finger detectors.

use glam::Vec2;
use sceneview_core::events::{MotionAction, MotionEvent, TouchPointer};
use sceneview_core::fsm::StateMachine;
use smallvec::SmallVec;

use crate::phase::{events, phase_machine, states};
use crate::pointers::PointerRetainer;

/// Two tracked pointers at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TwoFingerSnapshot {
    pub first: Vec2,
    pub second: Vec2,
    /// Combined pressure of both pointers
    pub pressure: f32,
    pub time_ms: u64,
}

impl TwoFingerSnapshot {
    fn new(first: &TouchPointer, second: &TouchPointer, time_ms: u64) -> Self {
        Self {
            first: first.position(),
            second: second.position(),
            pressure: first.pressure + second.pressure,
            time_ms,
        }
    }

    /// Angle of the first-to-second vector in screen space
    pub fn angle(&self) -> f32 {
        let diff = self.second - self.first;
        diff.y.atan2(diff.x)
    }

    pub fn span(&self) -> f32 {
        self.first.distance(self.second)
    }

    pub fn focus(&self) -> Vec2 {
        (self.first + self.second) * 0.5
    }

    /// Whether the pressure change from `previous` to `self` is small enough
    /// for the update to be trusted.
    ///
    /// A collapsing pressure sum means a finger is lifting and its reported
    /// position is unreliable.
    pub fn pressure_accepted(&self, previous: &TwoFingerSnapshot, threshold: f32) -> bool {
        if previous.pressure <= 0.0 {
            return true;
        }
        self.pressure / previous.pressure >= threshold
    }
}

/// What one motion event meant for the tracked pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TwoFingerStep {
    Ignored,
    /// Two free pointers went down; tracking began
    Tracking(TwoFingerSnapshot),
    Moved {
        previous: TwoFingerSnapshot,
        current: TwoFingerSnapshot,
    },
    /// Tracking ended; pointers were released from the retainer if held
    Released {
        last: TwoFingerSnapshot,
        was_active: bool,
        cancelled: bool,
    },
}

pub(crate) struct TwoFingerTracker {
    machine: StateMachine,
    ids: Option<(i32, i32)>,
    start: Option<TwoFingerSnapshot>,
    previous: Option<TwoFingerSnapshot>,
}

impl TwoFingerTracker {
    pub fn new(label: &'static str) -> Self {
        Self {
            machine: phase_machine(label),
            ids: None,
            start: None,
            previous: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.machine.is_in(states::ACTIVE)
    }

    pub fn is_tracking(&self) -> bool {
        !self.machine.is_in(states::IDLE)
    }

    /// Snapshot taken when tracking began
    pub fn start(&self) -> Option<TwoFingerSnapshot> {
        self.start
    }

    pub fn process(&mut self, event: &MotionEvent, retainer: &mut PointerRetainer) -> TwoFingerStep {
        match event.action {
            MotionAction::Down | MotionAction::PointerDown => {
                if event.action == MotionAction::Down {
                    self.reset();
                }
                if self.is_tracking() {
                    return TwoFingerStep::Ignored;
                }
                let free: SmallVec<[&TouchPointer; 4]> = event
                    .pointers
                    .iter()
                    .filter(|p| !retainer.is_retained(p.id))
                    .collect();
                let [first, second, ..] = free.as_slice() else {
                    return TwoFingerStep::Ignored;
                };
                let snapshot = TwoFingerSnapshot::new(first, second, event.event_time_ms);
                self.ids = Some((first.id, second.id));
                self.start = Some(snapshot);
                self.previous = Some(snapshot);
                self.machine.send(events::POINTERS_DOWN);
                TwoFingerStep::Tracking(snapshot)
            }
            MotionAction::Move => {
                let (Some((first_id, second_id)), Some(previous)) = (self.ids, self.previous) else {
                    return TwoFingerStep::Ignored;
                };
                let (Some(first), Some(second)) =
                    (event.pointer_by_id(first_id), event.pointer_by_id(second_id))
                else {
                    return TwoFingerStep::Ignored;
                };
                TwoFingerStep::Moved {
                    previous,
                    current: TwoFingerSnapshot::new(first, second, event.event_time_ms),
                }
            }
            MotionAction::Up | MotionAction::PointerUp => match self.ids {
                Some((first, second)) if event.lifts(first) || event.lifts(second) => {
                    self.finish(retainer, false)
                }
                _ => TwoFingerStep::Ignored,
            },
            MotionAction::Cancel => {
                if self.ids.is_none() {
                    return TwoFingerStep::Ignored;
                }
                self.finish(retainer, true)
            }
        }
    }

    /// Forget any tracked pair without reporting it
    pub fn reset(&mut self) {
        self.machine.reset();
        self.ids = None;
        self.start = None;
        self.previous = None;
    }

    /// Accept `current` as the baseline for the next delta
    pub fn commit(&mut self, current: TwoFingerSnapshot) {
        self.previous = Some(current);
    }

    /// Move from tracking to active, claiming both pointers.
    ///
    /// Fails, and abandons tracking, when another gesture already owns one of
    /// the pointers.
    pub fn try_activate(&mut self, retainer: &mut PointerRetainer) -> bool {
        let Some((first, second)) = self.ids else {
            return false;
        };
        if retainer.is_retained(first) || retainer.is_retained(second) {
            self.finish(retainer, true);
            return false;
        }
        if self.machine.send(events::SLOP_EXCEEDED).is_none() {
            return false;
        }
        retainer.retain(first);
        retainer.retain(second);
        true
    }

    fn finish(&mut self, retainer: &mut PointerRetainer, cancelled: bool) -> TwoFingerStep {
        let was_active = self.is_active();
        if was_active {
            if let Some((first, second)) = self.ids {
                retainer.release(first);
                retainer.release(second);
            }
        }
        self.machine.send(if cancelled {
            events::CANCELLED
        } else {
            events::RELEASED
        });

        let last = self.previous.take();
        self.ids = None;
        self.start = None;
        match last {
            Some(last) => TwoFingerStep::Released {
                last,
                was_active,
                cancelled,
            },
            None => TwoFingerStep::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(action: MotionAction, a: (f32, f32), b: (f32, f32), t: u64) -> MotionEvent {
        MotionEvent::new(
            action,
            [TouchPointer::new(0, a.0, a.1), TouchPointer::new(1, b.0, b.1)],
            1,
            t,
        )
    }

    #[test]
    fn test_snapshot_measurements() {
        let snapshot = TwoFingerSnapshot::new(
            &TouchPointer::new(0, 0.0, 0.0),
            &TouchPointer::new(1, 0.0, 10.0),
            0,
        );
        assert!((snapshot.angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(snapshot.span(), 10.0);
        assert_eq!(snapshot.focus(), Vec2::new(0.0, 5.0));
        assert_eq!(snapshot.pressure, 2.0);
    }

    #[test]
    fn test_pressure_filter_threshold() {
        let at = |pressure: f32| TwoFingerSnapshot {
            first: Vec2::ZERO,
            second: Vec2::X,
            pressure,
            time_ms: 0,
        };
        assert!(at(1.4).pressure_accepted(&at(2.0), 0.67));
        assert!(!at(1.2).pressure_accepted(&at(2.0), 0.67));
        assert!(at(0.5).pressure_accepted(&at(0.0), 0.67));
    }

    #[test]
    fn test_retained_pointer_blocks_activation() {
        let mut retainer = PointerRetainer::new();
        let mut tracker = TwoFingerTracker::new("test");
        tracker.process(&pair(MotionAction::PointerDown, (0.0, 0.0), (10.0, 0.0), 0), &mut retainer);
        assert!(tracker.is_tracking());

        retainer.retain(1);
        assert!(!tracker.try_activate(&mut retainer));
        assert!(!tracker.is_tracking());
        assert!(retainer.is_retained(1));
    }

    #[test]
    fn test_single_free_pointer_does_not_track() {
        let mut retainer = PointerRetainer::new();
        retainer.retain(0);
        let mut tracker = TwoFingerTracker::new("test");
        let step = tracker.process(&pair(MotionAction::PointerDown, (0.0, 0.0), (10.0, 0.0), 0), &mut retainer);
        assert_eq!(step, TwoFingerStep::Ignored);
    }

    #[test]
    fn test_release_frees_pointers() {
        let mut retainer = PointerRetainer::new();
        let mut tracker = TwoFingerTracker::new("test");
        tracker.process(&pair(MotionAction::PointerDown, (0.0, 0.0), (10.0, 0.0), 0), &mut retainer);
        assert!(tracker.try_activate(&mut retainer));
        assert!(retainer.is_retained(0) && retainer.is_retained(1));

        let step = tracker.process(&pair(MotionAction::PointerUp, (0.0, 0.0), (10.0, 0.0), 5), &mut retainer);
        assert!(matches!(
            step,
            TwoFingerStep::Released {
                was_active: true,
                cancelled: false,
                ..
            }
        ));
        assert!(retainer.is_empty());
    }
}
