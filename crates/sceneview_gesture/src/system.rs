//! Runs every detector over one touch stream

use sceneview_core::ar::NodePicker;
use sceneview_core::events::{MotionAction, MotionEvent};
use smallvec::SmallVec;

use crate::config::GestureConfig;
use crate::drag::{DragGesture, DragGestureDetector};
use crate::phase::GesturePhase;
use crate::pinch::{PinchGesture, PinchGestureDetector};
use crate::pointers::PointerRetainer;
use crate::rotate::{RotateGesture, RotateGestureDetector};

/// Output of any detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Drag(DragGesture),
    Rotate(RotateGesture),
    Pinch(PinchGesture),
}

impl GestureEvent {
    pub fn phase(&self) -> GesturePhase {
        match self {
            GestureEvent::Drag(g) => g.phase,
            GestureEvent::Rotate(g) => g.phase,
            GestureEvent::Pinch(g) => g.phase,
        }
    }
}

/// Owns the detectors and the pointer retainer they share
pub struct GestureSystem {
    retainer: PointerRetainer,
    drag: DragGestureDetector,
    rotate: RotateGestureDetector,
    pinch: PinchGestureDetector,
}

impl GestureSystem {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            retainer: PointerRetainer::new(),
            drag: DragGestureDetector::new(config),
            rotate: RotateGestureDetector::new(config),
            pinch: PinchGestureDetector::new(config),
        }
    }

    /// Feed one event to every detector.
    ///
    /// Events come back in detector order: drag, rotate, pinch. When rotate
    /// and pinch cross their thresholds on the same event, rotate claims the
    /// pointers first.
    pub fn on_touch_event(
        &mut self,
        event: &MotionEvent,
        picker: &dyn NodePicker,
    ) -> SmallVec<[GestureEvent; 3]> {
        if event.action == MotionAction::Down {
            self.retainer.clear();
        }

        let mut out = SmallVec::new();
        if let Some(gesture) = self.drag.on_touch_event(event, &mut self.retainer, picker) {
            out.push(GestureEvent::Drag(gesture));
        }
        if let Some(gesture) = self.rotate.on_touch_event(event, &mut self.retainer) {
            out.push(GestureEvent::Rotate(gesture));
        }
        if let Some(gesture) = self.pinch.on_touch_event(event, &mut self.retainer) {
            out.push(GestureEvent::Pinch(gesture));
        }
        out
    }

    pub fn is_any_in_progress(&self) -> bool {
        self.drag.is_in_progress() || self.rotate.is_in_progress() || self.pinch.is_in_progress()
    }

    pub fn retainer(&self) -> &PointerRetainer {
        &self.retainer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use sceneview_core::events::TouchPointer;
    use sceneview_core::node::NodeId;

    fn nothing(_: Vec2) -> Option<NodeId> {
        None
    }

    #[test]
    fn test_active_drag_blocks_two_finger_gestures() {
        let mut system = GestureSystem::new(&GestureConfig::default());
        let one = |action, x: f32, t| MotionEvent::new(action, [TouchPointer::new(0, x, 0.0)], 0, t);

        system.on_touch_event(&one(MotionAction::Down, 0.0, 0), &nothing);
        let started = system.on_touch_event(&one(MotionAction::Move, 40.0, 16), &nothing);
        assert!(matches!(started.as_slice(), [GestureEvent::Drag(g)] if g.phase == GesturePhase::Started));

        // Second finger lands and the pair twists and spreads
        let second_down = MotionEvent::new(
            MotionAction::PointerDown,
            [TouchPointer::new(0, 40.0, 0.0), TouchPointer::new(1, 140.0, 0.0)],
            1,
            32,
        );
        system.on_touch_event(&second_down, &nothing);
        let twisted = MotionEvent::new(
            MotionAction::Move,
            [TouchPointer::new(0, 40.0, 0.0), TouchPointer::new(1, 140.0, 80.0)],
            0,
            48,
        );
        let events = system.on_touch_event(&twisted, &nothing);
        assert!(events
            .iter()
            .all(|e| matches!(e, GestureEvent::Drag(_))));
    }

    #[test]
    fn test_rotate_claims_pointers_before_pinch() {
        let mut system = GestureSystem::new(&GestureConfig::default());
        let pair = |action, b: (f32, f32), t| {
            MotionEvent::new(
                action,
                [TouchPointer::new(0, 0.0, 0.0), TouchPointer::new(1, b.0, b.1)],
                1,
                t,
            )
        };

        system.on_touch_event(&pair(MotionAction::Down, (100.0, 0.0), 0), &nothing);
        system.on_touch_event(&pair(MotionAction::PointerDown, (100.0, 0.0), 1), &nothing);
        // Both the angle (~27°) and the span (+~23 px) cross their thresholds
        let events = system.on_touch_event(&pair(MotionAction::Move, (110.0, 56.0), 16), &nothing);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GestureEvent::Rotate(g) if g.phase == GesturePhase::Started));
        assert!(system.is_any_in_progress());

        let ended = system.on_touch_event(&pair(MotionAction::PointerUp, (110.0, 56.0), 32), &nothing);
        assert_eq!(ended.len(), 1);
        assert_eq!(ended[0].phase(), GesturePhase::Ended);
        assert!(system.retainer().is_empty());
    }
}
