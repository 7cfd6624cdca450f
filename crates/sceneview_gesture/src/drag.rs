//! Single-finger drag detection
//!
//! The node under the pointer is resolved once, at pointer-down, through the
//! host's [`NodePicker`]. The drag starts once the pointer travels past the
//! slop while it is the only pointer down.

use glam::Vec2;
use sceneview_core::ar::NodePicker;
use sceneview_core::events::{MotionAction, MotionEvent};
use sceneview_core::fsm::StateMachine;
use sceneview_core::node::NodeId;
use tracing::debug;

use crate::config::GestureConfig;
use crate::phase::{events, phase_machine, states, GesturePhase};
use crate::pointers::PointerRetainer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub phase: GesturePhase,
    /// Node under the pointer when it went down
    pub target: Option<NodeId>,
    pub start_position: Vec2,
    /// Current pointer position, view space
    pub position: Vec2,
    /// Movement since the previous update
    pub delta: Vec2,
    pub time_ms: u64,
    pub cancelled: bool,
}

pub struct DragGestureDetector {
    machine: StateMachine,
    slop: f32,
    pointer_id: Option<i32>,
    target: Option<NodeId>,
    start: Vec2,
    last: Vec2,
}

impl DragGestureDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            machine: phase_machine("drag"),
            slop: config.drag_slop_px,
            pointer_id: None,
            target: None,
            start: Vec2::ZERO,
            last: Vec2::ZERO,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.machine.is_in(states::ACTIVE)
    }

    pub fn on_touch_event(
        &mut self,
        event: &MotionEvent,
        retainer: &mut PointerRetainer,
        picker: &dyn NodePicker,
    ) -> Option<DragGesture> {
        match event.action {
            MotionAction::Down => {
                // Down always opens a fresh stream; drop anything left over
                self.machine.reset();
                self.clear();
                let pointer = event.action_pointer()?;
                if retainer.is_retained(pointer.id) {
                    return None;
                }
                self.pointer_id = Some(pointer.id);
                self.target = picker.pick(pointer.position());
                self.start = pointer.position();
                self.last = self.start;
                self.machine.send(events::POINTERS_DOWN);
                None
            }
            MotionAction::PointerDown => {
                // A second finger turns a pending drag into a two-finger gesture
                if self.machine.is_in(states::TRACKING) {
                    self.machine.send(events::CANCELLED);
                    self.clear();
                }
                None
            }
            MotionAction::Move => {
                let pointer = event.pointer_by_id(self.pointer_id?)?;
                let position = pointer.position();

                if self.machine.is_in(states::TRACKING) {
                    if event.pointer_count() != 1 || position.distance(self.start) <= self.slop {
                        return None;
                    }
                    if retainer.is_retained(pointer.id) {
                        self.machine.send(events::CANCELLED);
                        self.clear();
                        return None;
                    }
                    self.machine.send(events::SLOP_EXCEEDED);
                    retainer.retain(pointer.id);
                    self.last = position;
                    debug!(node = ?self.target, "drag gesture started");
                    return Some(self.gesture(GesturePhase::Started, position, Vec2::ZERO, event));
                }

                if !self.is_in_progress() {
                    return None;
                }
                let delta = position - self.last;
                self.last = position;
                Some(self.gesture(GesturePhase::Moved, position, delta, event))
            }
            MotionAction::Up | MotionAction::PointerUp => {
                let id = self.pointer_id?;
                if !event.lifts(id) {
                    return None;
                }
                self.finish(retainer, event, false)
            }
            MotionAction::Cancel => {
                self.pointer_id?;
                self.finish(retainer, event, true)
            }
        }
    }

    fn finish(
        &mut self,
        retainer: &mut PointerRetainer,
        event: &MotionEvent,
        cancelled: bool,
    ) -> Option<DragGesture> {
        let was_active = self.is_in_progress();
        self.machine.send(if cancelled {
            events::CANCELLED
        } else {
            events::RELEASED
        });

        let gesture = was_active.then(|| {
            let mut gesture = self.gesture(GesturePhase::Ended, self.last, Vec2::ZERO, event);
            gesture.cancelled = cancelled;
            gesture
        });
        if let Some(id) = self.pointer_id {
            if was_active {
                retainer.release(id);
            }
        }
        if was_active {
            debug!(cancelled, "drag gesture ended");
        }
        self.clear();
        gesture
    }

    fn clear(&mut self) {
        self.pointer_id = None;
        self.target = None;
    }

    fn gesture(&self, phase: GesturePhase, position: Vec2, delta: Vec2, event: &MotionEvent) -> DragGesture {
        DragGesture {
            phase,
            target: self.target,
            start_position: self.start,
            position,
            delta,
            time_ms: event.event_time_ms,
            cancelled: false,
        }
    }
}
