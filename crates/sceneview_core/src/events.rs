//! Touch event model
//!
//! A platform-neutral multi-touch stream. Each [`MotionEvent`] carries the
//! full set of pointers currently down, mirroring how Android reports
//! `MotionEvent`s, so detectors never need to track pointers themselves.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Touch pointer state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPointer {
    /// Pointer ID, stable for the lifetime of the touch
    pub id: i32,
    /// X coordinate in view space
    pub x: f32,
    /// Y coordinate in view space
    pub y: f32,
    /// Pressure (0.0 - 1.0, may exceed 1.0 on some devices)
    #[serde(default = "default_pressure")]
    pub pressure: f32,
}

fn default_pressure() -> f32 {
    1.0
}

impl TouchPointer {
    pub fn new(id: i32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            pressure: 1.0,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// What happened in a motion event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionAction {
    /// First pointer went down
    Down,
    /// An additional pointer went down
    PointerDown,
    /// One or more pointers moved
    Move,
    /// A pointer other than the last went up
    PointerUp,
    /// The last pointer went up
    Up,
    /// The gesture was aborted (e.g., by a system gesture)
    Cancel,
}

/// A single touch event with the pointers present at that instant
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    pub action: MotionAction,
    /// Pointers down during this event. For up actions the lifting pointer is
    /// still included.
    pub pointers: SmallVec<[TouchPointer; 4]>,
    /// Index into `pointers` of the pointer that changed state
    pub action_index: usize,
    /// Event time in milliseconds
    pub event_time_ms: u64,
}

impl MotionEvent {
    pub fn new(
        action: MotionAction,
        pointers: impl IntoIterator<Item = TouchPointer>,
        action_index: usize,
        event_time_ms: u64,
    ) -> Self {
        Self {
            action,
            pointers: pointers.into_iter().collect(),
            action_index,
            event_time_ms,
        }
    }

    /// The pointer whose state changed, for down/up actions
    pub fn action_pointer(&self) -> Option<&TouchPointer> {
        match self.action {
            MotionAction::Move | MotionAction::Cancel => None,
            _ => self.pointers.get(self.action_index),
        }
    }

    pub fn pointer_by_id(&self, id: i32) -> Option<&TouchPointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Whether this event lifts the pointer `id`
    pub fn lifts(&self, id: i32) -> bool {
        matches!(self.action, MotionAction::Up | MotionAction::PointerUp)
            && self.action_pointer().map_or(false, |p| p.id == id)
    }

    /// Pointers that remain down after this event
    pub fn remaining_pointers(&self) -> impl Iterator<Item = &TouchPointer> {
        let cancelled = self.action == MotionAction::Cancel;
        let lifted = match self.action {
            MotionAction::Up | MotionAction::PointerUp => self.action_pointer().map(|p| p.id),
            _ => None,
        };
        self.pointers
            .iter()
            .filter(move |p| !cancelled && Some(p.id) != lifted)
    }
}
