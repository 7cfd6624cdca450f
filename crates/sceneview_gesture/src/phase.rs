//! Gesture phases and the state machine every detector runs on.
//!
//! ```text
//! IDLE --pointers down--> TRACKING --slop exceeded--> ACTIVE
//!   ^                        |                          |
//!   +------released/cancelled+--------------------------+
//! ```

use sceneview_core::fsm::{EventId, StateId, StateMachine};
use serde::{Deserialize, Serialize};

/// Phase reported with every emitted gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Started,
    Moved,
    Ended,
}

/// Detector states
pub mod states {
    use super::StateId;

    pub const IDLE: StateId = 0;
    /// Pointers are down but the start threshold has not been crossed
    pub const TRACKING: StateId = 1;
    pub const ACTIVE: StateId = 2;
}

/// Detector events
pub mod events {
    use super::EventId;

    pub const POINTERS_DOWN: EventId = 1;
    pub const SLOP_EXCEEDED: EventId = 2;
    pub const RELEASED: EventId = 3;
    pub const CANCELLED: EventId = 4;
}

pub(crate) fn phase_machine(label: &'static str) -> StateMachine {
    use events::*;
    use states::*;

    StateMachine::builder(IDLE)
        .label(label)
        .on(IDLE, POINTERS_DOWN, TRACKING)
        .on(TRACKING, SLOP_EXCEEDED, ACTIVE)
        .on_any(&[TRACKING, ACTIVE], RELEASED, IDLE)
        .on_any(&[TRACKING, ACTIVE], CANCELLED, IDLE)
        .build()
}
