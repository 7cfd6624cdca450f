//! Android `MotionEvent` bridge

use ndk::event::MotionAction as NdkAction;
use sceneview_core::events::{MotionAction, MotionEvent, TouchPointer};

/// Converts an NDK MotionEvent into the platform-neutral event model.
///
/// Returns `None` for actions the detectors do not consume (hover, scroll,
/// button presses).
pub fn convert_motion_event(event: &ndk::event::MotionEvent) -> Option<MotionEvent> {
    let action = match event.action() {
        NdkAction::Down => MotionAction::Down,
        NdkAction::PointerDown => MotionAction::PointerDown,
        NdkAction::Move => MotionAction::Move,
        NdkAction::PointerUp => MotionAction::PointerUp,
        NdkAction::Up => MotionAction::Up,
        NdkAction::Cancel => MotionAction::Cancel,
        _ => return None,
    };

    let pointers = (0..event.pointer_count()).map(|i| {
        let p = event.pointer_at_index(i);
        TouchPointer {
            id: p.pointer_id(),
            x: p.x(),
            y: p.y(),
            pressure: p.pressure(),
        }
    });

    // NDK event times are nanoseconds since boot
    let event_time_ms = (event.event_time() / 1_000_000).max(0) as u64;

    Some(MotionEvent::new(
        action,
        pointers,
        event.pointer_index(),
        event_time_ms,
    ))
}
