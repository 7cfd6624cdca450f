//! SceneView Gestures
//!
//! Turns a multi-touch [`MotionEvent`](sceneview_core::MotionEvent) stream
//! into manipulation gestures.
//!
//! # Features
//!
//! - **Rotate**: two-finger twist with an angular start threshold
//! - **Pinch**: two-finger span change reported as a clamped scale factor
//! - **Drag**: single-finger translation aimed at a picked scene node
//! - **Pressure filter**: two-finger updates are dropped while combined
//!   pressure collapses (a finger lifting off)
//! - **Pointer retention**: a pointer owned by an active gesture cannot start
//!   another one
//!
//! Every gesture reports `Started` once, `Moved` zero or more times, then
//! `Ended` once.

pub mod config;
pub mod drag;
pub mod phase;
pub mod pinch;
pub mod pointers;
pub mod rotate;
pub mod system;
mod two_finger;

#[cfg(target_os = "android")]
pub mod android;

pub use config::GestureConfig;
pub use drag::{DragGesture, DragGestureDetector};
pub use phase::GesturePhase;
pub use pinch::{PinchGesture, PinchGestureDetector};
pub use pointers::PointerRetainer;
pub use rotate::{RotateGesture, RotateGestureDetector};
pub use system::{GestureEvent, GestureSystem};
