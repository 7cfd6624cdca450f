//! SceneView Core
//!
//! Foundational primitives shared by the gesture and manipulation crates:
//!
//! - **Pose math**: position/rotation pairs over `glam`, plus the frame-rate
//!   independent smoothing factor used by every controller
//! - **Scene graph**: an arena of nodes addressed by [`NodeId`], with world
//!   transform composition and anchor attachment
//! - **State machines**: the flat phase machines gesture detectors run on
//! - **Touch events**: a platform-neutral multi-touch event model
//! - **AR contracts**: the hit-test, trackable and anchor traits a host AR
//!   runtime implements
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use sceneview_core::SceneGraph;
//!
//! let mut graph = SceneGraph::new();
//! let anchor = graph.add_anchor_node("anchor");
//! let model = graph.add_node("model", Some(anchor)).unwrap();
//!
//! graph.node_mut(anchor).unwrap().set_position(Vec3::new(1.0, 0.0, 0.0));
//! graph.node_mut(model).unwrap().set_position(Vec3::new(0.0, 2.0, 0.0));
//!
//! let world = graph.world_position(model).unwrap();
//! assert!((world - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
//! ```

pub mod ar;
pub mod error;
pub mod events;
pub mod fsm;
pub mod math;
pub mod node;

pub use ar::{Anchor, ArFrame, HitResult, NodePicker, PlaneType, Trackable, TrackableKind, TrackingState};
pub use error::{CoreError, Result};
pub use events::{MotionAction, MotionEvent, TouchPointer};
pub use fsm::{EventId, StateId, StateMachine, Transition};
pub use math::Pose;
pub use node::{Node, NodeId, NodeKind, SceneGraph};
