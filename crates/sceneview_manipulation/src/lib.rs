//! SceneView Manipulation
//!
//! Turns touch gestures into transforms of AR-anchored scene nodes:
//!
//! - **Translation**: drag a node across detected planes; on release it is
//!   re-anchored where it was dropped
//! - **Rotation**: twist two fingers to spin the selected node about its up
//!   axis
//! - **Scale**: pinch to scale the selected node within elastic limits
//!
//! [`TransformationSystem`] ties it together: it owns gesture detection and
//! selection, routes each gesture to the node that accepts it, and advances
//! smoothing once per frame.
//!
//! # Example
//!
//! ```rust
//! use sceneview_core::SceneGraph;
//! use sceneview_manipulation::{ManipulationConfig, TransformationSystem};
//!
//! let mut graph = SceneGraph::new();
//! let anchor = graph.add_anchor_node("anchor");
//! let model = graph.add_node("model", Some(anchor)).unwrap();
//!
//! let mut system = TransformationSystem::new(ManipulationConfig::default());
//! system.add_transformable(model);
//! assert!(system.select(model).unwrap());
//!
//! system.on_frame(&mut graph, 1.0 / 60.0).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod manipulator;
pub mod rotation;
pub mod scale;
pub mod selection;
pub mod smoothing;
pub mod system;
pub mod transformable;
pub mod translation;

pub use config::{ManipulationConfig, RotationConfig, ScaleConfig, TranslationConfig};
pub use error::{ConfigError, ManipulationError, Result};
pub use manipulator::{ManipulationContext, Manipulator, ManipulatorKind, TransformationController};
pub use rotation::RotationController;
pub use scale::ScaleController;
pub use selection::Selection;
pub use smoothing::DesiredPose;
pub use system::TransformationSystem;
pub use transformable::TransformableNode;
pub use translation::TranslationController;
