//! A node that can be dragged, twisted and pinched

use sceneview_core::{NodeId, SceneGraph};
use sceneview_gesture::GestureEvent;
use smallvec::SmallVec;

use crate::config::ManipulationConfig;
use crate::error::Result;
use crate::manipulator::{ManipulationContext, Manipulator, ManipulatorKind};
use crate::rotation::RotationController;
use crate::scale::ScaleController;
use crate::translation::TranslationController;

/// One node plus the manipulators that drive it.
///
/// Each manipulator tracks its own gesture, so one finger can drag a node
/// while a second pair twists or pinches it. Twist and pinch never share a
/// pointer pair; whichever starts first owns it.
#[derive(Debug)]
pub struct TransformableNode {
    node: NodeId,
    manipulators: SmallVec<[Manipulator; 3]>,
}

impl TransformableNode {
    /// A node with translation, rotation and scale manipulators
    pub fn new(node: NodeId, config: &ManipulationConfig) -> Self {
        Self::with_manipulators(
            node,
            [
                Manipulator::Translate(TranslationController::new(node, config.translation.clone())),
                Manipulator::Rotate(RotationController::new(node, &config.rotation)),
                Manipulator::Scale(ScaleController::new(node, config.scale.clone())),
            ],
        )
    }

    /// A node driven only by `manipulators`. Manipulators built for another
    /// node are dropped.
    pub fn with_manipulators(node: NodeId, manipulators: impl IntoIterator<Item = Manipulator>) -> Self {
        Self {
            node,
            manipulators: manipulators.into_iter().filter(|m| m.node() == node).collect(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn manipulators(&self) -> &[Manipulator] {
        &self.manipulators
    }

    pub fn manipulator(&self, kind: ManipulatorKind) -> Option<&Manipulator> {
        self.manipulators.iter().find(|m| m.kind() == kind)
    }

    pub fn translation(&self) -> Option<&TranslationController> {
        self.manipulator(ManipulatorKind::Translate)
            .and_then(Manipulator::as_translation)
    }

    pub fn scale(&self) -> Option<&ScaleController> {
        self.manipulator(ManipulatorKind::Scale).and_then(Manipulator::as_scale)
    }

    /// Whether any manipulator is mid-gesture or still easing
    pub fn is_transforming(&self) -> bool {
        self.manipulators.iter().any(Manipulator::is_transforming)
    }

    /// Offer `event` to each manipulator in turn; stops at the first that
    /// consumes it.
    pub fn handle(&mut self, event: &GestureEvent, ctx: &mut ManipulationContext<'_>) -> Result<bool> {
        for manipulator in &mut self.manipulators {
            if manipulator.handle(event, ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn on_frame(&mut self, graph: &mut SceneGraph, delta_seconds: f32) -> Result<()> {
        for manipulator in &mut self.manipulators {
            manipulator.on_frame(graph, delta_seconds)?;
        }
        Ok(())
    }
}
