//! Uniform begin / continue / end / frame lifecycle over the controllers

use sceneview_core::{ArFrame, NodeId, SceneGraph};
use sceneview_gesture::{GestureEvent, GesturePhase};
use tracing::debug;

use crate::error::Result;
use crate::rotation::RotationController;
use crate::scale::ScaleController;
use crate::selection::Selection;
use crate::translation::TranslationController;

/// Everything a controller may read or mutate while handling a gesture
pub struct ManipulationContext<'a> {
    pub graph: &'a mut SceneGraph,
    pub selection: &'a mut Selection,
    /// AR frame for the current tick; `None` before the session produces one
    pub frame: Option<&'a dyn ArFrame>,
}

/// A controller that turns one gesture kind into node transforms.
///
/// The lifecycle is driven by [`Manipulator::handle`]: `can_begin` on a
/// started gesture, `on_continue` for every update while active, `on_end`
/// once when the gesture finishes or is cancelled.
pub trait TransformationController {
    type Gesture;

    /// The node this controller manipulates
    fn node(&self) -> NodeId;

    /// Whether a gesture is currently driving this controller
    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// Whether the node is still moving, including any smoothing that
    /// outlives the gesture
    fn is_transforming(&self) -> bool {
        self.is_active()
    }

    fn can_begin(&mut self, gesture: &Self::Gesture, ctx: &mut ManipulationContext<'_>) -> Result<bool>;

    fn on_continue(&mut self, gesture: &Self::Gesture, ctx: &mut ManipulationContext<'_>) -> Result<()>;

    fn on_end(&mut self, gesture: &Self::Gesture, ctx: &mut ManipulationContext<'_>) -> Result<()>;

    fn on_frame(&mut self, graph: &mut SceneGraph, delta_seconds: f32) -> Result<()>;
}

/// Which transform a manipulator drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManipulatorKind {
    Translate,
    Rotate,
    Scale,
}

#[derive(Debug)]
pub enum Manipulator {
    Translate(TranslationController),
    Rotate(RotationController),
    Scale(ScaleController),
}

impl Manipulator {
    pub fn kind(&self) -> ManipulatorKind {
        match self {
            Manipulator::Translate(_) => ManipulatorKind::Translate,
            Manipulator::Rotate(_) => ManipulatorKind::Rotate,
            Manipulator::Scale(_) => ManipulatorKind::Scale,
        }
    }

    pub fn node(&self) -> NodeId {
        match self {
            Manipulator::Translate(c) => c.node(),
            Manipulator::Rotate(c) => c.node(),
            Manipulator::Scale(c) => c.node(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Manipulator::Translate(c) => c.is_active(),
            Manipulator::Rotate(c) => c.is_active(),
            Manipulator::Scale(c) => c.is_active(),
        }
    }

    pub fn is_transforming(&self) -> bool {
        match self {
            Manipulator::Translate(c) => c.is_transforming(),
            Manipulator::Rotate(c) => c.is_transforming(),
            Manipulator::Scale(c) => c.is_transforming(),
        }
    }

    /// Offer a gesture event to this manipulator.
    ///
    /// Returns `true` when the event was consumed: the gesture started here,
    /// or it belongs to the gesture this manipulator is already tracking.
    pub fn handle(&mut self, event: &GestureEvent, ctx: &mut ManipulationContext<'_>) -> Result<bool> {
        match (self, event) {
            (Manipulator::Translate(c), GestureEvent::Drag(g)) => route(c, g.phase, g, ctx),
            (Manipulator::Rotate(c), GestureEvent::Rotate(g)) => route(c, g.phase, g, ctx),
            (Manipulator::Scale(c), GestureEvent::Pinch(g)) => route(c, g.phase, g, ctx),
            _ => Ok(false),
        }
    }

    pub fn on_frame(&mut self, graph: &mut SceneGraph, delta_seconds: f32) -> Result<()> {
        match self {
            Manipulator::Translate(c) => c.on_frame(graph, delta_seconds),
            Manipulator::Rotate(c) => c.on_frame(graph, delta_seconds),
            Manipulator::Scale(c) => c.on_frame(graph, delta_seconds),
        }
    }

    pub fn as_translation(&self) -> Option<&TranslationController> {
        match self {
            Manipulator::Translate(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_scale(&self) -> Option<&ScaleController> {
        match self {
            Manipulator::Scale(c) => Some(c),
            _ => None,
        }
    }
}

fn route<C: TransformationController>(
    controller: &mut C,
    phase: GesturePhase,
    gesture: &C::Gesture,
    ctx: &mut ManipulationContext<'_>,
) -> Result<bool> {
    match phase {
        GesturePhase::Started => {
            if controller.is_active() || !controller.can_begin(gesture, ctx)? {
                return Ok(false);
            }
            controller.set_active(true);
            debug!(node = ?controller.node(), "manipulation began");
            Ok(true)
        }
        GesturePhase::Moved => {
            if !controller.is_active() {
                return Ok(false);
            }
            controller.on_continue(gesture, ctx)?;
            Ok(true)
        }
        GesturePhase::Ended => {
            if !controller.is_active() {
                return Ok(false);
            }
            controller.set_active(false);
            debug!(node = ?controller.node(), "manipulation ended");
            controller.on_end(gesture, ctx)?;
            Ok(true)
        }
    }
}
