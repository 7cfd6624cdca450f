//! Twist-to-rotate controller

use glam::Quat;
use sceneview_core::math::UP;
use sceneview_core::{NodeId, SceneGraph};
use sceneview_gesture::RotateGesture;

use crate::config::RotationConfig;
use crate::error::Result;
use crate::manipulator::{ManipulationContext, TransformationController};

/// Spins the selected node about its local up axis
#[derive(Debug)]
pub struct RotationController {
    node: NodeId,
    rate_degrees: f32,
    active: bool,
}

impl RotationController {
    pub fn new(node: NodeId, settings: &RotationConfig) -> Self {
        Self {
            node,
            rate_degrees: settings.rate_degrees,
            active: false,
        }
    }
}

impl TransformationController for RotationController {
    type Gesture = RotateGesture;

    fn node(&self) -> NodeId {
        self.node
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn can_begin(&mut self, _gesture: &RotateGesture, ctx: &mut ManipulationContext<'_>) -> Result<bool> {
        Ok(ctx.selection.is_selected(self.node))
    }

    fn on_continue(&mut self, gesture: &RotateGesture, ctx: &mut ManipulationContext<'_>) -> Result<()> {
        // Screen twist is clockwise-positive; node yaw is counter-clockwise
        let amount = -gesture.rotation_delta_degrees() * self.rate_degrees;
        let delta = Quat::from_axis_angle(UP, amount.to_radians());
        let node = ctx.graph.node_mut(self.node)?;
        node.set_rotation(node.rotation() * delta);
        Ok(())
    }

    fn on_end(&mut self, _gesture: &RotateGesture, _ctx: &mut ManipulationContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, _graph: &mut SceneGraph, _delta_seconds: f32) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Selection;
    use glam::Vec2;
    use sceneview_gesture::GesturePhase;

    fn twist(degrees: f32) -> RotateGesture {
        RotateGesture {
            phase: GesturePhase::Moved,
            rotation_delta: degrees.to_radians(),
            total_rotation: degrees.to_radians(),
            focus: Vec2::ZERO,
            time_ms: 0,
            cancelled: false,
        }
    }

    #[test]
    fn test_requires_selection() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node("model", None).unwrap();
        let mut selection = Selection::new();
        let mut controller = RotationController::new(node, &RotationConfig::default());
        let mut ctx = ManipulationContext {
            graph: &mut graph,
            selection: &mut selection,
            frame: None,
        };

        assert!(!controller.can_begin(&twist(0.0), &mut ctx).unwrap());
        ctx.selection.select(node);
        assert!(controller.can_begin(&twist(0.0), &mut ctx).unwrap());
    }

    #[test]
    fn test_twist_rotates_at_half_rate_about_up() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node("model", None).unwrap();
        let mut selection = Selection::new();
        let mut controller = RotationController::new(node, &RotationConfig::default());
        let mut ctx = ManipulationContext {
            graph: &mut graph,
            selection: &mut selection,
            frame: None,
        };

        controller.on_continue(&twist(20.0), &mut ctx).unwrap();
        controller.on_continue(&twist(20.0), &mut ctx).unwrap();

        let expected = Quat::from_rotation_y((-20.0f32).to_radians());
        let rotation = graph.node(node).unwrap().rotation();
        assert!(rotation.abs_diff_eq(expected, 1e-5));
    }
}
