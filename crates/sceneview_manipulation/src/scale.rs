//! Pinch-to-scale controller with rubber-band limits
//!
//! The node's uniform scale is tracked as a ratio where 0 is `min_scale` and
//! 1 is `max_scale`. A pinch may stretch the ratio past either end up to
//! `elastic_ratio_limit`; the overshoot is rendered with a diminishing
//! falloff and springs back once the pinch ends.

use glam::Vec3;
use sceneview_core::math::smoothing_factor;
use sceneview_core::{NodeId, SceneGraph};
use sceneview_gesture::PinchGesture;
use tracing::trace;

use crate::config::ScaleConfig;
use crate::error::Result;
use crate::manipulator::{ManipulationContext, TransformationController};

#[derive(Debug)]
pub struct ScaleController {
    node: NodeId,
    settings: ScaleConfig,
    active: bool,
    /// Unset until first read from the node's scale
    ratio: Option<f32>,
}

impl ScaleController {
    pub fn new(node: NodeId, settings: ScaleConfig) -> Self {
        Self {
            node,
            settings,
            active: false,
            ratio: None,
        }
    }

    /// Current scale ratio, possibly outside `[0, 1]` mid-pinch
    pub fn ratio(&self) -> Option<f32> {
        self.ratio
    }

    fn scale_delta(&self) -> f32 {
        self.settings.max_scale - self.settings.min_scale
    }

    fn ratio_for_scale(&self, scale: f32) -> f32 {
        let range = self.scale_delta();
        // A collapsed range pins the node to `min_scale`
        if range <= f32::EPSILON {
            return 0.0;
        }
        (scale - self.settings.min_scale) / range
    }

    fn elastic_delta(&self, ratio: f32) -> f32 {
        let over = if ratio > 1.0 {
            ratio - 1.0
        } else if ratio < 0.0 {
            ratio
        } else {
            return 0.0;
        };
        (1.0 - 1.0 / (over.abs() * self.settings.elasticity + 1.0)) * over.signum()
    }

    /// Scale rendered for `ratio`: clamped into range plus elastic overshoot
    pub fn final_scale(&self, ratio: f32) -> f32 {
        let elastic = ratio.clamp(0.0, 1.0) + self.elastic_delta(ratio);
        self.settings.min_scale + elastic * self.scale_delta()
    }

    fn current_ratio(&mut self, graph: &SceneGraph) -> Result<f32> {
        match self.ratio {
            Some(ratio) => Ok(ratio),
            None => {
                let ratio = self.ratio_for_scale(graph.node(self.node)?.scale().x);
                self.ratio = Some(ratio);
                Ok(ratio)
            }
        }
    }

    fn apply(&self, graph: &mut SceneGraph, ratio: f32) -> Result<()> {
        let scale = self.final_scale(ratio);
        graph.node_mut(self.node)?.set_scale(Vec3::splat(scale));
        Ok(())
    }
}

impl TransformationController for ScaleController {
    type Gesture = PinchGesture;

    fn node(&self) -> NodeId {
        self.node
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn can_begin(&mut self, _gesture: &PinchGesture, ctx: &mut ManipulationContext<'_>) -> Result<bool> {
        if !ctx.selection.is_selected(self.node) {
            return Ok(false);
        }
        self.ratio = None;
        self.current_ratio(ctx.graph)?;
        Ok(true)
    }

    fn on_continue(&mut self, gesture: &PinchGesture, ctx: &mut ManipulationContext<'_>) -> Result<()> {
        let limit = self.settings.elastic_ratio_limit;
        let ratio = self.current_ratio(ctx.graph)? + gesture.span_delta_inches * self.settings.sensitivity;
        let ratio = ratio.clamp(-limit, 1.0 + limit);
        self.ratio = Some(ratio);
        self.apply(ctx.graph, ratio)
    }

    fn on_end(&mut self, _gesture: &PinchGesture, _ctx: &mut ManipulationContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, graph: &mut SceneGraph, delta_seconds: f32) -> Result<()> {
        if self.active {
            return Ok(());
        }
        let ratio = self.current_ratio(graph)?;
        let clamped = ratio.clamp(0.0, 1.0);
        if ratio == clamped {
            return Ok(());
        }

        let t = smoothing_factor(delta_seconds, self.settings.lerp_speed);
        let mut next = ratio + (clamped - ratio) * t;
        if (next - clamped).abs() < 1e-4 {
            next = clamped;
            trace!(node = ?self.node, "scale settled");
        }
        self.ratio = Some(next);
        self.apply(graph, next)
    }
}
