//! Gesture routing and per-frame ticking for every transformable node

use sceneview_core::{ArFrame, MotionEvent, NodeId, NodePicker, SceneGraph};
use sceneview_gesture::{GestureEvent, GestureSystem};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::config::ManipulationConfig;
use crate::error::{ManipulationError, Result};
use crate::manipulator::ManipulationContext;
use crate::selection::Selection;
use crate::transformable::TransformableNode;

/// Owns gesture detection, selection and the transformable nodes.
///
/// The host forwards raw touch events to [`on_touch_event`] and calls
/// [`on_frame`] once per rendered frame.
///
/// [`on_touch_event`]: TransformationSystem::on_touch_event
/// [`on_frame`]: TransformationSystem::on_frame
pub struct TransformationSystem {
    config: ManipulationConfig,
    gestures: GestureSystem,
    selection: Selection,
    nodes: Vec<TransformableNode>,
}

impl TransformationSystem {
    pub fn new(config: ManipulationConfig) -> Self {
        Self {
            gestures: GestureSystem::new(&config.gestures),
            config,
            selection: Selection::new(),
            nodes: Vec::new(),
        }
    }

    pub fn config(&self) -> &ManipulationConfig {
        &self.config
    }

    /// Make `node` transformable with every manipulator enabled
    pub fn add_transformable(&mut self, node: NodeId) -> &mut TransformableNode {
        let transformable = TransformableNode::new(node, &self.config);
        self.insert(transformable)
    }

    /// Register a prepared node, replacing any earlier registration
    pub fn insert(&mut self, transformable: TransformableNode) -> &mut TransformableNode {
        let node = transformable.node();
        self.nodes.retain(|n| n.node() != node);
        self.nodes.push(transformable);
        let index = self.nodes.len() - 1;
        &mut self.nodes[index]
    }

    pub fn remove(&mut self, node: NodeId) -> Option<TransformableNode> {
        let index = self.nodes.iter().position(|n| n.node() == node)?;
        self.selection.forget(node);
        Some(self.nodes.remove(index))
    }

    pub fn transformable(&self, node: NodeId) -> Option<&TransformableNode> {
        self.nodes.iter().find(|n| n.node() == node)
    }

    pub fn transformables(&self) -> impl Iterator<Item = &TransformableNode> {
        self.nodes.iter()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selection.selected()
    }

    /// Select a registered node. Returns `Ok(false)` while another node is
    /// mid-transform.
    pub fn select(&mut self, node: NodeId) -> Result<bool> {
        if self.transformable(node).is_none() {
            return Err(ManipulationError::NodeMissing(node));
        }
        self.sync_selection();
        Ok(self.selection.select(node))
    }

    pub fn deselect(&mut self) -> bool {
        self.sync_selection();
        self.selection.deselect()
    }

    /// Run one touch event through gesture detection and route the
    /// resulting gestures to the nodes.
    ///
    /// Returns the gesture events the touch produced, consumed or not.
    /// Every gesture is routed even when an earlier one fails; the first
    /// failure is returned.
    pub fn on_touch_event(
        &mut self,
        graph: &mut SceneGraph,
        event: &MotionEvent,
        picker: &dyn NodePicker,
        frame: Option<&dyn ArFrame>,
    ) -> Result<SmallVec<[GestureEvent; 3]>> {
        let gestures = self.gestures.on_touch_event(event, picker);
        let mut first_error = None;
        for gesture in &gestures {
            if let Err(err) = self.dispatch(graph, gesture, frame) {
                warn!(%err, phase = ?gesture.phase(), "gesture dispatch failed");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(gestures),
        }
    }

    /// Route one gesture event; returns whether a node consumed it
    pub fn dispatch(
        &mut self,
        graph: &mut SceneGraph,
        gesture: &GestureEvent,
        frame: Option<&dyn ArFrame>,
    ) -> Result<bool> {
        self.sync_selection();
        let mut ctx = ManipulationContext {
            graph,
            selection: &mut self.selection,
            frame,
        };
        for node in &mut self.nodes {
            if node.handle(gesture, &mut ctx)? {
                trace!(node = ?node.node(), phase = ?gesture.phase(), "gesture consumed");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Per-frame update: anchor nodes follow their anchors, then every
    /// manipulator advances its smoothing.
    pub fn on_frame(&mut self, graph: &mut SceneGraph, delta_seconds: f32) -> Result<()> {
        graph.refresh_anchors();

        let before = self.nodes.len();
        self.nodes.retain(|n| graph.contains(n.node()));
        if self.nodes.len() != before {
            debug!(dropped = before - self.nodes.len(), "transformable nodes left the scene");
            if let Some(selected) = self.selection.selected() {
                if !graph.contains(selected) {
                    self.selection.forget(selected);
                }
            }
        }

        for node in &mut self.nodes {
            node.on_frame(graph, delta_seconds)?;
        }
        self.sync_selection();
        Ok(())
    }

    fn sync_selection(&mut self) {
        let transforming = self
            .selection
            .selected()
            .and_then(|selected| self.transformable(selected))
            .is_some_and(TransformableNode::is_transforming);
        self.selection.set_selected_transforming(transforming);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use sceneview_core::{MotionAction, TouchPointer};

    #[test]
    fn test_select_unknown_node_is_error() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node("model", None).unwrap();
        let mut system = TransformationSystem::new(ManipulationConfig::default());
        assert_eq!(system.select(node), Err(ManipulationError::NodeMissing(node)));

        system.add_transformable(node);
        assert_eq!(system.select(node), Ok(true));
        assert_eq!(system.selected(), Some(node));
    }

    #[test]
    fn test_reregistering_replaces() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node("model", None).unwrap();
        let mut system = TransformationSystem::new(ManipulationConfig::default());
        system.add_transformable(node);
        system.add_transformable(node);
        assert_eq!(system.transformables().count(), 1);
    }

    #[test]
    fn test_removed_scene_node_is_dropped_on_frame() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node("model", None).unwrap();
        let mut system = TransformationSystem::new(ManipulationConfig::default());
        system.add_transformable(node);
        system.select(node).unwrap();

        graph.remove(node).unwrap();
        system.on_frame(&mut graph, 1.0 / 60.0).unwrap();
        assert!(system.transformable(node).is_none());
        assert_eq!(system.selected(), None);
    }

    #[test]
    fn test_twist_rotates_only_selected_node() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node("a", None).unwrap();
        let b = graph.add_node("b", None).unwrap();
        let mut system = TransformationSystem::new(ManipulationConfig::default());
        system.add_transformable(a);
        system.add_transformable(b);
        system.select(b).unwrap();

        let nothing = |_: Vec2| -> Option<NodeId> { None };
        let pair = |action, second: (f32, f32), t| {
            MotionEvent::new(
                action,
                [TouchPointer::new(0, 0.0, 0.0), TouchPointer::new(1, second.0, second.1)],
                1,
                t,
            )
        };
        // Span stays at 100 px so only the rotate detector fires
        let steps = [
            pair(MotionAction::Down, (100.0, 0.0), 0),
            pair(MotionAction::PointerDown, (100.0, 0.0), 1),
            pair(MotionAction::Move, (99.619_47, 8.715_574), 16),
            pair(MotionAction::Move, (98.480_78, 17.364_818), 32),
            pair(MotionAction::PointerUp, (98.480_78, 17.364_818), 48),
        ];
        for event in &steps {
            system.on_touch_event(&mut graph, event, &nothing, None).unwrap();
        }

        assert_eq!(graph.node(a).unwrap().rotation(), glam::Quat::IDENTITY);
        let rotation = graph.node(b).unwrap().rotation();
        // 5° of twist after the start at half rate
        let expected = glam::Quat::from_rotation_y((-2.5f32).to_radians());
        assert!(rotation.abs_diff_eq(expected, 1e-4));
    }
}
