//! Drag-to-move controller
//!
//! While a drag is active the node's desired pose follows the nearest
//! qualifying plane hit under the pointer. When the drag ends on a
//! still-tracking plane the node's anchor is replaced by a fresh one at the
//! hit, and the node eases into the new anchor's origin.

use glam::{Quat, Vec3};
use rustc_hash::FxHashSet;
use sceneview_core::math::{rotation_between, FORWARD, UP};
use sceneview_core::{HitResult, NodeId, PlaneType, SceneGraph, TrackingState};
use sceneview_gesture::DragGesture;
use tracing::{debug, trace, warn};

use crate::config::TranslationConfig;
use crate::error::{ManipulationError, Result};
use crate::manipulator::{ManipulationContext, TransformationController};
use crate::smoothing::DesiredPose;

#[derive(Debug)]
pub struct TranslationController {
    node: NodeId,
    settings: TranslationConfig,
    allowed_plane_types: FxHashSet<PlaneType>,
    active: bool,
    desired: DesiredPose,
    /// Node forward captured at gesture start, in the parent's space
    initial_forward_in_local: Vec3,
    last_hit: Option<HitResult>,
}

impl TranslationController {
    pub fn new(node: NodeId, settings: TranslationConfig) -> Self {
        let allowed_plane_types = settings.allowed_plane_types.iter().copied().collect();
        Self {
            node,
            settings,
            allowed_plane_types,
            active: false,
            desired: DesiredPose::default(),
            initial_forward_in_local: FORWARD,
            last_hit: None,
        }
    }

    pub fn desired_position(&self) -> Option<Vec3> {
        self.desired.position
    }

    pub fn desired_rotation(&self) -> Option<Quat> {
        self.desired.rotation
    }

    /// The hit the node would be re-anchored to if the drag ended now
    pub fn last_hit(&self) -> Option<&HitResult> {
        self.last_hit.as_ref()
    }

    pub fn allows(&self, plane_type: PlaneType) -> bool {
        self.allowed_plane_types.contains(&plane_type)
    }

    /// Replace the allowed plane types; takes effect on the next update
    pub fn set_allowed_plane_types(&mut self, plane_types: impl IntoIterator<Item = PlaneType>) {
        self.allowed_plane_types = plane_types.into_iter().collect();
        self.settings.allowed_plane_types = self.allowed_plane_types.iter().copied().collect();
    }

    /// Rotation that keeps the node's forward as captured while tilting its
    /// up axis onto the up axis of `rotation`.
    pub fn final_desired_rotation(&self, rotation: Quat) -> Quat {
        let rotated_up = rotation * UP;
        let up_alignment = rotation_between(UP, rotated_up);
        let forward_alignment = rotation_between(FORWARD, self.initial_forward_in_local);
        (up_alignment * forward_alignment).normalize()
    }

    fn capture_forward(&mut self, graph: &SceneGraph, space: Option<NodeId>) -> Result<()> {
        let forward = graph.forward(self.node)?;
        self.initial_forward_in_local = match space {
            Some(space) => graph.world_to_local_direction(space, forward)?,
            None => forward,
        };
        Ok(())
    }

    fn anchor_node(&self, graph: &SceneGraph) -> Result<NodeId> {
        match graph.parent(self.node)? {
            Some(parent) if graph.node(parent)?.is_anchor_node() => Ok(parent),
            _ => {
                warn!(node = ?self.node, "manipulated node is not parented to an anchor node");
                Err(ManipulationError::ParentNotAnchor(self.node))
            }
        }
    }

    /// Swap the parent anchor for one created from `hit`, keeping the node's
    /// world pose fixed across the swap.
    fn reanchor(&mut self, graph: &mut SceneGraph, hit: &HitResult) -> Result<()> {
        let anchor_node = self.anchor_node(graph)?;

        let world_position = graph.world_position(self.node)?;
        let world_rotation = graph.world_rotation(self.node)?;
        let mut final_world_rotation = world_rotation;
        if let Some(desired) = self.desired.rotation {
            graph.node_mut(self.node)?.set_rotation(desired);
            final_world_rotation = graph.world_rotation(self.node)?;
        }

        if let Some(previous) = graph.anchor(anchor_node)? {
            previous.detach();
        }
        graph.set_anchor(anchor_node, Some(hit.create_anchor()))?;

        // Recapture forward against the rotation the node will settle into
        graph.set_world_rotation(self.node, final_world_rotation)?;
        self.capture_forward(graph, Some(anchor_node))?;

        graph.set_world_rotation(self.node, world_rotation)?;
        graph.set_world_position(self.node, world_position)?;
        debug!(node = ?self.node, pose = ?hit.pose, "node re-anchored");
        Ok(())
    }
}

impl TransformationController for TranslationController {
    type Gesture = DragGesture;

    fn node(&self) -> NodeId {
        self.node
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_transforming(&self) -> bool {
        self.active || self.desired.is_pending()
    }

    fn can_begin(&mut self, gesture: &DragGesture, ctx: &mut ManipulationContext<'_>) -> Result<bool> {
        let Some(target) = gesture.target else {
            return Ok(false);
        };
        if target != self.node && !ctx.graph.is_descendant_of(target, self.node) {
            return Ok(false);
        }
        if !ctx.selection.select(self.node) {
            return Ok(false);
        }

        let parent = ctx.graph.parent(self.node)?;
        self.capture_forward(ctx.graph, parent)?;
        Ok(true)
    }

    fn on_continue(&mut self, gesture: &DragGesture, ctx: &mut ManipulationContext<'_>) -> Result<()> {
        let Some(frame) = ctx.frame else {
            return Ok(());
        };
        if frame.camera_tracking_state() != TrackingState::Tracking {
            return Ok(());
        }

        let mut hits = frame.hit_test(gesture.position.x, gesture.position.y);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let parent = ctx.graph.parent(self.node)?;
        for hit in hits {
            let Some(plane_type) = hit.plane_type() else {
                continue;
            };
            if !hit.trackable.is_pose_in_polygon(&hit.pose) || !self.allows(plane_type) {
                trace!(?plane_type, "hit rejected");
                continue;
            }

            let (mut position, mut rotation) = (hit.pose.position, hit.pose.rotation);
            if let Some(parent) = parent {
                position = ctx.graph.world_to_local_point(parent, position)?;
                rotation = ctx.graph.world_rotation(parent)?.inverse() * rotation;
            }
            self.desired.position = Some(position);
            self.desired.rotation = Some(self.final_desired_rotation(rotation));
            self.last_hit = Some(hit);
            break;
        }
        Ok(())
    }

    fn on_end(&mut self, _gesture: &DragGesture, ctx: &mut ManipulationContext<'_>) -> Result<()> {
        let Some(hit) = self.last_hit.take() else {
            return Ok(());
        };

        if hit.trackable.tracking_state() == TrackingState::Tracking {
            self.reanchor(ctx.graph, &hit)?;
        } else {
            debug!(node = ?self.node, "hit trackable lost; keeping current anchor");
        }

        // Ease into the anchor's origin
        self.desired.position = Some(Vec3::ZERO);
        self.desired.rotation = Some(self.final_desired_rotation(Quat::IDENTITY));
        Ok(())
    }

    fn on_frame(&mut self, graph: &mut SceneGraph, delta_seconds: f32) -> Result<()> {
        if !self.desired.is_pending() {
            return Ok(());
        }
        let node = graph.node_mut(self.node)?;
        let pose = self.desired.step(node.local_pose(), delta_seconds, &self.settings);
        node.set_local_pose(pose);
        Ok(())
    }
}
