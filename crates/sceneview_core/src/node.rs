//! Scene graph arena
//!
//! Nodes live in a [`SlotMap`] owned by [`SceneGraph`] and reference each
//! other by [`NodeId`]. The graph is passed explicitly to whoever mutates it;
//! nothing holds it globally. World transforms are composed on demand from
//! the parent chain.

use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::debug;

use crate::ar::{Anchor, TrackingState};
use crate::error::{CoreError, Result};
use crate::math::{Pose, FORWARD};

new_key_type! {
    /// Unique identifier for a node in a [`SceneGraph`]
    pub struct NodeId;
}

/// What a node is, beyond its transform
#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Plain,
    /// A node whose pose follows an AR anchor
    Anchor { anchor: Option<Rc<dyn Anchor>> },
}

/// A scene node: a local transform plus tree links
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    kind: NodeKind,
}

impl Node {
    fn new(name: impl Into<String>, parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            parent,
            children: SmallVec::new(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_anchor_node(&self) -> bool {
        matches!(self.kind, NodeKind::Anchor { .. })
    }

    /// Local position (relative to the parent)
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Local rotation (relative to the parent)
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    pub fn local_pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    pub fn set_local_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.set_rotation(pose.rotation);
    }

    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Arena owning every node of a scene
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Add a plain node, optionally under `parent`
    pub fn add_node(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> Result<NodeId> {
        self.insert(Node::new(name, parent, NodeKind::Plain))
    }

    /// Add a root-level anchor node with no anchor attached yet
    pub fn add_anchor_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes
            .insert(Node::new(name, None, NodeKind::Anchor { anchor: None }))
    }

    fn insert(&mut self, node: Node) -> Result<NodeId> {
        if let Some(parent) = node.parent {
            if !self.nodes.contains_key(parent) {
                return Err(CoreError::NodeNotFound(parent));
            }
        }
        let parent = node.parent;
        let id = self.nodes.insert(node);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.push(id);
        }
        Ok(id)
    }

    /// Remove a node and its whole subtree. Anchors held by removed anchor
    /// nodes are detached.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                if let NodeKind::Anchor {
                    anchor: Some(anchor),
                } = &node.kind
                {
                    anchor.detach();
                }
                stack.extend(node.children.iter().copied());
            }
        }
        Ok(())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(CoreError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(CoreError::NodeNotFound(id))
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Move `id` under `parent` (or to the root), keeping its local transform
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        if let Some(parent) = parent {
            self.node(parent)?;
            if parent == id || self.is_descendant_of(parent, id) {
                return Err(CoreError::Cycle { child: id, parent });
            }
        }

        let old_parent = self.node(id)?.parent;
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(p)) {
            old.children.retain(|c| *c != id);
        }
        if let Some(new) = parent.and_then(|p| self.nodes.get_mut(p)) {
            new.children.push(id);
        }
        self.node_mut(id)?.parent = parent;
        Ok(())
    }

    /// Whether `ancestor` appears in the parent chain of `id` (strictly above it)
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.nodes.get(node_id).and_then(|n| n.parent);
        }
        false
    }

    /// Model matrix of the node in world space
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4> {
        let node = self.node(id)?;
        let local = node.local_matrix();
        match node.parent {
            Some(parent) => Ok(self.world_matrix(parent)? * local),
            None => Ok(local),
        }
    }

    /// World matrix of the node's parent, identity for root nodes
    pub fn parent_world_matrix(&self, id: NodeId) -> Result<Mat4> {
        match self.node(id)?.parent {
            Some(parent) => self.world_matrix(parent),
            None => Ok(Mat4::IDENTITY),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vec3> {
        Ok(self.world_matrix(id)?.w_axis.truncate())
    }

    pub fn world_rotation(&self, id: NodeId) -> Result<Quat> {
        let node = self.node(id)?;
        match node.parent {
            Some(parent) => Ok((self.world_rotation(parent)? * node.rotation).normalize()),
            None => Ok(node.rotation),
        }
    }

    pub fn world_pose(&self, id: NodeId) -> Result<Pose> {
        Ok(Pose::new(self.world_position(id)?, self.world_rotation(id)?))
    }

    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) -> Result<()> {
        let local = self.parent_world_matrix(id)?.inverse().transform_point3(position);
        self.node_mut(id)?.set_position(local);
        Ok(())
    }

    pub fn set_world_rotation(&mut self, id: NodeId, rotation: Quat) -> Result<()> {
        let parent_rotation = match self.node(id)?.parent {
            Some(parent) => self.world_rotation(parent)?,
            None => Quat::IDENTITY,
        };
        self.node_mut(id)?
            .set_rotation(parent_rotation.inverse() * rotation);
        Ok(())
    }

    /// World-space forward (-Z) direction of the node
    pub fn forward(&self, id: NodeId) -> Result<Vec3> {
        Ok(self.world_rotation(id)? * FORWARD)
    }

    pub fn world_to_local_point(&self, id: NodeId, point: Vec3) -> Result<Vec3> {
        Ok(self.world_matrix(id)?.inverse().transform_point3(point))
    }

    /// Rotate a world direction into the node's space, normalized
    pub fn world_to_local_direction(&self, id: NodeId, direction: Vec3) -> Result<Vec3> {
        let local = self.world_rotation(id)?.inverse() * direction;
        Ok(local.normalize_or_zero())
    }

    pub fn anchor(&self, id: NodeId) -> Result<Option<Rc<dyn Anchor>>> {
        match &self.node(id)?.kind {
            NodeKind::Anchor { anchor } => Ok(anchor.clone()),
            NodeKind::Plain => Err(CoreError::NotAnchorNode(id)),
        }
    }

    /// Attach `anchor` to an anchor node, replacing whatever it held.
    ///
    /// Replacement does not detach the previous anchor; the caller owns that
    /// decision. The node's pose jumps to the new anchor's pose.
    pub fn set_anchor(&mut self, id: NodeId, anchor: Option<Rc<dyn Anchor>>) -> Result<()> {
        let pose = anchor.as_ref().map(|a| a.pose());
        let node = self.node_mut(id)?;
        match &mut node.kind {
            NodeKind::Anchor { anchor: slot } => *slot = anchor,
            NodeKind::Plain => return Err(CoreError::NotAnchorNode(id)),
        }
        if let Some(pose) = pose {
            debug!(node = %node.name, ?pose, "anchor attached");
            self.set_world_position(id, pose.position)?;
            self.set_world_rotation(id, pose.rotation)?;
        }
        Ok(())
    }

    /// Pull the latest pose of every tracking anchor into its anchor node
    pub fn refresh_anchors(&mut self) {
        let updates: Vec<(NodeId, Pose)> = self
            .nodes
            .iter()
            .filter_map(|(id, node)| match &node.kind {
                NodeKind::Anchor {
                    anchor: Some(anchor),
                } if anchor.tracking_state() == TrackingState::Tracking => Some((id, anchor.pose())),
                _ => None,
            })
            .collect();

        for (id, pose) in updates {
            // Ids come from the live arena above, so these cannot fail.
            let _ = self.set_world_position(id, pose.position);
            let _ = self.set_world_rotation(id, pose.rotation);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }
}
