//! Which node currently receives manipulation gestures

use sceneview_core::NodeId;
use tracing::debug;

/// Single-node selection shared by every transformable node.
///
/// Selection cannot move away from a node while that node is still being
/// transformed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    selected: Option<NodeId>,
    selected_transforming: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_selected(&self, node: NodeId) -> bool {
        self.selected == Some(node)
    }

    /// Whether `node` is selected or could become selected right now
    pub fn can_select(&self, node: NodeId) -> bool {
        self.is_selected(node) || self.selected.is_none() || !self.selected_transforming
    }

    /// Select `node`, returning whether it is selected afterwards
    pub fn select(&mut self, node: NodeId) -> bool {
        if self.is_selected(node) {
            return true;
        }
        if !self.can_select(node) {
            return false;
        }
        debug!(?node, previous = ?self.selected, "node selected");
        self.selected = Some(node);
        self.selected_transforming = false;
        true
    }

    /// Clear the selection unless the selected node is mid-transform
    pub fn deselect(&mut self) -> bool {
        if self.selected.is_some() && self.selected_transforming {
            return false;
        }
        self.selected = None;
        true
    }

    /// Record whether the selected node is transforming
    pub fn set_selected_transforming(&mut self, transforming: bool) {
        self.selected_transforming = self.selected.is_some() && transforming;
    }

    /// Drop the selection outright, e.g. when the node left the scene
    pub(crate) fn forget(&mut self, node: NodeId) {
        if self.is_selected(node) {
            self.selected = None;
            self.selected_transforming = false;
        }
    }
}
