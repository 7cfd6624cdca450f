//! AR runtime contracts
//!
//! The tracking runtime (hit-testing, plane detection, anchors) is supplied by
//! the host. These traits are the only surface the manipulation controllers
//! touch.

use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::math::Pose;
use crate::node::NodeId;

/// Tracking state of the camera, a trackable or an anchor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    Tracking,
    Paused,
    Stopped,
}

/// Orientation class of a detected plane
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneType {
    HorizontalUpwardFacing,
    HorizontalDownwardFacing,
    Vertical,
}

impl PlaneType {
    pub const ALL: [PlaneType; 3] = [
        PlaneType::HorizontalUpwardFacing,
        PlaneType::HorizontalDownwardFacing,
        PlaneType::Vertical,
    ];
}

/// What kind of real-world feature a trackable is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackableKind {
    Plane(PlaneType),
    Point,
    AugmentedImage,
    AugmentedFace,
}

/// A fixed real-world pose the runtime keeps refining
pub trait Anchor: fmt::Debug {
    fn pose(&self) -> Pose;

    fn tracking_state(&self) -> TrackingState;

    /// Stop tracking this anchor. Detaching twice is a no-op.
    fn detach(&self);
}

/// A tracked real-world feature
pub trait Trackable: fmt::Debug {
    fn kind(&self) -> TrackableKind;

    fn tracking_state(&self) -> TrackingState;

    /// Whether `pose` lies inside the trackable's boundary polygon.
    ///
    /// Only meaningful for planes; other trackables report `false`.
    fn is_pose_in_polygon(&self, _pose: &Pose) -> bool {
        false
    }

    /// Create an anchor attached to this trackable at `pose`.
    fn create_anchor(&self, pose: &Pose) -> Rc<dyn Anchor>;
}

/// One intersection of a hit-test ray with tracked geometry
#[derive(Clone, Debug)]
pub struct HitResult {
    /// Hit pose in world space
    pub pose: Pose,
    /// Distance from the camera along the ray
    pub distance: f32,
    pub trackable: Rc<dyn Trackable>,
}

impl HitResult {
    pub fn new(pose: Pose, distance: f32, trackable: Rc<dyn Trackable>) -> Self {
        Self {
            pose,
            distance,
            trackable,
        }
    }

    /// The plane type when the trackable is a plane
    pub fn plane_type(&self) -> Option<PlaneType> {
        match self.trackable.kind() {
            TrackableKind::Plane(plane_type) => Some(plane_type),
            _ => None,
        }
    }

    pub fn create_anchor(&self) -> Rc<dyn Anchor> {
        self.trackable.create_anchor(&self.pose)
    }
}

/// The AR frame for the current render tick
pub trait ArFrame {
    fn camera_tracking_state(&self) -> TrackingState;

    /// Cast a ray from a screen point, returning hits nearest first.
    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult>;
}

/// Resolves the scene node under a screen point
pub trait NodePicker {
    fn pick(&self, position: Vec2) -> Option<NodeId>;
}

impl<F> NodePicker for F
where
    F: Fn(Vec2) -> Option<NodeId>,
{
    fn pick(&self, position: Vec2) -> Option<NodeId> {
        self(position)
    }
}
