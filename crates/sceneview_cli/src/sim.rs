//! A tiny simulated AR session
//!
//! A pinhole camera hangs above the world origin looking straight down.
//! Screen x maps to world +X and screen y to world +Z. Planes are finite
//! rectangles; the hit test intersects their infinite extension and leaves
//! the polygon check to [`Trackable::is_pose_in_polygon`], as a real runtime
//! does.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Quat, Vec2, Vec3};
use sceneview_core::math::{rotation_between, UP};
use sceneview_core::{Anchor, ArFrame, HitResult, PlaneType, Pose, Trackable, TrackableKind, TrackingState};
use serde::{Deserialize, Serialize};

/// Downward-looking camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Height above the world origin, meters
    pub height: f32,
    /// Focal length, pixels
    pub focal_px: f32,
    /// Screen point straight below the camera
    pub center: [f32; 2],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            height: 1.5,
            focal_px: 800.0,
            center: [540.0, 960.0],
        }
    }
}

impl CameraConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, self.height, 0.0)
    }

    /// Unit ray direction through a screen point
    pub fn ray(&self, x: f32, y: f32) -> Vec3 {
        let [cx, cy] = self.center;
        Vec3::new((x - cx) / self.focal_px, -1.0, (y - cy) / self.focal_px).normalize()
    }

    /// Screen position of a world point, `None` at or above the camera
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let depth = self.height - point.y;
        if depth <= 0.0 {
            return None;
        }
        let [cx, cy] = self.center;
        Some(Vec2::new(
            cx + self.focal_px * point.x / depth,
            cy + self.focal_px * point.z / depth,
        ))
    }
}

#[derive(Debug)]
pub struct SimulatedAnchor {
    pose: Pose,
    detached: Cell<bool>,
}

impl SimulatedAnchor {
    pub fn new(pose: Pose) -> Rc<Self> {
        Rc::new(Self {
            pose,
            detached: Cell::new(false),
        })
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }
}

impl Anchor for SimulatedAnchor {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn tracking_state(&self) -> TrackingState {
        if self.detached.get() {
            TrackingState::Stopped
        } else {
            TrackingState::Tracking
        }
    }

    fn detach(&self) {
        self.detached.set(true);
    }
}

/// Every anchor handed out during a session, in creation order
pub type AnchorLog = Rc<RefCell<Vec<Rc<SimulatedAnchor>>>>;

#[derive(Debug)]
pub struct SimulatedPlane {
    pub name: String,
    pub plane_type: PlaneType,
    pub center: Vec3,
    /// Plane frame; local +Y is the plane normal
    pub rotation: Quat,
    pub half_extent: Vec2,
    pub tracking: Cell<TrackingState>,
    anchors: AnchorLog,
}

impl SimulatedPlane {
    /// Build a plane. Vertical planes face `facing`; the other types face
    /// straight up or down.
    pub fn new(
        name: impl Into<String>,
        plane_type: PlaneType,
        center: Vec3,
        extent: Vec2,
        facing: Vec3,
        anchors: AnchorLog,
    ) -> Self {
        let normal = match plane_type {
            PlaneType::HorizontalUpwardFacing => Vec3::Y,
            PlaneType::HorizontalDownwardFacing => Vec3::NEG_Y,
            PlaneType::Vertical => Vec3::new(facing.x, 0.0, facing.z),
        };
        Self {
            name: name.into(),
            plane_type,
            center,
            rotation: rotation_between(UP, normal),
            half_extent: extent * 0.5,
            tracking: Cell::new(TrackingState::Tracking),
            anchors,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.rotation * UP
    }

    /// Where a ray meets the plane's infinite extension, with the distance
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<(Vec3, f32)> {
        let normal = self.normal();
        let denom = normal.dot(direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = normal.dot(self.center - origin) / denom;
        (t > 0.0).then(|| (origin + direction * t, t))
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.rotation.inverse() * (point - self.center);
        local.x.abs() <= self.half_extent.x && local.z.abs() <= self.half_extent.y
    }
}

impl Trackable for SimulatedPlane {
    fn kind(&self) -> TrackableKind {
        TrackableKind::Plane(self.plane_type)
    }

    fn tracking_state(&self) -> TrackingState {
        self.tracking.get()
    }

    fn is_pose_in_polygon(&self, pose: &Pose) -> bool {
        self.contains(pose.position)
    }

    fn create_anchor(&self, pose: &Pose) -> Rc<dyn Anchor> {
        let anchor = SimulatedAnchor::new(*pose);
        self.anchors.borrow_mut().push(anchor.clone());
        anchor
    }
}

/// The simulated session: camera, planes and the anchors they produced
pub struct SimulatedWorld {
    pub camera: CameraConfig,
    camera_tracking: Cell<TrackingState>,
    planes: Vec<Rc<SimulatedPlane>>,
    anchors: AnchorLog,
}

impl SimulatedWorld {
    pub fn new(camera: CameraConfig) -> Self {
        Self {
            camera,
            camera_tracking: Cell::new(TrackingState::Tracking),
            planes: Vec::new(),
            anchors: AnchorLog::default(),
        }
    }

    /// Add a plane that records its anchors in this world's log
    pub fn add_plane(
        &mut self,
        name: impl Into<String>,
        plane_type: PlaneType,
        center: Vec3,
        extent: Vec2,
        facing: Vec3,
    ) -> Rc<SimulatedPlane> {
        let plane = Rc::new(SimulatedPlane::new(
            name,
            plane_type,
            center,
            extent,
            facing,
            self.anchors.clone(),
        ));
        self.planes.push(plane.clone());
        plane
    }

    /// An anchor not attached to any plane, logged like the others
    pub fn create_world_anchor(&self, pose: Pose) -> Rc<SimulatedAnchor> {
        let anchor = SimulatedAnchor::new(pose);
        self.anchors.borrow_mut().push(anchor.clone());
        anchor
    }

    pub fn plane(&self, name: &str) -> Option<&Rc<SimulatedPlane>> {
        self.planes.iter().find(|p| p.name == name)
    }

    pub fn set_camera_tracking(&self, state: TrackingState) {
        self.camera_tracking.set(state);
    }

    pub fn anchors(&self) -> Vec<Rc<SimulatedAnchor>> {
        self.anchors.borrow().clone()
    }
}

impl ArFrame for SimulatedWorld {
    fn camera_tracking_state(&self) -> TrackingState {
        self.camera_tracking.get()
    }

    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult> {
        let origin = self.camera.position();
        let direction = self.camera.ray(x, y);
        let mut hits: Vec<HitResult> = self
            .planes
            .iter()
            .filter_map(|plane| {
                let (point, distance) = plane.intersect(origin, direction)?;
                let trackable: Rc<dyn Trackable> = plane.clone();
                Some(HitResult::new(Pose::new(point, plane.rotation), distance, trackable))
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
