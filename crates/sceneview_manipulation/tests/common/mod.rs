//! Mock AR collaborators shared by the integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Quat, Vec2, Vec3};
use sceneview_core::{
    Anchor, ArFrame, HitResult, NodeId, PlaneType, Pose, SceneGraph, Trackable, TrackableKind,
    TrackingState,
};
use sceneview_gesture::{DragGesture, GestureEvent, GesturePhase, PinchGesture};
use sceneview_manipulation::{ManipulationConfig, Result, TransformationSystem};

pub const DT: f32 = 1.0 / 60.0;

#[derive(Debug)]
pub struct MockAnchor {
    pub pose: Cell<Pose>,
    pub tracking: Cell<TrackingState>,
    pub detach_calls: Cell<u32>,
}

impl MockAnchor {
    pub fn new(pose: Pose) -> Rc<Self> {
        Rc::new(Self {
            pose: Cell::new(pose),
            tracking: Cell::new(TrackingState::Tracking),
            detach_calls: Cell::new(0),
        })
    }
}

impl Anchor for MockAnchor {
    fn pose(&self) -> Pose {
        self.pose.get()
    }

    fn tracking_state(&self) -> TrackingState {
        self.tracking.get()
    }

    fn detach(&self) {
        self.detach_calls.set(self.detach_calls.get() + 1);
        self.tracking.set(TrackingState::Stopped);
    }
}

#[derive(Debug)]
pub struct MockPlane {
    pub plane_type: PlaneType,
    pub tracking: Cell<TrackingState>,
    pub in_polygon: Cell<bool>,
    /// Every anchor this plane has handed out
    pub anchors: RefCell<Vec<Rc<MockAnchor>>>,
}

impl MockPlane {
    pub fn new(plane_type: PlaneType) -> Rc<Self> {
        Rc::new(Self {
            plane_type,
            tracking: Cell::new(TrackingState::Tracking),
            in_polygon: Cell::new(true),
            anchors: RefCell::new(Vec::new()),
        })
    }
}

impl Trackable for MockPlane {
    fn kind(&self) -> TrackableKind {
        TrackableKind::Plane(self.plane_type)
    }

    fn tracking_state(&self) -> TrackingState {
        self.tracking.get()
    }

    fn is_pose_in_polygon(&self, _pose: &Pose) -> bool {
        self.in_polygon.get()
    }

    fn create_anchor(&self, pose: &Pose) -> Rc<dyn Anchor> {
        let anchor = MockAnchor::new(*pose);
        self.anchors.borrow_mut().push(anchor.clone());
        anchor
    }
}

/// A feature point; never accepted as a drop target
#[derive(Debug)]
pub struct MockPoint;

impl Trackable for MockPoint {
    fn kind(&self) -> TrackableKind {
        TrackableKind::Point
    }

    fn tracking_state(&self) -> TrackingState {
        TrackingState::Tracking
    }

    fn create_anchor(&self, pose: &Pose) -> Rc<dyn Anchor> {
        MockAnchor::new(*pose)
    }
}

/// Frame whose hit test returns a fixed list regardless of the screen point
pub struct MockFrame {
    pub camera: Cell<TrackingState>,
    pub hits: RefCell<Vec<HitResult>>,
    pub hit_tests: Cell<u32>,
}

impl MockFrame {
    pub fn new(hits: Vec<HitResult>) -> Self {
        Self {
            camera: Cell::new(TrackingState::Tracking),
            hits: RefCell::new(hits),
            hit_tests: Cell::new(0),
        }
    }
}

impl ArFrame for MockFrame {
    fn camera_tracking_state(&self) -> TrackingState {
        self.camera.get()
    }

    fn hit_test(&self, _x: f32, _y: f32) -> Vec<HitResult> {
        self.hit_tests.set(self.hit_tests.get() + 1);
        self.hits.borrow().clone()
    }
}

/// A model node under an anchored anchor node, registered and selected
pub struct Fixture {
    pub graph: SceneGraph,
    pub anchor_node: NodeId,
    pub model: NodeId,
    pub initial_anchor: Rc<MockAnchor>,
    pub system: TransformationSystem,
}

impl Fixture {
    pub fn new(config: ManipulationConfig) -> Self {
        let mut graph = SceneGraph::new();
        let anchor_node = graph.add_anchor_node("anchor");
        let initial_anchor = MockAnchor::new(Pose::IDENTITY);
        let held: Rc<dyn Anchor> = initial_anchor.clone();
        graph.set_anchor(anchor_node, Some(held)).unwrap();
        let model = graph.add_node("model", Some(anchor_node)).unwrap();

        let mut system = TransformationSystem::new(config);
        system.add_transformable(model);
        assert!(system.select(model).unwrap());

        Self {
            graph,
            anchor_node,
            model,
            initial_anchor,
            system,
        }
    }

    pub fn dispatch(&mut self, gesture: GestureEvent, frame: Option<&MockFrame>) -> Result<bool> {
        let frame = frame.map(|f| f as &dyn ArFrame);
        self.system.dispatch(&mut self.graph, &gesture, frame)
    }

    pub fn run_frames(&mut self, count: usize) {
        for _ in 0..count {
            self.system.on_frame(&mut self.graph, DT).unwrap();
        }
    }

    pub fn desired_position(&self) -> Option<Vec3> {
        self.system
            .transformable(self.model)
            .and_then(|t| t.translation())
            .and_then(|t| t.desired_position())
    }

    pub fn desired_rotation(&self) -> Option<Quat> {
        self.system
            .transformable(self.model)
            .and_then(|t| t.translation())
            .and_then(|t| t.desired_rotation())
    }
}

pub fn hit(plane: &Rc<MockPlane>, position: Vec3, distance: f32) -> HitResult {
    let trackable: Rc<dyn Trackable> = plane.clone();
    HitResult::new(Pose::from_position(position), distance, trackable)
}

pub fn drag(phase: GesturePhase, target: Option<NodeId>, position: Vec2) -> GestureEvent {
    GestureEvent::Drag(DragGesture {
        phase,
        target,
        start_position: Vec2::ZERO,
        position,
        delta: Vec2::ZERO,
        time_ms: 0,
        cancelled: false,
    })
}

pub fn pinch(phase: GesturePhase, span_delta_inches: f32) -> GestureEvent {
    GestureEvent::Pinch(PinchGesture {
        phase,
        scale: 1.0,
        span: 200.0,
        span_delta: span_delta_inches * 160.0,
        span_delta_inches,
        focus: Vec2::ZERO,
        time_ms: 0,
        cancelled: false,
    })
}

pub fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}
