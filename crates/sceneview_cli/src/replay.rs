//! Runs a scenario against a transformation system

use anyhow::{Context, Result};
use glam::{Quat, Vec2, Vec3};
use sceneview_core::{Anchor, ArFrame, MotionEvent, NodeId, Pose, SceneGraph};
use sceneview_gesture::{GestureEvent, GesturePhase};
use sceneview_manipulation::{ManipulationConfig, TransformationSystem};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

use crate::scenario::{Scenario, Step};
use crate::sim::SimulatedWorld;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureRecord {
    pub step: usize,
    pub time_ms: u64,
    pub gesture: &'static str,
    pub phase: GesturePhase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelState {
    pub world_position: Vec3,
    pub world_rotation: Quat,
    pub scale: f32,
    pub anchor_position: Vec3,
    pub selected: bool,
    pub transforming: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub gestures: Vec<GestureRecord>,
    /// Anchors created by plane hits
    pub anchors_created: usize,
    /// Anchors detached, including the initial one
    pub anchors_detached: usize,
    pub frames: usize,
    pub model: ModelState,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Gestures:")?;
        if self.gestures.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for g in &self.gestures {
            writeln!(f, "  step {:>3} @ {:>6} ms  {:<6} {:?}", g.step, g.time_ms, g.gesture, g.phase)?;
        }
        writeln!(f, "Frames rendered: {}", self.frames)?;
        writeln!(
            f,
            "Anchors: {} created, {} detached",
            self.anchors_created, self.anchors_detached
        )?;
        let m = &self.model;
        writeln!(
            f,
            "Model: position ({:.3}, {:.3}, {:.3}), yaw {:.1} deg, scale {:.3}",
            m.world_position.x,
            m.world_position.y,
            m.world_position.z,
            yaw_degrees(m.world_rotation),
            m.scale
        )?;
        write!(
            f,
            "       selected: {}, transforming: {}",
            m.selected, m.transforming
        )
    }
}

fn yaw_degrees(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::NEG_Z;
    (-forward.x).atan2(-forward.z).to_degrees()
}

fn gesture_name(event: &GestureEvent) -> &'static str {
    match event {
        GestureEvent::Drag(_) => "drag",
        GestureEvent::Rotate(_) => "rotate",
        GestureEvent::Pinch(_) => "pinch",
    }
}

/// The model plus the anchor node it hangs from
struct Stage {
    graph: SceneGraph,
    anchor_node: NodeId,
    model: NodeId,
}

impl Stage {
    fn new(world: &SimulatedWorld, position: Vec3) -> Result<Self> {
        let mut graph = SceneGraph::new();
        let anchor_node = graph.add_anchor_node("anchor");
        let seed: Rc<dyn Anchor> = world.create_world_anchor(Pose::from_position(position));
        graph.set_anchor(anchor_node, Some(seed))?;
        let model = graph.add_node("model", Some(anchor_node))?;
        Ok(Self {
            graph,
            anchor_node,
            model,
        })
    }

    fn model_on_screen(&self, world: &SimulatedWorld) -> Result<Option<Vec2>> {
        Ok(world.camera.project(self.graph.world_position(self.model)?))
    }
}

pub fn replay(scenario: &Scenario, config: ManipulationConfig) -> Result<ReplayReport> {
    let mut world = SimulatedWorld::new(scenario.camera);
    for plane in &scenario.planes {
        world.add_plane(
            plane.name.clone(),
            plane.plane_type,
            Vec3::from(plane.center),
            Vec2::from(plane.extent),
            Vec3::from(plane.facing),
        );
    }

    let mut stage = Stage::new(&world, Vec3::from(scenario.model.position))?;
    let mut system = TransformationSystem::new(config);
    system.add_transformable(stage.model);
    if scenario.model.selected {
        system.select(stage.model)?;
    }

    let pick_radius = scenario.model.pick_radius_px;
    let mut clock_seconds = 0.0f64;
    let mut frames = 0;
    let mut gestures = Vec::new();

    for (index, step) in scenario.steps.iter().enumerate() {
        match step {
            Step::Touch {
                action,
                pointers,
                action_index,
                time_ms,
            } => {
                let time_ms = time_ms.unwrap_or((clock_seconds * 1000.0) as u64);
                let event = MotionEvent::new(*action, pointers.iter().copied(), *action_index, time_ms);

                // The model's screen position is fixed for the duration of one event
                let model = stage.model;
                let on_screen = stage.model_on_screen(&world)?;
                let picker = move |point: Vec2| -> Option<NodeId> {
                    on_screen
                        .filter(|p| p.distance(point) <= pick_radius)
                        .map(|_| model)
                };

                let frame: &dyn ArFrame = &world;
                let emitted = system
                    .on_touch_event(&mut stage.graph, &event, &picker, Some(frame))
                    .with_context(|| format!("Step {index}: touch event failed"))?;
                for gesture in &emitted {
                    debug!(step = index, gesture = gesture_name(gesture), phase = ?gesture.phase(), "gesture");
                    gestures.push(GestureRecord {
                        step: index,
                        time_ms,
                        gesture: gesture_name(gesture),
                        phase: gesture.phase(),
                    });
                }
            }
            Step::Frames { count, dt } => {
                for _ in 0..*count {
                    system
                        .on_frame(&mut stage.graph, *dt)
                        .with_context(|| format!("Step {index}: frame update failed"))?;
                    clock_seconds += f64::from(*dt);
                }
                frames += count;
            }
            Step::PlaneTracking { plane, state } => {
                let plane = world
                    .plane(plane)
                    .with_context(|| format!("Step {index}: unknown plane '{plane}'"))?;
                debug!(step = index, plane = %plane.name, ?state, "plane tracking changed");
                plane.tracking.set(*state);
            }
            Step::CameraTracking { state } => {
                debug!(step = index, ?state, "camera tracking changed");
                world.set_camera_tracking(*state);
            }
        }
    }

    let anchors = world.anchors();
    let model = stage.model;
    let report = ReplayReport {
        gestures,
        // The first logged anchor is the seed
        anchors_created: anchors.len().saturating_sub(1),
        anchors_detached: anchors.iter().filter(|a| a.is_detached()).count(),
        frames,
        model: ModelState {
            world_position: stage.graph.world_position(model)?,
            world_rotation: stage.graph.world_rotation(model)?,
            scale: stage.graph.node(model)?.scale().x,
            anchor_position: stage.graph.world_position(stage.anchor_node)?,
            selected: system.selected() == Some(model),
            transforming: system
                .transformable(model)
                .is_some_and(|t| t.is_transforming()),
        },
    };
    info!(
        gestures = report.gestures.len(),
        frames = report.frames,
        anchors_created = report.anchors_created,
        "replay finished"
    );
    Ok(report)
}
