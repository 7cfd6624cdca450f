//! Two-finger pinch detection

use glam::Vec2;
use sceneview_core::events::MotionEvent;
use tracing::{debug, trace};

use crate::config::GestureConfig;
use crate::phase::GesturePhase;
use crate::pointers::PointerRetainer;
use crate::two_finger::{TwoFingerStep, TwoFingerTracker};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    pub phase: GesturePhase,
    /// `span / previous_span`, clamped per event
    pub scale: f32,
    /// Current distance between the pointers, pixels
    pub span: f32,
    /// Span change since the previous update, pixels
    pub span_delta: f32,
    /// Span change since the previous update, inches
    pub span_delta_inches: f32,
    pub focus: Vec2,
    pub time_ms: u64,
    pub cancelled: bool,
}

/// Detects pinch (span) changes of a pointer pair
pub struct PinchGestureDetector {
    tracker: TwoFingerTracker,
    span_slop: f32,
    max_scale_step: f32,
    pixels_per_inch: f32,
    pressure_threshold: f32,
}

impl PinchGestureDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            tracker: TwoFingerTracker::new("pinch"),
            span_slop: config.pinch_span_slop_px,
            max_scale_step: config.pinch_max_scale_step,
            pixels_per_inch: config.pixels_per_inch,
            pressure_threshold: config.pressure_threshold,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.tracker.is_active()
    }

    pub fn on_touch_event(
        &mut self,
        event: &MotionEvent,
        retainer: &mut PointerRetainer,
    ) -> Option<PinchGesture> {
        match self.tracker.process(event, retainer) {
            TwoFingerStep::Ignored | TwoFingerStep::Tracking(_) => None,
            TwoFingerStep::Moved { previous, current } => {
                if !current.pressure_accepted(&previous, self.pressure_threshold) {
                    trace!(
                        previous = previous.pressure,
                        current = current.pressure,
                        "pinch update dropped by pressure filter"
                    );
                    return None;
                }
                let span = current.span();
                if !self.tracker.is_active() {
                    let start_span = self.tracker.start().map_or(span, |s| s.span());
                    self.tracker.commit(current);
                    if (span - start_span).abs() <= self.span_slop {
                        return None;
                    }
                    if !self.tracker.try_activate(retainer) {
                        return None;
                    }
                    debug!(start_span, span, "pinch gesture started");
                    return Some(self.gesture(GesturePhase::Started, 1.0, span, 0.0, current.focus(), current.time_ms));
                }

                let previous_span = previous.span();
                let scale = if previous_span > 0.0 {
                    (span / previous_span).clamp(1.0 - self.max_scale_step, 1.0 + self.max_scale_step)
                } else {
                    1.0
                };
                self.tracker.commit(current);
                Some(self.gesture(
                    GesturePhase::Moved,
                    scale,
                    span,
                    span - previous_span,
                    current.focus(),
                    current.time_ms,
                ))
            }
            TwoFingerStep::Released {
                last,
                was_active,
                cancelled,
            } => {
                if !was_active {
                    return None;
                }
                debug!(cancelled, "pinch gesture ended");
                let mut gesture = self.gesture(
                    GesturePhase::Ended,
                    1.0,
                    last.span(),
                    0.0,
                    last.focus(),
                    event.event_time_ms,
                );
                gesture.cancelled = cancelled;
                Some(gesture)
            }
        }
    }

    fn gesture(
        &self,
        phase: GesturePhase,
        scale: f32,
        span: f32,
        span_delta: f32,
        focus: Vec2,
        time_ms: u64,
    ) -> PinchGesture {
        PinchGesture {
            phase,
            scale,
            span,
            span_delta,
            span_delta_inches: span_delta / self.pixels_per_inch,
            focus,
            time_ms,
            cancelled: false,
        }
    }
}
