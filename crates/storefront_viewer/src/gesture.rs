//! Touch gesture recognition: two-finger pinch and horizontal swipe.

use crate::constants::{PINCH_THRESHOLD, SWIPE_THRESHOLD_PX};

/// One discrete zoom step produced by a pinch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchStep {
    ZoomIn,
    ZoomOut,
}

/// Euclidean distance between two touch points.
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Converts two-finger distance changes into discrete zoom steps.
///
/// The reference distance only moves when a step fires, so a slow pinch
/// accumulates until it crosses the threshold instead of being lost
/// frame by frame.
#[derive(Debug, Clone, Default)]
pub struct PinchTracker {
    last_distance: Option<f32>,
}

impl PinchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two fingers touched down.
    pub fn begin(&mut self, a: (f32, f32), b: (f32, f32)) {
        let d = distance(a, b);
        self.last_distance = (d > 0.0).then_some(d);
    }

    /// Two fingers moved. Returns a step when the distance changed by at
    /// least the threshold since the last step.
    pub fn update(&mut self, a: (f32, f32), b: (f32, f32)) -> Option<PinchStep> {
        let current = distance(a, b);
        let Some(last) = self.last_distance else {
            // Pinch started without a begin event; use this sample as reference
            self.last_distance = (current > 0.0).then_some(current);
            return None;
        };

        let step = if current >= last * (1.0 + PINCH_THRESHOLD) {
            PinchStep::ZoomIn
        } else if current <= last * (1.0 - PINCH_THRESHOLD) {
            PinchStep::ZoomOut
        } else {
            return None;
        };

        self.last_distance = (current > 0.0).then_some(current);
        log::trace!("Pinch step {:?} at distance {:.1}", step, current);
        Some(step)
    }

    /// Fingers lifted.
    pub fn end(&mut self) {
        self.last_distance = None;
    }

    pub fn is_active(&self) -> bool {
        self.last_distance.is_some()
    }
}

/// Carousel swipe direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved left: show the next image
    Next,
    /// Finger moved right: show the previous image
    Previous,
}

impl Swipe {
    /// Carousel step for this swipe.
    pub fn direction(self) -> i32 {
        match self {
            Swipe::Next => 1,
            Swipe::Previous => -1,
        }
    }
}

/// Classify a horizontal touch movement.
pub fn detect_swipe(start_x: f32, end_x: f32) -> Option<Swipe> {
    if start_x - end_x > SWIPE_THRESHOLD_PX {
        Some(Swipe::Next)
    } else if end_x - start_x > SWIPE_THRESHOLD_PX {
        Some(Swipe::Previous)
    } else {
        None
    }
}
