//! Zoom viewer state machine.
//!
//! `Closed -> Idle -> {Dragging, Animating} -> Idle -> Closed`. The viewer owns
//! scale and pan; every mutating call returns the transform to apply so the
//! presentation layer never computes geometry itself.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::gesture::PinchStep;
use crate::zoom_math::{PanLimit, Size, ViewTransform, ease_out_cubic, lerp, pan_limit};

/// Tunables for the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Lowest scale (image fits the container)
    pub min_scale: f32,
    /// Highest scale
    pub max_scale: f32,
    /// Scale change for zoom buttons and keyboard shortcuts
    pub button_step: f32,
    /// Scale change per wheel notch and per pinch step
    pub fine_step: f32,
    /// Rubber-band slack as a fraction of the container size
    pub buffer_ratio: f32,
    /// Bounce-back duration in milliseconds
    pub bounce_ms: u64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            min_scale: crate::constants::MIN_SCALE,
            max_scale: crate::constants::MAX_SCALE,
            button_step: crate::constants::BUTTON_ZOOM_STEP,
            fine_step: crate::constants::FINE_ZOOM_STEP,
            buffer_ratio: crate::constants::RUBBER_BAND_RATIO,
            bounce_ms: crate::constants::BOUNCE_DURATION_MS,
        }
    }
}

impl ViewerSettings {
    /// Replace out-of-range fields with their defaults.
    ///
    /// Holds `1 <= min_scale <= max_scale`, positive steps and a non-negative
    /// buffer, all finite. Persisted settings pass through here before use.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let scale = |value: f32, fallback: f32| {
            if value.is_finite() && value >= 1.0 {
                value
            } else {
                fallback
            }
        };
        let mut min_scale = scale(self.min_scale, defaults.min_scale);
        let max_scale = scale(self.max_scale, defaults.max_scale);
        if min_scale > max_scale {
            min_scale = defaults.min_scale;
        }
        let step = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        let buffer_ratio = if self.buffer_ratio.is_finite() && self.buffer_ratio >= 0.0 {
            self.buffer_ratio
        } else {
            defaults.buffer_ratio
        };

        let sanitized = Self {
            min_scale,
            max_scale,
            button_step: step(self.button_step, defaults.button_step),
            fine_step: step(self.fine_step, defaults.fine_step),
            buffer_ratio,
            bounce_ms: self.bounce_ms,
        };
        if sanitized != self {
            log::warn!("Invalid viewer settings {:?}, using {:?}", self, sanitized);
        }
        sanitized
    }
}

/// An in-flight bounce-back from an out-of-bounds pan to the strict bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceAnimation {
    from: (f32, f32),
    to: (f32, f32),
    started_at: Instant,
    duration: Duration,
}

impl BounceAnimation {
    fn new(from: (f32, f32), to: (f32, f32), started_at: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
        }
    }

    /// Fraction of the animation elapsed at `now`, in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Pan value at `now`.
    pub fn sample(&self, now: Instant) -> (f32, f32) {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        let eased = ease_out_cubic(progress);
        (
            lerp(self.from.0, self.to.0, eased),
            lerp(self.from.1, self.to.1, eased),
        )
    }

    /// Pan value the animation settles on.
    pub fn target(&self) -> (f32, f32) {
        self.to
    }
}

/// Interaction phase of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ViewerPhase {
    /// Viewer not shown
    #[default]
    Closed,
    /// Shown, no pointer interaction
    Idle,
    /// Pointer held down on a magnified image
    Dragging {
        /// Pointer position at drag start (screen space)
        origin: (f32, f32),
        /// Pan value at drag start
        pan_at_start: (f32, f32),
    },
    /// Bouncing back into bounds after a drag
    Animating(BounceAnimation),
}

/// Pan/zoom state for the full-screen image viewer.
#[derive(Debug, Clone)]
pub struct ZoomViewer {
    settings: ViewerSettings,
    phase: ViewerPhase,
    scale: f32,
    pan: (f32, f32),
    image_size: Size,
    container_size: Size,
}

impl Default for ZoomViewer {
    fn default() -> Self {
        Self::new(ViewerSettings::default())
    }
}

impl ZoomViewer {
    /// Create a closed viewer. Settings are sanitized first.
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            settings: settings.sanitized(),
            phase: ViewerPhase::Closed,
            scale: 1.0,
            pan: (0.0, 0.0),
            image_size: Size::default(),
            container_size: Size::default(),
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn phase(&self) -> ViewerPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.phase, ViewerPhase::Closed)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, ViewerPhase::Dragging { .. })
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, ViewerPhase::Animating(_))
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pan(&self) -> (f32, f32) {
        self.pan
    }

    /// Whether the image is magnified enough to be dragged.
    pub fn can_drag(&self) -> bool {
        self.scale > self.settings.min_scale
    }

    /// Current transform for the presentation layer.
    pub fn transform(&self) -> ViewTransform {
        ViewTransform::from_pan(self.scale, self.pan)
    }

    /// Pan limit including the rubber-band buffer.
    pub fn limit(&self) -> PanLimit {
        pan_limit(
            self.image_size,
            self.container_size,
            self.scale,
            self.settings.buffer_ratio,
        )
    }

    /// Pan limit without the rubber-band buffer.
    pub fn strict_limit(&self) -> PanLimit {
        pan_limit(self.image_size, self.container_size, self.scale, 0.0)
    }

    /// Show the viewer for an image of `image_size` displayed inside `container_size`.
    pub fn open(&mut self, image_size: Size, container_size: Size) -> ViewTransform {
        self.image_size = image_size;
        self.container_size = container_size;
        self.scale = 1.0;
        self.pan = (0.0, 0.0);
        self.phase = ViewerPhase::Idle;
        log::debug!(
            "Zoom viewer opened: image {:?}, container {:?}",
            image_size,
            container_size
        );
        self.transform()
    }

    /// Hide the viewer. Always resets scale and pan.
    pub fn close(&mut self) -> ViewTransform {
        self.scale = 1.0;
        self.pan = (0.0, 0.0);
        self.phase = ViewerPhase::Closed;
        log::debug!("Zoom viewer closed");
        self.transform()
    }

    /// Update measured sizes (e.g. after a window resize).
    ///
    /// Pan is left untouched; an out-of-bounds result is corrected when the
    /// next drag ends or the next zoom step runs.
    pub fn resize(&mut self, image_size: Size, container_size: Size) {
        self.image_size = image_size;
        self.container_size = container_size;
    }

    /// Change the scale by `delta`, clamped to `[min_scale, max_scale]`,
    /// then re-clamp pan because the bound shrinks as scale decreases.
    pub fn set_zoom(&mut self, delta: f32) -> ViewTransform {
        if !self.is_open() {
            return self.transform();
        }

        self.scale = (self.scale + delta).clamp(self.settings.min_scale, self.settings.max_scale);
        self.pan = self.limit().clamp(self.pan);

        // Restart a running bounce from the re-clamped pan so it never
        // leaves the new bound
        if let ViewerPhase::Animating(mut animation) = self.phase {
            animation.from = self.pan;
            animation.to = self.strict_limit().clamp(animation.to);
            self.phase = if animation.from == animation.to {
                ViewerPhase::Idle
            } else {
                ViewerPhase::Animating(animation)
            };
        }

        log::trace!("Zoom: scale={:.2}, pan={:?}", self.scale, self.pan);
        self.transform()
    }

    pub fn zoom_in(&mut self) -> ViewTransform {
        self.set_zoom(self.settings.button_step)
    }

    pub fn zoom_out(&mut self) -> ViewTransform {
        self.set_zoom(-self.settings.button_step)
    }

    /// Mouse wheel: scrolling up (negative delta) zooms in by one fine step.
    pub fn wheel(&mut self, delta_y: f32) -> ViewTransform {
        if delta_y < 0.0 {
            self.set_zoom(self.settings.fine_step)
        } else {
            self.set_zoom(-self.settings.fine_step)
        }
    }

    /// Apply one discrete pinch step.
    pub fn apply_pinch(&mut self, step: PinchStep) -> ViewTransform {
        match step {
            PinchStep::ZoomIn => self.set_zoom(self.settings.fine_step),
            PinchStep::ZoomOut => self.set_zoom(-self.settings.fine_step),
        }
    }

    /// Begin a drag at the pointer position.
    ///
    /// Refused while a bounce is in flight, while closed, and while the image
    /// is not magnified. Returns whether the drag started.
    pub fn start_drag(&mut self, pointer_x: f32, pointer_y: f32) -> bool {
        match self.phase {
            ViewerPhase::Closed => false,
            ViewerPhase::Animating(_) => {
                log::trace!("Drag refused: bounce-back in progress");
                false
            }
            ViewerPhase::Idle | ViewerPhase::Dragging { .. } => {
                if !self.can_drag() {
                    return false;
                }
                self.phase = ViewerPhase::Dragging {
                    origin: (pointer_x, pointer_y),
                    pan_at_start: self.pan,
                };
                true
            }
        }
    }

    /// Move the image with the pointer. Applied immediately, no easing.
    pub fn perform_drag(&mut self, pointer_x: f32, pointer_y: f32) -> Option<ViewTransform> {
        let ViewerPhase::Dragging {
            origin,
            pan_at_start,
        } = self.phase
        else {
            return None;
        };
        if !self.can_drag() {
            return None;
        }

        let requested = (
            pan_at_start.0 + (pointer_x - origin.0),
            pan_at_start.1 + (pointer_y - origin.1),
        );
        self.pan = self.limit().clamp(requested);
        Some(self.transform())
    }

    /// Release the pointer.
    ///
    /// If the pan sits outside the strict bound (inside the rubber band or
    /// beyond it), a bounce-back toward the strict bound starts at `now`.
    pub fn end_drag(&mut self, now: Instant) -> ViewerPhase {
        if !self.is_dragging() {
            return self.phase;
        }

        let strict = self.strict_limit();
        if strict.is_exceeded_by(self.pan) {
            let target = strict.clamp(self.pan);
            log::debug!("Bounce-back from {:?} to {:?}", self.pan, target);
            self.phase = ViewerPhase::Animating(BounceAnimation::new(
                self.pan,
                target,
                now,
                Duration::from_millis(self.settings.bounce_ms),
            ));
        } else {
            self.phase = ViewerPhase::Idle;
        }
        self.phase
    }

    /// Advance a running bounce to `now`. Call once per display refresh.
    ///
    /// Returns the transform to apply, or `None` when nothing is animating.
    pub fn tick(&mut self, now: Instant) -> Option<ViewTransform> {
        let ViewerPhase::Animating(animation) = self.phase else {
            return None;
        };

        self.pan = animation.sample(now);
        if animation.progress(now) >= 1.0 {
            self.pan = animation.target();
            self.phase = ViewerPhase::Idle;
            log::trace!("Bounce-back finished at {:?}", self.pan);
        }
        Some(self.transform())
    }

    /// Scale 1, no pan, any animation cancelled. Stays open if open.
    pub fn reset(&mut self) -> ViewTransform {
        self.scale = 1.0;
        self.pan = (0.0, 0.0);
        if self.is_open() {
            self.phase = ViewerPhase::Idle;
        }
        self.transform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// Viewer showing a 1000x1000 image in a 500x500 container.
    fn open_viewer() -> ZoomViewer {
        let mut viewer = ZoomViewer::default();
        viewer.open(Size::square(1000.0), Size::square(500.0));
        viewer
    }

    fn viewer_at_scale_two() -> ZoomViewer {
        let mut viewer = open_viewer();
        viewer.set_zoom(1.0);
        viewer
    }

    #[test]
    fn test_open_resets_state() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(100.0, 0.0);

        viewer.open(Size::square(1000.0), Size::square(500.0));
        assert_eq!(viewer.scale(), 1.0);
        assert_eq!(viewer.pan(), (0.0, 0.0));
        assert_eq!(viewer.phase(), ViewerPhase::Idle);
    }

    #[test]
    fn test_set_zoom_clamps_scale() {
        let mut viewer = open_viewer();
        viewer.set_zoom(10.0);
        assert_eq!(viewer.scale(), 4.0);

        viewer.set_zoom(-10.0);
        assert_eq!(viewer.scale(), 1.0);
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(200.0, -100.0);
        viewer.end_drag(Instant::now());
        let before = (viewer.scale(), viewer.pan());

        viewer.set_zoom(0.0);
        assert_eq!((viewer.scale(), viewer.pan()), before);
    }

    #[test]
    fn test_set_zoom_ignored_while_closed() {
        let mut viewer = ZoomViewer::default();
        viewer.set_zoom(1.0);
        assert_eq!(viewer.scale(), 1.0);
    }

    #[test]
    fn test_drag_clamps_to_rubber_band_bound() {
        let mut viewer = viewer_at_scale_two();
        assert!(viewer.start_drag(0.0, 0.0));

        let transform = viewer.perform_drag(1000.0, 0.0).unwrap();
        assert!(approx_eq(viewer.pan().0, 825.0));
        assert!(approx_eq(transform.translate_x, 412.5));
    }

    #[test]
    fn test_drag_is_relative_to_pan_at_start() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(10.0, 10.0);
        viewer.perform_drag(110.0, 60.0);
        viewer.end_drag(Instant::now());
        assert_eq!(viewer.pan(), (100.0, 50.0));

        viewer.start_drag(500.0, 500.0);
        viewer.perform_drag(450.0, 500.0);
        assert_eq!(viewer.pan(), (50.0, 50.0));
    }

    #[test]
    fn test_drag_refused_at_unit_scale() {
        let mut viewer = open_viewer();
        assert!(!viewer.start_drag(0.0, 0.0));
        assert!(viewer.perform_drag(100.0, 100.0).is_none());
        assert_eq!(viewer.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_zoom_out_to_unit_scale_forces_zero_pan() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(300.0, 300.0);
        viewer.end_drag(Instant::now());

        viewer.set_zoom(-1.0);
        assert_eq!(viewer.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_zoom_out_shrinks_pan_to_new_bound() {
        let mut viewer = open_viewer();
        viewer.set_zoom(3.0); // scale 4: overflow 1750, limit 1825
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(1500.0, 0.0);
        viewer.end_drag(Instant::now());

        viewer.set_zoom(-2.0); // scale 2: limit 825
        assert!(approx_eq(viewer.pan().0, 825.0));
    }

    #[test]
    fn test_release_inside_strict_bound_goes_idle() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(700.0, 0.0);

        assert_eq!(viewer.end_drag(Instant::now()), ViewerPhase::Idle);
        assert_eq!(viewer.pan(), (700.0, 0.0));
    }

    #[test]
    fn test_release_in_rubber_band_bounces_to_strict_bound() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(1000.0, 0.0);

        let start = Instant::now();
        assert!(matches!(viewer.end_drag(start), ViewerPhase::Animating(_)));

        let mut last = viewer.pan().0;
        for step in 1..=30 {
            viewer.tick(start + Duration::from_millis(step * 16));
            let current = viewer.pan().0;
            assert!(current <= last, "pan must move monotonically toward the bound");
            assert!(current >= 750.0);
            last = current;
        }

        viewer.tick(start + Duration::from_millis(400));
        assert_eq!(viewer.pan(), (750.0, 0.0));
        assert_eq!(viewer.phase(), ViewerPhase::Idle);
    }

    #[test]
    fn test_release_beyond_limit_after_resize_bounces() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(800.0, 0.0);

        // Container grows: strict bound drops to (2000 - 800) / 2 = 600
        viewer.resize(Size::square(1000.0), Size::square(800.0));
        assert!(viewer.limit().x < 800.0);

        let start = Instant::now();
        viewer.end_drag(start);
        assert!(viewer.is_animating());

        viewer.tick(start + Duration::from_secs(1));
        assert_eq!(viewer.pan(), (600.0, 0.0));
        assert!(!viewer.is_animating());
    }

    #[test]
    fn test_drag_refused_while_animating() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(1000.0, 0.0);
        let start = Instant::now();
        viewer.end_drag(start);

        assert!(!viewer.start_drag(10.0, 10.0));
        assert!(viewer.is_animating());
    }

    #[test]
    fn test_reset_cancels_animation() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(1000.0, 0.0);
        viewer.end_drag(Instant::now());

        viewer.reset();
        assert_eq!(viewer.phase(), ViewerPhase::Idle);
        assert_eq!(viewer.scale(), 1.0);
        assert_eq!(viewer.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_tick_without_animation_is_none() {
        let mut viewer = open_viewer();
        assert!(viewer.tick(Instant::now()).is_none());
    }

    #[test]
    fn test_close_resets_and_closes() {
        let mut viewer = viewer_at_scale_two();
        viewer.close();
        assert!(!viewer.is_open());
        assert_eq!(viewer.scale(), 1.0);
        assert_eq!(viewer.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_wheel_steps() {
        let mut viewer = open_viewer();
        viewer.wheel(-120.0);
        assert!(approx_eq(viewer.scale(), 1.05));
        viewer.wheel(120.0);
        assert!(approx_eq(viewer.scale(), 1.0));
    }

    #[test]
    fn test_zoom_buttons_step_by_half() {
        let mut viewer = open_viewer();
        let transform = viewer.zoom_in();
        assert_eq!(transform.zoom_percent(), 150);
        viewer.zoom_out();
        assert_eq!(viewer.scale(), 1.0);
    }

    #[test]
    fn test_zoom_out_during_bounce_recenters() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(1000.0, 0.0);
        let start = Instant::now();
        viewer.end_drag(start);
        assert!(viewer.is_animating());

        viewer.set_zoom(-1.0);
        assert_eq!(viewer.scale(), 1.0);
        assert_eq!(viewer.pan(), (0.0, 0.0));
        assert_eq!(viewer.phase(), ViewerPhase::Idle);

        assert!(viewer.tick(start + Duration::from_millis(100)).is_none());
        assert_eq!(viewer.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_partial_zoom_out_during_bounce_stays_in_new_bound() {
        let mut viewer = viewer_at_scale_two();
        viewer.start_drag(0.0, 0.0);
        viewer.perform_drag(1000.0, 0.0);
        let start = Instant::now();
        viewer.end_drag(start);

        // Scale 1.5: strict bound (1500 - 500) / 2 = 500, buffered 575
        viewer.set_zoom(-0.5);
        assert!(approx_eq(viewer.pan().0, 575.0));
        assert!(viewer.is_animating());

        viewer.tick(start + Duration::from_millis(100));
        let mid = viewer.pan().0;
        assert!((500.0..=575.0).contains(&mid));

        viewer.tick(start + Duration::from_millis(400));
        assert!(approx_eq(viewer.pan().0, 500.0));
        assert_eq!(viewer.phase(), ViewerPhase::Idle);
    }

    #[test]
    fn test_sanitized_repairs_inverted_scale_range() {
        let settings = ViewerSettings {
            min_scale: 5.0,
            ..ViewerSettings::default()
        }
        .sanitized();
        assert_eq!(settings.min_scale, 1.0);
        assert_eq!(settings.max_scale, 4.0);

        let mut viewer = ZoomViewer::new(ViewerSettings {
            min_scale: 5.0,
            max_scale: 2.0,
            ..ViewerSettings::default()
        });
        viewer.open(Size::square(1000.0), Size::square(500.0));
        viewer.set_zoom(0.5);
        assert!(approx_eq(viewer.scale(), 1.5));
    }

    #[test]
    fn test_sanitized_repairs_buffer_and_steps() {
        let settings = ViewerSettings {
            buffer_ratio: -1.0,
            button_step: 0.0,
            fine_step: f32::NAN,
            max_scale: f32::INFINITY,
            ..ViewerSettings::default()
        }
        .sanitized();
        assert_eq!(settings, ViewerSettings::default());

        let mut viewer = ZoomViewer::new(ViewerSettings {
            buffer_ratio: -1.0,
            ..ViewerSettings::default()
        });
        viewer.open(Size::square(500.0), Size::square(500.0));
        viewer.set_zoom(0.5);
        assert!(viewer.start_drag(0.0, 0.0));
        assert!(viewer.perform_drag(1000.0, 0.0).is_some());
    }

    #[test]
    fn test_sanitized_keeps_valid_settings() {
        let custom = ViewerSettings {
            min_scale: 1.5,
            max_scale: 6.0,
            button_step: 0.25,
            fine_step: 0.1,
            buffer_ratio: 0.0,
            bounce_ms: 0,
        };
        assert_eq!(custom.sanitized(), custom);
    }
}
