//! Constants for the image viewer

/// Lowest zoom scale (image fits the container)
pub const MIN_SCALE: f32 = 1.0;

/// Highest zoom scale
pub const MAX_SCALE: f32 = 4.0;

/// Scale change for zoom buttons and keyboard shortcuts
pub const BUTTON_ZOOM_STEP: f32 = 0.5;

/// Scale change per wheel notch and per pinch step
pub const FINE_ZOOM_STEP: f32 = 0.05;

/// Rubber-band slack past the strict pan bound, as a fraction of the container
pub const RUBBER_BAND_RATIO: f32 = 0.15;

/// Bounce-back animation duration
pub const BOUNCE_DURATION_MS: u64 = 400;

/// Relative change in finger distance that fires one pinch step
pub const PINCH_THRESHOLD: f32 = 0.05;

/// Minimum horizontal travel for a carousel swipe
pub const SWIPE_THRESHOLD_PX: f32 = 50.0;
