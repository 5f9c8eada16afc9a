//! Pan bound mathematics.
//!
//! This module contains the pure functions behind the viewer: how far a
//! magnified image may be dragged, clamping, easing, and the transform the
//! presentation layer applies. Extracted for testability.

/// Width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A square size, convenient for tests and thumbnails.
    pub fn square(side: f32) -> Self {
        Self::new(side, side)
    }
}

/// Symmetric pan limit per axis: pan is allowed in `[-x, +x]` and `[-y, +y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanLimit {
    pub x: f32,
    pub y: f32,
}

impl PanLimit {
    /// Zero limit, used whenever the image is not magnified.
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Whether `pan` lies outside this limit on either axis.
    pub fn is_exceeded_by(&self, pan: (f32, f32)) -> bool {
        pan.0.abs() > self.x || pan.1.abs() > self.y
    }

    /// Clamp `pan` into this limit.
    pub fn clamp(&self, pan: (f32, f32)) -> (f32, f32) {
        (pan.0.clamp(-self.x, self.x), pan.1.clamp(-self.y, self.y))
    }
}

/// How far, per side, the scaled image extends past the container when centered.
///
/// `max(0, (natural * scale - container) / 2)`
pub fn overflow(natural: f32, container: f32, scale: f32) -> f32 {
    ((natural * scale - container) / 2.0).max(0.0)
}

/// Compute the pan limit for the given image and container at `scale`.
///
/// `buffer_ratio` is the fraction of the container size added on top of the
/// overflow as rubber-band slack. Pass `0.0` for the strict bound.
/// At `scale <= 1` the limit is always zero.
pub fn pan_limit(natural: Size, container: Size, scale: f32, buffer_ratio: f32) -> PanLimit {
    if scale <= 1.0 {
        return PanLimit::zero();
    }

    PanLimit {
        x: overflow(natural.width, container.width, scale) + container.width * buffer_ratio,
        y: overflow(natural.height, container.height, scale) + container.height * buffer_ratio,
    }
}

/// Ease-out-cubic: `1 - (1 - t)^3`, with `t` clamped to `[0, 1]`.
pub fn ease_out_cubic(progress: f32) -> f32 {
    let t = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Linear interpolation between `from` and `to`.
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// The transform applied to the displayed image.
///
/// Presentation layers compose it as `scale(s) translate(tx, ty)`, so the
/// translation is expressed in pre-scale units (`pan / scale`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl ViewTransform {
    /// Build the transform from a scale and a screen-space pan.
    pub fn from_pan(scale: f32, pan: (f32, f32)) -> Self {
        Self {
            scale,
            translate_x: pan.0 / scale,
            translate_y: pan.1 / scale,
        }
    }

    /// Create an identity transform (scale=1, no translation).
    pub fn identity() -> Self {
        Self::from_pan(1.0, (0.0, 0.0))
    }

    /// Zoom level as a rounded percentage for the zoom indicator.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    /// CSS `transform` value.
    pub fn to_css(&self) -> String {
        format!(
            "scale({}) translate({}px, {}px)",
            self.scale, self.translate_x, self.translate_y
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}
