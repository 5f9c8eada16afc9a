//! Storefront image viewer.
//!
//! Pan/zoom state for the full-screen product image viewer, the product
//! image carousel, and the touch/keyboard input that drives them. Pure state:
//! callers feed pointer positions and timestamps, and apply the returned
//! [`ViewTransform`].

pub mod carousel;
pub mod constants;
pub mod gesture;
pub mod keys;
pub mod viewer;
pub mod zoom_math;

pub use carousel::ImageCarousel;
pub use gesture::{PinchStep, PinchTracker, Swipe, detect_swipe};
pub use keys::{ViewerCommand, command_for_key};
pub use viewer::{BounceAnimation, ViewerPhase, ViewerSettings, ZoomViewer};
pub use zoom_math::{PanLimit, Size, ViewTransform};
