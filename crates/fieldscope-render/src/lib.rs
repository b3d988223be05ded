//! Projection backend for fieldscope.
//!
//! This crate maps 3D world coordinates onto a 2D drawing surface:
//! - [`Camera`] with planar, orthographic and perspective [`ProjectionMode`]s
//! - [`Viewport`] for the final projected-to-pixel step
//! - [`SurfaceProjector`], the fixed-eye projector used by surface plots

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Basis vectors e1/e2/e3 and sx/sy/sz are conventional names
#![allow(clippy::similar_names)]

pub mod camera;
pub mod surface_projector;
pub mod viewport;

pub use camera::{Camera, ProjectionMode, SceneBounds};
pub use surface_projector::{PixelRect, SurfaceProjector};
pub use viewport::{world_to_pixel, Viewport};
