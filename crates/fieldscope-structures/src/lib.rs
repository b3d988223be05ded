//! Drawable implementations for fieldscope.
//!
//! This crate provides the two kinds of drawables:
//! - Contour plots of scalar grid data ([`ContourPlot`])
//! - Painter's-algorithm 3D scenes ([`Scene`]) built from boxes, cones,
//!   ellipsoids, segments, springs, tetrahedra, trails and groups

// Geometry code intentionally uses casts for indices and division counts
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Cell corners v0..v3 and grid extents x0/x1/y0/y1 are conventional names
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]

pub mod contour;
pub mod scene;

pub use contour::{
    trace_cell, AccumulatorPass, CellSink, CellTrace, ContourPlot, ContourSettings,
    ContourVertex, LevelSweep, LineAccumulator, LineSegment, SweepStrategy,
};
pub use scene::{
    AxesMode, AxisMap, BoxShape, CacheState, ConeShape, Element, ElementId, GroupShape,
    Primitive, RelativePosition, Resolution, Scene, SphereShape, SpringShape, Style,
    TetrahedronShape, Tile, TileKind, TrailHandle, TrailPoint,
};
