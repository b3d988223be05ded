//! Core abstractions for fieldscope.
//!
//! This crate provides the data model shared by the drawable crates:
//! - [`GridData`] providers ([`ArrayData`], [`FlatData`], [`GridPointData`])
//!   and the bilinear [`GridGeometry`]/[`Stencil`] interpolator
//! - [`ZExpansion`] and [`ColorMapper`] for turning values into colors
//! - [`DrawList`] output consumed by host renderers
//! - [`Options`] configuration and the caller-owned [`StateStore`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Short geometric names (dx, dy, ix, iy) are conventional
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]

pub mod color_mapper;
pub mod draw;
pub mod error;
pub mod grid;
pub mod interpolation;
pub mod options;
pub mod state;
pub mod zexpansion;

pub use color_mapper::{hsb, rgb8, ColorMapper, Palette};
pub use draw::{polygon_area, CoordinateSpace, DrawCommand, DrawList};
pub use error::{FieldscopeError, Result};
pub use grid::{ArrayData, FlatData, GridData, GridPointData};
pub use interpolation::{GridGeometry, Stencil};
pub use options::Options;
pub use state::StateStore;
pub use zexpansion::ZExpansion;

// Re-export glam types for convenience
pub use glam::{DQuat, DVec2, DVec3, IVec2, Vec4};
