//! fieldscope: contour plots and painter's-algorithm 3D scenes for
//! simulation fields.
//!
//! Nothing here owns a window. Plots and scenes append [`DrawCommand`]s to a
//! [`DrawList`]; a host renderer replays them on whatever surface it has.
//!
//! # Quick Start
//!
//! ```no_run
//! use fieldscope::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     // A 2x2 field with values increasing towards the upper right
//!     let mut grid = ArrayData::new(2, 2, 1)?;
//!     grid.set_scale(0.0, 1.0, 0.0, 1.0);
//!     grid.set_component(0, &[vec![0.0, 10.0], vec![20.0, 30.0]])?;
//!
//!     let mut plot = ContourPlot::with_grid(Box::new(grid))?;
//!     plot.set_number_of_levels(1);
//!     plot.update()?;
//!
//!     let mut list = DrawList::new(CoordinateSpace::World);
//!     plot.draw(&mut list);
//!
//!     // A box seen through the default camera
//!     let mut scene = Scene::new();
//!     scene.add(Element::new(Primitive::Box(BoxShape::default())));
//!     let commands = scene.render(&Viewport::new(400, 400));
//!     println!("{} + {} draw commands", list.len(), commands.len());
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - `fieldscope-core`: grid data, interpolation, colour mapping, options, state store
//! - `fieldscope-render`: camera projection and viewport mapping
//! - `fieldscope-structures`: [`ContourPlot`] and [`Scene`]

// Re-export core types
pub use fieldscope_core::{
    hsb, polygon_area, rgb8, ArrayData, ColorMapper, CoordinateSpace, DQuat, DVec2, DVec3,
    DrawCommand, DrawList, FieldscopeError, FlatData, GridData, GridGeometry, GridPointData,
    IVec2, Options, Palette, Result, StateStore, Stencil, Vec4, ZExpansion,
};

// Re-export render types
pub use fieldscope_render::{
    world_to_pixel, Camera, PixelRect, ProjectionMode, SceneBounds, SurfaceProjector, Viewport,
};

// Re-export structures
pub use fieldscope_structures::{
    AxesMode, AxisMap, BoxShape, CacheState, ConeShape, ContourPlot, ContourSettings, Element,
    ElementId, LineSegment, Primitive, RelativePosition, Resolution, Scene, SphereShape,
    SpringShape, Style, SweepStrategy, TetrahedronShape, Tile, TileKind, TrailHandle, TrailPoint,
};

/// Installs an `env_logger` logger driven by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs anything, and
/// an already installed logger from the host is left alone.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::info!("fieldscope {} logging initialized", env!("CARGO_PKG_VERSION"));
    }
}
