//! Grid data providers.
//!
//! A [`GridData`] is an immutable-shape, mutable-value `nx × ny` lattice of
//! samples with one or more named components, placed in world space by a
//! [`GridGeometry`]. Three storage kinds are provided:
//! - [`ArrayData`]: component-major arrays; the only kind that supports bulk `set_all`
//! - [`FlatData`]: a single interleaved buffer
//! - [`GridPointData`]: samples that also carry their own world coordinates

mod array;
mod flat;
mod point;

pub use array::ArrayData;
pub use flat::FlatData;
pub use point::GridPointData;

use std::any::Any;

use crate::error::{FieldscopeError, Result};
use crate::interpolation::GridGeometry;

/// Validates constructor dimensions shared by every storage kind.
pub(crate) fn check_dimensions(nx: usize, ny: usize, components: usize) -> Result<()> {
    if nx < 1 || ny < 1 || components < 1 {
        return Err(FieldscopeError::InvalidDimensions { nx, ny, components });
    }
    Ok(())
}

pub(crate) fn default_names(components: usize) -> Vec<String> {
    (0..components).map(|i| format!("Component_{i}")).collect()
}

/// Trait implemented by every scalar-grid provider.
///
/// Implementors supply storage access (`values`, `values_mut`, `offset`) and
/// geometry access; everything else is provided.
pub trait GridData: Any + Send + Sync {
    /// Returns a reference to self as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to self as Any for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// World-space placement of the samples.
    fn geometry(&self) -> &GridGeometry;

    /// Mutable world-space placement of the samples.
    fn geometry_mut(&mut self) -> &mut GridGeometry;

    /// Number of components stored per sample.
    fn component_count(&self) -> usize;

    /// Name of component `c`, if it exists.
    fn component_name(&self, c: usize) -> Option<&str>;

    /// Renames component `c`.
    fn set_component_name(&mut self, c: usize, name: &str) -> Result<()>;

    /// Raw sample storage.
    fn values(&self) -> &[f64];

    /// Mutable raw sample storage.
    fn values_mut(&mut self) -> &mut [f64];

    /// Storage offset of sample `(ix, iy)` component `c`. Indices are assumed valid.
    fn offset(&self, ix: usize, iy: usize, c: usize) -> usize;

    /// Number of columns.
    fn nx(&self) -> usize {
        self.geometry().nx()
    }

    /// Number of rows.
    fn ny(&self) -> usize {
        self.geometry().ny()
    }

    fn left(&self) -> f64 {
        self.geometry().left()
    }

    fn right(&self) -> f64 {
        self.geometry().right()
    }

    fn top(&self) -> f64 {
        self.geometry().top()
    }

    fn bottom(&self) -> f64 {
        self.geometry().bottom()
    }

    fn dx(&self) -> f64 {
        self.geometry().dx()
    }

    fn dy(&self) -> f64 {
        self.geometry().dy()
    }

    /// Returns true if samples label cell centres.
    fn is_cell_data(&self) -> bool {
        self.geometry().is_cell_data()
    }

    /// Places samples on lattice points spanning the bounds.
    fn set_scale(&mut self, left: f64, right: f64, bottom: f64, top: f64) {
        self.geometry_mut().set_scale(left, right, bottom, top);
    }

    /// Places samples at cell centres inside the bounds.
    fn set_cell_scale(&mut self, left: f64, right: f64, bottom: f64, top: f64) {
        self.geometry_mut().set_cell_scale(left, right, bottom, top);
    }

    /// Places samples at cell centres with the outermost centres on the bounds.
    fn set_centered_cell_scale(&mut self, xmin: f64, xmax: f64, ymin: f64, ymax: f64) {
        self.geometry_mut()
            .set_centered_cell_scale(xmin, xmax, ymin, ymax);
    }

    fn index_to_x(&self, i: usize) -> f64 {
        self.geometry().index_to_x(i)
    }

    fn index_to_y(&self, i: usize) -> f64 {
        self.geometry().index_to_y(i)
    }

    fn x_to_index(&self, x: f64) -> usize {
        self.geometry().x_to_index(x)
    }

    fn y_to_index(&self, y: f64) -> usize {
        self.geometry().y_to_index(y)
    }

    /// Validates a sample index triple.
    fn check_index(&self, ix: usize, iy: usize, c: usize) -> Result<()> {
        if ix >= self.nx() {
            return Err(FieldscopeError::index("column", ix, self.nx()));
        }
        if iy >= self.ny() {
            return Err(FieldscopeError::index("row", iy, self.ny()));
        }
        if c >= self.component_count() {
            return Err(FieldscopeError::index("component", c, self.component_count()));
        }
        Ok(())
    }

    /// Gets component `c` of sample `(ix, iy)`.
    fn value(&self, ix: usize, iy: usize, c: usize) -> Result<f64> {
        self.check_index(ix, iy, c)?;
        Ok(self.values()[self.offset(ix, iy, c)])
    }

    /// Sets component `c` of sample `(ix, iy)`.
    fn set_value(&mut self, ix: usize, iy: usize, c: usize, value: f64) -> Result<()> {
        self.check_index(ix, iy, c)?;
        let offset = self.offset(ix, iy, c);
        self.values_mut()[offset] = value;
        Ok(())
    }

    /// Minimum and maximum of component `c` over all samples.
    fn z_range(&self, c: usize) -> Result<(f64, f64)> {
        self.check_index(0, 0, c)?;
        let values = self.values();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for ix in 0..self.nx() {
            for iy in 0..self.ny() {
                let v = values[self.offset(ix, iy, c)];
                min = min.min(v);
                max = max.max(v);
            }
        }
        Ok((min, max))
    }

    /// Bilinear estimate of component `c` at the untabulated point `(x, y)`.
    ///
    /// Coordinates outside the grid are clamped to the boundary cell and
    /// extrapolate with its gradient. An invalid component yields `NaN`.
    fn interpolate(&self, x: f64, y: f64, c: usize) -> f64 {
        if c >= self.component_count() {
            return f64::NAN;
        }
        let values = self.values();
        self.geometry()
            .locate(x, y)
            .blend(|ix, iy| values[self.offset(ix, iy, c)])
    }

    /// Interpolates several components at `(x, y)`, locating the cell once.
    ///
    /// `out[i]` receives component `components[i]`; extra output slots are left untouched.
    fn interpolate_many(&self, x: f64, y: f64, components: &[usize], out: &mut [f64]) {
        let stencil = self.geometry().locate(x, y);
        let values = self.values();
        let count = self.component_count();
        for (slot, &c) in out.iter_mut().zip(components) {
            *slot = if c < count {
                stencil.blend(|ix, iy| values[self.offset(ix, iy, c)])
            } else {
                f64::NAN
            };
        }
    }
}
