//! Storage for samples that carry their own coordinates.

use std::any::Any;

use glam::DVec2;

use super::{check_dimensions, default_names, GridData};
use crate::error::{FieldscopeError, Result};
use crate::interpolation::GridGeometry;

/// Grid storage where every sample also records its world position.
///
/// Positions are refreshed from the geometry each time the scale changes, so
/// callers drawing per-point glyphs can read them without recomputing.
#[derive(Debug, Clone)]
pub struct GridPointData {
    geometry: GridGeometry,
    names: Vec<String>,
    components: usize,
    positions: Vec<DVec2>,
    data: Vec<f64>,
}

impl GridPointData {
    /// Creates a zero-filled `nx × ny` grid with `components` components.
    pub fn new(nx: usize, ny: usize, components: usize) -> Result<Self> {
        check_dimensions(nx, ny, components)?;
        let mut grid = Self {
            geometry: GridGeometry::new(nx, ny),
            names: default_names(components),
            components,
            positions: vec![DVec2::ZERO; nx * ny],
            data: vec![0.0; nx * ny * components],
        };
        grid.refresh_positions();
        Ok(grid)
    }

    /// World position of sample `(ix, iy)`.
    pub fn position(&self, ix: usize, iy: usize) -> Result<DVec2> {
        self.check_index(ix, iy, 0)?;
        Ok(self.positions[ix * self.geometry.ny() + iy])
    }

    fn refresh_positions(&mut self) {
        let ny = self.geometry.ny();
        for (i, position) in self.positions.iter_mut().enumerate() {
            *position = DVec2::new(
                self.geometry.index_to_x(i / ny),
                self.geometry.index_to_y(i % ny),
            );
        }
    }
}

impl GridData for GridPointData {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    fn geometry_mut(&mut self) -> &mut GridGeometry {
        &mut self.geometry
    }

    fn component_count(&self) -> usize {
        self.components
    }

    fn component_name(&self, c: usize) -> Option<&str> {
        self.names.get(c).map(String::as_str)
    }

    fn set_component_name(&mut self, c: usize, name: &str) -> Result<()> {
        let len = self.names.len();
        let slot = self
            .names
            .get_mut(c)
            .ok_or_else(|| FieldscopeError::index("component", c, len))?;
        *slot = name.to_string();
        Ok(())
    }

    fn values(&self) -> &[f64] {
        &self.data
    }

    fn values_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, ix: usize, iy: usize, c: usize) -> usize {
        (ix * self.geometry.ny() + iy) * self.components + c
    }

    fn set_scale(&mut self, left: f64, right: f64, bottom: f64, top: f64) {
        self.geometry.set_scale(left, right, bottom, top);
        self.refresh_positions();
    }

    fn set_cell_scale(&mut self, left: f64, right: f64, bottom: f64, top: f64) {
        self.geometry.set_cell_scale(left, right, bottom, top);
        self.refresh_positions();
    }

    fn set_centered_cell_scale(&mut self, xmin: f64, xmax: f64, ymin: f64, ymax: f64) {
        self.geometry
            .set_centered_cell_scale(xmin, xmax, ymin, ymax);
        self.refresh_positions();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_scale() {
        let mut grid = GridPointData::new(3, 2, 1).unwrap();
        grid.set_scale(-1.0, 1.0, 0.0, 4.0);
        assert_eq!(grid.position(0, 0).unwrap(), DVec2::new(-1.0, 4.0));
        assert_eq!(grid.position(2, 1).unwrap(), DVec2::new(1.0, 0.0));

        grid.set_cell_scale(0.0, 3.0, 0.0, 2.0);
        assert_eq!(grid.position(0, 0).unwrap(), DVec2::new(0.5, 1.5));
        assert!(grid.position(3, 0).is_err());
    }

    #[test]
    fn test_interpolates_like_other_kinds() {
        let mut grid = GridPointData::new(2, 2, 1).unwrap();
        grid.set_value(1, 1, 0, 8.0).unwrap();
        grid.set_scale(0.0, 1.0, 0.0, 1.0);
        assert!((grid.interpolate(0.5, 0.5, 0) - 2.0).abs() < 1e-12);
    }
}
