//! Interleaved storage.

use std::any::Any;

use super::{check_dimensions, default_names, GridData};
use crate::error::{FieldscopeError, Result};
use crate::interpolation::GridGeometry;

/// Grid storage in a single row-major buffer with components interleaved.
///
/// Sample `(ix, iy)` component `c` lives at `(iy * nx + ix) * components + c`,
/// which matches the layout of most image-like simulation buffers.
#[derive(Debug, Clone)]
pub struct FlatData {
    geometry: GridGeometry,
    names: Vec<String>,
    stride: usize,
    data: Vec<f64>,
}

impl FlatData {
    /// Creates a zero-filled `nx × ny` grid with `components` components.
    pub fn new(nx: usize, ny: usize, components: usize) -> Result<Self> {
        check_dimensions(nx, ny, components)?;
        Ok(Self {
            geometry: GridGeometry::new(nx, ny),
            names: default_names(components),
            stride: components,
            data: vec![0.0; nx * ny * components],
        })
    }

    /// Wraps an existing interleaved buffer.
    pub fn from_buffer(nx: usize, ny: usize, components: usize, data: Vec<f64>) -> Result<Self> {
        check_dimensions(nx, ny, components)?;
        let expected = nx * ny * components;
        if data.len() != expected {
            return Err(FieldscopeError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            geometry: GridGeometry::new(nx, ny),
            names: default_names(components),
            stride: components,
            data,
        })
    }
}

impl GridData for FlatData {
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
        self.stride
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
        (iy * self.geometry.nx() + ix) * self.stride + c
    }
}
