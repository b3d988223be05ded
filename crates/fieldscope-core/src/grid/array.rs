//! Component-major array storage.

use std::any::Any;

use super::{check_dimensions, default_names, GridData};
use crate::error::{FieldscopeError, Result};
use crate::interpolation::GridGeometry;

/// Grid storage with one contiguous `[ix][iy]` block per component.
///
/// This is the mutable array-backed kind: it alone supports replacing a
/// whole component at once with [`ArrayData::set_component`].
#[derive(Debug, Clone)]
pub struct ArrayData {
    geometry: GridGeometry,
    names: Vec<String>,
    components: usize,
    data: Vec<f64>,
}

impl ArrayData {
    /// Creates a zero-filled `nx × ny` grid with `components` components.
    pub fn new(nx: usize, ny: usize, components: usize) -> Result<Self> {
        check_dimensions(nx, ny, components)?;
        Ok(Self {
            geometry: GridGeometry::new(nx, ny),
            names: default_names(components),
            components,
            data: vec![0.0; nx * ny * components],
        })
    }

    /// Replaces component `c` with `values[ix][iy]`.
    ///
    /// The outer length must equal `nx` and every column must hold `ny` rows.
    pub fn set_component(&mut self, c: usize, values: &[Vec<f64>]) -> Result<()> {
        let (nx, ny) = (self.geometry.nx(), self.geometry.ny());
        if c >= self.components {
            return Err(FieldscopeError::index("component", c, self.components));
        }
        if values.len() != nx {
            return Err(FieldscopeError::SizeMismatch {
                expected: nx,
                actual: values.len(),
            });
        }
        if let Some(column) = values.iter().find(|column| column.len() != ny) {
            return Err(FieldscopeError::SizeMismatch {
                expected: ny,
                actual: column.len(),
            });
        }

        let block = &mut self.data[c * nx * ny..(c + 1) * nx * ny];
        for (dst, column) in block.chunks_exact_mut(ny).zip(values) {
            dst.copy_from_slice(column);
        }
        Ok(())
    }

    /// Component `c` as a contiguous `[ix * ny + iy]` slice.
    #[must_use]
    pub fn component(&self, c: usize) -> Option<&[f64]> {
        let len = self.geometry.nx() * self.geometry.ny();
        self.data.get(c * len..(c + 1) * len)
    }
}

impl GridData for ArrayData {
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
        let ny = self.geometry.ny();
        (c * self.geometry.nx() + ix) * ny + iy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_component() {
        let mut grid = ArrayData::new(2, 3, 2).unwrap();
        grid.set_component(1, &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
            .unwrap();
        assert_eq!(grid.value(1, 2, 1).unwrap(), 6.0);
        assert_eq!(grid.value(1, 2, 0).unwrap(), 0.0);
        assert_eq!(grid.component(1).unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_set_component_shape_checked() {
        let mut grid = ArrayData::new(2, 3, 1).unwrap();
        assert!(matches!(
            grid.set_component(0, &[vec![1.0, 2.0, 3.0]]),
            Err(FieldscopeError::SizeMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            grid.set_component(0, &[vec![1.0, 2.0, 3.0], vec![1.0]]),
            Err(FieldscopeError::SizeMismatch {
                expected: 3,
                actual: 1
            })
        ));
        assert!(grid.set_component(1, &[]).is_err());
    }

    #[test]
    fn test_component_names() {
        let mut grid = ArrayData::new(1, 1, 2).unwrap();
        assert_eq!(grid.component_name(1), Some("Component_1"));
        grid.set_component_name(0, "psi").unwrap();
        assert_eq!(grid.component_name(0), Some("psi"));
        assert!(grid.set_component_name(2, "nope").is_err());
    }
}
