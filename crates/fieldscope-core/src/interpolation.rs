//! Grid geometry and bilinear interpolation.
//!
//! [`GridGeometry`] owns the world-space bounds and spacing shared by every
//! [`GridData`](crate::GridData) storage kind. [`Stencil`] is the located cell
//! for one query point: it records which samples to blend and with what
//! weights, so that several components can be interpolated at the same
//! `(x, y)` without locating the cell twice.

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};

/// World-space placement of an `nx × ny` sample lattice.
///
/// `dy` is normally negative: row 0 sits at `top` and rows grow downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    nx: usize,
    ny: usize,
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    dx: f64,
    dy: f64,
    cell_data: bool,
}

impl GridGeometry {
    /// Creates the geometry for an `nx × ny` grid with the default scale
    /// `left = 0, right = nx, bottom = 0, top = ny`.
    ///
    /// Dimensions are validated by the owning grid.
    #[must_use]
    pub fn new(nx: usize, ny: usize) -> Self {
        let mut geometry = Self {
            nx,
            ny,
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
            dx: 0.0,
            dy: 0.0,
            cell_data: false,
        };
        geometry.set_scale(0.0, nx as f64, 0.0, ny as f64);
        geometry
    }

    #[must_use]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[must_use]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.left
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.right
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.top
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    #[must_use]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    #[must_use]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Returns true if samples label cell centres rather than lattice points.
    #[must_use]
    pub fn is_cell_data(&self) -> bool {
        self.cell_data
    }

    /// Places the samples on the lattice points spanning the given bounds.
    ///
    /// A single column (or row) has no spacing; its bounds are widened by half
    /// a unit on each side so that the grid still has a visible extent.
    pub fn set_scale(&mut self, left: f64, right: f64, bottom: f64, top: f64) {
        self.cell_data = false;
        self.left = left;
        self.right = right;
        self.bottom = bottom;
        self.top = top;

        self.dx = if self.nx > 1 {
            (right - left) / (self.nx - 1) as f64
        } else {
            0.0
        };
        self.dy = if self.ny > 1 {
            (bottom - top) / (self.ny - 1) as f64
        } else {
            0.0
        };

        if self.dx == 0.0 {
            self.left -= 0.5;
            self.right += 0.5;
        }
        if self.dy == 0.0 {
            self.bottom -= 0.5;
            self.top += 0.5;
        }
    }

    /// Places the samples at the centres of `nx × ny` cells filling the bounds.
    pub fn set_cell_scale(&mut self, left: f64, right: f64, bottom: f64, top: f64) {
        self.cell_data = true;
        self.dx = if self.nx > 1 {
            (right - left) / self.nx as f64
        } else {
            0.0
        };
        self.dy = if self.ny > 1 {
            (bottom - top) / self.ny as f64
        } else {
            0.0
        };
        self.left = left + self.dx / 2.0;
        self.right = right - self.dx / 2.0;
        self.bottom = bottom - self.dy / 2.0;
        self.top = top + self.dy / 2.0;
    }

    /// Like [`set_cell_scale`](Self::set_cell_scale), but the given bounds are
    /// the centres of the outermost cells.
    pub fn set_centered_cell_scale(
        &mut self,
        mut xmin: f64,
        mut xmax: f64,
        mut ymin: f64,
        mut ymax: f64,
    ) {
        let delta = if self.nx > 1 {
            (xmax - xmin) / (self.nx - 1) as f64 / 2.0
        } else {
            0.0
        };
        xmin -= delta;
        xmax += delta;
        let delta = if self.ny > 1 {
            (ymax - ymin) / (self.ny - 1) as f64 / 2.0
        } else {
            0.0
        };
        ymin -= delta;
        ymax += delta;
        self.set_cell_scale(xmin, xmax, ymin, ymax);
    }

    /// World x coordinate of column `i`.
    #[must_use]
    pub fn index_to_x(&self, i: usize) -> f64 {
        self.left + self.dx * i as f64
    }

    /// World y coordinate of row `i`.
    #[must_use]
    pub fn index_to_y(&self, i: usize) -> f64 {
        self.top + self.dy * i as f64
    }

    /// Column containing `x`, clamped to `[0, nx - 1]`.
    #[must_use]
    pub fn x_to_index(&self, x: f64) -> usize {
        let width = (self.right - self.left) / self.nx as f64;
        clamp_index((x - self.left) / width, self.nx)
    }

    /// Row containing `y`, clamped to `[0, ny - 1]`.
    #[must_use]
    pub fn y_to_index(&self, y: f64) -> usize {
        let height = (self.top - self.bottom) / self.ny as f64;
        clamp_index((self.top - y) / height, self.ny)
    }

    /// Locates the cell enclosing `(x, y)`.
    ///
    /// Out-of-range input is never an error: the cell index is clamped to the
    /// boundary cell, so queries outside the grid extrapolate with that cell's
    /// gradient.
    #[must_use]
    pub fn locate(&self, x: f64, y: f64) -> Stencil {
        match (self.nx > 1, self.ny > 1) {
            (false, false) => Stencil::Point,
            (true, false) => {
                let (ix, t) = cell_along(x - self.left, self.dx, self.nx);
                Stencil::AlongX { ix, t }
            }
            (false, true) => {
                let (iy, u) = cell_along(y - self.top, self.dy, self.ny);
                Stencil::AlongY { iy, u }
            }
            (true, true) => {
                let (ix, t) = cell_along(x - self.left, self.dx, self.nx);
                let (iy, u) = cell_along(y - self.top, self.dy, self.ny);
                Stencil::Cell { ix, iy, t, u }
            }
        }
    }
}

#[inline]
fn clamp_index(f: f64, n: usize) -> usize {
    if f.is_nan() || f < 0.0 {
        return 0;
    }
    let i = f.floor();
    if i >= n as f64 {
        n - 1
    } else {
        i as usize
    }
}

/// Cell index along one axis plus the fractional offset inside it.
#[inline]
fn cell_along(offset: f64, step: f64, n: usize) -> (usize, f64) {
    // A zero-width span collapses the axis onto its first sample.
    if step == 0.0 || !step.is_finite() {
        return (0, 0.0);
    }
    let f = offset / step;
    let i = if f.is_nan() || f < 0.0 {
        0
    } else {
        (f.floor() as usize).min(n - 2)
    };
    (i, f - i as f64)
}

/// The samples and weights blended for one interpolation query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stencil {
    /// `1 × 1` grid: the single sample.
    Point,
    /// Single row: linear blend between columns `ix` and `ix + 1`.
    AlongX { ix: usize, t: f64 },
    /// Single column: linear blend between rows `iy` and `iy + 1`.
    AlongY { iy: usize, u: f64 },
    /// Bilinear blend of the four corners of cell `(ix, iy)`.
    Cell { ix: usize, iy: usize, t: f64, u: f64 },
}

impl Stencil {
    /// Blends the samples returned by `sample(ix, iy)`.
    #[inline]
    pub fn blend(&self, sample: impl Fn(usize, usize) -> f64) -> f64 {
        match *self {
            Stencil::Point => sample(0, 0),
            Stencil::AlongX { ix, t } => (1.0 - t) * sample(ix, 0) + t * sample(ix + 1, 0),
            Stencil::AlongY { iy, u } => (1.0 - u) * sample(0, iy) + u * sample(0, iy + 1),
            Stencil::Cell { ix, iy, t, u } => {
                (1.0 - t) * (1.0 - u) * sample(ix, iy)
                    + t * (1.0 - u) * sample(ix + 1, iy)
                    + t * u * sample(ix + 1, iy + 1)
                    + (1.0 - t) * u * sample(ix, iy + 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_scale() {
        let g = GridGeometry::new(3, 5);
        assert_eq!(g.left(), 0.0);
        assert_eq!(g.right(), 3.0);
        assert_eq!(g.top(), 5.0);
        assert_eq!(g.bottom(), 0.0);
        assert!((g.dx() - 1.5).abs() < 1e-12);
        assert!((g.dy() + 1.25).abs() < 1e-12);
        assert!(!g.is_cell_data());
    }

    #[test]
    fn test_single_column_widens_bounds() {
        let mut g = GridGeometry::new(1, 4);
        g.set_scale(2.0, 2.0, 0.0, 3.0);
        assert_eq!(g.dx(), 0.0);
        assert_eq!(g.left(), 1.5);
        assert_eq!(g.right(), 2.5);
        assert!((g.dy() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cell_scale() {
        let mut g = GridGeometry::new(4, 2);
        g.set_cell_scale(0.0, 4.0, 0.0, 2.0);
        assert!(g.is_cell_data());
        assert_eq!(g.dx(), 1.0);
        assert_eq!(g.dy(), -1.0);
        assert_eq!(g.left(), 0.5);
        assert_eq!(g.right(), 3.5);
        assert_eq!(g.top(), 1.5);
        assert_eq!(g.bottom(), 0.5);
    }

    #[test]
    fn test_centered_cell_scale_puts_centres_on_bounds() {
        let mut g = GridGeometry::new(3, 3);
        g.set_centered_cell_scale(0.0, 2.0, 0.0, 2.0);
        assert!((g.left() - 0.0).abs() < 1e-12);
        assert!((g.right() - 2.0).abs() < 1e-12);
        assert!((g.top() - 2.0).abs() < 1e-12);
        assert!((g.bottom() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_index_conversion_clamps() {
        let mut g = GridGeometry::new(4, 4);
        g.set_scale(0.0, 3.0, 0.0, 3.0);
        assert_eq!(g.index_to_x(2), 2.0);
        assert_eq!(g.index_to_y(1), 2.0);
        assert_eq!(g.x_to_index(-10.0), 0);
        assert_eq!(g.x_to_index(100.0), 3);
        assert_eq!(g.y_to_index(3.0), 0);
        assert_eq!(g.y_to_index(-5.0), 3);
    }

    #[test]
    fn test_locate_clamps_outside_grid() {
        let mut g = GridGeometry::new(3, 3);
        g.set_scale(0.0, 2.0, 0.0, 2.0);
        match g.locate(5.0, -1.0) {
            Stencil::Cell { ix, iy, t, u } => {
                assert_eq!(ix, 1);
                assert_eq!(iy, 1);
                assert!((t - 4.0).abs() < 1e-12);
                assert!((u - 2.0).abs() < 1e-12);
            }
            other => panic!("unexpected stencil {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_axes() {
        assert_eq!(GridGeometry::new(1, 1).locate(3.0, 4.0), Stencil::Point);
        assert!(matches!(
            GridGeometry::new(4, 1).locate(1.0, 0.0),
            Stencil::AlongX { .. }
        ));
        assert!(matches!(
            GridGeometry::new(1, 4).locate(0.0, 1.0),
            Stencil::AlongY { .. }
        ));
    }

    #[test]
    fn test_zero_width_span_uses_first_column() {
        let mut g = GridGeometry::new(3, 3);
        g.set_scale(1.0, 1.0, 0.0, 2.0);
        assert_eq!(g.dx(), 0.0);
        let values = [[7.0, 7.0, 7.0], [8.0, 8.0, 8.0], [9.0, 9.0, 9.0]];
        for x in [1.0, g.left(), g.right(), -5.0] {
            let v = g.locate(x, 1.0).blend(|i, j| values[i][j]);
            assert!((v - 7.0).abs() < 1e-12, "x = {x}: {v}");
        }
    }

    #[test]
    fn test_blend_centroid_is_average() {
        let stencil = Stencil::Cell {
            ix: 0,
            iy: 0,
            t: 0.5,
            u: 0.5,
        };
        let values = [[1.0, 2.0], [3.0, 6.0]];
        let v = stencil.blend(|i, j| values[i][j]);
        assert!((v - 3.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_located_samples_round_trip(
            nx in 2usize..9,
            ny in 2usize..9,
            left in -10.0f64..10.0,
            width in 0.5f64..20.0,
            bottom in -10.0f64..10.0,
            height in 0.5f64..20.0,
        ) {
            let mut g = GridGeometry::new(nx, ny);
            g.set_scale(left, left + width, bottom, bottom + height);
            let sample = |i: usize, j: usize| (i * 31 + j * 7) as f64;
            for i in 0..nx {
                for j in 0..ny {
                    let v = g.locate(g.index_to_x(i), g.index_to_y(j)).blend(sample);
                    prop_assert!((v - sample(i, j)).abs() < 1e-6);
                }
            }
        }
    }
}
