//! Fixed-camera projector for surface plots.
//!
//! A lighter alternative to [`Camera`](crate::Camera) for plots that spin a
//! surface in front of a fixed eye: the data is scaled per axis, rotated about
//! the vertical axis, tilted by the elevation and perspective-divided, then
//! offset into an integer pixel rectangle.

#![allow(clippy::cast_possible_truncation)]

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Integer pixel rectangle the projection is centred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    #[must_use]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn center(&self) -> IVec2 {
        IVec2::new(
            (2 * self.x + self.width) / 2,
            (2 * self.y + self.height) / 2,
        )
    }
}

/// Surface-plot projector. Angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceProjector {
    scale_x: f64,
    scale_y: f64,
    scale_z: f64,
    distance: f64,
    scale_2d: f64,
    rotation: f64,
    elevation: f64,
    translation: IVec2,
    area: PixelRect,
    coefficients: Coefficients,
}

/// Trigonometry cached from the angles and scales.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Coefficients {
    sin_elevation: f64,
    cos_elevation: f64,
    sx_cos: f64,
    sx_sin: f64,
    sy_cos: f64,
    sy_sin: f64,
    sz_cos: f64,
    sz_sin: f64,
}

impl Default for SurfaceProjector {
    fn default() -> Self {
        let mut projector = Self {
            scale_x: 1.0,
            scale_y: 1.0,
            scale_z: 1.0,
            distance: 10.0,
            scale_2d: 1.0,
            rotation: 0.0,
            elevation: 0.0,
            translation: IVec2::ZERO,
            area: PixelRect::default(),
            coefficients: Coefficients::default(),
        };
        projector.refresh();
        projector
    }
}

impl SurfaceProjector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh(&mut self) {
        let (sin_r, cos_r) = self.rotation.to_radians().sin_cos();
        let (sin_e, cos_e) = self.elevation.to_radians().sin_cos();
        self.coefficients = Coefficients {
            sin_elevation: sin_e,
            cos_elevation: cos_e,
            sx_cos: -self.scale_x * cos_r,
            sx_sin: -self.scale_x * sin_r,
            sy_cos: -self.scale_y * cos_r,
            sy_sin: self.scale_y * sin_r,
            sz_cos: self.scale_z * cos_e,
            sz_sin: self.scale_z * sin_e,
        };
    }

    /// Sets the rectangle whose centre is the projection origin.
    pub fn set_projection_area(&mut self, area: PixelRect) {
        self.area = area;
    }

    #[must_use]
    pub fn projection_area(&self) -> PixelRect {
        self.area
    }

    pub fn set_rotation_angle(&mut self, degrees: f64) {
        self.rotation = degrees;
        self.refresh();
    }

    #[must_use]
    pub fn rotation_angle(&self) -> f64 {
        self.rotation
    }

    pub fn set_elevation_angle(&mut self, degrees: f64) {
        self.elevation = degrees;
        self.refresh();
    }

    #[must_use]
    pub fn elevation_angle(&self) -> f64 {
        self.elevation
    }

    #[must_use]
    pub fn sin_elevation(&self) -> f64 {
        self.coefficients.sin_elevation
    }

    #[must_use]
    pub fn cos_elevation(&self) -> f64 {
        self.coefficients.cos_elevation
    }

    /// Sets the eye distance from the rotation centre.
    pub fn set_distance(&mut self, distance: f64) {
        self.distance = distance;
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Sets one 3D scale for all axes.
    pub fn set_scaling(&mut self, scaling: f64) {
        self.set_axis_scaling(scaling, scaling, scaling);
    }

    pub fn set_axis_scaling(&mut self, x: f64, y: f64, z: f64) {
        self.scale_x = x;
        self.scale_y = y;
        self.scale_z = z;
        self.refresh();
    }

    #[must_use]
    pub fn axis_scaling(&self) -> (f64, f64, f64) {
        (self.scale_x, self.scale_y, self.scale_z)
    }

    /// Sets the scale applied after the perspective division.
    pub fn set_2d_scaling(&mut self, scaling: f64) {
        self.scale_2d = scaling;
    }

    #[must_use]
    pub fn scaling_2d(&self) -> f64 {
        self.scale_2d
    }

    /// Pixel offset added to the centre of the projection area.
    pub fn set_2d_translation(&mut self, translation: IVec2) {
        self.translation = translation;
    }

    #[must_use]
    pub fn translation_2d(&self) -> IVec2 {
        self.translation
    }

    /// Projects a data-space point to pixels (y down).
    #[must_use]
    pub fn project(&self, x: f64, y: f64, z: f64) -> IVec2 {
        let c = &self.coefficients;
        let rx = x * c.sx_cos + y * c.sy_sin;
        let ry = x * c.sx_sin + y * c.sy_cos;

        let factor = self.distance * self.scale_2d;
        let temp = factor / (ry * c.cos_elevation - z * c.sz_sin + self.distance);
        let offset = self.area.center() + self.translation;
        IVec2::new(
            (rx * temp).round() as i32 + offset.x,
            ((ry * c.sin_elevation + z * c.sz_cos) * -temp).round() as i32 + offset.y,
        )
    }
}
