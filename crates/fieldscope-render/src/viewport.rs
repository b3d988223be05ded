//! Mapping from projected coordinates to pixels.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use fieldscope_core::Options;

use crate::camera::{Camera, SceneBounds};

/// The pixel rectangle a scene is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    width: u32,
    height: u32,
    square_aspect: bool,
    planar_factor: f64,
    projection_factor: f64,
}

impl Viewport {
    /// Creates a viewport of the given size in pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_options(width, height, &Options::default())
    }

    /// Creates a viewport using the pixel-scale factors in `options`.
    #[must_use]
    pub fn with_options(width: u32, height: u32, options: &Options) -> Self {
        Self {
            width,
            height,
            square_aspect: true,
            planar_factor: options.planar_factor,
            projection_factor: options.projection_factor,
        }
    }

    /// Whether x and y share one pixel scale (the default).
    #[must_use]
    pub fn with_square_aspect(mut self, square: bool) -> Self {
        self.square_aspect = square;
        self
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel centre of the viewport.
    #[must_use]
    pub fn center(&self) -> DVec2 {
        DVec2::new(f64::from(self.width / 2), f64::from(self.height / 2))
    }

    /// Pixels per projected unit along x and y for the given camera and scene.
    #[must_use]
    pub fn scale(&self, camera: &Camera, bounds: &SceneBounds) -> DVec2 {
        let mode = camera.projection_mode();
        let size = bounds.max_size(mode);
        let size = if size > 0.0 { size } else { 1.0 };
        let (mut w, mut h) = (f64::from(self.width), f64::from(self.height));
        if self.square_aspect {
            w = w.min(h);
            h = w;
        }
        let factor = if mode.is_3d() {
            self.projection_factor
        } else {
            self.planar_factor
        };
        DVec2::new(0.5 * w / size, 0.5 * h / size) * factor
    }

    /// Converts a projected `(x, y, depth)` to `(pixel_x, pixel_y, depth)` with y down.
    #[must_use]
    pub fn to_pixel(&self, projected: DVec3, scale: DVec2) -> DVec3 {
        let c = self.center();
        DVec3::new(
            c.x + projected.x * scale.x,
            c.y - projected.y * scale.y,
            projected.z,
        )
    }

    /// Converts a projected size to pixels.
    #[must_use]
    pub fn size_to_pixels(&self, size: DVec2, scale: DVec2) -> DVec2 {
        size * scale
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(400, 400)
    }
}

/// Projects a world point straight to pixels.
#[must_use]
pub fn world_to_pixel(
    camera: &Camera,
    viewport: &Viewport,
    bounds: &SceneBounds,
    point: DVec3,
) -> DVec3 {
    viewport.to_pixel(camera.project(point), viewport.scale(camera, bounds))
}
