//! Configuration options for fieldscope.

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::color_mapper::rgb8;
use crate::error::Result;

/// Tunable defaults shared by contour plots and 3D scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Grids with more columns or rows than this are downsampled before contouring.
    pub max_grid_size: usize,

    /// Working size used when a large grid is downsampled.
    pub interpolated_grid_size: usize,

    /// Whether large grids are downsampled at all.
    pub interpolate_large_grids: bool,

    /// Number of contour levels for new plots.
    pub default_levels: usize,

    /// Color of contour lines and the plot boundary.
    pub line_color: Vec4,

    /// Camera screen distance as a multiple of the scene size.
    pub ratio_to_screen: f64,

    /// Camera focus distance as a multiple of the scene size.
    pub ratio_to_focus: f64,

    /// Smallest view-axis depth, as a fraction of the scene size.
    pub epsilon_ratio: f64,

    /// Pixel scale multiplier for the planar projection modes.
    pub planar_factor: f64,

    /// Pixel scale multiplier for the 3D projection modes.
    pub projection_factor: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_grid_size: 48,
            interpolated_grid_size: 32,
            interpolate_large_grids: true,
            default_levels: 12,
            line_color: rgb8(0, 64, 0),
            ratio_to_screen: 2.5,
            ratio_to_focus: 2.0,
            epsilon_ratio: 0.01,
            planar_factor: 1.8,
            projection_factor: 1.0,
        }
    }
}

impl Options {
    /// Parses options from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
