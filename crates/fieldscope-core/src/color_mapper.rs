//! Scalar-to-color mapping for banded plots.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::error::{FieldscopeError, Result};

/// Builds an opaque color from 8-bit channels.
#[must_use]
pub fn rgb8(r: u8, g: u8, b: u8) -> Vec4 {
    Vec4::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        1.0,
    )
}

/// Converts hue/saturation/brightness (all in `[0, 1]`, hue wrapping) to RGBA.
#[must_use]
pub fn hsb(hue: f32, saturation: f32, brightness: f32) -> Vec4 {
    let brightness = brightness.clamp(0.0, 1.0);
    if saturation <= 0.0 {
        return Vec4::new(brightness, brightness, brightness, 1.0);
    }
    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match h as u32 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    };
    Vec4::new(r, g, b, 1.0)
}

/// Built-in color palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Palette {
    /// Caller-supplied colors.
    Custom,
    /// Hue sweep from violet to red.
    #[default]
    Spectrum,
    /// Black to white.
    Grayscale,
    /// Hue sweep darkened towards both ends.
    DualShade,
    Red,
    Green,
    Blue,
    /// Grayscale ramp with the grayscale floor/ceiling colors.
    Black,
    /// Contour lines only, no band fills.
    Wireframe,
    /// Nothing is drawn for the bands.
    NoRender,
    /// Blue through black to red.
    RedBlueShade,
}

impl Palette {
    /// Converts from the legacy integer palette code.
    /// Order: -1=Custom, 0=Spectrum, 1=Grayscale, 2=DualShade, 3=Red, 4=Green,
    /// 5=Blue, 6=Black, 7=Wireframe, 8=NoRender, 9=RedBlueShade
    #[must_use]
    pub fn from_index(index: i32) -> Option<Self> {
        Some(match index {
            -1 => Palette::Custom,
            0 => Palette::Spectrum,
            1 => Palette::Grayscale,
            2 => Palette::DualShade,
            3 => Palette::Red,
            4 => Palette::Green,
            5 => Palette::Blue,
            6 => Palette::Black,
            7 => Palette::Wireframe,
            8 => Palette::NoRender,
            9 => Palette::RedBlueShade,
            _ => return None,
        })
    }

    /// Converts to the legacy integer palette code.
    #[must_use]
    pub fn to_index(self) -> i32 {
        match self {
            Palette::Custom => -1,
            Palette::Spectrum => 0,
            Palette::Grayscale => 1,
            Palette::DualShade => 2,
            Palette::Red => 3,
            Palette::Green => 4,
            Palette::Blue => 5,
            Palette::Black => 6,
            Palette::Wireframe => 7,
            Palette::NoRender => 8,
            Palette::RedBlueShade => 9,
        }
    }

    /// Returns display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Palette::Custom => "Custom",
            Palette::Spectrum => "Spectrum",
            Palette::Grayscale => "Grayscale",
            Palette::DualShade => "Dual shade",
            Palette::Red => "Red",
            Palette::Green => "Green",
            Palette::Blue => "Blue",
            Palette::Black => "Black",
            Palette::Wireframe => "Wireframe",
            Palette::NoRender => "No render",
            Palette::RedBlueShade => "Red-blue shade",
        }
    }

    /// Floor and ceiling colors that go with this palette.
    #[must_use]
    pub fn floor_ceil_colors(self) -> (Vec4, Vec4) {
        match self {
            Palette::Grayscale | Palette::Black => (rgb8(64, 64, 128), rgb8(255, 191, 191)),
            _ => (rgb8(64, 64, 64), rgb8(192, 192, 192)),
        }
    }

    /// Generates `n` colors for this palette (at least two).
    #[must_use]
    pub fn colors(self, n: usize) -> Vec<Vec4> {
        let n = n.max(2);
        let last = (n - 1) as f32;
        let ramp = |i: usize| (i * 255 / (n - 1)) as u8;
        (0..n)
            .map(|i| {
                let level = i as f32 / last;
                match self {
                    Palette::RedBlueShade => {
                        let up = (2 * i).saturating_sub(n - 1);
                        let down = (n - 1).saturating_sub(2 * i);
                        rgb8(
                            (up * 255 / (n - 1)) as u8,
                            0,
                            (down * 255 / (n - 1)) as u8,
                        )
                    }
                    Palette::Spectrum => hsb(0.8 - 0.8 * level, 1.0, 1.0),
                    Palette::Grayscale | Palette::Black => rgb8(ramp(i), ramp(i), ramp(i)),
                    Palette::Red => rgb8(ramp(i), 0, 0),
                    Palette::Green => rgb8(0, ramp(i), 0),
                    Palette::Blue => rgb8(0, 0, ramp(i)),
                    Palette::DualShade
                    | Palette::Custom
                    | Palette::Wireframe
                    | Palette::NoRender => {
                        hsb(0.8 * (1.0 - level), 1.0, 0.2 + 1.6 * (0.5 - level).abs())
                    }
                }
            })
            .collect()
    }
}

/// Maps scalars in `[floor, ceiling]` onto a discrete list of colors.
///
/// Values below the floor map to the floor color, values above the ceiling to
/// the ceiling color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMapper {
    colors: Vec<Vec4>,
    floor: f64,
    ceil: f64,
    floor_color: Vec4,
    ceil_color: Vec4,
    palette: Palette,
}

impl ColorMapper {
    /// Creates a mapper with `num_colors` colors from `palette` over `[floor, ceil]`.
    #[must_use]
    pub fn new(num_colors: usize, floor: f64, ceil: f64, palette: Palette) -> Self {
        let (floor_color, ceil_color) = palette.floor_ceil_colors();
        Self {
            colors: palette.colors(num_colors),
            floor,
            ceil,
            floor_color,
            ceil_color,
            palette,
        }
    }

    #[must_use]
    pub fn floor(&self) -> f64 {
        self.floor
    }

    #[must_use]
    pub fn ceil(&self) -> f64 {
        self.ceil
    }

    #[must_use]
    pub fn floor_color(&self) -> Vec4 {
        self.floor_color
    }

    #[must_use]
    pub fn ceil_color(&self) -> Vec4 {
        self.ceil_color
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        self.palette
    }

    #[must_use]
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    #[must_use]
    pub fn num_colors(&self) -> usize {
        self.colors.len()
    }

    /// Sets the value range covered by the colors.
    pub fn set_scale(&mut self, floor: f64, ceil: f64) {
        self.floor = floor;
        self.ceil = ceil;
    }

    /// Switches to a built-in palette, resetting the floor/ceiling colors.
    ///
    /// Selecting [`Palette::Custom`] keeps the current colors.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        (self.floor_color, self.ceil_color) = palette.floor_ceil_colors();
        if palette != Palette::Custom {
            self.colors = palette.colors(self.colors.len());
        }
    }

    /// Replaces the colors with a caller-supplied list.
    pub fn set_custom_colors(&mut self, colors: Vec<Vec4>) -> Result<()> {
        if colors.is_empty() {
            return Err(FieldscopeError::InvalidArgument(
                "custom palette needs at least one color".into(),
            ));
        }
        (self.floor_color, self.ceil_color) = Palette::Custom.floor_ceil_colors();
        self.palette = Palette::Custom;
        self.colors = colors;
        Ok(())
    }

    pub fn set_floor_ceil_colors(&mut self, floor_color: Vec4, ceil_color: Vec4) {
        self.floor_color = floor_color;
        self.ceil_color = ceil_color;
    }

    /// Changes the number of colors.
    ///
    /// Built-in palettes are regenerated; a custom palette is truncated or
    /// padded with its last color.
    pub fn set_number_of_colors(&mut self, n: usize) {
        if n == self.colors.len() {
            return;
        }
        if self.palette == Palette::Custom {
            let last = self.colors.last().copied().unwrap_or(Vec4::ONE);
            self.colors.resize(n.max(1), last);
        } else {
            self.colors = self.palette.colors(n);
        }
    }

    /// Color index for `value`: `-1` below the floor, `num_colors` above the ceiling.
    #[must_use]
    pub fn double_to_index(&self, value: f64) -> isize {
        let len = self.colors.len();
        if (self.floor as f32) - (value as f32) > f32::MIN_POSITIVE {
            return -1;
        }
        if (value as f32) - (self.ceil as f32) > f32::MIN_POSITIVE {
            return len as isize;
        }
        let span = self.ceil - self.floor;
        if span <= 0.0 {
            return 0;
        }
        let index = (len as f64 * (value - self.floor) / span).floor();
        if index <= 0.0 {
            0
        } else {
            (index as usize).min(len - 1) as isize
        }
    }

    /// Color for an index as returned by [`double_to_index`](Self::double_to_index).
    #[must_use]
    pub fn index_to_color(&self, index: isize) -> Vec4 {
        match usize::try_from(index) {
            Err(_) => self.floor_color,
            Ok(i) => self.colors.get(i).copied().unwrap_or(self.ceil_color),
        }
    }

    #[must_use]
    pub fn double_to_color(&self, value: f64) -> Vec4 {
        self.index_to_color(self.double_to_index(value))
    }

    /// Lower bound of each color band followed by the ceiling.
    #[must_use]
    pub fn thresholds(&self) -> Vec<f64> {
        let n = self.colors.len();
        let delta = (self.ceil - self.floor) / n as f64;
        (0..n)
            .map(|i| self.floor + i as f64 * delta)
            .chain(std::iter::once(self.ceil))
            .collect()
    }
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self::new(12, -1.0, 1.0, Palette::Spectrum)
    }
}
