//! Drawing style of scene elements.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// How finely a primitive is tessellated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    /// Explicit number of divisions along up to three shape directions.
    Divisions(usize, usize, usize),
    /// Divide so that no tile edge is longer than this, in world units.
    MaxLength(f64),
}

impl Resolution {
    /// Number of pieces a span of `length` is cut into, at least one.
    #[must_use]
    pub fn pieces(max_length: f64, length: f64) -> usize {
        if !(max_length > 0.0) {
            return 1;
        }
        let n = (0.49 + length.abs() / max_length).round();
        if n.is_finite() && n >= 1.0 {
            n as usize
        } else {
            1
        }
    }
}

/// Where a segment-like element starts relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelativePosition {
    /// From the position to position + size.
    #[default]
    NorthEast,
    /// Centred on the position.
    Centered,
    /// From position + size back to the position.
    SouthWest,
}

/// Colors and flags used to draw an element. Not inherited by group children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub line_color: Vec4,
    pub fill_color: Vec4,
    pub line_width: f32,
    pub draw_fill: bool,
    pub draw_lines: bool,
    pub resolution: Option<Resolution>,
    /// Multiplies the depth key of every tile; values below 1 pull the
    /// element forward in the painter's order.
    pub depth_factor: f64,
    pub relative_position: RelativePosition,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            line_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            fill_color: Vec4::new(0.0, 0.0, 1.0, 1.0),
            line_width: 1.0,
            draw_fill: true,
            draw_lines: true,
            resolution: None,
            depth_factor: 1.0,
            relative_position: RelativePosition::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pieces() {
        assert_eq!(Resolution::pieces(0.25, 1.0), 4);
        assert_eq!(Resolution::pieces(0.3, 1.0), 4);
        assert_eq!(Resolution::pieces(10.0, 1.0), 1);
        assert_eq!(Resolution::pieces(0.0, 1.0), 1);
        assert_eq!(Resolution::pieces(0.5, -2.0), 4);
    }
}
