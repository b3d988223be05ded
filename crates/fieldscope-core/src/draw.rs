//! Draw-command lists.
//!
//! Plots and scenes never touch a window-system graphics context. They append
//! [`DrawCommand`]s to a [`DrawList`] which a host renderer replays in order.

use glam::{DVec2, Vec4};
use serde::{Deserialize, Serialize};

/// Coordinate space the points of a [`DrawList`] are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// World units of the plotted data (y up).
    #[default]
    World,
    /// Pixels of the target surface (y down).
    Screen,
}

/// A single drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Fill the whole target with one color.
    FillViewport { color: Vec4 },
    /// Fill a closed polygon.
    FillPolygon { points: Vec<DVec2>, color: Vec4 },
    /// Outline a closed polygon.
    StrokePolygon { points: Vec<DVec2>, color: Vec4 },
    /// Draw an open polyline.
    StrokePolyline { points: Vec<DVec2>, color: Vec4 },
    /// Draw a batch of independent line segments.
    StrokeSegments {
        segments: Vec<[DVec2; 2]>,
        color: Vec4,
    },
    /// Outline an axis-aligned rectangle.
    StrokeRect { min: DVec2, max: DVec2, color: Vec4 },
    /// Draw a filled marker of the given size centred on a point.
    Marker { at: DVec2, size: DVec2, color: Vec4 },
}

/// An ordered list of draw commands; later commands paint over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    space: CoordinateSpace,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Creates an empty list in the given coordinate space.
    #[must_use]
    pub fn new(space: CoordinateSpace) -> Self {
        Self {
            space,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCommand> {
        self.commands.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Iterates over the filled polygons with their colors.
    pub fn filled_polygons(&self) -> impl Iterator<Item = (&[DVec2], Vec4)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillPolygon { points, color } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Signed area of a closed polygon (positive when counter-clockwise in a y-up frame).
#[must_use]
pub fn polygon_area(points: &[DVec2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_filter() {
        let mut list = DrawList::new(CoordinateSpace::Screen);
        list.push(DrawCommand::FillViewport { color: Vec4::ONE });
        list.push(DrawCommand::FillPolygon {
            points: vec![DVec2::ZERO, DVec2::X, DVec2::Y],
            color: Vec4::ZERO,
        });
        assert_eq!(list.len(), 2);
        assert_eq!(list.space(), CoordinateSpace::Screen);
        assert_eq!(list.filled_polygons().count(), 1);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_polygon_area() {
        let square = [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y];
        assert!((polygon_area(&square) - 1.0).abs() < 1e-12);
        assert_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn test_serializes() {
        let mut list = DrawList::default();
        list.push(DrawCommand::StrokeRect {
            min: DVec2::ZERO,
            max: DVec2::ONE,
            color: Vec4::ONE,
        });
        let json = serde_json::to_string(&list).unwrap();
        let back: DrawList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }
}
