//! Per-cell contour tracing.
//!
//! A cell is the quadrilateral spanned by four neighbouring samples. Its
//! outline is held in eight slots that alternate corner / edge crossing:
//!
//! ```text
//!   slot 0 (v0) ---- slot 7 ---- slot 6 (v3)      top
//!      |                             |
//!    slot 1                        slot 5
//!      |                             |
//!   slot 2 (v1) ---- slot 3 ---- slot 4 (v2)      bottom
//! ```
//!
//! Levels are swept upwards. At each level a corner whose value lies below
//! the level drops out for good, and an edge with exactly one endpoint below
//! the level gets a crossing point. The surviving slots, read in order, are
//! the polygon of the band at and above the level; the crossings, read in
//! order, are the contour line at that level.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// One cell corner: world position plus the sample value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourVertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ContourVertex {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// How edge crossings are advanced from one level to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SweepStrategy {
    /// Add a per-edge increment cached at the first crossing. Requires levels
    /// to be swept in strictly increasing order.
    #[default]
    Incremental,
    /// Interpolate each crossing from the edge endpoints at every level.
    Recompute,
}

/// An evenly spaced, increasing sequence of levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSweep {
    pub start: f64,
    pub step: f64,
    pub count: usize,
}

/// Receives the output of a cell trace.
pub trait CellSink {
    /// The band polygon at level `index` (at least three points).
    fn polygon(&mut self, index: usize, points: &[DVec2]);

    /// A contour line segment at level `index`, whose value is `level`.
    fn segment(&mut self, index: usize, level: f64, from: DVec2, to: DVec2);
}

/// Collecting sink, mainly for inspection and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellTrace {
    pub polygons: Vec<(usize, Vec<DVec2>)>,
    pub segments: Vec<(usize, [DVec2; 2])>,
}

impl CellSink for CellTrace {
    fn polygon(&mut self, index: usize, points: &[DVec2]) {
        self.polygons.push((index, points.to_vec()));
    }

    fn segment(&mut self, index: usize, _level: f64, from: DVec2, to: DVec2) {
        self.segments.push((index, [from, to]));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    /// Edge slot with no crossing computed yet.
    Unset,
    /// Dropped out; stays out for all higher levels.
    Invalid,
    Valid(DVec2),
}

/// Edge `e` runs from corner `e` to corner `(e + 1) & 3`. Edges 0 and 2 are
/// vertical (the crossing moves along y), 1 and 3 horizontal (along x).
#[inline]
fn along_y(edge: usize) -> bool {
    edge & 1 == 0
}

#[inline]
fn coordinate(v: &ContourVertex, edge: usize) -> f64 {
    if along_y(edge) {
        v.y
    } else {
        v.x
    }
}

/// Linear crossing of level `z` on the edge `a → b`.
#[inline]
fn crossing(a: &ContourVertex, b: &ContourVertex, edge: usize, z: f64) -> f64 {
    (coordinate(b, edge) * (z - a.z) + coordinate(a, edge) * (b.z - z)) / (b.z - a.z)
}

#[inline]
fn crossing_point(a: &ContourVertex, edge: usize, t: f64) -> DVec2 {
    // Vertical edges keep the x of their start corner, horizontal ones its y.
    if along_y(edge) {
        DVec2::new(a.x, t)
    } else {
        DVec2::new(t, a.y)
    }
}

/// Traces one cell through a level sweep.
///
/// The sweep stops early once the band polygon has fewer than three points:
/// every corner has dropped out and nothing is left to fill at this or any
/// later level in the usual case.
pub fn trace_cell(
    corners: &[ContourVertex; 4],
    sweep: &LevelSweep,
    strategy: SweepStrategy,
    sink: &mut impl CellSink,
) {
    let mut slots = [
        Slot::Valid(corners[0].position()),
        Slot::Unset,
        Slot::Valid(corners[1].position()),
        Slot::Unset,
        Slot::Valid(corners[2].position()),
        Slot::Unset,
        Slot::Valid(corners[3].position()),
        Slot::Unset,
    ];
    let mut intersection = [0.0f64; 4];
    let mut delta = [0.0f64; 4];
    let mut polygon: Vec<DVec2> = Vec::with_capacity(8);
    let mut crossings: Vec<DVec2> = Vec::with_capacity(4);

    let mut z = sweep.start;
    for counter in 0..sweep.count {
        for edge in 0..4 {
            let index = 2 * edge + 1;
            let next = (edge + 1) & 3;
            let (a, b) = (&corners[edge], &corners[next]);

            if z > a.z {
                slots[index - 1] = Slot::Invalid;
                if z > b.z {
                    slots[(index + 1) & 7] = Slot::Invalid;
                    slots[index] = Slot::Invalid;
                }
            } else if z > b.z {
                slots[(index + 1) & 7] = Slot::Invalid;
            }

            match slots[index] {
                Slot::Invalid => {}
                Slot::Valid(_) => {
                    intersection[edge] = match strategy {
                        SweepStrategy::Incremental => intersection[edge] + delta[edge],
                        SweepStrategy::Recompute => crossing(a, b, edge, z),
                    };
                    slots[index] = Slot::Valid(crossing_point(a, edge, intersection[edge]));
                }
                Slot::Unset => {
                    if z > a.z || z > b.z {
                        let span = coordinate(b, edge) - coordinate(a, edge);
                        delta[edge] = span * sweep.step / (b.z - a.z);
                        intersection[edge] = crossing(a, b, edge, z);
                        slots[index] = Slot::Valid(crossing_point(a, edge, intersection[edge]));
                    }
                }
            }
        }

        polygon.clear();
        polygon.extend(slots.iter().filter_map(|slot| match slot {
            Slot::Valid(p) => Some(*p),
            _ => None,
        }));
        if polygon.len() >= 3 {
            sink.polygon(counter, &polygon);
        }

        crossings.clear();
        crossings.extend((1..8).step_by(2).filter_map(|i| match slots[i] {
            Slot::Valid(p) => Some(p),
            _ => None,
        }));
        for pair in crossings.windows(2) {
            sink.segment(counter, z, pair[0], pair[1]);
        }
        // Close the loop back to the first edge; two crossings are already one segment.
        if crossings.len() > 2 && matches!(slots[1], Slot::Valid(_)) {
            if let (Some(&last), Some(&first)) = (crossings.last(), crossings.first()) {
                sink.segment(counter, z, last, first);
            }
        }

        if polygon.len() < 3 {
            break;
        }
        z += sweep.step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldscope_core::polygon_area;

    /// The cell of the 2×2 grid `[[0, 10], [20, 30]]` over the unit square.
    fn example_cell() -> [ContourVertex; 4] {
        [
            ContourVertex::new(0.0, 1.0, 0.0),
            ContourVertex::new(0.0, 0.0, 10.0),
            ContourVertex::new(1.0, 0.0, 30.0),
            ContourVertex::new(1.0, 1.0, 20.0),
        ]
    }

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_single_level_bisects_cell() {
        let sweep = LevelSweep {
            start: 15.0,
            step: 1.0,
            count: 1,
        };
        let mut trace = CellTrace::default();
        trace_cell(&example_cell(), &sweep, SweepStrategy::Incremental, &mut trace);

        assert_eq!(trace.segments.len(), 1);
        let [a, b] = trace.segments[0].1;
        assert!(close(a, DVec2::new(0.25, 0.0)));
        assert!(close(b, DVec2::new(0.75, 1.0)));

        assert_eq!(trace.polygons.len(), 1);
        let area = polygon_area(&trace.polygons[0].1).abs();
        assert!((area - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_bands_split_example_cell_evenly() {
        // Levels 0, 15, 30: whole cell, upper band, degenerate corner.
        let sweep = LevelSweep {
            start: 0.0,
            step: 15.0,
            count: 3,
        };
        let mut trace = CellTrace::default();
        trace_cell(&example_cell(), &sweep, SweepStrategy::Incremental, &mut trace);

        let areas: Vec<f64> = trace
            .polygons
            .iter()
            .map(|(_, p)| polygon_area(p).abs())
            .collect();
        assert!((areas[0] - 1.0).abs() < 1e-9);
        assert!((areas[1] - 0.5).abs() < 1e-9);
        // Painted over each other: two visible bands of equal area.
        assert!(((areas[0] - areas[1]) - areas[1]).abs() < 1e-9);
    }

    #[test]
    fn test_flat_cell_has_no_crossings() {
        let corners = [
            ContourVertex::new(0.0, 1.0, 5.0),
            ContourVertex::new(0.0, 0.0, 5.0),
            ContourVertex::new(1.0, 0.0, 5.0),
            ContourVertex::new(1.0, 1.0, 5.0),
        ];
        let sweep = LevelSweep {
            start: 0.0,
            step: 1.0,
            count: 10,
        };
        let mut trace = CellTrace::default();
        trace_cell(&corners, &sweep, SweepStrategy::Incremental, &mut trace);
        assert!(trace.segments.is_empty());
        // Full cell for levels 0..=5, then the sweep stops.
        assert_eq!(trace.polygons.len(), 6);
        assert!(trace.polygons.iter().all(|(_, p)| p.len() == 4));
    }

    #[test]
    fn test_saddle_closes_loop() {
        let corners = [
            ContourVertex::new(0.0, 1.0, 1.0),
            ContourVertex::new(0.0, 0.0, 0.0),
            ContourVertex::new(1.0, 0.0, 1.0),
            ContourVertex::new(1.0, 1.0, 0.0),
        ];
        let sweep = LevelSweep {
            start: 0.5,
            step: 1.0,
            count: 1,
        };
        let mut trace = CellTrace::default();
        trace_cell(&corners, &sweep, SweepStrategy::Incremental, &mut trace);
        assert_eq!(trace.segments.len(), 4);
        let first = trace.segments[0].1[0];
        let last = trace.segments[3].1[1];
        assert!(close(first, last));
    }

    #[test]
    fn test_strategies_agree() {
        let corners = [
            ContourVertex::new(-1.0, 2.0, 0.3),
            ContourVertex::new(-1.0, 0.5, 7.9),
            ContourVertex::new(2.0, 0.5, 4.4),
            ContourVertex::new(2.0, 2.0, -2.5),
        ];
        let sweep = LevelSweep {
            start: -2.5,
            step: 10.4 / 13.0,
            count: 14,
        };
        let mut incremental = CellTrace::default();
        let mut recompute = CellTrace::default();
        trace_cell(&corners, &sweep, SweepStrategy::Incremental, &mut incremental);
        trace_cell(&corners, &sweep, SweepStrategy::Recompute, &mut recompute);

        assert_eq!(incremental.polygons.len(), recompute.polygons.len());
        assert_eq!(incremental.segments.len(), recompute.segments.len());
        for ((li, pi), (lr, pr)) in incremental.polygons.iter().zip(&recompute.polygons) {
            assert_eq!(li, lr);
            assert_eq!(pi.len(), pr.len());
            assert!(pi.iter().zip(pr).all(|(a, b)| close(*a, *b)));
        }
        for ((li, si), (lr, sr)) in incremental.segments.iter().zip(&recompute.segments) {
            assert_eq!(li, lr);
            assert!(close(si[0], sr[0]) && close(si[1], sr[1]));
        }
    }
}
