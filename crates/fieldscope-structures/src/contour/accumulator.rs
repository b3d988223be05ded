//! Contour line accumulation.

use std::sync::{Mutex, MutexGuard};

use bytemuck::{Pod, Zeroable};
use glam::DVec2;

/// One contour line segment and the level it was traced at.
///
/// `repr(C)` and `Pod` so a snapshot can be handed to a GPU vertex buffer
/// with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineSegment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub level: f64,
}

impl LineSegment {
    #[must_use]
    pub fn new(from: DVec2, to: DVec2, level: f64) -> Self {
        Self {
            x0: from.x,
            y0: from.y,
            x1: to.x,
            y1: to.y,
            level,
        }
    }

    #[must_use]
    pub fn start(&self) -> DVec2 {
        DVec2::new(self.x0, self.y0)
    }

    #[must_use]
    pub fn end(&self) -> DVec2 {
        DVec2::new(self.x1, self.y1)
    }
}

/// Segment buffer shared between the pass that fills it and readers that draw it.
///
/// A pass holds the lock for its whole clear-and-repopulate phase, so a
/// concurrent [`snapshot`](Self::snapshot) sees either the previous pass or
/// the completed new one, never a partial list.
#[derive(Debug, Default)]
pub struct LineAccumulator {
    segments: Mutex<Vec<LineSegment>>,
}

/// Exclusive access to the accumulator for one draw pass.
pub struct AccumulatorPass<'a> {
    segments: MutexGuard<'a, Vec<LineSegment>>,
}

impl AccumulatorPass<'_> {
    pub fn add_line(&mut self, from: DVec2, to: DVec2, level: f64) {
        self.segments.push(LineSegment::new(from, to, level));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Copy of everything added so far in this pass.
    #[must_use]
    pub fn to_vec(&self) -> Vec<LineSegment> {
        self.segments.to_vec()
    }
}

impl LineAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LineSegment>> {
        // A panic mid-pass leaves a truncated but well-formed list.
        self.segments
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Clears the buffer and starts a new pass.
    pub fn begin_pass(&self) -> AccumulatorPass<'_> {
        let mut segments = self.lock();
        segments.clear();
        AccumulatorPass { segments }
    }

    /// Copy of the most recently completed segment list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LineSegment> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
