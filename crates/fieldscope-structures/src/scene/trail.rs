//! Point history appended from a simulation thread and drawn by the renderer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use glam::DVec3;

use super::axes::AxisMap;

/// One stored trail point, in scene axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: DVec3,
    /// Whether a line joins this point to the one before it.
    pub connected: bool,
}

#[derive(Debug)]
struct TrailState {
    points: VecDeque<TrailPoint>,
    /// Zero keeps every point.
    maximum: usize,
    connected: bool,
    ghost: Option<TrailPoint>,
    axes: AxisMap,
}

impl Default for TrailState {
    fn default() -> Self {
        Self {
            points: VecDeque::new(),
            maximum: 0,
            connected: true,
            ghost: None,
            axes: AxisMap::default(),
        }
    }
}

/// Shared handle to a trail's points.
///
/// Clones refer to the same trail. Every call takes the lock, so a
/// [`snapshot`](Self::snapshot) never sees a half-applied append.
#[derive(Debug, Clone, Default)]
pub struct TrailHandle {
    state: Arc<Mutex<TrailState>>,
}

impl TrailHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TrailState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Appends a point, joined to the previous one if the trail is connected.
    pub fn add_point(&self, position: DVec3) {
        let mut state = self.lock();
        let connected = state.connected;
        state.push(position, connected);
    }

    /// Appends a point that starts a new, unjoined stroke.
    pub fn move_to_point(&self, position: DVec3) {
        self.lock().push(position, false);
    }

    /// Caps the number of stored points; the oldest are dropped first.
    /// Zero removes the cap.
    pub fn set_maximum_points(&self, maximum: usize) {
        let mut state = self.lock();
        state.maximum = maximum;
        state.trim();
    }

    #[must_use]
    pub fn maximum_points(&self) -> usize {
        self.lock().maximum
    }

    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// A transient point drawn after the stored ones, replaced on every call.
    pub fn set_ghost_point(&self, position: Option<DVec3>, connected: bool) {
        let mut state = self.lock();
        let axes = state.axes;
        state.ghost = position.map(|p| TrailPoint {
            position: axes.to_scene(p),
            connected,
        });
    }

    /// Removes every point, including the ghost.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.points.clear();
        state.ghost = None;
    }

    /// Number of stored points, not counting the ghost.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().points.is_empty()
    }

    /// Stored points followed by the ghost point, if any.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TrailPoint> {
        let state = self.lock();
        state.points.iter().copied().chain(state.ghost).collect()
    }

    /// Switches axis maps; stored points keep their user coordinates.
    pub(crate) fn set_axes(&self, axes: AxisMap) {
        let mut state = self.lock();
        let old = state.axes;
        let remap = |p: &mut TrailPoint| p.position = axes.to_scene(old.to_user(p.position));
        state.points.iter_mut().for_each(remap);
        if let Some(ghost) = state.ghost.as_mut() {
            remap(ghost);
        }
        state.axes = axes;
    }
}

impl TrailState {
    fn push(&mut self, position: DVec3, connected: bool) {
        let position = self.axes.to_scene(position);
        self.points.push_back(TrailPoint {
            position,
            connected,
        });
        self.trim();
    }

    fn trim(&mut self) {
        if self.maximum == 0 {
            return;
        }
        while self.points.len() > self.maximum {
            self.points.pop_front();
        }
    }
}
