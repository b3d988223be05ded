//! Painter's-algorithm 3D scenes.
//!
//! A [`Scene`] owns its elements in an arena and hands out [`ElementId`]s.
//! Elements are tessellated into [`Tile`]s lazily: mutations only mark an
//! element's [`CacheState`], and the next [`Scene::sorted_tiles`] or
//! [`Scene::render`] rebuilds or reprojects exactly what went stale.

mod axes;
mod element;
mod primitive;
mod sort;
mod style;
mod trail;

pub use axes::{AxesMode, AxisMap};
pub use element::{CacheState, Element, SpaceFrame, Tile};
pub use primitive::{
    BoxShape, ConeShape, GroupShape, Primitive, ShapeTile, SphereShape, SpringShape,
    TetrahedronShape, TileKind,
};
pub use sort::back_to_front;
pub use style::{RelativePosition, Resolution, Style};
pub use trail::{TrailHandle, TrailPoint};

use fieldscope_core::{CoordinateSpace, DrawCommand, DrawList, FieldscopeError, Options, Result};
use fieldscope_render::{Camera, SceneBounds, Viewport};
use glam::{DVec2, DVec3};

/// Handle to an element of a [`Scene`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A camera and a forest of elements.
#[derive(Debug, Default)]
pub struct Scene {
    elements: Vec<Option<Element>>,
    roots: Vec<ElementId>,
    camera: Camera,
    /// Camera revision the cached projections were made with.
    projected_revision: Option<u64>,
    axes_mode: AxesMode,
    axes: AxisMap,
    preferred_bounds: Option<SceneBounds>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: &Options) -> Self {
        Self {
            camera: Camera::with_options(options),
            ..Self::default()
        }
    }

    fn insert(&mut self, mut element: Element, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        element.parent = parent;
        if element.axes() != self.axes {
            element.set_axes(self.axes);
        }
        self.elements.push(Some(element));
        id
    }

    /// Adds a top-level element.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = self.insert(element, None);
        self.roots.push(id);
        id
    }

    /// Adds an element as the last child of `group`.
    pub fn add_to_group(&mut self, group: ElementId, element: Element) -> Result<ElementId> {
        let len = self.elements.len();
        let parent = self
            .get(group)
            .ok_or_else(|| FieldscopeError::index("element", group.0, len))?;
        if !matches!(parent.primitive(), Primitive::Group(_)) {
            return Err(FieldscopeError::IllegalState(format!(
                "element {} is a {}, not a group",
                group.0,
                parent.primitive().name()
            )));
        }
        let id = self.insert(element, Some(group));
        if let Some(shape) = self.get_mut(group).and_then(Element::group_shape_mut) {
            shape.push(id);
        }
        Ok(id)
    }

    /// Removes an element together with all its descendants.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let element = self.elements.get_mut(id.0)?.take()?;
        match element.parent {
            Some(parent) => {
                if let Some(shape) = self.get_mut(parent).and_then(Element::group_shape_mut) {
                    shape.remove(id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        let mut pending = element.children().to_vec();
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.elements.get_mut(child.0).and_then(Option::take) {
                pending.extend_from_slice(removed.children());
            }
        }
        Some(element)
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Top-level elements in insertion order.
    #[must_use]
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Number of live elements, groups and their children included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (ElementId(i), e)))
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera changes are noticed through its revision on the next query.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Points the camera at the current scene bounds.
    pub fn reset_camera(&mut self) {
        let bounds = self.bounds();
        self.camera.reset(&bounds);
    }

    #[must_use]
    pub fn axes_mode(&self) -> AxesMode {
        self.axes_mode
    }

    pub fn set_axes_mode(&mut self, mode: AxesMode) {
        self.set_axis_map(mode.into());
        self.axes_mode = mode;
    }

    /// Installs a custom map, e.g. a mode with a mirrored axis.
    pub fn set_axis_map(&mut self, axes: AxisMap) {
        self.axes = axes;
        for element in self.elements.iter_mut().flatten() {
            element.set_axes(axes);
        }
    }

    /// Bounds used for camera placement and viewport scale instead of the
    /// computed ones.
    pub fn set_preferred_bounds(&mut self, bounds: Option<SceneBounds>) {
        self.preferred_bounds = bounds;
    }

    /// Composed placement of `id` and its ancestors.
    #[must_use]
    pub fn space_frame(&self, id: ElementId) -> Option<SpaceFrame> {
        let element = self.get(id)?;
        let mut ancestors = Vec::new();
        let mut next = element.parent;
        while let Some(parent) = next.and_then(|p| self.get(p)) {
            ancestors.push(parent.placement());
            next = parent.parent;
        }
        Some(SpaceFrame::new(element.placement(), ancestors))
    }

    /// Visible only if the element and every ancestor are.
    #[must_use]
    pub fn is_really_visible(&self, id: ElementId) -> bool {
        let mut next = Some(id);
        while let Some(element) = next.and_then(|i| self.get(i)) {
            if !element.is_visible() {
                return false;
            }
            next = element.parent;
        }
        next.is_none()
    }

    /// Whether drawing `id` would differ from its cached tiles: the element,
    /// an ancestor or a descendant changed, or the camera moved.
    #[must_use]
    pub fn has_changed(&self, id: ElementId) -> bool {
        let camera_moved = self.projected_revision != Some(self.camera.revision());
        camera_moved || self.ancestor_changed(id) || self.subtree_changed(id)
    }

    fn ancestor_changed(&self, id: ElementId) -> bool {
        let mut next = self.get(id).and_then(Element::parent);
        while let Some(element) = next.and_then(|i| self.get(i)) {
            if element.cache_state() == CacheState::NeedsRecompute {
                return true;
            }
            next = element.parent;
        }
        false
    }

    fn subtree_changed(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|e| {
            e.cache_state() != CacheState::Clean
                || matches!(e.primitive(), Primitive::Trail(_))
                || e.children().iter().any(|c| self.subtree_changed(*c))
        })
    }

    /// World-space box around every visible element.
    #[must_use]
    pub fn bounds(&self) -> SceneBounds {
        if let Some(bounds) = self.preferred_bounds {
            return bounds;
        }
        let mut extent: Option<(DVec3, DVec3)> = None;
        for root in &self.roots {
            self.extend_bounds(*root, &mut extent);
        }
        extent.map_or_else(SceneBounds::default, |(min, max)| SceneBounds::new(min, max))
    }

    fn extend_bounds(&self, id: ElementId, extent: &mut Option<(DVec3, DVec3)>) {
        let Some(element) = self.get(id).filter(|e| e.is_visible()) else {
            return;
        };
        if let Primitive::Group(group) = element.primitive() {
            for child in group.children() {
                self.extend_bounds(*child, extent);
            }
            return;
        }
        let Some(frame) = self.space_frame(id) else {
            return;
        };
        let points: Vec<DVec3> = match element.primitive() {
            Primitive::Trail(handle) => handle.snapshot().into_iter().map(|p| p.position).collect(),
            primitive => {
                let (lo, hi) = primitive.unit_extent(element.style().relative_position);
                (0..8)
                    .map(|i| {
                        DVec3::new(
                            if i & 1 == 0 { lo.x } else { hi.x },
                            if i & 2 == 0 { lo.y } else { hi.y },
                            if i & 4 == 0 { lo.z } else { hi.z },
                        )
                    })
                    .collect()
            }
        };
        for p in points.into_iter().map(|p| frame.size_and_to_space(p)) {
            if p.is_finite() {
                *extent = Some(extent.map_or((p, p), |(lo, hi)| (lo.min(p), hi.max(p))));
            }
        }
    }

    /// Brings every visible element's tiles up to date.
    fn refresh(&mut self) {
        let revision = self.camera.revision();
        if self.projected_revision != Some(revision) {
            for element in self.elements.iter_mut().flatten() {
                if element.cache_state() == CacheState::Clean {
                    element.set_cache_state(CacheState::NeedsReproject);
                }
            }
            self.projected_revision = Some(revision);
        }
        let mut rebuilt = 0usize;
        for root in self.roots.clone() {
            self.refresh_subtree(root, false, &mut rebuilt);
        }
        if rebuilt > 0 {
            log::debug!("scene: re-tessellated {rebuilt} elements");
        }
    }

    fn refresh_subtree(&mut self, id: ElementId, parent_changed: bool, rebuilt: &mut usize) {
        let Some(element) = self.get(id) else {
            return;
        };
        if !element.is_visible() {
            return;
        }
        let changed = parent_changed || element.cache_state() == CacheState::NeedsRecompute;
        let children = element.children().to_vec();
        let is_group = matches!(element.primitive(), Primitive::Group(_));
        let is_trail = matches!(element.primitive(), Primitive::Trail(_));

        if is_group {
            for child in children {
                self.refresh_subtree(child, changed, rebuilt);
            }
            if let Some(group) = self.get_mut(id) {
                group.set_cache_state(CacheState::Clean);
            }
            return;
        }

        // Trails are appended to from other threads, so they are rebuilt on
        // every query.
        let frame = (changed || is_trail).then(|| self.space_frame(id)).flatten();
        let Some(Some(element)) = self.elements.get_mut(id.0) else {
            return;
        };
        if let Some(frame) = frame {
            element.rebuild_tiles(id, &frame);
            *rebuilt += usize::from(!is_trail);
        }
        if element.cache_state() != CacheState::Clean || is_trail || changed {
            element.project_tiles(&self.camera);
        }
    }

    fn collect_tiles<'a>(&'a self, id: ElementId, out: &mut Vec<&'a Tile>) {
        let Some(element) = self.get(id).filter(|e| e.is_visible()) else {
            return;
        };
        out.extend(element.tiles());
        for child in element.children() {
            self.collect_tiles(*child, out);
        }
    }

    fn ordered_tiles(&self) -> Vec<&Tile> {
        let mut tiles = Vec::new();
        for root in &self.roots {
            self.collect_tiles(*root, &mut tiles);
        }
        back_to_front(tiles)
    }

    /// Every visible tile, farthest first, with NaN-depth tiles left out.
    pub fn sorted_tiles(&mut self) -> Vec<&Tile> {
        self.refresh();
        self.ordered_tiles()
    }

    /// Paints the scene back to front into a screen-space draw list.
    pub fn render(&mut self, viewport: &Viewport) -> DrawList {
        self.refresh();
        let scale = viewport.scale(&self.camera, &self.bounds());
        let mut list = DrawList::new(CoordinateSpace::Screen);
        let tiles = self.ordered_tiles();
        let count = tiles.len();
        for tile in tiles {
            let Some(style) = self.get(tile.element).map(Element::style) else {
                continue;
            };
            let points: Vec<DVec2> = tile
                .projected
                .iter()
                .map(|p| viewport.to_pixel(*p, scale).truncate())
                .collect();
            match tile.kind {
                TileKind::Polygon => {
                    if style.draw_fill {
                        list.push(DrawCommand::FillPolygon {
                            points: points.clone(),
                            color: style.fill_color,
                        });
                    }
                    if style.draw_lines {
                        list.push(DrawCommand::StrokePolygon {
                            points,
                            color: style.line_color,
                        });
                    }
                }
                TileKind::Line => list.push(DrawCommand::StrokePolyline {
                    points,
                    color: style.line_color,
                }),
                TileKind::Point => {
                    if let Some(at) = points.first() {
                        list.push(DrawCommand::Marker {
                            at: *at,
                            size: DVec2::splat(f64::from(style.line_width)),
                            color: style.line_color,
                        });
                    }
                }
            }
        }
        log::debug!("scene: {count} tiles -> {} draw commands", list.len());
        list
    }
}
