//! Scene elements, their placement and their cached tiles.

#![allow(clippy::cast_precision_loss)]

use fieldscope_render::Camera;
use glam::{DQuat, DVec3};

use super::axes::AxisMap;
use super::primitive::{GroupShape, Primitive, TileKind};
use super::style::Style;
use super::trail::TrailHandle;
use super::ElementId;

/// How much of an element's cached tiles is still valid.
///
/// Mutations only move the state; the work happens the next time the scene
/// is queried, however many mutations came in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    /// Tiles and projections are current.
    Clean,
    /// Geometry changed: tessellate again, then project.
    #[default]
    NeedsRecompute,
    /// Only the camera moved: project the existing corners again.
    NeedsReproject,
}

/// A drawable piece of an element placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub element: ElementId,
    /// Position among the element's tiles.
    pub index: usize,
    pub kind: TileKind,
    /// World coordinates.
    pub corners: Vec<DVec3>,
    /// Camera projection of each corner, `(x, y, depth)`.
    pub projected: Vec<DVec3>,
    /// Sort key: projected depth of the centroid times the element's depth
    /// factor. NaN keeps the tile out of the draw order.
    pub depth: f64,
}

impl Tile {
    #[must_use]
    pub fn centroid(&self) -> DVec3 {
        if self.corners.is_empty() {
            return DVec3::NAN;
        }
        self.corners.iter().copied().sum::<DVec3>() / self.corners.len() as f64
    }
}

/// Scale, rotation and translation of one element relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Placement {
    size: DVec3,
    rotation: Option<DQuat>,
    position: DVec3,
}

impl Placement {
    fn place(&self, v: DVec3) -> DVec3 {
        self.rotation.map_or(v, |q| q * v) + self.position
    }

    fn unplace(&self, p: DVec3) -> DVec3 {
        let v = p - self.position;
        self.rotation.map_or(v, |q| q.inverse() * v)
    }
}

/// An element's placement composed with those of all its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceFrame {
    own: Placement,
    /// Nearest ancestor first.
    ancestors: Vec<Placement>,
}

impl SpaceFrame {
    pub(crate) fn new(own: Placement, ancestors: Vec<Placement>) -> Self {
        Self { own, ancestors }
    }

    /// Body coordinates (already scaled) to world coordinates. Each ancestor
    /// scales by its size before applying its own rotation and position.
    #[must_use]
    pub fn to_space(&self, v: DVec3) -> DVec3 {
        self.ancestors
            .iter()
            .fold(self.own.place(v), |p, a| a.place(p * a.size))
    }

    /// Unit body coordinates to world coordinates, scaling by the element's
    /// own size first.
    #[must_use]
    pub fn size_and_to_space(&self, v: DVec3) -> DVec3 {
        self.to_space(v * self.own.size)
    }

    /// Inverse of [`to_space`](Self::to_space). Axes along which an
    /// ancestor has zero size are left unscaled.
    #[must_use]
    pub fn to_body(&self, p: DVec3) -> DVec3 {
        let p = self.ancestors.iter().rev().fold(p, |p, a| {
            let v = a.unplace(p);
            DVec3::select(a.size.cmpeq(DVec3::ZERO), v, v / a.size)
        });
        self.own.unplace(p)
    }
}

/// A drawable object in a [`Scene`](super::Scene).
///
/// Coordinates passed to and returned from the setters are in user axes;
/// the element stores them in scene axes according to its [`AxisMap`].
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    primitive: Primitive,
    position: DVec3,
    size: DVec3,
    visible: bool,
    rotation: Option<DQuat>,
    style: Style,
    axes: AxisMap,
    pub(crate) parent: Option<ElementId>,
    state: CacheState,
    tiles: Vec<Tile>,
}

impl From<Primitive> for Element {
    fn from(primitive: Primitive) -> Self {
        Self::new(primitive)
    }
}

impl Element {
    /// Creates a unit-sized element at the origin.
    #[must_use]
    pub fn new(primitive: Primitive) -> Self {
        Self {
            name: primitive.name().to_string(),
            primitive,
            position: DVec3::ZERO,
            size: DVec3::ONE,
            visible: true,
            rotation: None,
            style: Style::default(),
            axes: AxisMap::default(),
            parent: None,
            state: CacheState::NeedsRecompute,
            tiles: Vec::new(),
        }
    }

    /// An empty group; add children with [`Scene::add_to_group`](super::Scene::add_to_group).
    #[must_use]
    pub fn group() -> Self {
        Self::new(Primitive::Group(GroupShape::default()))
    }

    /// A trail with a fresh handle, retrievable via [`trail_handle`](Self::trail_handle).
    #[must_use]
    pub fn trail() -> Self {
        Self::new(Primitive::Trail(TrailHandle::new()))
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_xyz(mut self, position: DVec3) -> Self {
        self.set_xyz(position);
        self
    }

    #[must_use]
    pub fn with_size_xyz(mut self, size: DVec3) -> Self {
        self.set_size_xyz(size);
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn changed(&mut self) {
        self.state = CacheState::NeedsRecompute;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    /// Mutable access to the shape parameters; marks the element changed.
    pub fn primitive_mut(&mut self) -> &mut Primitive {
        self.changed();
        &mut self.primitive
    }

    pub(crate) fn group_shape_mut(&mut self) -> Option<&mut GroupShape> {
        match &mut self.primitive {
            Primitive::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Child ids when this element is a group.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        match &self.primitive {
            Primitive::Group(group) => group.children(),
            _ => &[],
        }
    }

    #[must_use]
    pub fn trail_handle(&self) -> Option<&TrailHandle> {
        match &self.primitive {
            Primitive::Trail(handle) => Some(handle),
            _ => None,
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn set_xyz(&mut self, position: DVec3) {
        self.position = self.axes.to_scene(position);
        self.changed();
    }

    /// Position in user axes.
    #[must_use]
    pub fn xyz(&self) -> DVec3 {
        self.axes.to_user(self.position)
    }

    pub fn set_x(&mut self, x: f64) {
        let mut p = self.xyz();
        p.x = x;
        self.set_xyz(p);
    }

    pub fn set_y(&mut self, y: f64) {
        let mut p = self.xyz();
        p.y = y;
        self.set_xyz(p);
    }

    pub fn set_z(&mut self, z: f64) {
        let mut p = self.xyz();
        p.z = z;
        self.set_xyz(p);
    }

    pub fn set_size_xyz(&mut self, size: DVec3) {
        self.size = self.axes.extent_to_scene(size);
        self.changed();
    }

    /// Size in user axes.
    #[must_use]
    pub fn size_xyz(&self) -> DVec3 {
        self.axes.extent_to_user(self.size)
    }

    /// Position in scene axes.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Size in scene axes.
    #[must_use]
    pub fn size(&self) -> DVec3 {
        self.size
    }

    /// Length of the size vector.
    #[must_use]
    pub fn diagonal_size(&self) -> f64 {
        self.size.length()
    }

    /// Hidden elements and all their descendants produce no tiles.
    pub fn set_visible(&mut self, visible: bool) {
        if visible != self.visible {
            self.visible = visible;
            self.changed();
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Rotation applied about the element's position, given in user axes.
    pub fn set_transformation(&mut self, rotation: Option<DQuat>) {
        self.rotation = rotation.map(|q| self.axes.rotation_to_scene(q.normalize()));
        self.changed();
    }

    #[must_use]
    pub fn transformation(&self) -> Option<DQuat> {
        self.rotation.map(|q| self.axes.rotation_to_user(q))
    }

    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Mutable style access; marks the element changed.
    pub fn style_mut(&mut self) -> &mut Style {
        self.changed();
        &mut self.style
    }

    #[must_use]
    pub fn axes(&self) -> AxisMap {
        self.axes
    }

    /// Switches axis maps keeping every user-facing coordinate.
    pub(crate) fn set_axes(&mut self, axes: AxisMap) {
        let position = self.xyz();
        let size = self.size_xyz();
        let rotation = self.transformation();
        self.axes = axes;
        self.position = axes.to_scene(position);
        self.size = axes.extent_to_scene(size);
        self.rotation = rotation.map(|q| axes.rotation_to_scene(q));
        if let Primitive::Trail(handle) = &self.primitive {
            handle.set_axes(axes);
        }
        self.changed();
    }

    #[must_use]
    pub fn cache_state(&self) -> CacheState {
        self.state
    }

    pub(crate) fn set_cache_state(&mut self, state: CacheState) {
        self.state = state;
    }

    /// Tiles from the most recent scene query.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn placement(&self) -> Placement {
        Placement {
            size: self.size,
            rotation: self.rotation,
            position: self.position,
        }
    }

    /// Tessellates again and places the tiles in the world.
    pub(crate) fn rebuild_tiles(&mut self, id: ElementId, frame: &SpaceFrame) {
        self.tiles = self
            .primitive
            .shape_tiles(&self.style, self.size)
            .into_iter()
            .enumerate()
            .map(|(index, shape)| Tile {
                element: id,
                index,
                kind: shape.kind,
                corners: shape.points.into_iter().map(|p| frame.to_space(p)).collect(),
                projected: Vec::new(),
                depth: f64::NAN,
            })
            .collect();
    }

    pub(crate) fn project_tiles(&mut self, camera: &Camera) {
        let factor = self.style.depth_factor;
        for tile in &mut self.tiles {
            tile.projected = tile.corners.iter().map(|p| camera.project(*p)).collect();
            tile.depth = camera.project(tile.centroid()).z * factor;
        }
        self.state = CacheState::Clean;
    }
}
