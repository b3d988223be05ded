//! Shapes a scene element can take and their tessellation into tiles.
//!
//! Every generator works in the element's body frame, scaled by its size:
//! solid shapes span `[-0.5, 0.5]` along each axis before scaling, segments
//! and springs run from the origin to `size`. The scene then moves the
//! points through the element's rotation, position and parent chain.

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::style::{RelativePosition, Resolution, Style};
use super::trail::TrailHandle;
use super::ElementId;

/// What a tile draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// A closed, possibly filled polygon.
    Polygon,
    /// A single line segment.
    Line,
    /// A single point marker.
    Point,
}

/// A tile before it is placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTile {
    pub kind: TileKind,
    pub points: Vec<DVec3>,
}

impl ShapeTile {
    fn polygon(points: Vec<DVec3>) -> Self {
        Self {
            kind: TileKind::Polygon,
            points,
        }
    }

    fn line(from: DVec3, to: DVec3) -> Self {
        Self {
            kind: TileKind::Line,
            points: vec![from, to],
        }
    }

    fn point(at: DVec3) -> Self {
        Self {
            kind: TileKind::Point,
            points: vec![at],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub closed_top: bool,
    pub closed_bottom: bool,
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            closed_top: true,
            closed_bottom: true,
        }
    }
}

/// A cone with its base at `z = -0.5` and apex at `z = 0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeShape {
    /// Start of the swept angle, degrees.
    pub min_angle: f64,
    /// End of the swept angle, degrees; at most 360 past `min_angle`.
    pub max_angle: f64,
    /// Height (world units, along the element's z size) at which the cone is
    /// cut off. `None` draws the full cone.
    pub truncation: Option<f64>,
    pub closed_top: bool,
    pub closed_bottom: bool,
    pub closed_left: bool,
    pub closed_right: bool,
}

impl Default for ConeShape {
    fn default() -> Self {
        Self {
            min_angle: 0.0,
            max_angle: 360.0,
            truncation: None,
            closed_top: true,
            closed_bottom: true,
            closed_left: true,
            closed_right: true,
        }
    }
}

/// An ellipsoid, optionally restricted to a longitude/latitude patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereShape {
    /// Longitude range, degrees.
    pub min_u: f64,
    pub max_u: f64,
    /// Latitude range, degrees within `[-90, 90]`.
    pub min_v: f64,
    pub max_v: f64,
    pub closed_top: bool,
    pub closed_bottom: bool,
    pub closed_left: bool,
    pub closed_right: bool,
}

impl Default for SphereShape {
    fn default() -> Self {
        Self {
            min_u: 0.0,
            max_u: 360.0,
            min_v: -90.0,
            max_v: 90.0,
            closed_top: true,
            closed_bottom: true,
            closed_left: true,
            closed_right: true,
        }
    }
}

/// A helix along the element's size vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringShape {
    pub radius: f64,
}

impl Default for SpringShape {
    fn default() -> Self {
        Self { radius: 0.1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TetrahedronShape {
    /// Height (world units, along the element's z size) at which the apex is
    /// cut off. `None` draws the full tetrahedron.
    pub truncation: Option<f64>,
    pub closed_top: bool,
    pub closed_bottom: bool,
}

impl Default for TetrahedronShape {
    fn default() -> Self {
        Self {
            truncation: None,
            closed_top: true,
            closed_bottom: true,
        }
    }
}

/// Children of a group element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupShape {
    children: Vec<ElementId>,
}

impl GroupShape {
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub(crate) fn push(&mut self, id: ElementId) {
        self.children.push(id);
    }

    pub(crate) fn remove(&mut self, id: ElementId) {
        self.children.retain(|c| *c != id);
    }
}

/// The shape of a scene element.
#[derive(Debug, Clone)]
pub enum Primitive {
    Box(BoxShape),
    Cone(ConeShape),
    Sphere(SphereShape),
    Segment,
    Spring(SpringShape),
    Tetrahedron(TetrahedronShape),
    Trail(TrailHandle),
    Group(GroupShape),
}

impl Primitive {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Box(_) => "Box",
            Primitive::Cone(_) => "Cone",
            Primitive::Sphere(_) => "Sphere",
            Primitive::Segment => "Segment",
            Primitive::Spring(_) => "Spring",
            Primitive::Tetrahedron(_) => "Tetrahedron",
            Primitive::Trail(_) => "Trail",
            Primitive::Group(_) => "Group",
        }
    }

    /// Tessellation used when the style does not set one.
    #[must_use]
    pub fn default_resolution(&self) -> Option<Resolution> {
        match self {
            Primitive::Box(_) => Some(Resolution::Divisions(3, 3, 3)),
            Primitive::Cone(_) => Some(Resolution::Divisions(3, 12, 5)),
            Primitive::Sphere(_) => Some(Resolution::Divisions(3, 12, 12)),
            Primitive::Spring(_) => Some(Resolution::Divisions(8, 15, 1)),
            _ => None,
        }
    }

    /// Body-frame corners of the volume the element occupies, before scaling.
    pub(crate) fn unit_extent(&self, relative: RelativePosition) -> (DVec3, DVec3) {
        match self {
            Primitive::Segment if relative == RelativePosition::Centered => {
                (DVec3::splat(-0.5), DVec3::splat(0.5))
            }
            Primitive::Segment | Primitive::Spring(_) => (DVec3::ZERO, DVec3::ONE),
            _ => (DVec3::splat(-0.5), DVec3::splat(0.5)),
        }
    }

    /// Tessellates the shape. Points are in the body frame, scaled by `size`.
    ///
    /// Groups yield nothing; their children are tiled separately.
    #[must_use]
    pub fn shape_tiles(&self, style: &Style, size: DVec3) -> Vec<ShapeTile> {
        let resolution = style.resolution.or_else(|| self.default_resolution());
        match self {
            Primitive::Box(shape) => box_tiles(shape, resolution, size),
            Primitive::Cone(shape) => cone_tiles(shape, resolution, size),
            Primitive::Sphere(shape) => sphere_tiles(shape, resolution, size),
            Primitive::Segment => segment_tiles(style.relative_position, resolution, size),
            Primitive::Spring(shape) => spring_tiles(shape, resolution, size),
            Primitive::Tetrahedron(shape) => tetrahedron_tiles(shape, size),
            Primitive::Trail(handle) => trail_tiles(handle, size),
            Primitive::Group(_) => Vec::new(),
        }
    }
}

/// Division counts along three shape directions whose world lengths are given.
fn divisions(resolution: Option<Resolution>, lengths: DVec3) -> [usize; 3] {
    match resolution {
        Some(Resolution::Divisions(a, b, c)) => [a.max(1), b.max(1), c.max(1)],
        Some(Resolution::MaxLength(len)) => [
            Resolution::pieces(len, lengths.x),
            Resolution::pieces(len, lengths.y),
            Resolution::pieces(len, lengths.z),
        ],
        None => [1, 1, 1],
    }
}

/// Quads over a parametric patch `f(s, t)`, `(s, t)` in the unit square.
fn patch(n1: usize, n2: usize, f: impl Fn(f64, f64) -> DVec3, tiles: &mut Vec<ShapeTile>) {
    let (d1, d2) = (n1 as f64, n2 as f64);
    for i in 0..n1 {
        let (s0, s1) = (i as f64 / d1, (i + 1) as f64 / d1);
        for j in 0..n2 {
            let (t0, t1) = (j as f64 / d2, (j + 1) as f64 / d2);
            tiles.push(ShapeTile::polygon(vec![
                f(s0, t0),
                f(s1, t0),
                f(s1, t1),
                f(s0, t1),
            ]));
        }
    }
}

/// Start and end of an angular sweep, the span capped at `limit` degrees.
fn sweep(from: f64, to: f64, limit: f64) -> (f64, f64) {
    if (to - from).abs() > limit {
        (from, from + limit.copysign(to - from))
    } else {
        (from, to)
    }
}

/// Fraction of the full height kept after cutting at `truncation`.
fn height_fraction(truncation: Option<f64>, size_z: f64) -> f64 {
    match truncation {
        Some(h) if h >= 0.0 && size_z != 0.0 => (h / size_z.abs()).min(1.0),
        _ => 1.0,
    }
}

fn box_tiles(shape: &BoxShape, resolution: Option<Resolution>, size: DVec3) -> Vec<ShapeTile> {
    let [nx, ny, nz] = divisions(resolution, size);
    let at = |x: f64, y: f64, z: f64| (DVec3::new(x, y, z) - 0.5) * size;
    let mut tiles = Vec::new();
    for (closed, z) in [(shape.closed_bottom, 0.0), (shape.closed_top, 1.0)] {
        if closed {
            patch(nx, ny, |s, t| at(s, t, z), &mut tiles);
        }
    }
    for y in [0.0, 1.0] {
        patch(nx, nz, |s, t| at(s, y, t), &mut tiles);
    }
    for x in [0.0, 1.0] {
        patch(ny, nz, |s, t| at(x, s, t), &mut tiles);
    }
    tiles
}

fn cone_tiles(shape: &ConeShape, resolution: Option<Resolution>, size: DVec3) -> Vec<ShapeTile> {
    let width = size.x.abs().max(size.y.abs());
    let [nr, nu, nz] = divisions(
        resolution,
        DVec3::new(0.5 * width, std::f64::consts::PI * width, size.z),
    );
    let (a1, a2) = sweep(shape.min_angle, shape.max_angle, 360.0);
    let full_turn = (a2 - a1).abs() >= 360.0;
    let h = height_fraction(shape.truncation, size.z);

    let angle = |s: f64| (a1 + s * (a2 - a1)).to_radians();
    let z_at = |t: f64| -0.5 + h * t;
    let radius = |z: f64| 0.5 * (0.5 - z);
    let at = |rho: f64, theta: f64, z: f64| {
        DVec3::new(rho * theta.cos(), rho * theta.sin(), z) * size
    };

    let mut tiles = Vec::new();
    patch(
        nu,
        nz,
        |s, t| {
            let z = z_at(t);
            at(radius(z), angle(s), z)
        },
        &mut tiles,
    );
    if shape.closed_bottom {
        patch(nu, nr, |s, t| at(0.5 * t, angle(s), -0.5), &mut tiles);
    }
    if shape.closed_top && h < 1.0 {
        let z = z_at(1.0);
        patch(nu, nr, |s, t| at(radius(z) * t, angle(s), z), &mut tiles);
    }
    if !full_turn {
        for (closed, theta) in [
            (shape.closed_left, a1.to_radians()),
            (shape.closed_right, a2.to_radians()),
        ] {
            if closed {
                patch(
                    nr,
                    nz,
                    |s, t| {
                        let z = z_at(t);
                        at(radius(z) * s, theta, z)
                    },
                    &mut tiles,
                );
            }
        }
    }
    tiles
}

fn sphere_tiles(shape: &SphereShape, resolution: Option<Resolution>, size: DVec3) -> Vec<ShapeTile> {
    let width = size.x.abs().max(size.y.abs());
    let [nr, nu, nv] = divisions(
        resolution,
        DVec3::new(
            0.5 * width,
            std::f64::consts::PI * width,
            std::f64::consts::FRAC_PI_2 * size.z,
        ),
    );
    let (u1, u2) = sweep(shape.min_u, shape.max_u, 360.0);
    let v1 = shape.min_v.clamp(-90.0, 90.0);
    let v2 = shape.max_v.clamp(-90.0, 90.0);
    let full_turn = (u2 - u1).abs() >= 360.0;

    let u_at = |s: f64| (u1 + s * (u2 - u1)).to_radians();
    let v_at = |t: f64| (v1 + t * (v2 - v1)).to_radians();
    let surface = |u: f64, v: f64| DVec3::new(v.cos() * u.cos(), v.cos() * u.sin(), v.sin()) * 0.5;
    // Shrinks a surface point horizontally towards the z axis.
    let toward_axis = |p: DVec3, f: f64| DVec3::new(p.x * f, p.y * f, p.z);

    let mut tiles = Vec::new();
    patch(nu, nv, |s, t| surface(u_at(s), v_at(t)) * size, &mut tiles);
    if shape.closed_bottom && v1 > -90.0 {
        let v = v1.to_radians();
        patch(
            nu,
            nr,
            |s, t| toward_axis(surface(u_at(s), v), t) * size,
            &mut tiles,
        );
    }
    if shape.closed_top && v2 < 90.0 {
        let v = v2.to_radians();
        patch(
            nu,
            nr,
            |s, t| toward_axis(surface(u_at(s), v), t) * size,
            &mut tiles,
        );
    }
    if !full_turn {
        for (closed, u) in [
            (shape.closed_left, u1.to_radians()),
            (shape.closed_right, u2.to_radians()),
        ] {
            if closed {
                patch(
                    nr,
                    nv,
                    |s, t| toward_axis(surface(u, v_at(t)), s) * size,
                    &mut tiles,
                );
            }
        }
    }
    tiles
}

fn segment_tiles(
    relative: RelativePosition,
    resolution: Option<Resolution>,
    size: DVec3,
) -> Vec<ShapeTile> {
    let n = match resolution {
        Some(Resolution::Divisions(n, _, _)) => n.max(1),
        Some(Resolution::MaxLength(len)) => Resolution::pieces(len, size.length()),
        None => 1,
    };
    let (first, last) = match relative {
        RelativePosition::NorthEast => (0.0, 1.0),
        RelativePosition::Centered => (-0.5, 0.5),
        RelativePosition::SouthWest => (1.0, 0.0),
    };
    let at = |i: usize| DVec3::splat(first + (last - first) * i as f64 / n as f64) * size;
    (0..n).map(|i| ShapeTile::line(at(i), at(i + 1))).collect()
}

fn spring_tiles(shape: &SpringShape, resolution: Option<Resolution>, size: DVec3) -> Vec<ShapeTile> {
    let (loops, per_loop) = match resolution {
        Some(Resolution::Divisions(loops, per_loop, _)) => (loops, per_loop.max(1)),
        _ => (8, 15),
    };
    let segments = loops * per_loop + 3;
    let axis = size.normalize_or_zero();
    let u1 = if axis == DVec3::ZERO {
        DVec3::X
    } else {
        axis.any_orthonormal_vector()
    };
    let u2 = size.cross(u1).normalize_or_zero();
    let delta = std::f64::consts::TAU / per_loop as f64;
    let pre = per_loop / 2;

    let points: Vec<DVec3> = (0..=segments)
        .map(|i| {
            // Coil radius ramps in over the first loop and out over the last.
            let k = if i < pre {
                0
            } else if i < per_loop {
                i - pre
            } else if i > segments.saturating_sub(pre) {
                0
            } else if i > segments.saturating_sub(per_loop) {
                segments - i - pre
            } else {
                pre
            };
            let axial = size * (i as f64 / segments as f64);
            if pre == 0 {
                return axial;
            }
            let angle = i as f64 * delta;
            let radial = (u1 * angle.cos() + u2 * angle.sin()) * shape.radius;
            axial + radial * (k as f64 / pre as f64)
        })
        .collect();
    points
        .windows(2)
        .map(|w| ShapeTile::line(w[0], w[1]))
        .collect()
}

fn tetrahedron_tiles(shape: &TetrahedronShape, size: DVec3) -> Vec<ShapeTile> {
    let sqrt3 = 3.0_f64.sqrt();
    let height = 6.0_f64.sqrt() / 3.0;
    let x_center = sqrt3 / 6.0;
    let z_center = height / 3.0;

    let base = [
        DVec3::new(x_center, 0.5, -z_center),
        DVec3::new(x_center, -0.5, -z_center),
        DVec3::new(-2.0 * x_center, 0.0, -z_center),
    ];
    let apex = DVec3::new(0.0, 0.0, height - z_center);
    let h = height_fraction(shape.truncation, size.z);

    let faces: Vec<Vec<DVec3>> = if shape.truncation.is_some() && h < 1.0 {
        // Top triangle where each base edge meets the apex at fraction h.
        let cut: Vec<DVec3> = base.iter().map(|p| p.lerp(apex, h)).collect();
        let mut faces = vec![
            vec![base[0], cut[0], cut[1], base[1]],
            vec![base[2], cut[2], cut[0], base[0]],
            vec![base[1], cut[1], cut[2], base[2]],
        ];
        if shape.closed_bottom {
            faces.push(vec![base[0], base[1], base[2]]);
        }
        if shape.closed_top {
            faces.push(vec![cut[0], cut[2], cut[1]]);
        }
        faces
    } else {
        let mut faces = vec![
            vec![base[0], base[1], apex],
            vec![base[0], apex, base[2]],
            vec![base[1], base[2], apex],
        ];
        if shape.closed_bottom {
            faces.push(vec![base[0], base[2], base[1]]);
        }
        faces
    };
    faces
        .into_iter()
        .map(|face| ShapeTile::polygon(face.into_iter().map(|p| p * size).collect()))
        .collect()
}

/// One tile per trail point: a line back to the previous point when the
/// point is connected, otherwise a lone marker.
fn trail_tiles(handle: &TrailHandle, size: DVec3) -> Vec<ShapeTile> {
    let points = handle.snapshot();
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let at = p.position * size;
            match i.checked_sub(1).map(|j| &points[j]) {
                Some(prev) if p.connected => ShapeTile::line(prev.position * size, at),
                _ => ShapeTile::point(at),
            }
        })
        .collect()
}
