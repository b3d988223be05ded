//! Camera and projection.
//!
//! The camera pose has two parameterizations: the position/focus pair and the
//! azimuth/altitude angles around the focus. Every setter names which one it
//! changed; [`Camera`] treats that one as authoritative and derives the other,
//! then rebuilds the orthonormal basis `e1` (view), `e2` (right), `e3` (up).

use glam::{DQuat, DVec2, DVec3};
use serde::{Deserialize, Serialize};

use fieldscope_core::Options;

/// World "up" used to build the camera basis.
const VERTICAL: DVec3 = DVec3::Z;

/// How 3D points are mapped onto the screen plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Look down the Z axis; the Z coordinate only feeds the depth.
    PlanarXy,
    /// Look along the Y axis.
    PlanarXz,
    /// Look along the X axis.
    PlanarYz,
    /// 3D orthographic projection along the view axis.
    NoPerspective,
    /// 3D projection where distant objects look smaller.
    #[default]
    Perspective,
}

impl ProjectionMode {
    /// Converts from the legacy integer mode code.
    /// Order: 0=XY, 1=XZ, 2=YZ, 3 or 10=no perspective, 4 or 11=perspective
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(ProjectionMode::PlanarXy),
            1 => Some(ProjectionMode::PlanarXz),
            2 => Some(ProjectionMode::PlanarYz),
            3 | 10 => Some(ProjectionMode::NoPerspective),
            4 | 11 => Some(ProjectionMode::Perspective),
            _ => None,
        }
    }

    /// Converts to the legacy integer mode code.
    #[must_use]
    pub fn to_index(self) -> u32 {
        match self {
            ProjectionMode::PlanarXy => 0,
            ProjectionMode::PlanarXz => 1,
            ProjectionMode::PlanarYz => 2,
            ProjectionMode::NoPerspective => 10,
            ProjectionMode::Perspective => 11,
        }
    }

    /// Returns display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ProjectionMode::PlanarXy => "Planar XY",
            ProjectionMode::PlanarXz => "Planar XZ",
            ProjectionMode::PlanarYz => "Planar YZ",
            ProjectionMode::NoPerspective => "No perspective",
            ProjectionMode::Perspective => "Perspective",
        }
    }

    /// Whether the mode shows all three dimensions.
    #[must_use]
    pub fn is_3d(self) -> bool {
        matches!(
            self,
            ProjectionMode::NoPerspective | ProjectionMode::Perspective
        )
    }
}

/// Axis-aligned extent of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Default for SceneBounds {
    fn default() -> Self {
        Self {
            min: DVec3::splat(-1.0),
            max: DVec3::splat(1.0),
        }
    }
}

impl SceneBounds {
    #[must_use]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest extent seen by the given projection mode.
    #[must_use]
    pub fn max_size(&self, mode: ProjectionMode) -> f64 {
        let d = self.max - self.min;
        match mode {
            ProjectionMode::PlanarXy => d.x.max(d.y),
            ProjectionMode::PlanarXz => d.x.max(d.z),
            ProjectionMode::PlanarYz => d.y.max(d.z),
            ProjectionMode::NoPerspective | ProjectionMode::Perspective => d.max_element(),
        }
    }
}

/// Which part of the pose a setter changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraChange {
    /// Position or focus moved: angles are derived from the vectors.
    Position,
    /// Azimuth or altitude changed: the position is derived from the angles.
    Angles,
    /// Only the roll changed.
    Rotation,
    /// Everything may have changed.
    Any,
}

/// A camera that projects world points to screen-plane coordinates plus a depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    mode: ProjectionMode,
    position: DVec3,
    focus: DVec3,
    distance_to_screen: f64,
    distance_to_focus: f64,
    rotation: f64,
    azimuth: f64,
    altitude: f64,
    e1: DVec3,
    e2: DVec3,
    e3: DVec3,
    /// Smallest view-axis depth used as a perspective divisor.
    epsilon: f64,
    ratio_to_screen: f64,
    ratio_to_focus: f64,
    epsilon_ratio: f64,
    revision: u64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::with_options(&Options::default())
    }
}

impl Camera {
    /// Creates a camera looking at the default scene bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a camera using the distance ratios in `options`.
    #[must_use]
    pub fn with_options(options: &Options) -> Self {
        let mut camera = Self {
            mode: ProjectionMode::default(),
            position: DVec3::ZERO,
            focus: DVec3::ZERO,
            distance_to_screen: 1.0,
            distance_to_focus: 1.0,
            rotation: 0.0,
            azimuth: 0.0,
            altitude: 0.0,
            e1: DVec3::NEG_X,
            e2: DVec3::Y,
            e3: DVec3::Z,
            epsilon: 0.0,
            ratio_to_screen: options.ratio_to_screen,
            ratio_to_focus: options.ratio_to_focus,
            epsilon_ratio: options.epsilon_ratio,
            revision: 0,
        };
        camera.reset(&SceneBounds::default());
        camera
    }

    /// Places the camera on the +X side of the scene looking at its centre.
    pub fn reset(&mut self, bounds: &SceneBounds) {
        let size = bounds.max_size(ProjectionMode::Perspective);
        let size = if size > 0.0 { size } else { 1.0 };
        self.focus = bounds.center();
        self.distance_to_screen = self.ratio_to_screen * size;
        self.distance_to_focus = self.ratio_to_focus * size;
        self.position = self.focus + DVec3::new(self.distance_to_focus, 0.0, 0.0);
        self.rotation = 0.0;
        self.azimuth = 0.0;
        self.altitude = 0.0;
        self.e1 = DVec3::NEG_X;
        self.e2 = DVec3::Y;
        self.e3 = DVec3::Z;
        self.set_scene_size(size);
        log::debug!(
            "camera reset: focus={:?}, distance_to_focus={}",
            self.focus,
            self.distance_to_focus
        );
    }

    /// Updates the scene size used to guard perspective divisions.
    pub fn set_scene_size(&mut self, size: f64) {
        self.epsilon = size * self.epsilon_ratio;
        self.bump();
    }

    /// Copies the pose and mode of another camera.
    pub fn copy_from(&mut self, other: &Camera) {
        self.mode = other.mode;
        self.position = other.position;
        self.focus = other.focus;
        self.rotation = other.rotation;
        self.distance_to_screen = other.distance_to_screen;
        // Fallbacks for a position that sits on the focus.
        self.distance_to_focus = other.distance_to_focus;
        self.e1 = other.e1;
        self.azimuth = other.azimuth;
        self.altitude = other.altitude;
        self.epsilon = other.epsilon;
        self.update(CameraChange::Any);
    }

    /// Monotone counter bumped on every change; projections cached against an
    /// older revision are stale.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn projection_mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
        self.bump();
    }

    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    #[must_use]
    pub fn focus(&self) -> DVec3 {
        self.focus
    }

    #[must_use]
    pub fn distance_to_screen(&self) -> f64 {
        self.distance_to_screen
    }

    #[must_use]
    pub fn distance_to_focus(&self) -> f64 {
        self.distance_to_focus
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    #[must_use]
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// View direction, right and up vectors.
    #[must_use]
    pub fn basis(&self) -> (DVec3, DVec3, DVec3) {
        (self.e1, self.e2, self.e3)
    }

    pub fn set_xyz(&mut self, position: DVec3) {
        self.position = position;
        self.update(CameraChange::Position);
    }

    pub fn set_focus_xyz(&mut self, focus: DVec3) {
        self.focus = focus;
        self.update(CameraChange::Position);
    }

    /// Sets the roll about the view axis, in radians.
    pub fn set_rotation(&mut self, angle: f64) {
        self.rotation = angle;
        self.update(CameraChange::Rotation);
    }

    pub fn set_distance_to_screen(&mut self, distance: f64) {
        self.distance_to_screen = distance;
        self.bump();
    }

    pub fn set_azimuth(&mut self, angle: f64) {
        self.azimuth = angle;
        self.update(CameraChange::Angles);
    }

    /// Sets the altitude, clamped to `[-π/2, π/2]`.
    pub fn set_altitude(&mut self, angle: f64) {
        self.altitude = clamp_altitude(angle);
        self.update(CameraChange::Angles);
    }

    pub fn set_azimuth_and_altitude(&mut self, azimuth: f64, altitude: f64) {
        self.azimuth = azimuth;
        self.altitude = clamp_altitude(altitude);
        self.update(CameraChange::Angles);
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn update(&mut self, change: CameraChange) {
        match change {
            CameraChange::Position | CameraChange::Any => {
                self.distance_to_focus = self.compute_vectors();
                self.derive_angles();
            }
            CameraChange::Rotation => {
                self.compute_vectors();
            }
            CameraChange::Angles => {
                let (sin_a, cos_a) = self.azimuth.sin_cos();
                let (sin_b, cos_b) = self.altitude.sin_cos();
                self.position = self.focus
                    + self.distance_to_focus * DVec3::new(cos_b * cos_a, cos_b * sin_a, sin_b);
                self.compute_vectors();
            }
        }
        self.bump();
    }

    fn derive_angles(&mut self) {
        let e1 = self.e1;
        self.azimuth = (-e1.y).atan2(-e1.x);
        self.altitude = clamp_altitude((-e1.z).atan2(e1.x.hypot(e1.y)));
    }

    /// Rebuilds the basis from position, focus and roll; returns the focus distance.
    fn compute_vectors(&mut self) -> f64 {
        let view = self.focus - self.position;
        let distance = view.length();
        if distance > 0.0 {
            self.e1 = view / distance;
        } else {
            log::warn!("camera position coincides with its focus; keeping previous view axis");
        }

        let right = self.e1.cross(VERTICAL);
        self.e2 = if right.length_squared() > f64::EPSILON {
            right.normalize()
        } else {
            // Looking straight up or down: the right vector follows the azimuth.
            let (sin_a, cos_a) = self.azimuth.sin_cos();
            DVec3::new(-sin_a, cos_a, 0.0)
        };
        self.e3 = self.e2.cross(self.e1).normalize();

        if self.rotation != 0.0 {
            let roll = DQuat::from_axis_angle(self.e1, self.rotation);
            self.e2 = roll * self.e2;
            self.e3 = roll * self.e3;
        }
        if distance > 0.0 {
            distance
        } else {
            self.distance_to_focus
        }
    }

    /// View-axis depth of `p - position`, kept away from zero.
    #[inline]
    fn guarded_depth(&self, depth: f64) -> f64 {
        if depth.abs() < self.epsilon {
            self.epsilon
        } else {
            depth
        }
    }

    /// Projects a world point to `(x, y, depth)`.
    ///
    /// `x, y` are screen-plane coordinates in world units (y up); `depth` is a
    /// sort key that grows with distance from the viewer and is `1` at the focus
    /// for the planar modes and the 3D modes alike.
    #[must_use]
    pub fn project(&self, p: DVec3) -> DVec3 {
        let f = self.focus;
        match self.mode {
            ProjectionMode::PlanarXy => DVec3::new(
                p.x - f.x,
                p.y - f.y,
                1.0 - (p.z - f.z) / self.distance_to_focus,
            ),
            ProjectionMode::PlanarXz => DVec3::new(
                p.x - f.x,
                p.z - f.z,
                1.0 - (p.y - f.y) / self.distance_to_focus,
            ),
            ProjectionMode::PlanarYz => DVec3::new(
                p.y - f.y,
                p.z - f.z,
                1.0 - (p.x - f.x) / self.distance_to_focus,
            ),
            ProjectionMode::NoPerspective => {
                let q = p - self.position;
                let scale = self.distance_to_screen / self.distance_to_focus;
                DVec3::new(
                    q.dot(self.e2) * scale,
                    q.dot(self.e3) * scale,
                    q.dot(self.e1) / self.distance_to_focus,
                )
            }
            ProjectionMode::Perspective => {
                let q = p - self.position;
                let depth = q.dot(self.e1);
                let scale = self.distance_to_screen / self.guarded_depth(depth);
                DVec3::new(
                    q.dot(self.e2) * scale,
                    q.dot(self.e3) * scale,
                    depth / self.distance_to_focus,
                )
            }
        }
    }

    /// Projects a world-space size measured at `p` onto the screen plane.
    ///
    /// In perspective mode the size shrinks with the anchor's distance.
    #[must_use]
    pub fn project_size(&self, p: DVec3, size: DVec3) -> DVec2 {
        match self.mode {
            ProjectionMode::PlanarXy => DVec2::new(size.x, size.y),
            ProjectionMode::PlanarXz => DVec2::new(size.x, size.z),
            ProjectionMode::PlanarYz => DVec2::new(size.y, size.z),
            ProjectionMode::NoPerspective => {
                let scale = self.distance_to_screen / self.distance_to_focus;
                DVec2::new(size.x.max(size.y), size.z) * scale
            }
            ProjectionMode::Perspective => {
                let depth = (p - self.position).dot(self.e1);
                let scale = self.distance_to_screen / self.guarded_depth(depth);
                DVec2::new(size.x.max(size.y), size.z) * scale
            }
        }
    }
}

#[inline]
fn clamp_altitude(angle: f64) -> f64 {
    angle.clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn assert_vec_eq(a: DVec3, b: DVec3) {
        assert!((a - b).length() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_mode_index_aliases() {
        assert_eq!(ProjectionMode::from_index(3), Some(ProjectionMode::NoPerspective));
        assert_eq!(ProjectionMode::from_index(10), Some(ProjectionMode::NoPerspective));
        assert_eq!(ProjectionMode::from_index(4), Some(ProjectionMode::Perspective));
        assert_eq!(ProjectionMode::from_index(11), Some(ProjectionMode::Perspective));
        assert_eq!(ProjectionMode::from_index(5), None);
        assert!(!ProjectionMode::PlanarXz.is_3d());
    }

    #[test]
    fn test_reset_pose() {
        let camera = Camera::new();
        // Default bounds are [-1, 1]^3: size 2.
        assert_eq!(camera.focus(), DVec3::ZERO);
        assert_eq!(camera.distance_to_screen(), 5.0);
        assert_eq!(camera.distance_to_focus(), 4.0);
        assert_eq!(camera.position(), DVec3::new(4.0, 0.0, 0.0));
        let (e1, e2, e3) = camera.basis();
        assert_eq!(e1, DVec3::NEG_X);
        assert_eq!(e2, DVec3::Y);
        assert_eq!(e3, DVec3::Z);
    }

    #[test]
    fn test_position_change_derives_angles() {
        let mut camera = Camera::new();
        camera.set_xyz(DVec3::new(0.0, 3.0, 3.0));
        assert!((camera.azimuth() - FRAC_PI_2).abs() < 1e-12);
        assert!((camera.altitude() - FRAC_PI_4).abs() < 1e-12);
        assert!((camera.distance_to_focus() - 18f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_angles_change_derives_position() {
        let mut camera = Camera::new();
        camera.set_azimuth_and_altitude(PI, 0.0);
        assert_vec_eq(camera.position(), DVec3::new(-4.0, 0.0, 0.0));
        let (e1, e2, e3) = camera.basis();
        assert_vec_eq(e1, DVec3::X);
        assert_vec_eq(e2, DVec3::NEG_Y);
        assert_vec_eq(e3, DVec3::Z);
    }

    #[test]
    fn test_pose_round_trip() {
        let mut camera = Camera::new();
        camera.set_azimuth_and_altitude(0.7, -0.3);
        let position = camera.position();
        let (azimuth, altitude) = (camera.azimuth(), camera.altitude());
        camera.set_xyz(position);
        assert!((camera.azimuth() - azimuth).abs() < 1e-12);
        assert!((camera.altitude() - altitude).abs() < 1e-12);
    }

    #[test]
    fn test_altitude_clamped() {
        let mut camera = Camera::new();
        camera.set_altitude(3.0);
        assert_eq!(camera.altitude(), FRAC_PI_2);
        camera.set_altitude(-3.0);
        assert_eq!(camera.altitude(), -FRAC_PI_2);
    }

    #[test]
    fn test_looking_straight_down_is_finite() {
        let mut camera = Camera::new();
        camera.set_azimuth(FRAC_PI_2);
        camera.set_altitude(FRAC_PI_2);
        let (e1, e2, e3) = camera.basis();
        assert!(e1.is_finite() && e2.is_finite() && e3.is_finite());
        assert_vec_eq(e1, DVec3::NEG_Z);
        assert!(e2.dot(e1).abs() < 1e-9);
        assert!(e3.dot(e1).abs() < 1e-9);
        assert!(camera.project(DVec3::new(0.3, 0.2, 0.0)).is_finite());
    }

    #[test]
    fn test_roll_rotates_basis() {
        let mut camera = Camera::new();
        camera.set_rotation(FRAC_PI_2);
        let (e1, e2, e3) = camera.basis();
        assert_vec_eq(e1, DVec3::NEG_X);
        assert!(e2.dot(DVec3::Z).abs() > 0.999);
        assert!(e3.dot(DVec3::Y).abs() > 0.999);
    }

    #[test]
    fn test_perspective_projection() {
        let camera = Camera::new();
        // At the focus: depth 1, centred.
        assert_vec_eq(camera.project(DVec3::ZERO), DVec3::new(0.0, 0.0, 1.0));
        // Same lateral offset is larger when closer.
        let near = camera.project(DVec3::new(2.0, 1.0, 0.0));
        let far = camera.project(DVec3::new(-2.0, 1.0, 0.0));
        assert!(near.x > far.x);
        assert!(near.z < far.z);
    }

    #[test]
    fn test_perspective_guard_at_camera_plane() {
        let camera = Camera::new();
        let p = camera.project(DVec3::new(4.0, 1.0, 0.0));
        assert!(p.is_finite());
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn test_planar_projection() {
        let mut camera = Camera::new();
        camera.set_projection_mode(ProjectionMode::PlanarXz);
        let p = camera.project(DVec3::new(1.0, 2.0, 3.0));
        assert_vec_eq(p, DVec3::new(1.0, 3.0, 0.5));
        assert_eq!(
            camera.project_size(DVec3::ZERO, DVec3::new(1.0, 2.0, 3.0)),
            DVec2::new(1.0, 3.0)
        );
    }

    #[test]
    fn test_no_perspective_scales_uniformly_with_screen_distance() {
        let mut camera = Camera::new();
        camera.set_projection_mode(ProjectionMode::NoPerspective);
        let point = DVec3::new(0.5, 0.7, -0.4);
        let size = DVec3::new(0.2, 0.1, 0.3);

        let p1 = camera.project(point);
        let s1 = camera.project_size(point, size);
        camera.set_distance_to_screen(camera.distance_to_screen() * 3.0);
        let p2 = camera.project(point);
        let s2 = camera.project_size(point, size);

        assert!((p2.x / p1.x - 3.0).abs() < 1e-9);
        assert!((p2.y / p1.y - 3.0).abs() < 1e-9);
        assert!((s2.x / s1.x - 3.0).abs() < 1e-9);
        assert!((s2.y / s1.y - 3.0).abs() < 1e-9);
        assert_eq!(p1.z, p2.z);
    }

    #[test]
    fn test_perspective_size_shrinks_with_distance() {
        let camera = Camera::new();
        let size = DVec3::ONE;
        let near = camera.project_size(DVec3::new(2.0, 0.0, 0.0), size);
        let far = camera.project_size(DVec3::new(-2.0, 0.0, 0.0), size);
        assert!(near.x > far.x);
    }

    #[test]
    fn test_revision_bumps() {
        let mut camera = Camera::new();
        let r = camera.revision();
        camera.set_azimuth(0.1);
        assert!(camera.revision() > r);
    }

    #[test]
    fn test_copy_from_camera_sitting_on_its_focus() {
        let mut source = Camera::new();
        source.set_xyz(DVec3::new(0.0, 0.0, 6.0));
        source.set_focus_xyz(DVec3::new(0.0, 0.0, 6.0));
        assert_eq!(source.distance_to_focus(), 6.0);

        let mut copy = Camera::new();
        copy.copy_from(&source);
        assert_eq!(copy.distance_to_focus(), source.distance_to_focus());
        assert_vec_eq(copy.basis().0, source.basis().0);
        assert_vec_eq(copy.basis().1, source.basis().1);
        let p = DVec3::new(1.0, 2.0, 0.0);
        assert_vec_eq(copy.project(p), source.project(p));
    }

    #[test]
    fn test_copy_from() {
        let mut source = Camera::new();
        source.set_azimuth_and_altitude(1.0, 0.5);
        source.set_projection_mode(ProjectionMode::NoPerspective);
        let mut copy = Camera::new();
        copy.copy_from(&source);
        assert_vec_eq(copy.position(), source.position());
        assert_eq!(copy.projection_mode(), ProjectionMode::NoPerspective);
        assert!((copy.azimuth() - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_no_perspective_ratio_is_direction_independent(
            x in -3.0f64..3.0,
            y in -3.0f64..3.0,
            z in -3.0f64..3.0,
            factor in 0.25f64..8.0,
        ) {
            let mut camera = Camera::new();
            camera.set_projection_mode(ProjectionMode::NoPerspective);
            let point = DVec3::new(x, y, z);
            let p1 = camera.project(point);
            camera.set_distance_to_screen(camera.distance_to_screen() * factor);
            let p2 = camera.project(point);
            prop_assert!((p2.x - p1.x * factor).abs() < 1e-9);
            prop_assert!((p2.y - p1.y * factor).abs() < 1e-9);
            prop_assert!((p2.z - p1.z).abs() < 1e-12);
        }
    }
}
