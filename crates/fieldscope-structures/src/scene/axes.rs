//! Axis permutations between user coordinates and scene coordinates.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Which scene axis each user axis is drawn along.
///
/// `XZY` means the user's `(x, y, z)` is drawn as scene `(x, z, y)`: the
/// user's y axis points up the scene's z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxesMode {
    #[default]
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
}

impl AxesMode {
    /// Converts from the legacy integer mode code.
    /// Order: 0=XYZ, 1=XZY, 2=YXZ, 3=YZX, 4=ZXY, 5=ZYX
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        Some(match index {
            0 => AxesMode::XYZ,
            1 => AxesMode::XZY,
            2 => AxesMode::YXZ,
            3 => AxesMode::YZX,
            4 => AxesMode::ZXY,
            5 => AxesMode::ZYX,
            _ => return None,
        })
    }

    #[must_use]
    pub fn to_index(self) -> u32 {
        match self {
            AxesMode::XYZ => 0,
            AxesMode::XZY => 1,
            AxesMode::YXZ => 2,
            AxesMode::YZX => 3,
            AxesMode::ZXY => 4,
            AxesMode::ZYX => 5,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AxesMode::XYZ => "XYZ",
            AxesMode::XZY => "XZY",
            AxesMode::YXZ => "YXZ",
            AxesMode::YZX => "YZX",
            AxesMode::ZXY => "ZXY",
            AxesMode::ZYX => "ZYX",
        }
    }

    /// Scene axis receiving each user axis.
    #[must_use]
    pub fn permutation(self) -> [usize; 3] {
        match self {
            AxesMode::XYZ => [0, 1, 2],
            AxesMode::XZY => [0, 2, 1],
            AxesMode::YXZ => [1, 0, 2],
            AxesMode::YZX => [2, 0, 1],
            AxesMode::ZXY => [1, 2, 0],
            AxesMode::ZYX => [2, 1, 0],
        }
    }
}

/// A permutation plus per-axis sign, applied once when user coordinates
/// enter the scene and undone when they are read back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMap {
    permutation: [usize; 3],
    sign: [f64; 3],
}

impl Default for AxisMap {
    fn default() -> Self {
        AxesMode::XYZ.into()
    }
}

impl From<AxesMode> for AxisMap {
    fn from(mode: AxesMode) -> Self {
        Self {
            permutation: mode.permutation(),
            sign: [1.0; 3],
        }
    }
}

impl AxisMap {
    /// Mirrors user axis `axis` (0, 1 or 2).
    #[must_use]
    pub fn mirrored(mut self, axis: usize) -> Self {
        if let Some(s) = self.sign.get_mut(axis) {
            *s = -*s;
        }
        self
    }

    #[must_use]
    pub fn permutation(&self) -> [usize; 3] {
        self.permutation
    }

    /// User coordinates to scene coordinates.
    #[must_use]
    pub fn to_scene(&self, user: DVec3) -> DVec3 {
        let mut out = DVec3::ZERO;
        for i in 0..3 {
            out[self.permutation[i]] = self.sign[i] * user[i];
        }
        out
    }

    /// Scene coordinates back to user coordinates.
    #[must_use]
    pub fn to_user(&self, scene: DVec3) -> DVec3 {
        let mut out = DVec3::ZERO;
        for i in 0..3 {
            out[i] = self.sign[i] * scene[self.permutation[i]];
        }
        out
    }

    /// Magnitudes (sizes) move with their axis but never change sign.
    #[must_use]
    pub fn extent_to_scene(&self, user: DVec3) -> DVec3 {
        let mut out = DVec3::ZERO;
        for i in 0..3 {
            out[self.permutation[i]] = user[i];
        }
        out
    }

    #[must_use]
    pub fn extent_to_user(&self, scene: DVec3) -> DVec3 {
        let mut out = DVec3::ZERO;
        for i in 0..3 {
            out[i] = scene[self.permutation[i]];
        }
        out
    }

    /// Re-expresses a rotation given in user axes: the rotation axis is mapped
    /// like a point, the angle is kept.
    #[must_use]
    pub fn rotation_to_scene(&self, q: DQuat) -> DQuat {
        let v = self.to_scene(DVec3::new(q.x, q.y, q.z));
        DQuat::from_xyzw(v.x, v.y, v.z, q.w)
    }

    #[must_use]
    pub fn rotation_to_user(&self, q: DQuat) -> DQuat {
        let v = self.to_user(DVec3::new(q.x, q.y, q.z));
        DQuat::from_xyzw(v.x, v.y, v.z, q.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AxesMode; 6] = [
        AxesMode::XYZ,
        AxesMode::XZY,
        AxesMode::YXZ,
        AxesMode::YZX,
        AxesMode::ZXY,
        AxesMode::ZYX,
    ];

    #[test]
    fn test_index_round_trip() {
        for mode in ALL {
            assert_eq!(AxesMode::from_index(mode.to_index()), Some(mode));
        }
        assert_eq!(AxesMode::from_index(6), None);
    }

    #[test]
    fn test_xzy_points_user_y_up() {
        let map = AxisMap::from(AxesMode::XZY);
        assert_eq!(map.to_scene(DVec3::new(1.0, 2.0, 3.0)), DVec3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn test_yzx() {
        let map = AxisMap::from(AxesMode::YZX);
        // user x -> scene z, user y -> scene x, user z -> scene y
        assert_eq!(map.to_scene(DVec3::new(1.0, 2.0, 3.0)), DVec3::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn test_inverse_for_every_mode() {
        let p = DVec3::new(0.5, -2.0, 7.0);
        for mode in ALL {
            let map = AxisMap::from(mode).mirrored(1);
            assert_eq!(map.to_user(map.to_scene(p)), p, "{}", mode.name());
            assert_eq!(map.extent_to_user(map.extent_to_scene(p)), p);
        }
    }

    #[test]
    fn test_mirrored_sizes_stay_positive() {
        let map = AxisMap::default().mirrored(0);
        assert_eq!(map.to_scene(DVec3::X), DVec3::NEG_X);
        assert_eq!(map.extent_to_scene(DVec3::X), DVec3::X);
    }

    #[test]
    fn test_rotation_axis_follows_mode() {
        let map = AxisMap::from(AxesMode::XZY);
        let q = DQuat::from_rotation_y(0.3);
        let mapped = map.rotation_to_scene(q);
        let expected = DQuat::from_rotation_z(0.3);
        assert!(mapped.abs_diff_eq(expected, 1e-12));
        assert!(map.rotation_to_user(mapped).abs_diff_eq(q, 1e-12));
    }
}
