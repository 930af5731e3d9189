//! Object transforms
//!
//! Location / Euler rotation / scale triples as stored on scene objects.
//! Rotations are XYZ Euler angles in radians, applied X first, then Y, then Z.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Largest rotation (radians, about 0.005 degrees) still treated as "not rotated"
pub const ROTATION_TOLERANCE: f32 = 0.000_087_266_47;

/// Object-level transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub location: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        location: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_location(location: Vec3) -> Self {
        Self {
            location,
            ..Self::IDENTITY
        }
    }

    pub fn new(location: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            location,
            rotation,
            scale,
        }
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::ZYX,
            self.rotation.z,
            self.rotation.y,
            self.rotation.x,
        )
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.location)
    }

    /// Decompose an affine matrix back into location / rotation / scale.
    ///
    /// Shear is lost; callers only feed products of TRS matrices.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, location) = matrix.to_scale_rotation_translation();
        let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
        Self {
            location,
            rotation: Vec3::new(x, y, z),
            scale,
        }
    }

    /// Exact identity check (no tolerance)
    pub fn is_identity(&self) -> bool {
        self.location == Vec3::ZERO && self.rotation == Vec3::ZERO && self.scale == Vec3::ONE
    }

    /// Whether location, rotation and scale are all at their defaults on one axis.
    ///
    /// Location and scale compare exactly, rotation within [`ROTATION_TOLERANCE`].
    pub fn is_default_on_axis(&self, axis: usize) -> bool {
        self.location[axis] == 0.0
            && self.rotation[axis].abs() <= ROTATION_TOLERANCE
            && self.scale[axis] == 1.0
    }

    /// Whether the rotation on one axis exceeds [`ROTATION_TOLERANCE`]
    pub fn is_rotated_on_axis(&self, axis: usize) -> bool {
        self.rotation[axis].abs() > ROTATION_TOLERANCE
    }
}

/// Cartesian axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}
