//! Rigid transforms with non-uniform scale
//!
//! Two composition rules coexist:
//! - [`Transform::compose`] is the full hierarchical rule used while walking
//!   component trees (`local ∘ parent`).
//! - [`Transform::combine`] is the attachment rule used when stacking anchor,
//!   socket, offset and mesh-local transforms: rotations premultiply,
//!   translations add, and the child's scale replaces the parent's.
//!
//! Both renormalize the rotation so it stays a unit quaternion.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
        .normalized()
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Build from a location, an engine rotator (pitch, yaw, roll in degrees) and a scale
    pub fn from_rotator(translation: Vec3, rotator: [f32; 3], scale: Vec3) -> Self {
        Self::new(translation, rotator_to_quat(rotator), scale)
    }

    /// Copy with the rotation renormalized; a degenerate rotation becomes identity
    pub fn normalized(mut self) -> Self {
        let len = self.rotation.length();
        self.rotation = if len.is_finite() && len > f32::EPSILON {
            self.rotation / len
        } else {
            Quat::IDENTITY
        };
        self
    }

    /// Hierarchical composition: `self` expressed in `parent`'s space
    pub fn compose(&self, parent: &Transform) -> Transform {
        let local = self.normalized();
        let parent = parent.normalized();
        Transform {
            translation: parent.rotation * (parent.scale * local.translation) + parent.translation,
            rotation: parent.rotation * local.rotation,
            scale: local.scale * parent.scale,
        }
        .normalized()
    }

    /// Attachment composition
    ///
    /// `rotation = child.rotation * parent.rotation`,
    /// `translation = child.translation + parent.translation`,
    /// `scale = child.scale`. The parent's scale is intentionally not carried.
    pub fn combine(parent: &Transform, child: &Transform) -> Transform {
        Transform {
            translation: child.translation + parent.translation,
            rotation: child.rotation * parent.rotation,
            scale: child.scale,
        }
        .normalized()
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }

    /// Rotation as (pitch, yaw, roll) degrees, for display
    pub fn rotator(&self) -> [f32; 3] {
        quat_to_rotator(self.rotation)
    }

    pub fn approx_eq(&self, other: &Transform, epsilon: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
            && (self.rotation.abs_diff_eq(other.rotation, epsilon)
                || self.rotation.abs_diff_eq(-other.rotation, epsilon))
    }
}

/// Engine rotator (pitch, yaw, roll in degrees) to quaternion
pub fn rotator_to_quat(rotator: [f32; 3]) -> Quat {
    let [pitch, yaw, roll] = rotator;
    let half = |degrees: f32| (degrees.to_radians() * 0.5).sin_cos();
    let (sp, cp) = half(pitch);
    let (sy, cy) = half(yaw);
    let (sr, cr) = half(roll);

    Quat::from_xyzw(
        cr * sp * sy - sr * cp * cy,
        -cr * sp * cy - sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    )
    .normalize()
}

/// Quaternion back to an engine rotator (pitch, yaw, roll in degrees)
pub fn quat_to_rotator(q: Quat) -> [f32; 3] {
    let singularity = q.z * q.x - q.w * q.y;
    let yaw_y = 2.0 * (q.w * q.z + q.x * q.y);
    let yaw_x = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
    let yaw = yaw_y.atan2(yaw_x).to_degrees();

    const THRESHOLD: f32 = 0.499_999_5;
    if singularity < -THRESHOLD {
        let roll = -yaw - 2.0 * q.x.atan2(q.w).to_degrees();
        [-90.0, yaw, roll]
    } else if singularity > THRESHOLD {
        let roll = yaw - 2.0 * q.x.atan2(q.w).to_degrees();
        [90.0, yaw, roll]
    } else {
        let pitch = (2.0 * singularity).asin().to_degrees();
        let roll = (-2.0 * (q.w * q.x + q.y * q.z))
            .atan2(1.0 - 2.0 * (q.x * q.x + q.y * q.y))
            .to_degrees();
        [pitch, yaw, roll]
    }
}
