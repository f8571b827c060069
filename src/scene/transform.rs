//! TRS transforms and rigid poses

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local transform of a scene node (translation, rotation, scale)
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
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_pose(pose: Pose) -> Self {
        Self {
            translation: pose.translation,
            rotation: pose.rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Rigid world-space pose (no scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Extract the rigid part of a 4x4 transform (scale is discarded)
    pub fn from_matrix(m: Mat4) -> Self {
        let (_, rotation, translation) = m.to_scale_rotation_translation();
        Self::new(translation, rotation.normalize())
    }
}

/// Decomposed world transform of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPose {
    pub translation: Vec3,
    pub rotation: Quat,
    /// Uniform scale (x component of the decomposed scale)
    pub scale: f32,
}

impl WorldPose {
    pub fn from_matrix(m: Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self {
            translation,
            rotation: rotation.normalize(),
            scale: scale.x,
        }
    }

    /// Map a world point into this pose's local frame
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.translation) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_pose_round_trip_point() {
        let t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Quat::from_rotation_y(0.7))
            .with_scale(Vec3::splat(0.5));
        let pose = WorldPose::from_matrix(t.matrix());
        assert!((pose.scale - 0.5).abs() < 1e-5);

        let local = Vec3::new(0.3, -0.2, 1.1);
        let world = t.matrix().transform_point3(local);
        assert!((pose.to_local(world) - local).length() < 1e-5);
    }

    #[test]
    fn test_pose_from_matrix_drops_scale() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::splat(3.0),
            Quat::from_rotation_x(0.25),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let pose = Pose::from_matrix(m);
        assert!((pose.translation - Vec3::Y).length() < 1e-5);
        assert!(pose.rotation.angle_between(Quat::from_rotation_x(0.25)) < 1e-4);
    }
}
