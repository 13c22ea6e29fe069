//! Transform component

use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};

/// Transform component for positioning objects in 3D space
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Local-to-world matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Rotate so local +Z points along `direction`
    pub fn pointing(mut self, direction: Vec3) -> Self {
        self.rotation = Quat::from_rotation_arc(Vec3::Z, direction.normalize());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointing_sets_local_z() {
        let transform = Transform::from_position(Vec3::ONE).pointing(-Vec3::Y);
        assert!((transform.rotation * Vec3::Z - -Vec3::Y).length() < 1e-5);
        assert!((transform.matrix().z_axis.truncate() - -Vec3::Y).length() < 1e-5);
        assert_eq!(transform.matrix().w_axis.truncate(), Vec3::ONE);
    }
}
