//! Light component

use bevy_ecs::prelude::*;
use glam::{Vec3, Vec4};

use crate::color::srgb_to_linear;

/// Light type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    #[default]
    Directional,
    Point,
    Spot,
    /// Baked-only area lights, never packed
    Area,
    Other,
}

/// Light component.
/// Position and orientation come from the Transform component on the same
/// entity; a light shines along its local +Z axis.
#[derive(Component, Debug, Clone)]
pub struct Light {
    pub light_type: LightType,
    /// Color in gamma space
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
    /// Outer cone angle in degrees
    pub spot_angle: f32,
    /// Inner cone angle in degrees
    pub inner_spot_angle: f32,
    pub rendering_layer_mask: u32,
    /// Zero disables shadows
    pub shadow_strength: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_type: LightType::Directional,
            color: Vec3::ONE,
            intensity: 1.0,
            range: 10.0,
            spot_angle: 30.0,
            inner_spot_angle: 21.8,
            rendering_layer_mask: 1,
            shadow_strength: 1.0,
        }
    }
}

impl Light {
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Directional,
            color,
            intensity,
            ..Default::default()
        }
    }

    pub fn point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            light_type: LightType::Point,
            color,
            intensity,
            range,
            ..Default::default()
        }
    }

    pub fn spot(color: Vec3, intensity: f32, range: f32, inner_angle: f32, outer_angle: f32) -> Self {
        Self {
            light_type: LightType::Spot,
            color,
            intensity,
            range,
            spot_angle: outer_angle,
            inner_spot_angle: inner_angle,
            ..Default::default()
        }
    }

    pub fn with_layer_mask(mut self, mask: u32) -> Self {
        self.rendering_layer_mask = mask;
        self
    }

    /// Linear color scaled by intensity, as shaders consume it
    pub fn final_color(&self) -> Vec4 {
        srgb_to_linear(self.color.extend(1.0)) * self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_color_is_linear_and_scaled() {
        let light = Light::point(Vec3::new(1.0, 0.5, 0.0), 2.0, 5.0);
        let color = light.final_color();
        assert!((color.x - 2.0).abs() < 1e-5);
        assert!(color.y < 1.0 && color.y > 0.4);
        assert_eq!(color.z, 0.0);
    }
}
