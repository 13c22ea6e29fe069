//! Shadow subsystem interface
//!
//! The lighting packer only reserves shadow slots; cascade fitting and
//! atlas rendering live behind [`ShadowSubsystem`].

use glam::{UVec2, Vec4};

use crate::backend::RenderContext;
use crate::command::{CommandBuffer, TemporaryDescriptor, TextureId};
use crate::config::ShadowSettings;
use crate::scene::LightType;
use crate::visibility::VisibleLight;

pub const MAX_SHADOWED_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_SHADOWED_OTHER_LIGHTS: usize = 16;

const DIRECTIONAL_ATLAS: TextureId = TextureId::named("_DirectionalShadowAtlas");
const OTHER_ATLAS: TextureId = TextureId::named("_OtherShadowAtlas");

/// Shadow data handed to shading for a light without shadows
pub const NO_SHADOW_DATA: Vec4 = Vec4::new(0.0, 0.0, 0.0, -1.0);

/// Reserves atlas space for shadowed lights and renders the shadow maps
pub trait ShadowSubsystem {
    /// Start a new frame
    fn setup(&mut self, settings: &ShadowSettings);

    /// Reserve cascades for a directional light, returning its shadow data
    /// vector `(strength, first tile, normal bias, mask channel)`
    fn reserve_directional_shadows(&mut self, light: &VisibleLight, visible_index: usize) -> Vec4;

    /// Reserve a tile for a point or spot light
    fn reserve_other_shadows(&mut self, light: &VisibleLight, visible_index: usize) -> Vec4;

    /// Record the shadow map draws
    fn render(&mut self, context: &mut dyn RenderContext);

    /// Release everything acquired by `render`
    fn cleanup(&mut self, context: &mut dyn RenderContext);
}

/// A shadow subsystem that never casts shadows
#[derive(Debug, Default)]
pub struct NoShadows;

impl ShadowSubsystem for NoShadows {
    fn setup(&mut self, _settings: &ShadowSettings) {}

    fn reserve_directional_shadows(&mut self, _light: &VisibleLight, _visible_index: usize) -> Vec4 {
        NO_SHADOW_DATA
    }

    fn reserve_other_shadows(&mut self, _light: &VisibleLight, _visible_index: usize) -> Vec4 {
        NO_SHADOW_DATA
    }

    fn render(&mut self, _context: &mut dyn RenderContext) {}

    fn cleanup(&mut self, _context: &mut dyn RenderContext) {}
}

/// Shadow atlas bookkeeping.
///
/// Hands out cascade and tile slots and acquires the two shadow atlases for
/// the duration of the frame. Caster rendering is left to the host.
pub struct AtlasShadows {
    buffer: CommandBuffer,
    settings: ShadowSettings,
    directional: Vec<usize>,
    other_tiles: usize,
    atlases_acquired: bool,
}

impl AtlasShadows {
    pub fn new() -> Self {
        Self {
            buffer: CommandBuffer::new("Shadows"),
            settings: ShadowSettings::default(),
            directional: Vec::new(),
            other_tiles: 0,
            atlases_acquired: false,
        }
    }

    /// Visible indices of the shadowed directional lights this frame
    pub fn shadowed_directional_lights(&self) -> &[usize] {
        &self.directional
    }

    fn execute_buffer(&mut self, context: &mut dyn RenderContext) {
        context.execute_command_buffer(&self.buffer);
        self.buffer.clear();
    }
}

impl Default for AtlasShadows {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadowSubsystem for AtlasShadows {
    fn setup(&mut self, settings: &ShadowSettings) {
        self.settings = *settings;
        self.directional.clear();
        self.other_tiles = 0;
    }

    fn reserve_directional_shadows(&mut self, light: &VisibleLight, visible_index: usize) -> Vec4 {
        if light.shadow_strength <= 0.0 || self.directional.len() >= MAX_SHADOWED_DIRECTIONAL_LIGHTS {
            return NO_SHADOW_DATA;
        }
        let cascades = self.settings.directional.cascades() as usize;
        let first_tile = cascades * self.directional.len();
        self.directional.push(visible_index);
        Vec4::new(light.shadow_strength, first_tile as f32, 0.0, -1.0)
    }

    fn reserve_other_shadows(&mut self, light: &VisibleLight, _visible_index: usize) -> Vec4 {
        if light.shadow_strength <= 0.0 {
            return NO_SHADOW_DATA;
        }
        // Point lights render one tile per cube face
        let is_point = light.light_type == LightType::Point;
        let tiles = if is_point { 6 } else { 1 };
        if self.other_tiles + tiles > MAX_SHADOWED_OTHER_LIGHTS {
            return Vec4::new(-light.shadow_strength, 0.0, 0.0, -1.0);
        }
        let first_tile = self.other_tiles;
        self.other_tiles += tiles;
        Vec4::new(
            light.shadow_strength,
            first_tile as f32,
            if is_point { 1.0 } else { 0.0 },
            -1.0,
        )
    }

    fn render(&mut self, context: &mut dyn RenderContext) {
        // Shaders always sample both atlases, so a 1x1 stand-in is bound when
        // nothing casts shadows.
        let directional_size = if self.directional.is_empty() {
            1
        } else {
            self.settings.directional.atlas_size.texels()
        };
        let other_size = if self.other_tiles == 0 {
            1
        } else {
            self.settings.other.atlas_size.texels()
        };

        self.buffer.begin_sample("Shadows");
        self.buffer
            .get_temporary(TemporaryDescriptor::depth(DIRECTIONAL_ATLAS, UVec2::splat(directional_size)));
        self.buffer
            .get_temporary(TemporaryDescriptor::depth(OTHER_ATLAS, UVec2::splat(other_size)));
        self.buffer.end_sample("Shadows");
        self.atlases_acquired = true;
        self.execute_buffer(context);
    }

    fn cleanup(&mut self, context: &mut dyn RenderContext) {
        if !self.atlases_acquired {
            return;
        }
        self.buffer.release_temporary(DIRECTIONAL_ATLAS);
        self.buffer.release_temporary(OTHER_ATLAS);
        self.atlases_acquired = false;
        self.execute_buffer(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessContext;
    use crate::scene::{Light, Transform};
    use glam::Vec3;

    fn visible(light: Light) -> VisibleLight {
        VisibleLight::from_light(&light, &Transform::default())
    }

    #[test]
    fn test_directional_tiles_follow_cascades() {
        let mut shadows = AtlasShadows::new();
        shadows.setup(&ShadowSettings::default());
        let sun = visible(Light::directional(Vec3::ONE, 1.0));
        assert_eq!(shadows.reserve_directional_shadows(&sun, 0).y, 0.0);
        assert_eq!(shadows.reserve_directional_shadows(&sun, 1).y, 4.0);
        assert_eq!(shadows.shadowed_directional_lights(), &[0, 1]);
    }

    #[test]
    fn test_point_lights_exhaust_other_tiles() {
        let mut shadows = AtlasShadows::new();
        shadows.setup(&ShadowSettings::default());
        let point = visible(Light::point(Vec3::ONE, 1.0, 5.0));
        assert_eq!(shadows.reserve_other_shadows(&point, 0).y, 0.0);
        assert_eq!(shadows.reserve_other_shadows(&point, 1).y, 6.0);
        assert!(shadows.reserve_other_shadows(&point, 2).x < 0.0);
    }

    #[test]
    fn test_unshadowed_light_gets_no_data() {
        let mut shadows = AtlasShadows::new();
        shadows.setup(&ShadowSettings::default());
        let mut light = Light::point(Vec3::ONE, 1.0, 5.0);
        light.shadow_strength = 0.0;
        assert_eq!(shadows.reserve_other_shadows(&visible(light), 0), NO_SHADOW_DATA);
    }

    #[test]
    fn test_atlases_released_on_cleanup() {
        let mut context = HeadlessContext::new();
        let mut shadows = AtlasShadows::new();
        shadows.setup(&ShadowSettings::default());
        shadows.render(&mut context);
        assert_eq!(context.live_temporary_count(), 2);
        shadows.cleanup(&mut context);
        shadows.cleanup(&mut context);
        assert_eq!(context.live_temporary_count(), 0);
        assert_eq!(context.stats().invalid_operations, 0);
    }
}
