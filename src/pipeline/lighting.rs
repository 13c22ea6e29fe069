//! Lighting packer
//!
//! Converts the visible lights of a camera into the fixed-capacity arrays
//! the lit shaders read, and optionally the per-object light index map.

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::backend::RenderContext;
use crate::command::{properties, CommandBuffer};
use crate::config::ShadowSettings;
use crate::scene::LightType;
use crate::shadows::{AtlasShadows, ShadowSubsystem};
use crate::visibility::{VisibilitySet, VisibleLight};

pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_OTHER_LIGHTS: usize = 64;

const BUFFER_NAME: &str = "Lighting";

/// Light arrays in the layout shaders read them.
///
/// Only the first `count` slots of each array are meaningful; slots past the
/// count keep whatever an earlier frame wrote there.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PackedLightData {
    pub directional_colors: [Vec4; MAX_DIRECTIONAL_LIGHTS],
    /// xyz = direction towards the light, w = rendering layer mask bits
    pub directional_directions_and_masks: [Vec4; MAX_DIRECTIONAL_LIGHTS],
    pub directional_shadow_data: [Vec4; MAX_DIRECTIONAL_LIGHTS],
    pub other_colors: [Vec4; MAX_OTHER_LIGHTS],
    /// xyz = position, w = 1 / range²
    pub other_positions: [Vec4; MAX_OTHER_LIGHTS],
    pub other_directions_and_masks: [Vec4; MAX_OTHER_LIGHTS],
    /// x = 1 / (cos inner - cos outer), y = -cos outer * x
    pub other_spot_angles: [Vec4; MAX_OTHER_LIGHTS],
    pub other_shadow_data: [Vec4; MAX_OTHER_LIGHTS],
}

impl Default for PackedLightData {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// What the packer produced for one camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingOutput {
    pub directional_count: usize,
    pub other_count: usize,
    /// Per-object light lists are active; geometry draws must request
    /// light data and indices
    pub lights_per_object: bool,
}

/// Store a mask's bits in a float lane without converting the value
fn mask_as_float(mask: u32) -> f32 {
    f32::from_bits(mask)
}

/// Spot cone falloff as `(1 / (cos_inner - cos_outer), -cos_outer / ...)`.
///
/// Angles are full cone angles in degrees.
pub fn spot_angle_falloff(inner_angle: f32, outer_angle: f32) -> Vec4 {
    let inner_cos = (0.5 * inner_angle).to_radians().cos();
    let outer_cos = (0.5 * outer_angle).to_radians().cos();
    let angle_range_inv = 1.0 / (inner_cos - outer_cos).max(0.001);
    Vec4::new(angle_range_inv, -outer_cos * angle_range_inv, 0.0, 0.0)
}

fn inverse_range_squared(range: f32) -> f32 {
    1.0 / (range * range).max(0.00001)
}

/// Packs visible lights into [`PackedLightData`] and records it
pub struct LightingPacker {
    buffer: CommandBuffer,
    data: Box<PackedLightData>,
    shadows: Box<dyn ShadowSubsystem>,
}

impl LightingPacker {
    pub fn new() -> Self {
        Self::with_shadows(Box::new(AtlasShadows::new()))
    }

    pub fn with_shadows(shadows: Box<dyn ShadowSubsystem>) -> Self {
        Self {
            buffer: CommandBuffer::new(BUFFER_NAME),
            data: Box::default(),
            shadows,
        }
    }

    /// The arrays as last packed
    pub fn packed(&self) -> &PackedLightData {
        &self.data
    }

    /// Pack the lights of `visibility`, reserve shadows and record the
    /// lighting globals into `context`
    pub fn setup(
        &mut self,
        context: &mut dyn RenderContext,
        visibility: &mut VisibilitySet,
        shadow_settings: &ShadowSettings,
        use_lights_per_object: bool,
        rendering_layer_mask: u32,
    ) -> LightingOutput {
        self.buffer.begin_sample(BUFFER_NAME);
        self.shadows.setup(shadow_settings);
        let output = self.setup_lights(visibility, use_lights_per_object, rendering_layer_mask);
        self.execute_buffer(context);

        self.shadows.render(context);
        self.buffer.end_sample(BUFFER_NAME);
        self.execute_buffer(context);

        log::trace!(
            "Lighting: packed {} directional, {} other lights",
            output.directional_count,
            output.other_count
        );
        output
    }

    /// Release shadow resources acquired during setup
    pub fn cleanup(&mut self, context: &mut dyn RenderContext) {
        self.shadows.cleanup(context);
    }

    fn setup_lights(
        &mut self,
        visibility: &mut VisibilitySet,
        use_lights_per_object: bool,
        rendering_layer_mask: u32,
    ) -> LightingOutput {
        let mut index_map = use_lights_per_object.then(|| visibility.light_index_map());
        let mut dir_count = 0;
        let mut other_count = 0;

        let lights = visibility.lights();
        for (i, light) in lights.iter().enumerate() {
            let mut new_index = -1;
            if light.rendering_layer_mask & rendering_layer_mask != 0 {
                match light.light_type {
                    LightType::Directional => {
                        if dir_count < MAX_DIRECTIONAL_LIGHTS {
                            self.setup_directional_light(dir_count, i, light);
                            dir_count += 1;
                        }
                    }
                    LightType::Point => {
                        if other_count < MAX_OTHER_LIGHTS {
                            new_index = other_count as i32;
                            self.setup_point_light(other_count, i, light);
                            other_count += 1;
                        }
                    }
                    LightType::Spot => {
                        if other_count < MAX_OTHER_LIGHTS {
                            new_index = other_count as i32;
                            self.setup_spot_light(other_count, i, light);
                            other_count += 1;
                        }
                    }
                    LightType::Area | LightType::Other => {}
                }
            }
            if let Some(map) = index_map.as_mut() {
                if let Some(slot) = map.get_mut(i) {
                    *slot = new_index;
                }
            }
        }

        if let Some(mut map) = index_map {
            for slot in map.iter_mut().skip(lights.len()) {
                *slot = -1;
            }
            visibility.set_light_index_map(map);
        }
        self.buffer
            .set_keyword(properties::LIGHTS_PER_OBJECT_KEYWORD, use_lights_per_object);

        let data = &*self.data;
        self.buffer
            .set_global_int(properties::DIR_LIGHT_COUNT, dir_count as i32);
        if dir_count > 0 {
            self.buffer
                .set_global_vector_array(properties::DIR_LIGHT_COLORS, &data.directional_colors);
            self.buffer.set_global_vector_array(
                properties::DIR_LIGHT_DIRECTIONS_AND_MASKS,
                &data.directional_directions_and_masks,
            );
            self.buffer.set_global_vector_array(
                properties::DIR_LIGHT_SHADOW_DATA,
                &data.directional_shadow_data,
            );
        }

        self.buffer
            .set_global_int(properties::OTHER_LIGHT_COUNT, other_count as i32);
        if other_count > 0 {
            self.buffer
                .set_global_vector_array(properties::OTHER_LIGHT_COLORS, &data.other_colors);
            self.buffer
                .set_global_vector_array(properties::OTHER_LIGHT_POSITIONS, &data.other_positions);
            self.buffer.set_global_vector_array(
                properties::OTHER_LIGHT_DIRECTIONS_AND_MASKS,
                &data.other_directions_and_masks,
            );
            self.buffer.set_global_vector_array(
                properties::OTHER_LIGHT_SPOT_ANGLES,
                &data.other_spot_angles,
            );
            self.buffer.set_global_vector_array(
                properties::OTHER_LIGHT_SHADOW_DATA,
                &data.other_shadow_data,
            );
        }

        LightingOutput {
            directional_count: dir_count,
            other_count,
            lights_per_object: use_lights_per_object,
        }
    }

    fn setup_directional_light(&mut self, index: usize, visible_index: usize, light: &VisibleLight) {
        let data = &mut *self.data;
        data.directional_colors[index] = light.final_color;
        let mut dir_and_mask = -light.local_to_world.z_axis;
        dir_and_mask.w = mask_as_float(light.rendering_layer_mask);
        data.directional_directions_and_masks[index] = dir_and_mask;
        data.directional_shadow_data[index] =
            self.shadows.reserve_directional_shadows(light, visible_index);
    }

    fn setup_point_light(&mut self, index: usize, visible_index: usize, light: &VisibleLight) {
        let data = &mut *self.data;
        data.other_colors[index] = light.final_color;
        let mut position = light.local_to_world.w_axis;
        position.w = inverse_range_squared(light.range);
        data.other_positions[index] = position;
        data.other_spot_angles[index] = Vec4::new(0.0, 1.0, 0.0, 0.0);
        data.other_directions_and_masks[index] =
            Vec4::new(0.0, 0.0, 0.0, mask_as_float(light.rendering_layer_mask));
        data.other_shadow_data[index] = self.shadows.reserve_other_shadows(light, visible_index);
    }

    fn setup_spot_light(&mut self, index: usize, visible_index: usize, light: &VisibleLight) {
        let data = &mut *self.data;
        data.other_colors[index] = light.final_color;
        let mut position = light.local_to_world.w_axis;
        position.w = inverse_range_squared(light.range);
        data.other_positions[index] = position;
        let mut dir_and_mask = -light.local_to_world.z_axis;
        dir_and_mask.w = mask_as_float(light.rendering_layer_mask);
        data.other_directions_and_masks[index] = dir_and_mask;
        data.other_spot_angles[index] = spot_angle_falloff(light.inner_spot_angle, light.spot_angle);
        data.other_shadow_data[index] = self.shadows.reserve_other_shadows(light, visible_index);
    }

    fn execute_buffer(&mut self, context: &mut dyn RenderContext) {
        context.execute_command_buffer(&self.buffer);
        self.buffer.clear();
    }
}

impl Default for LightingPacker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessContext;
    use crate::scene::{Light, Transform};
    use crate::shadows::NoShadows;
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn visible(light: Light, position: Vec3) -> VisibleLight {
        VisibleLight::from_light(&light, &Transform::from_position(position).pointing(-Vec3::Y))
    }

    fn pack(lights: Vec<VisibleLight>, per_object: bool, mask: u32) -> (LightingPacker, HeadlessContext, VisibilitySet, LightingOutput) {
        let mut packer = LightingPacker::with_shadows(Box::new(NoShadows));
        let mut context = HeadlessContext::new();
        let mut visibility = VisibilitySet::new(Vec::new(), lights);
        let output = packer.setup(
            &mut context,
            &mut visibility,
            &ShadowSettings::default(),
            per_object,
            mask,
        );
        (packer, context, visibility, output)
    }

    #[test]
    fn test_directional_direction_is_negated_forward() {
        let (packer, _, _, output) = pack(vec![visible(Light::directional(Vec3::ONE, 1.0), Vec3::ZERO)], false, u32::MAX);
        assert_eq!(output.directional_count, 1);
        let dir = packer.packed().directional_directions_and_masks[0];
        assert_relative_eq!(dir.y, 1.0, epsilon = 1e-5);
        assert_eq!(dir.w.to_bits(), 1);
    }

    #[test]
    fn test_point_light_packing() {
        let (packer, _, _, output) = pack(vec![visible(Light::point(Vec3::ONE, 1.0, 4.0), Vec3::new(1.0, 2.0, 3.0))], false, u32::MAX);
        assert_eq!(output.other_count, 1);
        let data = packer.packed();
        assert_eq!(data.other_positions[0], Vec4::new(1.0, 2.0, 3.0, 1.0 / 16.0));
        assert_eq!(data.other_spot_angles[0], Vec4::new(0.0, 1.0, 0.0, 0.0));
        assert_eq!(data.other_directions_and_masks[0].truncate(), Vec3::ZERO);
    }

    #[test]
    fn test_zero_range_is_guarded() {
        let (packer, _, _, _) = pack(vec![visible(Light::point(Vec3::ONE, 1.0, 0.0), Vec3::ZERO)], false, u32::MAX);
        assert_relative_eq!(packer.packed().other_positions[0].w, 100_000.0, max_relative = 1e-4);
    }

    #[test]
    fn test_spot_falloff() {
        let falloff = spot_angle_falloff(20.0, 30.0);
        let inner = 10.0_f32.to_radians().cos();
        let outer = 15.0_f32.to_radians().cos();
        let inv = 1.0 / (inner - outer).max(0.001);
        assert_relative_eq!(falloff.x, inv, max_relative = 1e-5);
        assert_relative_eq!(falloff.y, -outer * inv, max_relative = 1e-5);
    }

    #[test]
    fn test_equal_spot_angles_clamp_range() {
        let falloff = spot_angle_falloff(30.0, 30.0);
        assert_relative_eq!(falloff.x, 1000.0, max_relative = 1e-4);
    }

    #[test]
    fn test_masked_and_unsupported_lights_are_skipped() {
        let lights = vec![
            visible(Light::point(Vec3::ONE, 1.0, 1.0).with_layer_mask(0b10), Vec3::ZERO),
            visible(Light { light_type: LightType::Area, ..Default::default() }, Vec3::ZERO),
            visible(Light::spot(Vec3::ONE, 1.0, 1.0, 20.0, 30.0), Vec3::ZERO),
        ];
        let (_, context, visibility, output) = pack(lights, true, 0b01);
        assert_eq!(output.other_count, 1);
        assert_eq!(visibility.installed_light_index_map(), Some(&[-1, -1, 0][..]));
        assert_eq!(context.global_int(properties::OTHER_LIGHT_COUNT), Some(1));
        assert_eq!(context.global_int(properties::DIR_LIGHT_COUNT), Some(0));
        assert!(context.global_vector_array(properties::DIR_LIGHT_COLORS).is_none());
        assert!(context.keyword_enabled(properties::LIGHTS_PER_OBJECT_KEYWORD));
    }

    #[test]
    fn test_without_per_object_lights_no_map_is_installed() {
        let (_, context, visibility, output) = pack(vec![visible(Light::point(Vec3::ONE, 1.0, 1.0), Vec3::ZERO)], false, u32::MAX);
        assert!(!output.lights_per_object);
        assert!(visibility.installed_light_index_map().is_none());
        assert!(!context.keyword_enabled(properties::LIGHTS_PER_OBJECT_KEYWORD));
    }

    #[test]
    fn test_packed_block_is_pod() {
        let data = PackedLightData::default();
        let bytes: &[u8] = bytemuck::bytes_of(&data);
        assert_eq!(bytes.len(), (3 * MAX_DIRECTIONAL_LIGHTS + 5 * MAX_OTHER_LIGHTS) * 16);
    }
}
