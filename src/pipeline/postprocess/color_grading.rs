//! Color grading parameters and LUT layout

use glam::{UVec2, Vec4};

use super::settings::PostFxSettings;
use crate::color::{srgb_to_linear, white_balance_coefficients};
use crate::command::{properties, CommandBuffer};
use crate::config::{FxaaQuality, FxaaSettings};

/// A 3D LUT of edge `resolution` unrolled into a `resolution² × resolution`
/// strip of slices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LutLayout {
    pub resolution: u32,
}

impl LutLayout {
    pub fn new(resolution: u32) -> Self {
        Self { resolution }
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.resolution * self.resolution, self.resolution)
    }

    /// Parameters while baking: `(height, 0.5 / width, 0.5 / height,
    /// height / (height - 1))`
    pub fn bake_parameters(&self) -> Vec4 {
        let size = self.size().as_vec2();
        Vec4::new(
            size.y,
            0.5 / size.x,
            0.5 / size.y,
            size.y / (size.y - 1.0),
        )
    }

    /// Parameters while sampling: `(1 / width, 1 / height, height - 1)`
    pub fn apply_parameters(&self) -> Vec4 {
        let size = self.size().as_vec2();
        Vec4::new(1.0 / size.x, 1.0 / size.y, size.y - 1.0, 0.0)
    }
}

/// Record every grading parameter block the LUT bake reads
pub(crate) fn configure_grading(buffer: &mut CommandBuffer, settings: &PostFxSettings) {
    let adjustments = &settings.color_adjustments;
    buffer.set_global_vector(
        properties::COLOR_ADJUSTMENTS,
        Vec4::new(
            2.0_f32.powf(adjustments.post_exposure),
            adjustments.contrast * 0.01 + 1.0,
            adjustments.hue_shift * (1.0 / 360.0),
            adjustments.saturation * 0.01 + 1.0,
        ),
    );
    buffer.set_global_vector(
        properties::COLOR_FILTER,
        srgb_to_linear(adjustments.color_filter),
    );

    let white_balance = &settings.white_balance;
    buffer.set_global_vector(
        properties::WHITE_BALANCE,
        white_balance_coefficients(white_balance.temperature, white_balance.tint).extend(0.0),
    );

    let split_toning = &settings.split_toning;
    let mut split_shadows = split_toning.shadows;
    split_shadows.w = split_toning.balance * 0.01;
    buffer.set_global_vector(properties::SPLIT_TONING_SHADOWS, split_shadows);
    buffer.set_global_vector(properties::SPLIT_TONING_HIGHLIGHTS, split_toning.highlights);

    let mixer = &settings.channel_mixer;
    buffer.set_global_vector(properties::CHANNEL_MIXER_RED, mixer.red.extend(0.0));
    buffer.set_global_vector(properties::CHANNEL_MIXER_GREEN, mixer.green.extend(0.0));
    buffer.set_global_vector(properties::CHANNEL_MIXER_BLUE, mixer.blue.extend(0.0));

    let smh = &settings.shadows_midtones_highlights;
    buffer.set_global_vector(properties::SMH_SHADOWS, srgb_to_linear(smh.shadows));
    buffer.set_global_vector(properties::SMH_MIDTONES, srgb_to_linear(smh.midtones));
    buffer.set_global_vector(properties::SMH_HIGHLIGHTS, srgb_to_linear(smh.highlights));
    buffer.set_global_vector(
        properties::SMH_RANGE,
        Vec4::new(
            smh.shadows_start,
            smh.shadows_end,
            smh.highlights_start,
            smh.highlights_end,
        ),
    );
}

/// Record FXAA quality keywords and thresholds
pub(crate) fn configure_fxaa(buffer: &mut CommandBuffer, fxaa: &FxaaSettings) {
    let (low, medium) = match fxaa.quality {
        FxaaQuality::Low => (true, false),
        FxaaQuality::Medium => (false, true),
        FxaaQuality::High => (false, false),
    };
    buffer.set_keyword(properties::FXAA_QUALITY_LOW_KEYWORD, low);
    buffer.set_keyword(properties::FXAA_QUALITY_MEDIUM_KEYWORD, medium);
    buffer.set_global_vector(
        properties::FXAA_CONFIG,
        Vec4::new(
            fxaa.fixed_threshold,
            fxaa.relative_threshold,
            fxaa.subpixel_blending,
            0.0,
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::ProgramHandle;
    use crate::backend::{HeadlessContext, RenderContext};
    use approx::assert_relative_eq;

    #[test]
    fn test_lut_layout() {
        let lut = LutLayout::new(32);
        assert_eq!(lut.size(), UVec2::new(1024, 32));
        let bake = lut.bake_parameters();
        assert_eq!(bake.x, 32.0);
        assert_relative_eq!(bake.y, 0.5 / 1024.0);
        assert_relative_eq!(bake.w, 32.0 / 31.0);
        assert_eq!(lut.apply_parameters().z, 31.0);
    }

    #[test]
    fn test_default_grading_is_neutral() {
        let mut buffer = CommandBuffer::new("grading");
        configure_grading(&mut buffer, &PostFxSettings::new(ProgramHandle(1)));
        let mut context = HeadlessContext::new();
        context.execute_command_buffer(&buffer);

        assert_eq!(
            context.global_vector(properties::COLOR_ADJUSTMENTS),
            Some(Vec4::new(1.0, 1.0, 0.0, 1.0))
        );
        assert_eq!(
            context.global_vector(properties::CHANNEL_MIXER_GREEN),
            Some(Vec4::new(0.0, 1.0, 0.0, 0.0))
        );
        assert_eq!(
            context.global_vector(properties::SMH_RANGE),
            Some(Vec4::new(0.0, 0.3, 0.55, 1.0))
        );
        let split = context.global_vector(properties::SPLIT_TONING_SHADOWS).unwrap();
        assert_eq!(split.w, 0.0);
    }

    #[test]
    fn test_fxaa_quality_keywords() {
        let mut buffer = CommandBuffer::new("fxaa");
        let fxaa = FxaaSettings {
            quality: FxaaQuality::Medium,
            ..Default::default()
        };
        configure_fxaa(&mut buffer, &fxaa);
        let mut context = HeadlessContext::new();
        context.execute_command_buffer(&buffer);
        assert!(context.keyword_enabled(properties::FXAA_QUALITY_MEDIUM_KEYWORD));
        assert!(!context.keyword_enabled(properties::FXAA_QUALITY_LOW_KEYWORD));
        assert_relative_eq!(
            context.global_vector(properties::FXAA_CONFIG).unwrap().x,
            0.0833
        );
    }
}
