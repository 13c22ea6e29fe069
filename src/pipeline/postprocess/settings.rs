//! Post-processing configuration

use glam::{Vec3, Vec4};

use crate::backend::types::ProgramHandle;

/// How bloom is composited back onto the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BloomMode {
    #[default]
    Additive,
    /// Energy conserving
    Scattering,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Pyramid levels, at most 16
    pub max_iterations: u32,
    /// Smallest level edge in pixels
    pub downscale_limit: u32,
    pub bicubic_upsampling: bool,
    /// Brightness threshold in gamma space
    pub threshold: f32,
    pub threshold_knee: f32,
    pub intensity: f32,
    pub fade_fireflies: bool,
    pub mode: BloomMode,
    /// Scatter factor for [`BloomMode::Scattering`], in `[0.05, 0.95]`
    pub scatter: f32,
    /// Size the pyramid from the camera instead of the scaled buffer
    pub ignore_render_scale: bool,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            max_iterations: 16,
            downscale_limit: 2,
            bicubic_upsampling: false,
            threshold: 0.5,
            threshold_knee: 0.5,
            intensity: 1.0,
            fade_fireflies: false,
            mode: BloomMode::Additive,
            scatter: 0.7,
            ignore_render_scale: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAdjustmentsSettings {
    /// Exposure in stops
    pub post_exposure: f32,
    /// In `[-100, 100]`
    pub contrast: f32,
    /// Gamma space, HDR allowed
    pub color_filter: Vec4,
    /// Degrees in `[-180, 180]`
    pub hue_shift: f32,
    /// In `[-100, 100]`
    pub saturation: f32,
}

impl Default for ColorAdjustmentsSettings {
    fn default() -> Self {
        Self {
            post_exposure: 0.0,
            contrast: 0.0,
            color_filter: Vec4::ONE,
            hue_shift: 0.0,
            saturation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WhiteBalanceSettings {
    pub temperature: f32,
    pub tint: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitToningSettings {
    pub shadows: Vec4,
    pub highlights: Vec4,
    /// In `[-100, 100]`
    pub balance: f32,
}

impl Default for SplitToningSettings {
    fn default() -> Self {
        Self {
            shadows: Vec4::new(0.5, 0.5, 0.5, 1.0),
            highlights: Vec4::new(0.5, 0.5, 0.5, 1.0),
            balance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMixerSettings {
    pub red: Vec3,
    pub green: Vec3,
    pub blue: Vec3,
}

impl Default for ChannelMixerSettings {
    fn default() -> Self {
        Self {
            red: Vec3::X,
            green: Vec3::Y,
            blue: Vec3::Z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowsMidtonesHighlightsSettings {
    pub shadows: Vec4,
    pub midtones: Vec4,
    pub highlights: Vec4,
    pub shadows_start: f32,
    pub shadows_end: f32,
    pub highlights_start: f32,
    pub highlights_end: f32,
}

impl Default for ShadowsMidtonesHighlightsSettings {
    fn default() -> Self {
        Self {
            shadows: Vec4::ONE,
            midtones: Vec4::ONE,
            highlights: Vec4::ONE,
            shadows_start: 0.0,
            shadows_end: 0.3,
            highlights_start: 0.55,
            highlights_end: 1.0,
        }
    }
}

/// Tone mapping operator baked into the color grading LUT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneMappingMode {
    #[default]
    None,
    Aces,
    Neutral,
    Reinhard,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToneMappingSettings {
    pub mode: ToneMappingMode,
}

/// Settings for the whole post-processing stack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostFxSettings {
    /// Program providing every post-fx pass
    pub program: ProgramHandle,
    pub bloom: BloomSettings,
    pub color_adjustments: ColorAdjustmentsSettings,
    pub white_balance: WhiteBalanceSettings,
    pub split_toning: SplitToningSettings,
    pub channel_mixer: ChannelMixerSettings,
    pub shadows_midtones_highlights: ShadowsMidtonesHighlightsSettings,
    pub tone_mapping: ToneMappingSettings,
}

impl PostFxSettings {
    pub fn new(program: ProgramHandle) -> Self {
        Self {
            program,
            bloom: BloomSettings::default(),
            color_adjustments: ColorAdjustmentsSettings::default(),
            white_balance: WhiteBalanceSettings::default(),
            split_toning: SplitToningSettings::default(),
            channel_mixer: ChannelMixerSettings::default(),
            shadows_midtones_highlights: ShadowsMidtonesHighlightsSettings::default(),
            tone_mapping: ToneMappingSettings::default(),
        }
    }
}
