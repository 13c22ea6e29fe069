//! Pipeline, camera and shadow configuration

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::backend::types::{BlendFactor, ProgramHandle};
use crate::pipeline::postprocess::PostFxSettings;

/// Lower bound of the render scale range
pub const MIN_RENDER_SCALE: f32 = 0.1;
/// Upper bound of the render scale range
pub const MAX_RENDER_SCALE: f32 = 2.0;

/// When bicubic sampling is used for the final rescale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BicubicRescalingMode {
    #[default]
    Off,
    UpOnly,
    UpAndDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FxaaQuality {
    #[default]
    Low,
    Medium,
    High,
}

/// FXAA parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxaaSettings {
    pub enabled: bool,
    /// Minimum contrast for an edge, in `[0.0312, 0.0833]`
    pub fixed_threshold: f32,
    /// Contrast relative to the local maximum, in `[0.063, 0.333]`
    pub relative_threshold: f32,
    pub subpixel_blending: f32,
    pub quality: FxaaQuality,
}

impl Default for FxaaSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            fixed_threshold: 0.0833,
            relative_threshold: 0.166,
            subpixel_blending: 0.75,
            quality: FxaaQuality::Low,
        }
    }
}

/// Settings for the camera's intermediate buffers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBufferSettings {
    pub allow_hdr: bool,
    pub copy_color: bool,
    pub copy_color_reflection: bool,
    pub copy_depth: bool,
    pub copy_depth_reflection: bool,
    pub bicubic_rescaling: BicubicRescalingMode,
    /// Global render scale in `[0.1, 2.0]`
    pub render_scale: f32,
    pub fxaa: FxaaSettings,
}

impl Default for CameraBufferSettings {
    fn default() -> Self {
        Self {
            allow_hdr: true,
            copy_color: false,
            copy_color_reflection: false,
            copy_depth: false,
            copy_depth_reflection: false,
            bicubic_rescaling: BicubicRescalingMode::Off,
            render_scale: 1.0,
            fxaa: FxaaSettings::default(),
        }
    }
}

/// How a camera's own render scale combines with the global one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderScaleMode {
    #[default]
    Inherit,
    Multiply,
    Override,
}

/// Blend factors used when compositing onto the camera target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalBlendMode {
    pub source: BlendFactor,
    pub destination: BlendFactor,
}

impl Default for FinalBlendMode {
    fn default() -> Self {
        Self {
            source: BlendFactor::One,
            destination: BlendFactor::Zero,
        }
    }
}

/// Per-camera overrides
#[derive(Component, Debug, Clone, PartialEq)]
pub struct CameraSettings {
    pub copy_color: bool,
    pub copy_depth: bool,
    pub rendering_layer_mask: u32,
    /// Use `post_fx_settings` instead of the pipeline's post-fx settings
    pub override_post_fx: bool,
    pub post_fx_settings: Option<PostFxSettings>,
    pub allow_fxaa: bool,
    pub keep_alpha: bool,
    /// Only let lights on `rendering_layer_mask` affect this camera
    pub mask_lights: bool,
    pub render_scale_mode: RenderScaleMode,
    pub render_scale: f32,
    pub final_blend_mode: FinalBlendMode,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            copy_color: true,
            copy_depth: true,
            rendering_layer_mask: u32::MAX,
            override_post_fx: false,
            post_fx_settings: None,
            allow_fxaa: false,
            keep_alpha: false,
            mask_lights: false,
            render_scale_mode: RenderScaleMode::Inherit,
            render_scale: 1.0,
            final_blend_mode: FinalBlendMode::default(),
        }
    }
}

impl CameraSettings {
    /// Combine this camera's render scale with the global one (unclamped)
    pub fn render_scale(&self, global: f32) -> f32 {
        match self.render_scale_mode {
            RenderScaleMode::Inherit => global,
            RenderScaleMode::Override => self.render_scale,
            RenderScaleMode::Multiply => global * self.render_scale,
        }
    }

    /// Layer mask applied to lights
    pub fn light_mask(&self) -> u32 {
        if self.mask_lights {
            self.rendering_layer_mask
        } else {
            u32::MAX
        }
    }
}

/// Shadow atlas size in texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapSize {
    Size256,
    Size512,
    #[default]
    Size1024,
    Size2048,
    Size4096,
    Size8192,
}

impl MapSize {
    pub fn texels(self) -> u32 {
        match self {
            MapSize::Size256 => 256,
            MapSize::Size512 => 512,
            MapSize::Size1024 => 1024,
            MapSize::Size2048 => 2048,
            MapSize::Size4096 => 4096,
            MapSize::Size8192 => 8192,
        }
    }
}

/// Shadow filter kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowFilter {
    #[default]
    Pcf2x2,
    Pcf3x3,
    Pcf5x5,
    Pcf7x7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadeBlendMode {
    #[default]
    Hard,
    Soft,
    Dither,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalShadowSettings {
    pub atlas_size: MapSize,
    pub filter: ShadowFilter,
    pub cascade_count: u32,
    pub cascade_ratios: Vec3,
    pub cascade_fade: f32,
    pub cascade_blend: CascadeBlendMode,
}

impl Default for DirectionalShadowSettings {
    fn default() -> Self {
        Self {
            atlas_size: MapSize::Size1024,
            filter: ShadowFilter::Pcf2x2,
            cascade_count: 4,
            cascade_ratios: Vec3::new(0.1, 0.25, 0.5),
            cascade_fade: 0.1,
            cascade_blend: CascadeBlendMode::Hard,
        }
    }
}

impl DirectionalShadowSettings {
    /// Cascade count clamped to `1..=4`
    pub fn cascades(&self) -> u32 {
        self.cascade_count.clamp(1, 4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OtherShadowSettings {
    pub atlas_size: MapSize,
    pub filter: ShadowFilter,
}

/// Shadow configuration handed to the shadow subsystem
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    pub max_distance: f32,
    pub distance_fade: f32,
    pub directional: DirectionalShadowSettings,
    pub other: OtherShadowSettings,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            distance_fade: 0.1,
            directional: DirectionalShadowSettings::default(),
            other: OtherShadowSettings::default(),
        }
    }
}

/// Edge length of the baked color grading LUT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorLutResolution {
    Lut16,
    #[default]
    Lut32,
    Lut64,
}

impl ColorLutResolution {
    pub fn size(self) -> u32 {
        match self {
            ColorLutResolution::Lut16 => 16,
            ColorLutResolution::Lut32 => 32,
            ColorLutResolution::Lut64 => 64,
        }
    }
}

/// Configuration for the whole pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub camera_buffer: CameraBufferSettings,
    pub use_dynamic_batching: bool,
    pub use_gpu_instancing: bool,
    pub use_lights_per_object: bool,
    pub shadows: ShadowSettings,
    /// No post-processing when `None`
    pub post_fx: Option<PostFxSettings>,
    pub color_lut_resolution: ColorLutResolution,
    /// Program used for camera copies and the final blit
    pub camera_program: ProgramHandle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            camera_buffer: CameraBufferSettings::default(),
            use_dynamic_batching: true,
            use_gpu_instancing: true,
            use_lights_per_object: true,
            shadows: ShadowSettings::default(),
            post_fx: None,
            color_lut_resolution: ColorLutResolution::default(),
            camera_program: ProgramHandle(0),
        }
    }
}
