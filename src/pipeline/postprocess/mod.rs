//! Post-processing stack
//!
//! Runs bloom, bakes the color grading LUT (tone mapping included), applies
//! FXAA and composites the result into the camera target, rescaling when the
//! camera renders at a different resolution.

mod bloom;
mod color_grading;
mod passes;
mod settings;

pub use bloom::*;
pub use color_grading::LutLayout;
pub use passes::PostFxPass;
pub use settings::*;

use glam::UVec2;

use crate::backend::types::*;
use crate::backend::RenderContext;
use crate::command::{properties, CommandBuffer, RenderTargetId, TemporaryDescriptor, TextureId};
use crate::config::{BicubicRescalingMode, ColorLutResolution, FinalBlendMode, FxaaSettings};
use crate::scene::{Camera, CameraType};
use passes::draw;

const BUFFER_NAME: &str = "Post FX";

const COLOR_GRADING_LUT: TextureId = TextureId::named(properties::COLOR_GRADING_LUT);
const COLOR_GRADING_RESULT: TextureId = TextureId::named(properties::COLOR_GRADING_RESULT);
const FINAL_RESULT: TextureId = TextureId::named(properties::FINAL_RESULT);

/// Per-camera inputs of the stack
#[derive(Debug, Clone)]
pub struct PostFxFrame {
    pub camera_type: CameraType,
    /// Native camera resolution
    pub camera_size: UVec2,
    pub pixel_rect: Rect,
    pub full_view: bool,
    /// Working resolution after render scale
    pub buffer_size: UVec2,
    pub settings: Option<PostFxSettings>,
    pub keep_alpha: bool,
    pub use_hdr: bool,
    pub color_lut_resolution: ColorLutResolution,
    pub final_blend_mode: FinalBlendMode,
    pub bicubic_rescaling: BicubicRescalingMode,
    pub fxaa: FxaaSettings,
}

impl PostFxFrame {
    /// Frame description for `camera` with everything else at defaults
    pub fn for_camera(camera: &Camera, buffer_size: UVec2, settings: Option<PostFxSettings>) -> Self {
        Self {
            camera_type: camera.camera_type,
            camera_size: camera.pixel_size(),
            pixel_rect: camera.pixel_rect(),
            full_view: camera.is_full_view(),
            buffer_size,
            settings,
            keep_alpha: false,
            use_hdr: false,
            color_lut_resolution: ColorLutResolution::default(),
            final_blend_mode: FinalBlendMode::default(),
            bicubic_rescaling: BicubicRescalingMode::Off,
            fxaa: FxaaSettings::default(),
        }
    }
}

/// Post-processing for one camera at a time
pub struct PostFxStack {
    buffer: CommandBuffer,
    frame: Option<PostFxFrame>,
}

impl PostFxStack {
    pub fn new() -> Self {
        Self {
            buffer: CommandBuffer::new(BUFFER_NAME),
            frame: None,
        }
    }

    /// Configure the stack for the next camera. Settings are dropped for
    /// camera types that never get post-processing.
    pub fn setup(&mut self, mut frame: PostFxFrame) {
        if !matches!(frame.camera_type, CameraType::Game | CameraType::SceneView) {
            frame.settings = None;
        }
        self.frame = Some(frame);
    }

    /// Whether `render` will do anything for the configured camera
    pub fn is_active(&self) -> bool {
        self.frame
            .as_ref()
            .is_some_and(|frame| frame.settings.is_some())
    }

    /// Composite `source` into the camera target
    pub fn render(&mut self, context: &mut dyn RenderContext, source: TextureId) {
        let Some(frame) = self.frame.as_ref() else {
            log::warn!("PostFxStack: render called before setup");
            return;
        };
        let Some(settings) = frame.settings.as_ref() else {
            return;
        };

        let format = TextureFormat::color(frame.use_hdr);
        let bloom_size = if settings.bloom.ignore_render_scale {
            frame.camera_size
        } else {
            frame.buffer_size
        };

        match BloomPlan::new(&settings.bloom, bloom_size) {
            Some(plan) => {
                log::trace!("PostFxStack: bloom with {} levels", plan.depth());
                bloom::record_bloom(
                    &mut self.buffer,
                    settings.program,
                    &settings.bloom,
                    &plan,
                    source.into(),
                    frame.buffer_size,
                    format,
                );
                Self::do_final(&mut self.buffer, frame, settings, BLOOM_RESULT.into());
                self.buffer.release_temporary(BLOOM_RESULT);
            }
            None => {
                log::debug!("PostFxStack: bloom inactive");
                Self::do_final(&mut self.buffer, frame, settings, source.into());
            }
        }

        context.execute_command_buffer(&self.buffer);
        self.buffer.clear();
    }

    fn do_final(
        buffer: &mut CommandBuffer,
        frame: &PostFxFrame,
        settings: &PostFxSettings,
        source: RenderTargetId,
    ) {
        let program = settings.program;
        color_grading::configure_grading(buffer, settings);

        let lut = LutLayout::new(frame.color_lut_resolution.size());
        buffer.get_temporary(TemporaryDescriptor::color(
            COLOR_GRADING_LUT,
            lut.size(),
            TextureFormat::Rgba16Float,
        ));
        buffer.set_global_vector(properties::COLOR_GRADING_LUT_PARAMETERS, lut.bake_parameters());
        let mode = settings.tone_mapping.mode;
        let log_c = frame.use_hdr && mode != ToneMappingMode::None;
        buffer.set_global_float(
            properties::COLOR_GRADING_LUT_IN_LOG_C,
            if log_c { 1.0 } else { 0.0 },
        );
        draw(buffer, program, source, COLOR_GRADING_LUT, PostFxPass::color_grading(mode));
        buffer.set_global_vector(properties::COLOR_GRADING_LUT_PARAMETERS, lut.apply_parameters());

        buffer.set_global_float(properties::FINAL_SRC_BLEND, 1.0);
        buffer.set_global_float(properties::FINAL_DST_BLEND, 0.0);
        if frame.fxaa.enabled {
            color_grading::configure_fxaa(buffer, &frame.fxaa);
            buffer.get_temporary(TemporaryDescriptor::color(
                COLOR_GRADING_RESULT,
                frame.buffer_size,
                TextureFormat::Rgba8Unorm,
            ));
            draw(
                buffer,
                program,
                source,
                COLOR_GRADING_RESULT,
                PostFxPass::apply_color_grading(frame.keep_alpha),
            );
        }

        if frame.buffer_size == frame.camera_size {
            if frame.fxaa.enabled {
                Self::draw_final(
                    buffer,
                    frame,
                    program,
                    COLOR_GRADING_RESULT.into(),
                    PostFxPass::fxaa(frame.keep_alpha),
                );
                buffer.release_temporary(COLOR_GRADING_RESULT);
            } else {
                Self::draw_final(buffer, frame, program, source, PostFxPass::ApplyColorGrading);
            }
        } else {
            buffer.get_temporary(TemporaryDescriptor::color(
                FINAL_RESULT,
                frame.buffer_size,
                TextureFormat::Rgba8Unorm,
            ));
            if frame.fxaa.enabled {
                draw(
                    buffer,
                    program,
                    COLOR_GRADING_RESULT,
                    FINAL_RESULT,
                    PostFxPass::fxaa(frame.keep_alpha),
                );
                buffer.release_temporary(COLOR_GRADING_RESULT);
            } else {
                draw(buffer, program, source, FINAL_RESULT, PostFxPass::ApplyColorGrading);
            }
            let bicubic = match frame.bicubic_rescaling {
                BicubicRescalingMode::UpAndDown => true,
                BicubicRescalingMode::UpOnly => frame.buffer_size.x < frame.camera_size.x,
                BicubicRescalingMode::Off => false,
            };
            buffer.set_global_float(properties::COPY_BICUBIC, if bicubic { 1.0 } else { 0.0 });
            Self::draw_final(buffer, frame, program, FINAL_RESULT.into(), PostFxPass::FinalRescale);
            buffer.release_temporary(FINAL_RESULT);
        }

        buffer.release_temporary(COLOR_GRADING_LUT);
    }

    fn draw_final(
        buffer: &mut CommandBuffer,
        frame: &PostFxFrame,
        program: ProgramHandle,
        from: RenderTargetId,
        pass: PostFxPass,
    ) {
        let blend = frame.final_blend_mode;
        buffer.set_global_float(properties::FINAL_SRC_BLEND, blend.source.shader_value());
        buffer.set_global_float(properties::FINAL_DST_BLEND, blend.destination.shader_value());
        buffer.set_global_texture(properties::POST_FX_SOURCE, from);
        let load = if blend.destination == BlendFactor::Zero && frame.full_view {
            LoadOp::DontCare
        } else {
            LoadOp::Load
        };
        buffer.set_render_target(RenderTargetId::CameraTarget, load, StoreOp::Store);
        buffer.set_viewport(frame.pixel_rect);
        buffer.draw_procedural(program, pass.index());
    }
}

impl Default for PostFxStack {
    fn default() -> Self {
        Self::new()
    }
}
