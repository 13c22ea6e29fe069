//! Per-camera frame orchestration
//!
//! A [`CameraRenderer`] records one camera's frame into its own command
//! buffer, drives the lighting packer and the post-fx stack with their own
//! buffers, and submits. Stages always advance in the order of
//! [`RenderStage`].

use std::ops::RangeInclusive;

use glam::{UVec2, Vec4};

use super::environment::{RenderEnvironment, Runtime};
use super::lighting::{LightingOutput, LightingPacker};
use super::postprocess::{PostFxFrame, PostFxStack};
use crate::backend::types::*;
use crate::backend::{BackendResult, RenderContext};
use crate::color::srgb_to_linear;
use crate::command::{
    properties, Command, CommandBuffer, DepthTarget, DrawRenderers, GizmoSubset, PerObjectData,
    RenderQueueRange, RenderTargetId, ShaderTag, SortingCriteria, TemporaryDescriptor, TextureId,
};
use crate::config::{CameraSettings, PipelineConfig, MAX_RENDER_SCALE, MIN_RENDER_SCALE};
use crate::scene::{Camera, CameraClearFlags, CameraType};
use crate::visibility::{VisibilityProvider, VisibilitySet};

const COLOR_ATTACHMENT: TextureId = TextureId::named(properties::CAMERA_COLOR_ATTACHMENT);
const DEPTH_ATTACHMENT: TextureId = TextureId::named(properties::CAMERA_DEPTH_ATTACHMENT);
const COLOR_TEXTURE: TextureId = TextureId::named(properties::CAMERA_COLOR_TEXTURE);
const DEPTH_TEXTURE: TextureId = TextureId::named(properties::CAMERA_DEPTH_TEXTURE);

const LIT_SHADER_TAGS: [ShaderTag; 2] = [ShaderTag::Unlit, ShaderTag::Lit];

/// Scales in this band render at native resolution
const NATIVE_SCALE_BAND: RangeInclusive<f32> = 0.99..=1.01;

/// Camera program pass copying color
const COPY_PASS: u32 = 0;
/// Camera program pass copying depth
const COPY_DEPTH_PASS: u32 = 1;

/// Progress through one camera's frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderStage {
    Idle,
    Culled,
    BuffersPrepared,
    OpaqueDrawn,
    AttachmentsCopied,
    TransparentDrawn,
    Composited,
    CleanedUp,
    Submitted,
}

/// What happened to one camera
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// Rendered and submitted
    Rendered(FrameSummary),
    /// The camera produced no valid culling parameters. Nothing was
    /// recorded or acquired.
    Skipped,
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered(_))
    }

    pub fn summary(&self) -> Option<&FrameSummary> {
        match self {
            RenderOutcome::Rendered(summary) => Some(summary),
            RenderOutcome::Skipped => None,
        }
    }
}

/// Decisions taken while rendering a camera
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub buffer_size: UVec2,
    pub use_hdr: bool,
    pub use_scaled_rendering: bool,
    pub use_intermediate_buffer: bool,
    pub copied_color: bool,
    pub copied_depth: bool,
    pub post_fx_active: bool,
    pub lighting: LightingOutput,
}

/// Per-frame decisions shared by the recording steps
struct FrameState {
    sample_name: String,
    buffer_size: UVec2,
    use_hdr: bool,
    use_color_texture: bool,
    use_depth_texture: bool,
    use_intermediate_buffer: bool,
}

/// Renders cameras one at a time
pub struct CameraRenderer {
    buffer: CommandBuffer,
    camera_program: ProgramHandle,
    environment: Box<dyn RenderEnvironment>,
    lighting: LightingPacker,
    post_fx: PostFxStack,
    stages: Vec<RenderStage>,
}

impl CameraRenderer {
    /// Renderer for a runtime host
    pub fn new(camera_program: ProgramHandle) -> Self {
        Self::with_environment(camera_program, Box::new(Runtime))
    }

    pub fn with_environment(
        camera_program: ProgramHandle,
        environment: Box<dyn RenderEnvironment>,
    ) -> Self {
        Self {
            buffer: CommandBuffer::new("Render Camera"),
            camera_program,
            environment,
            lighting: LightingPacker::new(),
            post_fx: PostFxStack::new(),
            stages: Vec::new(),
        }
    }

    /// Replace the lighting packer, e.g. to plug in another shadow subsystem
    pub fn with_lighting(mut self, lighting: LightingPacker) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn lighting(&self) -> &LightingPacker {
        &self.lighting
    }

    /// Stages reached by the last `render` call, in order
    pub fn stages(&self) -> &[RenderStage] {
        &self.stages
    }

    /// The last stage reached
    pub fn stage(&self) -> RenderStage {
        self.stages.last().copied().unwrap_or(RenderStage::Idle)
    }

    /// Record and submit one camera's frame
    pub fn render(
        &mut self,
        context: &mut dyn RenderContext,
        camera: &Camera,
        camera_settings: Option<&CameraSettings>,
        visibility: &mut dyn VisibilityProvider,
        config: &PipelineConfig,
    ) -> BackendResult<RenderOutcome> {
        self.stages.clear();
        self.advance(RenderStage::Idle);

        let default_settings = CameraSettings::default();
        let camera_settings = camera_settings.unwrap_or(&default_settings);
        let buffer_settings = &config.camera_buffer;

        let (use_color_texture, use_depth_texture) = if camera.camera_type == CameraType::Reflection {
            (
                buffer_settings.copy_color_reflection,
                buffer_settings.copy_depth_reflection,
            )
        } else {
            (
                buffer_settings.copy_color && camera_settings.copy_color,
                buffer_settings.copy_depth && camera_settings.copy_depth,
            )
        };

        let mut post_fx_settings = if camera_settings.override_post_fx {
            camera_settings.post_fx_settings
        } else {
            config.post_fx
        };
        if !self.environment.allows_post_fx(camera) {
            post_fx_settings = None;
        }

        let render_scale = camera_settings.render_scale(buffer_settings.render_scale);
        let use_scaled_rendering = !NATIVE_SCALE_BAND.contains(&render_scale)
            && self.environment.allows_scaled_rendering(camera);

        let sample_name = self.environment.sample_name(camera);
        self.buffer.set_name(sample_name.as_str());

        let Some(mut culling) = camera.culling_parameters() else {
            log::debug!("CameraRenderer: skipping '{}', no valid culling parameters", camera.name);
            return Ok(RenderOutcome::Skipped);
        };
        culling.shadow_distance = config.shadows.max_distance.min(camera.far_clip_plane());
        let mut visible = visibility.cull(&culling);
        self.advance(RenderStage::Culled);

        let use_hdr = buffer_settings.allow_hdr && camera.allow_hdr;
        let pixel_size = camera.pixel_size();
        let buffer_size = if use_scaled_rendering {
            let scale = render_scale.clamp(MIN_RENDER_SCALE, MAX_RENDER_SCALE);
            UVec2::new(
                (pixel_size.x as f32 * scale) as u32,
                (pixel_size.y as f32 * scale) as u32,
            )
            .max(UVec2::ONE)
        } else {
            pixel_size
        };
        log::debug!(
            "CameraRenderer: '{}' at {}x{} (scaled: {}, hdr: {})",
            camera.name,
            buffer_size.x,
            buffer_size.y,
            use_scaled_rendering,
            use_hdr
        );

        self.buffer.begin_sample(&sample_name);
        self.buffer.set_global_vector(
            properties::CAMERA_BUFFER_SIZE,
            Vec4::new(
                1.0 / buffer_size.x as f32,
                1.0 / buffer_size.y as f32,
                buffer_size.x as f32,
                buffer_size.y as f32,
            ),
        );
        self.execute_buffer(context);

        let lighting = self.lighting.setup(
            context,
            &mut visible,
            &config.shadows,
            config.use_lights_per_object,
            camera_settings.light_mask(),
        );

        let mut fxaa = buffer_settings.fxaa;
        fxaa.enabled &= camera_settings.allow_fxaa;
        self.post_fx.setup(PostFxFrame {
            camera_type: camera.camera_type,
            camera_size: pixel_size,
            pixel_rect: camera.pixel_rect(),
            full_view: camera.is_full_view(),
            buffer_size,
            settings: post_fx_settings,
            keep_alpha: camera_settings.keep_alpha,
            use_hdr,
            color_lut_resolution: config.color_lut_resolution,
            final_blend_mode: camera_settings.final_blend_mode,
            bicubic_rescaling: buffer_settings.bicubic_rescaling,
            fxaa,
        });
        self.buffer.end_sample(&sample_name);

        let post_fx_active = self.post_fx.is_active();
        let frame = FrameState {
            sample_name,
            buffer_size,
            use_hdr,
            use_color_texture,
            use_depth_texture,
            use_intermediate_buffer: use_scaled_rendering
                || use_color_texture
                || use_depth_texture
                || post_fx_active,
        };

        self.setup(context, camera, &frame);
        self.advance(RenderStage::BuffersPrepared);

        self.draw_visible_geometry(context, camera_settings, config, &visible, &lighting, &frame);
        self.draw_unsupported_shaders(&visible);
        self.draw_gizmos_before_fx(&frame);

        if post_fx_active {
            self.execute_buffer(context);
            self.post_fx.render(context, COLOR_ATTACHMENT);
        } else if frame.use_intermediate_buffer {
            self.draw_final(camera, camera_settings);
            self.execute_buffer(context);
        }
        self.advance(RenderStage::Composited);

        self.draw_gizmos_after_fx(post_fx_active);
        self.cleanup(context, &frame);
        self.submit(context, &frame)?;

        Ok(RenderOutcome::Rendered(FrameSummary {
            buffer_size,
            use_hdr,
            use_scaled_rendering,
            use_intermediate_buffer: frame.use_intermediate_buffer,
            copied_color: use_color_texture,
            copied_depth: use_depth_texture,
            post_fx_active,
            lighting,
        }))
    }

    fn advance(&mut self, stage: RenderStage) {
        debug_assert!(
            self.stages.last().map_or(true, |last| *last < stage),
            "render stage went backwards to {stage:?}"
        );
        log::trace!("CameraRenderer: {stage:?}");
        self.stages.push(stage);
    }

    fn execute_buffer(&mut self, context: &mut dyn RenderContext) {
        context.execute_command_buffer(&self.buffer);
        self.buffer.clear();
    }

    fn setup(&mut self, context: &mut dyn RenderContext, camera: &Camera, frame: &FrameState) {
        self.buffer.push(Command::SetupCameraProperties {
            view_projection: camera.view_projection_matrix(),
            pixel_rect: camera.pixel_rect(),
        });

        let mut flags = camera.clear_flags;
        if frame.use_intermediate_buffer {
            if flags > CameraClearFlags::SolidColor {
                flags = CameraClearFlags::SolidColor;
            }
            self.buffer.get_temporary(TemporaryDescriptor::color(
                COLOR_ATTACHMENT,
                frame.buffer_size,
                TextureFormat::color(frame.use_hdr),
            ));
            self.buffer
                .get_temporary(TemporaryDescriptor::depth(DEPTH_ATTACHMENT, frame.buffer_size));
            self.bind_attachments(LoadOp::DontCare);
        }

        let clear_color = if flags == CameraClearFlags::SolidColor {
            srgb_to_linear(camera.background_color)
        } else {
            Vec4::ZERO
        };
        self.buffer.clear_render_target(
            flags <= CameraClearFlags::Depth,
            flags <= CameraClearFlags::SolidColor,
            clear_color,
        );
        self.buffer.begin_sample(&frame.sample_name);
        self.buffer
            .set_global_texture(properties::CAMERA_COLOR_TEXTURE, RenderTargetId::Missing);
        self.buffer
            .set_global_texture(properties::CAMERA_DEPTH_TEXTURE, RenderTargetId::Missing);
        self.execute_buffer(context);
    }

    fn bind_attachments(&mut self, load: LoadOp) {
        self.buffer.set_render_targets(
            COLOR_ATTACHMENT,
            load,
            StoreOp::Store,
            DepthTarget {
                target: DEPTH_ATTACHMENT.into(),
                load,
                store: StoreOp::Store,
            },
        );
    }

    fn draw_visible_geometry(
        &mut self,
        context: &mut dyn RenderContext,
        camera_settings: &CameraSettings,
        config: &PipelineConfig,
        visible: &VisibilitySet,
        lighting: &LightingOutput,
        frame: &FrameState,
    ) {
        let mut per_object_data = PerObjectData::shading();
        if lighting.lights_per_object {
            per_object_data |= PerObjectData::lights_per_object();
        }
        let mask = camera_settings.rendering_layer_mask;
        let renderers = |queue: RenderQueueRange, sorting: SortingCriteria| DrawRenderers {
            queue,
            sorting,
            shader_tags: LIT_SHADER_TAGS.to_vec(),
            per_object_data,
            dynamic_batching: config.use_dynamic_batching,
            instancing: config.use_gpu_instancing,
            rendering_layer_mask: mask,
            override_program: None,
            objects: visible.select_renderers(queue, mask, &LIT_SHADER_TAGS, sorting),
        };

        let opaque = renderers(RenderQueueRange::OPAQUE, SortingCriteria::CommonOpaque);
        log::trace!("CameraRenderer: {} opaque renderers", opaque.objects.len());
        self.buffer.push(Command::DrawRenderers(opaque));
        self.advance(RenderStage::OpaqueDrawn);

        self.buffer.push(Command::DrawSkybox);
        if frame.use_color_texture || frame.use_depth_texture {
            self.copy_attachments(context.capabilities().copy_texture, frame);
            self.advance(RenderStage::AttachmentsCopied);
        }
        self.execute_buffer(context);

        let transparent = renderers(RenderQueueRange::TRANSPARENT, SortingCriteria::CommonTransparent);
        log::trace!(
            "CameraRenderer: {} transparent renderers",
            transparent.objects.len()
        );
        self.buffer.push(Command::DrawRenderers(transparent));
        self.advance(RenderStage::TransparentDrawn);
    }

    fn copy_attachments(&mut self, copy_texture: bool, frame: &FrameState) {
        if frame.use_color_texture {
            self.buffer.get_temporary(TemporaryDescriptor::color(
                COLOR_TEXTURE,
                frame.buffer_size,
                TextureFormat::color(frame.use_hdr),
            ));
            if copy_texture {
                self.buffer.copy_texture(COLOR_ATTACHMENT, COLOR_TEXTURE);
            } else {
                self.draw(COLOR_ATTACHMENT.into(), COLOR_TEXTURE.into(), false);
            }
            self.buffer
                .set_global_texture(properties::CAMERA_COLOR_TEXTURE, COLOR_TEXTURE);
        }
        if frame.use_depth_texture {
            self.buffer
                .get_temporary(TemporaryDescriptor::depth(DEPTH_TEXTURE, frame.buffer_size));
            if copy_texture {
                self.buffer.copy_texture(DEPTH_ATTACHMENT, DEPTH_TEXTURE);
            } else {
                self.draw(DEPTH_ATTACHMENT.into(), DEPTH_TEXTURE.into(), true);
            }
            self.buffer
                .set_global_texture(properties::CAMERA_DEPTH_TEXTURE, DEPTH_TEXTURE);
        }
        if !copy_texture {
            self.bind_attachments(LoadOp::Load);
        }
    }

    /// Full-screen copy through the camera program
    fn draw(&mut self, from: RenderTargetId, to: RenderTargetId, is_depth: bool) {
        self.buffer.set_global_texture(properties::SOURCE_TEXTURE, from);
        self.buffer.set_render_target(to, LoadOp::DontCare, StoreOp::Store);
        self.buffer.draw_procedural(
            self.camera_program,
            if is_depth { COPY_DEPTH_PASS } else { COPY_PASS },
        );
    }

    fn draw_unsupported_shaders(&mut self, visible: &VisibilitySet) {
        let Some(error_program) = self.environment.error_program() else {
            return;
        };
        let legacy = [ShaderTag::Legacy];
        let objects = visible.select_renderers(
            RenderQueueRange::ALL,
            u32::MAX,
            &legacy,
            SortingCriteria::None,
        );
        if !objects.is_empty() {
            log::debug!(
                "CameraRenderer: {} renderers use unsupported shaders",
                objects.len()
            );
        }
        self.buffer.push(Command::DrawRenderers(DrawRenderers {
            queue: RenderQueueRange::ALL,
            sorting: SortingCriteria::None,
            shader_tags: legacy.to_vec(),
            per_object_data: PerObjectData::empty(),
            dynamic_batching: false,
            instancing: false,
            rendering_layer_mask: u32::MAX,
            override_program: Some(error_program),
            objects,
        }));
    }

    fn draw_gizmos_before_fx(&mut self, frame: &FrameState) {
        if !self.environment.draws_gizmos() {
            return;
        }
        if frame.use_intermediate_buffer {
            self.draw(DEPTH_ATTACHMENT.into(), RenderTargetId::CameraTarget, true);
        }
        self.buffer
            .push(Command::DrawGizmos(GizmoSubset::PreImageEffects));
    }

    fn draw_gizmos_after_fx(&mut self, post_fx_active: bool) {
        if !self.environment.draws_gizmos() {
            return;
        }
        if post_fx_active {
            self.draw(DEPTH_ATTACHMENT.into(), RenderTargetId::CameraTarget, true);
        }
        self.buffer
            .push(Command::DrawGizmos(GizmoSubset::PostImageEffects));
    }

    /// Blit the intermediate color attachment into the camera target with
    /// the camera's blend mode
    fn draw_final(&mut self, camera: &Camera, camera_settings: &CameraSettings) {
        let blend = camera_settings.final_blend_mode;
        self.buffer
            .set_global_float(properties::CAMERA_SRC_BLEND, blend.source.shader_value());
        self.buffer
            .set_global_float(properties::CAMERA_DST_BLEND, blend.destination.shader_value());
        self.buffer
            .set_global_texture(properties::SOURCE_TEXTURE, COLOR_ATTACHMENT);
        let load = if blend.destination == BlendFactor::Zero && camera.is_full_view() {
            LoadOp::DontCare
        } else {
            LoadOp::Load
        };
        self.buffer
            .set_render_target(RenderTargetId::CameraTarget, load, StoreOp::Store);
        self.buffer.set_viewport(camera.pixel_rect());
        self.buffer.draw_procedural(self.camera_program, COPY_PASS);
        self.buffer.set_global_float(properties::CAMERA_SRC_BLEND, 1.0);
        self.buffer.set_global_float(properties::CAMERA_DST_BLEND, 0.0);
    }

    fn cleanup(&mut self, context: &mut dyn RenderContext, frame: &FrameState) {
        // Pending draws still sample the shadow atlases
        self.execute_buffer(context);
        self.lighting.cleanup(context);
        if frame.use_intermediate_buffer {
            self.buffer.release_temporary(COLOR_ATTACHMENT);
            self.buffer.release_temporary(DEPTH_ATTACHMENT);
            if frame.use_color_texture {
                self.buffer.release_temporary(COLOR_TEXTURE);
            }
            if frame.use_depth_texture {
                self.buffer.release_temporary(DEPTH_TEXTURE);
            }
        }
        self.advance(RenderStage::CleanedUp);
    }

    fn submit(&mut self, context: &mut dyn RenderContext, frame: &FrameState) -> BackendResult<()> {
        self.buffer.end_sample(&frame.sample_name);
        self.execute_buffer(context);
        context.submit()?;
        self.advance(RenderStage::Submitted);
        Ok(())
    }
}
