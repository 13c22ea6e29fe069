//! Forward rendering pipeline
//!
//! Each camera goes through:
//! 1. Culling - visible objects and lights from the visibility provider
//! 2. Lighting - light arrays packed into shader globals, shadows reserved
//! 3. Geometry - opaque, sky, optional attachment copies, transparent
//! 4. Post-processing - bloom, color grading and FXAA, or a plain final blit

pub mod camera_renderer;
pub mod environment;
pub mod lighting;
pub mod postprocess;

pub use camera_renderer::{CameraRenderer, FrameSummary, RenderOutcome, RenderStage};
pub use environment::{Editor, RenderEnvironment, Runtime};
pub use lighting::{LightingOutput, LightingPacker, PackedLightData};
pub use postprocess::{PostFxFrame, PostFxSettings, PostFxStack};

use bevy_ecs::world::World;

use crate::backend::{BackendResult, RenderContext};
use crate::config::{CameraSettings, PipelineConfig};
use crate::scene::Camera;
use crate::visibility::{collect_cameras, VisibilityProvider, WorldVisibility};

/// Renders every camera of a frame, one after the other
pub struct RenderPipeline {
    config: PipelineConfig,
    renderer: CameraRenderer,
}

impl RenderPipeline {
    /// Pipeline for a runtime host
    pub fn new(config: PipelineConfig) -> Self {
        let renderer = CameraRenderer::new(config.camera_program);
        Self { config, renderer }
    }

    pub fn with_environment(
        config: PipelineConfig,
        environment: Box<dyn RenderEnvironment>,
    ) -> Self {
        let renderer = CameraRenderer::with_environment(config.camera_program, environment);
        Self { config, renderer }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    pub fn renderer(&self) -> &CameraRenderer {
        &self.renderer
    }

    /// Render `cameras` in order. A camera that cannot be culled is skipped
    /// without affecting the others; a device error aborts the frame.
    pub fn render(
        &mut self,
        context: &mut dyn RenderContext,
        cameras: &[(Camera, Option<CameraSettings>)],
        visibility: &mut dyn VisibilityProvider,
    ) -> BackendResult<Vec<RenderOutcome>> {
        let mut outcomes = Vec::with_capacity(cameras.len());
        for (camera, settings) in cameras {
            let outcome =
                self.renderer
                    .render(context, camera, settings.as_ref(), visibility, &self.config)?;
            outcomes.push(outcome);
        }
        log::trace!(
            "RenderPipeline: rendered {}/{} cameras",
            outcomes.iter().filter(|outcome| outcome.is_rendered()).count(),
            outcomes.len()
        );
        Ok(outcomes)
    }

    /// Render every camera in `world` against the world's lights and
    /// renderables
    pub fn render_world(
        &mut self,
        context: &mut dyn RenderContext,
        world: &mut World,
    ) -> BackendResult<Vec<RenderOutcome>> {
        let cameras = collect_cameras(world);
        let mut visibility = WorldVisibility::extract(world);
        self.render(context, &cameras, &mut visibility)
    }
}
