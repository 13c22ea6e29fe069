//! Common utilities for frame rendering integration tests.
//!
//! Builds small scenes and pipelines and inspects what a
//! [`HeadlessContext`] executed.

#![allow(dead_code)]

use custom_render_pipeline::backend::types::ProgramHandle;
use custom_render_pipeline::command::{RenderTargetId, ShaderTag, TemporaryDescriptor};
use custom_render_pipeline::pipeline::PostFxSettings;
use custom_render_pipeline::scene::Camera;
use custom_render_pipeline::visibility::{VisibilitySet, VisibleObject};
use custom_render_pipeline::{Command, HeadlessContext, PipelineConfig, RenderPipeline};
use glam::UVec2;

pub const CAMERA_PROGRAM: ProgramHandle = ProgramHandle(1);
pub const POST_FX_PROGRAM: ProgramHandle = ProgramHandle(2);

/// Route pipeline logs through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Scene
// ============================================================================

pub fn full_hd_camera() -> Camera {
    Camera::new("Main Camera", UVec2::new(1920, 1080))
}

/// Two opaque objects and one transparent one
pub fn simple_scene() -> VisibilitySet {
    let object = |id: u64, render_queue: u32, distance: f32| VisibleObject {
        id,
        render_queue,
        rendering_layer_mask: 1,
        shader_tag: ShaderTag::Lit,
        distance,
    };
    VisibilitySet::new(
        vec![object(1, 2000, 5.0), object(2, 2000, 2.0), object(3, 3000, 4.0)],
        Vec::new(),
    )
}

/// Post-fx settings with bloom switched off
pub fn post_fx_without_bloom() -> PostFxSettings {
    let mut settings = PostFxSettings::new(POST_FX_PROGRAM);
    settings.bloom.intensity = 0.0;
    settings
}

// ============================================================================
// Pipeline
// ============================================================================

pub fn config() -> PipelineConfig {
    PipelineConfig {
        camera_program: CAMERA_PROGRAM,
        ..Default::default()
    }
}

pub fn pipeline(config: PipelineConfig) -> RenderPipeline {
    RenderPipeline::new(config)
}

// ============================================================================
// Inspection
// ============================================================================

/// Every temporary acquisition, in order
pub fn acquisitions(commands: &[Command]) -> Vec<&TemporaryDescriptor> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::GetTemporary(desc) => Some(desc),
            _ => None,
        })
        .collect()
}

pub fn acquired_names(commands: &[Command]) -> Vec<String> {
    acquisitions(commands)
        .iter()
        .map(|desc| desc.id.to_string())
        .collect()
}

/// `(program, pass)` of every full-screen draw, in order
pub fn procedural_draws(commands: &[Command]) -> Vec<(ProgramHandle, u32)> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::DrawProcedural { program, pass, .. } => Some((*program, *pass)),
            _ => None,
        })
        .collect()
}

/// Color targets bound, in order
pub fn bound_targets(commands: &[Command]) -> Vec<RenderTargetId> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::SetRenderTarget { color, .. } => Some(*color),
            _ => None,
        })
        .collect()
}

/// Assert that the frame left nothing acquired and never misused a target
pub fn assert_balanced(context: &HeadlessContext) {
    let stats = context.stats();
    assert_eq!(
        stats.outstanding_temporaries(),
        0,
        "leaked temporaries: {:?}",
        context.live_temporaries().map(|desc| desc.id).collect::<Vec<_>>()
    );
    assert_eq!(context.live_temporary_count(), 0);
    assert_eq!(stats.invalid_operations, 0);
}
