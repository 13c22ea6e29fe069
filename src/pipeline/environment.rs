//! Host environment hooks for the camera renderer
//!
//! Editor hosts draw extra debug content and treat scene-view cameras
//! specially. Both variants run through the same renderer code.

use crate::backend::types::ProgramHandle;
use crate::scene::{Camera, CameraType};

const RUNTIME_SAMPLE_NAME: &str = "Render Camera";

/// Capabilities of the host the pipeline runs in
pub trait RenderEnvironment {
    /// Name of the profiling sample and command buffer for `camera`
    fn sample_name(&self, camera: &Camera) -> String;

    /// Whether `camera` may render at a scaled resolution
    fn allows_scaled_rendering(&self, camera: &Camera) -> bool;

    /// Whether post-processing may run for `camera`
    fn allows_post_fx(&self, camera: &Camera) -> bool;

    /// Program that highlights objects using unsupported shaders, if they
    /// should be drawn at all
    fn error_program(&self) -> Option<ProgramHandle>;

    /// Whether gizmos are drawn around post-processing
    fn draws_gizmos(&self) -> bool;
}

/// Player builds: no debug content, no per-camera naming
#[derive(Debug, Clone, Copy, Default)]
pub struct Runtime;

impl RenderEnvironment for Runtime {
    fn sample_name(&self, _camera: &Camera) -> String {
        RUNTIME_SAMPLE_NAME.to_string()
    }

    fn allows_scaled_rendering(&self, _camera: &Camera) -> bool {
        true
    }

    fn allows_post_fx(&self, _camera: &Camera) -> bool {
        true
    }

    fn error_program(&self) -> Option<ProgramHandle> {
        None
    }

    fn draws_gizmos(&self) -> bool {
        false
    }
}

/// Editor host
#[derive(Debug, Clone, Copy)]
pub struct Editor {
    pub error_program: ProgramHandle,
    /// Scene view "image effects" toggle
    pub scene_view_post_fx: bool,
    pub gizmos: bool,
}

impl Editor {
    pub fn new(error_program: ProgramHandle) -> Self {
        Self {
            error_program,
            scene_view_post_fx: true,
            gizmos: true,
        }
    }
}

impl RenderEnvironment for Editor {
    fn sample_name(&self, camera: &Camera) -> String {
        camera.name.clone()
    }

    fn allows_scaled_rendering(&self, camera: &Camera) -> bool {
        camera.camera_type != CameraType::SceneView
    }

    fn allows_post_fx(&self, camera: &Camera) -> bool {
        camera.camera_type != CameraType::SceneView || self.scene_view_post_fx
    }

    fn error_program(&self) -> Option<ProgramHandle> {
        Some(self.error_program)
    }

    fn draws_gizmos(&self) -> bool {
        self.gizmos
    }
}
