//! Camera component

use bevy_ecs::prelude::*;
use glam::{Mat4, UVec2, Vec3, Vec4};

use crate::backend::types::Rect;

/// Camera projection type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: std::f32::consts::FRAC_PI_3,
            aspect: 16.0 / 9.0,
            near: 0.3,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Projection::Orthographic {
            left: -half_w,
            right: half_w,
            bottom: -half_h,
            top: half_h,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match self {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(*fov_y, *aspect, *near, *far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(*left, *right, *bottom, *top, *near, *far),
        }
    }

    pub fn near(&self) -> f32 {
        match self {
            Projection::Perspective { near, .. } => *near,
            Projection::Orthographic { near, .. } => *near,
        }
    }

    pub fn far(&self) -> f32 {
        match self {
            Projection::Perspective { far, .. } => *far,
            Projection::Orthographic { far, .. } => *far,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective { aspect: a, .. } = self {
            *a = aspect;
        }
    }

    fn is_valid(&self) -> bool {
        let (near, far) = (self.near(), self.far());
        let volume = match self {
            Projection::Perspective { fov_y, aspect, .. } => {
                *fov_y > 0.0 && *aspect > 0.0 && aspect.is_finite()
            }
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                ..
            } => right > left && top > bottom,
        };
        volume && near.is_finite() && far.is_finite() && far > near
    }
}

/// What a camera renders for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraType {
    #[default]
    Game,
    SceneView,
    Preview,
    Reflection,
    VR,
}

/// How the camera target is cleared before drawing.
///
/// Ordered from most to least clearing; the renderer compares flags with
/// `<=` to decide what to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum CameraClearFlags {
    #[default]
    Skybox,
    SolidColor,
    Depth,
    Nothing,
}

/// Parameters handed to the visibility provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullingParameters {
    pub view_projection: Mat4,
    pub position: Vec3,
    pub near: f32,
    pub far: f32,
    /// Shadow casters beyond this distance are ignored
    pub shadow_distance: f32,
    pub camera_type: CameraType,
}

/// Camera for viewing the scene
#[derive(Component, Debug, Clone)]
pub struct Camera {
    pub name: String,
    pub camera_type: CameraType,
    /// Size of the render target the camera draws into
    pub target_size: UVec2,
    /// Normalized viewport within the target
    pub rect: Rect,
    pub clear_flags: CameraClearFlags,
    /// Background in gamma space
    pub background_color: Vec4,
    pub allow_hdr: bool,
    /// Cameras render in ascending depth order
    pub depth: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            name: "Main Camera".to_string(),
            camera_type: CameraType::Game,
            target_size: UVec2::new(1920, 1080),
            rect: Rect::FULL,
            clear_flags: CameraClearFlags::Skybox,
            background_color: Vec4::new(0.19, 0.3, 0.47, 0.0),
            allow_hdr: true,
            depth: 0.0,
            position: Vec3::new(0.0, 1.0, -10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::default(),
        }
    }
}

impl Camera {
    pub fn new(name: impl Into<String>, target_size: UVec2) -> Self {
        let mut camera = Self {
            name: name.into(),
            target_size,
            ..Default::default()
        };
        camera.set_aspect(target_size.x as f32, target_size.y as f32);
        camera
    }

    pub fn with_type(mut self, camera_type: CameraType) -> Self {
        self.camera_type = camera_type;
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn with_clear_flags(mut self, clear_flags: CameraClearFlags) -> Self {
        self.clear_flags = clear_flags;
        self
    }

    /// Viewport in pixels
    pub fn pixel_rect(&self) -> Rect {
        self.rect.to_pixels(self.target_size)
    }

    /// Size of the viewport in whole pixels
    pub fn pixel_size(&self) -> UVec2 {
        let rect = self.pixel_rect();
        UVec2::new(rect.width.max(0.0) as u32, rect.height.max(0.0) as u32)
    }

    /// Whether the viewport covers the whole target
    pub fn is_full_view(&self) -> bool {
        self.rect == Rect::FULL
    }

    pub fn far_clip_plane(&self) -> f32 {
        self.projection.far()
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Culling parameters, or `None` when the camera cannot see anything
    /// (empty viewport or degenerate projection)
    pub fn culling_parameters(&self) -> Option<CullingParameters> {
        let size = self.pixel_size();
        if size.x == 0 || size.y == 0 || !self.projection.is_valid() {
            return None;
        }
        if (self.target - self.position).length_squared() <= f32::EPSILON {
            return None;
        }
        Some(CullingParameters {
            view_projection: self.view_projection_matrix(),
            position: self.position,
            near: self.projection.near(),
            far: self.projection.far(),
            shadow_distance: self.projection.far(),
            camera_type: self.camera_type,
        })
    }

    /// Update aspect ratio for perspective projection
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.projection.set_aspect(width / height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_flags_order() {
        assert!(CameraClearFlags::Skybox < CameraClearFlags::SolidColor);
        assert!(CameraClearFlags::SolidColor < CameraClearFlags::Depth);
        assert!(CameraClearFlags::Depth < CameraClearFlags::Nothing);
    }

    #[test]
    fn test_pixel_size_follows_rect() {
        let camera = Camera::new("split", UVec2::new(1920, 1080))
            .with_rect(Rect::new(0.0, 0.0, 0.5, 1.0));
        assert_eq!(camera.pixel_size(), UVec2::new(960, 1080));
        assert!(!camera.is_full_view());
    }

    #[test]
    fn test_zero_viewport_cannot_cull() {
        let camera = Camera::new("empty", UVec2::new(1920, 1080))
            .with_rect(Rect::new(0.0, 0.0, 0.0, 1.0));
        assert!(camera.culling_parameters().is_none());
    }

    #[test]
    fn test_degenerate_projection_cannot_cull() {
        let mut camera = Camera::new("broken", UVec2::new(640, 480));
        camera.projection = Projection::perspective(60.0, 1.0, 10.0, 1.0);
        assert!(camera.culling_parameters().is_none());
    }

    #[test]
    fn test_culling_parameters() {
        let camera = Camera::new("main", UVec2::new(640, 480));
        let params = camera.culling_parameters().unwrap();
        assert_eq!(params.far, 1000.0);
        assert_eq!(params.camera_type, CameraType::Game);
    }
}
