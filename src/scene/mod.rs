//! Scene components

mod camera;
mod light;
mod transform;

pub use camera::*;
pub use light::*;
pub use transform::*;

use bevy_ecs::prelude::*;

use crate::command::ShaderTag;

/// A drawable object
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    /// Render queue value; up to 2500 is opaque
    pub render_queue: u32,
    pub rendering_layer_mask: u32,
    pub shader_tag: ShaderTag,
}

impl Default for Renderable {
    fn default() -> Self {
        Self::opaque()
    }
}

impl Renderable {
    pub fn opaque() -> Self {
        Self {
            render_queue: 2000,
            rendering_layer_mask: 1,
            shader_tag: ShaderTag::Lit,
        }
    }

    pub fn transparent() -> Self {
        Self {
            render_queue: 3000,
            ..Self::opaque()
        }
    }

    pub fn with_shader_tag(mut self, tag: ShaderTag) -> Self {
        self.shader_tag = tag;
        self
    }

    pub fn with_layer_mask(mut self, mask: u32) -> Self {
        self.rendering_layer_mask = mask;
        self
    }
}
