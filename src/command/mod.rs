//! Command recording
//!
//! Every subsystem records into its own [`CommandBuffer`] and flushes it to a
//! [`RenderContext`](crate::backend::RenderContext). Commands are executed in
//! exactly the order they were recorded.

pub mod draw;
pub mod properties;
pub mod resource;

pub use draw::*;
pub use resource::*;

use crate::backend::types::*;
use glam::{Mat4, Vec4};

/// A single recorded GPU command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginSample(String),
    EndSample(String),
    SetGlobalInt(&'static str, i32),
    SetGlobalFloat(&'static str, f32),
    SetGlobalVector(&'static str, Vec4),
    SetGlobalVectorArray(&'static str, Vec<Vec4>),
    SetGlobalTexture(&'static str, RenderTargetId),
    SetKeyword {
        name: &'static str,
        enabled: bool,
    },
    GetTemporary(TemporaryDescriptor),
    ReleaseTemporary(TextureId),
    SetRenderTarget {
        color: RenderTargetId,
        color_load: LoadOp,
        color_store: StoreOp,
        depth: Option<DepthTarget>,
    },
    ClearRenderTarget {
        depth: bool,
        color: bool,
        color_value: Vec4,
    },
    SetViewport(Rect),
    SetupCameraProperties {
        view_projection: Mat4,
        pixel_rect: Rect,
    },
    DrawRenderers(DrawRenderers),
    DrawSkybox,
    DrawGizmos(GizmoSubset),
    /// Full-screen triangle using one pass of a program
    DrawProcedural {
        program: ProgramHandle,
        pass: u32,
        vertex_count: u32,
    },
    CopyTexture {
        from: RenderTargetId,
        to: RenderTargetId,
    },
}

/// Depth attachment binding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthTarget {
    pub target: RenderTargetId,
    pub load: LoadOp,
    pub store: StoreOp,
}

/// An ordered list of commands with a debug name
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    name: String,
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all recorded commands, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn begin_sample(&mut self, name: &str) {
        self.push(Command::BeginSample(name.to_string()));
    }

    pub fn end_sample(&mut self, name: &str) {
        self.push(Command::EndSample(name.to_string()));
    }

    pub fn set_global_int(&mut self, name: &'static str, value: i32) {
        self.push(Command::SetGlobalInt(name, value));
    }

    pub fn set_global_float(&mut self, name: &'static str, value: f32) {
        self.push(Command::SetGlobalFloat(name, value));
    }

    pub fn set_global_vector(&mut self, name: &'static str, value: Vec4) {
        self.push(Command::SetGlobalVector(name, value));
    }

    pub fn set_global_vector_array(&mut self, name: &'static str, values: &[Vec4]) {
        self.push(Command::SetGlobalVectorArray(name, values.to_vec()));
    }

    pub fn set_global_texture(&mut self, name: &'static str, texture: impl Into<RenderTargetId>) {
        self.push(Command::SetGlobalTexture(name, texture.into()));
    }

    pub fn set_keyword(&mut self, name: &'static str, enabled: bool) {
        self.push(Command::SetKeyword { name, enabled });
    }

    pub fn get_temporary(&mut self, desc: TemporaryDescriptor) {
        self.push(Command::GetTemporary(desc));
    }

    pub fn release_temporary(&mut self, id: TextureId) {
        self.push(Command::ReleaseTemporary(id));
    }

    /// Bind a single color target without depth
    pub fn set_render_target(
        &mut self,
        color: impl Into<RenderTargetId>,
        load: LoadOp,
        store: StoreOp,
    ) {
        self.push(Command::SetRenderTarget {
            color: color.into(),
            color_load: load,
            color_store: store,
            depth: None,
        });
    }

    /// Bind color and depth targets with independent load/store actions
    pub fn set_render_targets(
        &mut self,
        color: impl Into<RenderTargetId>,
        color_load: LoadOp,
        color_store: StoreOp,
        depth: DepthTarget,
    ) {
        self.push(Command::SetRenderTarget {
            color: color.into(),
            color_load,
            color_store,
            depth: Some(depth),
        });
    }

    pub fn clear_render_target(&mut self, depth: bool, color: bool, color_value: Vec4) {
        self.push(Command::ClearRenderTarget {
            depth,
            color,
            color_value,
        });
    }

    pub fn set_viewport(&mut self, rect: Rect) {
        self.push(Command::SetViewport(rect));
    }

    pub fn draw_procedural(&mut self, program: ProgramHandle, pass: u32) {
        self.push(Command::DrawProcedural {
            program,
            pass,
            vertex_count: 3,
        });
    }

    pub fn copy_texture(&mut self, from: impl Into<RenderTargetId>, to: impl Into<RenderTargetId>) {
        self.push(Command::CopyTexture {
            from: from.into(),
            to: to.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_keep_recording_order() {
        let mut buffer = CommandBuffer::new("test");
        buffer.begin_sample("test");
        buffer.set_global_int(properties::DIR_LIGHT_COUNT, 2);
        buffer.draw_procedural(ProgramHandle(1), 0);
        buffer.end_sample("test");

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.commands()[1], Command::SetGlobalInt("_DirectionalLightCount", 2));
        assert!(matches!(
            buffer.commands()[2],
            Command::DrawProcedural { vertex_count: 3, .. }
        ));

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.name(), "test");
    }

    #[test]
    fn test_texture_id_converts_to_render_target() {
        let mut buffer = CommandBuffer::new("test");
        let id = TextureId::named("_Tmp");
        buffer.set_global_texture(properties::SOURCE_TEXTURE, id);
        assert_eq!(
            buffer.commands()[0],
            Command::SetGlobalTexture("_SourceTexture", RenderTargetId::Temporary(id))
        );
    }
}
