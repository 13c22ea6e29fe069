//! Headless render context.
//!
//! Executes command streams without a GPU: it tracks global shader state,
//! render target bindings and transient image buffers, and counts
//! submissions. Useful for tests, capture tooling and leak checks.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec4;
use parking_lot::Mutex;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::command::*;

/// Last value written to a global shader parameter
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalValue {
    Int(i32),
    Float(f32),
    Vector(Vec4),
    VectorArray(Vec<Vec4>),
    Texture(RenderTargetId),
}

/// Counters shared between a [`HeadlessContext`] and its observers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    pub buffers_executed: u64,
    pub submits: u64,
    pub temporaries_acquired: u64,
    pub temporaries_released: u64,
    /// Highest number of simultaneously live temporaries
    pub peak_live_temporaries: usize,
    pub procedural_draws: u64,
    pub renderer_draws: u64,
    pub texture_copies: u64,
    /// Releases of unknown buffers, double acquisitions, binds of dead buffers
    pub invalid_operations: u64,
}

impl HeadlessStats {
    /// Acquisitions not matched by a release
    pub fn outstanding_temporaries(&self) -> i64 {
        self.temporaries_acquired as i64 - self.temporaries_released as i64
    }
}

/// A [`RenderContext`] that simulates execution on the CPU
pub struct HeadlessContext {
    capabilities: DeviceCapabilities,
    pending: Vec<Command>,
    executed: Vec<Command>,
    globals: HashMap<&'static str, GlobalValue>,
    keywords: HashMap<&'static str, bool>,
    live_temporaries: HashMap<TextureId, TemporaryDescriptor>,
    color_target: Option<RenderTargetId>,
    stats: Arc<Mutex<HeadlessStats>>,
    device_lost: bool,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::with_capabilities(DeviceCapabilities::default())
    }

    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            pending: Vec::new(),
            executed: Vec::new(),
            globals: HashMap::new(),
            keywords: HashMap::new(),
            live_temporaries: HashMap::new(),
            color_target: None,
            stats: Arc::new(Mutex::new(HeadlessStats::default())),
            device_lost: false,
        }
    }

    /// Shared handle to the counters, valid after the context is moved
    pub fn stats_handle(&self) -> Arc<Mutex<HeadlessStats>> {
        Arc::clone(&self.stats)
    }

    pub fn stats(&self) -> HeadlessStats {
        self.stats.lock().clone()
    }

    /// All commands submitted so far, in execution order
    pub fn submitted_commands(&self) -> &[Command] {
        &self.executed
    }

    /// Commands executed but not yet submitted
    pub fn pending_commands(&self) -> &[Command] {
        &self.pending
    }

    /// Forget submitted commands, keeping global state and counters
    pub fn clear_history(&mut self) {
        self.executed.clear();
    }

    pub fn global(&self, name: &str) -> Option<&GlobalValue> {
        self.globals.get(name)
    }

    pub fn global_int(&self, name: &str) -> Option<i32> {
        match self.globals.get(name) {
            Some(GlobalValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn global_float(&self, name: &str) -> Option<f32> {
        match self.globals.get(name) {
            Some(GlobalValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn global_vector(&self, name: &str) -> Option<Vec4> {
        match self.globals.get(name) {
            Some(GlobalValue::Vector(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn global_vector_array(&self, name: &str) -> Option<&[Vec4]> {
        match self.globals.get(name) {
            Some(GlobalValue::VectorArray(values)) => Some(values),
            _ => None,
        }
    }

    pub fn keyword_enabled(&self, name: &str) -> bool {
        self.keywords.get(name).copied().unwrap_or(false)
    }

    pub fn live_temporaries(&self) -> impl Iterator<Item = &TemporaryDescriptor> {
        self.live_temporaries.values()
    }

    pub fn live_temporary_count(&self) -> usize {
        self.live_temporaries.len()
    }

    /// Currently bound color target
    pub fn color_target(&self) -> Option<RenderTargetId> {
        self.color_target
    }

    /// Make the next submissions fail as if the device went away
    pub fn set_device_lost(&mut self, lost: bool) {
        self.device_lost = lost;
    }

    fn is_live(&self, target: RenderTargetId) -> bool {
        match target {
            RenderTargetId::Temporary(id) => self.live_temporaries.contains_key(&id),
            RenderTargetId::CameraTarget | RenderTargetId::Missing => true,
        }
    }

    fn invalid(&self, stats: &mut HeadlessStats, message: std::fmt::Arguments<'_>) {
        log::warn!("HeadlessContext: {}", message);
        stats.invalid_operations += 1;
    }

    fn apply(&mut self, command: &Command) {
        let stats_handle = Arc::clone(&self.stats);
        let mut stats = stats_handle.lock();
        match command {
            Command::SetGlobalInt(name, value) => {
                self.globals.insert(name, GlobalValue::Int(*value));
            }
            Command::SetGlobalFloat(name, value) => {
                self.globals.insert(name, GlobalValue::Float(*value));
            }
            Command::SetGlobalVector(name, value) => {
                self.globals.insert(name, GlobalValue::Vector(*value));
            }
            Command::SetGlobalVectorArray(name, values) => {
                self.globals
                    .insert(name, GlobalValue::VectorArray(values.clone()));
            }
            Command::SetGlobalTexture(name, texture) => {
                self.globals.insert(name, GlobalValue::Texture(*texture));
            }
            Command::SetKeyword { name, enabled } => {
                self.keywords.insert(name, *enabled);
            }
            Command::GetTemporary(desc) => {
                if self.live_temporaries.contains_key(&desc.id) {
                    self.invalid(&mut stats, format_args!("{} acquired twice", desc.id));
                }
                log::trace!(
                    "HeadlessContext: acquire {} ({}x{}, {:?})",
                    desc.id,
                    desc.width,
                    desc.height,
                    desc.format
                );
                self.live_temporaries.insert(desc.id, desc.clone());
                stats.temporaries_acquired += 1;
                stats.peak_live_temporaries =
                    stats.peak_live_temporaries.max(self.live_temporaries.len());
            }
            Command::ReleaseTemporary(id) => {
                if self.live_temporaries.remove(id).is_some() {
                    log::trace!("HeadlessContext: release {}", id);
                    stats.temporaries_released += 1;
                } else {
                    self.invalid(&mut stats, format_args!("release of unknown temporary {}", id));
                }
            }
            Command::SetRenderTarget { color, depth, .. } => {
                if !self.is_live(*color) {
                    self.invalid(&mut stats, format_args!("bound dead color target {:?}", color));
                }
                if let Some(depth) = depth {
                    if !self.is_live(depth.target) {
                        self.invalid(
                            &mut stats,
                            format_args!("bound dead depth target {:?}", depth.target),
                        );
                    }
                }
                self.color_target = Some(*color);
            }
            Command::CopyTexture { from, to } => {
                if !self.is_live(*from) || !self.is_live(*to) {
                    self.invalid(&mut stats, format_args!("copy {:?} -> {:?}", from, to));
                }
                stats.texture_copies += 1;
            }
            Command::DrawProcedural { .. } => {
                if self.color_target.is_none() {
                    self.invalid(&mut stats, format_args!("draw without a bound target"));
                }
                stats.procedural_draws += 1;
            }
            Command::DrawRenderers(_) => {
                stats.renderer_draws += 1;
            }
            Command::SetupCameraProperties { .. } => {
                self.color_target = Some(RenderTargetId::CameraTarget);
            }
            Command::BeginSample(_)
            | Command::EndSample(_)
            | Command::ClearRenderTarget { .. }
            | Command::SetViewport(_)
            | Command::DrawSkybox
            | Command::DrawGizmos(_) => {}
        }
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext for HeadlessContext {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn execute_command_buffer(&mut self, buffer: &CommandBuffer) {
        log::trace!(
            "HeadlessContext: executing '{}' ({} commands)",
            buffer.name(),
            buffer.len()
        );
        for command in buffer.commands() {
            self.apply(command);
        }
        self.pending.extend_from_slice(buffer.commands());
        self.stats.lock().buffers_executed += 1;
    }

    fn submit(&mut self) -> BackendResult<()> {
        if self.device_lost {
            self.pending.clear();
            return Err(BackendError::DeviceLost);
        }
        log::trace!("HeadlessContext: submit ({} commands)", self.pending.len());
        self.executed.append(&mut self.pending);
        self.stats.lock().submits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;

    fn temp(name: &'static str) -> TemporaryDescriptor {
        TemporaryDescriptor::color(
            TextureId::named(name),
            UVec2::new(16, 16),
            TextureFormat::Rgba8Unorm,
        )
    }

    #[test]
    fn test_balanced_temporaries() {
        let mut ctx = HeadlessContext::new();
        let mut buffer = CommandBuffer::new("test");
        buffer.get_temporary(temp("_A"));
        buffer.get_temporary(temp("_B"));
        buffer.release_temporary(TextureId::named("_A"));
        buffer.release_temporary(TextureId::named("_B"));
        ctx.execute_command_buffer(&buffer);
        ctx.submit().unwrap();

        let stats = ctx.stats();
        assert_eq!(stats.outstanding_temporaries(), 0);
        assert_eq!(stats.peak_live_temporaries, 2);
        assert_eq!(stats.invalid_operations, 0);
        assert_eq!(ctx.live_temporary_count(), 0);
        assert_eq!(ctx.submitted_commands().len(), 4);
    }

    #[test]
    fn test_unknown_release_is_flagged() {
        let mut ctx = HeadlessContext::new();
        let mut buffer = CommandBuffer::new("test");
        buffer.release_temporary(TextureId::named("_Nope"));
        ctx.execute_command_buffer(&buffer);
        assert_eq!(ctx.stats().invalid_operations, 1);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut ctx = HeadlessContext::new();
        let mut buffer = CommandBuffer::new("test");
        buffer.set_global_float("_X", 1.0);
        buffer.set_global_float("_X", 2.0);
        buffer.set_keyword("_K", true);
        ctx.execute_command_buffer(&buffer);
        assert_eq!(ctx.global_float("_X"), Some(2.0));
        assert!(ctx.keyword_enabled("_K"));
        assert!(!ctx.keyword_enabled("_Other"));
    }

    #[test]
    fn test_device_lost_submit_fails() {
        let mut ctx = HeadlessContext::new();
        ctx.set_device_lost(true);
        assert!(matches!(ctx.submit(), Err(BackendError::DeviceLost)));
        assert_eq!(ctx.stats().submits, 0);
    }
}
