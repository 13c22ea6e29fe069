//! Core backend abstraction traits
//!
//! These traits define the interface a device queue must implement to run
//! the command streams recorded by the pipeline.

use crate::backend::types::*;
use crate::command::CommandBuffer;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Device queue the pipeline records into.
///
/// `execute_command_buffer` appends a copy of the buffer's commands to the
/// pending work; the caller is free to clear and reuse the buffer right
/// after. Nothing reaches the GPU until `submit`.
pub trait RenderContext {
    /// Optional features of the device behind this context
    fn capabilities(&self) -> DeviceCapabilities;

    /// Append the commands of `buffer` to the pending work
    fn execute_command_buffer(&mut self, buffer: &CommandBuffer);

    /// Flush pending work to the device queue
    fn submit(&mut self) -> BackendResult<()>;
}
