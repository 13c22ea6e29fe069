//! Custom Render Pipeline - the per-camera core of a forward render pipeline
//!
//! The crate records GPU work as command streams and hands them to a
//! [`RenderContext`]; no graphics API is linked. A [`HeadlessContext`] ships
//! as the reference executor.
//!
//! # Features
//! - Camera renderer: culling, intermediate buffers, render scale, attachment
//!   copies and the final blit
//! - Lighting packer: fixed-capacity directional and point/spot light arrays
//!   with per-object light index maps
//! - Post-processing: bloom pyramid, color grading LUT, tone mapping, FXAA and
//!   rescaling
//! - Entity Component System (ECS) based scene extraction using Bevy ECS

pub mod backend;
pub mod color;
pub mod command;
pub mod config;
pub mod pipeline;
pub mod scene;
pub mod shadows;
pub mod visibility;

// Re-export Bevy ECS prelude for users
pub use bevy_ecs::prelude::*;

pub use backend::{BackendError, BackendResult, HeadlessContext, RenderContext};
pub use command::{Command, CommandBuffer};
pub use config::{CameraBufferSettings, CameraSettings, PipelineConfig, ShadowSettings};
pub use pipeline::{CameraRenderer, RenderOutcome, RenderPipeline};
pub use visibility::{VisibilityProvider, VisibilitySet, WorldVisibility};
