//! Transient image buffers and render target identifiers

use crate::backend::types::*;
use glam::UVec2;
use std::fmt;

/// Name of a transient image buffer, optionally indexed (`_BloomPyramid3`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId {
    name: &'static str,
    index: Option<u32>,
}

impl TextureId {
    pub const fn named(name: &'static str) -> Self {
        Self { name, index: None }
    }

    pub const fn indexed(name: &'static str, index: u32) -> Self {
        Self {
            name,
            index: Some(index),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn index(&self) -> Option<u32> {
        self.index
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}{}", self.name, index),
            None => f.write_str(self.name),
        }
    }
}

/// Anything a pass can render into or sample from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTargetId {
    /// The camera's display target (back buffer or its target texture)
    CameraTarget,
    /// A transient image buffer acquired this frame
    Temporary(TextureId),
    /// Placeholder bound for inputs that were not produced this frame
    Missing,
}

impl From<TextureId> for RenderTargetId {
    fn from(id: TextureId) -> Self {
        RenderTargetId::Temporary(id)
    }
}

/// Request for a transient image buffer
#[derive(Debug, Clone, PartialEq)]
pub struct TemporaryDescriptor {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    /// Depth buffer bits, zero for color buffers
    pub depth_bits: u32,
    pub filter: FilterMode,
    pub format: TextureFormat,
}

impl TemporaryDescriptor {
    pub fn color(id: TextureId, size: UVec2, format: TextureFormat) -> Self {
        Self {
            id,
            width: size.x,
            height: size.y,
            depth_bits: 0,
            filter: FilterMode::Bilinear,
            format,
        }
    }

    pub fn depth(id: TextureId, size: UVec2) -> Self {
        Self {
            id,
            width: size.x,
            height: size.y,
            depth_bits: 32,
            filter: FilterMode::Point,
            format: TextureFormat::Depth32Float,
        }
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn byte_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel() as u64
    }
}
