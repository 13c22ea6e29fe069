//! Common types shared between the pipeline and render contexts

use glam::{UVec2, Vec2};

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Display-referred 8-bit color
    Rgba8Unorm,
    /// Scene-referred HDR color
    Rgba16Float,
    /// Depth attachment
    Depth32Float,
}

impl TextureFormat {
    /// Color format used for intermediate buffers
    pub fn color(hdr: bool) -> Self {
        if hdr {
            TextureFormat::Rgba16Float
        } else {
            TextureFormat::Rgba8Unorm
        }
    }

    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm | TextureFormat::Depth32Float => 4,
            TextureFormat::Rgba16Float => 8,
        }
    }
}

/// Filter mode for samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Point,
    Bilinear,
}

/// What happens to attachment contents when a target is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    Load,
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Store,
    Discard,
}

/// Blend factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    Src,
    OneMinusSrc,
    SrcAlpha,
    OneMinusSrcAlpha,
    Dst,
    OneMinusDst,
    DstAlpha,
    OneMinusDstAlpha,
}

impl BlendFactor {
    /// Value written to the `_*SrcBlend` / `_*DstBlend` shader globals
    pub fn shader_value(self) -> f32 {
        match self {
            BlendFactor::Zero => 0.0,
            BlendFactor::One => 1.0,
            BlendFactor::Src => 2.0,
            BlendFactor::OneMinusSrc => 3.0,
            BlendFactor::SrcAlpha => 4.0,
            BlendFactor::OneMinusSrcAlpha => 5.0,
            BlendFactor::Dst => 6.0,
            BlendFactor::OneMinusDst => 7.0,
            BlendFactor::DstAlpha => 8.0,
            BlendFactor::OneMinusDstAlpha => 9.0,
        }
    }
}

/// Axis-aligned rectangle, used both for normalized viewports and pixel rects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// The normalized rect covering the whole view
    pub const FULL: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Scale a normalized rect into pixels of a target of the given size
    pub fn to_pixels(&self, target: UVec2) -> Rect {
        let target = target.as_vec2();
        Rect {
            x: self.x * target.x,
            y: self.y * target.y,
            width: self.width * target.x,
            height: self.height * target.y,
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::FULL
    }
}

/// Handle to a shader program owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Optional device features the pipeline adapts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Direct texture-to-texture copies are available
    pub copy_texture: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self { copy_texture: true }
    }
}
