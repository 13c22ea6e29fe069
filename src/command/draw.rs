//! Geometry draw descriptions recorded into a command buffer

use crate::backend::types::ProgramHandle;
use bitflags::bitflags;

/// Inclusive range of render queue values a draw accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderQueueRange {
    pub lower: u32,
    pub upper: u32,
}

impl RenderQueueRange {
    pub const OPAQUE: Self = Self {
        lower: 0,
        upper: 2500,
    };
    pub const TRANSPARENT: Self = Self {
        lower: 2501,
        upper: 5000,
    };
    pub const ALL: Self = Self {
        lower: 0,
        upper: 5000,
    };

    pub fn contains(&self, queue: u32) -> bool {
        queue >= self.lower && queue <= self.upper
    }
}

/// Draw order for a renderer list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortingCriteria {
    /// Front to back, for early depth rejection
    CommonOpaque,
    /// Back to front, for correct blending
    CommonTransparent,
    /// Keep visibility order
    None,
}

/// Shader pass tag a renderer's material must provide to be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderTag {
    Unlit,
    Lit,
    /// Built-in pipeline passes this pipeline does not support
    Legacy,
}

bitflags! {
    /// Per-object shading data requested from the visibility provider
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PerObjectData: u32 {
        const REFLECTION_PROBES = 1 << 0;
        const LIGHTMAPS = 1 << 1;
        const SHADOW_MASK = 1 << 2;
        const LIGHT_PROBE = 1 << 3;
        const OCCLUSION_PROBE = 1 << 4;
        const LIGHT_PROBE_PROXY_VOLUME = 1 << 5;
        const OCCLUSION_PROBE_PROXY_VOLUME = 1 << 6;
        const LIGHT_DATA = 1 << 7;
        const LIGHT_INDICES = 1 << 8;
    }
}

impl PerObjectData {
    /// Everything the lit shaders read, minus per-object light lists
    pub fn shading() -> Self {
        Self::REFLECTION_PROBES
            | Self::LIGHTMAPS
            | Self::SHADOW_MASK
            | Self::LIGHT_PROBE
            | Self::OCCLUSION_PROBE
            | Self::LIGHT_PROBE_PROXY_VOLUME
            | Self::OCCLUSION_PROBE_PROXY_VOLUME
    }

    pub fn lights_per_object() -> Self {
        Self::LIGHT_DATA | Self::LIGHT_INDICES
    }
}

/// Which gizmos to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoSubset {
    PreImageEffects,
    PostImageEffects,
}

/// A resolved renderer list draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRenderers {
    pub queue: RenderQueueRange,
    pub sorting: SortingCriteria,
    pub shader_tags: Vec<ShaderTag>,
    pub per_object_data: PerObjectData,
    pub dynamic_batching: bool,
    pub instancing: bool,
    pub rendering_layer_mask: u32,
    /// Replaces every renderer's material when set
    pub override_program: Option<ProgramHandle>,
    /// Object ids in draw order
    pub objects: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_ranges_do_not_overlap() {
        assert!(RenderQueueRange::OPAQUE.contains(2000));
        assert!(!RenderQueueRange::OPAQUE.contains(3000));
        assert!(RenderQueueRange::TRANSPARENT.contains(3000));
        assert!(!RenderQueueRange::TRANSPARENT.contains(2500));
        assert!(RenderQueueRange::ALL.contains(2500));
    }

    #[test]
    fn test_shading_flags_exclude_light_lists() {
        assert!(!PerObjectData::shading().intersects(PerObjectData::lights_per_object()));
    }
}
