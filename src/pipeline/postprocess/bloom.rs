//! Bloom
//!
//! Extracts energy above a soft threshold into a half resolution buffer,
//! blurs it down a pyramid of separable horizontal/vertical levels and
//! combines the levels back up, releasing every level right after its
//! single use.

use glam::{UVec2, Vec4};

use super::passes::{draw, half, PostFxPass};
use super::settings::{BloomMode, BloomSettings};
use crate::backend::types::{ProgramHandle, TextureFormat};
use crate::color::gamma_to_linear;
use crate::command::{properties, CommandBuffer, RenderTargetId, TemporaryDescriptor, TextureId};

/// Upper bound on pyramid levels
pub const MAX_BLOOM_PYRAMID_LEVELS: u32 = 16;

pub(crate) const BLOOM_RESULT: TextureId = TextureId::named(properties::BLOOM_RESULT);
const BLOOM_PREFILTER: TextureId = TextureId::named(properties::BLOOM_PREFILTER);

/// One blur level: horizontal pass target, then vertical pass target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidLevel {
    pub horizontal: TextureId,
    pub vertical: TextureId,
    pub size: UVec2,
}

impl PyramidLevel {
    fn new(level: u32, size: UVec2) -> Self {
        Self {
            horizontal: TextureId::indexed(properties::BLOOM_PYRAMID, 2 * level),
            vertical: TextureId::indexed(properties::BLOOM_PYRAMID, 2 * level + 1),
            size,
        }
    }
}

/// Soft-knee threshold vector read by the prefilter pass
pub fn threshold_vector(threshold: f32, knee: f32) -> Vec4 {
    let x = gamma_to_linear(threshold);
    let y = x * knee;
    let z = 2.0 * y;
    let w = 0.25 / (y + 0.00001);
    Vec4::new(x, y - x, z, w)
}

/// Sizes of a bloom pyramid, decided before anything is recorded
#[derive(Debug, Clone, PartialEq)]
pub struct BloomPlan {
    /// Prefilter size, half the source resolution
    pub prefilter_size: UVec2,
    pub levels: Vec<PyramidLevel>,
}

impl BloomPlan {
    /// Plan a pyramid for a source of `source_size`, or `None` when bloom
    /// would do nothing
    pub fn new(bloom: &BloomSettings, source_size: UVec2) -> Option<Self> {
        let prefilter_size = half(source_size);
        let limit = bloom.downscale_limit;
        if bloom.max_iterations == 0
            || bloom.intensity <= 0.0
            || prefilter_size.x < limit.saturating_mul(2)
            || prefilter_size.y < limit.saturating_mul(2)
        {
            return None;
        }

        let max_levels = bloom.max_iterations.min(MAX_BLOOM_PYRAMID_LEVELS);
        let mut levels = Vec::with_capacity(max_levels as usize);
        let mut size = half(prefilter_size);
        for level in 0..max_levels {
            if size.x < limit || size.y < limit {
                break;
            }
            levels.push(PyramidLevel::new(level, size));
            size = half(size);
        }
        if levels.is_empty() {
            return None;
        }

        Some(Self {
            prefilter_size,
            levels,
        })
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}

/// Record the bloom passes for `plan`, leaving the result in
/// `_BloomResult` at `buffer_size`.
pub(crate) fn record_bloom(
    buffer: &mut CommandBuffer,
    program: ProgramHandle,
    bloom: &BloomSettings,
    plan: &BloomPlan,
    source: RenderTargetId,
    buffer_size: UVec2,
    format: TextureFormat,
) {
    buffer.begin_sample("Bloom");
    buffer.set_global_vector(
        properties::BLOOM_THRESHOLD,
        threshold_vector(bloom.threshold, bloom.threshold_knee),
    );

    buffer.get_temporary(TemporaryDescriptor::color(
        BLOOM_PREFILTER,
        plan.prefilter_size,
        format,
    ));
    let prefilter_pass = if bloom.fade_fireflies {
        PostFxPass::BloomPrefilterFireflies
    } else {
        PostFxPass::BloomPrefilter
    };
    draw(buffer, program, source, BLOOM_PREFILTER, prefilter_pass);

    let mut from = BLOOM_PREFILTER;
    for level in &plan.levels {
        buffer.get_temporary(TemporaryDescriptor::color(level.horizontal, level.size, format));
        buffer.get_temporary(TemporaryDescriptor::color(level.vertical, level.size, format));
        draw(buffer, program, from, level.horizontal, PostFxPass::BloomHorizontal);
        draw(buffer, program, level.horizontal, level.vertical, PostFxPass::BloomVertical);
        from = level.vertical;
    }
    buffer.release_temporary(BLOOM_PREFILTER);
    buffer.set_global_float(
        properties::BLOOM_BICUBIC_UPSAMPLING,
        if bloom.bicubic_upsampling { 1.0 } else { 0.0 },
    );

    let (combine_pass, final_pass, final_intensity) = match bloom.mode {
        BloomMode::Additive => {
            buffer.set_global_float(properties::BLOOM_INTENSITY, 1.0);
            (PostFxPass::BloomAdd, PostFxPass::BloomAdd, bloom.intensity)
        }
        BloomMode::Scattering => {
            buffer.set_global_float(properties::BLOOM_INTENSITY, bloom.scatter);
            (
                PostFxPass::BloomScatter,
                PostFxPass::BloomScatterFinal,
                bloom.intensity.min(0.95),
            )
        }
    };

    // Walk back up: the smallest level only feeds through its vertical blur,
    // each larger level combines the running result with its own blur.
    let mut remaining = plan.levels.clone();
    if let Some(last) = remaining.pop() {
        buffer.release_temporary(last.horizontal);
        from = last.vertical;
    }
    while let Some(level) = remaining.pop() {
        buffer.set_global_texture(properties::POST_FX_SOURCE2, level.vertical);
        draw(buffer, program, from, level.horizontal, combine_pass);
        buffer.release_temporary(from);
        buffer.release_temporary(level.vertical);
        from = level.horizontal;
    }

    buffer.set_global_float(properties::BLOOM_INTENSITY, final_intensity);
    buffer.set_global_texture(properties::POST_FX_SOURCE2, source);
    buffer.get_temporary(TemporaryDescriptor::color(BLOOM_RESULT, buffer_size, format));
    draw(buffer, program, from, BLOOM_RESULT, final_pass);
    buffer.release_temporary(from);
    buffer.end_sample("Bloom");
}
