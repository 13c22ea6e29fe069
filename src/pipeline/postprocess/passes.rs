//! Post-fx program passes

use glam::UVec2;

use super::settings::ToneMappingMode;
use crate::backend::types::{LoadOp, ProgramHandle, StoreOp};
use crate::command::{properties, CommandBuffer, RenderTargetId};

/// Passes of the post-fx program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostFxPass {
    BloomAdd,
    BloomHorizontal,
    BloomPrefilter,
    BloomPrefilterFireflies,
    BloomScatter,
    BloomScatterFinal,
    BloomVertical,
    Copy,
    ColorGradingNone,
    ColorGradingAces,
    ColorGradingNeutral,
    ColorGradingReinhard,
    ApplyColorGrading,
    ApplyColorGradingWithLuma,
    FinalRescale,
    Fxaa,
    FxaaWithLuma,
}

impl PostFxPass {
    /// Pass index inside the program
    pub fn index(self) -> u32 {
        match self {
            PostFxPass::BloomAdd => 0,
            PostFxPass::BloomHorizontal => 1,
            PostFxPass::BloomPrefilter => 2,
            PostFxPass::BloomPrefilterFireflies => 3,
            PostFxPass::BloomScatter => 4,
            PostFxPass::BloomScatterFinal => 5,
            PostFxPass::BloomVertical => 6,
            PostFxPass::Copy => 7,
            PostFxPass::ColorGradingNone => 8,
            PostFxPass::ColorGradingAces => 9,
            PostFxPass::ColorGradingNeutral => 10,
            PostFxPass::ColorGradingReinhard => 11,
            PostFxPass::ApplyColorGrading => 12,
            PostFxPass::ApplyColorGradingWithLuma => 13,
            PostFxPass::FinalRescale => 14,
            PostFxPass::Fxaa => 15,
            PostFxPass::FxaaWithLuma => 16,
        }
    }

    /// LUT baking pass for a tone mapping mode
    pub fn color_grading(mode: ToneMappingMode) -> Self {
        match mode {
            ToneMappingMode::None => PostFxPass::ColorGradingNone,
            ToneMappingMode::Aces => PostFxPass::ColorGradingAces,
            ToneMappingMode::Neutral => PostFxPass::ColorGradingNeutral,
            ToneMappingMode::Reinhard => PostFxPass::ColorGradingReinhard,
        }
    }

    /// FXAA pass, reading luma from alpha unless alpha must be kept
    pub fn fxaa(keep_alpha: bool) -> Self {
        if keep_alpha {
            PostFxPass::Fxaa
        } else {
            PostFxPass::FxaaWithLuma
        }
    }

    /// Color grading pass feeding FXAA
    pub fn apply_color_grading(keep_alpha: bool) -> Self {
        if keep_alpha {
            PostFxPass::ApplyColorGrading
        } else {
            PostFxPass::ApplyColorGradingWithLuma
        }
    }
}

/// Full-screen draw from one buffer into another
pub(crate) fn draw(
    buffer: &mut CommandBuffer,
    program: ProgramHandle,
    from: impl Into<RenderTargetId>,
    to: impl Into<RenderTargetId>,
    pass: PostFxPass,
) {
    buffer.set_global_texture(properties::POST_FX_SOURCE, from);
    buffer.set_render_target(to, LoadOp::DontCare, StoreOp::Store);
    buffer.draw_procedural(program, pass.index());
}

pub(crate) fn half(size: UVec2) -> UVec2 {
    size / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ToneMappingMode::None, 8)]
    #[case(ToneMappingMode::Aces, 9)]
    #[case(ToneMappingMode::Neutral, 10)]
    #[case(ToneMappingMode::Reinhard, 11)]
    fn test_tone_mapping_pass_lookup(#[case] mode: ToneMappingMode, #[case] index: u32) {
        assert_eq!(PostFxPass::color_grading(mode).index(), index);
    }

    #[test]
    fn test_luma_variants() {
        assert_eq!(PostFxPass::fxaa(true), PostFxPass::Fxaa);
        assert_eq!(PostFxPass::fxaa(false).index(), 16);
        assert_eq!(PostFxPass::apply_color_grading(false).index(), 13);
    }
}
