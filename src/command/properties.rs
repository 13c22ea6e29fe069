//! Global shader parameter and keyword names.
//!
//! Shaders bind these by name, so they are part of the pipeline's ABI.

// Camera renderer
pub const CAMERA_BUFFER_SIZE: &str = "_CameraBufferSize";
pub const CAMERA_COLOR_TEXTURE: &str = "_CameraColorTexture";
pub const CAMERA_DEPTH_TEXTURE: &str = "_CameraDepthTexture";
pub const SOURCE_TEXTURE: &str = "_SourceTexture";
pub const CAMERA_SRC_BLEND: &str = "_CameraSrcBlend";
pub const CAMERA_DST_BLEND: &str = "_CameraDstBlend";
pub const CAMERA_COLOR_ATTACHMENT: &str = "_CameraColorAttachment";
pub const CAMERA_DEPTH_ATTACHMENT: &str = "_CameraDepthAttachment";

// Lighting
pub const DIR_LIGHT_COUNT: &str = "_DirectionalLightCount";
pub const DIR_LIGHT_COLORS: &str = "_DirectionalLightColors";
pub const DIR_LIGHT_DIRECTIONS_AND_MASKS: &str = "_DirectionalLightDirectionsAndMasks";
pub const DIR_LIGHT_SHADOW_DATA: &str = "_DirectionalLightShadowData";
pub const OTHER_LIGHT_COUNT: &str = "_OtherLightCount";
pub const OTHER_LIGHT_COLORS: &str = "_OtherLightColors";
pub const OTHER_LIGHT_POSITIONS: &str = "_OtherLightPositions";
pub const OTHER_LIGHT_DIRECTIONS_AND_MASKS: &str = "_OtherLightDirectionsAndMasks";
pub const OTHER_LIGHT_SPOT_ANGLES: &str = "_OtherLightSpotAngles";
pub const OTHER_LIGHT_SHADOW_DATA: &str = "_OtherLightShadowData";
pub const LIGHTS_PER_OBJECT_KEYWORD: &str = "_LIGHTS_PER_OBJECT";

// Bloom
pub const BLOOM_BICUBIC_UPSAMPLING: &str = "_BloomBicubicUpsampling";
pub const BLOOM_THRESHOLD: &str = "_BloomThreshold";
pub const BLOOM_INTENSITY: &str = "_BloomIntensity";
pub const POST_FX_SOURCE: &str = "_PostFXSource";
pub const POST_FX_SOURCE2: &str = "_PostFXSource2";
pub const BLOOM_PREFILTER: &str = "_BloomPrefilter";
pub const BLOOM_PYRAMID: &str = "_BloomPyramid";
pub const BLOOM_RESULT: &str = "_BloomResult";

// Color grading
pub const COLOR_ADJUSTMENTS: &str = "_ColorAdjustments";
pub const COLOR_FILTER: &str = "_ColorFilter";
pub const WHITE_BALANCE: &str = "_WhiteBalance";
pub const SPLIT_TONING_SHADOWS: &str = "_SplitToningShadows";
pub const SPLIT_TONING_HIGHLIGHTS: &str = "_SplitToningHighlights";
pub const CHANNEL_MIXER_RED: &str = "_ChannelMixerRed";
pub const CHANNEL_MIXER_GREEN: &str = "_ChannelMixerGreen";
pub const CHANNEL_MIXER_BLUE: &str = "_ChannelMixerBlue";
pub const SMH_SHADOWS: &str = "_SmhShadows";
pub const SMH_MIDTONES: &str = "_SmhMidtones";
pub const SMH_HIGHLIGHTS: &str = "_SmhHighlights";
pub const SMH_RANGE: &str = "_SmhRange";
pub const COLOR_GRADING_LUT: &str = "_ColorGradingLUT";
pub const COLOR_GRADING_LUT_PARAMETERS: &str = "_ColorGradingLUTParameters";
pub const COLOR_GRADING_LUT_IN_LOG_C: &str = "_ColorGradingLUTInLogC";

// Final composite
pub const FINAL_SRC_BLEND: &str = "_FinalSrcBlend";
pub const FINAL_DST_BLEND: &str = "_FinalDstBlend";
pub const COPY_BICUBIC: &str = "_CopyBicubic";
pub const COLOR_GRADING_RESULT: &str = "_ColorGradingResult";
pub const FINAL_RESULT: &str = "_FinalResult";
pub const FXAA_CONFIG: &str = "_FXAAConfig";
pub const FXAA_QUALITY_LOW_KEYWORD: &str = "FXAA_QUALITY_LOW";
pub const FXAA_QUALITY_MEDIUM_KEYWORD: &str = "FXAA_QUALITY_MEDIUM";
