use crate::types::{Compression, MipmapFilter, MipmapMode, MipmapWrap, PixelFormat, SaveType};

/// Configuration for a single [crate::write_dds] call.
///
/// Immutable once validated (spec.md §3 Lifecycle): nothing in the
/// encoder mutates a `EncodeConfig` after [crate::driver::write_dds] is
/// entered.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodeConfig {
    pub compression: Compression,
    pub pixel_format: PixelFormat,
    pub mipmap_mode: MipmapMode,
    pub save_type: SaveType,
    pub mipmap_filter: MipmapFilter,
    pub mipmap_wrap: MipmapWrap,
    pub flip_vertical: bool,
    pub gamma_correct: bool,
    pub srgb: bool,
    pub gamma: f64,
    pub preserve_alpha_coverage: bool,
    pub alpha_test_threshold: f64,
    pub perceptual_metric: bool,
    pub transparent_index: i32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            compression: Compression::None,
            pixel_format: PixelFormat::Default,
            mipmap_mode: MipmapMode::None,
            save_type: SaveType::SelectedLayer,
            mipmap_filter: MipmapFilter::Box,
            mipmap_wrap: MipmapWrap::Clamp,
            flip_vertical: false,
            gamma_correct: false,
            srgb: false,
            gamma: 2.2,
            preserve_alpha_coverage: false,
            alpha_test_threshold: 0.5,
            perceptual_metric: true,
            transparent_index: -1,
        }
    }
}
