//! Per-surface level writer (component G, spec.md §4.G): fetch one
//! layer's pixels, apply compression preconditioning, build the mip
//! chain, and pack or compress each level into its final on-disk bytes.

use crate::config::EncodeConfig;
use crate::error::{CompressSurfaceError, EncodeError};
use crate::image::{ChannelLayout, Layer};
use crate::mipmap;
use crate::pack;
use crate::sizing::mip_levels;
use crate::types::{Compression, MipmapMode, PixelFormat, PixelType, RgbColor};

/// One layer's pixels resolved to plain RGBA8, plus the raw palette index
/// byte per pixel when the source was indexed (kept around only for the
/// [PixelFormat::A8]-on-indexed quirk below).
struct BasePixels {
    rgba: Vec<u8>,
    raw_index: Option<Vec<u8>>,
}

/// Fetch `layer` as RGBA8, resolving indexed colors through `palette`.
/// Unindexed (or palette-less) sources pass through unchanged.
fn fetch_base_pixels<L: Layer>(layer: &L, palette: Option<&[RgbColor]>) -> BasePixels {
    let (w, h) = layer.size();
    let pixel_type = layer.pixel_type();

    if !pixel_type.is_indexed() {
        return BasePixels {
            rgba: layer.read_rect(0, 0, w, h, ChannelLayout::Rgba),
            raw_index: None,
        };
    }

    let ya = layer.read_rect(0, 0, w, h, ChannelLayout::YA);
    let mut rgba = Vec::with_capacity(ya.len() * 2);
    let mut raw_index = Vec::with_capacity(ya.len() / 2);
    for pair in ya.chunks_exact(2) {
        let (index, alpha) = (pair[0], pair[1]);
        raw_index.push(index);
        let (r, g, b) = match palette.and_then(|p| p.get(index as usize)) {
            Some(c) => (c.r, c.g, c.b),
            None => (index, index, index),
        };
        rgba.extend_from_slice(&[r, g, b, alpha]);
    }

    BasePixels {
        rgba,
        raw_index: Some(raw_index),
    }
}

/// Apply the [PixelFormat::A8]-on-indexed quirk: when the destination
/// pixel format is A8 and the source was indexed, the alpha channel
/// carries the raw palette index byte, not the resolved alpha (spec.md
/// §4.G, mirroring the original plugin's `convert_pixels` behavior where
/// the alpha output for format `A8` is `src[i]` itself).
fn apply_a8_indexed_quirk(rgba: &mut [u8], raw_index: &Option<Vec<u8>>, pixel_format: PixelFormat) {
    if pixel_format != PixelFormat::A8 {
        return;
    }
    let Some(indices) = raw_index else { return };
    for (pixel, &index) in rgba.chunks_exact_mut(4).zip(indices) {
        pixel[3] = index;
    }
}

/// Apply the compression channel-preconditioning transforms in place,
/// matching spec.md §4.B: BC3n puts red into alpha and forces red to
/// 255; RXGB swaps red and alpha; YCoCg/YCoCgS/AExp replace the pixel
/// entirely with their packed representation. A no-op for every other
/// compression (and for [Compression::None], preconditioning never
/// applies — `pixel_format` governs uncompressed output instead).
fn precondition_for_compression(rgba: &mut [u8], compression: Compression) {
    match compression {
        Compression::BC3n => {
            for pixel in rgba.chunks_exact_mut(4) {
                pixel[3] = pixel[0];
                pixel[0] = 255;
            }
        }
        Compression::RXGB => {
            for pixel in rgba.chunks_exact_mut(4) {
                pixel.swap(0, 3);
            }
        }
        Compression::YCoCg => {
            for pixel in rgba.chunks_exact_mut(4) {
                pixel.copy_from_slice(&pack::to_ycocg(pixel[0], pixel[1], pixel[2], false));
            }
        }
        Compression::YCoCgS => {
            for pixel in rgba.chunks_exact_mut(4) {
                pixel.copy_from_slice(&pack::to_ycocg(pixel[0], pixel[1], pixel[2], true));
            }
        }
        Compression::AExp => {
            for pixel in rgba.chunks_exact_mut(4) {
                pixel.copy_from_slice(&pack::alpha_exp(pixel[0], pixel[1], pixel[2]));
            }
        }
        Compression::None | Compression::BC1 | Compression::BC2 | Compression::BC3 | Compression::BC4 | Compression::BC5 => {}
    }
}

/// Pack one RGBA8 level's bytes for an uncompressed surface, honoring
/// `pixel_format` (spec.md §4.A). [PixelFormat::AExp] packs the same way
/// its compression counterpart preconditions a level, just written out
/// directly instead of being fed to a block compressor. [PixelFormat::YCoCg]
/// does not: its uncompressed on-disk layout keeps the pixel's real alpha
/// (`[a, Y, Co, Cg]`), unlike the compression-preconditioning layout used
/// ahead of BC3, so it goes through [pack::pack_ycocg_pixel] instead of
/// [pack::to_ycocg].
fn pack_uncompressed_level(rgba: &[u8], pixel_format: PixelFormat, source_pixel_type: PixelType, raw_index: &Option<Vec<u8>>) -> Vec<u8> {
    match pixel_format {
        PixelFormat::Default => pack_default_level(rgba, source_pixel_type, raw_index),
        PixelFormat::YCoCg => rgba.chunks_exact(4).flat_map(|p| pack::pack_ycocg_pixel(p[0], p[1], p[2], p[3])).collect(),
        PixelFormat::AExp => rgba.chunks_exact(4).flat_map(|p| pack::alpha_exp(p[0], p[1], p[2])).collect(),
        _ => rgba.chunks_exact(4).flat_map(|p| pack::pack_pixel(p[0], p[1], p[2], p[3], pixel_format)).collect(),
    }
}

/// The disk layout for [PixelFormat::Default]: whatever channels the
/// source pixel type already has, in on-disk byte order (BGR/BGRA for
/// color, palette index for indexed, untouched for gray/gray+alpha).
fn pack_default_level(rgba: &[u8], source_pixel_type: PixelType, raw_index: &Option<Vec<u8>>) -> Vec<u8> {
    if let Some(indices) = raw_index {
        return indices.clone();
    }

    match source_pixel_type {
        PixelType::Gray => rgba.chunks_exact(4).map(|p| p[0]).collect(),
        PixelType::GrayA => rgba.chunks_exact(4).flat_map(|p| [p[0], p[3]]).collect(),
        PixelType::Rgb => rgba.chunks_exact(4).flat_map(|p| [p[2], p[1], p[0]]).collect(),
        PixelType::Rgba => rgba.chunks_exact(4).flat_map(|p| [p[2], p[1], p[0], p[3]]).collect(),
        PixelType::Indexed | PixelType::IndexedA => unreachable!("indexed pixel types always carry raw_index"),
    }
}

/// The RGBA8 mip chain for one base level, plus the matching per-level
/// raw palette index bytes when the source was indexed (one entry per
/// chain level, only ever consulted for [PixelFormat::Default] output
/// and the [PixelFormat::A8] quirk on level 0).
struct MipChain {
    rgba: Vec<Vec<u8>>,
    raw_index: Vec<Option<Vec<u8>>>,
}

/// Build the mip chain for one base level, per `config.mipmap_mode`.
/// `existing` supplies the pre-fetched higher levels for
/// [MipmapMode::Existing] (already the right sizes; validated by the
/// caller via [crate::topology::is_valid_existing_mipmap]).
fn build_chain(base: BasePixels, width: u32, height: u32, config: &EncodeConfig, existing: Vec<BasePixels>) -> MipChain {
    let levels = mip_levels(width, height);

    match config.mipmap_mode {
        MipmapMode::None => MipChain {
            rgba: vec![base.rgba],
            raw_index: vec![base.raw_index],
        },
        MipmapMode::Existing => {
            let mut rgba = Vec::with_capacity(existing.len() + 1);
            let mut raw_index = Vec::with_capacity(existing.len() + 1);
            raw_index.push(base.raw_index);
            rgba.push(base.rgba);
            for level in existing {
                raw_index.push(level.raw_index);
                rgba.push(level.rgba);
            }
            MipChain { rgba, raw_index }
        }
        MipmapMode::Generate => {
            if let Some(base_index) = &base.raw_index {
                if config.pixel_format.is_default() {
                    // Indexed + Default output: averaging palette indices
                    // is meaningless, so point-sample instead of filtering.
                    let idx_chain = mipmap::generate_chain_indexed(base_index, width, height, levels);
                    let rgba = idx_chain.iter().map(|l| l.iter().flat_map(|&i| [i, i, i, 255]).collect()).collect();
                    let raw_index = idx_chain.into_iter().map(Some).collect();
                    return MipChain { rgba, raw_index };
                }
            }
            let rgba = mipmap::generate_chain(
                &base.rgba,
                width,
                height,
                levels,
                config.mipmap_filter,
                config.mipmap_wrap,
                config.gamma_correct,
                config.srgb,
                config.gamma,
                config.preserve_alpha_coverage,
                config.alpha_test_threshold,
            );
            let raw_index = (0..rgba.len()).map(|_| None).collect();
            MipChain { rgba, raw_index }
        }
    }
}

/// Encode one surface (a base level plus its mip chain) to its final
/// on-disk bytes, concatenated level 0 first.
pub fn encode_surface<L: Layer>(layer: &L, palette: Option<&[RgbColor]>, config: &EncodeConfig, existing_levels: &[L]) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = layer.size();
    let base = fetch_base_pixels(layer, palette);
    let source_pixel_type = layer.pixel_type();

    let existing: Vec<BasePixels> = existing_levels.iter().map(|l| fetch_base_pixels(l, palette)).collect();
    let chain = build_chain(base, width, height, config, existing);

    let mut out = Vec::new();
    let mut w = width;
    let mut h = height;
    for (i, (mut level, raw_index)) in chain.rgba.into_iter().zip(chain.raw_index).enumerate() {
        if i == 0 {
            apply_a8_indexed_quirk(&mut level, &raw_index, config.pixel_format);
        }

        let encoded = if config.compression == Compression::None {
            pack_uncompressed_level(&level, config.pixel_format, source_pixel_type, &raw_index)
        } else {
            precondition_for_compression(&mut level, config.compression);
            encode_compressed_level(w, h, &level, config)?
        };
        out.extend(encoded);

        w = (w >> 1).max(1);
        h = (h >> 1).max(1);
    }

    Ok(out)
}

fn encode_compressed_level(width: u32, height: u32, rgba: &[u8], config: &EncodeConfig) -> Result<Vec<u8>, CompressSurfaceError> {
    crate::compress::compress_level(width, height, rgba, config.compression, config.perceptual_metric)
}

/// Pack one already-RGBA8, non-indexed level for an uncompressed
/// surface. Used by [crate::driver]'s volume-mipmap pass, where each
/// level is synthesized in RGBA8 directly rather than fetched from a
/// [Layer].
pub(crate) fn pack_uncompressed_rgba(rgba: &[u8], pixel_format: PixelFormat, source_pixel_type: PixelType) -> Vec<u8> {
    pack_uncompressed_level(rgba, pixel_format, source_pixel_type, &None)
}
