//! Block compression (component E, spec.md §4.E): wraps `intel_tex_2` for
//! BC1/BC3/BC4/BC5 and `texpresso` for BC2, since `intel_tex_2` has no BC2
//! encoder (confirmed in the teacher's own `bcn::encode::BcnEncode` impl
//! for `Bc2`, which unconditionally returns `UnsupportedFormat`).

use crate::error::CompressSurfaceError;
use crate::types::{Compression, PhysicalBlockFormat};

/// Compress one RGBA8 level to `compression`'s physical block format.
/// `compression` must already have been resolved to its physical variant
/// by the caller (BC3n/RXGB/YCoCg/YCoCgS/AExp all compress as BC3 here;
/// the caller is responsible for the channel preconditioning in
/// [crate::pack] that makes that meaningful).
pub fn compress_level(width: u32, height: u32, rgba8: &[u8], compression: Compression, perceptual_metric: bool) -> Result<Vec<u8>, CompressSurfaceError> {
    if width == 0 || height == 0 {
        return Err(CompressSurfaceError::ZeroSizedSurface { width, height });
    }

    match compression.physical_block_format() {
        PhysicalBlockFormat::None => Ok(rgba8.to_vec()),
        PhysicalBlockFormat::Bc1 => Ok(compress_intel_bc1(width, height, rgba8)),
        PhysicalBlockFormat::Bc2 => compress_texpresso_bc2(width, height, rgba8),
        PhysicalBlockFormat::Bc3 => Ok(compress_intel_bc3(width, height, rgba8, perceptual_metric)),
        PhysicalBlockFormat::Bc4 => Ok(compress_intel_bc4(width, height, rgba8)),
        PhysicalBlockFormat::Bc5 => Ok(compress_intel_bc5(width, height, rgba8)),
    }
}

fn surface(width: u32, height: u32, data: &[u8]) -> intel_tex_2::RgbaSurface<'_> {
    intel_tex_2::RgbaSurface {
        width,
        height,
        stride: width * 4,
        data,
    }
}

fn compress_intel_bc1(width: u32, height: u32, rgba8: &[u8]) -> Vec<u8> {
    intel_tex_2::bc1::compress_blocks(&surface(width, height, rgba8))
}

fn compress_intel_bc3(width: u32, height: u32, rgba8: &[u8], _perceptual_metric: bool) -> Vec<u8> {
    // intel_tex_2's BC3 encoder has no separate perceptual/uniform metric
    // knob; `perceptual_metric` is accepted for config symmetry with the
    // original plugin's option and is a no-op here.
    intel_tex_2::bc3::compress_blocks(&surface(width, height, rgba8))
}

fn compress_intel_bc4(width: u32, height: u32, rgba8: &[u8]) -> Vec<u8> {
    intel_tex_2::bc4::compress_blocks(&surface(width, height, rgba8))
}

fn compress_intel_bc5(width: u32, height: u32, rgba8: &[u8]) -> Vec<u8> {
    intel_tex_2::bc5::compress_blocks(&surface(width, height, rgba8))
}

fn compress_texpresso_bc2(width: u32, height: u32, rgba8: &[u8]) -> Result<Vec<u8>, CompressSurfaceError> {
    let format = texpresso::Format::Bc2;
    let mut out = vec![0u8; format.compressed_size(width as usize, height as usize)];
    format.compress(rgba8, width as usize, height as usize, texpresso::Params::default(), &mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bc1_compress_produces_one_block_per_4x4_tile() {
        let rgba = vec![64u8; 4 * 4 * 4];
        let out = compress_level(4, 4, &rgba, Compression::BC1, true).unwrap();
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn bc3n_compresses_as_physical_bc3() {
        let rgba = vec![64u8; 4 * 4 * 4];
        let out = compress_level(4, 4, &rgba, Compression::BC3n, true).unwrap();
        assert_eq!(out.len(), 16);
    }

    #[test]
    fn bc2_compresses_via_texpresso() {
        let rgba = vec![64u8; 4 * 4 * 4];
        let out = compress_level(4, 4, &rgba, Compression::BC2, true).unwrap();
        assert_eq!(out.len(), 16);
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        let err = compress_level(0, 4, &[], Compression::BC1, true).unwrap_err();
        assert!(matches!(err, CompressSurfaceError::ZeroSizedSurface { .. }));
    }
}
