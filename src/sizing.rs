//! Mipmap sizing (component C, spec.md §4.C): level counts, per-level
//! dimensions, and per-level/total byte sizes for both the uncompressed
//! and block-compressed cases.

use crate::types::Compression;

/// `1 + floor(log2(max(w, h)))`, at least 1 even for a 1x1 image.
pub fn mip_levels(width: u32, height: u32) -> u32 {
    let max_dim = width.max(height).max(1);
    u32::BITS - max_dim.leading_zeros()
}

/// The reduced value for `base_dimension` at mip level `level`.
pub fn mip_dimension(base_dimension: u32, level: u32) -> u32 {
    (base_dimension >> level).max(1)
}

fn div_round_up(x: u32, d: u32) -> u32 {
    (x + d - 1) / d
}

/// Size in bytes of one level at `(w, h)` for `bpp` bytes/pixel when
/// uncompressed, or one 4x4-block-aligned level when `compression` is set
/// (`bpp` is then ignored).
pub fn level_size(width: u32, height: u32, bpp: usize, compression: Compression) -> usize {
    match compression.block_size_in_bytes() {
        0 => width as usize * height as usize * bpp,
        block_bytes => div_round_up(width, 4) as usize * div_round_up(height, 4) as usize * block_bytes,
    }
}

/// Total bytes for every mip level from `width x height` down to 1x1 over
/// `mipmaps` levels, uncompressed (`compression = None`) or block
/// compressed. `depth` multiplies each level by `max(1, depth >> level)`
/// for volume surfaces; pass `1` for 2D surfaces.
pub fn mipmapped_size(width: u32, height: u32, depth: u32, bpp: usize, mipmaps: u32, compression: Compression) -> usize {
    (0..mipmaps)
        .map(|level| {
            let w = mip_dimension(width, level);
            let h = mip_dimension(height, level);
            let d = mip_dimension(depth, level) as usize;
            level_size(w, h, bpp, compression) * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_levels_1x1_is_1() {
        assert_eq!(mip_levels(1, 1), 1);
    }

    #[test]
    fn mip_levels_8x8_is_4() {
        assert_eq!(mip_levels(8, 8), 4);
    }

    #[test]
    fn mip_levels_nonsquare_uses_max_dimension() {
        assert_eq!(mip_levels(16, 4), 5);
    }

    #[test]
    fn mip_dimension_floors_at_1() {
        assert_eq!(mip_dimension(8, 10), 1);
    }

    #[test]
    fn level_size_uncompressed() {
        assert_eq!(level_size(4, 4, 4, Compression::None), 64);
    }

    #[test]
    fn level_size_bc1_rounds_up_to_block() {
        // A 1x1 BC1 level still costs a full 4x4 block.
        assert_eq!(level_size(1, 1, 0, Compression::BC1), 8);
    }

    #[test]
    fn level_size_bc3_is_16_bytes_per_block() {
        assert_eq!(level_size(4, 4, 0, Compression::BC3), 16);
    }

    #[test]
    fn mipmapped_size_bc1_8x8_4_levels() {
        // 8x8 is 2x2 blocks (32 bytes); 4x4, 2x2, 1x1 each round up to
        // one 4x4 block (8 bytes).
        assert_eq!(mipmapped_size(8, 8, 1, 0, 4, Compression::BC1), 32 + 8 + 8 + 8);
    }

    #[test]
    fn mipmapped_size_volume_multiplies_by_depth() {
        let uncompressed = mipmapped_size(4, 4, 4, 4, 1, Compression::None);
        assert_eq!(uncompressed, 4 * 4 * 4 * 4);
    }
}
