//! Mipmap chain generation (component D, spec.md §4.D): box/triangle
//! downsampling generalizing the teacher's 2x2-average `downsample_rgba8`
//! to a configurable filter, wrap mode, gamma-correct averaging, and
//! alpha-test-coverage preservation.

use crate::types::{MipmapFilter, MipmapWrap};

/// Generate a full mip chain for an RGBA8 `base` image, `width x height`,
/// returning `levels` buffers (including level 0, an unmodified copy of
/// `base`) each halved from the previous.
#[allow(clippy::too_many_arguments)]
pub fn generate_chain(
    base: &[u8],
    width: u32,
    height: u32,
    levels: u32,
    filter: MipmapFilter,
    wrap: MipmapWrap,
    gamma_correct: bool,
    srgb: bool,
    gamma: f64,
    preserve_alpha_coverage: bool,
    alpha_test_threshold: f64,
) -> Vec<Vec<u8>> {
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base.to_vec());

    let mut w = width;
    let mut h = height;
    for _ in 1..levels {
        let nw = (w >> 1).max(1);
        let nh = (h >> 1).max(1);
        let prev = chain.last().unwrap();
        let mut next = downsample(prev, w, h, nw, nh, filter, wrap, gamma_correct, srgb, gamma);

        if preserve_alpha_coverage {
            let source_coverage = alpha_coverage(base, width, height, alpha_test_threshold);
            rescale_alpha_to_coverage(&mut next, source_coverage, alpha_test_threshold);
        }

        chain.push(next);
        w = nw;
        h = nh;
    }

    chain
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn to_linear(byte: u8, gamma_correct: bool, srgb: bool, gamma: f64) -> f64 {
    let c = byte as f64 / 255.0;
    if srgb {
        srgb_to_linear(c)
    } else if gamma_correct {
        c.powf(gamma)
    } else {
        c
    }
}

fn from_linear(value: f64, gamma_correct: bool, srgb: bool, gamma: f64) -> u8 {
    let c = if srgb {
        linear_to_srgb(value)
    } else if gamma_correct {
        value.powf(1.0 / gamma)
    } else {
        value
    };
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Map a (possibly out-of-range) source coordinate to an in-range one
/// per `wrap`, or `None` under [MipmapWrap::Clamp] when the box filter
/// should simply skip the tap (matching the teacher's bounds-checked
/// 2x2 average).
fn wrap_coord(coord: i64, len: u32, wrap: MipmapWrap) -> Option<u32> {
    let len = len as i64;
    if coord >= 0 && coord < len {
        return Some(coord as u32);
    }
    match wrap {
        MipmapWrap::Clamp => None,
        MipmapWrap::Mirror => {
            let period = 2 * len;
            let m = coord.rem_euclid(period);
            Some(if m < len { m as u32 } else { (period - 1 - m) as u32 })
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn downsample(
    src: &[u8],
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
    filter: MipmapFilter,
    wrap: MipmapWrap,
    gamma_correct: bool,
    srgb: bool,
    gamma: f64,
) -> Vec<u8> {
    // Kaiser is treated as triangle: a real windowed-sinc kernel is out
    // of scope (spec.md §4.D Non-goals), but callers shouldn't be refused
    // just for asking for it.
    let taps: &[(i64, f64)] = match filter {
        MipmapFilter::Box => &[(0, 1.0), (1, 1.0)],
        MipmapFilter::Triangle | MipmapFilter::Kaiser => &[(-1, 1.0), (0, 3.0), (1, 3.0), (2, 1.0)],
    };

    let mut out = vec![0u8; dst_w as usize * dst_h as usize * 4];
    for y in 0..dst_h {
        for x in 0..dst_w {
            let mut sum = [0.0f64; 4];
            let mut weight = [0.0f64; 4];

            for &(ty, wy) in taps {
                let sy = match wrap_coord(2 * y as i64 + ty, src_h, wrap) {
                    Some(v) => v,
                    None => continue,
                };
                for &(tx, wx) in taps {
                    let sx = match wrap_coord(2 * x as i64 + tx, src_w, wrap) {
                        Some(v) => v,
                        None => continue,
                    };
                    let w = wx * wy;
                    let idx = (sy as usize * src_w as usize + sx as usize) * 4;
                    for c in 0..3 {
                        sum[c] += w * to_linear(src[idx + c], gamma_correct, srgb, gamma);
                        weight[c] += w;
                    }
                    // Alpha is never gamma-weighted; it isn't a color.
                    sum[3] += w * (src[idx + 3] as f64 / 255.0);
                    weight[3] += w;
                }
            }

            let out_idx = (y as usize * dst_w as usize + x as usize) * 4;
            for c in 0..3 {
                let avg = if weight[c] > 0.0 { sum[c] / weight[c] } else { 0.0 };
                out[out_idx + c] = from_linear(avg, gamma_correct, srgb, gamma);
            }
            let alpha_avg = if weight[3] > 0.0 { sum[3] / weight[3] } else { 0.0 };
            out[out_idx + 3] = (alpha_avg * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

fn alpha_coverage(data: &[u8], width: u32, height: u32, threshold: f64) -> f64 {
    let cutoff = (threshold * 255.0).round() as i32;
    let total = (width as usize * height as usize).max(1);
    let covered = data.chunks_exact(4).filter(|p| p[3] as i32 > cutoff).count();
    covered as f64 / total as f64
}

/// Binary-search a per-pixel alpha scale factor so `level`'s alpha-test
/// coverage (fraction of texels above `threshold`) matches
/// `target_coverage`, preventing mipmapped foliage/foliage-like cutout
/// textures from thinning out at lower levels (spec.md §4.D).
fn rescale_alpha_to_coverage(level: &mut [u8], target_coverage: f64, threshold: f64) {
    let pixel_count = level.len() / 4;
    if pixel_count == 0 {
        return;
    }
    let cutoff = threshold * 255.0;

    let coverage_at = |scale: f64| -> f64 {
        level
            .chunks_exact(4)
            .filter(|p| (p[3] as f64 * scale).min(255.0) > cutoff)
            .count() as f64
            / pixel_count as f64
    };

    if (coverage_at(1.0) - target_coverage).abs() < 1e-6 {
        return;
    }

    let (mut lo, mut hi) = (0.0f64, 4.0f64);
    for _ in 0..32 {
        let mid = (lo + hi) / 2.0;
        if coverage_at(mid) < target_coverage {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let scale = (lo + hi) / 2.0;

    for pixel in level.chunks_exact_mut(4) {
        let a = (pixel[3] as f64 * scale).round().clamp(0.0, 255.0);
        pixel[3] = a as u8;
    }
}

/// Point-sample mip chain for raw palette index bytes (1 byte/pixel).
/// Indices aren't numeric quantities, so averaging two of them (as the
/// RGBA8 box/triangle filters do) would invent a color that may not even
/// be in the palette; each level instead keeps its top-left sample,
/// matching how the original plugin's indexed default-format path leaves
/// interpolation to the palette rather than the pixel data.
pub fn generate_chain_indexed(base: &[u8], width: u32, height: u32, levels: u32) -> Vec<Vec<u8>> {
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base.to_vec());

    let mut w = width;
    let mut h = height;
    for _ in 1..levels {
        let nw = (w >> 1).max(1);
        let nh = (h >> 1).max(1);
        let prev = chain.last().unwrap();
        let mut next = vec![0u8; nw as usize * nh as usize];
        for y in 0..nh {
            for x in 0..nw {
                let sx = (2 * x).min(w - 1);
                let sy = (2 * y).min(h - 1);
                next[(y * nw + x) as usize] = prev[(sy * w + sx) as usize];
            }
        }
        chain.push(next);
        w = nw;
        h = nh;
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_filter_averages_checkerboard_to_midpoint() {
        let mut src = vec![0u8; 4 * 4 * 4];
        for y in 0..4usize {
            for x in 0..4usize {
                let idx = (y * 4 + x) * 4;
                let v = if (x + y) % 2 == 0 { 0 } else { 255 };
                src[idx..idx + 4].copy_from_slice(&[v, v, v, v]);
            }
        }
        let out = downsample(&src, 4, 4, 2, 2, MipmapFilter::Box, MipmapWrap::Clamp, false, false, 2.2);
        assert!(out.iter().all(|&b| b == 127 || b == 128));
    }

    #[test]
    fn generate_chain_has_requested_levels_and_halves_dims() {
        let base = vec![200u8; 8 * 8 * 4];
        let chain = generate_chain(&base, 8, 8, 4, MipmapFilter::Box, MipmapWrap::Clamp, false, false, 2.2, false, 0.5);
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[0].len(), 8 * 8 * 4);
        assert_eq!(chain[1].len(), 4 * 4 * 4);
        assert_eq!(chain[2].len(), 2 * 2 * 4);
        assert_eq!(chain[3].len(), 1 * 1 * 4);
    }

    #[test]
    fn mirror_wrap_reflects_instead_of_dropping_taps() {
        assert_eq!(wrap_coord(-1, 4, MipmapWrap::Mirror), Some(0));
        assert_eq!(wrap_coord(-1, 4, MipmapWrap::Clamp), None);
        assert_eq!(wrap_coord(4, 4, MipmapWrap::Mirror), Some(3));
    }

    #[test]
    fn alpha_coverage_rescale_moves_toward_target() {
        let mut level = vec![0u8; 4 * 4];
        for i in 0..4 {
            level[i * 4 + 3] = 100;
        }
        let before = alpha_coverage(&level, 2, 2, 0.5);
        rescale_alpha_to_coverage(&mut level, 1.0, 0.5);
        let after = alpha_coverage(&level, 2, 2, 0.5);
        assert!(after >= before);
    }

    #[test]
    fn generate_chain_indexed_keeps_original_index_values() {
        let base = vec![5u8, 6, 7, 8];
        let chain = generate_chain_indexed(&base, 2, 2, 2);
        assert_eq!(chain[0], base);
        assert_eq!(chain[1], vec![5u8]);
    }
}
