//! Pixel packing (component A) and the two compression preconditioning
//! transforms, alpha-exponent and YCoCg (component B), from spec.md §4.A-B.
//!
//! Every packer consumes one RGBA8 source pixel and produces the bytes
//! for one destination pixel in [crate::types::PixelFormat]'s on-disk
//! layout, each following spec.md §4.A's literal per-format mask-and-shift
//! formula rather than a generic rounded-scale approximation (the two
//! don't agree on most non-boundary channel values).

use byteorder::{LittleEndian, WriteBytesExt};

use crate::types::PixelFormat;

/// Round `x` half away from zero, matching the original plugin's
/// `floorf(x + 0.5)` rounding (spec.md §4.B).
fn round_half_up(x: f32) -> i32 {
    (x + 0.5).floor() as i32
}

fn clamp_u8(x: i32) -> u8 {
    x.clamp(0, 255) as u8
}

/// Pack one RGBA8 pixel into `format`'s on-disk byte layout (spec.md §4.A).
/// `format` must not be [PixelFormat::Default], [PixelFormat::YCoCg], or
/// [PixelFormat::AExp] (those are handled by [pack_ycocg_pixel]/[to_ycocg]/
/// [alpha_exp], not by this direct packer).
pub fn pack_pixel(r: u8, g: u8, b: u8, a: u8, format: PixelFormat) -> Vec<u8> {
    match format {
        PixelFormat::RGB8 => vec![b, g, r],
        PixelFormat::RGBA8 => vec![b, g, r, a],
        PixelFormat::BGR8 => vec![r, g, b],
        PixelFormat::ABGR8 => vec![r, g, b, a],
        PixelFormat::A8 => vec![a],
        PixelFormat::L8 => vec![luminance(r, g, b)],
        PixelFormat::L8A8 => vec![luminance(r, g, b), a],
        PixelFormat::R3G3B2 => vec![pack_r3g3b2(r, g, b)],
        PixelFormat::R5G6B5 => {
            let mut out = Vec::with_capacity(2);
            out.write_u16::<LittleEndian>(pack_r5g6b5(r, g, b)).unwrap();
            out
        }
        PixelFormat::RGBA4 => {
            let mut out = Vec::with_capacity(2);
            out.write_u16::<LittleEndian>(pack_rgba4(r, g, b, a)).unwrap();
            out
        }
        PixelFormat::RGB5A1 => {
            let mut out = Vec::with_capacity(2);
            out.write_u16::<LittleEndian>(pack_rgb5a1(r, g, b, a)).unwrap();
            out
        }
        PixelFormat::RGB10A2 => {
            let mut out = Vec::with_capacity(4);
            out.write_u32::<LittleEndian>(pack_rgb10a2(r, g, b, a)).unwrap();
            out
        }
        PixelFormat::Default | PixelFormat::YCoCg | PixelFormat::AExp => {
            unreachable!("pack_pixel does not handle {format:?}; use pack_ycocg_pixel/alpha_exp instead")
        }
    }
}

/// `(r&0xF8)<<8 | (g&0xFC)<<3 | (b>>3)` (spec.md §4.A).
fn pack_r5g6b5(r: u8, g: u8, b: u8) -> u16 {
    (((r & 0xF8) as u16) << 8) | (((g & 0xFC) as u16) << 3) | ((b >> 3) as u16)
}

/// `(a&0xF0)<<8 | (r&0xF0)<<4 | (g&0xF0) | (b>>4)` (spec.md §4.A).
fn pack_rgba4(r: u8, g: u8, b: u8, a: u8) -> u16 {
    (((a & 0xF0) as u16) << 8) | (((r & 0xF0) as u16) << 4) | ((g & 0xF0) as u16) | ((b >> 4) as u16)
}

/// `(a&0x80)<<8 | (r&0xF8)<<7 | (g&0xF8)<<2 | (b>>3)` (spec.md §4.A).
fn pack_rgb5a1(r: u8, g: u8, b: u8, a: u8) -> u16 {
    (((a & 0x80) as u16) << 8) | (((r & 0xF8) as u16) << 7) | (((g & 0xF8) as u16) << 2) | ((b >> 3) as u16)
}

/// `(a&0xC0)<<24 | (b<<2)<<20 | (g<<2)<<10 | (r<<2)` (spec.md §4.A): a
/// literal 2-bit-shift approximation of 10-bit color, not a true rescale,
/// matching the original plugin's own shortcut.
fn pack_rgb10a2(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (((a & 0xC0) as u32) << 24) | (((b as u32) << 2) << 20) | (((g as u32) << 2) << 10) | ((r as u32) << 2)
}

/// `(r&0xE0) | ((g&0xE0)>>3) | (b>>6)` (spec.md §4.A).
fn pack_r3g3b2(r: u8, g: u8, b: u8) -> u8 {
    (r & 0xE0) | ((g & 0xE0) >> 3) | (b >> 6)
}

/// `rgb_to_luminance`: BT.601 luma, rounded to nearest (spec.md §4.A).
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    clamp_u8(round_half_up(y))
}

/// `alpha_exp` (spec.md §4.B): repack an RGBA8 pixel so the color
/// channels carry a direction (normalized RGB) and the alpha channel
/// carries a shared magnitude, improving BC3 precision on
/// high-dynamic-range-ish data. Output is in BGRA byte order to match
/// the rest of the packers.
///
/// When every channel is black (`m < 1e-4`), the direction is undefined;
/// the original color is passed through with alpha forced to 255.
pub fn alpha_exp(r: u8, g: u8, b: u8) -> [u8; 4] {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;
    let m = rf.max(gf).max(bf);

    if m < 1e-4 {
        return [b, g, r, 255];
    }

    let r2 = clamp_u8(round_half_up(255.0 * (rf / m)));
    let g2 = clamp_u8(round_half_up(255.0 * (gf / m)));
    let b2 = clamp_u8(round_half_up(255.0 * (bf / m)));
    let a2 = clamp_u8(round_half_up(255.0 * m));

    [b2, g2, r2, a2]
}

/// The reversible YCoCg transform core shared by [to_ycocg] and
/// [pack_ycocg_pixel]: returns `(y, co, cg)` as signed deltas around 128,
/// still needing the offset-and-clamp each caller applies to its own
/// layout.
fn ycocg_components(r: u8, g: u8, b: u8) -> (i32, i32, i32) {
    let r = r as i32;
    let g = g as i32;
    let b = b as i32;

    let co = r - b;
    let t = b + (co >> 1);
    let cg = g - t;
    let y = t + (cg >> 1);
    (y, co, cg)
}

/// `RGB_to_YCoCg`: the reversible YCoCg-DXT5 *compression preconditioning*
/// transform (spec.md §4.B, used ahead of BC3 for [Compression::YCoCg]/
/// [Compression::YCoCgS] — see [crate::types::Compression]). Luma is
/// stored in the alpha channel (BC3's independently compressed alpha
/// block keeps it precise), chroma is stored in the red/green channels,
/// and the blue channel is unused. `scaled` widens Co/Cg into the blue
/// channel's headroom (the YCoCgS variant) for extra chroma precision.
///
/// This layout has no real alpha channel of its own — byte 0 is a fixed
/// marker (`0`/`2`), not the pixel's alpha. For the *uncompressed*
/// [crate::types::PixelFormat::YCoCg] on-disk layout, which does carry
/// the real alpha, use [pack_ycocg_pixel] instead.
pub fn to_ycocg(r: u8, g: u8, b: u8, scaled: bool) -> [u8; 4] {
    let (y, co, cg) = ycocg_components(r, g, b);

    if scaled {
        let co = (co / 2 + 128).clamp(0, 255) as u8;
        let cg = (cg / 2 + 128).clamp(0, 255) as u8;
        [2, cg, co, y.clamp(0, 255) as u8]
    } else {
        let co = (co + 128).clamp(0, 255) as u8;
        let cg = (cg + 128).clamp(0, 255) as u8;
        [0, cg, co, y.clamp(0, 255) as u8]
    }
}

/// [crate::types::PixelFormat::YCoCg]'s uncompressed on-disk layout:
/// `[a, Y, Co, Cg]` (spec.md §4.A) — `a` is the pixel's real alpha, not
/// the fixed marker byte [to_ycocg]'s compression-preconditioning layout
/// uses in its place.
pub fn pack_ycocg_pixel(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let (y, co, cg) = ycocg_components(r, g, b);
    let co = (co + 128).clamp(0, 255) as u8;
    let cg = (cg + 128).clamp(0, 255) as u8;
    [a, y.clamp(0, 255) as u8, co, cg]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_r5g6b5_round_trips_pure_channels() {
        assert_eq!(pack_r5g6b5(255, 0, 0), 0xf800);
    }

    #[test]
    fn pack_r5g6b5_truncates_low_bits_rather_than_rounding() {
        // 7 & 0xF8 == 0: truncation, not round-to-nearest (which would
        // give 1).
        assert_eq!(pack_r5g6b5(7, 0, 0), 0);
    }

    #[test]
    fn pack_rgb10a2_truncates_two_bit_alpha() {
        // 48 & 0xC0 == 0: truncation, not round-to-nearest.
        let packed = pack_rgb10a2(0, 0, 0, 48);
        assert_eq!(packed >> 30, 0);
    }

    #[test]
    fn pack_ycocg_pixel_keeps_real_alpha_and_spec_byte_order() {
        let [a, y, co, cg] = pack_ycocg_pixel(128, 128, 128, 77);
        assert_eq!(a, 77);
        assert_eq!(y, 128);
        assert_eq!(co, 128);
        assert_eq!(cg, 128);
    }

    #[test]
    fn luminance_of_white_is_255() {
        assert_eq!(luminance(255, 255, 255), 255);
    }

    #[test]
    fn alpha_exp_black_passes_through_with_opaque_alpha() {
        assert_eq!(alpha_exp(0, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn alpha_exp_scales_to_max_channel() {
        let [b, g, r, a] = alpha_exp(128, 64, 0);
        assert_eq!(r, 255);
        assert_eq!(b, 0);
        assert!(g > 0 && g < 255);
        assert!(a > 0 && a < 255);
    }

    #[test]
    fn to_ycocg_gray_has_zero_chroma_offset() {
        let [_, cg, co, y] = to_ycocg(128, 128, 128, false);
        assert_eq!(co, 128);
        assert_eq!(cg, 128);
        assert_eq!(y, 128);
    }
}
