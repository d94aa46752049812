//! DDS header construction (component H, spec.md §4.H). Written as raw
//! little-endian byte buffers via `byteorder` rather than through a
//! high-level DDS crate, since the GIMP writer-signature bytes and
//! semantic FourCC tag this format needs live in the header's reserved
//! fields, which a typical ergonomic DDS header API doesn't expose.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use crate::image::BaseType;
use crate::types::{Compression, PixelFormat};

const HEADER_SIZE: usize = 128;
const HEADER_SIZE_DX10: usize = 20;
const PLUGIN_VERSION: u32 = 0x00010000; // writer-signature only, not a format version

const DDSD_CAPS: u32 = 0x1;
const DDSD_HEIGHT: u32 = 0x2;
const DDSD_WIDTH: u32 = 0x4;
const DDSD_PITCH: u32 = 0x8;
const DDSD_PIXELFORMAT: u32 = 0x1000;
const DDSD_MIPMAPCOUNT: u32 = 0x2_0000;
const DDSD_LINEARSIZE: u32 = 0x8_0000;
const DDSD_DEPTH: u32 = 0x80_0000;

const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_ALPHA: u32 = 0x2;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_PALETTEINDEXED8: u32 = 0x20;
const DDPF_RGB: u32 = 0x40;
const DDPF_LUMINANCE: u32 = 0x2_0000;
const DDPF_NORMAL: u32 = 0x8000_0000;

const DDSCAPS_COMPLEX: u32 = 0x8;
const DDSCAPS_TEXTURE: u32 = 0x1000;
const DDSCAPS_MIPMAP: u32 = 0x40_0000;

const DDSCAPS2_CUBEMAP: u32 = 0x200;
const DDSCAPS2_CUBEMAP_ALL_FACES: u32 = 0x400 | 0x800 | 0x1000 | 0x2000 | 0x4000 | 0x8000;
const DDSCAPS2_VOLUME: u32 = 0x20_0000;

const D3D10_RESOURCE_DIMENSION_TEXTURE2D: u32 = 3;

/// Topology parameters that change the header's caps bits/DX10 presence
/// (spec.md §4.F/§4.H); carries whatever extra data that topology needs.
#[derive(Debug, Clone, Copy)]
pub enum HeaderTopology {
    Flat,
    Cubemap,
    Volume { depth: u32 },
    Array { layer_count: u32 },
}

#[derive(Debug, Clone, Copy)]
pub struct HeaderParams {
    pub width: u32,
    pub height: u32,
    pub mipmap_count: u32,
    pub topology: HeaderTopology,
    pub compression: Compression,
    pub pixel_format: PixelFormat,
    pub base_type: BaseType,
    /// Source bytes-per-pixel, used only when `pixel_format` is
    /// [PixelFormat::Default] to pick the uncompressed mask/flag set.
    pub source_bpp: usize,
}

/// bpp/has_alpha/masks for [PixelFormat::Default], derived from the
/// source pixel's own byte width (spec.md §4.H: "bpp == 1/2/3/4" chain).
/// Indexed images at 1 or 2 bpp get a palette entry instead of masks.
struct DefaultFormat {
    fmt_bpp: u32,
    has_alpha: bool,
    rmask: u32,
    gmask: u32,
    bmask: u32,
    amask: u32,
    indexed: bool,
}

fn default_format(source_bpp: usize, base_type: BaseType) -> DefaultFormat {
    match source_bpp {
        1 if base_type == BaseType::Indexed => DefaultFormat {
            fmt_bpp: 1,
            has_alpha: false,
            rmask: 0,
            gmask: 0,
            bmask: 0,
            amask: 0,
            indexed: true,
        },
        1 => DefaultFormat {
            fmt_bpp: 1,
            has_alpha: false,
            rmask: 0x0000_00ff,
            gmask: 0,
            bmask: 0,
            amask: 0,
            indexed: false,
        },
        2 if base_type == BaseType::Indexed => DefaultFormat {
            fmt_bpp: 1,
            has_alpha: false,
            rmask: 0,
            gmask: 0,
            bmask: 0,
            amask: 0,
            indexed: true,
        },
        2 => DefaultFormat {
            fmt_bpp: 2,
            has_alpha: true,
            rmask: 0x0000_00ff,
            gmask: 0x0000_00ff,
            bmask: 0x0000_00ff,
            amask: 0x0000_ff00,
            indexed: false,
        },
        3 => DefaultFormat {
            fmt_bpp: 3,
            has_alpha: false,
            rmask: 0x00ff_0000,
            gmask: 0x0000_ff00,
            bmask: 0x0000_00ff,
            amask: 0,
            indexed: false,
        },
        _ => DefaultFormat {
            fmt_bpp: 4,
            has_alpha: true,
            rmask: 0x00ff_0000,
            gmask: 0x0000_ff00,
            bmask: 0x0000_00ff,
            amask: 0xff00_0000,
            indexed: false,
        },
    }
}

/// Build the 128-byte DDS header, plus the 20-byte DX10 extension header
/// when the topology is an array (spec.md §4.H: "DX10 only for Array").
pub fn build_header(params: &HeaderParams) -> Vec<u8> {
    let mut hdr = vec![0u8; HEADER_SIZE];

    hdr[0..4].copy_from_slice(b"DDS ");
    (&mut hdr[4..8]).write_u32::<LittleEndian>(124).unwrap();
    (&mut hdr[12..16]).write_u32::<LittleEndian>(params.height).unwrap();
    (&mut hdr[16..20]).write_u32::<LittleEndian>(params.width).unwrap();
    (&mut hdr[76..80]).write_u32::<LittleEndian>(32).unwrap();

    hdr[32..36].copy_from_slice(b"GIMP");
    hdr[36..40].copy_from_slice(b"-DDS");
    (&mut hdr[40..44]).write_u32::<LittleEndian>(PLUGIN_VERSION).unwrap();

    let mut flags = DDSD_CAPS | DDSD_PIXELFORMAT | DDSD_WIDTH | DDSD_HEIGHT;
    let mut caps = DDSCAPS_TEXTURE;
    let mut caps2 = 0u32;

    if params.mipmap_count > 1 {
        flags |= DDSD_MIPMAPCOUNT;
        caps |= DDSCAPS_COMPLEX | DDSCAPS_MIPMAP;
    }

    match params.topology {
        HeaderTopology::Cubemap => {
            caps |= DDSCAPS_COMPLEX;
            caps2 |= DDSCAPS2_CUBEMAP | DDSCAPS2_CUBEMAP_ALL_FACES;
        }
        HeaderTopology::Volume { depth } => {
            (&mut hdr[24..28]).write_u32::<LittleEndian>(depth).unwrap();
            flags |= DDSD_DEPTH;
            caps |= DDSCAPS_COMPLEX;
            caps2 |= DDSCAPS2_VOLUME;
        }
        HeaderTopology::Flat | HeaderTopology::Array { .. } => {}
    }

    (&mut hdr[28..32]).write_u32::<LittleEndian>(params.mipmap_count.max(1)).unwrap();
    (&mut hdr[108..112]).write_u32::<LittleEndian>(caps).unwrap();
    (&mut hdr[112..116]).write_u32::<LittleEndian>(caps2).unwrap();

    let mut pflags;
    if params.compression == Compression::None {
        flags |= DDSD_PITCH;

        let pixel_format = params.pixel_format;
        let (fmt_bpp, rmask, gmask, bmask, amask) = if pixel_format.is_default() {
            let info = default_format(params.source_bpp, params.base_type);
            pflags = if info.indexed {
                DDPF_PALETTEINDEXED8
            } else if params.source_bpp == 1 || params.source_bpp == 2 {
                DDPF_LUMINANCE
            } else {
                DDPF_RGB
            };
            if info.has_alpha {
                pflags |= DDPF_ALPHAPIXELS;
            }
            (info.fmt_bpp, info.rmask, info.gmask, info.bmask, info.amask)
        } else {
            let info = pixel_format.info().unwrap();
            pflags = match pixel_format {
                PixelFormat::A8 => DDPF_ALPHA,
                PixelFormat::L8 | PixelFormat::L8A8 => DDPF_LUMINANCE,
                _ => DDPF_RGB,
            };
            if info.has_alpha {
                pflags |= DDPF_ALPHAPIXELS;
            }
            (info.bpp as u32, info.rmask, info.gmask, info.bmask, info.amask)
        };

        (&mut hdr[92..96]).write_u32::<LittleEndian>(rmask).unwrap();
        (&mut hdr[96..100]).write_u32::<LittleEndian>(gmask).unwrap();
        (&mut hdr[100..104]).write_u32::<LittleEndian>(bmask).unwrap();
        (&mut hdr[104..108]).write_u32::<LittleEndian>(amask).unwrap();

        (&mut hdr[8..12]).write_u32::<LittleEndian>(flags).unwrap();
        (&mut hdr[20..24]).write_u32::<LittleEndian>(params.width * fmt_bpp).unwrap();
        (&mut hdr[80..84]).write_u32::<LittleEndian>(pflags).unwrap();
        (&mut hdr[88..92]).write_u32::<LittleEndian>(fmt_bpp * 8).unwrap();

        let semantic_tag = match params.pixel_format {
            PixelFormat::AExp => Some(*b"AEXP"),
            PixelFormat::YCoCg => Some(*b"YCG1"),
            _ => None,
        };
        if let Some(tag) = semantic_tag {
            hdr[44..48].copy_from_slice(&tag);
        }
    } else {
        flags |= DDSD_LINEARSIZE;
        pflags = DDPF_FOURCC;

        let fourcc = params.compression.fourcc().expect("compressed formats always have a FourCC");
        if params.compression.sets_normal_flag() {
            pflags |= DDPF_NORMAL;
        }

        (&mut hdr[8..12]).write_u32::<LittleEndian>(flags).unwrap();
        hdr[84..88].copy_from_slice(fourcc);

        let blocks_wide = (params.width + 3) / 4;
        let blocks_high = (params.height + 3) / 4;
        let linear_size = blocks_wide * blocks_high * params.compression.block_size_in_bytes() as u32;
        (&mut hdr[20..24]).write_u32::<LittleEndian>(linear_size).unwrap();

        if let Some(tag) = params.compression.semantic_tag() {
            hdr[44..48].copy_from_slice(tag);
        }

        (&mut hdr[80..84]).write_u32::<LittleEndian>(pflags).unwrap();
    }

    let is_dx10 = matches!(params.topology, HeaderTopology::Array { .. });
    if is_dx10 {
        let array_size = match params.topology {
            HeaderTopology::Array { layer_count } => layer_count,
            _ => 1,
        };

        let dxgi_format = dxgi_format_for(params);

        let mut hdr10 = vec![0u8; HEADER_SIZE_DX10];
        (&mut hdr10[0..4]).write_u32::<LittleEndian>(dxgi_format).unwrap();
        (&mut hdr10[4..8]).write_u32::<LittleEndian>(D3D10_RESOURCE_DIMENSION_TEXTURE2D).unwrap();
        (&mut hdr10[8..12]).write_u32::<LittleEndian>(0).unwrap();
        (&mut hdr10[12..16]).write_u32::<LittleEndian>(array_size).unwrap();
        (&mut hdr10[16..20]).write_u32::<LittleEndian>(0).unwrap();

        let existing_pflags = u32::from_le_bytes(hdr[80..84].try_into().unwrap());
        (&mut hdr[80..84]).write_u32::<LittleEndian>(existing_pflags | DDPF_FOURCC).unwrap();
        hdr[84..88].copy_from_slice(b"DX10");

        hdr.extend_from_slice(&hdr10);
    }

    hdr
}

fn dxgi_format_for(params: &HeaderParams) -> u32 {
    const BC1_UNORM: u32 = 71;
    const BC2_UNORM: u32 = 74;
    const BC3_UNORM: u32 = 77;
    const BC4_UNORM: u32 = 80;
    const BC5_UNORM: u32 = 83;
    const R8_UNORM: u32 = 61;
    const B8G8R8A8_UNORM: u32 = 87;
    const UNKNOWN: u32 = 0;

    if params.compression != Compression::None {
        return match params.compression {
            Compression::BC1 => BC1_UNORM,
            Compression::BC2 => BC2_UNORM,
            Compression::BC3 | Compression::BC3n | Compression::RXGB | Compression::YCoCg | Compression::YCoCgS | Compression::AExp => BC3_UNORM,
            Compression::BC4 => BC4_UNORM,
            Compression::BC5 => BC5_UNORM,
            Compression::None => unreachable!(),
        };
    }

    if params.pixel_format.is_default() {
        // Mirrors the original plugin's bpp==1/bpp==4 Default cases
        // (ddswrite.c): only those two resolve to a concrete DXGI code,
        // bpp==2/3 and indexed stay UNKNOWN.
        let info = default_format(params.source_bpp, params.base_type);
        return match (info.fmt_bpp, info.indexed) {
            (1, false) => R8_UNORM,
            (4, false) => B8G8R8A8_UNORM,
            _ => UNKNOWN,
        };
    }

    params.pixel_format.dxgi_format().unwrap_or(UNKNOWN)
}

/// Write `header` and then `body` to `sink`, per spec.md §4.H/§4.I
/// ("header, optional DX10 header, then the pixel/block data in order").
pub fn write_dds_stream(sink: &mut dyn Write, header: &[u8], body: &[u8]) -> io::Result<()> {
    sink.write_all(header)?;
    sink.write_all(body)?;
    Ok(())
}
