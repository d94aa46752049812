//! The data model shared by every component: the enums spec.md §3 names,
//! plus the small value types (an RGB palette entry) that don't deserve
//! their own module.

#[cfg_attr(feature = "strum", derive(strum::EnumString, strum::Display, strum::EnumIter))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PixelType {
    Rgb,
    Rgba,
    Gray,
    GrayA,
    Indexed,
    IndexedA,
}

impl PixelType {
    /// Bytes per pixel in the canonical fetch order (§4.G stage 1).
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelType::Gray | PixelType::Indexed => 1,
            PixelType::GrayA | PixelType::IndexedA => 2,
            PixelType::Rgb => 3,
            PixelType::Rgba => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, PixelType::Rgba | PixelType::GrayA | PixelType::IndexedA)
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, PixelType::Indexed | PixelType::IndexedA)
    }
}

#[cfg_attr(feature = "strum", derive(strum::EnumString, strum::Display, strum::EnumIter))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SaveType {
    SelectedLayer,
    VisibleLayers,
    Cubemap,
    Volumemap,
    Array,
}

#[cfg_attr(feature = "strum", derive(strum::EnumString, strum::Display, strum::EnumIter))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MipmapMode {
    None,
    Generate,
    Existing,
}

#[cfg_attr(feature = "strum", derive(strum::EnumString, strum::Display, strum::EnumIter))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Compression {
    None,
    BC1,
    BC2,
    BC3,
    BC3n,
    RXGB,
    BC4,
    BC5,
    YCoCg,
    YCoCgS,
    AExp,
}

impl Compression {
    /// Block size in bytes for one 4x4 block, per spec.md §4.C.
    pub fn block_size_in_bytes(&self) -> usize {
        match self {
            Compression::None => 0,
            Compression::BC1 | Compression::BC4 => 8,
            Compression::BC2
            | Compression::BC3
            | Compression::BC3n
            | Compression::RXGB
            | Compression::BC5
            | Compression::YCoCg
            | Compression::YCoCgS
            | Compression::AExp => 16,
        }
    }

    /// The on-disk FourCC per spec.md §4.H. `YCoCg`/`YCoCgS`/`AExp`/`BC3`/`BC3n`
    /// all physically write DXT5 (BC3) blocks; the semantic tag that
    /// distinguishes them lives at header offset 44, not in this FourCC.
    pub fn fourcc(&self) -> Option<&'static [u8; 4]> {
        match self {
            Compression::None => None,
            Compression::BC1 => Some(b"DXT1"),
            Compression::BC2 => Some(b"DXT3"),
            Compression::BC3 | Compression::BC3n | Compression::YCoCg | Compression::YCoCgS | Compression::AExp => {
                Some(b"DXT5")
            }
            Compression::RXGB => Some(b"RXGB"),
            Compression::BC4 => Some(b"ATI1"),
            Compression::BC5 => Some(b"ATI2"),
        }
    }

    /// The semantic FourCC tag written at header offset 44 (§4.H, §6),
    /// recoverable by the companion reader. `None` for formats that don't
    /// need to disambiguate themselves beyond the disk FourCC.
    pub fn semantic_tag(&self) -> Option<&'static [u8; 4]> {
        match self {
            Compression::AExp => Some(b"AEXP"),
            Compression::YCoCg => Some(b"YCG1"),
            Compression::YCoCgS => Some(b"YCG2"),
            _ => None,
        }
    }

    pub fn sets_normal_flag(&self) -> bool {
        matches!(self, Compression::BC3n | Compression::RXGB)
    }

    /// The real block format the external compressor kernel is invoked
    /// with. BC3n/RXGB/YCoCg/YCoCgS/AExp are all BC3 on disk (§6).
    pub fn physical_block_format(&self) -> PhysicalBlockFormat {
        match self {
            Compression::None => PhysicalBlockFormat::None,
            Compression::BC1 => PhysicalBlockFormat::Bc1,
            Compression::BC2 => PhysicalBlockFormat::Bc2,
            Compression::BC3
            | Compression::BC3n
            | Compression::RXGB
            | Compression::YCoCg
            | Compression::YCoCgS
            | Compression::AExp => PhysicalBlockFormat::Bc3,
            Compression::BC4 => PhysicalBlockFormat::Bc4,
            Compression::BC5 => PhysicalBlockFormat::Bc5,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PhysicalBlockFormat {
    None,
    Bc1,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
}

#[cfg_attr(feature = "strum", derive(strum::EnumString, strum::Display, strum::EnumIter))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PixelFormat {
    Default,
    RGB8,
    RGBA8,
    BGR8,
    ABGR8,
    R5G6B5,
    RGBA4,
    RGB5A1,
    RGB10A2,
    R3G3B2,
    A8,
    L8,
    L8A8,
    YCoCg,
    AExp,
}

/// Masks and bit depth for the fixed-layout non-default [PixelFormat]s,
/// per spec.md §4.A's encoding table.
pub struct PixelFormatInfo {
    pub bpp: usize,
    pub has_alpha: bool,
    pub rmask: u32,
    pub gmask: u32,
    pub bmask: u32,
    pub amask: u32,
}

impl PixelFormat {
    pub fn is_default(&self) -> bool {
        matches!(self, PixelFormat::Default)
    }

    pub fn info(&self) -> Option<PixelFormatInfo> {
        use PixelFormat::*;
        Some(match self {
            Default => return None,
            RGB8 => PixelFormatInfo {
                bpp: 3,
                has_alpha: false,
                rmask: 0x00ff0000,
                gmask: 0x0000ff00,
                bmask: 0x000000ff,
                amask: 0x00000000,
            },
            RGBA8 => PixelFormatInfo {
                bpp: 4,
                has_alpha: true,
                rmask: 0x00ff0000,
                gmask: 0x0000ff00,
                bmask: 0x000000ff,
                amask: 0xff000000,
            },
            BGR8 => PixelFormatInfo {
                bpp: 3,
                has_alpha: false,
                rmask: 0x000000ff,
                gmask: 0x0000ff00,
                bmask: 0x00ff0000,
                amask: 0x00000000,
            },
            ABGR8 => PixelFormatInfo {
                bpp: 4,
                has_alpha: true,
                rmask: 0x000000ff,
                gmask: 0x0000ff00,
                bmask: 0x00ff0000,
                amask: 0xff000000,
            },
            R5G6B5 => PixelFormatInfo {
                bpp: 2,
                has_alpha: false,
                rmask: 0x0000f800,
                gmask: 0x000007e0,
                bmask: 0x0000001f,
                amask: 0x00000000,
            },
            RGBA4 => PixelFormatInfo {
                bpp: 2,
                has_alpha: true,
                rmask: 0x00000f00,
                gmask: 0x000000f0,
                bmask: 0x0000000f,
                amask: 0x0000f000,
            },
            RGB5A1 => PixelFormatInfo {
                bpp: 2,
                has_alpha: true,
                rmask: 0x00007c00,
                gmask: 0x000003e0,
                bmask: 0x0000001f,
                amask: 0x00008000,
            },
            RGB10A2 => PixelFormatInfo {
                bpp: 4,
                has_alpha: true,
                rmask: 0x000003ff,
                gmask: 0x000ffc00,
                bmask: 0x3ff00000,
                amask: 0xc0000000,
            },
            R3G3B2 => PixelFormatInfo {
                bpp: 1,
                has_alpha: false,
                rmask: 0x000000e0,
                gmask: 0x0000001c,
                bmask: 0x00000003,
                amask: 0x00000000,
            },
            A8 => PixelFormatInfo {
                bpp: 1,
                has_alpha: true,
                rmask: 0x00000000,
                gmask: 0x00000000,
                bmask: 0x00000000,
                amask: 0x000000ff,
            },
            L8 => PixelFormatInfo {
                bpp: 1,
                has_alpha: false,
                rmask: 0x000000ff,
                gmask: 0x000000ff,
                bmask: 0x000000ff,
                amask: 0x00000000,
            },
            L8A8 => PixelFormatInfo {
                bpp: 2,
                has_alpha: true,
                rmask: 0x000000ff,
                gmask: 0x000000ff,
                bmask: 0x000000ff,
                amask: 0x0000ff00,
            },
            YCoCg => PixelFormatInfo {
                bpp: 4,
                has_alpha: true,
                rmask: 0x00ff0000,
                gmask: 0x0000ff00,
                bmask: 0x000000ff,
                amask: 0xff000000,
            },
            AExp => PixelFormatInfo {
                bpp: 4,
                has_alpha: true,
                rmask: 0x00ff0000,
                gmask: 0x0000ff00,
                bmask: 0x000000ff,
                amask: 0xff000000,
            },
        })
    }

    /// The DXGI format code for this pixel format, where one exists
    /// (spec.md §3). `None` means "unknown"/no DXGI equivalent.
    pub fn dxgi_format(&self) -> Option<u32> {
        // DXGI_FORMAT values from the DirectX header; only the ones this
        // crate can actually emit are listed.
        const B8G8R8A8_UNORM: u32 = 87;
        const R8G8B8A8_UNORM: u32 = 28;
        const B5G6R5_UNORM: u32 = 85;
        const B4G4R4A4_UNORM: u32 = 115;
        const B5G5R5A1_UNORM: u32 = 86;
        const R10G10B10A2_UNORM: u32 = 24;
        const A8_UNORM: u32 = 65;
        const R8_UNORM: u32 = 61;

        match self {
            PixelFormat::RGBA8 | PixelFormat::YCoCg | PixelFormat::AExp => Some(B8G8R8A8_UNORM),
            PixelFormat::ABGR8 => Some(R8G8B8A8_UNORM),
            PixelFormat::R5G6B5 => Some(B5G6R5_UNORM),
            PixelFormat::RGBA4 => Some(B4G4R4A4_UNORM),
            PixelFormat::RGB5A1 => Some(B5G5R5A1_UNORM),
            PixelFormat::RGB10A2 => Some(R10G10B10A2_UNORM),
            PixelFormat::A8 => Some(A8_UNORM),
            PixelFormat::L8 => Some(R8_UNORM),
            PixelFormat::Default | PixelFormat::RGB8 | PixelFormat::BGR8 | PixelFormat::R3G3B2 | PixelFormat::L8A8 => {
                None
            }
        }
    }
}

#[cfg_attr(feature = "strum", derive(strum::EnumString, strum::Display, strum::EnumIter))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MipmapFilter {
    Box,
    Triangle,
    Kaiser,
}

#[cfg_attr(feature = "strum", derive(strum::EnumString, strum::Display, strum::EnumIter))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MipmapWrap {
    Clamp,
    Mirror,
}

/// A single palette entry for [crate::types::PixelType::Indexed] layers.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
