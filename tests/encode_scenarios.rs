//! Black-box scenarios from spec.md §8, driven entirely through
//! [dds_encode::write_dds] and [dds_encode::MemoryImage] like a real
//! caller would use them.

use std::io::Cursor;

use dds_encode::{
    BaseType, Compression, EncodeConfig, MemoryImage, MemoryLayer, MipmapMode, PixelFormat, PixelType, RgbColor, SaveType,
};

fn encode(image: &MemoryImage, selected_layer: usize, config: &EncodeConfig) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    dds_encode::write_dds(&mut out, image, selected_layer, false, config, false, &mut ()).unwrap();
    out.into_inner()
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

/// Scenario 1: a single 4x4 RGBA8 layer, uncompressed, default pixel
/// format — header flags/pitch/masks and the BGRA-swapped pixel bytes.
#[test]
fn scenario_1_flat_rgba8_uncompressed() {
    let pixels: Vec<u8> = (0..16).flat_map(|i| [i * 10, i * 10 + 1, i * 10 + 2, 255]).collect();
    let image = MemoryImage::new(4, 4, BaseType::Rgb).with_layer(MemoryLayer::new("base", 4, 4, PixelType::Rgba, pixels));
    let config = EncodeConfig::default();

    let bytes = encode(&image, 0, &config);

    assert_eq!(&bytes[0..4], b"DDS ");
    assert_eq!(u32_at(&bytes, 4), 124);
    assert_eq!(u32_at(&bytes, 16), 4); // width
    assert_eq!(u32_at(&bytes, 12), 4); // height
    assert_eq!(u32_at(&bytes, 20), 16); // pitch = width * 4 bytes/pixel
    assert_eq!(u32_at(&bytes, 92), 0x00ff_0000); // rmask
    assert_eq!(u32_at(&bytes, 100), 0x0000_00ff); // bmask
    assert_eq!(u32_at(&bytes, 104), 0xff00_0000); // amask

    let body = &bytes[128..];
    assert_eq!(body.len(), 4 * 4 * 4);
    // First source pixel (0, 1, 2, 255) is written blue, green, red, alpha.
    assert_eq!(&body[0..4], &[2, 1, 0, 255]);
}

/// Scenario 2: an 8x8 RGB8 layer, BC1 compressed, generated mipmaps down
/// to 1x1 (4 levels) — linear size and total compressed payload.
#[test]
fn scenario_2_bc1_generated_mipmaps() {
    let pixels = vec![128u8; 8 * 8 * 3];
    let image = MemoryImage::new(8, 8, BaseType::Rgb).with_layer(MemoryLayer::new("base", 8, 8, PixelType::Rgb, pixels));
    let config = EncodeConfig {
        compression: Compression::BC1,
        mipmap_mode: MipmapMode::Generate,
        ..EncodeConfig::default()
    };

    let bytes = encode(&image, 0, &config);

    assert_eq!(u32_at(&bytes, 28), 4); // mipmap count
    let linear_size = u32_at(&bytes, 20);
    assert_eq!(linear_size, 2 * 2 * 8); // 8x8 rounds to 2x2 blocks, 8 bytes/block

    let body = &bytes[128..];
    // 8x8 is 2x2 blocks (32 bytes); 4x4, 2x2, 1x1 each round up to one
    // 4x4 BC1 block (8 bytes).
    assert_eq!(body.len(), 32 + 8 + 8 + 8);
}

/// Scenario 3: a 16x16 RGBA cubemap built from named layers in scrambled
/// order — the payload is concatenated in canonical face order (+X, -X,
/// +Y, -Y, +Z, -Z), independent of the input layer order.
#[test]
fn scenario_3_cubemap_face_order_independent_of_layer_order() {
    let face = |name: &str, fill: u8| MemoryLayer::new(name, 16, 16, PixelType::Rgba, vec![fill; 16 * 16 * 4]);
    let image = MemoryImage::new(16, 16, BaseType::Rgb)
        .with_layer(face("negative z", 6))
        .with_layer(face("positive y", 3))
        .with_layer(face("positive x", 1))
        .with_layer(face("negative x", 2))
        .with_layer(face("negative y", 4))
        .with_layer(face("positive z", 5));
    let config = EncodeConfig {
        save_type: SaveType::Cubemap,
        pixel_format: PixelFormat::RGBA8,
        ..EncodeConfig::default()
    };

    let bytes = encode(&image, 0, &config);

    let caps2 = u32_at(&bytes, 112);
    assert_eq!(caps2 & 0x200, 0x200); // DDSCAPS2_CUBEMAP
    assert_eq!(caps2 & 0xfc00, 0xfc00); // all 6 face bits set

    let body = &bytes[128..];
    let face_size = 16 * 16 * 4;
    assert_eq!(body.len(), face_size * 6);
    // Faces are written +X, -X, +Y, -Y, +Z, -Z regardless of input order.
    let fill_of = |i: usize| body[i * face_size];
    assert_eq!(fill_of(0), 1);
    assert_eq!(fill_of(1), 2);
    assert_eq!(fill_of(2), 3);
    assert_eq!(fill_of(3), 4);
    assert_eq!(fill_of(4), 5);
    assert_eq!(fill_of(5), 6);
}

/// Scenario 4: a 4x4x4 RGBA volume with generated mipmaps — depth and
/// caps2 in the header, and a payload sized for the base slices plus the
/// volume-wide mip levels.
#[test]
fn scenario_4_volume_with_generated_mipmaps() {
    let slice = |fill: u8| MemoryLayer::new("slice", 4, 4, PixelType::Rgba, vec![fill; 4 * 4 * 4]);
    let image = MemoryImage::new(4, 4, BaseType::Rgb)
        .with_layer(slice(10))
        .with_layer(slice(20))
        .with_layer(slice(30))
        .with_layer(slice(40));
    let config = EncodeConfig {
        save_type: SaveType::Volumemap,
        pixel_format: PixelFormat::RGBA8,
        mipmap_mode: MipmapMode::Generate,
        ..EncodeConfig::default()
    };

    let bytes = encode(&image, 0, &config);

    assert_eq!(u32_at(&bytes, 24), 4); // depth
    let caps2 = u32_at(&bytes, 112);
    assert_eq!(caps2 & 0x20_0000, 0x20_0000); // DDSCAPS2_VOLUME
    assert_eq!(u32_at(&bytes, 28), 3); // mip_levels(4, 4) == 3

    let body = &bytes[128..];
    // Base: 4 slices at 4x4x4 bytes/pixel. Mip 1: 2 slices (depth halved)
    // at 2x2x4 bytes/pixel. Mip 2: 1 slice at 1x1x4 bytes/pixel.
    let base = 4 * 4 * 4 * 4;
    let mip1 = 2 * 2 * 2 * 4;
    let mip2 = 1 * 1 * 1 * 4;
    assert_eq!(body.len(), base + mip1 + mip2);
}

/// Scenario 5: an array of two 4x4 RGBA8 layers — a DX10 header with the
/// matching array size and dxgi_format.
#[test]
fn scenario_5_array_emits_dx10_header_with_array_size() {
    let layer = |fill: u8| MemoryLayer::new("layer", 4, 4, PixelType::Rgba, vec![fill; 4 * 4 * 4]);
    let image = MemoryImage::new(4, 4, BaseType::Rgb).with_layer(layer(1)).with_layer(layer(2));
    let config = EncodeConfig {
        save_type: SaveType::Array,
        pixel_format: PixelFormat::RGBA8,
        ..EncodeConfig::default()
    };

    let bytes = encode(&image, 0, &config);

    assert_eq!(&bytes[84..88], b"DX10");
    let array_size = u32_at(&bytes, 128 + 12);
    assert_eq!(array_size, 2);
    let dxgi_format = u32_at(&bytes, 128);
    assert_ne!(dxgi_format, 0);

    let body = &bytes[148..];
    assert_eq!(body.len(), 2 * 4 * 4 * 4);
}

/// Scenario 5b: an array of two layers left at the *default* pixel
/// format (no explicit [PixelFormat] chosen) still resolves a concrete
/// dxgi_format in the DX10 header rather than leaving it UNKNOWN.
#[test]
fn scenario_5b_array_with_default_pixel_format_resolves_dxgi_format() {
    let layer = |fill: u8| MemoryLayer::new("layer", 4, 4, PixelType::Rgba, vec![fill; 4 * 4 * 4]);
    let image = MemoryImage::new(4, 4, BaseType::Rgb).with_layer(layer(1)).with_layer(layer(2));
    let config = EncodeConfig {
        save_type: SaveType::Array,
        ..EncodeConfig::default()
    };

    let bytes = encode(&image, 0, &config);

    assert_eq!(&bytes[84..88], b"DX10");
    let dxgi_format = u32_at(&bytes, 128);
    assert_eq!(dxgi_format, 87); // DXGI_FORMAT_B8G8R8A8_UNORM, bpp == 4
}

/// Scenario 6: a 2x2 indexed layer with a palette and a designated
/// transparent index — the 256-entry RGBA palette block immediately
/// after the header, with the transparent entry's alpha zeroed.
#[test]
fn scenario_6_indexed_palette_with_transparent_index() {
    let mut image = MemoryImage::new(2, 2, BaseType::Indexed).with_layer(MemoryLayer::new("base", 2, 2, PixelType::Indexed, vec![0, 1, 1, 0]));
    image.palette = vec![RgbColor { r: 200, g: 10, b: 10 }, RgbColor { r: 10, g: 200, b: 10 }];
    let config = EncodeConfig {
        transparent_index: 1,
        ..EncodeConfig::default()
    };

    let bytes = encode(&image, 0, &config);

    let palette = &bytes[128..128 + 256 * 4];
    assert_eq!(&palette[0..4], &[200, 10, 10, 255]);
    assert_eq!(&palette[4..8], &[10, 200, 10, 0]); // transparent_index == 1
    assert_eq!(&palette[8..12], &[0, 0, 0, 0]); // unused entries are zeroed

    let body = &bytes[128 + 256 * 4..];
    assert_eq!(body, &[0, 1, 1, 0]); // raw palette indices, unmodified
}
