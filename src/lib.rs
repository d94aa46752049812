//! # dds_encode
//!
//! Encodes multi-layer raster images (RGB/RGBA/grayscale/indexed, with or
//! without an alpha channel) into DDS texture containers: flat textures,
//! cubemaps, volume textures, and texture arrays, uncompressed or block
//! compressed to BC1-BC5 (plus the BC3-based BC3n/RXGB normal-map
//! encodings and the YCoCg/alpha-exponent HDR-ish repackings).
//!
//! The crate is organized as one module per stage of the pipeline:
//!
//! - [config] / [types]: the inputs to an encode (`EncodeConfig`) and the
//!   vocabulary they're built from (`PixelFormat`, `Compression`, ...).
//! - [image]: the `Image`/`Layer` traits a host application implements to
//!   hand its own pixel storage to the encoder, plus an in-memory
//!   reference implementation.
//! - [sizing]: mip level counts and byte sizes.
//! - [topology]: classifying a layer list as a cubemap/volume/array and
//!   resolving cube faces by name.
//! - [pack] / [mipmap] / [compress]: per-pixel packing, mip chain
//!   generation, and block compression.
//! - [header]: the 128-byte DDS header (plus DX10 extension) and its
//!   GIMP-DDS writer-signature/semantic-tag conventions.
//! - [writer] / [driver]: the per-surface encode pipeline and the
//!   top-level [driver::write_dds] entry point.
//!
//! [driver::write_dds] is the only function most callers need.

pub mod compress;
pub mod config;
pub mod driver;
pub mod error;
pub mod header;
pub mod image;
pub mod mipmap;
pub mod pack;
pub mod sizing;
pub mod topology;
pub mod types;
pub mod writer;

pub use config::EncodeConfig;
pub use driver::{write_dds, ProgressSink};
pub use error::{CompressSurfaceError, ConfigError, EncodeError, TopologyError};
pub use image::{BaseType, ChannelLayout, Image, Layer, MemoryImage, MemoryLayer};
pub use types::{Compression, MipmapFilter, MipmapMode, MipmapWrap, PixelFormat, PixelType, RgbColor, SaveType};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn writes_a_minimal_uncompressed_dds_stream() {
        let image = MemoryImage::new(4, 4, BaseType::Rgb).with_layer(MemoryLayer::new("base", 4, 4, PixelType::Rgba, vec![0u8; 4 * 4 * 4]));
        let config = EncodeConfig::default();
        let mut out = Cursor::new(Vec::new());
        write_dds(&mut out, &image, 0, false, &config, false, &mut ()).unwrap();
        let bytes = out.into_inner();
        assert_eq!(&bytes[0..4], b"DDS ");
        assert_eq!(bytes.len(), 128 + 4 * 4 * 4);
    }
}
