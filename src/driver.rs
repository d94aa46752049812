//! Top-level encoder entry point (component I, spec.md §4.I): validate
//! the requested [SaveType]/[MipmapMode] against the image's actual
//! topology, build the header(s), and dispatch to the per-surface
//! [crate::writer] pipeline in save-type order.

use std::io::Write;

use crate::config::EncodeConfig;
use crate::error::{ConfigError, EncodeError, TopologyError};
use crate::header::{self, HeaderParams, HeaderTopology};
use crate::image::{ChannelLayout, Image, Layer};
use crate::mipmap;
use crate::sizing::mip_levels;
use crate::topology::{self, TopologyReport};
use crate::types::{Compression, MipmapMode, RgbColor, SaveType};
use crate::writer;

/// Narrow progress/cancellation capability reported at surface
/// boundaries (spec.md §5, §9 — replacing the original plugin's direct
/// callbacks into the host UI from inside the writer). The default
/// no-op implementation on `()` lets callers who don't care about
/// progress pass `&mut ()`.
pub trait ProgressSink {
    fn surface_written(&mut self) {}
    fn is_cancelled(&mut self) -> bool {
        false
    }
}

impl ProgressSink for () {}

/// Encode `image` to `sink` as a DDS stream per `config`.
///
/// `selected_layer` names the layer to use for [SaveType::SelectedLayer].
/// `interactive` governs recovery from an invalid `MipmapMode::Existing`
/// chain (silently downgraded to `None`) versus failing with
/// [TopologyError::InvalidMipmapChain] in non-interactive use. `is_duplicate`
/// is accepted for API symmetry with the original plugin's
/// `is_duplicate_image` flag; this implementation never mutates the
/// caller's `image` in place (it always works from an owned duplicate
/// when a destructive edit is needed), so the flag does not change
/// behavior here — see DESIGN.md.
pub fn write_dds<S: Write, I: Image>(
    sink: &mut S,
    image: &I,
    selected_layer: usize,
    interactive: bool,
    config: &EncodeConfig,
    _is_duplicate: bool,
    progress: &mut dyn ProgressSink,
) -> Result<(), EncodeError> {
    let (width, height) = image.size();
    let report = TopologyReport::compute(image.layers(), width, height);

    let mut mipmap_mode = config.mipmap_mode;
    if mipmap_mode == MipmapMode::Existing && !report.is_valid_existing_mipmap(image.layers(), config.save_type, width, height) {
        if interactive {
            mipmap_mode = MipmapMode::None;
        } else {
            return Err(TopologyError::InvalidMipmapChain.into());
        }
    }

    match config.save_type {
        SaveType::Cubemap if !report.is_cubemap => {
            return Err(TopologyError::InvalidTopology {
                expected: SaveType::Cubemap,
                actual: topology::describe(image.layers(), width, height),
            }
            .into());
        }
        SaveType::Volumemap if !report.is_volume => {
            return Err(TopologyError::InvalidTopology {
                expected: SaveType::Volumemap,
                actual: topology::describe(image.layers(), width, height),
            }
            .into());
        }
        _ => {}
    }
    if config.save_type == SaveType::Volumemap && config.compression != Compression::None {
        return Err(ConfigError::IncompatibleOption {
            reason: "volume saves cannot use block compression",
        }
        .into());
    }

    let mut effective_config = *config;
    effective_config.mipmap_mode = mipmap_mode;

    let duplicated;
    let working: &I = if config.flip_vertical {
        let mut d = image.duplicate();
        d.flip_vertical();
        duplicated = d;
        &duplicated
    } else {
        image
    };

    let levels = if mipmap_mode == MipmapMode::None { 1 } else { mip_levels(width, height) };
    let palette = working.palette().map(|(colors, _)| colors);

    let mut body = Vec::new();

    match config.save_type {
        SaveType::Cubemap => {
            let faces = report.cube_faces.expect("validated is_cubemap above");
            for &base_idx in &faces {
                let surface_layers = working.layers();
                let existing = existing_mip_slice(surface_layers, base_idx, levels as usize, mipmap_mode);
                body.extend(writer::encode_surface(&surface_layers[base_idx], palette, &effective_config, existing)?);
                progress.surface_written();
                if progress.is_cancelled() {
                    return Err(EncodeError::Cancelled);
                }
            }
        }
        SaveType::Volumemap => {
            let mut base_config = effective_config;
            base_config.mipmap_mode = MipmapMode::None;
            for layer in working.layers() {
                body.extend(writer::encode_surface(layer, palette, &base_config, &[])?);
                progress.surface_written();
                if progress.is_cancelled() {
                    return Err(EncodeError::Cancelled);
                }
            }
            if levels > 1 {
                body.extend(encode_volume_mipmaps(working.layers(), &effective_config, levels)?);
            }
        }
        SaveType::Array => {
            if mipmap_mode == MipmapMode::Existing {
                let all_layers = working.layers();
                let num_surfaces = all_layers.len() / levels as usize;
                for surface in 0..num_surfaces {
                    let base_idx = surface * levels as usize;
                    let existing = existing_mip_slice(all_layers, base_idx, levels as usize, mipmap_mode);
                    body.extend(writer::encode_surface(&all_layers[base_idx], palette, &effective_config, existing)?);
                    progress.surface_written();
                    if progress.is_cancelled() {
                        return Err(EncodeError::Cancelled);
                    }
                }
            } else {
                for layer in working.layers() {
                    if layer.size() == (width, height) {
                        body.extend(writer::encode_surface(layer, palette, &effective_config, &[])?);
                        progress.surface_written();
                        if progress.is_cancelled() {
                            return Err(EncodeError::Cancelled);
                        }
                    }
                }
            }
        }
        SaveType::SelectedLayer => {
            let all_layers = working.layers();
            let existing = existing_mip_slice(all_layers, selected_layer, levels as usize, mipmap_mode);
            body.extend(writer::encode_surface(&all_layers[selected_layer], palette, &effective_config, existing)?);
        }
        SaveType::VisibleLayers => {
            let merged = working.merge_visible();
            body.extend(writer::encode_surface(&merged, palette, &effective_config, &[])?);
        }
    }

    let num_surfaces_for_header = match config.save_type {
        SaveType::Array if mipmap_mode == MipmapMode::Existing => (working.layers().len() / levels as usize) as u32,
        SaveType::Array => working.layers().iter().filter(|l| l.size() == (width, height)).count() as u32,
        _ => 1,
    };

    let header_topology = match config.save_type {
        SaveType::Cubemap => HeaderTopology::Cubemap,
        SaveType::Volumemap => HeaderTopology::Volume {
            depth: working.layers().len() as u32,
        },
        SaveType::Array => HeaderTopology::Array {
            layer_count: num_surfaces_for_header,
        },
        SaveType::SelectedLayer | SaveType::VisibleLayers => HeaderTopology::Flat,
    };

    let source_bpp = match config.save_type {
        SaveType::VisibleLayers => 4,
        _ => working.layers()[0].pixel_type().bytes_per_pixel(),
    };

    let header = header::build_header(&HeaderParams {
        width,
        height,
        mipmap_count: levels,
        topology: header_topology,
        compression: effective_config.compression,
        pixel_format: effective_config.pixel_format,
        base_type: working.base_type(),
        source_bpp,
    });

    let mut payload = build_palette(working, &effective_config);
    payload.extend(body);

    header::write_dds_stream(sink, &header, &payload)?;
    Ok(())
}

/// The slice of `layers` holding a surface's pre-built mip levels 1..N-1,
/// immediately following its level-0 entry at `base_idx` (spec.md §4.F/§4.I
/// — existing chains are stored surface-major, `levels` entries each).
fn existing_mip_slice<L: Layer>(layers: &[L], base_idx: usize, levels: usize, mipmap_mode: MipmapMode) -> &[L] {
    if mipmap_mode == MipmapMode::Existing && levels > 1 {
        &layers[base_idx + 1..base_idx + levels]
    } else {
        &[]
    }
}

/// 256-entry RGBA palette block emitted immediately after the header(s)
/// for indexed, [crate::types::PixelFormat::Default], uncompressed images (spec.md
/// §4.H/§8 scenario 6). Empty for every other configuration.
fn build_palette<I: Image>(image: &I, config: &EncodeConfig) -> Vec<u8> {
    let Some((colors, count)) = image.palette() else {
        return Vec::new();
    };
    if !config.pixel_format.is_default() || config.compression != Compression::None {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(256 * 4);
    for i in 0..256usize {
        if i < count {
            let c = colors[i];
            let alpha = if i as i32 == config.transparent_index { 0 } else { 255 };
            out.extend_from_slice(&[c.r, c.g, c.b, alpha]);
        } else {
            out.extend_from_slice(&[0, 0, 0, 0]);
        }
    }
    out
}

/// Build mip levels 1..M-1 for a volumemap (spec.md §4.I step "Volumemap:
/// ... then if M>1, run the volume-mipmap pipeline"). Each level
/// downsamples the previous one in all three dimensions: every slice is
/// halved in (x, y) with the ordinary 2D mip filter, then consecutive
/// slice pairs are averaged to halve depth. The exact weighting the
/// original volume-mipmap kernel used isn't in the retrieval pack; this
/// is a straightforward box-filter extension of the 2D case (see
/// DESIGN.md).
fn encode_volume_mipmaps<L: Layer>(layers: &[L], config: &EncodeConfig, num_mipmaps: u32) -> Result<Vec<u8>, EncodeError> {
    let (mut w, mut h) = layers[0].size();
    let source_pixel_type = layers[0].pixel_type();
    let mut slices: Vec<Vec<u8>> = layers.iter().map(|l| l.read_rect(0, 0, w, h, ChannelLayout::Rgba)).collect();

    let mut out = Vec::new();
    for _ in 1..num_mipmaps {
        let nw = (w >> 1).max(1);
        let nh = (h >> 1).max(1);

        let halved: Vec<Vec<u8>> = slices
            .iter()
            .map(|s| {
                mipmap::generate_chain(s, w, h, 2, config.mipmap_filter, config.mipmap_wrap, config.gamma_correct, config.srgb, config.gamma, false, config.alpha_test_threshold)
                    .pop()
                    .unwrap()
            })
            .collect();

        let mut next = Vec::with_capacity((halved.len() + 1) / 2);
        let mut it = halved.into_iter();
        while let Some(a) = it.next() {
            next.push(match it.next() {
                Some(b) => average_slices(&a, &b),
                None => a,
            });
        }

        for slice in &next {
            out.extend(writer::pack_uncompressed_rgba(slice, config.pixel_format, source_pixel_type));
        }

        slices = next;
        w = nw;
        h = nh;
    }

    Ok(out)
}

fn average_slices(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b).map(|(&x, &y)| ((x as u16 + y as u16) / 2) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{BaseType, MemoryImage, MemoryLayer};
    use crate::types::PixelType;
    use std::io::Cursor;

    fn rgba_layer(name: &str, w: u32, h: u32, fill: u8) -> MemoryLayer {
        MemoryLayer::new(name, w, h, PixelType::Rgba, vec![fill; (w * h * 4) as usize])
    }

    #[test]
    fn selected_layer_writes_header_plus_payload() {
        let image = MemoryImage::new(4, 4, BaseType::Rgb).with_layer(rgba_layer("l", 4, 4, 10));
        let config = EncodeConfig::default();
        let mut out = Cursor::new(Vec::new());
        write_dds(&mut out, &image, 0, false, &config, false, &mut ()).unwrap();
        assert_eq!(out.into_inner().len(), 128 + 4 * 4 * 4);
    }

    #[test]
    fn cubemap_requires_valid_face_topology() {
        let image = MemoryImage::new(4, 4, BaseType::Rgb).with_layer(rgba_layer("just one layer", 4, 4, 0));
        let config = EncodeConfig {
            save_type: SaveType::Cubemap,
            ..EncodeConfig::default()
        };
        let mut out = Cursor::new(Vec::new());
        let err = write_dds(&mut out, &image, 0, false, &config, false, &mut ()).unwrap_err();
        assert!(matches!(err, EncodeError::Topology(TopologyError::InvalidTopology { .. })));
    }

    #[test]
    fn volumemap_rejects_compression() {
        let image = MemoryImage::new(4, 4, BaseType::Rgb)
            .with_layer(rgba_layer("a", 4, 4, 1))
            .with_layer(rgba_layer("b", 4, 4, 2));
        let config = EncodeConfig {
            save_type: SaveType::Volumemap,
            compression: Compression::BC1,
            ..EncodeConfig::default()
        };
        let mut out = Cursor::new(Vec::new());
        let err = write_dds(&mut out, &image, 0, false, &config, false, &mut ()).unwrap_err();
        assert!(matches!(err, EncodeError::Config(ConfigError::IncompatibleOption { .. })));
    }

    #[test]
    fn array_save_type_emits_dx10_header() {
        let image = MemoryImage::new(4, 4, BaseType::Rgb)
            .with_layer(rgba_layer("a", 4, 4, 1))
            .with_layer(rgba_layer("b", 4, 4, 2));
        let config = EncodeConfig {
            save_type: SaveType::Array,
            ..EncodeConfig::default()
        };
        let mut out = Cursor::new(Vec::new());
        write_dds(&mut out, &image, 0, false, &config, false, &mut ()).unwrap();
        let bytes = out.into_inner();
        assert_eq!(&bytes[84..88], b"DX10");
    }

    #[test]
    fn indexed_default_uncompressed_emits_256_entry_palette() {
        let mut image = MemoryImage::new(2, 2, BaseType::Indexed).with_layer(MemoryLayer::new("l", 2, 2, PixelType::Indexed, vec![0, 1, 0, 1]));
        image.palette = vec![RgbColor { r: 255, g: 0, b: 0 }, RgbColor { r: 0, g: 255, b: 0 }];
        let config = EncodeConfig {
            transparent_index: 0,
            ..EncodeConfig::default()
        };
        let mut out = Cursor::new(Vec::new());
        write_dds(&mut out, &image, 0, false, &config, false, &mut ()).unwrap();
        let bytes = out.into_inner();
        let palette = &bytes[128..128 + 256 * 4];
        assert_eq!(&palette[0..4], &[255, 0, 0, 0]);
        assert_eq!(&palette[4..8], &[0, 255, 0, 255]);
        assert_eq!(&palette[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn cancellation_stops_before_more_bytes_are_written() {
        struct CancelAfterOne {
            count: u32,
        }
        impl ProgressSink for CancelAfterOne {
            fn surface_written(&mut self) {
                self.count += 1;
            }
            fn is_cancelled(&mut self) -> bool {
                self.count >= 1
            }
        }

        let image = MemoryImage::new(4, 4, BaseType::Rgb)
            .with_layer(rgba_layer("positive x", 4, 4, 0))
            .with_layer(rgba_layer("negative x", 4, 4, 0))
            .with_layer(rgba_layer("positive y", 4, 4, 0))
            .with_layer(rgba_layer("negative y", 4, 4, 0))
            .with_layer(rgba_layer("positive z", 4, 4, 0))
            .with_layer(rgba_layer("negative z", 4, 4, 0));
        let config = EncodeConfig {
            save_type: SaveType::Cubemap,
            ..EncodeConfig::default()
        };
        let mut out = Cursor::new(Vec::new());
        let mut sink = CancelAfterOne { count: 0 };
        let err = write_dds(&mut out, &image, 0, false, &config, false, &mut sink).unwrap_err();
        assert!(matches!(err, EncodeError::Cancelled));
    }
}
