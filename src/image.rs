//! The host interface consumed by the core (spec.md §6): `Image`/`Layer`
//! traits plus an in-memory reference implementation used by tests and by
//! callers that don't already have their own image model.

use crate::types::{PixelType, RgbColor};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BaseType {
    Rgb,
    Gray,
    Indexed,
}

/// The canonical per-pixel channel layout a layer can be fetched in.
/// Numbered 1/2/3/4 to match spec.md §4.G stage 1 ("canonical channel
/// order for the source PixelType: 1=Y, 2=YA, 3=RGB, 4=RGBA").
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ChannelLayout {
    Y,
    YA,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ChannelLayout::Y => 1,
            ChannelLayout::YA => 2,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }

    /// The layout that fetches a [PixelType] in its own canonical order.
    pub fn for_pixel_type(pixel_type: PixelType) -> Self {
        match pixel_type {
            PixelType::Gray | PixelType::Indexed => ChannelLayout::Y,
            PixelType::GrayA | PixelType::IndexedA => ChannelLayout::YA,
            PixelType::Rgb => ChannelLayout::Rgb,
            PixelType::Rgba => ChannelLayout::Rgba,
        }
    }
}

pub trait Layer {
    fn size(&self) -> (u32, u32);
    fn pixel_type(&self) -> PixelType;
    fn name(&self) -> &str;

    /// Fetch an `w`x`h` rectangle starting at `(x, y)` in the requested
    /// channel layout. Implementations convert from their own storage
    /// layout as needed; indexed layers return raw palette indices for
    /// [ChannelLayout::Y]/[ChannelLayout::YA] (the palette is resolved by
    /// the layer writer, not here).
    fn read_rect(&self, x: u32, y: u32, w: u32, h: u32, layout: ChannelLayout) -> Vec<u8>;
}

pub trait Image {
    type Layer: Layer;

    fn size(&self) -> (u32, u32);
    fn base_type(&self) -> BaseType;
    fn layers(&self) -> &[Self::Layer];
    /// The shared palette and its active color count, for [BaseType::Indexed]
    /// images.
    fn palette(&self) -> Option<(&[RgbColor], usize)>;
    /// Flatten every visible layer into a single `Rgb`/`Rgba` layer the
    /// size of the image.
    fn merge_visible(&self) -> MemoryLayer;
    /// A private, independently owned copy the caller can mutate
    /// destructively (spec.md §3 Lifecycle, §4.I step 4).
    fn duplicate(&self) -> Self;
    fn flip_vertical(&mut self);
}

/// A layer backed by an owned, tightly packed pixel buffer in its own
/// canonical channel layout.
#[derive(Debug, Clone)]
pub struct MemoryLayer {
    pub width: u32,
    pub height: u32,
    pub pixel_type: PixelType,
    pub name: String,
    pub data: Vec<u8>,
}

impl MemoryLayer {
    pub fn new(name: impl Into<String>, width: u32, height: u32, pixel_type: PixelType, data: Vec<u8>) -> Self {
        let expected = width as usize * height as usize * pixel_type.bytes_per_pixel();
        assert_eq!(data.len(), expected, "layer data length does not match width x height x bpp");
        Self {
            width,
            height,
            pixel_type,
            name: name.into(),
            data,
        }
    }
}

impl Layer for MemoryLayer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_rect(&self, x: u32, y: u32, w: u32, h: u32, layout: ChannelLayout) -> Vec<u8> {
        let src_bpp = self.pixel_type.bytes_per_pixel();
        let dst_bpp = layout.bytes_per_pixel();
        let mut out = Vec::with_capacity(w as usize * h as usize * dst_bpp);

        for row in 0..h {
            let src_y = y + row;
            for col in 0..w {
                let src_x = x + col;
                let start = (src_y as usize * self.width as usize + src_x as usize) * src_bpp;
                let pixel = &self.data[start..start + src_bpp];
                write_pixel_as(pixel, self.pixel_type, layout, &mut out);
            }
        }
        out
    }
}

/// Re-express one source pixel (in `src_type`'s canonical layout) as
/// `dst_layout`, appending the result to `out`. This is a narrow channel
/// reshuffle, not a color conversion: missing channels are zero-filled
/// and alpha defaults to 255 when the destination wants it and the
/// source doesn't have it.
fn write_pixel_as(pixel: &[u8], src_type: PixelType, dst_layout: ChannelLayout, out: &mut Vec<u8>) {
    let (r, g, b, a) = match src_type {
        PixelType::Gray | PixelType::Indexed => (pixel[0], pixel[0], pixel[0], 255),
        PixelType::GrayA | PixelType::IndexedA => (pixel[0], pixel[0], pixel[0], pixel[1]),
        PixelType::Rgb => (pixel[0], pixel[1], pixel[2], 255),
        PixelType::Rgba => (pixel[0], pixel[1], pixel[2], pixel[3]),
    };

    match dst_layout {
        ChannelLayout::Y => out.push(pixel[0]),
        ChannelLayout::YA => {
            out.push(pixel[0]);
            out.push(if src_type.has_alpha() { pixel[1] } else { 255 });
        }
        ChannelLayout::Rgb => out.extend_from_slice(&[r, g, b]),
        ChannelLayout::Rgba => out.extend_from_slice(&[r, g, b, a]),
    }
}

/// An in-memory [Image] implementation for use in tests and by callers
/// without a pre-existing host image model.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    pub width: u32,
    pub height: u32,
    pub base_type: BaseType,
    pub layers: Vec<MemoryLayer>,
    pub palette: Vec<RgbColor>,
}

impl MemoryImage {
    pub fn new(width: u32, height: u32, base_type: BaseType) -> Self {
        Self {
            width,
            height,
            base_type,
            layers: Vec::new(),
            palette: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: MemoryLayer) -> Self {
        self.layers.push(layer);
        self
    }
}

impl Image for MemoryImage {
    type Layer = MemoryLayer;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn base_type(&self) -> BaseType {
        self.base_type
    }

    fn layers(&self) -> &[Self::Layer] {
        &self.layers
    }

    fn palette(&self) -> Option<(&[RgbColor], usize)> {
        if self.base_type == BaseType::Indexed {
            Some((&self.palette, self.palette.len()))
        } else {
            None
        }
    }

    fn merge_visible(&self) -> MemoryLayer {
        // Composite every layer back-to-front using straight alpha over.
        let (w, h) = self.size();
        let mut out = vec![0u8; w as usize * h as usize * 4];
        for layer in &self.layers {
            let rect = layer.read_rect(0, 0, w.min(layer.width), h.min(layer.height), ChannelLayout::Rgba);
            let lw = w.min(layer.width) as usize;
            let lh = h.min(layer.height) as usize;
            for y in 0..lh {
                for x in 0..lw {
                    let src = &rect[(y * lw + x) * 4..(y * lw + x) * 4 + 4];
                    let dst_i = (y * w as usize + x) * 4;
                    let sa = src[3] as u32;
                    for c in 0..3 {
                        let blended = (src[c] as u32 * sa + out[dst_i + c] as u32 * (255 - sa)) / 255;
                        out[dst_i + c] = blended as u8;
                    }
                    out[dst_i + 3] = out[dst_i + 3].max(src[3]);
                }
            }
        }
        MemoryLayer::new("Merged Layers", w, h, PixelType::Rgba, out)
    }

    fn duplicate(&self) -> Self {
        self.clone()
    }

    fn flip_vertical(&mut self) {
        for layer in &mut self.layers {
            let bpp = layer.pixel_type.bytes_per_pixel();
            let stride = layer.width as usize * bpp;
            let mut flipped = vec![0u8; layer.data.len()];
            for y in 0..layer.height as usize {
                let src = &layer.data[y * stride..(y + 1) * stride];
                let dst_row = layer.height as usize - 1 - y;
                flipped[dst_row * stride..(dst_row + 1) * stride].copy_from_slice(src);
            }
            layer.data = flipped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_rect_indexed_a_drops_alpha_under_y_layout() {
        let layer = MemoryLayer::new("l", 2, 1, PixelType::IndexedA, vec![3, 10, 4, 20]);
        assert_eq!(layer.read_rect(0, 0, 2, 1, ChannelLayout::Y), vec![3, 4]);
    }

    #[test]
    fn read_rect_gray_as_rgba_broadcasts_and_fills_alpha() {
        let layer = MemoryLayer::new("l", 1, 1, PixelType::Gray, vec![42]);
        assert_eq!(layer.read_rect(0, 0, 1, 1, ChannelLayout::Rgba), vec![42, 42, 42, 255]);
    }

    #[test]
    fn flip_vertical_reverses_rows() {
        let mut image = MemoryImage::new(2, 2, BaseType::Gray)
            .with_layer(MemoryLayer::new("l", 2, 2, PixelType::Gray, vec![1, 2, 3, 4]));
        image.flip_vertical();
        assert_eq!(image.layers[0].data, vec![3, 4, 1, 2]);
    }
}
