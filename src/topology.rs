//! Topology classifier (component F, spec.md §4.F): decide whether a
//! layer list is a valid cubemap, volume, array, or pre-built mipmap
//! chain, and (for cubemaps) identify which layer is which face.
//!
//! Exposed as an immutable [TopologyReport] computed once from the image,
//! rather than the original plugin's global mutable flags (spec.md §9) —
//! both the caller (for UI gating) and the encoder consume the same
//! report.

use crate::image::Layer;
use crate::sizing::mip_levels;
use crate::types::{PixelType, SaveType};

/// Axis order faces are written in (spec.md §4.F, §4.I).
pub const FACE_COUNT: usize = 6;

/// Case-sensitive substring name table for cube face identification
/// (spec.md §4.F, §9 — preserved verbatim, not normalized).
const FACE_NAME_TABLE: [[&str; FACE_COUNT]; 4] = [
    ["positive x", "negative x", "positive y", "negative y", "positive z", "negative z"],
    ["pos x", "neg x", "pos y", "neg y", "pos z", "neg z"],
    ["+x", "-x", "+y", "-y", "+z", "-z"],
    ["right", "left", "top", "bottom", "back", "front"],
];

/// The minimum/maximum number of level-0 surfaces `save_type` allows,
/// for the existing-mipmap-chain check (spec.md §4.F).
fn surface_bounds(save_type: SaveType) -> Option<(usize, usize)> {
    match save_type {
        SaveType::Cubemap => Some((6, 6)),
        SaveType::Array => Some((2, usize::MAX)),
        SaveType::Volumemap => None,
        SaveType::SelectedLayer | SaveType::VisibleLayers => Some((1, 1)),
    }
}

/// `is_valid_existing_mipmap(save_type)` from spec.md §4.F.
pub fn is_valid_existing_mipmap<L: Layer>(layers: &[L], save_type: SaveType, width: u32, height: u32) -> bool {
    let Some((min_surfaces, max_surfaces)) = surface_bounds(save_type) else {
        return false;
    };
    if layers.is_empty() {
        return false;
    }

    let pixel_type = layers[0].pixel_type();
    if layers.iter().any(|l| l.pixel_type() != pixel_type) {
        return false;
    }

    let num_surfaces = layers.iter().filter(|l| l.size() == (width, height)).count();
    if num_surfaces < min_surfaces || num_surfaces > max_surfaces {
        return false;
    }

    let levels = mip_levels(width, height) as usize;
    if layers.len() != num_surfaces * levels {
        return false;
    }

    for surface in 0..num_surfaces {
        let base = surface * levels;
        if layers[base].size() != (width, height) {
            return false;
        }
        for k in 1..levels {
            let expected = (
                (width >> k as u32).max(1),
                (height >> k as u32).max(1),
            );
            if layers[base + k].size() != expected {
                return false;
            }
        }
    }

    true
}

/// `is_volume` from spec.md §4.F.
pub fn is_volume<L: Layer>(layers: &[L]) -> bool {
    if layers.len() < 2 {
        return false;
    }
    let (w, h) = layers[0].size();
    let pixel_type = layers[0].pixel_type();
    layers.iter().all(|l| l.size() == (w, h) && l.pixel_type() == pixel_type)
}

/// `is_array` from spec.md §4.F.
pub fn is_array<L: Layer>(layers: &[L], width: u32, height: u32) -> bool {
    if is_valid_existing_mipmap(layers, SaveType::Array, width, height) {
        return true;
    }
    if layers.len() < 2 {
        return false;
    }
    let (w, h) = layers[0].size();
    let pixel_type = layers[0].pixel_type();
    layers.iter().all(|l| l.size() == (w, h) && l.pixel_type() == pixel_type)
}

/// Identify the 6 cube faces among `layers`' level-0-sized entries,
/// returning their indices in axis order `[+X, -X, +Y, -Y, +Z, -Z]`.
/// Returns `None` if not all 6 faces could be assigned, if the assigned
/// faces don't share a [PixelType], or (when there are more than 6
/// layers) if the level-0 faces don't share dimensions.
fn assign_cube_faces<L: Layer>(layers: &[L], width: u32, height: u32) -> Option<[usize; FACE_COUNT]> {
    let mut faces: [Option<usize>; FACE_COUNT] = [None; FACE_COUNT];

    for (index, layer) in layers.iter().enumerate() {
        if layer.size() != (width, height) {
            continue;
        }
        let name = layer.name();
        'layer: for row in &FACE_NAME_TABLE {
            for (face, candidate) in row.iter().enumerate() {
                if faces[face].is_none() && name.contains(candidate) {
                    faces[face] = Some(index);
                    break 'layer;
                }
            }
        }
    }

    let mut resolved = [0usize; FACE_COUNT];
    for (face, slot) in faces.iter().enumerate() {
        resolved[face] = (*slot)?;
    }

    let pixel_type = layers[resolved[0]].pixel_type();
    if resolved.iter().any(|&i| layers[i].pixel_type() != pixel_type) {
        return None;
    }
    if layers.len() > FACE_COUNT {
        let dims = layers[resolved[0]].size();
        if resolved.iter().any(|&i| layers[i].size() != dims) {
            return None;
        }
    }

    Some(resolved)
}

/// `is_cubemap` from spec.md §4.F, returning the resolved face indices
/// when valid.
pub fn cubemap_faces<L: Layer>(layers: &[L], width: u32, height: u32) -> Option<[usize; FACE_COUNT]> {
    let n = layers.len();
    if n < FACE_COUNT || n % FACE_COUNT != 0 {
        return None;
    }
    if n > FACE_COUNT && !is_valid_existing_mipmap(layers, SaveType::Cubemap, width, height) {
        return None;
    }
    assign_cube_faces(layers, width, height)
}

pub fn is_cubemap<L: Layer>(layers: &[L], width: u32, height: u32) -> bool {
    cubemap_faces(layers, width, height).is_some()
}

/// An immutable snapshot of every topology predicate for an image,
/// computed once and shared by the dialog (for widget gating, out of
/// scope here) and the encoder driver.
#[derive(Debug, Clone)]
pub struct TopologyReport {
    pub is_cubemap: bool,
    pub is_volume: bool,
    pub is_array: bool,
    pub cube_faces: Option<[usize; FACE_COUNT]>,
}

impl TopologyReport {
    pub fn compute<L: Layer>(layers: &[L], width: u32, height: u32) -> Self {
        let cube_faces = cubemap_faces(layers, width, height);
        Self {
            is_cubemap: cube_faces.is_some(),
            is_volume: is_volume(layers),
            is_array: is_array(layers, width, height),
            cube_faces,
        }
    }

    pub fn is_valid_existing_mipmap<L: Layer>(&self, layers: &[L], save_type: SaveType, width: u32, height: u32) -> bool {
        is_valid_existing_mipmap(layers, save_type, width, height)
    }
}

/// A name describing the topology the layer list actually has, used in
/// [crate::error::TopologyError::InvalidTopology] messages.
pub fn describe<L: Layer>(layers: &[L], width: u32, height: u32) -> &'static str {
    if is_cubemap(layers, width, height) {
        "a cubemap"
    } else if is_volume(layers) {
        "a volume"
    } else if is_array(layers, width, height) {
        "an array"
    } else if layers.len() == 1 {
        "a single layer"
    } else {
        "an arbitrary layer list"
    }
}

#[allow(dead_code)]
pub(crate) fn pixel_type_matches(a: PixelType, b: PixelType) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::MemoryLayer;
    use crate::types::PixelType;

    fn layer(name: &str, w: u32, h: u32) -> MemoryLayer {
        MemoryLayer::new(name, w, h, PixelType::Rgba, vec![0u8; w as usize * h as usize * 4])
    }

    #[test]
    fn cubemap_face_names_first_row_recognized() {
        let layers = vec![
            layer("face positive x", 4, 4),
            layer("face negative x", 4, 4),
            layer("face positive y", 4, 4),
            layer("face negative y", 4, 4),
            layer("face positive z", 4, 4),
            layer("face negative z", 4, 4),
        ];
        let faces = cubemap_faces(&layers, 4, 4).unwrap();
        assert_eq!(faces, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn cubemap_classification_is_permutation_invariant() {
        let mut layers = vec![
            layer("right", 4, 4),
            layer("left", 4, 4),
            layer("top", 4, 4),
            layer("bottom", 4, 4),
            layer("back", 4, 4),
            layer("front", 4, 4),
        ];
        layers.swap(0, 5);
        layers.swap(1, 3);
        let faces = cubemap_faces(&layers, 4, 4).unwrap();
        // Whatever the permutation, the resolved indices point at the
        // layers whose names match +X, -X, +Y, -Y, +Z, -Z respectively.
        assert_eq!(layers[faces[0]].name(), "right");
        assert_eq!(layers[faces[1]].name(), "left");
        assert_eq!(layers[faces[2]].name(), "top");
        assert_eq!(layers[faces[3]].name(), "bottom");
        assert_eq!(layers[faces[4]].name(), "back");
        assert_eq!(layers[faces[5]].name(), "front");
    }

    #[test]
    fn cubemap_requires_all_six_faces() {
        let layers = vec![
            layer("right", 4, 4),
            layer("left", 4, 4),
            layer("top", 4, 4),
            layer("bottom", 4, 4),
            layer("back", 4, 4),
            layer("unrelated", 4, 4),
        ];
        assert!(cubemap_faces(&layers, 4, 4).is_none());
    }

    #[test]
    fn is_volume_requires_shared_size_and_type() {
        let layers = vec![layer("a", 4, 4), layer("b", 4, 4)];
        assert!(is_volume(&layers));

        let mismatched = vec![layer("a", 4, 4), layer("b", 8, 8)];
        assert!(!is_volume(&mismatched));
    }

    #[test]
    fn is_valid_existing_mipmap_checks_halving() {
        let layers = vec![layer("l0", 8, 8), layer("l1", 4, 4), layer("l2", 2, 2), layer("l3", 1, 1)];
        assert!(is_valid_existing_mipmap(&layers, SaveType::SelectedLayer, 8, 8));

        let bad = vec![layer("l0", 8, 8), layer("l1", 4, 4), layer("l2", 2, 2), layer("l3", 2, 2)];
        assert!(!is_valid_existing_mipmap(&bad, SaveType::SelectedLayer, 8, 8));
    }
}
