use thiserror::Error;

use crate::types::SaveType;

/// Errors from the topology classifier (component F) when a requested
/// [SaveType] does not match what the layer list actually describes.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("save type {expected:?} requires a valid {expected:?} layout but the layers describe {actual}")]
    InvalidTopology {
        expected: SaveType,
        actual: &'static str,
    },

    #[error("mipmap mode is Existing but the layer list is not a valid pre-built mipmap chain")]
    InvalidMipmapChain,
}

/// Errors from validating an [crate::config::EncodeConfig] against a chosen
/// [SaveType], independent of the actual layer list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{reason}")]
    IncompatibleOption { reason: &'static str },
}

/// Errors surfaced while compressing a single level to a block format.
#[derive(Debug, Error)]
pub enum CompressSurfaceError {
    #[error("surface dimensions {width} x {height} contain no pixels")]
    ZeroSizedSurface { width: u32, height: u32 },
}

/// Top-level error returned by [crate::write_dds].
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid topology for the requested save type: {0}")]
    Topology(#[from] TopologyError),

    #[error("incompatible encode option: {0}")]
    Config(#[from] ConfigError),

    #[error("error compressing surface: {0}")]
    Compress(#[from] CompressSurfaceError),

    #[error("error writing to output sink: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode was cancelled")]
    Cancelled,
}
