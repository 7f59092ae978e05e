//! Error types for detdecode.

use crate::decode::BoxEncoding;
use thiserror::Error;

/// Result alias for detdecode operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors reported while building a decoder or validating an input tensor.
///
/// Configuration errors are raised once, at construction. Degenerate
/// per-image inputs (no positive boxes, nothing above the threshold) are not
/// errors; they produce padded output.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    /// Coordinate normalization was requested without an image size.
    #[error(
        "normalize_coords requires the image size, got img_height = {img_height:?}, img_width = {img_width:?}"
    )]
    MissingImageSize {
        img_height: Option<f32>,
        img_width: Option<f32>,
    },
    /// Only the centroid anchor encoding can be decoded.
    #[error("unsupported box encoding {0:?}, only centroids is supported")]
    UnsupportedEncoding(BoxEncoding),
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// Rows must hold at least one class score plus the 12 geometry channels.
    #[error("invalid channel count {channels}, expected n_classes + 12 with n_classes >= 1")]
    InvalidChannels { channels: usize },
    /// The flat buffer does not match the declared tensor shape.
    #[error("buffer size mismatch: expected {expected} values, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
    /// `n_classes + 12` overflows `usize`.
    #[error("class count {n_classes} overflows the row width")]
    ClassCountOverflow { n_classes: usize },
    /// The declared tensor shape overflows `usize`.
    #[error("tensor shape overflows: [{batch}, {n_boxes}, {channels}]")]
    ShapeOverflow {
        batch: usize,
        n_boxes: usize,
        channels: usize,
    },
}

impl DecodeError {
    /// Returns true for errors raised while validating static configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingImageSize { .. } | Self::UnsupportedEncoding(_) | Self::InvalidConfig(_)
        )
    }
}
