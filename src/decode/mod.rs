//! Anchor-relative box decoding.
//!
//! A raw anchor row encodes its box as centroid offsets relative to the
//! anchor, scaled by per-coordinate variances:
//!
//! ```text
//! cx = Δcx · vcx · anchor_w + anchor_cx
//! cy = Δcy · vcy · anchor_h + anchor_cy
//! w  = exp(Δw · vw) · anchor_w
//! h  = exp(Δh · vh) · anchor_h
//! ```
//!
//! The decoded center/size box is converted to corners and optionally scaled
//! from relative units to pixels.

use crate::candidate::detection::Detection;
use crate::kernel::{ActiveKernel, DecodeKernel};
use crate::tensor::ChannelLayout;
use crate::util::math::is_positive_finite;
use crate::util::{DecodeError, DecodeResult};

/// Anchor box encoding of the predicted geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoxEncoding {
    /// `(cx, cy, w, h)` offsets. The only decodable encoding.
    #[default]
    Centroids,
    /// `(xmin, xmax, ymin, ymax)` offsets.
    MinMax,
    /// `(xmin, ymin, xmax, ymax)` offsets.
    Corners,
}

impl BoxEncoding {
    /// Returns the lowercase name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Centroids => "centroids",
            Self::MinMax => "minmax",
            Self::Corners => "corners",
        }
    }
}

/// Per-axis factors applied to decoded corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordScale {
    /// Multiplier for `xmin` and `xmax`.
    pub x: f32,
    /// Multiplier for `ymin` and `ymax`.
    pub y: f32,
}

impl CoordScale {
    /// Leaves coordinates in the anchors' relative units.
    pub const IDENTITY: CoordScale = CoordScale { x: 1.0, y: 1.0 };
}

/// Converts raw anchor rows into [`Detection`] records.
#[derive(Clone, Copy, Debug)]
pub struct BoxDecoder {
    coords: BoxEncoding,
    normalize_coords: bool,
    scale: CoordScale,
}

impl BoxDecoder {
    /// Creates a decoder, validating the coordinate configuration.
    ///
    /// `normalize_coords` requires both image dimensions, which must be
    /// finite and positive. Only [`BoxEncoding::Centroids`] is supported.
    pub fn new(
        coords: BoxEncoding,
        normalize_coords: bool,
        img_height: Option<f32>,
        img_width: Option<f32>,
    ) -> DecodeResult<Self> {
        let scale = if normalize_coords {
            let (height, width) = match (img_height, img_width) {
                (Some(height), Some(width)) => (height, width),
                _ => {
                    return Err(DecodeError::MissingImageSize {
                        img_height,
                        img_width,
                    })
                }
            };
            if !is_positive_finite(height) || !is_positive_finite(width) {
                return Err(DecodeError::InvalidConfig(
                    "img_height and img_width must be finite and positive",
                ));
            }
            CoordScale {
                x: width,
                y: height,
            }
        } else {
            CoordScale::IDENTITY
        };
        if coords != BoxEncoding::Centroids {
            return Err(DecodeError::UnsupportedEncoding(coords));
        }

        Ok(Self {
            coords,
            normalize_coords,
            scale,
        })
    }

    /// Decoder that keeps coordinates in relative units.
    pub fn relative() -> Self {
        Self {
            coords: BoxEncoding::Centroids,
            normalize_coords: false,
            scale: CoordScale::IDENTITY,
        }
    }

    /// Decoder that scales corners to an image of `img_height × img_width`.
    pub fn absolute(img_height: f32, img_width: f32) -> DecodeResult<Self> {
        Self::new(
            BoxEncoding::Centroids,
            true,
            Some(img_height),
            Some(img_width),
        )
    }

    /// Returns the anchor encoding this decoder reads.
    pub fn coords(&self) -> BoxEncoding {
        self.coords
    }

    /// Returns true when corners are scaled by the image size.
    pub fn normalize_coords(&self) -> bool {
        self.normalize_coords
    }

    /// Returns the factors applied to decoded corners.
    pub fn scale(&self) -> CoordScale {
        self.scale
    }

    /// Decodes a single anchor row of `n_classes + 12` values.
    pub fn decode_row(&self, row: &[f32]) -> DecodeResult<Detection> {
        let layout = ChannelLayout::from_channels(row.len())?;
        Ok(<ActiveKernel as DecodeKernel>::decode_row(
            row, layout, self.scale,
        ))
    }

    /// Decodes every row of `rows`, one detection per anchor.
    ///
    /// Trailing values that do not fill a whole row are ignored.
    pub fn decode_rows(&self, rows: &[f32], layout: ChannelLayout) -> Vec<Detection> {
        let mut out = Vec::with_capacity(rows.len() / layout.channels());
        self.decode_rows_into(rows, layout, &mut out);
        out
    }

    /// Appends one detection per row of `rows` to `out`.
    pub fn decode_rows_into(&self, rows: &[f32], layout: ChannelLayout, out: &mut Vec<Detection>) {
        <ActiveKernel as DecodeKernel>::decode_rows_into(rows, layout, self.scale, out);
    }
}
