//! Borrowed views over raw prediction tensors.
//!
//! `PredictionView` wraps a flat row-major buffer laid out as
//! `[batch, n_boxes, channels]`. Each row holds `n_classes` scores followed by
//! twelve geometry channels: four predicted offsets, four anchor values and
//! four variances. Views are validated once and then sliced without copies.

use crate::util::{DecodeError, DecodeResult};

/// Number of trailing geometry channels in every anchor row.
pub const GEOMETRY_CHANNELS: usize = 12;

/// Channel offsets within a single anchor row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelLayout {
    n_classes: usize,
}

impl ChannelLayout {
    /// Builds a layout for rows of `channels` values.
    pub fn from_channels(channels: usize) -> DecodeResult<Self> {
        if channels <= GEOMETRY_CHANNELS {
            return Err(DecodeError::InvalidChannels { channels });
        }
        Ok(Self {
            n_classes: channels - GEOMETRY_CHANNELS,
        })
    }

    /// Builds a layout for `n_classes` score columns (background included).
    pub fn with_classes(n_classes: usize) -> DecodeResult<Self> {
        let channels = n_classes
            .checked_add(GEOMETRY_CHANNELS)
            .ok_or(DecodeError::ClassCountOverflow { n_classes })?;
        Self::from_channels(channels)
    }

    /// Number of class score columns, background included.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Total values per row.
    pub fn channels(&self) -> usize {
        self.n_classes + GEOMETRY_CHANNELS
    }

    /// First predicted offset column (`Δcx`).
    pub fn offsets(&self) -> usize {
        self.n_classes
    }

    /// First anchor geometry column (`anchor_cx`).
    pub fn anchor(&self) -> usize {
        self.n_classes + 4
    }

    /// First variance column (`vcx`).
    pub fn variances(&self) -> usize {
        self.n_classes + 8
    }
}

/// Borrowed `[batch, n_boxes, channels]` prediction tensor.
#[derive(Copy, Clone, Debug)]
pub struct PredictionView<'a> {
    data: &'a [f32],
    batch: usize,
    n_boxes: usize,
    layout: ChannelLayout,
}

impl<'a> PredictionView<'a> {
    /// Creates a view over a contiguous buffer.
    ///
    /// The buffer length must equal `batch * n_boxes * channels` exactly.
    /// Empty batches and images without anchors are valid.
    pub fn new(
        data: &'a [f32],
        batch: usize,
        n_boxes: usize,
        channels: usize,
    ) -> DecodeResult<Self> {
        let layout = ChannelLayout::from_channels(channels)?;
        let expected = batch
            .checked_mul(n_boxes)
            .and_then(|v| v.checked_mul(channels))
            .ok_or(DecodeError::ShapeOverflow {
                batch,
                n_boxes,
                channels,
            })?;
        if data.len() != expected {
            return Err(DecodeError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            batch,
            n_boxes,
            layout,
        })
    }

    /// Returns the batch size.
    pub fn batch(&self) -> usize {
        self.batch
    }

    /// Returns the number of anchor rows per image.
    pub fn n_boxes(&self) -> usize {
        self.n_boxes
    }

    /// Returns the number of values per anchor row.
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Returns the number of class score columns.
    pub fn n_classes(&self) -> usize {
        self.layout.n_classes()
    }

    /// Returns the row layout shared by every anchor.
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Returns the tensor shape as `[batch, n_boxes, channels]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.batch, self.n_boxes, self.channels()]
    }

    /// Returns the backing buffer.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns all anchor rows of image `index`, concatenated.
    pub fn image(&self, index: usize) -> Option<&'a [f32]> {
        if index >= self.batch {
            return None;
        }
        let stride = self.n_boxes * self.channels();
        let start = index * stride;
        self.data.get(start..start + stride)
    }

    /// Returns the anchor row `anchor` of image `index`.
    pub fn row(&self, index: usize, anchor: usize) -> Option<&'a [f32]> {
        if anchor >= self.n_boxes {
            return None;
        }
        let channels = self.channels();
        let start = anchor * channels;
        self.image(index)?.get(start..start + channels)
    }

    /// Iterates over the per-image slices in batch order.
    pub fn images(&self) -> impl Iterator<Item = &'a [f32]> + 'a {
        let view = *self;
        (0..view.batch).filter_map(move |idx| view.image(idx))
    }
}
