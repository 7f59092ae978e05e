//! Fixed-shape batch output.

use crate::candidate::detection::Detection;

/// Decoded detections for a batch, shaped `[batch, top_k, 6]`.
///
/// Every image holds exactly `top_k` records in non-increasing confidence;
/// unused slots are [`Detection::PADDING`].
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionBatch {
    top_k: usize,
    detections: Vec<Detection>,
}

impl DetectionBatch {
    /// Concatenates per-image lists; each must hold exactly `top_k` records.
    pub(crate) fn from_images(top_k: usize, images: Vec<Vec<Detection>>) -> Self {
        let mut detections = Vec::with_capacity(images.len() * top_k);
        for image in images {
            debug_assert_eq!(image.len(), top_k);
            detections.extend(image);
        }
        Self { top_k, detections }
    }

    /// Number of images.
    pub fn batch(&self) -> usize {
        if self.top_k == 0 {
            0
        } else {
            self.detections.len() / self.top_k
        }
    }

    /// Records per image.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Output shape `[batch, top_k, 6]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.batch(), self.top_k, 6]
    }

    /// Returns the `top_k` records of image `index`.
    pub fn image(&self, index: usize) -> Option<&[Detection]> {
        let start = index.checked_mul(self.top_k)?;
        self.detections.get(start..start + self.top_k)
    }

    /// Iterates over the per-image record lists in batch order.
    pub fn images(&self) -> impl Iterator<Item = &[Detection]> {
        self.detections.chunks_exact(self.top_k.max(1))
    }

    /// Iterates over the non-padding records of image `index`.
    pub fn real_detections(&self, index: usize) -> impl Iterator<Item = &Detection> {
        self.image(index)
            .unwrap_or(&[])
            .iter()
            .filter(|det| !det.is_padding())
    }

    /// All records in batch order.
    pub fn as_slice(&self) -> &[Detection] {
        &self.detections
    }

    /// Flattens to a row-major `[batch, top_k, 6]` buffer.
    pub fn to_tensor(&self) -> Vec<f32> {
        self.detections.iter().flat_map(Detection::to_row).collect()
    }
}
