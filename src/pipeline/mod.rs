//! Batch decode-and-filter pipeline.
//!
//! [`Decoder`] validates its [`DecodeConfig`] once and then maps every image
//! of a prediction tensor through box decoding and the per-image filter.
//! Images never interact, so with the `rayon` feature and
//! `DecodeConfig::parallel` they are processed concurrently; output order
//! always follows input order.

mod batch;

pub use batch::DetectionBatch;

use crate::candidate::detection::Detection;
use crate::decode::{BoxDecoder, BoxEncoding};
use crate::filter::ImageFilter;
#[cfg(feature = "rayon")]
use crate::kernel::rayon::decode_candidates_par;
use crate::kernel::{decode_candidates, ActiveKernel};
use crate::tensor::{ChannelLayout, PredictionView};
use crate::trace::{trace_event, trace_span};
use crate::util::{DecodeError, DecodeResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Decoder configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Minimum confidence (exclusive) for a detection to be kept.
    pub confidence_thresh: f32,
    /// IoU above which NMS suppresses the less confident box.
    pub iou_threshold: f32,
    /// Records per image in the output.
    pub top_k: usize,
    /// Maximum NMS survivors per image before Top-K selection.
    pub nms_max_output_size: usize,
    /// Anchor encoding of the predicted geometry.
    pub coords: BoxEncoding,
    /// Scale relative corners by the image size.
    pub normalize_coords: bool,
    pub img_height: Option<f32>,
    pub img_width: Option<f32>,
    /// Process images and anchors on the rayon pool (requires `rayon`).
    pub parallel: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            confidence_thresh: 0.01,
            iou_threshold: 0.45,
            top_k: 200,
            nms_max_output_size: 400,
            coords: BoxEncoding::Centroids,
            normalize_coords: true,
            img_height: None,
            img_width: None,
            parallel: false,
        }
    }
}

impl DecodeConfig {
    /// Default configuration that scales boxes to `img_height × img_width`.
    pub fn for_image(img_height: f32, img_width: f32) -> Self {
        Self {
            img_height: Some(img_height),
            img_width: Some(img_width),
            ..Self::default()
        }
    }

    /// Checks every static parameter.
    pub fn validate(&self) -> DecodeResult<()> {
        self.box_decoder()?;
        if self.top_k == 0 {
            return Err(DecodeError::InvalidConfig("top_k must be at least 1"));
        }
        if self.nms_max_output_size == 0 {
            return Err(DecodeError::InvalidConfig(
                "nms_max_output_size must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(DecodeError::InvalidConfig(
                "iou_threshold must be within [0, 1]",
            ));
        }
        if !self.confidence_thresh.is_finite() {
            return Err(DecodeError::InvalidConfig(
                "confidence_thresh must be finite",
            ));
        }
        Ok(())
    }

    fn box_decoder(&self) -> DecodeResult<BoxDecoder> {
        BoxDecoder::new(
            self.coords,
            self.normalize_coords,
            self.img_height,
            self.img_width,
        )
    }

    fn image_filter(&self) -> ImageFilter {
        ImageFilter {
            confidence_thresh: self.confidence_thresh,
            iou_threshold: self.iou_threshold,
            top_k: self.top_k,
            nms_max_output_size: self.nms_max_output_size,
        }
    }
}

/// Decodes raw SSD predictions into fixed-size detection lists.
#[derive(Clone, Debug)]
pub struct Decoder {
    cfg: DecodeConfig,
    boxes: BoxDecoder,
    filter: ImageFilter,
}

impl Decoder {
    /// Builds a decoder after validating `cfg`.
    pub fn new(cfg: DecodeConfig) -> DecodeResult<Self> {
        cfg.validate()?;
        let boxes = cfg.box_decoder()?;
        let filter = cfg.image_filter();
        Ok(Self { cfg, boxes, filter })
    }

    /// Returns the configuration the decoder was built with.
    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    /// Returns the box decoder stage.
    pub fn box_decoder(&self) -> &BoxDecoder {
        &self.boxes
    }

    /// Returns the per-image filter stage.
    pub fn image_filter(&self) -> &ImageFilter {
        &self.filter
    }

    /// Output shape for an input of shape `[batch, n_boxes, channels]`.
    pub fn output_shape(&self, input_shape: [usize; 3]) -> [usize; 3] {
        [input_shape[0], self.cfg.top_k, 6]
    }

    /// Decodes and filters every image in `predictions`.
    pub fn decode_batch(&self, predictions: PredictionView<'_>) -> DecodeResult<DetectionBatch> {
        let _span = trace_span!(
            "decode_batch",
            batch = predictions.batch(),
            n_boxes = predictions.n_boxes(),
            parallel = self.cfg.parallel
        )
        .entered();

        let layout = predictions.layout();
        let images = self.map_images(predictions, layout);

        trace_event!(
            "batch_detections",
            count = images
                .iter()
                .map(|image| image.iter().filter(|det| !det.is_padding()).count())
                .sum::<usize>()
        );

        Ok(DetectionBatch::from_images(self.cfg.top_k, images))
    }

    /// Decodes a flat `[batch, n_boxes, channels]` buffer.
    pub fn decode_flat(
        &self,
        data: &[f32],
        batch: usize,
        n_boxes: usize,
        channels: usize,
    ) -> DecodeResult<DetectionBatch> {
        let view = PredictionView::new(data, batch, n_boxes, channels)?;
        self.decode_batch(view)
    }

    /// Decodes and filters the anchor rows of a single image.
    ///
    /// Returns exactly `top_k` records.
    pub fn decode_image(&self, rows: &[f32], layout: ChannelLayout) -> Vec<Detection> {
        let candidates = self.candidates(rows, layout);
        self.filter.suppress_and_select(candidates)
    }

    #[cfg(feature = "rayon")]
    fn map_images(
        &self,
        predictions: PredictionView<'_>,
        layout: ChannelLayout,
    ) -> Vec<Vec<Detection>> {
        if self.cfg.parallel {
            let images: Vec<&[f32]> = predictions.images().collect();
            images
                .into_par_iter()
                .map(|rows| self.decode_image(rows, layout))
                .collect()
        } else {
            predictions
                .images()
                .map(|rows| self.decode_image(rows, layout))
                .collect()
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn map_images(
        &self,
        predictions: PredictionView<'_>,
        layout: ChannelLayout,
    ) -> Vec<Vec<Detection>> {
        predictions
            .images()
            .map(|rows| self.decode_image(rows, layout))
            .collect()
    }

    #[cfg(feature = "rayon")]
    fn candidates(&self, rows: &[f32], layout: ChannelLayout) -> Vec<Detection> {
        let scale = self.boxes.scale();
        if self.cfg.parallel {
            decode_candidates_par::<ActiveKernel>(rows, layout, scale, self.cfg.confidence_thresh)
        } else {
            decode_candidates::<ActiveKernel>(rows, layout, scale, self.cfg.confidence_thresh)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn candidates(&self, rows: &[f32], layout: ChannelLayout) -> Vec<Detection> {
        decode_candidates::<ActiveKernel>(
            rows,
            layout,
            self.boxes.scale(),
            self.cfg.confidence_thresh,
        )
    }
}
