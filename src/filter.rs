//! Per-image detection filter.
//!
//! Reduces all decoded anchors of one image to exactly `top_k` records in
//! four stages: positive-box selection, confidence thresholding,
//! class-agnostic NMS and Top-K selection with zero padding. Empty
//! intermediate results are ordinary branches and end as all-padding output.

use crate::candidate::detection::Detection;
use crate::candidate::nms::nms_class_agnostic;
use crate::candidate::topk::top_k_padded;
use crate::trace::trace_stage;

/// True for a non-background detection with `confidence > confidence_thresh`.
#[inline]
pub(crate) fn is_candidate(det: &Detection, confidence_thresh: f32) -> bool {
    det.class_id != 0 && det.confidence > confidence_thresh
}

/// Stage A: drops detections predicted as background (class 0).
pub fn select_positive(detections: &[Detection]) -> Vec<Detection> {
    detections
        .iter()
        .filter(|det| det.class_id != 0)
        .copied()
        .collect()
}

/// Stage B: keeps detections with `confidence > confidence_thresh`.
pub fn threshold_confidence(detections: &[Detection], confidence_thresh: f32) -> Vec<Detection> {
    detections
        .iter()
        .filter(|det| det.confidence > confidence_thresh)
        .copied()
        .collect()
}

/// Filter parameters applied independently to every image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageFilter {
    pub confidence_thresh: f32,
    pub iou_threshold: f32,
    pub top_k: usize,
    pub nms_max_output_size: usize,
}

impl ImageFilter {
    /// Runs all four stages over one image's decoded anchors.
    pub fn filter_image(&self, detections: &[Detection]) -> Vec<Detection> {
        let positive = select_positive(detections);
        let confident = threshold_confidence(&positive, self.confidence_thresh);
        trace_stage!(
            "image_candidates",
            positive = positive.len(),
            confident = confident.len()
        );
        self.suppress_and_select(confident)
    }

    /// Runs NMS and Top-K over detections that already passed stages A and B.
    pub fn suppress_and_select(&self, candidates: Vec<Detection>) -> Vec<Detection> {
        if candidates.is_empty() {
            return vec![Detection::PADDING; self.top_k];
        }
        let survivors =
            nms_class_agnostic(&candidates, self.iou_threshold, self.nms_max_output_size);
        trace_stage!(
            "image_nms",
            candidates = candidates.len(),
            survivors = survivors.len()
        );
        top_k_padded(survivors, self.top_k)
    }
}
