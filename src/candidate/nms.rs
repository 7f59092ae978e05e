//! Class-agnostic non-maximum suppression.

use crate::candidate::detection::{sort_by_confidence_desc, Detection};

/// Applies greedy NMS across all classes jointly.
///
/// Detections are visited in descending confidence (ties keep input order).
/// Each visited detection is kept unless a previously kept one overlaps it
/// with IoU above `iou_threshold`, in which case it is suppressed. Boxes of
/// different classes suppress each other. At most `max_output` detections
/// are returned, highest confidence first.
pub fn nms_class_agnostic(
    detections: &[Detection],
    iou_threshold: f32,
    max_output: usize,
) -> Vec<Detection> {
    if detections.is_empty() || max_output == 0 {
        return Vec::new();
    }

    let mut sorted = detections.to_vec();
    sort_by_confidence_desc(&mut sorted);

    let mut kept: Vec<Detection> = Vec::with_capacity(max_output.min(sorted.len()));
    'outer: for det in sorted {
        for kept_det in kept.iter() {
            if kept_det.iou(&det) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(det);
        if kept.len() == max_output {
            break;
        }
    }

    kept
}
