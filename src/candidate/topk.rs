//! Fixed-size Top-K selection with zero padding.

use crate::candidate::detection::{sort_by_confidence_desc, Detection};

/// Returns exactly `k` detections in descending confidence.
///
/// With at least `k` inputs the `k` most confident are kept. Otherwise the
/// list is padded with [`Detection::PADDING`] up to `k` before sorting, so
/// detections with positive confidence precede the padding.
pub fn top_k_padded(mut detections: Vec<Detection>, k: usize) -> Vec<Detection> {
    if detections.len() < k {
        detections.resize(k, Detection::PADDING);
    }
    sort_by_confidence_desc(&mut detections);
    detections.truncate(k);
    detections
}

#[cfg(test)]
mod tests {
    use super::top_k_padded;
    use crate::candidate::detection::Detection;

    fn det(confidence: f32) -> Detection {
        Detection {
            class_id: 1,
            confidence,
            xmin: 1.0,
            ymin: 1.0,
            xmax: 2.0,
            ymax: 2.0,
        }
    }

    #[test]
    fn pads_short_lists() {
        let out = top_k_padded(vec![det(0.3), det(0.8)], 4);
        assert_eq!(out.len(), 4);
        assert!((out[0].confidence - 0.8).abs() < 1e-6);
        assert!((out[1].confidence - 0.3).abs() < 1e-6);
        assert!(out[2].is_padding() && out[3].is_padding());
    }

    #[test]
    fn truncates_long_lists() {
        let out = top_k_padded((1..=6).map(|i| det(i as f32 / 10.0)).collect(), 3);
        let confs: Vec<f32> = out.iter().map(|d| d.confidence).collect();
        assert_eq!(confs, vec![0.6, 0.5, 0.4]);
    }

    #[test]
    fn empty_input_is_all_padding() {
        let out = top_k_padded(Vec::new(), 5);
        assert_eq!(out, vec![Detection::PADDING; 5]);
    }
}
