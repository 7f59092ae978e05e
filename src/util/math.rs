//! Numeric helpers shared by the decode kernels.

/// Returns the index and value of the largest score.
///
/// The first index wins ties. An empty slice maps to class 0 with zero
/// confidence, which downstream stages treat as background.
pub(crate) fn argmax_first(scores: &[f32]) -> (usize, f32) {
    let mut best_idx = 0usize;
    let mut best = match scores.first() {
        Some(&value) => value,
        None => return (0, 0.0),
    };
    for (idx, &value) in scores.iter().enumerate().skip(1) {
        if value > best {
            best = value;
            best_idx = idx;
        }
    }
    (best_idx, best)
}

/// Converts a center/size box to `(xmin, ymin, xmax, ymax)`.
#[inline]
pub(crate) fn centroids_to_corners(cx: f32, cy: f32, w: f32, h: f32) -> [f32; 4] {
    let half_w = 0.5 * w;
    let half_h = 0.5 * h;
    [cx - half_w, cy - half_h, cx + half_w, cy + half_h]
}

pub(crate) fn is_positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
