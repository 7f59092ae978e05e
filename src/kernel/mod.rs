//! Decode kernel implementations.
//!
//! Kernels turn packed anchor rows into [`Detection`] records. The scalar
//! kernel is always available; the `simd` feature adds an `f32x8` kernel that
//! decodes eight anchors per step, and the `rayon` feature adds an
//! anchor-parallel candidate scan.

use crate::candidate::detection::Detection;
use crate::decode::CoordScale;
use crate::filter::is_candidate;
use crate::tensor::ChannelLayout;

/// Kernel trait for decoding anchor rows.
pub trait DecodeKernel {
    /// Decodes one row. `row` must hold at least `layout.channels()` values.
    fn decode_row(row: &[f32], layout: ChannelLayout, scale: CoordScale) -> Detection;

    /// Appends one detection per whole row of `rows` to `out`.
    fn decode_rows_into(
        rows: &[f32],
        layout: ChannelLayout,
        scale: CoordScale,
        out: &mut Vec<Detection>,
    ) {
        out.reserve(rows.len() / layout.channels());
        for row in rows.chunks_exact(layout.channels()) {
            out.push(Self::decode_row(row, layout, scale));
        }
    }
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

#[cfg(not(feature = "simd"))]
pub(crate) use scalar::ScalarKernel as ActiveKernel;
#[cfg(feature = "simd")]
pub(crate) use simd::SimdKernel as ActiveKernel;

/// Decodes `rows` and keeps the positive detections above `confidence_thresh`.
///
/// Equivalent to decoding every row and then applying positive-box selection
/// and confidence thresholding, in anchor order.
pub fn decode_candidates<K: DecodeKernel>(
    rows: &[f32],
    layout: ChannelLayout,
    scale: CoordScale,
    confidence_thresh: f32,
) -> Vec<Detection> {
    let mut out = Vec::new();
    K::decode_rows_into(rows, layout, scale, &mut out);
    out.retain(|det| is_candidate(det, confidence_thresh));
    out
}
