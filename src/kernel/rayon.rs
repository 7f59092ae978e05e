//! Rayon-parallel candidate decoding (feature-gated).
//!
//! Splits an image's anchors into fixed-size chunks, decodes and filters each
//! chunk on the rayon pool and concatenates the results in anchor order, so
//! the output is identical to [`decode_candidates`].

use crate::candidate::detection::Detection;
use crate::decode::CoordScale;
use crate::kernel::{decode_candidates, DecodeKernel};
use crate::tensor::ChannelLayout;
use rayon::prelude::*;

/// Anchors decoded per parallel task.
const ANCHORS_PER_CHUNK: usize = 1024;

/// Anchor-parallel variant of [`decode_candidates`].
pub fn decode_candidates_par<K: DecodeKernel>(
    rows: &[f32],
    layout: ChannelLayout,
    scale: CoordScale,
    confidence_thresh: f32,
) -> Vec<Detection> {
    let chunk_len = layout.channels() * ANCHORS_PER_CHUNK;
    if rows.len() <= chunk_len {
        return decode_candidates::<K>(rows, layout, scale, confidence_thresh);
    }

    let chunks: Vec<Vec<Detection>> = rows
        .par_chunks(chunk_len)
        .map(|chunk| decode_candidates::<K>(chunk, layout, scale, confidence_thresh))
        .collect();

    let total = chunks.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    for chunk in chunks {
        out.extend(chunk);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::decode_candidates_par;
    use crate::decode::CoordScale;
    use crate::kernel::decode_candidates;
    use crate::kernel::scalar::ScalarKernel;
    use crate::tensor::ChannelLayout;

    #[test]
    fn parallel_scan_preserves_anchor_order() {
        let layout = ChannelLayout::with_classes(2).unwrap();
        let n = 5000;
        let mut rows = Vec::with_capacity(n * layout.channels());
        for i in 0..n {
            let conf = ((i * 37) % 100) as f32 / 100.0;
            rows.extend_from_slice(&[1.0 - conf, conf]);
            rows.extend_from_slice(&[0.0, 0.0, 0.0, 0.0, i as f32, 0.5, 0.1, 0.1]);
            rows.extend_from_slice(&[0.1, 0.1, 0.2, 0.2]);
        }
        let seq = decode_candidates::<ScalarKernel>(&rows, layout, CoordScale::IDENTITY, 0.3);
        let par = decode_candidates_par::<ScalarKernel>(&rows, layout, CoordScale::IDENTITY, 0.3);
        assert!(!seq.is_empty());
        assert_eq!(seq, par);
    }
}
