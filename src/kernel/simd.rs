//! SIMD-accelerated decode kernel using the `wide` crate.
//!
//! Geometry for eight anchors is gathered column-wise into `f32x8` lanes and
//! decoded together. Class argmax stays scalar. Rows left over after the last
//! full block go through the scalar path.

use crate::candidate::detection::Detection;
use crate::decode::CoordScale;
use crate::kernel::scalar::ScalarKernel;
use crate::kernel::DecodeKernel;
use crate::tensor::ChannelLayout;
use crate::util::math::argmax_first;
use wide::f32x8;

const LANES: usize = 8;

/// Gathers geometry channel `channel` of eight consecutive rows.
#[inline]
fn gather(block: &[f32], stride: usize, channel: usize) -> f32x8 {
    let mut lanes = [0.0f32; LANES];
    for (lane, value) in lanes.iter_mut().enumerate() {
        *value = block[lane * stride + channel];
    }
    f32x8::from(lanes)
}

/// Kernel decoding anchors eight at a time.
pub struct SimdKernel;

impl SimdKernel {
    fn decode_block(
        block: &[f32],
        layout: ChannelLayout,
        scale: CoordScale,
        out: &mut Vec<Detection>,
    ) {
        let stride = layout.channels();
        let off = layout.offsets();
        let anchor = layout.anchor();
        let var = layout.variances();

        let dcx = gather(block, stride, off);
        let dcy = gather(block, stride, off + 1);
        let dw = gather(block, stride, off + 2);
        let dh = gather(block, stride, off + 3);
        let acx = gather(block, stride, anchor);
        let acy = gather(block, stride, anchor + 1);
        let aw = gather(block, stride, anchor + 2);
        let ah = gather(block, stride, anchor + 3);
        let vcx = gather(block, stride, var);
        let vcy = gather(block, stride, var + 1);
        let vw = gather(block, stride, var + 2);
        let vh = gather(block, stride, var + 3);

        let cx = dcx * vcx * aw + acx;
        let cy = dcy * vcy * ah + acy;
        let half_w = (dw * vw).exp() * aw * f32x8::splat(0.5);
        let half_h = (dh * vh).exp() * ah * f32x8::splat(0.5);

        let sx = f32x8::splat(scale.x);
        let sy = f32x8::splat(scale.y);
        let xmin = ((cx - half_w) * sx).to_array();
        let ymin = ((cy - half_h) * sy).to_array();
        let xmax = ((cx + half_w) * sx).to_array();
        let ymax = ((cy + half_h) * sy).to_array();

        for lane in 0..LANES {
            let row = &block[lane * stride..(lane + 1) * stride];
            let (class_id, confidence) = argmax_first(&row[..layout.n_classes()]);
            out.push(Detection {
                class_id,
                confidence,
                xmin: xmin[lane],
                ymin: ymin[lane],
                xmax: xmax[lane],
                ymax: ymax[lane],
            });
        }
    }
}

impl DecodeKernel for SimdKernel {
    fn decode_row(row: &[f32], layout: ChannelLayout, scale: CoordScale) -> Detection {
        ScalarKernel::decode_row(row, layout, scale)
    }

    fn decode_rows_into(
        rows: &[f32],
        layout: ChannelLayout,
        scale: CoordScale,
        out: &mut Vec<Detection>,
    ) {
        let stride = layout.channels();
        out.reserve(rows.len() / stride);

        let mut blocks = rows.chunks_exact(stride * LANES);
        for block in blocks.by_ref() {
            Self::decode_block(block, layout, scale, out);
        }
        for row in blocks.remainder().chunks_exact(stride) {
            out.push(ScalarKernel::decode_row(row, layout, scale));
        }
    }
}
