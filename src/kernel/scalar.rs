//! Scalar decode kernel.

use crate::candidate::detection::Detection;
use crate::decode::CoordScale;
use crate::kernel::DecodeKernel;
use crate::tensor::ChannelLayout;
use crate::util::math::{argmax_first, centroids_to_corners};

/// Baseline kernel decoding one anchor at a time.
pub struct ScalarKernel;

/// Decodes the twelve geometry channels `[Δ.., anchor.., variance..]` to
/// scaled `(xmin, ymin, xmax, ymax)`.
#[inline]
pub(crate) fn decode_geometry(geom: &[f32], scale: CoordScale) -> [f32; 4] {
    let (dcx, dcy, dw, dh) = (geom[0], geom[1], geom[2], geom[3]);
    let (acx, acy, aw, ah) = (geom[4], geom[5], geom[6], geom[7]);
    let (vcx, vcy, vw, vh) = (geom[8], geom[9], geom[10], geom[11]);

    let cx = dcx * vcx * aw + acx;
    let cy = dcy * vcy * ah + acy;
    let w = (dw * vw).exp() * aw;
    let h = (dh * vh).exp() * ah;

    let [xmin, ymin, xmax, ymax] = centroids_to_corners(cx, cy, w, h);
    [xmin * scale.x, ymin * scale.y, xmax * scale.x, ymax * scale.y]
}

impl DecodeKernel for ScalarKernel {
    fn decode_row(row: &[f32], layout: ChannelLayout, scale: CoordScale) -> Detection {
        let (class_id, confidence) = argmax_first(&row[..layout.n_classes()]);
        let [xmin, ymin, xmax, ymax] =
            decode_geometry(&row[layout.offsets()..layout.channels()], scale);
        Detection {
            class_id,
            confidence,
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }
}
