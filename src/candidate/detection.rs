//! Decoded detection record.

use std::cmp::Ordering;

/// A decoded box: `[class_id, confidence, xmin, ymin, xmax, ymax]`.
///
/// Coordinates are corner coordinates, either relative to the image or
/// scaled to pixels depending on the decoder configuration. Inverted boxes
/// (`xmin > xmax`) produced by malformed anchors are kept as decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Detection {
    /// Predicted class index; 0 is background.
    pub class_id: usize,
    /// Score of the predicted class.
    pub confidence: f32,
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl Detection {
    /// All-zero record used to pad a detection list to `top_k` entries.
    pub const PADDING: Detection = Detection {
        class_id: 0,
        confidence: 0.0,
        xmin: 0.0,
        ymin: 0.0,
        xmax: 0.0,
        ymax: 0.0,
    };

    /// Returns true for padding slots (`class_id == 0 && confidence == 0`).
    pub fn is_padding(&self) -> bool {
        self.class_id == 0 && self.confidence == 0.0
    }

    /// Returns the record in output tensor layout.
    pub fn to_row(&self) -> [f32; 6] {
        [
            self.class_id as f32,
            self.confidence,
            self.xmin,
            self.ymin,
            self.xmax,
            self.ymax,
        ]
    }

    /// Builds a record from output tensor layout.
    ///
    /// Negative or fractional class values truncate toward zero.
    pub fn from_row(row: [f32; 6]) -> Self {
        Self {
            class_id: row[0].max(0.0) as usize,
            confidence: row[1],
            xmin: row[2],
            ymin: row[3],
            xmax: row[4],
            ymax: row[5],
        }
    }

    /// Corners with each axis ordered, as `(xmin, ymin, xmax, ymax)`.
    fn canonical(&self) -> [f32; 4] {
        [
            self.xmin.min(self.xmax),
            self.ymin.min(self.ymax),
            self.xmin.max(self.xmax),
            self.ymin.max(self.ymax),
        ]
    }

    /// Area of the box with its corners ordered per axis.
    pub fn area(&self) -> f32 {
        let [x0, y0, x1, y1] = self.canonical();
        (x1 - x0) * (y1 - y0)
    }

    /// Intersection over union with `other`.
    ///
    /// Boxes with non-positive area have IoU 0 with everything.
    pub fn iou(&self, other: &Detection) -> f32 {
        let area_a = self.area();
        let area_b = other.area();
        if !(area_a > 0.0 && area_b > 0.0) {
            return 0.0;
        }
        let [ax0, ay0, ax1, ay1] = self.canonical();
        let [bx0, by0, bx1, by1] = other.canonical();
        let iw = (ax1.min(bx1) - ax0.max(bx0)).max(0.0);
        let ih = (ay1.min(by1) - ay0.max(by0)).max(0.0);
        let inter = iw * ih;
        inter / (area_a + area_b - inter)
    }
}

fn confidence_cmp_desc(a: &Detection, b: &Detection) -> Ordering {
    b.confidence.total_cmp(&a.confidence)
}

/// Stable sort by descending confidence; equal confidences keep input order.
pub(crate) fn sort_by_confidence_desc(detections: &mut [Detection]) {
    detections.sort_by(confidence_cmp_desc);
}

#[cfg(test)]
mod tests {
    use super::{sort_by_confidence_desc, Detection};

    fn boxed(confidence: f32, corners: [f32; 4]) -> Detection {
        Detection {
            class_id: 1,
            confidence,
            xmin: corners[0],
            ymin: corners[1],
            xmax: corners[2],
            ymax: corners[3],
        }
    }

    #[test]
    fn iou_of_half_overlap() {
        let a = boxed(0.9, [0.0, 0.0, 2.0, 2.0]);
        let b = boxed(0.8, [1.0, 0.0, 3.0, 2.0]);
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_area_box_never_overlaps() {
        let a = boxed(0.9, [0.0, 0.0, 2.0, 2.0]);
        let flat = boxed(0.8, [0.0, 1.0, 2.0, 1.0]);
        assert_eq!(a.iou(&flat), 0.0);
        assert_eq!(flat.iou(&flat), 0.0);
    }

    #[test]
    fn inverted_box_overlaps_like_its_upright_twin() {
        let upright = boxed(0.9, [0.0, 0.0, 2.0, 2.0]);
        let inverted = boxed(0.8, [2.0, 2.0, 0.0, 0.0]);
        assert!((upright.iou(&inverted) - 1.0).abs() < 1e-6);
        assert!((inverted.area() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn padding_round_trips_through_rows() {
        assert!(Detection::PADDING.is_padding());
        assert_eq!(Detection::PADDING.to_row(), [0.0; 6]);
        let det = boxed(0.5, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(Detection::from_row(det.to_row()), det);
        assert!(!det.is_padding());
    }

    #[test]
    fn sort_keeps_ties_in_input_order() {
        let mut dets = vec![
            boxed(0.5, [0.0; 4]),
            Detection {
                class_id: 2,
                ..boxed(0.9, [0.0; 4])
            },
            Detection {
                class_id: 3,
                ..boxed(0.5, [0.0; 4])
            },
        ];
        sort_by_confidence_desc(&mut dets);
        let classes: Vec<_> = dets.iter().map(|d| d.class_id).collect();
        assert_eq!(classes, vec![2, 1, 3]);
    }
}
