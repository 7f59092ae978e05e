//! Detection records and the per-image candidate filters.
//!
//! Includes the detection record, class-agnostic NMS and fixed-size Top-K
//! selection with zero padding.

pub(crate) mod detection;
pub(crate) mod nms;
pub(crate) mod topk;
