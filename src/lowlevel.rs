//! Low-level building blocks for custom decoding pipelines.
//!
//! These expose the individual filter stages and decode kernels behind
//! [`Decoder`](crate::Decoder). Most users should prefer the top-level
//! `Decoder` and `DecodeConfig` types.

pub use crate::candidate::nms::nms_class_agnostic;
pub use crate::candidate::topk::top_k_padded;
pub use crate::filter::{select_positive, threshold_confidence};
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::decode_candidates_par;
pub use crate::kernel::scalar::ScalarKernel;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::SimdKernel;
pub use crate::kernel::{decode_candidates, DecodeKernel};
