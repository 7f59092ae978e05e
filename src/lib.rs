//! detdecode turns raw SSD anchor predictions into final detections.
//!
//! The crate decodes centroid-encoded anchor offsets into corner boxes and
//! reduces each image to a fixed number of detections through confidence
//! thresholding, class-agnostic non-maximum suppression and Top-K selection
//! with zero padding. Optional features add rayon parallelism (`rayon`),
//! `f32x8` decoding (`simd`) and tracing spans (`tracing`).

mod candidate;
pub mod decode;
pub mod filter;
pub mod kernel;
pub mod lowlevel;
pub mod pipeline;
pub mod tensor;
mod trace;
pub mod util;

pub use candidate::detection::Detection;
pub use decode::{BoxDecoder, BoxEncoding, CoordScale};
pub use filter::ImageFilter;
pub use pipeline::{DecodeConfig, Decoder, DetectionBatch};
pub use tensor::{ChannelLayout, PredictionView};
pub use util::{DecodeError, DecodeResult};
