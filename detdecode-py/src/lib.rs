//! Python bindings for the detdecode SSD detection decoder.
//!
//! Exposes the batch decoder to Python via PyO3, taking and returning numpy
//! arrays shaped like the Keras decode layer it replaces.

use numpy::{PyArray1, PyArray3, PyArrayMethods, PyReadonlyArray3, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use detdecode::{
    BoxEncoding, DecodeConfig as RustDecodeConfig, DecodeError, Decoder as RustDecoder,
};

/// Convert a DecodeError to a Python exception.
fn to_py_err(err: DecodeError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_coords(coords: &str) -> PyResult<BoxEncoding> {
    match coords.to_lowercase().as_str() {
        "centroids" => Ok(BoxEncoding::Centroids),
        "minmax" => Ok(BoxEncoding::MinMax),
        "corners" => Ok(BoxEncoding::Corners),
        _ => Err(PyValueError::new_err(
            "coords must be 'centroids', 'minmax' or 'corners'",
        )),
    }
}

/// Decoder configuration.
#[pyclass]
#[derive(Clone)]
pub struct DecodeConfig {
    inner: RustDecodeConfig,
}

#[pymethods]
impl DecodeConfig {
    /// Create a new DecodeConfig.
    ///
    /// Args:
    ///     confidence_thresh: Minimum confidence to keep a box (default: 0.01)
    ///     iou_threshold: NMS overlap cutoff (default: 0.45)
    ///     top_k: Detections per image in the output (default: 200)
    ///     nms_max_output_size: Maximum NMS survivors per image (default: 400)
    ///     coords: Anchor encoding, only "centroids" decodes (default: "centroids")
    ///     normalize_coords: Scale boxes by the image size (default: True)
    ///     img_height: Image height, required when normalizing
    ///     img_width: Image width, required when normalizing
    ///     parallel: Decode images in parallel (default: False)
    #[new]
    #[pyo3(signature = (
        confidence_thresh = 0.01,
        iou_threshold = 0.45,
        top_k = 200,
        nms_max_output_size = 400,
        coords = "centroids",
        normalize_coords = true,
        img_height = None,
        img_width = None,
        parallel = false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        confidence_thresh: f32,
        iou_threshold: f32,
        top_k: usize,
        nms_max_output_size: usize,
        coords: &str,
        normalize_coords: bool,
        img_height: Option<f32>,
        img_width: Option<f32>,
        parallel: bool,
    ) -> PyResult<Self> {
        let inner = RustDecodeConfig {
            confidence_thresh,
            iou_threshold,
            top_k,
            nms_max_output_size,
            coords: parse_coords(coords)?,
            normalize_coords,
            img_height,
            img_width,
            parallel,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Validate the configuration.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    #[getter]
    fn top_k(&self) -> usize {
        self.inner.top_k
    }

    fn __repr__(&self) -> String {
        format!(
            "DecodeConfig(confidence_thresh={}, iou_threshold={}, top_k={}, nms_max_output_size={}, coords='{}', normalize_coords={}, img_height={:?}, img_width={:?}, parallel={})",
            self.inner.confidence_thresh,
            self.inner.iou_threshold,
            self.inner.top_k,
            self.inner.nms_max_output_size,
            self.inner.coords.as_str(),
            self.inner.normalize_coords,
            self.inner.img_height,
            self.inner.img_width,
            self.inner.parallel
        )
    }
}

/// Batch decoder turning raw predictions into fixed-size detection lists.
#[pyclass]
pub struct Decoder {
    inner: RustDecoder,
}

impl Decoder {
    fn run<'py>(
        &self,
        py: Python<'py>,
        y_pred: PyReadonlyArray3<'py, f32>,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let shape = y_pred.shape();
        let (batch, n_boxes, channels) = (shape[0], shape[1], shape[2]);
        let data = y_pred.as_slice()?;

        let out = self
            .inner
            .decode_flat(data, batch, n_boxes, channels)
            .map_err(to_py_err)?;
        let [batch, top_k, fields] = out.shape();
        PyArray1::from_vec(py, out.to_tensor()).reshape([batch, top_k, fields])
    }
}

#[pymethods]
impl Decoder {
    /// Create a decoder.
    ///
    /// Args:
    ///     config: DecodeConfig (default: DecodeConfig(), which requires
    ///         img_height and img_width)
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<DecodeConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let inner = RustDecoder::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Decode a batch of raw predictions.
    ///
    /// Args:
    ///     y_pred: float32 array shaped (batch, n_boxes, n_classes + 12)
    ///
    /// Returns:
    ///     float32 array shaped (batch, top_k, 6) with rows
    ///     [class_id, confidence, xmin, ymin, xmax, ymax]
    fn decode<'py>(
        &self,
        py: Python<'py>,
        y_pred: PyReadonlyArray3<'py, f32>,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        self.run(py, y_pred)
    }

    /// Output shape for an input shape (batch, n_boxes, channels).
    fn output_shape(&self, input_shape: (usize, usize, usize)) -> (usize, usize, usize) {
        let [batch, top_k, fields] = self
            .inner
            .output_shape([input_shape.0, input_shape.1, input_shape.2]);
        (batch, top_k, fields)
    }

    #[getter]
    fn config(&self) -> DecodeConfig {
        DecodeConfig {
            inner: self.inner.config().clone(),
        }
    }

    fn __repr__(&self) -> String {
        format!("Decoder(top_k={})", self.inner.config().top_k)
    }
}

/// Convenience function decoding a batch in a single call.
///
/// For repeated calls with the same settings, build a Decoder once.
///
/// Args:
///     y_pred: float32 array shaped (batch, n_boxes, n_classes + 12)
///     img_height: Image height used to scale boxes
///     img_width: Image width used to scale boxes
///     confidence_thresh: Minimum confidence to keep a box (default: 0.01)
///     iou_threshold: NMS overlap cutoff (default: 0.45)
///     top_k: Detections per image (default: 200)
///
/// Returns:
///     float32 array shaped (batch, top_k, 6)
#[pyfunction]
#[pyo3(signature = (
    y_pred,
    img_height,
    img_width,
    confidence_thresh = 0.01,
    iou_threshold = 0.45,
    top_k = 200
))]
fn decode_detections<'py>(
    py: Python<'py>,
    y_pred: PyReadonlyArray3<'py, f32>,
    img_height: f32,
    img_width: f32,
    confidence_thresh: f32,
    iou_threshold: f32,
    top_k: usize,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    let cfg = RustDecodeConfig {
        confidence_thresh,
        iou_threshold,
        top_k,
        ..RustDecodeConfig::for_image(img_height, img_width)
    };
    let decoder = Decoder {
        inner: RustDecoder::new(cfg).map_err(to_py_err)?,
    };
    decoder.run(py, y_pred)
}

/// Python module for detdecode.
#[pymodule]
fn _detdecode(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<DecodeConfig>()?;
    m.add_class::<Decoder>()?;
    m.add_function(wrap_pyfunction!(decode_detections, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
