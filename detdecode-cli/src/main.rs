use clap::Parser;
use detdecode::tensor::GEOMETRY_CHANNELS;
use detdecode::{BoxEncoding, DecodeConfig, Decoder, Detection, PredictionView};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "SSD detection decoder CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BoxEncodingConfig {
    Centroids,
    #[serde(rename = "minmax")]
    MinMax,
    Corners,
}

impl From<BoxEncodingConfig> for BoxEncoding {
    fn from(value: BoxEncodingConfig) -> Self {
        match value {
            BoxEncodingConfig::Centroids => BoxEncoding::Centroids,
            BoxEncodingConfig::MinMax => BoxEncoding::MinMax,
            BoxEncodingConfig::Corners => BoxEncoding::Corners,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DecodeConfigJson {
    confidence_thresh: f32,
    iou_threshold: f32,
    top_k: usize,
    nms_max_output_size: usize,
    coords: BoxEncodingConfig,
    normalize_coords: bool,
    img_height: Option<f32>,
    img_width: Option<f32>,
    parallel: bool,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            confidence_thresh: cfg.confidence_thresh,
            iou_threshold: cfg.iou_threshold,
            top_k: cfg.top_k,
            nms_max_output_size: cfg.nms_max_output_size,
            coords: BoxEncodingConfig::Centroids,
            normalize_coords: cfg.normalize_coords,
            img_height: cfg.img_height,
            img_width: cfg.img_width,
            parallel: cfg.parallel,
        }
    }
}

impl From<DecodeConfigJson> for DecodeConfig {
    fn from(value: DecodeConfigJson) -> Self {
        Self {
            confidence_thresh: value.confidence_thresh,
            iou_threshold: value.iou_threshold,
            top_k: value.top_k,
            nms_max_output_size: value.nms_max_output_size,
            coords: value.coords.into(),
            normalize_coords: value.normalize_coords,
            img_height: value.img_height,
            img_width: value.img_width,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    predictions_path: String,
    output_path: Option<String>,
    drop_padding: bool,
    decode: DecodeConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            predictions_path: String::new(),
            output_path: None,
            drop_padding: false,
            decode: DecodeConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    class_id: usize,
    confidence: f32,
    xmin: f32,
    ymin: f32,
    xmax: f32,
    ymax: f32,
}

impl From<&Detection> for DetectionRecord {
    fn from(value: &Detection) -> Self {
        Self {
            class_id: value.class_id,
            confidence: value.confidence,
            xmin: value.xmin,
            ymin: value.ymin,
            xmax: value.xmax,
            ymax: value.ymax,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    shape: [usize; 3],
    images: Vec<Vec<DetectionRecord>>,
}

/// Flattens a nested `[batch][n_boxes][channels]` array.
fn flatten_predictions(
    nested: Vec<Vec<Vec<f32>>>,
) -> Result<(Vec<f32>, [usize; 3]), Box<dyn std::error::Error>> {
    let batch = nested.len();
    let n_boxes = nested.first().map_or(0, Vec::len);
    // Without anchors the row width is unknown; any valid width decodes to padding.
    let channels = nested
        .first()
        .and_then(|image| image.first())
        .map_or(GEOMETRY_CHANNELS + 1, Vec::len);

    let mut data = Vec::with_capacity(batch * n_boxes * channels);
    for (idx, image) in nested.into_iter().enumerate() {
        if image.len() != n_boxes {
            return Err(format!(
                "image {idx} has {} anchors, expected {n_boxes}",
                image.len()
            )
            .into());
        }
        for row in image {
            if row.len() != channels {
                return Err(format!(
                    "image {idx} has a row of {} values, expected {channels}",
                    row.len()
                )
                .into());
            }
            data.extend(row);
        }
    }
    Ok((data, [batch, n_boxes, channels]))
}

/// Decodes a nested prediction array into the JSON output records.
fn decode_predictions(
    decoder: &Decoder,
    nested: Vec<Vec<Vec<f32>>>,
    drop_padding: bool,
) -> Result<Output, Box<dyn std::error::Error>> {
    let (data, [batch, n_boxes, channels]) = flatten_predictions(nested)?;
    tracing::info!(batch, n_boxes, channels, "loaded predictions");

    let view = PredictionView::new(&data, batch, n_boxes, channels)?;
    let detections = decoder.decode_batch(view)?;

    let images = detections
        .images()
        .map(|image| {
            image
                .iter()
                .filter(|det| !(drop_padding && det.is_padding()))
                .map(DetectionRecord::from)
                .collect::<Vec<_>>()
        })
        .collect();
    Ok(Output {
        shape: decoder.output_shape(view.shape()),
        images,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("detdecode=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.predictions_path.is_empty() {
        return Err("predictions_path must be set in the config".into());
    }

    let decoder = Decoder::new(config.decode.into())?;

    let predictions_text = fs::read_to_string(&config.predictions_path)?;
    let nested: Vec<Vec<Vec<f32>>> = serde_json::from_str(&predictions_text)?;
    let output = decode_predictions(&decoder, nested, config.drop_padding)?;
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
