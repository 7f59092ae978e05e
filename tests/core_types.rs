use detdecode::{
    BoxDecoder, BoxEncoding, ChannelLayout, DecodeConfig, DecodeError, Decoder, Detection,
    PredictionView,
};

fn anchor_row(
    scores: &[f32],
    offsets: [f32; 4],
    anchor: [f32; 4],
    variances: [f32; 4],
) -> Vec<f32> {
    let mut row = scores.to_vec();
    row.extend_from_slice(&offsets);
    row.extend_from_slice(&anchor);
    row.extend_from_slice(&variances);
    row
}

#[test]
fn decodes_anchor_with_zero_offsets() {
    let decoder = BoxDecoder::new(BoxEncoding::Centroids, false, None, None).unwrap();
    let row = anchor_row(&[0.0, 1.0], [0.0; 4], [10.0, 10.0, 4.0, 4.0], [1.0; 4]);
    let det = decoder.decode_row(&row).unwrap();
    assert_eq!(
        [det.xmin, det.ymin, det.xmax, det.ymax],
        [8.0, 8.0, 12.0, 12.0]
    );
}

#[test]
fn normalizes_relative_corners_to_pixels() {
    let decoder = BoxDecoder::absolute(100.0, 100.0).unwrap();
    // Relative anchor with corners (0.08, 0.08, 0.12, 0.12).
    let row = anchor_row(&[0.0, 1.0], [0.0; 4], [0.1, 0.1, 0.04, 0.04], [1.0; 4]);
    let det = decoder.decode_row(&row).unwrap();
    let expected = [8.0f32, 8.0, 12.0, 12.0];
    for (value, want) in [det.xmin, det.ymin, det.xmax, det.ymax].iter().zip(expected) {
        assert!((value - want).abs() < 1e-4, "{value} vs {want}");
    }
}

#[test]
fn decode_row_rejects_short_rows() {
    let decoder = BoxDecoder::relative();
    let err = decoder.decode_row(&[0.0; 12]).unwrap_err();
    assert_eq!(err, DecodeError::InvalidChannels { channels: 12 });
    assert!(!err.is_config());
}

#[test]
fn inverted_anchor_yields_inverted_box() {
    // Negative anchor sizes are not corrected; the arithmetic is propagated.
    let decoder = BoxDecoder::relative();
    let row = anchor_row(&[0.0, 1.0], [0.0; 4], [0.5, 0.5, -0.2, -0.2], [1.0; 4]);
    let det = decoder.decode_row(&row).unwrap();
    assert!(det.xmin > det.xmax);
    assert!(det.ymin > det.ymax);
    assert!((det.xmin - 0.6).abs() < 1e-6);
    assert!((det.xmax - 0.4).abs() < 1e-6);
}

#[test]
fn view_validates_buffer_length_and_channels() {
    let data = vec![0.0f32; 2 * 4 * 15];
    let view = PredictionView::new(&data, 2, 4, 15).unwrap();
    assert_eq!(view.n_classes(), 3);
    assert_eq!(view.layout(), ChannelLayout::with_classes(3).unwrap());

    assert_eq!(
        PredictionView::new(&data, 2, 4, 14).unwrap_err(),
        DecodeError::BufferSizeMismatch {
            expected: 112,
            got: 120,
        }
    );
    assert_eq!(
        PredictionView::new(&data, 10, 1, 12).unwrap_err(),
        DecodeError::InvalidChannels { channels: 12 }
    );
    assert_eq!(
        PredictionView::new(&data, usize::MAX, 2, 13).unwrap_err(),
        DecodeError::ShapeOverflow {
            batch: usize::MAX,
            n_boxes: 2,
            channels: 13,
        }
    );
}

#[test]
fn config_errors_surface_at_construction() {
    let missing = Decoder::new(DecodeConfig {
        img_height: Some(300.0),
        ..DecodeConfig::default()
    })
    .unwrap_err();
    assert_eq!(
        missing,
        DecodeError::MissingImageSize {
            img_height: Some(300.0),
            img_width: None,
        }
    );

    let encoding = Decoder::new(DecodeConfig {
        coords: BoxEncoding::Corners,
        ..DecodeConfig::for_image(300.0, 300.0)
    })
    .unwrap_err();
    assert_eq!(encoding, DecodeError::UnsupportedEncoding(BoxEncoding::Corners));

    let zero_size = Decoder::new(DecodeConfig::for_image(0.0, 300.0)).unwrap_err();
    assert!(matches!(zero_size, DecodeError::InvalidConfig(_)));

    let relative = Decoder::new(DecodeConfig {
        normalize_coords: false,
        ..DecodeConfig::default()
    });
    assert!(relative.is_ok());
}

#[test]
fn errors_render_readable_messages() {
    let err = DecodeError::UnsupportedEncoding(BoxEncoding::MinMax);
    assert_eq!(
        err.to_string(),
        "unsupported box encoding MinMax, only centroids is supported"
    );
    let err = DecodeError::InvalidConfig("top_k must be at least 1");
    assert_eq!(err.to_string(), "invalid config: top_k must be at least 1");
}

#[test]
fn padding_record_is_all_zeros() {
    assert_eq!(Detection::PADDING.to_row(), [0.0; 6]);
    assert_eq!(Detection::default(), Detection::PADDING);
    assert_eq!(BoxEncoding::default().as_str(), "centroids");
}
