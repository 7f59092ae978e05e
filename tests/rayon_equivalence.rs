#![cfg(feature = "rayon")]

use detdecode::{DecodeConfig, Decoder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CHANNELS: usize = 6 + 12;

fn make_predictions(batch: usize, n_boxes: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut data = Vec::with_capacity(batch * n_boxes * CHANNELS);
    for _ in 0..batch * n_boxes {
        for _ in 0..6 {
            data.push(rng.random_range(0.0f32..1.0));
        }
        for _ in 0..4 {
            data.push(rng.random_range(-1.0f32..1.0));
        }
        data.push(rng.random_range(0.0f32..1.0));
        data.push(rng.random_range(0.0f32..1.0));
        data.push(rng.random_range(0.05f32..0.3));
        data.push(rng.random_range(0.05f32..0.3));
        data.extend_from_slice(&[0.1, 0.1, 0.2, 0.2]);
    }
    data
}

#[test]
fn parallel_matches_sequential() {
    let batch = 6;
    let n_boxes = 3000;
    let data = make_predictions(batch, n_boxes);

    let base = DecodeConfig {
        confidence_thresh: 0.5,
        top_k: 100,
        ..DecodeConfig::for_image(300.0, 300.0)
    };
    let seq = Decoder::new(DecodeConfig {
        parallel: false,
        ..base.clone()
    })
    .unwrap();
    let par = Decoder::new(DecodeConfig {
        parallel: true,
        ..base
    })
    .unwrap();

    let seq_out = seq.decode_flat(&data, batch, n_boxes, CHANNELS).unwrap();
    let par_out = par.decode_flat(&data, batch, n_boxes, CHANNELS).unwrap();

    assert_eq!(seq_out.shape(), [batch, 100, 6]);
    assert_eq!(seq_out, par_out);
    for idx in 0..batch {
        assert!(seq_out.real_detections(idx).count() > 0);
    }
}

#[test]
fn decoder_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Decoder>();
}
