use detdecode::lowlevel::{decode_candidates, ScalarKernel};
use detdecode::{CoordScale, DecodeConfig, Decoder, PredictionView};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// Anchors of an SSD300 head.
const N_BOXES: usize = 8732;
/// 20 VOC classes plus background.
const N_CLASSES: usize = 21;
const CHANNELS: usize = N_CLASSES + 12;

fn make_predictions(batch: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(batch * N_BOXES * CHANNELS);
    for b in 0..batch {
        for i in 0..N_BOXES {
            let seed = (i * 31 + b * 17) % 97;
            for c in 0..N_CLASSES {
                let score = if c == seed % N_CLASSES { 0.6 } else { 0.02 };
                data.push(if seed % 5 == 0 && c == 0 { 0.9 } else { score });
            }
            let t = i as f32;
            data.extend_from_slice(&[
                (t * 0.13).sin(),
                (t * 0.07).cos(),
                0.3 * (t * 0.05).sin(),
                0.3 * (t * 0.03).cos(),
                ((i % 38) as f32 + 0.5) / 38.0,
                ((i / 38 % 38) as f32 + 0.5) / 38.0,
                0.1,
                0.1,
                0.1,
                0.1,
                0.2,
                0.2,
            ]);
        }
    }
    data
}

fn bench_decoder(c: &mut Criterion) {
    let batch = 8;
    let data = make_predictions(batch);
    let view = PredictionView::new(&data, batch, N_BOXES, CHANNELS).unwrap();

    let decoder = Decoder::new(DecodeConfig::for_image(300.0, 300.0)).unwrap();
    c.bench_function("decode_batch_ssd300_b8", |b| {
        b.iter(|| black_box(decoder.decode_batch(view).unwrap()));
    });

    let image = view.image(0).unwrap();
    c.bench_function("decode_candidates_scalar", |b| {
        b.iter(|| {
            black_box(decode_candidates::<ScalarKernel>(
                image,
                view.layout(),
                CoordScale::IDENTITY,
                0.01,
            ))
        });
    });

    if cfg!(feature = "rayon") {
        let decoder_par = Decoder::new(DecodeConfig {
            parallel: true,
            ..DecodeConfig::for_image(300.0, 300.0)
        })
        .unwrap();
        c.bench_function("decode_batch_ssd300_b8_parallel", |b| {
            b.iter(|| black_box(decoder_par.decode_batch(view).unwrap()));
        });
    }
}

criterion_group!(benches, bench_decoder);
criterion_main!(benches);
