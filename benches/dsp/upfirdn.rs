//! Benchmarks for the polyphase resampling engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sampler_dsp::dsp::{InputSchedule, Resampler, UpFirDown};

use crate::BLOCK_SIZES;

const RATES: &[(u32, u32)] = &[(2, 1), (1, 2), (3, 2), (4, 3), (4, 1)];

pub fn bench_upfirdn(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/upfirdn");

    for &size in BLOCK_SIZES {
        // Bypass copy as the floor
        let mut engine = UpFirDown::new(1, 1, size, &[1.0]).unwrap();
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.01).sin()).collect();
        group.bench_with_input(BenchmarkId::new("bypass", size), &size, |b, _| {
            b.iter(|| {
                black_box(engine.apply(black_box(&input)));
            })
        });

        for &(up, down) in RATES {
            let mut resampler = Resampler::new(up, down, size).unwrap();
            let mut schedule = InputSchedule::new(resampler.input_lengths(size)).unwrap();
            let input: Vec<f32> = (0..resampler.max_input_len())
                .map(|i| (i as f32 * 0.01).sin())
                .collect();

            let name = format!("{up}:{down}");
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let len = schedule.next_len();
                    black_box(resampler.apply(black_box(&input[..len])));
                })
            });
        }
    }

    group.finish();
}
