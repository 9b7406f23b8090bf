//! Benchmarks for the sample envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sampler_dsp::dsp::{Adsr, Envelope};

use crate::BLOCK_SIZES;

// Long enough that no phase runs out while measuring
const SOURCE_LEN: usize = usize::MAX / 2;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::new(48_000);
        env.set_adsr(Adsr::new(1.0e6, 0.1, 0.7, 0.3), SOURCE_LEN);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), SOURCE_LEN);
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::new(48_000);
        env.set_adsr(Adsr::new(0.0, 0.0, 0.7, 0.0), SOURCE_LEN);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), SOURCE_LEN);
            })
        });

        // Fadeout after note-off
        let mut env = Envelope::new(48_000);
        env.set_adsr(Adsr::new(0.0, 0.0, 0.7, 0.0), SOURCE_LEN);
        env.set_fadeout(1.0e6);
        env.note_on();
        env.render(&mut buffer, SOURCE_LEN);
        env.note_off();
        group.bench_with_input(BenchmarkId::new("fadeout", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), SOURCE_LEN);
            })
        });
    }

    group.finish();
}
