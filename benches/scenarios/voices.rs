//! Benchmarks for sample players and polyphonic mixing.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use rtrb::RingBuffer;
use sampler_dsp::sampler::{SampleBuffer, SampleParams, SamplePlayer};
use sampler_dsp::synth::{SamplerPoly, SynthMessage};

use crate::BLOCK_SIZES;

fn recording(seconds: usize) -> Arc<SampleBuffer> {
    let samples: Vec<f32> = (0..seconds * 48_000)
        .map(|n| 0.5 * (2.0 * std::f32::consts::PI * 220.0 * n as f32 / 48_000.0).sin())
        .collect();
    Arc::new(SampleBuffer::from_f32(&samples, 48_000))
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let buffer = recording(10);
    let params = SampleParams {
        attack: 0.005,
        decay: 0.1,
        sustain: 0.7,
        release: 0.3,
        lo_key: 0,
        hi_key: 127,
        lo_vel: 0,
        hi_vel: 127,
        ..SampleParams::default()
    };

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size];

        // === SINGLE PLAYER ===
        // Retrigger whenever the recording runs out
        for (up, down) in [(1, 1), (3, 2), (1, 2)] {
            let mut player = SamplePlayer::new(&params, buffer.clone(), up, down).unwrap();
            player.prepare(size).unwrap();
            player.on();

            let name = format!("player {up}:{down}");
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    if !player.is_active() {
                        player.on();
                    }
                    player.play(black_box(&mut out));
                })
            });
        }

        // === POLYPHONIC MIX ===
        // 8 zones at different ratios, all held
        let ratios = [(1, 1), (2, 1), (3, 2), (4, 3), (1, 2), (2, 3), (3, 4), (4, 1)];
        let players = ratios
            .iter()
            .enumerate()
            .map(|(i, &(up, down))| {
                let zone = SampleParams {
                    lo_key: 60 + i as u8,
                    hi_key: 60 + i as u8,
                    ..params.clone()
                };
                SamplePlayer::new(&zone, buffer.clone(), up, down).unwrap()
            })
            .collect();

        let (mut tx, rx) = RingBuffer::new(64);
        let mut poly = SamplerPoly::new(players, rx);
        poly.prepare(size).unwrap();

        group.bench_with_input(BenchmarkId::new("poly 8", size), &size, |b, _| {
            b.iter(|| {
                if poly.active_voices() == 0 {
                    for i in 0..ratios.len() as u8 {
                        let _ = tx.push(SynthMessage::NoteOn {
                            note: 60 + i,
                            velocity: 100,
                        });
                    }
                }
                poly.render_block(black_box(&mut out));
            })
        });
    }

    group.finish();
}
