//! Render a decaying tone at several pitch ratios and bounce each to WAV.
//!
//! Pass a 16-bit mono 48 kHz WAV path to use it as the source instead.

use std::f32::consts::TAU;
use std::sync::Arc;

use log::info;
use sampler_dsp::io::{load_sample, write_wav};
use sampler_dsp::sampler::{SampleBuffer, SampleParams, SamplePlayer};
use sampler_dsp::DEFAULT_SAMPLE_RATE;

const BLOCK_SIZE: usize = 256;
const RATIOS: [(u32, u32); 4] = [(1, 1), (2, 1), (3, 2), (2, 3)];

fn synth_tone(seconds: f32) -> SampleBuffer {
    let len = (seconds * DEFAULT_SAMPLE_RATE as f32) as usize;
    let samples: Vec<f32> = (0..len)
        .map(|n| {
            let t = n as f32 / DEFAULT_SAMPLE_RATE as f32;
            0.5 * (TAU * 220.0 * t).sin() * (-3.0 * t).exp()
        })
        .collect();
    SampleBuffer::from_f32(&samples, DEFAULT_SAMPLE_RATE)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let buffer = match std::env::args().nth(1) {
        Some(path) => load_sample(path, DEFAULT_SAMPLE_RATE)?,
        None => synth_tone(1.0),
    };
    let buffer = Arc::new(buffer);

    let params = SampleParams {
        attack: 0.005,
        decay: 0.2,
        sustain: 0.7,
        release: 0.1,
        ..SampleParams::default()
    };

    for (up, down) in RATIOS {
        let mut player = SamplePlayer::new(&params, Arc::clone(&buffer), up, down)?;
        player.set_fadeout(0.05);
        player.prepare(BLOCK_SIZE)?;
        player.on();

        let mut rendered = Vec::new();
        let mut block = [0.0f32; BLOCK_SIZE];
        let release_at = buffer.len() / 2;
        let mut released = false;
        while player.is_active() {
            if !released && player.position() >= release_at {
                player.off();
                released = true;
            }
            block.fill(0.0);
            player.play(&mut block);
            rendered.extend_from_slice(&block);
        }

        let path = format!("render_{up}_{down}.wav");
        write_wav(&path, &rendered, DEFAULT_SAMPLE_RATE)?;
        info!("{path}: {} samples", rendered.len());
        println!("Rendered {} samples to {path}", rendered.len());
    }

    Ok(())
}
