//! Drive a zone-mapped sampler from a message queue and print block levels.

use std::sync::Arc;

use rtrb::RingBuffer;
use sampler_dsp::sampler::{SampleBuffer, SampleParams, SamplePlayer};
use sampler_dsp::synth::{SamplerPoly, SynthMessage};
use sampler_dsp::DEFAULT_SAMPLE_RATE;

const BLOCK_SIZE: usize = 128;
const BLOCKS: usize = 200;

fn note_on(note: u8) -> SynthMessage {
    SynthMessage::NoteOn {
        note,
        velocity: 100,
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    // Quarter second of a 440 Hz square wave
    let len = DEFAULT_SAMPLE_RATE as usize / 4;
    let period = DEFAULT_SAMPLE_RATE as usize / 440;
    let samples: Vec<f32> = (0..len)
        .map(|n| if n % period < period / 2 { 0.25 } else { -0.25 })
        .collect();
    let buffer = Arc::new(SampleBuffer::from_f32(&samples, DEFAULT_SAMPLE_RATE));

    let params = SampleParams {
        lo_key: 60,
        hi_key: 60,
        hi_vel: 127,
        attack: 0.002,
        release: 0.05,
        ..SampleParams::default()
    };

    // Same recording mapped across a fifth: unshifted, up a fifth, down a fourth
    let root = SamplePlayer::new(&params, buffer, 1, 1)?;
    let fifth = root.share(Some((67, 67)), 3, 2)?;
    let fourth_down = root.share(Some((55, 55)), 3, 4)?;

    let (mut tx, rx) = RingBuffer::<SynthMessage>::new(64);
    let mut sampler = SamplerPoly::new(vec![root, fifth, fourth_down], rx);
    sampler.prepare(BLOCK_SIZE)?;

    let mut block = [0.0f32; BLOCK_SIZE];
    for index in 0..BLOCKS {
        let message = match index {
            0 => Some(note_on(60)),
            20 => Some(note_on(67)),
            40 => Some(note_on(55)),
            60 => Some(SynthMessage::AllNotesOff),
            _ => None,
        };
        if let Some(message) = message {
            let _ = tx.push(message);
        }

        block.fill(0.0);
        sampler.render_block(&mut block);

        if index % 10 == 0 {
            let peak = block.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            println!(
                "block {index:3}: {} active, peak {peak:.3}",
                sampler.active_voices()
            );
        }
    }

    Ok(())
}
