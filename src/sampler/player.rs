use std::sync::Arc;

use log::{debug, error};

use crate::dsp::envelope::{Adsr, Envelope, EnvelopeState};
use crate::dsp::rate::RationalRate;
use crate::dsp::resampler::Resampler;
use crate::dsp::upfirdn::{InputSchedule, ResampleError};
use crate::sampler::params::{SampleParams, Zone};
use crate::sampler::sample::{unpack, SampleBuffer};
use crate::{DEFAULT_SAMPLE_RATE, MAX_BLOCK_SIZE};

/*
Pitch-Shifted Playback
======================

At 1:1 the player writes enveloped source samples straight into the
caller's block. Any other ratio routes them through the resampler:

    source ──envelope──→ scratch (len_in) ──resampler──→ caller block (N)

The caller always asks for N output samples, but the source samples needed
for N outputs need not be a whole number. The resampler hands out a short
cycle of input lengths (see `dsp::rate`), e.g. at 3:2 with N = 64:

    call     1    2    3    4    5    6  ...
    len_in  44   42   42   44   42   42  ...

The player walks that cycle with an `InputSchedule`, so a full cycle
consumes exactly `up` blocks' worth of source.

The schedule and scratch are sized for the caller's block length. A block of
a different length triggers a rebuild, which allocates. Call `prepare` from
a non-realtime thread to get that out of the way.
*/

/// Plays one sample buffer with an envelope, optionally pitch-shifted.
///
/// Not thread-safe by itself: control calls (`on`, `off`, `set_adsr`,
/// `set_block_size`) and `play` must come from one thread or be serialized
/// by the caller. `graph::sampler` provides a lock-free handle for driving a
/// player from another thread.
pub struct SamplePlayer {
    buffer: Option<Arc<SampleBuffer>>,
    envelope: Envelope,

    zone: Zone,
    amp_vel_track: i32,
    append: bool,

    resampler: Resampler,
    schedule: InputSchedule,
    scratch: Vec<f32>,
}

impl SamplePlayer {
    /// Player over `buffer`, pitch-shifted by `up / down`.
    ///
    /// Stays silent until the first `on`.
    pub fn new(
        params: &SampleParams,
        buffer: Arc<SampleBuffer>,
        up: u32,
        down: u32,
    ) -> Result<Self, ResampleError> {
        let mut envelope = Envelope::new(params.sample_rate);
        envelope.set_adsr(params.adsr(), buffer.len());

        Ok(Self {
            buffer: Some(buffer),
            envelope,
            zone: params.zone(),
            amp_vel_track: params.amp_vel_track,
            append: params.append,
            resampler: Resampler::new(up, down, 0)?,
            schedule: InputSchedule::default(),
            scratch: Vec::new(),
        })
    }

    /// Player without a buffer. Every `play` finishes it without output.
    pub fn empty() -> Self {
        Self {
            buffer: None,
            envelope: Envelope::new(DEFAULT_SAMPLE_RATE),
            zone: Zone::default(),
            amp_vel_track: 0,
            append: true,
            resampler: Resampler::default(),
            schedule: InputSchedule::default(),
            scratch: Vec::new(),
        }
    }

    /// Another player over the same buffer.
    ///
    /// Keeps the envelope settings, append mode and velocity range. `keys`
    /// replaces the key range when given. The new player has its own cursor
    /// and ratio, and stays silent until `on`.
    pub fn share(
        &self,
        keys: Option<(u8, u8)>,
        up: u32,
        down: u32,
    ) -> Result<Self, ResampleError> {
        let mut envelope = self.envelope.clone();
        envelope.finish();

        let mut zone = self.zone;
        if let Some((lo_key, hi_key)) = keys {
            zone.lo_key = lo_key;
            zone.hi_key = hi_key;
        }

        Ok(Self {
            buffer: self.buffer.clone(),
            envelope,
            zone,
            amp_vel_track: self.amp_vel_track,
            append: self.append,
            resampler: Resampler::new(up, down, 0)?,
            schedule: InputSchedule::default(),
            scratch: Vec::new(),
        })
    }

    /// Note-on: restart from the first source sample with the latest ADSR.
    pub fn on(&mut self) {
        self.envelope.note_on();
        self.resampler.reset();
        self.schedule.reset();
    }

    /// Note-off: fade out if a fadeout is set, otherwise stop.
    pub fn off(&mut self) {
        self.envelope.note_off();
    }

    /// Stage ADSR values for the next `on`. `None` fields keep their value.
    pub fn set_adsr(&mut self, adsr: Adsr) {
        let source_len = self.buffer.as_ref().map_or(0, |buffer| buffer.len());
        self.envelope.set_adsr(adsr, source_len);
    }

    pub fn set_fadeout(&mut self, seconds: f32) {
        self.envelope.set_fadeout(seconds);
    }

    /// Size the resampler, schedule and scratch for `block_size` outputs.
    ///
    /// Sizes above [`MAX_BLOCK_SIZE`] are clamped. Skipped when the size is
    /// unchanged unless `force` is set. Allocates.
    pub fn set_block_size(&mut self, block_size: usize, force: bool) -> Result<(), ResampleError> {
        let block_size = block_size.min(MAX_BLOCK_SIZE);
        if !force && block_size == self.resampler.block_size() && self.resampler.is_ready() {
            return Ok(());
        }

        debug!("sample player block size -> {block_size}");
        self.resampler.set_block_size(block_size, force)?;
        self.schedule = InputSchedule::new(self.resampler.input_lengths(block_size))?;

        let scratch_len = self.schedule.max_len();
        self.scratch.clear();
        self.scratch.try_reserve_exact(scratch_len)?;
        self.scratch.resize(scratch_len, 0.0);
        Ok(())
    }

    /// Get ready for blocks of `block_size` outside the audio callback.
    pub fn prepare(&mut self, block_size: usize) -> Result<(), ResampleError> {
        self.set_block_size(block_size, false)
    }

    /// Render `out.len()` samples, mixed in or overwriting per the append mode.
    ///
    /// At most [`MAX_BLOCK_SIZE`] samples are rendered per call. If the note
    /// ends inside the block, the rest of `out` is left as the caller
    /// provided it (pitch-shifted playback still writes the resampler's tail).
    pub fn play(&mut self, out: &mut [f32]) {
        if self.buffer.is_none() {
            self.envelope.finish();
            return;
        }

        let len = out.len().min(MAX_BLOCK_SIZE);
        let out = &mut out[..len];

        if self.resampler.is_bypass() {
            if let Some(buffer) = self.buffer.as_deref() {
                render_source(&mut self.envelope, buffer, out, self.append);
            }
            return;
        }

        if let Err(err) = self.set_block_size(out.len(), false) {
            error!("sample player could not resize to {} samples: {err}", out.len());
            self.envelope.finish();
            return;
        }

        let len_in = self.schedule.next_len();
        let scratch = &mut self.scratch[..len_in];
        scratch.fill(0.0);
        if let Some(buffer) = self.buffer.as_deref() {
            render_source(&mut self.envelope, buffer, scratch, false);
        }

        let resampled = self.resampler.apply(scratch);
        if self.append {
            for (o, r) in out.iter_mut().zip(resampled) {
                *o += r;
            }
        } else {
            for (o, r) in out.iter_mut().zip(resampled) {
                *o = *r;
            }
        }
    }

    /// Source samples left before the note ends; 0 once finished.
    pub fn remaining_samples(&self) -> usize {
        self.envelope.remaining_samples()
    }

    pub fn state(&self) -> EnvelopeState {
        self.envelope.state()
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Index of the next source sample.
    pub fn position(&self) -> usize {
        self.envelope.position()
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn matches(&self, key: u8, velocity: u8) -> bool {
        self.zone.contains(key, velocity)
    }

    pub fn lo_key(&self) -> u8 {
        self.zone.lo_key
    }

    pub fn hi_key(&self) -> u8 {
        self.zone.hi_key
    }

    pub fn lo_vel(&self) -> u8 {
        self.zone.lo_vel
    }

    pub fn hi_vel(&self) -> u8 {
        self.zone.hi_vel
    }

    pub fn amp_vel_track(&self) -> i32 {
        self.amp_vel_track
    }

    pub fn append(&self) -> bool {
        self.append
    }

    pub fn set_append(&mut self, append: bool) {
        self.append = append;
    }

    pub fn buffer(&self) -> Option<&Arc<SampleBuffer>> {
        self.buffer.as_ref()
    }

    /// Reduced pitch ratio in use.
    pub fn rate(&self) -> RationalRate {
        self.resampler.rate()
    }

    pub fn block_size(&self) -> usize {
        self.resampler.block_size()
    }
}

fn render_source(envelope: &mut Envelope, buffer: &SampleBuffer, out: &mut [f32], append: bool) {
    let codes = buffer.codes();
    if append {
        envelope.render_with(out.len(), codes.len(), |offset, index, gain| {
            out[offset] += unpack(codes[index]) * gain;
        });
    } else {
        envelope.render_with(out.len(), codes.len(), |offset, index, gain| {
            out[offset] = unpack(codes[index]) * gain;
        });
    }
}
