use std::collections::TryReserveError;

use log::{debug, error};

use crate::dsp::rate::{BlockLengths, RationalRate};

/*
Upsample → FIR → Downsample
===========================

Rational resampling by `up / down` is three steps on paper:

  1. insert `up - 1` zeros after every input sample   (upsample)
  2. low-pass filter the result                        (FIR)
  3. keep every `down`-th sample                       (downsample)

Step 1 is wasteful. Most of the filter's inputs are zeros, so most of the
multiplications contribute nothing.


Polyphase Decomposition
-----------------------

Split the kernel `h` into `up` interleaved sub-kernels ("phases"):

    phase 0:  h[0], h[up],     h[2*up],     ...
    phase 1:  h[1], h[up + 1], h[2*up + 1], ...
    ...

For input sample `x[i]`, upsampled output `y[i*up + p]` only ever touches
the non-zero inputs, and those meet exactly the taps of phase `p`:

    y[i*up + p] = sum over t of  phase_p[t] * x[i - t]

So each input sample yields `up` outputs, each a short dot product of
`phase_len = ceil(kernel_len / up)` taps against the most recent inputs. The
zero-stuffed signal never exists.

  Example: up = 3, kernel = [1, 1, 1]  (sample and hold)

    phases:  [1] [1] [1]
    input:   1        2        3
    output:  1 1 1    2 2 2    3 3 3


Streaming
---------

The engine sees one chunk per call but must behave as if the stream were
never cut. Three pieces of state carry across calls:

  history   the last `phase_len * up - 1` input samples, kept in front of
            the staging buffer so the dot products reach back into the
            previous chunk.

  carry     a chunk may decimate to more samples than the caller's block
            length. The surplus stays behind the committed block and is
            moved to the front on the next call.

  phase     where the next kept sample falls on the upsampled grid. Always 0
            for negotiated chunk lengths (multiples of `down`).

Every buffer is sized once in `init` for the worst-case chunk; `apply` never
allocates.
*/

/// Errors raised while (re)building resampler buffers.
#[derive(thiserror::Error, Debug)]
pub enum ResampleError {
    #[error("failed to allocate resampler buffers: {0}")]
    Allocation(#[from] TryReserveError),
}

fn zeroed(len: usize) -> Result<Vec<f32>, TryReserveError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, 0.0);
    Ok(buffer)
}

fn is_identity(kernel: &[f32]) -> bool {
    kernel.is_empty() || (kernel.len() == 1 && kernel[0] == 1.0)
}

/// Streaming polyphase resampler producing a fixed output block per call.
///
/// Not internally synchronized: `apply` and `init` on the same instance must
/// come from one thread, or the caller must serialize them.
#[derive(Debug, Default)]
pub struct UpFirDown {
    rate: RationalRate,
    bypass: bool,
    ready: bool,

    // Kernel reshaped into `up` rows of `phase_len` taps
    phases: Vec<f32>,
    phase_len: usize,
    history_len: usize,

    out_len: usize,
    max_in: usize,

    staging: Vec<f32>,
    upsampled: Vec<f32>,
    output: Vec<f32>,

    carry: usize,
    carry_max: usize,
    decimation_phase: usize,
}

impl UpFirDown {
    /// Build an engine. See [`UpFirDown::init`].
    pub fn new(up: u32, down: u32, out_len: usize, kernel: &[f32]) -> Result<Self, ResampleError> {
        let mut engine = Self::default();
        engine.init(up, down, out_len, kernel)?;
        Ok(engine)
    }

    /// Discard all buffers and rebuild them for a new configuration.
    ///
    /// Factors below 1 are treated as 1. A 1:1 ratio with an empty or
    /// single unit-tap kernel selects bypass mode. An empty kernel with any
    /// other ratio acts as a unit tap. On error the engine is left
    /// deinitialized and `apply` returns an empty block.
    pub fn init(
        &mut self,
        up: u32,
        down: u32,
        out_len: usize,
        kernel: &[f32],
    ) -> Result<(), ResampleError> {
        self.deinit();

        let rate = RationalRate::new(up.max(1), down.max(1));
        let built = if rate.is_unity() && is_identity(kernel) {
            Self::build_bypass(out_len)
        } else {
            Self::build_polyphase(rate, out_len, kernel)
        };

        match built {
            Ok(engine) => {
                debug!(
                    "upfirdn {}:{} ready: bypass={}, out={}, max in={}, phase len={}, carry max={}",
                    engine.rate.up(),
                    engine.rate.down(),
                    engine.bypass,
                    engine.out_len,
                    engine.max_in,
                    engine.phase_len,
                    engine.carry_max
                );
                *self = engine;
                Ok(())
            }
            Err(err) => {
                error!("upfirdn {}:{} init failed: {err}", rate.up(), rate.down());
                Err(err.into())
            }
        }
    }

    fn build_bypass(out_len: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            bypass: true,
            ready: true,
            out_len,
            max_in: out_len,
            output: zeroed(out_len)?,
            ..Self::default()
        })
    }

    fn build_polyphase(
        rate: RationalRate,
        out_len: usize,
        kernel: &[f32],
    ) -> Result<Self, TryReserveError> {
        let kernel = if kernel.is_empty() { &[1.0][..] } else { kernel };
        let up = rate.up() as usize;
        let phase_len = kernel.len().div_ceil(up);

        let mut phases = Vec::new();
        phases.try_reserve_exact(phase_len * up)?;
        for phase in 0..up {
            for tap in 0..phase_len {
                // Taps past the kernel end are implicit zeros
                phases.push(kernel.get(phase + up * tap).copied().unwrap_or(0.0));
            }
        }
        let history_len = phases.len() - 1;

        let lengths = rate.input_lengths(out_len);
        let max_in = lengths.max;
        let carry_max = (rate.output_len(lengths.max) - out_len) * lengths.num_max;

        Ok(Self {
            rate,
            bypass: false,
            ready: true,
            phases,
            phase_len,
            history_len,
            out_len,
            max_in,
            staging: zeroed(history_len + max_in)?,
            upsampled: zeroed(max_in * up)?,
            output: zeroed(out_len + carry_max)?,
            carry: 0,
            carry_max,
            decimation_phase: 0,
        })
    }

    /// Release every buffer. Safe to call repeatedly.
    pub fn deinit(&mut self) {
        *self = Self::default();
    }

    /// Forget stream history and pending carry, keeping the configuration.
    pub fn reset(&mut self) {
        self.staging.fill(0.0);
        self.output.fill(0.0);
        self.carry = 0;
        self.decimation_phase = 0;
    }

    /// Process the next chunk of the stream and return the next output block.
    ///
    /// Chunks longer than [`max_input_len`](Self::max_input_len) are
    /// truncated. The returned block always has
    /// [`output_block_len`](Self::output_block_len) samples and stays valid
    /// until the next call. A chunk too short to fill it leaves zeros after
    /// the samples it produced.
    pub fn apply(&mut self, input: &[f32]) -> &[f32] {
        if !self.ready {
            return &[];
        }

        let num_in = input.len().min(self.max_in);
        let input = &input[..num_in];

        if self.bypass {
            self.output[..num_in].copy_from_slice(input);
            if num_in < self.out_len {
                self.output[num_in..self.out_len].fill(0.0);
            }
            return &self.output[..self.out_len];
        }

        let up = self.rate.up() as usize;
        let down = self.rate.down() as usize;
        let len_us = num_in * up;

        // Surplus from the previous call moves to the front
        if self.carry > 0 {
            self.output
                .copy_within(self.out_len..self.out_len + self.carry, 0);
        }

        let history = self.history_len;
        self.staging[history..history + num_in].copy_from_slice(input);

        let phase_len = self.phase_len;
        let staging = &self.staging;
        let upsampled = &mut self.upsampled[..len_us];
        upsampled.fill(0.0);

        for i in 0..num_in {
            let newest = history + i;
            let window = &staging[newest + 1 - phase_len..=newest];
            let frame = &mut upsampled[i * up..(i + 1) * up];

            for (y, taps) in frame.iter_mut().zip(self.phases.chunks_exact(phase_len)) {
                for (coeff, x) in taps.iter().zip(window.iter().rev()) {
                    *y += coeff * x;
                }
            }
        }

        // Decimate onto the committed block, after any carried samples
        let start = self.decimation_phase;
        let produced = if len_us > start {
            (len_us - start).div_ceil(down)
        } else {
            0
        };
        let writable = produced.min(self.output.len() - self.carry);
        let dest = &mut self.output[self.carry..self.carry + writable];
        for (k, slot) in dest.iter_mut().enumerate() {
            *slot = upsampled[start + k * down];
        }
        let filled = self.carry + writable;
        if filled < self.out_len {
            self.output[filled..self.out_len].fill(0.0);
        }
        self.decimation_phase = start + produced * down - len_us;

        self.carry = (self.carry + writable)
            .saturating_sub(self.out_len)
            .min(self.carry_max);

        // Keep the tail of this chunk as history for the next one
        self.staging.copy_within(num_in..num_in + history, 0);

        &self.output[..self.out_len]
    }

    /// Negotiated input lengths for `num_out` output samples at this rate.
    pub fn input_lengths(&self, num_out: usize) -> BlockLengths {
        self.rate.input_lengths(num_out)
    }

    /// Output length for `num_in` input samples at this rate.
    pub fn output_len(&self, num_in: usize) -> usize {
        self.rate.output_len(num_in)
    }

    pub fn is_bypass(&self) -> bool {
        self.bypass
    }

    /// False before `init` and after a failed `init` or `deinit`.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Reduced rate in use.
    pub fn rate(&self) -> RationalRate {
        self.rate
    }

    pub fn output_block_len(&self) -> usize {
        self.out_len
    }

    /// Largest chunk `apply` accepts; the `max` of the negotiated lengths.
    pub fn max_input_len(&self) -> usize {
        self.max_in
    }

    pub fn phase_len(&self) -> usize {
        self.phase_len
    }

    /// Samples currently carried over to the next block.
    pub fn carry(&self) -> usize {
        self.carry
    }

    pub fn carry_max(&self) -> usize {
        self.carry_max
    }
}

/// Round-robin cursor over the negotiated input lengths.
///
/// Holds `num_max` copies of `max` followed by `num_min` copies of `min`.
/// Starting each cycle with the long chunks keeps the engine's carry
/// non-negative.
#[derive(Debug, Default, Clone)]
pub struct InputSchedule {
    lengths: Vec<usize>,
    cursor: usize,
}

impl InputSchedule {
    pub fn new(lengths: BlockLengths) -> Result<Self, TryReserveError> {
        let mut sequence = Vec::new();
        sequence.try_reserve_exact(lengths.cycle_len())?;

        if lengths.is_fixed() {
            sequence.push(lengths.max);
        } else {
            sequence.extend(std::iter::repeat(lengths.max).take(lengths.num_max));
            sequence.extend(std::iter::repeat(lengths.min).take(lengths.num_min));
        }

        Ok(Self {
            lengths: sequence,
            cursor: 0,
        })
    }

    /// Input length due on this call; advances the cursor.
    pub fn next_len(&mut self) -> usize {
        if self.lengths.is_empty() {
            return 0;
        }
        let len = self.lengths[self.cursor];
        self.cursor = (self.cursor + 1) % self.lengths.len();
        len
    }

    /// Input length due on the next call, without advancing.
    pub fn peek(&self) -> usize {
        self.lengths.get(self.cursor).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Lengths of one full cycle, in call order.
    pub fn as_slice(&self) -> &[usize] {
        &self.lengths
    }

    /// Input consumed over one full cycle.
    pub fn cycle_input(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Largest length in the cycle; sizes the caller's input scratch.
    pub fn max_len(&self) -> usize {
        self.lengths.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn run(up: u32, down: u32, chunks: &[&[f32]], kernel: &[f32]) -> Vec<f32> {
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        let rate = RationalRate::new(up, down);
        // one-chunk tests size the block to the whole output
        let out_len = if chunks.len() == 1 {
            rate.output_len(total)
        } else {
            rate.output_len(chunks[0].len())
        };

        let mut engine = UpFirDown::new(up, down, out_len, kernel).expect("init");
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend_from_slice(engine.apply(chunk));
        }
        out
    }

    fn assert_block(actual: &[f32], expected: &[f32]) {
        assert!(actual.len() >= expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_approx_eq!(f32, *a, *e, epsilon = 1e-6);
        }
    }

    #[test]
    fn identity_is_bypass() {
        let input: Vec<f32> = (0..37).map(|i| (i as f32 * 0.3).sin()).collect();
        for kernel in [&[][..], &[1.0][..]] {
            let mut engine = UpFirDown::new(1, 1, input.len(), kernel).expect("init");
            assert!(engine.is_bypass());
            assert_eq!(engine.apply(&input), &input[..]);
        }
    }

    #[test]
    fn equal_factors_reduce_to_bypass() {
        let mut engine = UpFirDown::new(3, 3, 8, &[1.0]).expect("init");
        assert!(engine.is_bypass());
        assert_eq!(engine.rate(), RationalRate::UNITY);
        let input = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(engine.apply(&input), &input);
    }

    #[test]
    fn non_identity_kernel_filters_at_unity_rate() {
        assert_block(&run(1, 1, &[&[1.0, 1.0, 1.0]], &[1.0, 1.0, 1.0]), &[1.0, 2.0, 3.0]);
        assert_block(
            &run(1, 1, &[&[1.0, 1.0, 1.0, 0.0, 0.0]], &[1.0, 1.0, 1.0]),
            &[1.0, 2.0, 3.0, 2.0, 1.0],
        );
    }

    #[test]
    fn history_carries_across_calls() {
        let out = run(1, 1, &[&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]], &[1.0, 1.0, 1.0]);
        assert_block(&out, &[1.0, 2.0, 3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn upsample_with_zero_insertion() {
        let out = run(3, 1, &[&[1.0, 2.0, 3.0]], &[1.0]);
        assert_block(&out, &[1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn upsample_with_hold_kernel() {
        let out = run(3, 1, &[&[1.0, 2.0, 3.0]], &[1.0, 1.0, 1.0]);
        assert_block(&out, &[1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn upsample_with_linear_interpolation() {
        let out = run(2, 1, &[&[1.0, 1.0, 1.0]], &[0.5, 1.0, 0.5]);
        assert_block(&out, &[0.5, 1.0, 1.0, 1.0, 1.0, 1.0]);

        let out = run(2, 1, &[&[1.0, 1.0, 1.0, 0.0]], &[0.5, 1.0, 0.5]);
        assert_block(&out, &[0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn downsample_keeps_every_third() {
        let ramp: Vec<f32> = (0..12).map(|i| i as f32).collect();
        assert_block(&run(1, 3, &[&ramp], &[1.0]), &[0.0, 3.0, 6.0, 9.0]);
        assert_block(&run(1, 3, &[&ramp[..10]], &[1.0]), &[0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn two_over_three_with_linear_interpolation() {
        let ramp: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let out = run(2, 3, &[&ramp], &[0.5, 1.0, 0.5]);
        assert_eq!(out.len(), 8);
        assert_block(&out, &[0.0, 1.0, 2.5, 4.0, 5.5, 7.0, 8.5, 10.0]);

        let out = run(2, 3, &[&ramp[..10]], &[0.5, 1.0, 0.5]);
        assert_eq!(out.len(), 7);
        assert_block(&out, &[0.0, 1.0, 2.5, 4.0, 5.5, 7.0, 8.5]);
    }

    #[test]
    fn impulse_response_is_the_kernel() {
        // up = 1: the impulse response is the kernel itself
        let kernel = [0.1, -0.2, 0.4, 0.7, 0.4, -0.2, 0.1];
        let mut impulse = vec![0.0; 10];
        impulse[0] = 1.0;
        let out = run(1, 1, &[&impulse], &kernel);
        assert_block(&out, &kernel);
        assert_block(&out[kernel.len()..], &[0.0, 0.0, 0.0]);

        // up = 2: every output sample of the zero-stuffed stream is one tap
        let mut impulse = vec![0.0; 5];
        impulse[0] = 1.0;
        let out = run(2, 1, &[&impulse], &kernel);
        assert_block(&out, &[0.1, -0.2, 0.4, 0.7, 0.4, -0.2, 0.1, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn phase_reshape_pads_with_zeros() {
        let engine = UpFirDown::new(3, 1, 6, &[1.0, 2.0, 3.0, 4.0]).expect("init");
        assert_eq!(engine.phase_len(), 2);
        assert!(engine.phase_len() * 3 >= 4);
        assert_eq!(engine.phases, vec![1.0, 4.0, 2.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn carry_follows_the_negotiated_cycle() {
        let mut engine = UpFirDown::new(3, 2, 64, &[1.0, 1.0, 1.0]).expect("init");
        let lengths = engine.input_lengths(64);
        assert_eq!(engine.max_input_len(), 44);
        assert_eq!(engine.carry_max(), 2);

        let mut schedule = InputSchedule::new(lengths).expect("schedule");
        assert_eq!(schedule.as_slice(), &[44, 42, 42]);

        let input = [0.25f32; 44];
        let mut carries = Vec::new();
        for _ in 0..6 {
            let len = schedule.next_len();
            assert_eq!(engine.apply(&input[..len]).len(), 64);
            carries.push(engine.carry());
        }
        assert_eq!(carries, vec![2, 1, 0, 2, 1, 0]);
    }

    #[test]
    fn oversized_chunks_are_truncated() {
        let mut engine = UpFirDown::new(2, 1, 8, &[1.0, 1.0]).expect("init");
        let input = [1.0f32; 32];
        let out = engine.apply(&input);
        assert_eq!(out.len(), 8);
        assert_eq!(engine.carry(), 0);
    }

    #[test]
    fn decimation_phase_stays_on_grid_for_odd_chunks() {
        let ramp: Vec<f32> = (0..24).map(|i| i as f32).collect();
        let mut engine = UpFirDown::new(1, 3, 1, &[1.0]).expect("init");

        // Chunks of 2 are not multiples of 3; kept indices must still be 0, 3, 6, ...
        let mut kept = Vec::new();
        for chunk in ramp.chunks(2) {
            let phase_before = engine.decimation_phase;
            let first = engine.apply(chunk)[0];
            if phase_before < chunk.len() {
                kept.push(first);
            }
        }
        assert_eq!(&kept[..4], &[0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn reinit_discards_previous_state() {
        let mut engine = UpFirDown::new(3, 2, 64, &[1.0, 1.0, 1.0]).expect("init");
        engine.apply(&[1.0; 44]);
        assert_eq!(engine.carry(), 2);

        engine.init(2, 1, 16, &[0.5, 1.0, 0.5]).expect("reinit");
        assert_eq!(engine.carry(), 0);
        assert_eq!(engine.max_input_len(), 8);
        assert_eq!(engine.output_block_len(), 16);
    }

    #[test]
    fn deinit_leaves_engine_unusable() {
        let mut engine = UpFirDown::new(2, 1, 16, &[1.0, 1.0]).expect("init");
        engine.deinit();
        engine.deinit();
        assert!(!engine.is_ready());
        assert!(engine.apply(&[1.0; 8]).is_empty());
    }

    #[test]
    fn schedule_round_robins() {
        let mut schedule =
            InputSchedule::new(RationalRate::new(4, 3).input_lengths(10)).expect("schedule");
        let cycle = schedule.as_slice().to_vec();
        assert_eq!(cycle.len(), 4);
        assert_eq!(schedule.cycle_input(), 30);

        let drawn: Vec<usize> = (0..8).map(|_| schedule.next_len()).collect();
        assert_eq!(&drawn[..4], &cycle[..]);
        assert_eq!(&drawn[4..], &cycle[..]);
    }

    #[test]
    fn empty_schedule_yields_zero() {
        let mut schedule = InputSchedule::default();
        assert_eq!(schedule.next_len(), 0);
        assert_eq!(schedule.peek(), 0);
    }
}
