use log::{debug, warn};

use crate::dsp::kernels::kernel_for_factor;
use crate::dsp::rate::{BlockLengths, RationalRate};
use crate::dsp::upfirdn::{ResampleError, UpFirDown};
use crate::MAX_RATE_FACTOR;

fn factor_in_range(factor: u32) -> bool {
    (1..=MAX_RATE_FACTOR).contains(&factor)
}

/// Resampler for small integer ratios with a built-in anti-alias kernel.
///
/// Picks the kernel for the larger factor of the reduced ratio and scales
/// it by the upsampling factor, so a constant input comes out at the same
/// level. Factors outside `1..=MAX_RATE_FACTOR` fall back to a 1:1 bypass.
#[derive(Debug, Default)]
pub struct Resampler {
    engine: UpFirDown,
    requested: (u32, u32),
    block_size: usize,
}

impl Resampler {
    pub fn new(up: u32, down: u32, block_size: usize) -> Result<Self, ResampleError> {
        let mut resampler = Self::default();
        resampler.init(up, down, block_size)?;
        Ok(resampler)
    }

    /// Configure for `up / down` with `block_size` output samples per call.
    pub fn init(&mut self, up: u32, down: u32, block_size: usize) -> Result<(), ResampleError> {
        self.requested = (up, down);
        self.block_size = block_size;

        if !factor_in_range(up) || !factor_in_range(down) {
            warn!(
                "resample factors {up}:{down} outside 1..={MAX_RATE_FACTOR}, falling back to bypass"
            );
            return self.engine.init(1, 1, block_size, &[1.0]);
        }

        let rate = RationalRate::new(up, down);
        match kernel_for_factor(rate.max_factor()) {
            Some(kernel) => {
                let gain = rate.up() as f32;
                let scaled: Vec<f32> = kernel.iter().map(|tap| tap * gain).collect();
                self.engine.init(rate.up(), rate.down(), block_size, &scaled)
            }
            None => self.engine.init(1, 1, block_size, &[1.0]),
        }
    }

    /// Rebuild for a new output block length.
    ///
    /// Does nothing when the length is unchanged unless `force` is set. The
    /// rebuild allocates, so call it outside the audio callback.
    pub fn set_block_size(&mut self, block_size: usize, force: bool) -> Result<(), ResampleError> {
        if !force && block_size == self.block_size && self.engine.is_ready() {
            return Ok(());
        }

        debug!(
            "resampler {}:{} block size {} -> {block_size}",
            self.requested.0, self.requested.1, self.block_size
        );
        let (up, down) = self.requested;
        self.engine.deinit();
        self.init(up, down, block_size)
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// See [`UpFirDown::apply`].
    pub fn apply(&mut self, input: &[f32]) -> &[f32] {
        self.engine.apply(input)
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    pub fn input_lengths(&self, num_out: usize) -> BlockLengths {
        self.engine.input_lengths(num_out)
    }

    pub fn output_len(&self, num_in: usize) -> usize {
        self.engine.output_len(num_in)
    }

    pub fn max_input_len(&self) -> usize {
        self.engine.max_input_len()
    }

    pub fn is_bypass(&self) -> bool {
        self.engine.is_bypass()
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    /// Reduced rate in use, unity when bypassed.
    pub fn rate(&self) -> RationalRate {
        self.engine.rate()
    }

    /// Factors as passed to `init`, before reduction or fallback.
    pub fn requested(&self) -> (u32, u32) {
        self.requested
    }

    pub fn engine(&self) -> &UpFirDown {
        &self.engine
    }
}
