pub mod dsp; // Resampling engine, kernels and the sample envelope
pub mod graph; // Block-rendering node traits
#[cfg(feature = "wav")]
pub mod io;
pub mod sampler; // Sampled-voice playback
pub mod synth; // Voice management and polyphony

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
/// Largest up or down factor with a built-in anti-alias kernel.
pub const MAX_RATE_FACTOR: u32 = 4;
