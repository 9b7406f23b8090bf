//! Real-world scenario benchmarks.
//!
//! These model how the sampler is driven from an audio callback: single
//! players at several pitch ratios and a polyphonic mix.

mod voices;

pub use voices::bench_voices;
