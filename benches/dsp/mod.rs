//! Benchmarks for low-level DSP primitives.

mod envelope;
mod upfirdn;

pub use envelope::bench_envelope;
pub use upfirdn::bench_upfirdn;
