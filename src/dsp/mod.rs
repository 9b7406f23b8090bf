//! Low-level DSP primitives used by the sampler and graph layers.
//!
//! Everything here sizes its buffers up front. Steady-state processing
//! (`UpFirDown::apply`, `Envelope::render_with`) never allocates, so these
//! types can live directly inside voice structs. Only (re)initialization
//! touches the allocator.

/// Sample-locked ADSR envelope with a note-off fadeout.
pub mod envelope;
/// Compiled-in anti-alias FIR kernels.
pub mod kernels;
/// Rational rates, GCD and block length negotiation.
pub mod rate;
/// Kernel selection and block-size management on top of the engine.
pub mod resampler;
/// Streaming polyphase upsample/filter/downsample engine.
pub mod upfirdn;

pub use envelope::{Adsr, Envelope, EnvelopeState};
pub use rate::{BlockLengths, RationalRate};
pub use resampler::Resampler;
pub use upfirdn::{InputSchedule, ResampleError, UpFirDown};
