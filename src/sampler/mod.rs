//! Sampled-voice playback.
//!
//! A [`SampleBuffer`] holds one recording. A [`SamplePlayer`] plays it with
//! an envelope, optionally pitch-shifted through the resampler, and
//! [`SampleParams`] describe how a library entry should be played.

/// Library entry description and key/velocity zones.
pub mod params;
/// Envelope-driven, optionally resampled playback of one buffer.
pub mod player;
/// Quantized sample storage.
pub mod sample;

pub use params::{SampleParams, Zone};
pub use player::SamplePlayer;
pub use sample::SampleBuffer;
