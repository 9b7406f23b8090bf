// Purpose: Voice management and polyphony
// This layer sits above the sample players and mixes several of them

pub mod message;
pub mod poly;
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use poly::SamplerPoly;
pub use voice::{Voice, VoiceState};
