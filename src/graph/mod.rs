//! Block-rendering nodes.
//!
//! `node` holds the capability trait every renderable voice implements.
//! `sampler` plugs the sample player into it and adds a lock-free handle for
//! controlling a player that lives on the audio thread.

/// Core trait shared by all graph nodes.
pub mod node;
/// Sample player node and its cross-thread control handle.
pub mod sampler;

pub use node::GraphNode;
#[cfg(feature = "rtrb")]
pub use sampler::{SamplerHandle, SharedSamplerNode};
pub use sampler::SamplerMessage;
