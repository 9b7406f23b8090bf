use crate::dsp::upfirdn::ResampleError;

/// Core trait for block-rendering nodes.
///
/// Nodes render audio and respond to note events. Control calls and
/// `render_block` are expected on the same thread; see `graph::sampler` for
/// driving a node from elsewhere.
pub trait GraphNode: Send {
    /// Size internal buffers for blocks of `block_size` samples.
    ///
    /// May allocate, so call it before the audio callback starts. Default
    /// implementation does nothing.
    fn prepare(&mut self, _block_size: usize) -> Result<(), ResampleError> {
        Ok(())
    }

    fn render_block(&mut self, out: &mut [f32]);

    /// Triggered when a note starts
    fn note_on(&mut self) {}

    /// Triggered when a note is released
    fn note_off(&mut self) {}

    /// Check if this node is still producing sound
    ///
    /// Used by voice management to know when a voice can be freed.
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn prepare(&mut self, block_size: usize) -> Result<(), ResampleError> {
        (**self).prepare(block_size)
    }

    fn render_block(&mut self, out: &mut [f32]) {
        (**self).render_block(out)
    }

    fn note_on(&mut self) {
        (**self).note_on()
    }

    fn note_off(&mut self) {
        (**self).note_off()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
