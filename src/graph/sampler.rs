#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::dsp::envelope::Adsr;
use crate::dsp::upfirdn::ResampleError;
use crate::graph::node::GraphNode;
use crate::sampler::player::SamplePlayer;

impl GraphNode for SamplePlayer {
    fn prepare(&mut self, block_size: usize) -> Result<(), ResampleError> {
        SamplePlayer::prepare(self, block_size)
    }

    fn render_block(&mut self, out: &mut [f32]) {
        self.play(out);
    }

    fn note_on(&mut self) {
        self.on();
    }

    fn note_off(&mut self) {
        self.off();
    }

    fn is_active(&self) -> bool {
        SamplePlayer::is_active(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplerMessage {
    NoteOn,
    NoteOff,
    SetAdsr(Adsr),
    SetFadeout(f32),
}

/// Control side of a [`SharedSamplerNode`]. Lives on the UI/MIDI thread.
#[cfg(feature = "rtrb")]
pub struct SamplerHandle {
    tx: Producer<SamplerMessage>,
}

/// A player owned by the audio thread and controlled through a queue.
///
/// Messages are applied at the start of the next `render_block`, in the
/// order they were sent.
#[cfg(feature = "rtrb")]
pub struct SharedSamplerNode {
    player: SamplePlayer,
    rx: Consumer<SamplerMessage>,
}

#[cfg(feature = "rtrb")]
impl SamplerHandle {
    pub fn note_on(&mut self) {
        let _ = self.tx.push(SamplerMessage::NoteOn);
    }

    pub fn note_off(&mut self) {
        let _ = self.tx.push(SamplerMessage::NoteOff);
    }

    /// Takes effect on the next note-on.
    pub fn set_adsr(&mut self, adsr: Adsr) {
        let _ = self.tx.push(SamplerMessage::SetAdsr(adsr));
    }

    pub fn set_fadeout(&mut self, seconds: f32) {
        let _ = self.tx.push(SamplerMessage::SetFadeout(seconds));
    }
}

#[cfg(feature = "rtrb")]
const SAMPLER_QUEUE_SIZE: usize = 64;

#[cfg(feature = "rtrb")]
impl SharedSamplerNode {
    pub fn new(player: SamplePlayer) -> (Self, SamplerHandle) {
        let (tx, rx) = RingBuffer::<SamplerMessage>::new(SAMPLER_QUEUE_SIZE);

        let handle = SamplerHandle { tx };
        let node = Self { player, rx };

        (node, handle)
    }

    pub fn player(&self) -> &SamplePlayer {
        &self.player
    }

    fn drain(&mut self) {
        while let Ok(msg) = self.rx.pop() {
            match msg {
                SamplerMessage::NoteOn => self.player.on(),
                SamplerMessage::NoteOff => self.player.off(),
                SamplerMessage::SetAdsr(adsr) => self.player.set_adsr(adsr),
                SamplerMessage::SetFadeout(seconds) => self.player.set_fadeout(seconds),
            }
        }
    }
}

#[cfg(feature = "rtrb")]
impl GraphNode for SharedSamplerNode {
    fn prepare(&mut self, block_size: usize) -> Result<(), ResampleError> {
        self.player.prepare(block_size)
    }

    fn render_block(&mut self, out: &mut [f32]) {
        self.drain();
        self.player.play(out);
    }

    fn is_active(&self) -> bool {
        self.player.is_active()
    }
}
