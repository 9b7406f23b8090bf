use crate::dsp::envelope::EnvelopeState;
use crate::dsp::upfirdn::ResampleError;
use crate::sampler::player::SamplePlayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for a note
    Active,    // Playing, note held
    Releasing, // Key released, player fading out
}

/// One sample player plus the note that triggered it.
pub struct Voice {
    note: u8,
    velocity: u8,
    state: VoiceState,
    player: SamplePlayer,
}

impl Voice {
    /// Wrap `player`. The voice always mixes into the block it renders to.
    pub fn new(mut player: SamplePlayer) -> Self {
        player.set_append(true);
        Self {
            note: 0,
            velocity: 0,
            state: VoiceState::Free,
            player,
        }
    }

    pub fn prepare(&mut self, block_size: usize) -> Result<(), ResampleError> {
        self.player.prepare(block_size)
    }

    /// Does this voice's sample answer to `note` at `velocity`?
    pub fn accepts(&self, note: u8, velocity: u8) -> bool {
        self.player.matches(note, velocity)
    }

    pub fn start(&mut self, note: u8, velocity: u8) {
        self.note = note;
        self.velocity = velocity;
        self.state = VoiceState::Active;
        self.player.on();
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.player.off();
        }
    }

    /// Mix this voice into `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        self.player.play(out);

        // Samples end on their own, held or not
        if self.player.state() == EnvelopeState::Finished {
            self.free();
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = 0;
        self.velocity = 0;
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn player(&self) -> &SamplePlayer {
        &self.player
    }
}
