use crate::{
    dsp::upfirdn::ResampleError,
    sampler::player::SamplePlayer,
    synth::{
        message::{MessageReceiver, SynthMessage},
        voice::Voice,
    },
};

/// Zone-mapped polyphonic sampler.
///
/// Holds one voice per sample player. A note-on starts every voice whose
/// key/velocity zone contains the note, restarting it if it was already
/// sounding. Active voices mix additively into the output block.
pub struct SamplerPoly<R: MessageReceiver> {
    voices: Vec<Voice>,
    rx: R,
}

impl<R: MessageReceiver> SamplerPoly<R> {
    pub fn new(players: Vec<SamplePlayer>, rx: R) -> Self {
        Self {
            voices: players.into_iter().map(Voice::new).collect(),
            rx,
        }
    }

    /// Size every voice for blocks of `block_size`. Allocates.
    pub fn prepare(&mut self, block_size: usize) -> Result<(), ResampleError> {
        for voice in &mut self.voices {
            voice.prepare(block_size)?;
        }
        Ok(())
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        // Process control messages
        while let Some(msg) = self.rx.pop() {
            match msg {
                SynthMessage::NoteOn { note, velocity } => {
                    for voice in &mut self.voices {
                        if voice.accepts(note, velocity) {
                            voice.start(note, velocity);
                        }
                    }
                }
                SynthMessage::NoteOff { note, .. } => {
                    for voice in &mut self.voices {
                        if voice.is_active() && voice.note() == note {
                            voice.release();
                        }
                    }
                }
                SynthMessage::AllNotesOff => {
                    for voice in &mut self.voices {
                        voice.release();
                    }
                }
            }
        }

        // Mix voices
        out.fill(0.0);
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.render(out);
            }
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }
}
