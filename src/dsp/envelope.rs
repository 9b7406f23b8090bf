/*
Sample-Locked ADSR Envelope
===========================

This envelope shapes the amplitude of a recorded sample. Unlike a free-running
synth envelope, every phase is measured in SOURCE samples, and the envelope
cannot outlive the sample it is attached to.

Vocabulary
----------

  gain        The current multiplier applied to the source sample.

  budget      How many source samples a phase lasts. Attack, decay and
              release budgets come from seconds; sustain is whatever is left
              of the source after the other three.

  position    Index of the next source sample to play.

  pending     ADSR values set since the last note-on. They take effect on the
              next note-on, never in the middle of a note.


The Shape: Exponential Approach
-------------------------------

Each phase moves the gain toward a target with a one-pole recursion:

    gain = factor * gain + (1 - factor) * target

After `n` steps the remaining distance to the target is `factor^n` of what it
was. We choose `factor` so that the phase covers 99% of the distance within
its budget:

    factor = exp(ln(0.01) / (budget + 1))

A budget of zero gives `factor = 0`, an instant jump to the target.

  Gain
   1.0 ┐    ╭─╮
       │   ╱   ╲___
   S   │  │        ‾‾‾‾‾‾‾‾‾‾‾‾╲
       │  │                     ╲
   0.0 └──╯──────────────────────╲──→ Source samples
        Attack Decay  Sustain   Release
       ├──────────── source length ────────┤


Phase entry levels
------------------

  Attack    starts at 0, heads for 1
  Decay     starts at 1, heads for the sustain level
  Sustain   holds the sustain level
  Release   starts at the sustain level, heads for 0
  Fadeout   continues from the current gain, heads for 0


The State Machine
-----------------

    note_on → Ready ─→ Attack ─→ Decay ─→ Sustain ─→ Release ─→ Fadeout ─→ Finished

Ready has no duration. It immediately enters the first phase with a positive
budget. Whenever a phase runs out, the next phase with a positive budget
follows, so zero-length phases are skipped. Running out of source samples
ends the note in Finished no matter which phase is active.

note_off cuts the note short: Fadeout if a fadeout time is set, otherwise
straight to Finished. Finished is terminal until the next note_on.
*/

/// `ln(1 - 0.99)`: each phase covers 99% of the distance to its target.
const SETTLE_LN: f32 = -4.605_170_2;

/// Per-sample factor so a phase settles within `samples` steps.
pub fn samples_to_factor(samples: usize) -> f32 {
    if samples == 0 {
        0.0
    } else {
        (SETTLE_LN / (samples as f32 + 1.0)).exp()
    }
}

/// Envelope state; see the module docs for the transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeState {
    Ready,
    Attack,
    Decay,
    Sustain,
    Release,
    Fadeout,
    Finished,
}

/// ADSR settings in seconds. `None` keeps the previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Adsr {
    pub attack: Option<f32>,
    pub decay: Option<f32>,
    /// Sustain gain, clamped to [0, 1].
    pub sustain: Option<f32>,
    pub release: Option<f32>,
}

impl Adsr {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: Some(attack),
            decay: Some(decay),
            sustain: Some(sustain),
            release: Some(release),
        }
    }
}

/// Phase budgets and factors latched at note-on.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Phases {
    attack: usize,
    decay: usize,
    sustain: usize,
    release: usize,
    sustain_level: f32,
    attack_factor: f32,
    decay_factor: f32,
    release_factor: f32,
    // Source samples the note plays for, fadeout aside
    total: usize,
}

impl Default for Phases {
    fn default() -> Self {
        Self {
            attack: 0,
            decay: 0,
            sustain: 0,
            release: 0,
            sustain_level: 1.0,
            attack_factor: 0.0,
            decay_factor: 0.0,
            release_factor: 0.0,
            total: 0,
        }
    }
}

/// Budget, factor and target of the running phase.
#[derive(Debug, Clone, Copy)]
struct Segment {
    budget: usize,
    factor: f32,
    target: f32,
}

/// Gain generator for one sample voice. Starts finished; `note_on` arms it.
#[derive(Debug, Clone)]
pub struct Envelope {
    sample_rate: u32,

    current: Phases,
    pending: Phases,

    fadeout: usize,
    fadeout_factor: f32,

    state: EnvelopeState,
    gain: f32,
    position: usize, // next source index
    count: usize,    // samples spent in the running phase
}

impl Envelope {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            current: Phases::default(),
            pending: Phases::default(),
            fadeout: 0,
            fadeout_factor: 0.0,
            state: EnvelopeState::Finished,
            gain: 0.0,
            position: 0,
            count: 0,
        }
    }

    fn seconds_to_samples(&self, seconds: f32) -> usize {
        (seconds.max(0.0) * self.sample_rate as f32).round() as usize
    }

    /// Stage new ADSR values for the next note-on.
    ///
    /// `source_len` is the length of the sample being shaped. Sustain gets
    /// whatever the other phases leave of it. With no attack and no decay
    /// but a release, the note is release-only: it lasts `min(release,
    /// source_len)` samples and has no sustain.
    pub fn set_adsr(&mut self, adsr: Adsr, source_len: usize) {
        let mut next = self.pending;

        if let Some(attack) = adsr.attack {
            next.attack = self.seconds_to_samples(attack);
        }
        if let Some(decay) = adsr.decay {
            next.decay = self.seconds_to_samples(decay);
        }
        if let Some(release) = adsr.release {
            next.release = self.seconds_to_samples(release);
        }
        if let Some(sustain) = adsr.sustain {
            next.sustain_level = sustain;
        }
        next.sustain_level = next.sustain_level.clamp(0.0, 1.0);

        next.attack_factor = samples_to_factor(next.attack);
        next.decay_factor = samples_to_factor(next.decay);
        next.release_factor = samples_to_factor(next.release);

        if next.attack + next.decay == 0 && next.release > 0 {
            next.sustain = 0;
            next.total = next.release.min(source_len);
        } else {
            next.sustain = source_len.saturating_sub(next.attack + next.decay + next.release);
            next.total = source_len;
        }

        self.pending = next;
    }

    /// Fadeout length used after `note_off`. Negative values are ignored.
    pub fn set_fadeout(&mut self, seconds: f32) {
        if seconds >= 0.0 {
            self.fadeout = self.seconds_to_samples(seconds);
            self.fadeout_factor = samples_to_factor(self.fadeout);
        }
    }

    /// Restart from the first source sample with the pending ADSR values.
    pub fn note_on(&mut self) {
        self.current = self.pending;
        self.position = 0;
        self.count = 0;
        self.gain = 0.0;
        self.state = EnvelopeState::Ready;
    }

    /// Cut the note short: Fadeout if configured, otherwise Finished.
    ///
    /// A note that has not produced a sample yet finishes immediately.
    pub fn note_off(&mut self) {
        match self.state {
            EnvelopeState::Finished => {}
            EnvelopeState::Ready => self.finish(),
            _ if self.fadeout > 0 => {
                self.count = 0;
                self.state = EnvelopeState::Fadeout;
            }
            _ => self.finish(),
        }
    }

    /// Jump to Finished with zero gain.
    pub fn finish(&mut self) {
        self.count = 0;
        self.gain = 0.0;
        self.state = EnvelopeState::Finished;
    }

    fn segment(&self) -> Option<Segment> {
        let phases = &self.current;
        let segment = match self.state {
            EnvelopeState::Attack => Segment {
                budget: phases.attack,
                factor: phases.attack_factor,
                target: 1.0,
            },
            EnvelopeState::Decay => Segment {
                budget: phases.decay,
                factor: phases.decay_factor,
                target: phases.sustain_level,
            },
            EnvelopeState::Sustain => Segment {
                budget: phases.sustain,
                factor: 1.0,
                target: phases.sustain_level,
            },
            EnvelopeState::Release => Segment {
                budget: phases.release,
                factor: phases.release_factor,
                target: 0.0,
            },
            EnvelopeState::Fadeout => Segment {
                budget: self.fadeout,
                factor: self.fadeout_factor,
                target: 0.0,
            },
            EnvelopeState::Ready | EnvelopeState::Finished => return None,
        };
        Some(segment)
    }

    /// Enter the first phase after `from` with a positive budget.
    fn advance(&mut self, from: EnvelopeState) {
        use EnvelopeState::*;

        self.count = 0;
        let phases = self.current;
        let order = [Attack, Decay, Sustain, Release, Fadeout];
        let start = match from {
            Ready => 0,
            Attack => 1,
            Decay => 2,
            Sustain => 3,
            Release => 4,
            Fadeout | Finished => order.len(),
        };

        for &next in &order[start..] {
            let (budget, gain) = match next {
                Attack => (phases.attack, 0.0),
                Decay => (phases.decay, 1.0),
                Sustain => (phases.sustain, phases.sustain_level),
                Release => (phases.release, phases.sustain_level),
                _ => (self.fadeout, self.gain),
            };
            if budget > 0 {
                self.state = next;
                self.gain = gain;
                return;
            }
        }

        self.finish();
    }

    /// Run the envelope over up to `len` source samples.
    ///
    /// `emit(offset, index, gain)` is called once per produced sample with
    /// its offset into the block, its source index and the gain to apply.
    /// Returns the number of samples produced; fewer than `len` means the
    /// note finished inside the block.
    pub fn render_with<F>(&mut self, len: usize, source_len: usize, mut emit: F) -> usize
    where
        F: FnMut(usize, usize, f32),
    {
        if self.state == EnvelopeState::Ready {
            self.advance(EnvelopeState::Ready);
        }

        let mut done = 0;
        while done < len {
            let Some(segment) = self.segment() else {
                break;
            };

            let n = (len - done)
                .min(segment.budget.saturating_sub(self.count))
                .min(source_len.saturating_sub(self.position));

            let glide = 1.0 - segment.factor;
            for k in 0..n {
                emit(done + k, self.position + k, self.gain);
                self.gain = segment.factor * self.gain + glide * segment.target;
            }

            self.count += n;
            self.position += n;
            done += n;

            if self.position >= source_len {
                self.finish();
            } else if self.count >= segment.budget {
                self.advance(self.state);
            }
        }

        done
    }

    /// Write the gain curve for up to `buffer.len()` source samples.
    pub fn render(&mut self, buffer: &mut [f32], source_len: usize) -> usize {
        self.render_with(buffer.len(), source_len, |offset, _, gain| {
            buffer[offset] = gain;
        })
    }

    /// Source samples left to play; 0 once finished.
    pub fn remaining_samples(&self) -> usize {
        let left = self.current.total.saturating_sub(self.position);
        match self.state {
            EnvelopeState::Finished => 0,
            EnvelopeState::Fadeout => left.min(self.fadeout.saturating_sub(self.count)),
            _ => left,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Finished
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Index of the next source sample.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Playable length latched at the last note-on.
    pub fn total_samples(&self) -> usize {
        self.current.total
    }

    /// Sustain budget latched at the last note-on.
    pub fn sustain_samples(&self) -> usize {
        self.current.sustain
    }

    pub fn fadeout_samples(&self) -> usize {
        self.fadeout
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
