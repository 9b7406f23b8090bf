use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::Adsr;
use crate::DEFAULT_SAMPLE_RATE;

/// Key and velocity range a sample answers to, both ends inclusive.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Zone {
    pub lo_key: u8,
    pub hi_key: u8,
    pub lo_vel: u8,
    pub hi_vel: u8,
}

impl Zone {
    pub fn new(lo_key: u8, hi_key: u8, lo_vel: u8, hi_vel: u8) -> Self {
        Self {
            lo_key,
            hi_key,
            lo_vel,
            hi_vel,
        }
    }

    /// Every key at every velocity.
    pub fn full() -> Self {
        Self::new(0, 127, 0, 127)
    }

    pub fn contains(&self, key: u8, velocity: u8) -> bool {
        (self.lo_key..=self.hi_key).contains(&key)
            && (self.lo_vel..=self.hi_vel).contains(&velocity)
    }
}

/// Sample-library entry: where the recording lives and how to play it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SampleParams {
    pub path: PathBuf,
    pub lo_key: u8,
    pub hi_key: u8,
    pub lo_vel: u8,
    pub hi_vel: u8,
    /// Amplitude velocity tracking, in percent. Carried as metadata.
    pub amp_vel_track: i32,
    pub attack: f32,  // seconds
    pub decay: f32,   // seconds
    pub release: f32, // seconds
    /// Gain held after decay, 0.0 - 1.0.
    pub sustain: f32,
    /// Rate the recording must have.
    pub sample_rate: u32,
    /// Mix into the destination instead of overwriting it.
    pub append: bool,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            lo_key: 0,
            hi_key: 0,
            lo_vel: 0,
            hi_vel: 0,
            amp_vel_track: 0,
            attack: 0.0,
            decay: 0.0,
            release: 0.0,
            sustain: 1.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            append: true,
        }
    }
}

impl SampleParams {
    pub fn adsr(&self) -> Adsr {
        Adsr::new(self.attack, self.decay, self.sustain, self.release)
    }

    pub fn zone(&self) -> Zone {
        Zone::new(self.lo_key, self.hi_key, self.lo_vel, self.hi_vel)
    }
}
