/// Convert a float sample to 16-bit, rounding half away from zero.
///
/// Positive values scale by 32767 and the rest by 32768, the same asymmetry
/// [`unpack`] undoes. Out-of-range input saturates.
pub fn quantize(sample: f32) -> i16 {
    if sample > 0.0 {
        (i16::MAX as f32 * sample + 0.5) as i16
    } else {
        (-(i16::MIN as f32) * sample - 0.5) as i16
    }
}

/// Convert a 16-bit code to float: 32767 maps to 1.0 and -32768 to -1.0.
#[inline]
pub fn unpack(code: i16) -> f32 {
    if code >= 0 {
        code as f32 / i16::MAX as f32
    } else {
        code as f32 / -(i16::MIN as f32)
    }
}

/// Immutable mono recording stored as 16-bit codes.
///
/// Players share one buffer through `Arc<SampleBuffer>` and keep their own
/// playback cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    data: Vec<i16>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn from_i16(data: Vec<i16>, sample_rate: u32) -> Self {
        Self { data, sample_rate }
    }

    /// Quantize float samples in [-1, 1].
    pub fn from_f32(samples: &[f32], sample_rate: u32) -> Self {
        Self {
            data: samples.iter().copied().map(quantize).collect(),
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn codes(&self) -> &[i16] {
        &self.data
    }

    /// Sample `index` as float, 0.0 past the end.
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.data.get(index).copied().map(unpack).unwrap_or(0.0)
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f32 {
        self.data.len() as f32 / self.sample_rate.max(1) as f32
    }
}
