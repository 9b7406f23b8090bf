use std::{
    fs::File,
    io::{BufReader, Read, Seek, Write},
    path::Path,
    sync::Arc,
};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{info, warn};

use crate::{
    dsp::upfirdn::ResampleError,
    sampler::{
        params::SampleParams,
        player::SamplePlayer,
        sample::{quantize, SampleBuffer},
    },
};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("wav: {0}")]
    Wav(#[from] hound::Error),
    #[error("expected a mono file, found {found} channels")]
    Channels { found: u16 },
    #[error("expected {expected} Hz, found {found} Hz")]
    SampleRate { expected: u32, found: u32 },
    #[error("file has no samples")]
    Empty,
    #[error(transparent)]
    Resample(#[from] ResampleError),
}

/// Read every sample as a 16-bit code.
///
/// 16-bit integer files are taken as-is. Other integer depths scale
/// positives by `2^(bits-1) - 1` and negatives by `2^(bits-1)`, matching
/// [`unpack`](crate::sampler::sample::unpack), before quantizing.
fn read_codes<R: Read>(reader: WavReader<R>) -> Result<Vec<i16>, hound::Error> {
    let spec = reader.spec();
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader.into_samples::<i16>().collect(),
        (SampleFormat::Int, bits) => {
            let negative = 2.0f64.powi(bits as i32 - 1);
            let positive = negative - 1.0;
            reader
                .into_samples::<i32>()
                .map(|sample| {
                    sample.map(|s| {
                        let scale = if s > 0 { positive } else { negative };
                        quantize((s as f64 / scale) as f32)
                    })
                })
                .collect()
        }
        (SampleFormat::Float, _) => reader
            .into_samples::<f32>()
            .map(|sample| sample.map(quantize))
            .collect(),
    }
}

/// Decode a mono WAV stream recorded at `expected_rate` and quantize it.
pub fn decode_sample<R: Read>(source: R, expected_rate: u32) -> Result<SampleBuffer, LoadError> {
    let reader = WavReader::new(source)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(LoadError::Channels {
            found: spec.channels,
        });
    }
    if spec.sample_rate != expected_rate {
        return Err(LoadError::SampleRate {
            expected: expected_rate,
            found: spec.sample_rate,
        });
    }

    let codes = read_codes(reader)?;
    if codes.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(SampleBuffer::from_i16(codes, spec.sample_rate))
}

/// Load a mono WAV file recorded at `expected_rate`.
pub fn load_sample(path: impl AsRef<Path>, expected_rate: u32) -> Result<SampleBuffer, LoadError> {
    let path = path.as_ref();
    let buffer = File::open(path)
        .map_err(hound::Error::from)
        .map_err(LoadError::from)
        .and_then(|file| decode_sample(BufReader::new(file), expected_rate));

    match &buffer {
        Ok(buffer) => info!(
            "loaded {} ({} samples, {:.2}s)",
            path.display(),
            buffer.len(),
            buffer.duration()
        ),
        Err(err) => warn!("failed to load sample {}: {err}", path.display()),
    }
    buffer
}

/// Write mono float samples as 16-bit PCM.
pub fn encode_wav<W: Write + Seek>(
    writer: W,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::new(writer, spec)?;
    for &sample in samples {
        writer.write_sample(quantize(sample))?;
    }
    writer.finalize()
}

pub fn write_wav(
    path: impl AsRef<Path>,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let file = std::io::BufWriter::new(File::create(path)?);
    encode_wav(file, samples, sample_rate)
}

impl SamplePlayer {
    /// Load `params.path` and build a player pitch-shifted by `up / down`.
    pub fn load(params: &SampleParams, up: u32, down: u32) -> Result<Self, LoadError> {
        let buffer = load_sample(&params.path, params.sample_rate)?;
        Ok(SamplePlayer::new(params, Arc::new(buffer), up, down)?)
    }
}
