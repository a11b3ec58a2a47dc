//! Canonical WAV container I/O.
//!
//! Readers tolerate the sample formats real uploads arrive in (8/16/24/32-bit
//! integer and 32-bit float); the writer always produces the canonical shape:
//! mono, 16-bit PCM, at the caller-provided rate.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::{AudioError, dsp};

/// Decoded waveform plus its source rate.
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Interleaved-downmixed mono samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Source sample rate in Hz.
    pub sample_rate: u32,
}

/// Read a WAV file and downmix it to mono f32.
pub fn read_mono(path: &Path) -> Result<Waveform, AudioError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        (SampleFormat::Int, bits) if bits <= 32 => {
            let scale = 1.0 / (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()?
        }
        (format, bits) => {
            return Err(AudioError::UnsupportedLayout(format!(
                "unsupported WAV sample format {format:?}/{bits}-bit"
            )));
        }
    };

    Ok(Waveform {
        samples: dsp::downmix(&interleaved, channels),
        sample_rate: spec.sample_rate,
    })
}

/// Write mono f32 samples as a 16-bit PCM WAV file, clamping to [-1.0, 1.0].
pub fn write_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
