//! WAV normalization decoder for web-recorder uploads.
//!
//! The source is already a WAV container but frequently at the wrong rate,
//! with extra channels, or recorded quietly. This path downmixes, resamples
//! to the canonical rate, and peak-normalizes before rewriting.

use std::path::{Path, PathBuf};

use super::{AudioDecoder, DecodeOutcome, absorb, canonical_path};
use crate::core::audio::{AudioError, CANONICAL_SAMPLE_RATE, dsp, wav};
use crate::core::format::DecodeFormat;

fn decode_to_canonical(source: &Path) -> Result<PathBuf, AudioError> {
    let wave = wav::read_mono(source)?;
    let mut samples = dsp::resample(&wave.samples, wave.sample_rate, CANONICAL_SAMPLE_RATE)?;

    // Peak-normalize; a silent recording is left as-is to avoid dividing by
    // zero.
    let peak = dsp::peak(&samples);
    if peak > 0.0 {
        for sample in &mut samples {
            *sample /= peak;
        }
    }

    let out = canonical_path(source);
    wav::write_mono(&out, &samples, CANONICAL_SAMPLE_RATE)?;
    Ok(out)
}

/// Decoder for `.wav` uploads of arbitrary rate/channels/amplitude.
pub struct WavPcmDecoder;

impl AudioDecoder for WavPcmDecoder {
    fn format(&self) -> DecodeFormat {
        DecodeFormat::WavPcm
    }

    fn decode(&self, source: &Path) -> DecodeOutcome {
        absorb(self.format(), source, decode_to_canonical(source))
    }
}
