//! Synthetic audio fixtures shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Samples in one second of canonical audio.
pub const SECOND: usize = 16_000;

/// Generate a sine wave at the given frequency and amplitude.
pub fn sine_wave(len: usize, freq: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    (0..len)
        .map(|i| {
            (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * amplitude
        })
        .collect()
}

/// Deterministic broadband noise from a linear congruential generator, so
/// assertions never depend on an RNG seed.
pub fn pseudo_noise(len: usize, amplitude: f32) -> Vec<f32> {
    let mut state = 0x9E37_79B9u32;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state as f32 / u32::MAX as f32 - 0.5) * 2.0 * amplitude
        })
        .collect()
}

/// All-zero samples.
pub fn silence(len: usize) -> Vec<f32> {
    vec![0.0; len]
}

/// RMS energy of a waveform.
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Write mono samples as a 16-bit PCM WAV at an arbitrary rate.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    write_wav_channels(path, samples, sample_rate, 1);
}

/// Write samples as a 16-bit PCM WAV, duplicating them across `channels`.
pub fn write_wav_channels(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(quantized).unwrap();
        }
    }
    writer.finalize().unwrap();
}
