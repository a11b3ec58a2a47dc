//! The noise reduction engine.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::config::DenoiseConfig;
use super::spectral;
use crate::core::audio::{AudioError, dsp, wav};

/// How a denoise attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DenoiseStatus {
    /// The chain ran and the file was rewritten in place.
    Applied {
        /// Estimated noise floor (20th-percentile short-time RMS).
        noise_floor: f32,
        /// Spectral subtraction proportion that was used.
        reduction: f32,
    },
    /// The chain failed; the file is untouched.
    Skipped {
        /// Human-readable failure reason, for logs and tests.
        reason: String,
    },
}

/// Result of a denoise attempt: the path to hand to the transcription port,
/// plus the explicit marker for observability.
#[derive(Debug, Clone)]
pub struct DenoiseOutcome {
    pub path: PathBuf,
    pub status: DenoiseStatus,
}

impl DenoiseOutcome {
    /// Whether suppression actually ran.
    pub fn is_applied(&self) -> bool {
        matches!(self.status, DenoiseStatus::Applied { .. })
    }
}

struct Processed {
    samples: Vec<f32>,
    noise_floor: f32,
    reduction: f32,
}

/// Adaptive noise suppressor over canonical PCM WAV files.
pub struct NoiseReducer {
    config: DenoiseConfig,
}

impl NoiseReducer {
    pub fn new(config: DenoiseConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &DenoiseConfig {
        &self.config
    }

    /// Run the chain in place on `wav_path`. Never raises; a failure leaves
    /// the file untouched and reports [`DenoiseStatus::Skipped`].
    pub fn reduce(&self, wav_path: &Path) -> DenoiseOutcome {
        match self.process_file(wav_path) {
            Ok(processed) => {
                debug!(
                    path = %wav_path.display(),
                    noise_floor = processed.noise_floor,
                    reduction = processed.reduction,
                    "noise reduction applied"
                );
                DenoiseOutcome {
                    path: wav_path.to_path_buf(),
                    status: DenoiseStatus::Applied {
                        noise_floor: processed.noise_floor,
                        reduction: processed.reduction,
                    },
                }
            }
            Err(e) => {
                warn!(
                    path = %wav_path.display(),
                    error = %e,
                    "noise reduction failed, passing audio through unchanged"
                );
                DenoiseOutcome {
                    path: wav_path.to_path_buf(),
                    status: DenoiseStatus::Skipped {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    fn process_file(&self, wav_path: &Path) -> Result<Processed, AudioError> {
        let wave = wav::read_mono(wav_path)?;
        let processed = self.process(&wave.samples, wave.sample_rate)?;
        wav::write_mono(wav_path, &processed.samples, wave.sample_rate)?;
        Ok(processed)
    }

    fn process(&self, samples: &[f32], sample_rate: u32) -> Result<Processed, AudioError> {
        let cfg = &self.config;

        let banded = band_pass(samples, sample_rate, cfg.band_low_hz, cfg.band_high_hz);

        let trimmed = self.trim_silence(&banded);
        // An all-quiet signal trims to nothing; keep the band-passed audio
        // so the engines still receive something to reject on their own.
        let trimmed = if trimmed.is_empty() { &banded[..] } else { trimmed };

        let energies = dsp::frame_rms(trimmed, cfg.frame_len, cfg.hop_len);
        let noise_floor = dsp::percentile(&energies, 20.0);

        let reduction = if noise_floor > cfg.noise_rms_threshold {
            cfg.strong_reduction
        } else {
            cfg.light_reduction
        };

        let mut cleaned =
            spectral::subtract_noise(trimmed, cfg.frame_len, cfg.hop_len, reduction)?;

        // Clip, do not rescale: quiet output stays quiet.
        for sample in &mut cleaned {
            *sample = sample.clamp(-1.0, 1.0);
        }

        Ok(Processed {
            samples: cleaned,
            noise_floor,
            reduction,
        })
    }

    /// Drop leading/trailing frames whose RMS falls more than
    /// `trim_threshold_db` below the loudest frame.
    fn trim_silence<'a>(&self, samples: &'a [f32]) -> &'a [f32] {
        let cfg = &self.config;
        let energies = dsp::frame_rms(samples, cfg.frame_len, cfg.hop_len);
        if energies.is_empty() {
            return samples;
        }

        let peak = energies.iter().fold(0.0f32, |acc, e| acc.max(*e));
        if peak == 0.0 {
            return &[];
        }
        let threshold = peak * 10f32.powf(-cfg.trim_threshold_db / 20.0);

        let first = energies.iter().position(|e| *e >= threshold);
        let last = energies.iter().rposition(|e| *e >= threshold);
        match (first, last) {
            (Some(first), Some(last)) => {
                let start = first * cfg.hop_len;
                let end = (last * cfg.hop_len + cfg.frame_len).min(samples.len());
                &samples[start..end]
            }
            _ => &[],
        }
    }
}

/// First-order band-pass: a one-pole high-pass at `low_hz` cascaded with a
/// one-pole low-pass at `high_hz`.
fn band_pass(samples: &[f32], sample_rate: u32, low_hz: f32, high_hz: f32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let dt = 1.0 / sample_rate as f32;

    // High-pass stage removes rumble below the voice band.
    let rc = 1.0 / (2.0 * std::f32::consts::PI * low_hz);
    let alpha = rc / (rc + dt);
    let mut high_passed = Vec::with_capacity(samples.len());
    high_passed.push(samples[0]);
    for i in 1..samples.len() {
        let previous = high_passed[i - 1];
        high_passed.push(alpha * (previous + samples[i] - samples[i - 1]));
    }

    // Low-pass stage removes hiss above it.
    let rc = 1.0 / (2.0 * std::f32::consts::PI * high_hz);
    let alpha = dt / (rc + dt);
    let mut output = Vec::with_capacity(samples.len());
    output.push(alpha * high_passed[0]);
    for i in 1..high_passed.len() {
        let previous = output[i - 1];
        output.push(previous + alpha * (high_passed[i] - previous));
    }

    output
}
