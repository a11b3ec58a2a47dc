//! Tunables for the noise reduction chain.
//!
//! The thresholds were tuned empirically against representative voice-note
//! audio; they are configuration defaults, not derived constants, and the
//! test suite exercises them against synthetic signals.

/// Configuration for [`super::NoiseReducer`].
#[derive(Debug, Clone)]
pub struct DenoiseConfig {
    /// Lower band-pass cutoff in Hz. The 300-3400 Hz default is the
    /// telephony voice band.
    pub band_low_hz: f32,

    /// Upper band-pass cutoff in Hz.
    pub band_high_hz: f32,

    /// Leading/trailing frames quieter than this many dB below the peak
    /// frame are trimmed.
    pub trim_threshold_db: f32,

    /// Short-time analysis frame length in samples.
    pub frame_len: usize,

    /// Hop between analysis frames in samples.
    pub hop_len: usize,

    /// RMS noise-floor level above which the strong reduction proportion is
    /// used. Clean recordings stay below this and get the light proportion,
    /// which preserves intelligibility.
    pub noise_rms_threshold: f32,

    /// Spectral subtraction proportion for noisy input.
    pub strong_reduction: f32,

    /// Spectral subtraction proportion for clean input.
    pub light_reduction: f32,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            band_low_hz: 300.0,
            band_high_hz: 3400.0,
            trim_threshold_db: 25.0,
            frame_len: 2048,
            hop_len: 512,
            noise_rms_threshold: 0.02,
            strong_reduction: 0.9,
            light_reduction: 0.6,
        }
    }
}

impl DenoiseConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.band_low_hz <= 0.0 || self.band_high_hz <= self.band_low_hz {
            return Err(format!(
                "band edges must satisfy 0 < low < high, got {} and {}",
                self.band_low_hz, self.band_high_hz
            ));
        }

        if self.frame_len == 0 || self.hop_len == 0 || self.hop_len > self.frame_len {
            return Err(format!(
                "frame/hop lengths must satisfy 0 < hop <= frame, got {} and {}",
                self.frame_len, self.hop_len
            ));
        }

        for (name, value) in [
            ("strong_reduction", self.strong_reduction),
            ("light_reduction", self.light_reduction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within [0.0, 1.0], got {value}"));
            }
        }

        if self.trim_threshold_db <= 0.0 {
            return Err(format!(
                "trim threshold must be positive dB, got {}",
                self.trim_threshold_db
            ));
        }

        Ok(())
    }
}
