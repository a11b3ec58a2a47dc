//! Configuration for the local Whisper engine.

use std::path::PathBuf;

/// Settings for [`super::WhisperStt`].
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to a ggml model file (e.g. `ggml-medium.bin`).
    pub model_path: PathBuf,

    /// Beam width for decoding. The default trades a little speed for
    /// noticeably better accuracy on voice notes.
    pub beam_size: usize,

    /// Sampling temperature; 0.0 keeps decoding deterministic.
    pub temperature: f32,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            beam_size: 5,
            temperature: 0.0,
        }
    }
}

impl WhisperConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_path.as_os_str().is_empty() {
            return Err("Whisper model path is required".to_string());
        }
        if self.beam_size == 0 {
            return Err("Whisper beam size must be at least 1".to_string());
        }
        Ok(())
    }
}
