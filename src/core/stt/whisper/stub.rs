//! Stub Whisper engine for builds without the `whisper-local` feature.

use std::path::Path;

use async_trait::async_trait;

use super::config::WhisperConfig;
use crate::core::stt::{SttEngine, SttError, TranscriberOutput, TranscriberPort};

/// Placeholder engine: constructable so configuration can be validated, but
/// every transcription reports the engine as unavailable.
pub struct WhisperStt {
    #[allow(dead_code)]
    config: WhisperConfig,
}

impl WhisperStt {
    /// Create a disabled engine instance.
    pub fn new(config: WhisperConfig) -> Result<Self, SttError> {
        config.validate().map_err(SttError::ConfigurationError)?;
        Ok(Self { config })
    }
}

#[async_trait]
impl TranscriberPort for WhisperStt {
    fn engine(&self) -> SttEngine {
        SttEngine::Whisper
    }

    fn provider_info(&self) -> &'static str {
        "Whisper (local, disabled)"
    }

    async fn transcribe(
        &self,
        _wav_path: &Path,
        _language: &str,
    ) -> Result<TranscriberOutput, SttError> {
        Err(SttError::EngineUnavailable(
            "this build does not include local Whisper; rebuild with --features whisper-local"
                .to_string(),
        ))
    }
}
