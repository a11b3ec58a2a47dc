//! Transcription engines behind one capability boundary.
//!
//! Each engine implements [`TranscriberPort`]: turn canonical audio plus a
//! normalized language tag into text. The port is deliberately tolerant about
//! return shape - engines have historically disagreed on it - so the
//! [`TranscriberOutput`] union carries whichever shape an engine produces and
//! the pipeline orchestrator flattens it into the uniform envelope.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::TranscriptResult;

pub mod azure;
pub mod google;
pub mod language;
pub mod whisper;

pub use azure::{AzureStt, AzureSttConfig};
pub use google::{GoogleStt, GoogleSttConfig};
pub use whisper::{WhisperConfig, WhisperStt};

/// Supported transcription engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SttEngine {
    /// Local Whisper inference via whisper.cpp.
    Whisper,
    /// Azure Speech-to-Text REST API.
    Azure,
    /// Google Cloud Speech-to-Text REST API.
    Google,
}

impl std::fmt::Display for SttEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SttEngine::Whisper => write!(f, "whisper"),
            SttEngine::Azure => write!(f, "azure"),
            SttEngine::Google => write!(f, "google"),
        }
    }
}

impl std::str::FromStr for SttEngine {
    type Err = SttError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whisper" | "local" => Ok(SttEngine::Whisper),
            "azure" | "azure-speech" => Ok(SttEngine::Azure),
            "google" | "google-speech" => Ok(SttEngine::Google),
            _ => Err(SttError::ConfigurationError(format!(
                "Unsupported STT engine: {s}. Supported engines: whisper, azure, google"
            ))),
        }
    }
}

/// Errors raised by transcription engines.
#[derive(Debug, Error)]
pub enum SttError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Engine rejected the request: {0}")]
    EngineError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),
}

/// The heterogeneous shapes a transcription engine may return.
///
/// Normalized into one [`TranscriptResult`] at the orchestration boundary;
/// nothing downstream of the pipeline ever sees this union.
#[derive(Debug, Clone)]
pub enum TranscriberOutput {
    /// A fully-formed result envelope.
    Envelope(TranscriptResult),
    /// A key-value result with at least `text` and optionally `confidence`;
    /// carried verbatim into the envelope's `raw` payload.
    Fields(serde_json::Value),
    /// A bare transcript string.
    Text(String),
}

/// Capability boundary implemented by every transcription engine.
#[async_trait]
pub trait TranscriberPort: Send + Sync {
    /// Which engine this port is.
    fn engine(&self) -> SttEngine;

    /// Human-readable provider description for logs and health output.
    fn provider_info(&self) -> &'static str;

    /// Transcribe canonical audio at `wav_path` using an already-normalized
    /// language tag. Errors are captured into the result envelope by the
    /// orchestrator; they never propagate past the pipeline.
    async fn transcribe(
        &self,
        wav_path: &Path,
        language: &str,
    ) -> Result<TranscriberOutput, SttError>;
}

/// Per-engine settings gathered from server configuration. An engine with no
/// settings is simply not constructable on this deployment.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub whisper: Option<WhisperConfig>,
    pub azure: Option<AzureSttConfig>,
    pub google: Option<GoogleSttConfig>,
}

/// Factory over the closed engine set.
pub fn create_transcriber(
    engine: SttEngine,
    settings: &EngineSettings,
) -> Result<Arc<dyn TranscriberPort>, SttError> {
    match engine {
        SttEngine::Whisper => {
            let config = settings.whisper.clone().ok_or_else(|| {
                SttError::ConfigurationError("Whisper model path is not configured".to_string())
            })?;
            Ok(Arc::new(WhisperStt::new(config)?))
        }
        SttEngine::Azure => {
            let config = settings.azure.clone().ok_or_else(|| {
                SttError::ConfigurationError(
                    "Azure Speech subscription key/region are not configured".to_string(),
                )
            })?;
            Ok(Arc::new(AzureStt::new(config)?))
        }
        SttEngine::Google => {
            let config = settings.google.clone().ok_or_else(|| {
                SttError::ConfigurationError(
                    "Google Speech API key is not configured".to_string(),
                )
            })?;
            Ok(Arc::new(GoogleStt::new(config)?))
        }
    }
}
