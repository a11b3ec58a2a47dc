//! Pipeline orchestration: decode, denoise, transcribe, normalize.
//!
//! One pipeline instance runs one request's three stages strictly in
//! sequence; each stage consumes the previous stage's output file. The
//! public contract is "always returns a result, never throws": decode and
//! denoise failures are absorbed by their own stages (the audio degrades,
//! the pipeline proceeds), and a transcription failure comes back as a
//! failure envelope rather than an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::decode::AudioDecoder;
use super::denoise::NoiseReducer;
use super::stt::{TranscriberOutput, TranscriberPort, language};
use super::types::{AudioMeta, TranscriptResult};

/// Sequences one request through decode, denoise, and transcription.
///
/// Stateless with respect to request data; safe to construct per request or
/// reuse across them.
pub struct TranscriptionPipeline {
    decoder: Arc<dyn AudioDecoder>,
    denoiser: Arc<NoiseReducer>,
    transcriber: Arc<dyn TranscriberPort>,
}

impl TranscriptionPipeline {
    pub fn new(
        decoder: Arc<dyn AudioDecoder>,
        denoiser: Arc<NoiseReducer>,
        transcriber: Arc<dyn TranscriberPort>,
    ) -> Self {
        Self {
            decoder,
            denoiser,
            transcriber,
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// The decode and denoise stages are CPU-bound and run on the blocking
    /// pool so one slow request does not stall the async workers.
    pub async fn run(&self, source: &Path, meta: &AudioMeta) -> TranscriptResult {
        let original_format = if meta.content_type.trim().is_empty() {
            source
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_string()
        } else {
            meta.content_type.clone()
        };

        let language = language::normalize_for(self.transcriber.engine(), &meta.lang);

        let decoded_path = self.decode_stage(source).await;
        let clean_path = self.denoise_stage(&decoded_path).await;

        info!(
            engine = %self.transcriber.engine(),
            provider = %meta.provider,
            language = %language,
            audio = %clean_path.display(),
            "invoking transcription engine"
        );

        match self.transcriber.transcribe(&clean_path, &language).await {
            Ok(output) => normalize_output(output, meta, &language, &original_format),
            Err(e) => {
                warn!(
                    engine = %self.transcriber.engine(),
                    error = %e,
                    "transcription failed"
                );
                TranscriptResult::failure(meta, language, original_format, e.to_string())
            }
        }
    }

    async fn decode_stage(&self, source: &Path) -> PathBuf {
        let decoder = Arc::clone(&self.decoder);
        let source_path = source.to_path_buf();
        let fallback = source.to_path_buf();

        match tokio::task::spawn_blocking(move || decoder.decode(&source_path)).await {
            Ok(outcome) => outcome.path,
            // A panicked or cancelled worker is absorbed like any other
            // decode failure: the original audio proceeds unmodified.
            Err(e) => {
                warn!(error = %e, "decode stage did not complete, passing source through");
                fallback
            }
        }
    }

    async fn denoise_stage(&self, decoded: &Path) -> PathBuf {
        let denoiser = Arc::clone(&self.denoiser);
        let decoded_path = decoded.to_path_buf();
        let fallback = decoded.to_path_buf();

        match tokio::task::spawn_blocking(move || denoiser.reduce(&decoded_path)).await {
            Ok(outcome) => outcome.path,
            Err(e) => {
                warn!(error = %e, "denoise stage did not complete, passing audio through");
                fallback
            }
        }
    }
}

/// Flatten whichever shape the engine returned into the uniform envelope.
fn normalize_output(
    output: TranscriberOutput,
    meta: &AudioMeta,
    language: &str,
    original_format: &str,
) -> TranscriptResult {
    match output {
        TranscriberOutput::Envelope(result) => result,
        TranscriberOutput::Fields(fields) => {
            let text = fields
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let confidence = fields
                .get("confidence")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0) as f32;

            TranscriptResult {
                text,
                confidence,
                language: language.to_string(),
                timestamp: Utc::now(),
                provider: meta.provider.clone(),
                original_format: original_format.to_string(),
                raw: Some(fields),
            }
        }
        TranscriberOutput::Text(text) => TranscriptResult {
            text,
            confidence: 0.0,
            language: language.to_string(),
            timestamp: Utc::now(),
            provider: meta.provider.clone(),
            original_format: original_format.to_string(),
            raw: None,
        },
    }
}
