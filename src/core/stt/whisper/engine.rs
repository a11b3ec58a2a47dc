//! Whisper engine backed by whisper.cpp.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::config::WhisperConfig;
use crate::core::audio::{CANONICAL_SAMPLE_RATE, dsp, wav};
use crate::core::stt::{SttEngine, SttError, TranscriberOutput, TranscriberPort};
use crate::core::types::TranscriptResult;

/// Local Whisper transcription engine.
///
/// The model is loaded once at construction; each request gets its own
/// inference state, so a single engine instance serves concurrent requests.
pub struct WhisperStt {
    ctx: WhisperContext,
    config: WhisperConfig,
}

impl WhisperStt {
    /// Load the ggml model at the configured path.
    pub fn new(config: WhisperConfig) -> Result<Self, SttError> {
        config.validate().map_err(SttError::ConfigurationError)?;

        let path = config.model_path.to_str().ok_or_else(|| {
            SttError::ConfigurationError("Whisper model path is not valid UTF-8".to_string())
        })?;

        let ctx = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| {
                SttError::EngineUnavailable(format!("loading Whisper model {path}: {e}"))
            })?;

        info!(model = path, "Whisper model loaded");
        Ok(Self { ctx, config })
    }

    /// Load audio for inference: canonical PCM, resampled if a degraded
    /// upstream stage passed through a non-16 kHz file, peak-normalized so
    /// quiet recordings still drive the model.
    fn prepare_audio(&self, wav_path: &Path) -> Result<Vec<f32>, SttError> {
        let wave = wav::read_mono(wav_path)
            .map_err(|e| SttError::AudioProcessingError(e.to_string()))?;

        let mut samples = dsp::resample(&wave.samples, wave.sample_rate, CANONICAL_SAMPLE_RATE)
            .map_err(|e| SttError::AudioProcessingError(e.to_string()))?;

        let peak = dsp::peak(&samples);
        if peak > 0.0 {
            for sample in &mut samples {
                *sample /= peak;
            }
        }

        Ok(samples)
    }
}

#[async_trait]
impl TranscriberPort for WhisperStt {
    fn engine(&self) -> SttEngine {
        SttEngine::Whisper
    }

    fn provider_info(&self) -> &'static str {
        "Whisper (local)"
    }

    async fn transcribe(
        &self,
        wav_path: &Path,
        language: &str,
    ) -> Result<TranscriberOutput, SttError> {
        let samples = self.prepare_audio(wav_path)?;
        debug!(samples = samples.len(), language, "running Whisper inference");

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| SttError::EngineError(format!("Whisper state: {e}")))?;

        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: self.config.beam_size as i32,
            patience: 1.0,
        });
        params.set_language(Some(language));
        params.set_temperature(self.config.temperature);
        params.set_no_context(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &samples)
            .map_err(|e| SttError::EngineError(format!("Whisper inference: {e}")))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::EngineError(format!("Whisper segments: {e}")))?;

        let mut text = String::new();
        let mut segments = Vec::new();
        let mut prob_sum = 0.0f32;
        let mut prob_count = 0usize;

        for i in 0..n_segments {
            let segment_text = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::EngineError(format!("Whisper segment text: {e}")))?;
            let t0 = state.full_get_segment_t0(i).unwrap_or(0);
            let t1 = state.full_get_segment_t1(i).unwrap_or(0);

            let n_tokens = state.full_n_tokens(i).unwrap_or(0);
            for j in 0..n_tokens {
                if let Ok(prob) = state.full_get_token_prob(i, j) {
                    prob_sum += prob;
                    prob_count += 1;
                }
            }

            text.push_str(&segment_text);
            segments.push(serde_json::json!({
                // Whisper timestamps are in centiseconds.
                "start": t0 as f64 / 100.0,
                "end": t1 as f64 / 100.0,
                "text": segment_text.trim(),
            }));
        }

        let confidence = if prob_count > 0 {
            (prob_sum / prob_count as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

        Ok(TranscriberOutput::Envelope(TranscriptResult {
            text,
            confidence,
            language: language.to_string(),
            timestamp: Utc::now(),
            provider: "whisper".to_string(),
            original_format: "wav".to_string(),
            raw: Some(serde_json::json!({ "segments": segments })),
        }))
    }
}
