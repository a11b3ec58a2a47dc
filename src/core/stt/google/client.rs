//! Google Cloud Speech-to-Text client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use tracing::{debug, info};

use super::config::GoogleSttConfig;
use super::messages::GoogleRecognizeResponse;
use crate::core::stt::{SttEngine, SttError, TranscriberOutput, TranscriberPort};

/// Google Cloud Speech-to-Text engine over the synchronous REST endpoint.
pub struct GoogleStt {
    config: GoogleSttConfig,
    /// Reused across requests for connection pooling.
    http_client: Client,
}

impl GoogleStt {
    /// Create a client, validating credentials up front.
    pub fn new(config: GoogleSttConfig) -> Result<Self, SttError> {
        config.validate().map_err(SttError::AuthenticationFailed)?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| {
                SttError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl TranscriberPort for GoogleStt {
    fn engine(&self) -> SttEngine {
        SttEngine::Google
    }

    fn provider_info(&self) -> &'static str {
        "Google Cloud Speech-to-Text"
    }

    async fn transcribe(
        &self,
        wav_path: &Path,
        language: &str,
    ) -> Result<TranscriberOutput, SttError> {
        let audio = tokio::fs::read(wav_path)
            .await
            .map_err(|e| SttError::AudioProcessingError(format!("reading audio: {e}")))?;

        debug!(
            bytes = audio.len(),
            language, "sending audio to Google Speech"
        );

        // WAV carries its own encoding and rate in the header, so the
        // request config stays minimal.
        let body = serde_json::json!({
            "config": { "languageCode": language },
            "audio": { "content": BASE64.encode(&audio) },
        });

        let response = self
            .http_client
            .post(self.config.endpoint_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| SttError::TransportError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SttError::EngineError(format!(
                "Google Speech returned {status}: {body}"
            )));
        }

        let parsed: GoogleRecognizeResponse = response
            .json()
            .await
            .map_err(|e| SttError::EngineError(format!("unparseable Google response: {e}")))?;

        info!(
            results = parsed.results.len(),
            "Google Speech recognition finished"
        );

        let raw = serde_json::to_value(&parsed).unwrap_or_default();
        Ok(TranscriberOutput::Fields(serde_json::json!({
            "text": parsed.full_transcript(),
            "confidence": parsed.mean_confidence(),
            "response": raw,
        })))
    }
}
