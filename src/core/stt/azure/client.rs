//! Azure Speech-to-Text client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::config::AzureSttConfig;
use super::messages::AzureRecognitionResponse;
use crate::core::stt::{SttEngine, SttError, TranscriberOutput, TranscriberPort};

/// Azure Speech-to-Text engine over the short-audio REST endpoint.
pub struct AzureStt {
    config: AzureSttConfig,
    /// Reused across requests for connection pooling.
    http_client: Client,
}

impl AzureStt {
    /// Create a client, validating credentials up front.
    pub fn new(config: AzureSttConfig) -> Result<Self, SttError> {
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
impl TranscriberPort for AzureStt {
    fn engine(&self) -> SttEngine {
        SttEngine::Azure
    }

    fn provider_info(&self) -> &'static str {
        "Azure Speech-to-Text"
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
            language, "sending audio to Azure Speech"
        );

        let response = self
            .http_client
            .post(self.config.endpoint_url())
            .header("Ocp-Apim-Subscription-Key", &self.config.subscription_key)
            .header(
                "Content-Type",
                "audio/wav; codecs=audio/pcm; samplerate=16000",
            )
            .header("Accept", "application/json")
            .query(&[("language", language), ("format", "detailed")])
            .body(audio)
            .send()
            .await
            .map_err(|e| SttError::TransportError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SttError::EngineError(format!(
                "Azure Speech returned {status}: {body}"
            )));
        }

        let parsed: AzureRecognitionResponse = response
            .json()
            .await
            .map_err(|e| SttError::EngineError(format!("unparseable Azure response: {e}")))?;

        info!(
            status = %parsed.recognition_status,
            "Azure Speech recognition finished"
        );

        let raw = serde_json::to_value(&parsed).unwrap_or_default();
        Ok(TranscriberOutput::Fields(serde_json::json!({
            "text": parsed.best_text(),
            "confidence": parsed.best_confidence(),
            "response": raw,
        })))
    }
}
