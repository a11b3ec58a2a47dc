//! Configuration for the Google Cloud Speech-to-Text engine.

/// Settings for [`super::GoogleStt`].
#[derive(Debug, Clone)]
pub struct GoogleSttConfig {
    /// API key with the Speech-to-Text API enabled.
    pub api_key: String,

    /// Endpoint override; tests point this at a local mock server.
    pub endpoint: Option<String>,
}

impl GoogleSttConfig {
    /// Synchronous recognition endpoint URL.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/v1/speech:recognize", endpoint.trim_end_matches('/')),
            None => "https://speech.googleapis.com/v1/speech:recognize".to_string(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("Google Speech API key is required".to_string());
        }
        Ok(())
    }
}
