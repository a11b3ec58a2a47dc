//! Configuration for the Azure Speech-to-Text engine.

/// Settings for [`super::AzureStt`].
#[derive(Debug, Clone)]
pub struct AzureSttConfig {
    /// Subscription key from the Azure Portal
    /// (Speech resource -> Keys and Endpoint).
    pub subscription_key: String,

    /// Region the Speech resource is deployed in (e.g. "eastus"). The
    /// subscription key is tied to this region.
    pub region: String,

    /// Full endpoint override. When unset the regional endpoint is derived
    /// from `region`; tests point this at a local mock server.
    pub endpoint: Option<String>,
}

impl AzureSttConfig {
    /// Recognition endpoint URL for this configuration.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!(
                "{}/speech/recognition/conversation/cognitiveservices/v1",
                endpoint.trim_end_matches('/')
            ),
            None => format!(
                "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
                self.region
            ),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.subscription_key.is_empty() {
            return Err("Azure subscription key is required".to_string());
        }
        if self.region.is_empty() && self.endpoint.is_none() {
            return Err("Azure region is required when no endpoint override is set".to_string());
        }
        Ok(())
    }
}
