//! Response types for the Azure Speech short-audio REST API.

use serde::{Deserialize, Serialize};

/// Top-level recognition response (`format=detailed`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AzureRecognitionResponse {
    /// "Success", "NoMatch", "InitialSilenceTimeout", ...
    #[serde(rename = "RecognitionStatus")]
    pub recognition_status: String,

    /// Best display-form transcript.
    #[serde(rename = "DisplayText", default)]
    pub display_text: Option<String>,

    /// Offset of the recognized speech in 100-ns ticks.
    #[serde(rename = "Offset", default)]
    pub offset: Option<u64>,

    /// Duration of the recognized speech in 100-ns ticks.
    #[serde(rename = "Duration", default)]
    pub duration: Option<u64>,

    /// Ranked alternatives with confidence, present in detailed format.
    #[serde(rename = "NBest", default)]
    pub n_best: Vec<AzureNBestEntry>,
}

/// One ranked recognition alternative.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AzureNBestEntry {
    #[serde(rename = "Confidence", default)]
    pub confidence: Option<f32>,

    #[serde(rename = "Display", default)]
    pub display: Option<String>,

    #[serde(rename = "Lexical", default)]
    pub lexical: Option<String>,
}

impl AzureRecognitionResponse {
    /// Whether recognition produced a transcript.
    pub fn is_success(&self) -> bool {
        self.recognition_status == "Success"
    }

    /// Best transcript text: `DisplayText`, falling back to the top
    /// alternative's display form.
    pub fn best_text(&self) -> String {
        if let Some(text) = &self.display_text {
            return text.clone();
        }
        self.n_best
            .first()
            .and_then(|entry| entry.display.clone())
            .unwrap_or_default()
    }

    /// Confidence of the top alternative; the short-audio endpoint omits it
    /// in simple responses, in which case a successful match counts as 1.0.
    pub fn best_confidence(&self) -> f32 {
        if let Some(confidence) = self.n_best.first().and_then(|entry| entry.confidence) {
            return confidence;
        }
        if self.is_success() { 1.0 } else { 0.0 }
    }
}
