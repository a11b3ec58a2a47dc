//! Response types for the Google Cloud Speech `speech:recognize` API.

use serde::{Deserialize, Serialize};

/// Top-level synchronous recognition response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GoogleRecognizeResponse {
    /// Sequential chunks of recognized audio.
    #[serde(default)]
    pub results: Vec<GoogleSpeechResult>,
}

/// One recognized chunk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleSpeechResult {
    /// Ranked alternatives; the first is the most likely.
    #[serde(default)]
    pub alternatives: Vec<GoogleSpeechAlternative>,
}

/// One transcription hypothesis.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleSpeechAlternative {
    #[serde(default)]
    pub transcript: String,

    #[serde(default)]
    pub confidence: Option<f32>,
}

impl GoogleRecognizeResponse {
    /// Join the top alternative of every result chunk into one transcript.
    pub fn full_transcript(&self) -> String {
        self.results
            .iter()
            .filter_map(|result| result.alternatives.first())
            .map(|alt| alt.transcript.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Mean confidence across the top alternatives; 0.0 when none report it.
    pub fn mean_confidence(&self) -> f32 {
        let confidences: Vec<f32> = self
            .results
            .iter()
            .filter_map(|result| result.alternatives.first())
            .filter_map(|alt| alt.confidence)
            .collect();

        if confidences.is_empty() {
            return 0.0;
        }
        confidences.iter().sum::<f32>() / confidences.len() as f32
    }
}
