//! Core data model shared across the transcription pipeline.
//!
//! Two types cross every boundary in the system:
//! - [`AudioMeta`] carries request context downward (provider tag, declared
//!   MIME type, requested language).
//! - [`TranscriptResult`] is the uniform envelope every pipeline run produces,
//!   regardless of which transcription engine ran.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance and context for one transcription request.
///
/// Created by the request boundary, consumed by the orchestrator and the
/// language normalizer. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMeta {
    /// Free-form source tag, e.g. "whatsapp", "teams", "web".
    pub provider: String,

    /// Declared MIME type. Possibly empty or unreliable; the format resolver
    /// treats it as the strongest of several weak signals.
    pub content_type: String,

    /// Requested language tag, normalized per engine before transcription.
    pub lang: String,
}

impl AudioMeta {
    /// Default requested language when the caller does not supply one.
    pub const DEFAULT_LANG: &'static str = "es";

    /// Create metadata for a request, defaulting the language when empty.
    pub fn new(
        provider: impl Into<String>,
        content_type: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        let lang: String = lang.into();
        Self {
            provider: provider.into(),
            content_type: content_type.into(),
            lang: if lang.trim().is_empty() {
                Self::DEFAULT_LANG.to_string()
            } else {
                lang
            },
        }
    }
}

/// The uniform output envelope of one pipeline run.
///
/// Created exactly once per request, by the orchestrator or by a
/// transcription port on failure; never mutated after construction. The core
/// does not persist it - the caller owns serialization and lifetime.
///
/// Invariant: an error descriptor in `raw` implies `text` is empty and
/// `confidence` is 0.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// Final transcript, possibly empty.
    pub text: String,

    /// Engine-derived confidence in [0.0, 1.0]; 0.0 when unknown or failed.
    pub confidence: f32,

    /// The language tag actually used, post-normalization.
    pub language: String,

    /// Creation instant.
    pub timestamp: DateTime<Utc>,

    /// Source tag copied from [`AudioMeta`].
    pub provider: String,

    /// Content type or extension that informed decoding.
    pub original_format: String,

    /// Opaque payload: the engine's raw response, or an error descriptor.
    /// Dropped by the compact external view at the serialization boundary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl TranscriptResult {
    /// Build a failure envelope: empty text, zero confidence, and an error
    /// descriptor under the `error` key of `raw`.
    pub fn failure(
        meta: &AudioMeta,
        language: impl Into<String>,
        original_format: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            language: language.into(),
            timestamp: Utc::now(),
            provider: meta.provider.clone(),
            original_format: original_format.into(),
            raw: Some(serde_json::json!({ "error": detail.into() })),
        }
    }

    /// Whether this envelope carries an error descriptor rather than a
    /// transcript.
    pub fn is_error(&self) -> bool {
        self.raw
            .as_ref()
            .and_then(|v| v.get("error"))
            .is_some()
    }

    /// Compact external view: the full envelope minus the `raw` payload.
    pub fn to_compact_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(map) = value.as_object_mut() {
            map.remove("raw");
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_defaults_language() {
        let meta = AudioMeta::new("whatsapp", "audio/ogg", "");
        assert_eq!(meta.lang, "es");

        let meta = AudioMeta::new("teams", "audio/mp4", "en-GB");
        assert_eq!(meta.lang, "en-GB");
    }

    #[test]
    fn test_failure_envelope_invariant() {
        let meta = AudioMeta::new("web", "audio/wav", "es");
        let result = TranscriptResult::failure(&meta, "es", "audio/wav", "engine unreachable");

        assert!(result.text.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert!(result.is_error());
        assert_eq!(
            result.raw.as_ref().unwrap()["error"],
            "engine unreachable"
        );
    }

    #[test]
    fn test_compact_view_drops_raw() {
        let meta = AudioMeta::new("web", "audio/wav", "es");
        let result = TranscriptResult::failure(&meta, "es", "audio/wav", "boom");

        let compact = result.to_compact_json();
        assert!(compact.get("raw").is_none());
        assert_eq!(compact["provider"], "web");

        let full = serde_json::to_value(&result).unwrap();
        assert!(full.get("raw").is_some());
    }
}
