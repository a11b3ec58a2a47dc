//! Source-format decoders.
//!
//! Every decoder converts a source audio file of its assumed codec family to
//! canonical PCM (mono, 16 kHz, 16-bit WAV) at a deterministic path: the
//! source path with a `wav` extension.
//!
//! Decoders never raise. A failed conversion degrades to passing the original
//! file through so the pipeline can still attempt transcription; the outcome
//! carries an explicit marker so callers and tests can observe the
//! degradation without parsing logs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use super::format::DecodeFormat;

mod m4a_aac;
mod ogg_opus;
mod wav_pcm;

pub use m4a_aac::M4aAacDecoder;
pub use ogg_opus::OggOpusDecoder;
pub use wav_pcm::WavPcmDecoder;

/// How a decode attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The source was converted to canonical PCM.
    Converted,
    /// Decoding failed; the original file is passed through unchanged.
    PassedThrough {
        /// Human-readable failure reason, for logs and tests.
        reason: String,
    },
}

/// Result of a decode attempt: the path to hand to the next stage, plus the
/// explicit degradation marker.
#[derive(Debug, Clone)]
pub struct DecodeOutcome {
    /// Canonical output path on success, the unmodified source on failure.
    pub path: PathBuf,
    pub status: DecodeStatus,
}

impl DecodeOutcome {
    fn converted(path: PathBuf) -> Self {
        Self {
            path,
            status: DecodeStatus::Converted,
        }
    }

    fn passthrough(source: &Path, reason: String) -> Self {
        Self {
            path: source.to_path_buf(),
            status: DecodeStatus::PassedThrough { reason },
        }
    }

    /// Whether the source was actually converted.
    pub fn is_converted(&self) -> bool {
        self.status == DecodeStatus::Converted
    }
}

/// Capability boundary for the closed decoder family.
pub trait AudioDecoder: Send + Sync {
    /// The source format this decoder assumes.
    fn format(&self) -> DecodeFormat;

    /// Convert `source` to canonical PCM. Must not panic or return an error;
    /// failures degrade to a [`DecodeStatus::PassedThrough`] outcome.
    fn decode(&self, source: &Path) -> DecodeOutcome;
}

/// Canonical output path for a source file: same stem, `wav` extension.
pub(crate) fn canonical_path(source: &Path) -> PathBuf {
    source.with_extension("wav")
}

/// Wrap a fallible conversion into the never-raising decoder contract.
pub(crate) fn absorb(
    format: DecodeFormat,
    source: &Path,
    result: Result<PathBuf, super::audio::AudioError>,
) -> DecodeOutcome {
    match result {
        Ok(path) => DecodeOutcome::converted(path),
        Err(e) => {
            warn!(
                decoder = %format,
                source = %source.display(),
                error = %e,
                "decode failed, passing source through unchanged"
            );
            DecodeOutcome::passthrough(source, e.to_string())
        }
    }
}

/// Select the decoder for a resolved format.
pub fn decoder_for(format: DecodeFormat) -> Arc<dyn AudioDecoder> {
    match format {
        DecodeFormat::OggOpus => Arc::new(OggOpusDecoder),
        DecodeFormat::M4aAac => Arc::new(M4aAacDecoder),
        DecodeFormat::WavPcm => Arc::new(WavPcmDecoder),
    }
}
