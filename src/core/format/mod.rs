//! Decode strategy resolution.
//!
//! Inbound audio arrives with partial, sometimes contradictory signals: a
//! declared MIME type, a file extension, and a caller-declared provider tag.
//! [`resolve`] turns those into one of the closed set of decode strategies,
//! trying the signals in order of reliability (MIME, then extension, then
//! provider alias) and falling back to OGG/Opus, the most common inbound
//! format in the target deployment.
//!
//! The resolver never fails; it reports which rule fired instead, because a
//! silent fallback to the wrong decoder is the dominant source of downstream
//! transcription quality loss.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

/// The closed set of decode strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodeFormat {
    /// Opus in an Ogg container (messaging-app voice notes).
    OggOpus,
    /// AAC in an M4A/MP4 container (enterprise-chat recordings).
    M4aAac,
    /// WAV, possibly at the wrong rate/channels/amplitude (web recorders).
    WavPcm,
}

impl DecodeFormat {
    /// Short identifier used in logs and responses.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OggOpus => "ogg-opus",
            Self::M4aAac => "m4a-aac",
            Self::WavPcm => "wav-pcm",
        }
    }
}

impl std::fmt::Display for DecodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which resolution rule selected the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvedBy {
    /// Declared MIME type matched the fixed table.
    Mime,
    /// File extension matched after MIME was absent or unrecognized.
    Extension,
    /// Provider alias matched after both of the above missed.
    Provider,
    /// Nothing matched; the OGG/Opus default applied.
    Default,
}

/// A decode strategy plus the rule that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatResolution {
    pub format: DecodeFormat,
    pub rule: ResolvedBy,
}

/// MIME type lookup. Parameters (e.g. `; codecs=opus`) are stripped first.
fn from_mime(content_type: &str) -> Option<DecodeFormat> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "audio/ogg" | "audio/opus" | "application/ogg" | "audio/x-opus+ogg" => {
            Some(DecodeFormat::OggOpus)
        }
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "audio/aac" | "audio/mpeg4-generic" => {
            Some(DecodeFormat::M4aAac)
        }
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Some(DecodeFormat::WavPcm),
        _ => None,
    }
}

/// File extension lookup.
fn from_extension(path: &Path) -> Option<DecodeFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "ogg" | "opus" => Some(DecodeFormat::OggOpus),
        "m4a" | "aac" | "mp4" => Some(DecodeFormat::M4aAac),
        "wav" => Some(DecodeFormat::WavPcm),
        _ => None,
    }
}

/// Provider alias lookup, case-insensitive and trimmed.
fn from_provider(provider: &str) -> Option<DecodeFormat> {
    match provider.trim().to_ascii_lowercase().as_str() {
        "wa" | "whatsapp" | "tg" | "telegram" => Some(DecodeFormat::OggOpus),
        "teams" | "msteams" | "messenger" => Some(DecodeFormat::M4aAac),
        "web" | "browser" => Some(DecodeFormat::WavPcm),
        _ => None,
    }
}

/// Resolve the decode strategy for one request. Total; first match wins.
pub fn resolve(
    content_type: Option<&str>,
    path: &Path,
    provider: Option<&str>,
) -> FormatResolution {
    let resolution = content_type
        .and_then(from_mime)
        .map(|format| FormatResolution {
            format,
            rule: ResolvedBy::Mime,
        })
        .or_else(|| {
            from_extension(path).map(|format| FormatResolution {
                format,
                rule: ResolvedBy::Extension,
            })
        })
        .or_else(|| {
            provider.and_then(from_provider).map(|format| FormatResolution {
                format,
                rule: ResolvedBy::Provider,
            })
        })
        .unwrap_or(FormatResolution {
            format: DecodeFormat::OggOpus,
            rule: ResolvedBy::Default,
        });

    info!(
        format = %resolution.format,
        rule = ?resolution.rule,
        content_type = content_type.unwrap_or(""),
        provider = provider.unwrap_or(""),
        "resolved decode strategy"
    );

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path(name: &str) -> PathBuf {
        PathBuf::from(format!("/tmp/{name}"))
    }

    #[test]
    fn test_mime_wins_over_extension() {
        // A .ogg file declared as WAV decodes as WAV: MIME is rule one.
        let r = resolve(Some("audio/wav"), &path("note.ogg"), Some("whatsapp"));
        assert_eq!(r.format, DecodeFormat::WavPcm);
        assert_eq!(r.rule, ResolvedBy::Mime);
    }

    #[test]
    fn test_mime_parameters_are_stripped() {
        let r = resolve(Some("audio/ogg; codecs=opus"), &path("note.bin"), None);
        assert_eq!(r.format, DecodeFormat::OggOpus);
        assert_eq!(r.rule, ResolvedBy::Mime);
    }

    #[test]
    fn test_all_supported_mime_types() {
        for (mime, expected) in [
            ("audio/ogg", DecodeFormat::OggOpus),
            ("audio/opus", DecodeFormat::OggOpus),
            ("application/ogg", DecodeFormat::OggOpus),
            ("audio/mp4", DecodeFormat::M4aAac),
            ("audio/m4a", DecodeFormat::M4aAac),
            ("audio/x-m4a", DecodeFormat::M4aAac),
            ("audio/aac", DecodeFormat::M4aAac),
            ("audio/wav", DecodeFormat::WavPcm),
            ("audio/x-wav", DecodeFormat::WavPcm),
            ("audio/wave", DecodeFormat::WavPcm),
        ] {
            let r = resolve(Some(mime), &path("clip.bin"), None);
            assert_eq!(r.format, expected, "mime {mime}");
            assert_eq!(r.rule, ResolvedBy::Mime, "mime {mime}");
        }
    }

    #[test]
    fn test_extension_used_when_mime_unrecognized() {
        for (name, expected) in [
            ("a.ogg", DecodeFormat::OggOpus),
            ("a.opus", DecodeFormat::OggOpus),
            ("a.m4a", DecodeFormat::M4aAac),
            ("a.aac", DecodeFormat::M4aAac),
            ("a.mp4", DecodeFormat::M4aAac),
            ("a.wav", DecodeFormat::WavPcm),
        ] {
            let r = resolve(Some("application/octet-stream"), &path(name), None);
            assert_eq!(r.format, expected, "file {name}");
            assert_eq!(r.rule, ResolvedBy::Extension, "file {name}");
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let r = resolve(None, &path("VOICE.OGG"), None);
        assert_eq!(r.format, DecodeFormat::OggOpus);
        assert_eq!(r.rule, ResolvedBy::Extension);
    }

    #[test]
    fn test_provider_alias_as_last_signal() {
        let r = resolve(None, &path("upload.bin"), Some("  WhatsApp  "));
        assert_eq!(r.format, DecodeFormat::OggOpus);
        assert_eq!(r.rule, ResolvedBy::Provider);

        let r = resolve(None, &path("upload.bin"), Some("MSTEAMS"));
        assert_eq!(r.format, DecodeFormat::M4aAac);

        let r = resolve(None, &path("upload.bin"), Some("web"));
        assert_eq!(r.format, DecodeFormat::WavPcm);
    }

    #[test]
    fn test_unrecognized_everything_defaults_to_ogg_opus() {
        let r = resolve(
            Some("video/quicktime"),
            &path("upload.mov"),
            Some("carrier-pigeon"),
        );
        assert_eq!(r.format, DecodeFormat::OggOpus);
        assert_eq!(r.rule, ResolvedBy::Default);

        let r = resolve(None, &path("upload"), None);
        assert_eq!(r.format, DecodeFormat::OggOpus);
        assert_eq!(r.rule, ResolvedBy::Default);
    }
}
