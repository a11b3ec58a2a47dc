//! Language tag normalization, one mapping per engine family.
//!
//! Callers send loosely-formatted tags ("es", "es-MX", "ES"); each engine
//! expects its own exact shape. These functions are total and pure: any
//! input, including empty, maps to a usable tag without ever failing.

use super::SttEngine;

/// Base language for Whisper: strip the regional suffix and lowercase.
/// `"es-MX"` becomes `"es"`; empty input defaults to `"en"`.
pub fn for_whisper(lang: &str) -> String {
    let base = lang.split('-').next().unwrap_or_default().trim();
    if base.is_empty() {
        "en".to_string()
    } else {
        base.to_lowercase()
    }
}

/// Regional tag for Azure, which requires a fixed `ll-RR` form.
///
/// The base language maps through the supported table; an unmapped base
/// passes the original input through unchanged (Azure reports the
/// unsupported language itself, which is more actionable than guessing).
pub fn for_azure(lang: &str) -> String {
    let base = lang.split('-').next().unwrap_or_default().trim().to_lowercase();

    let mapped = match base.as_str() {
        "es" => "es-MX",
        "en" => "en-US",
        "pt" => "pt-BR",
        "fr" => "fr-FR",
        "de" => "de-DE",
        "it" => "it-IT",
        "ja" => "ja-JP",
        "ko" => "ko-KR",
        "zh" => "zh-CN",
        _ => "",
    };

    if !mapped.is_empty() {
        mapped.to_string()
    } else if lang.trim().is_empty() {
        "en-US".to_string()
    } else {
        lang.to_string()
    }
}

/// Google accepts free-form regional tags; pass through, defaulting when
/// empty.
pub fn for_google(lang: &str) -> String {
    if lang.trim().is_empty() {
        "en-US".to_string()
    } else {
        lang.to_string()
    }
}

/// Normalize a requested tag for a specific engine.
pub fn normalize_for(engine: SttEngine, lang: &str) -> String {
    match engine {
        SttEngine::Whisper => for_whisper(lang),
        SttEngine::Azure => for_azure(lang),
        SttEngine::Google => for_google(lang),
    }
}
