//! Pipeline Orchestration Tests
//!
//! End-to-end exercises of decode -> denoise -> transcribe against mock
//! transcription ports: result-shape normalization, the never-throw failure
//! contract, and the canonical-audio guarantees the ports rely on.

mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scribe_gateway::core::decode::decoder_for;
use scribe_gateway::core::denoise::{DenoiseConfig, NoiseReducer};
use scribe_gateway::core::format;
use scribe_gateway::core::pipeline::TranscriptionPipeline;
use scribe_gateway::core::stt::{SttEngine, SttError, TranscriberOutput, TranscriberPort};
use scribe_gateway::core::types::AudioMeta;

// =============================================================================
// Mock transcription ports
// =============================================================================

/// What the mock should hand back to the orchestrator.
enum Respond {
    Text(&'static str),
    Fields(serde_json::Value),
    Fail(&'static str),
}

/// A port that records what it was called with.
struct RecordingPort {
    engine: SttEngine,
    respond: Respond,
    seen: Arc<Mutex<Option<(PathBuf, String)>>>,
}

impl RecordingPort {
    fn new(engine: SttEngine, respond: Respond) -> (Arc<Self>, Arc<Mutex<Option<(PathBuf, String)>>>) {
        let seen = Arc::new(Mutex::new(None));
        let port = Arc::new(Self {
            engine,
            respond,
            seen: seen.clone(),
        });
        (port, seen)
    }
}

#[async_trait]
impl TranscriberPort for RecordingPort {
    fn engine(&self) -> SttEngine {
        self.engine
    }

    fn provider_info(&self) -> &'static str {
        "recording mock"
    }

    async fn transcribe(
        &self,
        wav_path: &Path,
        language: &str,
    ) -> Result<TranscriberOutput, SttError> {
        *self.seen.lock().unwrap() = Some((wav_path.to_path_buf(), language.to_string()));
        match &self.respond {
            Respond::Text(text) => Ok(TranscriberOutput::Text(text.to_string())),
            Respond::Fields(fields) => Ok(TranscriberOutput::Fields(fields.clone())),
            Respond::Fail(message) => Err(SttError::EngineError(message.to_string())),
        }
    }
}

fn pipeline_for(
    strategy: scribe_gateway::core::format::DecodeFormat,
    port: Arc<dyn TranscriberPort>,
) -> TranscriptionPipeline {
    TranscriptionPipeline::new(
        decoder_for(strategy),
        Arc::new(NoiseReducer::new(DenoiseConfig::default())),
        port,
    )
}

// =============================================================================
// End-to-end: WAV upload through the whole chain
// =============================================================================

#[tokio::test]
async fn test_8k_wav_is_resolved_resampled_denoised_and_transcribed() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("clip.wav");

    // Two seconds of in-band tone plus noise, mono, 8 kHz.
    let samples: Vec<f32> = fixtures::sine_wave(16_000, 440.0, 8_000, 0.4)
        .iter()
        .zip(fixtures::pseudo_noise(16_000, 0.05))
        .map(|(s, n)| s + n)
        .collect();
    fixtures::write_wav(&source, &samples, 8_000);

    // The declared MIME type selects the WAV strategy.
    let resolution = format::resolve(Some("audio/wav"), &source, Some("web"));
    assert_eq!(resolution.format, scribe_gateway::core::format::DecodeFormat::WavPcm);

    let (port, seen) = RecordingPort::new(SttEngine::Whisper, Respond::Text("hola"));
    let pipeline = pipeline_for(resolution.format, port);

    let meta = AudioMeta::new("web", "audio/wav", "es-MX");
    let result = pipeline.run(&source, &meta).await;

    // The port saw canonical audio at the normalized language.
    let (seen_path, seen_lang) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen_lang, "es"); // Whisper strips the region
    let reader = hound::WavReader::open(&seen_path).unwrap();
    assert_eq!(reader.spec().sample_rate, 16_000);
    assert_eq!(reader.spec().channels, 1);

    // ~2 seconds survived the trip (trim may shave silence edges).
    let frames = reader.duration();
    assert!(frames > 24_000, "expected >1.5s of audio, got {frames} frames");

    assert_eq!(result.text, "hola");
    assert_eq!(result.original_format, "audio/wav");
    assert_eq!(result.provider, "web");
    assert!(!result.is_error());
}

#[tokio::test]
async fn test_stereo_upload_reaches_port_as_mono() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("stereo.wav");

    let samples = fixtures::sine_wave(32_000, 650.0, 16_000, 0.5);
    fixtures::write_wav_channels(&source, &samples, 16_000, 2);

    let (port, seen) = RecordingPort::new(SttEngine::Google, Respond::Text("ok"));
    let pipeline = pipeline_for(scribe_gateway::core::format::DecodeFormat::WavPcm, port);

    let meta = AudioMeta::new("web", "audio/wav", "en-US");
    pipeline.run(&source, &meta).await;

    let (seen_path, _) = seen.lock().unwrap().clone().unwrap();
    let reader = hound::WavReader::open(&seen_path).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 16_000);
}

// =============================================================================
// Result-shape normalization
// =============================================================================

#[tokio::test]
async fn test_bare_string_wraps_with_zero_confidence() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("clip.wav");
    fixtures::write_wav(&source, &fixtures::sine_wave(16_000, 440.0, 16_000, 0.4), 16_000);

    let (port, _) = RecordingPort::new(SttEngine::Google, Respond::Text("hello"));
    let pipeline = pipeline_for(scribe_gateway::core::format::DecodeFormat::WavPcm, port);

    let meta = AudioMeta::new("web", "audio/wav", "en-US");
    let result = pipeline.run(&source, &meta).await;

    assert_eq!(result.text, "hello");
    assert_eq!(result.confidence, 0.0);
    assert!(result.raw.is_none());
}

#[tokio::test]
async fn test_key_value_result_carries_raw_payload() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("clip.wav");
    fixtures::write_wav(&source, &fixtures::sine_wave(16_000, 440.0, 16_000, 0.4), 16_000);

    let fields = serde_json::json!({
        "text": "que tal",
        "confidence": 0.91,
        "response": {"provider_specific": true},
    });
    let (port, _) = RecordingPort::new(SttEngine::Azure, Respond::Fields(fields.clone()));
    let pipeline = pipeline_for(scribe_gateway::core::format::DecodeFormat::WavPcm, port);

    let meta = AudioMeta::new("teams", "audio/wav", "es");
    let result = pipeline.run(&source, &meta).await;

    assert_eq!(result.text, "que tal");
    assert!((result.confidence - 0.91).abs() < 1e-6);
    assert_eq!(result.raw, Some(fields));
    assert_eq!(result.language, "es-MX"); // Azure regional mapping
}

// =============================================================================
// Failure policy
// =============================================================================

#[tokio::test]
async fn test_port_failure_never_raises() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("clip.wav");
    fixtures::write_wav(&source, &fixtures::sine_wave(16_000, 440.0, 16_000, 0.4), 16_000);

    let (port, _) = RecordingPort::new(SttEngine::Azure, Respond::Fail("quota exhausted"));
    let pipeline = pipeline_for(scribe_gateway::core::format::DecodeFormat::WavPcm, port);

    let meta = AudioMeta::new("teams", "audio/wav", "es");
    let result = pipeline.run(&source, &meta).await;

    assert_eq!(result.text, "");
    assert_eq!(result.confidence, 0.0);
    assert!(result.is_error());
    assert!(
        result.raw.unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("quota exhausted")
    );
}

#[tokio::test]
async fn test_corrupted_source_still_reaches_the_port() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("broken.ogg");
    std::fs::write(&source, b"not an ogg stream").unwrap();

    let (port, seen) = RecordingPort::new(SttEngine::Google, Respond::Text("degraded"));
    let pipeline = pipeline_for(scribe_gateway::core::format::DecodeFormat::OggOpus, port);

    let meta = AudioMeta::new("whatsapp", "audio/ogg", "es");
    let result = pipeline.run(&source, &meta).await;

    // Decode and denoise both degraded; the original file went through.
    let (seen_path, _) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen_path, source);
    assert_eq!(result.text, "degraded");
    assert!(!result.is_error());
}

#[tokio::test]
async fn test_silent_audio_flows_through_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("silence.wav");
    fixtures::write_wav(&source, &fixtures::silence(32_000), 16_000);

    let (port, _) = RecordingPort::new(SttEngine::Whisper, Respond::Text(""));
    let pipeline = pipeline_for(scribe_gateway::core::format::DecodeFormat::WavPcm, port);

    let meta = AudioMeta::new("web", "audio/wav", "es");
    let result = pipeline.run(&source, &meta).await;
    assert!(!result.is_error());
    assert_eq!(result.text, "");
}
