//! HTTP request handlers.
//!
//! The transcribe handler is thin glue: ingest the audio, resolve the decode
//! strategy, pick the engine, run the pipeline, serialize. All decisions
//! live in the core; all "always respond" behavior is the pipeline's
//! contract, so the only error statuses this layer produces are for
//! malformed requests.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use crate::core::decode::decoder_for;
use crate::core::format;
use crate::core::pipeline::TranscriptionPipeline;
use crate::core::stt::SttEngine;
use crate::core::types::{AudioMeta, TranscriptResult};
use crate::ingest::{AudioSource, IngestError};
use crate::state::AppState;

/// Level of detail of the serialized response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Detail {
    /// Drop the `raw` payload (the default external view).
    #[default]
    Compact,
    /// Include everything, `raw` payload included.
    Full,
}

/// Form fields accepted by `POST /v1/transcribe`.
#[derive(Default)]
struct TranscribeRequest {
    file: Option<(String, Vec<u8>, Option<String>)>,
    audio_url: Option<String>,
    audio_base64: Option<String>,
    provider: Option<String>,
    lang: Option<String>,
    engine: Option<String>,
    detail: Detail,
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

async fn read_request(multipart: &mut Multipart) -> Result<TranscribeRequest, Response> {
    let mut request = TranscribeRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("audio.bin").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("reading file part: {e}")))?;
                request.file = Some((filename, bytes.to_vec(), content_type));
            }
            "audio_url" => {
                request.audio_url = Some(read_text_field(field).await?);
            }
            "audio_base64" => {
                request.audio_base64 = Some(read_text_field(field).await?);
            }
            "provider" => {
                request.provider = Some(read_text_field(field).await?);
            }
            "lang" => {
                request.lang = Some(read_text_field(field).await?);
            }
            "engine" => {
                request.engine = Some(read_text_field(field).await?);
            }
            "detail" => {
                request.detail = match read_text_field(field).await?.to_lowercase().as_str() {
                    "full" => Detail::Full,
                    _ => Detail::Compact,
                };
            }
            other => {
                warn!(field = other, "ignoring unknown form field");
            }
        }
    }

    Ok(request)
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, Response> {
    field
        .text()
        .await
        .map_err(|e| bad_request(format!("reading form field: {e}")))
}

fn serialize(result: &TranscriptResult, detail: Detail) -> Json<serde_json::Value> {
    match detail {
        Detail::Compact => Json(result.to_compact_json()),
        Detail::Full => Json(serde_json::to_value(result).unwrap_or_default()),
    }
}

/// `POST /v1/transcribe` - transcribe one audio payload.
pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let request = match read_request(&mut multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    // Source precedence mirrors the fields' order: upload, URL, Base64.
    let (source, declared_mime) = if let Some((filename, bytes, content_type)) = request.file {
        (AudioSource::Upload { filename, bytes }, content_type)
    } else if let Some(url) = request.audio_url {
        (AudioSource::RemoteUrl(url), None)
    } else if let Some(payload) = request.audio_base64 {
        (AudioSource::Base64(payload), None)
    } else {
        return bad_request(IngestError::MissingSource.to_string());
    };

    let engine = match &request.engine {
        Some(name) => match name.parse::<SttEngine>() {
            Ok(engine) => engine,
            Err(e) => return bad_request(e.to_string()),
        },
        None => state.config.default_engine,
    };

    let source_path = match state.ingest.materialize(source).await {
        Ok(path) => path,
        Err(e) => return bad_request(e.to_string()),
    };

    let provider = request
        .provider
        .unwrap_or_else(|| "unknown".to_string());
    let lang = request
        .lang
        .unwrap_or_else(|| state.config.default_language.clone());
    let meta = AudioMeta::new(
        provider.clone(),
        declared_mime.clone().unwrap_or_default(),
        lang,
    );

    let Some(port) = state.port(engine) else {
        // A known engine without credentials on this deployment is not a
        // client error; honor the always-respond contract.
        warn!(engine = %engine, "requested engine is not configured");
        let result = TranscriptResult::failure(
            &meta,
            meta.lang.clone(),
            meta.content_type.clone(),
            format!("engine '{engine}' is not configured on this server"),
        );
        return serialize(&result, request.detail).into_response();
    };

    let resolution = format::resolve(
        declared_mime.as_deref(),
        &source_path,
        Some(provider.as_str()),
    );

    let pipeline = TranscriptionPipeline::new(
        decoder_for(resolution.format),
        state.denoiser.clone(),
        port,
    );

    let result = pipeline.run(&source_path, &meta).await;
    info!(
        engine = %engine,
        provider = %meta.provider,
        strategy = %resolution.format,
        error = result.is_error(),
        "request complete"
    );

    serialize(&result, request.detail).into_response()
}

/// `GET /health` - liveness probe.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "scribe-gateway",
        "uptime_seconds": state.uptime_seconds(),
        "engines": state
            .available_engines()
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>(),
    }))
}
