//! Audio ingestion: materialize heterogeneous sources into local files.
//!
//! Requests deliver audio three ways - a multipart upload, a remote URL, or
//! an inline Base64 payload. Whatever the source, the pipeline core only
//! consumes already-materialized local files, so this boundary writes each
//! request's audio into the scratch directory under a collision-free,
//! uuid-prefixed name. Concurrent requests therefore never touch each
//! other's files.
//!
//! Ingestion failures are boundary errors (a 400 at the HTTP layer), not
//! pipeline degradation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

/// Errors raised while materializing a request's audio.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no audio source provided: send a file, audio_url, or audio_base64")]
    MissingSource,

    #[error("invalid audio URL: {0}")]
    InvalidUrl(String),

    #[error("failed to download remote audio: {0}")]
    DownloadFailed(String),

    #[error("invalid Base64 audio payload: {0}")]
    InvalidBase64(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One request's audio, as delivered by the transport layer.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// A multipart file upload.
    Upload {
        /// Client-declared file name; only its extension is trusted, and
        /// only as a decode hint.
        filename: String,
        bytes: Vec<u8>,
    },
    /// A remote URL to fetch.
    RemoteUrl(String),
    /// An inline Base64-encoded payload.
    Base64(String),
}

/// Materializes [`AudioSource`]s into the scratch directory.
pub struct IngestManager {
    scratch_dir: PathBuf,
    http_client: reqwest::Client,
}

impl IngestManager {
    /// Default name given to sources that carry no file name of their own.
    /// The extension is a placeholder; the format resolver falls back to
    /// MIME/provider signals for these.
    const UNNAMED: &'static str = "audio.bin";

    /// Maximum remote payload size accepted (32 MiB).
    const MAX_REMOTE_BYTES: u64 = 32 * 1024 * 1024;

    /// Create a manager rooted at `scratch_dir`, creating it if needed.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let scratch_dir = scratch_dir.into();
        std::fs::create_dir_all(&scratch_dir)?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| IngestError::DownloadFailed(e.to_string()))?;

        Ok(Self {
            scratch_dir,
            http_client,
        })
    }

    /// Write one request's audio to a uniquely-named scratch file and return
    /// its path.
    pub async fn materialize(&self, source: AudioSource) -> Result<PathBuf, IngestError> {
        match source {
            AudioSource::Upload { filename, bytes } => {
                let path = self.scratch_path(&filename);
                tokio::fs::write(&path, &bytes).await?;
                debug!(path = %path.display(), bytes = bytes.len(), "stored uploaded audio");
                Ok(path)
            }
            AudioSource::RemoteUrl(url) => self.fetch_remote(&url).await,
            AudioSource::Base64(payload) => {
                let bytes = BASE64
                    .decode(payload.trim())
                    .map_err(|e| IngestError::InvalidBase64(e.to_string()))?;
                let path = self.scratch_path(Self::UNNAMED);
                tokio::fs::write(&path, &bytes).await?;
                debug!(path = %path.display(), bytes = bytes.len(), "stored Base64 audio");
                Ok(path)
            }
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<PathBuf, IngestError> {
        let parsed = Url::parse(url).map_err(|e| IngestError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(IngestError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let response = self
            .http_client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| IngestError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::DownloadFailed(format!(
                "remote server returned {status}"
            )));
        }

        if let Some(length) = response.content_length()
            && length > Self::MAX_REMOTE_BYTES
        {
            return Err(IngestError::DownloadFailed(format!(
                "remote audio too large: {length} bytes"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IngestError::DownloadFailed(e.to_string()))?;
        if bytes.len() as u64 > Self::MAX_REMOTE_BYTES {
            return Err(IngestError::DownloadFailed(format!(
                "remote audio too large: {} bytes",
                bytes.len()
            )));
        }

        // Keep the remote path's file name so its extension can inform
        // format resolution.
        let remote_name = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or(Self::UNNAMED);

        let path = self.scratch_path(remote_name);
        tokio::fs::write(&path, &bytes).await?;
        info!(url = %parsed, path = %path.display(), bytes = bytes.len(), "downloaded remote audio");
        Ok(path)
    }

    /// Collision-free scratch path: uuid prefix plus a sanitized file name.
    fn scratch_path(&self, filename: &str) -> PathBuf {
        let safe_name = sanitize_filename(filename);
        self.scratch_dir
            .join(format!("{}_{safe_name}", Uuid::new_v4()))
    }
}

/// Strip path components and shell-hostile characters from a client-declared
/// file name, preserving the extension.
fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("audio.bin");

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
