//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::denoise::NoiseReducer;
use crate::core::stt::{SttEngine, TranscriberPort, create_transcriber};
use crate::ingest::IngestManager;

/// State shared by every request handler.
///
/// Engines are constructed once at startup for every provider whose
/// credentials (or model) are configured; requests pick from this map. The
/// denoiser and ingest manager are stateless with respect to request data,
/// so one instance of each serves all requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub ingest: Arc<IngestManager>,
    pub denoiser: Arc<NoiseReducer>,
    ports: Arc<HashMap<SttEngine, Arc<dyn TranscriberPort>>>,
    started_at: Instant,
}

impl AppState {
    /// Build state from validated configuration.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let ingest = IngestManager::new(config.scratch_dir.clone())
            .with_context(|| format!("creating scratch dir {}", config.scratch_dir.display()))?;

        let denoiser = NoiseReducer::new(config.denoise.clone());

        let settings = config.engine_settings();
        let mut ports: HashMap<SttEngine, Arc<dyn TranscriberPort>> = HashMap::new();
        for engine in [SttEngine::Whisper, SttEngine::Azure, SttEngine::Google] {
            match create_transcriber(engine, &settings) {
                Ok(port) => {
                    info!(engine = %engine, provider = port.provider_info(), "engine ready");
                    ports.insert(engine, port);
                }
                Err(e) => {
                    // Not every deployment configures every engine; requests
                    // naming a missing one get a failure envelope.
                    warn!(engine = %engine, reason = %e, "engine not available");
                }
            }
        }

        Ok(Self {
            config: Arc::new(config),
            ingest: Arc::new(ingest),
            denoiser: Arc::new(denoiser),
            ports: Arc::new(ports),
            started_at: Instant::now(),
        })
    }

    /// Look up a configured engine.
    pub fn port(&self, engine: SttEngine) -> Option<Arc<dyn TranscriberPort>> {
        self.ports.get(&engine).cloned()
    }

    /// Engines available on this deployment.
    pub fn available_engines(&self) -> Vec<SttEngine> {
        let mut engines: Vec<SttEngine> = self.ports.keys().copied().collect();
        engines.sort_by_key(|e| e.to_string());
        engines
    }

    /// Seconds since startup.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
