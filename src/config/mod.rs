//! Server configuration.
//!
//! Configuration comes from environment variables, with `.env` files loaded
//! by `main` before anything reads them. Every tunable the pipeline uses -
//! noise thresholds, band edges, default language, default engine - lives
//! here rather than as a literal inside a component, so deployments can tune
//! them and tests can construct variants.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::denoise::DenoiseConfig;
use crate::core::stt::{AzureSttConfig, EngineSettings, GoogleSttConfig, SttEngine, WhisperConfig};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration.
///
/// Contains everything needed to run the gateway: bind address, scratch
/// directory, engine credentials, and pipeline tuning.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    /// Scratch directory for per-request intermediate audio files.
    pub scratch_dir: PathBuf,

    /// Engine used when a request does not name one.
    pub default_engine: SttEngine,

    /// Language assumed when a request does not name one.
    pub default_language: String,

    /// Azure Speech subscription key (Azure Portal -> Speech resource ->
    /// Keys and Endpoint).
    pub azure_speech_key: Option<String>,
    /// Region the Azure Speech resource is deployed in (e.g. "eastus").
    pub azure_speech_region: Option<String>,
    /// Azure endpoint override, mainly for tests.
    pub azure_speech_endpoint: Option<String>,

    /// Google Speech API key.
    pub google_speech_api_key: Option<String>,
    /// Google endpoint override, mainly for tests.
    pub google_speech_endpoint: Option<String>,

    /// Path to a local ggml Whisper model file.
    pub whisper_model_path: Option<PathBuf>,

    /// Noise reduction tuning.
    pub denoise: DenoiseConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            scratch_dir: PathBuf::from("./tmp"),
            default_engine: SttEngine::Whisper,
            default_language: "es".to_string(),
            azure_speech_key: None,
            azure_speech_region: None,
            azure_speech_endpoint: None,
            google_speech_api_key: None,
            google_speech_endpoint: None,
            whisper_model_path: None,
            denoise: DenoiseConfig::default(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                name: name.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = env_var("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_env::<u16>("PORT")? {
            config.port = port;
        }
        if let Some(dir) = env_var("SCRATCH_DIR") {
            config.scratch_dir = PathBuf::from(dir);
        }
        if let Some(engine) = env_var("STT_ENGINE") {
            config.default_engine =
                engine
                    .parse::<SttEngine>()
                    .map_err(|e| ConfigError::InvalidValue {
                        name: "STT_ENGINE".to_string(),
                        message: e.to_string(),
                    })?;
        }
        if let Some(lang) = env_var("DEFAULT_LANGUAGE") {
            config.default_language = lang;
        }

        config.azure_speech_key = env_var("AZURE_SPEECH_KEY");
        config.azure_speech_region = env_var("AZURE_SPEECH_REGION");
        config.azure_speech_endpoint = env_var("AZURE_SPEECH_ENDPOINT");
        config.google_speech_api_key = env_var("GOOGLE_SPEECH_API_KEY");
        config.google_speech_endpoint = env_var("GOOGLE_SPEECH_ENDPOINT");
        config.whisper_model_path = env_var("WHISPER_MODEL_PATH").map(PathBuf::from);

        if let Some(value) = parse_env::<f32>("DENOISE_NOISE_THRESHOLD")? {
            config.denoise.noise_rms_threshold = value;
        }
        if let Some(value) = parse_env::<f32>("DENOISE_TRIM_DB")? {
            config.denoise.trim_threshold_db = value;
        }
        if let Some(value) = parse_env::<f32>("DENOISE_BAND_LOW_HZ")? {
            config.denoise.band_low_hz = value;
        }
        if let Some(value) = parse_env::<f32>("DENOISE_BAND_HIGH_HZ")? {
            config.denoise.band_high_hz = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        self.denoise.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Bind address string.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Assemble per-engine settings from whatever credentials are present.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            whisper: self.whisper_model_path.clone().map(|model_path| WhisperConfig {
                model_path,
                ..Default::default()
            }),
            azure: self.azure_speech_key.clone().map(|subscription_key| AzureSttConfig {
                subscription_key,
                region: self.azure_speech_region.clone().unwrap_or_default(),
                endpoint: self.azure_speech_endpoint.clone(),
            }),
            google: self.google_speech_api_key.clone().map(|api_key| GoogleSttConfig {
                api_key,
                endpoint: self.google_speech_endpoint.clone(),
            }),
        }
    }
}
