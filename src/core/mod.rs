pub mod audio;
pub mod decode;
pub mod denoise;
pub mod format;
pub mod pipeline;
pub mod stt;
pub mod types;

// Re-export commonly used types for convenience
pub use decode::{AudioDecoder, DecodeOutcome, DecodeStatus, decoder_for};
pub use denoise::{DenoiseConfig, DenoiseOutcome, DenoiseStatus, NoiseReducer};
pub use format::{DecodeFormat, FormatResolution, ResolvedBy, resolve};
pub use pipeline::TranscriptionPipeline;
pub use stt::{
    EngineSettings, SttEngine, SttError, TranscriberOutput, TranscriberPort, create_transcriber,
};
pub use types::{AudioMeta, TranscriptResult};
