//! Audio primitives: canonical WAV I/O, sample-rate conversion, and the
//! frame math shared by the decoders and the noise reduction engine.
//!
//! The canonical representation everywhere in this crate is single-channel
//! 16 000 Hz PCM ("canonical PCM"); it is the contract between the decoders,
//! the noise reduction engine, and the transcription ports.

use thiserror::Error;

pub mod dsp;
pub mod wav;

/// Sample rate of canonical PCM.
pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;

/// Errors raised while reading, converting, or writing audio.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("resample error: {0}")]
    Resample(String),

    #[error("unsupported audio layout: {0}")]
    UnsupportedLayout(String),
}
