//! Google Cloud Speech-to-Text REST engine.
//!
//! Uses the synchronous `speech:recognize` endpoint with API-key auth and an
//! inline Base64 audio body. WAV input self-describes its encoding, so the
//! request config only carries the language tag.

mod client;
mod config;
mod messages;

pub use client::GoogleStt;
pub use config::GoogleSttConfig;
pub use messages::{GoogleRecognizeResponse, GoogleSpeechAlternative, GoogleSpeechResult};
