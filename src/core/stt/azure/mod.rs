//! Azure Speech-to-Text REST engine.
//!
//! Uses the short-audio recognition endpoint: one synchronous POST with the
//! canonical WAV body, subscription-key auth, and a JSON response. Suited to
//! voice-note-length audio (the endpoint caps at 60 seconds), which is this
//! system's traffic.

mod client;
mod config;
mod messages;

pub use client::AzureStt;
pub use config::AzureSttConfig;
pub use messages::{AzureNBestEntry, AzureRecognitionResponse};
