pub mod config;
pub mod core;
pub mod handlers;
pub mod ingest;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use core::*;
pub use ingest::{AudioSource, IngestError, IngestManager};
pub use state::AppState;
