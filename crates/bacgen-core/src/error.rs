//! Error types for config generation.

use thiserror::Error;

/// Result type for config generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Config generation error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Unusable site settings (malformed input file, bad output path).
    #[error("Settings error: {0}")]
    Settings(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The building power meter could not be resolved to an equipment id.
    #[error("Building meter lookup failed: {0}")]
    MeterLookup(String),

    /// A config demanded a registry file but the driver family has no
    /// registry generator.
    #[error("Registry config generation is not implemented for this driver family (equipment {0})")]
    RegistryUnsupported(String),
}
