//! Error types
//!
//! Errors fall into three groups:
//! - `SessionError`: fatal for a session, surfaced synchronously at start
//! - `FrameError`: recoverable per frame, the frame is dropped and state stays consistent
//! - setup errors (`ConfigError`, `CatalogError`, `ModelError`) raised while loading files

use thiserror::Error;

/// Session-level failures
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Exercise '{0}' not found in catalog")]
    NotFound(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Per-frame failures. The frame is skipped, nothing else changes.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Expected {expected} landmarks, got {got}")]
    MissingLandmarks { expected: usize, got: usize },
    #[error("Frame at {timestamp:.3}s arrived after {last:.3}s")]
    OutOfOrder { timestamp: f64, last: f64 },
    #[error("Timestamp {0} is not a finite number")]
    InvalidTimestamp(f64),
    #[error("Phase scorer failed: {0}")]
    Scorer(#[from] ScorerError),
}

/// Phase scorer failures
#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("Angle window is empty")]
    EmptyWindow,
    #[error("Inference failed: {0}")]
    Inference(#[from] candle_core::Error),
    #[error("Model produced {0} outputs, expected 5")]
    OutputShape(usize),
}

/// Sequence model loading and saving failures
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode model bundle: {0}")]
    Decode(#[from] bincode::Error),
    #[error("Tensor error: {0}")]
    Tensor(#[from] candle_core::Error),
    #[error("Variable store lock was poisoned")]
    Poisoned,
}

/// Exercise catalog loading failures
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Exercise '{id}' is invalid: {reason}")]
    InvalidPattern { id: String, reason: String },
}

/// Configuration loading and validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
