//! # Engine Error Types
//!
//! Everything that can stop the engine from starting. Once the frame loop
//! runs, lookups return `Option` and systems only fail if a worker job
//! panics.

use std::path::PathBuf;

use tessera_core::CoreError;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`crate::EngineConfig`].
    #[error("invalid config: {0}")]
    Parse(String),

    /// A value parsed but is unusable.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Asset lookup and loading errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// No texture registered under this name.
    #[error("texture not found: {0}")]
    MissingTexture(String),

    /// No sound registered under this name.
    #[error("sound not found: {0}")]
    MissingSound(String),

    /// The loader could not decode a file.
    #[error("failed to load {path}: {reason}")]
    Load {
        /// File that failed.
        path: String,
        /// Loader message.
        reason: String,
    },

    /// The asset manifest is not valid TOML.
    #[error("invalid asset manifest: {0}")]
    Manifest(String),

    /// The file name has no usable stem to register it under.
    #[error("cannot derive an asset name from {0}")]
    InvalidName(String),
}

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Registry or worker pool failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Asset failure.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// A scene name that was never registered.
    #[error("unknown scene: {0}")]
    UnknownScene(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
