//! Error types shared by the engine crates

use std::path::PathBuf;

/// Failure reported by a strategy while deciding
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("strategy cannot decide: {0}")]
    Undecidable(String),

    #[error("strategy state unavailable: {0}")]
    StateUnavailable(String),
}

/// Errors produced while configuring or running a simulation
#[derive(Debug, thiserror::Error)]
pub enum WargameError {
    #[error("failed to read faction configuration {path}: {source}")]
    ConfigLoadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed faction configuration: {0}")]
    ConfigParse(String),

    #[error("no strategy registered under '{strategy}' (faction '{faction}')")]
    UnknownStrategy { faction: String, strategy: String },

    #[error("invalid population for faction '{faction}': {value}")]
    InvalidPopulation { faction: String, value: f64 },

    #[error("strategy for faction '{faction}' failed: {source}")]
    StrategyFailure {
        faction: String,
        #[source]
        source: StrategyError,
    },

    #[error("invalid run parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, WargameError>;
