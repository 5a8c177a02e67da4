// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

use crate::pipeline::StageRole;

#[derive(Error, Debug)]
pub enum TailRelayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A stage process could not be launched (missing executable, bad
/// permissions, fd exhaustion, ...).
///
/// This is a process-wide condition rather than something the client did
/// wrong, so sessions log it and skip the command instead of failing.
#[derive(Error, Debug)]
#[error("failed to launch {role} stage `{program}`: {source}")]
pub struct SpawnError {
    pub role: StageRole,
    pub program: String,
    #[source]
    pub source: std::io::Error,
}

/// An inbound frame that could not be turned into a command.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("message is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("field `{field}` {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TailRelayError>;
