use std::path::PathBuf;

use thiserror::Error;

/// Failures of the conversation engine that feeds events to a renderer.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to read transcript {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid transcript line {line}: {source}")]
    Transcript {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures while formatting one part of an event.
///
/// These never leave the renderer; the affected part is rendered in a degraded form instead.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Tool arguments are not valid JSON: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error("Tool arguments are not a JSON object")]
    ArgumentsNotObject,
}

pub type RenderResult<T> = Result<T, RenderError>;
