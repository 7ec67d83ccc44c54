use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use finplan::errors::EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid server address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// The environment variable that sets a dotted configuration path, e.g. `engine.transcript`.
pub fn to_env_var(field_path: &str) -> String {
    format!("FINPLAN_{}", field_path.to_uppercase().replace('.', "__"))
}

/// Errors returned before a response stream starts
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::Engine(EngineError::InvalidRequest(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
