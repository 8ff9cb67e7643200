use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upstream feed answered with a non-success status.
    #[error("{source_name} returned {status}: {body}")]
    Upstream {
        source_name: String,
        status: u16,
        body: String,
    },

    #[error("Invalid American odds: {0}")]
    InvalidOdds(f64),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("{0} not found")]
    ArtifactMissing(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A refresh stage exited nonzero. `details` is the stage's stderr.
    #[error("{label}: {details}")]
    StageFailed { label: String, details: String },

    #[error("Stage '{stage}' timed out after {secs}s")]
    StageTimeout { stage: String, secs: u64 },
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            AppError::ArtifactMissing(what) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Data file not found",
                    "message": format!("{what} does not exist yet; POST /api/refresh to generate it"),
                }),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Bad request", "message": msg }),
            ),
            AppError::StageFailed { label, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": label, "details": details }),
            ),
            AppError::StageTimeout { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Refresh timeout", "message": self.to_string() }),
            ),
            AppError::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to load data", "message": self.to_string() }),
            ),
            AppError::Database(_) | AppError::Migration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Database query failed", "message": self.to_string() }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal error", "message": self.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
