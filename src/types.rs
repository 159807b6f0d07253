// Type definitions and error handling

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Please enter your OpenAI API key to proceed.")]
    MissingCredential,

    #[error("Please upload your CSV files to start.")]
    NoFilesUploaded,

    #[error("Failed to parse '{file}': {detail}")]
    Parse { file: String, detail: String },

    #[error("Error initializing the AI agent: {0}")]
    AgentInit(String),

    #[error("Error while answering: {0}")]
    AgentExecution(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredential | AppError::NoFilesUploaded => StatusCode::BAD_REQUEST,
            AppError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AgentInit(_) | AppError::AgentExecution(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Banner kind rendered by the frontend: instructional prompts versus
    /// failures of the current interaction.
    fn kind(&self) -> &'static str {
        match self {
            AppError::MissingCredential | AppError::NoFilesUploaded => "info",
            _ => "error",
        }
    }
}

/// Every failure degrades to a visible message; nothing terminates the session.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
