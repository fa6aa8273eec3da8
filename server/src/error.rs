use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use session_token::IssueError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session token error: {0}")]
    Issue(#[from] IssueError),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Issue(IssueError::InvalidClaims(_)) => StatusCode::BAD_REQUEST,
            ApiError::Issue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Server-side failures are logged, not echoed to the client.
        let message = if status.is_server_error() {
            log::error!("{}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorResponse {
            success: false,
            error: message,
        })
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
