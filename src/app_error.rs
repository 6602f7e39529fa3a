use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use std::fmt;

// Application-specific errors with better context
#[derive(Debug)]
pub enum AppError {
    // Wrap anyhow errors for backward compatibility
    Anyhow(anyhow::Error),

    // Specific error types for better handling
    InvalidFormData(String),
    NotFound(String),
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Anyhow(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Something went wrong: {}", err),
            ),
            AppError::InvalidFormData(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid form data: {}", msg),
            ),
            AppError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, format!("{} not found", resource))
            }
        };

        if status.is_server_error() {
            tracing::error!("{}", message);
        } else {
            tracing::info!("{}", message);
        }

        (status, message).into_response()
    }
}

// Implement Display for AppError
impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Anyhow(err) => write!(f, "{}", err),
            AppError::InvalidFormData(msg) => write!(f, "Invalid form data: {}", msg),
            AppError::NotFound(resource) => write!(f, "{} not found", resource),
        }
    }
}

// This enables using `?` on functions that return `Result<_, anyhow::Error>` to turn them into
// `Result<_, AppError>`. That way you don't need to do that manually.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError::Anyhow(err.into())
    }
}
