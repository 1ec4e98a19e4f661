use axum::http::StatusCode;
use thiserror::Error;

/// Failures of signup and login. The display text is shown to the user as is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please enter both username and password")]
    Validation,
    #[error("Account already exists! Please login instead.")]
    DuplicateAccount,
    #[error("Account not found! Please sign up first.")]
    AccountNotFound,
    #[error("Incorrect password!")]
    InvalidCredential,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::Validation => StatusCode::BAD_REQUEST,
            AuthError::DuplicateAccount => StatusCode::CONFLICT,
            AuthError::AccountNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredential => StatusCode::UNAUTHORIZED,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
