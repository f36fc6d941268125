use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tc_core::TcError;

/// Error returned from a handler, with the status it maps to
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: TcError,
}

impl ApiError {
    pub fn bad_request(error: TcError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

/// Bad input is the caller's fault; anything else is ours
impl From<TcError> for ApiError {
    fn from(error: TcError) -> Self {
        let status = match error {
            TcError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, "request failed");
        } else {
            tracing::warn!(error = %self.error, "request rejected");
        }
        (self.status, self.error.to_string()).into_response()
    }
}
