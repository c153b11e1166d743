use axum::Json;
use axum::response::{IntoResponse, Response};
use hyper::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusPageError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("Status page not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Render error: {0}")]
    Render(String),
}

impl StatusPageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StatusPageError::NotFound(_) => StatusCode::NOT_FOUND,
            StatusPageError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StatusPageError::Db(_) | StatusPageError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Failure of a notification provider.
///
/// Transport errors are flattened into `SendFailed` so callers never see the
/// HTTP client's own error type.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("{provider}: notification send failed: {reason}")]
    SendFailed { provider: &'static str, reason: String },
    #[error("Unknown notification provider: {0}")]
    UnknownProvider(String),
    #[error("Invalid notification config: {0}")]
    InvalidConfig(String),
}

impl NotificationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            NotificationError::SendFailed { .. } => StatusCode::BAD_GATEWAY,
            NotificationError::UnknownProvider(_) | NotificationError::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for StatusPageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                name = "api.status_page.error",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %self,
                message = "Request failed"
            );
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            StatusPageError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StatusPageError::InvalidInput("Invalid domain".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StatusPageError::Db(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let err = NotificationError::SendFailed {
            provider: "WeCom",
            reason: "HTTP 500".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "WeCom: notification send failed: HTTP 500");
    }
}
