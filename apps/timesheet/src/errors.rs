use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::timesheet::FillError;

const INVALID_JSON: &str = "Invalid JSON payload";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<FillError> for AppError {
    fn from(err: FillError) -> Self {
        match err {
            FillError::Syntax(_) => AppError::Validation(INVALID_JSON.to_string()),
            FillError::Payload(e) if e.inner().is_syntax() || e.inner().is_eof() => {
                AppError::Validation(INVALID_JSON.to_string())
            }
            // `e` renders as `<field path>: <reason>`
            FillError::Payload(e) => AppError::Validation(format!("Invalid timesheet payload: {e}")),
            FillError::Render(e) => AppError::Spreadsheet(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Spreadsheet(msg) => {
                tracing::error!("Spreadsheet error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SPREADSHEET_ERROR",
                    format!("Failed to build timesheet: {msg}"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_error(raw: &str) -> FillError {
        let mut de = serde_json::Deserializer::from_str(raw);
        FillError::Payload(serde_path_to_error::deserialize::<_, Vec<Vec<u8>>>(&mut de).unwrap_err())
    }

    #[test]
    fn test_syntax_error_is_invalid_json() {
        let err: AppError = payload_error("[oops").into();
        assert!(matches!(&err, AppError::Validation(msg) if msg == "Invalid JSON payload"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_trailing_data_is_invalid_json() {
        let trailing = serde_json::from_str::<Vec<u8>>("[] []").unwrap_err();
        let err: AppError = FillError::Syntax(trailing).into();
        assert!(matches!(&err, AppError::Validation(msg) if msg == "Invalid JSON payload"));
    }

    #[test]
    fn test_shape_error_names_the_field() {
        let err: AppError = payload_error("[[1], \"text\"]").into();
        assert!(
            matches!(&err, AppError::Validation(msg) if msg.starts_with("Invalid timesheet payload: [1]: ")),
            "{err:?}"
        );
    }

    #[test]
    fn test_spreadsheet_error_is_server_error() {
        let response = AppError::Spreadsheet("disk full".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
