pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::timesheet::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/export-timesheet",
            post(handlers::handle_export_timesheet),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::timesheet::handlers::XLSX_CONTENT_TYPE;
    use crate::timesheet::template::test_template;

    fn test_router() -> Router {
        build_router(AppState {
            template: Arc::new(test_template()),
            config: Config {
                port: 0,
                rust_log: "debug".to_string(),
                template_path: PathBuf::from("layouts/timesheet.json"),
            },
        })
    }

    fn export_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/export-timesheet")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["template"], "layouts/timesheet.json");
    }

    #[tokio::test]
    async fn test_export_returns_xlsx_attachment() {
        let payload = json!({
            "header": {"employeeName": "Dana Smith", "payPeriod": "03/01-03/15"},
            "rows": [{"caseNumber": "4521", "dateOfService": "3/14/25", "timeIn": "08:30"}]
        });
        let response = test_router()
            .oneshot(export_request(payload.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            XLSX_CONTENT_TYPE
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Dana Smith_03_01-03_15_Timesheet.xlsx\""
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_export_without_header_uses_default_filename() {
        let response = test_router()
            .oneshot(export_request(r#"{"rows": []}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Unnamed_No_Date_Timesheet.xlsx\""
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = test_router()
            .oneshot(export_request("{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Invalid JSON payload");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_bad_request() {
        let response = test_router()
            .oneshot(export_request(r#"{"rows": "not a list"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_shape_error_message_names_the_field() {
        let response = test_router()
            .oneshot(export_request(r#"{"rows": [{"miles": 1}, 5]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        let message = body["error"]["message"].as_str().unwrap();
        assert!(
            message.starts_with("Invalid timesheet payload: rows[1]: "),
            "{message}"
        );
    }
}
