pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction API
        .route(
            "/api/v1/analysis/extract",
            post(handlers::handle_extract_analysis),
        )
        .route(
            "/api/v1/cover-letter/extract",
            post(handlers::handle_extract_cover_letter),
        )
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;

    fn router() -> Router {
        build_router(AppState::new(Config::default()).unwrap())
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn envelope(text: &str) -> Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "scorecard-api");
    }

    #[tokio::test]
    async fn test_extract_analysis_envelope() {
        let (status, body) = post_json(
            "/api/v1/analysis/extract",
            envelope("ATS Score: 42/100\nKey Strengths:\n- Good communication\n- Strong portfolio"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["compatibilityScore"], 42);
        assert_eq!(body["overallRating"], 7);
        assert_eq!(
            body["sections"]["strengths"],
            json!(["Good communication", "Strong portfolio"])
        );
        assert_eq!(body["sections"]["issues"], json!([]));
    }

    #[tokio::test]
    async fn test_extract_analysis_backend_wrapper() {
        let (status, body) = post_json(
            "/api/v1/analysis/extract",
            json!({"analysis": envelope("Overall Rating: 9/10")}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overallRating"], 9);
        assert_eq!(body["compatibilityScore"], 75);
    }

    #[tokio::test]
    async fn test_extract_analysis_error_payload() {
        let (status, body) = post_json(
            "/api/v1/analysis/extract",
            json!({"error": "quota exceeded"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Analysis Error: quota exceeded");
        assert_eq!(body["compatibilityScore"], 75);
        assert_eq!(body["overallRating"], 7);
        assert_eq!(body["diagnostic"]["kind"], "provider_error");
    }

    #[tokio::test]
    async fn test_extract_analysis_null_body() {
        let (status, body) = post_json("/api/v1/analysis/extract", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "No analysis data received");
    }

    #[tokio::test]
    async fn test_extract_analysis_rejects_non_object() {
        let (status, body) = post_json("/api/v1/analysis/extract", json!("text")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_extract_cover_letter() {
        let (status, body) = post_json(
            "/api/v1/cover-letter/extract",
            json!({"cover_letter": envelope("  Dear Hiring Manager,\n\nI am writing...  ")}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Dear Hiring Manager,\n\nI am writing...");
        assert!(body.get("diagnostic").is_none());
    }

    #[tokio::test]
    async fn test_extract_cover_letter_empty_parts() {
        let (_, body) = post_json(
            "/api/v1/cover-letter/extract",
            json!({"candidates": [{"content": {"parts": []}}]}),
        )
        .await;
        assert_eq!(body["text"], "Empty parts array in cover letter");
        assert_eq!(body["diagnostic"]["kind"], "empty_parts");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, body) = post_json("/api/v1/nope", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
