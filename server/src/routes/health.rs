//! Health check endpoints.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db;
use crate::error::Result;
use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness))
        .route("/", get(root))
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness handler, fails while the database is unreachable.
async fn readiness(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    db::ping(&state.pool).await?;
    Ok(health_check().await)
}

/// Root handler.
async fn root() -> &'static str {
    "Product Replication Server"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_is_ok() {
        let app = routes().with_state(test_support::state("http://127.0.0.1:1/products"));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_fails_without_database() {
        let app = routes().with_state(test_support::state("http://127.0.0.1:1/products"));

        let response = app
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
