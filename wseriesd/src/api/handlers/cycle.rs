//! Cycle control hooks
//!
//! No control loop consumes these yet; requests are acknowledged and logged.

use axum::http::StatusCode;
use tracing::info;

/// Request a manual power cycle.
///
/// # Endpoint
///
/// `POST /api/cycle/trigger`
pub(crate) async fn trigger() -> StatusCode {
    info!("Cycle trigger requested");
    StatusCode::ACCEPTED
}

/// Request that a running cycle be aborted.
///
/// # Endpoint
///
/// `POST /api/cycle/abort`
pub(crate) async fn abort() -> StatusCode {
    info!("Cycle abort requested");
    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;
    use wseries_core::config::SensorPresence;

    use crate::api::{create_router, AppState};
    use crate::config::{ConfigService, MemoryStore};
    use crate::telemetry::TelemetryHub;

    #[tokio::test]
    async fn test_cycle_hooks_accept() {
        let service = ConfigService::initialize(Arc::new(MemoryStore::new())).await;
        let state = AppState::new(
            Arc::new(service),
            TelemetryHub::new(),
            SensorPresence::default(),
        );
        let router = create_router(state, None);

        for uri in ["/api/cycle/trigger", "/api/cycle/abort"] {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method(Method::POST)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED, "{}", uri);
        }
    }
}
