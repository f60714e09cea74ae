//! Info handlers for the root endpoint and capability advertisement

use crate::api::AppState;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::debug;
use wseries_core::api::{CapabilitiesResponse, FIRMWARE_ID};

/// Handle the root endpoint.
///
/// Provide basic service identification and status. Only routed when no web
/// UI directory is configured.
///
/// # Endpoint
///
/// `GET /`
pub(crate) async fn root(State(state): State<AppState>) -> Json<Value> {
    debug!("Request: GET /");

    Json(json!({
        "service": "WSeries Controller API Server",
        "version": FIRMWARE_ID,
        "status": "ok",
        "uptime": state.start_time.elapsed().as_secs(),
    }))
}

/// Advertise firmware identity, supported backends and sensor presence.
///
/// # Endpoint
///
/// `GET /api/capabilities`
pub(crate) async fn get_capabilities(State(state): State<AppState>) -> Json<CapabilitiesResponse> {
    debug!("Request: GET /api/capabilities");

    Json(CapabilitiesResponse::new(state.capabilities))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use wseries_core::config::SensorPresence;

    use crate::api::{create_router, AppState};
    use crate::config::{ConfigService, MemoryStore};
    use crate::telemetry::TelemetryHub;

    async fn router(capabilities: SensorPresence) -> Router {
        let service = ConfigService::initialize(Arc::new(MemoryStore::new())).await;
        let state = AppState::new(Arc::new(service), TelemetryHub::new(), capabilities);
        create_router(state, None)
    }

    async fn get_json(router: Router, uri: &str) -> Value {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let json = get_json(router(SensorPresence::default()).await, "/").await;
        assert_eq!(json["status"], "ok");
        assert!(json["version"].as_str().unwrap().starts_with("wseries-"));
    }

    #[tokio::test]
    async fn test_capabilities_reflect_static_presence() {
        let presence = SensorPresence {
            zmpt_present: true,
            acs_present: false,
            ina_present: true,
            ads_present: false,
        };

        let json = get_json(router(presence).await, "/api/capabilities").await;

        assert_eq!(json["backends"], json!(["AC", "DC", "Supercap"]));
        assert_eq!(json["sensors"]["acs_present"], false);
        assert_eq!(json["sensors"]["ina_present"], true);
    }
}
