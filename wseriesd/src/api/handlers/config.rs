//! Runtime configuration handlers

use crate::api::error::ApiError;
use crate::api::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use wseries_core::api::{
    AutoTriggerRequest, BackendRequest, GuardsRequest, SensorsRequest, UpdateWarnings,
};
use wseries_core::{RuntimeConfig, SectionUpdate, WSeriesError};

/// Parse a JSON request body, whatever its declared content type.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| WSeriesError::MalformedInput(e.to_string()).into())
}

/// Hand an update to the configuration service and shape the response.
///
/// 204 when accepted and persisted. 200 with a warnings body when accepted
/// but the store write failed. Sensor advisories alone never change the
/// status; they are logged by the service.
async fn apply(state: &AppState, update: SectionUpdate) -> Result<Response, ApiError> {
    let outcome = state.config.update(update).await?;
    debug!("{} update: {:?}", outcome.section, outcome.persistence);

    if outcome.persisted() {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        let warnings = outcome.warnings();
        Ok((StatusCode::OK, Json(UpdateWarnings { warnings })).into_response())
    }
}

/// Return the full runtime configuration document.
///
/// # Endpoint
///
/// `GET /api/config`
pub(crate) async fn get_config(State(state): State<AppState>) -> Json<RuntimeConfig> {
    debug!("Request: GET /api/config");
    Json(state.config.snapshot().await)
}

/// Replace backend selection and all backend parameter groups.
///
/// # Endpoint
///
/// `POST /api/config/backend`
///
/// # Request Body
///
/// ```json
/// {
///     "backend": "DC",
///     "ac": {"zero_cross": true, "half_cycle": false},
///     "dc": {"i_limit": 15.0, "pwm": 80},
///     "sc": {"precharge": false, "joule": 0.0}
/// }
/// ```
pub(crate) async fn set_backend(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    debug!("Request: POST /api/config/backend");

    let request: BackendRequest = parse_body(&body)?;
    let update = request.into_update().map_err(WSeriesError::from)?;
    apply(&state, update).await
}

/// Replace sensor toggles.
///
/// # Endpoint
///
/// `POST /api/config/sensors`
///
/// # Request Body
///
/// ```json
/// {
///     "sensors": {"zmpt": true, "acs712": true, "ina219": false, "ads1115": false, "web_beep": true}
/// }
/// ```
pub(crate) async fn set_sensors(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    debug!("Request: POST /api/config/sensors");

    let request: SensorsRequest = parse_body(&body)?;
    apply(&state, request.into()).await
}

/// Replace safety guards.
///
/// # Endpoint
///
/// `POST /api/config/guards`
///
/// # Request Body
///
/// ```json
/// {
///     "guards": {"v_cutoff": 180.0, "i_guard": 15.0, "mcb_guard": true}
/// }
/// ```
pub(crate) async fn set_guards(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    debug!("Request: POST /api/config/guards");

    let request: GuardsRequest = parse_body(&body)?;
    apply(&state, request.into()).await
}

/// Replace auto-trigger parameters.
///
/// # Endpoint
///
/// `POST /api/config/auto_trigger`
///
/// # Request Body
///
/// ```json
/// {
///     "aut": {"ac": {"enabled": true, "i_thresh_arms": 1.5, "v_cutin_vrms": 180.0, "settle_ms": 60, "retrig_ms": 800}}
/// }
/// ```
pub(crate) async fn set_auto_trigger(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    debug!("Request: POST /api/config/auto_trigger");

    let request: AutoTriggerRequest = parse_body(&body)?;
    apply(&state, request.into()).await
}

/// Integration tests that exercise actual HTTP handlers
#[cfg(test)]
mod integration_tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wseries_core::config::SensorPresence;
    use wseries_core::RuntimeConfig;

    use crate::api::{create_router, AppState};
    use crate::config::{ConfigService, FileStore, MemoryStore};
    use crate::telemetry::TelemetryHub;

    struct TestApp {
        router: Router,
        store: Arc<FileStore>,
        _data_dir: TempDir,
    }

    impl TestApp {
        async fn new() -> Self {
            let data_dir = tempfile::tempdir().unwrap();
            let store = Arc::new(FileStore::new(data_dir.path(), "wseries", "runtime"));
            let service = ConfigService::initialize(store.clone()).await;
            let state = AppState::new(
                Arc::new(service),
                TelemetryHub::new(),
                SensorPresence::default(),
            );

            TestApp {
                router: create_router(state, None),
                store,
                _data_dir: data_dir,
            }
        }

        fn router(&self) -> Router {
            self.router.clone()
        }

        async fn post(&self, uri: &str, body: &str) -> (StatusCode, String) {
            let response = self
                .router()
                .oneshot(
                    Request::builder()
                        .method(Method::POST)
                        .uri(uri)
                        .header("content-type", "application/json")
                        .body(Body::from(body.to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();
            let status = response.status();
            (status, body_string(response.into_body()).await)
        }

        async fn get_config(&self) -> Value {
            let response = self
                .router()
                .oneshot(
                    Request::builder()
                        .uri("/api/config")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            serde_json::from_str(&body_string(response.into_body()).await).unwrap()
        }

        fn persisted(&self) -> Option<Value> {
            std::fs::read(self.store.path())
                .ok()
                .map(|bytes| serde_json::from_slice(&bytes).unwrap())
        }
    }

    async fn body_string(body: Body) -> String {
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn defaults_json() -> Value {
        serde_json::to_value(RuntimeConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_get_config_defaults() {
        let app = TestApp::new().await;

        let config = app.get_config().await;

        assert_eq!(config, defaults_json());
        assert_eq!(config["backend"], "AC");
        assert_eq!(config["slots"]["active"], 1);
        assert!(app.persisted().is_none());
    }

    #[tokio::test]
    async fn test_set_guards_scenario() {
        let app = TestApp::new().await;

        let (status, _) = app
            .post(
                "/api/config/guards",
                r#"{"guards": {"v_cutoff": 200, "i_guard": 20, "mcb_guard": true}}"#,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let config = app.get_config().await;
        assert_eq!(
            config["guards"],
            json!({"v_cutoff": 200.0, "i_guard": 20.0, "mcb_guard": true})
        );

        let mut expected = defaults_json();
        expected["guards"] = config["guards"].clone();
        assert_eq!(config, expected);
        assert_eq!(app.persisted().unwrap(), config);
    }

    #[tokio::test]
    async fn test_set_guards_rejects_zero_cutoff() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post(
                "/api/config/guards",
                r#"{"guards": {"v_cutoff": 0, "i_guard": 20, "mcb_guard": true}}"#,
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["rejections"][0]["field"], "guards.v_cutoff");
        assert_eq!(app.get_config().await, defaults_json());
        assert!(app.persisted().is_none());
    }

    #[tokio::test]
    async fn test_set_backend_pwm_out_of_range() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post(
                "/api/config/backend",
                r#"{"backend": "DC",
                    "ac": {"zero_cross": true, "half_cycle": false},
                    "dc": {"i_limit": 15.0, "pwm": 150},
                    "sc": {"precharge": false, "joule": 0.0}}"#,
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["rejections"][0]["field"], "dc.pwm");
        assert!(json["rejections"][0]["reason"]
            .as_str()
            .unwrap()
            .contains("pwm out of range"));
        assert_eq!(app.get_config().await, defaults_json());
    }

    #[tokio::test]
    async fn test_set_backend_unknown_backend() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post(
                "/api/config/backend",
                r#"{"backend": "Flywheel",
                    "ac": {"zero_cross": true, "half_cycle": false},
                    "dc": {"i_limit": 15.0, "pwm": 80},
                    "sc": {"precharge": false, "joule": 0.0}}"#,
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["rejections"][0]["field"], "backend");
    }

    #[tokio::test]
    async fn test_set_backend_switch_keeps_other_groups() {
        let app = TestApp::new().await;

        // Enable a DC-capable sensor first so the switch raises no advisory
        let (status, _) = app
            .post(
                "/api/config/sensors",
                r#"{"sensors": {"zmpt": true, "acs712": true, "ina219": true, "ads1115": false, "web_beep": false}}"#,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app
            .post(
                "/api/config/backend",
                r#"{"backend": "Supercap",
                    "ac": {"zero_cross": false, "half_cycle": true},
                    "dc": {"i_limit": 3.5, "pwm": 20},
                    "sc": {"precharge": true, "joule": 75.0}}"#,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let config = app.get_config().await;
        assert_eq!(config["backend"], "Supercap");
        assert_eq!(config["ac"]["half_cycle"], true);
        assert_eq!(config["dc"]["pwm"], 20);
        assert_eq!(config["sc"]["joule"], 75.0);
        assert_eq!(config["sensors"]["web_beep"], false);
        assert_eq!(config["aut"], defaults_json()["aut"]);
    }

    #[tokio::test]
    async fn test_backend_switch_with_advisory_is_no_content() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post(
                "/api/config/backend",
                r#"{"backend": "DC",
                    "ac": {"zero_cross": true, "half_cycle": false},
                    "dc": {"i_limit": 15.0, "pwm": 80},
                    "sc": {"precharge": false, "joule": 0.0}}"#,
            )
            .await;

        // No DC sense sensor is enabled, which is advisory only
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
        let config = app.get_config().await;
        assert_eq!(config["backend"], "DC");
        assert_eq!(app.persisted().unwrap(), config);
    }

    #[tokio::test]
    async fn test_set_sensors_guard_unsatisfiable() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post(
                "/api/config/sensors",
                r#"{"sensors": {"zmpt": true, "acs712": false, "ina219": false, "ads1115": false, "web_beep": true}}"#,
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("guard unsatisfiable"));
    }

    #[tokio::test]
    async fn test_set_auto_trigger() {
        let app = TestApp::new().await;

        let (status, _) = app
            .post(
                "/api/config/auto_trigger",
                r#"{"aut": {"ac": {"enabled": false, "i_thresh_arms": 2.5, "v_cutin_vrms": 200, "settle_ms": 100, "retrig_ms": 1500}}}"#,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let config = app.get_config().await;
        assert_eq!(config["aut"]["enabled"], false);
        assert_eq!(config["aut"]["retrig_ms"], 1500);
        assert_eq!(config["guards"], defaults_json()["guards"]);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = TestApp::new().await;

        for uri in [
            "/api/config/backend",
            "/api/config/sensors",
            "/api/config/guards",
            "/api/config/auto_trigger",
        ] {
            let (status, body) = app.post(uri, "{ not json").await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body.contains("Malformed input"));
        }
        assert!(app.persisted().is_none());
    }

    #[tokio::test]
    async fn test_missing_section_is_bad_request() {
        let app = TestApp::new().await;

        let (status, _) = app
            .post("/api/config/guards", r#"{"v_cutoff": 200}"#)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_body_without_content_type() {
        let app = TestApp::new().await;

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/config/guards")
                    .body(Body::from(
                        r#"{"guards": {"v_cutoff": 190, "i_guard": 10, "mcb_guard": true}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_persistence_failure_returns_warning() {
        let store = Arc::new(MemoryStore::new());
        let service = ConfigService::initialize(store.clone()).await;
        let state = AppState::new(
            Arc::new(service),
            TelemetryHub::new(),
            SensorPresence::default(),
        );
        let router = create_router(state, None);
        store.set_fail_writes(true);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/config/guards")
                    .body(Body::from(
                        r#"{"guards": {"v_cutoff": 222, "i_guard": 11, "mcb_guard": true}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response.into_body()).await;
        assert!(body.contains("not persisted"));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/config")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let config: Value =
            serde_json::from_str(&body_string(response.into_body()).await).unwrap();
        assert_eq!(config["guards"]["v_cutoff"], 222.0);
    }
}
