//! API module for the WSeries daemon
//!
//! Contains the REST/WebSocket implementation with Axum router and handlers.

pub(crate) mod handlers;

use crate::config::ConfigService;
use crate::telemetry::TelemetryHub;
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use wseries_core::config::SensorPresence;

/// Largest accepted request body; configuration documents are well under 2 KiB.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Application state shared across all handlers
#[derive(Clone)]
pub(crate) struct AppState {
    /// Owner of the runtime configuration
    pub config: Arc<ConfigService>,
    /// Telemetry fan-out
    pub telemetry: TelemetryHub,
    /// Advertised sensor presence
    pub capabilities: SensorPresence,
    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Arc<ConfigService>,
        telemetry: TelemetryHub,
        capabilities: SensorPresence,
    ) -> Self {
        Self {
            config,
            telemetry,
            capabilities,
            start_time: Instant::now(),
        }
    }
}

/// Create the main API router with all endpoints
///
/// When `static_dir` is set, unmatched paths are served from it, with
/// `index.html` for directories; otherwise `/` returns service identification.
pub(crate) fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    info!("Setting up API router...");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let router = Router::new()
        // Configuration endpoints
        .route("/api/config", get(handlers::config::get_config))
        .route("/api/config/backend", post(handlers::config::set_backend))
        .route("/api/config/sensors", post(handlers::config::set_sensors))
        .route("/api/config/guards", post(handlers::config::set_guards))
        .route(
            "/api/config/auto_trigger",
            post(handlers::config::set_auto_trigger),
        )
        // Capability advertisement
        .route("/api/capabilities", get(handlers::info::get_capabilities))
        // Cycle control hooks
        .route("/api/cycle/trigger", post(handlers::cycle::trigger))
        .route("/api/cycle/abort", post(handlers::cycle::abort))
        // Telemetry WebSocket
        .route("/ws", get(handlers::telemetry::ws_upgrade));

    let router = match static_dir {
        Some(dir) => {
            info!("Serving web UI from {}", dir.display());
            router.fallback_service(ServeDir::new(dir))
        }
        None => router.route("/", get(handlers::info::root)),
    };

    router.layer(middleware_stack).with_state(state)
}

/// Error handling utilities
pub(crate) mod error {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use wseries_core::api::ErrorResponse;
    use wseries_core::config::Rejection;
    use wseries_core::WSeriesError;

    use tracing::{error, warn};

    /// Custom error type for API responses
    #[derive(Debug)]
    pub struct ApiError {
        pub status_code: StatusCode,
        pub message: String,
        pub rejections: Vec<Rejection>,
    }

    impl ApiError {
        /// Create a new API error
        pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
            Self {
                status_code,
                message: message.into(),
                rejections: Vec::new(),
            }
        }

        /// Create a bad request error
        pub fn bad_request(message: impl Into<String>) -> Self {
            Self::new(StatusCode::BAD_REQUEST, message)
        }

        /// Create an internal server error
        pub fn internal_error(message: impl Into<String>) -> Self {
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            if self.status_code.is_server_error() {
                error!("API Error {}: {}", self.status_code, self.message);
            } else {
                warn!("API Error {}: {}", self.status_code, self.message);
            }

            let body = ErrorResponse {
                error: self.message,
                rejections: self.rejections,
            };

            (self.status_code, Json(body)).into_response()
        }
    }

    /// Convert WSeriesError to ApiError
    impl From<WSeriesError> for ApiError {
        fn from(err: WSeriesError) -> Self {
            match err {
                WSeriesError::MalformedInput(msg) => {
                    Self::bad_request(format!("Malformed input: {}", msg))
                }
                WSeriesError::ValidationRejected(errors) => Self {
                    status_code: StatusCode::BAD_REQUEST,
                    message: "Validation rejected".to_string(),
                    rejections: errors.0,
                },
                _ => Self::internal_error(err.to_string()),
            }
        }
    }
}
