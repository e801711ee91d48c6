//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod health;
pub mod hello;
pub mod talk;

use crate::config::Settings;
use crate::middleware::logging::request_logging_middleware;
use crate::services::{ModelLimitTable, OpenAIClient, ResponsesApi, UsageEstimator};
use crate::utils::error::helpers::internal_error;
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub client: Arc<dyn ResponsesApi>,
    pub estimator: UsageEstimator,
}

impl AppState {
    pub fn new(settings: Settings, client: Arc<dyn ResponsesApi>, limits: ModelLimitTable) -> Self {
        Self {
            settings,
            client,
            estimator: UsageEstimator::new(Arc::new(limits)),
        }
    }
}

/// Create application router backed by the real upstream client
pub async fn create_router(settings: Settings, limits: ModelLimitTable) -> Result<Router> {
    let client = Arc::new(OpenAIClient::new(&settings)?);
    Ok(build_router(AppState::new(settings, client, limits)))
}

/// Wire routes and middleware around an existing state
pub fn build_router(state: AppState) -> Router {
    let max_request_size = state.settings.request.max_request_size;
    let cors = cors_layer(&state.settings);

    // Create middleware stack
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(DefaultBodyLimit::max(max_request_size));

    // Create routes
    let router = Router::new()
        .route("/", get(hello::teapot))
        .route("/api/hello", get(hello::hello).post(hello::hello))
        .route("/api/talktome", post(talk::handle_talk))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .with_state(Arc::new(state))
        .layer(middleware_stack);

    // Add CORS support (if enabled)
    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Turn a handler panic into the generic 500 error body
fn handle_panic(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let details = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!("Request handler panicked: {}", details);
    internal_error(format!("handler panicked: {}", details)).into_response()
}

fn cors_layer(settings: &Settings) -> Option<CorsLayer> {
    if !settings.security.cors_enabled {
        return None;
    }

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let origins = &settings.security.allowed_origins;

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return Some(layer.allow_origin(Any));
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(layer.allow_origin(parsed))
}
