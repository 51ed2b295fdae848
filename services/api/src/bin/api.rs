//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{HttpContentSource, HttpProgressTracker, TracingDiagnostics},
    config::Config,
    error::ApiError,
    web::{
        calendar_handler, download_handler, export_csv_handler, preview_handler, require_viewer,
        rest::ApiDoc,
        state::{AppState, StoreLimits, ViewStateStore},
        toggle_done_handler, toggle_week_handler,
    },
};
use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderName, HeaderValue, Method};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    info!("Content backend at {}", config.content_api_origin);
    let http_client = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()?;
    let content = Arc::new(HttpContentSource::new(
        http_client.clone(),
        config.content_api_origin.clone(),
    ));
    let progress = Arc::new(HttpProgressTracker::new(
        http_client,
        config.content_api_origin.clone(),
    ));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        content,
        progress,
        diagnostics: Arc::new(TracingDiagnostics),
        view_states: Arc::new(ViewStateStore::with_limits(StoreLimits {
            max_viewers: config.max_viewers,
            idle_timeout: config.viewer_idle_timeout,
            ..StoreLimits::default()
        })),
    });

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT, HeaderName::from_static("x-viewer-id")])
        .expose_headers([axum::http::header::CONTENT_DISPOSITION]);

    // --- 4. Create the Web Router ---
    // Routes that read or write a viewer's toggles
    let viewer_routes = Router::new()
        .route("/courses/{course_id}/calendar", get(calendar_handler))
        .route("/calendar/weeks/{week_key}/toggle", post(toggle_week_handler))
        .route("/calendar/items/{content_id}/done", post(toggle_done_handler))
        .layer(axum_middleware::from_fn(require_viewer));

    // Routes that do not depend on who is asking
    let public_routes = Router::new()
        .route("/content/{content_id}/preview", get(preview_handler))
        .route("/content/{content_id}/download", get(download_handler))
        .route("/exports/csv", post(export_csv_handler));

    let api_router = Router::new()
        .merge(viewer_routes)
        .merge(public_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
