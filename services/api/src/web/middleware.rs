//! services/api/src/web/middleware.rs
//!
//! Viewer identification for routes that read or write view state.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::web::state::ViewerId;

pub const VIEWER_HEADER: &str = "x-viewer-id";

/// Reads the viewer id from the `x-viewer-id` header.
pub fn viewer_from_headers(headers: &HeaderMap) -> Result<ViewerId, (StatusCode, String)> {
    let raw = headers
        .get(VIEWER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("{} header is required", VIEWER_HEADER),
            )
        })?;

    Uuid::parse_str(raw.trim()).map(ViewerId).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid {} format", VIEWER_HEADER),
        )
    })
}

/// Middleware that extracts the viewer id and stores it in the request extensions.
///
/// Requests without a valid id are rejected with 400 Bad Request.
pub async fn require_viewer(mut req: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    let viewer = viewer_from_headers(req.headers()).inspect_err(|(_, reason)| {
        warn!("Rejecting request to {}: {}", req.uri().path(), reason);
    })?;
    req.extensions_mut().insert(viewer);
    Ok(next.run(req).await)
}
