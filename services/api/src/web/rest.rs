//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{
    CalendarResponse, CsvExportRequest, DoneToggleResponse, ItemResponse, PreviewResponse,
    WeekResponse, WeekToggleResponse,
};
use crate::web::state::{AppState, ViewerId};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    Extension,
};
use course_calendar_core::preview::resolve_file_url;
use course_calendar_core::{
    export_filename, group_by_week, render_csv, CalendarView, ExportError, LoadState, PortError,
    PreviewStrategy, WeekKey,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        calendar_handler,
        toggle_week_handler,
        toggle_done_handler,
        preview_handler,
        download_handler,
        export_csv_handler,
    ),
    components(
        schemas(
            CalendarResponse,
            WeekResponse,
            ItemResponse,
            PreviewResponse,
            WeekToggleResponse,
            DoneToggleResponse,
            CsvExportRequest,
        )
    ),
    tags(
        (name = "Course Calendar API", description = "Weekly content calendar, previews and exports.")
    )
)]
pub struct ApiDoc;

fn port_status(e: &PortError) -> StatusCode {
    match e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Upstream(_) | PortError::Unexpected(_) => StatusCode::BAD_GATEWAY,
    }
}

//=========================================================================================
// Calendar
//=========================================================================================

/// Weekly calendar of a course's content.
///
/// The body is always a load state: `{"status": "loaded", "data": {...}}` on
/// success, `{"status": "failed", "message": "..."}` when the content backend
/// could not be read.
#[utoipa::path(
    get,
    path = "/courses/{course_id}/calendar",
    responses(
        (status = 200, description = "Calendar built", body = CalendarResponse),
        (status = 400, description = "Missing or invalid viewer id"),
        (status = 404, description = "Unknown course"),
        (status = 502, description = "Content backend unavailable")
    ),
    params(
        ("course_id" = String, Path, description = "Course whose content is shown."),
        ("x-viewer-id" = uuid::Uuid, Header, description = "The viewer whose toggles apply.")
    )
)]
pub async fn calendar_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(viewer): Extension<ViewerId>,
    Path(course_id): Path<String>,
) -> Response {
    let items = match app_state.content.list_content(&course_id).await {
        Ok(items) => items,
        Err(e) => {
            error!("Failed to load content for course {}: {:?}", course_id, e);
            let state: LoadState<CalendarResponse> = LoadState::Failed {
                message: e.to_string(),
            };
            return (port_status(&e), Json(state)).into_response();
        }
    };

    let grouping = group_by_week(
        items,
        &app_state.config.calendar_zone,
        app_state.diagnostics.as_ref(),
    );
    let view_state = app_state.view_states.snapshot(viewer).await;
    let view = CalendarView::build(&grouping, &view_state, &app_state.config.content_api_origin);

    let state = LoadState::Loaded {
        data: CalendarResponse::from(view),
    };
    (StatusCode::OK, Json(state)).into_response()
}

/// Expand or collapse a week for the calling viewer.
#[utoipa::path(
    post,
    path = "/calendar/weeks/{week_key}/toggle",
    responses(
        (status = 200, description = "Week toggled", body = WeekToggleResponse),
        (status = 400, description = "Malformed week key or viewer id"),
        (status = 422, description = "Too many weeks expanded")
    ),
    params(
        ("week_key" = String, Path, description = "Key from a calendar week, `<start_millis>_<end_millis>`."),
        ("x-viewer-id" = uuid::Uuid, Header, description = "The viewer whose toggles apply.")
    )
)]
pub async fn toggle_week_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(viewer): Extension<ViewerId>,
    Path(week_key): Path<String>,
) -> Result<Json<WeekToggleResponse>, (StatusCode, String)> {
    let key = week_key
        .parse::<WeekKey>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let expanded = app_state
        .view_states
        .update(viewer, |state| state.toggle_week(key))
        .await
        .map_err(|e| {
            warn!("Refusing week toggle for viewer {}: {}", viewer.0, e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;

    Ok(Json(WeekToggleResponse {
        key: key.to_string(),
        expanded,
    }))
}

/// Mark a content item done, or undo that, for the calling viewer.
///
/// The progress backend is notified in the background; its failures are logged
/// and never undo the toggle.
#[utoipa::path(
    post,
    path = "/calendar/items/{content_id}/done",
    responses(
        (status = 200, description = "Done flag toggled", body = DoneToggleResponse),
        (status = 400, description = "Missing or invalid viewer id"),
        (status = 422, description = "Too many items marked done, or content id too long")
    ),
    params(
        ("content_id" = String, Path, description = "Content item to toggle."),
        ("x-viewer-id" = uuid::Uuid, Header, description = "The viewer whose toggles apply.")
    )
)]
pub async fn toggle_done_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(viewer): Extension<ViewerId>,
    Path(content_id): Path<String>,
) -> Result<Json<DoneToggleResponse>, (StatusCode, String)> {
    let done = app_state
        .view_states
        .update(viewer, |state| state.toggle_done(&content_id))
        .await
        .map_err(|e| {
            warn!("Refusing done toggle for viewer {}: {}", viewer.0, e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;

    let progress = app_state.progress.clone();
    let notified_id = content_id.clone();
    tokio::spawn(async move {
        if let Err(e) = progress.mark_done(&notified_id, done).await {
            warn!("Progress update for {} was not delivered: {}", notified_id, e);
        }
    });

    Ok(Json(DoneToggleResponse { content_id, done }))
}

//=========================================================================================
// Files
//=========================================================================================

/// How the browser should preview a content item's file.
#[utoipa::path(
    get,
    path = "/content/{content_id}/preview",
    responses(
        (status = 200, description = "Preview strategy", body = PreviewResponse),
        (status = 404, description = "Unknown content item"),
        (status = 502, description = "Content backend unavailable")
    ),
    params(
        ("content_id" = String, Path, description = "Content item to preview.")
    )
)]
pub async fn preview_handler(
    State(app_state): State<Arc<AppState>>,
    Path(content_id): Path<String>,
) -> Result<Json<PreviewResponse>, (StatusCode, String)> {
    let item = app_state
        .content
        .get_content(&content_id)
        .await
        .map_err(|e| {
            error!("Failed to load content {}: {:?}", content_id, e);
            (port_status(&e), e.to_string())
        })?;

    let strategy = PreviewStrategy::for_file(&app_state.config.content_api_origin, &item.file_url);
    Ok(Json(strategy.into()))
}

/// Redirect to the raw file of a content item.
#[utoipa::path(
    get,
    path = "/content/{content_id}/download",
    responses(
        (status = 307, description = "Redirect to the file"),
        (status = 404, description = "Unknown content item"),
        (status = 502, description = "Content backend unavailable")
    ),
    params(
        ("content_id" = String, Path, description = "Content item to download.")
    )
)]
pub async fn download_handler(
    State(app_state): State<Arc<AppState>>,
    Path(content_id): Path<String>,
) -> Result<Redirect, (StatusCode, String)> {
    let item = app_state
        .content
        .get_content(&content_id)
        .await
        .map_err(|e| {
            error!("Failed to load content {}: {:?}", content_id, e);
            (port_status(&e), e.to_string())
        })?;

    let target = resolve_file_url(&app_state.config.content_api_origin, &item.file_url);
    Ok(Redirect::temporary(&target))
}

//=========================================================================================
// Exports
//=========================================================================================

/// Render a table as a downloadable CSV file.
#[utoipa::path(
    post,
    path = "/exports/csv",
    request_body = CsvExportRequest,
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 400, description = "No rows to export")
    )
)]
pub async fn export_csv_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CsvExportRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let csv = render_csv(&request.header, &request.rows).map_err(|e| match e {
        ExportError::NoRows => {
            warn!("Refusing empty export for '{}'", request.subject);
            (StatusCode::BAD_REQUEST, e.to_string())
        }
    })?;

    let filename = export_filename(&request.subject, app_state.config.calendar_zone.today());
    info!("Exporting {} row(s) as {}", request.rows.len(), filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}
