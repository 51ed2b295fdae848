use api_lib::config::Config;
use api_lib::web::rest::{
    calendar_handler, download_handler, export_csv_handler, preview_handler, toggle_done_handler,
    toggle_week_handler,
};
use api_lib::web::protocol::CsvExportRequest;
use api_lib::web::state::{AppState, StoreLimits, ViewStateStore, ViewerId};
use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use course_calendar_core::diagnostics::MemoryDiagnostics;
use course_calendar_core::ports::{ContentSource, PortError, PortResult, ProgressTracker};
use course_calendar_core::{CalendarZone, ContentId, ContentItem, ContentType, CsvValue};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

const ORIGIN: &str = "http://content.test";

//=========================================================================================
// In-memory Port Fakes
//=========================================================================================

struct FakeContent {
    items: Vec<ContentItem>,
    fail: bool,
}

#[async_trait]
impl ContentSource for FakeContent {
    async fn list_content(&self, _course_id: &str) -> PortResult<Vec<ContentItem>> {
        if self.fail {
            return Err(PortError::Upstream("connection refused".to_string()));
        }
        Ok(self.items.clone())
    }

    async fn get_content(&self, content_id: &str) -> PortResult<ContentItem> {
        self.items
            .iter()
            .find(|item| item.id == content_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(content_id.to_string()))
    }
}

#[derive(Default)]
struct RecordingProgress {
    calls: Mutex<Vec<(ContentId, bool)>>,
}

#[async_trait]
impl ProgressTracker for RecordingProgress {
    async fn mark_done(&self, content_id: &ContentId, done: bool) -> PortResult<()> {
        self.calls.lock().unwrap().push((content_id.clone(), done));
        Ok(())
    }
}

fn item(id: &str, date: Option<&str>, created_at: Option<&str>, file: &str) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        title: format!("Lesson {id}"),
        description: None,
        content_type: ContentType::Material,
        file_url: file.to_string(),
        upload_date: date.map(str::to_string),
        created_at: created_at.map(str::to_string),
    }
}

struct Harness {
    state: Arc<AppState>,
    progress: Arc<RecordingProgress>,
    diagnostics: Arc<MemoryDiagnostics>,
    viewer: ViewerId,
}

fn harness(items: Vec<ContentItem>, fail: bool) -> Harness {
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        content_api_origin: ORIGIN.to_string(),
        calendar_zone: CalendarZone::utc(),
        cors_origin: "http://localhost:5173".to_string(),
        log_level: Level::INFO,
        upstream_timeout: Duration::from_secs(1),
        max_viewers: 100,
        viewer_idle_timeout: Duration::from_secs(3600),
    };
    let progress = Arc::new(RecordingProgress::default());
    let diagnostics = Arc::new(MemoryDiagnostics::new());
    let view_states = ViewStateStore::with_limits(StoreLimits {
        max_viewers: config.max_viewers,
        idle_timeout: config.viewer_idle_timeout,
        ..StoreLimits::default()
    });
    let state = Arc::new(AppState {
        config: Arc::new(config),
        content: Arc::new(FakeContent { items, fail }),
        progress: progress.clone(),
        diagnostics: diagnostics.clone(),
        view_states: Arc::new(view_states),
    });
    Harness {
        state,
        progress,
        diagnostics,
        viewer: ViewerId(Uuid::new_v4()),
    }
}

fn course() -> Vec<ContentItem> {
    vec![
        item("week2", Some("2024-01-08T09:00:00Z"), None, "/uploads/w2.mp3"),
        item("mon", Some("2024-01-01T09:00:00Z"), None, "/uploads/mon.pdf"),
        item("sun", Some("2024-01-07T18:00:00Z"), None, "/uploads/sun.jpg"),
        item("created", None, Some("2024-03-05T10:00:00Z"), "/uploads/created.ogg"),
        item("broken", Some("yesterday"), Some("soon"), "/uploads/broken.pdf"),
    ]
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn calendar(h: &Harness) -> (StatusCode, Value) {
    let response = calendar_handler(
        State(h.state.clone()),
        Extension(h.viewer),
        Path("course-1".to_string()),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

//=========================================================================================
// Calendar
//=========================================================================================

#[tokio::test]
async fn calendar_groups_content_into_weeks() {
    let h = harness(course(), false);
    let (status, body) = calendar(&h).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "loaded");
    let weeks = body["data"]["weeks"].as_array().unwrap();
    assert_eq!(weeks.len(), 3);
    assert_eq!(body["data"]["skippedItems"], 1);

    assert_eq!(weeks[0]["label"], "1 January - 7 January");
    assert_eq!(weeks[0]["key"], "1704067200000_1704671999999");
    let first_ids: Vec<&str> = weeks[0]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert_eq!(first_ids, vec!["mon", "sun"]);
    assert_eq!(weeks[1]["items"][0]["id"], "week2");
    assert_eq!(weeks[2]["items"][0]["id"], "created");

    // First week expanded by default, the rest collapsed.
    assert_eq!(weeks[0]["expanded"], true);
    assert_eq!(weeks[1]["expanded"], false);
    assert_eq!(weeks[2]["expanded"], false);

    assert_eq!(h.diagnostics.count_at(Level::WARN), 1);
}

#[tokio::test]
async fn calendar_items_carry_preview_strategies() {
    let h = harness(course(), false);
    let (_, body) = calendar(&h).await;
    let weeks = &body["data"]["weeks"];

    let pdf = &weeks[0]["items"][0]["preview"];
    assert_eq!(pdf["kind"], "pdf");
    assert_eq!(pdf["strategy"], "document_frame");
    assert_eq!(pdf["src"], "http://content.test/uploads/mon.pdf");

    let image = &weeks[0]["items"][1]["preview"];
    assert_eq!(image["kind"], "image");
    assert!(image["fallbackSrc"].is_string());

    let audio = &weeks[1]["items"][0]["preview"];
    assert_eq!(audio["kind"], "audio");
    assert_eq!(audio["mimeType"], "audio/mpeg");

    let ogg = &weeks[2]["items"][0]["preview"];
    assert_eq!(ogg["kind"], "video");
}

#[tokio::test]
async fn dates_at_the_calendar_limits_are_skipped() {
    let mut items = course();
    items.push(item("far-future", Some("+262142-12-31"), None, "/uploads/f.pdf"));
    items.push(item("far-past", Some("-262143-01-01"), None, "/uploads/p.pdf"));
    let h = harness(items, false);

    let (status, body) = calendar(&h).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["skippedItems"], 3);
    assert_eq!(body["data"]["weeks"].as_array().unwrap().len(), 3);
    assert_eq!(h.diagnostics.count_at(Level::WARN), 3);
}

#[tokio::test]
async fn failed_fetch_is_reported_not_replaced_with_mock_data() {
    let h = harness(course(), true);
    let (status, body) = calendar(&h).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "failed");
    assert!(body["message"].as_str().unwrap().contains("connection refused"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn empty_course_is_loaded_with_no_weeks() {
    let h = harness(Vec::new(), false);
    let (status, body) = calendar(&h).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "loaded");
    assert_eq!(body["data"]["weeks"], serde_json::json!([]));
}

//=========================================================================================
// Toggles
//=========================================================================================

#[tokio::test]
async fn toggling_a_week_replaces_the_default_expansion() {
    let h = harness(course(), false);
    let (_, body) = calendar(&h).await;
    let second_key = body["data"]["weeks"][1]["key"].as_str().unwrap().to_string();

    let Json(toggled) = toggle_week_handler(
        State(h.state.clone()),
        Extension(h.viewer),
        Path(second_key.clone()),
    )
    .await
    .unwrap();
    assert!(toggled.expanded);
    assert_eq!(toggled.key, second_key);

    let (_, body) = calendar(&h).await;
    let weeks = &body["data"]["weeks"];
    assert_eq!(weeks[0]["expanded"], false);
    assert_eq!(weeks[1]["expanded"], true);

    let Json(toggled) = toggle_week_handler(State(h.state.clone()), Extension(h.viewer), Path(second_key))
        .await
        .unwrap();
    assert!(!toggled.expanded);
    let (_, body) = calendar(&h).await;
    assert_eq!(body["data"]["weeks"][0]["expanded"], true);
}

#[tokio::test]
async fn malformed_week_keys_are_rejected() {
    let h = harness(course(), false);
    let err = toggle_week_handler(
        State(h.state.clone()),
        Extension(h.viewer),
        Path("last-week".to_string()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn keys_that_are_not_real_weeks_are_rejected() {
    let h = harness(course(), false);
    let err = toggle_week_handler(
        State(h.state.clone()),
        Extension(h.viewer),
        Path("0_5".to_string()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::BAD_REQUEST);

    // The rejected key leaves the default expansion in place.
    let (_, body) = calendar(&h).await;
    assert_eq!(body["data"]["weeks"][0]["expanded"], true);
    assert_eq!(h.state.view_states.viewer_count().await, 0);
}

#[tokio::test]
async fn oversized_content_ids_are_not_marked_done() {
    let h = harness(course(), false);
    let err = toggle_done_handler(
        State(h.state.clone()),
        Extension(h.viewer),
        Path("x".repeat(4096)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(h.state.view_states.snapshot(h.viewer).await.marked_done_ids().is_empty());
    assert!(h.progress.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn viewer_count_stays_within_the_configured_bound() {
    let h = harness(course(), false);
    for _ in 0..250 {
        toggle_done_handler(
            State(h.state.clone()),
            Extension(ViewerId(Uuid::new_v4())),
            Path("mon".to_string()),
        )
        .await
        .unwrap();
    }
    assert_eq!(h.state.view_states.viewer_count().await, 100);
}

#[tokio::test]
async fn toggling_done_notifies_progress_and_shows_in_calendar() {
    let h = harness(course(), false);

    let Json(first) = toggle_done_handler(
        State(h.state.clone()),
        Extension(h.viewer),
        Path("mon".to_string()),
    )
    .await
    .unwrap();
    assert!(first.done);

    let (_, body) = calendar(&h).await;
    assert_eq!(body["data"]["weeks"][0]["items"][0]["done"], true);

    let Json(second) = toggle_done_handler(
        State(h.state.clone()),
        Extension(h.viewer),
        Path("mon".to_string()),
    )
    .await
    .unwrap();
    assert!(!second.done);

    // Notifications run on spawned tasks; give them a moment.
    for _ in 0..50 {
        if h.progress.calls.lock().unwrap().len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let mut calls = h.progress.calls.lock().unwrap().clone();
    calls.sort_by_key(|(_, done)| !*done);
    assert_eq!(calls, vec![("mon".to_string(), true), ("mon".to_string(), false)]);
}

#[tokio::test]
async fn done_marks_are_per_viewer() {
    let h = harness(course(), false);
    toggle_done_handler(
        State(h.state.clone()),
        Extension(h.viewer),
        Path("sun".to_string()),
    )
    .await
    .unwrap();

    let other = ViewerId(Uuid::new_v4());
    let response = calendar_handler(
        State(h.state.clone()),
        Extension(other),
        Path("course-1".to_string()),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["weeks"][0]["items"][1]["done"], false);
}

//=========================================================================================
// Files
//=========================================================================================

#[tokio::test]
async fn preview_resolves_relative_paths_against_the_origin() {
    let h = harness(course(), false);
    let Json(preview) = preview_handler(State(h.state.clone()), Path("sun".to_string()))
        .await
        .unwrap();
    assert_eq!(preview.kind, "image");
    assert_eq!(preview.src, "http://content.test/uploads/sun.jpg");
}

#[tokio::test]
async fn preview_of_unknown_content_is_not_found() {
    let h = harness(course(), false);
    let err = preview_handler(State(h.state.clone()), Path("nope".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_redirects_to_the_file() {
    let h = harness(course(), false);
    let response = download_handler(State(h.state.clone()), Path("mon".to_string()))
        .await
        .unwrap()
        .into_response();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "http://content.test/uploads/mon.pdf"
    );
}

//=========================================================================================
// Exports
//=========================================================================================

#[tokio::test]
async fn export_returns_a_quoted_csv_attachment() {
    let h = harness(Vec::new(), false);
    let request = CsvExportRequest {
        subject: "Exam Results".to_string(),
        header: vec!["Student".to_string(), "Score".to_string()],
        rows: vec![
            vec![CsvValue::from("Ada"), CsvValue::from(95_i64)],
            vec![CsvValue::from("Grace \"Amazing\""), CsvValue::from(88.5)],
        ],
    };

    let response = export_csv_handler(State(h.state.clone()), Json(request))
        .await
        .unwrap()
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    let today = h.state.config.calendar_zone.today().format("%Y-%m-%d").to_string();
    assert_eq!(
        disposition,
        format!("attachment; filename=\"Exam_Results_{}.csv\"", today)
    );
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let body = body_text(response).await;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "\"Student\",\"Score\"");
    assert_eq!(lines[2], "\"Grace \"\"Amazing\"\"\",\"88.5\"");
}

#[tokio::test]
async fn empty_export_is_refused() {
    let h = harness(Vec::new(), false);
    let request = CsvExportRequest {
        subject: "Exam Results".to_string(),
        header: vec!["Student".to_string()],
        rows: Vec::new(),
    };
    let err = export_csv_handler(State(h.state.clone()), Json(request))
        .await
        .err()
        .unwrap();
    assert_eq!(err.0, StatusCode::BAD_REQUEST);
    assert_eq!(err.1, "No data to export");
}
