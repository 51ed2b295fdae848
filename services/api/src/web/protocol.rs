//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser and this service.

use chrono::NaiveDateTime;
use course_calendar_core::{
    CalendarView, ContentType, CsvValue, ItemView, PreviewKind, PreviewStrategy, WeekView,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Calendar Responses
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub weeks: Vec<WeekResponse>,
    /// Items left off the calendar because they had no usable date.
    pub skipped_items: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekResponse {
    /// Opaque key used by the toggle endpoint.
    pub key: String,
    pub label: String,
    pub week_start: NaiveDateTime,
    pub week_end: NaiveDateTime,
    pub expanded: bool,
    pub items: Vec<ItemResponse>,
}

#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
    pub date: NaiveDateTime,
    pub done: bool,
    pub preview: PreviewResponse,
}

/// One rendering strategy per file kind; fields not used by a strategy are omitted.
#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// One of `image`, `video`, `pdf`, `audio`, `generic`.
    pub kind: String,
    /// One of `inline_image`, `inline_video`, `document_frame`, `audio_player`, `no_preview`.
    pub strategy: String,
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

fn kind_name(kind: PreviewKind) -> &'static str {
    match kind {
        PreviewKind::Image => "image",
        PreviewKind::Video => "video",
        PreviewKind::Pdf => "pdf",
        PreviewKind::Audio => "audio",
        PreviewKind::Generic => "generic",
    }
}

fn content_type_name(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::TextBook => "TextBook",
        ContentType::Workbook => "Workbook",
        ContentType::Material => "Material",
        ContentType::Video => "Video",
        ContentType::Audio => "Audio",
        ContentType::Other => "Other",
    }
}

impl From<PreviewStrategy> for PreviewResponse {
    fn from(strategy: PreviewStrategy) -> Self {
        let kind = kind_name(strategy.kind()).to_string();
        let mut response = PreviewResponse {
            kind,
            strategy: String::new(),
            src: strategy.src().to_string(),
            fallback_src: None,
            mime_type: None,
            icon: None,
            extension: None,
        };
        match strategy {
            PreviewStrategy::InlineImage { fallback_src, .. } => {
                response.strategy = "inline_image".into();
                response.fallback_src = Some(fallback_src);
            }
            PreviewStrategy::InlineVideo { mime_type, .. } => {
                response.strategy = "inline_video".into();
                response.mime_type = Some(mime_type);
            }
            PreviewStrategy::DocumentFrame { .. } => {
                response.strategy = "document_frame".into();
            }
            PreviewStrategy::AudioPlayer { mime_type, icon, .. } => {
                response.strategy = "audio_player".into();
                response.mime_type = Some(mime_type);
                response.icon = Some(icon);
            }
            PreviewStrategy::NoPreview { extension, .. } => {
                response.strategy = "no_preview".into();
                response.extension = Some(extension);
            }
        }
        response
    }
}

impl From<ItemView> for ItemResponse {
    fn from(item: ItemView) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            content_type: content_type_name(item.content_type).to_string(),
            date: item.effective_date,
            done: item.done,
            preview: item.preview.into(),
        }
    }
}

impl From<WeekView> for WeekResponse {
    fn from(week: WeekView) -> Self {
        Self {
            key: week.key.to_string(),
            label: week.label,
            week_start: week.key.start,
            week_end: week.key.end,
            expanded: week.expanded,
            items: week.items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<CalendarView> for CalendarResponse {
    fn from(view: CalendarView) -> Self {
        Self {
            weeks: view.weeks.into_iter().map(Into::into).collect(),
            skipped_items: view.skipped,
        }
    }
}

//=========================================================================================
// Toggle Responses
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekToggleResponse {
    pub key: String,
    pub expanded: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoneToggleResponse {
    pub content_id: String,
    pub done: bool,
}

//=========================================================================================
// Export Requests
//=========================================================================================

/// A table to export as CSV.
#[derive(Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CsvExportRequest {
    /// Used in the download file name, e.g. `exam_results`.
    pub subject: String,
    pub header: Vec<String>,
    /// Rows of primitive values (string, number, boolean or null).
    #[schema(value_type = Vec<Vec<Object>>)]
    pub rows: Vec<Vec<CsvValue>>,
}
