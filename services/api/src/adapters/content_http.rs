//! services/api/src/adapters/content_http.rs
//!
//! This module contains the adapter for the remote content backend.
//! It implements the `ContentSource` port from the `core` crate over HTTP with `reqwest`.

use async_trait::async_trait;
use course_calendar_core::domain::{ContentItem, ContentType};
use course_calendar_core::ports::{ContentSource, PortError, PortResult};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ContentSource` port against the content REST API.
#[derive(Clone)]
pub struct HttpContentSource {
    client: Client,
    origin: String,
}

impl HttpContentSource {
    /// Creates a new `HttpContentSource`. `origin` has no trailing slash.
    pub fn new(client: Client, origin: String) -> Self {
        Self { client, origin }
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentRecord {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type")]
    content_type: ContentType,
    file_url: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl ContentRecord {
    pub(crate) fn to_domain(self) -> ContentItem {
        ContentItem {
            id: self.id,
            title: self.title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            content_type: self.content_type,
            file_url: self.file_url,
            upload_date: self.date,
            created_at: self.created_at,
        }
    }
}

/// Some deployments return a bare array, others wrap it in `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentListBody {
    Bare(Vec<ContentRecord>),
    Wrapped { data: Vec<ContentRecord> },
}

impl ContentListBody {
    pub(crate) fn into_records(self) -> Vec<ContentRecord> {
        match self {
            ContentListBody::Bare(records) | ContentListBody::Wrapped { data: records } => records,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentBody {
    Bare(ContentRecord),
    Wrapped { data: ContentRecord },
}

fn map_send_error(e: reqwest::Error) -> PortError {
    if e.is_timeout() {
        PortError::Upstream("content backend timed out".to_string())
    } else {
        PortError::Upstream(e.to_string())
    }
}

fn check_status(status: StatusCode, what: &str) -> PortResult<()> {
    if status == StatusCode::NOT_FOUND {
        return Err(PortError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        return Err(PortError::Upstream(format!(
            "content backend answered {} for {}",
            status, what
        )));
    }
    Ok(())
}

//=========================================================================================
// `ContentSource` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn list_content(&self, course_id: &str) -> PortResult<Vec<ContentItem>> {
        let url = format!("{}/api/content", self.origin);
        debug!("Fetching content list from {} for course {}", url, course_id);

        let response = self
            .client
            .get(&url)
            .query(&[("courseId", course_id)])
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(response.status(), &format!("course {}", course_id))?;

        let body: ContentListBody = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Malformed content list: {}", e)))?;

        Ok(body
            .into_records()
            .into_iter()
            .map(ContentRecord::to_domain)
            .collect())
    }

    async fn get_content(&self, content_id: &str) -> PortResult<ContentItem> {
        let url = format!("{}/api/content/{}", self.origin, content_id);
        debug!("Fetching content item from {}", url);

        let response = self.client.get(&url).send().await.map_err(map_send_error)?;
        check_status(response.status(), &format!("content {}", content_id))?;

        let body: ContentBody = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Malformed content item: {}", e)))?;

        Ok(match body {
            ContentBody::Bare(record) | ContentBody::Wrapped { data: record } => record.to_domain(),
        })
    }
}
