//! services/api/src/adapters/progress_http.rs
//!
//! This module contains the adapter for the progress-tracking backend.
//! It implements the `ProgressTracker` port from the `core` crate.

use async_trait::async_trait;
use course_calendar_core::domain::ContentId;
use course_calendar_core::ports::{PortError, PortResult, ProgressTracker};
use reqwest::Client;
use serde::Serialize;

#[derive(Clone)]
pub struct HttpProgressTracker {
    client: Client,
    origin: String,
}

impl HttpProgressTracker {
    pub fn new(client: Client, origin: String) -> Self {
        Self { client, origin }
    }
}

#[derive(Serialize)]
struct ProgressPayload {
    done: bool,
}

#[async_trait]
impl ProgressTracker for HttpProgressTracker {
    async fn mark_done(&self, content_id: &ContentId, done: bool) -> PortResult<()> {
        let url = format!("{}/api/progress/{}", self.origin, content_id);
        let response = self
            .client
            .post(&url)
            .json(&ProgressPayload { done })
            .send()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::Upstream(format!(
                "progress backend answered {} for {}",
                response.status(),
                content_id
            )));
        }
        Ok(())
    }
}
