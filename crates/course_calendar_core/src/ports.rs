//! crates/course_calendar_core/src/ports.rs
//!
//! Defines the service contracts (traits) the calendar core needs from the outside.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the content backend, the progress backend and the logger.

use crate::domain::{ContentId, ContentItem};
use async_trait::async_trait;
use tracing::Level;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (HTTP, JSON decoding).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Upstream service failed: {0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read-only access to the backend content store.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Lists every content item attached to a course.
    async fn list_content(&self, course_id: &str) -> PortResult<Vec<ContentItem>>;

    async fn get_content(&self, content_id: &str) -> PortResult<ContentItem>;
}

/// Receives done-state changes for content items.
///
/// Callers treat this as fire-and-forget: a failure is logged, never rolled back.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    async fn mark_done(&self, content_id: &ContentId, done: bool) -> PortResult<()>;
}

/// Structured diagnostics channel handed to the core instead of a global logger.
pub trait Diagnostics: Send + Sync {
    fn record(&self, level: Level, message: &str);

    fn warn(&self, message: &str) {
        self.record(Level::WARN, message);
    }

    fn debug(&self, message: &str) {
        self.record(Level::DEBUG, message);
    }
}
