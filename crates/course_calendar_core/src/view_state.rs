//! crates/course_calendar_core/src/view_state.rs
//!
//! Per-viewer expand/collapse and "done" toggles, kept apart from the grouped data.

use crate::domain::{ContentId, WeekBucket, WeekKey};
use std::collections::HashSet;

/// Upper bounds on how much one viewer's state may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLimits {
    pub max_expanded_weeks: usize,
    pub max_done_ids: usize,
    /// Longest content id accepted as a done mark, in bytes.
    pub max_content_id_len: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            max_expanded_weeks: 520,
            max_done_ids: 10_000,
            max_content_id_len: 128,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ViewStateError {
    #[error("at most {0} weeks can be expanded at once")]
    TooManyExpandedWeeks(usize),
    #[error("at most {0} items can be marked done")]
    TooManyDoneItems(usize),
    #[error("content id is longer than {0} bytes")]
    ContentIdTooLong(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    expanded_week_keys: HashSet<WeekKey>,
    marked_done_ids: HashSet<ContentId>,
    limits: ViewLimits,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ViewLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Flips whether `key` is expanded. Returns the new membership.
    ///
    /// Collapsing always succeeds; expanding fails once the limit is reached.
    pub fn toggle_week(&mut self, key: WeekKey) -> Result<bool, ViewStateError> {
        if self.expanded_week_keys.remove(&key) {
            return Ok(false);
        }
        if self.expanded_week_keys.len() >= self.limits.max_expanded_weeks {
            return Err(ViewStateError::TooManyExpandedWeeks(self.limits.max_expanded_weeks));
        }
        self.expanded_week_keys.insert(key);
        Ok(true)
    }

    /// Flips whether `item_id` is marked done. Returns the new membership.
    ///
    /// Notifying the progress backend is the caller's job.
    pub fn toggle_done(&mut self, item_id: &str) -> Result<bool, ViewStateError> {
        if self.marked_done_ids.remove(item_id) {
            return Ok(false);
        }
        if item_id.len() > self.limits.max_content_id_len {
            return Err(ViewStateError::ContentIdTooLong(self.limits.max_content_id_len));
        }
        if self.marked_done_ids.len() >= self.limits.max_done_ids {
            return Err(ViewStateError::TooManyDoneItems(self.limits.max_done_ids));
        }
        self.marked_done_ids.insert(item_id.to_string());
        Ok(true)
    }

    /// Whether a week renders expanded.
    ///
    /// Until anything has been toggled, the earliest bucket counts as expanded.
    /// That default is never written into the set.
    pub fn is_expanded(&self, key: &WeekKey, buckets: &[WeekBucket]) -> bool {
        if self.expanded_week_keys.is_empty() {
            return buckets.first().is_some_and(|first| first.key() == *key);
        }
        self.expanded_week_keys.contains(key)
    }

    pub fn is_done(&self, item_id: &str) -> bool {
        self.marked_done_ids.contains(item_id)
    }

    pub fn expanded_week_keys(&self) -> &HashSet<WeekKey> {
        &self.expanded_week_keys
    }

    pub fn marked_done_ids(&self) -> &HashSet<ContentId> {
        &self.marked_done_ids
    }
}
