//! crates/course_calendar_core/src/calendar.rs
//!
//! Joins a grouping pass with a viewer's toggles into the view the browser renders.

use crate::dates::format_range;
use crate::domain::{ContentId, ContentType, WeekKey};
use crate::grouping::Grouping;
use crate::preview::PreviewStrategy;
use crate::view_state::ViewState;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView {
    pub weeks: Vec<WeekView>,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekView {
    pub key: WeekKey,
    pub label: String,
    pub expanded: bool,
    pub items: Vec<ItemView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: ContentId,
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub effective_date: NaiveDateTime,
    pub done: bool,
    pub preview: PreviewStrategy,
}

impl CalendarView {
    /// `file_origin` resolves relative file paths for the preview strategies.
    pub fn build(grouping: &Grouping, view_state: &ViewState, file_origin: &str) -> Self {
        let weeks = grouping
            .buckets
            .iter()
            .map(|bucket| {
                let key = bucket.key();
                WeekView {
                    key,
                    label: format_range(bucket.week_start, bucket.week_end),
                    expanded: view_state.is_expanded(&key, &grouping.buckets),
                    items: bucket
                        .items
                        .iter()
                        .map(|scheduled| ItemView {
                            id: scheduled.item.id.clone(),
                            title: scheduled.item.title.clone(),
                            description: scheduled.item.description.clone(),
                            content_type: scheduled.item.content_type,
                            effective_date: scheduled.effective_date,
                            done: view_state.is_done(&scheduled.item.id),
                            preview: PreviewStrategy::for_file(file_origin, &scheduled.item.file_url),
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            weeks,
            skipped: grouping.skipped.len(),
        }
    }
}
