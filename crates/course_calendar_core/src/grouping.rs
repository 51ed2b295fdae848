//! crates/course_calendar_core/src/grouping.rs
//!
//! Buckets content items into calendar weeks.

use crate::dates::{week_end, week_start};
use crate::domain::{CalendarZone, ContentId, ContentItem, ScheduledItem, WeekBucket};
use crate::ports::Diagnostics;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Why an item could not be placed on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateIssue {
    #[error("no upload or creation date")]
    Missing,
    #[error("unparseable date '{0}'")]
    Unparseable(String),
    #[error("date '{0}' has no calendar week inside the supported range")]
    OutOfRange(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub id: ContentId,
    pub issue: DateIssue,
}

/// Output of a grouping pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    /// Non-empty buckets, ascending by week start.
    pub buckets: Vec<WeekBucket>,
    /// Items dropped for lack of a usable date, in input order.
    pub skipped: Vec<SkippedItem>,
}

impl Grouping {
    pub fn item_count(&self) -> usize {
        self.buckets.iter().map(|b| b.items.len()).sum()
    }
}

/// The date an item is placed by: upload date when it parses, else creation date.
///
/// A date whose Monday-to-Sunday week cannot be represented is not usable.
pub fn effective_date(item: &ContentItem, zone: &CalendarZone) -> Result<NaiveDateTime, DateIssue> {
    placement(item, zone).map(|(date, _)| date)
}

/// Effective date together with the bounds of its week.
fn placement(
    item: &ContentItem,
    zone: &CalendarZone,
) -> Result<(NaiveDateTime, (NaiveDateTime, NaiveDateTime)), DateIssue> {
    let candidates = [item.upload_date.as_deref(), item.created_at.as_deref()];
    let mut first_issue = None;
    for raw in candidates.into_iter().flatten() {
        if raw.trim().is_empty() {
            continue;
        }
        let Some(date) = zone.parse_timestamp(raw) else {
            first_issue.get_or_insert_with(|| DateIssue::Unparseable(raw.to_string()));
            continue;
        };
        match week_start(date).zip(week_end(date)) {
            Some(bounds) => return Ok((date, bounds)),
            None => {
                first_issue.get_or_insert_with(|| DateIssue::OutOfRange(raw.to_string()));
            }
        }
    }
    Err(first_issue.unwrap_or(DateIssue::Missing))
}

/// Partitions `items` into Monday-to-Sunday buckets.
///
/// Every item with a usable date lands in exactly one bucket; items within a
/// bucket keep their input order when their dates tie. Items without a usable
/// date are reported to `diagnostics` and returned in [`Grouping::skipped`].
pub fn group_by_week(
    items: Vec<ContentItem>,
    zone: &CalendarZone,
    diagnostics: &dyn Diagnostics,
) -> Grouping {
    let mut weeks: BTreeMap<(NaiveDateTime, NaiveDateTime), Vec<ScheduledItem>> = BTreeMap::new();
    let mut skipped = Vec::new();

    for item in items {
        match placement(&item, zone) {
            Ok((effective_date, bounds)) => weeks.entry(bounds).or_default().push(ScheduledItem {
                item,
                effective_date,
            }),
            Err(issue) => {
                diagnostics.warn(&format!(
                    "Skipping content item '{}' ({}): {}",
                    item.id, item.title, issue
                ));
                skipped.push(SkippedItem { id: item.id, issue });
            }
        }
    }

    let buckets: Vec<WeekBucket> = weeks
        .into_iter()
        .map(|((week_start, week_end), mut items)| {
            items.sort_by_key(|scheduled| scheduled.effective_date);
            WeekBucket {
                week_start,
                week_end,
                items,
            }
        })
        .collect();

    diagnostics.debug(&format!(
        "Grouped content into {} week(s), skipped {}",
        buckets.len(),
        skipped.len()
    ));

    Grouping { buckets, skipped }
}
