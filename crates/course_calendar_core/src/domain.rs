//! crates/course_calendar_core/src/domain.rs
//!
//! Defines the pure, core data structures for the course calendar.
//! These structs are independent of the upstream wire format; adapters map
//! their own records into them.

use crate::dates::{week_end, week_start};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a content item, as issued by the content backend.
pub type ContentId = String;

/// The kind of educational material a content item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    TextBook,
    Workbook,
    Material,
    Video,
    Audio,
    /// Anything the backend sends that this service does not know about yet.
    #[serde(other)]
    Other,
}

/// A single piece of uploaded material.
///
/// Dates are kept exactly as the backend sent them. Whether they parse is a
/// question for the grouping engine, which drops items it cannot place.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub file_url: String,
    pub upload_date: Option<String>,
    pub created_at: Option<String>,
}

/// A content item placed on the calendar, with the date it was placed by.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledItem {
    pub item: ContentItem,
    pub effective_date: NaiveDateTime,
}

/// A Monday-to-Sunday group of content items.
///
/// Never empty: the grouping engine only materialises buckets that hold at
/// least one item.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekBucket {
    pub week_start: NaiveDateTime,
    pub week_end: NaiveDateTime,
    pub items: Vec<ScheduledItem>,
}

impl WeekBucket {
    pub fn key(&self) -> WeekKey {
        WeekKey {
            start: self.week_start,
            end: self.week_end,
        }
    }
}

//=========================================================================================
// Week Keys
//=========================================================================================

/// Stable composite key of a week bucket: its start and end instants.
///
/// The string form is `<start_millis>_<end_millis>`, milliseconds of the local
/// wall-clock time read as if it were UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekKey {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WeekKeyError {
    #[error("week key must look like <start_millis>_<end_millis>, got '{0}'")]
    Malformed(String),
    #[error("week key timestamp out of range: {0}")]
    OutOfRange(i64),
    #[error("week key '{0}' does not span a Monday-to-Sunday week")]
    NotAWeek(String),
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}",
            self.start.and_utc().timestamp_millis(),
            self.end.and_utc().timestamp_millis()
        )
    }
}

impl FromStr for WeekKey {
    type Err = WeekKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('_')
            .ok_or_else(|| WeekKeyError::Malformed(s.to_string()))?;
        let parse_millis = |part: &str| -> Result<NaiveDateTime, WeekKeyError> {
            let millis = part
                .parse::<i64>()
                .map_err(|_| WeekKeyError::Malformed(s.to_string()))?;
            DateTime::<Utc>::from_timestamp_millis(millis)
                .map(|dt| dt.naive_utc())
                .ok_or(WeekKeyError::OutOfRange(millis))
        };
        let key = WeekKey {
            start: parse_millis(start)?,
            end: parse_millis(end)?,
        };
        if week_start(key.start) != Some(key.start) || week_end(key.start) != Some(key.end) {
            return Err(WeekKeyError::NotAWeek(s.to_string()));
        }
        Ok(key)
    }
}

//=========================================================================================
// Calendar Zone
//=========================================================================================

/// The local time zone all calendar arithmetic happens in.
///
/// Timestamps carrying an offset are converted into this zone once, at parse
/// time. Everything downstream works on naive local wall-clock values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarZone {
    offset: FixedOffset,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("'{0}' is not a UTC offset like +02:00 or -05:30")]
pub struct ZoneError(pub String);

impl CalendarZone {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current local date in this zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Parses a backend timestamp into local wall-clock time.
    ///
    /// Accepts RFC 3339 (converted into this zone), a naive `YYYY-MM-DDTHH:MM:SS[.fff]`
    /// (taken as already local) and a bare `YYYY-MM-DD` (local midnight).
    pub fn parse_timestamp(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&self.offset).naive_local());
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    }
}

impl Default for CalendarZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for CalendarZone {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Self::utc());
        }
        // FixedOffset parses offsets via a full timestamp, so borrow one.
        DateTime::parse_from_rfc3339(&format!("2000-01-01T00:00:00{trimmed}"))
            .map(|dt| Self::new(*dt.offset()))
            .map_err(|_| ZoneError(s.to_string()))
    }
}
