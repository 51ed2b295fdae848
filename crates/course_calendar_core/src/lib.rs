pub mod calendar;
pub mod dates;
pub mod diagnostics;
pub mod domain;
pub mod export;
pub mod grouping;
pub mod load_state;
pub mod ports;
pub mod preview;
pub mod view_state;

pub use calendar::{CalendarView, ItemView, WeekView};
pub use domain::{
    CalendarZone, ContentId, ContentItem, ContentType, ScheduledItem, WeekBucket, WeekKey,
    WeekKeyError,
};
pub use export::{export_filename, render_csv, CsvValue, ExportError};
pub use grouping::{group_by_week, Grouping};
pub use load_state::LoadState;
pub use ports::{ContentSource, Diagnostics, PortError, PortResult, ProgressTracker};
pub use preview::{PreviewKind, PreviewStrategy};
pub use view_state::{ViewLimits, ViewState, ViewStateError};
