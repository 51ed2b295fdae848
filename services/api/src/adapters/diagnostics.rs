//! services/api/src/adapters/diagnostics.rs
//!
//! Forwards core diagnostics to `tracing`.

use course_calendar_core::ports::Diagnostics;
use tracing::{debug, error, info, trace, warn, Level};

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, level: Level, message: &str) {
        // `tracing` macros need the level at compile time.
        match level {
            Level::ERROR => error!(target: "course_calendar", "{}", message),
            Level::WARN => warn!(target: "course_calendar", "{}", message),
            Level::INFO => info!(target: "course_calendar", "{}", message),
            Level::DEBUG => debug!(target: "course_calendar", "{}", message),
            _ => trace!(target: "course_calendar", "{}", message),
        }
    }
}
