//! crates/course_calendar_core/src/diagnostics.rs
//!
//! An in-memory `Diagnostics` sink, for tests and for callers that want to
//! inspect what a computation complained about.

use crate::ports::Diagnostics;
use std::sync::Mutex;
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    entries: Mutex<Vec<DiagnosticEntry>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.entries().iter().filter(|e| e.level == level).count()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn record(&self, level: Level, message: &str) {
        let entry = DiagnosticEntry {
            level,
            message: message.to_string(),
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
