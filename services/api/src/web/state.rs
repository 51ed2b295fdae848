//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-viewer view state store.

use crate::config::Config;
use course_calendar_core::ports::{ContentSource, Diagnostics, ProgressTracker};
use course_calendar_core::{ViewLimits, ViewState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub content: Arc<dyn ContentSource>,
    pub progress: Arc<dyn ProgressTracker>,
    pub diagnostics: Arc<dyn Diagnostics>,
    pub view_states: Arc<ViewStateStore>,
}

//=========================================================================================
// ViewStateStore (One ViewState per Viewer)
//=========================================================================================

/// Identifies whose toggles a request reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewerId(pub Uuid);

/// How many viewers the store keeps, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub max_viewers: usize,
    /// Viewers not seen for this long start over from the empty state.
    pub idle_timeout: Duration,
    pub per_viewer: ViewLimits,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_viewers: 10_000,
            idle_timeout: Duration::from_secs(60 * 60),
            per_viewer: ViewLimits::default(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    state: ViewState,
    last_seen: Instant,
    /// Value of the store's access counter at the last access; lowest is evicted first.
    last_access: u64,
}

#[derive(Debug, Default)]
struct Entries {
    by_viewer: HashMap<ViewerId, Entry>,
    accesses: u64,
}

impl Entries {
    fn drop_idle(&mut self, now: Instant, idle_timeout: Duration) {
        let before = self.by_viewer.len();
        self.by_viewer
            .retain(|_, entry| now.duration_since(entry.last_seen) <= idle_timeout);
        let dropped = before - self.by_viewer.len();
        if dropped > 0 {
            debug!("Dropped view state of {} idle viewer(s)", dropped);
        }
    }

    fn drop_least_recent(&mut self) {
        let oldest = self
            .by_viewer
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(viewer, _)| *viewer);
        if let Some(viewer) = oldest {
            self.by_viewer.remove(&viewer);
            debug!("Evicted view state of viewer {}", viewer.0);
        }
    }
}

/// In-memory toggles, one `ViewState` per viewer. Lost on restart.
///
/// Holds at most `max_viewers` viewers; when a new viewer arrives at capacity
/// the least recently used one is evicted. Idle viewers are forgotten.
#[derive(Debug)]
pub struct ViewStateStore {
    limits: StoreLimits,
    entries: Mutex<Entries>,
}

impl Default for ViewStateStore {
    fn default() -> Self {
        Self::with_limits(StoreLimits::default())
    }
}

impl ViewStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: StoreLimits) -> Self {
        Self {
            limits,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// A copy of the viewer's current state; fresh or idle viewers get the empty state.
    ///
    /// Reading does not register a viewer, but it does count as activity.
    pub async fn snapshot(&self, viewer: ViewerId) -> ViewState {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.accesses += 1;
        let access = entries.accesses;
        match entries.by_viewer.get_mut(&viewer) {
            Some(entry) if now.duration_since(entry.last_seen) <= self.limits.idle_timeout => {
                entry.last_seen = now;
                entry.last_access = access;
                entry.state.clone()
            }
            _ => ViewState::with_limits(self.limits.per_viewer),
        }
    }

    /// Runs `f` against the viewer's state under the lock.
    pub async fn update<R>(&self, viewer: ViewerId, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if !entries.by_viewer.contains_key(&viewer) {
            entries.drop_idle(now, self.limits.idle_timeout);
            while !entries.by_viewer.is_empty()
                && entries.by_viewer.len() >= self.limits.max_viewers
            {
                entries.drop_least_recent();
            }
        }
        entries.accesses += 1;
        let access = entries.accesses;
        let per_viewer = self.limits.per_viewer;
        let idle_timeout = self.limits.idle_timeout;
        let entry = entries.by_viewer.entry(viewer).or_insert_with(|| Entry {
            state: ViewState::with_limits(per_viewer),
            last_seen: now,
            last_access: access,
        });
        if now.duration_since(entry.last_seen) > idle_timeout {
            entry.state = ViewState::with_limits(per_viewer);
        }
        entry.last_seen = now;
        entry.last_access = access;
        f(&mut entry.state)
    }

    /// Number of viewers currently held.
    pub async fn viewer_count(&self) -> usize {
        self.entries.lock().await.by_viewer.len()
    }
}
