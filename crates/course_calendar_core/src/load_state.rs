//! crates/course_calendar_core/src/load_state.rs
//!
//! Tri-state result of fetching remote data, so an empty dataset and a failed
//! fetch never look alike.

use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadState<T> {
    Loading,
    Loaded { data: T },
    Failed { message: String },
}

impl<T> LoadState<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => LoadState::Loaded { data },
            Err(e) => LoadState::Failed {
                message: e.to_string(),
            },
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Loaded { data } => LoadState::Loaded { data: f(data) },
            LoadState::Failed { message } => LoadState::Failed { message },
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Loaded { data } => Some(data),
            _ => None,
        }
    }
}
