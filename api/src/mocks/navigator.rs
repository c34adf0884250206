//! Mock navigator for testing.

use crate::navigator::Navigator;
use std::sync::{Mutex, PoisonError};

/// Navigator that records every requested path.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Navigator with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths navigated to, oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
