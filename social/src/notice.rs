//! Transient user-facing notices.
//!
//! Reducers never talk to the presentation layer directly. A failure that
//! deserves a toast returns a [`notify`] effect, which hands a [`Notice`] to
//! the environment's [`Notifier`] and feeds nothing back.

use roost_core::async_effect;
use roost_core::effect::Effect;
use std::sync::Arc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// Neutral information.
    Info,
    /// A completed action.
    Success,
    /// Something failed.
    Error,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text to show.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Shows notices to the user.
pub trait Notifier: Send + Sync {
    /// Show `notice`. Must not block.
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "Notice"),
            NoticeLevel::Info | NoticeLevel::Success => {
                tracing::info!(message = %notice.message, "Notice");
            },
        }
    }
}

/// Effect that shows `notice` and produces no action.
#[must_use]
pub fn notify<A: Send + 'static>(notifier: &Arc<dyn Notifier>, notice: Notice) -> Effect<A> {
    let notifier = Arc::clone(notifier);
    async_effect! {
        notifier.notify(notice);
        None
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingNotifier;

#[cfg(any(test, feature = "test-utils"))]
mod recording {
    use super::{Notice, NoticeLevel, Notifier};
    use std::sync::{Mutex, PoisonError};

    /// Notifier that keeps every notice for later inspection.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        /// Notifier with an empty log.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// All notices, oldest first.
        #[must_use]
        pub fn notices(&self) -> Vec<Notice> {
            self.notices
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Messages of the error notices, oldest first.
        #[must_use]
        pub fn errors(&self) -> Vec<String> {
            self.notices()
                .into_iter()
                .filter(|n| n.level == NoticeLevel::Error)
                .map(|n| n.message)
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(notice);
        }
    }
}
