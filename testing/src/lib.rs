//! # Roost Testing
//!
//! Testing utilities for Roost reducers and stores.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for a single reducer step
//! - [`assertions`]: helpers for inspecting returned effects
//! - [`effects`]: runs effect futures inline so a test can see which action
//!   an API call resolves to, without a store
//! - Fixed timestamps and tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use roost_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(LikeReducer)
//!     .with_env(test_environment())
//!     .given_state(LikeState::default())
//!     .when_action(LikeAction::AddSucceeded { post_id, count: 5 })
//!     .then_state(move |s| assert!(s.is_liked(post_id)))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime};

pub mod effects;

pub use reducer_test::{ReducerTest, assertions};

/// Fixed instant used as "now" in fixtures (2025-01-01 00:00:00, server
/// local time)
#[must_use]
pub fn test_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// [`test_time`] shifted by `minutes` (negative values go back in time)
#[must_use]
pub fn minutes_after(minutes: i64) -> NaiveDateTime {
    test_time() + Duration::minutes(minutes)
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
