//! Follow graph: followers, followings, blocks and the optimistic toggle.
//!
//! # Toggle lifecycle
//!
//! ```text
//! Toggle ──► Optimistic ──► AwaitingServer ──┬─► Reconciled (one followings resync)
//!            (local flip)    (API call)      └─► RolledBack (local undo + notice)
//! ```
//!
//! The local flip happens inside the reducer, so it is visible before the
//! network call starts. A toggle for a target that is still `Optimistic` or
//! `AwaitingServer` is dropped.

mod action;
mod reducer;
mod state;

pub use action::FollowAction;
pub use reducer::FollowReducer;
pub use state::{FollowState, ToggleDirection, TogglePhase, ToggleRecord};
