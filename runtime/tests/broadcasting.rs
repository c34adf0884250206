//! Integration tests for Store action broadcasting
//!
//! Observers (the demo's log printer, request-response helpers) see each
//! action an effect feeds back, after the reducer has applied it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use roost_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use roost_runtime::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum SyncAction {
    /// Start a multi-page sync for a correlation id
    Start { id: u64 },
    /// One page arrived
    PageLoaded { id: u64, page: u32 },
    /// All pages arrived (terminal)
    Finished { id: u64 },
    /// Never produced
    Failed { id: u64 },
    /// Local action with an immediate echo
    Ping,
    Pong { count: u32 },
}

#[derive(Debug, Clone, Default)]
struct SyncState {
    pings: u32,
    pages: Vec<u32>,
}

struct SyncReducer;

impl Reducer for SyncReducer {
    type State = SyncState;
    type Action = SyncAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut SyncState,
        action: SyncAction,
        _env: &(),
    ) -> SmallVec<[Effect<SyncAction>; 4]> {
        match action {
            SyncAction::Start { id } => {
                state.pages.clear();
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Some(SyncAction::PageLoaded { id, page: 1 })
                }))]
            },
            SyncAction::PageLoaded { id, page } => {
                state.pages.push(page);
                if page < 3 {
                    smallvec![Effect::Future(Box::pin(async move {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Some(SyncAction::PageLoaded { id, page: page + 1 })
                    }))]
                } else {
                    smallvec![Effect::send(SyncAction::Finished { id })]
                }
            },
            SyncAction::Ping => {
                state.pings += 1;
                let count = state.pings;
                smallvec![Effect::send(SyncAction::Pong { count })]
            },
            SyncAction::Finished { .. } | SyncAction::Failed { .. } | SyncAction::Pong { .. } => {
                SmallVec::new()
            },
        }
    }
}

fn store() -> Store<SyncState, SyncAction, (), SyncReducer> {
    Store::new(SyncState::default(), SyncReducer, ())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn send_and_wait_for_immediate_echo() {
    let store = store();

    let result = store
        .send_and_wait_for(
            SyncAction::Ping,
            |action| matches!(action, SyncAction::Pong { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(result, SyncAction::Pong { count: 1 });
}

#[tokio::test]
async fn send_and_wait_for_multi_step_flow() {
    let store = store();

    let result = store
        .send_and_wait_for(
            SyncAction::Start { id: 42 },
            |action| matches!(action, SyncAction::Finished { id: 42 }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(result, SyncAction::Finished { id: 42 });
    // Broadcast happens after reduction, so state already reflects every page.
    assert_eq!(store.state(|s| s.pages.clone()).await, vec![1, 2, 3]);
}

#[tokio::test]
async fn send_and_wait_for_times_out() {
    let store = store();

    let result = store
        .send_and_wait_for(
            SyncAction::Start { id: 99 },
            |action| matches!(action, SyncAction::Failed { id: 99 }),
            Duration::from_millis(50),
        )
        .await;

    assert_eq!(result, Err(StoreError::Timeout));
}

#[tokio::test]
async fn handle_waits_for_whole_cascade() {
    let store = store();

    let mut handle = assert_ok!(store.send(SyncAction::Start { id: 1 }).await);
    handle
        .wait_with_timeout(Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(store.state(|s| s.pages.clone()).await, vec![1, 2, 3]);
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test]
async fn subscribers_see_fed_back_actions_only() {
    let store = store();
    let mut rx = store.subscribe_actions();

    let mut handle = assert_ok!(store.send(SyncAction::Ping).await);
    handle.wait().await;

    assert_eq!(rx.recv().await.unwrap(), SyncAction::Pong { count: 1 });
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn concurrent_flows_do_not_interfere() {
    let store = Arc::new(store());

    let mut tasks = vec![];
    for _ in 0..5 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            store
                .send_and_wait_for(
                    SyncAction::Ping,
                    |action| matches!(action, SyncAction::Pong { .. }),
                    Duration::from_secs(1),
                )
                .await
        }));
    }

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(store.state(|s| s.pings).await, 5);
}
