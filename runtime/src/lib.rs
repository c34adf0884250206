//! # Roost Runtime
//!
//! The `Store` that drives the Roost client.
//!
//! A store owns one state value, one reducer and one environment. Every action
//! goes through the reducer under a write lock; the effects it returns run as
//! tokio tasks, and any action an effect produces is fed back into the same
//! store. That feedback loop is how a request action turns into a success or
//! failure action without the reducer ever touching the network.
//!
//! ## Core Components
//!
//! - **Store**: state + reducer + environment + effect executor
//! - **`EffectHandle`**: resolves when an action's effects, and every action
//!   those effects feed back, have settled
//! - **Action broadcast**: observers receive each fed-back action after the
//!   reducer has applied it
//!
//! ## Example
//!
//! ```ignore
//! use roost_runtime::Store;
//!
//! let store = Store::new(AppState::default(), AppReducer::new(), environment);
//!
//! let mut handle = store.send(AppAction::Follow(FollowAction::Toggle { target })).await?;
//! handle.wait().await;
//!
//! let following = store.state(|s| s.follow.is_following(target)).await;
//! ```

use roost_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timed out waiting for effects or for a matching action
        #[error("Timeout waiting for effects to settle")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }

    /// Result alias for store operations
    pub type Result<T> = std::result::Result<T, StoreError>;
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`]. Tracking is cascading: an effect that feeds
/// an action back keeps the handle open until that action's own effects have
/// settled too, so awaiting the handle awaits the whole flow.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(PostAction::FetchPaged { page: PageRequest::default() }).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // FetchPagedSucceeded (or Failed) has been reduced
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    pending: watch::Receiver<usize>,
}

impl EffectHandle {
    /// Create a handle plus the tracking context the executor counts against
    fn new() -> (Self, EffectTracking) {
        let (tx, rx) = watch::channel(0);
        (Self { pending: rx }, EffectTracking { pending: Arc::new(tx) })
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (_, rx) = watch::channel(0);
        Self { pending: rx }
    }

    /// Number of effects still running for this handle
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Wait for all effects to settle
    pub async fn wait(&mut self) {
        // A closed channel means every tracking clone is gone, which only
        // happens after the last decrement.
        let _ = self.pending.wait_for(|count| *count == 0).await;
    }

    /// Wait for all effects to settle with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> error::Result<()> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish()
    }
}

/// Internal: counter shared by an [`EffectHandle`] and the tasks it tracks
#[derive(Clone)]
struct EffectTracking {
    pending: Arc<watch::Sender<usize>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.pending.send_modify(|count| *count += 1);
    }

    fn decrement(&self) {
        self.pending
            .send_modify(|count| *count = count.saturating_sub(1));
    }

    fn count(&self) -> usize {
        *self.pending.borrow()
    }
}

/// Internal: RAII guard that decrements an effect counter on drop
///
/// Ensures the counter is decremented even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, DecrementGuard, Duration, Effect, EffectHandle, EffectTracking, Ordering,
        Reducer, RwLock, StoreError, error,
    };
    use tokio::sync::broadcast;

    /// Default number of fed-back actions buffered for slow observers
    pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the reducer runs under the write lock)
    /// 2. Reducer (client logic)
    /// 3. Environment (API client, notifier)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a store is cheap and every clone drives the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        shutdown: Arc<AtomicBool>,
        /// Every effect spawned by this store, whatever handle it belongs to
        in_flight: EffectTracking,
        /// Fed-back actions, published after the reducer has applied them
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(
                initial_state,
                reducer,
                environment,
                DEFAULT_BROADCAST_CAPACITY,
            )
        }

        /// Create a new Store with custom action broadcast capacity
        ///
        /// Increase the capacity if observers frequently lag.
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));
            let (_, in_flight) = EffectHandle::new();

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                shutdown: Arc::new(AtomicBool::new(false)),
                in_flight,
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Releases the lock and spawns the returned effects
        ///
        /// `send()` returns once the effects are started. Await the returned
        /// [`EffectHandle`] to wait for the whole cascade.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> error::Result<EffectHandle> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!(?action, "Rejecting action, store is shutting down");
                metrics::counter!("store.actions.rejected").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            let (handle, tracking) = EffectHandle::new();
            self.dispatch(action, &tracking).await;
            Ok(handle)
        }

        /// Send an action and wait for a matching fed-back action
        ///
        /// Subscribes before sending, so a fast effect cannot slip past.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action within `timeout`
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> error::Result<A>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();
            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to actions produced by effects
        ///
        /// Actions passed to [`send`](Self::send) directly are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let liked = store.state(|s| s.like.is_liked(post_id)).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Number of effects currently running across every handle
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.in_flight.count()
        }

        /// Stop accepting actions and wait for running effects to drain
        ///
        /// Running requests are never cancelled; fed-back actions are still
        /// reduced while draining.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
        /// when `timeout` expires.
        pub async fn shutdown(&self, timeout: Duration) -> error::Result<()> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);
            self.shutdown.store(true, Ordering::Release);

            let mut pending = self.in_flight.pending.subscribe();
            let drained = tokio::time::timeout(timeout, async move {
                let _ = pending.wait_for(|count| *count == 0).await;
            })
            .await;

            match drained {
                Ok(_) => {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    Ok(())
                },
                Err(_) => {
                    let still_running = self.in_flight.count();
                    tracing::error!(pending_effects = still_running, "Shutdown timed out");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    Err(StoreError::ShutdownTimeout(still_running))
                },
            }
        }

        /// Reduce one action and start its effects against `tracking`
        async fn dispatch(&self, action: A, tracking: &EffectTracking) {
            let started = std::time::Instant::now();
            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut state, action, &self.environment)
            };
            metrics::histogram!("store.reducer.duration_seconds")
                .record(started.elapsed().as_secs_f64());
            metrics::counter!("store.actions.processed").increment(1);

            for effect in effects {
                self.execute_effect(effect, tracking);
            }
        }

        /// Feed an action produced by an effect back into the store
        async fn feed_back(&self, action: A, tracking: &EffectTracking) {
            tracing::trace!(?action, "Effect produced an action");
            self.dispatch(action.clone(), tracking).await;
            // No receivers is the common case.
            let _ = self.action_broadcast.send(action);
        }

        /// Execute one effect, counting it against `tracking` and the store
        ///
        /// - `None`: no-op
        /// - `Future`: spawned; a `Some` result is fed back
        /// - `Parallel`: every child started against the same tracking
        /// - `Sequential`: spawned; each child (and its cascade) settles
        ///   before the next one starts
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    let guards = self.track(tracking);
                    let store = self.clone();
                    let tracking = tracking.clone();

                    tokio::spawn(async move {
                        let _guards = guards;
                        if let Some(action) = fut.await {
                            store.feed_back(action, &tracking).await;
                        }
                    });
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Sequential(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);
                    let guards = self.track(tracking);
                    let store = self.clone();
                    let count = effects.len();

                    tokio::spawn(async move {
                        let _guards = guards;
                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!("Executing sequential effect {} of {}", idx + 1, count);
                            let (mut step, step_tracking) = EffectHandle::new();
                            store.execute_effect(effect, &step_tracking);
                            drop(step_tracking);
                            step.wait().await;
                        }
                    });
                },
            }
        }

        /// Count a new task against `tracking` and the store-wide counter.
        /// The store-wide guard drops first, so a settled handle never
        /// observes a stale `pending_effects`.
        fn track(&self, tracking: &EffectTracking) -> (DecrementGuard, DecrementGuard) {
            tracking.increment();
            self.in_flight.increment();
            (
                DecrementGuard(self.in_flight.clone()),
                DecrementGuard(tracking.clone()),
            )
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                shutdown: Arc::clone(&self.shutdown),
                in_flight: self.in_flight.clone(),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use roost_core::{smallvec, SmallVec};

    #[derive(Debug, Default)]
    struct FeedState {
        loaded: Vec<u32>,
        loading: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum FeedAction {
        Load,
        Loaded(u32),
        LoadBoth,
        Noop,
    }

    struct FeedReducer;

    impl Reducer for FeedReducer {
        type State = FeedState;
        type Action = FeedAction;
        type Environment = Duration;

        fn reduce(
            &self,
            state: &mut FeedState,
            action: FeedAction,
            latency: &Duration,
        ) -> SmallVec<[Effect<FeedAction>; 4]> {
            match action {
                FeedAction::Load => {
                    state.loading = true;
                    let latency = *latency;
                    smallvec![Effect::Future(Box::pin(async move {
                        tokio::time::sleep(latency).await;
                        Some(FeedAction::Loaded(1))
                    }))]
                },
                FeedAction::Loaded(n) => {
                    state.loading = false;
                    state.loaded.push(n);
                    smallvec![Effect::None]
                },
                FeedAction::LoadBoth => {
                    let slow = *latency;
                    smallvec![Effect::chain(vec![
                        Effect::Future(Box::pin(async move {
                            tokio::time::sleep(slow).await;
                            Some(FeedAction::Loaded(10))
                        })),
                        Effect::send(FeedAction::Loaded(20)),
                    ])]
                },
                FeedAction::Noop => SmallVec::new(),
            }
        }
    }

    fn store(latency_ms: u64) -> Store<FeedState, FeedAction, Duration, FeedReducer> {
        Store::new(
            FeedState::default(),
            FeedReducer,
            Duration::from_millis(latency_ms),
        )
    }

    #[tokio::test]
    async fn reducer_state_is_visible_before_effects_settle() {
        let store = store(50);

        let mut handle = store.send(FeedAction::Load).await.unwrap();
        assert!(store.state(|s| s.loading).await);
        assert_eq!(handle.pending(), 1);

        handle.wait().await;
        assert!(!store.state(|s| s.loading).await);
        assert_eq!(store.state(|s| s.loaded.clone()).await, vec![1]);
    }

    #[tokio::test]
    async fn action_without_effects_completes_immediately() {
        let store = store(0);
        let mut handle = store.send(FeedAction::Noop).await.unwrap();
        assert_eq!(handle.pending(), 0);
        handle
            .wait_with_timeout(Duration::from_millis(10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sequential_effects_run_in_order() {
        let store = store(30);

        let mut handle = store.send(FeedAction::LoadBoth).await.unwrap();
        handle
            .wait_with_timeout(Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(store.state(|s| s.loaded.clone()).await, vec![10, 20]);
    }

    #[tokio::test]
    async fn wait_with_timeout_reports_timeout() {
        let store = store(500);
        let mut handle = store.send(FeedAction::Load).await.unwrap();

        let result = handle.wait_with_timeout(Duration::from_millis(10)).await;
        assert_eq!(result, Err(StoreError::Timeout));
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions_after_draining() {
        let store = store(20);
        store.send(FeedAction::Load).await.unwrap();

        store.shutdown(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.pending_effects(), 0);
        assert_eq!(store.state(|s| s.loaded.clone()).await, vec![1]);

        let rejected = store.send(FeedAction::Noop).await;
        assert!(matches!(rejected, Err(StoreError::ShutdownInProgress)));
    }

    #[tokio::test]
    async fn shutdown_times_out_with_running_effects() {
        let store = store(500);
        store.send(FeedAction::Load).await.unwrap();

        let result = store.shutdown(Duration::from_millis(10)).await;
        assert_eq!(result, Err(StoreError::ShutdownTimeout(1)));
    }

    #[tokio::test]
    async fn store_counts_running_effects_across_sends() {
        let store = Store::with_broadcast_capacity(
            FeedState::default(),
            FeedReducer,
            Duration::from_millis(40),
            4,
        );
        assert_eq!(store.pending_effects(), 0);

        let mut first = store.send(FeedAction::Load).await.unwrap();
        let mut second = store.send(FeedAction::Load).await.unwrap();
        assert_eq!(store.pending_effects(), 2);

        first.wait().await;
        second.wait().await;
        assert_eq!(store.pending_effects(), 0);
        assert_eq!(store.state(|s| s.loaded.len()).await, 2);
    }

    #[test]
    fn completed_handle_has_nothing_pending() {
        assert_eq!(EffectHandle::completed().pending(), 0);
    }
}
