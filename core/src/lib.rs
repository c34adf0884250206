//! # Roost Core
//!
//! Core traits and types for the Roost social client.
//!
//! Every feature of the client (auth, posts, likes, retweets, comments,
//! follows) is written as a reducer: a pure function that folds an action into
//! feature state and returns descriptions of the side effects to run next.
//!
//! ## Core Concepts
//!
//! - **State**: Client-side state for a feature (e.g. the follow presence map)
//! - **Action**: All inputs to a reducer (user intents and API results)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions, executed by the runtime `Store`
//! - **Environment**: Injected dependencies (API client, notifier)
//!
//! ## Example
//!
//! ```
//! use roost_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct LikeState {
//!     liked: bool,
//!     count: u64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum LikeAction {
//!     Liked { count: u64 },
//!     Unliked { count: u64 },
//! }
//!
//! struct LikeReducer;
//!
//! impl Reducer for LikeReducer {
//!     type State = LikeState;
//!     type Action = LikeAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut LikeState,
//!         action: LikeAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<LikeAction>; 4]> {
//!         match action {
//!             LikeAction::Liked { count } => {
//!                 state.liked = true;
//!                 state.count = count;
//!             }
//!             LikeAction::Unliked { count } => {
//!                 state.liked = false;
//!                 state.count = count;
//!             }
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = LikeState::default();
//! LikeReducer.reduce(&mut state, LikeAction::Liked { count: 5 }, &());
//! assert!(state.liked);
//! assert_eq!(state.count, 5);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer composition (`combine_reducers`, `scope_reducer`)
pub mod composition;

/// Declarative macros for building effects
mod effect_macros;

/// Reducer module - The core trait for client logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They never perform I/O themselves; network calls are returned as
/// [`Effect::Future`](crate::effect::Effect::Future) values.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for client logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The feature state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed
        ///
        /// Optimistic updates belong here: anything applied to `state` is
        /// visible before any returned effect starts running.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. They are not executed until the
/// runtime `Store` picks them up.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Boxed future produced by [`Effect::Future`].
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another, each one settling before the next
        /// starts
        Sequential(Vec<Effect<Action>>),

        /// Arbitrary async computation (typically an API call)
        ///
        /// Returns `Option<Action>` - if `Some`, the action is fed back into the reducer
        Future(EffectFuture<Action>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Effect that immediately feeds `action` back into the store
        #[must_use]
        pub fn send(action: Action) -> Effect<Action>
        where
            Action: Send + 'static,
        {
            Effect::Future(Box::pin(async move { Some(action) }))
        }

        /// Returns `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Transform the actions this effect produces
        ///
        /// Used to lift a feature reducer's effects into the application
        /// action type (see [`crate::composition::scope_reducer`]).
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            Action: Send + 'static,
            B: Send + 'static,
            F: Fn(Action) -> B + Clone + Send + Sync + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => {
                    Effect::Parallel(effects.into_iter().map(|e| e.map(f.clone())).collect())
                },
                Effect::Sequential(effects) => {
                    Effect::Sequential(effects.into_iter().map(|e| e.map(f.clone())).collect())
                },
                Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(f) })),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::effect::Effect;

    #[derive(Debug, PartialEq)]
    enum Child {
        Loaded(u32),
    }

    #[derive(Debug, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[tokio::test]
    async fn map_lifts_future_output() {
        let effect = Effect::send(Child::Loaded(7)).map(Parent::Child);

        let Effect::Future(fut) = effect else {
            panic!("expected a future effect");
        };
        assert_eq!(fut.await, Some(Parent::Child(Child::Loaded(7))));
    }

    #[test]
    fn map_preserves_shape() {
        let effect: Effect<Child> = Effect::chain(vec![Effect::None, Effect::merge(vec![])]);

        match effect.map(Parent::Child) {
            Effect::Sequential(inner) => {
                assert_eq!(inner.len(), 2);
                assert!(inner[0].is_none());
                assert!(matches!(inner[1], Effect::Parallel(ref v) if v.is_empty()));
            },
            other => panic!("unexpected effect: {other:?}"),
        }
    }

    #[test]
    fn debug_hides_future_body() {
        let effect = Effect::send(Child::Loaded(1));
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }
}
