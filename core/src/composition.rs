//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Run a feature reducer on one slice of a larger state,
//!   translating actions in and effects out
//!
//! The client's `AppReducer` is built from one scoped reducer per feature
//! (auth, post, like, retweet, comment, follow).

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in order, and all effects are collected and concatenated.
///
/// # Examples
///
/// ```
/// use roost_core::composition::combine_reducers;
/// use roost_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
///
/// #[derive(Default)]
/// struct Counters {
///     seen: u32,
///     posts: u32,
/// }
///
/// #[derive(Clone)]
/// enum Action {
///     PostCreated,
///     Other,
/// }
///
/// struct SeenReducer;
/// struct PostCounter;
///
/// impl Reducer for SeenReducer {
///     type State = Counters;
///     type Action = Action;
///     type Environment = ();
///
///     fn reduce(&self, state: &mut Counters, _action: Action, _env: &()) -> SmallVec<[Effect<Action>; 4]> {
///         state.seen += 1;
///         smallvec![Effect::None]
///     }
/// }
///
/// impl Reducer for PostCounter {
///     type State = Counters;
///     type Action = Action;
///     type Environment = ();
///
///     fn reduce(&self, state: &mut Counters, action: Action, _env: &()) -> SmallVec<[Effect<Action>; 4]> {
///         if matches!(action, Action::PostCreated) {
///             state.posts += 1;
///         }
///         smallvec![Effect::None]
///     }
/// }
///
/// let combined = combine_reducers(vec![Box::new(SeenReducer), Box::new(PostCounter)]);
/// let mut state = Counters::default();
/// combined.reduce(&mut state, Action::PostCreated, &());
/// combined.reduce(&mut state, Action::Other, &());
/// assert_eq!(state.seen, 2);
/// assert_eq!(state.posts, 1);
/// ```
#[must_use]
pub fn combine_reducers<S, A, E>(
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
) -> CombinedReducer<S, A, E>
where
    A: Clone,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E> {
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    A: Clone,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            all_effects.extend(reducer.reduce(state, action.clone(), env));
        }

        all_effects
    }
}

/// Scopes a feature reducer onto a slice of a larger state.
///
/// - `slice` borrows the feature state out of the parent state
/// - `extract` picks the feature action out of a parent action (`None` means
///   the action belongs to another feature and is ignored)
/// - `embed` wraps feature actions produced by effects back into parent actions
///
/// # Examples
///
/// ```
/// use roost_core::composition::scope_reducer;
/// use roost_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
///
/// #[derive(Default)]
/// struct LikeState {
///     total: u64,
/// }
///
/// #[derive(Clone, Debug)]
/// enum LikeAction {
///     Counted(u64),
/// }
///
/// struct LikeReducer;
///
/// impl Reducer for LikeReducer {
///     type State = LikeState;
///     type Action = LikeAction;
///     type Environment = ();
///
///     fn reduce(&self, state: &mut LikeState, action: LikeAction, _env: &()) -> SmallVec<[Effect<LikeAction>; 4]> {
///         let LikeAction::Counted(n) = action;
///         state.total = n;
///         smallvec![Effect::None]
///     }
/// }
///
/// #[derive(Default)]
/// struct AppState {
///     like: LikeState,
/// }
///
/// #[derive(Clone, Debug)]
/// enum AppAction {
///     Like(LikeAction),
///     Ignored,
/// }
///
/// fn like_action(action: AppAction) -> Option<LikeAction> {
///     match action {
///         AppAction::Like(inner) => Some(inner),
///         AppAction::Ignored => None,
///     }
/// }
///
/// fn like_slice(state: &mut AppState) -> &mut LikeState {
///     &mut state.like
/// }
///
/// let scoped = scope_reducer(LikeReducer, like_slice, like_action, AppAction::Like);
///
/// let mut state = AppState::default();
/// scoped.reduce(&mut state, AppAction::Like(LikeAction::Counted(4)), &());
/// scoped.reduce(&mut state, AppAction::Ignored, &());
/// assert_eq!(state.like.total, 4);
/// ```
pub const fn scope_reducer<S, SubS, A, SubA, E, R>(
    reducer: R,
    slice: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
) -> ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    ScopedReducer {
        reducer,
        slice,
        extract,
        embed,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a slice of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, SubA, E, R> {
    reducer: R,
    slice: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
    _phantom: std::marker::PhantomData<fn() -> E>,
}

impl<S, SubS, A, SubA, E, R> Reducer for ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
    A: Send + 'static,
    SubA: Send + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(sub_action) = (self.extract)(action) else {
            return SmallVec::new();
        };

        let embed = self.embed;
        self.reducer
            .reduce((self.slice)(state), sub_action, env)
            .into_iter()
            .map(|effect| effect.map(embed))
            .collect()
    }
}
