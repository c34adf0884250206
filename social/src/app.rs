//! The whole client: one slice per feature, composed into a single reducer.

use crate::auth::{AuthAction, AuthReducer, AuthState};
use crate::comment::{CommentAction, CommentReducer, CommentState};
use crate::environment::SocialEnvironment;
use crate::follow::{FollowAction, FollowReducer, FollowState};
use crate::like::{LikeAction, LikeReducer, LikeState};
use crate::post::{PostAction, PostReducer, PostState};
use crate::retweet::{RetweetAction, RetweetReducer, RetweetState};
use roost_api::HttpTransport;
use roost_core::composition::{CombinedReducer, combine_reducers, scope_reducer};
use roost_core::SmallVec;
use roost_core::effect::Effect;
use roost_core::reducer::Reducer;

/// Root state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Signed-in user and account flows.
    pub auth: AuthState,
    /// Feed and post editing.
    pub post: PostState,
    /// Likes.
    pub like: LikeState,
    /// Retweets.
    pub retweet: RetweetState,
    /// Comment threads.
    pub comment: CommentState,
    /// Follow graph and toggles.
    pub follow: FollowState,
}

/// Root action: one variant per feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Account flows.
    Auth(AuthAction),
    /// Posts.
    Post(PostAction),
    /// Likes.
    Like(LikeAction),
    /// Retweets.
    Retweet(RetweetAction),
    /// Comments.
    Comment(CommentAction),
    /// Follows and blocks.
    Follow(FollowAction),
}

impl From<AuthAction> for AppAction {
    fn from(action: AuthAction) -> Self {
        Self::Auth(action)
    }
}

impl From<PostAction> for AppAction {
    fn from(action: PostAction) -> Self {
        Self::Post(action)
    }
}

impl From<LikeAction> for AppAction {
    fn from(action: LikeAction) -> Self {
        Self::Like(action)
    }
}

impl From<RetweetAction> for AppAction {
    fn from(action: RetweetAction) -> Self {
        Self::Retweet(action)
    }
}

impl From<CommentAction> for AppAction {
    fn from(action: CommentAction) -> Self {
        Self::Comment(action)
    }
}

impl From<FollowAction> for AppAction {
    fn from(action: FollowAction) -> Self {
        Self::Follow(action)
    }
}

// Slices

fn auth_slice(state: &mut AppState) -> &mut AuthState {
    &mut state.auth
}

fn post_slice(state: &mut AppState) -> &mut PostState {
    &mut state.post
}

fn like_slice(state: &mut AppState) -> &mut LikeState {
    &mut state.like
}

fn retweet_slice(state: &mut AppState) -> &mut RetweetState {
    &mut state.retweet
}

fn comment_slice(state: &mut AppState) -> &mut CommentState {
    &mut state.comment
}

fn follow_slice(state: &mut AppState) -> &mut FollowState {
    &mut state.follow
}

// Extractors

fn auth_action(action: AppAction) -> Option<AuthAction> {
    match action {
        AppAction::Auth(inner) => Some(inner),
        _ => None,
    }
}

fn post_action(action: AppAction) -> Option<PostAction> {
    match action {
        AppAction::Post(inner) => Some(inner),
        _ => None,
    }
}

fn like_action(action: AppAction) -> Option<LikeAction> {
    match action {
        AppAction::Like(inner) => Some(inner),
        _ => None,
    }
}

fn retweet_action(action: AppAction) -> Option<RetweetAction> {
    match action {
        AppAction::Retweet(inner) => Some(inner),
        _ => None,
    }
}

fn comment_action(action: AppAction) -> Option<CommentAction> {
    match action {
        AppAction::Comment(inner) => Some(inner),
        _ => None,
    }
}

fn follow_action(action: AppAction) -> Option<FollowAction> {
    match action {
        AppAction::Follow(inner) => Some(inner),
        _ => None,
    }
}

type FeatureReducer<T> = Box<
    dyn Reducer<State = AppState, Action = AppAction, Environment = SocialEnvironment<T>>
        + Send
        + Sync,
>;

/// Root reducer: routes each [`AppAction`] to its feature reducer and slice.
pub struct AppReducer<T> {
    inner: CombinedReducer<AppState, AppAction, SocialEnvironment<T>>,
}

impl<T: HttpTransport> AppReducer<T> {
    /// Compose every feature reducer.
    #[must_use]
    pub fn new() -> Self {
        let features: Vec<FeatureReducer<T>> = vec![
            Box::new(scope_reducer(
                AuthReducer::<T>::new(),
                auth_slice,
                auth_action,
                AppAction::Auth,
            )),
            Box::new(scope_reducer(
                PostReducer::<T>::new(),
                post_slice,
                post_action,
                AppAction::Post,
            )),
            Box::new(scope_reducer(
                LikeReducer::<T>::new(),
                like_slice,
                like_action,
                AppAction::Like,
            )),
            Box::new(scope_reducer(
                RetweetReducer::<T>::new(),
                retweet_slice,
                retweet_action,
                AppAction::Retweet,
            )),
            Box::new(scope_reducer(
                CommentReducer::<T>::new(),
                comment_slice,
                comment_action,
                AppAction::Comment,
            )),
            Box::new(scope_reducer(
                FollowReducer::<T>::new(),
                follow_slice,
                follow_action,
                AppAction::Follow,
            )),
        ];
        Self {
            inner: combine_reducers(features),
        }
    }
}

impl<T: HttpTransport> Default for AppReducer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for AppReducer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppReducer").finish_non_exhaustive()
    }
}

impl<T: HttpTransport> Reducer for AppReducer<T> {
    type State = AppState;
    type Action = AppAction;
    type Environment = SocialEnvironment<T>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(?action, "Reducing app action");
        self.inner.reduce(state, action, env)
    }
}
