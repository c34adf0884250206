//! Likes per post.

use crate::environment::SocialEnvironment;
use roost_api::{HttpTransport, PostId, UserId, error_message};
use roost_core::effect::Effect;
use roost_core::reducer::Reducer;
use roost_core::{SmallVec, request_effect, smallvec};
use std::collections::HashMap;

/// Like slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeState {
    /// Whether the user likes each post.
    pub likes: HashMap<PostId, bool>,
    /// Like count per post, as last reported by the server.
    pub likes_count: HashMap<PostId, u64>,
    /// A request is in flight.
    pub loading: bool,
    /// Message of the last failure.
    pub error: Option<String>,
}

impl LikeState {
    /// Whether the user likes `post_id`.
    #[must_use]
    pub fn is_liked(&self, post_id: PostId) -> bool {
        self.likes.get(&post_id).copied().unwrap_or(false)
    }

    /// Last known like count of `post_id`.
    #[must_use]
    pub fn count(&self, post_id: PostId) -> u64 {
        self.likes_count.get(&post_id).copied().unwrap_or(0)
    }
}

/// Inputs to [`LikeReducer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeAction {
    /// Like a post.
    Add {
        /// Post to like.
        post_id: PostId,
    },
    /// Like recorded.
    AddSucceeded {
        /// Liked post.
        post_id: PostId,
        /// Count after the like.
        count: u64,
    },
    /// Remove a like.
    Remove {
        /// Post to unlike.
        post_id: PostId,
    },
    /// Like removed.
    RemoveSucceeded {
        /// Unliked post.
        post_id: PostId,
        /// Count after the removal.
        count: u64,
    },
    /// Fetch the like count of a post.
    FetchCount {
        /// Post to count.
        post_id: PostId,
    },
    /// Like count arrived.
    CountFetched {
        /// Counted post.
        post_id: PostId,
        /// Current count.
        count: u64,
    },
    /// Fetch which posts a user liked.
    FetchMine {
        /// User whose likes to load.
        user_id: UserId,
    },
    /// Liked post ids arrived; each is marked liked.
    MineFetched {
        /// Liked posts.
        post_ids: Vec<PostId>,
    },
    /// A request failed.
    Failed {
        /// Normalized failure message.
        error: String,
    },
}

fn failed(error: &roost_api::ApiError) -> LikeAction {
    LikeAction::Failed {
        error: error_message(error),
    }
}

transport_reducer!(
    /// Reducer for the like slice.
    LikeReducer
);

impl<T: HttpTransport> Reducer for LikeReducer<T> {
    type State = LikeState;
    type Action = LikeAction;
    type Environment = SocialEnvironment<T>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let api = env.api.clone();

        let effect = match action {
            LikeAction::Add { post_id } => {
                state.loading = true;
                state.error = None;
                request_effect! {
                    call: api.add_like(post_id),
                    on_success: |c| LikeAction::AddSucceeded { post_id: c.post_id, count: c.count },
                    on_error: |e| failed(&e)
                }
            },
            LikeAction::AddSucceeded { post_id, count } => {
                state.loading = false;
                state.likes.insert(post_id, true);
                state.likes_count.insert(post_id, count);
                Effect::None
            },
            LikeAction::Remove { post_id } => {
                state.loading = true;
                state.error = None;
                request_effect! {
                    call: api.remove_like(post_id),
                    on_success: |c| LikeAction::RemoveSucceeded { post_id: c.post_id, count: c.count },
                    on_error: |e| failed(&e)
                }
            },
            LikeAction::RemoveSucceeded { post_id, count } => {
                state.loading = false;
                state.likes.insert(post_id, false);
                state.likes_count.insert(post_id, count);
                Effect::None
            },
            LikeAction::FetchCount { post_id } => request_effect! {
                call: api.like_count(post_id),
                on_success: |count| LikeAction::CountFetched { post_id, count },
                on_error: |e| failed(&e)
            },
            LikeAction::CountFetched { post_id, count } => {
                state.likes_count.insert(post_id, count);
                Effect::None
            },
            LikeAction::FetchMine { user_id } => {
                state.loading = true;
                state.error = None;
                request_effect! {
                    call: api.liked_post_ids(user_id),
                    on_success: |post_ids| LikeAction::MineFetched { post_ids },
                    on_error: |e| failed(&e)
                }
            },
            LikeAction::MineFetched { post_ids } => {
                state.loading = false;
                state.likes.extend(post_ids.into_iter().map(|id| (id, true)));
                Effect::None
            },
            LikeAction::Failed { error } => {
                state.loading = false;
                state.error = Some(error);
                Effect::None
            },
        };

        smallvec![effect]
    }
}
