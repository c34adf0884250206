use super::{FollowAction, FollowState, ToggleDirection, TogglePhase};
use crate::environment::SocialEnvironment;
use crate::notice::{Notice, notify};
use roost_api::{BlockRequest, FollowEdge, HttpTransport, UserId, error_message};
use roost_core::effect::Effect;
use roost_core::reducer::Reducer;
use roost_core::{SmallVec, request_effect, smallvec};

const FOLLOW_FAILED: &str = "Follow request failed";
const UNFOLLOW_FAILED: &str = "Unfollow request failed";
const FOLLOW_REVERTED: &str = "Follow request failed, state reverted";
const UNFOLLOW_REVERTED: &str = "Unfollow request failed, state reverted";
const LOAD_FOLLOWERS_FAILED: &str = "Failed to load followers";
const LOAD_FOLLOWINGS_FAILED: &str = "Failed to load followings";
const BLOCK_FAILED: &str = "Block request failed";

transport_reducer!(
    /// Reducer for the follow graph.
    ///
    /// Generic over the API transport so tests can drive it with a scripted
    /// one.
    FollowReducer
);

impl<T: HttpTransport> FollowReducer<T> {
    fn begin_toggle(
        state: &mut FollowState,
        target: UserId,
    ) -> SmallVec<[Effect<FollowAction>; 4]> {
        if state.toggle_phase(target).is_pending() {
            tracing::debug!(%target, "Toggle already in flight, ignoring");
            metrics::counter!("social.follow.toggle", "outcome" => "rejected").increment(1);
            return smallvec![Effect::None];
        }

        let direction = if state.is_following(target) {
            let previous = state.remove_following(target);
            state.start_toggle(target, ToggleDirection::Unfollow, previous);
            ToggleDirection::Unfollow
        } else {
            state.insert_following(FollowEdge::new(target));
            state.start_toggle(target, ToggleDirection::Follow, None);
            ToggleDirection::Follow
        };
        state.error = None;

        tracing::debug!(%target, ?direction, "Applied optimistic toggle");
        smallvec![Effect::send(FollowAction::ToggleSubmit { target })]
    }

    fn submit_toggle(
        state: &mut FollowState,
        target: UserId,
        env: &SocialEnvironment<T>,
    ) -> SmallVec<[Effect<FollowAction>; 4]> {
        let Some(record) = state
            .toggle_mut(target)
            .filter(|record| record.phase == TogglePhase::Optimistic)
        else {
            tracing::warn!(%target, "Submit without an optimistic toggle");
            return smallvec![Effect::None];
        };
        record.phase = TogglePhase::AwaitingServer;

        let api = env.api.clone();
        let effect = match record.direction {
            ToggleDirection::Follow => request_effect! {
                call: api.follow(target),
                on_success: |_edge| FollowAction::ToggleConfirmed { target },
                on_error: |e| FollowAction::ToggleFailed { target, error: error_message(&e) }
            },
            ToggleDirection::Unfollow => request_effect! {
                call: api.unfollow(target),
                on_success: |()| FollowAction::ToggleConfirmed { target },
                on_error: |e| FollowAction::ToggleFailed { target, error: error_message(&e) }
            },
        };
        smallvec![effect]
    }

    fn settle_toggle(
        state: &mut FollowState,
        target: UserId,
        failure: Option<String>,
        env: &SocialEnvironment<T>,
    ) -> SmallVec<[Effect<FollowAction>; 4]> {
        let Some(record) = state
            .toggle_mut(target)
            .filter(|record| record.phase == TogglePhase::AwaitingServer)
        else {
            tracing::warn!(%target, "Settlement without a toggle awaiting the server");
            return smallvec![Effect::None];
        };

        let direction = record.direction;
        let previous = record.previous.take();

        let Some(error) = failure else {
            record.phase = TogglePhase::Reconciled;
            metrics::counter!("social.follow.toggle", "outcome" => "confirmed").increment(1);
            return smallvec![Effect::send(FollowAction::LoadFollowings)];
        };

        record.phase = TogglePhase::RolledBack;
        let notice = match direction {
            ToggleDirection::Follow => {
                state.remove_following(target);
                FOLLOW_REVERTED
            },
            ToggleDirection::Unfollow => {
                state.insert_following(previous.unwrap_or_else(|| FollowEdge::new(target)));
                UNFOLLOW_REVERTED
            },
        };

        tracing::warn!(%target, ?direction, %error, "Toggle refused, rolled back");
        metrics::counter!("social.follow.toggle", "outcome" => "rolled_back").increment(1);
        state.error = Some(error);
        smallvec![notify(&env.notifier, Notice::error(notice))]
    }

    fn fail(
        state: &mut FollowState,
        error: String,
        notice: &str,
        env: &SocialEnvironment<T>,
    ) -> SmallVec<[Effect<FollowAction>; 4]> {
        state.loading = false;
        state.error = Some(error);
        smallvec![notify(&env.notifier, Notice::error(notice))]
    }

    fn begin_request(state: &mut FollowState) {
        state.loading = true;
        state.error = None;
    }
}

impl<T: HttpTransport> Reducer for FollowReducer<T> {
    type State = FollowState;
    type Action = FollowAction;
    type Environment = SocialEnvironment<T>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Optimistic toggle
            // ═══════════════════════════════════════════════════════════════
            FollowAction::Toggle { target } => Self::begin_toggle(state, target),
            FollowAction::ToggleSubmit { target } => Self::submit_toggle(state, target, env),
            FollowAction::ToggleConfirmed { target } => {
                Self::settle_toggle(state, target, None, env)
            },
            FollowAction::ToggleFailed { target, error } => {
                Self::settle_toggle(state, target, Some(error), env)
            },

            // ═══════════════════════════════════════════════════════════════
            // Plain follow / unfollow (resync followings on success)
            // ═══════════════════════════════════════════════════════════════
            FollowAction::Follow { followee_id } => {
                Self::begin_request(state);
                let api = env.api.clone();
                smallvec![request_effect! {
                    call: api.follow(followee_id),
                    on_success: |edge| FollowAction::FollowSucceeded { edge },
                    on_error: |e| FollowAction::FollowFailed { error: error_message(&e) }
                }]
            },
            FollowAction::FollowSucceeded { edge } => {
                state.loading = false;
                state.insert_following(edge);
                smallvec![Effect::send(FollowAction::LoadFollowings)]
            },
            FollowAction::FollowFailed { error } => Self::fail(state, error, FOLLOW_FAILED, env),

            FollowAction::Unfollow { followee_id } => {
                Self::begin_request(state);
                let api = env.api.clone();
                smallvec![request_effect! {
                    call: api.unfollow(followee_id),
                    on_success: |()| FollowAction::UnfollowSucceeded { followee_id },
                    on_error: |e| FollowAction::UnfollowFailed { error: error_message(&e) }
                }]
            },
            FollowAction::UnfollowSucceeded { followee_id } => {
                state.loading = false;
                state.remove_following(followee_id);
                smallvec![Effect::send(FollowAction::LoadFollowings)]
            },
            FollowAction::UnfollowFailed { error } => {
                Self::fail(state, error, UNFOLLOW_FAILED, env)
            },

            // ═══════════════════════════════════════════════════════════════
            // Lists
            // ═══════════════════════════════════════════════════════════════
            FollowAction::LoadFollowers => {
                Self::begin_request(state);
                let api = env.api.clone();
                smallvec![request_effect! {
                    call: api.followers(),
                    on_success: |followers| FollowAction::FollowersLoaded { followers },
                    on_error: |e| FollowAction::LoadFollowersFailed { error: error_message(&e) }
                }]
            },
            FollowAction::FollowersLoaded { followers } => {
                state.loading = false;
                state.replace_followers(followers);
                smallvec![Effect::None]
            },
            FollowAction::LoadFollowersFailed { error } => {
                Self::fail(state, error, LOAD_FOLLOWERS_FAILED, env)
            },

            FollowAction::LoadFollowings => {
                Self::begin_request(state);
                let api = env.api.clone();
                smallvec![request_effect! {
                    call: api.followings(),
                    on_success: |followings| FollowAction::FollowingsLoaded { followings },
                    on_error: |e| FollowAction::LoadFollowingsFailed { error: error_message(&e) }
                }]
            },
            FollowAction::FollowingsLoaded { followings } => {
                state.loading = false;
                state.replace_followings(followings);
                smallvec![Effect::None]
            },
            FollowAction::LoadFollowingsFailed { error } => {
                Self::fail(state, error, LOAD_FOLLOWINGS_FAILED, env)
            },

            // ═══════════════════════════════════════════════════════════════
            // Blocks (resync followers, then followings)
            // ═══════════════════════════════════════════════════════════════
            FollowAction::UpdateBlock { target, blocked } => {
                Self::begin_request(state);
                let api = env.api.clone();
                let request = BlockRequest {
                    target_user_id: target,
                    blocked,
                };
                smallvec![request_effect! {
                    call: api.block(request),
                    on_success: |result| FollowAction::BlockUpdated { result },
                    on_error: |e| FollowAction::UpdateBlockFailed { error: error_message(&e) }
                }]
            },
            FollowAction::BlockUpdated { result } => {
                state.loading = false;
                state.apply_block(result);
                smallvec![Effect::chain(vec![
                    Effect::send(FollowAction::LoadFollowers),
                    Effect::send(FollowAction::LoadFollowings),
                ])]
            },
            FollowAction::UpdateBlockFailed { error } => {
                Self::fail(state, error, BLOCK_FAILED, env)
            },
        }
    }
}
