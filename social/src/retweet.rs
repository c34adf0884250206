//! Retweets per post.

use crate::environment::SocialEnvironment;
use roost_api::{HttpTransport, PostId, error_message};
use roost_core::effect::Effect;
use roost_core::reducer::Reducer;
use roost_core::{SmallVec, request_effect, smallvec};
use std::collections::HashMap;

/// Retweet slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetweetState {
    /// Whether the user retweeted each post.
    pub retweets: HashMap<PostId, bool>,
    /// Retweet count per post.
    pub retweets_count: HashMap<PostId, u64>,
    /// A request is in flight.
    pub loading: bool,
    /// Message of the last failure.
    pub error: Option<String>,
}

impl RetweetState {
    /// Whether the user retweeted `post_id`.
    #[must_use]
    pub fn is_retweeted(&self, post_id: PostId) -> bool {
        self.retweets.get(&post_id).copied().unwrap_or(false)
    }
}

/// Inputs to [`RetweetReducer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetweetAction {
    /// Retweet a post.
    Add {
        /// Post to retweet.
        post_id: PostId,
    },
    /// Retweet recorded.
    AddSucceeded {
        /// Retweeted post.
        post_id: PostId,
        /// Count after the retweet.
        count: u64,
    },
    /// Undo a retweet.
    Remove {
        /// Post to un-retweet.
        post_id: PostId,
    },
    /// Retweet removed.
    RemoveSucceeded {
        /// Post no longer retweeted.
        post_id: PostId,
        /// Count after the removal.
        count: u64,
    },
    /// Ask whether the user retweeted a post.
    Check {
        /// Post to check.
        post_id: PostId,
    },
    /// Answer to [`RetweetAction::Check`].
    Checked {
        /// Checked post.
        post_id: PostId,
        /// Whether it is retweeted.
        retweeted: bool,
    },
    /// Load every post the user retweeted.
    FetchMine,
    /// Retweet flags arrived; merged into `retweets`.
    MineFetched {
        /// Flag per post.
        flags: HashMap<PostId, bool>,
    },
    /// A request failed.
    Failed {
        /// Normalized failure message.
        error: String,
    },
}

fn failed(error: &roost_api::ApiError) -> RetweetAction {
    RetweetAction::Failed {
        error: error_message(error),
    }
}

transport_reducer!(
    /// Reducer for the retweet slice.
    RetweetReducer
);

impl<T: HttpTransport> Reducer for RetweetReducer<T> {
    type State = RetweetState;
    type Action = RetweetAction;
    type Environment = SocialEnvironment<T>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let api = env.api.clone();

        let effect = match action {
            RetweetAction::Add { post_id } => {
                state.loading = true;
                state.error = None;
                request_effect! {
                    call: api.add_retweet(post_id),
                    // Retweeting a retweet counts against the original post.
                    on_success: |c| RetweetAction::AddSucceeded {
                        post_id: c.original_post_id.unwrap_or(post_id),
                        count: c.retweet_count,
                    },
                    on_error: |e| failed(&e)
                }
            },
            RetweetAction::AddSucceeded { post_id, count } => {
                state.loading = false;
                state.retweets.insert(post_id, true);
                state.retweets_count.insert(post_id, count);
                Effect::None
            },
            RetweetAction::Remove { post_id } => {
                state.loading = true;
                state.error = None;
                request_effect! {
                    call: api.remove_retweet(post_id),
                    on_success: |c| RetweetAction::RemoveSucceeded {
                        post_id,
                        count: c.retweet_count,
                    },
                    on_error: |e| failed(&e)
                }
            },
            RetweetAction::RemoveSucceeded { post_id, count } => {
                state.loading = false;
                state.retweets.insert(post_id, false);
                state.retweets_count.insert(post_id, count);
                Effect::None
            },
            RetweetAction::Check { post_id } => request_effect! {
                call: api.has_retweeted(post_id),
                on_success: |retweeted| RetweetAction::Checked { post_id, retweeted },
                on_error: |e| failed(&e)
            },
            RetweetAction::Checked { post_id, retweeted } => {
                state.retweets.insert(post_id, retweeted);
                Effect::None
            },
            RetweetAction::FetchMine => {
                state.loading = true;
                state.error = None;
                request_effect! {
                    call: api.my_retweets(),
                    on_success: |posts| RetweetAction::MineFetched { flags: posts.into_flags() },
                    on_error: |e| failed(&e)
                }
            },
            RetweetAction::MineFetched { flags } => {
                state.loading = false;
                state.retweets.extend(flags);
                Effect::None
            },
            RetweetAction::Failed { error } => {
                state.loading = false;
                state.error = Some(error);
                Effect::None
            },
        };

        smallvec![effect]
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::environment::TestEnvironment;
    use roost_api::mocks::ScriptedTransport;
    use roost_api::{ApiResponse, Method};
    use roost_testing::ReducerTest;
    use roost_testing::effects::collect_actions;
    use serde_json::json;

    type TestReducer = RetweetReducer<ScriptedTransport>;

    fn post(id: i64) -> PostId {
        PostId::new(id)
    }

    async fn resolve(transport: ScriptedTransport, action: RetweetAction) -> Vec<RetweetAction> {
        let env = TestEnvironment::new(transport);
        let effects = ReducerTest::new(TestReducer::new())
            .with_env(env.env)
            .given_state(RetweetState::default())
            .when_action(action)
            .into_effects();
        collect_actions(effects).await
    }

    #[tokio::test]
    async fn add_prefers_the_echoed_original_post() {
        let transport = ScriptedTransport::new().on(
            Method::POST,
            "/api/retweets/7",
            ApiResponse::json(200, &json!({"originalPostId": 3, "retweetCount": 2})),
        );

        let actions = resolve(transport, RetweetAction::Add { post_id: post(7) }).await;

        assert_eq!(
            actions,
            vec![RetweetAction::AddSucceeded {
                post_id: post(3),
                count: 2
            }]
        );
    }

    #[tokio::test]
    async fn remove_falls_back_to_requested_post() {
        let transport = ScriptedTransport::new().on(
            Method::DELETE,
            "/api/retweets/7",
            ApiResponse::json(200, &json!({"retweetCount": 0})),
        );

        let actions = resolve(transport, RetweetAction::Remove { post_id: post(7) }).await;

        assert_eq!(
            actions,
            vec![RetweetAction::RemoveSucceeded {
                post_id: post(7),
                count: 0
            }]
        );
    }

    #[tokio::test]
    async fn my_retweets_accept_an_id_list() {
        let transport = ScriptedTransport::new().on(
            Method::GET,
            "/api/retweets/me",
            ApiResponse::json(200, &json!([1, 2])),
        );

        let actions = resolve(transport, RetweetAction::FetchMine).await;

        let [RetweetAction::MineFetched { flags }] = &actions[..] else {
            panic!("unexpected actions: {actions:?}");
        };
        assert_eq!(flags.get(&post(1)), Some(&true));
        assert_eq!(flags.get(&post(2)), Some(&true));
    }

    #[tokio::test]
    async fn my_retweets_accept_a_flag_map() {
        let transport = ScriptedTransport::new().on(
            Method::GET,
            "/api/retweets/me",
            ApiResponse::json(200, &json!({"1": true, "2": false})),
        );

        let actions = resolve(transport, RetweetAction::FetchMine).await;

        let [RetweetAction::MineFetched { flags }] = &actions[..] else {
            panic!("unexpected actions: {actions:?}");
        };
        assert_eq!(flags.len(), 2);
        assert_eq!(flags.get(&post(1)), Some(&true));
        assert_eq!(flags.get(&post(2)), Some(&false));
    }

    #[test]
    fn fetched_flags_merge_without_dropping_others() {
        let mut retweets = HashMap::new();
        retweets.insert(post(5), true);
        let mut flags = HashMap::new();
        flags.insert(post(1), true);
        flags.insert(post(2), false);

        ReducerTest::new(TestReducer::new())
            .with_env(TestEnvironment::new(ScriptedTransport::new()).env)
            .given_state(RetweetState {
                retweets,
                ..RetweetState::default()
            })
            .when_action(RetweetAction::MineFetched { flags })
            .then_state(|state| {
                assert!(state.is_retweeted(post(5)));
                assert!(state.is_retweeted(post(1)));
                assert!(!state.is_retweeted(post(2)));
            })
            .run();
    }

    #[test]
    fn add_then_remove_updates_flag_and_count() {
        ReducerTest::new(TestReducer::new())
            .with_env(TestEnvironment::new(ScriptedTransport::new()).env)
            .given_state(RetweetState::default())
            .given_actions([RetweetAction::AddSucceeded {
                post_id: post(1),
                count: 3,
            }])
            .when_action(RetweetAction::RemoveSucceeded {
                post_id: post(1),
                count: 2,
            })
            .then_state(|state| {
                assert!(!state.is_retweeted(post(1)));
                assert_eq!(state.retweets_count.get(&post(1)), Some(&2));
            })
            .run();
    }

    #[test]
    fn failure_records_message() {
        ReducerTest::new(TestReducer::new())
            .with_env(TestEnvironment::new(ScriptedTransport::new()).env)
            .given_state(RetweetState {
                loading: true,
                ..RetweetState::default()
            })
            .when_action(RetweetAction::Failed {
                error: "Already retweeted".to_string(),
            })
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.error.as_deref(), Some("Already retweeted"));
            })
            .run();
    }
}
