//! Property tests for the follow graph
//!
//! Whatever order toggles, settlements, resyncs and blocks arrive in, the
//! presence map and the followings list must describe the same set.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use roost_api::mocks::ScriptedTransport;
use roost_api::{BlockResult, FollowEdge, UserId};
use roost_core::reducer::Reducer;
use roost_social::TestEnvironment;
use roost_social::follow::{FollowAction, FollowReducer, FollowState};

fn user_strategy() -> impl Strategy<Value = UserId> {
    (1i64..6).prop_map(UserId::new)
}

fn edges_strategy() -> impl Strategy<Value = Vec<FollowEdge>> {
    prop::collection::vec(user_strategy().prop_map(FollowEdge::new), 0..6)
}

fn action_strategy() -> impl Strategy<Value = FollowAction> {
    prop_oneof![
        3 => user_strategy().prop_map(|target| FollowAction::Toggle { target }),
        2 => user_strategy().prop_map(|target| FollowAction::ToggleSubmit { target }),
        2 => user_strategy().prop_map(|target| FollowAction::ToggleConfirmed { target }),
        2 => user_strategy().prop_map(|target| FollowAction::ToggleFailed {
            target,
            error: "refused".to_string(),
        }),
        1 => user_strategy().prop_map(|id| FollowAction::FollowSucceeded {
            edge: FollowEdge::new(id),
        }),
        1 => user_strategy().prop_map(|followee_id| FollowAction::UnfollowSucceeded { followee_id }),
        1 => edges_strategy().prop_map(|followings| FollowAction::FollowingsLoaded { followings }),
        1 => (user_strategy(), any::<bool>()).prop_map(|(target_user_id, blocked)| {
            FollowAction::BlockUpdated {
                result: BlockResult {
                    blocker_id: None,
                    target_user_id,
                    blocked,
                },
            }
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn presence_map_matches_followings_list(
        initial in edges_strategy(),
        actions in prop::collection::vec(action_strategy(), 0..40),
    ) {
        let test_env = TestEnvironment::new(ScriptedTransport::new());
        let reducer = FollowReducer::<ScriptedTransport>::new();
        let mut state = FollowState::with_followings(initial);
        prop_assert!(state.is_consistent());

        for action in actions {
            let _effects = reducer.reduce(&mut state, action.clone(), &test_env.env);
            prop_assert!(state.is_consistent(), "inconsistent after {:?}: {:?}", action, state);
        }
    }

    #[test]
    fn rejected_toggle_restores_membership(
        initial in edges_strategy(),
        target in user_strategy(),
    ) {
        let test_env = TestEnvironment::new(ScriptedTransport::new());
        let reducer = FollowReducer::<ScriptedTransport>::new();
        let mut state = FollowState::with_followings(initial);
        let before = state.is_following(target);

        let _ = reducer.reduce(&mut state, FollowAction::Toggle { target }, &test_env.env);
        prop_assert_eq!(state.is_following(target), !before);

        let _ = reducer.reduce(&mut state, FollowAction::ToggleSubmit { target }, &test_env.env);
        let _ = reducer.reduce(
            &mut state,
            FollowAction::ToggleFailed { target, error: "refused".to_string() },
            &test_env.env,
        );

        prop_assert_eq!(state.is_following(target), before);
        prop_assert!(state.is_consistent());
        prop_assert_eq!(state.error.as_deref(), Some("refused"));
    }
}
