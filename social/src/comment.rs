//! Comment threads, keyed by post.

use crate::environment::SocialEnvironment;
use roost_api::{Comment, CommentDraft, CommentId, HttpTransport, PostId, error_message};
use roost_core::effect::Effect;
use roost_core::reducer::Reducer;
use roost_core::{SmallVec, request_effect, smallvec};
use std::collections::HashMap;

/// Comment slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentState {
    /// Thread per post, in server order.
    pub comments: HashMap<PostId, Vec<Comment>>,
    /// A request is in flight.
    pub loading: bool,
    /// Message of the last failure.
    pub error: Option<String>,
}

impl CommentState {
    /// Comments loaded for `post_id`.
    #[must_use]
    pub fn thread(&self, post_id: PostId) -> &[Comment] {
        self.comments.get(&post_id).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Inputs to [`CommentReducer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentAction {
    /// Load the thread of a post.
    Fetch {
        /// Post whose thread to load.
        post_id: PostId,
    },
    /// Thread arrived; replaces the cached one.
    Fetched {
        /// Post the thread belongs to.
        post_id: PostId,
        /// The thread.
        comments: Vec<Comment>,
    },
    /// Comment on a post.
    Create {
        /// Post to comment on.
        post_id: PostId,
        /// Body text.
        content: String,
    },
    /// Comment created; appended to the thread.
    Created {
        /// Post the comment belongs to.
        post_id: PostId,
        /// The new comment.
        comment: Comment,
    },
    /// Edit a comment.
    Update {
        /// Post the comment belongs to.
        post_id: PostId,
        /// Comment to edit.
        comment_id: CommentId,
        /// New body text.
        content: String,
    },
    /// Comment edited; replaced in the thread.
    Updated {
        /// Post the comment belongs to.
        post_id: PostId,
        /// The edited comment.
        comment: Comment,
    },
    /// Delete a comment.
    Delete {
        /// Post the comment belongs to.
        post_id: PostId,
        /// Comment to delete.
        comment_id: CommentId,
    },
    /// Comment deleted; removed from the thread.
    Deleted {
        /// Post the comment belonged to.
        post_id: PostId,
        /// Deleted comment.
        comment_id: CommentId,
    },
    /// A request failed.
    Failed {
        /// Normalized failure message.
        error: String,
    },
}

fn failed(error: &roost_api::ApiError) -> CommentAction {
    CommentAction::Failed {
        error: error_message(error),
    }
}

transport_reducer!(
    /// Reducer for the comment slice.
    CommentReducer
);

impl<T: HttpTransport> Reducer for CommentReducer<T> {
    type State = CommentState;
    type Action = CommentAction;
    type Environment = SocialEnvironment<T>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let api = env.api.clone();

        if action_starts_request(&action) {
            state.loading = true;
            state.error = None;
        }

        let effect = match action {
            CommentAction::Fetch { post_id } => request_effect! {
                call: api.comments_for_post(post_id),
                on_success: |comments| CommentAction::Fetched { post_id, comments },
                on_error: |e| failed(&e)
            },
            CommentAction::Fetched { post_id, comments } => {
                state.loading = false;
                state.comments.insert(post_id, comments);
                Effect::None
            },

            CommentAction::Create { post_id, content } => {
                let draft = CommentDraft { post_id, content };
                request_effect! {
                    call: api.create_comment(&draft),
                    on_success: |comment| CommentAction::Created { post_id, comment },
                    on_error: |e| failed(&e)
                }
            },
            CommentAction::Created { post_id, comment } => {
                state.loading = false;
                state.comments.entry(post_id).or_default().push(comment);
                Effect::None
            },

            CommentAction::Update {
                post_id,
                comment_id,
                content,
            } => request_effect! {
                call: api.update_comment(comment_id, &content),
                on_success: |comment| CommentAction::Updated { post_id, comment },
                on_error: |e| failed(&e)
            },
            CommentAction::Updated { post_id, comment } => {
                state.loading = false;
                if let Some(slot) = state
                    .comments
                    .get_mut(&post_id)
                    .and_then(|thread| thread.iter_mut().find(|c| c.id == comment.id))
                {
                    *slot = comment;
                }
                Effect::None
            },

            CommentAction::Delete {
                post_id,
                comment_id,
            } => request_effect! {
                call: api.delete_comment(comment_id),
                on_success: |()| CommentAction::Deleted { post_id, comment_id },
                on_error: |e| failed(&e)
            },
            CommentAction::Deleted {
                post_id,
                comment_id,
            } => {
                state.loading = false;
                if let Some(thread) = state.comments.get_mut(&post_id) {
                    thread.retain(|c| c.id != comment_id);
                }
                Effect::None
            },

            CommentAction::Failed { error } => {
                state.loading = false;
                state.error = Some(error);
                Effect::None
            },
        };

        smallvec![effect]
    }
}

const fn action_starts_request(action: &CommentAction) -> bool {
    matches!(
        action,
        CommentAction::Fetch { .. }
            | CommentAction::Create { .. }
            | CommentAction::Update { .. }
            | CommentAction::Delete { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::TestEnvironment;
    use roost_api::mocks::ScriptedTransport;
    use roost_api::{ApiResponse, Method};
    use roost_testing::ReducerTest;
    use roost_testing::effects::collect_actions;
    use serde_json::json;

    type TestReducer = CommentReducer<ScriptedTransport>;

    const POST: PostId = PostId::new(1);

    fn comment(id: i64, content: &str) -> Comment {
        Comment::new(CommentId::new(id), content)
    }

    fn with_thread(thread: Vec<Comment>) -> CommentState {
        let mut comments = HashMap::new();
        comments.insert(POST, thread);
        CommentState {
            comments,
            ..CommentState::default()
        }
    }

    fn test_env() -> TestEnvironment {
        TestEnvironment::new(ScriptedTransport::new())
    }

    #[test]
    fn fetched_thread_replaces_cached_one() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_env().env)
            .given_state(with_thread(vec![comment(1, "stale")]))
            .when_action(CommentAction::Fetched {
                post_id: POST,
                comments: vec![comment(2, "a"), comment(3, "b")],
            })
            .then_state(|state| {
                let ids: Vec<_> = state.thread(POST).iter().map(|c| c.id).collect();
                assert_eq!(ids, vec![CommentId::new(2), CommentId::new(3)]);
            })
            .run();
    }

    #[test]
    fn created_comment_is_appended() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_env().env)
            .given_state(with_thread(vec![comment(1, "first")]))
            .when_action(CommentAction::Created {
                post_id: POST,
                comment: comment(2, "second"),
            })
            .then_state(|state| {
                assert_eq!(state.thread(POST).len(), 2);
                assert_eq!(state.thread(POST)[1].content, "second");
            })
            .run();
    }

    #[test]
    fn updated_comment_is_replaced_by_id() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_env().env)
            .given_state(with_thread(vec![comment(1, "one"), comment(2, "two")]))
            .when_action(CommentAction::Updated {
                post_id: POST,
                comment: comment(2, "edited"),
            })
            .then_state(|state| {
                assert_eq!(state.thread(POST)[0].content, "one");
                assert_eq!(state.thread(POST)[1].content, "edited");
            })
            .run();
    }

    #[test]
    fn deleted_comment_is_removed() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_env().env)
            .given_state(with_thread(vec![comment(1, "one"), comment(2, "two")]))
            .when_action(CommentAction::Deleted {
                post_id: POST,
                comment_id: CommentId::new(1),
            })
            .then_state(|state| {
                assert_eq!(state.thread(POST), &[comment(2, "two")]);
            })
            .run();
    }

    #[test]
    fn unknown_thread_reads_as_empty() {
        assert!(CommentState::default().thread(POST).is_empty());
    }

    #[tokio::test]
    async fn create_posts_draft_and_resolves() {
        let transport = ScriptedTransport::new().on(
            Method::POST,
            "/api/comments",
            ApiResponse::json(200, &json!({"id": 10, "postId": 1, "content": "hello"})),
        );
        let env = TestEnvironment::new(transport);

        let effects = ReducerTest::new(TestReducer::new())
            .with_env(env.env.clone())
            .given_state(CommentState::default())
            .when_action(CommentAction::Create {
                post_id: POST,
                content: "hello".to_string(),
            })
            .then_state(|state| assert!(state.loading))
            .into_effects();

        let actions = collect_actions(effects).await;
        assert!(matches!(
            &actions[..],
            [CommentAction::Created { post_id, comment }] if *post_id == POST && comment.id == CommentId::new(10)
        ));
        assert_eq!(
            env.transport.requests()[0].body,
            Some(json!({"postId": 1, "content": "hello"}))
        );
    }

    #[tokio::test]
    async fn server_message_lands_in_error() {
        let transport = ScriptedTransport::new().on(
            Method::DELETE,
            "/api/comments/5",
            ApiResponse::json(403, &json!({"message": "Not your comment"})),
        );
        let env = TestEnvironment::new(transport);

        let effects = ReducerTest::new(TestReducer::new())
            .with_env(env.env.clone())
            .given_state(CommentState::default())
            .when_action(CommentAction::Delete {
                post_id: POST,
                comment_id: CommentId::new(5),
            })
            .into_effects();

        assert_eq!(
            collect_actions(effects).await,
            vec![CommentAction::Failed {
                error: "Not your comment".to_string()
            }]
        );
    }
}
