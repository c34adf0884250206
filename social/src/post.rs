//! Posts: the feed, single posts, paged listings and editing.

use crate::environment::SocialEnvironment;
use roost_api::{HttpTransport, PageRequest, Post, PostDraft, PostId, error_message};
use roost_core::effect::Effect;
use roost_core::reducer::Reducer;
use roost_core::{SmallVec, request_effect, smallvec};

/// Post slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostState {
    /// Main feed, newest first.
    pub posts: Vec<Post>,
    /// Posts the user liked.
    pub liked_posts: Vec<Post>,
    /// Post opened on its own.
    pub current_post: Option<Post>,
    /// The user's posts and retweets.
    pub my_and_retweets: Vec<Post>,
    /// Last hashtag search.
    pub search_results: Vec<Post>,
    /// A request is in flight.
    pub loading: bool,
    /// Message of the last failure.
    pub error: Option<String>,
}

impl PostState {
    /// Fold a page into the feed: append, keep the first copy of each id,
    /// then order newest first. Posts without a timestamp sort last.
    fn merge_page(&mut self, page: Vec<Post>) {
        let mut seen = std::collections::HashSet::new();
        let mut merged: Vec<Post> = std::mem::take(&mut self.posts)
            .into_iter()
            .chain(page)
            .filter(|post| seen.insert(post.id))
            .collect();
        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.posts = merged;
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn done(&mut self) {
        self.loading = false;
    }
}

/// Inputs to [`PostReducer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostAction {
    /// Load the whole feed.
    FetchAll,
    /// Feed arrived; replaces `posts`.
    AllFetched {
        /// Server feed.
        posts: Vec<Post>,
    },

    /// Load one post.
    FetchOne {
        /// Post to load.
        post_id: PostId,
    },
    /// Post arrived.
    OneFetched {
        /// The post.
        post: Post,
    },
    /// Loading one post failed; `current_post` is cleared.
    FetchOneFailed {
        /// Normalized failure message.
        error: String,
    },

    /// Load a page of the feed.
    FetchPage {
        /// Page to load.
        page: PageRequest,
    },
    /// Page arrived; merged into `posts`.
    PageFetched {
        /// Page contents.
        posts: Vec<Post>,
    },

    /// Load a page of liked posts.
    FetchLiked {
        /// Page to load.
        page: PageRequest,
    },
    /// Liked posts arrived; replaces `liked_posts`.
    LikedFetched {
        /// Page contents.
        posts: Vec<Post>,
    },

    /// Load a page of the user's posts and retweets.
    FetchMine {
        /// Page to load.
        page: PageRequest,
    },
    /// Own posts arrived; replaces `my_and_retweets`.
    MineFetched {
        /// Page contents.
        posts: Vec<Post>,
    },

    /// Search posts by hashtag.
    Search {
        /// Tag, with or without the leading `#`.
        tag: String,
    },
    /// Search results arrived.
    SearchFetched {
        /// Matching posts.
        posts: Vec<Post>,
    },

    /// Publish a post.
    Create {
        /// Post body.
        draft: PostDraft,
    },
    /// Post published; prepended to the feed.
    Created {
        /// The new post.
        post: Post,
    },

    /// Edit a post.
    Update {
        /// Post to edit.
        post_id: PostId,
        /// New body.
        draft: PostDraft,
    },
    /// Post edited; replaced in the feed and as `current_post`.
    Updated {
        /// The edited post.
        post: Post,
    },

    /// Delete a post.
    Delete {
        /// Post to delete.
        post_id: PostId,
    },
    /// Post deleted; removed from the feed.
    Deleted {
        /// Deleted post.
        post_id: PostId,
    },

    /// Any other request failed.
    Failed {
        /// Normalized failure message.
        error: String,
    },
}

fn failed(error: &roost_api::ApiError) -> PostAction {
    PostAction::Failed {
        error: error_message(error),
    }
}

transport_reducer!(
    /// Reducer for the post slice.
    PostReducer
);

impl<T: HttpTransport> Reducer for PostReducer<T> {
    type State = PostState;
    type Action = PostAction;
    type Environment = SocialEnvironment<T>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let api = env.api.clone();

        let effect = match action {
            PostAction::FetchAll => {
                state.begin();
                request_effect! {
                    call: api.posts(),
                    on_success: |posts| PostAction::AllFetched { posts },
                    on_error: |e| failed(&e)
                }
            },
            PostAction::AllFetched { posts } => {
                state.done();
                state.posts = posts;
                Effect::None
            },

            PostAction::FetchOne { post_id } => {
                state.begin();
                request_effect! {
                    call: api.post(post_id),
                    on_success: |post| PostAction::OneFetched { post },
                    on_error: |e| PostAction::FetchOneFailed { error: error_message(&e) }
                }
            },
            PostAction::OneFetched { post } => {
                state.done();
                state.current_post = Some(post);
                Effect::None
            },
            PostAction::FetchOneFailed { error } => {
                state.done();
                state.error = Some(error);
                state.current_post = None;
                Effect::None
            },

            PostAction::FetchPage { page } => {
                state.begin();
                request_effect! {
                    call: api.posts_paged(page),
                    on_success: |posts| PostAction::PageFetched { posts },
                    on_error: |e| failed(&e)
                }
            },
            PostAction::PageFetched { posts } => {
                state.done();
                tracing::debug!(received = posts.len(), "Merging feed page");
                state.merge_page(posts);
                Effect::None
            },

            PostAction::FetchLiked { page } => {
                state.begin();
                request_effect! {
                    call: api.liked_posts_paged(page),
                    on_success: |posts| PostAction::LikedFetched { posts },
                    on_error: |e| failed(&e)
                }
            },
            PostAction::LikedFetched { posts } => {
                state.done();
                state.liked_posts = posts;
                Effect::None
            },

            PostAction::FetchMine { page } => {
                state.begin();
                request_effect! {
                    call: api.my_posts_and_retweets_paged(page),
                    on_success: |posts| PostAction::MineFetched { posts },
                    on_error: |e| failed(&e)
                }
            },
            PostAction::MineFetched { posts } => {
                state.done();
                state.my_and_retweets = posts;
                Effect::None
            },

            PostAction::Search { tag } => {
                state.begin();
                request_effect! {
                    call: api.search_hashtag(&tag),
                    on_success: |posts| PostAction::SearchFetched { posts },
                    on_error: |e| failed(&e)
                }
            },
            PostAction::SearchFetched { posts } => {
                state.done();
                state.search_results = posts;
                Effect::None
            },

            PostAction::Create { draft } => {
                state.begin();
                request_effect! {
                    call: api.create_post(&draft),
                    on_success: |post| PostAction::Created { post },
                    on_error: |e| failed(&e)
                }
            },
            PostAction::Created { post } => {
                state.done();
                state.posts.insert(0, post);
                Effect::None
            },

            PostAction::Update { post_id, draft } => {
                state.begin();
                request_effect! {
                    call: api.update_post(post_id, &draft),
                    on_success: |post| PostAction::Updated { post },
                    on_error: |e| failed(&e)
                }
            },
            PostAction::Updated { post } => {
                state.done();
                if let Some(slot) = state.posts.iter_mut().find(|p| p.id == post.id) {
                    *slot = post.clone();
                }
                state.current_post = Some(post);
                Effect::None
            },

            PostAction::Delete { post_id } => {
                state.begin();
                request_effect! {
                    call: api.delete_post(post_id),
                    on_success: |()| PostAction::Deleted { post_id },
                    on_error: |e| failed(&e)
                }
            },
            PostAction::Deleted { post_id } => {
                state.done();
                state.posts.retain(|p| p.id != post_id);
                Effect::None
            },

            PostAction::Failed { error } => {
                state.done();
                state.error = Some(error);
                Effect::None
            },
        };

        smallvec![effect]
    }
}
