//! Wire models for the social backend.
//!
//! Field names follow the backend's camelCase JSON. Optional fields default
//! so that partial payloads (older servers, trimmed test fixtures) still
//! decode.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw backend key.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// The raw backend key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// User identifier.
    UserId
);
define_id!(
    /// Post identifier.
    PostId
);
define_id!(
    /// Comment identifier.
    CommentId
);

/// A user profile as returned by `/auth/*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id.
    pub id: UserId,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub nickname: String,
    /// Role claim (`ROLE_USER`, `ROLE_ADMIN`).
    #[serde(default)]
    pub role: Option<String>,
    /// Login provider (`local`, `google`, ...).
    #[serde(default)]
    pub provider: Option<String>,
    /// Profile image URL.
    #[serde(default, rename = "ufile")]
    pub profile_image: Option<String>,
}

/// A post, or a retweet of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post id.
    pub id: PostId,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Author id.
    #[serde(default)]
    pub author_id: Option<UserId>,
    /// Author display name.
    #[serde(default)]
    pub author_nickname: Option<String>,
    /// Creation time (server local time).
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Last edit time.
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    /// Like count at fetch time.
    #[serde(default)]
    pub like_count: u64,
    /// Retweet count at fetch time.
    #[serde(default)]
    pub retweet_count: u64,
    /// Hashtags without the leading `#`.
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Attached image URLs.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Whether this entry is a retweet.
    #[serde(default)]
    pub retweet: bool,
    /// Retweeted post, when `retweet` is set.
    #[serde(default)]
    pub original_post_id: Option<PostId>,
}

impl Post {
    /// Minimal post, mostly for fixtures.
    #[must_use]
    pub fn new(id: PostId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            author_id: None,
            author_nickname: None,
            created_at: None,
            updated_at: None,
            like_count: 0,
            retweet_count: 0,
            hashtags: Vec::new(),
            image_urls: Vec::new(),
            retweet: false,
            original_post_id: None,
        }
    }

    /// Set the creation time.
    #[must_use]
    pub const fn with_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment id.
    pub id: CommentId,
    /// Post the comment belongs to.
    #[serde(default)]
    pub post_id: Option<PostId>,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Author id.
    #[serde(default)]
    pub author_id: Option<UserId>,
    /// Author display name.
    #[serde(default)]
    pub author_nickname: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Comment {
    /// Minimal comment, mostly for fixtures.
    #[must_use]
    pub fn new(id: CommentId, content: impl Into<String>) -> Self {
        Self {
            id,
            post_id: None,
            content: content.into(),
            author_id: None,
            author_nickname: None,
            created_at: None,
        }
    }
}

/// One entry of "who I follow".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdge {
    /// Followed user. Older endpoints call it `userId`.
    #[serde(alias = "userId")]
    pub followee_id: UserId,
    /// Whether I blocked this user.
    #[serde(default)]
    pub blocked: bool,
    /// Followed user's display name.
    #[serde(default)]
    pub nickname: Option<String>,
}

impl FollowEdge {
    /// Unblocked edge without profile data.
    #[must_use]
    pub const fn new(followee_id: UserId) -> Self {
        Self {
            followee_id,
            blocked: false,
            nickname: None,
        }
    }
}

/// One entry of "who follows me".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerEdge {
    /// Following user. Older endpoints call it `userId`.
    #[serde(alias = "userId")]
    pub follower_id: UserId,
    /// Whether I blocked this user.
    #[serde(default)]
    pub blocked: bool,
    /// Follower's display name.
    #[serde(default)]
    pub nickname: Option<String>,
}

/// `PATCH /api/follows/block` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    /// User to (un)block.
    pub target_user_id: UserId,
    /// New block flag.
    pub blocked: bool,
}

/// `PATCH /api/follows/block` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResult {
    /// The caller.
    #[serde(default)]
    pub blocker_id: Option<UserId>,
    /// The (un)blocked user.
    pub target_user_id: UserId,
    /// Block flag after the change.
    pub blocked: bool,
}

/// Like count for one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCount {
    /// Post id.
    pub post_id: PostId,
    /// Likes after the operation.
    pub count: u64,
}

/// Retweet count after adding or removing a retweet.
///
/// Adding returns `{originalPostId, retweetCount}`; removing only
/// `{retweetCount}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetweetCount {
    /// Retweeted post, when the server echoes it.
    #[serde(default, alias = "postId")]
    pub original_post_id: Option<PostId>,
    /// Retweets after the operation.
    pub retweet_count: u64,
}

/// `GET /api/retweets/me`: either a list of ids or an id → flag map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetweetedPosts {
    /// `[1, 2, 3]`
    Ids(Vec<PostId>),
    /// `{"1": true, "2": false}`
    ///
    /// Keys stay strings: an untagged enum buffers its input, and buffered
    /// map keys are not coerced to integers.
    Flags(HashMap<String, bool>),
}

impl RetweetedPosts {
    /// Normalize to an id → flag map. Keys that are not integers are
    /// skipped.
    #[must_use]
    pub fn into_flags(self) -> HashMap<PostId, bool> {
        match self {
            Self::Ids(ids) => ids.into_iter().map(|id| (id, true)).collect(),
            Self::Flags(flags) => flags
                .into_iter()
                .filter_map(|(key, flag)| match key.trim().parse::<i64>() {
                    Ok(id) => Some((PostId::new(id), flag)),
                    Err(_) => {
                        tracing::warn!(%key, "Skipping non-numeric retweet key");
                        None
                    },
                })
                .collect(),
        }
    }
}

/// `POST /auth/login` body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plain password (sent over TLS).
    pub password: String,
    /// Login provider, `local` for email/password.
    pub provider: String,
}

impl LoginRequest {
    /// Email/password login.
    #[must_use]
    pub fn local(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            provider: "local".to_string(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("provider", &self.provider)
            .finish()
    }
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// New bearer token.
    pub access_token: String,
    /// The logged-in user.
    pub user: User,
}

/// `POST /auth/refresh` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Replacement bearer token.
    pub access_token: String,
}

/// `POST /auth/signup` body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Login email.
    pub email: String,
    /// Plain password.
    pub password: String,
    /// Display name.
    pub nickname: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("nickname", &self.nickname)
            .finish()
    }
}

/// Body for creating or editing a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    /// Body text; hashtags are extracted server-side.
    pub content: String,
}

impl PostDraft {
    /// Draft with the given text.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Body for creating a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    /// Post to comment on.
    pub post_id: PostId,
    /// Body text.
    pub content: String,
}

/// Body for editing a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEdit {
    /// New body text.
    pub content: String,
}

/// Page selector for the paged listings (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u32,
    /// Page size.
    pub size: u32,
}

impl PageRequest {
    /// Page `page` with `size` entries.
    #[must_use]
    pub const fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// The page after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            page: self.page + 1,
            size: self.size,
        }
    }

    pub(crate) fn query(self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn follow_edge_accepts_legacy_user_id() {
        let edge: FollowEdge = serde_json::from_str(r#"{"userId": 3}"#).unwrap();
        assert_eq!(edge, FollowEdge::new(UserId::new(3)));
    }

    #[test]
    fn retweeted_posts_accept_both_shapes() {
        let ids: RetweetedPosts = serde_json::from_str("[1, 2]").unwrap();
        let flags: RetweetedPosts = serde_json::from_str(r#"{"1": true, "2": true}"#).unwrap();
        assert_eq!(ids.into_flags(), flags.into_flags());
    }

    #[test]
    fn retweet_flag_map_keeps_false_and_skips_bad_keys() {
        let flags: RetweetedPosts =
            serde_json::from_str(r#"{"4": false, "9": true, "oops": true}"#).unwrap();
        let flags = flags.into_flags();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags.get(&PostId::new(4)), Some(&false));
        assert_eq!(flags.get(&PostId::new(9)), Some(&true));
    }

    #[test]
    fn post_decodes_backend_local_time() {
        let post: Post =
            serde_json::from_str(r#"{"id": 7, "content": "hi", "createdAt": "2025-03-01T09:30:00"}"#)
                .unwrap();
        assert_eq!(post.id, PostId::new(7));
        assert!(post.created_at.is_some());
        assert!(post.hashtags.is_empty());
    }

    #[test]
    fn remove_retweet_response_has_no_post_id() {
        let count: RetweetCount = serde_json::from_str(r#"{"retweetCount": 4}"#).unwrap();
        assert_eq!(count.original_post_id, None);
        assert_eq!(count.retweet_count, 4);
    }

    #[test]
    fn credentials_are_redacted_in_debug_output() {
        let request = LoginRequest::local("ada@example.com", "hunter2");
        let printed = format!("{request:?}");
        assert!(printed.contains("ada@example.com"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn page_request_defaults_to_first_page_of_ten() {
        let page = PageRequest::default();
        assert_eq!(page, PageRequest::new(1, 10));
        assert_eq!(page.next().page, 2);
    }
}
