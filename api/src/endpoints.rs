//! Typed calls for every backend route.
//!
//! All of them go through [`ApiClient::dispatch`], so every call gets the
//! bearer token and the one-shot refresh. The exception is
//! [`ApiClient::refresh`], which never enters the refresh cycle.

use crate::client::{ApiClient, encode};
use crate::error::Result;
use crate::models::{
    BlockRequest, BlockResult, Comment, CommentDraft, CommentEdit, CommentId, FollowEdge,
    FollowerEdge, LikeCount, LoginRequest, LoginResponse, PageRequest, Post, PostDraft, PostId,
    RetweetCount, RetweetedPosts, SignupRequest, User, UserId,
};
use crate::transport::{ApiRequest, HttpTransport};
use reqwest::Method;
use serde_json::json;

fn paged(path: &str, page: PageRequest) -> ApiRequest {
    let mut request = ApiRequest::new(Method::GET, path);
    request.query = page.query();
    request
}

// Auth
impl<T: HttpTransport> ApiClient<T> {
    /// `POST /auth/signup`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn signup(&self, request: &SignupRequest) -> Result<User> {
        let request = ApiRequest::new(Method::POST, "/auth/signup").with_body(encode(request)?);
        self.fetch(request).await
    }

    /// `POST /auth/login`. The returned token becomes the session's token.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call, or a credential
    /// store failure while persisting the token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let request = ApiRequest::new(Method::POST, "/auth/login").with_body(encode(request)?);
        let response: LoginResponse = self.fetch(request).await?;
        self.session().replace_token(&response.access_token)?;
        tracing::info!(user_id = %response.user.id, "Logged in");
        Ok(response)
    }

    /// `POST /auth/logout`. The local token is cleared even when the call
    /// fails.
    ///
    /// # Errors
    ///
    /// The call's error, otherwise a credential store failure.
    pub async fn logout(&self) -> Result<()> {
        let outcome = self.send(ApiRequest::new(Method::POST, "/auth/logout")).await;
        self.session().clear_token()?;
        outcome
    }

    /// `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn me(&self) -> Result<User> {
        self.fetch(ApiRequest::new(Method::GET, "/auth/me")).await
    }

    /// `DELETE /auth/me`. Clears the token on success.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn delete_me(&self) -> Result<()> {
        self.send(ApiRequest::new(Method::DELETE, "/auth/me")).await?;
        self.session().clear_token()?;
        Ok(())
    }

    /// `PATCH /auth/{userId}/nickname?nickname=`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn update_nickname(&self, user_id: UserId, nickname: &str) -> Result<User> {
        let request = ApiRequest::new(Method::PATCH, format!("/auth/{user_id}/nickname"))
            .with_query("nickname", nickname);
        self.fetch(request).await
    }

    /// `GET /auth/check-email`: whether `email` is already registered.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn check_email(&self, email: &str) -> Result<bool> {
        let request = ApiRequest::new(Method::GET, "/auth/check-email").with_query("email", email);
        self.fetch(request).await
    }

    /// `GET /auth/check-nickname`: whether `nickname` is taken.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn check_nickname(&self, nickname: &str) -> Result<bool> {
        let request =
            ApiRequest::new(Method::GET, "/auth/check-nickname").with_query("nickname", nickname);
        self.fetch(request).await
    }
}

// Follows
impl<T: HttpTransport> ApiClient<T> {
    /// `POST /api/follows`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn follow(&self, followee_id: UserId) -> Result<FollowEdge> {
        let request = ApiRequest::new(Method::POST, "/api/follows")
            .with_body(json!({ "followeeId": followee_id }));
        self.fetch(request).await
    }

    /// `DELETE /api/follows` with a `{followeeId}` body.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn unfollow(&self, followee_id: UserId) -> Result<()> {
        let request = ApiRequest::new(Method::DELETE, "/api/follows")
            .with_body(json!({ "followeeId": followee_id }));
        self.send(request).await
    }

    /// `GET /api/follows/me/followers`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn followers(&self) -> Result<Vec<FollowerEdge>> {
        self.fetch(ApiRequest::new(Method::GET, "/api/follows/me/followers"))
            .await
    }

    /// `GET /api/follows/me/followings`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn followings(&self) -> Result<Vec<FollowEdge>> {
        self.fetch(ApiRequest::new(Method::GET, "/api/follows/me/followings"))
            .await
    }

    /// `PATCH /api/follows/block`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn block(&self, request: BlockRequest) -> Result<BlockResult> {
        let request =
            ApiRequest::new(Method::PATCH, "/api/follows/block").with_body(encode(&request)?);
        self.fetch(request).await
    }
}

// Likes
impl<T: HttpTransport> ApiClient<T> {
    /// `POST /api/likes`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn add_like(&self, post_id: PostId) -> Result<LikeCount> {
        let request =
            ApiRequest::new(Method::POST, "/api/likes").with_body(json!({ "postId": post_id }));
        self.fetch(request).await
    }

    /// `DELETE /api/likes/{postId}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn remove_like(&self, post_id: PostId) -> Result<LikeCount> {
        self.fetch(ApiRequest::new(Method::DELETE, format!("/api/likes/{post_id}")))
            .await
    }

    /// `GET /api/likes/count/{postId}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn like_count(&self, post_id: PostId) -> Result<u64> {
        self.fetch(ApiRequest::new(
            Method::GET,
            format!("/api/likes/count/{post_id}"),
        ))
        .await
    }

    /// `GET /api/posts/liked/{userId}`: ids of the posts `user_id` liked.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn liked_post_ids(&self, user_id: UserId) -> Result<Vec<PostId>> {
        self.fetch(ApiRequest::new(
            Method::GET,
            format!("/api/posts/liked/{user_id}"),
        ))
        .await
    }
}

// Retweets
impl<T: HttpTransport> ApiClient<T> {
    /// `POST /api/retweets/{postId}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn add_retweet(&self, post_id: PostId) -> Result<RetweetCount> {
        self.fetch(ApiRequest::new(
            Method::POST,
            format!("/api/retweets/{post_id}"),
        ))
        .await
    }

    /// `DELETE /api/retweets/{postId}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn remove_retweet(&self, post_id: PostId) -> Result<RetweetCount> {
        self.fetch(ApiRequest::new(
            Method::DELETE,
            format!("/api/retweets/{post_id}"),
        ))
        .await
    }

    /// `GET /api/retweets/{postId}/exists`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn has_retweeted(&self, post_id: PostId) -> Result<bool> {
        self.fetch(ApiRequest::new(
            Method::GET,
            format!("/api/retweets/{post_id}/exists"),
        ))
        .await
    }

    /// `GET /api/retweets/me`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn my_retweets(&self) -> Result<RetweetedPosts> {
        self.fetch(ApiRequest::new(Method::GET, "/api/retweets/me"))
            .await
    }
}

// Posts
impl<T: HttpTransport> ApiClient<T> {
    /// `GET /api/posts`: the whole feed.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn posts(&self) -> Result<Vec<Post>> {
        self.fetch(ApiRequest::new(Method::GET, "/api/posts")).await
    }

    /// `GET /api/posts/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn post(&self, post_id: PostId) -> Result<Post> {
        self.fetch(ApiRequest::new(Method::GET, format!("/api/posts/{post_id}")))
            .await
    }

    /// `GET /api/posts/paged`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn posts_paged(&self, page: PageRequest) -> Result<Vec<Post>> {
        self.fetch(paged("/api/posts/paged", page)).await
    }

    /// `GET /api/posts/liked`: posts the caller liked, paged.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn liked_posts_paged(&self, page: PageRequest) -> Result<Vec<Post>> {
        self.fetch(paged("/api/posts/liked", page)).await
    }

    /// `GET /api/posts/myPostRetweets/paged`: the caller's posts and
    /// retweets, paged.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn my_posts_and_retweets_paged(&self, page: PageRequest) -> Result<Vec<Post>> {
        self.fetch(paged("/api/posts/myPostRetweets/paged", page))
            .await
    }

    /// `GET /api/posts/search/hashtag?tag=`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn search_hashtag(&self, tag: &str) -> Result<Vec<Post>> {
        let tag = tag.trim_start_matches('#');
        let request =
            ApiRequest::new(Method::GET, "/api/posts/search/hashtag").with_query("tag", tag);
        self.fetch(request).await
    }

    /// `POST /api/posts`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post> {
        let request = ApiRequest::new(Method::POST, "/api/posts").with_body(encode(draft)?);
        self.fetch(request).await
    }

    /// `PUT /api/posts/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn update_post(&self, post_id: PostId, draft: &PostDraft) -> Result<Post> {
        let request = ApiRequest::new(Method::PUT, format!("/api/posts/{post_id}"))
            .with_body(encode(draft)?);
        self.fetch(request).await
    }

    /// `DELETE /api/posts/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn delete_post(&self, post_id: PostId) -> Result<()> {
        self.send(ApiRequest::new(
            Method::DELETE,
            format!("/api/posts/{post_id}"),
        ))
        .await
    }
}

// Comments
impl<T: HttpTransport> ApiClient<T> {
    /// `GET /api/comments/post/{postId}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn comments_for_post(&self, post_id: PostId) -> Result<Vec<Comment>> {
        self.fetch(ApiRequest::new(
            Method::GET,
            format!("/api/comments/post/{post_id}"),
        ))
        .await
    }

    /// `POST /api/comments`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn create_comment(&self, draft: &CommentDraft) -> Result<Comment> {
        let request = ApiRequest::new(Method::POST, "/api/comments").with_body(encode(draft)?);
        self.fetch(request).await
    }

    /// `PATCH /api/comments/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn update_comment(&self, comment_id: CommentId, content: &str) -> Result<Comment> {
        let edit = CommentEdit {
            content: content.to_string(),
        };
        let request = ApiRequest::new(Method::PATCH, format!("/api/comments/{comment_id}"))
            .with_body(encode(&edit)?);
        self.fetch(request).await
    }

    /// `DELETE /api/comments/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the call.
    pub async fn delete_comment(&self, comment_id: CommentId) -> Result<()> {
        self.send(ApiRequest::new(
            Method::DELETE,
            format!("/api/comments/{comment_id}"),
        ))
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedTransport;
    use crate::session::Session;
    use crate::transport::ApiResponse;

    fn client(transport: &ScriptedTransport) -> ApiClient<ScriptedTransport> {
        ApiClient::new(transport.clone(), Session::in_memory())
    }

    #[tokio::test]
    async fn login_persists_token() {
        let transport = ScriptedTransport::new().on(
            Method::POST,
            "/auth/login",
            ApiResponse::json(
                200,
                &json!({"accessToken": "t1", "user": {"id": 1, "email": "a@b.c", "nickname": "a"}}),
            ),
        );
        let client = client(&transport);

        let response = client.login(&LoginRequest::local("a@b.c", "pw")).await.unwrap();

        assert_eq!(response.user.id, UserId::new(1));
        assert_eq!(client.session().token().as_deref(), Some("t1"));
        let sent = transport.requests();
        assert_eq!(
            sent[0].body,
            Some(json!({"email": "a@b.c", "password": "pw", "provider": "local"}))
        );
    }

    #[tokio::test]
    async fn logout_clears_token_even_on_failure() {
        let transport = ScriptedTransport::new().on(
            Method::POST,
            "/auth/logout",
            ApiResponse::json(500, &json!({"message": "boom"})),
        );
        let client = client(&transport);
        client.session().replace_token("t1").unwrap();

        assert!(client.logout().await.is_err());
        assert_eq!(client.session().token(), None);
    }

    #[tokio::test]
    async fn nickname_travels_as_query_parameter() {
        let transport = ScriptedTransport::new().on(
            Method::PATCH,
            "/auth/9/nickname",
            ApiResponse::json(200, &json!({"id": 9, "nickname": "new"})),
        );
        let client = client(&transport);

        let user = client.update_nickname(UserId::new(9), "new").await.unwrap();

        assert_eq!(user.nickname, "new");
        let sent = transport.requests();
        assert_eq!(sent[0].query, vec![("nickname".to_string(), "new".to_string())]);
        assert_eq!(sent[0].body, None);
    }

    #[tokio::test]
    async fn unfollow_sends_followee_in_body() {
        let transport =
            ScriptedTransport::new().on(Method::DELETE, "/api/follows", ApiResponse::empty(204));
        let client = client(&transport);

        client.unfollow(UserId::new(4)).await.unwrap();

        assert_eq!(transport.requests()[0].body, Some(json!({"followeeId": 4})));
    }

    #[tokio::test]
    async fn paged_listing_sends_page_and_size() {
        let transport = ScriptedTransport::new().on(
            Method::GET,
            "/api/posts/paged",
            ApiResponse::json(200, &json!([{"id": 1, "content": "a"}])),
        );
        let client = client(&transport);

        let posts = client.posts_paged(PageRequest::new(3, 5)).await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(
            transport.requests()[0].query,
            vec![
                ("page".to_string(), "3".to_string()),
                ("size".to_string(), "5".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn hashtag_search_strips_leading_hash() {
        let transport = ScriptedTransport::new().on(
            Method::GET,
            "/api/posts/search/hashtag",
            ApiResponse::json(200, &json!([])),
        );
        let client = client(&transport);

        client.search_hashtag("#rust").await.unwrap();

        assert_eq!(
            transport.requests()[0].query,
            vec![("tag".to_string(), "rust".to_string())]
        );
    }

    #[tokio::test]
    async fn decode_failure_is_reported() {
        let transport = ScriptedTransport::new().on(
            Method::GET,
            "/api/likes/count/1",
            ApiResponse::json(200, &json!({"unexpected": true})),
        );
        let client = client(&transport);

        let error = client.like_count(PostId::new(1)).await.unwrap_err();
        assert!(matches!(error, crate::ApiError::Decode(_)));
    }
}
