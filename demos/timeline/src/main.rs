//! Timeline demo
//!
//! Signs in (when `ROOST_EMAIL` and `ROOST_PASSWORD` are set), loads the first
//! page of the feed and the follow graph, and prints them.
//!
//! ```text
//! ROOST_API_BASE_URL=http://localhost:8080 ROOST_EMAIL=ada@example.com \
//!     ROOST_PASSWORD=secret cargo run -p timeline
//! ```

use anyhow::Context;
use roost_api::{ApiClient, ClientConfig, LoginRequest, PageRequest, ReqwestTransport, Session};
use roost_runtime::Store;
use roost_social::auth::AuthAction;
use roost_social::follow::FollowAction;
use roost_social::post::PostAction;
use roost_social::{AppAction, AppReducer, AppState, SocialEnvironment};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const WAIT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timeline=info,roost_api=info,roost_social=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    config.validate().context("invalid ROOST_API_BASE_URL")?;
    tracing::info!(base_url = %config.base_url, "Connecting");

    let transport = ReqwestTransport::new(&config).context("building HTTP transport")?;
    let session = Session::from_config(&config).context("opening credential store")?;
    let env = SocialEnvironment::with_tracing_notices(ApiClient::new(transport, session));
    let store = Store::new(AppState::default(), AppReducer::new(), env);

    if let (Ok(email), Ok(password)) = (std::env::var("ROOST_EMAIL"), std::env::var("ROOST_PASSWORD")) {
        let outcome = store
            .send_and_wait_for(
                AuthAction::Login {
                    request: LoginRequest::local(email, password),
                }
                .into(),
                |action| {
                    matches!(
                        action,
                        AppAction::Auth(AuthAction::LoginSucceeded { .. } | AuthAction::LoginFailed { .. })
                    )
                },
                WAIT,
            )
            .await?;
        if let AppAction::Auth(AuthAction::LoginFailed { error }) = outcome {
            anyhow::bail!("login failed: {error}");
        }
    }

    let mut feed = store
        .send(PostAction::FetchPage { page: PageRequest::default() }.into())
        .await?;
    let mut graph = store.send(FollowAction::LoadFollowings.into()).await?;
    feed.wait_with_timeout(WAIT).await?;
    graph.wait_with_timeout(WAIT).await?;

    let (posts, error) = store
        .state(|s| (s.post.posts.clone(), s.post.error.clone()))
        .await;
    if let Some(error) = error {
        println!("feed unavailable: {error}");
    }
    for post in &posts {
        let author = post.author_nickname.as_deref().unwrap_or("unknown");
        println!(
            "#{:<5} {author:<16} {:>3} likes {:>3} retweets  {}",
            post.id.get(),
            post.like_count,
            post.retweet_count,
            post.content
        );
    }

    let followings = store
        .state(|s| s.follow.followings_list().len())
        .await;
    println!("\nfollowing {followings} users");

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
