//! Inline effect execution for reducer tests
//!
//! A reducer's request effect is a future that resolves to a success or
//! failure action. [`collect_actions`] awaits those futures directly, without
//! feeding the actions back into any reducer, so a test can assert on exactly
//! one step of a flow.

use futures::future::{BoxFuture, FutureExt, join_all};
use roost_core::effect::Effect;

/// Run `effects` and return every action they produce
///
/// `Parallel` children are joined and their actions kept in declaration
/// order. `Sequential` children run one after another.
pub async fn collect_actions<A, I>(effects: I) -> Vec<A>
where
    A: Send + 'static,
    I: IntoIterator<Item = Effect<A>>,
{
    let mut actions = Vec::new();
    for effect in effects {
        actions.extend(run(effect).await);
    }
    actions
}

fn run<A: Send + 'static>(effect: Effect<A>) -> BoxFuture<'static, Vec<A>> {
    async move {
        match effect {
            Effect::None => Vec::new(),
            Effect::Future(fut) => fut.await.into_iter().collect(),
            Effect::Parallel(effects) => join_all(effects.into_iter().map(run))
                .await
                .into_iter()
                .flatten()
                .collect(),
            Effect::Sequential(effects) => {
                let mut actions = Vec::new();
                for effect in effects {
                    actions.extend(run(effect).await);
                }
                actions
            },
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Loaded {
        Followers,
        Followings,
    }

    #[tokio::test]
    async fn sequential_keeps_order() {
        let effects = vec![
            Effect::None,
            Effect::chain(vec![
                Effect::send(Loaded::Followers),
                Effect::send(Loaded::Followings),
            ]),
        ];

        assert_eq!(
            collect_actions(effects).await,
            vec![Loaded::Followers, Loaded::Followings]
        );
    }

    #[tokio::test]
    async fn parallel_collects_every_child() {
        let effects = [Effect::merge(vec![
            Effect::send(Loaded::Followings),
            Effect::Future(Box::pin(async { None })),
            Effect::send(Loaded::Followers),
        ])];

        assert_eq!(
            collect_actions(effects).await,
            vec![Loaded::Followings, Loaded::Followers]
        );
    }
}
