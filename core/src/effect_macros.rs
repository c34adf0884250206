//! Declarative macros for ergonomic effect construction
//!
//! Most reducers in the client issue one API call and map its `Result` into a
//! success or failure action. `request_effect!` captures that shape;
//! `async_effect!` covers everything else.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```
/// use roost_core::{async_effect, effect::Effect};
///
/// #[derive(Debug)]
/// enum FeedAction {
///     Refreshed,
/// }
///
/// let effect: Effect<FeedAction> = async_effect! {
///     Some(FeedAction::Refreshed)
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Future` that awaits a fallible call and maps both arms
/// into actions
///
/// The call expression is evaluated inside the future, so everything it
/// borrows must be moved in (clone the API client before invoking the macro).
///
/// # Example
///
/// ```
/// use roost_core::{effect::Effect, request_effect};
///
/// #[derive(Debug)]
/// enum CountAction {
///     Counted(u64),
///     CountFailed(String),
/// }
///
/// async fn count() -> Result<u64, String> {
///     Ok(3)
/// }
///
/// let effect: Effect<CountAction> = request_effect! {
///     call: count(),
///     on_success: |n| CountAction::Counted(n),
///     on_error: |e| CountAction::CountFailed(e)
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! request_effect {
    (
        call: $call:expr,
        on_success: |$ok:pat_param| $success_body:expr,
        on_error: |$err:pat_param| $error_body:expr
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $call.await {
                ::std::result::Result::Ok($ok) => ::std::option::Option::Some($success_body),
                ::std::result::Result::Err($err) => ::std::option::Option::Some($error_body),
            }
        }))
    };
}
