//! # Roost Social
//!
//! Feature state, actions and reducers for the Roost client.
//!
//! Each feature follows the same request machine: a request action sets
//! `loading` and clears `error`, its effect calls the API, and the result
//! comes back as a success or failure action. Failures store the normalized
//! server message. [`app::AppReducer`] scopes every feature onto one
//! [`app::AppState`] for use with a `roost_runtime::Store`.
//!
//! The follow feature adds an optimistic toggle with rollback; see
//! [`follow`].
//!
//! # Example
//!
//! ```
//! use roost_api::mocks::ScriptedTransport;
//! use roost_api::PostId;
//! use roost_core::reducer::Reducer;
//! use roost_social::app::{AppAction, AppReducer, AppState};
//! use roost_social::environment::TestEnvironment;
//! use roost_social::like::LikeAction;
//!
//! let env = TestEnvironment::new(ScriptedTransport::new());
//! let reducer = AppReducer::<ScriptedTransport>::new();
//! let mut state = AppState::default();
//!
//! reducer.reduce(
//!     &mut state,
//!     AppAction::Like(LikeAction::AddSucceeded { post_id: PostId::new(1), count: 2 }),
//!     &env.env,
//! );
//! assert!(state.like.is_liked(PostId::new(1)));
//! ```

/// Declares a feature reducer that is generic over the API transport.
///
/// Reducers are stateless; the transport parameter only ties them to the
/// environment they run against.
macro_rules! transport_reducer {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<T> {
            _transport: ::std::marker::PhantomData<fn() -> T>,
        }

        impl<T> $name<T> {
            /// Create the reducer.
            #[must_use]
            pub const fn new() -> Self {
                Self {
                    _transport: ::std::marker::PhantomData,
                }
            }
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self::new()
            }
        }

        impl<T> ::std::fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(stringify!($name))
            }
        }
    };
}

pub mod app;
pub mod auth;
pub mod comment;
pub mod environment;
pub mod follow;
pub mod like;
pub mod notice;
pub mod post;
pub mod retweet;

pub use app::{AppAction, AppReducer, AppState};
pub use environment::SocialEnvironment;
#[cfg(any(test, feature = "test-utils"))]
pub use environment::TestEnvironment;
pub use notice::{Notice, NoticeLevel, Notifier, TracingNotifier, notify};
#[cfg(any(test, feature = "test-utils"))]
pub use notice::RecordingNotifier;
