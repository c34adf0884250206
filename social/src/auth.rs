//! Signed-in user and account operations.
//!
//! The bearer token itself lives in the API client's session; `access_token`
//! here mirrors it for the presentation layer.

use crate::environment::SocialEnvironment;
use crate::notice::{Notice, notify};
use roost_api::{HttpTransport, LoginRequest, SignupRequest, User, UserId, error_message};
use roost_core::effect::Effect;
use roost_core::reducer::Reducer;
use roost_core::{SmallVec, async_effect, request_effect, smallvec};

/// Auth slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// Signed-in user.
    pub user: Option<User>,
    /// Current bearer token.
    pub access_token: Option<String>,
    /// A request is in flight.
    pub loading: bool,
    /// Message of the last failure.
    pub error: Option<String>,
    /// Signup completed (cleared by [`AuthAction::Reset`]).
    pub success: bool,
    /// Result of the last email check: `true` when already registered.
    pub email_taken: Option<bool>,
    /// Result of the last nickname check: `true` when already in use.
    pub nickname_taken: Option<bool>,
}

impl AuthState {
    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn fail(&mut self, error: String) {
        self.loading = false;
        self.error = Some(error);
    }

    fn sign_out(&mut self) {
        self.loading = false;
        self.user = None;
        self.access_token = None;
    }
}

/// Inputs to [`AuthReducer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// Register a new account.
    Signup {
        /// Registration form.
        request: SignupRequest,
    },
    /// Account created. The user still has to log in.
    SignupSucceeded {
        /// The new account.
        user: User,
    },
    /// Registration failed.
    SignupFailed {
        /// Normalized failure message.
        error: String,
    },

    /// Log in.
    Login {
        /// Credentials.
        request: LoginRequest,
    },
    /// Logged in; the token is already stored in the session.
    LoginSucceeded {
        /// Signed-in user.
        user: User,
        /// Bearer token.
        access_token: String,
    },
    /// Login failed.
    LoginFailed {
        /// Normalized failure message.
        error: String,
    },

    /// Renew the bearer token from the refresh cookie.
    Refresh,
    /// Token renewed.
    RefreshSucceeded {
        /// New bearer token.
        access_token: String,
    },
    /// Renewal failed.
    RefreshFailed {
        /// Normalized failure message.
        error: String,
    },

    /// Log out. Local state is cleared immediately.
    Logout,
    /// The server acknowledged the logout.
    LoggedOut,
    /// The server call failed; the local session is gone regardless.
    LogoutFailed {
        /// Normalized failure message.
        error: String,
    },

    /// Fetch the signed-in user (`/auth/me`).
    LoadCurrentUser,
    /// Signed-in user arrived.
    CurrentUserLoaded {
        /// Signed-in user.
        user: User,
    },
    /// Fetching the signed-in user failed.
    LoadCurrentUserFailed {
        /// Normalized failure message.
        error: String,
    },

    /// Change the display name.
    UpdateNickname {
        /// Account to change.
        user_id: UserId,
        /// New display name.
        nickname: String,
    },
    /// Display name changed.
    NicknameUpdated {
        /// Updated user.
        user: User,
    },
    /// Changing the display name failed.
    UpdateNicknameFailed {
        /// Normalized failure message.
        error: String,
    },

    /// Delete the signed-in account.
    DeleteAccount,
    /// Account deleted and session cleared.
    AccountDeleted,
    /// Deleting the account failed.
    DeleteAccountFailed {
        /// Normalized failure message.
        error: String,
    },

    /// Check whether an email is already registered.
    CheckEmail {
        /// Email to check.
        email: String,
    },
    /// Email check result.
    EmailChecked {
        /// `true` when already registered.
        taken: bool,
    },
    /// Check whether a nickname is already in use.
    CheckNickname {
        /// Nickname to check.
        nickname: String,
    },
    /// Nickname check result.
    NicknameChecked {
        /// `true` when already in use.
        taken: bool,
    },
    /// An email or nickname check failed.
    AvailabilityCheckFailed {
        /// Normalized failure message.
        error: String,
    },

    /// Clear `success`, `error` and `loading`.
    Reset,
}

transport_reducer!(
    /// Reducer for the auth slice.
    AuthReducer
);

impl<T: HttpTransport> Reducer for AuthReducer<T> {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = SocialEnvironment<T>;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let api = env.api.clone();

        match action {
            AuthAction::Signup { request } => {
                state.begin();
                state.success = false;
                smallvec![request_effect! {
                    call: api.signup(&request),
                    on_success: |user| AuthAction::SignupSucceeded { user },
                    on_error: |e| AuthAction::SignupFailed { error: error_message(&e) }
                }]
            },
            AuthAction::SignupSucceeded { user } => {
                tracing::info!(user_id = %user.id, "Account created");
                state.loading = false;
                state.success = true;
                smallvec![Effect::None]
            },
            AuthAction::SignupFailed { error } => {
                state.fail(error);
                state.success = false;
                smallvec![Effect::None]
            },

            AuthAction::Login { request } => {
                state.begin();
                smallvec![request_effect! {
                    call: api.login(&request),
                    on_success: |response| AuthAction::LoginSucceeded {
                        user: response.user,
                        access_token: response.access_token,
                    },
                    on_error: |e| AuthAction::LoginFailed { error: error_message(&e) }
                }]
            },
            AuthAction::LoginSucceeded { user, access_token } => {
                state.loading = false;
                state.user = Some(user);
                state.access_token = Some(access_token);
                smallvec![Effect::None]
            },
            AuthAction::LoginFailed { error } => {
                state.fail(error);
                state.user = None;
                smallvec![Effect::None]
            },

            AuthAction::Refresh => {
                state.begin();
                smallvec![request_effect! {
                    call: api.refresh(),
                    on_success: |response| AuthAction::RefreshSucceeded {
                        access_token: response.access_token,
                    },
                    on_error: |e| AuthAction::RefreshFailed { error: error_message(&e) }
                }]
            },
            AuthAction::RefreshSucceeded { access_token } => {
                state.loading = false;
                state.access_token = Some(access_token);
                smallvec![Effect::None]
            },
            AuthAction::RefreshFailed { error } => {
                state.fail(error);
                smallvec![Effect::None]
            },

            AuthAction::Logout => {
                state.sign_out();
                state.error = None;
                smallvec![async_effect! {
                    match api.logout().await {
                        Ok(()) => Some(AuthAction::LoggedOut),
                        Err(e) => Some(AuthAction::LogoutFailed { error: error_message(&e) }),
                    }
                }]
            },
            AuthAction::LoggedOut => {
                state.sign_out();
                smallvec![Effect::None]
            },
            AuthAction::LogoutFailed { error } => {
                tracing::warn!(%error, "Server logout failed; local session already cleared");
                state.sign_out();
                state.error = Some(error);
                smallvec![Effect::None]
            },

            AuthAction::LoadCurrentUser => {
                state.begin();
                smallvec![request_effect! {
                    call: api.me(),
                    on_success: |user| AuthAction::CurrentUserLoaded { user },
                    on_error: |e| AuthAction::LoadCurrentUserFailed { error: error_message(&e) }
                }]
            },
            AuthAction::CurrentUserLoaded { user } => {
                state.loading = false;
                state.user = Some(user);
                state.access_token = env.api.session().token();
                smallvec![Effect::None]
            },
            AuthAction::LoadCurrentUserFailed { error } => {
                state.fail(error);
                smallvec![Effect::None]
            },

            AuthAction::UpdateNickname { user_id, nickname } => {
                state.begin();
                smallvec![request_effect! {
                    call: api.update_nickname(user_id, &nickname),
                    on_success: |user| AuthAction::NicknameUpdated { user },
                    on_error: |e| AuthAction::UpdateNicknameFailed { error: error_message(&e) }
                }]
            },
            AuthAction::NicknameUpdated { user } => {
                state.loading = false;
                state.user = Some(user);
                smallvec![Effect::None]
            },
            AuthAction::UpdateNicknameFailed { error } => {
                state.fail(error);
                smallvec![Effect::None]
            },

            AuthAction::DeleteAccount => {
                state.begin();
                smallvec![request_effect! {
                    call: api.delete_me(),
                    on_success: |()| AuthAction::AccountDeleted,
                    on_error: |e| AuthAction::DeleteAccountFailed { error: error_message(&e) }
                }]
            },
            AuthAction::AccountDeleted => {
                state.sign_out();
                smallvec![notify(&env.notifier, Notice::success("Account deleted"))]
            },
            AuthAction::DeleteAccountFailed { error } => {
                state.fail(error);
                smallvec![notify(
                    &env.notifier,
                    Notice::error("Failed to delete account")
                )]
            },

            AuthAction::CheckEmail { email } => {
                state.email_taken = None;
                smallvec![request_effect! {
                    call: api.check_email(&email),
                    on_success: |taken| AuthAction::EmailChecked { taken },
                    on_error: |e| AuthAction::AvailabilityCheckFailed { error: error_message(&e) }
                }]
            },
            AuthAction::EmailChecked { taken } => {
                state.email_taken = Some(taken);
                smallvec![Effect::None]
            },
            AuthAction::CheckNickname { nickname } => {
                state.nickname_taken = None;
                smallvec![request_effect! {
                    call: api.check_nickname(&nickname),
                    on_success: |taken| AuthAction::NicknameChecked { taken },
                    on_error: |e| AuthAction::AvailabilityCheckFailed { error: error_message(&e) }
                }]
            },
            AuthAction::NicknameChecked { taken } => {
                state.nickname_taken = Some(taken);
                smallvec![Effect::None]
            },
            AuthAction::AvailabilityCheckFailed { error } => {
                state.error = Some(error);
                smallvec![Effect::None]
            },

            AuthAction::Reset => {
                state.success = false;
                state.error = None;
                state.loading = false;
                smallvec![Effect::None]
            },
        }
    }
}
