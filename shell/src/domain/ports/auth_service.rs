//! Driven port for the hosted authentication service.
//!
//! The service is the sole arbiter of whether a session exists. The shell
//! only reads sessions, asks for sign-in/sign-up/sign-out, and listens for
//! the service's change notifications.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::domain::{Email, IdentityId, LoginCredentials};

use super::define_port_error;

define_port_error! {
    /// Errors raised by auth service adapters.
    pub enum AuthServiceError {
        /// Email/password pair was rejected.
        InvalidCredentials => "Invalid email or password",
        /// Another credential already uses the email.
        EmailTaken { email: String } => "An account with {email} already exists",
        /// The service's password policy rejected the password.
        WeakPassword { message: String } => "{message}",
        /// The service could not be reached or failed internally.
        Unavailable { message: String } => "auth service unavailable: {message}",
    }
}

/// Proof of an active login. Opaque beyond the identity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity_id: IdentityId,
    pub email: Email,
    pub issued_at: DateTime<Utc>,
}

/// Change notification pushed by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    /// Emitted on explicit sign-out and on session expiry.
    SignedOut,
}

/// Port for the external authentication service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Return the session persisted by the service, if any.
    async fn current_session(&self) -> Result<Option<Session>, AuthServiceError>;

    /// Subscribe to session change notifications.
    ///
    /// Dropping the receiver unregisters the subscription.
    fn session_events(&self) -> broadcast::Receiver<AuthEvent>;

    /// Verify credentials and open a session. Emits [`AuthEvent::SignedIn`].
    async fn sign_in_with_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Session, AuthServiceError>;

    /// Create a credential and open a session for it.
    ///
    /// Does not emit [`AuthEvent::SignedIn`]: the account has no profile yet,
    /// so the caller publishes the identity once registration completes.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Session, AuthServiceError>;

    /// Close the current session. Emits [`AuthEvent::SignedOut`].
    async fn sign_out(&self) -> Result<(), AuthServiceError>;
}
