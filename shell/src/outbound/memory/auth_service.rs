//! In-process stand-in for the hosted authentication service.
//!
//! Holds credentials in memory and keeps a single current session, which is
//! what a browser-side auth client does for one local user.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthEvent, AuthService, AuthServiceError, Session};
use crate::domain::{Email, IdentityId, LoginCredentials, PASSWORD_MIN_LEN};

const EVENT_CAPACITY: usize = 16;

struct Account {
    id: IdentityId,
    password: Zeroizing<String>,
}

/// Auth service backed by a map of email to credential.
pub struct InMemoryAuthService {
    accounts: RwLock<HashMap<Email, Account>>,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
    available: AtomicBool,
}

impl Default for InMemoryAuthService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthService {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            events,
            available: AtomicBool::new(true),
        }
    }

    /// Register a credential under a known id without opening a session.
    pub fn insert_account(
        &self,
        id: IdentityId,
        email: Email,
        password: &str,
    ) -> Result<(), AuthServiceError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(&email) {
            return Err(AuthServiceError::email_taken(email.as_ref()));
        }
        accounts.insert(
            email,
            Account {
                id,
                password: Zeroizing::new(password.to_owned()),
            },
        );
        Ok(())
    }

    /// Drop the current session as if its token expired.
    pub fn expire_session(&self) {
        let expired = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if expired.is_some() {
            self.emit(AuthEvent::SignedOut);
        }
    }

    /// Toggle whether calls succeed; used to simulate an outage.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    fn ensure_available(&self) -> Result<(), AuthServiceError> {
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(AuthServiceError::unavailable("service is offline"))
        }
    }

    fn open_session(&self, id: IdentityId, email: Email) -> Session {
        let session = Session {
            identity_id: id,
            email,
            issued_at: Utc::now(),
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        session
    }

    fn emit(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            debug!("no auth event subscribers");
        }
    }
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    async fn current_session(&self) -> Result<Option<Session>, AuthServiceError> {
        self.ensure_available()?;
        Ok(self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn session_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Session, AuthServiceError> {
        self.ensure_available()?;
        let email = Email::new(credentials.email())
            .map_err(|_| AuthServiceError::invalid_credentials())?;
        let id = {
            let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
            match accounts.get(&email) {
                Some(account) if account.password.as_str() == credentials.password() => {
                    account.id.clone()
                }
                _ => return Err(AuthServiceError::invalid_credentials()),
            }
        };
        let session = self.open_session(id, email);
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &Email, password: &str) -> Result<Session, AuthServiceError> {
        self.ensure_available()?;
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AuthServiceError::weak_password(format!(
                "Password should be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        let id = IdentityId::random();
        self.insert_account(id.clone(), email.clone(), password)?;
        Ok(self.open_session(id, email.clone()))
    }

    async fn sign_out(&self) -> Result<(), AuthServiceError> {
        self.ensure_available()?;
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> InMemoryAuthService {
        let service = InMemoryAuthService::new();
        service
            .insert_account(
                IdentityId::random(),
                Email::new("customer@test.com").expect("email"),
                "password",
            )
            .expect("seed account");
        service
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("credential shape")
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_opens_session_and_notifies(service: InMemoryAuthService) {
        let mut events = service.session_events();
        let session = service
            .sign_in_with_password(&credentials("Customer@Test.com", "password"))
            .await
            .expect("sign in");
        assert_eq!(session.email.as_ref(), "customer@test.com");
        assert_eq!(
            service.current_session().await.expect("probe"),
            Some(session.clone())
        );
        assert_eq!(events.recv().await.expect("event"), AuthEvent::SignedIn(session));
    }

    #[rstest]
    #[case("customer@test.com", "wrong")]
    #[case("nobody@test.com", "password")]
    #[case("not-an-email", "password")]
    #[tokio::test]
    async fn rejects_bad_credentials(
        service: InMemoryAuthService,
        #[case] email: &str,
        #[case] password: &str,
    ) {
        let err = service
            .sign_in_with_password(&credentials(email, password))
            .await
            .expect_err("rejected");
        assert_eq!(err, AuthServiceError::InvalidCredentials);
        assert_eq!(service.current_session().await.expect("probe"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_opens_session_without_notifying(service: InMemoryAuthService) {
        let mut events = service.session_events();
        let email = Email::new("new@test.com").expect("email");
        let session = service.sign_up(&email, "secret1").await.expect("sign up");
        assert_eq!(session.email, email);
        assert!(events.try_recv().is_err());
        assert!(service.current_session().await.expect("probe").is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_rejects_duplicates_and_short_passwords(service: InMemoryAuthService) {
        let taken = Email::new("customer@test.com").expect("email");
        assert!(matches!(
            service.sign_up(&taken, "secret1").await,
            Err(AuthServiceError::EmailTaken { .. })
        ));
        let fresh = Email::new("fresh@test.com").expect("email");
        assert!(matches!(
            service.sign_up(&fresh, "abc").await,
            Err(AuthServiceError::WeakPassword { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn sign_out_and_expiry_notify(service: InMemoryAuthService) {
        let mut events = service.session_events();
        service
            .sign_in_with_password(&credentials("customer@test.com", "password"))
            .await
            .expect("sign in");
        service.sign_out().await.expect("sign out");
        assert!(matches!(events.recv().await, Ok(AuthEvent::SignedIn(_))));
        assert_eq!(events.recv().await.expect("event"), AuthEvent::SignedOut);

        service
            .sign_in_with_password(&credentials("customer@test.com", "password"))
            .await
            .expect("sign in");
        service.expire_session();
        assert!(matches!(events.recv().await, Ok(AuthEvent::SignedIn(_))));
        assert_eq!(events.recv().await.expect("event"), AuthEvent::SignedOut);
        assert_eq!(service.current_session().await.expect("probe"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn outage_fails_every_call(service: InMemoryAuthService) {
        service.set_available(false);
        assert!(matches!(
            service.current_session().await,
            Err(AuthServiceError::Unavailable { .. })
        ));
        assert!(matches!(
            service.sign_out().await,
            Err(AuthServiceError::Unavailable { .. })
        ));
    }
}
