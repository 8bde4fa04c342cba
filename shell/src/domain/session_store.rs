//! Process-wide holder of "who is signed in right now".
//!
//! The store is a read-through cache over the auth service: it never
//! persists an identity itself. State is published on a `watch` channel so
//! the route guard and any screen can observe it without reaching for a
//! global.
//!
//! Every transition enters [`SessionState::Loading`] before it settles.
//! Each transition takes a generation number when it starts; a result is
//! only published if no later transition has started since, so a slow
//! profile fetch for an old sign-in can never overwrite a newer sign-out.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::ports::{
    AuthEvent, AuthService, AuthServiceError, ObjectStorage, ProfileStore, ProfileStoreError,
    ServiceProviderRecord, Session,
};
use super::{Identity, IdentityId, LoginCredentials, Registration, Role};

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// `initialize` has not run yet.
    Uninitialized,
    /// An asynchronous resolution is in flight.
    Loading,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    /// Whether the current identity is not yet known.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Wire label used by adapters.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Uninitialized | Self::Loading => "loading",
            Self::Authenticated(_) => "authenticated",
            Self::Anonymous => "anonymous",
        }
    }
}

/// What `logout` does when the remote sign-out call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogoutPolicy {
    /// Publish `Anonymous` regardless of the remote outcome.
    #[default]
    ClearLocally,
    /// Restore the previous state and report the failure.
    RetainOnRemoteFailure,
}

/// Registration step that failed after the credential was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    Profile,
    ServiceProviderRecord,
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile => f.write_str("profile"),
            Self::ServiceProviderRecord => f.write_str("service provider record"),
        }
    }
}

/// Failures surfaced by the session store, normalised from the ports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Sign-in or sign-up was rejected; the message is user-facing.
    #[error(transparent)]
    Credential(AuthServiceError),
    /// The profile for a valid session could not be resolved.
    #[error("could not load the profile for this account: {message}")]
    ProfileFetch { message: String },
    /// The credential exists but a later registration step failed.
    #[error("account {identity_id} was created but its {step} could not be saved: {source}")]
    PartialRegistration {
        identity_id: IdentityId,
        step: RegistrationStep,
        source: ProfileStoreError,
    },
    /// The remote sign-out failed and the session was kept.
    #[error("sign-out failed: {0}")]
    SignOut(AuthServiceError),
    /// A later auth transition replaced this result before it was published.
    #[error("a newer sign-in or sign-out superseded this request")]
    Superseded,
}

impl SessionError {
    fn profile_fetch(message: impl Into<String>) -> Self {
        Self::ProfileFetch {
            message: message.into(),
        }
    }
}

/// Single authoritative session holder.
pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    profiles: Arc<dyn ProfileStore>,
    storage: Option<Arc<dyn ObjectStorage>>,
    logout_policy: LogoutPolicy,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
    /// Generation of the login or registration in flight, 0 when none.
    credential_generation: AtomicU64,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    /// Create a store in the `Uninitialized` state.
    pub fn new(auth: Arc<dyn AuthService>, profiles: Arc<dyn ProfileStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            auth,
            profiles,
            storage: None,
            logout_policy: LogoutPolicy::default(),
            state,
            generation: AtomicU64::new(0),
            credential_generation: AtomicU64::new(0),
            listener: Mutex::new(None),
        }
    }

    /// Attach object storage for profile pictures. Without it pictures are
    /// skipped at registration.
    #[must_use]
    pub fn with_object_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn with_logout_policy(mut self, policy: LogoutPolicy) -> Self {
        self.logout_policy = policy;
        self
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Probe the auth service for an existing session and publish the result.
    ///
    /// Always settles: any failure publishes `Anonymous` after logging it.
    pub async fn initialize(&self) -> SessionState {
        let generation = self.begin();
        let next = match self.auth.current_session().await {
            Ok(None) => SessionState::Anonymous,
            Ok(Some(session)) => self.resolve_or_anonymous(&session).await,
            Err(err) => {
                warn!(error = %err, "session probe failed; continuing signed out");
                SessionState::Anonymous
            }
        };
        self.settle(generation, next);
        self.snapshot()
    }

    /// Start listening for auth service notifications.
    ///
    /// Replaces any previous listener. The listener stops when the store is
    /// dropped or [`SessionStore::shutdown`] is called. Must be called from
    /// within a Tokio runtime.
    pub fn subscribe_to_auth_changes(self: &Arc<Self>) {
        let events = self.auth.session_events();
        let handle = tokio::spawn(listen(Arc::downgrade(self), events));
        let previous = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stop listening for auth service notifications.
    pub fn shutdown(&self) {
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    /// Sign in with email and password.
    ///
    /// On failure the store settles `Anonymous`; a previous identity is not
    /// kept.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, SessionError> {
        let generation = self.begin_credential_flow();
        let session = match self.auth.sign_in_with_password(credentials).await {
            Ok(session) => session,
            Err(err) => {
                debug!(error = %err, "sign-in rejected");
                self.settle(generation, SessionState::Anonymous);
                return Err(SessionError::Credential(err));
            }
        };

        match self.resolve(&session).await {
            Ok(identity) => self.publish_identity(generation, identity),
            Err(err) => {
                warn!(identity_id = %session.identity_id, error = %err, "signed in without a usable profile");
                self.settle(generation, SessionState::Anonymous);
                Err(err)
            }
        }
    }

    /// Create an account: credential, optional picture, profile, and the
    /// service provider record when the role needs one.
    pub async fn register(&self, registration: &Registration) -> Result<Identity, SessionError> {
        let generation = self.begin_credential_flow();
        let session = match self
            .auth
            .sign_up(registration.email(), registration.password())
            .await
        {
            Ok(session) => session,
            Err(err) => {
                debug!(error = %err, "sign-up rejected");
                self.settle(generation, SessionState::Anonymous);
                return Err(SessionError::Credential(err));
            }
        };

        let mut profile = registration.profile().clone();
        profile.profile_image = self.upload_picture(&session.identity_id, registration).await;
        let identity = Identity {
            id: session.identity_id.clone(),
            email: registration.email().clone(),
            role: registration.role(),
            is_verified: false,
            profile,
            created_at: Utc::now(),
        };

        if let Err(err) = self.profiles.create_profile(&identity).await {
            return Err(self
                .abandon_registration(generation, identity.id, RegistrationStep::Profile, err)
                .await);
        }

        if identity.role == Role::ServiceProvider {
            let record = ServiceProviderRecord::new(registration.service_categories().to_vec());
            if let Err(err) = self
                .profiles
                .create_service_provider_record(&identity.id, &record)
                .await
            {
                return Err(self
                    .abandon_registration(
                        generation,
                        identity.id,
                        RegistrationStep::ServiceProviderRecord,
                        err,
                    )
                    .await);
            }
        }

        info!(identity_id = %identity.id, role = %identity.role, "account registered");
        self.publish_identity(generation, identity)
    }

    /// Sign out.
    ///
    /// Under [`LogoutPolicy::ClearLocally`] this always ends `Anonymous`,
    /// logging a failed remote call. Under
    /// [`LogoutPolicy::RetainOnRemoteFailure`] a failed remote call restores
    /// the previous state and is returned.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let previous = self.snapshot();
        let generation = self.begin();
        match self.auth.sign_out().await {
            Ok(()) => {
                self.settle(generation, SessionState::Anonymous);
                Ok(())
            }
            Err(err) => match self.logout_policy {
                LogoutPolicy::ClearLocally => {
                    warn!(error = %err, "remote sign-out failed; clearing local session anyway");
                    self.settle(generation, SessionState::Anonymous);
                    Ok(())
                }
                LogoutPolicy::RetainOnRemoteFailure => {
                    warn!(error = %err, "remote sign-out failed; keeping session");
                    self.settle(generation, previous);
                    Err(SessionError::SignOut(err))
                }
            },
        }
    }

    /// Apply one auth service notification.
    async fn apply(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                if self.is_current(&session.identity_id) {
                    debug!(identity_id = %session.identity_id, "auth event for current identity ignored");
                    return;
                }
                if self.credential_flow_in_flight() {
                    debug!(identity_id = %session.identity_id, "auth event left to the login in flight");
                    return;
                }
                let generation = self.begin();
                let next = self.resolve_or_anonymous(&session).await;
                self.settle(generation, next);
            }
            AuthEvent::SignedOut => {
                if matches!(*self.state.borrow(), SessionState::Anonymous) {
                    return;
                }
                let generation = self.begin();
                self.settle(generation, SessionState::Anonymous);
            }
        }
    }

    /// Re-read the session after missing notifications.
    async fn resync(&self) {
        let generation = self.begin();
        let next = match self.auth.current_session().await {
            Ok(Some(session)) => self.resolve_or_anonymous(&session).await,
            Ok(None) => SessionState::Anonymous,
            Err(err) => {
                warn!(error = %err, "session resync failed; continuing signed out");
                SessionState::Anonymous
            }
        };
        self.settle(generation, next);
    }

    fn is_current(&self, id: &IdentityId) -> bool {
        self.state
            .borrow()
            .identity()
            .is_some_and(|identity| &identity.id == id)
    }

    /// Enter `Loading` and claim a new generation.
    fn begin(&self) -> u64 {
        self.begin_transition(false)
    }

    /// [`SessionStore::begin`] for a login or registration, which publishes
    /// its own result. Sign-in events raised by that call are not re-resolved
    /// by the listener.
    fn begin_credential_flow(&self) -> u64 {
        self.begin_transition(true)
    }

    fn begin_transition(&self, credential_flow: bool) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            if credential_flow {
                self.credential_generation.store(generation, Ordering::Release);
            }
            *state = SessionState::Loading;
        });
        generation
    }

    /// Whether a login or registration is the newest transition and has not
    /// settled yet.
    ///
    /// Both counters only change under the state lock, so they are read
    /// under it too.
    fn credential_flow_in_flight(&self) -> bool {
        let _state = self.state.borrow();
        self.credential_generation.load(Ordering::Acquire)
            == self.generation.load(Ordering::Acquire)
    }

    /// Publish `next` unless a newer generation has started.
    fn settle(&self, generation: u64, next: SessionState) -> bool {
        let mut next = Some(next);
        let published = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::Acquire) != generation {
                return false;
            }
            if let Some(value) = next.take() {
                *state = value;
            }
            self.credential_generation.store(0, Ordering::Release);
            true
        });
        if !published {
            debug!(generation, "stale session result discarded");
        }
        published
    }

    fn publish_identity(&self, generation: u64, identity: Identity) -> Result<Identity, SessionError> {
        if self.settle(generation, SessionState::Authenticated(identity.clone())) {
            Ok(identity)
        } else {
            Err(SessionError::Superseded)
        }
    }

    async fn resolve(&self, session: &Session) -> Result<Identity, SessionError> {
        let identity = self
            .profiles
            .get_profile(&session.identity_id)
            .await
            .map_err(|err| SessionError::profile_fetch(err.to_string()))?
            .ok_or_else(|| {
                SessionError::profile_fetch(format!("no profile for {}", session.identity_id))
            })?;
        if identity.id != session.identity_id {
            return Err(SessionError::profile_fetch(format!(
                "profile {} returned for session {}",
                identity.id, session.identity_id
            )));
        }
        Ok(identity)
    }

    async fn resolve_or_anonymous(&self, session: &Session) -> SessionState {
        match self.resolve(session).await {
            Ok(identity) => SessionState::Authenticated(identity),
            Err(err) => {
                warn!(identity_id = %session.identity_id, error = %err, "profile resolution failed; treating as signed out");
                SessionState::Anonymous
            }
        }
    }

    async fn upload_picture(&self, id: &IdentityId, registration: &Registration) -> Option<String> {
        let picture = registration.profile_picture()?;
        let Some(storage) = self.storage.as_ref() else {
            debug!(identity_id = %id, "no object storage configured; skipping profile picture");
            return None;
        };
        let key = format!("profile-images/{id}.{}", picture.extension());
        match storage
            .upload(&key, picture.content_type(), picture.bytes())
            .await
        {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(identity_id = %id, error = %err, "profile picture upload failed; continuing without it");
                None
            }
        }
    }

    async fn abandon_registration(
        &self,
        generation: u64,
        identity_id: IdentityId,
        step: RegistrationStep,
        source: ProfileStoreError,
    ) -> SessionError {
        error!(identity_id = %identity_id, %step, error = %source, "registration left a credential without a complete profile");
        if let Err(err) = self.auth.sign_out().await {
            warn!(identity_id = %identity_id, error = %err, "could not close the half-registered session");
        }
        self.settle(generation, SessionState::Anonymous);
        SessionError::PartialRegistration {
            identity_id,
            step,
            source,
        }
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        let handle = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

async fn listen(store: Weak<SessionStore>, mut events: broadcast::Receiver<AuthEvent>) {
    loop {
        let received = events.recv().await;
        let Some(store) = store.upgrade() else {
            return;
        };
        match received {
            Ok(event) => store.apply(event).await,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "missed auth events; re-reading session");
                store.resync().await;
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("auth event stream closed");
                return;
            }
        }
    }
}
