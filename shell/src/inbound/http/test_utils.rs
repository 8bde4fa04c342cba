//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::Trace;
use crate::domain::{LoginCredentials, SessionStore};
use crate::outbound::memory::{
    DEMO_PASSWORD, InMemoryAuthService, InMemoryObjectStorage, InMemoryProfileStore,
    seed_demo_accounts,
};

use super::configure;
use super::health::HealthState;
use super::state::HttpState;

/// Session store wired to seeded in-memory adapters.
pub(crate) struct TestShell {
    pub auth: Arc<InMemoryAuthService>,
    pub profiles: Arc<InMemoryProfileStore>,
    pub store: Arc<SessionStore>,
}

impl TestShell {
    /// Demo accounts seeded; `initialize` not yet called.
    pub fn seeded_uninitialized() -> Self {
        let auth = Arc::new(InMemoryAuthService::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        seed_demo_accounts(&auth, &profiles).expect("seed demo accounts");
        let store = SessionStore::new(auth.clone(), profiles.clone())
            .with_object_storage(Arc::new(InMemoryObjectStorage::new("http://localhost/storage")));
        Self {
            auth,
            profiles,
            store: Arc::new(store),
        }
    }

    /// Seeded and initialised signed out.
    pub async fn seeded() -> Self {
        let shell = Self::seeded_uninitialized();
        shell.store.initialize().await;
        shell
    }

    /// Seeded and signed in as the demo account `email`.
    pub async fn signed_in(email: &str) -> Self {
        let shell = Self::seeded().await;
        let credentials =
            LoginCredentials::try_from_parts(email, DEMO_PASSWORD).expect("credentials");
        shell.store.login(&credentials).await.expect("demo login");
        shell
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let health = HealthState::new();
        health.record_initialized(&self.store.snapshot());
        App::new()
            .app_data(web::Data::new(HttpState::new(self.store.clone())))
            .app_data(web::Data::new(health))
            .wrap(Trace)
            .configure(configure)
    }
}
