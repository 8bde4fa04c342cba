//! Server construction and adapter wiring.

mod config;

pub use config::ShellSettings;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use marketplace_shell::Trace;
use marketplace_shell::domain::SessionStore;
use marketplace_shell::inbound::http::configure;
use marketplace_shell::inbound::http::health::HealthState;
use marketplace_shell::inbound::http::state::HttpState;
use marketplace_shell::outbound::memory::{
    InMemoryAuthService, InMemoryObjectStorage, InMemoryProfileStore, seed_demo_accounts,
};

/// Build the session store over the in-memory adapters.
///
/// # Errors
/// Returns [`std::io::Error`] when the demo accounts cannot be seeded.
pub fn build_session_store(settings: &ShellSettings) -> std::io::Result<Arc<SessionStore>> {
    let auth = Arc::new(InMemoryAuthService::new());
    let profiles = Arc::new(InMemoryProfileStore::new());
    if settings.seed_demo_accounts() {
        seed_demo_accounts(&auth, &profiles).map_err(std::io::Error::other)?;
    }
    let storage = InMemoryObjectStorage::new(settings.storage_base_url());
    let store = SessionStore::new(auth, profiles)
        .with_object_storage(Arc::new(storage))
        .with_logout_policy(settings.logout_policy());
    Ok(Arc::new(store))
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure)
}

/// Resolve the startup session, start listening for auth changes and bind
/// the HTTP server.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub async fn create_server(
    store: Arc<SessionStore>,
    health_state: web::Data<HealthState>,
    settings: &ShellSettings,
) -> std::io::Result<Server> {
    let initial = store.initialize().await;
    store.subscribe_to_auth_changes();
    health_state.record_initialized(&initial);

    let http_state = web::Data::new(HttpState::new(store));
    let server_health_state = health_state.clone();
    let bind_addr = settings.bind_addr();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, status = initial.status(), "shell listening");
    Ok(server)
}
