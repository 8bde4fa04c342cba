//! Shell entry-point: loads settings, resolves the session and serves the
//! guarded routes.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use marketplace_shell::inbound::http::health::HealthState;
use server::{ShellSettings, build_session_store, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ShellSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let store = build_session_store(&settings)?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(store.clone(), health_state.clone(), &settings).await?;

    let result = server.await;
    health_state.mark_unhealthy();
    store.shutdown();
    result
}
