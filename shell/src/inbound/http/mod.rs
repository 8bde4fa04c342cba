//! HTTP inbound adapter.
//!
//! Turns guard decisions into redirects and exposes the session operations
//! as JSON endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod pages;
pub mod session;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;

use actix_web::web;

use self::auth::{login, logout, register};
use self::health::{live, ready};
use self::pages::render_page;
use self::session::current_session;

/// Largest accepted JSON body; sign-ups may carry a picture as a byte array.
pub const JSON_BODY_LIMIT: usize = 24 * 1024 * 1024;

/// Register every shell route.
///
/// Expects `web::Data<HttpState>` and `web::Data<HealthState>` in app data.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use marketplace_shell::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().limit(JSON_BODY_LIMIT))
            .service(login)
            .service(register)
            .service(logout)
            .service(current_session),
    )
    .service(ready)
    .service(live)
    .route("/{tail:.*}", web::get().to(render_page));
}
