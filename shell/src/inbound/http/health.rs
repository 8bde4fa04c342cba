//! Liveness and readiness probes.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::info;

use crate::domain::SessionState;

/// Probe state shared with the server.
///
/// Readiness flips once the session store has settled after its startup
/// probe; liveness stays up until [`HealthState::mark_unhealthy`].
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of the startup session probe.
    ///
    /// Returns whether the shell is now ready.
    pub fn record_initialized(&self, state: &SessionState) -> bool {
        let settled = !state.is_loading();
        if settled {
            info!(status = state.status(), "session resolved; ready for traffic");
        }
        self.ready.store(settled, Ordering::Release);
        settled
    }

    /// Fail liveness so orchestrators drain the instance.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

fn probe_response(ok: bool) -> HttpResponse {
    let mut response = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// `GET /health/ready`
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_ready())
}

/// `GET /health/live`
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_alive())
}
