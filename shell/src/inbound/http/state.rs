//! Shared HTTP adapter state.

use std::sync::Arc;

use crate::domain::SessionStore;

/// Dependencies handed to handlers through `web::Data`.
#[derive(Clone)]
pub struct HttpState {
    pub session: Arc<SessionStore>,
}

impl HttpState {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }
}
