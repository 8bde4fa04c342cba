//! Current session endpoint.
//!
//! ```text
//! GET /api/v1/session
//! ```

use actix_web::{get, web};
use serde::Serialize;

use crate::domain::{Identity, SessionState, is_active, menu_for, panel_title};

use super::state::HttpState;

/// Side menu link annotated for the view being shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

/// Snapshot of the session with the navigation chrome for its role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_title: Option<&'static str>,
    pub menu: Vec<MenuEntry>,
}

impl SessionView {
    /// Build the view for `state`, highlighting the entry for `current`.
    pub fn new(state: &SessionState, current: &str) -> Self {
        let identity = state.identity().cloned();
        let (panel_title, menu) = match &identity {
            Some(identity) => (
                Some(panel_title(identity.role)),
                menu_for(identity.role)
                    .iter()
                    .map(|item| MenuEntry {
                        label: item.label,
                        path: item.path,
                        active: is_active(item, current),
                    })
                    .collect(),
            ),
            None => (None, Vec::new()),
        };
        Self {
            status: state.status(),
            identity,
            panel_title,
            menu,
        }
    }
}

/// Who is signed in right now.
#[get("/session")]
pub async fn current_session(state: web::Data<HttpState>) -> web::Json<SessionView> {
    web::Json(SessionView::new(&state.session.snapshot(), ""))
}
