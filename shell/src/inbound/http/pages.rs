//! Guarded page navigation.
//!
//! Every `GET` that is not an API or probe route lands here. The guard
//! decision becomes an HTTP answer: `200` with a view descriptor, `202`
//! while the session is still resolving, `303` for redirects and `404` for
//! unknown paths.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::domain::{ApiResult, Error, Navigation, RouteEntry, navigate};

use super::session::SessionView;
use super::state::HttpState;

/// Seconds a client should wait before retrying a loading view.
const LOADING_RETRY_AFTER_SECS: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewDescriptor {
    status: &'static str,
    path: &'static str,
    title: &'static str,
    session: SessionView,
}

fn render(entry: &'static RouteEntry, session: SessionView) -> HttpResponse {
    HttpResponse::Ok().json(ViewDescriptor {
        status: "render",
        path: entry.path,
        title: entry.title,
        session,
    })
}

/// Resolve the requested path against the current session.
pub async fn render_page(req: HttpRequest, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let path = req.path();
    let snapshot = state.session.snapshot();
    match navigate(path, &snapshot) {
        Navigation::Render(entry) => Ok(render(entry, SessionView::new(&snapshot, entry.path))),
        Navigation::Loading => Ok(HttpResponse::Accepted()
            .insert_header((header::RETRY_AFTER, LOADING_RETRY_AFTER_SECS.to_string()))
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(json!({ "status": "loading" }))),
        Navigation::Redirect { location } => {
            debug!(%path, %location, status = snapshot.status(), "navigation redirected");
            Ok(HttpResponse::SeeOther()
                .insert_header((header::LOCATION, location))
                .insert_header((header::CACHE_CONTROL, "no-store"))
                .finish())
        }
        Navigation::NotFound => Err(Error::not_found(format!("No page at {path}"))),
    }
}
