//! The navigable surface of the marketplace and how each path is gated.
//!
//! [`navigate`] composes the route lookup with the guard decision; adapters
//! turn the resulting [`Navigation`] into a rendered view or a redirect.

use serde::Serialize;
use url::form_urlencoded;

use super::route_guard::{GuardDecision, LOGIN_PATH, decide_for, home_path};
use super::{Role, RoleRequirement, SessionState};

/// Prefix kept for links minted before providers were renamed.
const LEGACY_PROVIDER_PREFIX: &str = "/handyman/";
const PROVIDER_PREFIX: &str = "/service-provider/";

/// How a route is gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any signed-in role.
    Authenticated,
    Role(RoleRequirement),
    /// Redirect to the caller's own dashboard.
    RoleHome,
}

/// One navigable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub path: &'static str,
    pub title: &'static str,
    #[serde(skip)]
    pub access: Access,
}

const fn public(path: &'static str, title: &'static str) -> RouteEntry {
    RouteEntry {
        path,
        title,
        access: Access::Public,
    }
}

const fn signed_in(path: &'static str, title: &'static str) -> RouteEntry {
    RouteEntry {
        path,
        title,
        access: Access::Authenticated,
    }
}

const fn exactly(role: Role, path: &'static str, title: &'static str) -> RouteEntry {
    RouteEntry {
        path,
        title,
        access: Access::Role(RoleRequirement::Exactly(role)),
    }
}

const fn admin(path: &'static str, title: &'static str) -> RouteEntry {
    RouteEntry {
        path,
        title,
        access: Access::Role(RoleRequirement::AdminTier),
    }
}

/// Every route the shell serves.
pub const ROUTES: &[RouteEntry] = &[
    public("/", "Home"),
    public(LOGIN_PATH, "Sign In"),
    public("/auth/register", "Create Account"),
    public("/search", "Find Services"),
    signed_in("/messages", "Messages"),
    signed_in("/wallet", "Wallet"),
    signed_in("/profile", "Profile Settings"),
    exactly(Role::Customer, "/customer/dashboard", "Customer Dashboard"),
    exactly(Role::Customer, "/customer/search", "Find Services"),
    exactly(Role::Customer, "/customer/bookings", "My Bookings"),
    exactly(Role::Customer, "/customer/reviews", "My Reviews"),
    exactly(Role::ServiceProvider, "/service-provider/dashboard", "Service Provider Dashboard"),
    exactly(Role::ServiceProvider, "/service-provider/jobs", "My Jobs"),
    exactly(Role::ServiceProvider, "/service-provider/profile", "Profile Management"),
    exactly(Role::ServiceProvider, "/service-provider/portfolio", "Portfolio"),
    exactly(Role::ServiceProvider, "/service-provider/earnings", "Earnings"),
    exactly(Role::ServiceProvider, "/service-provider/reviews", "Customer Reviews"),
    admin("/admin/dashboard", "Admin Dashboard"),
    admin("/admin/users", "User Management"),
    admin("/admin/bookings", "Booking Management"),
    admin("/admin/analytics", "Analytics & Reports"),
    admin("/admin/payments", "Payment Management"),
    admin("/admin/disputes", "Dispute Resolution"),
    admin("/admin/settings", "Platform Settings"),
    RouteEntry {
        path: "/dashboard",
        title: "Dashboard",
        access: Access::RoleHome,
    },
];

/// Find the entry for `path`.
///
/// A trailing slash is ignored and legacy `/handyman/...` paths resolve to
/// their `/service-provider/...` entries.
pub fn resolve(path: &str) -> Option<&'static RouteEntry> {
    let trimmed = match path.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => path,
    };
    let canonical = match trimmed.strip_prefix(LEGACY_PROVIDER_PREFIX) {
        Some(rest) => format!("{PROVIDER_PREFIX}{rest}"),
        None => trimmed.to_owned(),
    };
    ROUTES.iter().find(|entry| entry.path == canonical)
}

/// Result of navigating to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(&'static RouteEntry),
    Loading,
    /// Replace the current location with `location`.
    Redirect { location: String },
    NotFound,
}

/// Location of the login screen carrying the path to return to.
///
/// `from` is form-encoded, so paths holding `&`, `#` or `%` survive the
/// round trip.
///
/// # Examples
/// ```
/// use marketplace_shell::domain::login_location;
///
/// assert_eq!(login_location("/profile"), "/auth/login?from=%2Fprofile");
/// ```
pub fn login_location(from: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("from", from)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// Whether `target` is a local path that is safe to redirect to after login.
///
/// Control characters are refused outright: browsers drop tabs and line
/// breaks while parsing a `Location`, which can turn `/\t/host` into the
/// network path `//host`.
pub fn is_safe_return_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(|c| c.is_control())
}

/// Resolve `path` and evaluate the guard against `state`.
pub fn navigate(path: &str, state: &SessionState) -> Navigation {
    let Some(entry) = resolve(path) else {
        return Navigation::NotFound;
    };
    let required = match entry.access {
        Access::Public => return Navigation::Render(entry),
        Access::RoleHome => return navigate_home(state),
        Access::Authenticated => None,
        Access::Role(requirement) => Some(requirement),
    };
    match decide_for(state, path, required) {
        GuardDecision::Loading => Navigation::Loading,
        GuardDecision::RedirectToLogin { from } => Navigation::Redirect {
            location: login_location(&from),
        },
        GuardDecision::RedirectHome { to } => Navigation::Redirect {
            location: to.to_owned(),
        },
        GuardDecision::Render => Navigation::Render(entry),
    }
}

fn navigate_home(state: &SessionState) -> Navigation {
    if state.is_loading() {
        return Navigation::Loading;
    }
    let location = match state.identity() {
        Some(identity) => home_path(Some(identity)),
        None => LOGIN_PATH,
    };
    Navigation::Redirect {
        location: location.to_owned(),
    }
}
