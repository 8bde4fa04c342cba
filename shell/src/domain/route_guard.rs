//! Route guard: the pure decision of whether a requested view may render.
//!
//! Navigating (issuing the redirect) is left to the adapter; this module
//! only computes the outcome so it can be tested without a router.

use super::{ANONYMOUS_HOME, Identity, RoleRequirement, SessionState};

/// Path of the sign-in screen.
pub const LOGIN_PATH: &str = "/auth/login";

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not known yet: show a neutral loading indicator.
    Loading,
    /// Nobody is signed in. `from` is the requested location so the login
    /// flow can return there afterwards.
    RedirectToLogin { from: String },
    /// Signed in with the wrong role: bounce to the user's own home.
    RedirectHome { to: &'static str },
    Render,
}

/// Role-appropriate home for the current identity.
///
/// # Examples
/// ```
/// use marketplace_shell::domain::home_path;
///
/// assert_eq!(home_path(None), "/");
/// ```
pub fn home_path(identity: Option<&Identity>) -> &'static str {
    identity.map_or(ANONYMOUS_HOME, |identity| identity.role.home_path())
}

/// Decide what to do with a request for `requested`.
///
/// Never redirects while `loading`, so a session probe still in flight
/// cannot flash the login screen.
pub fn decide(
    identity: Option<&Identity>,
    loading: bool,
    requested: &str,
    required: Option<RoleRequirement>,
) -> GuardDecision {
    if loading {
        return GuardDecision::Loading;
    }
    let Some(identity) = identity else {
        return GuardDecision::RedirectToLogin {
            from: requested.to_owned(),
        };
    };
    match required {
        Some(requirement) if !requirement.admits(identity.role) => GuardDecision::RedirectHome {
            to: home_path(Some(identity)),
        },
        _ => GuardDecision::Render,
    }
}

/// [`decide`] against a session store snapshot.
pub fn decide_for(
    state: &SessionState,
    requested: &str,
    required: Option<RoleRequirement>,
) -> GuardDecision {
    decide(state.identity(), state.is_loading(), requested, required)
}
