//! Domain primitives, the session store and the route guard.
//!
//! Purpose: hold every rule about who is signed in and what they may see,
//! independent of HTTP or any backend. Adapters reach the outside world
//! through the traits in [`ports`].
//!
//! Public surface:
//! - SessionStore: single authoritative session holder.
//! - decide / decide_for: pure route guard decision.
//! - navigate: route table lookup composed with the guard.
//! - menu_for: side menu entries per role.
//! - Error / ErrorCode: API error payload.

pub mod auth;
pub mod error;
pub mod identity;
pub mod navigation;
pub mod ports;
pub mod registration;
pub mod role;
pub mod route_guard;
pub mod routes;
pub mod session_store;
pub mod trace_id;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::identity::{Email, Identity, IdentityId, IdentityValidationError, Profile};
pub use self::navigation::{MenuItem, is_active, menu_for, panel_title};
pub use self::registration::{
    NIGERIAN_STATES, PASSWORD_MIN_LEN, PROFILE_PICTURE_FORMATS, PROFILE_PICTURE_MAX_BYTES,
    ProfilePicture, Registration, RegistrationForm, RegistrationValidationError, ServiceCategory,
};
pub use self::role::{ANONYMOUS_HOME, Role, RoleRequirement, UnknownRoleError};
pub use self::route_guard::{GuardDecision, LOGIN_PATH, decide, decide_for, home_path};
pub use self::routes::{
    Access, Navigation, ROUTES, RouteEntry, is_safe_return_path, login_location, navigate,
    resolve,
};
pub use self::session_store::{
    LogoutPolicy, RegistrationStep, SessionError, SessionState, SessionStore,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use marketplace_shell::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("sign in first"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
