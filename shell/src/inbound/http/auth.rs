//! Sign-in, sign-up and sign-out endpoints.
//!
//! ```text
//! POST /api/v1/auth/login {"email":"customer@test.com","password":"password","from":"/wallet"}
//! POST /api/v1/auth/register {"email":"…","firstName":"…",…,"acceptedTerms":true}
//! POST /api/v1/auth/logout
//! ```
//!
//! Each endpoint answers `303 See Other` pointing at the view to show next.

use actix_web::http::header;
use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::ports::AuthServiceError;
use crate::domain::{
    ANONYMOUS_HOME, ApiResult, Error, Identity, LoginCredentials, LoginValidationError,
    ProfilePicture, Registration, RegistrationForm, RegistrationValidationError, SessionError,
    is_safe_return_path,
};

use super::state::HttpState;

/// Body of `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Location the guard bounced the user away from.
    #[serde(default)]
    pub from: Option<String>,
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Picture attached to a sign-up.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Body of `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub form: RegistrationForm,
    #[serde(default)]
    pub profile_picture: Option<PictureUpload>,
}

fn see_other(location: &str, identity: Option<&Identity>) -> HttpResponse {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, location.to_owned()));
    match identity {
        Some(identity) => response.json(json!({ "identity": identity, "location": location })),
        None => response.json(json!({ "location": location })),
    }
}

/// Where to go after a successful sign-in.
fn post_login_location(from: Option<&str>, identity: &Identity) -> String {
    match from {
        Some(target) if is_safe_return_path(target) => target.to_owned(),
        _ => identity.role.home_path().to_owned(),
    }
}

/// Sign in and redirect to the page the user was bounced from, or their
/// dashboard.
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(&*payload).map_err(map_login_validation_error)?;
    let identity = state
        .session
        .login(&credentials)
        .await
        .map_err(map_session_error)?;
    let location = post_login_location(payload.from.as_deref(), &identity);
    info!(identity_id = %identity.id, %location, "signed in");
    Ok(see_other(&location, Some(&identity)))
}

/// Create an account and redirect to the new role's dashboard.
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        form,
        profile_picture,
    } = payload.into_inner();
    let mut registration =
        Registration::try_from_form(form).map_err(map_registration_validation_error)?;
    if let Some(upload) = profile_picture {
        let picture = ProfilePicture::new(upload.content_type, upload.bytes)
            .map_err(map_registration_validation_error)?;
        registration = registration.with_profile_picture(picture);
    }
    let identity = state
        .session
        .register(&registration)
        .await
        .map_err(map_session_error)?;
    Ok(see_other(identity.role.home_path(), Some(&identity)))
}

/// Sign out and redirect to the landing page.
#[post("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.session.logout().await.map_err(map_session_error)?;
    Ok(see_other(ANONYMOUS_HOME, None))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn map_registration_validation_error(err: RegistrationValidationError) -> Error {
    let field = match &err {
        RegistrationValidationError::MissingField { field } => *field,
        RegistrationValidationError::Email(_) => "email",
        RegistrationValidationError::UnknownState(_) => "state",
        RegistrationValidationError::PasswordTooShort { .. } => "password",
        RegistrationValidationError::PasswordMismatch => "confirmPassword",
        RegistrationValidationError::TermsNotAccepted => "acceptedTerms",
        RegistrationValidationError::NoServiceCategories => "serviceCategories",
        RegistrationValidationError::RoleNotRegistrable(_) => "role",
        RegistrationValidationError::PictureFormat
        | RegistrationValidationError::PictureTooLarge => "profilePicture",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

pub(crate) fn map_session_error(err: SessionError) -> Error {
    match err {
        SessionError::Credential(AuthServiceError::InvalidCredentials) => {
            Error::unauthorized(AuthServiceError::InvalidCredentials.to_string())
        }
        SessionError::Credential(err @ AuthServiceError::EmailTaken { .. }) => {
            Error::conflict(err.to_string()).with_details(json!({ "field": "email" }))
        }
        SessionError::Credential(err @ AuthServiceError::WeakPassword { .. }) => {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "password" }))
        }
        SessionError::Credential(AuthServiceError::Unavailable { .. })
        | SessionError::SignOut(_) => {
            Error::service_unavailable("The sign-in service is unavailable, try again later")
        }
        SessionError::ProfileFetch { .. } => {
            Error::unauthorized("Your account profile could not be loaded")
        }
        SessionError::PartialRegistration {
            identity_id, step, ..
        } => Error::conflict(format!(
            "Your account was created but its {step} could not be saved"
        ))
        .with_details(json!({ "identityId": identity_id, "step": step.to_string() })),
        SessionError::Superseded => {
            Error::conflict("A newer sign-in or sign-out replaced this request")
        }
    }
}
