//! The signed-in identity as the shell knows it.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// Validation errors for identity primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    #[error("identity id must not be empty")]
    EmptyId,
    #[error("identity id must be a valid UUID")]
    InvalidId,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email address is not valid")]
    InvalidEmail,
}

/// Stable identifier assigned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityId(Uuid, String);

impl IdentityId {
    /// Validate and construct an [`IdentityId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`IdentityId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, IdentityValidationError> {
        if id.is_empty() {
            return Err(IdentityValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(IdentityValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| IdentityValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for IdentityId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<IdentityId> for String {
    fn from(value: IdentityId) -> Self {
        let IdentityId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for IdentityId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is the auth service's concern.
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address, trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use marketplace_shell::domain::Email;
    ///
    /// let email = Email::new("  Customer@Test.com ").expect("valid email");
    /// assert_eq!(email.as_ref(), "customer@test.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(IdentityValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Descriptive profile attributes. No invariants beyond presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub state: String,
    pub lga: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl Profile {
    /// "First Last" as shown in the sidebar header.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Authenticated user: the profile record resolved for a session.
///
/// `is_verified` is administratively controlled and does not gate routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: IdentityId,
    pub email: Email,
    pub role: Role,
    pub is_verified: bool,
    #[serde(flatten)]
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}
