//! Sign-up input: service categories, the profile picture, and the
//! validated registration request.
//!
//! Everything here is checked before the session store makes its first
//! collaborator call, so a rejected form never creates a credential.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Email, IdentityValidationError, Profile, Role};

/// Minimum password length accepted at sign-up.
pub const PASSWORD_MIN_LEN: usize = 6;
/// Largest accepted profile picture, in bytes.
pub const PROFILE_PICTURE_MAX_BYTES: usize = 5 * 1024 * 1024;
/// Content types accepted for profile pictures.
pub const PROFILE_PICTURE_FORMATS: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// States a profile may be located in.
pub const NIGERIAN_STATES: [&str; 37] = [
    "Abia", "Adamawa", "Akwa Ibom", "Anambra", "Bauchi", "Bayelsa", "Benue", "Borno",
    "Cross River", "Delta", "Ebonyi", "Edo", "Ekiti", "Enugu", "Gombe", "Imo", "Jigawa",
    "Kaduna", "Kano", "Katsina", "Kebbi", "Kogi", "Kwara", "Lagos", "Nasarawa", "Niger", "Ogun",
    "Ondo", "Osun", "Oyo", "Plateau", "Rivers", "Sokoto", "Taraba", "Yobe", "Zamfara", "FCT",
];

/// Trades a service provider can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Plumbing,
    Electrical,
    Carpentry,
    Painting,
    Hvac,
    ApplianceRepair,
    GeneralMaintenance,
    Landscaping,
    Roofing,
    Flooring,
    Tiling,
    Cleaning,
    GeneratorRepair,
    SecuritySystems,
    Masonry,
    Welding,
    PestControl,
}

impl ServiceCategory {
    /// Label shown in the category selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::Plumbing => "Plumbing",
            Self::Electrical => "Electrical",
            Self::Carpentry => "Carpentry",
            Self::Painting => "Painting",
            Self::Hvac => "HVAC (Heating & Cooling)",
            Self::ApplianceRepair => "Appliance Repair",
            Self::GeneralMaintenance => "General Maintenance",
            Self::Landscaping => "Landscaping & Gardening",
            Self::Roofing => "Roofing",
            Self::Flooring => "Flooring",
            Self::Tiling => "Tiling",
            Self::Cleaning => "Cleaning",
            Self::GeneratorRepair => "Generator Repair",
            Self::SecuritySystems => "Security Systems",
            Self::Masonry => "Masonry & Brickwork",
            Self::Welding => "Welding & Metalwork",
            Self::PestControl => "Pest Control",
        }
    }
}

/// Reasons a sign-up form is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    #[error(transparent)]
    Email(#[from] IdentityValidationError),
    #[error("unknown state: {0}")]
    UnknownState(String),
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("You must agree to the terms and conditions")]
    TermsNotAccepted,
    #[error("Please select at least one service category")]
    NoServiceCategories,
    #[error("{0} accounts cannot be self-registered")]
    RoleNotRegistrable(Role),
    #[error("Please select a valid image file (JPEG, PNG, or GIF)")]
    PictureFormat,
    #[error("File size must be less than 5MB")]
    PictureTooLarge,
}

/// Image attached to a sign-up, validated for format and size.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfilePicture {
    content_type: String,
    bytes: Vec<u8>,
}

impl ProfilePicture {
    /// Validate the content type and size of an uploaded picture.
    pub fn new(
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, RegistrationValidationError> {
        let content_type = content_type.into();
        if !PROFILE_PICTURE_FORMATS.contains(&content_type.as_str()) {
            return Err(RegistrationValidationError::PictureFormat);
        }
        if bytes.len() > PROFILE_PICTURE_MAX_BYTES {
            return Err(RegistrationValidationError::PictureTooLarge);
        }
        Ok(Self {
            content_type,
            bytes,
        })
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// File extension matching the content type.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            _ => "jpg",
        }
    }
}

impl fmt::Debug for ProfilePicture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilePicture")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Raw sign-up form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub state: String,
    pub lga: String,
    #[serde(default)]
    pub address: Option<String>,
    pub role: Option<Role>,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub service_categories: Vec<ServiceCategory>,
    #[serde(default)]
    pub accepted_terms: bool,
}

/// Validated sign-up request handed to the session store.
#[derive(Debug, Clone)]
pub struct Registration {
    email: Email,
    role: Role,
    profile: Profile,
    password: Zeroizing<String>,
    service_categories: Vec<ServiceCategory>,
    profile_picture: Option<ProfilePicture>,
}

fn required(field: &'static str, value: &str) -> Result<String, RegistrationValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistrationValidationError::MissingField { field });
    }
    Ok(trimmed.to_owned())
}

impl Registration {
    /// Validate a submitted form.
    ///
    /// The role defaults to `customer` when omitted. Service categories are
    /// dropped for customers.
    pub fn try_from_form(form: RegistrationForm) -> Result<Self, RegistrationValidationError> {
        let role = form.role.unwrap_or(Role::Customer);
        if !role.is_self_registrable() {
            return Err(RegistrationValidationError::RoleNotRegistrable(role));
        }
        let first_name = required("first name", &form.first_name)?;
        let last_name = required("last name", &form.last_name)?;
        let email = Email::new(&form.email)?;
        let phone = required("phone", &form.phone)?;
        let state = required("state", &form.state)?;
        if !NIGERIAN_STATES.contains(&state.as_str()) {
            return Err(RegistrationValidationError::UnknownState(state));
        }
        let lga = required("LGA", &form.lga)?;

        if form.password != form.confirm_password {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        if form.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(RegistrationValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }

        let mut service_categories = Vec::new();
        if role == Role::ServiceProvider {
            if form.service_categories.is_empty() {
                return Err(RegistrationValidationError::NoServiceCategories);
            }
            for category in form.service_categories {
                if !service_categories.contains(&category) {
                    service_categories.push(category);
                }
            }
        }

        if !form.accepted_terms {
            return Err(RegistrationValidationError::TermsNotAccepted);
        }

        let address = form
            .address
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            email,
            role,
            profile: Profile {
                first_name,
                last_name,
                phone,
                state,
                lga,
                address,
                profile_image: None,
            },
            password: Zeroizing::new(form.password),
            service_categories,
            profile_picture: None,
        })
    }

    /// Attach an already validated profile picture.
    #[must_use]
    pub fn with_profile_picture(mut self, picture: ProfilePicture) -> Self {
        self.profile_picture = Some(picture);
        self
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn service_categories(&self) -> &[ServiceCategory] {
        &self.service_categories
    }

    pub fn profile_picture(&self) -> Option<&ProfilePicture> {
        self.profile_picture.as_ref()
    }
}
