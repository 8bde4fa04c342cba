//! Driven port for the hosted profile tables.
//!
//! Adapters normalise stored role strings (including the legacy `handyman`
//! spelling) into [`crate::domain::Role`] before returning an identity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Identity, IdentityId, ServiceCategory};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile store adapters.
    pub enum ProfileStoreError {
        /// A row with the same key already exists.
        ConstraintViolation { message: String } => "profile constraint violated: {message}",
        /// A stored row could not be mapped onto the domain model.
        Corrupt { message: String } => "stored profile is invalid: {message}",
        /// The store could not be reached or failed internally.
        Unavailable { message: String } => "profile store unavailable: {message}",
    }
}

/// Secondary row created for service providers at sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderRecord {
    pub service_categories: Vec<ServiceCategory>,
    pub experience_years: u32,
    pub total_jobs: u32,
}

impl ServiceProviderRecord {
    /// Fresh record for a newly registered provider.
    pub fn new(service_categories: Vec<ServiceCategory>) -> Self {
        Self {
            service_categories,
            experience_years: 0,
            total_jobs: 0,
        }
    }
}

/// Port for profile persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile for an identity.
    async fn get_profile(&self, id: &IdentityId) -> Result<Option<Identity>, ProfileStoreError>;

    /// Insert a profile. Fails with `ConstraintViolation` if the id exists.
    async fn create_profile(&self, identity: &Identity) -> Result<(), ProfileStoreError>;

    /// Insert the provider-specific row for an identity.
    async fn create_service_provider_record(
        &self,
        id: &IdentityId,
        record: &ServiceProviderRecord,
    ) -> Result<(), ProfileStoreError>;
}
