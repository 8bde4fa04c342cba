//! In-process profile tables.
//!
//! Rows keep the role as the raw stored string so legacy spellings survive
//! until they are read back through [`ProfileStore::get_profile`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{ProfileStore, ProfileStoreError, ServiceProviderRecord};
use crate::domain::{Email, Identity, IdentityId, Profile, Role};

/// Profile row as the hosted table stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow {
    pub id: IdentityId,
    pub email: Email,
    pub role: String,
    pub is_verified: bool,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for ProfileRow {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role.as_str().to_owned(),
            is_verified: identity.is_verified,
            profile: identity.profile.clone(),
            created_at: identity.created_at,
        }
    }
}

impl TryFrom<ProfileRow> for Identity {
    type Error = ProfileStoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|err| ProfileStoreError::corrupt(format!("profile {}: {err}", row.id)))?;
        Ok(Self {
            id: row.id,
            email: row.email,
            role,
            is_verified: row.is_verified,
            profile: row.profile,
            created_at: row.created_at,
        })
    }
}

/// Profile store backed by two maps keyed by identity id.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<IdentityId, ProfileRow>>,
    providers: RwLock<HashMap<IdentityId, ServiceProviderRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw row, bypassing role normalisation.
    pub fn insert_row(&self, row: ProfileRow) -> Result<(), ProfileStoreError> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        if profiles.contains_key(&row.id) {
            return Err(ProfileStoreError::constraint_violation(format!(
                "profile {} already exists",
                row.id
            )));
        }
        profiles.insert(row.id.clone(), row);
        Ok(())
    }

    /// Insert the provider row for an existing profile.
    pub fn insert_service_provider_record(
        &self,
        id: &IdentityId,
        record: ServiceProviderRecord,
    ) -> Result<(), ProfileStoreError> {
        let has_profile = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id);
        if !has_profile {
            return Err(ProfileStoreError::constraint_violation(format!(
                "no profile {id} for service provider record"
            )));
        }
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        if providers.contains_key(id) {
            return Err(ProfileStoreError::constraint_violation(format!(
                "service provider record {id} already exists"
            )));
        }
        providers.insert(id.clone(), record);
        Ok(())
    }

    /// Provider row stored for `id`, if any.
    pub fn service_provider_record(&self, id: &IdentityId) -> Option<ServiceProviderRecord> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Toggle whether calls succeed; used to simulate an outage.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::Release);
    }

    fn ensure_available(&self) -> Result<(), ProfileStoreError> {
        if self.unavailable.load(Ordering::Acquire) {
            Err(ProfileStoreError::unavailable("store is offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, id: &IdentityId) -> Result<Option<Identity>, ProfileStoreError> {
        self.ensure_available()?;
        let row = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned();
        row.map(Identity::try_from).transpose()
    }

    async fn create_profile(&self, identity: &Identity) -> Result<(), ProfileStoreError> {
        self.ensure_available()?;
        self.insert_row(ProfileRow::from(identity))
    }

    async fn create_service_provider_record(
        &self,
        id: &IdentityId,
        record: &ServiceProviderRecord,
    ) -> Result<(), ProfileStoreError> {
        self.ensure_available()?;
        self.insert_service_provider_record(id, record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceCategory;
    use rstest::{fixture, rstest};

    #[fixture]
    fn identity() -> Identity {
        Identity {
            id: IdentityId::random(),
            email: Email::new("handyman@test.com").expect("email"),
            role: Role::ServiceProvider,
            is_verified: true,
            profile: Profile {
                first_name: "Ahmed".to_owned(),
                last_name: "Ibrahim".to_owned(),
                phone: "+2348087654321".to_owned(),
                state: "Lagos".to_owned(),
                lga: "Surulere".to_owned(),
                address: Some("456 Surulere, Lagos".to_owned()),
                profile_image: None,
            },
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn round_trips_identity(identity: Identity) {
        let store = InMemoryProfileStore::new();
        store.create_profile(&identity).await.expect("create");
        assert_eq!(
            store.get_profile(&identity.id).await.expect("get"),
            Some(identity)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn missing_profile_is_none() {
        let store = InMemoryProfileStore::new();
        assert_eq!(store.get_profile(&IdentityId::random()).await, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn normalises_legacy_role(identity: Identity) {
        let store = InMemoryProfileStore::new();
        let mut row = ProfileRow::from(&identity);
        row.role = "handyman".to_owned();
        store.insert_row(row).expect("insert");
        let found = store
            .get_profile(&identity.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(found.role, Role::ServiceProvider);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_role_is_corrupt(identity: Identity) {
        let store = InMemoryProfileStore::new();
        let mut row = ProfileRow::from(&identity);
        row.role = "moderator".to_owned();
        store.insert_row(row).expect("insert");
        assert!(matches!(
            store.get_profile(&identity.id).await,
            Err(ProfileStoreError::Corrupt { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_profile_violates_constraint(identity: Identity) {
        let store = InMemoryProfileStore::new();
        store.create_profile(&identity).await.expect("create");
        assert!(matches!(
            store.create_profile(&identity).await,
            Err(ProfileStoreError::ConstraintViolation { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn provider_record_needs_a_profile(identity: Identity) {
        let store = InMemoryProfileStore::new();
        let record = ServiceProviderRecord::new(vec![ServiceCategory::Plumbing]);
        assert!(matches!(
            store.create_service_provider_record(&identity.id, &record).await,
            Err(ProfileStoreError::ConstraintViolation { .. })
        ));

        store.create_profile(&identity).await.expect("create");
        store
            .create_service_provider_record(&identity.id, &record)
            .await
            .expect("record");
        assert_eq!(store.service_provider_record(&identity.id), Some(record));
    }

    #[rstest]
    #[tokio::test]
    async fn outage_is_unavailable(identity: Identity) {
        let store = InMemoryProfileStore::new();
        store.set_available(false);
        assert!(matches!(
            store.get_profile(&identity.id).await,
            Err(ProfileStoreError::Unavailable { .. })
        ));
    }
}
