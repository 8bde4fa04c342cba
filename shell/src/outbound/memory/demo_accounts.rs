//! Demo accounts available when the shell runs without a hosted backend.
//!
//! The provider account is stored with the legacy `handyman` role spelling
//! so the normalisation path is exercised on every demo sign-in.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::ports::{AuthServiceError, ProfileStoreError, ServiceProviderRecord};
use crate::domain::{Email, IdentityId, IdentityValidationError, Profile, ServiceCategory};

use super::{InMemoryAuthService, InMemoryProfileStore, ProfileRow};

/// Password shared by every demo account.
pub const DEMO_PASSWORD: &str = "password";

/// Seeding failures.
#[derive(Debug, thiserror::Error)]
pub enum DemoSeedError {
    #[error("invalid demo account data: {0}")]
    InvalidFixture(#[from] IdentityValidationError),
    #[error(transparent)]
    Auth(#[from] AuthServiceError),
    #[error(transparent)]
    Profiles(#[from] ProfileStoreError),
}

struct DemoAccount {
    id: &'static str,
    email: &'static str,
    role: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    phone: &'static str,
    state: &'static str,
    lga: &'static str,
    address: Option<&'static str>,
    categories: &'static [ServiceCategory],
}

const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        id: "00000000-0000-4000-8000-000000000001",
        email: "customer@test.com",
        role: "customer",
        first_name: "John",
        last_name: "Doe",
        phone: "+2348012345678",
        state: "Lagos",
        lga: "Lagos Island",
        address: Some("123 Victoria Island, Lagos"),
        categories: &[],
    },
    DemoAccount {
        id: "00000000-0000-4000-8000-000000000002",
        email: "handyman@test.com",
        role: "handyman",
        first_name: "Ahmed",
        last_name: "Ibrahim",
        phone: "+2348087654321",
        state: "Lagos",
        lga: "Surulere",
        address: Some("456 Surulere, Lagos"),
        categories: &[ServiceCategory::Plumbing, ServiceCategory::Electrical],
    },
    DemoAccount {
        id: "00000000-0000-4000-8000-000000000003",
        email: "admin@test.com",
        role: "admin",
        first_name: "Admin",
        last_name: "User",
        phone: "+2348099999999",
        state: "FCT",
        lga: "Abuja",
        address: None,
        categories: &[],
    },
];

/// Seed the demo accounts into the in-memory adapters.
pub fn seed_demo_accounts(
    auth: &InMemoryAuthService,
    profiles: &InMemoryProfileStore,
) -> Result<(), DemoSeedError> {
    for account in &DEMO_ACCOUNTS {
        let id = IdentityId::new(account.id)?;
        let email = Email::new(account.email)?;
        auth.insert_account(id.clone(), email.clone(), DEMO_PASSWORD)?;
        profiles.insert_row(ProfileRow {
            id: id.clone(),
            email,
            role: account.role.to_owned(),
            is_verified: true,
            profile: Profile {
                first_name: account.first_name.to_owned(),
                last_name: account.last_name.to_owned(),
                phone: account.phone.to_owned(),
                state: account.state.to_owned(),
                lga: account.lga.to_owned(),
                address: account.address.map(str::to_owned),
                profile_image: None,
            },
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        })?;
        if !account.categories.is_empty() {
            profiles.insert_service_provider_record(
                &id,
                ServiceProviderRecord::new(account.categories.to_vec()),
            )?;
        }
    }
    info!(count = DEMO_ACCOUNTS.len(), "demo accounts seeded");
    Ok(())
}
