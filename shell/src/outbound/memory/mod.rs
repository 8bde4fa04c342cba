//! In-memory adapters for the auth service, profile store and object storage.
//!
//! They stand in for the hosted backend when the shell runs locally and in
//! integration tests.

mod auth_service;
mod demo_accounts;
mod object_storage;
mod profile_store;

pub use auth_service::InMemoryAuthService;
pub use demo_accounts::{DEMO_PASSWORD, DemoSeedError, seed_demo_accounts};
pub use object_storage::{DEFAULT_QUOTA_BYTES, InMemoryObjectStorage};
pub use profile_store::{InMemoryProfileStore, ProfileRow};
