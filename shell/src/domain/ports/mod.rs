//! Domain ports: the collaborators the session store depends on.
//!
//! Each trait exposes typed errors so adapters map their failures into
//! predictable variants, which the session store then normalises.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_service;
mod object_storage;
mod profile_store;

#[cfg(test)]
pub use auth_service::MockAuthService;
pub use auth_service::{AuthEvent, AuthService, AuthServiceError, Session};
#[cfg(test)]
pub use object_storage::MockObjectStorage;
pub use object_storage::{ObjectStorage, ObjectStorageError};
#[cfg(test)]
pub use profile_store::MockProfileStore;
pub use profile_store::{ProfileStore, ProfileStoreError, ServiceProviderRecord};
