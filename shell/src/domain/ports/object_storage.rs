//! Driven port for the hosted file storage used for profile pictures.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum ObjectStorageError {
        /// The bucket has no room left.
        QuotaExceeded => "storage quota exceeded",
        /// The object was rejected by the bucket's format policy.
        InvalidFormat { content_type: String } => "unsupported object format: {content_type}",
        /// The store could not be reached or failed internally.
        Unavailable { message: String } => "object storage unavailable: {message}",
    }
}

/// Port for public object uploads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ObjectStorageError>;
}
