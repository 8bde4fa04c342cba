//! In-process public bucket for profile pictures.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::PROFILE_PICTURE_FORMATS;
use crate::domain::ports::{ObjectStorage, ObjectStorageError};

/// Default bucket size.
pub const DEFAULT_QUOTA_BYTES: usize = 50 * 1024 * 1024;

struct StoredObject {
    content_type: String,
    bytes: Vec<u8>,
}

/// Bucket keeping objects in a map; uploads to an existing key replace it.
pub struct InMemoryObjectStorage {
    base_url: String,
    quota_bytes: usize,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryObjectStorage {
    /// Create a bucket serving objects below `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            objects: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Content type and size of the object stored at `key`.
    pub fn object_info(&self, key: &str) -> Option<(String, usize)> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|object| (object.content_type.clone(), object.bytes.len()))
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ObjectStorageError> {
        if !PROFILE_PICTURE_FORMATS.contains(&content_type) {
            return Err(ObjectStorageError::invalid_format(content_type));
        }
        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        let used: usize = objects
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(_, object)| object.bytes.len())
            .sum();
        if used.saturating_add(bytes.len()) > self.quota_bytes {
            return Err(ObjectStorageError::quota_exceeded());
        }
        objects.insert(
            key.to_owned(),
            StoredObject {
                content_type: content_type.to_owned(),
                bytes: bytes.to_vec(),
            },
        );
        Ok(format!("{}/{key}", self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn returns_public_url() {
        let storage = InMemoryObjectStorage::new("http://localhost/storage/");
        let url = storage
            .upload("profile-images/a.png", "image/png", &[1, 2, 3])
            .await
            .expect("upload");
        assert_eq!(url, "http://localhost/storage/profile-images/a.png");
        assert_eq!(
            storage.object_info("profile-images/a.png"),
            Some(("image/png".to_owned(), 3))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_unsupported_formats() {
        let storage = InMemoryObjectStorage::new("http://localhost");
        assert_eq!(
            storage.upload("a.svg", "image/svg+xml", &[0]).await,
            Err(ObjectStorageError::invalid_format("image/svg+xml"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn enforces_quota_but_allows_replacement() {
        let storage = InMemoryObjectStorage::new("http://localhost").with_quota(4);
        storage
            .upload("a.gif", "image/gif", &[0; 4])
            .await
            .expect("fits");
        storage
            .upload("a.gif", "image/gif", &[1; 4])
            .await
            .expect("replacement fits");
        assert_eq!(
            storage.upload("b.gif", "image/gif", &[0]).await,
            Err(ObjectStorageError::QuotaExceeded)
        );
    }
}
