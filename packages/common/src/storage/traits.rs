use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::path::ObjectPath;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Path-keyed object storage for a single bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes at `path`.
    ///
    /// Never overwrites: fails with [`StorageError::AlreadyExists`] when an
    /// object is already stored under the same key.
    async fn put(&self, path: &ObjectPath, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve an object as a streaming async reader.
    async fn get_stream(&self, path: &ObjectPath) -> Result<BoxReader, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, path: &ObjectPath) -> Result<bool, StorageError>;

    /// Get the size of an object in bytes.
    async fn size(&self, path: &ObjectPath) -> Result<u64, StorageError>;

    /// Name of the bucket this store writes to.
    fn bucket(&self) -> &str;

    /// Public URL prefix for objects in this bucket, without a trailing slash.
    fn public_prefix(&self) -> String;

    /// Publicly reachable URL of an object.
    fn public_url(&self, path: &ObjectPath) -> String {
        format!("{}/{}", self.public_prefix(), path)
    }

    /// Map a public URL back to its object key. `None` when the URL does
    /// not point into this bucket.
    fn path_from_public_url(&self, url: &str) -> Option<ObjectPath> {
        ObjectPath::from_public_url(&self.public_prefix(), url)
    }
}
