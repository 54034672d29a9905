use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;
use tracing::debug;

use super::error::StorageError;
use super::path::ObjectPath;
use super::traits::{BoxReader, ObjectStore};

/// Filesystem-backed object store.
///
/// Objects live at `{root}/{bucket}/{key}`. Writes go to a temp file under
/// `{root}/.tmp` first and are then hard-linked into place, so a key is
/// either absent or complete and never silently replaced.
pub struct FilesystemObjectStore {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
    max_size: u64,
}

impl FilesystemObjectStore {
    /// Create a new filesystem object store, creating directories as needed.
    pub async fn new(
        root: PathBuf,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        let bucket = bucket.into();
        ObjectPath::parse(&bucket)?;
        if bucket.contains('/') {
            return Err(StorageError::InvalidPath(format!(
                "bucket name '{bucket}' must be a single segment"
            )));
        }

        fs::create_dir_all(root.join(&bucket)).await?;
        fs::create_dir_all(root.join(".tmp")).await?;

        Ok(Self {
            root,
            bucket,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_size,
        })
    }

    /// Compute the filesystem path for an object key.
    fn object_path(&self, path: &ObjectPath) -> PathBuf {
        let mut full = self.root.join(&self.bucket);
        for segment in path.as_str().split('/') {
            full.push(segment);
        }
        full
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(&self, path: &ObjectPath, data: &[u8]) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let target = self.object_path(path);
        if fs::try_exists(&target).await? {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = target.parent()
            && let Err(e) = fs::create_dir_all(parent).await
        {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        // hard_link fails if the target already exists.
        let linked = fs::hard_link(&temp_path, &target).await;
        let _ = fs::remove_file(&temp_path).await;
        match linked {
            Ok(()) => {
                debug!(key = %path, bytes = data.len(), "Stored object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StorageError::AlreadyExists(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_stream(&self, path: &ObjectPath) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.object_path(path)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &ObjectPath) -> Result<bool, StorageError> {
        match fs::remove_file(self.object_path(path)).await {
            Ok(()) => {
                debug!(key = %path, "Deleted object");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, path: &ObjectPath) -> Result<u64, StorageError> {
        match fs::metadata(self.object_path(path)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_prefix(&self) -> String {
        format!("{}/{}", self.public_base_url, self.bucket)
    }
}
