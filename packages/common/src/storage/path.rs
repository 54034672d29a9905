use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Maximum length of an object key in bytes.
pub const MAX_PATH_LEN: usize = 1024;

/// A validated, bucket-relative object key such as
/// `questoes/42/enunciado/figura-1.png`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Parse and validate an object key.
    ///
    /// Keys are `/`-separated, relative, and limited to ASCII letters,
    /// digits, `-`, `_` and `.`. No segment may be empty or start with a dot.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        if raw.is_empty() {
            return Err(StorageError::InvalidPath("path cannot be empty".into()));
        }
        if raw.len() > MAX_PATH_LEN {
            return Err(StorageError::InvalidPath(format!(
                "path exceeds {MAX_PATH_LEN} bytes"
            )));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
        {
            return Err(StorageError::InvalidPath(format!(
                "path '{raw}' contains invalid characters"
            )));
        }
        for segment in raw.split('/') {
            if segment.is_empty() {
                return Err(StorageError::InvalidPath(format!(
                    "path '{raw}' contains an empty segment"
                )));
            }
            if segment.starts_with('.') {
                return Err(StorageError::InvalidPath(format!(
                    "path '{raw}' contains a dot segment"
                )));
            }
        }
        Ok(Self(raw.to_string()))
    }

    /// Recover the key from a public URL built with `prefix`
    /// (`{public_base_url}/{bucket}`). Returns `None` for foreign URLs.
    pub fn from_public_url(prefix: &str, url: &str) -> Option<Self> {
        let prefix = prefix.trim_end_matches('/');
        let rest = url.strip_prefix(prefix)?.strip_prefix('/')?;
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        Self::parse(rest).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the key.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Debug for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectPath({})", self.0)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ObjectPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
