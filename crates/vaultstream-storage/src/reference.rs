use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::traits::{StorageError, StorageResult};

/// Namespace used by references produced by the local backend.
pub const LOCAL_NAMESPACE: &str = "local";

const SEPARATOR: char = ',';

/// Opaque pointer to stored bytes: `{namespace},{key}`.
///
/// The namespace is `local` for the filesystem backend and the bucket name for
/// S3. Only the storage crate interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageReference {
    namespace: String,
    key: String,
}

impl StorageReference {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> StorageResult<Self> {
        let namespace = namespace.into();
        if namespace.is_empty() || namespace.contains(SEPARATOR) {
            return Err(StorageError::InvalidReference(format!(
                "invalid backend identifier: {:?}",
                namespace
            )));
        }
        Ok(Self {
            namespace,
            key: key.into(),
        })
    }

    pub fn local(key: impl Into<String>) -> Self {
        Self {
            namespace: LOCAL_NAMESPACE.to_string(),
            key: key.into(),
        }
    }

    /// Split a persisted reference on its first comma.
    pub fn parse(reference: &str) -> StorageResult<Self> {
        match reference.split_once(SEPARATOR) {
            Some((namespace, key)) if !namespace.is_empty() => Ok(Self {
                namespace: namespace.to_string(),
                key: key.to_string(),
            }),
            _ => Err(StorageError::InvalidReference(reference.to_string())),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_local(&self) -> bool {
        self.namespace == LOCAL_NAMESPACE
    }
}

impl Display for StorageReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}{}", self.namespace, SEPARATOR, self.key)
    }
}

impl FromStr for StorageReference {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
