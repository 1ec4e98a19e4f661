use crate::credentials::AccountId;
use crate::errors::StorageError;
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::error;

/// Structured address of a persisted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKey {
    Accounts,
    Session,
    HabitData(AccountId),
}

/// JSON files under a single data directory, one per [`StorageKey`].
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        match key {
            StorageKey::Accounts => self.root.join("accounts.json"),
            StorageKey::Session => self.root.join("session.json"),
            // Account ids are free text, so the file name is derived from a digest of it.
            StorageKey::HabitData(account) => {
                let name = format!("{:x}", Sha256::digest(account.as_str().as_bytes()));
                self.root.join("habits").join(format!("{name}.json"))
            }
        }
    }

    /// Missing values load as `Ok(None)`; unreadable or unparsable files are errors.
    pub async fn load<T: DeserializeOwned>(&self, key: &StorageKey) -> Result<Option<T>, StorageError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Like [`Storage::load`], but failures are logged and read as `None`.
    pub async fn read<T: DeserializeOwned>(&self, key: &StorageKey) -> Option<T> {
        match self.load(key).await {
            Ok(value) => value,
            Err(err) => {
                error!("failed to load {}: {err}", self.path_for(key).display());
                None
            }
        }
    }

    /// Replaces the stored value through a sibling `.tmp` file, so readers see
    /// either the old or the new contents.
    pub async fn write<T: Serialize>(&self, key: &StorageKey, value: &T) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(value)?;
        let tmp = sibling(&path, ".tmp");
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Moves the stored file aside to `<name>.corrupt` and returns its new path.
    pub async fn quarantine(&self, key: &StorageKey) -> Result<PathBuf, StorageError> {
        let path = self.path_for(key);
        let target = sibling(&path, ".corrupt");
        fs::rename(&path, &target).await?;
        Ok(target)
    }

    pub async fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes without reporting failure to the caller.
    pub async fn persist<T: Serialize>(&self, key: &StorageKey, value: &T) {
        if let Err(err) = self.write(key, value).await {
            error!("failed to persist {key:?}: {err}");
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
